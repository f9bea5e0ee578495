//! A1 notation helpers

/// Column letters for a one-based column number (1 -> `A`, 27 -> `AA`)
#[must_use]
pub fn column_letters(column: u32) -> String {
    let mut n = column.max(1);
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Quoted worksheet title, with embedded quotes doubled
#[must_use]
pub fn quoted_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Range covering a whole worksheet
#[must_use]
pub fn sheet_range(title: &str) -> String {
    quoted_title(title)
}

/// Single-cell range
#[must_use]
pub fn cell_range(title: &str, column: u32, row: u32) -> String {
    format!("{}!{}{}", quoted_title(title), column_letters(column), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(5), "E");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(52), "AZ");
        assert_eq!(column_letters(703), "AAA");
    }

    #[test]
    fn cells() {
        assert_eq!(cell_range("Sheet1", 5, 2), "'Sheet1'!E2");
        assert_eq!(cell_range("Bob's links", 1, 10), "'Bob''s links'!A10");
        assert_eq!(sheet_range("Sheet1"), "'Sheet1'");
    }
}
