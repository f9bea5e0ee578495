//! Google Sheets record store
//!
//! Reads the first worksheet of a spreadsheet found by name (or id). Row 1
//! holds the column names; every later row is one monitored link. Writes
//! touch a single cell: the fingerprint column of the record's row.

use super::a1;
use super::auth::AccessTokenSource;
use parking_lot::Mutex;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use sheetwatch_core::{Fingerprint, Positioned, RawRecord, RecordStore, RowPosition, StoreError};
use std::sync::Arc;
use std::time::Duration;

/// Sheets API root
pub const DEFAULT_SHEETS_API: &str = "https://sheets.googleapis.com/v4";

/// Drive API root, used for lookup by name
pub const DEFAULT_DRIVE_API: &str = "https://www.googleapis.com/drive/v3";

/// Fingerprint column in the reference layout (1-based, column E)
pub const DEFAULT_FINGERPRINT_COLUMN: u32 = 5;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const LINK_HEADERS: &[&str] = &["link"];
const RECIPIENT_HEADERS: &[&str] = &["recipient_id", "user_id"];
const FINGERPRINT_HEADERS: &[&str] = &["content_fingerprint", "content_hash"];

/// How the spreadsheet is identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetLocator {
    /// Exact spreadsheet title, resolved through Drive
    Name(String),
    /// Spreadsheet id
    Id(String),
}

/// API roots, overridable for tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsEndpoints {
    /// Sheets API root
    pub sheets: String,
    /// Drive API root
    pub drive: String,
}

impl Default for SheetsEndpoints {
    fn default() -> Self {
        Self {
            sheets: DEFAULT_SHEETS_API.to_string(),
            drive: DEFAULT_DRIVE_API.to_string(),
        }
    }
}

impl SheetsEndpoints {
    /// Both APIs served from one root
    #[must_use]
    pub fn single_root(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        Self {
            sheets: format!("{root}/v4"),
            drive: format!("{root}/drive/v3"),
        }
    }
}

/// Zero-based positions of the known columns in the header row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    /// `link` column
    pub link: Option<usize>,
    /// `recipient_id` / `user_id` column
    pub recipient: Option<usize>,
    /// `content_fingerprint` / `content_hash` column
    pub fingerprint: Option<usize>,
}

impl ColumnLayout {
    /// Locate known columns by case-insensitive header name
    #[must_use]
    pub fn from_header(header: &[String]) -> Self {
        let find = |names: &[&str]| {
            header
                .iter()
                .position(|h| names.contains(&h.trim().to_ascii_lowercase().as_str()))
        };
        Self {
            link: find(LINK_HEADERS),
            recipient: find(RECIPIENT_HEADERS),
            fingerprint: find(FINGERPRINT_HEADERS),
        }
    }

    /// One-based column for fingerprint writes
    #[must_use]
    pub fn fingerprint_column(&self, fallback: u32) -> u32 {
        self.fingerprint
            .and_then(|i| u32::try_from(i + 1).ok())
            .unwrap_or(fallback)
    }

    /// Read a data row
    #[must_use]
    pub fn record(&self, row: &[String]) -> RawRecord {
        let cell = |index: Option<usize>| {
            index
                .and_then(|i| row.get(i))
                .map_or("", String::as_str)
        };
        RawRecord::from_cells(
            cell(self.link),
            cell(self.recipient),
            cell(self.fingerprint),
        )
    }
}

#[derive(Debug, Clone)]
struct Worksheet {
    spreadsheet_id: String,
    title: String,
    fingerprint_column: u32,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
    #[serde(default)]
    index: u32,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Record store backed by a Google spreadsheet
pub struct GoogleSheetStore {
    client: reqwest::Client,
    auth: Arc<dyn AccessTokenSource>,
    endpoints: SheetsEndpoints,
    locator: SheetLocator,
    fallback_column: u32,
    worksheet: Mutex<Option<Worksheet>>,
}

impl GoogleSheetStore {
    /// Store for `locator`, writing fingerprints to `fallback_column` unless
    /// the header names a fingerprint column
    ///
    /// # Errors
    /// Returns `StoreError::Http` if the HTTP client cannot be built.
    pub fn new(
        auth: Arc<dyn AccessTokenSource>,
        locator: SheetLocator,
        fallback_column: u32,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| transport(&error))?;
        Ok(Self {
            client,
            auth,
            endpoints: SheetsEndpoints::default(),
            locator,
            fallback_column: fallback_column.max(1),
            worksheet: Mutex::new(None),
        })
    }

    /// With API roots
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: SheetsEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    fn url(&self, root: &str, segments: &[&str]) -> Result<reqwest::Url, StoreError> {
        let mut url = reqwest::Url::parse(root.trim_end_matches('/'))
            .map_err(|error| StoreError::Malformed(format!("bad API root {root}: {error}")))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::Malformed(format!("bad API root {root}")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: reqwest::Url,
    ) -> Result<T, StoreError> {
        let token = self.auth.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|error| transport(&error))?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|error| StoreError::Malformed(error.without_url().to_string()))
    }

    async fn spreadsheet_id(&self) -> Result<String, StoreError> {
        let name = match &self.locator {
            SheetLocator::Id(id) => return Ok(id.clone()),
            SheetLocator::Name(name) => name,
        };
        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'")
        );
        let mut url = self.url(&self.endpoints.drive, &["files"])?;
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("fields", "files(id,name)")
            .append_pair("pageSize", "10");
        let list: DriveFileList = self.get_json(url).await?;
        list.files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| StoreError::NotFound(format!("spreadsheet named {name:?}")))
    }

    async fn first_sheet_title(&self, spreadsheet_id: &str) -> Result<String, StoreError> {
        let mut url = self.url(&self.endpoints.sheets, &["spreadsheets", spreadsheet_id])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(title,index)");
        let meta: SpreadsheetMeta = self.get_json(url).await?;
        meta.sheets
            .into_iter()
            .min_by_key(|s| s.properties.index)
            .map(|s| s.properties.title)
            .ok_or_else(|| StoreError::NotFound(format!("worksheets of {spreadsheet_id}")))
    }

    async fn read_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, StoreError> {
        let url = self.url(
            &self.endpoints.sheets,
            &["spreadsheets", spreadsheet_id, "values", range],
        )?;
        let values: ValueRange = self.get_json(url).await?;
        Ok(values
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    async fn open_worksheet(&self) -> Result<(String, String), StoreError> {
        let spreadsheet_id = self.spreadsheet_id().await?;
        let title = self.first_sheet_title(&spreadsheet_id).await?;
        Ok((spreadsheet_id, title))
    }

    async fn worksheet(&self) -> Result<Worksheet, StoreError> {
        if let Some(ws) = self.worksheet.lock().clone() {
            return Ok(ws);
        }
        let (spreadsheet_id, title) = self.open_worksheet().await?;
        let header_range = format!("{}!1:1", a1::quoted_title(&title));
        let header = self
            .read_values(&spreadsheet_id, &header_range)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();
        let ws = Worksheet {
            spreadsheet_id,
            title,
            fingerprint_column: ColumnLayout::from_header(&header)
                .fingerprint_column(self.fallback_column),
        };
        *self.worksheet.lock() = Some(ws.clone());
        Ok(ws)
    }
}

#[async_trait::async_trait]
impl RecordStore for GoogleSheetStore {
    async fn load_all(&self) -> Result<Vec<Positioned<RawRecord>>, StoreError> {
        let (spreadsheet_id, title) = self.open_worksheet().await?;
        let mut rows = self
            .read_values(&spreadsheet_id, &a1::sheet_range(&title))
            .await?
            .into_iter();

        let header = rows.next().unwrap_or_default();
        let layout = ColumnLayout::from_header(&header);
        if layout.link.is_none() || layout.recipient.is_none() {
            tracing::warn!(
                ?header,
                "header lacks link or recipient column; every row will be skipped"
            );
        }

        let records: Vec<_> = rows
            .enumerate()
            .map(|(i, row)| Positioned::new(RowPosition::from_data_index(i), layout.record(&row)))
            .collect();

        let fingerprint_column = layout.fingerprint_column(self.fallback_column);
        tracing::debug!(
            %spreadsheet_id,
            %title,
            fingerprint_column,
            rows = records.len(),
            "worksheet loaded"
        );
        *self.worksheet.lock() = Some(Worksheet {
            spreadsheet_id,
            title,
            fingerprint_column,
        });
        Ok(records)
    }

    async fn update_fingerprint(
        &self,
        position: RowPosition,
        fingerprint: &Fingerprint,
    ) -> Result<(), StoreError> {
        let ws = self.worksheet().await?;
        let range = a1::cell_range(&ws.title, ws.fingerprint_column, position.row());
        let mut url = self.url(
            &self.endpoints.sheets,
            &["spreadsheets", &ws.spreadsheet_id, "values", &range],
        )?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [[fingerprint.as_str()]],
        });
        let token = self.auth.access_token().await?;
        let response = self
            .client
            .put(url)
            .bearer_auth(token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|error| transport(&error))?;
        check_status(response).await?;
        Ok(())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn transport(error: &reqwest::Error) -> StoreError {
    StoreError::Http {
        status: None,
        message: if error.is_timeout() {
            "timed out".to_string()
        } else {
            error.to_string()
        },
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => StoreError::Auth(format!("{status}: {body}")),
        404 => StoreError::NotFound(body),
        code => StoreError::Http {
            status: Some(code),
            message: body,
        },
    })
}
