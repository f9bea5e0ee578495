//! Service-account credential document

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sheetwatch_core::ConfigError;
use std::path::Path;

/// Google's OAuth token endpoint, used when the document names none
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const FIELD: &str = "GCP_CREDS_JSON";

#[derive(Deserialize)]
struct CredentialDocument {
    #[serde(rename = "type")]
    kind: Option<String>,
    client_email: Option<String>,
    private_key: Option<String>,
    private_key_id: Option<String>,
    token_uri: Option<String>,
}

/// Parsed service-account key
pub struct ServiceAccountKey {
    /// Account identity, used as JWT issuer
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: SecretString,
    /// Key id, sent as JWT `kid`
    pub private_key_id: Option<String>,
    /// Where assertions are exchanged for access tokens
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Parse a credential document
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` for malformed JSON, a non service
    /// account document, or missing key material.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let doc: CredentialDocument =
            serde_json::from_str(document).map_err(|error| invalid(error.to_string()))?;

        if let Some(kind) = doc.kind.as_deref() {
            if kind != "service_account" {
                return Err(invalid(format!("expected service_account, got {kind}")));
            }
        }
        let client_email = doc
            .client_email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| invalid("client_email is missing".to_string()))?;
        let private_key = doc
            .private_key
            .filter(|k| k.contains("PRIVATE KEY"))
            .map(SecretString::from)
            .ok_or_else(|| invalid("private_key is missing or not PEM".to_string()))?;
        let token_uri = doc
            .token_uri
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string());

        Ok(Self {
            client_email,
            private_key,
            private_key_id: doc.private_key_id.filter(|id| !id.is_empty()),
            token_uri,
        })
    }

    /// Parse a credential document held as a secret
    ///
    /// # Errors
    /// See [`ServiceAccountKey::from_json`].
    pub fn from_secret(document: &SecretString) -> Result<Self, ConfigError> {
        Self::from_json(document.expose_secret())
    }

    /// Read and parse a credential file
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let document = std::fs::read_to_string(path).map_err(|error| ConfigError::Invalid {
            field: "GCP_CREDS_FILE",
            reason: format!("{}: {error}", path.display()),
        })?;
        Self::from_json(&document)
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid {
        field: FIELD,
        reason,
    }
}
