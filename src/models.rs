use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One alias → URL mapping from the `aliases` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AliasMapping {
    pub alias: String,
    pub full_url: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /shorten`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    pub full_url: String,
    #[serde(default)]
    pub custom_alias: Option<String>,
}

/// Successful reply to `POST /shorten`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub short_url: String,
    pub alias: String,
    pub full_url: String,
}

/// A mapping together with its public short URL. Returned by the registry's
/// `create` and `list`, and listed as-is by `GET /urls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    pub alias: String,
    pub full_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
}
