use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};

/// Snapshot of one "latest release" response.
#[derive(Clone, Debug, Deserialize)]
pub struct ReleaseInfo {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub html_url: String,
    /// Release title.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Release notes.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    /// Version tag, compared verbatim against the running version.
    pub tag_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub published_at: String,
    /// Attached files in the order the API listed them.
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    pub browser_download_url: String,
    /// Content digest such as `sha256:<hex>`; missing on older releases.
    #[serde(default)]
    pub digest: Option<String>,
}

impl ReleaseInfo {
    /// First asset whose name matches exactly.
    pub fn find_asset(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.name == name)
    }

    /// Publish time, when the API supplied a parsable RFC 3339 timestamp.
    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.published_at).ok()
    }
}

impl Asset {
    /// Hex SHA-256 taken from the `digest` field, if the host published one.
    pub fn sha256(&self) -> Option<&str> {
        self.digest
            .as_deref()
            .and_then(|digest| digest.strip_prefix("sha256:"))
            .map(str::trim)
            .filter(|hex| !hex.is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
