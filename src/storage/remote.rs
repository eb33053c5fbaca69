//! Remote cloud database backend
//!
//! Talks to a PostgREST-style table endpoint (`{url}/rest/v1/entries`). The
//! access key is sent both as the `apikey` header and as a bearer token.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::settings::{non_blank, RemoteSettings};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Entry, EntryId, EntryKind, Money};

const TABLE_PATH: &str = "rest/v1/entries";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Row shape of the remote `entries` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRow {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    /// Amount in major units
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl From<&Entry> for RemoteRow {
    fn from(entry: &Entry) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            date: entry.date,
            description: entry.description.clone(),
            amount: entry.amount.to_major(),
            kind: entry.kind,
        }
    }
}

impl TryFrom<RemoteRow> for Entry {
    type Error = LedgerError;

    fn try_from(row: RemoteRow) -> Result<Self, Self::Error> {
        let amount = Money::from_major(row.amount).ok_or_else(|| {
            LedgerError::Validation(format!("row {} has an unusable amount", row.id))
        })?;

        let entry = Entry {
            id: EntryId::from_uuid(row.id),
            date: row.date,
            description: row.description,
            amount,
            kind: row.kind,
        };
        entry.validate()?;
        Ok(entry)
    }
}

/// HTTP client for the remote entries table
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    table_url: String,
    key: String,
}

impl RemoteBackend {
    pub fn new(base_url: &str, key: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            table_url: format!("{}/{}", base_url.trim_end_matches('/'), TABLE_PATH),
            key: key.into(),
        }
    }

    /// Build a backend when both the endpoint and the key are configured
    ///
    /// Returns `None` otherwise; an unconfigured remote is not an error.
    pub fn from_settings(settings: &RemoteSettings) -> Option<Self> {
        let url = non_blank(&settings.url)?;
        let key = non_blank(&settings.key)?;
        Some(Self::new(url, key))
    }

    pub fn table_url(&self) -> &str {
        &self.table_url
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    /// Fetch every entry, oldest first
    ///
    /// Rows that do not form a valid entry are skipped with a warning.
    pub async fn list(&self) -> LedgerResult<Vec<Entry>> {
        let rows: Vec<RemoteRow> = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*"), ("order", "date.asc")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            match Entry::try_from(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("Skipping remote row {id}: {e}"),
            }
        }

        tracing::debug!("Loaded {} entries from {}", entries.len(), self.table_url);
        Ok(entries)
    }

    pub async fn insert(&self, entry: &Entry) -> LedgerResult<()> {
        self.request(reqwest::Method::POST)
            .header("Prefer", "return=minimal")
            .json(&RemoteRow::from(entry))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Replace the stored fields of `entry`, matched by id
    pub async fn update(&self, entry: &Entry) -> LedgerResult<()> {
        self.request(reqwest::Method::PATCH)
            .query(&[("id", id_filter(entry.id))])
            .header("Prefer", "return=minimal")
            .json(&RemoteRow::from(entry))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn delete(&self, id: EntryId) -> LedgerResult<()> {
        self.request(reqwest::Method::DELETE)
            .query(&[("id", id_filter(id))])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

fn id_filter(id: EntryId) -> String {
    format!("eq.{}", id.as_uuid())
}
