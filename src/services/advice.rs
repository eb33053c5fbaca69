//! Advice requests against a generative text endpoint
//!
//! Sends the ledger summary and the most recent entries to a
//! `generateContent` style API and returns one short tip. Every failure,
//! including a missing key, turns into a friendly fallback sentence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::settings::non_blank;
use crate::config::AdviceSettings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::Entry;
use crate::reports::Summary;

pub const NO_KEY_FALLBACK: &str =
    "Advice is not set up yet. Add an advice key to get a personal tip.";
pub const NO_ENTRIES_FALLBACK: &str =
    "Record a few income and expense entries first, then ask again for a tip.";
pub const FAILED_FALLBACK: &str =
    "Advice could not be fetched right now. Please try again in a little while.";

/// How many recent entries go into the prompt
pub const PROMPT_ENTRY_LIMIT: usize = 20;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Marks one advice request; see [`AdviceRequester::settle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AdviceTicket(u64);

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text;
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

pub struct AdviceRequester {
    client: Client,
    endpoint: String,
    key: Option<String>,
    issued: AtomicU64,
    settled: AtomicU64,
}

impl AdviceRequester {
    pub fn new(key: Option<String>, base_url: &str, model: &str) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            key: key.filter(|k| !k.trim().is_empty()),
            issued: AtomicU64::new(0),
            settled: AtomicU64::new(0),
        }
    }

    pub fn from_settings(settings: &AdviceSettings) -> Self {
        Self::new(
            non_blank(&settings.key).map(str::to_string),
            &settings.base_url,
            &settings.model,
        )
    }

    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ask for one practical tip about these finances
    ///
    /// Never fails; see the `*_FALLBACK` constants for what comes back when
    /// no tip can be produced.
    pub async fn request_advice(&self, entries: &[Entry], summary: &Summary) -> String {
        let Some(key) = self.key.as_deref() else {
            return NO_KEY_FALLBACK.to_string();
        };
        if entries.is_empty() {
            return NO_ENTRIES_FALLBACK.to_string();
        }

        match self.generate(key, &build_prompt(entries, summary)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Advice request failed: {e}");
                FAILED_FALLBACK.to_string()
            }
        }
    }

    /// Start tracking a new request
    pub fn begin(&self) -> AdviceTicket {
        AdviceTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Accept the response for `ticket` unless a newer request already
    /// settled; stale responses come back as `None`
    pub fn settle(&self, ticket: AdviceTicket, text: String) -> Option<String> {
        let previous = self.settled.fetch_max(ticket.0, Ordering::SeqCst);
        if previous > ticket.0 {
            tracing::debug!("Discarding stale advice response {}", ticket.0);
            None
        } else {
            Some(text)
        }
    }

    async fn generate(&self, key: &str, prompt: &str) -> LedgerResult<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response: GenerateResponse = self
            .client
            .post(&self.endpoint)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .into_text()
            .ok_or_else(|| LedgerError::BackendUnavailable("advice response had no text".into()))
    }
}

/// Prompt sent to the advice endpoint
pub fn build_prompt(entries: &[Entry], summary: &Summary) -> String {
    let mut recent: Vec<&Entry> = entries.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(PROMPT_ENTRY_LIMIT);

    let mut prompt = String::from(
        "You are a friendly financial helper for a retired person living on a pension. \
         Based on the figures below, give one short, practical money-saving or budgeting tip \
         in two or three sentences.\n\n",
    );
    prompt.push_str(&format!("Starting balance: {}\n", summary.starting_balance));
    prompt.push_str(&format!("Total income: {}\n", summary.total_income));
    prompt.push_str(&format!("Total expenses: {}\n", summary.total_expenses));
    prompt.push_str(&format!("Current balance: {}\n", summary.final_balance));
    prompt.push_str("\nRecent entries:\n");
    for entry in recent {
        prompt.push_str(&format!(
            "- {} {} {}: {}\n",
            entry.date, entry.kind, entry.amount, entry.description
        ));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryKind, Ledger, Money};
    use crate::reports::summarize;
    use chrono::NaiveDate;

    fn entry(day: u32, description: &str, cents: i64, kind: EntryKind) -> Entry {
        Entry::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            description,
            Money::from_cents(cents),
            kind,
        )
    }

    #[tokio::test]
    async fn test_missing_key_returns_fallback() {
        let requester = AdviceRequester::new(None, "http://127.0.0.1:9", "model");
        let entries = vec![entry(1, "Pension", 100000, EntryKind::Income)];

        let text = requester.request_advice(&entries, &Summary::default()).await;
        assert_eq!(text, NO_KEY_FALLBACK);
        assert!(!requester.is_configured());
    }

    #[tokio::test]
    async fn test_blank_key_counts_as_missing() {
        let requester = AdviceRequester::new(Some("  ".into()), "http://127.0.0.1:9", "model");
        assert!(!requester.is_configured());
    }

    #[tokio::test]
    async fn test_no_entries_returns_fallback() {
        let requester = AdviceRequester::new(Some("key".into()), "http://127.0.0.1:9", "model");

        let text = requester.request_advice(&[], &Summary::default()).await;
        assert_eq!(text, NO_ENTRIES_FALLBACK);
    }

    #[test]
    fn test_endpoint_url() {
        let requester =
            AdviceRequester::new(None, "https://ai.example.com/", "gemini-2.0-flash");
        assert_eq!(
            requester.endpoint(),
            "https://ai.example.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_prompt_contains_summary_and_recent_entries() {
        let entries: Vec<Entry> = (1..=25)
            .map(|day| entry(day, &format!("Groceries {}", day), 1000, EntryKind::Expense))
            .collect();
        let summary = summarize(&Ledger::with_entries(Money::from_cents(50000), entries.clone()));

        let prompt = build_prompt(&entries, &summary);
        assert!(prompt.contains("Total expenses: $250.00"));
        assert!(prompt.contains("Current balance: $250.00"));
        assert!(prompt.contains("Groceries 25"));
        assert!(prompt.contains("Groceries 6\n"));
        assert!(!prompt.contains("Groceries 5\n"));
        assert_eq!(prompt.matches("\n- ").count(), PROMPT_ENTRY_LIMIT);
    }

    #[test]
    fn test_response_text_extraction() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"  Cook at home.  "}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().as_deref(), Some("Cook at home."));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.into_text().is_none());

        let blank: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#)
                .unwrap();
        assert!(blank.into_text().is_none());
    }

    #[test]
    fn test_stale_response_discarded() {
        let requester = AdviceRequester::new(None, "http://127.0.0.1:9", "model");
        let first = requester.begin();
        let second = requester.begin();
        assert!(second > first);

        assert_eq!(requester.settle(second, "new".into()).as_deref(), Some("new"));
        assert!(requester.settle(first, "old".into()).is_none());
    }

    #[test]
    fn test_in_order_responses_accepted() {
        let requester = AdviceRequester::new(None, "http://127.0.0.1:9", "model");
        let first = requester.begin();
        let second = requester.begin();

        assert!(requester.settle(first, "a".into()).is_some());
        assert!(requester.settle(second, "b".into()).is_some());
    }
}
