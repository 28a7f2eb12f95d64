//! Inscription records and listing pages
//!
//! An inscription is identified by its `inscriptionId` and points at a content
//! URL holding the JSON payload. The wallet reports them page by page; pages
//! are flattened and deduplicated before their content is fetched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single inscription owned by the wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inscription {
    /// Unique identifier (`<txid>i<index>`)
    pub inscription_id: String,
    /// URL of the inscription's content
    pub content: String,
    /// Owning address, when the wallet reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Global inscription number, when the wallet reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inscription_number: Option<i64>,
    /// Parsed payload, attached once the inscription qualified for a ticker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_data: Option<Value>,
}

impl Inscription {
    pub fn new(inscription_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            inscription_id: inscription_id.into(),
            content: content.into(),
            address: None,
            inscription_number: None,
            json_data: None,
        }
    }

    /// Copy of this inscription with its parsed payload attached
    pub fn with_payload(&self, payload: Value) -> Self {
        Self {
            json_data: Some(payload),
            ..self.clone()
        }
    }
}

/// One page of the wallet's inscription listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InscriptionPage {
    /// Total number of inscriptions across all pages
    pub total: u64,
    /// Inscriptions on this page
    #[serde(default)]
    pub list: Vec<Inscription>,
}

/// Result of collapsing a flattened listing to one entry per identifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupOutcome {
    pub inscriptions: Vec<Inscription>,
    /// Entries that repeated an identifier already seen
    pub duplicates: usize,
    /// Repeats whose content URL differed from the entry they replaced
    pub mismatches: usize,
}

/// Collapse a flattened listing to one inscription per identifier.
///
/// A repeated identifier overwrites the earlier value but keeps the slot of
/// its first occurrence, so the caller must feed pages in offset order for the
/// result to be reproducible. Overwrites that change the content URL are
/// reported as mismatches.
pub fn dedupe_by_id<I>(inscriptions: I) -> DedupOutcome
where
    I: IntoIterator<Item = Inscription>,
{
    let mut outcome = DedupOutcome::default();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for inscription in inscriptions {
        match slots.get(&inscription.inscription_id) {
            Some(&slot) => {
                outcome.duplicates += 1;
                let previous = &outcome.inscriptions[slot];
                if previous.content != inscription.content {
                    outcome.mismatches += 1;
                    tracing::warn!(
                        inscription_id = %inscription.inscription_id,
                        previous = %previous.content,
                        replacement = %inscription.content,
                        "Duplicate inscription id with different content, keeping the later entry"
                    );
                }
                outcome.inscriptions[slot] = inscription;
            }
            None => {
                slots.insert(inscription.inscription_id.clone(), outcome.inscriptions.len());
                outcome.inscriptions.push(inscription);
            }
        }
    }

    outcome
}
