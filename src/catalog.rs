use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::errors::AppError;

// @module: Catalog response model and work item selection

// Envelope of the catalog response; entries are decoded one by one
#[derive(Debug, Deserialize)]
struct RawCatalog {
    data: RawCatalogData,
}

#[derive(Debug, Deserialize)]
struct RawCatalogData {
    #[serde(default)]
    modules: Vec<Value>,
}

/// Decoded catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogResponse {
    entries: Vec<CatalogEntry>,
}

/// One video in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: u32,

    /// Subscription plan details; absent for entries without published content
    pub plan: Option<Plan>,
}

/// Plan details of a catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    #[serde(rename = "titleJP", default)]
    pub title_jp: Option<String>,

    #[serde(rename = "titleEN", default)]
    pub title_en: Option<String>,

    #[serde(rename = "transcriptId", default)]
    pub transcript_id: Option<u32>,
}

/// A video that is requested and has a transcript to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub id: u32,
    pub title: String,
    pub transcript_id: u32,
}

impl CatalogResponse {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Decode a raw catalog document
    ///
    /// Only a broken `data.modules` envelope is an error. Entries without a
    /// usable ID are dropped, and an unreadable plan counts as no plan.
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        let raw: RawCatalog = serde_json::from_value(value)
            .map_err(|e| AppError::Catalog(e.to_string()))?;

        let entries = raw.data.modules.iter()
            .enumerate()
            .filter_map(|(position, entry)| CatalogEntry::from_value(position, entry))
            .collect();

        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Highest ID in the catalog, or 1 when it is empty
    pub fn max_id(&self) -> u32 {
        self.entries().iter().map(|entry| entry.id).fold(1, u32::max)
    }
}

impl CatalogEntry {
    fn from_value(position: usize, value: &Value) -> Option<Self> {
        let Some(id) = value.get("id")
            .and_then(Value::as_u64)
            .and_then(|id| u32::try_from(id).ok())
        else {
            debug!("Catalog entry {} has no valid id, skipping", position);
            return None;
        };

        let plan = match value.get("plan") {
            None | Some(Value::Null) => None,
            Some(plan) => match Plan::deserialize(plan) {
                Ok(plan) => Some(plan),
                Err(e) => {
                    debug!("Video ID {} has an unreadable plan ({}), skipping", id, e);
                    None
                }
            },
        };

        Some(Self { id, plan })
    }
}

impl Plan {
    // @returns: "<Japanese title> | <English title>"
    pub fn display_title(&self) -> String {
        format!(
            "{} | {}",
            self.title_jp.as_deref().unwrap_or_default(),
            self.title_en.as_deref().unwrap_or_default()
        )
    }
}

/// Select the requested entries that carry a transcript, in catalog order
pub fn filter(entries: &[CatalogEntry], ids: &BTreeSet<u32>) -> Vec<WorkItem> {
    entries.iter()
        .filter(|entry| ids.contains(&entry.id))
        .filter_map(|entry| {
            let Some(plan) = &entry.plan else {
                debug!("Video ID {} has no plan, skipping", entry.id);
                return None;
            };
            let Some(transcript_id) = plan.transcript_id else {
                debug!("Video ID {} has no transcript, skipping", entry.id);
                return None;
            };
            Some(WorkItem {
                id: entry.id,
                title: plan.display_title(),
                transcript_id,
            })
        })
        .collect()
}
