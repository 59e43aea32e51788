//! Domain types carried through the fetch layer.
//!
//! These mirror what the surrounding content generator produces: a project
//! is a titled list of steps plus a materials bill, and step illustrations
//! are addressed by URL.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of a stored project record, as returned by the list operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    /// Unique record identifier
    pub id: String,
    /// Project title
    pub title: String,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// A page of project records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordList {
    /// The records, newest first
    pub records: Vec<RecordSummary>,
}

impl RecordList {
    /// Number of records in the list
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A single build step within a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based step number
    pub number: u32,
    /// Instruction text for this step
    pub instruction: String,
    /// Optional illustration URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One line of the materials bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialItem {
    /// Material name
    pub name: String,
    /// Quantity required
    pub quantity: u32,
    /// Unit cost in cents, if priced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost_cents: Option<u64>,
}

/// Full detail of a project record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDetail {
    /// Unique record identifier
    pub id: String,
    /// Project title
    pub title: String,
    /// Free-form project description
    pub description: String,
    /// Ordered build steps
    pub steps: Vec<Step>,
    /// Materials bill
    pub materials: Vec<MaterialItem>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl RecordDetail {
    /// Total priced cost of the materials bill, in cents
    #[must_use]
    pub fn total_cost_cents(&self) -> u64 {
        self.materials
            .iter()
            .filter_map(|m| m.unit_cost_cents.map(|c| c * u64::from(m.quantity)))
            .sum()
    }
}

/// A loaded binary image resource.
///
/// The payload is a [`Bytes`] handle, so cloning out of the cache is a
/// reference-count bump rather than a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    /// The URL the image was loaded from
    pub url: String,
    /// Raw image bytes
    pub bytes: Bytes,
}

impl ImageHandle {
    /// Create a new image handle
    #[must_use]
    pub fn new(url: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            url: url.into(),
            bytes,
        }
    }

    /// Size of the image payload in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_cost_skips_unpriced() {
        let detail = RecordDetail {
            id: "r1".to_string(),
            title: "Bookshelf".to_string(),
            description: "A small pine bookshelf".to_string(),
            steps: vec![],
            materials: vec![
                MaterialItem {
                    name: "Pine board".to_string(),
                    quantity: 4,
                    unit_cost_cents: Some(1250),
                },
                MaterialItem {
                    name: "Wood glue".to_string(),
                    quantity: 1,
                    unit_cost_cents: None,
                },
            ],
            created_at: Utc::now(),
        };

        assert_eq!(detail.total_cost_cents(), 5000);
    }

    #[test]
    fn test_record_list_roundtrip() {
        let list = RecordList {
            records: vec![RecordSummary {
                id: "r1".to_string(),
                title: "Bookshelf".to_string(),
                created_at: Utc::now(),
            }],
        };

        let json = serde_json::to_string(&list).expect("serialize");
        let back: RecordList = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, list);
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn test_image_handle_is_cheap_to_clone() {
        let handle = ImageHandle::new("https://img.example/a.png", Bytes::from_static(b"png"));
        let clone = handle.clone();
        assert_eq!(handle, clone);
        assert_eq!(clone.len(), 3);
    }
}
