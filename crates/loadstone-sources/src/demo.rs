//! Canned demo dataset.
//!
//! Serves a small fixed set of projects without touching the network, for
//! demo mode and offline development. Latency is simulated so cache and
//! dedup behavior upstream stays observable.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use loadstone_core::{
    FetchError, MaterialItem, RecordDetail, RecordList, RecordStore, RecordSummary, Step,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Record store backed by a fixed in-memory dataset.
pub struct DemoRecordStore {
    latency: Duration,
}

impl Default for DemoRecordStore {
    fn default() -> Self {
        Self::new(Duration::from_millis(150))
    }
}

impl DemoRecordStore {
    /// Create a demo store that answers after `latency`
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// A demo store that answers immediately
    #[must_use]
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    fn dataset() -> Vec<RecordDetail> {
        let created = Utc
            .with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
            .single()
            .unwrap_or_else(Utc::now);

        vec![
            RecordDetail {
                id: "demo-birdhouse".to_string(),
                title: "Cedar Birdhouse".to_string(),
                description: "A weatherproof birdhouse for small garden birds".to_string(),
                steps: vec![
                    Step {
                        number: 1,
                        instruction: "Cut the cedar board into six panels per the template"
                            .to_string(),
                        image_url: Some("https://demo.loadstone.dev/img/birdhouse-1.png".to_string()),
                    },
                    Step {
                        number: 2,
                        instruction: "Drill the 32mm entrance hole in the front panel".to_string(),
                        image_url: Some("https://demo.loadstone.dev/img/birdhouse-2.png".to_string()),
                    },
                    Step {
                        number: 3,
                        instruction: "Glue and pin the panels, leaving the roof hinged".to_string(),
                        image_url: None,
                    },
                ],
                materials: vec![
                    MaterialItem {
                        name: "Cedar board 18mm".to_string(),
                        quantity: 1,
                        unit_cost_cents: Some(2200),
                    },
                    MaterialItem {
                        name: "Brass hinge".to_string(),
                        quantity: 1,
                        unit_cost_cents: Some(450),
                    },
                    MaterialItem {
                        name: "Exterior wood glue".to_string(),
                        quantity: 1,
                        unit_cost_cents: None,
                    },
                ],
                created_at: created,
            },
            RecordDetail {
                id: "demo-bookshelf".to_string(),
                title: "Pine Bookshelf".to_string(),
                description: "A three-shelf pine bookcase with a fixed back".to_string(),
                steps: vec![
                    Step {
                        number: 1,
                        instruction: "Cut the side panels and shelves to length".to_string(),
                        image_url: Some("https://demo.loadstone.dev/img/bookshelf-1.png".to_string()),
                    },
                    Step {
                        number: 2,
                        instruction: "Rout the shelf dados in both side panels".to_string(),
                        image_url: None,
                    },
                ],
                materials: vec![MaterialItem {
                    name: "Pine board 2400x300mm".to_string(),
                    quantity: 3,
                    unit_cost_cents: Some(1850),
                }],
                created_at: created,
            },
        ]
    }
}

#[async_trait]
impl RecordStore for DemoRecordStore {
    async fn load_list(&self) -> Result<RecordList, FetchError> {
        sleep(self.latency).await;
        debug!("Demo store serving record list");

        Ok(RecordList {
            records: Self::dataset()
                .into_iter()
                .map(|detail| RecordSummary {
                    id: detail.id,
                    title: detail.title,
                    created_at: detail.created_at,
                })
                .collect(),
        })
    }

    async fn load_detail(&self, id: &str) -> Result<RecordDetail, FetchError> {
        sleep(self.latency).await;
        debug!(id, "Demo store serving record detail");

        Self::dataset()
            .into_iter()
            .find(|detail| detail.id == id)
            .ok_or_else(|| {
                FetchError::validation(format!("no such record: {id}"), Some("id".to_string()))
            })
    }
}
