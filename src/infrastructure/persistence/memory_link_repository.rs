//! Process-local link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Stored form of a link. Everything except the counter is immutable.
#[derive(Debug)]
struct LinkRecord {
    target_url: String,
    created_at: DateTime<Utc>,
    clicks: AtomicU64,
}

impl LinkRecord {
    fn snapshot(&self, code: &str) -> Link {
        Link::new(
            code.to_string(),
            self.target_url.clone(),
            self.created_at,
            self.clicks.load(Ordering::Acquire),
        )
    }
}

/// In-memory repository backed by a sharded concurrent map.
///
/// Records are fully built before they become visible, so readers never see a
/// half-written link. Click increments run under a shard read guard with an
/// atomic add, which means concurrent redirects on one hot code do not
/// serialize behind each other and never lose updates.
///
/// Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryLinkRepository {
    links: DashMap<String, LinkRecord>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        match self.links.entry(new_link.code) {
            Entry::Occupied(entry) => Err(AppError::conflict(
                "Short code already exists",
                json!({ "code": entry.key() }),
            )),
            Entry::Vacant(entry) => {
                let record = LinkRecord {
                    target_url: new_link.target_url,
                    created_at: Utc::now(),
                    clicks: AtomicU64::new(0),
                };
                let link = record.snapshot(entry.key());
                entry.insert(record);
                Ok(link)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.get(code).map(|record| record.snapshot(code)))
    }

    async fn increment_clicks(&self, code: &str) -> Result<u64, AppError> {
        let record = self.links.get(code).ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })?;

        Ok(record.clicks.fetch_add(1, Ordering::AcqRel) + 1)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
