//! In-process implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Short link store held in a `DashMap`.
///
/// Gives the same guarantees as the PostgreSQL store: an insert claims the
/// code under the shard lock, so only one of two racing inserts succeeds, and
/// counter updates happen in place under that lock. Contents are lost on
/// restart.
#[derive(Default)]
pub struct MemoryLinkRepository {
    links: DashMap<String, ShortLink>,
    next_id: AtomicI64,
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
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        match self.links.entry(new_link.code.clone()) {
            Entry::Occupied(_) => Err(AppError::duplicate_code(
                "Short code already exists",
                json!({ "code": new_link.code }),
            )),
            Entry::Vacant(slot) => {
                let link = ShortLink {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                    code: new_link.code,
                    target_url: new_link.target_url,
                    is_custom_alias: new_link.is_custom_alias,
                    click_count: 0,
                    created_at: new_link.created_at,
                    expires_at: new_link.expires_at,
                    last_clicked_at: None,
                };
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self.links.get(code).map(|link| link.value().clone()))
    }

    async fn record_click(
        &self,
        code: &str,
        clicked_at: DateTime<Utc>,
    ) -> Result<Option<ShortLink>, AppError> {
        Ok(self.links.get_mut(code).map(|mut link| {
            link.click_count += 1;
            link.last_clicked_at = Some(clicked_at);
            link.value().clone()
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
