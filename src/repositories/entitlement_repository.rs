use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    clock::Clock,
    db::{Database, PURCHASES_COLLECTION, TEST_SERIES_COLLECTION},
    errors::AppResult,
    models::domain::Purchase,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntitlementGate: Send + Sync {
    /// True if the user holds an unexpired purchase of the series or the series is free.
    async fn is_entitled(&self, user_id: &str, series_id: &str) -> AppResult<bool>;
}

pub struct MongoEntitlementGate {
    purchases: Collection<Purchase>,
    series: Collection<Document>,
    clock: Arc<dyn Clock>,
}

impl MongoEntitlementGate {
    pub fn new(db: &Database, clock: Arc<dyn Clock>) -> Self {
        Self {
            purchases: db.get_collection(PURCHASES_COLLECTION),
            series: db.get_collection(TEST_SERIES_COLLECTION),
            clock,
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let user_item_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "item_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_item".to_string())
                    .build(),
            )
            .build();

        self.purchases.create_index(user_item_index).await?;
        log::debug!("Ensured indexes for {} collection", PURCHASES_COLLECTION);
        Ok(())
    }

    async fn is_series_free(&self, series_id: &str) -> AppResult<bool> {
        let series = self
            .series
            .find_one(doc! { "id": series_id })
            .projection(doc! { "is_free": 1 })
            .await?;

        Ok(series
            .and_then(|s| s.get_bool("is_free").ok())
            .unwrap_or(false))
    }
}

#[async_trait]
impl EntitlementGate for MongoEntitlementGate {
    async fn is_entitled(&self, user_id: &str, series_id: &str) -> AppResult<bool> {
        if self.is_series_free(series_id).await? {
            return Ok(true);
        }

        let now = self.clock.now();
        let purchases: Vec<Purchase> = self
            .purchases
            .find(doc! { "user_id": user_id, "item_id": series_id })
            .await?
            .try_collect()
            .await?;

        Ok(purchases.iter().any(|p| p.grants_access(now)))
    }
}
