use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{Database, RANKINGS_COLLECTION},
    errors::AppResult,
    models::domain::RankingEntry,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RankingRepository: Send + Sync {
    /// Writes or overwrites the entry keyed by (test, user).
    async fn upsert(&self, entry: RankingEntry) -> AppResult<()>;
    /// Every entry of the test in the store's natural order.
    async fn find_by_test(&self, test_id: &str) -> AppResult<Vec<RankingEntry>>;
    async fn find_entry(&self, test_id: &str, user_id: &str) -> AppResult<Option<RankingEntry>>;
    async fn update_rank(
        &self,
        test_id: &str,
        user_id: &str,
        rank: i32,
        total_participants: i32,
    ) -> AppResult<()>;
}

pub struct MongoRankingRepository {
    collection: Collection<RankingEntry>,
}

impl MongoRankingRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(RANKINGS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let test_user_index = IndexModel::builder()
            .keys(doc! { "test_id": 1, "user_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("test_user_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(test_user_index).await?;
        log::debug!("Ensured indexes for {} collection", RANKINGS_COLLECTION);
        Ok(())
    }
}

#[async_trait]
impl RankingRepository for MongoRankingRepository {
    async fn upsert(&self, entry: RankingEntry) -> AppResult<()> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection
            .replace_one(
                doc! { "test_id": &entry.test_id, "user_id": &entry.user_id },
                &entry,
            )
            .with_options(options)
            .await?;
        Ok(())
    }

    async fn find_by_test(&self, test_id: &str) -> AppResult<Vec<RankingEntry>> {
        let entries = self
            .collection
            .find(doc! { "test_id": test_id })
            .await?
            .try_collect()
            .await?;
        Ok(entries)
    }

    async fn find_entry(&self, test_id: &str, user_id: &str) -> AppResult<Option<RankingEntry>> {
        let entry = self
            .collection
            .find_one(doc! { "test_id": test_id, "user_id": user_id })
            .await?;
        Ok(entry)
    }

    async fn update_rank(
        &self,
        test_id: &str,
        user_id: &str,
        rank: i32,
        total_participants: i32,
    ) -> AppResult<()> {
        self.collection
            .update_one(
                doc! { "test_id": test_id, "user_id": user_id },
                doc! { "$set": { "rank": rank, "total_participants": total_participants } },
            )
            .await?;
        Ok(())
    }
}
