use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, CUTOFFS_COLLECTION},
    errors::AppResult,
    models::domain::CutoffRecord,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CutoffRepository: Send + Sync {
    async fn find_by_test(&self, test_id: &str) -> AppResult<Option<CutoffRecord>>;
}

pub struct MongoCutoffRepository {
    collection: Collection<CutoffRecord>,
}

impl MongoCutoffRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(CUTOFFS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let model = IndexModel::builder()
            .keys(doc! { "test_id": 1 })
            .options(IndexOptions::builder().name("test_id".to_string()).build())
            .build();

        self.collection.create_index(model).await?;
        log::debug!("Ensured indexes for {} collection", CUTOFFS_COLLECTION);
        Ok(())
    }
}

#[async_trait]
impl CutoffRepository for MongoCutoffRepository {
    async fn find_by_test(&self, test_id: &str) -> AppResult<Option<CutoffRecord>> {
        let record = self.collection.find_one(doc! { "test_id": test_id }).await?;
        Ok(record)
    }
}
