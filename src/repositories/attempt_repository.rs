use async_trait::async_trait;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::{is_duplicate_key_error, Database, ATTEMPTS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::{Attempt, Response},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the user already has an attempt for the test.
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>>;
    async fn find_by_user_and_test(&self, user_id: &str, test_id: &str)
        -> AppResult<Option<Attempt>>;
    /// Replaces or appends the response keyed by (section, question) on an open attempt.
    /// Returns false when the attempt is missing or already finalized.
    async fn upsert_response(&self, attempt_id: &str, response: Response) -> AppResult<bool>;
    /// Persists the scored attempt only if it has not been finalized yet.
    /// Returns false when another submit got there first.
    async fn finalize(&self, attempt: &Attempt) -> AppResult<bool>;
    async fn set_rank(&self, test_id: &str, user_id: &str, rank: i32) -> AppResult<()>;
}

pub struct MongoAttemptRepository {
    collection: Collection<Attempt>,
}

impl MongoAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(ATTEMPTS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for {} collection", ATTEMPTS_COLLECTION);

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_test_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "test_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_test_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_test_index).await?;

        log::info!("Successfully created indexes for {} collection", ATTEMPTS_COLLECTION);
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for MongoAttemptRepository {
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt> {
        match self.collection.insert_one(&attempt).await {
            Ok(_) => Ok(attempt),
            Err(err) if is_duplicate_key_error(&err) => Err(AppError::AlreadyExists(format!(
                "Attempt for user '{}' on test '{}' already exists",
                attempt.user_id, attempt.test_id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_by_user_and_test(
        &self,
        user_id: &str,
        test_id: &str,
    ) -> AppResult<Option<Attempt>> {
        let attempt = self
            .collection
            .find_one(doc! { "user_id": user_id, "test_id": test_id })
            .await?;
        Ok(attempt)
    }

    async fn upsert_response(&self, attempt_id: &str, response: Response) -> AppResult<bool> {
        let value = to_bson(&response)?;
        let key = doc! {
            "section_id": &response.section_id,
            "question_id": &response.question_id,
        };

        // Two rounds cover a concurrent append of the same key between our set and push.
        for _ in 0..2 {
            let replaced = self
                .collection
                .update_one(
                    doc! {
                        "id": attempt_id,
                        "result_generated": false,
                        "responses": { "$elemMatch": key.clone() },
                    },
                    doc! { "$set": { "responses.$": value.clone() } },
                )
                .await?;
            if replaced.matched_count > 0 {
                return Ok(true);
            }

            let appended = self
                .collection
                .update_one(
                    doc! {
                        "id": attempt_id,
                        "result_generated": false,
                        "responses": { "$not": { "$elemMatch": key.clone() } },
                    },
                    doc! { "$push": { "responses": value.clone() } },
                )
                .await?;
            if appended.matched_count > 0 {
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn finalize(&self, attempt: &Attempt) -> AppResult<bool> {
        let result = self
            .collection
            .replace_one(doc! { "id": &attempt.id, "result_generated": false }, attempt)
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn set_rank(&self, test_id: &str, user_id: &str, rank: i32) -> AppResult<()> {
        self.collection
            .update_one(
                doc! { "test_id": test_id, "user_id": user_id },
                doc! { "$set": { "rank": rank } },
            )
            .await?;
        Ok(())
    }
}
