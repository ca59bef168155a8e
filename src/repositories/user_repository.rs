use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, USERS_COLLECTION},
    errors::AppResult,
    models::domain::User,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Reservation category used for cutoff matching, if the profile has one.
    async fn get_category(&self, user_id: &str) -> AppResult<Option<String>>;
}

pub struct MongoUserDirectory {
    collection: Collection<User>,
}

impl MongoUserDirectory {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(USERS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let options = IndexOptions::builder().unique(true).build();
        let model = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(options)
            .build();

        self.collection.create_index(model).await?;
        log::debug!("Ensured indexes for {} collection", USERS_COLLECTION);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MongoUserDirectory {
    async fn get_category(&self, user_id: &str) -> AppResult<Option<String>> {
        let user = self.collection.find_one(doc! { "id": user_id }).await?;
        Ok(user.and_then(|u| u.category))
    }
}
