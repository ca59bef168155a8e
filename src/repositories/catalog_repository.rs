use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, TEST_SERIES_COLLECTION},
    errors::AppResult,
    models::domain::{Test, TestSeries},
};

/// Leading tests of every series that are open without a purchase.
pub const FREE_PREVIEW_COUNT: usize = 2;

/// Read-only view of the authored catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Returns the test with its `is_free` flag resolved.
    async fn get_test(&self, series_id: &str, test_id: &str) -> AppResult<Option<Test>>;
}

/// Picks a test out of its series and resolves the free-preview flag from its position.
pub fn test_from_series(series: TestSeries, test_id: &str) -> Option<Test> {
    series
        .tests
        .into_iter()
        .enumerate()
        .find(|(_, test)| test.id == test_id)
        .map(|(position, mut test)| {
            test.is_free = test.is_free || position < FREE_PREVIEW_COUNT;
            test
        })
}

pub struct MongoCatalogReader {
    collection: Collection<TestSeries>,
}

impl MongoCatalogReader {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(TEST_SERIES_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        log::debug!("Ensured indexes for {} collection", TEST_SERIES_COLLECTION);
        Ok(())
    }
}

#[async_trait]
impl CatalogReader for MongoCatalogReader {
    async fn get_test(&self, series_id: &str, test_id: &str) -> AppResult<Option<Test>> {
        let series = self.collection.find_one(doc! { "id": series_id }).await?;
        Ok(series.and_then(|s| test_from_series(s, test_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::sample_test;

    fn series_with(ids: &[&str]) -> TestSeries {
        TestSeries {
            id: "series-1".to_string(),
            title: "Bank PO".to_string(),
            is_free: false,
            tests: ids
                .iter()
                .map(|id| {
                    let mut test = sample_test();
                    test.id = id.to_string();
                    test
                })
                .collect(),
        }
    }

    #[test]
    fn first_two_tests_are_free_preview() {
        let series = series_with(&["t-1", "t-2", "t-3"]);

        assert!(test_from_series(series.clone(), "t-1").unwrap().is_free);
        assert!(test_from_series(series.clone(), "t-2").unwrap().is_free);
        assert!(!test_from_series(series, "t-3").unwrap().is_free);
    }

    #[test]
    fn stored_free_flag_is_kept() {
        let mut series = series_with(&["t-1", "t-2", "t-3"]);
        series.tests[2].is_free = true;

        assert!(test_from_series(series, "t-3").unwrap().is_free);
    }

    #[test]
    fn unknown_test_is_none() {
        assert!(test_from_series(series_with(&["t-1"]), "missing").is_none());
    }
}
