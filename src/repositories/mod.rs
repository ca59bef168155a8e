pub mod attempt_repository;
pub mod catalog_repository;
pub mod cutoff_repository;
pub mod entitlement_repository;
pub mod ranking_repository;
pub mod user_repository;

pub use attempt_repository::{AttemptRepository, MongoAttemptRepository};
pub use catalog_repository::{CatalogReader, MongoCatalogReader};
pub use cutoff_repository::{CutoffRepository, MongoCutoffRepository};
pub use entitlement_repository::{EntitlementGate, MongoEntitlementGate};
pub use ranking_repository::{MongoRankingRepository, RankingRepository};
pub use user_repository::{MongoUserDirectory, UserDirectory};
