use std::sync::Arc;

use crate::{
    clock::{Clock, SystemClock},
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        AttemptRepository, CatalogReader, CutoffRepository, EntitlementGate,
        MongoAttemptRepository, MongoCatalogReader, MongoCutoffRepository, MongoEntitlementGate,
        MongoRankingRepository, MongoUserDirectory, RankingRepository, UserDirectory,
    },
    services::{
        attempt_service::AttemptService, ranking_service::RankingService,
        result_service::ResultService,
    },
};

/// Storage and collaborator handles the services are built from.
pub struct Repositories {
    pub catalog: Arc<dyn CatalogReader>,
    pub entitlements: Arc<dyn EntitlementGate>,
    pub users: Arc<dyn UserDirectory>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub rankings: Arc<dyn RankingRepository>,
    pub cutoffs: Arc<dyn CutoffRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub attempt_service: Arc<AttemptService>,
    pub result_service: Arc<ResultService>,
    pub ranking_service: Arc<RankingService>,
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let catalog = MongoCatalogReader::new(&db);
        catalog.ensure_indexes().await?;
        let entitlements = MongoEntitlementGate::new(&db, clock.clone());
        entitlements.ensure_indexes().await?;
        let users = MongoUserDirectory::new(&db);
        users.ensure_indexes().await?;
        let attempts = MongoAttemptRepository::new(&db);
        attempts.ensure_indexes().await?;
        let rankings = MongoRankingRepository::new(&db);
        rankings.ensure_indexes().await?;
        let cutoffs = MongoCutoffRepository::new(&db);
        cutoffs.ensure_indexes().await?;

        let repositories = Repositories {
            catalog: Arc::new(catalog),
            entitlements: Arc::new(entitlements),
            users: Arc::new(users),
            attempts: Arc::new(attempts),
            rankings: Arc::new(rankings),
            cutoffs: Arc::new(cutoffs),
        };

        let mut state = Self::from_repositories(repositories, clock, config);
        state.db = Some(db);
        Ok(state)
    }

    pub fn from_repositories(
        repositories: Repositories,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Self {
        let ranking_service = Arc::new(RankingService::new(
            repositories.rankings,
            repositories.attempts.clone(),
            clock.clone(),
        ));

        let attempt_service = Arc::new(AttemptService::new(
            repositories.catalog.clone(),
            repositories.entitlements,
            repositories.attempts.clone(),
            ranking_service.clone(),
            clock.clone(),
        ));

        let result_service = Arc::new(ResultService::new(
            repositories.attempts,
            repositories.catalog,
            repositories.cutoffs,
            repositories.users,
            ranking_service.clone(),
            clock,
        ));

        Self {
            attempt_service,
            result_service,
            ranking_service,
            db: None,
            config: Arc::new(config),
        }
    }
}
