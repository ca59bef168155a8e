#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::RwLock;

use testseries_server::{
    app_state::{AppState, Repositories},
    clock::Clock,
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{
            purchase::PurchaseStatus, Attempt, CutoffRecord, Purchase, Question, RankingEntry,
            Response, Section, Test, TestSeries,
        },
        dto::request::SubmitAnswerRequest,
    },
    repositories::{
        catalog_repository::test_from_series, AttemptRepository, CatalogReader,
        CutoffRepository, EntitlementGate, RankingRepository, UserDirectory,
    },
    services::attempt_service::AttemptService,
};

pub const SERIES_ID: &str = "series-1";
/// Third test of the series, so it sits behind the purchase gate.
pub const PAID_TEST_ID: &str = "test-3";
/// First test of the series, always part of the free preview.
pub const PREVIEW_TEST_ID: &str = "test-1";

pub struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub struct InMemoryCatalogReader {
    series: RwLock<HashMap<String, TestSeries>>,
}

impl InMemoryCatalogReader {
    pub fn new() -> Self {
        Self {
            series: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, series: TestSeries) {
        self.series.write().await.insert(series.id.clone(), series);
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalogReader {
    async fn get_test(&self, series_id: &str, test_id: &str) -> AppResult<Option<Test>> {
        let series = self.series.read().await;
        Ok(series
            .get(series_id)
            .cloned()
            .and_then(|s| test_from_series(s, test_id)))
    }
}

pub struct InMemoryEntitlementGate {
    purchases: RwLock<Vec<Purchase>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryEntitlementGate {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            purchases: RwLock::new(Vec::new()),
            clock,
        }
    }

    pub async fn grant(&self, user_id: &str, series_id: &str) {
        self.purchases.write().await.push(Purchase {
            user_id: user_id.to_string(),
            item_id: series_id.to_string(),
            status: PurchaseStatus::Completed,
            expires_at: None,
        });
    }

    pub async fn add(&self, purchase: Purchase) {
        self.purchases.write().await.push(purchase);
    }
}

#[async_trait]
impl EntitlementGate for InMemoryEntitlementGate {
    async fn is_entitled(&self, user_id: &str, series_id: &str) -> AppResult<bool> {
        let now = self.clock.now();
        let purchases = self.purchases.read().await;
        Ok(purchases
            .iter()
            .any(|p| p.user_id == user_id && p.item_id == series_id && p.grants_access(now)))
    }
}

pub struct InMemoryUserDirectory {
    categories: RwLock<HashMap<String, String>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            categories: RwLock::new(HashMap::new()),
        }
    }

    pub async fn set_category(&self, user_id: &str, category: &str) {
        self.categories
            .write()
            .await
            .insert(user_id.to_string(), category.to_string());
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_category(&self, user_id: &str) -> AppResult<Option<String>> {
        Ok(self.categories.read().await.get(user_id).cloned())
    }
}

pub struct InMemoryAttemptRepository {
    attempts: RwLock<Vec<Attempt>>,
}

impl InMemoryAttemptRepository {
    pub fn new() -> Self {
        Self {
            attempts: RwLock::new(Vec::new()),
        }
    }

    pub async fn count(&self) -> usize {
        self.attempts.read().await.len()
    }
}

#[async_trait]
impl AttemptRepository for InMemoryAttemptRepository {
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt> {
        let mut attempts = self.attempts.write().await;
        if attempts
            .iter()
            .any(|a| a.user_id == attempt.user_id && a.test_id == attempt.test_id)
        {
            return Err(AppError::AlreadyExists(format!(
                "Attempt for user '{}' on test '{}' already exists",
                attempt.user_id, attempt.test_id
            )));
        }
        attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_user_and_test(
        &self,
        user_id: &str,
        test_id: &str,
    ) -> AppResult<Option<Attempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .iter()
            .find(|a| a.user_id == user_id && a.test_id == test_id)
            .cloned())
    }

    async fn upsert_response(&self, attempt_id: &str, response: Response) -> AppResult<bool> {
        let mut attempts = self.attempts.write().await;
        match attempts
            .iter_mut()
            .find(|a| a.id == attempt_id && !a.result_generated)
        {
            Some(attempt) => {
                attempt.upsert_response(response);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn finalize(&self, attempt: &Attempt) -> AppResult<bool> {
        let mut attempts = self.attempts.write().await;
        match attempts
            .iter_mut()
            .find(|a| a.id == attempt.id && !a.result_generated)
        {
            Some(stored) => {
                *stored = attempt.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_rank(&self, test_id: &str, user_id: &str, rank: i32) -> AppResult<()> {
        let mut attempts = self.attempts.write().await;
        if let Some(attempt) = attempts
            .iter_mut()
            .find(|a| a.test_id == test_id && a.user_id == user_id)
        {
            attempt.rank = rank;
        }
        Ok(())
    }
}

/// Keeps entries in insertion order, standing in for the store's natural order.
pub struct InMemoryRankingRepository {
    entries: RwLock<Vec<RankingEntry>>,
}

impl InMemoryRankingRepository {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RankingRepository for InMemoryRankingRepository {
    async fn upsert(&self, entry: RankingEntry) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        match entries
            .iter_mut()
            .find(|e| e.test_id == entry.test_id && e.user_id == entry.user_id)
        {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    async fn find_by_test(&self, test_id: &str) -> AppResult<Vec<RankingEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.test_id == test_id)
            .cloned()
            .collect())
    }

    async fn find_entry(&self, test_id: &str, user_id: &str) -> AppResult<Option<RankingEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|e| e.test_id == test_id && e.user_id == user_id)
            .cloned())
    }

    async fn update_rank(
        &self,
        test_id: &str,
        user_id: &str,
        rank: i32,
        total_participants: i32,
    ) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries
            .iter_mut()
            .find(|e| e.test_id == test_id && e.user_id == user_id)
        {
            entry.rank = rank;
            entry.total_participants = total_participants;
        }
        Ok(())
    }
}

pub struct InMemoryCutoffRepository {
    records: RwLock<HashMap<String, CutoffRecord>>,
}

impl InMemoryCutoffRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, record: CutoffRecord) {
        self.records
            .write()
            .await
            .insert(record.test_id.clone(), record);
    }
}

#[async_trait]
impl CutoffRepository for InMemoryCutoffRepository {
    async fn find_by_test(&self, test_id: &str) -> AppResult<Option<CutoffRecord>> {
        Ok(self.records.read().await.get(test_id).cloned())
    }
}

pub fn question(id: &str, correct: i32) -> Question {
    Question {
        id: id.to_string(),
        text: format!("Question {}", id),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_option_index: correct,
        explanation: format!("Explanation for {}", id),
        marks: None,
        negative_marks: None,
    }
}

/// Five questions in two sections, +2 / -0.5, live for an hour around `now`.
///
/// Correct options: q-1 → 0, q-2 → 2, q-3 → 1 (Quantitative Aptitude),
/// q-4 → 1, q-5 → 3 (Reasoning).
pub fn scheduled_test(id: &str, now: DateTime<Utc>) -> Test {
    Test {
        id: id.to_string(),
        title: format!("Mock {}", id),
        is_free: false,
        date: Some(now),
        start_time: Some(now - Duration::minutes(30)),
        end_time: Some(now + Duration::minutes(30)),
        result_publish_time: Some(now + Duration::minutes(90)),
        positive_marks: Some(2.0),
        negative_marks: Some(0.5),
        sections: vec![
            Section {
                id: "sec-1".into(),
                title: "Quantitative Aptitude".into(),
                questions: vec![question("q-1", 0), question("q-2", 2), question("q-3", 1)],
            },
            Section {
                id: "sec-2".into(),
                title: "Reasoning".into(),
                questions: vec![question("q-4", 1), question("q-5", 3)],
            },
        ],
    }
}

pub fn answer(section_id: &str, question_id: &str, selected_option: i32) -> SubmitAnswerRequest {
    SubmitAnswerRequest {
        section_id: section_id.to_string(),
        question_id: question_id.to_string(),
        selected_option,
        time_taken: 20,
    }
}

/// (section, question, correct option) for every question of `scheduled_test`.
pub const ANSWER_KEY: [(&str, &str, i32); 5] = [
    ("sec-1", "q-1", 0),
    ("sec-1", "q-2", 2),
    ("sec-1", "q-3", 1),
    ("sec-2", "q-4", 1),
    ("sec-2", "q-5", 3),
];

pub fn opening_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
}

/// Services wired to in-memory storage and a clock the test controls.
pub struct Harness {
    pub state: AppState,
    pub clock: Arc<TestClock>,
    pub catalog: Arc<InMemoryCatalogReader>,
    pub entitlements: Arc<InMemoryEntitlementGate>,
    pub users: Arc<InMemoryUserDirectory>,
    pub attempts: Arc<InMemoryAttemptRepository>,
    pub rankings: Arc<InMemoryRankingRepository>,
    pub cutoffs: Arc<InMemoryCutoffRepository>,
    pub opened_at: DateTime<Utc>,
}

impl Harness {
    pub async fn new() -> Self {
        let opened_at = opening_time();
        let clock = Arc::new(TestClock::new(opened_at));

        let catalog = Arc::new(InMemoryCatalogReader::new());
        catalog
            .insert(TestSeries {
                id: SERIES_ID.to_string(),
                title: "Bank PO Mocks".to_string(),
                is_free: false,
                tests: vec![
                    scheduled_test("test-1", opened_at),
                    scheduled_test("test-2", opened_at),
                    scheduled_test("test-3", opened_at),
                    scheduled_test("test-4", opened_at),
                ],
            })
            .await;

        let entitlements = Arc::new(InMemoryEntitlementGate::new(clock.clone()));
        let users = Arc::new(InMemoryUserDirectory::new());
        let attempts = Arc::new(InMemoryAttemptRepository::new());
        let rankings = Arc::new(InMemoryRankingRepository::new());
        let cutoffs = Arc::new(InMemoryCutoffRepository::new());

        let repositories = Repositories {
            catalog: catalog.clone(),
            entitlements: entitlements.clone(),
            users: users.clone(),
            attempts: attempts.clone(),
            rankings: rankings.clone(),
            cutoffs: cutoffs.clone(),
        };

        let state = AppState::from_repositories(repositories, clock.clone(), Config::from_env());

        Self {
            state,
            clock,
            catalog,
            entitlements,
            users,
            attempts,
            rankings,
            cutoffs,
            opened_at,
        }
    }

    pub async fn attempts_for(&self, user_id: &str, test_id: &str) -> Option<Attempt> {
        self.attempts
            .find_by_user_and_test(user_id, test_id)
            .await
            .unwrap()
    }

    /// Moves the clock past the publish time of every scheduled test.
    pub fn publish_results(&self) {
        self.clock.set(self.opened_at + Duration::minutes(120));
    }

    pub async fn sit_test(
        &self,
        user_id: &str,
        test_id: &str,
        correct: usize,
        wrong: usize,
    ) -> AppResult<Attempt> {
        sit_test(&self.state.attempt_service, user_id, test_id, correct, wrong).await
    }
}

/// Starts `test_id` for `user_id`, answers the first `correct` questions right and the
/// next `wrong` questions wrong, then submits.
pub async fn sit_test(
    service: &AttemptService,
    user_id: &str,
    test_id: &str,
    correct: usize,
    wrong: usize,
) -> AppResult<Attempt> {
    service.start_attempt(user_id, SERIES_ID, test_id).await?;

    for (i, (section, question, right)) in ANSWER_KEY.iter().enumerate().take(correct + wrong) {
        let selected = if i < correct { *right } else { (*right + 1) % 4 };
        service
            .submit_answer(user_id, SERIES_ID, test_id, answer(section, question, selected))
            .await?;
    }

    service.submit_test(user_id, SERIES_ID, test_id).await
}
