//! Holds the filter the user has selected and keeps the displayed list in step with it.
//!
//! Every change of selection turns into at most one request. A fetch is planned first, which
//! validates the selection and hands out a request token, then the response is committed against
//! that token. Only the response to the latest plan is ever committed, so a slow response to an
//! earlier selection cannot overwrite the list of a later one.

use crate::api::{ApiError, ApiResult, Backend};
use crate::model::{
    CompositeFilter, DateRange, Selection, Transaction, TransactionId, TransactionStatus,
    TransactionType, ValidationError,
};
use crate::paginate::{PageError, Paginator};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Shown instead of the list when the service cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str = "Unable to connect to the server. Please try after some time.";
const NETWORK_MESSAGE: &str = "Network error: Please check your internet connection.";
const SERVER_MESSAGE: &str = "Server error: Please try again later.";
const CLIENT_MESSAGE: &str = "Client error: The request could not be processed.";
const UNEXPECTED_MESSAGE: &str = "Unexpected response from the server: Please try again later.";

/// The discriminated cause of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    HttpStatus,
    EmptyResult,
    Validation,
}

serde_plain::derive_display_from_serialize!(FailureKind);

/// What the controller surfaces when a fetch does not produce a list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    Empty(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Api(e) if e.is_network() => FailureKind::Network,
            FetchError::Api(_) => FailureKind::HttpStatus,
            FetchError::Empty(_) => FailureKind::EmptyResult,
            FetchError::Validation(_) => FailureKind::Validation,
        }
    }

    /// The text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Api(ApiError::NotFound(message)) => message.clone(),
            FetchError::Api(ApiError::Server { .. }) => SERVER_MESSAGE.to_string(),
            FetchError::Api(ApiError::Client { .. }) => CLIENT_MESSAGE.to_string(),
            FetchError::Api(ApiError::Http { .. }) | FetchError::Api(ApiError::Decode(_)) => {
                UNEXPECTED_MESSAGE.to_string()
            }
            FetchError::Api(_) => NETWORK_MESSAGE.to_string(),
            FetchError::Empty(message) => message.clone(),
            FetchError::Validation(e) => e.to_string(),
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, FetchError::Api(ApiError::Unreachable(_)))
    }
}

/// One request to the service, derived from a valid selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    History,
    ByType(TransactionType),
    ByStatus(TransactionStatus),
    ByDateRange(DateRange),
    ById(TransactionId),
    Multiple(CompositeFilter),
}

impl Query {
    /// Builds the query for `selection`. `Ok(None)` means the selection is an incomplete date
    /// range and nothing should be fetched yet.
    pub fn from_selection(
        selection: &Selection,
        today: NaiveDate,
    ) -> Result<Option<Query>, ValidationError> {
        let query = match selection {
            Selection::All => Query::History,
            Selection::Type(t) => Query::ByType(*t),
            Selection::Status(s) => Query::ByStatus(*s),
            Selection::Dates {
                start: Some(start),
                end: Some(end),
            } => Query::ByDateRange(DateRange::new(*start, *end, today)?),
            Selection::Dates { .. } => return Ok(None),
            Selection::Id(id) if id.is_empty() => return Err(ValidationError::EmptyId),
            Selection::Id(id) => Query::ById(id.clone()),
            Selection::Composite(filter) => {
                filter.validate(today)?;
                Query::Multiple(*filter)
            }
        };
        Ok(Some(query))
    }

    pub async fn run(&self, backend: &dyn Backend) -> ApiResult<Vec<Transaction>> {
        match self {
            Query::History => backend.history().await,
            Query::ByType(t) => backend.filter_by_type(*t).await,
            Query::ByStatus(s) => backend.filter_by_status(*s).await,
            Query::ByDateRange(range) => backend.filter_by_date_range(range).await,
            Query::ById(id) => backend.by_id(id).await.map(|t| vec![t]),
            Query::Multiple(filter) => backend.filter_by_multiple(filter).await,
        }
    }

    /// The message for an empty result, naming the predicate.
    pub fn empty_message(&self) -> String {
        match self {
            Query::History => "No transactions found".to_string(),
            Query::ByType(t) => format!("No transactions found with the selected {t} type"),
            Query::ByStatus(s) => format!("No transactions found with {s} status"),
            Query::ByDateRange(range) => format!(
                "No transactions found with date ranging from {} to {}",
                range.start(),
                range.end()
            ),
            Query::ById(id) => format!("Transaction with ID {id} not found"),
            Query::Multiple(filter) => format!("No transactions found matching {filter}"),
        }
    }
}

/// A fetch that has been planned and may be run against a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    token: u64,
    query: Query,
}

impl PendingFetch {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub async fn run(&self, backend: &dyn Backend) -> ApiResult<Vec<Transaction>> {
        debug!("Running request {}: {:?}", self.token, self.query);
        self.query.run(backend).await
    }
}

/// The result of planning a fetch for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// The selection is an incomplete date range; nothing is fetched and no error is shown.
    Skip,
    /// The selection is invalid; nothing is fetched and the error is shown.
    Blocked(ValidationError),
    Fetch(PendingFetch),
}

/// What should be displayed for the controller's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    Loading,
    /// The dedicated fallback for an unreachable service.
    Unreachable,
    Error(&'a FetchError),
    Page(&'a Paginator<Transaction>),
}

#[derive(Debug, Clone)]
pub struct FilterController {
    selection: Selection,
    paginator: Paginator<Transaction>,
    loading: bool,
    error: Option<FetchError>,
    latest: u64,
}

impl Default for FilterController {
    fn default() -> Self {
        Self::new(crate::paginate::DEFAULT_PAGE_SIZE)
    }
}

impl FilterController {
    pub fn new(page_size: usize) -> Self {
        Self {
            selection: Selection::All,
            paginator: Paginator::new(page_size),
            loading: false,
            error: None,
            latest: 0,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn paginator(&self) -> &Paginator<Transaction> {
        &self.paginator
    }

    /// The full list currently held, across all pages.
    pub fn transactions(&self) -> &[Transaction] {
        self.paginator.items()
    }

    pub fn select_page(&mut self, page: usize) -> Result<(), PageError> {
        self.paginator.select(page).map(|_| ())
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Validates the current selection and, when it is complete, hands out the next request token.
    /// Every plan supersedes any fetch planned before it, including plans that fetch nothing.
    pub fn plan(&mut self, today: NaiveDate) -> Plan {
        self.latest += 1;
        match Query::from_selection(&self.selection, today) {
            Ok(None) => {
                debug!("Date range is incomplete, not fetching");
                self.loading = false;
                self.error = None;
                Plan::Skip
            }
            Err(e) => {
                info!("Not fetching: {e}");
                self.loading = false;
                self.paginator.clear();
                self.error = Some(FetchError::Validation(e.clone()));
                Plan::Blocked(e)
            }
            Ok(Some(query)) => {
                self.loading = true;
                self.error = None;
                Plan::Fetch(PendingFetch {
                    token: self.latest,
                    query,
                })
            }
        }
    }

    /// Applies the response to `fetch`. Returns false, changing nothing, when a later fetch has been
    /// planned since.
    pub fn commit(&mut self, fetch: &PendingFetch, result: ApiResult<Vec<Transaction>>) -> bool {
        if fetch.token != self.latest {
            debug!(
                "Discarding the response to request {}, the latest is {}",
                fetch.token, self.latest
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(transactions) if transactions.is_empty() => {
                self.paginator.clear();
                self.error = Some(FetchError::Empty(fetch.query.empty_message()));
            }
            Ok(transactions) => {
                debug!("Received {} transactions", transactions.len());
                self.paginator.set_items(transactions);
                self.error = None;
            }
            Err(e) => {
                info!("Fetching transactions failed: {e}");
                self.paginator.clear();
                self.error = Some(FetchError::Api(e));
            }
        }
        true
    }

    /// Fetches the list for the current selection.
    pub async fn refresh(&mut self, backend: &dyn Backend, today: NaiveDate) -> Result<(), FetchError> {
        if let Plan::Fetch(fetch) = self.plan(today) {
            let result = fetch.run(backend).await;
            self.commit(&fetch, result);
        }
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    /// Replaces the selection and fetches for it.
    pub async fn select(
        &mut self,
        backend: &dyn Backend,
        selection: Selection,
        today: NaiveDate,
    ) -> Result<(), FetchError> {
        self.selection = selection;
        self.refresh(backend, today).await
    }

    pub async fn select_type(
        &mut self,
        backend: &dyn Backend,
        transaction_type: TransactionType,
        today: NaiveDate,
    ) -> Result<(), FetchError> {
        self.select(backend, Selection::Type(transaction_type), today)
            .await
    }

    pub async fn select_status(
        &mut self,
        backend: &dyn Backend,
        status: TransactionStatus,
        today: NaiveDate,
    ) -> Result<(), FetchError> {
        self.select(backend, Selection::Status(status), today)
            .await
    }

    pub async fn set_start_date(
        &mut self,
        backend: &dyn Backend,
        start: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<(), FetchError> {
        let selection = self.selection.with_start(start);
        self.select(backend, selection, today).await
    }

    pub async fn set_end_date(
        &mut self,
        backend: &dyn Backend,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<(), FetchError> {
        let selection = self.selection.with_end(end);
        self.select(backend, selection, today).await
    }

    /// Looks up a single transaction by ID.
    pub async fn search(
        &mut self,
        backend: &dyn Backend,
        id: &str,
        today: NaiveDate,
    ) -> Result<(), FetchError> {
        self.select(backend, Selection::Id(TransactionId::new(id)), today)
            .await
    }

    /// Fetches with several axes combined into one request.
    pub async fn apply(
        &mut self,
        backend: &dyn Backend,
        filter: CompositeFilter,
        today: NaiveDate,
    ) -> Result<(), FetchError> {
        self.select(backend, Selection::Composite(filter), today)
            .await
    }

    /// Drops every predicate and restores the full history.
    pub async fn reset(&mut self, backend: &dyn Backend, today: NaiveDate) -> Result<(), FetchError> {
        self.dismiss_error();
        self.select(backend, Selection::All, today).await
    }

    pub fn view(&self) -> View<'_> {
        if self.loading {
            return View::Loading;
        }
        match &self.error {
            Some(e) if e.is_unreachable() => View::Unreachable,
            Some(e) => View::Error(e),
            None => View::Page(&self.paginator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestBackend;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn today() -> NaiveDate {
        d(2024, 10, 15)
    }

    async fn loaded() -> (TestBackend, FilterController) {
        let backend = TestBackend::seeded().unwrap();
        let mut controller = FilterController::default();
        controller.refresh(&backend, today()).await.unwrap();
        (backend, controller)
    }

    #[tokio::test]
    async fn test_initial_history() {
        let (backend, controller) = loaded().await;
        assert_eq!(controller.transactions().len(), 12);
        assert_eq!(controller.paginator().total_pages(), 3);
        assert_eq!(backend.calls(), vec!["history"]);
        assert!(matches!(controller.view(), View::Page(_)));
    }

    #[tokio::test]
    async fn test_start_after_end_does_not_call_the_network() {
        let (backend, mut controller) = loaded().await;
        controller
            .set_start_date(&backend, Some(d(2024, 9, 20)), today())
            .await
            .unwrap();
        let err = controller
            .set_end_date(&backend, Some(d(2024, 9, 10)), today())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Validation);
        assert!(matches!(
            err,
            FetchError::Validation(ValidationError::StartAfterEnd { .. })
        ));
        assert_eq!(backend.calls(), vec!["history"]);
        assert!(controller.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_future_date_is_blocked() {
        let (backend, mut controller) = loaded().await;
        controller
            .set_start_date(&backend, Some(d(2024, 9, 1)), today())
            .await
            .unwrap();
        let err = controller
            .set_end_date(&backend, Some(d(2024, 10, 16)), today())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Validation(ValidationError::FutureDate { .. })
        ));
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_incomplete_range_is_suppressed() {
        let (backend, mut controller) = loaded().await;
        controller
            .set_end_date(&backend, Some(d(2024, 9, 5)), today())
            .await
            .unwrap();
        assert!(controller.error().is_none());
        assert_eq!(controller.transactions().len(), 12);
        controller
            .set_start_date(&backend, Some(d(2024, 9, 1)), today())
            .await
            .unwrap();
        assert_eq!(controller.transactions().len(), 4);
        assert_eq!(
            backend.calls(),
            vec!["history", "filter_by_date_range 2024-09-01 to 2024-09-05"]
        );
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let backend = TestBackend::seeded().unwrap();
        let mut controller = FilterController::default();

        controller.selection = Selection::Type(TransactionType::Upi);
        let Plan::Fetch(first) = controller.plan(today()) else {
            panic!("expected a fetch");
        };
        controller.selection = Selection::Status(TransactionStatus::Failure);
        let Plan::Fetch(second) = controller.plan(today()) else {
            panic!("expected a fetch");
        };
        assert!(second.token() > first.token());

        let second_result = second.run(&backend).await;
        assert!(controller.commit(&second, second_result));
        assert!(!controller.is_loading());

        // the earlier, slower response arrives last
        let first_result = first.run(&backend).await;
        assert!(!controller.commit(&first, first_result));
        assert_eq!(controller.transactions().len(), 3);
        assert!(controller
            .transactions()
            .iter()
            .all(|t| t.status() == TransactionStatus::Failure));
    }

    #[tokio::test]
    async fn test_blocked_selection_supersedes_pending_fetch() {
        let backend = TestBackend::seeded().unwrap();
        let mut controller = FilterController::default();

        controller.selection = Selection::Type(TransactionType::Upi);
        let Plan::Fetch(pending) = controller.plan(today()) else {
            panic!("expected a fetch");
        };
        controller.selection = Selection::Dates {
            start: Some(d(2024, 9, 20)),
            end: Some(d(2024, 9, 10)),
        };
        assert!(matches!(controller.plan(today()), Plan::Blocked(_)));
        assert!(!controller.is_loading());
        assert!(matches!(controller.view(), View::Error(_)));

        let result = pending.run(&backend).await;
        assert!(!controller.commit(&pending, result));
        assert!(matches!(
            controller.error(),
            Some(FetchError::Validation(ValidationError::StartAfterEnd { .. }))
        ));
        assert!(controller.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_skipped_selection_supersedes_pending_fetch() {
        let (backend, mut controller) = loaded().await;

        controller.selection = Selection::Status(TransactionStatus::Failure);
        let Plan::Fetch(pending) = controller.plan(today()) else {
            panic!("expected a fetch");
        };
        controller.selection = Selection::Dates {
            start: Some(d(2024, 9, 1)),
            end: None,
        };
        assert_eq!(controller.plan(today()), Plan::Skip);
        assert!(!controller.is_loading());

        let result = pending.run(&backend).await;
        assert!(!controller.commit(&pending, result));
        assert_eq!(controller.transactions().len(), 12);
    }

    #[tokio::test]
    async fn test_reset_restores_history() {
        let (backend, mut controller) = loaded().await;
        let history = controller.transactions().to_vec();
        controller
            .select_type(&backend, TransactionType::BankTransfer, today())
            .await
            .unwrap();
        assert_eq!(controller.transactions().len(), 5);
        controller.search(&backend, "", today()).await.unwrap_err();
        controller.reset(&backend, today()).await.unwrap();
        assert_eq!(controller.selection(), &Selection::All);
        assert!(controller.error().is_none());
        assert_eq!(controller.transactions(), &history[..]);
    }

    #[tokio::test]
    async fn test_page_resets_on_new_list() {
        let (backend, mut controller) = loaded().await;
        controller.select_page(3).unwrap();
        controller
            .select_type(&backend, TransactionType::Upi, today())
            .await
            .unwrap();
        assert_eq!(controller.paginator().current_page(), 1);
        assert_eq!(controller.paginator().total_pages(), 2);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_changed_history() {
        let (backend, mut controller) = loaded().await;
        controller.select_page(3).unwrap();
        let kept = controller.transactions()[..3].to_vec();
        backend.set_transactions(kept.clone());

        controller.refresh(&backend, today()).await.unwrap();
        assert_eq!(controller.transactions(), &kept[..]);
        assert_eq!(controller.paginator().current_page(), 1);
        assert_eq!(controller.paginator().total_pages(), 1);
    }

    #[tokio::test]
    async fn test_empty_result() {
        let backend = TestBackend::new(Vec::new(), Vec::new());
        let mut controller = FilterController::default();
        let err = controller
            .select_status(&backend, TransactionStatus::Processing, today())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::EmptyResult);
        assert_eq!(
            err.user_message(),
            "No transactions found with Processing status"
        );
    }

    #[tokio::test]
    async fn test_search_not_found() {
        let (backend, mut controller) = loaded().await;
        let err = controller
            .search(&backend, "nonexistent", today())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::HttpStatus);
        assert_eq!(err.user_message(), "Transaction with ID nonexistent not found");
        assert!(controller.transactions().is_empty());

        controller.search(&backend, " 1005 ", today()).await.unwrap();
        assert_eq!(controller.transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_view() {
        let (backend, mut controller) = loaded().await;
        backend.fail_with(ApiError::Unreachable("connection refused".to_string()));
        let err = controller.reset(&backend, today()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Network);
        assert_eq!(controller.view(), View::Unreachable);
        assert!(controller.transactions().is_empty());
        controller.dismiss_error();
        assert!(matches!(controller.view(), View::Page(_)));
    }

    #[tokio::test]
    async fn test_status_messages() {
        let server = FetchError::Api(ApiError::from_status(502, ""));
        assert_eq!(server.user_message(), "Server error: Please try again later.");
        let client = FetchError::Api(ApiError::from_status(422, ""));
        assert_eq!(
            client.user_message(),
            "Client error: The request could not be processed."
        );
        let timeout = FetchError::Api(ApiError::Timeout("slow".to_string()));
        assert_eq!(
            timeout.user_message(),
            "Network error: Please check your internet connection."
        );
        assert!(!timeout.is_unreachable());
    }

    #[tokio::test]
    async fn test_composite_apply() {
        let (backend, mut controller) = loaded().await;
        let filter = CompositeFilter {
            transaction_type: Some(TransactionType::Upi),
            status: Some(TransactionStatus::Success),
            ..Default::default()
        };
        controller.apply(&backend, filter, today()).await.unwrap();
        assert_eq!(controller.transactions().len(), 4);
        assert_eq!(
            backend.calls().last().unwrap(),
            "filter_by_multiple type=UPI, status=Success"
        );
    }
}
