use crate::api::{self, ApiError, Mode};
use crate::commands::Out;
use crate::controller::{FetchError, FilterController, UNREACHABLE_MESSAGE};
use crate::error::{ErrorType, IntoResult};
use crate::model::{CompositeFilter, Selection, Transaction};
use crate::{table, utils, Config, Error, Result};
use serde::Serialize;
use tracing::debug;

const INCOMPLETE_RANGE_MESSAGE: &str =
    "Both --from and --to are needed to filter by date range, nothing was fetched";

/// One page of fetched transactions.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    page: usize,
    total_pages: usize,
    total: usize,
    transactions: Vec<Transaction>,
}

impl Listing {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

/// Fetches the transactions for `selection` and prints page `page`, or the first page.
///
/// # Errors
/// - `Validation` when the selection or the page number is invalid.
/// - `NotFound` when nothing matches.
/// - `Request` when the service fails.
pub async fn history(
    config: Config,
    mode: Mode,
    selection: Selection,
    page: Option<usize>,
) -> Result<Out<Listing>> {
    let backend = api::backend(&config, mode)?;
    let mut controller = FilterController::new(config.page_size());
    controller
        .select(backend.as_ref(), selection, utils::today())
        .await
        .map_err(fetch_failure)?;
    listing(controller, page)
}

/// Fetches the transactions matching every axis of `filter` in one request.
pub async fn filter(
    config: Config,
    mode: Mode,
    filter: CompositeFilter,
    page: Option<usize>,
) -> Result<Out<Listing>> {
    let backend = api::backend(&config, mode)?;
    let mut controller = FilterController::new(config.page_size());
    controller
        .apply(backend.as_ref(), filter, utils::today())
        .await
        .map_err(fetch_failure)?;
    listing(controller, page)
}

fn listing(mut controller: FilterController, page: Option<usize>) -> Result<Out<Listing>> {
    if controller.paginator().is_empty() {
        return Ok(INCOMPLETE_RANGE_MESSAGE.into());
    }
    if let Some(page) = page {
        controller
            .select_page(page)
            .pub_result(ErrorType::Validation)?;
    }
    let paginator = controller.paginator();
    let structure = Listing {
        page: paginator.current_page(),
        total_pages: paginator.total_pages(),
        total: paginator.len(),
        transactions: paginator.current_items().to_vec(),
    };
    Ok(Out::new(table::transaction_page(paginator), structure))
}

/// Converts a fetch failure into an error carrying the message shown to the user.
pub(super) fn fetch_failure(e: FetchError) -> Error {
    let error_type = match &e {
        FetchError::Validation(_) => ErrorType::Validation,
        FetchError::Empty(_) | FetchError::Api(ApiError::NotFound(_)) => ErrorType::NotFound,
        FetchError::Api(_) => ErrorType::Request,
    };
    let message = if e.is_unreachable() {
        UNREACHABLE_MESSAGE.to_string()
    } else {
        e.user_message()
    };
    debug!("Fetch failed ({}): {e}", e.kind());
    let error = if message == e.to_string() {
        Error::new(e)
    } else {
        Error::new(e).context(message)
    };
    error.context(error_type)
}
