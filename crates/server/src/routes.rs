use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use tally_core::interval::bucket_totals;
use tally_core::{summary, CategoryTotal, Flow, Interval, IntervalBucket, Money, Transaction};
use tally_import::{load_statement, StatementError};
use tally_storage::StoreError;

use crate::state::{AppState, Session};

pub type SharedState = Arc<Mutex<AppState>>;

/// Statement uploads are small; anything bigger than this is not a CSV
/// export of a bank statement.
const MAX_STATEMENT_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/statement", post(upload_statement))
        .route("/api/transactions", get(list_transactions))
        .route("/api/transactions/{index}/category", put(set_category))
        .route("/api/categories", get(list_categories).post(add_category))
        .route("/api/recategorize", post(recategorize))
        .route("/api/summary", get(expense_summary))
        .route("/api/intervals", get(interval_totals))
        .route("/api/payments", get(payments))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_STATEMENT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    Statement(StatementError),
    Store(StoreError),
    UnknownCategory(String),
    UnknownFlow(String),
    UnknownTransaction(usize),
    UnknownInterval(i64),
    NoStatement,
}

impl From<StatementError> for ApiError {
    fn from(e: StatementError) -> Self {
        ApiError::Statement(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Statement(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UnknownCategory(_) | ApiError::UnknownTransaction(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::UnknownFlow(_) | ApiError::UnknownInterval(_) => StatusCode::BAD_REQUEST,
            ApiError::NoStatement => StatusCode::CONFLICT,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Statement(e) => format!("error processing file: {e}"),
            ApiError::Store(e) => e.to_string(),
            ApiError::UnknownCategory(name) => format!("Unknown category: {name}"),
            ApiError::UnknownFlow(flow) => format!("Unknown flow: {flow}"),
            ApiError::UnknownTransaction(index) => format!("No transaction at index {index}"),
            ApiError::UnknownInterval(days) => {
                format!("Interval must be one of 5, 7, 10 or 30 days, got {days}")
            }
            ApiError::NoStatement => "No statement loaded".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!("{message}");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// ── Views ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TransactionView {
    pub index: usize,
    pub date: NaiveDate,
    pub details: String,
    pub amount: Money,
    pub flow: Flow,
    pub category: String,
}

impl TransactionView {
    fn new(index: usize, tx: &Transaction) -> Self {
        TransactionView {
            index,
            date: tx.date,
            details: tx.details.clone(),
            amount: tx.amount,
            flow: tx.flow,
            category: tx.category.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatementView {
    pub transactions: Vec<TransactionView>,
    pub debits: usize,
    pub credits: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentsView {
    pub transactions: Vec<TransactionView>,
    pub total: Money,
    pub total_display: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub flow: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IntervalQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddCategoryRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AddCategoryResponse {
    pub added: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetCategoryRequest {
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct SetCategoryResponse {
    pub transaction: TransactionView,
    pub keyword_added: bool,
}

#[derive(Debug, Serialize)]
pub struct RecategorizeResponse {
    pub assigned: usize,
}

fn statement_view(session: &Session) -> StatementView {
    let transactions: Vec<TransactionView> = session
        .transactions()
        .iter()
        .enumerate()
        .map(|(index, tx)| TransactionView::new(index, tx))
        .collect();
    StatementView {
        debits: session.with_flow(Flow::Debit).count(),
        credits: session.with_flow(Flow::Credit).count(),
        transactions,
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Replaces the current session with a freshly parsed and categorized
/// statement. The raw CSV export is the request body.
async fn upload_statement(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<StatementView>, ApiError> {
    let mut state = state.lock().await;
    let transactions = load_statement(body.as_ref(), state.store.categories())?;
    tracing::info!("Statement loaded with {} transactions", transactions.len());

    let session = Session::new(transactions);
    let view = statement_view(&session);
    state.session = Some(session);
    Ok(Json(view))
}

async fn list_transactions(
    State(state): State<SharedState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Vec<TransactionView>>, ApiError> {
    let flow = match &query.flow {
        Some(s) => Some(
            s.parse::<Flow>()
                .map_err(|_| ApiError::UnknownFlow(s.clone()))?,
        ),
        None => None,
    };

    let state = state.lock().await;
    let session = state.session.as_ref().ok_or(ApiError::NoStatement)?;
    let views = session
        .transactions()
        .iter()
        .enumerate()
        .filter(|(_, tx)| flow.is_none_or(|f| tx.flow == f))
        .map(|(index, tx)| TransactionView::new(index, tx))
        .collect();
    Ok(Json(views))
}

async fn list_categories(State(state): State<SharedState>) -> Json<Vec<CategoryView>> {
    let state = state.lock().await;
    let views = state
        .store
        .categories()
        .iter()
        .map(|(name, keywords)| CategoryView {
            name: name.to_string(),
            keywords: keywords.to_vec(),
        })
        .collect();
    Json(views)
}

async fn add_category(
    State(state): State<SharedState>,
    Json(request): Json<AddCategoryRequest>,
) -> Result<Json<AddCategoryResponse>, ApiError> {
    let mut state = state.lock().await;
    let added = state.store.add_category(&request.name)?;
    Ok(Json(AddCategoryResponse { added }))
}

/// The "Apply Changes" path: overrides one row's category and learns the
/// row's details as a keyword of the chosen category. Re-applying the
/// category a row already has is a no-op.
async fn set_category(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
    Json(request): Json<SetCategoryRequest>,
) -> Result<Json<SetCategoryResponse>, ApiError> {
    let mut state = state.lock().await;
    let AppState { store, session } = &mut *state;
    let session = session.as_mut().ok_or(ApiError::NoStatement)?;

    if !store.categories().contains(&request.category) {
        return Err(ApiError::UnknownCategory(request.category));
    }

    let current = session
        .get(index)
        .ok_or(ApiError::UnknownTransaction(index))?;
    if current.category == request.category {
        return Ok(Json(SetCategoryResponse {
            transaction: TransactionView::new(index, current),
            keyword_added: false,
        }));
    }

    let updated = session
        .set_category(index, &request.category)
        .ok_or(ApiError::UnknownTransaction(index))?;
    let keyword_added = store.learn(&request.category, &updated.details)?;

    Ok(Json(SetCategoryResponse {
        transaction: TransactionView::new(index, updated),
        keyword_added,
    }))
}

/// Recompute pass over the loaded table against the current dictionary.
/// Only rows still `Uncategorized` can gain a category; safe to call any
/// number of times.
async fn recategorize(
    State(state): State<SharedState>,
) -> Result<Json<RecategorizeResponse>, ApiError> {
    let mut state = state.lock().await;
    let AppState { store, session } = &mut *state;
    let session = session.as_mut().ok_or(ApiError::NoStatement)?;
    let assigned = session.recategorize(store.categories());
    if assigned > 0 {
        tracing::info!("Recategorize pass assigned {assigned} rows");
    }
    Ok(Json(RecategorizeResponse { assigned }))
}

/// Expense summary: per-category debit totals, largest first. Feeds the
/// summary table and the pie chart.
async fn expense_summary(
    State(state): State<SharedState>,
) -> Result<Json<Vec<CategoryTotal>>, ApiError> {
    let state = state.lock().await;
    let session = state.session.as_ref().ok_or(ApiError::NoStatement)?;
    Ok(Json(summary::category_totals(
        session.with_flow(Flow::Debit),
    )))
}

/// Bar-chart data: debit totals bucketed into fixed day intervals counted
/// from the earliest transaction date.
async fn interval_totals(
    State(state): State<SharedState>,
    Query(query): Query<IntervalQuery>,
) -> Result<Json<Vec<IntervalBucket>>, ApiError> {
    let days = query.days.unwrap_or(5);
    let interval = Interval::from_days(days).ok_or(ApiError::UnknownInterval(days))?;

    let state = state.lock().await;
    let session = state.session.as_ref().ok_or(ApiError::NoStatement)?;
    Ok(Json(bucket_totals(session.with_flow(Flow::Debit), interval)))
}

/// The payments tab: credit transactions and their grand total.
async fn payments(State(state): State<SharedState>) -> Result<Json<PaymentsView>, ApiError> {
    let state = state.lock().await;
    let session = state.session.as_ref().ok_or(ApiError::NoStatement)?;

    let transactions: Vec<TransactionView> = session
        .transactions()
        .iter()
        .enumerate()
        .filter(|(_, tx)| tx.flow == Flow::Credit)
        .map(|(index, tx)| TransactionView::new(index, tx))
        .collect();
    let total = summary::total(session.with_flow(Flow::Credit));

    Ok(Json(PaymentsView {
        transactions,
        total,
        total_display: total.to_string(),
    }))
}
