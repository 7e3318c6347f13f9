// REST API over the store plus the dashboard aggregator.
//
// Handlers are thin: decode the request, validate required parameters,
// call the store/aggregator, encode JSON. Validation failures short-circuit
// with a 400 before any computation; store failures surface as 500 with the
// underlying error text in a details field.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::dashboard::{compute_dashboard, DashboardReport, Month};
use crate::entities::{
    dollars_to_cents, Company, FinancialConnection, Frequency, HoldingAccount, KanbanCard,
    KanbanColumn, MappingRule, NoteEntry, OverheadItem, ProfitCenter, Resource, Rock, RockStatus,
    TeamMember, Transaction,
};
use crate::store;

/// Shared application state: one connection, opened at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Internal(err) => {
                eprintln!("API error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error",
                        "details": err.to_string(),
                    })),
                )
                    .into_response()
            }
        }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn created<T: serde::Serialize>(value: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(value))
}

fn success() -> Json<serde_json::Value> {
    Json(json!({ "success": true }))
}

/// POST bodies may carry either integer cents or a float dollar amount.
fn resolve_amount(amount_cents: Option<i64>, amount: Option<f64>) -> Result<i64, ApiError> {
    match (amount_cents, amount) {
        (Some(cents), _) => Ok(cents),
        (None, Some(dollars)) => Ok(dollars_to_cents(dollars)),
        (None, None) => Err(ApiError::BadRequest(
            "amount_cents or amount required".to_string(),
        )),
    }
}

fn parse_rock_status(s: &str) -> Result<RockStatus, ApiError> {
    match s {
        "active" => Ok(RockStatus::Active),
        "completed" => Ok(RockStatus::Completed),
        other => Err(ApiError::BadRequest(format!(
            "status must be active or completed, got '{}'",
            other
        ))),
    }
}

fn parse_frequency(s: &str) -> Result<Frequency, ApiError> {
    match s {
        "monthly" => Ok(Frequency::Monthly),
        "annual" => Ok(Frequency::Annual),
        other => Err(ApiError::BadRequest(format!(
            "frequency must be monthly or annual, got '{}'",
            other
        ))),
    }
}

// ============================================================================
// Health
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(json!({ "message": "Fishing Poles Dashboard API", "status": "healthy" }))
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Deserialize)]
struct DashboardQuery {
    holding_account_id: Option<String>,
    month: Option<String>,
}

async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<DashboardReport> {
    // Both parameters are required; missing either is a client error and the
    // aggregator is never invoked.
    let (Some(holding), Some(month_str)) = (query.holding_account_id, query.month) else {
        return Err(ApiError::BadRequest(
            "holding_account_id and month required".to_string(),
        ));
    };
    let month = Month::parse(&month_str).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let conn = state.db.lock().unwrap();
    let companies = store::list_active_companies(&conn, &holding)?;
    let profit_centers = store::list_active_profit_centers(&conn, &holding)?;
    let transactions = store::list_transactions_for_month(&conn, &holding, month)?;
    drop(conn);

    let today = chrono::Local::now().date_naive();
    Ok(Json(compute_dashboard(
        &companies,
        &profit_centers,
        &transactions,
        month,
        today,
    )))
}

// ============================================================================
// Holding accounts
// ============================================================================

async fn list_holding_accounts(State(state): State<AppState>) -> ApiResult<Vec<HoldingAccount>> {
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_holding_accounts(&conn)?))
}

#[derive(Deserialize)]
struct CreateHoldingAccount {
    name: Option<String>,
}

async fn create_holding_account(
    State(state): State<AppState>,
    Json(body): Json<CreateHoldingAccount>,
) -> Result<(StatusCode, Json<HoldingAccount>), ApiError> {
    let account = HoldingAccount::new(body.name.unwrap_or_else(|| "My Business".to_string()));
    let conn = state.db.lock().unwrap();
    store::insert_holding_account(&conn, &account)?;
    Ok(created(account))
}

async fn get_holding_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<HoldingAccount> {
    let conn = state.db.lock().unwrap();
    store::get_holding_account(&conn, &id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

#[derive(Deserialize)]
struct RenameHoldingAccount {
    name: String,
}

async fn update_holding_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RenameHoldingAccount>,
) -> ApiResult<HoldingAccount> {
    let conn = state.db.lock().unwrap();
    store::rename_holding_account(&conn, &id, &body.name)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

// ============================================================================
// Companies
// ============================================================================

#[derive(Deserialize)]
struct HoldingFilter {
    holding_account_id: Option<String>,
}

async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<HoldingFilter>,
) -> ApiResult<Vec<Company>> {
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_companies(
        &conn,
        query.holding_account_id.as_deref(),
    )?))
}

#[derive(Deserialize)]
struct CreateCompany {
    holding_account_id: String,
    name: String,
    color: Option<String>,
    display_order: Option<i64>,
}

async fn create_company(
    State(state): State<AppState>,
    Json(body): Json<CreateCompany>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    let conn = state.db.lock().unwrap();
    // New companies land at the end of the display order
    let display_order = match body.display_order {
        Some(order) => order,
        None => store::count_companies(&conn, &body.holding_account_id)?,
    };
    let company = Company::new(body.holding_account_id, body.name, body.color, display_order);
    store::insert_company(&conn, &company)?;
    Ok(created(company))
}

#[derive(Deserialize)]
struct UpdateCompanyBody {
    name: Option<String>,
    color: Option<String>,
    display_order: Option<i64>,
    active: Option<bool>,
}

async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCompanyBody>,
) -> ApiResult<Company> {
    let update = store::CompanyUpdate {
        name: body.name,
        color: body.color,
        display_order: body.display_order,
        active: body.active,
    };
    let conn = state.db.lock().unwrap();
    store::update_company(&conn, &id, &update)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db.lock().unwrap();
    store::soft_delete_company(&conn, &id)?;
    Ok(success())
}

#[derive(Deserialize)]
struct ReorderBody {
    order: Vec<String>,
}

async fn reorder_companies(
    State(state): State<AppState>,
    Json(body): Json<ReorderBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db.lock().unwrap();
    store::reorder_companies(&conn, &body.order)?;
    Ok(success())
}

// ============================================================================
// Profit centers
// ============================================================================

#[derive(Deserialize)]
struct ProfitCenterFilter {
    holding_account_id: Option<String>,
    company_id: Option<String>,
}

async fn list_profit_centers(
    State(state): State<AppState>,
    Query(query): Query<ProfitCenterFilter>,
) -> ApiResult<Vec<ProfitCenter>> {
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_profit_centers(
        &conn,
        query.holding_account_id.as_deref(),
        query.company_id.as_deref(),
    )?))
}

#[derive(Deserialize)]
struct CreateProfitCenter {
    holding_account_id: String,
    company_id: String,
    name: String,
    display_order: Option<i64>,
}

async fn create_profit_center(
    State(state): State<AppState>,
    Json(body): Json<CreateProfitCenter>,
) -> Result<(StatusCode, Json<ProfitCenter>), ApiError> {
    let conn = state.db.lock().unwrap();
    let display_order = match body.display_order {
        Some(order) => order,
        None => store::count_profit_centers(&conn, &body.company_id)?,
    };
    let pc = ProfitCenter::new(
        body.holding_account_id,
        body.company_id,
        body.name,
        display_order,
    );
    store::insert_profit_center(&conn, &pc)?;
    Ok(created(pc))
}

async fn get_profit_center(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ProfitCenter> {
    let conn = state.db.lock().unwrap();
    store::get_profit_center(&conn, &id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

#[derive(Deserialize)]
struct UpdateProfitCenterBody {
    name: Option<String>,
    display_order: Option<i64>,
    active: Option<bool>,
    include_in_projection: Option<bool>,
}

async fn update_profit_center(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProfitCenterBody>,
) -> ApiResult<ProfitCenter> {
    let update = store::ProfitCenterUpdate {
        name: body.name,
        display_order: body.display_order,
        active: body.active,
        include_in_projection: body.include_in_projection,
    };
    let conn = state.db.lock().unwrap();
    store::update_profit_center(&conn, &id, &update)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

async fn delete_profit_center(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db.lock().unwrap();
    store::soft_delete_profit_center(&conn, &id)?;
    Ok(success())
}

async fn reorder_profit_centers(
    State(state): State<AppState>,
    Json(body): Json<ReorderBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db.lock().unwrap();
    store::reorder_profit_centers(&conn, &body.order)?;
    Ok(success())
}

// ============================================================================
// Transactions
// ============================================================================

#[derive(Deserialize)]
struct TransactionFilter {
    holding_account_id: Option<String>,
    profit_center_id: Option<String>,
    month: Option<String>,
}

async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionFilter>,
) -> ApiResult<Vec<Transaction>> {
    let month = match &query.month {
        Some(s) => Some(Month::parse(s).map_err(|e| ApiError::BadRequest(e.to_string()))?),
        None => None,
    };
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_transactions(
        &conn,
        query.holding_account_id.as_deref(),
        query.profit_center_id.as_deref(),
        month,
    )?))
}

#[derive(Deserialize)]
struct CreateTransaction {
    holding_account_id: String,
    profit_center_id: String,
    company_id: String,
    txn_date: String,
    amount_cents: Option<i64>,
    amount: Option<f64>,
    provider: Option<String>,
    description: Option<String>,
    is_projected: Option<bool>,
}

async fn create_transaction(
    State(state): State<AppState>,
    Json(body): Json<CreateTransaction>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let amount_cents = resolve_amount(body.amount_cents, body.amount)?;
    let tx = Transaction::new(
        body.holding_account_id,
        body.profit_center_id,
        body.company_id,
        body.txn_date,
        amount_cents,
        body.provider,
        body.description,
        body.is_projected.unwrap_or(false),
    );
    let conn = state.db.lock().unwrap();
    store::insert_transaction(&conn, &tx)?;
    Ok(created(tx))
}

#[derive(Deserialize)]
struct UpdateTransactionBody {
    txn_date: Option<String>,
    amount_cents: Option<i64>,
    amount: Option<f64>,
    description: Option<String>,
    is_projected: Option<bool>,
    profit_center_id: Option<String>,
    provider: Option<String>,
}

async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTransactionBody>,
) -> ApiResult<Transaction> {
    let amount_cents = match (body.amount_cents, body.amount) {
        (None, None) => None,
        (cents, dollars) => Some(resolve_amount(cents, dollars)?),
    };
    let update = store::TransactionUpdate {
        txn_date: body.txn_date,
        amount_cents,
        description: body.description,
        is_projected: body.is_projected,
        profit_center_id: body.profit_center_id,
        provider: body.provider,
    };
    let conn = state.db.lock().unwrap();
    store::update_transaction(&conn, &id, &update)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db.lock().unwrap();
    store::delete_transaction(&conn, &id)?;
    Ok(success())
}

// ============================================================================
// Notes
// ============================================================================

#[derive(Deserialize)]
struct NoteFilter {
    profit_center_id: Option<String>,
}

async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<NoteFilter>,
) -> ApiResult<Vec<NoteEntry>> {
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_notes(
        &conn,
        query.profit_center_id.as_deref(),
    )?))
}

#[derive(Deserialize)]
struct CreateNote {
    profit_center_id: String,
    text: String,
    created_by: Option<String>,
}

async fn create_note(
    State(state): State<AppState>,
    Json(body): Json<CreateNote>,
) -> Result<(StatusCode, Json<NoteEntry>), ApiError> {
    let note = NoteEntry::new(body.profit_center_id, body.text, body.created_by);
    let conn = state.db.lock().unwrap();
    store::insert_note(&conn, &note)?;
    Ok(created(note))
}

async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db.lock().unwrap();
    store::delete_note(&conn, &id)?;
    Ok(success())
}

// ============================================================================
// Overhead
// ============================================================================

async fn list_overhead(
    State(state): State<AppState>,
    Query(query): Query<NoteFilter>,
) -> ApiResult<Vec<OverheadItem>> {
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_overhead(
        &conn,
        query.profit_center_id.as_deref(),
    )?))
}

#[derive(Deserialize)]
struct CreateOverhead {
    profit_center_id: String,
    name: String,
    amount_cents: Option<i64>,
    amount: Option<f64>,
    frequency: Option<String>,
    note: Option<String>,
}

async fn create_overhead(
    State(state): State<AppState>,
    Json(body): Json<CreateOverhead>,
) -> Result<(StatusCode, Json<OverheadItem>), ApiError> {
    let amount_cents = resolve_amount(body.amount_cents, body.amount)?;
    let frequency = match body.frequency.as_deref() {
        Some(s) => parse_frequency(s)?,
        None => Frequency::Monthly,
    };
    let item = OverheadItem::new(
        body.profit_center_id,
        body.name,
        amount_cents,
        frequency,
        body.note,
    );
    let conn = state.db.lock().unwrap();
    store::insert_overhead(&conn, &item)?;
    Ok(created(item))
}

#[derive(Deserialize)]
struct UpdateOverheadBody {
    name: Option<String>,
    amount_cents: Option<i64>,
    amount: Option<f64>,
    frequency: Option<String>,
    note: Option<String>,
}

async fn update_overhead(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateOverheadBody>,
) -> ApiResult<OverheadItem> {
    let amount_cents = match (body.amount_cents, body.amount) {
        (None, None) => None,
        (cents, dollars) => Some(resolve_amount(cents, dollars)?),
    };
    let frequency = match body.frequency.as_deref() {
        Some(s) => Some(parse_frequency(s)?),
        None => None,
    };
    let update = store::OverheadUpdate {
        name: body.name,
        amount_cents,
        frequency,
        note: body.note,
    };
    let conn = state.db.lock().unwrap();
    store::update_overhead(&conn, &id, &update)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

async fn delete_overhead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db.lock().unwrap();
    store::delete_overhead(&conn, &id)?;
    Ok(success())
}

// ============================================================================
// Connections & mapping rules (stubs persisted, integrations not implemented)
// ============================================================================

async fn list_connections(
    State(state): State<AppState>,
    Query(query): Query<HoldingFilter>,
) -> ApiResult<Vec<FinancialConnection>> {
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_connections(
        &conn,
        query.holding_account_id.as_deref(),
    )?))
}

#[derive(Deserialize)]
struct CreateConnection {
    holding_account_id: String,
    provider: String,
}

async fn create_connection(
    State(state): State<AppState>,
    Json(body): Json<CreateConnection>,
) -> Result<(StatusCode, Json<FinancialConnection>), ApiError> {
    if crate::providers::Provider::from_str(&body.provider).is_none() {
        return Err(ApiError::BadRequest(format!(
            "Unknown provider: {}",
            body.provider
        )));
    }
    let connection = FinancialConnection::new(body.holding_account_id, body.provider);
    let conn = state.db.lock().unwrap();
    store::insert_connection(&conn, &connection)?;
    Ok(created(connection))
}

async fn list_mapping_rules(
    State(state): State<AppState>,
    Query(query): Query<HoldingFilter>,
) -> ApiResult<Vec<MappingRule>> {
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_mapping_rules(
        &conn,
        query.holding_account_id.as_deref(),
    )?))
}

#[derive(Deserialize)]
struct CreateMappingRule {
    holding_account_id: String,
    provider: String,
    match_type: String,
    match_value: String,
    profit_center_id: String,
    priority: Option<i64>,
}

async fn create_mapping_rule(
    State(state): State<AppState>,
    Json(body): Json<CreateMappingRule>,
) -> Result<(StatusCode, Json<MappingRule>), ApiError> {
    if !crate::entities::MATCH_TYPES.contains(&body.match_type.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Unknown match_type: {}",
            body.match_type
        )));
    }
    let rule = MappingRule::new(
        body.holding_account_id,
        body.provider,
        body.match_type,
        body.match_value,
        body.profit_center_id,
        body.priority.unwrap_or(0),
    );
    let conn = state.db.lock().unwrap();
    store::insert_mapping_rule(&conn, &rule)?;
    Ok(created(rule))
}

// ============================================================================
// Team
// ============================================================================

async fn list_team(
    State(state): State<AppState>,
    Query(query): Query<HoldingFilter>,
) -> ApiResult<Vec<TeamMember>> {
    let Some(holding) = query.holding_account_id else {
        return Err(ApiError::BadRequest(
            "holding_account_id required".to_string(),
        ));
    };
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_team_members(&conn, &holding)?))
}

#[derive(Deserialize)]
struct CreateTeamMember {
    holding_account_id: String,
    name: String,
    role: Option<String>,
}

async fn create_team_member(
    State(state): State<AppState>,
    Json(body): Json<CreateTeamMember>,
) -> Result<(StatusCode, Json<TeamMember>), ApiError> {
    let member = TeamMember::new(body.holding_account_id, body.name, body.role);
    let conn = state.db.lock().unwrap();
    store::insert_team_member(&conn, &member)?;
    Ok(created(member))
}

async fn delete_team_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db.lock().unwrap();
    store::delete_team_member(&conn, &id)?;
    Ok(success())
}

// ============================================================================
// Kanban
// ============================================================================

#[derive(Deserialize)]
struct InitBoard {
    holding_account_id: String,
}

async fn init_board(
    State(state): State<AppState>,
    Json(body): Json<InitBoard>,
) -> ApiResult<Vec<KanbanColumn>> {
    let conn = state.db.lock().unwrap();
    Ok(Json(store::init_board(&conn, &body.holding_account_id)?))
}

async fn list_columns(
    State(state): State<AppState>,
    Query(query): Query<HoldingFilter>,
) -> ApiResult<Vec<KanbanColumn>> {
    let Some(holding) = query.holding_account_id else {
        return Err(ApiError::BadRequest(
            "holding_account_id required".to_string(),
        ));
    };
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_columns(&conn, &holding)?))
}

#[derive(Deserialize)]
struct CreateColumn {
    holding_account_id: String,
    title: String,
    color: Option<String>,
}

async fn create_column(
    State(state): State<AppState>,
    Json(body): Json<CreateColumn>,
) -> Result<(StatusCode, Json<KanbanColumn>), ApiError> {
    let conn = state.db.lock().unwrap();
    let display_order = store::list_columns(&conn, &body.holding_account_id)?.len() as i64;
    let column = KanbanColumn::new(body.holding_account_id, body.title, body.color, display_order);
    store::insert_column(&conn, &column)?;
    Ok(created(column))
}

#[derive(Deserialize)]
struct UpdateColumnBody {
    title: Option<String>,
    color: Option<String>,
    display_order: Option<i64>,
}

async fn update_column(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateColumnBody>,
) -> ApiResult<KanbanColumn> {
    let update = store::ColumnUpdate {
        title: body.title,
        color: body.color,
        display_order: body.display_order,
    };
    let conn = state.db.lock().unwrap();
    store::update_column(&conn, &id, &update)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

async fn delete_column(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db.lock().unwrap();
    store::delete_column(&conn, &id)?;
    Ok(success())
}

#[derive(Deserialize)]
struct CardFilter {
    holding_account_id: Option<String>,
    profit_center_id: Option<String>,
    completed: Option<bool>,
}

async fn list_cards(
    State(state): State<AppState>,
    Query(query): Query<CardFilter>,
) -> ApiResult<Vec<KanbanCard>> {
    let Some(holding) = query.holding_account_id else {
        return Err(ApiError::BadRequest(
            "holding_account_id required".to_string(),
        ));
    };
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_cards(
        &conn,
        &holding,
        query.profit_center_id.as_deref(),
        query.completed,
    )?))
}

#[derive(Deserialize)]
struct CreateCard {
    holding_account_id: String,
    profit_center_id: Option<String>,
    column_id: String,
    title: String,
}

async fn create_card(
    State(state): State<AppState>,
    Json(body): Json<CreateCard>,
) -> Result<(StatusCode, Json<KanbanCard>), ApiError> {
    let conn = state.db.lock().unwrap();
    // New cards land at the bottom of their column
    let display_order = store::count_cards_in_column(&conn, &body.column_id)?;
    let card = KanbanCard::new(
        body.holding_account_id,
        body.profit_center_id,
        body.column_id,
        body.title,
        display_order,
    );
    store::insert_card(&conn, &card)?;
    Ok(created(card))
}

#[derive(Deserialize)]
struct UpdateCardBody {
    title: Option<String>,
    description: Option<String>,
    amount_cents: Option<i64>,
    amount: Option<f64>,
    due_date: Option<String>,
    priority: Option<String>,
    profit_center_id: Option<String>,
    completed: Option<bool>,
}

async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCardBody>,
) -> ApiResult<KanbanCard> {
    let amount_cents = match (body.amount_cents, body.amount) {
        (None, None) => None,
        (cents, dollars) => Some(resolve_amount(cents, dollars)?),
    };
    let update = store::CardUpdate {
        title: body.title,
        description: body.description,
        amount_cents,
        due_date: body.due_date,
        priority: body.priority,
        profit_center_id: body.profit_center_id,
        completed: body.completed,
    };
    let conn = state.db.lock().unwrap();
    store::update_card(&conn, &id, &update)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db.lock().unwrap();
    store::delete_card(&conn, &id)?;
    Ok(success())
}

#[derive(Deserialize)]
struct MoveCard {
    card_id: String,
    column_id: String,
    new_order: i64,
}

async fn move_card(
    State(state): State<AppState>,
    Json(body): Json<MoveCard>,
) -> ApiResult<KanbanCard> {
    let conn = state.db.lock().unwrap();
    store::move_card(&conn, &body.card_id, &body.column_id, body.new_order)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

// ============================================================================
// Rocks
// ============================================================================

#[derive(Deserialize)]
struct RockFilter {
    holding_account_id: Option<String>,
    status: Option<String>,
    profit_center_id: Option<String>,
    company_id: Option<String>,
}

async fn list_rocks(
    State(state): State<AppState>,
    Query(query): Query<RockFilter>,
) -> ApiResult<Vec<Rock>> {
    let Some(holding) = query.holding_account_id else {
        return Err(ApiError::BadRequest(
            "holding_account_id required".to_string(),
        ));
    };
    let status = match query.status.as_deref() {
        Some(s) => Some(parse_rock_status(s)?),
        None => None,
    };
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_rocks(
        &conn,
        &holding,
        status,
        query.profit_center_id.as_deref(),
        query.company_id.as_deref(),
    )?))
}

#[derive(Deserialize)]
struct CreateRock {
    holding_account_id: String,
    profit_center_id: Option<String>,
    company_id: Option<String>,
    title: String,
    description: Option<String>,
    owner_id: Option<String>,
    due_date: Option<String>,
}

async fn create_rock(
    State(state): State<AppState>,
    Json(body): Json<CreateRock>,
) -> Result<(StatusCode, Json<Rock>), ApiError> {
    let mut rock = Rock::new(
        body.holding_account_id,
        body.profit_center_id,
        body.company_id,
        body.title,
    );
    rock.description = body.description;
    rock.owner_id = body.owner_id;
    rock.due_date = body.due_date;
    let conn = state.db.lock().unwrap();
    store::insert_rock(&conn, &rock)?;
    Ok(created(rock))
}

#[derive(Deserialize)]
struct UpdateRockBody {
    title: Option<String>,
    description: Option<String>,
    owner_id: Option<String>,
    due_date: Option<String>,
    status: Option<String>,
    profit_center_id: Option<String>,
    company_id: Option<String>,
}

async fn update_rock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateRockBody>,
) -> ApiResult<Rock> {
    let status = match body.status.as_deref() {
        Some(s) => Some(parse_rock_status(s)?),
        None => None,
    };
    let update = store::RockUpdate {
        title: body.title,
        description: body.description,
        owner_id: body.owner_id,
        due_date: body.due_date,
        status,
        profit_center_id: body.profit_center_id,
        company_id: body.company_id,
    };
    let conn = state.db.lock().unwrap();
    store::update_rock(&conn, &id, &update)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

async fn delete_rock(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db.lock().unwrap();
    store::delete_rock(&conn, &id)?;
    Ok(success())
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Deserialize)]
struct ResourceFilter {
    holding_account_id: Option<String>,
    scope_type: Option<String>,
    scope_id: Option<String>,
}

async fn list_resources(
    State(state): State<AppState>,
    Query(query): Query<ResourceFilter>,
) -> ApiResult<Vec<Resource>> {
    let Some(holding) = query.holding_account_id else {
        return Err(ApiError::BadRequest(
            "holding_account_id required".to_string(),
        ));
    };
    let conn = state.db.lock().unwrap();
    Ok(Json(store::list_resources(
        &conn,
        &holding,
        query.scope_type.as_deref(),
        query.scope_id.as_deref(),
    )?))
}

#[derive(Deserialize)]
struct CreateResource {
    holding_account_id: String,
    scope_type: String,
    scope_id: String,
    title: Option<String>,
    url: String,
}

async fn create_resource(
    State(state): State<AppState>,
    Json(body): Json<CreateResource>,
) -> Result<(StatusCode, Json<Resource>), ApiError> {
    // Untitled links fall back to showing the URL itself
    let title = body.title.unwrap_or_else(|| body.url.clone());
    let resource = Resource::new(
        body.holding_account_id,
        body.scope_type,
        body.scope_id,
        title,
        body.url,
    );
    let conn = state.db.lock().unwrap();
    store::insert_resource(&conn, &resource)?;
    Ok(created(resource))
}

async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db.lock().unwrap();
    store::delete_resource(&conn, &id)?;
    Ok(success())
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route(
            "/holding-accounts",
            get(list_holding_accounts).post(create_holding_account),
        )
        .route(
            "/holding-accounts/:id",
            get(get_holding_account).put(update_holding_account),
        )
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/reorder", post(reorder_companies))
        .route(
            "/companies/:id",
            axum::routing::put(update_company).delete(delete_company),
        )
        .route(
            "/profit-centers",
            get(list_profit_centers).post(create_profit_center),
        )
        .route("/profit-centers/reorder", post(reorder_profit_centers))
        .route(
            "/profit-centers/:id",
            get(get_profit_center)
                .put(update_profit_center)
                .delete(delete_profit_center),
        )
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/transactions/:id",
            axum::routing::put(update_transaction).delete(delete_transaction),
        )
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/:id", axum::routing::delete(delete_note))
        .route("/overhead", get(list_overhead).post(create_overhead))
        .route(
            "/overhead/:id",
            axum::routing::put(update_overhead).delete(delete_overhead),
        )
        .route(
            "/connections",
            get(list_connections).post(create_connection),
        )
        .route(
            "/mapping-rules",
            get(list_mapping_rules).post(create_mapping_rule),
        )
        .route("/team", get(list_team).post(create_team_member))
        .route("/team/:id", axum::routing::delete(delete_team_member))
        .route("/kanban/init", post(init_board))
        .route("/kanban/columns", get(list_columns).post(create_column))
        .route(
            "/kanban/columns/:id",
            axum::routing::put(update_column).delete(delete_column),
        )
        .route("/kanban/cards", get(list_cards).post(create_card))
        .route("/kanban/cards/move", post(move_card))
        .route(
            "/kanban/cards/:id",
            axum::routing::put(update_card).delete(delete_card),
        )
        .route("/rocks", get(list_rocks).post(create_rock))
        .route(
            "/rocks/:id",
            axum::routing::put(update_rock).delete(delete_rock),
        )
        .route("/resources", get(list_resources).post(create_resource))
        .route("/resources/:id", axum::routing::delete(delete_resource))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn test_app() -> Router {
        let conn = crate::store::open_in_memory().unwrap();
        router(AppState::new(conn))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_app().oneshot(get_request("/api/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_dashboard_requires_both_parameters() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(get_request("/api/dashboard?month=2024-02"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "holding_account_id and month required");

        let response = app
            .clone()
            .oneshot(get_request("/api/dashboard?holding_account_id=ha-1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(get_request(
                "/api/dashboard?holding_account_id=ha-1&month=2024-13",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dashboard_end_to_end_past_month() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/companies",
                serde_json::json!({ "holding_account_id": "ha-1", "name": "Acme" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let company = body_json(response).await;

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/profit-centers",
                serde_json::json!({
                    "holding_account_id": "ha-1",
                    "company_id": company["id"],
                    "name": "Retail"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let pc = body_json(response).await;

        // One actual and one projected transaction in a long-past month
        for (cents, projected) in [(15000, false), (5000, true)] {
            let response = app
                .clone()
                .oneshot(post_json(
                    "/api/transactions",
                    serde_json::json!({
                        "holding_account_id": "ha-1",
                        "profit_center_id": pc["id"],
                        "company_id": company["id"],
                        "txn_date": "2020-11-05",
                        "amount_cents": cents,
                        "is_projected": projected
                    }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(get_request(
                "/api/dashboard?holding_account_id=ha-1&month=2020-11",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;

        assert_eq!(report["month"], "2020-11");
        assert_eq!(report["days_in_month"], 30);
        assert_eq!(report["day_of_month"], 30);
        assert_eq!(report["is_current_month"], false);
        assert_eq!(report["grand_mtd"], 15000);
        assert_eq!(report["grand_projection"], 15000);
        assert_eq!(report["daily_totals"]["2020-11-05"], 15000);
        assert_eq!(report["daily_projected_totals"]["2020-11-05"], 5000);
        assert_eq!(report["companies"][0]["profit_centers"][0]["mtd"], 15000);
        assert_eq!(report["profit_centers"][0]["company_name"], "Acme");
    }

    #[tokio::test]
    async fn test_transaction_accepts_dollar_amount() {
        let app = test_app();
        let response = app
            .oneshot(post_json(
                "/api/transactions",
                serde_json::json!({
                    "holding_account_id": "ha-1",
                    "profit_center_id": "pc-1",
                    "company_id": "co-1",
                    "txn_date": "2024-02-01",
                    "amount": 123.45
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let tx = body_json(response).await;
        assert_eq!(tx["amount_cents"], 12345);
        assert_eq!(tx["provider"], "manual");
    }

    #[tokio::test]
    async fn test_transaction_without_amount_is_rejected() {
        let app = test_app();
        let response = app
            .oneshot(post_json(
                "/api/transactions",
                serde_json::json!({
                    "holding_account_id": "ha-1",
                    "profit_center_id": "pc-1",
                    "company_id": "co-1",
                    "txn_date": "2024-02-01"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_entity_returns_404() {
        let app = test_app();
        let response = app
            .oneshot(get_request("/api/profit-centers/nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Not found");
    }

    #[tokio::test]
    async fn test_connection_rejects_unknown_provider() {
        let app = test_app();
        let response = app
            .oneshot(post_json(
                "/api/connections",
                serde_json::json!({ "holding_account_id": "ha-1", "provider": "paypal" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_kanban_init_and_move() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/kanban/init",
                serde_json::json!({ "holding_account_id": "ha-1" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let columns = body_json(response).await;
        assert_eq!(columns.as_array().unwrap().len(), 3);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/kanban/cards",
                serde_json::json!({
                    "holding_account_id": "ha-1",
                    "column_id": columns[0]["id"],
                    "title": "Order new stock"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let card = body_json(response).await;

        let response = app
            .oneshot(post_json(
                "/api/kanban/cards/move",
                serde_json::json!({
                    "card_id": card["id"],
                    "column_id": columns[2]["id"],
                    "new_order": 0
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let moved = body_json(response).await;
        assert_eq!(moved["column_id"], columns[2]["id"]);
    }
}
