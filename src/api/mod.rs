mod args;

pub use args::{
    Cli, CliGoalCategory, Command, DEFAULT_SAVINGS_YEARS, GoalArgs, GrowthArgs,
    MAX_HORIZON_YEARS, MAX_SAVINGS_YEARS, ProjectionArgs, SavingsArgs, ServeArgs,
    build_growth_inputs, build_new_plan, default_goal_args, default_growth_args,
    validate_projection_args, validate_savings_args,
};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::core::{
    Expense, GoalCategory, GoalPlan, InvestmentProjection, LongTermProjection, PlanTimeline,
    SavingsOutlook, SavingsPlan, SavingsResult, compute_savings, long_term_projection,
    plan_timeline, project_growth, savings_outlook, savings_plan,
};
use crate::state::{BudgetState, StateError};
use crate::store::{JsonFileStore, Persistence, StoreError};

const PREVIEW_PLAN_ID: &str = "preview";

#[derive(Clone)]
struct AppState {
    budget: Arc<Mutex<BudgetState>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SavingsPayload {
    income: Option<f64>,
    expenses: Option<Vec<Expense>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    monthly_savings: Option<f64>,
    years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GrowthPayload {
    initial_amount: Option<f64>,
    monthly_contribution: Option<f64>,
    #[serde(alias = "annualReturnPercent")]
    annual_return: Option<f64>,
    #[serde(alias = "horizonYears")]
    years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    name: Option<String>,
    #[serde(alias = "type")]
    category: Option<GoalCategory>,
    target_amount: Option<f64>,
    current_savings: Option<f64>,
    #[serde(alias = "monthlySavings")]
    monthly_contribution: Option<f64>,
    #[serde(alias = "annualReturnPercent", alias = "interestRate")]
    annual_return: Option<f64>,
    #[serde(alias = "downPaymentPercent", alias = "downPaymentPercentage")]
    down_payment: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct IncomePayload {
    income: f64,
}

#[derive(Debug, Deserialize)]
struct NewExpensePayload {
    #[serde(alias = "name")]
    label: String,
    #[serde(default)]
    amount: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExpensePatchPayload {
    #[serde(alias = "name")]
    label: Option<String>,
    amount: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsResponse {
    pub income: f64,
    #[serde(flatten)]
    pub summary: SavingsResult,
    pub outlook: SavingsOutlook,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    pub monthly_savings: f64,
    #[serde(flatten)]
    pub plan: SavingsPlan,
    pub long_term: LongTermProjection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    pub income: f64,
    pub expenses: Vec<Expense>,
    #[serde(flatten)]
    pub summary: SavingsResult,
    pub outlook: SavingsOutlook,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthResponse {
    pub initial_amount: f64,
    pub monthly_contribution: f64,
    pub annual_return_percent: f64,
    pub horizon_years: u32,
    #[serde(flatten)]
    pub projection: InvestmentProjection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    pub plan: GoalPlan,
    #[serde(flatten)]
    pub timeline: PlanTimeline,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn savings_report(income: f64, expenses: &[Expense]) -> SavingsResponse {
    let summary = compute_savings(income, expenses);
    SavingsResponse {
        income,
        summary,
        outlook: savings_outlook(summary.savings),
    }
}

pub fn projection_report(args: &ProjectionArgs) -> Result<ProjectionResponse, String> {
    validate_projection_args(args)?;
    Ok(ProjectionResponse {
        monthly_savings: args.monthly_savings,
        plan: savings_plan(args.monthly_savings, args.years),
        long_term: long_term_projection(args.monthly_savings),
    })
}

pub fn growth_report(args: &GrowthArgs) -> Result<GrowthResponse, String> {
    let inputs = build_growth_inputs(args)?;
    Ok(GrowthResponse {
        initial_amount: inputs.initial_amount,
        monthly_contribution: inputs.monthly_contribution,
        annual_return_percent: inputs.annual_return_percent,
        horizon_years: inputs.horizon_years,
        projection: project_growth(inputs),
    })
}

pub fn goal_report(args: &GoalArgs) -> Result<GoalResponse, String> {
    let plan = build_new_plan(args)?.into_plan(PREVIEW_PLAN_ID.to_string(), Utc::now());
    Ok(goal_response(plan))
}

pub fn open_persistence(args: &ServeArgs) -> Result<Persistence, StoreError> {
    if args.in_memory {
        info!("using in-memory budget store");
        return Ok(Persistence::in_memory());
    }
    let store = JsonFileStore::open(&args.data_file)?;
    info!(path = %store.path().display(), "using json file budget store");
    Ok(Persistence::new(Arc::new(store)))
}

pub fn router(state: BudgetState) -> Router {
    let app = AppState {
        budget: Arc::new(Mutex::new(state)),
    };
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/savings", post(savings_handler))
        .route(
            "/api/savings/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route(
            "/api/growth",
            get(growth_get_handler).post(growth_post_handler),
        )
        .route("/api/goals/timeline", post(goal_timeline_handler))
        .route("/api/budget", get(budget_handler))
        .route("/api/budget/income", put(set_income_handler))
        .route("/api/budget/expenses", post(add_expense_handler))
        .route(
            "/api/budget/expenses/:index",
            patch(update_expense_handler).delete(delete_expense_handler),
        )
        .route(
            "/api/history",
            get(history_handler).post(save_history_handler),
        )
        .route("/api/history/:id", delete(delete_history_handler))
        .route("/api/plans", get(plans_handler).post(create_plan_handler))
        .route(
            "/api/plans/:id",
            get(plan_handler).delete(delete_plan_handler),
        )
        .fallback(not_found_handler)
        .with_state(app)
}

pub async fn run_http_server(port: u16, state: BudgetState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "fipa HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/health");

    axum::serve(listener, router(state)).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn savings_handler(Json(payload): Json<SavingsPayload>) -> Response {
    debug!(?payload, "savings request");
    let income = payload.income.unwrap_or(0.0);
    let expenses = payload.expenses.unwrap_or_default();
    json_response(StatusCode::OK, savings_report(income, &expenses))
}

async fn projection_get_handler(
    State(app): State<AppState>,
    Query(payload): Query<ProjectionPayload>,
) -> Response {
    projection_handler_impl(app, payload).await
}

async fn projection_post_handler(
    State(app): State<AppState>,
    Json(payload): Json<ProjectionPayload>,
) -> Response {
    projection_handler_impl(app, payload).await
}

// Without an explicit amount the projection uses the budget's current monthly savings.
async fn projection_handler_impl(app: AppState, payload: ProjectionPayload) -> Response {
    debug!(?payload, "savings projection request");
    let current_savings = app.budget.lock().await.savings().savings;
    let args = ProjectionArgs {
        monthly_savings: payload.monthly_savings.unwrap_or(current_savings),
        years: payload.years.unwrap_or(DEFAULT_SAVINGS_YEARS),
    };
    match projection_report(&args) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn growth_get_handler(Query(payload): Query<GrowthPayload>) -> Response {
    growth_handler_impl(payload)
}

async fn growth_post_handler(Json(payload): Json<GrowthPayload>) -> Response {
    growth_handler_impl(payload)
}

fn growth_handler_impl(payload: GrowthPayload) -> Response {
    debug!(?payload, "growth request");
    match growth_report(&growth_args_from_payload(payload)) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn goal_timeline_handler(Json(payload): Json<GoalPayload>) -> Response {
    debug!(?payload, "goal timeline request");
    let args = goal_args_from_payload(payload, &default_goal_args().name);
    match goal_report(&args) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn budget_handler(State(app): State<AppState>) -> Response {
    let budget = app.budget.lock().await;
    json_response(StatusCode::OK, budget_response(&budget))
}

async fn set_income_handler(
    State(app): State<AppState>,
    Json(payload): Json<IncomePayload>,
) -> Response {
    let mut budget = app.budget.lock().await;
    match budget.set_income(payload.income) {
        Ok(()) => json_response(StatusCode::OK, budget_response(&budget)),
        Err(err) => state_error_response(err),
    }
}

async fn add_expense_handler(
    State(app): State<AppState>,
    Json(payload): Json<NewExpensePayload>,
) -> Response {
    let mut budget = app.budget.lock().await;
    match budget.add_expense(&payload.label, payload.amount) {
        Ok(()) => json_response(StatusCode::CREATED, budget_response(&budget)),
        Err(err) => state_error_response(err),
    }
}

async fn update_expense_handler(
    State(app): State<AppState>,
    Path(index): Path<usize>,
    Json(payload): Json<ExpensePatchPayload>,
) -> Response {
    let mut budget = app.budget.lock().await;
    let result = apply_expense_patch(&mut budget, index, payload);
    match result {
        Ok(()) => json_response(StatusCode::OK, budget_response(&budget)),
        Err(err) => state_error_response(err),
    }
}

fn apply_expense_patch(
    budget: &mut BudgetState,
    index: usize,
    payload: ExpensePatchPayload,
) -> Result<(), StateError> {
    if index >= budget.snapshot().expenses.len() {
        return Err(StateError::UnknownExpense(index));
    }
    if let Some(label) = payload.label {
        budget.rename_expense(index, &label)?;
    }
    if let Some(amount) = payload.amount {
        budget.update_expense_amount(index, amount)?;
    }
    Ok(())
}

async fn delete_expense_handler(
    State(app): State<AppState>,
    Path(index): Path<usize>,
) -> Response {
    let mut budget = app.budget.lock().await;
    match budget.remove_expense(index) {
        Ok(_) => json_response(StatusCode::OK, budget_response(&budget)),
        Err(err) => state_error_response(err),
    }
}

async fn history_handler(State(app): State<AppState>) -> Response {
    let budget = app.budget.lock().await;
    json_response(StatusCode::OK, budget.history_trends())
}

async fn save_history_handler(State(app): State<AppState>) -> Response {
    let mut budget = app.budget.lock().await;
    match budget.save_snapshot() {
        Ok(entry) => json_response(StatusCode::CREATED, entry),
        Err(err) => state_error_response(err),
    }
}

async fn delete_history_handler(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let mut budget = app.budget.lock().await;
    match budget.delete_history_entry(&id) {
        Ok(entry) => json_response(StatusCode::OK, entry),
        Err(err) => state_error_response(err),
    }
}

async fn plans_handler(State(app): State<AppState>) -> Response {
    let budget = app.budget.lock().await;
    json_response(StatusCode::OK, budget.plans())
}

async fn create_plan_handler(
    State(app): State<AppState>,
    Json(payload): Json<GoalPayload>,
) -> Response {
    let new_plan = match build_new_plan(&goal_args_from_payload(payload, "")) {
        Ok(new_plan) => new_plan,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let mut budget = app.budget.lock().await;
    match budget.create_plan(new_plan) {
        Ok(plan) => json_response(StatusCode::CREATED, goal_response(plan)),
        Err(err) => state_error_response(err),
    }
}

async fn plan_handler(State(app): State<AppState>, Path(id): Path<String>) -> Response {
    let budget = app.budget.lock().await;
    match budget.plan(&id) {
        Some(plan) => json_response(StatusCode::OK, goal_response(plan.clone())),
        None => state_error_response(StateError::UnknownPlan(id)),
    }
}

async fn delete_plan_handler(State(app): State<AppState>, Path(id): Path<String>) -> Response {
    let mut budget = app.budget.lock().await;
    match budget.delete_plan(&id) {
        Ok(plan) => json_response(StatusCode::OK, plan),
        Err(err) => state_error_response(err),
    }
}

fn budget_response(budget: &BudgetState) -> BudgetResponse {
    let snapshot = budget.snapshot();
    let summary = budget.savings();
    BudgetResponse {
        income: snapshot.income,
        expenses: snapshot.expenses.clone(),
        summary,
        outlook: savings_outlook(summary.savings),
    }
}

fn goal_response(plan: GoalPlan) -> GoalResponse {
    let timeline = plan_timeline(&plan);
    GoalResponse { plan, timeline }
}

fn growth_args_from_payload(payload: GrowthPayload) -> GrowthArgs {
    let mut args = default_growth_args();
    if let Some(v) = payload.initial_amount {
        args.initial_amount = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_return {
        args.annual_return = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    args
}

fn goal_args_from_payload(payload: GoalPayload, default_name: &str) -> GoalArgs {
    let mut args = default_goal_args();
    args.name = payload.name.unwrap_or_else(|| default_name.to_string());
    if let Some(v) = payload.category {
        args.category = v.into();
    }
    if let Some(v) = payload.target_amount {
        args.target_amount = v;
    }
    if let Some(v) = payload.current_savings {
        args.current_savings = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_return {
        args.annual_return = v;
    }
    if let Some(v) = payload.down_payment {
        args.down_payment = v;
    }
    args
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn state_error_response(err: StateError) -> Response {
    let status = match &err {
        StateError::MissingExpenseLabel | StateError::MissingPlanName => StatusCode::BAD_REQUEST,
        StateError::UnknownExpense(_)
        | StateError::UnknownHistoryEntry(_)
        | StateError::UnknownPlan(_) => StatusCode::NOT_FOUND,
        StateError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(error = %err, "budget store failure");
    } else {
        warn!(error = %err, "rejected budget request");
    }
    error_response(status, &err.to_string())
}
