//! HTTP API server for the Bondsman node.
//!
//! REST endpoints for node status, the bond lifecycle, and the fee ledger.
//! The caller's identity travels in the request; authenticating it is left
//! to whatever sits in front of the node.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bondsman_core::{Amount, BondClosed, BondError, BondId, BondView, Identity};
use bondsman_ledger::LedgerError;
use bondsman_registry::RegistryError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::state::NodeState;

// --- Request types ---

#[derive(Deserialize)]
pub struct CreateBondRequest {
    pub actor: String,
    pub name: String,
    pub amount: Amount,
    pub second_party: String,
}

#[derive(Deserialize)]
pub struct ActorRequest {
    pub actor: String,
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub actor: String,
    /// Value tendered with the confirmation. Omitted means zero.
    #[serde(default)]
    pub value: Amount,
}

#[derive(Deserialize)]
pub struct LedgerQuery {
    pub actor: String,
}

// --- Response types ---

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub uptime_secs: u64,
    pub bond_count: usize,
    pub arbiter: String,
    pub fee_percent: u8,
    pub min_amount: Amount,
    pub rail_id: String,
}

#[derive(Serialize)]
pub struct CreateBondResponse {
    pub id: BondId,
}

#[derive(Serialize)]
pub struct BondsResponse {
    pub bonds: Vec<BondView>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct LedgerResponse {
    pub escrowed: Amount,
    pub accrued_fees: Amount,
    pub custodial_balance: Amount,
}

#[derive(Serialize)]
pub struct WithdrawResponse {
    pub amount: Amount,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn status_for(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::Bond(e) => match e {
            BondError::NotFound(_) => StatusCode::NOT_FOUND,
            BondError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            BondError::InvalidIdentity(_)
            | BondError::InvalidName
            | BondError::AmountBelowMinimum { .. }
            | BondError::InvalidSecondParty(_)
            | BondError::WrongAmount { .. }
            | BondError::UnexpectedValue(_)
            | BondError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            BondError::AlreadySigned
            | BondError::NotSigned
            | BondError::AlreadyValidated
            | BondError::NotValidated
            | BondError::AlreadyConfirmed(_)
            | BondError::ConfirmationMissing(_)
            | BondError::AlreadyCompleted => StatusCode::CONFLICT,
            BondError::IdsExhausted => StatusCode::INTERNAL_SERVER_ERROR,
        },
        RegistryError::Ledger(e) => match e {
            LedgerError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            LedgerError::TransferRejected { .. } => StatusCode::BAD_GATEWAY,
            LedgerError::InsufficientCustody { .. }
            | LedgerError::Journal(_)
            | LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        RegistryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(err: RegistryError) -> ApiError {
    (
        status_for(&err),
        Json(ErrorResponse {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }),
    )
}

/// Run a value-moving operation on its own task so a dropped connection
/// cannot cancel it halfway.
async fn detached<T, F>(op: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, RegistryError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(op).await {
        Ok(result) => result.map_err(api_error),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("operation task failed: {e}"),
                kind: "Internal".into(),
            }),
        )),
    }
}

// --- Handlers ---

async fn handle_status(State(state): State<Arc<NodeState>>) -> Json<StatusResponse> {
    let config = state.engine.config();
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        bond_count: state.engine.bond_count(),
        arbiter: config.arbiter.to_string(),
        fee_percent: config.fee_percent,
        min_amount: config.min_amount,
        rail_id: state.engine.ledger().rail_id().to_string(),
    })
}

async fn handle_create_bond(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<CreateBondRequest>,
) -> Result<(StatusCode, Json<CreateBondResponse>), ApiError> {
    let id = state
        .engine
        .create_bond(
            &Identity::from(req.actor.as_str()),
            &req.name,
            req.amount,
            &Identity::from(req.second_party.as_str()),
        )
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(CreateBondResponse { id })))
}

async fn handle_list_bonds(State(state): State<Arc<NodeState>>) -> Json<BondsResponse> {
    let bonds = state.engine.list_bonds().await;
    let count = bonds.len();
    Json(BondsResponse { bonds, count })
}

async fn handle_view_bond(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<u64>,
) -> ApiResult<BondView> {
    let view = state.engine.view_bond(BondId(id)).await.map_err(api_error)?;
    Ok(Json(view))
}

async fn handle_sign_bond(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<u64>,
    Json(req): Json<ActorRequest>,
) -> ApiResult<BondView> {
    let actor = Identity::from(req.actor.as_str());
    let view = state
        .engine
        .sign_bond(BondId(id), &actor)
        .await
        .map_err(api_error)?;
    Ok(Json(view))
}

async fn handle_validate_bond(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<u64>,
    Json(req): Json<ActorRequest>,
) -> ApiResult<BondView> {
    let actor = Identity::from(req.actor.as_str());
    let view = state
        .engine
        .validate_bond(BondId(id), &actor)
        .await
        .map_err(api_error)?;
    Ok(Json(view))
}

async fn handle_confirm(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<u64>,
    Json(req): Json<ConfirmRequest>,
) -> ApiResult<BondView> {
    let actor = Identity::from(req.actor.as_str());
    let engine = state.engine.clone();
    let view = detached(async move { engine.confirm(BondId(id), &actor, req.value).await }).await?;
    Ok(Json(view))
}

async fn handle_close_bond(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<u64>,
    Json(req): Json<ActorRequest>,
) -> ApiResult<BondClosed> {
    let actor = Identity::from(req.actor.as_str());
    let engine = state.engine.clone();
    let closed = detached(async move { engine.close_bond(BondId(id), &actor).await }).await?;
    Ok(Json(closed))
}

async fn handle_ledger(
    State(state): State<Arc<NodeState>>,
    Query(query): Query<LedgerQuery>,
) -> ApiResult<LedgerResponse> {
    let actor = Identity::from(query.actor.as_str());
    let summary = state
        .engine
        .ledger_summary(&actor)
        .await
        .map_err(api_error)?;
    Ok(Json(LedgerResponse {
        escrowed: summary.escrowed,
        accrued_fees: summary.accrued_fees,
        custodial_balance: summary.custodial_balance(),
    }))
}

async fn handle_withdraw(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<ActorRequest>,
) -> ApiResult<WithdrawResponse> {
    let actor = Identity::from(req.actor.as_str());
    let engine = state.engine.clone();
    let amount = detached(async move { engine.withdraw_fees(&actor).await }).await?;
    Ok(Json(WithdrawResponse { amount }))
}

// --- Server ---

pub fn build_router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/bonds", post(handle_create_bond).get(handle_list_bonds))
        .route("/api/v1/bonds/{id}", get(handle_view_bond))
        .route("/api/v1/bonds/{id}/sign", post(handle_sign_bond))
        .route("/api/v1/bonds/{id}/validate", post(handle_validate_bond))
        .route("/api/v1/bonds/{id}/confirm", post(handle_confirm))
        .route("/api/v1/bonds/{id}/close", post(handle_close_bond))
        .route("/api/v1/ledger", get(handle_ledger))
        .route("/api/v1/ledger/withdraw", post(handle_withdraw))
        .with_state(state)
}

pub async fn start_api_server(
    listen_addr: SocketAddr,
    state: Arc<NodeState>,
) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
