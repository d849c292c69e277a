use crate::config::Config;
use crate::draft::ProposalDraft;
use crate::errors::{AppError, ResultExt};
use crate::messaging::MessageSender;
use crate::models::*;
use crate::pipeline::{stage_transition, stage_update_message, LeadSummary};
use crate::proposal::{build_acceptance_link, format_proposal};
use crate::simulation::compute_operation;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use moka::future::Cache;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Draft of one session, locked while it is mutated or sent.
pub type SharedDraft = Arc<Mutex<ProposalDraft>>;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Outbound messaging collaborator (WhatsApp in production).
    pub sender: Arc<dyn MessageSender>,
    /// Proposal drafts keyed by session id. Idle drafts expire after
    /// `config.draft_ttl_secs`.
    pub drafts: Cache<Uuid, SharedDraft>,
}

impl AppState {
    pub fn new(config: Config, sender: Arc<dyn MessageSender>) -> Self {
        let drafts = Cache::builder()
            .time_to_idle(Duration::from_secs(config.draft_ttl_secs))
            .max_capacity(10_000)
            .build();

        Self {
            config,
            sender,
            drafts,
        }
    }

    async fn draft(&self, session_id: Uuid) -> Result<SharedDraft, AppError> {
        self.drafts
            .get(&session_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Draft {} not found", session_id)))
    }

    fn acceptance_link(&self) -> Result<String, AppError> {
        build_acceptance_link(
            &self.config.acceptance_number,
            &self.config.acceptance_message,
        )
    }
}

/// Routes under `/api/v1`. Middleware is layered on by the caller.
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/simulations", post(simulate))
        .route("/api/v1/drafts", post(create_draft))
        .route(
            "/api/v1/drafts/:session_id",
            get(get_draft).delete(discard_draft),
        )
        .route("/api/v1/drafts/:session_id/operations", post(add_operation))
        .route(
            "/api/v1/drafts/:session_id/operations/:index",
            delete(remove_operation),
        )
        .route("/api/v1/drafts/:session_id/preview", get(preview_proposal))
        .route("/api/v1/drafts/:session_id/send", post(send_proposal))
        .route(
            "/api/v1/leads/stage-notifications",
            post(notify_stage_change),
        )
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "crm-consignado-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/simulations
///
/// Computes one operation without touching any draft.
pub async fn simulate(Json(entry): Json<OperationEntry>) -> Result<Json<ComputedOperation>, AppError> {
    let operation = compute_operation(&entry)?;
    Ok(Json(operation))
}

/// POST /api/v1/drafts
///
/// Opens an empty proposal draft and returns its session id.
pub async fn create_draft(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DraftCreatedResponse>) {
    let session_id = Uuid::new_v4();
    state
        .drafts
        .insert(session_id, Arc::new(Mutex::new(ProposalDraft::new())))
        .await;

    tracing::info!("Opened proposal draft {}", session_id);
    (
        StatusCode::CREATED,
        Json(DraftCreatedResponse { session_id }),
    )
}

/// GET /api/v1/drafts/:session_id
pub async fn get_draft(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<DraftResponse>, AppError> {
    let handle = state.draft(session_id).await?;
    let draft = handle.lock().await;
    Ok(Json(draft_response(session_id, &draft)))
}

/// DELETE /api/v1/drafts/:session_id
///
/// Discards every operation; the session stays open.
pub async fn discard_draft(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let handle = state.draft(session_id).await?;
    handle.lock().await.clear();

    tracing::info!("Discarded proposal draft {}", session_id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/drafts/:session_id/operations
///
/// Computes the entry and appends it. Invalid entries are rejected with 422
/// and the draft is left as it was.
pub async fn add_operation(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(entry): Json<OperationEntry>,
) -> Result<(StatusCode, Json<OperationAddedResponse>), AppError> {
    let handle = state.draft(session_id).await?;

    let operation = compute_operation(&entry).map_err(|e| {
        tracing::info!("Draft {}: rejected operation ({})", session_id, e);
        AppError::from(e)
    })?;

    let mut draft = handle.lock().await;
    let index = draft.push(operation.clone());

    tracing::info!(
        "Draft {}: added {} at #{} (net {:.2})",
        session_id,
        operation.operation_type().id(),
        index,
        operation.net_released_amount()
    );

    Ok((
        StatusCode::CREATED,
        Json(OperationAddedResponse {
            index,
            operation,
            draft_size: draft.len(),
        }),
    ))
}

/// DELETE /api/v1/drafts/:session_id/operations/:index
pub async fn remove_operation(
    State(state): State<Arc<AppState>>,
    Path((session_id, index)): Path<(Uuid, usize)>,
) -> Result<Json<DraftResponse>, AppError> {
    let handle = state.draft(session_id).await?;
    let mut draft = handle.lock().await;

    draft.remove(index).ok_or_else(|| {
        AppError::NotFound(format!(
            "Draft {} has no operation at index {}",
            session_id, index
        ))
    })?;

    tracing::info!("Draft {}: removed operation #{}", session_id, index);
    Ok(Json(draft_response(session_id, &draft)))
}

/// GET /api/v1/drafts/:session_id/preview
pub async fn preview_proposal(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ProposalPreview>, AppError> {
    let handle = state.draft(session_id).await?;
    let draft = handle.lock().await;

    let link = state.acceptance_link()?;
    let message = draft.preview(&link).ok_or_else(empty_draft_error)?;

    Ok(Json(ProposalPreview {
        message,
        operations: draft.len(),
        total_released: draft.total_released(),
    }))
}

/// POST /api/v1/drafts/:session_id/send
///
/// Sends the proposal to `recipient` and clears the draft. If the send
/// fails the draft is kept, so a retry sends the same text.
pub async fn send_proposal(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SendProposalRequest>,
) -> Result<Json<ProposalSent>, AppError> {
    let handle = state.draft(session_id).await?;
    let mut draft = handle.lock().await;

    if draft.is_empty() {
        return Err(empty_draft_error());
    }

    let link = state.acceptance_link()?;
    let message = format_proposal(draft.operations(), &link);
    let operations = draft.len();
    let total_released = draft.total_released();

    let receipt = state
        .sender
        .send_message(&request.recipient, &message)
        .await
        .context(format!("Sending proposal for draft {}", session_id))?;

    draft.clear();
    tracing::info!(
        "Draft {}: proposal with {} operation(s) sent to {}",
        session_id,
        operations,
        receipt.recipient
    );

    Ok(Json(ProposalSent {
        receipt,
        message,
        operations,
        total_released,
    }))
}

/// POST /api/v1/leads/stage-notifications
///
/// Tells the customer their lead moved to another board column. Moving to
/// the column the lead is already in sends nothing.
pub async fn notify_stage_change(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StageNotificationRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Some(stage) = stage_transition(request.previous_stage, request.stage) else {
        tracing::debug!("Lead {} stayed in {}", request.name, request.stage.id());
        return Ok(Json(json!({ "status": "unchanged" })));
    };

    let lead = LeadSummary {
        name: &request.name,
        bank: request.bank.as_deref(),
        requested_amount: request.requested_amount,
    };
    let message = stage_update_message(stage, &lead);

    let receipt = state
        .sender
        .send_message(&request.phone, &message)
        .await
        .context(format!("Notifying lead {} of stage {}", request.name, stage.id()))?;

    tracing::info!("{} moved to {}", request.name, stage.title());
    Ok(Json(json!({
        "status": "sent",
        "stage": stage,
        "message": message,
        "receipt": receipt,
    })))
}

fn draft_response(session_id: Uuid, draft: &ProposalDraft) -> DraftResponse {
    DraftResponse {
        session_id,
        operations: draft.operations().to_vec(),
        total_released: draft.total_released(),
    }
}

fn empty_draft_error() -> AppError {
    AppError::BadRequest("Add at least one operation to the draft first".to_string())
}
