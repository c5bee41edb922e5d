use std::sync::Arc;

use axum::{
    extract::{
        rejection::JsonRejection,
        Path,
        State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{
    debug,
    info,
    warn,
};

use crate::{
    domain::hash::Hash,
    ports::node_store::{
        NodeStore,
        RhsError,
    },
    rhs::node::{
        NodeResponse,
        ProofNode,
        StatusResponse,
        STATUS_OK,
    },
};

/// Shared application state for axum route handlers.
pub struct AppState<S> {
    pub store: Arc<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

// ── Route handlers ──

/// POST /node: stores a batch of nodes after validating every one.
pub async fn save_nodes_handler<S: NodeStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<Vec<ProofNode>>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Json(nodes) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    state.store.save_nodes(&nodes).await?;
    info!("stored {} nodes", nodes.len());
    Ok(Json(StatusResponse {
        status: STATUS_OK.into(),
    }))
}

/// GET /node/{hash}: returns the node stored under a big-endian hex hash.
pub async fn get_node_handler<S: NodeStore>(
    State(state): State<AppState<S>>,
    Path(hash_hex): Path<String>,
) -> Result<Json<NodeResponse>, AppError> {
    let hash = Hash::from_be_hex(&hash_hex)
        .map_err(|e| AppError::BadRequest(format!("invalid hash {hash_hex}: {e}")))?;
    debug!("lookup {hash_hex}");
    let node = state.store.get_node(&hash).await?;
    Ok(Json(NodeResponse {
        node,
        status: STATUS_OK.into(),
    }))
}

// ── Error handling ──

/// Application error type that maps to HTTP status codes.
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<RhsError> for AppError {
    fn from(e: RhsError) -> Self {
        match &e {
            RhsError::NodeNotFound(_) => AppError::NotFound(e.to_string()),
            RhsError::InvalidNode(_) | RhsError::Domain(_) => {
                warn!("rejected request: {e}");
                AppError::BadRequest(e.to_string())
            }
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg) = match self {
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            AppError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}
