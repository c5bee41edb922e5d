pub mod routes;

use std::{
    net::SocketAddr,
    sync::Arc,
};

use axum::{
    routing::{
        get,
        post,
    },
    Router,
};
use tokio::{
    net::TcpListener,
    task::JoinHandle,
};
use tracing::error;

use self::routes::{
    get_node_handler,
    save_nodes_handler,
    AppState,
};
use crate::ports::node_store::NodeStore;

/// Routes of the Reverse Hash Service node API.
pub fn router<S: NodeStore + 'static>(store: Arc<S>) -> Router {
    Router::new()
        .route("/node", post(save_nodes_handler::<S>))
        .route("/node/{hash}", get(get_node_handler::<S>))
        .with_state(AppState { store })
}

/// Bind `addr` and serve the RHS node API in a background task.
///
/// Returns the task handle (abort it to stop serving) and the bound address,
/// which differs from `addr` when binding port 0.
pub async fn start_server<S: NodeStore + 'static>(
    store: Arc<S>,
    addr: SocketAddr,
) -> Result<(JoinHandle<()>, SocketAddr), ServerError> {
    let listener = TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;
    let app = router(store);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("server stopped: {e}");
        }
    });

    Ok((handle, bound_addr))
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("cannot bind listener: {0}")]
    Bind(#[from] std::io::Error),
}
