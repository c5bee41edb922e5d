use std::fmt::Display;

use reqwest::StatusCode;
use tracing::{
    debug,
    warn,
};

use crate::{
    config::RhsConfig,
    domain::hash::Hash,
    ports::node_store::{
        NodeStore,
        RhsError,
    },
    rhs::node::{
        NodeResponse,
        ProofNode,
        STATUS_OK,
    },
};

/// `NodeStore` backed by a remote Reverse Hash Service over HTTP.
///
/// - `GET {base_url}/node/{hash}` fetches one node
/// - `POST {base_url}/node` stores a JSON array of nodes
#[derive(Debug, Clone)]
pub struct HttpRhsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRhsClient {
    pub fn new(config: &RhsConfig) -> Result<Self, RhsError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(transport)?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn node_url(&self) -> String {
        format!("{}/node", self.base_url)
    }
}

fn transport(err: reqwest::Error) -> RhsError {
    RhsError::Transport(err.to_string())
}

async fn status_error(resp: reqwest::Response) -> RhsError {
    let status = resp.status().as_u16();
    http_status(status, resp.text().await)
}

fn http_status(status: u16, body: Result<String, impl Display>) -> RhsError {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!("failed to read body of HTTP {status} response: {e}");
            format!("<unreadable body: {e}>")
        }
    };
    RhsError::HttpStatus { status, body }
}

impl NodeStore for HttpRhsClient {
    async fn get_node(&self, hash: &Hash) -> Result<ProofNode, RhsError> {
        let url = format!("{}/{}", self.node_url(), hash.to_be_hex());
        debug!("GET {url}");
        let resp = self.client.get(&url).send().await.map_err(transport)?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Err(RhsError::NodeNotFound(*hash)),
            status if !status.is_success() => return Err(status_error(resp).await),
            _ => {}
        }

        let body: NodeResponse = resp
            .json()
            .await
            .map_err(|e| RhsError::InvalidResponse(e.to_string()))?;
        if !body.status.is_empty() && body.status != STATUS_OK {
            return Err(RhsError::InvalidResponse(format!(
                "unexpected status {:?}",
                body.status
            )));
        }
        Ok(body.node)
    }

    async fn save_nodes(&self, nodes: &[ProofNode]) -> Result<(), RhsError> {
        let url = self.node_url();
        debug!("POST {url} ({} nodes)", nodes.len());
        let resp = self
            .client
            .post(&url)
            .json(nodes)
            .send()
            .await
            .map_err(transport)?;

        if resp.status() != StatusCode::OK {
            return Err(status_error(resp).await);
        }
        Ok(())
    }
}
