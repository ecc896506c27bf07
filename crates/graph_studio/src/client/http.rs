use std::time::Duration;

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use ureq::{Agent, AgentBuilder, Request, Response};

use super::{ApiError, GraphApi};
use crate::model::{
    CreateGraphRequest, FileRef, Graph, GraphId, GraphListing, GraphSummary, UpdateGraphRequest,
};

/// Response wrapper used by every endpoint of the service.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct Envelope {
    success: bool,
    message: Option<String>,
    /// Framework-level errors report here instead of `message`.
    detail: Option<serde_json::Value>,
    graph: Option<Graph>,
    graphs: Option<Vec<GraphSummary>>,
    total_count: Option<usize>,
    files: Option<Vec<FileRef>>,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            success: true,
            message: None,
            detail: None,
            graph: None,
            graphs: None,
            total_count: None,
            files: None,
        }
    }
}

impl Envelope {
    fn message(&self) -> Option<String> {
        if let Some(m) = self.message.as_deref().filter(|m| !m.trim().is_empty()) {
            return Some(m.to_string());
        }
        match &self.detail {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }

    fn into_accepted(self) -> Result<Self, ApiError> {
        if self.success {
            Ok(self)
        } else {
            Err(ApiError::Rejected(
                self.message().unwrap_or_else(|| "request rejected".to_string()),
            ))
        }
    }
}

pub(crate) fn parse_envelope(body: &str) -> Result<Envelope, ApiError> {
    if body.trim().is_empty() {
        return Ok(Envelope::default());
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Blocking REST client for `{base}/graphs` and `{base}/files`.
pub struct HttpGraphClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl HttpGraphClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent: AgentBuilder::new().timeout(timeout).build(),
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: &str, path: &str) -> Request {
        let req = self
            .agent
            .request(method, &self.url(path))
            .set("Accept", "application/json");
        match &self.token {
            Some(token) => req.set("Authorization", &format!("Bearer {token}")),
            None => req,
        }
    }

    fn send(
        &self,
        method: &str,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<Envelope, ApiError> {
        let req = self.request(method, path);
        let result = match body {
            Some(body) => req.send_json(body),
            None => req.call(),
        };
        match result {
            Ok(resp) => {
                debug!("{method} {path} -> {}", resp.status());
                parse_envelope(&read_body(resp)?)?.into_accepted()
            }
            Err(ureq::Error::Status(status, resp)) => {
                let status_text = resp.status_text().to_string();
                let message = resp
                    .into_string()
                    .ok()
                    .and_then(|body| parse_envelope(&body).ok())
                    .and_then(|env| env.message())
                    .unwrap_or(status_text);
                error!("{method} {path} failed with {status}: {message}");
                Err(ApiError::Http { status, message })
            }
            Err(ureq::Error::Transport(t)) => {
                error!("{method} {path} transport error: {t}");
                Err(ApiError::Transport(t.to_string()))
            }
        }
    }

    fn send_empty(&self, method: &str, path: &str) -> Result<Envelope, ApiError> {
        self.send(method, path, None::<&()>)
    }
}

fn read_body(resp: Response) -> Result<String, ApiError> {
    resp.into_string().map_err(|e| ApiError::Decode(e.to_string()))
}

fn require<T>(value: Option<T>, what: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::Decode(format!("missing `{what}` in response")))
}

impl GraphApi for HttpGraphClient {
    fn create_graph(&self, req: &CreateGraphRequest) -> Result<Option<Graph>, ApiError> {
        let env = self.send("POST", "graphs", Some(req))?;
        info!("created graph {:?}", req.name);
        Ok(env.graph)
    }

    fn list_graphs(&self) -> Result<GraphListing, ApiError> {
        let env = self.send_empty("GET", "graphs")?;
        let graphs = env.graphs.unwrap_or_default();
        let total_count = env.total_count.unwrap_or(graphs.len());
        info!("listed {} graphs", graphs.len());
        Ok(GraphListing {
            graphs,
            total_count,
        })
    }

    fn get_graph(&self, id: &GraphId) -> Result<Graph, ApiError> {
        match self.send_empty("GET", &format!("graphs/{id}")) {
            Ok(env) => env.graph.ok_or_else(|| ApiError::NotFound(id.clone())),
            Err(ApiError::Http { status: 404, .. }) => Err(ApiError::NotFound(id.clone())),
            Err(e) => Err(e),
        }
    }

    fn update_graph(
        &self,
        id: &GraphId,
        req: &UpdateGraphRequest,
    ) -> Result<Option<Graph>, ApiError> {
        let env = self.send("PUT", &format!("graphs/{id}"), Some(req))?;
        info!("updated graph {id}");
        Ok(env.graph)
    }

    fn delete_graph(&self, id: &GraphId) -> Result<(), ApiError> {
        self.send_empty("DELETE", &format!("graphs/{id}"))?;
        info!("deleted graph {id}");
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<FileRef>, ApiError> {
        let env = self.send_empty("GET", "files")?;
        require(env.files, "files")
    }
}
