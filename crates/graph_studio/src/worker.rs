//! Runs resource calls off the UI thread.
//!
//! Every request gets a [`Ticket`]. The step that issued it keeps the ticket
//! and accepts only the [`Reply`] carrying it, so replies that arrive after
//! the step was left or the request was superseded are ignored.

use std::sync::Arc;
use std::thread;

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, error, info};

use crate::client::{ApiError, GraphApi};
use crate::model::{
    CreateGraphRequest, FileRef, Graph, GraphId, GraphListing, UpdateGraphRequest,
};

pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    ListGraphs,
    GetGraph(GraphId),
    CreateGraph(CreateGraphRequest),
    UpdateGraph(GraphId, UpdateGraphRequest),
    DeleteGraph(GraphId),
    ListFiles,
}

impl ApiRequest {
    pub fn name(&self) -> &'static str {
        match self {
            ApiRequest::ListGraphs => "list graphs",
            ApiRequest::GetGraph(_) => "get graph",
            ApiRequest::CreateGraph(_) => "create graph",
            ApiRequest::UpdateGraph(..) => "update graph",
            ApiRequest::DeleteGraph(_) => "delete graph",
            ApiRequest::ListFiles => "list files",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Graphs(GraphListing),
    Graph(Graph),
    Created(Option<Graph>),
    Updated(Option<Graph>),
    Deleted(GraphId),
    Files(Vec<FileRef>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub ticket: Ticket,
    pub result: Result<ApiResponse, ApiError>,
}

/// Performs `req` synchronously against `api`.
pub fn execute(api: &dyn GraphApi, req: ApiRequest) -> Result<ApiResponse, ApiError> {
    match req {
        ApiRequest::ListGraphs => api.list_graphs().map(ApiResponse::Graphs),
        ApiRequest::GetGraph(id) => api.get_graph(&id).map(ApiResponse::Graph),
        ApiRequest::CreateGraph(body) => api.create_graph(&body).map(ApiResponse::Created),
        ApiRequest::UpdateGraph(id, body) => {
            api.update_graph(&id, &body).map(ApiResponse::Updated)
        }
        ApiRequest::DeleteGraph(id) => api.delete_graph(&id).map(|()| ApiResponse::Deleted(id)),
        ApiRequest::ListFiles => api.list_files().map(ApiResponse::Files),
    }
}

/// Starts requests. Step models only see this trait.
pub trait Dispatch {
    fn dispatch(&mut self, req: ApiRequest) -> Ticket;
}

/// Spawns one short-lived thread per request and collects replies on a
/// channel drained by the UI once per frame.
pub struct ApiWorker {
    api: Arc<dyn GraphApi>,
    tx: Sender<Reply>,
    rx: Receiver<Reply>,
    next_ticket: Ticket,
    in_flight: usize,
    repaint: Option<egui::Context>,
}

impl ApiWorker {
    pub fn new(api: Arc<dyn GraphApi>) -> Self {
        let (tx, rx) = unbounded();
        Self {
            api,
            tx,
            rx,
            next_ticket: 0,
            in_flight: 0,
            repaint: None,
        }
    }

    /// Requests a repaint of `ctx` whenever a reply lands.
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Replies received since the last call, in arrival order.
    pub fn drain(&mut self) -> Vec<Reply> {
        let replies: Vec<Reply> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(replies.len());
        replies
    }
}

impl Dispatch for ApiWorker {
    fn dispatch(&mut self, req: ApiRequest) -> Ticket {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight += 1;
        let name = req.name();
        debug!("dispatching {name} as #{ticket}");

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        let spawned = thread::Builder::new()
            .name(format!("graph-api-{ticket}"))
            .spawn(move || {
                let result = execute(api.as_ref(), req);
                match &result {
                    Ok(_) => info!("{name} #{ticket} completed"),
                    Err(e) => error!("{name} #{ticket} failed: {e}"),
                }
                if tx.send(Reply { ticket, result }).is_err() {
                    debug!("reply #{ticket} dropped: worker gone");
                }
                if let Some(ctx) = repaint {
                    ctx.request_repaint();
                }
            });

        if let Err(e) = spawned {
            error!("failed to spawn request thread: {e}");
            let reply = Reply {
                ticket,
                result: Err(ApiError::Transport(e.to_string())),
            };
            // the receiver lives in self, so this cannot fail
            let _ = self.tx.send(reply);
        }
        ticket
    }
}
