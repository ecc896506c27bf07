//! Graph authoring workflow for the analysis workspace.
//!
//! Users browse saved graphs, pick uploaded files, arrange them as nodes and
//! edges on an interactive canvas and persist the result through a REST
//! resource. The crate is split into:
//!
//! * [`model`], [`label`]: wire records shared with the backend,
//! * [`client`], [`worker`]: the resource client and the background request runner,
//! * [`wizard`]: the step state machine driving the modal,
//! * [`steps`]: per-step state models and their panels,
//! * [`canvas`]: the node/edge editing surface,
//! * [`app`]: the eframe application shell.

pub mod app;
pub mod canvas;
pub mod client;
pub mod config;
pub mod export;
pub mod label;
pub mod layout;
pub mod modal;
pub mod model;
pub mod settings;
pub mod status;
pub mod steps;
pub mod wizard;
pub mod worker;

mod ui_consts;

pub use app::{GraphStudioApp, APP_NAME};
pub use canvas::{CanvasView, GraphCanvas};
pub use client::{ApiError, CallCounts, GraphApi, HttpGraphClient, InMemoryGraphApi};
pub use config::{Backend, ConfigError, StudioConfig};
pub use label::{resolve_display_text, Label, NodeData, FALLBACK_LABEL};
pub use model::{
    CreateGraphRequest, FileId, FileRef, Graph, GraphEdge, GraphId, GraphListing, GraphNode,
    GraphSummary, Position, Timestamp, UpdateGraphRequest,
};
pub use modal::GraphsModal;
pub use wizard::{GraphsWizard, WizardError, WizardEvent, WizardStep};
pub use worker::{ApiRequest, ApiResponse, ApiWorker, Dispatch, Reply, Ticket};
