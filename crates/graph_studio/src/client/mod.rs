//! Client for the graph resource.
//!
//! [`GraphApi`] is the seam between the wizard and the backend. The HTTP
//! implementation talks to the REST service, the in-memory one backs tests
//! and the offline `memory` backend.

mod error;
mod http;
mod memory;

pub use error::ApiError;
pub use http::HttpGraphClient;
pub use memory::{CallCounts, InMemoryGraphApi};

use crate::model::{
    CreateGraphRequest, FileRef, Graph, GraphId, GraphListing, UpdateGraphRequest,
};

/// Typed operations on the graph resource.
///
/// Calls block; run them through [`crate::worker::ApiWorker`] from UI code.
pub trait GraphApi: Send + Sync {
    /// Returns the created graph when the server echoes it back.
    fn create_graph(&self, req: &CreateGraphRequest) -> Result<Option<Graph>, ApiError>;

    fn list_graphs(&self) -> Result<GraphListing, ApiError>;

    fn get_graph(&self, id: &GraphId) -> Result<Graph, ApiError>;

    /// Returns the stored graph when the server echoes it back.
    fn update_graph(
        &self,
        id: &GraphId,
        req: &UpdateGraphRequest,
    ) -> Result<Option<Graph>, ApiError>;

    fn delete_graph(&self, id: &GraphId) -> Result<(), ApiError>;

    /// Uploaded files available as graph sources.
    fn list_files(&self) -> Result<Vec<FileRef>, ApiError>;
}
