//! Node/edge editing surface.
//!
//! [`GraphCanvas`] converts the wire records into a petgraph model and back;
//! [`CanvasView`] is the egui widget that draws and edits it.

mod graph;
pub mod shape;
mod view;
mod viewport;

pub use graph::{CanvasEdge, CanvasNode, ConnectDraft, GraphCanvas};
pub use view::CanvasView;
pub use viewport::Viewport;
