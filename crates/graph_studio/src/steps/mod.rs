//! Per-step state models and their panels.
//!
//! Each step owns the tickets of the requests it started and reports what
//! the wizard has to do through [`StepSignal`]s. Nothing in here touches the
//! wizard directly.

pub mod files;
pub mod list;
pub mod viewer;
pub mod visualization;

use thiserror::Error;

use crate::model::{FileRef, GraphId};

pub use files::FileSelectionState;
pub use list::{filter_summaries, sort_summaries, GraphsListState, SortKey, SortOrder};
pub use viewer::{ViewMode, ViewerState};
pub use visualization::VisualizationState;

/// Progress of a read request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }
}

/// Message for the user. Errors block until acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Outcome of a step interaction, consumed by the modal.
#[derive(Debug, Clone, PartialEq)]
pub enum StepSignal {
    CreateNew,
    GraphSelected(GraphId),
    FilesChosen(Vec<FileRef>),
    GraphSaved,
    GraphUpdated,
    Back,
    ViewAll,
    Notice(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a graph name is required")]
    NameRequired,
    #[error("a save is already in progress")]
    SaveInFlight,
    #[error("changes can only be saved in edit mode")]
    NotEditing,
}

/// Trimmed name, or an error when nothing is left.
pub fn normalize_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    Ok(name.to_string())
}

/// Trimmed description; blank means unset.
pub fn normalize_description(raw: &str) -> Option<String> {
    let d = raw.trim();
    (!d.is_empty()).then(|| d.to_string())
}

/// Renders an inline fetch error with a retry button. Returns true on retry.
pub(crate) fn error_with_retry(ui: &mut egui::Ui, message: &str) -> bool {
    ui.vertical_centered(|ui| {
        ui.add_space(crate::ui_consts::UI_MARGIN * 2.0);
        ui.colored_label(ui.visuals().error_fg_color, message);
        ui.add_space(crate::ui_consts::SECTION_SPACING);
        ui.button("Retry").clicked()
    })
    .inner
}
