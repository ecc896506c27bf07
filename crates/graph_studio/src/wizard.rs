//! Step state machine of the graphs modal.
//!
//! [`GraphsWizard`] owns the current step and everything that travels between
//! steps: the files picked for a new graph, the graph opened in the viewer and
//! the counter that tells the list to re-fetch.

use std::fmt;

use log::{info, warn};
use thiserror::Error;

use crate::model::{FileRef, GraphId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WizardStep {
    #[default]
    GraphsList,
    FileSelection,
    GraphVisualization,
    GraphViewer,
}

impl WizardStep {
    pub fn title(self) -> &'static str {
        match self {
            WizardStep::GraphsList => "Graphs",
            WizardStep::FileSelection => "Select files",
            WizardStep::GraphVisualization => "New graph",
            WizardStep::GraphViewer => "Graph",
        }
    }

    /// Step reached by "back", if any.
    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::GraphsList => None,
            WizardStep::FileSelection | WizardStep::GraphViewer => Some(WizardStep::GraphsList),
            WizardStep::GraphVisualization => Some(WizardStep::FileSelection),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::GraphsList => "list",
            WizardStep::FileSelection => "fileSelection",
            WizardStep::GraphVisualization => "graphVisualization",
            WizardStep::GraphViewer => "graphViewer",
        };
        f.write_str(name)
    }
}

/// Inputs of the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    CreateNew,
    FilesChosen(Vec<FileRef>),
    GraphSaved,
    GraphSelected(GraphId),
    GraphUpdated,
    ViewAll,
    Back,
    Close,
}

impl WizardEvent {
    fn name(&self) -> &'static str {
        match self {
            WizardEvent::CreateNew => "create new",
            WizardEvent::FilesChosen(_) => "files chosen",
            WizardEvent::GraphSaved => "graph saved",
            WizardEvent::GraphSelected(_) => "graph selected",
            WizardEvent::GraphUpdated => "graph updated",
            WizardEvent::ViewAll => "view all",
            WizardEvent::Back => "back",
            WizardEvent::Close => "close",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("`{event}` is not valid in step {from}")]
    InvalidTransition {
        from: WizardStep,
        event: &'static str,
    },
    #[error("at least one file must be selected")]
    NoFilesSelected,
}

#[derive(Debug, Clone, Default)]
pub struct GraphsWizard {
    step: WizardStep,
    selected_files: Vec<FileRef>,
    selected_graph_id: Option<GraphId>,
    refresh_signal: u64,
}

impl GraphsWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn selected_files(&self) -> &[FileRef] {
        &self.selected_files
    }

    pub fn selected_graph_id(&self) -> Option<&GraphId> {
        self.selected_graph_id.as_ref()
    }

    /// Bumped whenever the saved graphs changed and the list must re-fetch.
    pub fn refresh_signal(&self) -> u64 {
        self.refresh_signal
    }

    /// Applies `event`. Invalid events leave the state untouched.
    pub fn handle(&mut self, event: WizardEvent) -> Result<WizardStep, WizardError> {
        use WizardStep as S;

        let from = self.step;
        let invalid = WizardError::InvalidTransition {
            from,
            event: event.name(),
        };
        match (from, event) {
            (_, WizardEvent::Close) => {
                self.step = S::GraphsList;
                self.selected_files.clear();
                self.selected_graph_id = None;
            }
            (S::GraphsList, WizardEvent::CreateNew) => {
                self.selected_files.clear();
                self.step = S::FileSelection;
            }
            (S::FileSelection, WizardEvent::FilesChosen(files)) => {
                if files.is_empty() {
                    return Err(WizardError::NoFilesSelected);
                }
                self.selected_files = files;
                self.step = S::GraphVisualization;
            }
            (S::GraphVisualization, WizardEvent::GraphSaved) => {
                self.refresh_signal += 1;
                self.selected_files.clear();
                self.step = S::GraphsList;
            }
            (S::GraphsList, WizardEvent::GraphSelected(id)) => {
                self.selected_graph_id = Some(id);
                self.step = S::GraphViewer;
            }
            (S::GraphViewer, WizardEvent::GraphUpdated) => {
                self.refresh_signal += 1;
            }
            (S::GraphViewer, WizardEvent::ViewAll | WizardEvent::Back) => {
                self.selected_graph_id = None;
                self.step = S::GraphsList;
            }
            (S::FileSelection, WizardEvent::Back) => {
                self.selected_files.clear();
                self.step = S::GraphsList;
            }
            (S::GraphVisualization, WizardEvent::Back) => {
                self.step = S::FileSelection;
            }
            _ => {
                warn!("wizard: {invalid}");
                return Err(invalid);
            }
        }
        if self.step != from {
            info!("wizard: {from} -> {}", self.step);
        }
        Ok(self.step)
    }
}
