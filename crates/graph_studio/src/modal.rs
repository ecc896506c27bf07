//! The graphs modal: hosts the wizard and routes replies and signals
//! between it and the step panels.

use egui::{Align, Layout, RichText, Ui};
use log::{debug, error, info, warn};

use crate::model::GraphId;
use crate::status::StatusQueue;
use crate::steps::{
    FileSelectionState, GraphsListState, Notice, StepSignal, ViewerState, VisualizationState,
};
use crate::ui_consts::{HEADING_TEXT_SIZE, MODAL_HEIGHT, MODAL_WIDTH, SECTION_SPACING};
use crate::wizard::{GraphsWizard, WizardEvent, WizardStep};
use crate::worker::{Dispatch, Reply};

/// State of the panel mounted for the current non-list step.
#[derive(Default)]
enum Panel {
    #[default]
    None,
    Files(FileSelectionState),
    Visualization(VisualizationState),
    Viewer(ViewerState),
}

#[derive(Default)]
pub struct GraphsModal {
    open: bool,
    wizard: GraphsWizard,
    /// Kept while the modal is open so going back does not flash a spinner.
    list: GraphsListState,
    panel: Panel,
    error_dialog: Option<String>,
}

impl GraphsModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self, d: &mut dyn Dispatch) {
        if self.open {
            return;
        }
        info!("graphs modal opened");
        self.open = true;
        self.sync_panel(d);
    }

    /// Closes the modal and forgets all transient state.
    pub fn close(&mut self) {
        if let Err(e) = self.wizard.handle(WizardEvent::Close) {
            warn!("modal: {e}");
        }
        self.open = false;
        self.list = GraphsListState::new();
        self.panel = Panel::None;
        self.error_dialog = None;
        info!("graphs modal closed");
    }

    pub fn wizard(&self) -> &GraphsWizard {
        &self.wizard
    }

    pub fn step(&self) -> WizardStep {
        self.wizard.step()
    }

    pub fn list(&self) -> &GraphsListState {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut GraphsListState {
        &mut self.list
    }

    pub fn files_mut(&mut self) -> Option<&mut FileSelectionState> {
        match &mut self.panel {
            Panel::Files(s) => Some(s),
            _ => None,
        }
    }

    pub fn visualization_mut(&mut self) -> Option<&mut VisualizationState> {
        match &mut self.panel {
            Panel::Visualization(s) => Some(s),
            _ => None,
        }
    }

    pub fn viewer_mut(&mut self) -> Option<&mut ViewerState> {
        match &mut self.panel {
            Panel::Viewer(s) => Some(s),
            _ => None,
        }
    }

    /// Failure message waiting to be acknowledged.
    pub fn error_message(&self) -> Option<&str> {
        self.error_dialog.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error_dialog = None;
    }

    /// Hands `reply` to whichever step is waiting on it. Replies nobody
    /// waits on belong to unmounted steps and are dropped.
    pub fn handle_reply(&mut self, reply: Reply, d: &mut dyn Dispatch, status: &mut StatusQueue) {
        let ticket = reply.ticket;
        let signals = if self.list.owns(ticket) {
            self.list.on_reply(reply)
        } else {
            match &mut self.panel {
                Panel::Files(s) if s.owns(ticket) => s.on_reply(reply),
                Panel::Visualization(s) if s.owns(ticket) => s.on_reply(reply),
                Panel::Viewer(s) if s.owns(ticket) => s.on_reply(reply),
                _ => {
                    debug!("modal: dropping stale reply #{ticket}");
                    return;
                }
            }
        };
        self.apply_signals(signals, d, status);
    }

    pub fn apply_signals(
        &mut self,
        signals: Vec<StepSignal>,
        d: &mut dyn Dispatch,
        status: &mut StatusQueue,
    ) {
        for signal in signals {
            let event = match signal {
                StepSignal::Notice(Notice::Success(text)) => {
                    status.push_success(text);
                    continue;
                }
                StepSignal::Notice(Notice::Error(text)) => {
                    error!("modal: {text}");
                    self.error_dialog = Some(text);
                    continue;
                }
                StepSignal::CreateNew => WizardEvent::CreateNew,
                StepSignal::GraphSelected(id) => WizardEvent::GraphSelected(id),
                StepSignal::FilesChosen(files) => WizardEvent::FilesChosen(files),
                StepSignal::GraphSaved => WizardEvent::GraphSaved,
                StepSignal::GraphUpdated => WizardEvent::GraphUpdated,
                StepSignal::Back => WizardEvent::Back,
                StepSignal::ViewAll => WizardEvent::ViewAll,
            };
            if self.wizard.handle(event).is_ok() {
                self.sync_panel(d);
            }
        }
    }

    /// Mounts the panel matching the wizard step, reusing the current one
    /// when it already fits.
    fn sync_panel(&mut self, d: &mut dyn Dispatch) {
        match self.wizard.step() {
            WizardStep::GraphsList => {
                self.panel = Panel::None;
                self.list.sync_refresh(self.wizard.refresh_signal(), d);
            }
            WizardStep::FileSelection => {
                if !matches!(self.panel, Panel::Files(_)) {
                    let mut state = FileSelectionState::new(self.wizard.selected_files());
                    state.load(d);
                    self.panel = Panel::Files(state);
                }
            }
            WizardStep::GraphVisualization => {
                if !matches!(self.panel, Panel::Visualization(_)) {
                    let files = self.wizard.selected_files().to_vec();
                    self.panel = match VisualizationState::new(files) {
                        Ok(state) => Panel::Visualization(state),
                        Err(e) => {
                            warn!("modal: {e}");
                            Panel::None
                        }
                    };
                }
            }
            WizardStep::GraphViewer => {
                let current = match &self.panel {
                    Panel::Viewer(v) => Some(v.graph_id()),
                    _ => None,
                };
                match self.wizard.selected_graph_id() {
                    Some(id) if current != Some(id) => {
                        self.panel = Panel::Viewer(ViewerState::open(id.clone(), d));
                    }
                    Some(_) => {}
                    None => self.panel = Panel::None,
                }
            }
        }
    }

    fn body(&mut self, ui: &mut Ui, d: &mut dyn Dispatch) -> (Vec<StepSignal>, bool) {
        let mut close = false;
        ui.horizontal(|ui| {
            ui.label(RichText::new(self.step().title()).size(HEADING_TEXT_SIZE).strong());
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                close = ui.button("✖").on_hover_text("Close").clicked();
            });
        });
        ui.separator();
        ui.add_space(SECTION_SPACING);

        let signals = match (self.wizard.step(), &mut self.panel) {
            (WizardStep::GraphsList, _) => self.list.ui(ui, d),
            (WizardStep::FileSelection, Panel::Files(s)) => s.ui(ui, d),
            (WizardStep::GraphVisualization, Panel::Visualization(s)) => s.ui(ui, d),
            (WizardStep::GraphViewer, Panel::Viewer(s)) => s.ui(ui, d),
            _ => Vec::new(),
        };
        (signals, close)
    }

    /// Draws the modal. Returns true on the frame it was closed.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        d: &mut dyn Dispatch,
        status: &mut StatusQueue,
    ) -> bool {
        if !self.open {
            return false;
        }

        let mut signals = Vec::new();
        let mut close = false;
        let resp = egui::Modal::new(egui::Id::new("graph_studio_graphs_modal")).show(ctx, |ui| {
            ui.set_width(MODAL_WIDTH);
            ui.set_min_height(MODAL_HEIGHT);
            (signals, close) = self.body(ui, d);
        });
        self.apply_signals(signals, d, status);

        if let Some(message) = self.error_dialog.clone() {
            let mut ok = false;
            let err = egui::Modal::new(egui::Id::new("graph_studio_error_dialog")).show(ctx, |ui| {
                ui.heading("Something went wrong");
                ui.add_space(SECTION_SPACING);
                ui.label(message);
                ui.add_space(SECTION_SPACING);
                ok = ui.button("OK").clicked();
            });
            if ok || err.should_close() {
                self.dismiss_error();
            }
            return false;
        }

        if close || resp.should_close() {
            self.close();
            return true;
        }
        false
    }

    /// Id of the graph the viewer is showing, if any.
    pub fn viewed_graph(&self) -> Option<&GraphId> {
        match &self.panel {
            Panel::Viewer(v) => Some(v.graph_id()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;
    use crate::model::{FileId, FileRef, GraphListing};
    use crate::worker::{ApiRequest, ApiResponse, Ticket};

    #[derive(Default)]
    struct Recorder(Vec<ApiRequest>);

    impl Dispatch for Recorder {
        fn dispatch(&mut self, req: ApiRequest) -> Ticket {
            self.0.push(req);
            self.0.len() as Ticket
        }
    }

    fn file(id: &str) -> FileRef {
        FileRef {
            id: FileId::new(id),
            name: format!("{id}.csv"),
            file_type: "csv".into(),
            size: 1,
            uploaded_at: None,
        }
    }

    fn last_ticket(rec: &Recorder) -> Ticket {
        rec.0.len() as Ticket
    }

    #[test]
    fn opening_fetches_the_list_once() {
        let mut m = GraphsModal::new();
        let mut rec = Recorder::default();
        m.open(&mut rec);
        m.open(&mut rec);
        assert!(m.is_open());
        assert_eq!(rec.0, vec![ApiRequest::ListGraphs]);
    }

    #[test]
    fn create_flow_mounts_panels() {
        let mut m = GraphsModal::new();
        let mut rec = Recorder::default();
        let mut status = StatusQueue::new();
        m.open(&mut rec);

        m.apply_signals(vec![StepSignal::CreateNew], &mut rec, &mut status);
        assert_eq!(m.step(), WizardStep::FileSelection);
        assert_eq!(rec.0.last(), Some(&ApiRequest::ListFiles));

        m.handle_reply(
            Reply {
                ticket: last_ticket(&rec),
                result: Ok(ApiResponse::Files(vec![file("a"), file("b")])),
            },
            &mut rec,
            &mut status,
        );
        let files = m.files_mut().unwrap();
        files.toggle(&FileId::new("b"));
        let signal = files.continue_signal().unwrap();

        m.apply_signals(vec![signal], &mut rec, &mut status);
        assert_eq!(m.step(), WizardStep::GraphVisualization);
        assert_eq!(m.visualization_mut().unwrap().canvas().node_count(), 1);

        // back keeps the choice
        m.apply_signals(vec![StepSignal::Back], &mut rec, &mut status);
        assert_eq!(m.step(), WizardStep::FileSelection);
        assert_eq!(m.wizard().selected_files().len(), 1);
    }

    #[test]
    fn stale_replies_are_dropped() {
        let mut m = GraphsModal::new();
        let mut rec = Recorder::default();
        let mut status = StatusQueue::new();
        m.open(&mut rec);
        m.apply_signals(vec![StepSignal::CreateNew], &mut rec, &mut status);
        let files_ticket = last_ticket(&rec);
        m.apply_signals(vec![StepSignal::Back], &mut rec, &mut status);

        m.handle_reply(
            Reply {
                ticket: files_ticket,
                result: Err(ApiError::Transport("timeout".into())),
            },
            &mut rec,
            &mut status,
        );
        assert_eq!(m.error_message(), None);
        assert_eq!(m.step(), WizardStep::GraphsList);
    }

    #[test]
    fn notices_split_into_toast_and_dialog() {
        let mut m = GraphsModal::new();
        let mut rec = Recorder::default();
        let mut status = StatusQueue::new();
        m.apply_signals(
            vec![
                StepSignal::Notice(Notice::Success("Graph deleted".into())),
                StepSignal::Notice(Notice::Error("Forbidden".into())),
            ],
            &mut rec,
            &mut status,
        );
        assert_eq!(status.len(), 1);
        assert_eq!(m.error_message(), Some("Forbidden"));
        m.dismiss_error();
        assert_eq!(m.error_message(), None);
    }

    #[test]
    fn viewer_mounts_for_selected_graph_and_close_resets() {
        let mut m = GraphsModal::new();
        let mut rec = Recorder::default();
        let mut status = StatusQueue::new();
        m.open(&mut rec);
        m.handle_reply(
            Reply {
                ticket: 1,
                result: Ok(ApiResponse::Graphs(GraphListing {
                    graphs: Vec::new(),
                    total_count: 0,
                })),
            },
            &mut rec,
            &mut status,
        );

        m.apply_signals(
            vec![StepSignal::GraphSelected(GraphId::new("g7"))],
            &mut rec,
            &mut status,
        );
        assert_eq!(m.step(), WizardStep::GraphViewer);
        assert_eq!(m.viewed_graph().map(GraphId::as_str), Some("g7"));
        assert_eq!(rec.0.last(), Some(&ApiRequest::GetGraph(GraphId::new("g7"))));

        // updates keep the same viewer mounted
        let sent = rec.0.len();
        m.apply_signals(vec![StepSignal::GraphUpdated], &mut rec, &mut status);
        assert_eq!(rec.0.len(), sent);
        assert_eq!(m.wizard().refresh_signal(), 1);

        m.close();
        assert!(!m.is_open());
        assert_eq!(m.step(), WizardStep::GraphsList);
        assert!(m.viewed_graph().is_none());
        assert!(m.wizard().selected_graph_id().is_none());
    }

    #[test]
    fn returning_to_list_refetches_after_save() {
        let mut m = GraphsModal::new();
        let mut rec = Recorder::default();
        let mut status = StatusQueue::new();
        m.open(&mut rec);
        m.apply_signals(vec![StepSignal::CreateNew], &mut rec, &mut status);
        m.apply_signals(
            vec![StepSignal::FilesChosen(vec![file("a")])],
            &mut rec,
            &mut status,
        );
        m.apply_signals(vec![StepSignal::GraphSaved], &mut rec, &mut status);
        assert_eq!(m.step(), WizardStep::GraphsList);
        let lists = rec
            .0
            .iter()
            .filter(|r| **r == ApiRequest::ListGraphs)
            .count();
        assert_eq!(lists, 2);
    }
}
