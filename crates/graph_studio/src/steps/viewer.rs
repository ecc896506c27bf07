//! Viewing and editing one saved graph.

use egui::{Button, RichText, TextEdit, Ui};
use log::{debug, info};

use super::{normalize_description, normalize_name, Notice, StepSignal, ValidationError};
use crate::canvas::{CanvasView, GraphCanvas};
use crate::client::ApiError;
use crate::export::{self, ExportDocument};
use crate::model::{Graph, GraphId, Timestamp, UpdateGraphRequest};
use crate::settings::{SettingsInteraction, SettingsNavigation};
use crate::ui_consts::{SECTION_SPACING, SIDE_PANEL_WIDTH};
use crate::worker::{ApiRequest, ApiResponse, Dispatch, Reply, Ticket};

const CANVAS_ID: &str = "graph_studio_viewer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Viewing,
    Editing,
}

#[derive(Debug, Clone, PartialEq)]
enum LoadState {
    Loading,
    Loaded,
    Failed(ApiError),
}

/// Fields of the edit-metadata dialog.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataDraft {
    pub name: String,
    pub description: String,
}

pub struct ViewerState {
    graph_id: GraphId,
    /// Last graph received from the server. Never edited in place.
    graph: Option<Graph>,
    load: LoadState,
    load_ticket: Option<Ticket>,
    canvas: GraphCanvas,
    pub name: String,
    pub description: String,
    mode: ViewMode,
    metadata_dialog: Option<MetadataDraft>,
    save_ticket: Option<Ticket>,
    /// Sent with the save in flight, applied locally when the server
    /// does not echo the stored graph.
    pending_update: Option<UpdateGraphRequest>,
    settings_navigation: SettingsNavigation,
    /// Bumped on every rebuild so the canvas fits the graph again.
    canvas_epoch: u64,
}

impl ViewerState {
    /// Starts loading `graph_id`.
    pub fn open(graph_id: GraphId, d: &mut dyn Dispatch) -> Self {
        let mut state = Self {
            graph_id,
            graph: None,
            load: LoadState::Loading,
            load_ticket: None,
            canvas: GraphCanvas::new(),
            name: String::new(),
            description: String::new(),
            mode: ViewMode::Viewing,
            metadata_dialog: None,
            save_ticket: None,
            pending_update: None,
            settings_navigation: SettingsNavigation::default(),
            canvas_epoch: 0,
        };
        state.retry(d);
        state
    }

    pub fn retry(&mut self, d: &mut dyn Dispatch) {
        self.load = LoadState::Loading;
        self.load_ticket = Some(d.dispatch(ApiRequest::GetGraph(self.graph_id.clone())));
    }

    pub fn graph_id(&self) -> &GraphId {
        &self.graph_id
    }

    pub fn graph(&self) -> Option<&Graph> {
        self.graph.as_ref()
    }

    pub fn canvas(&self) -> &GraphCanvas {
        &self.canvas
    }

    /// Mutable canvas; edits are only accepted in edit mode.
    pub fn canvas_mut(&mut self) -> Option<&mut GraphCanvas> {
        (self.mode == ViewMode::Editing).then_some(&mut self.canvas)
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.load == LoadState::Loading
    }

    pub fn load_error(&self) -> Option<&ApiError> {
        match &self.load {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_saving(&self) -> bool {
        self.save_ticket.is_some()
    }

    /// Rebuilds canvas and fields from the last loaded graph.
    fn reset_from_graph(&mut self) {
        let Some(g) = &self.graph else {
            return;
        };
        self.canvas = GraphCanvas::from_records(&g.nodes, &g.edges);
        self.name.clone_from(&g.name);
        self.description = g.description.clone().unwrap_or_default();
        self.canvas_epoch += 1;
    }

    fn canvas_id(&self) -> egui::Id {
        egui::Id::new((CANVAS_ID, self.graph_id.as_str(), self.canvas_epoch))
    }

    pub fn open_metadata_dialog(&mut self) {
        self.metadata_dialog = Some(MetadataDraft {
            name: self.name.clone(),
            description: self.description.clone(),
        });
    }

    pub fn metadata_dialog(&self) -> Option<&MetadataDraft> {
        self.metadata_dialog.as_ref()
    }

    pub fn metadata_dialog_mut(&mut self) -> Option<&mut MetadataDraft> {
        self.metadata_dialog.as_mut()
    }

    pub fn close_metadata_dialog(&mut self) {
        self.metadata_dialog = None;
    }

    /// Leaves the metadata dialog in edit mode, taking over its fields.
    pub fn start_editing(&mut self) {
        if self.graph.is_none() {
            return;
        }
        if let Some(draft) = self.metadata_dialog.take() {
            self.name = draft.name;
            self.description = draft.description;
        }
        self.mode = ViewMode::Editing;
        info!("viewer: editing {}", self.graph_id);
    }

    /// Drops all local edits. No request is made.
    pub fn cancel_editing(&mut self) {
        self.reset_from_graph();
        self.mode = ViewMode::Viewing;
        self.metadata_dialog = None;
    }

    pub fn can_save(&self) -> bool {
        self.mode == ViewMode::Editing && !self.is_saving() && normalize_name(&self.name).is_ok()
    }

    /// Update carrying the current canvas and fields. A cleared description
    /// is sent as an explicit `null`.
    pub fn build_update(&self) -> Result<UpdateGraphRequest, ValidationError> {
        let name = normalize_name(&self.name)?;
        let (nodes, edges) = self.canvas.to_records();
        Ok(UpdateGraphRequest {
            name: Some(name),
            description: Some(normalize_description(&self.description)),
            nodes: Some(nodes),
            edges: Some(edges),
            ..UpdateGraphRequest::default()
        })
    }

    pub fn save_changes(&mut self, d: &mut dyn Dispatch) -> Result<Ticket, ValidationError> {
        if self.is_saving() {
            return Err(ValidationError::SaveInFlight);
        }
        if self.mode != ViewMode::Editing {
            return Err(ValidationError::NotEditing);
        }
        let req = self.build_update()?;
        let ticket = d.dispatch(ApiRequest::UpdateGraph(self.graph_id.clone(), req.clone()));
        self.pending_update = Some(req);
        self.save_ticket = Some(ticket);
        Ok(ticket)
    }

    pub fn owns(&self, ticket: Ticket) -> bool {
        self.load_ticket == Some(ticket) || self.save_ticket == Some(ticket)
    }

    pub fn on_reply(&mut self, reply: Reply) -> Vec<StepSignal> {
        if self.load_ticket == Some(reply.ticket) {
            self.load_ticket = None;
            match reply.result {
                Ok(ApiResponse::Graph(graph)) => {
                    info!("viewer: loaded {} ({} nodes)", graph.id, graph.nodes.len());
                    self.graph = Some(graph);
                    self.load = LoadState::Loaded;
                    self.mode = ViewMode::Viewing;
                    self.reset_from_graph();
                }
                Ok(other) => debug!("viewer: unexpected reply {other:?}"),
                Err(e) => self.load = LoadState::Failed(e),
            }
            return Vec::new();
        }
        if self.save_ticket != Some(reply.ticket) {
            return Vec::new();
        }

        self.save_ticket = None;
        let pending = self.pending_update.take();
        match reply.result {
            Ok(ApiResponse::Updated(stored)) => {
                let updated = stored.or_else(|| {
                    let base = self.graph.as_ref()?;
                    let mut g = pending?.apply(base);
                    g.updated_at = Timestamp::now();
                    Some(g)
                });
                if let Some(g) = updated {
                    self.graph = Some(g);
                }
                self.mode = ViewMode::Viewing;
                self.reset_from_graph();
                vec![
                    StepSignal::Notice(Notice::Success("Graph updated".into())),
                    StepSignal::GraphUpdated,
                ]
            }
            Ok(other) => {
                debug!("viewer: unexpected reply {other:?}");
                Vec::new()
            }
            Err(e) => vec![StepSignal::Notice(Notice::Error(e.to_string()))],
        }
    }

    /// Export of the canvas as shown plus the stored graph's files and timestamps.
    pub fn export_document(&self) -> ExportDocument {
        let (nodes, edges) = self.canvas.to_records();
        ExportDocument {
            name: normalize_name(&self.name).ok(),
            description: normalize_description(&self.description),
            nodes,
            edges,
            files: self.graph.as_ref().map(|g| g.files.clone()).unwrap_or_default(),
            created_at: self.graph.as_ref().map(|g| g.created_at),
            updated_at: self.graph.as_ref().map(|g| g.updated_at),
            exported_at: Timestamp::now(),
        }
    }

    pub fn export_filename(&self, date: chrono::NaiveDate) -> String {
        let name = self.graph.as_ref().map_or(self.name.as_str(), |g| g.name.as_str());
        export::export_filename(name, date)
    }

    fn export(&self) -> Option<StepSignal> {
        let filename = self.export_filename(export::today());
        match export::save_with_dialog(&filename, &self.export_document()) {
            Ok(Some(path)) => Some(StepSignal::Notice(Notice::Success(format!(
                "Exported to {}",
                path.display()
            )))),
            Ok(None) => None,
            Err(e) => Some(StepSignal::Notice(Notice::Error(e.to_string()))),
        }
    }

    pub fn ui(&mut self, ui: &mut Ui, d: &mut dyn Dispatch) -> Vec<StepSignal> {
        let mut signals = Vec::new();

        match &self.load {
            LoadState::Loading => {
                ui.vertical_centered(|ui| ui.spinner());
                return signals;
            }
            LoadState::Failed(e) => {
                let message = if e.is_not_found() {
                    "Graph not found".to_string()
                } else {
                    e.to_string()
                };
                ui.vertical_centered(|ui| {
                    ui.colored_label(ui.visuals().error_fg_color, message);
                    ui.add_space(SECTION_SPACING);
                    ui.horizontal(|ui| {
                        if ui.button("⬅ Back").clicked() {
                            signals.push(StepSignal::Back);
                        }
                        if ui.button("Retry").clicked() {
                            self.retry(d);
                        }
                    });
                });
                return signals;
            }
            LoadState::Loaded => {}
        }

        let editing = self.mode == ViewMode::Editing;
        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                ui.set_width(SIDE_PANEL_WIDTH);
                self.side_panel(ui, editing, &mut signals);
            });
            ui.separator();
            ui.vertical(|ui| {
                let interaction = if editing {
                    SettingsInteraction::editable()
                } else {
                    SettingsInteraction::read_only()
                };
                let id = self.canvas_id();
                ui.add(
                    CanvasView::new(&mut self.canvas)
                        .with_id(id)
                        .with_interactions(&interaction)
                        .with_navigations(&self.settings_navigation),
                );
            });
        });

        ui.separator();
        ui.horizontal(|ui| {
            if ui.add_enabled(!self.is_saving(), Button::new("⬅ View all")).clicked() {
                signals.push(StepSignal::ViewAll);
            }
            if editing {
                if ui.add_enabled(!self.is_saving(), Button::new("Cancel")).clicked() {
                    self.cancel_editing();
                }
                let label = if self.is_saving() { "Saving…" } else { "💾 Save changes" };
                let save = ui
                    .add_enabled(self.can_save(), Button::new(label))
                    .on_disabled_hover_text("Enter a name to save");
                if save.clicked() {
                    if let Err(e) = self.save_changes(d) {
                        debug!("viewer: save blocked: {e}");
                    }
                }
                if self.is_saving() {
                    ui.spinner();
                }
            } else if ui.button("✏ Edit").clicked() {
                self.open_metadata_dialog();
            }
        });

        self.metadata_modal(ui);
        signals
    }

    fn side_panel(&mut self, ui: &mut Ui, editing: bool, signals: &mut Vec<StepSignal>) {
        if editing {
            ui.label("Name");
            ui.add(TextEdit::singleline(&mut self.name));
            if normalize_name(&self.name).is_err() {
                ui.label(
                    RichText::new(ValidationError::NameRequired.to_string())
                        .small()
                        .color(ui.visuals().warn_fg_color),
                );
            }
            ui.label("Description");
            ui.add(TextEdit::multiline(&mut self.description).desired_rows(3));
        } else {
            ui.heading(&self.name);
            if !self.description.is_empty() {
                ui.label(&self.description);
            }
        }
        ui.add_space(SECTION_SPACING);
        if let Some(g) = &self.graph {
            ui.label(
                RichText::new(format!(
                    "{} files · {} nodes · {} edges",
                    g.files.len(),
                    self.canvas.node_count(),
                    self.canvas.edge_count()
                ))
                .weak(),
            );
            ui.label(RichText::new(format!("Created {}", g.created_at.display_short())).small());
            ui.label(RichText::new(format!("Updated {}", g.updated_at.display_short())).small());
            if !g.tags.is_empty() {
                ui.horizontal_wrapped(|ui| {
                    for tag in &g.tags {
                        ui.label(RichText::new(format!("#{tag}")).small().weak());
                    }
                });
            }
        }
        ui.add_space(SECTION_SPACING);
        if ui.button("⬇ Export JSON").clicked() {
            signals.extend(self.export());
        }
    }

    fn metadata_modal(&mut self, ui: &mut Ui) {
        let Some(draft) = self.metadata_dialog.as_mut() else {
            return;
        };
        let mut start = false;
        let mut cancel = false;
        let resp = egui::Modal::new(egui::Id::new("graph_studio_edit_metadata")).show(
            ui.ctx(),
            |ui| {
                ui.heading("Edit graph");
                ui.label("Name");
                ui.text_edit_singleline(&mut draft.name);
                ui.label("Description");
                ui.add(TextEdit::multiline(&mut draft.description).desired_rows(3));
                ui.add_space(SECTION_SPACING);
                ui.horizontal(|ui| {
                    start = ui.button("Start editing").clicked();
                    cancel = ui.button("Cancel").clicked();
                });
            },
        );
        if start {
            self.start_editing();
        } else if cancel || resp.should_close() {
            self.close_metadata_dialog();
        }
    }
}
