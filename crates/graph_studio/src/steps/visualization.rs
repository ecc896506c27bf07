//! Arranging the selected files on the canvas and saving them as a new graph.

use egui::{Button, RichText, TextEdit, Ui};
use log::{debug, info};

use super::{normalize_description, normalize_name, Notice, StepSignal, ValidationError};
use crate::canvas::{CanvasView, GraphCanvas};
use crate::export::{self, ExportDocument};
use crate::layout::seed_nodes;
use crate::model::{CreateGraphRequest, FileRef, Timestamp};
use crate::settings::{SettingsInteraction, SettingsNavigation};
use crate::ui_consts::{SECTION_SPACING, SIDE_PANEL_WIDTH};
use crate::wizard::WizardError;
use crate::worker::{ApiRequest, ApiResponse, Dispatch, Reply, Ticket};

pub struct VisualizationState {
    files: Vec<FileRef>,
    canvas: GraphCanvas,
    pub name: String,
    pub description: String,
    save_ticket: Option<Ticket>,
    settings_interaction: SettingsInteraction,
    settings_navigation: SettingsNavigation,
}

impl VisualizationState {
    /// Seeds one node per file on a circle. An empty file list is refused.
    pub fn new(files: Vec<FileRef>) -> Result<Self, WizardError> {
        if files.is_empty() {
            return Err(WizardError::NoFilesSelected);
        }
        let canvas = GraphCanvas::from_records(&seed_nodes(&files), &[]);
        info!("visualization: seeded {} nodes", canvas.node_count());
        Ok(Self {
            files,
            canvas,
            name: String::new(),
            description: String::new(),
            save_ticket: None,
            settings_interaction: SettingsInteraction::editable(),
            settings_navigation: SettingsNavigation::default(),
        })
    }

    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    pub fn canvas(&self) -> &GraphCanvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut GraphCanvas {
        &mut self.canvas
    }

    pub fn is_saving(&self) -> bool {
        self.save_ticket.is_some()
    }

    pub fn can_save(&self) -> bool {
        !self.is_saving() && normalize_name(&self.name).is_ok()
    }

    /// Create request from the current canvas and the originally selected files.
    pub fn build_request(&self) -> Result<CreateGraphRequest, ValidationError> {
        let name = normalize_name(&self.name)?;
        let (nodes, edges) = self.canvas.to_records();
        Ok(CreateGraphRequest {
            name,
            description: normalize_description(&self.description),
            nodes,
            edges,
            files: self.files.clone(),
            thumbnail: None,
            tags: Default::default(),
        })
    }

    pub fn save(&mut self, d: &mut dyn Dispatch) -> Result<Ticket, ValidationError> {
        if self.is_saving() {
            return Err(ValidationError::SaveInFlight);
        }
        let req = self.build_request()?;
        let ticket = d.dispatch(ApiRequest::CreateGraph(req));
        self.save_ticket = Some(ticket);
        Ok(ticket)
    }

    pub fn owns(&self, ticket: Ticket) -> bool {
        self.save_ticket == Some(ticket)
    }

    pub fn on_reply(&mut self, reply: Reply) -> Vec<StepSignal> {
        if !self.owns(reply.ticket) {
            return Vec::new();
        }
        self.save_ticket = None;
        match reply.result {
            Ok(ApiResponse::Created(graph)) => {
                if let Some(g) = &graph {
                    info!("visualization: saved as {}", g.id);
                }
                self.name.clear();
                self.description.clear();
                vec![
                    StepSignal::Notice(Notice::Success("Graph saved".into())),
                    StepSignal::GraphSaved,
                ]
            }
            Ok(other) => {
                debug!("visualization: unexpected reply {other:?}");
                Vec::new()
            }
            Err(e) => vec![StepSignal::Notice(Notice::Error(e.to_string()))],
        }
    }

    pub fn export_document(&self) -> ExportDocument {
        let (nodes, edges) = self.canvas.to_records();
        ExportDocument {
            name: normalize_name(&self.name).ok(),
            description: normalize_description(&self.description),
            nodes,
            edges,
            files: self.files.clone(),
            created_at: None,
            updated_at: None,
            exported_at: Timestamp::now(),
        }
    }

    pub fn export_filename(&self, date: chrono::NaiveDate) -> String {
        export::export_filename(&self.name, date)
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

        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                ui.set_width(SIDE_PANEL_WIDTH);
                ui.label("Name");
                ui.add(TextEdit::singleline(&mut self.name).hint_text("Graph name"));
                if normalize_name(&self.name).is_err() {
                    ui.label(
                        RichText::new(ValidationError::NameRequired.to_string())
                            .small()
                            .color(ui.visuals().warn_fg_color),
                    );
                }
                ui.add_space(SECTION_SPACING);
                ui.label("Description");
                ui.add(
                    TextEdit::multiline(&mut self.description)
                        .hint_text("Optional")
                        .desired_rows(3),
                );
                ui.add_space(SECTION_SPACING);
                ui.label(
                    RichText::new(format!(
                        "{} nodes · {} edges",
                        self.canvas.node_count(),
                        self.canvas.edge_count()
                    ))
                    .weak(),
                );
                ui.label(
                    RichText::new(
                        "Drag to move. Shift-drag between nodes to connect. \
                         Click to select, Delete to remove.",
                    )
                    .small()
                    .weak(),
                );
                ui.add_space(SECTION_SPACING);
                if ui.button("⬇ Export JSON").clicked() {
                    signals.extend(self.export());
                }
            });
            ui.separator();
            ui.vertical(|ui| {
                ui.add(
                    CanvasView::new(&mut self.canvas)
                        .with_id("graph_studio_visualization")
                        .with_interactions(&self.settings_interaction)
                        .with_navigations(&self.settings_navigation),
                );
            });
        });

        ui.separator();
        ui.horizontal(|ui| {
            if ui.add_enabled(!self.is_saving(), Button::new("⬅ Back")).clicked() {
                signals.push(StepSignal::Back);
            }
            let label = if self.is_saving() { "Saving…" } else { "💾 Save graph" };
            let save = ui
                .add_enabled(self.can_save(), Button::new(label))
                .on_disabled_hover_text("Enter a name to save");
            if save.clicked() {
                if let Err(e) = self.save(d) {
                    debug!("visualization: save blocked: {e}");
                }
            }
            if self.is_saving() {
                ui.spinner();
            }
        });
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;
    use crate::model::FileId;
    use chrono::NaiveDate;

    #[derive(Default)]
    struct Recorder(Vec<ApiRequest>);

    impl Dispatch for Recorder {
        fn dispatch(&mut self, req: ApiRequest) -> Ticket {
            self.0.push(req);
            self.0.len() as Ticket
        }
    }

    fn files() -> Vec<FileRef> {
        ["a.csv", "b.pdf", "c.txt"]
            .iter()
            .enumerate()
            .map(|(i, name)| FileRef {
                id: FileId::new(format!("f{i}")),
                name: (*name).to_string(),
                file_type: name.rsplit('.').next().unwrap_or_default().to_string(),
                size: 1,
                uploaded_at: None,
            })
            .collect()
    }

    #[test]
    fn rejects_empty_selection() {
        assert!(matches!(
            VisualizationState::new(vec![]),
            Err(WizardError::NoFilesSelected)
        ));
    }

    #[test]
    fn seeds_nodes_from_files() {
        let s = VisualizationState::new(files()).unwrap();
        let nodes = s.canvas().node_records();
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["f0", "f1", "f2"]);
        assert_eq!(nodes[1].data.subtitle.as_deref(), Some("PDF"));
        assert_eq!(s.canvas().edge_count(), 0);
    }

    #[test]
    fn blank_name_never_saves() {
        let mut s = VisualizationState::new(files()).unwrap();
        let mut rec = Recorder::default();
        for name in ["", "   ", "\t\n"] {
            s.name = name.to_string();
            assert!(!s.can_save());
            assert_eq!(s.save(&mut rec), Err(ValidationError::NameRequired));
        }
        assert!(rec.0.is_empty());
    }

    #[test]
    fn save_payload_and_gating() {
        let mut s = VisualizationState::new(files()).unwrap();
        s.canvas_mut().connect_ids("f0", "f1").unwrap();
        s.name = "  Budget  ".into();
        s.description = "   ".into();
        let mut rec = Recorder::default();
        let ticket = s.save(&mut rec).unwrap();
        assert!(!s.can_save());
        assert_eq!(s.save(&mut rec), Err(ValidationError::SaveInFlight));
        assert_eq!(rec.0.len(), 1);

        let ApiRequest::CreateGraph(req) = &rec.0[0] else {
            panic!("expected create");
        };
        assert_eq!(req.name, "Budget");
        assert_eq!(req.description, None);
        assert_eq!(req.nodes.len(), 3);
        assert_eq!(req.edges.len(), 1);
        assert_eq!(req.files, files());

        let signals = s.on_reply(Reply {
            ticket,
            result: Ok(ApiResponse::Created(None)),
        });
        assert_eq!(signals.last(), Some(&StepSignal::GraphSaved));
        assert!(s.name.is_empty());
    }

    #[test]
    fn failed_save_keeps_canvas_and_fields() {
        let mut s = VisualizationState::new(files()).unwrap();
        s.canvas_mut().connect_ids("f0", "f2").unwrap();
        s.name = "Budget".into();
        let mut rec = Recorder::default();
        let ticket = s.save(&mut rec).unwrap();
        let signals = s.on_reply(Reply {
            ticket,
            result: Err(ApiError::Rejected("Graph name already exists".into())),
        });
        assert_eq!(
            signals,
            vec![StepSignal::Notice(Notice::Error(
                "Graph name already exists".into()
            ))]
        );
        assert_eq!(s.name, "Budget");
        assert_eq!(s.canvas().edge_count(), 1);
        assert!(s.can_save());
    }

    #[test]
    fn export_names() {
        let mut s = VisualizationState::new(files()).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(s.export_filename(date), "file-network-2024-02-29.json");
        s.name = "Q1 Review".into();
        assert_eq!(s.export_filename(date), "q1_review-2024-02-29.json");
        let doc = s.export_document();
        assert_eq!(doc.files.len(), 3);
        assert_eq!(doc.name.as_deref(), Some("Q1 Review"));
    }
}
