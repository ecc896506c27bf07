//! eframe shell hosting the graphs modal.

use eframe::{App, CreationContext, Frame};
use egui::{CentralPanel, Context, RichText, TopBottomPanel};
use log::{debug, info};

use crate::config::{Backend, StudioConfig};
use crate::modal::GraphsModal;
use crate::status::StatusQueue;
use crate::ui_consts::{INFO_TEXT_SIZE, SECTION_SPACING, UI_MARGIN};
use crate::worker::ApiWorker;

pub const APP_NAME: &str = "Graph Studio";

pub struct GraphStudioApp {
    worker: ApiWorker,
    modal: GraphsModal,
    status: StatusQueue,
    backend: String,
}

impl GraphStudioApp {
    pub fn new(cc: &CreationContext<'_>, config: &StudioConfig) -> Self {
        let worker = ApiWorker::new(config.build_client()).with_repaint(cc.egui_ctx.clone());
        let backend = match config.api.backend {
            Backend::Http => config.api.base_url.clone(),
            Backend::Memory => Backend::Memory.to_string(),
        };
        info!("{APP_NAME} started against {backend}");

        let mut status = StatusQueue::new();
        if config.api.backend == Backend::Memory {
            status.push_info("Using the in-memory backend; nothing is persisted");
        }
        Self {
            worker,
            modal: GraphsModal::new(),
            status,
            backend,
        }
    }

    fn pump_replies(&mut self) {
        for reply in self.worker.drain() {
            self.modal.handle_reply(reply, &mut self.worker, &mut self.status);
        }
    }
}

impl App for GraphStudioApp {
    fn update(&mut self, ctx: &Context, _: &mut Frame) {
        self.pump_replies();

        TopBottomPanel::bottom("graph_studio_footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("backend: {}", self.backend)).size(INFO_TEXT_SIZE));
                if self.worker.in_flight() > 0 {
                    ui.spinner();
                }
            });
        });

        CentralPanel::default().show(ctx, |ui| {
            ui.add_space(UI_MARGIN);
            ui.heading(APP_NAME);
            ui.label("Build graphs from your uploaded documents and keep them with the analysis.");
            ui.add_space(SECTION_SPACING);
            if ui.button("🗂 Open graphs").clicked() {
                self.modal.open(&mut self.worker);
            }
        });

        if self.modal.show(ctx, &mut self.worker, &mut self.status) {
            debug!("modal closed, {} requests in flight", self.worker.in_flight());
        }
        self.status.show(ctx);
    }
}
