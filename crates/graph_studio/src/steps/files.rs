//! Picking the uploaded files that become nodes of a new graph.

use std::collections::HashSet;

use egui::{Button, RichText, ScrollArea, TextEdit, Ui};
use log::debug;

use super::{error_with_retry, FetchStatus, StepSignal};
use crate::model::{FileId, FileRef};
use crate::ui_consts::SECTION_SPACING;
use crate::worker::{ApiRequest, ApiResponse, Dispatch, Reply, Ticket};

#[derive(Debug, Default)]
pub struct FileSelectionState {
    files: Vec<FileRef>,
    status: FetchStatus,
    ticket: Option<Ticket>,
    selected: HashSet<FileId>,
    pub filter: String,
}

impl FileSelectionState {
    /// Starts with `preselected` ticked, so going back keeps the choice.
    pub fn new(preselected: &[FileRef]) -> Self {
        Self {
            selected: preselected.iter().map(|f| f.id.clone()).collect(),
            ..Self::default()
        }
    }

    pub fn load(&mut self, d: &mut dyn Dispatch) {
        self.status = FetchStatus::Loading;
        self.ticket = Some(d.dispatch(ApiRequest::ListFiles));
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    /// Files whose name contains the filter, ignoring case.
    pub fn visible(&self) -> Vec<&FileRef> {
        let q = self.filter.trim().to_lowercase();
        self.files
            .iter()
            .filter(|f| q.is_empty() || f.name.to_lowercase().contains(&q))
            .collect()
    }

    pub fn is_selected(&self, id: &FileId) -> bool {
        self.selected.contains(id)
    }

    pub fn toggle(&mut self, id: &FileId) {
        if !self.selected.remove(id) {
            self.selected.insert(id.clone());
        }
    }

    /// Selects every file passing the filter.
    pub fn select_all(&mut self) {
        let ids: Vec<FileId> = self.visible().into_iter().map(|f| f.id.clone()).collect();
        self.selected.extend(ids);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Selected files in listing order.
    pub fn chosen(&self) -> Vec<FileRef> {
        self.files
            .iter()
            .filter(|f| self.selected.contains(&f.id))
            .cloned()
            .collect()
    }

    pub fn can_continue(&self) -> bool {
        self.files.iter().any(|f| self.selected.contains(&f.id))
    }

    pub fn continue_signal(&self) -> Option<StepSignal> {
        self.can_continue()
            .then(|| StepSignal::FilesChosen(self.chosen()))
    }

    pub fn owns(&self, ticket: Ticket) -> bool {
        self.ticket == Some(ticket)
    }

    pub fn on_reply(&mut self, reply: Reply) -> Vec<StepSignal> {
        if !self.owns(reply.ticket) {
            return Vec::new();
        }
        self.ticket = None;
        match reply.result {
            Ok(ApiResponse::Files(files)) => {
                debug!("files: {} uploaded files", files.len());
                let known: HashSet<&FileId> = files.iter().map(|f| &f.id).collect();
                self.selected.retain(|id| known.contains(id));
                self.files = files;
                self.status = FetchStatus::Ready;
            }
            Ok(other) => debug!("files: unexpected reply {other:?}"),
            Err(e) => self.status = FetchStatus::Failed(e.to_string()),
        }
        Vec::new()
    }

    pub fn ui(&mut self, ui: &mut Ui, d: &mut dyn Dispatch) -> Vec<StepSignal> {
        let mut signals = Vec::new();

        ui.horizontal(|ui| {
            ui.add(
                TextEdit::singleline(&mut self.filter)
                    .hint_text("Filter files")
                    .desired_width(220.0),
            );
            if ui.button("Select all").clicked() {
                self.select_all();
            }
            if ui.button("Clear").clicked() {
                self.clear();
            }
        });
        ui.add_space(SECTION_SPACING);

        match self.status.clone() {
            FetchStatus::Failed(message) => {
                if error_with_retry(ui, &message) {
                    self.load(d);
                }
            }
            FetchStatus::Loading | FetchStatus::Idle => {
                ui.vertical_centered(|ui| ui.spinner());
            }
            FetchStatus::Ready if self.files.is_empty() => {
                ui.label("No uploaded files. Upload documents first.");
            }
            FetchStatus::Ready => {
                let rows: Vec<FileRef> = self.visible().into_iter().cloned().collect();
                ScrollArea::vertical()
                    .max_height(ui.available_height() - 40.0)
                    .auto_shrink(false)
                    .show(ui, |ui| {
                        for f in &rows {
                            let mut checked = self.is_selected(&f.id);
                            ui.horizontal(|ui| {
                                if ui.checkbox(&mut checked, &f.name).changed() {
                                    self.toggle(&f.id);
                                }
                                ui.label(
                                    RichText::new(format!(
                                        "{} · {}",
                                        f.file_type.to_uppercase(),
                                        human_size(f.size)
                                    ))
                                    .small()
                                    .weak(),
                                );
                            });
                        }
                    });
            }
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("⬅ Back").clicked() {
                signals.push(StepSignal::Back);
            }
            ui.label(format!("{} selected", self.chosen().len()));
            let next = ui
                .add_enabled(self.can_continue(), Button::new("Continue ➡"))
                .on_disabled_hover_text("Select at least one file");
            if next.clicked() {
                signals.extend(self.continue_signal());
            }
        });
        signals
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;

    struct Counter(u64);

    impl Dispatch for Counter {
        fn dispatch(&mut self, _req: ApiRequest) -> Ticket {
            self.0 += 1;
            self.0
        }
    }

    fn file(id: &str, name: &str) -> FileRef {
        FileRef {
            id: FileId::new(id),
            name: name.to_string(),
            file_type: "pdf".into(),
            size: 2048,
            uploaded_at: None,
        }
    }

    fn ready(files: Vec<FileRef>, preselected: &[FileRef]) -> FileSelectionState {
        let mut s = FileSelectionState::new(preselected);
        let mut d = Counter(0);
        s.load(&mut d);
        s.on_reply(Reply {
            ticket: 1,
            result: Ok(ApiResponse::Files(files)),
        });
        s
    }

    #[test]
    fn continue_requires_a_selection() {
        let mut s = ready(vec![file("a", "a.pdf"), file("b", "b.pdf"), file("c", "c.pdf")], &[]);
        assert!(!s.can_continue());
        assert_eq!(s.continue_signal(), None);

        s.toggle(&FileId::new("c"));
        s.toggle(&FileId::new("a"));
        let Some(StepSignal::FilesChosen(chosen)) = s.continue_signal() else {
            panic!("expected files");
        };
        let ids: Vec<&str> = chosen.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        s.toggle(&FileId::new("a"));
        s.toggle(&FileId::new("c"));
        assert!(!s.can_continue());
    }

    #[test]
    fn filter_and_select_all() {
        let mut s = ready(vec![file("a", "Report.pdf"), file("b", "notes.txt")], &[]);
        s.filter = "REP".into();
        s.select_all();
        s.filter.clear();
        assert!(s.is_selected(&FileId::new("a")));
        assert!(!s.is_selected(&FileId::new("b")));
        s.clear();
        assert!(!s.can_continue());
    }

    #[test]
    fn preselection_survives_reload_if_files_still_exist() {
        let s = ready(vec![file("a", "a.pdf")], &[file("a", "a.pdf"), file("gone", "x")]);
        assert_eq!(s.chosen().len(), 1);
        assert!(!s.is_selected(&FileId::new("gone")));
    }

    #[test]
    fn failed_fetch_and_stale_reply() {
        let mut s = FileSelectionState::new(&[]);
        let mut d = Counter(0);
        s.load(&mut d);
        s.load(&mut d);
        // reply to the superseded first request is ignored
        s.on_reply(Reply {
            ticket: 1,
            result: Ok(ApiResponse::Files(vec![file("a", "a")])),
        });
        assert!(s.files().is_empty());
        s.on_reply(Reply {
            ticket: 2,
            result: Err(ApiError::Http {
                status: 500,
                message: "Internal Server Error".into(),
            }),
        });
        assert_eq!(s.status(), &FetchStatus::Failed("Internal Server Error".into()));
    }

    #[test]
    fn sizes() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }
}
