//! Gallery of saved graphs.

use std::cmp::Ordering;

use egui::{Button, ComboBox, RichText, ScrollArea, TextEdit, Ui};
use log::{debug, info};

use super::{error_with_retry, FetchStatus, Notice, StepSignal};
use crate::model::{GraphId, GraphSummary};
use crate::ui_consts::{CARD_DESCRIPTION_CHARS, CARD_WIDTH, SECTION_SPACING};
use crate::worker::{ApiRequest, ApiResponse, Dispatch, Reply, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Name,
    CreatedAt,
    #[default]
    UpdatedAt,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Name, SortKey::CreatedAt, SortKey::UpdatedAt];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::CreatedAt => "Created",
            SortKey::UpdatedAt => "Last updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Summaries whose name or description contains `query`, ignoring case.
/// Whitespace in the query is matched literally; only an empty query keeps
/// everything.
pub fn filter_summaries<'a>(items: &'a [GraphSummary], query: &str) -> Vec<&'a GraphSummary> {
    let q = query.to_lowercase();
    if q.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|g| {
            g.name.to_lowercase().contains(&q)
                || g
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&q))
        })
        .collect()
}

fn compare(a: &GraphSummary, b: &GraphSummary, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

pub fn sort_summaries(items: &mut [&GraphSummary], key: SortKey, order: SortOrder) {
    items.sort_by(|a, b| {
        let ord = compare(a, b, key);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// List of saved graphs with search, sort and confirmed deletion.
///
/// Lives as long as the modal is open so that coming back from another step
/// does not flash an empty list.
#[derive(Debug, Default)]
pub struct GraphsListState {
    graphs: Vec<GraphSummary>,
    total_count: usize,
    status: FetchStatus,
    fetch_ticket: Option<Ticket>,
    pub query: String,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pending_delete: Option<GraphSummary>,
    delete_in_flight: Option<(Ticket, GraphId)>,
    seen_refresh: Option<u64>,
}

impl GraphsListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graphs(&self) -> &[GraphSummary] {
        &self.graphs
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    /// Re-runs the full fetch.
    pub fn fetch(&mut self, d: &mut dyn Dispatch) {
        self.status = FetchStatus::Loading;
        self.fetch_ticket = Some(d.dispatch(ApiRequest::ListGraphs));
    }

    /// Fetches on first mount and whenever `signal` changed since the last fetch.
    pub fn sync_refresh(&mut self, signal: u64, d: &mut dyn Dispatch) {
        if self.seen_refresh != Some(signal) {
            self.seen_refresh = Some(signal);
            self.fetch(d);
        }
    }

    /// Filtered and sorted view of the loaded summaries.
    pub fn visible(&self) -> Vec<&GraphSummary> {
        let mut items = filter_summaries(&self.graphs, &self.query);
        sort_summaries(&mut items, self.sort_key, self.sort_order);
        items
    }

    pub fn open(&self, id: &GraphId) -> StepSignal {
        StepSignal::GraphSelected(id.clone())
    }

    /// Asks for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: &GraphId) {
        self.pending_delete = self.graphs.iter().find(|g| &g.id == id).cloned();
    }

    pub fn pending_confirmation(&self) -> Option<&GraphSummary> {
        self.pending_delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn is_deleting(&self) -> bool {
        self.delete_in_flight.is_some()
    }

    /// Issues the delete confirmed by the user. Without a pending
    /// confirmation, or while another delete runs, nothing is sent.
    pub fn confirm_delete(&mut self, d: &mut dyn Dispatch) -> Option<Ticket> {
        if self.delete_in_flight.is_some() {
            return None;
        }
        let target = self.pending_delete.take()?;
        let ticket = d.dispatch(ApiRequest::DeleteGraph(target.id.clone()));
        self.delete_in_flight = Some((ticket, target.id));
        Some(ticket)
    }

    pub fn owns(&self, ticket: Ticket) -> bool {
        self.fetch_ticket == Some(ticket)
            || self.delete_in_flight.as_ref().is_some_and(|(t, _)| *t == ticket)
    }

    pub fn on_reply(&mut self, reply: Reply) -> Vec<StepSignal> {
        if self.fetch_ticket == Some(reply.ticket) {
            self.fetch_ticket = None;
            match reply.result {
                Ok(ApiResponse::Graphs(listing)) => {
                    info!("list: {} graphs loaded", listing.graphs.len());
                    self.total_count = listing.total_count.max(listing.graphs.len());
                    self.graphs = listing.graphs;
                    self.status = FetchStatus::Ready;
                }
                Ok(other) => {
                    debug!("list: unexpected reply {other:?}");
                }
                Err(e) => self.status = FetchStatus::Failed(e.to_string()),
            }
            return Vec::new();
        }

        let Some((ticket, id)) = self.delete_in_flight.take() else {
            return Vec::new();
        };
        if ticket != reply.ticket {
            self.delete_in_flight = Some((ticket, id));
            return Vec::new();
        }
        match reply.result {
            Ok(_) => {
                let before = self.graphs.len();
                self.graphs.retain(|g| g.id != id);
                self.total_count = self
                    .total_count
                    .saturating_sub(before - self.graphs.len());
                vec![StepSignal::Notice(Notice::Success("Graph deleted".into()))]
            }
            Err(e) => vec![StepSignal::Notice(Notice::Error(e.to_string()))],
        }
    }

    pub fn ui(&mut self, ui: &mut Ui, d: &mut dyn Dispatch) -> Vec<StepSignal> {
        let mut signals = Vec::new();

        ui.horizontal(|ui| {
            ui.add(
                TextEdit::singleline(&mut self.query)
                    .hint_text("Search by name or description")
                    .desired_width(260.0),
            );
            ComboBox::from_id_salt("graphs_sort_key")
                .selected_text(self.sort_key.label())
                .show_ui(ui, |ui| {
                    for key in SortKey::ALL {
                        ui.selectable_value(&mut self.sort_key, key, key.label());
                    }
                });
            let arrow = match self.sort_order {
                SortOrder::Asc => "⬆",
                SortOrder::Desc => "⬇",
            };
            if ui.button(arrow).on_hover_text("Toggle sort order").clicked() {
                self.sort_order = self.sort_order.toggled();
            }
            if ui
                .add_enabled(!self.status.is_loading(), Button::new("⟳ Refresh"))
                .clicked()
            {
                self.fetch(d);
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("➕ New graph").clicked() {
                    signals.push(StepSignal::CreateNew);
                }
            });
        });
        ui.add_space(SECTION_SPACING);

        match self.status.clone() {
            FetchStatus::Failed(message) => {
                if error_with_retry(ui, &message) {
                    self.fetch(d);
                }
            }
            FetchStatus::Loading if self.graphs.is_empty() => {
                ui.vertical_centered(|ui| ui.spinner());
            }
            _ => self.gallery(ui, &mut signals),
        }

        self.confirm_dialog(ui, d);
        signals
    }

    fn gallery(&mut self, ui: &mut Ui, signals: &mut Vec<StepSignal>) {
        let visible: Vec<GraphSummary> = self.visible().into_iter().cloned().collect();
        ui.label(
            RichText::new(format!("{} of {} graphs", visible.len(), self.total_count)).weak(),
        );
        if visible.is_empty() {
            ui.vertical_centered(|ui| {
                ui.label(if self.graphs.is_empty() {
                    "No graphs yet. Create one from your uploaded files."
                } else {
                    "No graphs match the search."
                });
            });
            return;
        }

        let deleting = self.is_deleting();
        ScrollArea::vertical().auto_shrink(false).show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                for g in &visible {
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(CARD_WIDTH);
                        ui.strong(&g.name);
                        if let Some(desc) = &g.description {
                            ui.label(truncate(desc, CARD_DESCRIPTION_CHARS));
                        }
                        ui.label(
                            RichText::new(format!(
                                "{} files · {} nodes · {} edges",
                                g.files_count, g.nodes_count, g.edges_count
                            ))
                            .small(),
                        );
                        ui.label(
                            RichText::new(format!("Updated {}", g.updated_at.display_short()))
                                .small()
                                .weak(),
                        );
                        ui.horizontal(|ui| {
                            if ui.button("Open").clicked() {
                                signals.push(self.open(&g.id));
                            }
                            if ui.add_enabled(!deleting, Button::new("🗑 Delete")).clicked() {
                                self.request_delete(&g.id);
                            }
                        });
                    });
                }
            });
        });
    }

    fn confirm_dialog(&mut self, ui: &mut Ui, d: &mut dyn Dispatch) {
        let Some(target) = self.pending_delete.as_ref() else {
            return;
        };
        let name = target.name.clone();
        let mut confirmed = false;
        let mut cancelled = false;
        let resp = egui::Modal::new(egui::Id::new("graphs_confirm_delete")).show(ui.ctx(), |ui| {
            ui.heading("Delete graph");
            ui.label(format!("Delete \"{name}\"? This cannot be undone."));
            ui.add_space(SECTION_SPACING);
            ui.horizontal(|ui| {
                confirmed = ui.button("Delete").clicked();
                cancelled = ui.button("Cancel").clicked();
            });
        });
        if confirmed {
            self.confirm_delete(d);
        } else if cancelled || resp.should_close() {
            self.cancel_delete();
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;
    use crate::model::{GraphListing, Timestamp};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<ApiRequest>,
    }

    impl Dispatch for Recorder {
        fn dispatch(&mut self, req: ApiRequest) -> Ticket {
            self.sent.push(req);
            self.sent.len() as Ticket
        }
    }

    fn summary(id: &str, name: &str, desc: Option<&str>, updated: i64) -> GraphSummary {
        let ts = Timestamp::from_datetime(Utc.timestamp_opt(updated, 0).unwrap());
        GraphSummary {
            id: GraphId::new(id),
            name: name.to_string(),
            description: desc.map(str::to_string),
            files_count: 0,
            nodes_count: 0,
            edges_count: 0,
            thumbnail: None,
            tags: BTreeSet::new(),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn loaded(graphs: Vec<GraphSummary>) -> (GraphsListState, Recorder) {
        let mut state = GraphsListState::new();
        let mut rec = Recorder::default();
        state.sync_refresh(0, &mut rec);
        let ticket = rec.sent.len() as Ticket;
        state.on_reply(Reply {
            ticket,
            result: Ok(ApiResponse::Graphs(GraphListing {
                total_count: graphs.len(),
                graphs,
            })),
        });
        (state, rec)
    }

    #[test]
    fn search_matches_name_or_description() {
        let items = vec![
            summary("1", "Sales Pipeline", None, 1),
            summary("2", "Contracts", Some("legal SALES docs"), 2),
            summary("3", "Inventory", Some("stock"), 3),
        ];
        let hits: Vec<&str> = filter_summaries(&items, "sales")
            .iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(hits, vec!["1", "2"]);
        assert_eq!(filter_summaries(&items, "").len(), 3);
        assert!(filter_summaries(&items, "zzz").is_empty());
    }

    #[test]
    fn search_keeps_whitespace_in_the_query() {
        let items = vec![summary("1", "xy", None, 1), summary("2", "a x", None, 2)];
        let ids = |q: &str| -> Vec<String> {
            filter_summaries(&items, q)
                .iter()
                .map(|g| g.id.as_str().to_string())
                .collect()
        };
        assert_eq!(ids(" x"), vec!["2"]);
        assert_eq!(ids(" "), vec!["2"]);
        assert_eq!(ids("x"), vec!["1", "2"]);
    }

    #[test]
    fn default_sort_is_most_recent_first() {
        let (state, _) = loaded(vec![
            summary("old", "b", None, 10),
            summary("new", "a", None, 30),
            summary("mid", "c", None, 20),
        ]);
        let ids: Vec<&str> = state.visible().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn refresh_signal_refetches_only_on_change() {
        let mut state = GraphsListState::new();
        let mut rec = Recorder::default();
        state.sync_refresh(0, &mut rec);
        state.sync_refresh(0, &mut rec);
        assert_eq!(rec.sent.len(), 1);
        state.sync_refresh(1, &mut rec);
        assert_eq!(rec.sent, vec![ApiRequest::ListGraphs, ApiRequest::ListGraphs]);
        assert!(state.status().is_loading());
    }

    #[test]
    fn failed_fetch_is_reported_inline() {
        let mut state = GraphsListState::new();
        let mut rec = Recorder::default();
        state.fetch(&mut rec);
        let signals = state.on_reply(Reply {
            ticket: 1,
            result: Err(ApiError::Transport("connection refused".into())),
        });
        assert!(signals.is_empty());
        assert_eq!(
            state.status(),
            &FetchStatus::Failed("network error: connection refused".into())
        );
    }

    #[test]
    fn delete_needs_confirmation() {
        let (mut state, mut rec) =
            loaded(vec![summary("g1", "A", None, 1), summary("g2", "B", None, 2)]);
        let sent_before = rec.sent.len();
        assert_eq!(state.confirm_delete(&mut rec), None);
        assert_eq!(rec.sent.len(), sent_before);

        state.request_delete(&GraphId::new("g1"));
        assert_eq!(state.pending_confirmation().map(|g| g.name.as_str()), Some("A"));
        state.cancel_delete();
        assert_eq!(state.confirm_delete(&mut rec), None);

        state.request_delete(&GraphId::new("g1"));
        let ticket = state.confirm_delete(&mut rec).unwrap();
        assert_eq!(rec.sent.last(), Some(&ApiRequest::DeleteGraph(GraphId::new("g1"))));
        assert!(state.owns(ticket));

        let signals = state.on_reply(Reply {
            ticket,
            result: Ok(ApiResponse::Deleted(GraphId::new("g1"))),
        });
        assert_eq!(signals.len(), 1);
        let ids: Vec<&str> = state.graphs().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["g2"]);
        assert_eq!(state.total_count(), 1);
    }

    #[test]
    fn failed_delete_keeps_list() {
        let (mut state, mut rec) = loaded(vec![summary("g1", "A", None, 1)]);
        state.request_delete(&GraphId::new("g1"));
        let ticket = state.confirm_delete(&mut rec).unwrap();
        let signals = state.on_reply(Reply {
            ticket,
            result: Err(ApiError::Rejected("Graph is locked".into())),
        });
        assert_eq!(
            signals,
            vec![StepSignal::Notice(Notice::Error("Graph is locked".into()))]
        );
        assert_eq!(state.graphs().len(), 1);
        assert!(!state.is_deleting());
    }

    fn arb_summaries() -> impl Strategy<Value = Vec<GraphSummary>> {
        prop::collection::vec(
            ("[a-zA-Z ]{0,12}", proptest::option::of("[a-zA-Z ]{0,12}")),
            0..20,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (name, desc))| {
                    summary(&i.to_string(), &name, desc.as_deref(), i as i64 * 60)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn filter_is_exact_and_idempotent(items in arb_summaries(), query in "[a-zA-Z ]{0,3}") {
            let once: Vec<GraphSummary> = filter_summaries(&items, &query).into_iter().cloned().collect();
            let q = query.to_lowercase();
            for g in &items {
                let hit = g.name.to_lowercase().contains(&q)
                    || g.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&q));
                prop_assert_eq!(hit, once.iter().any(|o| o.id == g.id));
            }
            let twice: Vec<GraphSummary> = filter_summaries(&once, &query).into_iter().cloned().collect();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn updated_desc_reverses_asc(items in arb_summaries()) {
            let mut asc: Vec<&GraphSummary> = items.iter().collect();
            let mut desc: Vec<&GraphSummary> = items.iter().collect();
            sort_summaries(&mut asc, SortKey::UpdatedAt, SortOrder::Asc);
            sort_summaries(&mut desc, SortKey::UpdatedAt, SortOrder::Desc);
            desc.reverse();
            prop_assert_eq!(asc, desc);
        }

        #[test]
        fn name_sort_is_ordered(items in arb_summaries()) {
            let mut sorted: Vec<&GraphSummary> = items.iter().collect();
            sort_summaries(&mut sorted, SortKey::Name, SortOrder::Asc);
            for pair in sorted.windows(2) {
                prop_assert_ne!(compare(pair[0], pair[1], SortKey::Name), Ordering::Greater);
            }
        }
    }
}
