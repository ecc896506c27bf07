mod common;

use common::{settle, Immediate};
use graph_studio::status::StatusQueue;
use graph_studio::steps::{FetchStatus, StepSignal, ViewMode};
use graph_studio::{GraphsModal, InMemoryGraphApi, WizardStep};

fn opened() -> (GraphsModal, Immediate, StatusQueue) {
    let mut modal = GraphsModal::new();
    let mut d = Immediate::new(InMemoryGraphApi::with_sample_files());
    let mut status = StatusQueue::new();
    modal.open(&mut d);
    settle(&mut modal, &mut d, &mut status);
    (modal, d, status)
}

fn send(modal: &mut GraphsModal, d: &mut Immediate, status: &mut StatusQueue, signal: StepSignal) {
    modal.apply_signals(vec![signal], d, status);
    settle(modal, d, status);
}

#[test]
fn create_then_view_then_edit() {
    let (mut modal, mut d, mut status) = opened();
    assert_eq!(modal.list().status(), &FetchStatus::Ready);
    assert!(modal.list().graphs().is_empty());

    send(&mut modal, &mut d, &mut status, StepSignal::CreateNew);
    assert_eq!(modal.step(), WizardStep::FileSelection);
    let files = modal.files_mut().unwrap();
    assert_eq!(files.files().len(), 5);
    files.select_all();
    let chosen = files.continue_signal().unwrap();
    send(&mut modal, &mut d, &mut status, chosen);

    assert_eq!(modal.step(), WizardStep::GraphVisualization);
    let vis = modal.visualization_mut().unwrap();
    assert_eq!(vis.canvas().node_count(), 5);
    assert!(vis.canvas_mut().connect_ids("file-1", "file-2").is_some());
    vis.name = "Quarterly docs".into();
    vis.save(&mut d).unwrap();
    settle(&mut modal, &mut d, &mut status);

    // back on a refreshed list with a toast
    assert_eq!(modal.step(), WizardStep::GraphsList);
    assert_eq!(modal.wizard().refresh_signal(), 1);
    assert!(modal.wizard().selected_files().is_empty());
    assert_eq!(modal.list().graphs().len(), 1);
    assert_eq!(status.latest().map(|m| m.text.as_str()), Some("Graph saved"));
    assert_eq!(d.api.calls().list, 2);

    let id = modal.list().graphs()[0].id.clone();
    assert_eq!(modal.list().graphs()[0].edges_count, 1);
    send(&mut modal, &mut d, &mut status, StepSignal::GraphSelected(id.clone()));
    assert_eq!(modal.step(), WizardStep::GraphViewer);

    let viewer = modal.viewer_mut().unwrap();
    assert_eq!(viewer.mode(), ViewMode::Viewing);
    assert_eq!(viewer.name, "Quarterly docs");
    viewer.open_metadata_dialog();
    viewer.start_editing();
    viewer.description = "Q3".into();
    viewer.save_changes(&mut d).unwrap();
    settle(&mut modal, &mut d, &mut status);

    assert_eq!(modal.step(), WizardStep::GraphViewer);
    assert_eq!(modal.wizard().refresh_signal(), 2);
    assert_eq!(modal.viewer_mut().unwrap().mode(), ViewMode::Viewing);
    assert_eq!(status.latest().map(|m| m.text.as_str()), Some("Graph updated"));

    send(&mut modal, &mut d, &mut status, StepSignal::ViewAll);
    assert_eq!(modal.step(), WizardStep::GraphsList);
    assert_eq!(d.api.calls().list, 3);
    assert_eq!(
        modal.list().graphs()[0].description.as_deref(),
        Some("Q3")
    );
}

#[test]
fn failed_save_opens_error_dialog_and_keeps_step() {
    let (mut modal, mut d, mut status) = opened();
    send(&mut modal, &mut d, &mut status, StepSignal::CreateNew);
    let files = modal.files_mut().unwrap();
    files.select_all();
    let chosen = files.continue_signal().unwrap();
    send(&mut modal, &mut d, &mut status, chosen);

    d.api.fail_next("Graph name already exists");
    let vis = modal.visualization_mut().unwrap();
    vis.name = "Dup".into();
    vis.save(&mut d).unwrap();
    settle(&mut modal, &mut d, &mut status);

    assert_eq!(modal.step(), WizardStep::GraphVisualization);
    assert_eq!(modal.error_message(), Some("Graph name already exists"));
    assert_eq!(modal.visualization_mut().unwrap().name, "Dup");
    assert!(status.is_empty());
}

#[test]
fn missing_graph_shows_not_found_and_back_returns() {
    let (mut modal, mut d, mut status) = opened();
    send(
        &mut modal,
        &mut d,
        &mut status,
        StepSignal::GraphSelected(graph_studio::GraphId::new("gone")),
    );
    let viewer = modal.viewer_mut().unwrap();
    assert!(viewer.load_error().is_some_and(|e| e.is_not_found()));

    send(&mut modal, &mut d, &mut status, StepSignal::Back);
    assert_eq!(modal.step(), WizardStep::GraphsList);
    assert!(modal.wizard().selected_graph_id().is_none());
}

#[test]
fn close_resets_everything() {
    let (mut modal, mut d, mut status) = opened();
    send(&mut modal, &mut d, &mut status, StepSignal::CreateNew);
    modal.files_mut().unwrap().select_all();
    modal.close();

    assert!(!modal.is_open());
    assert_eq!(modal.step(), WizardStep::GraphsList);
    assert!(modal.files_mut().is_none());
    assert_eq!(modal.list().status(), &FetchStatus::Idle);

    // reopening fetches again
    modal.open(&mut d);
    settle(&mut modal, &mut d, &mut status);
    assert_eq!(d.api.calls().list, 2);
}
