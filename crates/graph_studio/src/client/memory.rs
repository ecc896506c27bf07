use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::info;

use super::{ApiError, GraphApi};
use crate::model::{
    CreateGraphRequest, FileId, FileRef, Graph, GraphId, GraphListing, GraphSummary, Timestamp,
    UpdateGraphRequest,
};

#[derive(Default)]
struct Store {
    graphs: Vec<Graph>,
    files: Vec<FileRef>,
    fail_next: Option<String>,
}

/// Number of calls made per operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub create: usize,
    pub list: usize,
    pub get: usize,
    pub update: usize,
    pub delete: usize,
    pub files: usize,
}

#[derive(Default)]
struct Counters {
    create: AtomicUsize,
    list: AtomicUsize,
    get: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
    files: AtomicUsize,
}

/// In-process graph store with the same contract as the HTTP service:
/// server-assigned ids and timestamps, not-found errors and echoed graphs.
#[derive(Default)]
pub struct InMemoryGraphApi {
    store: Mutex<Store>,
    next_id: AtomicU64,
    counters: Counters,
}

impl InMemoryGraphApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(files: Vec<FileRef>) -> Self {
        let api = Self::new();
        api.lock().files = files;
        api
    }

    /// A handful of uploaded documents for offline use.
    pub fn with_sample_files() -> Self {
        let uploaded = Timestamp::now();
        let files = [
            ("sales_q1.csv", "csv", 48_213),
            ("contracts.pdf", "pdf", 1_204_551),
            ("meeting-notes.docx", "docx", 30_720),
            ("inventory.xlsx", "xlsx", 88_004),
            ("readme.txt", "txt", 2_048),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (name, kind, size))| FileRef {
            id: FileId::new(format!("file-{}", i + 1)),
            name: name.to_string(),
            file_type: kind.to_string(),
            size,
            uploaded_at: Some(uploaded),
        })
        .collect();
        Self::with_files(files)
    }

    /// Makes the next call of any kind fail with `Rejected(message)`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock().fail_next = Some(message.into());
    }

    pub fn graph_count(&self) -> usize {
        self.lock().graphs.len()
    }

    pub fn calls(&self) -> CallCounts {
        let c = &self.counters;
        CallCounts {
            create: c.create.load(Ordering::SeqCst),
            list: c.list.load(Ordering::SeqCst),
            get: c.get.load(Ordering::SeqCst),
            update: c.update.load(Ordering::SeqCst),
            delete: c.delete.load(Ordering::SeqCst),
            files: c.files.load(Ordering::SeqCst),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts the call and takes the store, or fails if a failure is queued.
    fn enter(&self, counter: &AtomicUsize) -> Result<MutexGuard<'_, Store>, ApiError> {
        counter.fetch_add(1, Ordering::SeqCst);
        let mut store = self.lock();
        match store.fail_next.take() {
            Some(message) => Err(ApiError::Rejected(message)),
            None => Ok(store),
        }
    }

    fn next_graph_id(&self) -> GraphId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        GraphId::new(format!("graph-{n}"))
    }
}

impl GraphApi for InMemoryGraphApi {
    fn create_graph(&self, req: &CreateGraphRequest) -> Result<Option<Graph>, ApiError> {
        let mut store = self.enter(&self.counters.create)?;
        let now = Timestamp::now();
        let graph = Graph {
            id: self.next_graph_id(),
            name: req.name.clone(),
            description: req.description.clone(),
            nodes: req.nodes.clone(),
            edges: req.edges.clone(),
            files: req.files.clone(),
            thumbnail: req.thumbnail.clone(),
            tags: req.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        info!("memory backend: created {} ({})", graph.id, graph.name);
        store.graphs.push(graph.clone());
        Ok(Some(graph))
    }

    fn list_graphs(&self) -> Result<GraphListing, ApiError> {
        let store = self.enter(&self.counters.list)?;
        let graphs: Vec<GraphSummary> = store.graphs.iter().map(GraphSummary::from).collect();
        Ok(GraphListing {
            total_count: graphs.len(),
            graphs,
        })
    }

    fn get_graph(&self, id: &GraphId) -> Result<Graph, ApiError> {
        let store = self.enter(&self.counters.get)?;
        store
            .graphs
            .iter()
            .find(|g| &g.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(id.clone()))
    }

    fn update_graph(
        &self,
        id: &GraphId,
        req: &UpdateGraphRequest,
    ) -> Result<Option<Graph>, ApiError> {
        let mut store = self.enter(&self.counters.update)?;
        let slot = store
            .graphs
            .iter_mut()
            .find(|g| &g.id == id)
            .ok_or_else(|| ApiError::NotFound(id.clone()))?;
        let mut updated = req.apply(slot);
        updated.updated_at = Timestamp::now().max(slot.updated_at);
        *slot = updated.clone();
        Ok(Some(updated))
    }

    fn delete_graph(&self, id: &GraphId) -> Result<(), ApiError> {
        let mut store = self.enter(&self.counters.delete)?;
        let before = store.graphs.len();
        store.graphs.retain(|g| &g.id != id);
        if store.graphs.len() == before {
            return Err(ApiError::NotFound(id.clone()));
        }
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<FileRef>, ApiError> {
        let store = self.enter(&self.counters.files)?;
        Ok(store.files.clone())
    }
}
