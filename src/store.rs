use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("project {0} could not be loaded")]
    LoadFailed(String),
    #[error("store rejected the write: {0}")]
    WriteFailed(String),
}

/// A frame as exchanged with the project store, keyed by its dense index
/// within the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame_index: usize,
    pub raster: Vec<u8>,
    pub thumbnail: Vec<u8>,
}

/// The persistence collaborator owned by the surrounding application.
///
/// The engine calls `save_frame` on every committed edit and treats failures
/// as non-fatal: in-memory state is the source of truth, is never rolled back
/// because a save failed, and editing never blocks on the store. Retry and
/// backoff policy belong to the implementation, not the engine.
pub trait ProjectStore {
    /// Ordered frames for a project; empty when the project is new.
    fn load_frames(&self, project_id: &str) -> Result<Vec<FrameRecord>, StoreError>;

    /// Upsert one frame keyed by `(project_id, frame_index)`.
    fn save_frame(&self, project_id: &str, record: FrameRecord) -> Result<(), StoreError>;
}

/// Stores shared between a session and its host work through `Arc`.
impl<S: ProjectStore + ?Sized> ProjectStore for std::sync::Arc<S> {
    fn load_frames(&self, project_id: &str) -> Result<Vec<FrameRecord>, StoreError> {
        (**self).load_frames(project_id)
    }

    fn save_frame(&self, project_id: &str, record: FrameRecord) -> Result<(), StoreError> {
        (**self).save_frame(project_id, record)
    }
}

/// In-memory store for tests and hosts without durable persistence.
///
/// Writes can be forced to fail with `set_fail_writes` to exercise the
/// engine's non-fatal persistence path.
#[derive(Default)]
pub struct MemoryStore {
    projects: Mutex<HashMap<String, BTreeMap<usize, FrameRecord>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of frames stored for a project.
    pub fn frame_count(&self, project_id: &str) -> usize {
        self.projects.lock().get(project_id).map_or(0, |frames| frames.len())
    }

    /// A copy of one stored frame, if present.
    pub fn frame(&self, project_id: &str, frame_index: usize) -> Option<FrameRecord> {
        self.projects.lock().get(project_id)?.get(&frame_index).cloned()
    }
}

impl ProjectStore for MemoryStore {
    fn load_frames(&self, project_id: &str) -> Result<Vec<FrameRecord>, StoreError> {
        let projects = self.projects.lock();
        Ok(projects.get(project_id).map(|frames| frames.values().cloned().collect()).unwrap_or_default())
    }

    fn save_frame(&self, project_id: &str, record: FrameRecord) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed("memory store is in failure mode".into()));
        }
        let mut projects = self.projects.lock();
        projects.entry(project_id.to_owned()).or_default().insert(record.frame_index, record);
        Ok(())
    }
}
