//! JSON snapshot store.
//!
//! The whole store lives in one JSON document. Every write takes an
//! exclusive lock on `<path>.lock`, re-reads the snapshot, applies the change
//! to a copy, writes the copy to `<path>.tmp` and renames it over `<path>`.
//! A crash leaves either the old or the new snapshot, and several handles or
//! processes on one file never overwrite each other's records. Reads reload
//! the snapshot, so they see writes made through other handles.

use super::state::StoreState;
use async_trait::async_trait;
use dealflow_application::{StoreError, TaskStore, TaskUpdate, ThreadStore};
use dealflow_domain::{
    CounterpartyKey, NegotiationThread, NewThreadMessage, Task, TaskId, ThreadId, ThreadMessage,
    ThreadStatus, UserId,
};
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// File-backed store for the CLI.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileStore {
    /// Open the snapshot at `path`; a missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = load(&path).await?;
        debug!(path = %path.display(), "Opened JSON store");
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current snapshot from disk.
    async fn snapshot(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        let mut state = self.state.lock().await;
        *state = load(&self.path).await?;
        Ok(state)
    }

    async fn mutate<R>(
        &self,
        apply: impl FnOnce(&mut StoreState) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut state = self.state.lock().await;
        // Released when dropped at the end of this call.
        let _lock = self.lock_file().await?;

        *state = load(&self.path).await?;
        let mut next = state.clone();
        let out = apply(&mut next)?;
        self.persist(&next).await?;
        *state = next;
        Ok(out)
    }

    /// Block until this handle holds the exclusive lock on `<path>.lock`.
    async fn lock_file(&self) -> Result<File, StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        let path = lock_path(&self.path);
        let target = path.clone();
        tokio::task::spawn_blocking(move || {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&target)?;
            file.lock()?;
            Ok::<_, std::io::Error>(file)
        })
        .await
        .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?
        .map_err(|e| io_error(&path, e))
    }

    async fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let tmp = tmp_path(&self.path);
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))
    }
}

/// Read the snapshot at `path`; a missing file is an empty store.
async fn load(path: &Path) -> Result<StoreState, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreState::default()),
        Err(e) => Err(io_error(path, e)),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn tmp_path(path: &Path) -> PathBuf {
    sibling(path, ".tmp")
}

fn lock_path(path: &Path) -> PathBuf {
    sibling(path, ".lock")
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl TaskStore for JsonFileStore {
    async fn insert(&self, task: &Task) -> Result<(), StoreError> {
        self.mutate(|state| state.insert_task(task)).await
    }

    async fn get(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.snapshot().await?.get_task(id))
    }

    async fn update(&self, id: &TaskId, update: TaskUpdate) -> Result<(), StoreError> {
        self.mutate(|state| state.update_task(id, update)).await
    }
}

#[async_trait]
impl ThreadStore for JsonFileStore {
    async fn find_thread(
        &self,
        user_id: &UserId,
        counterparty: &CounterpartyKey,
    ) -> Result<Option<NegotiationThread>, StoreError> {
        Ok(self.snapshot().await?.find_thread(user_id, counterparty))
    }

    async fn get_thread(&self, id: &ThreadId) -> Result<Option<NegotiationThread>, StoreError> {
        Ok(self.snapshot().await?.get_thread(id))
    }

    async fn create_thread(
        &self,
        user_id: &UserId,
        counterparty: &CounterpartyKey,
    ) -> Result<NegotiationThread, StoreError> {
        self.mutate(|state| state.create_thread(user_id, counterparty))
            .await
    }

    async fn set_thread_status(&self, id: &ThreadId, status: ThreadStatus) -> Result<(), StoreError> {
        self.mutate(|state| state.set_thread_status(id, status)).await
    }

    async fn append_message(&self, message: NewThreadMessage) -> Result<ThreadMessage, StoreError> {
        self.mutate(|state| state.append_message(message)).await
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>, StoreError> {
        self.snapshot().await?.list_messages(thread_id)
    }
}
