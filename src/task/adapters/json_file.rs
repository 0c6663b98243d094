//! Flat JSON document repository.
//!
//! Every operation loads the whole document, applies the change and writes
//! it back through a temporary file and rename. A missing or unreadable
//! document is treated as an empty registry.

use super::TaskDocument;
use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use std::io;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Task repository persisted as a single JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileTaskRepository {
    file: Arc<StateFile>,
    lock: Arc<Mutex<()>>,
}

#[derive(Debug)]
struct StateFile {
    dir: Utf8PathBuf,
    file_name: String,
}

impl StateFile {
    fn new(path: &Utf8Path) -> Self {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_path_buf);
        let file_name = path.file_name().unwrap_or("tasks.json").to_owned();
        Self { dir, file_name }
    }

    fn temp_name(&self) -> String {
        format!(".{}.tmp", self.file_name)
    }

    fn load(&self) -> TaskDocument {
        let raw = match self.read() {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %self.dir, file = %self.file_name, "no task document yet, starting empty");
                return TaskDocument::default();
            }
            Err(err) => {
                warn!(dir = %self.dir, file = %self.file_name, %err, "failed to read task document, starting empty");
                return TaskDocument::default();
            }
        };

        TaskDocument::from_json(&raw).unwrap_or_else(|err| {
            warn!(dir = %self.dir, file = %self.file_name, %err, "task document is malformed, starting empty");
            TaskDocument::default()
        })
    }

    fn read(&self) -> io::Result<String> {
        let dir = Dir::open_ambient_dir(&self.dir, ambient_authority())?;
        dir.read_to_string(&self.file_name)
    }

    fn save(&self, document: &TaskDocument) -> TaskRepositoryResult<()> {
        let mut rendered = document.to_json().map_err(TaskRepositoryError::persistence)?;
        rendered.push('\n');

        Dir::create_ambient_dir_all(&self.dir, ambient_authority())
            .map_err(TaskRepositoryError::persistence)?;
        let dir = Dir::open_ambient_dir(&self.dir, ambient_authority())
            .map_err(TaskRepositoryError::persistence)?;
        let temp_name = self.temp_name();
        dir.write(&temp_name, rendered)
            .map_err(TaskRepositoryError::persistence)?;
        dir.rename(&temp_name, &dir, &self.file_name)
            .map_err(TaskRepositoryError::persistence)
    }
}

impl JsonFileTaskRepository {
    /// Creates a repository backed by the document at `path`.
    ///
    /// Nothing is touched on disk until the first write.
    #[must_use]
    pub fn new(path: impl AsRef<Utf8Path>) -> Self {
        Self {
            file: Arc::new(StateFile::new(path.as_ref())),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the directory holding the document.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.file.dir
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&StateFile) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let file = Arc::clone(&self.file);
        let lock = Arc::clone(&self.lock);
        tokio::task::spawn_blocking(move || {
            let _guard = lock
                .lock()
                .map_err(|err| TaskRepositoryError::persistence(io::Error::other(err.to_string())))?;
            f(&file)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }

    async fn read_document<T, F>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(TaskDocument) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |file| Ok(f(file.load()))).await
    }

    async fn modify_document<T, F>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut TaskDocument) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |file| {
            let mut document = file.load();
            let output = f(&mut document)?;
            file.save(&document)?;
            Ok(output)
        })
        .await
    }
}

#[async_trait]
impl TaskRepository for JsonFileTaskRepository {
    async fn insert(&self, task: &Task) -> TaskRepositoryResult<()> {
        let owned = task.clone();
        self.modify_document(move |document| document.insert(&owned))
            .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let owned = task.clone();
        self.modify_document(move |document| document.update(&owned))
            .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.read_document(move |document| document.find(id).cloned())
            .await
    }

    async fn list_active(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.read_document(|document| document.active_tasks).await
    }

    async fn list_completed(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.read_document(|document| document.completed_tasks)
            .await
    }

    async fn archive(&self, task: &Task) -> TaskRepositoryResult<()> {
        let owned = task.clone();
        self.modify_document(move |document| document.archive(&owned))
            .await
    }

    async fn remove(&self, id: TaskId) -> TaskRepositoryResult<bool> {
        self.modify_document(move |document| Ok(document.remove(id)))
            .await
    }

    async fn clear(&self) -> TaskRepositoryResult<usize> {
        self.modify_document(|document| Ok(document.clear())).await
    }
}
