//! Checkpoint file store with atomic writes and resume scanning

use super::CheckpointError;
use crate::SearchPage;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where a collection's fetch should resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    /// First page index with no checkpoint
    pub next_page: usize,
    /// Whether the stored prefix already contains the collection's final page
    pub complete: bool,
}

/// File-backed checkpoint store.
///
/// Checkpoints are named `{collection}_page_{index}.json` so the fetcher and
/// the processor agree on identity without any shared runtime state.
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CheckpointError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| CheckpointError::Io(format!("creating checkpoint dir: {e}")))?;
        Ok(Self { dir })
    }

    /// Directory the checkpoints live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the checkpoint for one page.
    pub fn path(&self, collection: &str, page: usize) -> PathBuf {
        self.dir.join(format!("{collection}_page_{page}.json"))
    }

    /// Whether the page is already checkpointed.
    pub fn exists(&self, collection: &str, page: usize) -> bool {
        self.path(collection, page).exists()
    }

    /// Persist a page's raw response body.
    ///
    /// The body is written to a temp file in the same directory, flushed,
    /// synced, and renamed into place, so a crash mid-write never leaves a
    /// partial checkpoint behind. A checkpoint is created exactly once:
    /// writing over an existing one is refused.
    pub fn write(&self, collection: &str, page: usize, body: &str) -> Result<(), CheckpointError> {
        let path = self.path(collection, page);

        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| CheckpointError::Io(format!("creating temp checkpoint: {e}")))?;
        temp.write_all(body.as_bytes())
            .map_err(|e| CheckpointError::Io(format!("writing temp checkpoint: {e}")))?;
        temp.flush()
            .map_err(|e| CheckpointError::Io(format!("flushing temp checkpoint: {e}")))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| CheckpointError::Io(format!("syncing temp checkpoint: {e}")))?;

        temp.persist_noclobber(&path).map_err(|e| {
            if path.exists() {
                CheckpointError::AlreadyExists(path.display().to_string())
            } else {
                CheckpointError::Io(format!("persisting checkpoint: {e}"))
            }
        })?;

        debug!(collection, page, path = %path.display(), "checkpoint written");
        Ok(())
    }

    /// Parse one stored page.
    pub fn load(&self, collection: &str, page: usize) -> Result<SearchPage, CheckpointError> {
        let path = self.path(collection, page);
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| CheckpointError::Io(format!("reading {}: {e}", path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| CheckpointError::Io(format!("parsing {}: {e}", path.display())))
    }

    /// Compute where a collection's fetch should resume.
    ///
    /// Scans for the longest contiguous run of checkpointed pages starting at
    /// index 0. If the last page of that run is terminal — fewer issues than
    /// `page_size`, or the declared total already reached — the collection is
    /// complete and needs no network requests at all.
    pub fn resume_point(
        &self,
        collection: &str,
        page_size: usize,
    ) -> Result<ResumePoint, CheckpointError> {
        let mut next_page = 0;
        while self.exists(collection, next_page) {
            next_page += 1;
        }

        if next_page == 0 {
            return Ok(ResumePoint {
                next_page: 0,
                complete: false,
            });
        }

        let last = next_page - 1;
        let complete = match self.load(collection, last) {
            Ok(page) => {
                let fetched = last * page_size + page.issues.len();
                page.issues.len() < page_size || (page.total > 0 && fetched >= page.total)
            }
            Err(e) => {
                // Atomic writes make this unexpected; treat the prefix as
                // incomplete so the page is re-inspected by a live fetch.
                warn!(collection, page = last, error = %e, "unreadable checkpoint during resume scan");
                false
            }
        };

        Ok(ResumePoint {
            next_page,
            complete,
        })
    }
}
