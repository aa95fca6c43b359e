use tracing::debug;

use crate::domain::models::file::{FileIdentity, QueuedFile};

/// Files selected by the user but not uploaded yet, in selection order.
/// Never holds two entries with the same identity.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: Vec<QueuedFile>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every candidate whose (name, size) is not queued yet and
    /// returns the identities that were actually added. Duplicates are
    /// skipped silently; zero-byte files are accepted.
    pub fn add_files<I>(&mut self, candidates: I) -> Vec<FileIdentity>
    where
        I: IntoIterator<Item = QueuedFile>,
    {
        let mut added = Vec::new();

        for candidate in candidates {
            let identity = candidate.identity();
            if self.entries.iter().any(|f| f.identity() == identity) {
                debug!(name = %identity.name, size = identity.size, "File already queued");
                continue;
            }
            self.entries.push(candidate);
            added.push(identity);
        }

        added
    }

    /// Removes the first entry named `name`. No-op when absent.
    pub fn remove_file(&mut self, name: &str) -> Option<QueuedFile> {
        let index = self.entries.iter().position(|f| f.name == name)?;
        Some(self.entries.remove(index))
    }

    pub fn entries(&self) -> &[QueuedFile] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(QueuedFile::size).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
