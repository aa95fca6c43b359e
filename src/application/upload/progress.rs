use uuid::Uuid;

use crate::domain::models::upload::UploadProgress;

/// Aggregates per-file byte counts of a sequential upload pass into one
/// percentage. Transferred bytes never exceed the total and the reported
/// percentage never decreases.
#[derive(Debug)]
pub struct ProgressTracker {
    session_id: Uuid,
    names: Vec<String>,
    sizes: Vec<u64>,
    total_bytes: u64,
    finished_bytes: u64,
    finished_files: usize,
    current: Option<(usize, u64)>,
    last_percent: u8,
}

impl ProgressTracker {
    pub fn new<I>(session_id: Uuid, files: I) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let (names, sizes): (Vec<_>, Vec<_>) = files.into_iter().unzip();
        let total_bytes = sizes.iter().sum();

        Self {
            session_id,
            names,
            sizes,
            total_bytes,
            finished_bytes: 0,
            finished_files: 0,
            current: None,
            last_percent: 0,
        }
    }

    /// Marks entry `index` as in flight with nothing transferred yet.
    pub fn begin(&mut self, index: usize) -> UploadProgress {
        self.current = Some((index, 0));
        self.snapshot()
    }

    /// Records `bytes` reported for entry `index`, which must be the entry in
    /// flight. Reports beyond the entry's size are capped.
    pub fn record(&mut self, index: usize, bytes: u64) -> UploadProgress {
        let size = self.sizes.get(index).copied().unwrap_or(0);
        let previous = match self.current {
            Some((i, b)) if i == index => b,
            _ => 0,
        };
        self.current = Some((index, bytes.min(size).max(previous)));
        self.snapshot()
    }

    /// Entry `index` reached a terminal state, success or failure. Its full
    /// size counts as processed either way.
    pub fn finish(&mut self, index: usize) -> UploadProgress {
        self.finished_bytes += self.sizes.get(index).copied().unwrap_or(0);
        self.finished_files += 1;
        self.current = None;
        self.snapshot()
    }

    pub fn transferred_bytes(&self) -> u64 {
        let in_flight = self.current.map(|(_, b)| b).unwrap_or(0);
        (self.finished_bytes + in_flight).min(self.total_bytes)
    }

    pub fn snapshot(&mut self) -> UploadProgress {
        let percent = self.compute_percent().max(self.last_percent);
        self.last_percent = percent;

        UploadProgress {
            session_id: self.session_id,
            total_bytes: self.total_bytes,
            transferred_bytes: self.transferred_bytes(),
            percent,
            current_file: self
                .current
                .and_then(|(i, _)| self.names.get(i).cloned()),
            completed_files: self.finished_files,
            total_files: self.names.len(),
        }
    }

    /// round(transferred / total * 100), halves rounded up. A pass made only
    /// of empty files progresses by file count instead.
    fn compute_percent(&self) -> u8 {
        let (done, total) = if self.total_bytes == 0 {
            (self.finished_files as u128, self.names.len() as u128)
        } else {
            (self.transferred_bytes() as u128, self.total_bytes as u128)
        };

        if total == 0 {
            return 100;
        }

        let percent = (done * 200 + total) / (total * 2);
        percent.min(100) as u8
    }
}
