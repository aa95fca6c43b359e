use serde::Serialize;
use uuid::Uuid;

/// Snapshot of an upload session's progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadProgress {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    #[serde(rename = "totalBytes")]
    pub total_bytes: u64,
    #[serde(rename = "transferredBytes")]
    pub transferred_bytes: u64,
    pub percent: u8,
    #[serde(rename = "currentFile")]
    pub current_file: Option<String>,
    #[serde(rename = "completedFiles")]
    pub completed_files: usize,
    #[serde(rename = "totalFiles")]
    pub total_files: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    pub name: String,
    pub message: String,
}

/// Terminal report of one upload pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadSummary {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    pub succeeded: Vec<String>,
    pub failed: Vec<FileFailure>,
    pub skipped: Vec<String>,
    pub cancelled: bool,
}

impl UploadSummary {
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            cancelled: false,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }

    /// One-line message surfaced to the user when the pass ends.
    pub fn notification(&self) -> String {
        let total = self.total();
        let succeeded = self.succeeded.len();

        if succeeded == total && total > 0 {
            return format!("Uploaded {} of {} files successfully.", succeeded, total);
        }

        let mut message = format!("Uploaded {} of {} files", succeeded, total);
        if !self.failed.is_empty() {
            message.push_str(&format!(", {} failed", self.failed.len()));
        }
        if !self.skipped.is_empty() {
            message.push_str(&format!(", {} skipped", self.skipped.len()));
        }
        if self.cancelled {
            message.push_str(" (upload cancelled)");
        }
        message.push('.');
        message
    }
}
