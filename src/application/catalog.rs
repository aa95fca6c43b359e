use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::models::{file_record::FileRecord, file_type::FileCategory};

pub const NO_FILES_MESSAGE: &str = "No files found. Upload some files to get started!";
pub const NO_MATCHES_MESSAGE: &str = "No matching files found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Name,
    Size,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "name" => Ok(SortOrder::Name),
            "size" => Ok(SortOrder::Size),
            other => Err(format!("Unknown sort order '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileQuery {
    pub search: Option<String>,
    pub category: Option<FileCategory>,
    pub sort: SortOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub record: FileRecord,
    pub category: FileCategory,
}

impl From<FileRecord> for CatalogEntry {
    fn from(record: FileRecord) -> Self {
        let category = FileCategory::classify(&record.name, &record.content_type);
        Self { record, category }
    }
}

/// Read-through copy of the signed-in user's file records for the current
/// page view. Filtering and sorting never touch the collaborator.
#[derive(Debug)]
pub struct FileCatalog {
    owner_id: Option<String>,
    entries: Vec<CatalogEntry>,
    stale: bool,
}

impl Default for FileCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl FileCatalog {
    pub fn new() -> Self {
        Self {
            owner_id: None,
            entries: Vec::new(),
            stale: true,
        }
    }

    pub fn load(&mut self, owner_id: &str, records: Vec<FileRecord>) {
        self.owner_id = Some(owner_id.to_string());
        self.entries = records.into_iter().map(CatalogEntry::from).collect();
        self.stale = false;
    }

    /// Whether the catalog has to be (re)fetched for `owner_id`.
    pub fn needs_refresh(&self, owner_id: &str) -> bool {
        self.stale || self.owner_id.as_deref() != Some(owner_id)
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.record.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<CatalogEntry> {
        let index = self.entries.iter().position(|e| e.record.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn query(&self, query: &FileQuery) -> Vec<&CatalogEntry> {
        let mut matches: Vec<&CatalogEntry> = self
            .entries
            .iter()
            .filter(|e| query.category.map_or(true, |c| e.category == c))
            .collect();

        if let Some(term) = query.search.as_deref() {
            matches = filter_by_name(matches, term);
        }

        sort_entries(&mut matches, query.sort);
        matches
    }
}

/// Case-insensitive substring match on the file name. An empty term keeps
/// everything.
pub fn filter_by_name<'a>(entries: Vec<&'a CatalogEntry>, term: &str) -> Vec<&'a CatalogEntry> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return entries;
    }

    entries
        .into_iter()
        .filter(|e| e.record.name.to_lowercase().contains(&term))
        .collect()
}

pub fn sort_entries(entries: &mut [&CatalogEntry], order: SortOrder) {
    match order {
        SortOrder::Newest => entries.sort_by(|a, b| b.record.uploaded_at.cmp(&a.record.uploaded_at)),
        SortOrder::Oldest => entries.sort_by(|a, b| a.record.uploaded_at.cmp(&b.record.uploaded_at)),
        SortOrder::Name => entries.sort_by(|a, b| compare_names(&a.record.name, &b.record.name)),
        SortOrder::Size => entries.sort_by(|a, b| b.record.size.cmp(&a.record.size)),
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
