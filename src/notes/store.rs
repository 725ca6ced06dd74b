use crate::notes::models::{NewNote, Note, NoteEdit, NoteFilter, NoteId, NoteSummary};
use crate::tui::pagination::Page;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read notes file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write notes file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse notes file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize notes: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("slug '{0}' is already taken")]
    DuplicateSlug(String),
    #[error("note {0} not found")]
    NotFound(NoteId),
    #[error("title and content are required")]
    MissingField,
}

/// On-disk layout of the notes file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct NoteTable {
    #[serde(default)]
    next_id: NoteId,
    #[serde(default)]
    notes: Vec<Note>,
}

/// The notes table, persisted as a single TOML file.
#[derive(Debug)]
pub struct NoteStore {
    path: PathBuf,
    table: NoteTable,
}

impl NoteStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let table = read_table(&path)?;
        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pick up writes made by other processes since the last read.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.table = read_table(&self.path)?;
        Ok(())
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let content = toml::to_string(&self.table)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        // Write beside the target and rename so readers never see half a file.
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
    }

    pub fn count(&self) -> usize {
        self.table.notes.len()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.table.notes.iter().find(|n| n.id == id)
    }

    pub fn add(&mut self, new: NewNote, now: DateTime<Utc>) -> Result<NoteId, StoreError> {
        self.insert(new, now, now)
    }

    /// Insert with explicit timestamps; used by the seeder.
    pub fn insert(
        &mut self,
        new: NewNote,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<NoteId, StoreError> {
        let slug = new.slug.filter(|s| !s.trim().is_empty());
        if let Some(slug) = &slug {
            if self.table.notes.iter().any(|n| n.slug.as_ref() == Some(slug)) {
                return Err(StoreError::DuplicateSlug(slug.clone()));
            }
        }

        let id = self.allocate_id();
        self.table.notes.push(Note {
            id,
            title: new.title.filter(|t| !t.trim().is_empty()),
            content: new.content,
            slug,
            is_public: new.is_public,
            created_at: Some(created_at),
            updated_at: Some(updated_at),
        });
        Ok(id)
    }

    fn allocate_id(&mut self) -> NoteId {
        let max_existing = self.table.notes.iter().map(|n| n.id).max().unwrap_or(0);
        let id = self.table.next_id.max(max_existing) + 1;
        self.table.next_id = id;
        id
    }

    /// One page of summaries matching `filter`, newest first.
    ///
    /// Reads `limit + 1` rows so `has_more` is exact without a count query.
    pub fn query(&self, filter: &NoteFilter, offset: usize, limit: usize) -> Page<NoteSummary> {
        let mut matching: Vec<&Note> = self.table.notes.iter().filter(|n| n.matches(filter)).collect();
        // Newest first; undated rows sort last, ties broken by id.
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let mut rows: Vec<NoteSummary> = matching
            .into_iter()
            .skip(offset)
            .take(limit.saturating_add(1))
            .map(Note::summary)
            .collect();

        let has_more = rows.len() > limit;
        rows.truncate(limit);

        Page {
            next_offset: offset + rows.len(),
            items: rows,
            has_more,
        }
    }

    /// Apply `edit` to note `id` and stamp `updated_at`. The note keeps its
    /// previous values for fields the edit leaves unset.
    pub fn update(&mut self, id: NoteId, edit: NoteEdit, now: DateTime<Utc>) -> Result<(), StoreError> {
        let index = self
            .table
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let current = &self.table.notes[index];
        let title = edit.title.or_else(|| current.title.clone()).filter(|t| !t.trim().is_empty());
        let content = edit.content.unwrap_or_else(|| current.content.clone());
        if title.is_none() || content.trim().is_empty() {
            return Err(StoreError::MissingField);
        }

        let slug = match edit.slug {
            Some(slug) => Some(slug).filter(|s| !s.trim().is_empty()),
            None => current.slug.clone(),
        };
        if let Some(slug) = &slug {
            if self.table.notes.iter().any(|n| n.id != id && n.slug.as_ref() == Some(slug)) {
                return Err(StoreError::DuplicateSlug(slug.clone()));
            }
        }

        let note = &mut self.table.notes[index];
        if let Some(is_public) = edit.is_public {
            note.is_public = is_public;
        }
        note.title = title;
        note.content = content;
        note.slug = slug;
        note.updated_at = Some(now);
        Ok(())
    }

    /// Remove every note whose id is listed. Returns how many were removed.
    pub fn delete_batch(&mut self, ids: &[NoteId]) -> usize {
        let before = self.table.notes.len();
        self.table.notes.retain(|n| !ids.contains(&n.id));
        before - self.table.notes.len()
    }
}

fn read_table(path: &Path) -> Result<NoteTable, StoreError> {
    if !path.exists() {
        return Ok(NoteTable::default());
    }

    let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}
