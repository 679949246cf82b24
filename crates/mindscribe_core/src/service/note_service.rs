//! Note-specific views on top of the generic manager.

use crate::clock::Clock;
use crate::model::note::{Note, NoteCategory, NoteSortField};
use crate::repo::kv_repo::KvRepository;
use crate::service::entity_manager::EntityManager;
use crate::text::markdown_preview;

pub type NoteManager<R, C> = EntityManager<Note, R, C>;

/// Default excerpt length for note cards.
pub const NOTE_PREVIEW_CHARS: usize = 100;

impl<R: KvRepository, C: Clock> EntityManager<Note, R, C> {
    /// Most recently updated notes, newest first.
    pub fn recent(&self, limit: usize) -> Vec<Note> {
        let mut recent = self.sort(NoteSortField::UpdatedAt, false);
        recent.truncate(limit);
        recent
    }

    /// Note count per category, in the fixed category order.
    pub fn category_counts(&self) -> Vec<(NoteCategory, usize)> {
        NoteCategory::ALL
            .into_iter()
            .map(|category| {
                let count = self
                    .items()
                    .iter()
                    .filter(|note| note.category == category)
                    .count();
                (category, count)
            })
            .collect()
    }
}

/// Plain-text excerpt of a note body.
pub fn note_preview(note: &Note, max_chars: usize) -> String {
    markdown_preview(&note.content, max_chars)
}
