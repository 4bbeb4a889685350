//! Edit sessions
//!
//! A session owns the note open in one view. Loads are asynchronous from the caller's point of
//! view: the caller asks for a ticket, fetches the text however it likes, then hands both back.
//! Only the newest ticket may replace the note, so a slow load that finishes after the user has
//! switched notes is dropped instead of overwriting the newer tree.

use crate::error::ImportError;
use crate::note::Note;
use crate::transformers::TransformerRegistry;

/// Handle for one requested load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load was requested after this ticket was issued.
    Stale,
}

pub struct EditSession<'r> {
    registry: &'r TransformerRegistry,
    generation: u64,
    note: Option<Note>,
}

impl<'r> EditSession<'r> {
    pub fn new(registry: &'r TransformerRegistry) -> Self {
        EditSession {
            registry,
            generation: 0,
            note: None,
        }
    }

    /// Start a load. Any ticket handed out earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Import `text` if `ticket` is still the latest one.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        text: &str,
    ) -> Result<LoadOutcome, ImportError> {
        if ticket.0 != self.generation {
            log::debug!("discarding stale load {} (current {})", ticket.0, self.generation);
            return Ok(LoadOutcome::Stale);
        }
        self.note = Some(Note::load(text, self.registry)?);
        Ok(LoadOutcome::Applied)
    }

    pub fn note(&self) -> Option<&Note> {
        self.note.as_ref()
    }

    pub fn note_mut(&mut self) -> Option<&mut Note> {
        self.note.as_mut()
    }

    pub fn registry(&self) -> &'r TransformerRegistry {
        self.registry
    }

    /// Drop the open note, e.g. when the view closes.
    pub fn close(&mut self) -> Option<Note> {
        self.generation += 1;
        self.note.take()
    }
}
