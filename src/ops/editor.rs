use crate::model::cell::{CellId, Field};
use crate::model::mandala::Mandala;
use crate::ops::cell_ops;

/// The one (cell, field) pair currently being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub cell_id: CellId,
    pub field: Field,
}

/// Global inline-edit state. At most one session exists across every grid
/// on screen.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    session: Option<EditSession>,
}

impl Editor {
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn is_editing(&self, cell_id: &CellId, field: Field) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.cell_id == *cell_id && s.field == field)
    }

    /// Start editing, replacing any current session without committing it
    pub fn begin_edit(&mut self, cell_id: CellId, field: Field) {
        if let Some(prev) = &self.session {
            tracing::debug!(cell = %prev.cell_id, field = %prev.field, "discarded edit session");
        }
        tracing::debug!(cell = %cell_id, %field, "began edit");
        self.session = Some(EditSession { cell_id, field });
    }

    /// Write `value` into the tree and end the session. Returns whether a
    /// cell was updated; the session ends either way.
    pub fn commit_edit(
        &mut self,
        mandala: &mut Mandala,
        cell_id: &CellId,
        field: Field,
        value: &str,
    ) -> bool {
        let updated = cell_ops::update_field(mandala, cell_id, field, value);
        self.session = None;
        updated
    }

    /// End the session without writing anything
    pub fn cancel_edit(&mut self) {
        self.session = None;
    }
}
