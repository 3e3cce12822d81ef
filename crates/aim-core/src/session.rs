//! Annotation authoring sessions.
//!
//! An [`AuthoringSession`] owns the characteristics of one annotation while it is being
//! authored. Characteristics loaded from, or saved to, a persisted annotation are
//! [`EntryState::Persisted`]: they can be read but not mutated or removed until they are
//! explicitly re-opened with [`AuthoringSession::reopen`].
//!
//! Sessions are single-owner values; there is no interior mutability and no locking.

use crate::{CoreError, CoreResult};
use aim_template::document::write_document;
use aim_template::ImagingObservationCharacteristic;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    /// Editable; not yet attached to a persisted annotation.
    Draft,
    /// Attached to a persisted annotation; read-only until re-opened.
    Persisted,
}

#[derive(Clone, Debug)]
struct Entry {
    characteristic: ImagingObservationCharacteristic,
    state: EntryState,
}

#[derive(Clone, Debug, Default)]
pub struct AuthoringSession {
    entries: Vec<Entry>,
}

impl AuthoringSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session over characteristics read from a persisted annotation.
    ///
    /// Every entry starts as [`EntryState::Persisted`].
    pub fn from_persisted(characteristics: Vec<ImagingObservationCharacteristic>) -> Self {
        Self {
            entries: characteristics
                .into_iter()
                .map(|characteristic| Entry {
                    characteristic,
                    state: EntryState::Persisted,
                })
                .collect(),
        }
    }

    /// Adds a draft characteristic and returns its index.
    pub fn add(&mut self, characteristic: ImagingObservationCharacteristic) -> usize {
        self.entries.push(Entry {
            characteristic,
            state: EntryState::Draft,
        });
        let index = self.entries.len() - 1;
        tracing::debug!(index, "added draft characteristic");
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> CoreResult<&ImagingObservationCharacteristic> {
        self.entry(index).map(|entry| &entry.characteristic)
    }

    pub fn state(&self, index: usize) -> CoreResult<EntryState> {
        self.entry(index).map(|entry| entry.state)
    }

    /// Returns mutable access to a draft characteristic.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownCharacteristic`] for an index out of range and
    /// [`CoreError::CharacteristicSealed`] for a persisted characteristic.
    pub fn get_mut(&mut self, index: usize) -> CoreResult<&mut ImagingObservationCharacteristic> {
        let entry = self.draft_entry_mut(index)?;
        Ok(&mut entry.characteristic)
    }

    /// Removes a draft characteristic. Persisted characteristics must be re-opened first.
    pub fn remove(&mut self, index: usize) -> CoreResult<ImagingObservationCharacteristic> {
        self.draft_entry_mut(index)?;
        Ok(self.entries.remove(index).characteristic)
    }

    /// Marks every draft as persisted and returns how many changed state.
    pub fn seal_all(&mut self) -> usize {
        let mut sealed = 0;
        for entry in self
            .entries
            .iter_mut()
            .filter(|entry| entry.state == EntryState::Draft)
        {
            entry.state = EntryState::Persisted;
            sealed += 1;
        }
        tracing::debug!(sealed, "sealed draft characteristics");
        sealed
    }

    /// Re-opens a persisted characteristic for editing. Re-opening a draft is a no-op.
    pub fn reopen(&mut self, index: usize) -> CoreResult<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(CoreError::UnknownCharacteristic(index))?;
        if entry.state == EntryState::Persisted {
            tracing::debug!(index, "reopened characteristic");
        }
        entry.state = EntryState::Draft;
        Ok(())
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (usize, &ImagingObservationCharacteristic, EntryState)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (index, &entry.characteristic, entry.state))
    }

    /// Serialize every characteristic, in order, as a template document and seal the drafts.
    pub fn persist(&mut self) -> CoreResult<String> {
        let characteristics: Vec<_> = self
            .entries
            .iter()
            .map(|entry| entry.characteristic.clone())
            .collect();
        let xml = write_document(&characteristics)?;
        self.seal_all();
        Ok(xml)
    }

    fn entry(&self, index: usize) -> CoreResult<&Entry> {
        self.entries
            .get(index)
            .ok_or(CoreError::UnknownCharacteristic(index))
    }

    fn draft_entry_mut(&mut self, index: usize) -> CoreResult<&mut Entry> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(CoreError::UnknownCharacteristic(index))?;
        if entry.state == EntryState::Persisted {
            return Err(CoreError::CharacteristicSealed(index));
        }
        Ok(entry)
    }
}
