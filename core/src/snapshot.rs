use crate::tokenizer::Preprocessing;
use parking_lot::RwLock;
use std::sync::Arc;

/// Single-slot, build-once holder for a structure derived from the collection.
///
/// The slot is keyed by the preprocessing it was built with. Asking for another configuration
/// builds a fresh value and replaces the slot wholesale; callers still holding the previous
/// `Arc` keep reading it unchanged.
#[derive(Debug)]
pub struct Snapshot<T> {
    slot: RwLock<Option<(Preprocessing, Arc<T>)>>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self { slot: RwLock::new(None) }
    }
}

impl<T> Snapshot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&self, preprocessing: Preprocessing, build: impl FnOnce() -> T) -> Arc<T> {
        if let Some((built_with, value)) = self.slot.read().as_ref() {
            if *built_with == preprocessing {
                return Arc::clone(value);
            }
        }
        let mut slot = self.slot.write();
        // Another caller may have published the same configuration while we waited.
        if let Some((built_with, value)) = slot.as_ref() {
            if *built_with == preprocessing {
                return Arc::clone(value);
            }
        }
        let value = Arc::new(build());
        *slot = Some((preprocessing, Arc::clone(&value)));
        value
    }

    /// Configuration of the currently published value, if any.
    pub fn built_with(&self) -> Option<Preprocessing> {
        self.slot.read().as_ref().map(|(p, _)| *p)
    }
}
