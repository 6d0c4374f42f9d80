//! Per-decoder atom interning.

use std::collections::HashMap;

use tracing::debug;

use crate::value::Atom;

/// Interns atom names so repeated atoms in a message share one allocation.
///
/// A table belongs to a single [`BertDecoder`](crate::BertDecoder) and lives
/// as long as it does, holding at most `limit` names. Interning only saves
/// memory: an [`Atom`] compares by its bytes either way, so atoms handed out
/// before the table is emptied stay valid.
#[derive(Debug)]
pub struct AtomTable {
    atoms: HashMap<Box<[u8]>, Atom>,
    limit: usize,
}

impl Default for AtomTable {
    fn default() -> Self {
        Self::with_limit(crate::DecodeOptions::DEFAULT_MAX_ATOMS)
    }
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            atoms: HashMap::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn intern(&mut self, name: &[u8]) -> Atom {
        if let Some(atom) = self.atoms.get(name) {
            return atom.clone();
        }
        let atom = Atom::new(name);
        if self.atoms.len() >= self.limit {
            debug!(limit = self.limit, "atom table full, clearing");
            self.atoms.clear();
            if self.limit == 0 {
                return atom;
            }
        }
        self.atoms.insert(name.into(), atom.clone());
        atom
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn clear(&mut self) {
        self.atoms.clear();
    }
}
