//! Stage copies with id remapping

use std::collections::HashMap;

use uuid::Uuid;

use super::{CrossSection, HeadLine};

/// Mapping from old ids to new ids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdMap {
    ids: HashMap<Uuid, Uuid>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, old: Uuid, new: Uuid) {
        self.ids.insert(old, new);
    }

    pub fn get(&self, old: Uuid) -> Option<Uuid> {
        self.ids.get(&old).copied()
    }

    /// The new id for `id`, or `id` itself when it is not remapped
    pub fn resolve(&self, id: Uuid) -> Uuid {
        self.get(id).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl CrossSection {
    /// Copy this cross-section as a new stage
    ///
    /// Every layer and head line gets a fresh id. The returned map tells which
    /// new id belongs to which old id.
    pub fn duplicate_stage(&self) -> (CrossSection, IdMap) {
        let mut ids = IdMap::new();
        for layer in &self.layers {
            ids.insert(layer.id, Uuid::new_v4());
        }
        for line in &self.waternet.head_lines {
            ids.insert(line.id, Uuid::new_v4());
        }
        let copy = self.clone_with_substitution(&ids);
        tracing::debug!("Duplicated stage '{}' with {} new ids", self.name, ids.len());
        (copy, ids)
    }

    /// Copy with every id replaced according to `ids`
    ///
    /// References to ids, such as the phreatic line id, follow the mapping.
    pub fn clone_with_substitution(&self, ids: &IdMap) -> CrossSection {
        let mut copy = self.clone();
        for layer in &mut copy.layers {
            layer.id = ids.resolve(layer.id);
        }
        copy.waternet.head_lines = self
            .waternet
            .head_lines
            .iter()
            .map(|line| HeadLine {
                id: ids.resolve(line.id),
                ..line.clone()
            })
            .collect();
        copy.waternet.phreatic_line_id = self.waternet.phreatic_line_id.map(|id| ids.resolve(id));
        copy
    }
}
