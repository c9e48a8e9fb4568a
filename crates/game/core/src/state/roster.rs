use std::collections::BTreeMap;

use super::{Character, CharacterId, NetworkId, Vec3};

/// All characters taking part in one simulation.
///
/// Characters live in a dense vector; the id index is ordered so iteration
/// over ids is deterministic regardless of insertion and removal history.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    characters: Vec<Character>,
    index: BTreeMap<CharacterId, usize>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a character, replacing (and returning) any previous one with the
    /// same id.
    pub fn insert(&mut self, character: Character) -> Option<Character> {
        let id = character.id();
        match self.index.get(&id) {
            Some(&slot) => Some(core::mem::replace(&mut self.characters[slot], character)),
            None => {
                self.index.insert(id, self.characters.len());
                self.characters.push(character);
                None
            }
        }
    }

    pub fn remove(&mut self, id: CharacterId) -> Option<Character> {
        let slot = self.index.remove(&id)?;
        let removed = self.characters.swap_remove(slot);
        if let Some(moved) = self.characters.get(slot) {
            self.index.insert(moved.id(), slot);
        }
        Some(removed)
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.index.get(&id).map(|&slot| &self.characters[slot])
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        let slot = *self.index.get(&id)?;
        self.characters.get_mut(slot)
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> Vec<CharacterId> {
        self.index.keys().copied().collect()
    }

    /// Characters in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.index.values().map(|&slot| &self.characters[slot])
    }

    pub fn find_by_network_id(&self, network_id: &NetworkId) -> Option<CharacterId> {
        self.iter()
            .find(|c| c.state.network_id.as_ref() == Some(network_id))
            .map(Character::id)
    }

    /// Living characters within `radius` of `center`, nearest first (ties by id).
    pub fn within_radius(&self, center: Vec3, radius: f32) -> Vec<CharacterId> {
        let mut hits: Vec<(f32, CharacterId)> = self
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| (c.state.position.distance(center), c.id()))
            .filter(|(d, _)| *d <= radius)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, id)| id).collect()
    }
}
