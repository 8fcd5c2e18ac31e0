//! Remote player roster keyed by peer-assigned identifier
//!
//! Players are kept in insertion order so draw order stays stable between
//! frames, with a side index for constant-time lookup by id. Inserting an id
//! that is already present replaces the existing entry in place (upsert), so
//! a duplicated `newPlayer` frame never produces two entries for one peer.

use crate::player::RemotePlayer;
use log::debug;
use shared::PlayerId;
use std::collections::HashMap;

/// Result of [`Roster::insert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Added,
    Replaced,
}

#[derive(Debug, Default)]
pub struct Roster {
    players: Vec<RemotePlayer>,
    index: HashMap<PlayerId, usize>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `player`, or replaces the entry with the same id in place
    pub fn insert(&mut self, player: RemotePlayer) -> Insertion {
        match self.index.get(&player.id()) {
            Some(&slot) => {
                debug!("Replacing roster entry for player {}", player.id());
                self.players[slot] = player;
                Insertion::Replaced
            }
            None => {
                self.index.insert(player.id(), self.players.len());
                self.players.push(player);
                Insertion::Added
            }
        }
    }

    /// Player with `id`, if the roster has seen it join
    pub fn find_by_id(&self, id: PlayerId) -> Option<&RemotePlayer> {
        self.index.get(&id).map(|&slot| &self.players[slot])
    }

    /// Applies `mutator` to the player with `id`. Returns false on a miss.
    ///
    /// The mutator cannot change the id, so the index stays valid.
    pub fn update_by_id<F>(&mut self, id: PlayerId, mutator: F) -> bool
    where
        F: FnOnce(&mut RemotePlayer),
    {
        match self.index.get(&id) {
            Some(&slot) => {
                mutator(&mut self.players[slot]);
                true
            }
            None => false,
        }
    }

    /// Removes the player with `id`, keeping the others in order
    pub fn remove_by_id(&mut self, id: PlayerId) -> Option<RemotePlayer> {
        let slot = self.index.remove(&id)?;
        let removed = self.players.remove(slot);

        // Entries behind the removed slot shifted down by one
        for player in &self.players[slot..] {
            if let Some(entry) = self.index.get_mut(&player.id()) {
                *entry -= 1;
            }
        }

        Some(removed)
    }

    /// Players in the order they joined
    pub fn iter(&self) -> impl Iterator<Item = &RemotePlayer> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RemotePlayer> {
        self.players.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::Colour;

    fn player(id: PlayerId, x: f32) -> RemotePlayer {
        RemotePlayer::new(id, x, 0.0, 0.0, Colour::MARKER)
    }

    #[test]
    fn test_insert_and_find() {
        let mut roster = Roster::new();
        assert_eq!(roster.insert(player(1, 10.0)), Insertion::Added);
        assert_eq!(roster.insert(player(2, 20.0)), Insertion::Added);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.find_by_id(2).map(|p| p.x), Some(20.0));
        assert!(roster.find_by_id(3).is_none());
    }

    #[test]
    fn test_duplicate_insert_upserts() {
        let mut roster = Roster::new();
        roster.insert(player(1, 10.0));
        roster.insert(player(2, 20.0));

        assert_eq!(roster.insert(player(1, 99.0)), Insertion::Replaced);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.find_by_id(1).map(|p| p.x), Some(99.0));

        let order: Vec<PlayerId> = roster.iter().map(|p| p.id()).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn test_update_by_id_miss_is_total() {
        let mut roster = Roster::new();
        roster.insert(player(1, 10.0));

        assert!(!roster.update_by_id(5, |p| p.x = 0.0));
        assert!(roster.update_by_id(1, |p| p.x = 11.0));
        assert_eq!(roster.find_by_id(1).map(|p| p.x), Some(11.0));
    }

    #[test]
    fn test_remove_keeps_order_and_index() {
        let mut roster = Roster::new();
        for id in 1..=4 {
            roster.insert(player(id, id as f32));
        }

        let removed = roster.remove_by_id(2).unwrap();
        assert_eq!(removed.id(), 2);
        assert!(roster.remove_by_id(2).is_none());

        let order: Vec<PlayerId> = roster.iter().map(|p| p.id()).collect();
        assert_eq!(order, vec![1, 3, 4]);

        // Index must still resolve every shifted entry
        for id in [1, 3, 4] {
            assert_eq!(roster.find_by_id(id).map(|p| p.id()), Some(id));
        }
        assert!(roster.update_by_id(4, |p| p.x = 40.0));
        assert_eq!(roster.find_by_id(4).map(|p| p.x), Some(40.0));
    }

    #[test]
    fn test_mutations_keep_ids_indexed() {
        let mut roster = Roster::new();
        roster.insert(player(1, 1.0));
        roster.insert(player(2, 2.0));

        roster.update_by_id(1, |p| {
            p.x = 5.0;
            p.ping = Some(10.0);
        });
        for p in roster.iter_mut() {
            p.angle = 1.0;
        }

        for id in [1, 2] {
            assert_eq!(roster.find_by_id(id).map(|p| p.id()), Some(id));
        }
        assert_eq!(roster.insert(player(1, 9.0)), Insertion::Replaced);
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_remove_unknown_leaves_roster_untouched() {
        let mut roster = Roster::new();
        roster.insert(player(1, 1.0));

        assert!(roster.remove_by_id(9).is_none());
        assert_eq!(roster.len(), 1);
    }
}
