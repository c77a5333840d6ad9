use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

use super::{Outcome, Participant};
use crate::error::TournamentError;

/// Total order used for standings and for Swiss pairing order: points,
/// Sonneborn-Berger, Buchholz and wins (all descending), then join order.
/// Seeds are unique, so no two participants compare equal.
pub fn standings_cmp(a: &Participant, b: &Participant) -> Ordering {
    b.points
        .total_cmp(&a.points)
        .then_with(|| b.sonneborn_berger.total_cmp(&a.sonneborn_berger))
        .then_with(|| b.tiebreak_score.total_cmp(&a.tiebreak_score))
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| a.seed.cmp(&b.seed))
}

/// Per-tournament scores. Tie-break fields are written by the tie-break
/// calculator, never computed here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandingsLedger {
    participants: HashMap<Uuid, Participant>,
    next_seed: u32,
}

impl StandingsLedger {
    pub fn add(&mut self, player_id: Uuid, name: String) -> bool {
        if self.participants.contains_key(&player_id) {
            return false;
        }
        let seed = self.next_seed;
        self.next_seed += 1;
        self.participants
            .insert(player_id, Participant::new(player_id, name, seed));
        true
    }

    pub fn remove(&mut self, player_id: Uuid) -> bool {
        self.participants.remove(&player_id).is_some()
    }

    pub fn contains(&self, player_id: Uuid) -> bool {
        self.participants.contains_key(&player_id)
    }

    pub fn get(&self, player_id: Uuid) -> Option<&Participant> {
        self.participants.get(&player_id)
    }

    pub(crate) fn get_mut(&mut self, player_id: Uuid) -> Option<&mut Participant> {
        self.participants.get_mut(&player_id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    pub fn player_ids(&self) -> Vec<Uuid> {
        self.by_seed().into_iter().map(|p| p.player_id).collect()
    }

    /// Participants in join order.
    pub fn by_seed(&self) -> Vec<&Participant> {
        let mut players: Vec<&Participant> = self.participants.values().collect();
        players.sort_by_key(|p| p.seed);
        players
    }

    pub fn record_result(&mut self, player_id: Uuid, outcome: Outcome) -> Result<(), TournamentError> {
        let participant = self
            .participants
            .get_mut(&player_id)
            .ok_or(TournamentError::ParticipantNotFound(player_id))?;
        participant.add_outcome(outcome);
        Ok(())
    }

    pub fn get_standings(&self) -> Vec<&Participant> {
        let mut players: Vec<&Participant> = self.participants.values().collect();
        players.sort_by(|a, b| standings_cmp(a, b));
        players
    }

    /// 1-based position in the current standings.
    pub fn rank_of(&self, player_id: Uuid) -> Option<usize> {
        self.get_standings()
            .iter()
            .position(|p| p.player_id == player_id)
            .map(|index| index + 1)
    }

    pub(crate) fn clear_results(&mut self) {
        for participant in self.participants.values_mut() {
            participant.clear_results();
        }
    }
}
