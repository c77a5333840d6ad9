use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Pairing, PairingId, PairingStatus};

/// Append-only log of every pairing in a tournament. Ids are positions in
/// the log plus one, and rounds are only ever appended in ascending order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairingHistory {
    pairings: Vec<Pairing>,
}

impl PairingHistory {
    /// Append a pairing. A bye (`player2 == None`) is stored already
    /// finished with `player1` as the winner.
    pub fn record_pairing(&mut self, round: u32, player1: Uuid, player2: Option<Uuid>) -> PairingId {
        let id = self.pairings.len() as PairingId + 1;
        let now = Utc::now();
        let (status, winner_id, finished_at) = match player2 {
            Some(_) => (PairingStatus::Pending, None, None),
            None => (PairingStatus::Finished, Some(player1), Some(now)),
        };
        self.pairings.push(Pairing {
            id,
            round,
            player1_id: player1,
            player2_id: player2,
            winner_id,
            status,
            created_at: now,
            finished_at,
        });
        id
    }

    /// Whether `a` and `b` have been paired against each other, in any round
    /// and regardless of the result.
    pub fn has_played(&self, a: Uuid, b: Uuid) -> bool {
        a != b
            && self.pairings.iter().any(|p| match p.player2_id {
                Some(p2) => (p.player1_id == a && p2 == b) || (p.player1_id == b && p2 == a),
                None => false,
            })
    }

    pub fn get_history(&self, player_id: Uuid) -> Vec<&Pairing> {
        let mut pairings: Vec<&Pairing> = self
            .pairings
            .iter()
            .filter(|p| p.involves(player_id))
            .collect();
        pairings.sort_by_key(|p| (p.round, p.id));
        pairings
    }

    /// Opponents in every two-player pairing, one entry per game.
    pub fn opponents_of(&self, player_id: Uuid) -> Vec<Uuid> {
        self.pairings
            .iter()
            .filter_map(|p| p.opponent_of(player_id))
            .collect()
    }

    pub fn get(&self, id: PairingId) -> Option<&Pairing> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.pairings.get(index)
    }

    pub fn round_pairings(&self, round: u32) -> Vec<&Pairing> {
        self.pairings.iter().filter(|p| p.round == round).collect()
    }

    pub fn has_round(&self, round: u32) -> bool {
        self.pairings.iter().any(|p| p.round == round)
    }

    /// A round is complete once it has pairings and every one of them is
    /// finished. Byes count as finished from the start.
    pub fn is_round_complete(&self, round: u32) -> bool {
        let mut pairings = self.pairings.iter().filter(|p| p.round == round).peekable();
        pairings.peek().is_some() && pairings.all(|p| p.is_finished())
    }

    pub fn pending(&self) -> impl Iterator<Item = &Pairing> {
        self.pairings.iter().filter(|p| !p.is_finished())
    }

    pub fn all(&self) -> &[Pairing] {
        &self.pairings
    }

    pub fn len(&self) -> usize {
        self.pairings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }

    /// Move a pending pairing to finished. Returns `false` when the pairing
    /// does not exist or was already finished.
    pub(crate) fn finish(&mut self, id: PairingId, winner_id: Option<Uuid>) -> bool {
        let Some(index) = id.checked_sub(1).and_then(|i| usize::try_from(i).ok()) else {
            return false;
        };
        match self.pairings.get_mut(index) {
            Some(pairing) if !pairing.is_finished() => {
                pairing.status = PairingStatus::Finished;
                pairing.winner_id = winner_id;
                pairing.finished_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }
}
