//! Buchholz and Sonneborn-Berger scores.
//!
//! Both are derived from the finished pairings and the opponents' *current*
//! points, so any change to a player's points invalidates the cached values
//! of everyone that player has met.

use std::collections::BTreeSet;
use uuid::Uuid;

use super::{Outcome, PairingHistory, StandingsLedger};

fn points_of(ledger: &StandingsLedger, player_id: Uuid) -> f32 {
    ledger.get(player_id).map(|p| p.points).unwrap_or(0.0)
}

/// Sum of the opponents' points over all finished games. Byes add nothing.
pub fn buchholz(history: &PairingHistory, ledger: &StandingsLedger, player_id: Uuid) -> f32 {
    history
        .get_history(player_id)
        .into_iter()
        .filter(|p| p.is_finished())
        .filter_map(|p| p.opponent_of(player_id))
        .map(|opponent| points_of(ledger, opponent))
        .sum()
}

/// Opponent's points for each win, half of them for each draw.
pub fn sonneborn_berger(history: &PairingHistory, ledger: &StandingsLedger, player_id: Uuid) -> f32 {
    history
        .get_history(player_id)
        .into_iter()
        .filter_map(|p| {
            let opponent = p.opponent_of(player_id)?;
            let weight = match p.outcome_for(player_id)? {
                Outcome::Win => 1.0,
                Outcome::Draw => 0.5,
                Outcome::Loss => return None,
            };
            Some(weight * points_of(ledger, opponent))
        })
        .sum()
}

/// Players whose cached tie-breaks change when a game between `a` and `b`
/// is scored: the two players and everyone either has met.
pub fn affected_by(history: &PairingHistory, a: Uuid, b: Option<Uuid>) -> BTreeSet<Uuid> {
    let mut affected = BTreeSet::new();
    for player in std::iter::once(a).chain(b) {
        affected.insert(player);
        affected.extend(history.opponents_of(player));
    }
    affected
}

/// Recompute the cached tie-breaks for `players` only.
pub fn refresh(ledger: &mut StandingsLedger, history: &PairingHistory, players: impl IntoIterator<Item = Uuid>) {
    let updates: Vec<(Uuid, f32, f32)> = players
        .into_iter()
        .map(|id| (id, buchholz(history, ledger, id), sonneborn_berger(history, ledger, id)))
        .collect();
    for (id, bh, sb) in updates {
        if let Some(participant) = ledger.get_mut(id) {
            participant.tiebreak_score = bh;
            participant.sonneborn_berger = sb;
        }
    }
}

pub fn recompute_all(ledger: &mut StandingsLedger, history: &PairingHistory) {
    let players = ledger.player_ids();
    refresh(ledger, history, players);
}
