use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingResult {
    /// `rematch` is set when the fallback had to repeat an earlier game.
    Paired { player1: Uuid, player2: Uuid, rematch: bool },
    Bye(Uuid),
}

impl PairingResult {
    pub fn players(&self) -> (Uuid, Option<Uuid>) {
        match *self {
            PairingResult::Paired { player1, player2, .. } => (player1, Some(player2)),
            PairingResult::Bye(player) => (player, None),
        }
    }
}

/// Greedy Swiss pairer. Walks the field in standings order and gives each
/// unpaired player the first remaining opponent they have not met yet. This
/// is O(n²) and can force a rematch that a full matching would avoid.
pub struct SwissPairer<'a> {
    history: &'a PairingHistory,
}

impl<'a> SwissPairer<'a> {
    pub fn new(history: &'a PairingHistory) -> Self {
        Self { history }
    }

    pub fn pair_round(&self, round: u32, ledger: &StandingsLedger) -> Vec<PairingResult> {
        if round <= 1 {
            self.pair_first_round(&ledger.by_seed())
        } else {
            self.pair_by_score(&ledger.get_standings())
        }
    }

    /// Round one has no results to go on: pair 1v2, 3v4, ... in join order
    /// and give the last player a bye if the count is odd.
    pub fn pair_first_round(&self, seeded: &[&Participant]) -> Vec<PairingResult> {
        seeded
            .chunks(2)
            .map(|chunk| match chunk {
                [a, b] => PairingResult::Paired {
                    player1: a.player_id,
                    player2: b.player_id,
                    rematch: false,
                },
                [a] => PairingResult::Bye(a.player_id),
                _ => unreachable!("chunks(2) yields one or two players"),
            })
            .collect()
    }

    /// `ranked` must already be in standings order.
    pub fn pair_by_score(&self, ranked: &[&Participant]) -> Vec<PairingResult> {
        let ids: Vec<Uuid> = ranked.iter().map(|p| p.player_id).collect();
        let mut used = vec![false; ids.len()];
        let mut pairings = Vec::with_capacity(ids.len() / 2 + 1);

        for i in 0..ids.len() {
            if used[i] {
                continue;
            }
            let player = ids[i];
            used[i] = true;

            let candidates: Vec<usize> = (i + 1..ids.len()).filter(|&j| !used[j]).collect();
            let Some(&first) = candidates.first() else {
                // Only possible for the last unpaired player of an odd field.
                pairings.push(PairingResult::Bye(player));
                continue;
            };

            let fresh = candidates
                .iter()
                .copied()
                .find(|&j| !self.history.has_played(player, ids[j]));
            let (opponent, rematch) = match fresh {
                Some(j) => (j, false),
                None => {
                    log::warn!(
                        "Player {} has met every remaining player, forcing rematch with {}",
                        player,
                        ids[first]
                    );
                    (first, true)
                }
            };
            used[opponent] = true;
            pairings.push(PairingResult::Paired {
                player1: player,
                player2: ids[opponent],
                rematch,
            });
        }

        pairings
    }
}
