use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SwissConfig;
use crate::error::TournamentError;

pub mod history;
pub mod lifecycle;
pub mod pairer;
pub mod standings;
pub mod tiebreak;
#[cfg(test)]
mod tests;

pub use history::PairingHistory;
pub use lifecycle::{ResultRecord, RoundAdvance, RoundPairings};
pub use pairer::{PairingResult, SwissPairer};
pub use standings::{standings_cmp, StandingsLedger};

/// Sequential per tournament, starting at 1.
pub type PairingId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Open,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingStatus {
    Pending,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn points(self) -> f32 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Draw => 0.5,
            Outcome::Loss => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub player_id: Uuid,
    pub name: String,
    /// Join order, 0-based. Stays unique even after other players leave.
    pub seed: u32,
    pub points: f32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    /// Buchholz
    pub tiebreak_score: f32,
    pub sonneborn_berger: f32,
}

impl Participant {
    pub fn new(player_id: Uuid, name: String, seed: u32) -> Self {
        Self {
            player_id,
            name,
            seed,
            points: 0.0,
            wins: 0,
            draws: 0,
            losses: 0,
            tiebreak_score: 0.0,
            sonneborn_berger: 0.0,
        }
    }

    pub fn add_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Loss => self.losses += 1,
        }
        self.points += outcome.points();
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    pub(crate) fn clear_results(&mut self) {
        self.points = 0.0;
        self.wins = 0;
        self.draws = 0;
        self.losses = 0;
        self.tiebreak_score = 0.0;
        self.sonneborn_berger = 0.0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub id: PairingId,
    pub round: u32,
    pub player1_id: Uuid,
    /// `None` marks a bye.
    pub player2_id: Option<Uuid>,
    /// `None` on a finished two-player pairing is a draw.
    pub winner_id: Option<Uuid>,
    pub status: PairingStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Pairing {
    pub fn players(&self) -> (Uuid, Option<Uuid>) {
        (self.player1_id, self.player2_id)
    }

    pub fn is_bye(&self) -> bool {
        self.player2_id.is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.status == PairingStatus::Finished
    }

    pub fn is_draw(&self) -> bool {
        self.is_finished() && !self.is_bye() && self.winner_id.is_none()
    }

    pub fn involves(&self, player_id: Uuid) -> bool {
        self.player1_id == player_id || self.player2_id == Some(player_id)
    }

    pub fn opponent_of(&self, player_id: Uuid) -> Option<Uuid> {
        if self.player1_id == player_id {
            self.player2_id
        } else if self.player2_id == Some(player_id) {
            Some(self.player1_id)
        } else {
            None
        }
    }

    /// The result from `player_id`'s side, once the pairing is finished.
    pub fn outcome_for(&self, player_id: Uuid) -> Option<Outcome> {
        if !self.is_finished() || !self.involves(player_id) {
            return None;
        }
        Some(match self.winner_id {
            Some(winner) if winner == player_id => Outcome::Win,
            Some(_) => Outcome::Loss,
            None => Outcome::Draw,
        })
    }
}

/// One Swiss tournament: its participants, every pairing ever made and the
/// round/lifecycle state. All mutation goes through `&mut self`, so a single
/// owner (see `TournamentRegistry`) serializes access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwissTournament {
    pub id: Uuid,
    pub name: String,
    pub config: SwissConfig,
    pub status: TournamentStatus,
    /// 0 until the tournament starts.
    pub current_round: u32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    ledger: StandingsLedger,
    history: PairingHistory,
}

impl SwissTournament {
    pub fn new(name: String, config: SwissConfig) -> Result<Self, TournamentError> {
        Self::with_id(Uuid::new_v4(), name, config)
    }

    pub fn with_id(id: Uuid, name: String, config: SwissConfig) -> Result<Self, TournamentError> {
        config.validate()?;
        Ok(Self {
            id,
            name,
            config,
            status: TournamentStatus::Open,
            current_round: 0,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            ledger: StandingsLedger::default(),
            history: PairingHistory::default(),
        })
    }

    pub fn ledger(&self) -> &StandingsLedger {
        &self.ledger
    }

    pub fn history(&self) -> &PairingHistory {
        &self.history
    }

    pub fn total_rounds(&self) -> u32 {
        self.config.total_rounds
    }

    pub fn is_finished(&self) -> bool {
        self.status == TournamentStatus::Finished
    }

    /// Register a player. Returns `false` if the player had already joined.
    pub fn join(&mut self, player_id: Uuid, name: String) -> Result<bool, TournamentError> {
        self.ensure_status(TournamentStatus::Open, "join")?;
        if self.ledger.contains(player_id) {
            log::debug!("Player {} already joined tournament {}", player_id, self.id);
            return Ok(false);
        }
        if let Some(max) = self.config.max_participants {
            if self.ledger.len() >= max {
                return Err(TournamentError::InvalidTransition(format!(
                    "tournament {} is full ({} participants)",
                    self.id, max
                )));
            }
        }
        self.ledger.add(player_id, name);
        log::info!("Player {} joined tournament {}", player_id, self.id);
        Ok(true)
    }

    /// Withdraw a player before the first round. Returns `false` if the
    /// player was not registered.
    pub fn leave(&mut self, player_id: Uuid) -> Result<bool, TournamentError> {
        self.ensure_status(TournamentStatus::Open, "leave")?;
        let removed = self.ledger.remove(player_id);
        if removed {
            log::info!("Player {} left tournament {}", player_id, self.id);
        }
        Ok(removed)
    }

    pub fn participant(&self, player_id: Uuid) -> Result<&Participant, TournamentError> {
        self.ledger
            .get(player_id)
            .ok_or(TournamentError::ParticipantNotFound(player_id))
    }

    pub fn standings(&self) -> Vec<&Participant> {
        self.ledger.get_standings()
    }

    /// Top of the final standings, once the tournament is finished.
    pub fn winner(&self) -> Option<&Participant> {
        if !self.is_finished() {
            return None;
        }
        self.ledger.get_standings().into_iter().next()
    }

    pub fn has_played(&self, a: Uuid, b: Uuid) -> bool {
        self.history.has_played(a, b)
    }

    pub fn get_history(&self, player_id: Uuid) -> Result<Vec<&Pairing>, TournamentError> {
        self.participant(player_id)?;
        Ok(self.history.get_history(player_id))
    }

    pub fn pairing(&self, pairing_id: PairingId) -> Result<&Pairing, TournamentError> {
        self.history
            .get(pairing_id)
            .ok_or(TournamentError::PairingNotFound(pairing_id))
    }

    pub fn round_pairings(&self, round: u32) -> Vec<&Pairing> {
        self.history.round_pairings(round)
    }

    pub fn pending_pairings(&self) -> Vec<&Pairing> {
        self.history.pending().collect()
    }

    pub fn pairing_for(&self, player_id: Uuid, round: u32) -> Option<&Pairing> {
        self.history
            .round_pairings(round)
            .into_iter()
            .find(|p| p.involves(player_id))
    }

    pub fn buchholz(&self, player_id: Uuid) -> Result<f32, TournamentError> {
        self.participant(player_id)?;
        Ok(tiebreak::buchholz(&self.history, &self.ledger, player_id))
    }

    pub fn sonneborn_berger(&self, player_id: Uuid) -> Result<f32, TournamentError> {
        self.participant(player_id)?;
        Ok(tiebreak::sonneborn_berger(&self.history, &self.ledger, player_id))
    }

    /// Recompute every participant's counters and tie-breaks from the
    /// finished pairings alone.
    pub fn rebuild_from_history(&mut self) -> Result<(), TournamentError> {
        self.ledger.clear_results();
        for pairing in self.history.all().iter().filter(|p| p.is_finished()) {
            let (p1, p2) = pairing.players();
            let outcome = pairing
                .outcome_for(p1)
                .ok_or(TournamentError::PairingNotFound(pairing.id))?;
            self.ledger.record_result(p1, outcome)?;
            if let Some(p2) = p2 {
                let outcome = pairing
                    .outcome_for(p2)
                    .ok_or(TournamentError::PairingNotFound(pairing.id))?;
                self.ledger.record_result(p2, outcome)?;
            }
        }
        tiebreak::recompute_all(&mut self.ledger, &self.history);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, TournamentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a snapshot. Cached standings are rebuilt from the pairing
    /// history, so a snapshot with stale counters still loads correctly.
    pub fn from_json(json: &str) -> Result<Self, TournamentError> {
        let mut tournament: Self = serde_json::from_str(json)?;
        tournament.config.validate()?;
        tournament.rebuild_from_history()?;
        Ok(tournament)
    }

    fn ensure_status(&self, expected: TournamentStatus, action: &str) -> Result<(), TournamentError> {
        if self.status != expected {
            return Err(TournamentError::InvalidTransition(format!(
                "cannot {} tournament {} while it is {:?}",
                action, self.id, self.status
            )));
        }
        Ok(())
    }
}
