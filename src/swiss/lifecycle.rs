//! Round and tournament lifecycle: start, round generation, result
//! ingestion and round advance.
//!
//! Every operation is safe to replay. Repeating a call whose effect already
//! happened returns the existing state through an `Already*` variant instead
//! of failing or writing anything twice.

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::error::TournamentError;

#[derive(Debug, Clone, PartialEq)]
pub enum RoundPairings {
    Generated(Vec<Pairing>),
    /// The round existed before this call; nothing was written.
    AlreadyGenerated(Vec<Pairing>),
}

impl RoundPairings {
    pub fn pairings(&self) -> &[Pairing] {
        match self {
            RoundPairings::Generated(p) | RoundPairings::AlreadyGenerated(p) => p,
        }
    }

    pub fn into_pairings(self) -> Vec<Pairing> {
        match self {
            RoundPairings::Generated(p) | RoundPairings::AlreadyGenerated(p) => p,
        }
    }

    pub fn is_replay(&self) -> bool {
        matches!(self, RoundPairings::AlreadyGenerated(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultRecord {
    Recorded(Pairing),
    /// The pairing was already finished; the stored result is returned as is.
    AlreadyRecorded(Pairing),
}

impl ResultRecord {
    pub fn pairing(&self) -> &Pairing {
        match self {
            ResultRecord::Recorded(p) | ResultRecord::AlreadyRecorded(p) => p,
        }
    }

    pub fn is_replay(&self) -> bool {
        matches!(self, ResultRecord::AlreadyRecorded(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundAdvance {
    NextRound(Vec<Pairing>),
    /// Final standings, best first.
    Finished(Vec<Participant>),
    AlreadyFinished(Vec<Participant>),
}

impl SwissTournament {
    /// Close registration and pair round one.
    pub fn start(&mut self) -> Result<Vec<Pairing>, TournamentError> {
        self.ensure_status(TournamentStatus::Open, "start")?;
        let found = self.ledger.len();
        let required = self.config.min_participants;
        if found < required {
            return Err(TournamentError::InsufficientParticipants { required, found });
        }

        self.status = TournamentStatus::InProgress;
        self.started_at = Some(Utc::now());
        log::info!(
            "Tournament {} started with {} participants over {} rounds",
            self.id,
            found,
            self.config.total_rounds
        );
        self.create_round(1)
    }

    pub fn generate_pairings(&mut self, round: u32) -> Result<RoundPairings, TournamentError> {
        self.ensure_status(TournamentStatus::InProgress, "pair a round of")?;
        if round == 0 || round > self.config.total_rounds {
            return Err(TournamentError::InvalidTransition(format!(
                "round {} is outside 1..={} for tournament {}",
                round, self.config.total_rounds, self.id
            )));
        }

        if self.history.has_round(round) {
            log::debug!("Round {} of tournament {} already paired", round, self.id);
            return Ok(RoundPairings::AlreadyGenerated(self.cloned_round(round)));
        }

        let blocking_round = self.current_round;
        if round != blocking_round + 1 || !self.history.is_round_complete(blocking_round) {
            return Err(TournamentError::RoundNotReady { round, blocking_round });
        }

        self.create_round(round).map(RoundPairings::Generated)
    }

    /// Ingest the result of a game. `winner == None` is a draw.
    pub fn record_result(
        &mut self,
        pairing_id: PairingId,
        winner: Option<Uuid>,
    ) -> Result<ResultRecord, TournamentError> {
        let pairing = self.pairing(pairing_id)?.clone();
        if pairing.is_finished() {
            if pairing.winner_id != winner {
                log::warn!(
                    "Ignoring conflicting result for finished pairing {} in tournament {}",
                    pairing_id,
                    self.id
                );
            }
            return Ok(ResultRecord::AlreadyRecorded(pairing));
        }
        self.ensure_status(TournamentStatus::InProgress, "record a result in")?;

        if let Some(player) = winner {
            if !pairing.involves(player) {
                return Err(TournamentError::WinnerNotInPairing { pairing: pairing_id, player });
            }
        }
        let (player1, player2) = match pairing.players() {
            (p1, Some(p2)) => (p1, p2),
            // byes are created finished, so this is a corrupted row
            (_, None) => return Err(TournamentError::PairingNotFound(pairing_id)),
        };
        self.participant(player1)?;
        self.participant(player2)?;

        let (outcome1, outcome2) = match winner {
            None => (Outcome::Draw, Outcome::Draw),
            Some(w) if w == player1 => (Outcome::Win, Outcome::Loss),
            Some(_) => (Outcome::Loss, Outcome::Win),
        };
        self.ledger.record_result(player1, outcome1)?;
        self.ledger.record_result(player2, outcome2)?;
        self.history.finish(pairing_id, winner);

        let affected = tiebreak::affected_by(&self.history, player1, Some(player2));
        tiebreak::refresh(&mut self.ledger, &self.history, affected);

        log::info!(
            "Pairing {} (round {}) of tournament {} finished: {}",
            pairing_id,
            pairing.round,
            self.id,
            match winner {
                Some(w) => format!("{} won", w),
                None => "draw".to_string(),
            }
        );
        Ok(ResultRecord::Recorded(self.pairing(pairing_id)?.clone()))
    }

    pub fn is_round_complete(&self, round: u32) -> bool {
        self.history.is_round_complete(round)
    }

    /// Move on once the current round is complete: pair the next round, or
    /// finish the tournament after the last one.
    pub fn advance_round(&mut self) -> Result<RoundAdvance, TournamentError> {
        match self.status {
            TournamentStatus::Finished => {
                return Ok(RoundAdvance::AlreadyFinished(self.final_standings()));
            }
            TournamentStatus::Open => {
                return Err(TournamentError::InvalidTransition(format!(
                    "tournament {} has not started",
                    self.id
                )));
            }
            TournamentStatus::InProgress => {}
        }

        let round = self.current_round;
        if !self.history.is_round_complete(round) {
            return Err(TournamentError::RoundNotReady {
                round: round + 1,
                blocking_round: round,
            });
        }

        if round >= self.config.total_rounds {
            self.status = TournamentStatus::Finished;
            self.finished_at = Some(Utc::now());
            let standings = self.final_standings();
            if let Some(winner) = standings.first() {
                log::info!(
                    "Tournament {} finished, winner {} with {} points",
                    self.id,
                    winner.player_id,
                    winner.points
                );
            }
            return Ok(RoundAdvance::Finished(standings));
        }

        self.create_round(round + 1).map(RoundAdvance::NextRound)
    }

    fn final_standings(&self) -> Vec<Participant> {
        self.ledger.get_standings().into_iter().cloned().collect()
    }

    fn cloned_round(&self, round: u32) -> Vec<Pairing> {
        self.history.round_pairings(round).into_iter().cloned().collect()
    }

    /// Pair `round`, store the pairings and score the bye in the same step.
    fn create_round(&mut self, round: u32) -> Result<Vec<Pairing>, TournamentError> {
        let results = SwissPairer::new(&self.history).pair_round(round, &self.ledger);
        for result in &results {
            let (player1, player2) = result.players();
            self.history.record_pairing(round, player1, player2);
            if player2.is_none() {
                self.ledger.record_result(player1, Outcome::Win)?;
                log::info!("Player {} receives a bye in round {} of tournament {}", player1, round, self.id);
                let affected = tiebreak::affected_by(&self.history, player1, None);
                tiebreak::refresh(&mut self.ledger, &self.history, affected);
            }
        }
        self.current_round = round;

        let rematches = results
            .iter()
            .filter(|r| matches!(r, PairingResult::Paired { rematch: true, .. }))
            .count();
        log::info!(
            "Round {} of tournament {} paired: {} pairings, {} forced rematches",
            round,
            self.id,
            results.len(),
            rematches
        );
        Ok(self.cloned_round(round))
    }
}
