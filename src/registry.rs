//! Many tournaments behind one handle. Each tournament sits behind its own
//! mutex so its operations are serialized while other tournaments proceed
//! in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

use crate::config::SwissConfig;
use crate::error::TournamentError;
use crate::swiss::{
    Pairing, PairingId, Participant, ResultRecord, RoundAdvance, RoundPairings, SwissTournament,
    TournamentStatus,
};

/// Notification hook for the host. Called only when new state was created,
/// never for replays, and never while a tournament lock is held.
pub trait RoundListener: Send + Sync {
    fn on_round_paired(&self, tournament_id: Uuid, round: u32, pairings: &[Pairing]);
    fn on_tournament_finished(&self, tournament_id: Uuid, standings: &[Participant]);
}

type Shared = Arc<Mutex<SwissTournament>>;

#[derive(Default)]
pub struct TournamentRegistry {
    tournaments: RwLock<HashMap<Uuid, Shared>>,
    listener: Option<Arc<dyn RoundListener>>,
}

impl TournamentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(listener: Arc<dyn RoundListener>) -> Self {
        Self {
            tournaments: RwLock::new(HashMap::new()),
            listener: Some(listener),
        }
    }

    pub fn create_tournament(&self, name: &str, config: SwissConfig) -> Result<Uuid, TournamentError> {
        let tournament = SwissTournament::new(name.to_string(), config)?;
        let id = tournament.id;
        self.insert(tournament)?;
        log::info!("Created tournament {} ({})", id, name);
        Ok(id)
    }

    pub fn tournament_ids(&self) -> Result<Vec<Uuid>, TournamentError> {
        let map = self
            .tournaments
            .read()
            .map_err(|_| TournamentError::LockPoisoned(Uuid::nil()))?;
        Ok(map.keys().copied().collect())
    }

    pub fn status(&self, tournament_id: Uuid) -> Result<TournamentStatus, TournamentError> {
        self.with_tournament(tournament_id, |t| Ok(t.status))
    }

    pub fn current_round(&self, tournament_id: Uuid) -> Result<u32, TournamentError> {
        self.with_tournament(tournament_id, |t| Ok(t.current_round))
    }

    pub fn join(&self, tournament_id: Uuid, player_id: Uuid, name: &str) -> Result<bool, TournamentError> {
        self.with_tournament(tournament_id, |t| t.join(player_id, name.to_string()))
    }

    pub fn leave(&self, tournament_id: Uuid, player_id: Uuid) -> Result<bool, TournamentError> {
        self.with_tournament(tournament_id, |t| t.leave(player_id))
    }

    pub fn start(&self, tournament_id: Uuid) -> Result<Vec<Pairing>, TournamentError> {
        let pairings = self.with_tournament(tournament_id, |t| t.start())?;
        self.notify_round(tournament_id, 1, &pairings);
        Ok(pairings)
    }

    pub fn generate_pairings(&self, tournament_id: Uuid, round: u32) -> Result<RoundPairings, TournamentError> {
        let pairings = self.with_tournament(tournament_id, |t| t.generate_pairings(round))?;
        if let RoundPairings::Generated(new) = &pairings {
            self.notify_round(tournament_id, round, new);
        }
        Ok(pairings)
    }

    pub fn record_result(
        &self,
        tournament_id: Uuid,
        pairing_id: PairingId,
        winner: Option<Uuid>,
    ) -> Result<ResultRecord, TournamentError> {
        self.with_tournament(tournament_id, |t| t.record_result(pairing_id, winner))
    }

    /// Record a result and, if it completed the current round, advance the
    /// tournament in the same critical section.
    pub fn submit_result(
        &self,
        tournament_id: Uuid,
        pairing_id: PairingId,
        winner: Option<Uuid>,
    ) -> Result<(ResultRecord, Option<RoundAdvance>), TournamentError> {
        let (record, advance, round) = self.with_tournament(tournament_id, |t| {
            let record = t.record_result(pairing_id, winner)?;
            let advance = if !record.is_replay() && t.is_round_complete(t.current_round) {
                Some(t.advance_round()?)
            } else {
                None
            };
            Ok((record, advance, t.current_round))
        })?;
        if let Some(advance) = &advance {
            self.notify_advance(tournament_id, round, advance);
        }
        Ok((record, advance))
    }

    pub fn advance_round(&self, tournament_id: Uuid) -> Result<RoundAdvance, TournamentError> {
        let (advance, round) = self.with_tournament(tournament_id, |t| {
            let advance = t.advance_round()?;
            Ok((advance, t.current_round))
        })?;
        self.notify_advance(tournament_id, round, &advance);
        Ok(advance)
    }

    pub fn get_standings(&self, tournament_id: Uuid) -> Result<Vec<Participant>, TournamentError> {
        self.with_tournament(tournament_id, |t| {
            Ok(t.standings().into_iter().cloned().collect())
        })
    }

    pub fn winner(&self, tournament_id: Uuid) -> Result<Option<Participant>, TournamentError> {
        self.with_tournament(tournament_id, |t| Ok(t.winner().cloned()))
    }

    pub fn has_played(&self, tournament_id: Uuid, a: Uuid, b: Uuid) -> Result<bool, TournamentError> {
        self.with_tournament(tournament_id, |t| Ok(t.has_played(a, b)))
    }

    pub fn get_history(&self, tournament_id: Uuid, player_id: Uuid) -> Result<Vec<Pairing>, TournamentError> {
        self.with_tournament(tournament_id, |t| {
            Ok(t.get_history(player_id)?.into_iter().cloned().collect())
        })
    }

    pub fn pending_pairings(&self, tournament_id: Uuid) -> Result<Vec<Pairing>, TournamentError> {
        self.with_tournament(tournament_id, |t| {
            Ok(t.pending_pairings().into_iter().cloned().collect())
        })
    }

    pub fn buchholz(&self, tournament_id: Uuid, player_id: Uuid) -> Result<f32, TournamentError> {
        self.with_tournament(tournament_id, |t| t.buchholz(player_id))
    }

    pub fn sonneborn_berger(&self, tournament_id: Uuid, player_id: Uuid) -> Result<f32, TournamentError> {
        self.with_tournament(tournament_id, |t| t.sonneborn_berger(player_id))
    }

    pub fn snapshot(&self, tournament_id: Uuid) -> Result<String, TournamentError> {
        self.with_tournament(tournament_id, |t| t.to_json())
    }

    /// Load a snapshot, replacing any tournament with the same id.
    pub fn restore(&self, json: &str) -> Result<Uuid, TournamentError> {
        let tournament = SwissTournament::from_json(json)?;
        let id = tournament.id;
        self.insert(tournament)?;
        log::info!("Restored tournament {} at round {}", id, self.current_round(id)?);
        Ok(id)
    }

    fn insert(&self, tournament: SwissTournament) -> Result<(), TournamentError> {
        let id = tournament.id;
        let mut map = self
            .tournaments
            .write()
            .map_err(|_| TournamentError::LockPoisoned(id))?;
        map.insert(id, Arc::new(Mutex::new(tournament)));
        Ok(())
    }

    fn with_tournament<T>(
        &self,
        tournament_id: Uuid,
        f: impl FnOnce(&mut SwissTournament) -> Result<T, TournamentError>,
    ) -> Result<T, TournamentError> {
        let shared = {
            let map = self
                .tournaments
                .read()
                .map_err(|_| TournamentError::LockPoisoned(tournament_id))?;
            map.get(&tournament_id)
                .cloned()
                .ok_or(TournamentError::TournamentNotFound(tournament_id))?
        };
        let mut tournament = shared
            .lock()
            .map_err(|_| TournamentError::LockPoisoned(tournament_id))?;
        f(&mut tournament)
    }

    fn notify_round(&self, tournament_id: Uuid, round: u32, pairings: &[Pairing]) {
        if let Some(listener) = &self.listener {
            listener.on_round_paired(tournament_id, round, pairings);
        }
    }

    fn notify_advance(&self, tournament_id: Uuid, round: u32, advance: &RoundAdvance) {
        let Some(listener) = &self.listener else {
            return;
        };
        match advance {
            RoundAdvance::NextRound(pairings) => listener.on_round_paired(tournament_id, round, pairings),
            RoundAdvance::Finished(standings) => listener.on_tournament_finished(tournament_id, standings),
            RoundAdvance::AlreadyFinished(_) => {}
        }
    }
}
