use thiserror::Error;
use uuid::Uuid;

use crate::swiss::PairingId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TournamentError {
    #[error("Tournament {0} not found")]
    TournamentNotFound(Uuid),
    #[error("Pairing {0} not found")]
    PairingNotFound(PairingId),
    #[error("Player {0} is not a participant")]
    ParticipantNotFound(Uuid),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Round {round} is not ready: round {blocking_round} still has unfinished pairings")]
    RoundNotReady { round: u32, blocking_round: u32 },
    #[error("At least {required} participants are required, found {found}")]
    InsufficientParticipants { required: usize, found: usize },
    #[error("Player {player} did not take part in pairing {pairing}")]
    WinnerNotInPairing { pairing: PairingId, player: Uuid },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("State of tournament {0} is unavailable after a panic")]
    LockPoisoned(Uuid),
}

impl From<serde_json::Error> for TournamentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
