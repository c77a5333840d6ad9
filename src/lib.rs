pub mod config;
pub mod error;
pub mod registry;
pub mod swiss;

pub use config::SwissConfig;
pub use error::TournamentError;
pub use registry::{RoundListener, TournamentRegistry};
pub use swiss::{
    standings_cmp, Outcome, Pairing, PairingHistory, PairingId, PairingResult, PairingStatus,
    Participant, ResultRecord, RoundAdvance, RoundPairings, StandingsLedger, SwissPairer,
    SwissTournament, TournamentStatus,
};
