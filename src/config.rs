use serde::{Deserialize, Serialize};

use crate::error::TournamentError;

/// Fewer players than this cannot form a single pairing.
pub const MIN_PARTICIPANTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwissConfig {
    pub total_rounds: u32,
    pub min_participants: usize,
    pub max_participants: Option<usize>,
}

impl Default for SwissConfig {
    fn default() -> Self {
        Self {
            total_rounds: 5,
            min_participants: MIN_PARTICIPANTS,
            max_participants: None,
        }
    }
}

impl SwissConfig {
    pub fn with_rounds(total_rounds: u32) -> Self {
        Self {
            total_rounds,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, TournamentError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TournamentError> {
        if self.total_rounds == 0 {
            return Err(TournamentError::InvalidConfig(
                "total_rounds must be at least 1".to_string(),
            ));
        }
        if self.min_participants < MIN_PARTICIPANTS {
            return Err(TournamentError::InvalidConfig(format!(
                "min_participants must be at least {}",
                MIN_PARTICIPANTS
            )));
        }
        if let Some(max) = self.max_participants {
            if max < self.min_participants {
                return Err(TournamentError::InvalidConfig(format!(
                    "max_participants ({}) is below min_participants ({})",
                    max, self.min_participants
                )));
            }
        }
        Ok(())
    }
}
