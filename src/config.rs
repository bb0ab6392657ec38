use crate::Card;
use crate::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of distinct card values in a fresh deck.
    pub deck_size: Card,
    /// How long a player may sit on their turn before forfeiting.
    pub turn_timeout: Duration,
    /// Cadence of countdown re-broadcasts while a session is live.
    pub refresh_interval: Duration,
    /// Where the win/loss ledger lives on disk.
    pub ledger: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deck_size: 11,
            turn_timeout: Duration::from_secs(60),
            refresh_interval: Duration::from_secs(5),
            ledger: PathBuf::from("stats.json"),
        }
    }
}

impl EngineConfig {
    /// Rejects configurations that cannot deal the opening card to each player.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.deck_size {
            n if n < 2 => Err(ConfigError::DeckTooSmall(n)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.deck_size, 11);
        assert_eq!(config.turn_timeout, Duration::from_secs(60));
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }
    #[test]
    fn undersized_deck_rejected() {
        let config = EngineConfig {
            deck_size: 1,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::DeckTooSmall(1)));
    }
}
