use crate::Card;

/// Recoverable, per-command errors reported to the acting player.
/// None of these terminate a session or the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// A player challenged themselves.
    InvalidChallenge,
    /// One of the players is already seated at a live table.
    SessionAlreadyActive,
    /// The acting player has no live session.
    NoActiveSession,
    /// Another player holds the turn.
    NotYourTurn,
    /// The acting player already chose to hold.
    AlreadyHolding,
    /// The deck has no cards left to draw.
    DeckEmpty,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidChallenge => write!(f, "players must be two distinct people"),
            Self::SessionAlreadyActive => write!(f, "a game involving these players is already running"),
            Self::NoActiveSession => write!(f, "you are not in a game"),
            Self::NotYourTurn => write!(f, "it is not your turn"),
            Self::AlreadyHolding => write!(f, "you already chose to hold"),
            Self::DeckEmpty => write!(f, "the deck is out of cards"),
        }
    }
}

impl std::error::Error for GameError {}

/// Startup-fatal configuration errors. Never produced per-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Deck too small to deal an opening card to each player.
    DeckTooSmall(Card),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeckTooSmall(n) => write!(f, "deck of {} cards cannot seat two players", n),
        }
    }
}

impl std::error::Error for ConfigError {}
