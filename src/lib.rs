//! Session engine for chat-hosted Twenty One duels.
//!
//! Runs short-lived two-player card games: draw toward 21 without going
//! over, first card of each hand concealed from the opponent. This crate
//! owns the reusable core of the bot: the per-session turn state machine,
//! its concurrency-safe lifecycle (creation, turn alternation, AFK
//! forfeiture, resolution, cleanup), and the win/loss ledger it feeds.
//! Rendering, command parsing, and the chat gateway belong to external
//! collaborators.
//!
//! ## Architecture
//!
//! - [`Engine`] - Turn transitions (start/draw/hold) and the single authoritative conclusion
//! - [`Registry`] - Live sessions keyed by unordered player pair
//! - [`Session`] - One game's hands, deck, turn owner, deadline, and owned tasks
//! - [`TaskSet`] - AFK-timeout and countdown-refresh tasks behind one cancel entry point
//! - [`Ledger`] - Durable per-player win/loss stats with buffered JSON flushes
//!
//! ## Events
//!
//! - [`Event`] - Presenter-facing snapshots emitted on every state change
//! - [`TableMessage`] - Wire rendering, concealing the first card at the table
mod config;
mod deck;
mod engine;
mod error;
mod event;
mod hand;
mod ledger;
mod message;
mod registry;
mod scheduler;
mod session;

pub use config::*;
pub use deck::*;
pub use engine::*;
pub use error::*;
pub use event::*;
pub use hand::*;
pub use ledger::*;
pub use message::*;
pub use registry::*;
pub use scheduler::*;
pub use session::*;

/// Chat-native player identity.
pub type PlayerId = u64;
/// Face value of one card, `1..=deck_size`.
pub type Card = u8;
/// Busting threshold: a hand totalling more than this scores zero.
pub const TARGET_TOTAL: u16 = 21;
