use crate::Card;
use crate::ConfigError;
use rand::seq::SliceRandom;

/// A uniformly shuffled run of card values `1..=n`, consumed from the back.
///
/// Twenty One plays with one card per value, so no value ever repeats
/// within a deck. The permutation is fixed at construction; drawing only
/// pops, and a deck is never refilled mid-game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck(Vec<Card>);

impl Deck {
    /// Creates a freshly shuffled deck of values `1..=n`.
    /// The opening deal needs one card per player, hence the `n >= 2` bound.
    pub fn new(n: Card) -> Result<Self, ConfigError> {
        if n < 2 {
            return Err(ConfigError::DeckTooSmall(n));
        }
        let mut cards = (1..=n).collect::<Vec<_>>();
        cards.shuffle(&mut rand::rng());
        Ok(Self(cards))
    }
    /// Draws the next card, or None once the deck is exhausted.
    pub fn draw(&mut self) -> Option<Card> {
        self.0.pop()
    }
    /// Cards remaining.
    pub fn size(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
