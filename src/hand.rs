use crate::Card;
use crate::PlayerId;
use crate::TARGET_TOTAL;

/// A player's drawn cards within one session.
///
/// Cards stay in draw order. The engine treats every card alike; the
/// convention that the first card is hidden from the opponent lives
/// entirely in the presenter layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    player: PlayerId,
    cards: Vec<Card>,
    holding: bool,
}

impl Hand {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            cards: Vec::new(),
            holding: false,
        }
    }
    pub fn player(&self) -> PlayerId {
        self.player
    }
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
    /// Whether the player has chosen to stop drawing.
    pub fn holding(&self) -> bool {
        self.holding
    }
    /// Appends a drawn card.
    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }
    /// Stops drawing for good; there is no way back.
    pub fn hold(&mut self) {
        self.holding = true;
    }
    /// Sum of all drawn cards.
    pub fn total(&self) -> u16 {
        self.cards.iter().map(|&c| c as u16).sum()
    }
    /// A hand over the target total is bust.
    pub fn is_bust(&self) -> bool {
        self.total() > TARGET_TOTAL
    }
    /// Final score: the total, or zero when bust.
    pub fn score(&self) -> u16 {
        if self.is_bust() { 0 } else { self.total() }
    }
}
