use crate::Deck;
use crate::Hand;
use crate::HandView;
use crate::PlayerId;
use crate::TableView;
use crate::TaskSet;
use std::time::Duration;
use tokio::time::Instant;

/// Unordered pair of distinct players identifying one session.
/// Construction normalizes order so `{a, b}` and `{b, a}` collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(PlayerId, PlayerId);

impl PairKey {
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        debug_assert!(a != b, "pair of identical players");
        Self(a.min(b), a.max(b))
    }
    pub fn contains(&self, player: PlayerId) -> bool {
        self.0 == player || self.1 == player
    }
    /// The seat across the table.
    pub fn other(&self, player: PlayerId) -> PlayerId {
        if player == self.0 { self.1 } else { self.0 }
    }
    pub fn players(&self) -> [PlayerId; 2] {
        [self.0, self.1]
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.0, self.1)
    }
}

/// One live game's full mutable state.
///
/// Created only by `Engine::start` and destroyed only by the engine's
/// conclusion path. While alive it is the sole owner of its background
/// tasks, which are cancelled before the session leaves the registry.
#[derive(Debug)]
pub struct Session {
    pair: PairKey,
    hands: [Hand; 2],
    deck: Deck,
    turn: PlayerId,
    deadline: Instant,
    tasks: TaskSet,
}

impl Session {
    pub(crate) fn new(
        pair: PairKey,
        first: PlayerId,
        hands: [Hand; 2],
        deck: Deck,
        window: Duration,
    ) -> Self {
        Self {
            pair,
            hands,
            deck,
            turn: first,
            deadline: Instant::now() + window,
            tasks: TaskSet::default(),
        }
    }
    pub fn pair(&self) -> PairKey {
        self.pair
    }
    /// Who acts next.
    pub fn turn(&self) -> PlayerId {
        self.turn
    }
    pub fn opponent(&self, player: PlayerId) -> PlayerId {
        self.pair.other(player)
    }
    pub fn deck(&self) -> &Deck {
        &self.deck
    }
    pub(crate) fn deck_mut(&mut self) -> &mut Deck {
        &mut self.deck
    }
    pub fn hand(&self, player: PlayerId) -> &Hand {
        &self.hands[self.seat(player)]
    }
    pub(crate) fn hand_mut(&mut self, player: PlayerId) -> &mut Hand {
        &mut self.hands[self.seat(player)]
    }
    pub fn both_holding(&self) -> bool {
        self.hands.iter().all(Hand::holding)
    }
    /// Absolute AFK deadline for the current turn.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
    /// Time left before the turn owner forfeits.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
    pub(crate) fn pass_turn(&mut self) {
        self.turn = self.pair.other(self.turn);
    }
    pub(crate) fn reset_deadline(&mut self, window: Duration) {
        self.deadline = Instant::now() + window;
    }
    /// Cancels every background task this session owns.
    pub(crate) fn cancel_tasks(&mut self) {
        self.tasks.cancel_all();
    }
    /// Replaces the owned task set, cancelling whatever ran before.
    pub(crate) fn rearm(&mut self, tasks: TaskSet) {
        self.tasks.cancel_all();
        self.tasks = tasks;
    }
    /// Public state snapshot for the presenter.
    pub fn view(&self) -> TableView {
        TableView {
            pair: self.pair,
            hands: self.views(),
            turn: self.turn,
            remaining: self.remaining(),
        }
    }
    pub(crate) fn views(&self) -> [HandView; 2] {
        [
            HandView::from(&self.hands[0]),
            HandView::from(&self.hands[1]),
        ]
    }
    fn seat(&self, player: PlayerId) -> usize {
        debug_assert!(self.pair.contains(player), "player not in this session");
        if self.hands[0].player() == player { 0 } else { 1 }
    }
}
