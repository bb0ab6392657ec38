use crate::Card;
use crate::Hand;
use crate::PairKey;
use crate::PlayerId;
use crate::TARGET_TOTAL;
use std::cmp::Ordering;
use std::time::Duration;

/// Events emitted to the external presenter on every state change.
#[derive(Clone, Debug)]
pub enum Event {
    /// Public table state, re-emitted on each transition and refresh tick.
    Table(TableView),
    /// Terminal snapshot; exactly one per session.
    GameOver(Resolution),
}

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    /// A drawn card pushed the actor past the target; the opponent wins.
    Bust,
    /// The turn owner sat out the whole AFK window.
    Timeout,
    /// A draw was requested from an empty deck; nobody wins.
    DeckEmpty,
    /// Both players held; scores decide, equal scores tie.
    Reveal,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bust => "bust",
            Self::Timeout => "timeout",
            Self::DeckEmpty => "deck_empty",
            Self::Reveal => "reveal",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One player's hand as exposed to the presenter.
/// Which cards the opponent may see is the presenter's call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandView {
    pub player: PlayerId,
    pub cards: Vec<Card>,
    pub total: u16,
    pub holding: bool,
}

impl HandView {
    /// Final score: the total, or zero when bust.
    pub fn score(&self) -> u16 {
        if self.total > TARGET_TOTAL { 0 } else { self.total }
    }
}

impl From<&Hand> for HandView {
    fn from(hand: &Hand) -> Self {
        Self {
            player: hand.player(),
            cards: hand.cards().to_vec(),
            total: hand.total(),
            holding: hand.holding(),
        }
    }
}

/// Public state of a live table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableView {
    pub pair: PairKey,
    pub hands: [HandView; 2],
    pub turn: PlayerId,
    pub remaining: Duration,
}

/// Terminal outcome of a session, with both final hands.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub pair: PairKey,
    pub reason: Reason,
    pub winner: Option<PlayerId>,
    pub timed_out: Option<PlayerId>,
    pub hands: [HandView; 2],
}

impl Resolution {
    pub fn bust(pair: PairKey, winner: PlayerId, hands: [HandView; 2]) -> Self {
        Self {
            pair,
            reason: Reason::Bust,
            winner: Some(winner),
            timed_out: None,
            hands,
        }
    }
    pub fn timeout(
        pair: PairKey,
        winner: PlayerId,
        timed_out: PlayerId,
        hands: [HandView; 2],
    ) -> Self {
        Self {
            pair,
            reason: Reason::Timeout,
            winner: Some(winner),
            timed_out: Some(timed_out),
            hands,
        }
    }
    pub fn deck_empty(pair: PairKey, hands: [HandView; 2]) -> Self {
        Self {
            pair,
            reason: Reason::DeckEmpty,
            winner: None,
            timed_out: None,
            hands,
        }
    }
    /// Builds the reveal outcome: higher score wins, busts score zero,
    /// equal scores are a tie.
    pub fn reveal(pair: PairKey, hands: [HandView; 2]) -> Self {
        let winner = match hands[0].score().cmp(&hands[1].score()) {
            Ordering::Greater => Some(hands[0].player),
            Ordering::Less => Some(hands[1].player),
            Ordering::Equal => None,
        };
        Self {
            pair,
            reason: Reason::Reveal,
            winner,
            timed_out: None,
            hands,
        }
    }
    /// The loser, when the outcome is decisive.
    pub fn loser(&self) -> Option<PlayerId> {
        self.winner.map(|w| self.pair.other(w))
    }
    pub fn is_tie(&self) -> bool {
        self.winner.is_none()
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table(view) => write!(
                f,
                "table {}: {} to act, {}s left",
                view.pair,
                view.turn,
                view.remaining.as_secs()
            ),
            Self::GameOver(res) => write!(f, "game over {}: {}", res.pair, res),
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.winner {
            Some(winner) => write!(f, "{}, {} wins", self.reason, winner),
            None => write!(f, "{}, nobody wins", self.reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(player: PlayerId, cards: &[Card], holding: bool) -> HandView {
        let mut hand = Hand::new(player);
        for &card in cards {
            hand.add(card);
        }
        if holding {
            hand.hold();
        }
        HandView::from(&hand)
    }

    #[test]
    fn reveal_picks_higher_score() {
        let pair = PairKey::new(1, 2);
        let res = Resolution::reveal(pair, [view(1, &[9, 8], true), view(2, &[10, 10], true)]);
        assert_eq!(res.winner, Some(2));
        assert_eq!(res.loser(), Some(1));
    }
    #[test]
    fn reveal_bust_scores_zero() {
        let pair = PairKey::new(1, 2);
        let res = Resolution::reveal(pair, [view(1, &[11, 11], false), view(2, &[2], true)]);
        assert_eq!(res.winner, Some(2));
    }
    #[test]
    fn reveal_equal_scores_tie() {
        let pair = PairKey::new(1, 2);
        let res = Resolution::reveal(pair, [view(1, &[9, 8], true), view(2, &[10, 7], true)]);
        assert!(res.is_tie());
        assert_eq!(res.loser(), None);
    }
    #[test]
    fn hand_view_mirrors_hand() {
        let v = view(1, &[11, 11], false);
        assert_eq!(v.total, 22);
        assert_eq!(v.score(), 0);
        assert!(!v.holding);
    }
    #[test]
    fn resolution_renders() {
        let pair = PairKey::new(1, 2);
        let res = Resolution::bust(pair, 2, [view(1, &[11, 11], false), view(2, &[2], false)]);
        assert_eq!(res.to_string(), "bust, 2 wins");
    }
    #[test]
    fn events_render_for_logs() {
        let pair = PairKey::new(1, 2);
        let table = Event::Table(TableView {
            pair,
            hands: [view(1, &[5], false), view(2, &[9], false)],
            turn: 1,
            remaining: Duration::from_secs(42),
        });
        assert_eq!(table.to_string(), "table 1v2: 1 to act, 42s left");
        let res = Resolution::bust(pair, 2, [view(1, &[11, 11], false), view(2, &[2], false)]);
        assert_eq!(
            Event::GameOver(res).to_string(),
            "game over 1v2: bust, 2 wins"
        );
    }
}
