use crate::Card;
use crate::Event;
use crate::HandView;
use crate::PlayerId;
use crate::Resolution;
use crate::TableView;
use serde::Serialize;

/// Messages rendered for the chat presenter.
///
/// Public table messages conceal the first card of each hand, matching
/// the game rule that only the opponent's later draws are visible;
/// terminal messages reveal everything. The engine itself never makes
/// that distinction.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableMessage {
    /// Live table state with countdown.
    Table {
        players: [PlayerId; 2],
        turn: PlayerId,
        remaining_ms: u64,
        hands: Vec<Concealed>,
    },
    /// Private echo of the acting player's own hand after a draw.
    Hand {
        player: PlayerId,
        cards: Vec<Card>,
        total: u16,
    },
    /// Session ended.
    GameOver {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        winner: Option<PlayerId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        timed_out: Option<PlayerId>,
        hands: Vec<Revealed>,
    },
}

/// A hand with its first card hidden from the table.
#[derive(Clone, Debug, Serialize)]
pub struct Concealed {
    pub player: PlayerId,
    pub visible: Vec<Card>,
    pub holding: bool,
}

/// A fully revealed hand with its final total.
#[derive(Clone, Debug, Serialize)]
pub struct Revealed {
    pub player: PlayerId,
    pub cards: Vec<Card>,
    pub total: u16,
}

impl TableMessage {
    /// Converts an engine event to its wire form.
    pub fn encode(event: &Event) -> Self {
        match event {
            Event::Table(view) => Self::table(view),
            Event::GameOver(res) => Self::game_over(res),
        }
    }
    pub fn table(view: &TableView) -> Self {
        Self::Table {
            players: view.pair.players(),
            turn: view.turn,
            remaining_ms: view.remaining.as_millis() as u64,
            hands: view.hands.iter().map(Concealed::from).collect(),
        }
    }
    pub fn hand(view: &HandView) -> Self {
        Self::Hand {
            player: view.player,
            cards: view.cards.clone(),
            total: view.total,
        }
    }
    pub fn game_over(res: &Resolution) -> Self {
        Self::GameOver {
            reason: res.reason.as_str().to_string(),
            winner: res.winner,
            timed_out: res.timed_out,
            hands: res.hands.iter().map(Revealed::from).collect(),
        }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize table message")
    }
}

impl From<&HandView> for Concealed {
    fn from(view: &HandView) -> Self {
        Self {
            player: view.player,
            visible: view.cards.iter().skip(1).copied().collect(),
            holding: view.holding,
        }
    }
}

impl From<&HandView> for Revealed {
    fn from(view: &HandView) -> Self {
        Self {
            player: view.player,
            cards: view.cards.clone(),
            total: view.total,
        }
    }
}
