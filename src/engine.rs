use crate::ConfigError;
use crate::Deck;
use crate::EngineConfig;
use crate::Event;
use crate::GameError;
use crate::Hand;
use crate::HandView;
use crate::Ledger;
use crate::PairKey;
use crate::PlayerId;
use crate::Record;
use crate::Registry;
use crate::Resolution;
use crate::Session;
use crate::TableView;
use crate::TaskSet;
use crate::scheduler;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Turn engine and session lifecycle coordinator.
///
/// Cheap to clone; every clone shares the registry, the stats ledger,
/// and the presenter event channel. Transitions run synchronously under
/// the registry lock, so for any session at most one of draw, hold, or
/// the timeout firing ever applies, and none interleaves mid-mutation.
/// Background tasks re-enter only through [`Engine::timeout`] and
/// [`Engine::refresh`].
///
/// [`Engine::start`], [`Engine::draw`], and [`Engine::hold`] arm those
/// tasks with `tokio::spawn`, so they must be called from within a
/// tokio runtime.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
}

struct Shared {
    config: EngineConfig,
    tables: Mutex<Registry>,
    ledger: Mutex<Ledger>,
    events: UnboundedSender<Event>,
}

/// How a session is being concluded, from the caller's point of view.
/// The reveal winner is computed at conclusion time, not here.
enum Conclusion {
    Bust { winner: PlayerId },
    Timeout { winner: PlayerId, timed_out: PlayerId },
    DeckEmpty,
    Reveal,
}

impl Engine {
    /// Validates the config, loads the stats ledger, and returns a handle.
    /// Emitted [`Event`]s flow to the presenter through `events`.
    pub fn new(config: EngineConfig, events: UnboundedSender<Event>) -> Result<Self, ConfigError> {
        config.validate()?;
        let ledger = Ledger::load(config.ledger.clone());
        Ok(Self {
            shared: Arc::new(Shared {
                tables: Mutex::new(Registry::default()),
                ledger: Mutex::new(ledger),
                config,
                events,
            }),
        })
    }

    /// Opens a session between two distinct players; the challenger acts
    /// first. Each hand starts with one card and a full AFK window.
    pub fn start(
        &self,
        challenger: PlayerId,
        opponent: PlayerId,
    ) -> Result<TableView, GameError> {
        if challenger == opponent {
            return Err(GameError::InvalidChallenge);
        }
        let pair = PairKey::new(challenger, opponent);
        let mut tables = self.tables();
        let mut deck = Deck::new(self.shared.config.deck_size).expect("config validated at construction");
        let mut hands = [Hand::new(challenger), Hand::new(opponent)];
        for hand in hands.iter_mut() {
            hand.add(deck.draw().expect("fresh deck covers the opening deal"));
        }
        let window = self.shared.config.turn_timeout;
        let session = tables.create(Session::new(pair, challenger, hands, deck, window))?;
        session.rearm(self.armed(pair));
        let view = session.view();
        log::info!("[engine {}] session started, {} to act", pair, challenger);
        self.emit(Event::Table(view.clone()));
        Ok(view)
    }

    /// Draws one card for the acting player, who keeps the turn with a
    /// fresh full window. Busting concludes the session immediately; an
    /// empty deck concludes it as a draw and reports [`GameError::DeckEmpty`].
    pub fn draw(&self, player: PlayerId) -> Result<HandView, GameError> {
        let mut tables = self.tables();
        let pair = tables.key_of(player).ok_or(GameError::NoActiveSession)?;
        let card = {
            let session = tables.get_mut(pair).expect("keyed session is present");
            if session.turn() != player {
                return Err(GameError::NotYourTurn);
            }
            if session.hand(player).holding() {
                return Err(GameError::AlreadyHolding);
            }
            session.cancel_tasks();
            session.deck_mut().draw()
        };
        let Some(card) = card else {
            log::info!("[engine {}] deck exhausted", pair);
            self.conclude(&mut tables, pair, Conclusion::DeckEmpty);
            return Err(GameError::DeckEmpty);
        };
        let (mine, busted) = {
            let session = tables.get_mut(pair).expect("keyed session is present");
            session.hand_mut(player).add(card);
            (HandView::from(session.hand(player)), session.hand(player).is_bust())
        };
        if busted {
            log::info!("[engine {}] {} busts at {}", pair, player, mine.total);
            let winner = pair.other(player);
            self.conclude(&mut tables, pair, Conclusion::Bust { winner });
            return Ok(mine);
        }
        let view = {
            let session = tables.get_mut(pair).expect("keyed session is present");
            session.reset_deadline(self.shared.config.turn_timeout);
            session.rearm(self.armed(pair));
            session.view()
        };
        log::debug!("[engine {}] {} draws to {}", pair, player, mine.total);
        self.emit(Event::Table(view));
        Ok(mine)
    }

    /// Stops drawing for the acting player. When both players hold the
    /// hands are revealed and scored; otherwise the turn flips to the
    /// opponent with a fresh full window.
    pub fn hold(&self, player: PlayerId) -> Result<(), GameError> {
        let mut tables = self.tables();
        let pair = tables.key_of(player).ok_or(GameError::NoActiveSession)?;
        let reveal = {
            let session = tables.get_mut(pair).expect("keyed session is present");
            if session.turn() != player {
                return Err(GameError::NotYourTurn);
            }
            if session.hand(player).holding() {
                return Err(GameError::AlreadyHolding);
            }
            session.cancel_tasks();
            session.hand_mut(player).hold();
            session.both_holding()
        };
        if reveal {
            self.conclude(&mut tables, pair, Conclusion::Reveal);
            return Ok(());
        }
        let view = {
            let session = tables.get_mut(pair).expect("keyed session is present");
            session.pass_turn();
            session.reset_deadline(self.shared.config.turn_timeout);
            session.rearm(self.armed(pair));
            session.view()
        };
        log::debug!("[engine {}] {} holds, {} to act", pair, player, view.turn);
        self.emit(Event::Table(view));
        Ok(())
    }

    /// Cumulative wins and losses for a player, zero when never seen.
    pub fn stats_of(&self, player: PlayerId) -> Record {
        self.ledger().get(player)
    }

    /// AFK deadline re-entry point: the current turn owner forfeits.
    /// Firing against an already resolved session, or against a deadline
    /// a transition has refreshed in the meantime, is a benign no-op.
    pub(crate) fn timeout(&self, pair: PairKey) {
        let mut tables = self.tables();
        let Some(session) = tables.get(pair) else {
            return;
        };
        // a firing delayed between waking and taking the lock may trail
        // the transition that disarmed it; abort() cannot stop a task
        // past its last await, so the deadline is re-checked here
        if session.remaining() > Duration::ZERO {
            log::debug!("[engine {}] stale afk firing ignored", pair);
            return;
        }
        let timed_out = session.turn();
        let winner = session.opponent(timed_out);
        log::info!("[engine {}] {} timed out", pair, timed_out);
        self.conclude(&mut tables, pair, Conclusion::Timeout { winner, timed_out });
    }

    /// Countdown re-entry point: re-emits the table snapshot so the
    /// presenter can refresh its countdown. False once the session is gone.
    pub(crate) fn refresh(&self, pair: PairKey) -> bool {
        let tables = self.tables();
        match tables.get(pair) {
            Some(session) => {
                self.emit(Event::Table(session.view()));
                true
            }
            None => false,
        }
    }

    /// The single authoritative end of a session. Removing the pair from
    /// the registry is the idempotence guard: a second conclusion, or a
    /// stale timeout racing a manual action, finds nothing and returns.
    fn conclude(&self, tables: &mut Registry, pair: PairKey, conclusion: Conclusion) {
        let Some(mut session) = tables.remove(pair) else {
            log::debug!("[engine {}] conclusion for resolved session ignored", pair);
            return;
        };
        session.cancel_tasks();
        let hands = session.views();
        let resolution = match conclusion {
            Conclusion::Bust { winner } => Resolution::bust(pair, winner, hands),
            Conclusion::Timeout { winner, timed_out } => {
                Resolution::timeout(pair, winner, timed_out, hands)
            }
            Conclusion::DeckEmpty => Resolution::deck_empty(pair, hands),
            Conclusion::Reveal => Resolution::reveal(pair, hands),
        };
        if let (Some(winner), Some(loser)) = (resolution.winner, resolution.loser()) {
            let mut ledger = self.ledger();
            ledger.record(winner, loser);
            if let Err(e) = ledger.flush() {
                log::warn!("[engine {}] stats flush failed: {}", pair, e);
            }
        }
        log::info!("[engine {}] {}", pair, resolution);
        self.emit(Event::GameOver(resolution));
    }

    fn armed(&self, pair: PairKey) -> TaskSet {
        scheduler::arm(
            self.clone(),
            pair,
            self.shared.config.turn_timeout,
            self.shared.config.refresh_interval,
        )
    }
    fn emit(&self, event: Event) {
        match self.shared.events.send(event) {
            Ok(()) => {}
            Err(e) => log::warn!("[engine] presenter channel closed: {}", e),
        }
    }
    fn tables(&self) -> MutexGuard<'_, Registry> {
        self.shared.tables.lock().expect("registry lock poisoned")
    }
    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.shared.ledger.lock().expect("ledger lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Card;
    use crate::Reason;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::sync::mpsc::unbounded_channel;

    const A: PlayerId = 11;
    const B: PlayerId = 22;

    fn scratch(name: &str) -> PathBuf {
        static SEQ: AtomicUsize = AtomicUsize::new(0);
        std::env::temp_dir().join(format!(
            "twentyone-engine-{}-{}-{}.json",
            name,
            std::process::id(),
            SEQ.fetch_add(1, Ordering::Relaxed)
        ))
    }

    fn fixture(name: &str, deck_size: Card) -> (Engine, UnboundedReceiver<Event>) {
        let config = EngineConfig {
            deck_size,
            ledger: scratch(name),
            ..EngineConfig::default()
        };
        let (tx, rx) = unbounded_channel();
        let engine = Engine::new(config, tx).expect("valid config");
        (engine, rx)
    }

    /// Drains emitted events and returns the resolutions among them.
    fn resolutions(rx: &mut UnboundedReceiver<Event>) -> Vec<Resolution> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let Event::GameOver(res) = event {
                out.push(res);
            }
        }
        out
    }

    fn resolution(rx: &mut UnboundedReceiver<Event>) -> Resolution {
        let mut all = resolutions(rx);
        assert_eq!(all.len(), 1, "expected exactly one resolution");
        all.remove(0)
    }

    #[tokio::test]
    async fn rejects_self_challenge() {
        let (engine, _rx) = fixture("self", 11);
        assert_eq!(engine.start(A, A), Err(GameError::InvalidChallenge));
    }
    #[tokio::test]
    async fn rejects_busy_players() {
        let (engine, _rx) = fixture("busy", 11);
        engine.start(A, B).expect("fresh pair");
        assert_eq!(engine.start(B, A), Err(GameError::SessionAlreadyActive));
        assert_eq!(engine.start(A, 33), Err(GameError::SessionAlreadyActive));
        engine.start(33, 44).expect("disjoint pair");
    }
    #[tokio::test]
    async fn rejects_undersized_config() {
        let (tx, _rx) = unbounded_channel();
        let config = EngineConfig {
            deck_size: 1,
            ledger: scratch("undersized"),
            ..EngineConfig::default()
        };
        assert_eq!(Engine::new(config, tx).err(), Some(ConfigError::DeckTooSmall(1)));
    }
    #[tokio::test]
    async fn opening_deal_is_one_card_each() {
        let (engine, _rx) = fixture("deal", 11);
        let view = engine.start(A, B).expect("fresh pair");
        assert_eq!(view.turn, A);
        assert_eq!(view.hands[0].cards.len(), 1);
        assert_eq!(view.hands[1].cards.len(), 1);
        assert!(!view.hands[0].holding);
        assert!(!view.hands[1].holding);
    }
    #[tokio::test]
    async fn draw_keeps_the_turn() {
        let (engine, _rx) = fixture("keep", 11);
        engine.start(A, B).expect("fresh pair");
        assert_eq!(engine.draw(B), Err(GameError::NotYourTurn));
        // two opening cards cap at 21, so the first draw can never bust
        let mine = engine.draw(A).expect("first draw is safe");
        assert_eq!(mine.cards.len(), 2);
        assert_eq!(engine.draw(B), Err(GameError::NotYourTurn));
    }
    #[tokio::test]
    async fn hold_passes_the_turn() {
        let (engine, _rx) = fixture("pass", 11);
        engine.start(A, B).expect("fresh pair");
        engine.hold(A).expect("challenger holds");
        assert_eq!(engine.draw(A), Err(GameError::NotYourTurn));
        engine.draw(B).expect("opponent now acts");
    }
    #[tokio::test]
    async fn unknown_player_has_no_session() {
        let (engine, _rx) = fixture("unknown", 11);
        assert_eq!(engine.draw(A), Err(GameError::NoActiveSession));
        assert_eq!(engine.hold(A), Err(GameError::NoActiveSession));
    }
    #[tokio::test]
    async fn bust_resolves_for_the_opponent() {
        let (engine, mut rx) = fixture("bust", 11);
        engine.start(A, B).expect("fresh pair");
        // 9 cards remain against a 21 cap, so A must bust before emptying the deck
        loop {
            match engine.draw(A) {
                Ok(mine) if mine.total > 21 => break,
                Ok(_) => continue,
                Err(e) => panic!("unexpected error {}", e),
            }
        }
        let res = resolution(&mut rx);
        assert_eq!(res.reason, Reason::Bust);
        assert_eq!(res.winner, Some(B));
        assert_eq!(res.timed_out, None);
        assert_eq!(engine.stats_of(B), Record { wins: 1, losses: 0 });
        assert_eq!(engine.stats_of(A), Record { wins: 0, losses: 1 });
        assert_eq!(engine.draw(A), Err(GameError::NoActiveSession));
    }
    #[tokio::test]
    async fn empty_deck_resolves_as_a_draw() {
        // a two-card deck is fully consumed by the opening deal
        let (engine, mut rx) = fixture("empty", 2);
        engine.start(A, B).expect("fresh pair");
        assert_eq!(engine.draw(A), Err(GameError::DeckEmpty));
        let res = resolution(&mut rx);
        assert_eq!(res.reason, Reason::DeckEmpty);
        assert!(res.is_tie());
        assert_eq!(engine.stats_of(A), Record::default());
        assert_eq!(engine.stats_of(B), Record::default());
    }
    #[tokio::test]
    async fn reveal_scores_the_hands() {
        // opening hands from a two-card deck are 1 and 2; the 2 wins
        let (engine, mut rx) = fixture("reveal", 2);
        engine.start(A, B).expect("fresh pair");
        engine.hold(A).expect("challenger holds");
        engine.hold(B).expect("opponent holds");
        let res = resolution(&mut rx);
        assert_eq!(res.reason, Reason::Reveal);
        let best = res
            .hands
            .iter()
            .max_by_key(|h| h.total)
            .map(|h| h.player)
            .expect("two hands");
        assert_eq!(res.winner, Some(best));
        assert_eq!(engine.stats_of(best).wins, 1);
        assert_eq!(engine.stats_of(res.pair.other(best)).losses, 1);
    }
    #[tokio::test]
    async fn holding_player_cannot_act_again() {
        let (engine, mut rx) = fixture("sticky", 11);
        engine.start(A, B).expect("fresh pair");
        engine.hold(A).expect("challenger holds");
        // turn belongs to B now, so A's repeat is a turn error first
        assert_eq!(engine.hold(A), Err(GameError::NotYourTurn));
        engine.hold(B).expect("opponent holds");
        assert_eq!(resolutions(&mut rx).len(), 1);
    }
    #[tokio::test(start_paused = true)]
    async fn afk_turn_owner_forfeits() {
        let (engine, mut rx) = fixture("afk", 11);
        engine.start(A, B).expect("fresh pair");
        tokio::time::sleep(Duration::from_secs(61)).await;
        let res = resolution(&mut rx);
        assert_eq!(res.reason, Reason::Timeout);
        assert_eq!(res.winner, Some(B));
        assert_eq!(res.timed_out, Some(A));
        assert_eq!(engine.stats_of(B).wins, 1);
        assert_eq!(engine.stats_of(A).losses, 1);
        assert_eq!(engine.hold(A), Err(GameError::NoActiveSession));
    }
    #[tokio::test(start_paused = true)]
    async fn acting_before_the_deadline_disarms_the_timer() {
        let (engine, mut rx) = fixture("disarm", 11);
        engine.start(A, B).expect("fresh pair");
        tokio::time::sleep(Duration::from_secs(45)).await;
        engine.draw(A).expect("still A's turn");
        // the old deadline passes; only the refreshed one may fire
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(resolutions(&mut rx).is_empty());
        tokio::time::sleep(Duration::from_secs(31)).await;
        let res = resolution(&mut rx);
        assert_eq!(res.timed_out, Some(A));
    }
    #[tokio::test(start_paused = true)]
    async fn countdown_keeps_refreshing() {
        let (engine, mut rx) = fixture("countdown", 11);
        engine.start(A, B).expect("fresh pair");
        tokio::time::sleep(Duration::from_secs(12)).await;
        let tables = {
            let mut count = 0;
            while let Ok(event) = rx.try_recv() {
                if matches!(event, Event::Table(_)) {
                    count += 1;
                }
            }
            count
        };
        // one snapshot at start plus at least two 5s refresh ticks
        assert!(tables >= 3, "got {} table snapshots", tables);
    }
    #[tokio::test(start_paused = true)]
    async fn late_firing_cannot_forfeit_a_fresh_window() {
        let (engine, mut rx) = fixture("late", 11);
        engine.start(A, B).expect("fresh pair");
        let pair = PairKey::new(A, B);
        tokio::time::sleep(Duration::from_secs(45)).await;
        engine.draw(A).expect("still A's turn");
        // a firing that woke on the old deadline but lost the lock race
        engine.timeout(pair);
        assert!(resolutions(&mut rx).is_empty());
        assert_eq!(engine.stats_of(B), Record::default());
        engine.hold(A).expect("session must still be live");
    }
    #[tokio::test]
    async fn stale_conclusion_is_a_noop() {
        let (engine, mut rx) = fixture("stale", 11);
        engine.start(A, B).expect("fresh pair");
        let pair = PairKey::new(A, B);
        engine.hold(A).expect("challenger holds");
        engine.hold(B).expect("opponent holds");
        engine.timeout(pair);
        engine.timeout(pair);
        assert_eq!(resolutions(&mut rx).len(), 1, "resolution must be unique");
    }
    #[tokio::test]
    async fn ledger_survives_restarts() {
        let path = scratch("restart");
        let config = EngineConfig {
            ledger: path.clone(),
            ..EngineConfig::default()
        };
        {
            let (tx, _rx) = unbounded_channel();
            let engine = Engine::new(config.clone(), tx).expect("valid config");
            engine.start(A, B).expect("fresh pair");
            while engine.draw(A).is_ok_and(|mine| mine.total <= 21) {}
        }
        let (tx, _rx) = unbounded_channel();
        let engine = Engine::new(config, tx).expect("valid config");
        assert_eq!(engine.stats_of(B), Record { wins: 1, losses: 0 });
        assert_eq!(engine.stats_of(A), Record { wins: 0, losses: 1 });
        let _ = std::fs::remove_file(path);
    }
}
