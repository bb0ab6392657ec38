use crate::Engine;
use crate::PairKey;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Background tasks owned by one session.
///
/// Every turn-owning transition replaces the whole set. `cancel_all` is
/// the single teardown entry point, and dropping the set aborts whatever
/// is still running, so a resolved session cannot leak a task.
#[derive(Debug, Default)]
pub struct TaskSet {
    handles: Vec<JoinHandle<()>>,
}

impl TaskSet {
    /// Aborts and forgets every owned task. Safe to call repeatedly.
    pub fn cancel_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for TaskSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Arms the two background tasks for a session's current turn.
///
/// The AFK task sleeps one full window and then forfeits the turn owner;
/// cancellation before the deadline is its normal fate whenever the turn
/// advances in time. The countdown task re-emits the table snapshot on a
/// fixed cadence so presenters can keep a visible timer fresh; it is
/// purely observational and exits once the session is gone. Both re-enter
/// the engine only through its transition entry points.
pub(crate) fn arm(engine: Engine, pair: PairKey, window: Duration, cadence: Duration) -> TaskSet {
    let afk = tokio::spawn({
        let engine = engine.clone();
        async move {
            tokio::time::sleep(window).await;
            log::debug!("[scheduler {}] afk window elapsed", pair);
            engine.timeout(pair);
        }
    });
    let countdown = tokio::spawn(async move {
        let mut ticks = tokio::time::interval(cadence);
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticks.tick().await; // first tick resolves immediately
        loop {
            ticks.tick().await;
            if !engine.refresh(pair) {
                log::debug!("[scheduler {}] countdown stops, session gone", pair);
                break;
            }
        }
    });
    TaskSet {
        handles: vec![afk, countdown],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn empty_set_cancels_cleanly() {
        let mut tasks = TaskSet::default();
        assert!(tasks.is_empty());
        tasks.cancel_all();
        tasks.cancel_all();
    }
    #[tokio::test]
    async fn cancel_all_aborts_owned_tasks() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        let mut tasks = TaskSet {
            handles: vec![handle],
        };
        tasks.cancel_all();
        assert!(tasks.is_empty());
    }
}
