//! Game events published after a move commits.
//!
//! Emission is fire-and-forget: a sink never fails the move that
//! produced the event, and listeners run on their own tasks.

use serde::Serialize;
use strictly_grid::{MatchResult, PlayerId};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Something listeners may react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    /// A move left the game open; the other player is up.
    TurnAdvanced {
        /// Session that moved.
        session_id: i32,
        /// Player now due to move.
        next_player: PlayerId,
        /// Their registered name.
        next_player_name: String,
    },
    /// A move ended the game and its settlement was recorded.
    GameEnded {
        /// Session that finished.
        session_id: i32,
        /// Score log row holding the settlement.
        score_id: i32,
        /// How it ended.
        result: MatchResult,
    },
}

/// Destination for game events.
pub trait EventSink: Send + Sync + std::fmt::Debug {
    /// Publishes an event. Must not block or fail.
    fn emit(&self, event: GameEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, event: GameEvent) {
        debug!(?event, "Event discarded");
    }
}

/// Fans events out over a `tokio` broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<GameEvent>,
}

impl BroadcastSink {
    /// Creates a channel buffering `capacity` events per subscriber.
    #[instrument]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Opens a new subscription; it sees events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.sender.subscribe()
    }
}

impl EventSink for BroadcastSink {
    #[instrument(skip(self))]
    fn emit(&self, event: GameEvent) {
        match self.sender.send(event) {
            Ok(receivers) => debug!(receivers, "Event published"),
            Err(broadcast::error::SendError(event)) => {
                debug!(?event, "No subscribers, event dropped")
            }
        }
    }
}

/// Logs the reminder a player would receive when it becomes their turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReminderNotifier;

impl ReminderNotifier {
    /// Handles one event, returning the reminder text if one is due.
    #[instrument(skip(self))]
    pub fn notify(&self, event: &GameEvent) -> Option<String> {
        match event {
            GameEvent::TurnAdvanced {
                session_id,
                next_player,
                next_player_name,
            } => {
                let reminder = format!(
                    "Hello {}, it's your turn in game {}!",
                    next_player_name, session_id
                );
                info!(%next_player, session_id, %reminder, "Turn reminder");
                Some(reminder)
            }
            GameEvent::GameEnded { .. } => None,
        }
    }

    /// Runs [`Self::notify`] for every event until the channel closes.
    pub fn spawn(self, mut events: broadcast::Receiver<GameEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        self.notify(&event);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Reminder listener lagged; reminders skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Event channel closed, reminder listener stopping");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let sink = BroadcastSink::new(4);
        sink.emit(GameEvent::GameEnded {
            session_id: 1,
            score_id: 1,
            result: MatchResult::Draw,
        });
    }

    #[test]
    fn test_subscriber_receives_events() {
        let sink = BroadcastSink::new(4);
        let mut rx = sink.subscribe();
        let event = GameEvent::TurnAdvanced {
            session_id: 3,
            next_player: PlayerId::from(2),
            next_player_name: "bob".to_string(),
        };
        sink.emit(event.clone());
        assert_eq!(rx.try_recv().unwrap(), event);
    }

    #[test]
    fn test_reminder_only_for_turns() {
        let notifier = ReminderNotifier;
        let reminder = notifier.notify(&GameEvent::TurnAdvanced {
            session_id: 7,
            next_player: PlayerId::from(2),
            next_player_name: "bob".to_string(),
        });
        assert_eq!(reminder.as_deref(), Some("Hello bob, it's your turn in game 7!"));

        let ended = GameEvent::GameEnded {
            session_id: 7,
            score_id: 1,
            result: MatchResult::PlayerXWon,
        };
        assert_eq!(notifier.notify(&ended), None);
    }

    #[tokio::test]
    async fn test_reminder_listener_stops_when_channel_closes() {
        let sink = BroadcastSink::new(4);
        let handle = ReminderNotifier.spawn(sink.subscribe());
        sink.emit(GameEvent::TurnAdvanced {
            session_id: 1,
            next_player: PlayerId::from(1),
            next_player_name: "ann".to_string(),
        });
        drop(sink);
        handle.await.unwrap();
    }
}
