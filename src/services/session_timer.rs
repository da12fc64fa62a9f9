use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};

use crate::services::quiz_session::{QuizSession, SessionEvent, TickToken};

pub type SharedSession = Arc<Mutex<QuizSession>>;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Told about transitions the countdown caused on its own.
#[async_trait]
pub trait TimeoutListener: Send + Sync {
    async fn on_timeout(&self, event: SessionEvent);
}

/// Drives `QuizSession::tick` from a tokio task. At most one task is pending
/// per timer; scheduling again cancels the previous one.
pub struct SessionTimer {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl SessionTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    pub fn schedule(
        &mut self,
        session: SharedSession,
        token: TickToken,
        listener: Arc<dyn TimeoutListener>,
    ) {
        self.cancel();
        let period = self.period;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut token = token;

            loop {
                ticker.tick().await;

                let mut guard = session.lock().await;
                match guard.tick(token) {
                    SessionEvent::Ticked { .. } => continue,
                    event @ SessionEvent::QuestionShown(_) => {
                        // The countdown keeps running for the next question.
                        let Some(next) = guard.tick_token() else {
                            break;
                        };
                        token = next;
                        drop(guard);
                        listener.on_timeout(event).await;
                    }
                    event @ SessionEvent::Finished(_) => {
                        drop(guard);
                        // Runs detached so that cancelling the timer cannot
                        // cut the finish notification short.
                        tokio::spawn(async move { listener.on_timeout(event).await });
                        break;
                    }
                    _ => break,
                }
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
