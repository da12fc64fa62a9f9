use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
    time::{interval_at, Instant},
};

use crate::{
    errors::{AppError, AppResult},
    models::dto::response::{SessionResponse, Warning},
    services::{
        question_bank::QuestionBank,
        quiz_session::{QuizOutcome, QuizSession, SessionEvent, SessionSnapshot},
        session_timer::{SessionTimer, SharedSession, TimeoutListener, TICK_PERIOD},
    },
};

/// Sessions nobody has touched for this long are dropped by the sweeper.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Where finished sessions are reported.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreSink: Send + Sync {
    async fn record_result(&self, user_id: &str, outcome: &QuizOutcome) -> AppResult<()>;
}

/// Who a session belongs to. Signed-in users are keyed by user id, anonymous
/// callers by the key their client generated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOwner {
    key: String,
    user_id: Option<String>,
}

impl SessionOwner {
    pub fn user(user_id: &str) -> Self {
        Self {
            key: format!("user:{}", user_id),
            user_id: Some(user_id.to_string()),
        }
    }

    pub fn anonymous(client_key: &str) -> Self {
        Self {
            key: format!("anon:{}", client_key),
            user_id: None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// Writes finished results for one session and keeps the warnings that could
/// not be returned yet.
struct ResultRecorder {
    user_id: Option<String>,
    sink: Arc<dyn ScoreSink>,
    warnings: Mutex<Vec<Warning>>,
}

impl ResultRecorder {
    async fn record(&self, outcome: &QuizOutcome) {
        let Some(user_id) = self.user_id.as_deref() else {
            return;
        };

        if let Err(err) = self.sink.record_result(user_id, outcome).await {
            log::error!(
                "Failed to save result for '{}' on '{}': {}",
                user_id,
                outcome.topic,
                err
            );
            self.warnings.lock().await.push(Warning::ResultNotSaved);
        }
    }

    async fn drain(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.warnings.lock().await)
    }
}

#[async_trait]
impl TimeoutListener for ResultRecorder {
    async fn on_timeout(&self, event: SessionEvent) {
        if let SessionEvent::Finished(outcome) = event {
            self.record(&outcome).await;
        }
    }
}

struct SessionSlot {
    session: SharedSession,
    timer: Mutex<SessionTimer>,
    recorder: Arc<ResultRecorder>,
    last_active: Mutex<Instant>,
}

impl SessionSlot {
    async fn touch(&self) {
        *self.last_active.lock().await = Instant::now();
    }

    async fn idle_for(&self) -> Duration {
        self.last_active.lock().await.elapsed()
    }

    async fn reschedule(&self, session: &QuizSession) {
        let mut timer = self.timer.lock().await;
        match session.tick_token() {
            Some(token) => timer.schedule(
                Arc::clone(&self.session),
                token,
                Arc::clone(&self.recorder) as Arc<dyn TimeoutListener>,
            ),
            None => timer.cancel(),
        }
    }

    async fn respond(&self, snapshot: SessionSnapshot) -> SessionResponse {
        SessionResponse {
            session: snapshot,
            warnings: self.recorder.drain().await,
        }
    }

    async fn shutdown(&self) {
        let mut session = self.session.lock().await;
        session.abort();
        self.timer.lock().await.cancel();
    }
}

/// Live quiz sessions, one per owner.
pub struct QuizSessionService {
    bank: Arc<QuestionBank>,
    sink: Arc<dyn ScoreSink>,
    sessions: RwLock<HashMap<String, Arc<SessionSlot>>>,
    tick_period: Duration,
    idle_timeout: Duration,
}

impl QuizSessionService {
    pub fn new(bank: Arc<QuestionBank>, sink: Arc<dyn ScoreSink>) -> Self {
        Self::with_tick_period(bank, sink, TICK_PERIOD)
    }

    pub fn with_tick_period(
        bank: Arc<QuestionBank>,
        sink: Arc<dyn ScoreSink>,
        tick_period: Duration,
    ) -> Self {
        Self {
            bank,
            sink,
            sessions: RwLock::new(HashMap::new()),
            tick_period,
            idle_timeout: SESSION_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Starts a fresh session on `topic`, replacing any session the owner had.
    pub async fn start(&self, owner: &SessionOwner, topic: &str) -> AppResult<SessionResponse> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AppError::ValidationError("Topic is required".into()));
        }

        let previous = self.sessions.write().await.remove(&owner.key);
        if let Some(previous) = previous {
            log::debug!("Replacing running session of '{}'", owner.key);
            previous.shutdown().await;
        }

        let reconciliation = self.bank.reconcile(topic).await;
        let warnings = reconciliation.warnings;

        let mut session = QuizSession::new();
        if let SessionEvent::NoQuestions = session.start(topic, reconciliation.questions) {
            return Ok(SessionResponse {
                session: session.snapshot(),
                warnings,
            });
        }

        let snapshot = session.snapshot();
        let slot = Arc::new(SessionSlot {
            session: Arc::new(Mutex::new(session)),
            timer: Mutex::new(SessionTimer::new(self.tick_period)),
            recorder: Arc::new(ResultRecorder {
                user_id: owner.user_id.clone(),
                sink: Arc::clone(&self.sink),
                warnings: Mutex::new(Vec::new()),
            }),
            last_active: Mutex::new(Instant::now()),
        });
        {
            let session = slot.session.lock().await;
            slot.reschedule(&session).await;
        }
        self.sessions
            .write()
            .await
            .insert(owner.key.clone(), Arc::clone(&slot));

        log::info!("Started '{}' session for '{}'", topic, owner.key);
        Ok(SessionResponse {
            session: snapshot,
            warnings,
        })
    }

    pub async fn answer(&self, owner: &SessionOwner, choice: &str) -> AppResult<SessionResponse> {
        let Some(slot) = self.slot(owner).await else {
            return Ok(Self::idle());
        };

        let mut session = slot.session.lock().await;
        if let SessionEvent::Answered { .. } = session.answer(choice) {
            slot.timer.lock().await.cancel();
        }
        let snapshot = session.snapshot();
        drop(session);

        Ok(slot.respond(snapshot).await)
    }

    pub async fn advance(&self, owner: &SessionOwner) -> AppResult<SessionResponse> {
        self.transition(owner, QuizSession::advance).await
    }

    pub async fn restart(&self, owner: &SessionOwner) -> AppResult<SessionResponse> {
        self.transition(owner, QuizSession::restart).await
    }

    pub async fn abort(&self, owner: &SessionOwner) -> AppResult<SessionResponse> {
        let removed = self.sessions.write().await.remove(&owner.key);
        let Some(slot) = removed else {
            return Ok(Self::idle());
        };

        slot.shutdown().await;
        let snapshot = slot.session.lock().await.snapshot();
        Ok(slot.respond(snapshot).await)
    }

    pub async fn snapshot(&self, owner: &SessionOwner) -> AppResult<SessionResponse> {
        let Some(slot) = self.slot(owner).await else {
            return Ok(Self::idle());
        };

        let snapshot = slot.session.lock().await.snapshot();
        Ok(slot.respond(snapshot).await)
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session whose owner has not called in for the idle
    /// timeout, whatever its phase. Returns how many were dropped.
    pub async fn evict_idle(&self) -> usize {
        let slots: Vec<(String, Arc<SessionSlot>)> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(key, slot)| (key.clone(), Arc::clone(slot)))
            .collect();

        let mut stale = Vec::new();
        for (key, slot) in slots {
            if slot.idle_for().await >= self.idle_timeout {
                stale.push(key);
            }
        }
        if stale.is_empty() {
            return 0;
        }

        let mut evicted = Vec::new();
        {
            let mut sessions = self.sessions.write().await;
            for key in stale {
                // The owner may have come back since the first pass.
                let still_idle = match sessions.get(&key) {
                    Some(slot) => slot.idle_for().await >= self.idle_timeout,
                    None => false,
                };
                if still_idle {
                    if let Some(slot) = sessions.remove(&key) {
                        evicted.push((key, slot));
                    }
                }
            }
        }

        for (key, slot) in &evicted {
            log::debug!("Evicting idle session of '{}'", key);
            slot.shutdown().await;
        }
        evicted.len()
    }

    /// Runs [`Self::evict_idle`] every `every` until the server stops.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            loop {
                ticker.tick().await;
                let evicted = self.evict_idle().await;
                if evicted > 0 {
                    log::info!("Evicted {} idle quiz session(s)", evicted);
                }
            }
        })
    }

    async fn transition(
        &self,
        owner: &SessionOwner,
        step: fn(&mut QuizSession) -> SessionEvent,
    ) -> AppResult<SessionResponse> {
        let Some(slot) = self.slot(owner).await else {
            return Ok(Self::idle());
        };

        let mut session = slot.session.lock().await;
        let event = step(&mut session);
        match event {
            SessionEvent::QuestionShown(_) => slot.reschedule(&session).await,
            SessionEvent::Finished(_) => slot.timer.lock().await.cancel(),
            _ => {}
        }
        let snapshot = session.snapshot();
        drop(session);

        if let SessionEvent::Finished(outcome) = &event {
            log::info!(
                "'{}' finished '{}' with {}/{}",
                owner.key,
                outcome.topic,
                outcome.score,
                outcome.total_possible()
            );
            slot.recorder.record(outcome).await;
        }
        Ok(slot.respond(snapshot).await)
    }

    async fn slot(&self, owner: &SessionOwner) -> Option<Arc<SessionSlot>> {
        let slot = self.sessions.read().await.get(&owner.key).cloned()?;
        slot.touch().await;
        Some(slot)
    }

    fn idle() -> SessionResponse {
        SessionResponse {
            session: QuizSession::new().snapshot(),
            warnings: Vec::new(),
        }
    }
}
