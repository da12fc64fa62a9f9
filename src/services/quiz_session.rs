//! Single quiz attempt over a fixed question list.
//!
//! The session is a plain state machine: every transition is a method that
//! returns a [`SessionEvent`] describing what happened. Transitions that are
//! not valid in the current state return [`SessionEvent::Ignored`] and leave
//! the session untouched, since UI events can arrive in any order.
//!
//! Time is driven from outside through [`QuizSession::tick`]. Each tick must
//! carry the [`TickToken`] that was current when it was scheduled; any
//! transition that leaves the question or records an answer invalidates the
//! outstanding token.

use async_graphql::{Enum, SimpleObject};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::Serialize;

use crate::models::domain::Question;

pub const QUESTION_TIME_SECS: u32 = 15;
pub const POINTS_PER_CORRECT: i64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Enum)]
pub enum SessionPhase {
    Idle,
    InProgress,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickToken(u64);

/// The question currently shown, with its options in display order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionView {
    pub question: Question,
    pub index: usize,
    pub total: usize,
}

/// Final result of a finished session. Pass/fail is a reporting policy and is
/// derived here from the raw score and question count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, SimpleObject)]
pub struct QuizOutcome {
    pub topic: String,
    pub score: i64,
    pub question_count: i64,
}

impl QuizOutcome {
    pub fn total_possible(&self) -> i64 {
        POINTS_PER_CORRECT * self.question_count
    }

    pub fn pass_threshold(&self) -> f64 {
        self.total_possible() as f64 / 2.0
    }

    /// Strictly greater than half of the total.
    pub fn passed(&self) -> bool {
        self.score * 2 > self.total_possible()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Ignored,
    NoQuestions,
    QuestionShown(QuestionView),
    Ticked { remaining: u32 },
    Answered { choice: String, correct: bool },
    Finished(QuizOutcome),
    Reset,
}

/// Question data safe to show before the user answers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, SimpleObject)]
pub struct ShownQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub index: i64,
    pub total: i64,
}

impl From<&QuestionView> for ShownQuestion {
    fn from(view: &QuestionView) -> Self {
        ShownQuestion {
            id: view.question.id.clone(),
            question: view.question.question.clone(),
            options: view.question.options.clone(),
            index: view.index as i64,
            total: view.total as i64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, SimpleObject)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub topic: Option<String>,
    pub question: Option<ShownQuestion>,
    pub selected: Option<String>,
    /// Revealed once the current question has been answered.
    pub correct_answer: Option<String>,
    pub answered_correctly: Option<bool>,
    pub score: i64,
    pub question_count: i64,
    pub remaining_secs: i64,
    pub outcome: Option<QuizOutcome>,
}

pub struct QuizSession {
    phase: SessionPhase,
    topic: String,
    questions: Vec<Question>,
    index: usize,
    current: Option<QuestionView>,
    selected: Option<String>,
    answered_correctly: Option<bool>,
    score: i64,
    remaining_secs: u32,
    tick_epoch: u64,
    rng: StdRng,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic option order, for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        QuizSession {
            phase: SessionPhase::Idle,
            topic: String::new(),
            questions: Vec::new(),
            index: 0,
            current: None,
            selected: None,
            answered_correctly: None,
            score: 0,
            remaining_secs: QUESTION_TIME_SECS,
            tick_epoch: 0,
            rng,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn current_view(&self) -> Option<&QuestionView> {
        self.current.as_ref()
    }

    /// Token for the next tick, if the countdown is running.
    pub fn tick_token(&self) -> Option<TickToken> {
        if self.phase == SessionPhase::InProgress && self.selected.is_none() {
            Some(TickToken(self.tick_epoch))
        } else {
            None
        }
    }

    pub fn outcome(&self) -> Option<QuizOutcome> {
        (self.phase == SessionPhase::Finished).then(|| self.final_outcome())
    }

    fn final_outcome(&self) -> QuizOutcome {
        QuizOutcome {
            topic: self.topic.clone(),
            score: self.score,
            question_count: self.questions.len() as i64,
        }
    }

    pub fn start(&mut self, topic: &str, questions: Vec<Question>) -> SessionEvent {
        if self.phase != SessionPhase::Idle {
            return SessionEvent::Ignored;
        }
        if questions.is_empty() {
            return SessionEvent::NoQuestions;
        }

        self.topic = topic.to_string();
        self.questions = questions;
        self.enter_first_question()
    }

    pub fn tick(&mut self, token: TickToken) -> SessionEvent {
        if self.tick_token() != Some(token) {
            return SessionEvent::Ignored;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            // Timed out: move on without recording an answer.
            return self.next_question();
        }
        SessionEvent::Ticked {
            remaining: self.remaining_secs,
        }
    }

    pub fn answer(&mut self, choice: &str) -> SessionEvent {
        if self.phase != SessionPhase::InProgress || self.selected.is_some() {
            return SessionEvent::Ignored;
        }
        let Some(view) = self.current.as_ref() else {
            return SessionEvent::Ignored;
        };

        let correct = view.question.answer == choice;
        if correct {
            self.score += POINTS_PER_CORRECT;
        }
        self.selected = Some(choice.to_string());
        self.answered_correctly = Some(correct);
        self.tick_epoch += 1;

        SessionEvent::Answered {
            choice: choice.to_string(),
            correct,
        }
    }

    pub fn advance(&mut self) -> SessionEvent {
        if self.phase != SessionPhase::InProgress || self.selected.is_none() {
            return SessionEvent::Ignored;
        }
        self.next_question()
    }

    /// Replay the same list from the first question. Topic and list are kept.
    pub fn restart(&mut self) -> SessionEvent {
        if self.phase != SessionPhase::Finished {
            return SessionEvent::Ignored;
        }
        self.enter_first_question()
    }

    pub fn abort(&mut self) -> SessionEvent {
        self.phase = SessionPhase::Idle;
        self.topic.clear();
        self.questions.clear();
        self.index = 0;
        self.current = None;
        self.selected = None;
        self.answered_correctly = None;
        self.score = 0;
        self.remaining_secs = QUESTION_TIME_SECS;
        self.tick_epoch += 1;
        SessionEvent::Reset
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let answered = self.selected.is_some();
        SessionSnapshot {
            phase: self.phase,
            topic: (self.phase != SessionPhase::Idle).then(|| self.topic.clone()),
            question: self
                .current
                .as_ref()
                .filter(|_| self.phase == SessionPhase::InProgress)
                .map(ShownQuestion::from),
            selected: self.selected.clone(),
            correct_answer: self
                .current
                .as_ref()
                .filter(|_| answered)
                .map(|view| view.question.answer.clone()),
            answered_correctly: self.answered_correctly,
            score: self.score,
            question_count: self.questions.len() as i64,
            remaining_secs: self.remaining_secs as i64,
            outcome: self.outcome(),
        }
    }

    fn enter_first_question(&mut self) -> SessionEvent {
        self.phase = SessionPhase::InProgress;
        self.index = 0;
        self.score = 0;
        SessionEvent::QuestionShown(self.show_current())
    }

    fn next_question(&mut self) -> SessionEvent {
        if self.index + 1 < self.questions.len() {
            self.index += 1;
            return SessionEvent::QuestionShown(self.show_current());
        }

        self.phase = SessionPhase::Finished;
        self.tick_epoch += 1;
        SessionEvent::Finished(self.final_outcome())
    }

    fn show_current(&mut self) -> QuestionView {
        self.selected = None;
        self.answered_correctly = None;
        self.remaining_secs = QUESTION_TIME_SECS;
        self.tick_epoch += 1;

        let view = QuestionView {
            question: shuffle_options(&self.questions[self.index], &mut self.rng),
            index: self.index,
            total: self.questions.len(),
        };
        self.current = Some(view.clone());
        view
    }
}

/// Copy of `question` with its options in a uniformly random order. The
/// canonical answer text is untouched.
pub fn shuffle_options<R: rand::Rng + ?Sized>(question: &Question, rng: &mut R) -> Question {
    let mut shuffled = question.clone();
    shuffled.options.shuffle(rng);
    shuffled
}
