//! Quiz round state machine.
//!
//! Tracks the position inside a round, the current question and the number
//! of correct answers, and decides when a round is over.

use crate::model::{Question, QuizImage, QuizStep};

/// Number of questions in a round unless configured otherwise.
pub const DEFAULT_QUESTIONS_AMOUNT: usize = 10;

/// Where the round currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    /// Waiting for the supplier to deliver a question.
    AwaitingQuestion,
    /// A question is on screen and accepts an answer.
    QuestionShown,
    /// The answer is being shown; waiting for the advance.
    AnswerShown,
    /// All questions answered; waiting for a restart.
    RoundComplete,
}

/// Result of submitting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
}

/// What happens after an answer has been shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Move on to the next question.
    Continue,
    /// The last question was answered.
    RoundComplete { correct: u32, total: u32 },
}

/// The quiz round state machine.
#[derive(Debug)]
pub struct QuizEngine {
    questions_amount: usize,
    current_question_index: usize,
    correct_answers: u32,
    current_question: Option<Question>,
    state: QuizState,
}

impl Default for QuizEngine {
    fn default() -> Self {
        Self::new(DEFAULT_QUESTIONS_AMOUNT)
    }
}

impl QuizEngine {
    /// Create an engine for rounds of `questions_amount` questions.
    /// A zero amount is treated as one.
    pub fn new(questions_amount: usize) -> Self {
        Self {
            questions_amount: questions_amount.max(1),
            current_question_index: 0,
            correct_answers: 0,
            current_question: None,
            state: QuizState::AwaitingQuestion,
        }
    }

    pub fn questions_amount(&self) -> usize {
        self.questions_amount
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn is_last_question(&self) -> bool {
        self.current_question_index == self.questions_amount - 1
    }

    /// Build the view model for `question` at the current position.
    pub fn convert(&self, question: &Question) -> QuizStep {
        QuizStep {
            image: QuizImage::from_bytes(&question.image),
            question: question.text.clone(),
            question_number: format!(
                "{}/{}",
                self.current_question_index + 1,
                self.questions_amount
            ),
        }
    }

    /// Make `question` the current one and return its view model.
    ///
    /// Returns `None` (and drops the question) unless the engine is waiting
    /// for a question.
    pub fn present(&mut self, question: Question) -> Option<QuizStep> {
        if self.state != QuizState::AwaitingQuestion {
            tracing::debug!(state = ?self.state, "ignoring question outside of AwaitingQuestion");
            return None;
        }
        let step = self.convert(&question);
        self.current_question = Some(question);
        self.state = QuizState::QuestionShown;
        Some(step)
    }

    /// Score an answer to the current question.
    ///
    /// A no-op returning `None` when there is no question to answer, which
    /// covers stray input after an answer or after the round has ended.
    pub fn submit_answer(&mut self, user_choice_yes: bool) -> Option<AnswerOutcome> {
        if self.state != QuizState::QuestionShown {
            return None;
        }
        let question = self.current_question.as_ref()?;

        let is_correct = user_choice_yes == question.correct_answer;
        if is_correct {
            self.correct_answers += 1;
        }
        self.state = QuizState::AnswerShown;
        Some(AnswerOutcome { is_correct })
    }

    /// Move past an answered question.
    ///
    /// On the last question the round completes and the index stays put;
    /// otherwise the index increments. `None` when no answer is pending.
    pub fn advance_or_finish(&mut self) -> Option<Advance> {
        if self.state != QuizState::AnswerShown {
            return None;
        }
        self.current_question = None;

        if self.is_last_question() {
            self.state = QuizState::RoundComplete;
            return Some(Advance::RoundComplete {
                correct: self.correct_answers,
                total: self.questions_amount as u32,
            });
        }

        self.current_question_index += 1;
        self.state = QuizState::AwaitingQuestion;
        Some(Advance::Continue)
    }

    /// Reset position and score. Does not request a question.
    pub fn restart(&mut self) {
        self.current_question_index = 0;
        self.correct_answers = 0;
        self.current_question = None;
        self.state = QuizState::AwaitingQuestion;
    }
}
