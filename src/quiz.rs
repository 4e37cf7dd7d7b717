//! Philosophy quizzes started by picking up a collectible.
//!
//! The question comes from the document store; the answer is judged by the
//! text service, whose reply must begin with `CORRECT` for a pass.

use std::sync::Arc;

use bevy_ecs::resource::Resource;
use rand::seq::IndexedRandom;
use rand::RngCore;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::constants::quiz;
use crate::interaction::TextFetch;
use crate::services::{Persistence, TextGenerator};

const MAX_ANSWER_CHARS: usize = 450;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Question {
    #[serde(rename = "question_text")]
    pub text: String,
    #[serde(rename = "answer_keywords", default)]
    pub keywords: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    /// Wrong, with attempts left.
    Retry,
    /// Wrong on the final attempt.
    Failed,
    /// The text service could not evaluate; the attempt is not counted.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizStage {
    Answering,
    Evaluating,
    Result { verdict: Verdict, text: String },
}

/// A finished quiz, reported once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizOutcome {
    Passed { reward: u32 },
    Failed,
}

#[derive(Debug)]
struct ActiveQuiz {
    question: Question,
    answer: String,
    attempts: u32,
    reward: u32,
    stage: QuizStage,
    fetch: TextFetch,
}

#[derive(Resource, Debug, Default)]
pub struct QuizSession {
    active: Option<ActiveQuiz>,
}

fn evaluation_prompt(question: &Question, answer: &str) -> String {
    format!(
        "Evaluate if the player's answer is correct for the given question.\n\
         Question: '{}'\n\
         Expected concepts: '{}'\n\
         Player's answer: '{}'\n\
         Respond with 'CORRECT' if the answer is sufficiently accurate, otherwise 'INCORRECT', \
         followed by a brief reason or a hint.",
        question.text, question.keywords, answer
    )
}

impl QuizSession {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn question(&self) -> Option<&Question> {
        self.active.as_ref().map(|quiz| &quiz.question)
    }

    pub fn answer(&self) -> Option<&str> {
        self.active.as_ref().map(|quiz| quiz.answer.as_str())
    }

    pub fn attempts(&self) -> u32 {
        self.active.as_ref().map_or(0, |quiz| quiz.attempts)
    }

    pub fn stage(&self) -> Option<&QuizStage> {
        self.active.as_ref().map(|quiz| &quiz.stage)
    }

    /// Loads a random question and opens the quiz. Returns `false` if no question could be read.
    pub fn start(&mut self, reward: u32, store: &dyn Persistence, rng: &mut dyn RngCore) -> bool {
        let Some(id) = quiz::QUESTION_IDS.choose(rng) else {
            return false;
        };
        let document = match store.read(quiz::QUESTION_COLLECTION, id) {
            Ok(Some(document)) => document,
            Ok(None) => {
                warn!(id, "Quiz question not found");
                return false;
            }
            Err(error) => {
                warn!(id, %error, "Failed to read quiz question");
                return false;
            }
        };
        let question: Question = match serde_json::from_value(document) {
            Ok(question) => question,
            Err(error) => {
                warn!(id, %error, "Malformed quiz question");
                return false;
            }
        };

        info!(id, "Quiz started");
        self.active = Some(ActiveQuiz {
            question,
            answer: String::new(),
            attempts: 0,
            reward,
            stage: QuizStage::Answering,
            fetch: TextFetch::new(),
        });
        true
    }

    pub fn type_char(&mut self, character: char) {
        if let Some(quiz) = self.active.as_mut() {
            if quiz.stage == QuizStage::Answering && !character.is_control() && quiz.answer.chars().count() < MAX_ANSWER_CHARS {
                quiz.answer.push(character);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(quiz) = self.active.as_mut() {
            if quiz.stage == QuizStage::Answering {
                quiz.answer.pop();
            }
        }
    }

    /// Sends the typed answer for evaluation. Blank answers are ignored.
    pub fn submit(&mut self, text: &Arc<dyn TextGenerator>) -> bool {
        let Some(quiz) = self.active.as_mut() else {
            return false;
        };
        if quiz.stage != QuizStage::Answering || quiz.answer.trim().is_empty() {
            return false;
        }
        if !quiz.fetch.request(text, evaluation_prompt(&quiz.question, &quiz.answer)) {
            return false;
        }
        quiz.attempts += 1;
        quiz.stage = QuizStage::Evaluating;
        debug!(attempt = quiz.attempts, "Quiz answer submitted");
        true
    }

    /// Picks up a finished evaluation. Returns the outcome when the quiz is decided.
    pub fn poll(&mut self) -> Option<QuizOutcome> {
        let quiz = self.active.as_mut()?;
        let result = quiz.fetch.poll()?;

        let (verdict, text, outcome) = match result {
            Ok(reply) if reply.trim().to_uppercase().starts_with("CORRECT") => (
                Verdict::Correct,
                format!("Correct! +{} point(s)\n\n{}", quiz.reward, reply.trim()),
                Some(QuizOutcome::Passed { reward: quiz.reward }),
            ),
            Ok(reply) if quiz.attempts >= quiz::MAX_ATTEMPTS => (
                Verdict::Failed,
                format!("Maximum attempts reached. No points awarded.\n\n{}", reply.trim()),
                Some(QuizOutcome::Failed),
            ),
            Ok(reply) => (
                Verdict::Retry,
                format!(
                    "Incorrect. {} attempt(s) remaining.\n\n{}\n\nTry again!",
                    quiz::MAX_ATTEMPTS - quiz.attempts,
                    reply.trim()
                ),
                None,
            ),
            Err(error) => {
                warn!(%error, "Quiz evaluation failed");
                quiz.attempts = quiz.attempts.saturating_sub(1);
                (Verdict::Error, quiz::SERVICE_ERROR.to_string(), None)
            }
        };

        quiz.stage = QuizStage::Result { verdict, text };
        if let Some(outcome) = outcome {
            info!(?outcome, "Quiz decided");
        }
        outcome
    }

    /// Enter on the result: closes a decided quiz, otherwise clears the answer for another try.
    pub fn confirm(&mut self) {
        let Some(quiz) = self.active.as_mut() else {
            return;
        };
        let verdict = match &quiz.stage {
            QuizStage::Result { verdict, .. } => *verdict,
            _ => return,
        };
        match verdict {
            Verdict::Correct | Verdict::Failed => self.close(),
            Verdict::Retry | Verdict::Error => {
                quiz.answer.clear();
                quiz.stage = QuizStage::Answering;
            }
        }
    }

    /// Closes the quiz without a result. An evaluation still in flight is discarded.
    pub fn close(&mut self) {
        if self.active.take().is_some() {
            debug!("Quiz closed");
        }
    }
}
