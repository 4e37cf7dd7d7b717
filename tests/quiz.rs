use std::sync::Arc;

use pretty_assertions::assert_eq;
use sagewalk::constants::quiz::{MAX_ATTEMPTS, SERVICE_ERROR};
use sagewalk::quiz::{QuizOutcome, QuizSession, QuizStage, Verdict};
use sagewalk::services::{MemoryStore, TextGenerator};
use speculoos::prelude::*;

mod common;

fn started(reward: u32) -> QuizSession {
    let mut quiz = QuizSession::default();
    let store = MemoryStore::with_sample_questions();
    assert_that(&quiz.start(reward, &store, &mut common::rng(31))).is_true();
    quiz
}

fn type_answer(quiz: &mut QuizSession, answer: &str) {
    for character in answer.chars() {
        quiz.type_char(character);
    }
}

/// Submits `answer` and waits for the verdict.
fn answer(quiz: &mut QuizSession, text: &Arc<dyn TextGenerator>, answer: &str) -> Option<QuizOutcome> {
    type_answer(quiz, answer);
    assert_that(&quiz.submit(text)).is_true();
    assert_eq!(quiz.stage(), Some(&QuizStage::Evaluating));

    let mut outcome = None;
    let decided = common::wait_until(|| {
        outcome = quiz.poll();
        matches!(quiz.stage(), Some(QuizStage::Result { .. }))
    });
    assert_that(&decided).is_true();
    outcome
}

fn verdict(quiz: &QuizSession) -> Option<Verdict> {
    match quiz.stage() {
        Some(QuizStage::Result { verdict, .. }) => Some(*verdict),
        _ => None,
    }
}

#[test]
fn test_missing_question_keeps_the_quiz_closed() {
    let mut quiz = QuizSession::default();
    let empty = MemoryStore::default();

    assert_that(&quiz.start(1, &empty, &mut common::rng(30))).is_false();
    assert_that(&quiz.is_active()).is_false();
}

#[test]
fn test_correct_answer_passes() {
    let text = common::canned(&["CORRECT - well reasoned."]);
    let mut quiz = started(1);
    assert_that(&quiz.question().is_some()).is_true();

    let outcome = answer(&mut quiz, &text, "Knowing the limits of knowledge");

    assert_eq!(outcome, Some(QuizOutcome::Passed { reward: 1 }));
    assert_eq!(verdict(&quiz), Some(Verdict::Correct));
    quiz.confirm();
    assert_that(&quiz.is_active()).is_false();
}

#[test]
fn test_three_wrong_answers_fail() {
    let text = common::canned(&["INCORRECT. Think about Socrates."]);
    let mut quiz = started(1);

    for attempt in 1..MAX_ATTEMPTS {
        assert_that(&answer(&mut quiz, &text, "a guess")).is_none();
        assert_eq!(verdict(&quiz), Some(Verdict::Retry));
        assert_eq!(quiz.attempts(), attempt);
        quiz.confirm();
        assert_eq!(quiz.answer(), Some(""));
    }

    assert_eq!(answer(&mut quiz, &text, "last guess"), Some(QuizOutcome::Failed));
    assert_eq!(verdict(&quiz), Some(Verdict::Failed));
    quiz.confirm();
    assert_that(&quiz.is_active()).is_false();
}

#[test]
fn test_service_error_does_not_use_an_attempt() {
    let failing: Arc<dyn TextGenerator> = Arc::new(common::FailingText);
    let mut quiz = started(1);

    assert_that(&answer(&mut quiz, &failing, "anything")).is_none();

    assert_eq!(quiz.attempts(), 0);
    match quiz.stage() {
        Some(QuizStage::Result { verdict, text }) => {
            assert_eq!(*verdict, Verdict::Error);
            assert_eq!(text, SERVICE_ERROR);
        }
        other => panic!("expected a result, got {other:?}"),
    }
    quiz.confirm();
    assert_eq!(quiz.stage(), Some(&QuizStage::Answering));
}

#[test]
fn test_answer_is_capped_and_blank_answers_ignored() {
    let text = common::canned(&["CORRECT"]);
    let mut quiz = started(1);

    type_answer(&mut quiz, "   ");
    assert_that(&quiz.submit(&text)).is_false();
    for _ in 0..3 {
        quiz.backspace();
    }

    type_answer(&mut quiz, &"x".repeat(600));
    assert_eq!(quiz.answer().map(|answer| answer.chars().count()), Some(450));
}

#[test]
fn test_closing_discards_the_pending_evaluation() {
    let text = common::canned(&["CORRECT"]);
    let mut quiz = started(2);
    type_answer(&mut quiz, "an answer");
    quiz.submit(&text);

    quiz.close();

    assert_that(&quiz.is_active()).is_false();
    assert_that(&quiz.poll()).is_none();
}
