//! Merging of answer distribution rows split by problem randomization.
//!
//! A randomized problem stores one row per (answer, variant) pair, so the same
//! answer to the same part shows up several times with different seeds. The
//! functions here fold those copies back into one row per answer.

use crate::models::problems::{AnswerDistribution, ConsolidatedAnswer};

/// Consolidates the rows of a single problem part.
///
/// The first row of each group of matching rows is kept in place and absorbs
/// every later match; the absorbed rows are dropped. Surviving rows keep their
/// relative input order. The input is consumed.
pub fn consolidate_answers(answers: Vec<AnswerDistribution>) -> Vec<ConsolidatedAnswer> {
    let mut consolidated: Vec<ConsolidatedAnswer> = Vec::with_capacity(answers.len());

    for answer in answers {
        match consolidated
            .iter_mut()
            .find(|anchor| anchor.answer.matches(&answer))
        {
            Some(anchor) => anchor.absorb(answer),
            None => consolidated.push(ConsolidatedAnswer::new(answer)),
        }
    }

    consolidated
}

/// Consolidates every part of one problem.
///
/// Rows must arrive ordered by `part_id`; each contiguous run of one part is
/// consolidated on its own and the results are concatenated.
pub fn consolidate_problem(answers: Vec<AnswerDistribution>) -> Vec<ConsolidatedAnswer> {
    let mut result = Vec::with_capacity(answers.len());
    let mut part: Vec<AnswerDistribution> = Vec::new();

    for answer in answers {
        if part.last().is_some_and(|last| last.part_id != answer.part_id) {
            result.extend(consolidate_answers(std::mem::take(&mut part)));
        }
        part.push(answer);
    }
    result.extend(consolidate_answers(part));

    result
}
