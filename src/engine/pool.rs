use std::collections::{BTreeSet, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::corpus::Question;
use crate::engine::tag_index::tag_universe;

/// Result of asking the pool for another question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Draw<'a> {
    Question(&'a Question),
    /// No question matches the active selection at all.
    EmptyPool,
    /// Every matching question has already been shown this epoch.
    PoolExhausted,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub shown: usize,
    pub total: usize,
}

impl Progress {
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.shown as f64 / self.total as f64
    }
}

/// Indices of the questions sharing at least one tag with the selection.
///
/// An absent or empty selection means the whole tag universe. Questions
/// without tags never match.
pub fn pool_indices(questions: &[Question], selected: Option<&BTreeSet<String>>) -> Vec<usize> {
    let universe;
    let effective = match selected {
        Some(tags) if !tags.is_empty() => tags,
        _ => {
            universe = tag_universe(questions);
            &universe
        }
    };

    questions
        .iter()
        .enumerate()
        .filter(|(_, q)| q.tags.iter().any(|t| effective.contains(t)))
        .map(|(i, _)| i)
        .collect()
}

pub fn compute_pool<'a>(
    questions: &'a [Question],
    selected: Option<&BTreeSet<String>>,
) -> Vec<&'a Question> {
    pool_indices(questions, selected)
        .into_iter()
        .map(|i| &questions[i])
        .collect()
}

/// Pick a not-yet-shown pool member uniformly at random.
///
/// Does not record the pick; the caller appends its text to the shown list
/// before drawing again.
pub fn draw<'a, R: Rng + ?Sized>(pool: &[&'a Question], shown: &[String], rng: &mut R) -> Draw<'a> {
    if pool.is_empty() {
        return Draw::EmptyPool;
    }
    let shown: HashSet<&str> = shown.iter().map(String::as_str).collect();
    let remaining: Vec<&'a Question> = pool
        .iter()
        .copied()
        .filter(|q| !shown.contains(q.text.as_str()))
        .collect();

    match remaining.choose(rng).copied() {
        Some(q) => Draw::Question(q),
        None => Draw::PoolExhausted,
    }
}

/// Shown questions that belong to the current pool, against the pool size.
pub fn progress(pool: &[&Question], shown: &[String]) -> Progress {
    let shown: HashSet<&str> = shown.iter().map(String::as_str).collect();
    Progress {
        shown: pool
            .iter()
            .filter(|q| shown.contains(q.text.as_str()))
            .count(),
        total: pool.len(),
    }
}
