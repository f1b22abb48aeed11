use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, warn};

use crate::corpus::Question;
use crate::engine::pool::{self, Draw, Progress};
use crate::store::json_store::SessionStorage;
use crate::store::selection::SelectionStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeckState {
    Ready,
    Presented { text: String },
    EmptyPool,
    PoolExhausted,
}

impl DeckState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeckState::EmptyPool | DeckState::PoolExhausted)
    }
}

/// One tag-selection epoch: the filtered pool plus what has been shown.
pub struct Deck {
    questions: Arc<[Question]>,
    pool: Vec<usize>,
    shown: Vec<String>,
    state: DeckState,
}

impl Deck {
    pub fn new(
        questions: Arc<[Question]>,
        selected: Option<&BTreeSet<String>>,
        shown: Vec<String>,
    ) -> Self {
        let pool = pool::pool_indices(&questions, selected);
        Self {
            questions,
            pool,
            shown,
            state: DeckState::Ready,
        }
    }

    /// Build a deck from whatever the session store currently holds.
    pub fn resume<S: SessionStorage>(questions: Arc<[Question]>, store: &SelectionStore<S>) -> Self {
        let selected = store.load_selection();
        Self::new(questions, selected.as_ref(), store.load_shown())
    }

    pub fn state(&self) -> &DeckState {
        &self.state
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn progress(&self) -> Progress {
        pool::progress(&self.pool_refs(), &self.shown)
    }

    pub fn can_advance(&self) -> bool {
        !self.state.is_terminal()
    }

    /// Draw the next question and record it in the store right away.
    ///
    /// Once the deck reaches a terminal state it stays there; a new epoch
    /// needs a new selection.
    pub fn next<S: SessionStorage, R: Rng + ?Sized>(
        &mut self,
        store: &mut SelectionStore<S>,
        rng: &mut R,
    ) -> &DeckState {
        if self.state.is_terminal() {
            return &self.state;
        }

        let drawn = {
            let pool = self.pool_refs();
            match pool::draw(&pool, &self.shown, rng) {
                Draw::Question(q) => Ok(q.text.clone()),
                Draw::EmptyPool => Err(DeckState::EmptyPool),
                Draw::PoolExhausted => Err(DeckState::PoolExhausted),
            }
        };

        match drawn {
            Ok(text) => {
                if let Err(e) = store.append_shown(&text) {
                    warn!(error = %e, "failed to persist shown question");
                }
                self.shown.push(text.clone());
                let progress = self.progress();
                debug!(shown = progress.shown, total = progress.total, "question drawn");
                self.state = DeckState::Presented { text };
            }
            Err(terminal) => self.state = terminal,
        }
        &self.state
    }

    fn pool_refs(&self) -> Vec<&Question> {
        self.pool.iter().map(|&i| &self.questions[i]).collect()
    }
}
