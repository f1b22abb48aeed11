use crate::corpus::LoadError;
use crate::engine::pool::Progress;
use crate::session::deck::{Deck, DeckState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

/// Everything the question screen needs to render one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeckView {
    pub question: String,
    pub progress: Progress,
    pub status: Option<Status>,
    pub next_enabled: bool,
}

impl DeckView {
    pub fn loading() -> Self {
        Self {
            question: "Loading questions...".to_string(),
            progress: Progress::default(),
            status: None,
            next_enabled: false,
        }
    }

    pub fn load_failed(err: &LoadError) -> Self {
        Self {
            question: "Failed to load questions.".to_string(),
            progress: Progress::default(),
            status: Some(Status {
                kind: StatusKind::Error,
                message: format!("Check the question source ({err})."),
            }),
            next_enabled: false,
        }
    }

    pub fn from_deck(deck: &Deck) -> Self {
        let progress = deck.progress();
        match deck.state() {
            DeckState::Ready => Self {
                question: String::new(),
                progress,
                status: None,
                next_enabled: true,
            },
            DeckState::Presented { text } => Self {
                question: text.clone(),
                progress,
                status: None,
                next_enabled: true,
            },
            DeckState::EmptyPool => Self {
                question: "No questions match the current selection.".to_string(),
                progress,
                status: Some(Status {
                    kind: StatusKind::Info,
                    message: "Go back and pick different tags.".to_string(),
                }),
                next_enabled: false,
            },
            DeckState::PoolExhausted => Self {
                question: "Every selected question has been shown!".to_string(),
                progress,
                status: Some(Status {
                    kind: StatusKind::Success,
                    message: "Go back to change the selection or start a new round.".to_string(),
                }),
                next_enabled: false,
            },
        }
    }

    pub fn progress_label(&self) -> String {
        format!("{}/{}", self.progress.shown, self.progress.total)
    }
}
