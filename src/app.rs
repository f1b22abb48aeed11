use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use clap::ValueEnum;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, warn};

use topicdeck::config::Config;
use topicdeck::corpus::{Corpus, CorpusLoader, CorpusOrigin, LoadError, Question, provider_for};
use topicdeck::engine::build_tag_index;
use topicdeck::session::{Deck, DeckView, TagPicker};
use topicdeck::store::{SelectionStore, SessionStorage};

use crate::event::AppEvent;
use crate::ui::theme::Theme;

/// Screen to open at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AppScreen {
    /// Pick the topics to draw from
    Tags,
    /// Draw questions for the saved selection
    Questions,
}

pub enum CorpusStatus {
    Loading,
    Ready {
        questions: Arc<[Question]>,
        origin: CorpusOrigin,
    },
    Failed(LoadError),
}

pub struct App<S> {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub store: SelectionStore<S>,
    pub corpus: CorpusStatus,
    pub picker: Option<TagPicker>,
    pub deck: Option<Deck>,
    pub should_quit: bool,
    /// Set when the last selection could not be persisted.
    pub save_error: Option<String>,
    generation: u64,
    events: Sender<AppEvent>,
    rng: SmallRng,
}

impl<S: SessionStorage> App<S> {
    pub fn new(
        config: Config,
        theme: &'static Theme,
        store: SelectionStore<S>,
        events: Sender<AppEvent>,
    ) -> Self {
        Self {
            screen: AppScreen::Tags,
            config,
            theme,
            store,
            corpus: CorpusStatus::Loading,
            picker: None,
            deck: None,
            should_quit: false,
            save_error: None,
            generation: 0,
            events,
            rng: SmallRng::from_entropy(),
        }
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Switch screens. A loaded corpus is reused; a missing or failed one is
    /// fetched again in the background.
    pub fn enter(&mut self, screen: AppScreen) {
        self.screen = screen;
        self.save_error = None;
        self.picker = None;
        self.deck = None;
        match self.corpus {
            CorpusStatus::Ready { .. } => self.prepare_screen(),
            CorpusStatus::Loading | CorpusStatus::Failed(_) => self.request_corpus(),
        }
    }

    fn request_corpus(&mut self) {
        self.generation += 1;
        self.corpus = CorpusStatus::Loading;

        let generation = self.generation;
        let tx = self.events.clone();
        let source = self.config.corpus.clone();
        let timeout = self.config.fetch_timeout();
        let policy = self.config.load_policy;
        thread::spawn(move || {
            let loader = CorpusLoader::new(provider_for(&source, timeout), policy);
            let result = loader.load();
            let _ = tx.send(AppEvent::CorpusLoaded { generation, result });
        });
    }

    pub fn on_corpus_loaded(&mut self, generation: u64, result: Result<Corpus, LoadError>) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale corpus load");
            return;
        }
        match result {
            Ok(corpus) => {
                self.corpus = CorpusStatus::Ready {
                    questions: corpus.questions.into(),
                    origin: corpus.origin,
                };
                self.prepare_screen();
            }
            Err(err) => self.corpus = CorpusStatus::Failed(err),
        }
    }

    fn prepare_screen(&mut self) {
        let CorpusStatus::Ready { ref questions, .. } = self.corpus else {
            return;
        };
        let questions = Arc::clone(questions);
        match self.screen {
            AppScreen::Tags => {
                let universe = build_tag_index(&questions);
                let saved = self.store.load_selection();
                self.picker = Some(TagPicker::new(universe, saved.as_ref()));
            }
            AppScreen::Questions => {
                let mut deck = Deck::resume(questions, &self.store);
                deck.next(&mut self.store, &mut self.rng);
                self.deck = Some(deck);
            }
        }
    }

    /// Save the picked tags, which starts a new epoch, and open the question screen.
    ///
    /// If the save fails the picker stays open with an error; drawing from the
    /// previously stored selection would show questions the user deselected.
    pub fn confirm_selection(&mut self) {
        let Some(ref picker) = self.picker else {
            return;
        };
        let tags = picker.confirmed();
        match self.store.save_selection(&tags) {
            Ok(()) => self.enter(AppScreen::Questions),
            Err(e) => {
                warn!(error = %e, "failed to save tag selection");
                self.save_error = Some(format!("Could not save the selection: {e}"));
            }
        }
    }

    pub fn next_question(&mut self) {
        if let Some(ref mut deck) = self.deck {
            deck.next(&mut self.store, &mut self.rng);
        }
    }

    pub fn go_back(&mut self) {
        self.enter(AppScreen::Tags);
    }

    pub fn deck_view(&self) -> DeckView {
        match (&self.corpus, &self.deck) {
            (CorpusStatus::Failed(err), _) => DeckView::load_failed(err),
            (CorpusStatus::Ready { .. }, Some(deck)) => DeckView::from_deck(deck),
            _ => DeckView::loading(),
        }
    }

    pub fn source_label(&self) -> String {
        match &self.corpus {
            CorpusStatus::Loading => "loading".to_string(),
            CorpusStatus::Failed(_) => "unavailable".to_string(),
            CorpusStatus::Ready {
                origin: CorpusOrigin::Fallback,
                ..
            } => "built-in questions".to_string(),
            CorpusStatus::Ready {
                origin: CorpusOrigin::Provider(source),
                ..
            } => source.clone(),
        }
    }
}
