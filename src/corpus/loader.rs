use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::corpus::error::LoadError;
use crate::corpus::provider::CorpusProvider;
use crate::corpus::question::{Question, parse_questions};

const FALLBACK_QUESTIONS: &str = include_str!("../../assets/fallback_questions.json");

/// What to do when the provider cannot deliver a usable document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Substitute the embedded fallback questions.
    #[default]
    Resilient,
    /// Surface the failure to the caller.
    Strict,
}

impl LoadPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadPolicy::Resilient => "resilient",
            LoadPolicy::Strict => "strict",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorpusOrigin {
    Provider(String),
    Fallback,
}

#[derive(Clone, Debug)]
pub struct Corpus {
    pub questions: Vec<Question>,
    pub origin: CorpusOrigin,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == CorpusOrigin::Fallback
    }
}

pub fn fallback_corpus() -> Corpus {
    let questions = parse_questions(FALLBACK_QUESTIONS)
        .map(|parsed| parsed.questions)
        .unwrap_or_default();
    Corpus {
        questions,
        origin: CorpusOrigin::Fallback,
    }
}

pub struct CorpusLoader<P> {
    provider: P,
    policy: LoadPolicy,
}

impl<P: CorpusProvider> CorpusLoader<P> {
    pub fn new(provider: P, policy: LoadPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn load(&self) -> Result<Corpus, LoadError> {
        let source = self.provider.describe();
        match self.try_load() {
            Ok(corpus) => {
                info!(source = %source, count = corpus.len(), "question corpus loaded");
                Ok(corpus)
            }
            Err(err) => match self.policy {
                LoadPolicy::Resilient => {
                    let corpus = fallback_corpus();
                    warn!(
                        source = %source,
                        error = %err,
                        count = corpus.len(),
                        "failed to load question corpus, using fallback questions"
                    );
                    Ok(corpus)
                }
                LoadPolicy::Strict => {
                    warn!(source = %source, error = %err, "failed to load question corpus");
                    Err(err)
                }
            },
        }
    }

    fn try_load(&self) -> Result<Corpus, LoadError> {
        let raw = self.provider.fetch()?;
        let parsed = parse_questions(&raw)?;
        if parsed.skipped > 0 {
            warn!(skipped = parsed.skipped, "skipped question records without text");
        }
        if parsed.merged > 0 {
            warn!(merged = parsed.merged, "merged question records with duplicate text");
        }
        Ok(Corpus {
            questions: parsed.questions,
            origin: CorpusOrigin::Provider(self.provider.describe()),
        })
    }
}
