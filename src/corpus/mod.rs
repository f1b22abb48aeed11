pub mod error;
pub mod loader;
pub mod provider;
pub mod question;

pub use error::LoadError;
pub use loader::{Corpus, CorpusLoader, CorpusOrigin, LoadPolicy, fallback_corpus};
pub use provider::{CorpusProvider, FileProvider, HttpProvider, provider_for};
pub use question::Question;
