use std::collections::BTreeSet;
use std::io::{self, Write};

use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use topicdeck::config::Config;
use topicdeck::corpus::{Corpus, CorpusLoader, CorpusOrigin, provider_for};
use topicdeck::engine::build_tag_index;
use topicdeck::session::{Deck, DeckState, DeckView, TagPicker};
use topicdeck::store::{SelectionStore, SessionStorage};

use crate::Command;

pub fn run<S: SessionStorage>(
    command: Command,
    config: &Config,
    store: &mut SelectionStore<S>,
) -> Result<()> {
    let mut rng = SmallRng::from_entropy();
    let mut out = io::stdout().lock();
    execute(command, config, store, &mut rng, &mut out)
}

fn execute<S: SessionStorage, R: Rng + ?Sized, W: Write>(
    command: Command,
    config: &Config,
    store: &mut SelectionStore<S>,
    rng: &mut R,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Tags => print_tags(config, store, out),
        Command::Select { tags } => select(config, store, tags, out),
        Command::Next => next(config, store, rng, out),
        Command::Status => status(config, store, out),
        Command::Reset => {
            store.clear()?;
            writeln!(out, "Session cleared.")?;
            Ok(())
        }
        Command::Config { write } => show_config(config, write, out),
    }
}

fn load_corpus(config: &Config) -> Result<Corpus> {
    CorpusLoader::new(
        provider_for(&config.corpus, config.fetch_timeout()),
        config.load_policy,
    )
    .load()
    .with_context(|| format!("failed to load questions from {}", config.corpus))
}

fn origin_label(corpus: &Corpus) -> &str {
    match &corpus.origin {
        CorpusOrigin::Provider(source) => source,
        CorpusOrigin::Fallback => "built-in questions",
    }
}

fn print_tags<S: SessionStorage, W: Write>(
    config: &Config,
    store: &SelectionStore<S>,
    out: &mut W,
) -> Result<()> {
    let corpus = load_corpus(config)?;
    let picker = TagPicker::new(
        build_tag_index(&corpus.questions),
        store.load_selection().as_ref(),
    );
    if picker.is_empty() {
        writeln!(out, "No tags found. Check the question source.")?;
        return Ok(());
    }
    for tag in &picker.universe {
        let mark = if picker.is_selected(tag) { "x" } else { " " };
        writeln!(out, "[{mark}] {tag}")?;
    }
    writeln!(out, "Selected: {}", picker.badge())?;
    Ok(())
}

fn select<S: SessionStorage, W: Write>(
    config: &Config,
    store: &mut SelectionStore<S>,
    tags: Vec<String>,
    out: &mut W,
) -> Result<()> {
    let corpus = load_corpus(config)?;
    let universe = build_tag_index(&corpus.questions);
    for tag in tags.iter().filter(|t| !universe.contains(t)) {
        warn!(tag = %tag, "tag does not occur in the corpus");
    }

    let selection: BTreeSet<String> = if tags.is_empty() {
        universe.into_iter().collect()
    } else {
        tags.into_iter().collect()
    };
    store.save_selection(&selection)?;
    writeln!(
        out,
        "Selected {} tag(s). Shown questions were reset.",
        selection.len()
    )?;
    Ok(())
}

fn next<S: SessionStorage, R: Rng + ?Sized, W: Write>(
    config: &Config,
    store: &mut SelectionStore<S>,
    rng: &mut R,
    out: &mut W,
) -> Result<()> {
    let corpus = load_corpus(config)?;
    let mut deck = Deck::resume(corpus.questions.into(), store);
    deck.next(store, rng);

    let view = DeckView::from_deck(&deck);
    writeln!(out, "{}", view.question)?;
    if let Some(status) = &view.status {
        writeln!(out, "{}", status.message)?;
    }
    if *deck.state() != DeckState::EmptyPool {
        writeln!(out, "({})", view.progress_label())?;
    }
    Ok(())
}

fn status<S: SessionStorage, W: Write>(
    config: &Config,
    store: &SelectionStore<S>,
    out: &mut W,
) -> Result<()> {
    let corpus = load_corpus(config)?;
    let source = origin_label(&corpus).to_string();
    let selection = store.load_selection();
    let selection_label = match &selection {
        Some(tags) if !tags.is_empty() => tags.iter().cloned().collect::<Vec<_>>().join(", "),
        _ => "all tags".to_string(),
    };
    let deck = Deck::resume(corpus.questions.into(), store);
    let progress = deck.progress();

    writeln!(out, "Source:    {source} ({})", config.load_policy.as_str())?;
    writeln!(out, "Selection: {selection_label}")?;
    writeln!(out, "Progress:  {}/{}", progress.shown, progress.total)?;
    Ok(())
}

fn show_config<W: Write>(config: &Config, write: bool, out: &mut W) -> Result<()> {
    let path = Config::config_path();
    if write {
        config.save()?;
        writeln!(out, "Wrote {}", path.display())?;
    } else {
        writeln!(out, "# {}", path.display())?;
    }
    write!(out, "{}", toml::to_string_pretty(config)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use topicdeck::corpus::LoadPolicy;
    use topicdeck::store::MemoryStorage;

    const QUESTIONS: &str = r#"[
        {"text": "q1", "tags": ["X"]},
        {"text": "q2", "tags": ["Y"]},
        {"text": "q3", "tags": ["X", "Y"]}
    ]"#;

    struct Fixture {
        _dir: TempDir,
        config: Config,
        store: SelectionStore<MemoryStorage>,
        rng: SmallRng,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("questions.json");
            fs::write(&path, QUESTIONS).unwrap();
            let config = Config {
                corpus: path.to_string_lossy().to_string(),
                load_policy: LoadPolicy::Strict,
                ..Config::default()
            };
            Self {
                _dir: dir,
                config,
                store: SelectionStore::new(MemoryStorage::new()),
                rng: SmallRng::seed_from_u64(3),
            }
        }

        fn run(&mut self, command: Command) -> Result<String> {
            let mut out = Vec::new();
            execute(command, &self.config, &mut self.store, &mut self.rng, &mut out)?;
            Ok(String::from_utf8(out).unwrap())
        }
    }

    fn tags(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tags_marks_saved_selection() {
        let mut fx = Fixture::new();
        fx.store.save_selection(&tags(&["X"])).unwrap();

        let out = fx.run(Command::Tags).unwrap();
        assert!(out.contains("[x] X"));
        assert!(out.contains("[ ] Y"));
        assert!(out.contains("Selected: 1/2"));
    }

    #[test]
    fn test_tags_without_selection_checks_everything() {
        let mut fx = Fixture::new();
        let out = fx.run(Command::Tags).unwrap();
        assert!(out.contains("[x] X"));
        assert!(out.contains("[x] Y"));
        assert!(out.contains("Selected: All"));
    }

    #[test]
    fn test_select_resets_shown() {
        let mut fx = Fixture::new();
        fx.store.save_selection(&tags(&["X"])).unwrap();
        fx.store.append_shown("q1").unwrap();

        let out = fx
            .run(Command::Select {
                tags: vec!["Y".to_string()],
            })
            .unwrap();
        assert!(out.contains("Selected 1 tag(s)"));
        assert_eq!(fx.store.load_selection(), Some(tags(&["Y"])));
        assert!(fx.store.load_shown().is_empty());
    }

    #[test]
    fn test_select_without_tags_saves_universe() {
        let mut fx = Fixture::new();
        fx.run(Command::Select { tags: Vec::new() }).unwrap();
        assert_eq!(fx.store.load_selection(), Some(tags(&["X", "Y"])));
    }

    #[test]
    fn test_next_reports_progress_through_exhaustion() {
        let mut fx = Fixture::new();
        fx.store.save_selection(&tags(&["X"])).unwrap();

        let first = fx.run(Command::Next).unwrap();
        assert!(first.contains("(1/2)"));
        let second = fx.run(Command::Next).unwrap();
        assert!(second.contains("(2/2)"));
        assert_ne!(first.lines().next(), second.lines().next());

        let done = fx.run(Command::Next).unwrap();
        assert!(done.contains("Every selected question has been shown!"));
        assert!(done.contains("(2/2)"));
        assert_eq!(fx.store.load_shown().len(), 2);
    }

    #[test]
    fn test_next_with_no_matches_omits_progress() {
        let mut fx = Fixture::new();
        fx.store.save_selection(&tags(&["Z"])).unwrap();

        let out = fx.run(Command::Next).unwrap();
        assert!(out.contains("No questions match the current selection."));
        assert!(!out.contains("(0/0)"));
        assert!(fx.store.load_shown().is_empty());
    }

    #[test]
    fn test_status_reports_selection_and_progress() {
        let mut fx = Fixture::new();
        fx.store.save_selection(&tags(&["Y"])).unwrap();
        fx.run(Command::Next).unwrap();

        let out = fx.run(Command::Status).unwrap();
        assert!(out.contains("(strict)"));
        assert!(out.contains("Selection: Y"));
        assert!(out.contains("Progress:  1/2"));
    }

    #[test]
    fn test_reset_clears_session() {
        let mut fx = Fixture::new();
        fx.store.save_selection(&tags(&["X"])).unwrap();
        fx.store.append_shown("q1").unwrap();

        let out = fx.run(Command::Reset).unwrap();
        assert!(out.contains("Session cleared."));
        assert_eq!(fx.store.load_selection(), None);
        assert!(fx.store.load_shown().is_empty());
    }

    #[test]
    fn test_strict_missing_source_fails_with_context() {
        let mut fx = Fixture::new();
        fx.config.corpus = fx._dir.path().join("gone.json").to_string_lossy().to_string();

        let err = fx.run(Command::Next).unwrap_err();
        assert!(err.to_string().contains("failed to load questions"));
        assert!(fx.store.load_shown().is_empty());
    }
}
