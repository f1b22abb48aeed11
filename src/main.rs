mod app;
mod commands;
mod event;
mod logging;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use tracing::info;

use topicdeck::config::Config;
use topicdeck::corpus::LoadPolicy;
use topicdeck::store::{JsonSessionStore, SelectionStore, SessionStorage};

use app::{App, AppScreen, CorpusStatus};
use event::{AppEvent, EventHandler};
use logging::LogTarget;
use ui::components::progress_bar::ProgressBar;
use ui::components::question_card::QuestionCard;
use ui::components::tag_list::TagList;
use ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "topicdeck", version, about = "Conversation prompts, filtered by topic")]
struct Cli {
    #[arg(long, value_enum, default_value_t = AppScreen::Tags, help = "Screen to open")]
    view: AppScreen,

    #[arg(short, long, help = "Question source: file path or http(s) URL")]
    corpus: Option<String>,

    #[arg(long, value_enum, help = "What to do when the question source fails")]
    policy: Option<PolicyArg>,

    #[arg(
        long,
        env = "TOPICDECK_SESSION",
        default_value = "default",
        help = "Session name; selection and history are kept per session"
    )]
    session: String,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, action = ArgAction::Count, help = "More log output (-v, -vv)")]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Fall back to built-in questions
    Resilient,
    /// Report the error
    Strict,
}

impl From<PolicyArg> for LoadPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Resilient => LoadPolicy::Resilient,
            PolicyArg::Strict => LoadPolicy::Strict,
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// List all tags and mark the current selection
    Tags,
    /// Save a tag selection (no tags = all) and reset shown questions
    Select { tags: Vec<String> },
    /// Draw the next question for the current selection
    Next,
    /// Show selection and progress
    Status,
    /// Forget the selection and shown questions
    Reset,
    /// Print the effective configuration
    Config {
        #[arg(long, help = "Also write it to the config file")]
        write: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(corpus) = cli.corpus {
        config.corpus = corpus;
    }
    if let Some(policy) = cli.policy {
        config.load_policy = policy.into();
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    let themes = Theme::available_themes();
    let theme_names: Vec<&str> = themes.iter().map(String::as_str).collect();
    config.validate(&theme_names);

    let storage = JsonSessionStore::open(Path::new(&config.session_dir), &cli.session)?;
    let mut store = SelectionStore::new(storage);

    match cli.command {
        Some(command) => {
            let level = logging::level_for("warn", cli.verbose);
            logging::init(LogTarget::Stderr, &level)?;
            commands::run(command, &config, &mut store)
        }
        None => {
            let level = logging::level_for(&config.log_level, cli.verbose);
            logging::init(LogTarget::File, &level)?;
            info!(session = %cli.session, view = ?cli.view, "starting");
            run_tui(config, store, cli.view)
        }
    }
}

fn run_tui<S: SessionStorage>(config: Config, store: SelectionStore<S>, view: AppScreen) -> Result<()> {
    let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
    let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, theme, store, events.sender());
    app.enter(view);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app<S: SessionStorage>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::CorpusLoaded { generation, result } => {
                app.on_corpus_loaded(generation, result)
            }
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key<S: SessionStorage>(app: &mut App<S>, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Tags => handle_tags_key(app, key),
        AppScreen::Questions => handle_questions_key(app, key),
    }
}

fn handle_tags_key<S: SessionStorage>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => app.confirm_selection(),
        KeyCode::Char('r') if matches!(app.corpus, CorpusStatus::Failed(_)) => {
            app.enter(AppScreen::Tags)
        }
        _ => {
            let Some(ref mut picker) = app.picker else {
                return;
            };
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => picker.prev(),
                KeyCode::Down | KeyCode::Char('j') => picker.next(),
                KeyCode::Char(' ') | KeyCode::Char('x') => picker.toggle_current(),
                KeyCode::Char('a') => picker.select_all(),
                KeyCode::Char('n') => picker.deselect_all(),
                _ => {}
            }
        }
    }
}

fn handle_questions_key<S: SessionStorage>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => app.go_back(),
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n') | KeyCode::Right => {
            app.next_question()
        }
        _ => {}
    }
}

fn render<S: SessionStorage>(frame: &mut ratatui::Frame, app: &App<S>) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let hints: &[&str] = match app.screen {
        AppScreen::Tags => &[
            "[Enter] Start",
            "[Space] Toggle",
            "[a] All",
            "[n] None",
            "[q] Quit",
        ],
        AppScreen::Questions => &["[Enter] Next", "[Esc] Back", "[q] Quit"],
    };
    let hint_lines = pack_hint_lines(hints, area.width as usize);
    let layout = AppLayout::new(area, hint_lines.len() as u16);

    let title = match app.screen {
        AppScreen::Tags => "Choose topics",
        AppScreen::Questions => "Questions",
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " topicdeck ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {title} | {}", app.source_label()),
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    match app.screen {
        AppScreen::Tags => render_tags(frame, app, layout.main),
        AppScreen::Questions => render_questions(frame, app, layout.main),
    }

    let footer_lines: Vec<Line> = hint_lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(footer_lines), layout.footer);
}

fn render_tags<S: SessionStorage>(frame: &mut ratatui::Frame, app: &App<S>, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let centered = centered_rect(50, 80, area);

    match (&app.corpus, &app.picker) {
        (CorpusStatus::Failed(err), _) => {
            let lines = vec![
                Line::from(Span::styled(
                    "Failed to load questions.",
                    Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(err.to_string(), Style::default().fg(colors.fg()))),
                Line::from(""),
                Line::from(Span::styled(
                    "[r] Retry",
                    Style::default().fg(colors.muted()),
                )),
            ];
            frame.render_widget(
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                centered,
            );
        }
        (_, Some(picker)) => {
            let Some(ref message) = app.save_error else {
                frame.render_widget(TagList::new(picker, app.theme), centered);
                return;
            };
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(2)])
                .split(centered);
            frame.render_widget(TagList::new(picker, app.theme), layout[0]);
            frame.render_widget(
                Paragraph::new(Span::styled(
                    message.as_str(),
                    Style::default().fg(colors.error()),
                ))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
                layout[1],
            );
        }
        _ => frame.render_widget(
            Paragraph::new("Loading questions...")
                .style(Style::default().fg(colors.muted()))
                .alignment(Alignment::Center),
            centered,
        ),
    }
}

fn render_questions<S: SessionStorage>(
    frame: &mut ratatui::Frame,
    app: &App<S>,
    area: ratatui::layout::Rect,
) {
    let view = app.deck_view();
    let centered = centered_rect(70, 70, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(3)])
        .split(centered);

    frame.render_widget(QuestionCard::new(&view, app.theme), layout[0]);
    frame.render_widget(ProgressBar::new("Progress", view.progress, app.theme), layout[1]);
}
