use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use env_logger::{Env, Target};
use log::{info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use keyladder::app::App;
use keyladder::config::Config;
use keyladder::engine::levels::GameLevel;
use keyladder::engine::progression::UserProgress;
use keyladder::event::{AppEvent, EventHandler};
use keyladder::notify::{LogSink, QueueSink};
use keyladder::store::json_store::{JsonStore, default_data_dir};
use keyladder::store::memory::MemoryStore;
use keyladder::store::{HistoryStore, ProgressStore, QuoteSource};
use keyladder::ui::components::progress_bar::LevelProgressBar;
use keyladder::ui::components::stats_sidebar::StatsSidebar;
use keyladder::ui::components::typing_area::TypingArea;
use keyladder::ui::layout::AppLayout;
use keyladder::ui::status::StatusLine;
use keyladder::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "keyladder", version, about = "Terminal typing game with a level ladder")]
struct Cli {
    #[arg(short, long, help = "User id to track progress for")]
    user: Option<String>,

    #[arg(short, long, help = "Script (quote pool) to rotate through")]
    script: Option<String>,

    #[arg(long, help = "Start with death mode on")]
    death: bool,

    #[arg(long, help = "Start with repeat mode on")]
    repeat: bool,

    #[arg(long, help = "Keep everything in memory; nothing is written")]
    ephemeral: bool,

    #[arg(long, help = "Reset the user's progress to level 1 before starting")]
    reset_progress: bool,

    #[arg(long, help = "Print the user's typing summary and exit")]
    summary: bool,

    #[arg(long, help = "Print the level table and exit")]
    levels: bool,

    #[arg(
        long,
        num_args = 2,
        value_names = ["SCRIPT", "FILE"],
        conflicts_with = "ephemeral",
        help = "Replace a script with the quotes in FILE (one per line) and exit"
    )]
    import: Option<Vec<String>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&default_data_dir())?;

    let mut config = Config::load_or_default();
    if let Some(user) = cli.user.clone() {
        config.user_id = user;
    }
    if let Some(script) = cli.script.clone() {
        config.script_id = Some(script);
    }
    config.death_mode |= cli.death;
    config.repeat_mode |= cli.repeat;
    config.validate();

    if cli.levels {
        print_levels(config.level_table().levels());
        return Ok(());
    }

    if let Some(args) = cli.import.as_deref() {
        return import_quotes(&config, args);
    }

    info!("keyladder starting for user {}", config.user_id);

    if cli.ephemeral {
        run_with(&cli, config, Rc::new(MemoryStore::new()))
    } else {
        let store = JsonStore::with_base_dir(config.data_dir())?;
        run_with(&cli, config, Rc::new(store))
    }
}

/// Log to a file in the default data dir so output never lands on the TUI.
/// This runs before the config is read, so a bad config can be reported.
fn init_logging(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("keyladder.log"))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_with<S>(cli: &Cli, config: Config, store: Rc<S>) -> Result<()>
where
    S: QuoteSource + HistoryStore + ProgressStore + 'static,
{
    let queue = Rc::new(QueueSink::new());
    let tick_rate = config.tick_rate();
    let mut app = App::new(config, store)
        .with_sink(Rc::new(LogSink))
        .with_sink(queue.clone());

    if cli.reset_progress {
        app.reset_progress();
        println!("Progress reset for {}", app.user_id());
    }

    if cli.summary {
        print_summary(&mut app);
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let events = EventHandler::new(tick_rate);
    let theme = Theme::default();

    let persist_modes = !cli.ephemeral;
    let result = run_app(&mut terminal, &mut app, &events, &queue, &theme, persist_modes);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Everything the frame needs that has to be read through `&mut App`.
struct View {
    progress: UserProgress,
    params: GameLevel,
    wpm_threshold: Option<f64>,
    attempts_remaining: u32,
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    queue: &QueueSink,
    theme: &Theme,
    persist_modes: bool,
) -> Result<()> {
    let mut status = StatusLine::new();
    loop {
        let now = Instant::now();
        status.tick(now);
        if let Some(latest) = queue.drain().pop() {
            status.set(latest.message(), now);
        }
        let view = View {
            progress: app.progress(),
            params: app.level_parameters(),
            wpm_threshold: app.wpm_threshold(),
            attempts_remaining: app.attempts_remaining(),
        };
        terminal.draw(|frame| render(frame, app, &view, status.message(), theme))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key, &mut status, persist_modes),
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, status: &mut StatusLine, persist_modes: bool) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Char('r') if ctrl => {
            app.reset_test();
        }
        KeyCode::Char('d') if ctrl => {
            app.toggle_death_mode();
            if persist_modes {
                save_modes(&app.config);
            }
        }
        KeyCode::Char('t') if ctrl => {
            app.toggle_repeat_mode();
            if persist_modes {
                save_modes(&app.config);
            }
        }
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab => {
            status.clear();
            app.load_new_quote();
        }
        KeyCode::Backspace => {
            app.smart_backspace();
        }
        KeyCode::Char(ch) if !ctrl => {
            app.handle_input(ch);
        }
        _ => {}
    }
}

fn save_modes(config: &Config) {
    if let Err(e) = config.save_modes() {
        warn!("could not save mode toggles: {e}");
    }
}

fn import_quotes(config: &Config, args: &[String]) -> Result<()> {
    let [script, file] = args else {
        bail!("--import takes a script id and a file");
    };
    let store = JsonStore::with_base_dir(config.data_dir())?;
    let count = store.import_script(script, Path::new(file))?;
    info!("imported {count} quotes into script {script} from {file}");
    println!("Imported {count} quotes into \"{script}\"");
    println!("Scripts: {}", store.script_ids()?.join(", "));
    Ok(())
}

fn render(
    frame: &mut ratatui::Frame,
    app: &App,
    view: &View,
    status: Option<&str>,
    theme: &Theme,
) {
    let colors = &theme.colors;
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

    let layout = AppLayout::new(area);
    let stats = app.session.stats();

    let mut header = vec![Span::styled(
        format!(" keyladder  {}  level {} ", app.user_id(), view.progress.current_level),
        Style::default().fg(colors.accent()),
    )];
    if layout.sidebar.is_none() {
        header.push(Span::styled(
            format!(" {:.0} wpm  {:.0}% ", stats.wpm, stats.accuracy),
            Style::default().fg(colors.fg()),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(header)), layout.header);

    frame.render_widget(TypingArea::new(&app.session, theme), layout.main);

    if let Some(sidebar) = layout.sidebar {
        frame.render_widget(
            StatsSidebar {
                stats,
                progress: &view.progress,
                params: view.params,
                wpm_threshold: view.wpm_threshold,
                attempts_remaining: view.attempts_remaining,
                failures: app.session.failure_count(),
                last_update: app.last_update.as_ref(),
                theme,
            },
            sidebar,
        );
    }

    frame.render_widget(
        LevelProgressBar::new(
            view.progress.current_level,
            view.progress.successful_quotes_count,
            view.params.required_quotes,
            theme,
        ),
        layout.progress,
    );

    let footer = match status {
        Some(msg) => Span::styled(format!(" {msg}"), Style::default().fg(colors.success())),
        None => Span::styled(
            " [Tab] next quote  [Ctrl-R] restart  [Ctrl-D] death  [Ctrl-T] repeat  [Esc] quit",
            Style::default().fg(colors.text_pending()),
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(footer)), layout.footer);
}

fn print_summary(app: &mut App) {
    let progress = app.progress();
    println!("User:       {}", progress.user_id);
    println!("Level:      {}", progress.current_level);
    match progress.baseline_wpm {
        Some(b) => println!("Baseline:   {b:.0} wpm"),
        None => println!("Baseline:   not set"),
    }
    println!(
        "This level: {} successful, {} attempts",
        progress.successful_quotes_count, progress.level_attempts_used
    );
    match app.user_stats() {
        Ok(stats) => {
            println!("Sessions:   {}", stats.sessions);
            println!("Best:       {:.0} wpm", stats.best_wpm);
            println!(
                "Average:    {:.0} wpm, {:.0}% accuracy",
                stats.average_wpm, stats.average_accuracy
            );
            println!("Practiced:  {:.0} min", stats.total_secs / 60.0);
        }
        Err(e) => eprintln!("Could not read history: {e}"),
    }
}

fn print_levels(levels: &[GameLevel]) {
    println!(
        "{:>5}  {:>10}  {:>8}  {:>6}  {:>8}",
        "level", "wpm x", "accuracy", "quotes", "attempts"
    );
    for l in levels {
        println!(
            "{:>5}  {:>10.1}  {:>7.0}%  {:>6}  {:>8}",
            l.level,
            l.wpm_threshold_multiplier,
            l.accuracy_threshold,
            l.required_quotes,
            l.max_attempts
        );
    }
}
