mod app;
mod event;
mod ui;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use typequiz::catalog::{Session, dataset};
use typequiz::config::{Config, Difficulty};
use typequiz::session::controller::Screen;
use typequiz::session::view::{RunView, ViewModel};
use typequiz::store::ProgressStore;
use typequiz::store::json_store::JsonStore;

use app::App;
use event::{AppEvent, EventHandler};
use ui::components::dashboard::Dashboard;
use ui::components::menu::{Menu, MenuItem};
use ui::components::progress_bar::ProgressBar;
use ui::components::typing_area::TypingArea;
use ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "typequiz", version, about = "Terminal typing quiz with unlockable courses")]
struct Cli {
    #[arg(short, long, help = "Preselected difficulty (easy, normal, hard)")]
    difficulty: Option<String>,

    #[arg(short, long, help = "Directory with problem files overriding the bundled ones")]
    problems_dir: Option<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Fixed seed for problem sampling and shuffling")]
    seed: Option<u64>,

    #[arg(long, help = "Delete saved progress and run history before starting")]
    reset_progress: bool,
}

fn init_logging(dir: Option<&PathBuf>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    // The terminal belongs to the UI, so log lines go to a file or nowhere.
    match dir.and_then(|d| fs::File::create(d.join("typequiz.log")).ok()) {
        Some(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = JsonStore::new().ok();
    init_logging(store.as_ref().map(|s| s.base_dir()));

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Falling back to default config: {e}");
        Config::default()
    });
    if let Some(key) = cli.difficulty.as_deref() {
        match Difficulty::from_key(key) {
            Some(difficulty) => config.default_difficulty = difficulty,
            None => bail!("unknown difficulty {key:?} (expected easy, normal or hard)"),
        }
    }
    if let Some(ref dir) = cli.problems_dir {
        config.problems_dir = Some(dir.display().to_string());
    }
    if let Some(name) = cli.theme {
        config.theme = name;
    }

    if cli.reset_progress
        && let Some(ref s) = store
    {
        s.reset()?;
        info!("Progress reset");
    }

    let problems_dir = config.problems_dir.as_ref().map(PathBuf::from);
    let catalog = dataset::load_catalog(problems_dir.as_deref());

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        warn!("Unknown theme {:?}, using the default", config.theme);
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));

    let store = store.map(|s| Box::new(s) as Box<dyn ProgressStore>);
    let mut app = App::new(config, catalog, store, theme, cli.seed);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(50));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    let mut last = Instant::now();
    loop {
        terminal.draw(|frame| render(frame, app))?;

        let event = events.next()?;
        let now = Instant::now();
        app.tick(now.duration_since(last));
        last = now;

        match event {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Paste(text) => {
                if app.screen() == Screen::InRun {
                    app.paste(&text);
                }
            }
            AppEvent::Tick => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen() {
        Screen::ModeSelect | Screen::SessionSelect | Screen::CourseSelect => {
            handle_menu_key(app, key)
        }
        Screen::InRun => handle_run_key(app, key),
        Screen::Result => handle_result_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc | KeyCode::Backspace => app.back(),
        KeyCode::Up | KeyCode::Char('k') => app.menu_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu_next(),
        KeyCode::Enter => app.confirm(),
        KeyCode::Char(ch) => {
            if let Some(digit) = ch.to_digit(10)
                && digit > 0
            {
                app.choose(digit as usize - 1);
            }
        }
        _ => {}
    }
}

fn handle_run_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.abandon_run(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(ch) => app.type_char(ch),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let view = app.view();
    match view.screen {
        Screen::ModeSelect | Screen::SessionSelect | Screen::CourseSelect => {
            render_menu(frame, app, &view)
        }
        Screen::InRun => render_run(frame, app, &view),
        Screen::Result => render_result(frame, app, &view),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, title: &str, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = Vec::new();
    if let Some(ref notice) = app.notice {
        lines.push(Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(colors.warning()),
        )));
    }
    for hint in pack_hint_lines(hints, area.width as usize) {
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(colors.text_pending()),
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn rank_info(view: &ViewModel) -> String {
    match view.next_rank {
        Some((ref next, missing)) => format!(
            " {} | {} exp | {missing} exp to {next}",
            view.rank, view.experience
        ),
        None => format!(" {} | {} exp", view.rank, view.experience),
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App, view: &ViewModel) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);

    render_header(frame, app, layout[0], "typequiz", &rank_info(view));

    let (subtitle, items) = match view.screen {
        Screen::ModeSelect => (
            "Choose a difficulty".to_string(),
            Difficulty::all()
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    let s = app.controller.config().settings(*d);
                    MenuItem::new(
                        (i + 1).to_string(),
                        d.label(),
                        format!(
                            "{} points per character, {}s per problem",
                            s.points_per_char, s.problem_secs
                        ),
                    )
                })
                .collect::<Vec<_>>(),
        ),
        Screen::SessionSelect => (
            format!("{} | Choose a session", view.difficulty.unwrap_or_default()),
            Session::all()
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let courses = app.controller.catalog().courses(*s).len();
                    MenuItem::new((i + 1).to_string(), s.label(), format!("{courses} courses"))
                })
                .collect(),
        ),
        _ => (
            format!(
                "{} | {} | Choose a course",
                view.difficulty.unwrap_or_default(),
                view.session.unwrap_or_default()
            ),
            view.courses
                .iter()
                .map(|c| {
                    MenuItem::new(
                        (c.index + 1).to_string(),
                        c.name.clone(),
                        format!("{} problems", c.problems),
                    )
                    .locked(!c.unlocked)
                })
                .collect(),
        ),
    };

    let menu = Menu::new("typequiz", &subtitle, items, app.theme).selected(app.selected);
    frame.render_widget(&menu, centered_rect(50, 80, layout[1]));

    let hints: &[&str] = if view.screen == Screen::ModeSelect {
        &["[1-9/Enter] Select", "[j/k] Move", "[q/Esc] Quit"]
    } else {
        &["[1-9/Enter] Select", "[j/k] Move", "[Esc] Back", "[q] Quit"]
    };
    render_footer(frame, app, layout[2], hints);
}

fn render_run(frame: &mut ratatui::Frame, app: &App, view: &ViewModel) {
    let Some(ref run) = view.run else {
        return;
    };
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(frame.area());

    let mut info = format!(
        " Score {} / {} | Problem {}/{}",
        run.score, run.clear_threshold, run.problem_number, run.problem_total
    );
    if app_layout.sidebar.is_none() {
        info.push_str(&format!(" | Misses {}", run.misses));
    }
    if let Some(message) = view.message {
        info.push_str(&format!("  {message}"));
    }
    render_header(frame, app, app_layout.header, &run.course_name, &info);

    let has_run_timer = run.run_time_left.is_some();
    let mut constraints = vec![Constraint::Min(6), Constraint::Length(3), Constraint::Length(3)];
    if has_run_timer {
        constraints.push(Constraint::Length(3));
    }
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(app_layout.main);

    let typing = TypingArea::new(
        &run.prompt,
        &run.category,
        &run.target,
        run.confirmed_len,
        &app.input,
        app.theme,
    );
    frame.render_widget(typing, main[0]);

    let monster = run.monster.as_deref().unwrap_or("Monster");
    let hp = ProgressBar::new(monster, run.hp_ratio(), colors.hp_bar(), app.theme)
        .caption(format!("HP {} / {}", run.monster_hp, run.monster_max_hp));
    frame.render_widget(hp, main[1]);

    frame.render_widget(time_bar(app, run), main[2]);

    if let Some(secs) = run.run_time_left {
        let total = app
            .controller
            .run()
            .map(|r| app.controller.config().settings(r.difficulty).run_secs)
            .unwrap_or(1)
            .max(1);
        let bar = ProgressBar::new(
            "Run",
            secs as f64 / total as f64,
            colors.warning(),
            app.theme,
        )
        .caption(format!("{secs}s"));
        frame.render_widget(bar, main[3]);
    }

    if let Some(sidebar) = app_layout.sidebar {
        render_run_sidebar(frame, app, sidebar, run);
    }

    render_footer(
        frame,
        app,
        app_layout.footer,
        &["[Esc] Abandon run", "[Backspace] Delete"],
    );
}

fn time_bar<'a>(app: &'a App, run: &RunView) -> ProgressBar<'a> {
    let colors = &app.theme.colors;
    let total = app
        .controller
        .run()
        .map(|r| app.controller.config().settings(r.difficulty).problem_secs)
        .unwrap_or(1)
        .max(1);
    let left = run.problem_time_left.unwrap_or(0);
    let fill = if left * 4 <= total {
        colors.error()
    } else {
        colors.time_bar()
    };
    ProgressBar::new("Time", left as f64 / total as f64, fill, app.theme).caption(format!("{left}s"))
}

fn render_run_sidebar(frame: &mut ratatui::Frame, app: &App, area: Rect, run: &RunView) {
    let colors = &app.theme.colors;
    let block = Block::bordered()
        .title(" Status ")
        .border_style(Style::default().fg(colors.border()));
    let label = Style::default().fg(colors.fg());
    let value = Style::default()
        .fg(colors.accent())
        .add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(vec![
            Span::styled(" Score:   ", label),
            Span::styled(run.score.to_string(), value),
        ]),
        Line::from(vec![
            Span::styled(" Clear:   ", label),
            Span::styled(run.clear_threshold.to_string(), value),
        ]),
        Line::from(vec![
            Span::styled(" Misses:  ", label),
            Span::styled(
                run.misses.to_string(),
                Style::default().fg(if run.misses == 0 {
                    colors.success()
                } else {
                    colors.error()
                }),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Problem: ", label),
            Span::styled(format!("{}/{}", run.problem_number, run.problem_total), value),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_result(frame: &mut ratatui::Frame, app: &App, view: &ViewModel) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(area);

    if let Some(ref result) = view.result {
        let centered = centered_rect(60, 70, layout[0]);
        let dashboard = Dashboard::new(result, &view.rank, view.experience, app.theme);
        frame.render_widget(dashboard, centered);
    }
    render_footer(frame, app, layout[1], &[]);
}
