//! Counter-Strafe TestKit - terminal counter-strafe trainer
//!
//! Captures the movement keys globally, measures every counter-strafe and
//! shows the results live.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode as CtKeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    symbols::border,
    widgets::{Block, Borders},
    Frame, Terminal,
};
use std::{
    fs::File,
    io::stdout,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
    time::Duration,
};

use counterstrafe_testkit::{
    config::{self, Config},
    detector::{ChannelObserver, Detector, DetectorEvent},
    engine,
    history::HistoryStore,
    keyboard::{spawn_capture, Axis, Clock, KeyRemapper},
    report::SessionReport,
    ui::{
        App, AppState, AppView, FeedbackPanel, HelpPanel, KeyboardVisual, RecordList,
        ResultsPanel, StatusBar, TabBar, ThemeColors, RECENT_RECORDS,
    },
};

/// How often the capture thread samples the keyboard
const CAPTURE_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Route log output to a file so it cannot corrupt the terminal UI
fn init_logging() {
    let Ok(path) = config::log_path() else {
        return;
    };
    let Ok(file) = File::create(&path) else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    log::info!("logging to {}", path.display());
}

fn main() -> Result<()> {
    init_logging();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("using default config: {}", e);
            Config::default()
        }
    };

    // Cleared by Ctrl+C or on exit; the capture thread watches it
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("failed to install Ctrl+C handler")?;
    }

    // Detector engine and key capture
    let history = HistoryStore::new(config.history.capacity);
    let (event_tx, event_rx) = mpsc::channel::<DetectorEvent>();
    let mut detector = Detector::new(config.detector, history.clone());
    detector.add_observer(Box::new(ChannelObserver::new(event_tx)));
    let remapper = KeyRemapper::with_mapping(config.keys.clone())?;
    let clock = Clock::new();

    let (engine, engine_thread) = engine::spawn(detector, remapper, clock)?;
    let capture_thread = spawn_capture(engine.clone(), clock, CAPTURE_POLL_INTERVAL, running.clone())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, history, engine.clone());
    let result = run(&mut terminal, &mut app, &event_rx, &running);

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    running.store(false, Ordering::SeqCst);
    let _ = engine.shutdown();
    let _ = capture_thread.join();
    let _ = engine_thread.join();

    if let Err(e) = app.config.save() {
        log::warn!("could not save config: {}", e);
    }

    result?;

    println!("\nCounter-Strafe TestKit session complete.");
    for axis in Axis::ALL {
        println!("{} records: {}", axis, app.history().len(axis));
    }
    println!("Session duration: {}", app.elapsed_formatted());

    Ok(())
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mpsc::Receiver<DetectorEvent>,
    running: &AtomicBool,
) -> Result<()> {
    let tick_rate = app.config.refresh_interval();

    loop {
        // Detector notifications
        while let Ok(event) = events.try_recv() {
            app.process_event(&event);
        }

        terminal.draw(|frame| draw(frame, app))?;

        // Handle terminal events (for navigation/control)
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code, key.modifiers);
                }
            }
        }

        if !running.load(Ordering::SeqCst) {
            app.quit();
        }
        if app.state == AppState::Quitting {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, code: CtKeyCode, modifiers: KeyModifiers) {
    match code {
        CtKeyCode::Char('q') | CtKeyCode::Esc => app.quit(),
        CtKeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        CtKeyCode::BackTab => app.prev_view(),
        CtKeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => app.prev_view(),
        CtKeyCode::Tab => app.next_view(),
        CtKeyCode::Char('?') => app.view = AppView::Help,
        CtKeyCode::Char('r') => app.reset(),
        CtKeyCode::Char('t') => app.cycle_threshold(),
        CtKeyCode::Char('w') => app.cycle_stats_window(),
        CtKeyCode::Char('e') => {
            let _ = app.export_report(&SessionReport::default_filename());
        }
        _ => {}
    }
}

fn draw(frame: &mut Frame, app: &App) {
    let colors = ThemeColors::from_theme(app.config.ui.theme);
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Length(4), // Key pad
            Constraint::Length(4), // Feedback
            Constraint::Min(8),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    // Tab bar
    let tab_names: Vec<&str> = AppView::all().iter().map(|v| v.name()).collect();
    frame.render_widget(TabBar::new(&tab_names, app.view.index()), chunks[0]);

    // Key pad
    let pad_block = Block::default()
        .title(" Movement keys ")
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(Color::Rgb(90, 90, 110)));
    let pad_inner = pad_block.inner(chunks[1]);
    frame.render_widget(pad_block, chunks[1]);
    let expected = app.expected_keys();
    frame.render_widget(
        KeyboardVisual::new(&app.key_pad, &app.config.keys, &expected, colors),
        pad_inner,
    );

    // Feedback
    frame.render_widget(
        FeedbackPanel::new(app.last_record.as_ref(), &app.waiting, &app.config.keys)
            .cancelled(app.last_cancel),
        chunks[2],
    );

    // Main content area
    match app.view {
        AppView::Practice => {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[3]);
            for (axis, area) in Axis::ALL.into_iter().zip(halves.iter()) {
                let results = app.axis_results(axis);
                let title = format!(" {} stats ", axis);
                frame.render_widget(ResultsPanel::new(&results, &title), *area);
            }
        }
        AppView::History => {
            let records = app.recent_records(RECENT_RECORDS);
            frame.render_widget(RecordList::new(&records), chunks[3]);
        }
        AppView::Help => frame.render_widget(HelpPanel, chunks[3]),
    }

    // Status bar
    let state_str = match app.state {
        AppState::Running => "RUNNING",
        AppState::Quitting => "QUITTING",
    };
    let elapsed = app.elapsed_formatted();
    let settings = app.settings_summary();
    let status = StatusBar::new(state_str, app.view.name(), &elapsed, app.total_events)
        .settings(&settings)
        .message(app.get_status());
    frame.render_widget(status, chunks[4]);
}
