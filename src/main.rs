pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use decalc::{
    calc::{Calculator, Effect},
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    display::DisplayBuffer,
    keypad::{Input, Key},
    logging,
    runtime::{CalcEvent, CrosstermEventSource, FixedTicker, RefreshTimer, Runner},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::mpsc::Sender,
    time::Duration,
};
use tracing::{debug, info};

const TICK_RATE_MS: u64 = 250;

/// terminal calculator with a hidden time-locked decoy mode
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "An ordinary looking calculator. Press the decimal point twice to enter three hidden numbers with +; after the third the display turns into a number that keeps changing with the clock. Press = to show the code without the hidden offset."
)]
pub struct Cli {
    /// milliseconds between decoy refreshes
    #[clap(short = 'r', long = "refresh-ms")]
    refresh_ms: Option<u64>,

    /// hide the header labels
    #[clap(long)]
    no_header: bool,

    /// tracing filter for the log file (RUST_LOG still wins)
    #[clap(long)]
    log_filter: Option<String>,

    /// read settings from this file instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// write the effective settings back to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    /// Layer command line overrides on top of the stored settings
    fn apply(&self, mut config: Config) -> Config {
        if let Some(ms) = self.refresh_ms {
            config.refresh_interval_ms = ms;
        }
        if self.no_header {
            config.show_header = false;
        }
        if let Some(filter) = &self.log_filter {
            config.log_filter = filter.clone();
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Press(Input),
    Quit,
}

pub struct App {
    pub calculator: Calculator<SystemClock, DisplayBuffer>,
    pub config: Config,
    refresh: Option<RefreshTimer>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            calculator: Calculator::new(SystemClock, DisplayBuffer::default()),
            config,
            refresh: None,
        }
    }

    /// Feed one input to the calculator and start or stop the refresh timer
    pub fn press(&mut self, input: Input, events: &Sender<CalcEvent>) {
        match self.calculator.handle(input) {
            Effect::None => {}
            Effect::StartRefresh => {
                let ticker = FixedTicker::new(self.config.refresh_interval());
                self.refresh = Some(RefreshTimer::start(ticker, events.clone()));
            }
            Effect::StopRefresh => self.stop_refresh(),
        }
    }

    /// Returns true when the display changed
    pub fn on_refresh(&mut self) -> bool {
        self.calculator.on_tick()
    }

    pub fn stop_refresh(&mut self) {
        if let Some(mut timer) = self.refresh.take() {
            timer.stop();
        }
    }

    pub fn refresh_running(&self) -> bool {
        self.refresh.as_ref().is_some_and(RefreshTimer::is_running)
    }
}

pub fn map_key(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    let key = match key.code {
        KeyCode::Esc => return Some(Command::Quit),
        KeyCode::Char(' ') => return Some(Command::Press(Input::BackgroundTap)),
        KeyCode::Enter => Key::Equals,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Clear,
        KeyCode::Char(c) => match c {
            '0'..='9' => Key::Digit(c as u8 - b'0'),
            '.' => Key::Point,
            '+' => Key::Add,
            '-' => Key::Subtract,
            '*' => Key::Multiply,
            '/' => Key::Divide,
            '%' => Key::Percent,
            '=' => Key::Equals,
            'c' | 'C' => Key::Clear,
            _ => return None,
        },
        _ => return None,
    };
    Some(Command::Press(Input::Key(key)))
}

/// Left clicks press the button under the pointer; anywhere else is a background tap
pub fn map_mouse(mouse: &MouseEvent, area: Rect, show_header: bool) -> Option<Input> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }
    Some(
        match ui::hit_test(area, show_header, mouse.column, mouse.row) {
            Some(key) => Input::Key(key),
            None => Input::BackgroundTap,
        },
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = cli.config_store();
    let config = cli.apply(store.load());
    let _log_guard = logging::init(&config.log_filter);

    if cli.save_config {
        if let Err(err) = store.save(&config) {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::Io, err.to_string()).exit();
        }
        info!(path = %store.path().display(), "config saved");
    }

    info!(refresh_ms = config.refresh_interval_ms, "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new();
    let sender = events.sender();
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    terminal.draw(|f| ui(app, f))?;
    let mut drawn_revision = app.calculator.surface().revision();

    loop {
        let redraw = match runner.step() {
            CalcEvent::Tick => app.calculator.surface().revision() != drawn_revision,
            CalcEvent::Refresh => app.on_refresh(),
            CalcEvent::Resize => true,
            CalcEvent::Key(key) => match map_key(&key) {
                Some(Command::Quit) => break,
                Some(Command::Press(input)) => {
                    app.press(input, &sender);
                    true
                }
                None => false,
            },
            CalcEvent::Mouse(mouse) => {
                let size = terminal.size().unwrap_or_default();
                let area = Rect::new(0, 0, size.width, size.height);
                match map_mouse(&mouse, area, app.config.show_header) {
                    Some(input) => {
                        app.press(input, &sender);
                        true
                    }
                    None => false,
                }
            }
        };

        if redraw {
            terminal.draw(|f| ui(app, f))?;
            drawn_revision = app.calculator.surface().revision();
        }
    }

    debug!(phase = %app.calculator.phase(), "leaving event loop");
    app.stop_refresh();
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
