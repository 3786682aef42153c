mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use faktor::{
    config::{Config, ConfigStore, FileConfigStore},
    error::QuizError,
    input::parse_int_list,
    progress::ProgressDb,
    runtime::{CrosstermEventSource, QuizEvent, Runner},
    session::{LevelMap, Outcome, Session, SessionConfig},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

const TICK_RATE_MS: u64 = 100;
/// How long the screen stays red after a wrong answer.
const FLASH_MS: u64 = 300;

/// terminal prime factorization quiz with adaptive number selection
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal quiz that deals numbers from a deterministic group of the universe \
                  [1, max-num] and asks for their prime factorization. With a user name, mastery \
                  levels are tracked per number and weak numbers come up more often."
)]
pub struct Cli {
    /// largest number in the universe (default 100)
    #[clap(short = 'm', long)]
    max_num: Option<u32>,

    /// number of groups the universe is split into (default 10)
    #[clap(short = 'n', long)]
    num_groups: Option<u32>,

    /// group to play, counted from 1 (prompted for when omitted)
    #[clap(short = 'g', long)]
    group: Option<u32>,

    /// deal every number with equal weight instead of favoring weak ones
    #[clap(long)]
    ignore_levels: bool,

    /// user name for mastery tracking (omit to play without tracking)
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// forget all recorded mastery levels for the user and exit
    #[clap(long)]
    clear_levels: bool,
}

impl Cli {
    /// Overlay CLI arguments on the persisted configuration.
    fn merge_into(&self, mut config: Config) -> Config {
        if let Some(max_num) = self.max_num {
            config.max_num = max_num;
        }
        if let Some(num_groups) = self.num_groups {
            config.num_groups = num_groups;
        }
        if self.ignore_levels {
            config.ignore_levels = true;
        }
        if self.user.is_some() {
            config.user = self.user.clone();
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Landing,
    Quiz,
    Done,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    /// 1-indexed group from the CLI, if given.
    pub preset_group: Option<u32>,
    pub progress: Option<ProgressDb>,
    pub session: Option<Session>,
    pub game_id: Option<i64>,
    pub state: AppState,
    pub input: String,
    pub message: String,
    pub level_summary: Vec<(u32, u32)>,
    flash_until: Option<Instant>,
}

impl App {
    pub fn new(config: Config, preset_group: Option<u32>) -> Self {
        let progress = config.user.as_ref().and_then(|_| ProgressDb::new().ok());

        let mut app = Self {
            config,
            preset_group,
            progress,
            session: None,
            game_id: None,
            state: AppState::Landing,
            input: String::new(),
            message: String::new(),
            level_summary: Vec::new(),
            flash_until: None,
        };
        app.enter_landing();
        app
    }

    fn enter_landing(&mut self) {
        self.state = AppState::Landing;
        self.session = None;
        self.game_id = None;
        self.input.clear();
        self.refresh_level_summary();

        let mut message = String::new();
        if let Some(user) = &self.config.user {
            message.push_str(&format!("Hello, {}. ", capitalize(user)));
        }
        if self.preset_group.is_some() {
            message.push_str("Hit enter to begin.");
        } else {
            message.push_str(&format!(
                "Enter group number to start (1 to {}).",
                self.config.num_groups
            ));
        }
        self.message = message;
    }

    fn refresh_level_summary(&mut self) {
        self.level_summary = match (&self.config.user, &self.progress) {
            (Some(user), Some(db)) => db.level_counts(user).unwrap_or_default(),
            _ => Vec::new(),
        };
    }

    /// Enter key on the landing screen: resolve the group and start.
    fn submit_landing(&mut self) {
        let text = std::mem::take(&mut self.input);

        let group = match self.preset_group {
            Some(group) => group,
            None => match self.resolve_group(&text) {
                Ok(Some(group)) => group,
                Ok(None) => return,
                Err(e) => {
                    self.message = format!("Error: {e}");
                    return;
                }
            },
        };

        match self.begin(group) {
            Ok(()) => {
                self.message.clear();
                // A group can hold no numbers at all; there is nothing to
                // quiz then and the session starts out finished.
                if self.session.as_ref().is_some_and(|s| s.is_finished()) {
                    self.finish();
                } else {
                    self.state = AppState::Quiz;
                }
            }
            Err(message) => self.message = format!("Error: {message}"),
        }
    }

    /// Parse the typed group number (1-indexed). A bare enter is Ok(None).
    fn resolve_group(&self, text: &str) -> Result<Option<u32>, QuizError> {
        let group = match parse_int_list(text)?[..] {
            [] => return Ok(None),
            [group] => group,
            _ => return Err(QuizError::InvalidInputToken(text.trim().to_string())),
        };
        if group < 1 || group > i64::from(self.config.num_groups) {
            return Err(QuizError::InvalidGroupNumber {
                group,
                max: self.config.num_groups,
            });
        }
        Ok(Some(group as u32))
    }

    /// NotStarted -> Active: fetch levels if they apply, build the session,
    /// record the game row. A level fetch failure aborts the start; a game
    /// row failure does not.
    fn begin(&mut self, group: u32) -> Result<(), String> {
        let session_config = SessionConfig {
            max_num: self.config.max_num,
            num_groups: self.config.num_groups,
            group_num: group - 1,
            ignore_levels: self.config.ignore_levels,
        };

        let levels: Option<LevelMap> = match (&self.config.user, &self.progress) {
            _ if session_config.ignore_levels => None,
            (Some(user), Some(db)) => Some(
                db.level_map(user, session_config.max_num)
                    .map_err(|e| format!("could not load levels: {e}"))?,
            ),
            (Some(_), None) => return Err("progress database unavailable".into()),
            (None, _) => None,
        };

        let session =
            Session::start(session_config.clone(), levels.as_ref()).map_err(|e| e.to_string())?;

        self.game_id = match (&self.config.user, &self.progress) {
            (Some(user), Some(db)) => db.start_game(user, &session_config).ok(),
            _ => None,
        };
        self.session = Some(session);
        Ok(())
    }

    /// Enter key on the quiz screen: parse and judge one answer.
    fn submit_answer(&mut self) {
        let text = std::mem::take(&mut self.input);

        let answer = match parse_int_list(&text) {
            Ok(answer) => answer,
            Err(e) => {
                self.message = format!("Error: {e}");
                return;
            }
        };

        let outcome = match self.session.as_mut() {
            Some(session) => session.submit(&answer),
            None => return,
        };

        match outcome {
            Ok(Outcome::Ignored) => {}
            Ok(Outcome::Correct { number, first_try }) => {
                self.message.clear();
                if first_try {
                    self.record_correct(number);
                }
                let finished = self.session.as_ref().is_some_and(|s| s.is_finished());
                if finished {
                    self.finish();
                }
            }
            Ok(Outcome::Incorrect { number }) => {
                self.record_incorrect(number);
                self.flash_until = Some(Instant::now() + Duration::from_millis(FLASH_MS));
                self.message.clear();
            }
            Err(e) => self.message = format!("Error: {e}"),
        }
    }

    fn finish(&mut self) {
        if let (Some(db), Some(game_id)) = (&self.progress, self.game_id) {
            let error_count = self.session.as_ref().map_or(0, |s| s.error_count());
            let _ = db.finish_game(game_id, error_count);
        }
        self.state = AppState::Done;
    }

    // Recording is best-effort: a store failure must never block or revert
    // play.
    fn record_correct(&self, number: u32) {
        if let (Some(user), Some(db)) = (&self.config.user, &self.progress) {
            let _ = db.record_correct(user, number);
        }
    }

    fn record_incorrect(&self, number: u32) {
        if let (Some(user), Some(db)) = (&self.config.user, &self.progress) {
            let _ = db.record_incorrect(user, number);
        }
    }

    pub fn flash_active(&self) -> bool {
        self.flash_until.is_some_and(|until| Instant::now() < until)
    }

    pub fn on_tick(&mut self) {
        if let Some(until) = self.flash_until {
            if Instant::now() >= until {
                self.flash_until = None;
            }
        }
    }

    /// Handle one key event. Returns false when the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }

        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => match self.state {
                AppState::Landing => self.submit_landing(),
                AppState::Quiz => self.submit_answer(),
                AppState::Done => self.enter_landing(),
            },
            KeyCode::Char(c) => match self.state {
                AppState::Done => {
                    if c == 'r' || c == 'n' {
                        self.enter_landing();
                    } else if c == 'q' {
                        return false;
                    }
                }
                _ => self.input.push(c),
            },
            _ => {}
        }
        true
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let config = cli.merge_into(store.load());
    let _ = store.save(&config);

    if cli.clear_levels {
        let Some(user) = &config.user else {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::MissingRequiredArgument, "--clear-levels needs --user")
                .exit();
        };
        let db = ProgressDb::new()?;
        let removed = db.clear(user)?;
        println!("Cleared {removed} level records for {user}.");
        return Ok(());
    }

    if let Some(group) = cli.group {
        if group < 1 || group > config.num_groups {
            let mut cmd = Cli::command();
            cmd.error(
                ErrorKind::ValueValidation,
                format!("group must be between 1 and {}", config.num_groups),
            )
            .exit();
        }
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, cli.group);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            QuizEvent::Tick => {
                app.on_tick();
            }
            QuizEvent::Resize => {}
            QuizEvent::Key(key) => {
                if !app.on_key(key) {
                    return Ok(());
                }
            }
        }
    }
}
