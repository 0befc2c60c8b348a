use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use transfer_core::{update, AppState, CycleOutcome, Effect, Msg, NetworkStatus, PollingState};
use transfer_engine::LogStore;
use transfer_logging::{transfer_info, transfer_warn};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ticker::Ticker;
use super::ui;

/// Everything the control thread reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Core(Msg),
    ShowStatus,
    ListLogs,
    ShowLog(String),
    About,
    Help,
    Quit,
}

/// Result of a single `poll-once` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub file_notice: String,
    pub status_message: Option<String>,
    pub succeeded: bool,
}

/// Opens the activity log. Failure here aborts start-up.
pub fn open_log_store(config: &AppConfig) -> anyhow::Result<LogStore> {
    let store = LogStore::open(&config.log_dir)
        .with_context(|| format!("failed to create log directory {:?}", config.log_dir))?;
    Ok(store.with_retention(config.log_retention()))
}

pub fn run_console(config: AppConfig, dir: Option<PathBuf>, start: bool) -> anyhow::Result<()> {
    let mut controller = Controller::build(&config)?;
    controller.echo = true;

    println!("Data Transfer - v{}", env!("CARGO_PKG_VERSION"));
    println!("Type `help` for commands.");
    controller.start_heartbeat(config.heartbeat_interval());

    if let Some(dir) = dir.or_else(|| config.source_dir.clone()) {
        controller.dispatch(Msg::DirectorySelected(Some(dir)));
    }
    if start {
        controller.dispatch(Msg::StartClicked);
    }

    spawn_console_reader(controller.sender());
    controller.run();
    Ok(())
}

pub fn poll_once(config: AppConfig, dir: Option<PathBuf>) -> anyhow::Result<CycleSummary> {
    let dir = dir
        .or_else(|| config.source_dir.clone())
        .context("No directory selected: pass --dir or set source_dir in the config")?;
    let mut controller = Controller::build(&config)?;

    controller.dispatch(Msg::DirectorySelected(Some(dir)));
    controller.dispatch(Msg::PollOnceRequested);
    let deadline = Duration::from_secs(config.request_timeout_secs) + Duration::from_secs(10);
    if !controller.run_until(|state| !state.is_cycle_in_flight(), deadline) {
        anyhow::bail!("cycle did not finish within {deadline:?}");
    }
    Ok(controller.summary())
}

pub fn check_once(config: AppConfig) -> anyhow::Result<NetworkStatus> {
    let mut controller = Controller::build(&config)?;

    controller.dispatch(Msg::HeartbeatTick);
    let deadline = Duration::from_secs(config.probe_timeout_secs) + Duration::from_secs(5);
    if !controller.run_until(|state| !state.is_probe_in_flight(), deadline) {
        anyhow::bail!("probe did not finish within {deadline:?}");
    }
    Ok(controller.state.view().network)
}

/// Owns the core state on the control thread and applies events one at a time.
pub(crate) struct Controller {
    state: AppState,
    runner: EffectRunner,
    heartbeat: Option<Ticker>,
    tx: mpsc::Sender<AppEvent>,
    rx: mpsc::Receiver<AppEvent>,
    last_failure: Option<String>,
    rendered: Vec<String>,
    echo: bool,
}

impl Controller {
    fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let log_store = open_log_store(config)?;
        let (tx, rx) = mpsc::channel();
        let runner = EffectRunner::new(config, log_store, tx.clone())?;
        Ok(Self::with_runner(runner, tx, rx))
    }

    fn with_runner(
        runner: EffectRunner,
        tx: mpsc::Sender<AppEvent>,
        rx: mpsc::Receiver<AppEvent>,
    ) -> Self {
        Self {
            state: AppState::new(),
            runner,
            heartbeat: None,
            tx,
            rx,
            last_failure: None,
            rendered: Vec::new(),
            echo: false,
        }
    }

    fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.tx.clone()
    }

    fn start_heartbeat(&mut self, interval: Duration) {
        let mut ticker = Ticker::new("heartbeat", interval, Msg::HeartbeatTick, self.sender());
        ticker.start();
        self.heartbeat = Some(ticker);
        // First probe runs right away rather than after one interval.
        self.dispatch(Msg::HeartbeatTick);
    }

    fn dispatch(&mut self, msg: Msg) {
        match &msg {
            Msg::ScanFailed(message) => self.last_failure = Some(message.clone()),
            Msg::CycleFinished {
                outcome: CycleOutcome::Failed(message),
                ..
            } => self.last_failure = Some(message.clone()),
            Msg::CycleFinished { .. } => self.last_failure = None,
            _ => {}
        }

        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);

        if self.state.consume_dirty() && self.echo {
            let lines = ui::render::render(&self.state.view());
            for line in ui::render::changed_lines(&self.rendered, &lines) {
                println!("{line}");
            }
            self.rendered = lines;
        }
    }

    /// Handles one event. Returns `false` when the loop should end.
    fn handle(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Core(msg) => self.dispatch(msg),
            AppEvent::ShowStatus => {
                for line in ui::render::render(&self.state.view()) {
                    println!("{line}");
                }
            }
            AppEvent::ListLogs => self.list_logs(),
            AppEvent::ShowLog(name) => match self.runner.log_store().read_partition(&name) {
                Ok(content) => print!("{content}"),
                Err(err) => println!("Unable to load log file: {err}"),
            },
            AppEvent::About => {
                println!("Data Transfer\nVersion {}", env!("CARGO_PKG_VERSION"));
            }
            AppEvent::Help => println!("{}", ui::commands::HELP),
            AppEvent::Quit => return false,
        }
        true
    }

    fn list_logs(&mut self) {
        match self.runner.log_store().list_partitions() {
            Ok(names) if names.is_empty() => {
                println!("No log files found in the logs directory.");
            }
            Ok(names) => {
                for name in names {
                    println!("{name}");
                }
            }
            Err(err) => {
                let message = format!("An error occurred while loading logs: {err}");
                println!("{message}");
                self.runner.run(vec![Effect::AppendLog { message }]);
            }
        }
    }

    fn run(&mut self) {
        while let Ok(event) = self.rx.recv() {
            if !self.handle(event) {
                break;
            }
        }
        if self.state.polling() == PollingState::Running {
            self.dispatch(Msg::StopClicked);
        }
        if let Some(mut heartbeat) = self.heartbeat.take() {
            heartbeat.stop();
        }
        transfer_info!("Control loop finished");
    }

    /// Processes events until `done` holds or `timeout` elapses.
    fn run_until(&mut self, done: impl Fn(&AppState) -> bool, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if done(&self.state) {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(AppEvent::Quit) => return done(&self.state),
                Ok(event) => {
                    self.handle(event);
                }
                Err(_) => {
                    transfer_warn!("Timed out waiting for the control loop to settle");
                    return done(&self.state);
                }
            }
        }
    }

    fn summary(&self) -> CycleSummary {
        let view = self.state.view();
        CycleSummary {
            file_notice: view.file_notice,
            status_message: view.status_message,
            succeeded: self.last_failure.is_none(),
        }
    }
}

fn spawn_console_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match ui::commands::parse_command(&line) {
                Ok(Some(event)) => {
                    if tx.send(event).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(message) => println!("{message}"),
            }
        }
        let _ = tx.send(AppEvent::Quit);
    });
}
