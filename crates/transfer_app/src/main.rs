mod platform;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use platform::logging::{self, LogDestination};
use platform::AppConfig;

#[derive(Parser)]
#[command(
    name = "transfer_app",
    version,
    about = "Watches a directory for the newest CSV file and posts it as JSON to a REST endpoint"
)]
struct Cli {
    /// RON configuration file. Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "datatransfer.ron")]
    config: PathBuf,

    /// Where diagnostic output goes.
    #[arg(long, global = true, value_enum, default_value_t = Diagnostics::Both)]
    diagnostics: Diagnostics,

    /// Include debug-level diagnostics.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive console: select a directory, start/stop polling, view logs.
    Run {
        /// Source directory to select on start-up.
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Start polling immediately (requires a directory).
        #[arg(long)]
        start: bool,
    },
    /// Run a single find/parse/submit cycle and exit.
    PollOnce {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Probe the endpoint once and print the network status.
    Check,
    /// Inspect the hourly activity logs.
    Logs {
        #[command(subcommand)]
        action: LogsAction,
    },
    /// Print the effective configuration as RON.
    Config,
}

#[derive(Subcommand)]
enum LogsAction {
    /// List log files, newest first.
    List,
    /// Print the content of one log file.
    Show { name: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Diagnostics {
    Terminal,
    File,
    Both,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let destination = match cli.diagnostics {
        Diagnostics::Terminal => LogDestination::Terminal,
        Diagnostics::File => LogDestination::File,
        Diagnostics::Both => LogDestination::Both,
    };
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(destination, level);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = AppConfig::load(&cli.config)?;

    match cli.command.unwrap_or(Command::Run {
        dir: None,
        start: false,
    }) {
        Command::Run { dir, start } => {
            platform::run_console(config, dir, start)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::PollOnce { dir } => {
            let summary = platform::poll_once(config, dir)?;
            println!("{}", summary.file_notice);
            if let Some(status) = &summary.status_message {
                println!("{status}");
            }
            Ok(if summary.succeeded {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Check => {
            let status = platform::check_once(config)?;
            println!("{status}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Logs { action } => {
            let store = platform::open_log_store(&config)?;
            match action {
                LogsAction::List => {
                    for name in store.list_partitions()? {
                        println!("{name}");
                    }
                }
                LogsAction::Show { name } => print!("{}", store.read_partition(&name)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Config => {
            println!("{}", config.to_ron()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
