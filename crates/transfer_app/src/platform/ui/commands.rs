use std::path::PathBuf;

use transfer_core::Msg;

use crate::platform::app::AppEvent;

pub const HELP: &str = "\
Commands:
  dir <path>   select the source directory (`dir` alone clears it)
  start        start polling
  stop         stop polling
  poll         run one cycle now
  check        probe the endpoint
  status       show the current status
  logs         list log files, newest first
  log <name>   show one log file
  about        show version information
  quit         exit";

/// Maps one console line to an event. `Ok(None)` for blank input.
pub fn parse_command(line: &str) -> Result<Option<AppEvent>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let event = match word.to_ascii_lowercase().as_str() {
        "dir" | "browse" => {
            let dir = (!rest.is_empty()).then(|| PathBuf::from(rest));
            AppEvent::Core(Msg::DirectorySelected(dir))
        }
        "start" => AppEvent::Core(Msg::StartClicked),
        "stop" => AppEvent::Core(Msg::StopClicked),
        "poll" => AppEvent::Core(Msg::PollOnceRequested),
        "check" => AppEvent::Core(Msg::HeartbeatTick),
        "status" => AppEvent::ShowStatus,
        "logs" => AppEvent::ListLogs,
        "log" if !rest.is_empty() => AppEvent::ShowLog(rest.to_string()),
        "log" => return Err("usage: log <name>".to_string()),
        "about" => AppEvent::About,
        "help" | "?" => AppEvent::Help,
        "quit" | "exit" => AppEvent::Quit,
        other => return Err(format!("Unknown command: {other} (try `help`)")),
    };
    Ok(Some(event))
}
