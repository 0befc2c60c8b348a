use transfer_core::{AppViewModel, PollingState};

/// Status lines shown to the user, in display order.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let polling = match view.polling {
        PollingState::Idle => "Polling: Stopped",
        PollingState::Running => "Polling: Running",
    };

    let mut lines = vec![
        view.directory_label(),
        view.file_notice.clone(),
        polling.to_string(),
        view.network.to_string(),
    ];
    if let Some(message) = &view.status_message {
        lines.push(message.clone());
    }
    lines
}

/// Lines of `next` that are new or changed compared to `previous`.
pub fn changed_lines(previous: &[String], next: &[String]) -> Vec<String> {
    next.iter()
        .filter(|line| !previous.contains(line))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use transfer_core::NetworkStatus;

    #[test]
    fn idle_view_renders_defaults() {
        let lines = render(&AppViewModel {
            file_notice: "Latest File: None".to_string(),
            ..AppViewModel::default()
        });
        assert_eq!(
            lines,
            vec![
                "Selected Directory: None",
                "Latest File: None",
                "Polling: Stopped",
                "Network Status: Unknown",
            ]
        );
    }

    #[test]
    fn only_changed_lines_are_reported() {
        let before = render(&AppViewModel::default());
        let after = render(&AppViewModel {
            network: NetworkStatus::Connected,
            status_message: Some("Data transfer started".to_string()),
            ..AppViewModel::default()
        });
        assert_eq!(
            changed_lines(&before, &after),
            vec!["Network Status: Connected", "Data transfer started"]
        );
    }
}
