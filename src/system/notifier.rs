// src/system/notifier.rs

//! Best-effort completion notifications. This is a fire-and-forget side
//! channel: the notifier child is spawned detached and never awaited, and
//! every failure is swallowed after a debug log. Nothing here may ever
//! surface as an error to the execution path.

use std::process::{Command as StdCommand, Stdio};

/// Raises an OS notification, if the platform offers a notifier binary.
pub fn notify(title: &str, body: &str) {
    let title = sanitize(title);
    let body = sanitize(body);

    let spawn_result = if cfg!(target_os = "macos") {
        let script = format!("display notification \"{body}\" with title \"{title}\"");
        detached(StdCommand::new("osascript").arg("-e").arg(script))
    } else if cfg!(target_os = "windows") {
        detached(StdCommand::new("msg").arg("*").arg(format!("{title}: {body}")))
    } else {
        detached(StdCommand::new("notify-send").arg(&title).arg(&body))
    };

    if let Err(e) = spawn_result {
        log::debug!("Notification could not be delivered: {e}");
    }
}

fn detached(command: &mut StdCommand) -> std::io::Result<()> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

/// Strips quoting and control characters so notification text can be safely
/// embedded in the platform notifier's argument string.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .take(120)
        .collect()
}
