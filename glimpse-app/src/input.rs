use glimpse_core::ViewerCommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const LOG_TARGET: &str = "glimpse::input";

/// Map one line of terminal input to a viewer command.
pub fn parse_command(line: &str) -> Option<ViewerCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "n" | "next" | "l" => Some(ViewerCommand::Next),
        "p" | "prev" | "previous" | "h" => Some(ViewerCommand::Previous),
        "q" | "quit" | "close" | "x" => Some(ViewerCommand::Close),
        _ => None,
    }
}

/// Forward stdin lines as viewer commands until stdin closes, the viewer
/// stops listening or `cancel` fires.
pub async fn forward_stdin_commands(tx: mpsc::Sender<ViewerCommand>, cancel: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            line = lines.next_line() => {
                let Ok(Some(line)) = line else {
                    // Keep the viewer running on its timer when stdin is closed
                    cancel.cancelled().await;
                    break;
                };
                match parse_command(&line) {
                    Some(command) => {
                        if tx.send(command).await.is_err() {
                            break;
                        }
                    }
                    None => debug!(target: LOG_TARGET, "Ignoring unknown input {:?}", line),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_command("n"), Some(ViewerCommand::Next));
        assert_eq!(parse_command(""), Some(ViewerCommand::Next));
        assert_eq!(parse_command(" Prev \n"), Some(ViewerCommand::Previous));
        assert_eq!(parse_command("h"), Some(ViewerCommand::Previous));
    }

    #[test]
    fn test_parse_close() {
        assert_eq!(parse_command("q"), Some(ViewerCommand::Close));
        assert_eq!(parse_command("QUIT"), Some(ViewerCommand::Close));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse_command("like"), None);
    }
}
