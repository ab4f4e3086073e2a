use crate::types::{LogMessage, StreamFailure};
use crate::utils::get_color;
use crossterm::style::Stylize;
use std::io::Write;
use tokio::sync::mpsc;
use tracing::error;

/// `[pod/container]: line` with a trailing newline.
pub fn render(msg: &LogMessage, color: bool) -> String {
    if color {
        let prefix = msg.prefix().with(get_color(&msg.pod_name));
        format!("{}: {}\n", prefix, msg.line)
    } else {
        format!("{}: {}\n", msg.prefix(), msg.line)
    }
}

/// Single consumer of every stream task's records. Each record goes out in
/// one write so lines from different containers never interleave.
pub async fn print_logs<W: Write>(
    mut rx: mpsc::Receiver<LogMessage>,
    mut out: W,
    color: bool,
) -> std::io::Result<()> {
    while let Some(msg) = rx.recv().await {
        out.write_all(render(&msg, color).as_bytes())?;
        out.flush()?;
    }
    Ok(())
}

pub async fn report_failures(mut rx: mpsc::UnboundedReceiver<StreamFailure>) {
    while let Some(failure) = rx.recv().await {
        error!("{}", failure);
    }
}
