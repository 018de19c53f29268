use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use strm_core::StreamEvent;
use strm_sse::{replay_str, ReplayEntry};

#[derive(Parser, Debug)]
#[command(
    name = "strm-cli",
    about = "Phát lại một luồng text/event-stream đã ghi và in các sự kiện đã giải mã."
)]
struct Args {
    /// Đường dẫn tới file capture của kênh `/events`.
    #[arg(short, long)]
    input: PathBuf,

    /// In báo cáo dạng JSON thay vì từng dòng.
    #[arg(long)]
    json: bool,

    /// Mức log (error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    log_level: log::LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    simple_logger::SimpleLogger::new()
        .with_level(args.log_level)
        .init()
        .context("Không khởi tạo được logger")?;

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Không đọc được file {:?}", args.input))?;

    let report = replay_str(&data);
    if report.truncated {
        log::warn!("Capture kết thúc giữa chừng một frame, frame cuối bị bỏ");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for entry in &report.entries {
        match entry {
            ReplayEntry::Decoded { decoded, .. } => println!("{}", describe(decoded)),
            ReplayEntry::Ignored { event } => log::info!("Bỏ qua sự kiện `{event}`"),
            ReplayEntry::Rejected { event, reason } => log::warn!("`{event}` bị loại: {reason}"),
        }
    }

    println!(
        "Frames: {}\nRejected: {}\nKeep-alives: {}",
        report.entries.len(),
        report.rejected(),
        report.keepalives
    );

    Ok(())
}

fn describe(event: &StreamEvent) -> String {
    match event {
        StreamEvent::Connected { message } => {
            format!("connected {}", message.as_deref().unwrap_or_default())
        }
        StreamEvent::Notification(notification) => {
            let mut line = format!(
                "notification [{}] {}: {}",
                notification.severity, notification.title, notification.message
            );
            if let Some(timestamp) = notification.timestamp {
                line.push_str(&format!(" @ {}", timestamp.format("%Y-%m-%d %H:%M:%S")));
            }
            if let Some(details) = &notification.details {
                for (key, value) in details.iter() {
                    line.push_str(&format!("\n    {key}: {value}"));
                }
            }
            line
        }
        StreamEvent::StatusUpdate(payload) => format!("status_update {payload}"),
    }
}
