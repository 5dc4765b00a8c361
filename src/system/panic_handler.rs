//! Panic handler
//!
//! Every panic is appended to `crash.log` together with the settings the
//! process was started with (mode, listen address, database file), so a
//! report from a supervisor-restarted instance can be matched to its
//! deployment. Server mode additionally prints a colored report to stderr.

use std::backtrace::Backtrace;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic::{self, PanicHookInfo};

use chrono::Utc;
use colored::Colorize;

use crate::config::StaticConfig;

const CRASH_LOG: &str = "crash.log";

/// Running mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Server,
    Cli,
}

/// 进程启动时的部署信息，写入每一份崩溃报告
#[derive(Debug, Clone)]
struct CrashContext {
    mode: RunMode,
    bind_address: String,
    database_path: String,
}

/// 单次 panic 的内容
struct CrashReport<'a> {
    timestamp: String,
    message: String,
    location: String,
    context: &'a CrashContext,
}

impl CrashReport<'_> {
    fn render(&self, backtrace: &Backtrace) -> String {
        format!(
            "=== geoserve {} crash @ {} ===\n\
             mode:     {:?}\n\
             listen:   {}\n\
             database: {}\n\
             message:  {}\n\
             location: {}\n\
             backtrace:\n{:?}\n\n",
            env!("CARGO_PKG_VERSION"),
            self.timestamp,
            self.context.mode,
            self.context.bind_address,
            self.context.database_path,
            self.message,
            self.location,
            backtrace,
        )
    }
}

/// Install custom panic hook
pub fn install_panic_hook(mode: RunMode, config: &StaticConfig) {
    let context = CrashContext {
        mode,
        bind_address: config.server.bind_address(),
        database_path: config.database.path.clone(),
    };

    panic::set_hook(Box::new(move |info| {
        let report = CrashReport {
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            message: panic_message(info),
            location: info
                .location()
                .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
                .unwrap_or_else(|| "unknown".to_string()),
            context: &context,
        };
        let backtrace = Backtrace::force_capture();

        if let Err(e) = append_crash_log(&report.render(&backtrace)) {
            eprintln!("Failed to write {}: {}", CRASH_LOG, e);
        }

        // worker 线程的 panic 也进入 tracing 输出
        tracing::error!(
            "Panic at {} ({} on {}): {}",
            report.location,
            context.database_path,
            context.bind_address,
            report.message
        );

        match context.mode {
            RunMode::Server => print_server_report(&report, &backtrace),
            RunMode::Cli => {
                eprintln!("geoserve panicked: {}", report.message);
                eprintln!("Details saved to {}", CRASH_LOG);
            }
        }
    }));
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn print_server_report(report: &CrashReport<'_>, backtrace: &Backtrace) {
    eprintln!();
    eprintln!("{}", "geoserve worker panicked".red().bold());
    eprintln!("  {} {}", "reason:  ".yellow(), report.message.white());
    eprintln!("  {} {}", "at:      ".yellow(), report.location.white());
    eprintln!("  {} {}", "listen:  ".yellow(), report.context.bind_address);
    eprintln!("  {} {}", "database:".yellow(), report.context.database_path);
    eprintln!("{}", format!("{:?}", backtrace).dimmed());
    eprintln!("{}", format!("Full report appended to {}", CRASH_LOG).cyan());
    eprintln!();
}

fn append_crash_log(text: &str) -> std::io::Result<()> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(CRASH_LOG)?
        .write_all(text.as_bytes())
}
