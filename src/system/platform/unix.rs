//! Unix/Linux platform implementation
//!
//! - systemd socket activation (`LISTEN_PID` / `LISTEN_FDS`)
//! - SIGINT / SIGTERM / SIGQUIT via tokio signal streams

use std::net::TcpListener;
use std::os::unix::io::{FromRawFd, RawFd};

use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};

use super::TerminationSignal;

/// systemd 传入的第一个描述符
const SD_LISTEN_FDS_START: RawFd = 3;

/// Parse `LISTEN_PID` / `LISTEN_FDS` and return the number of inherited
/// descriptors meant for `pid`.
///
/// Returns 0 when the variables are absent, malformed, or addressed to
/// another process.
pub fn activated_fd_count(
    listen_pid: Option<&str>,
    listen_fds: Option<&str>,
    pid: u32,
) -> usize {
    let Some(target) = listen_pid.and_then(|p| p.trim().parse::<u32>().ok()) else {
        return 0;
    };
    if target != pid {
        debug!("LISTEN_PID {} is not ours ({}), ignoring", target, pid);
        return 0;
    }

    listen_fds
        .and_then(|n| n.trim().parse::<usize>().ok())
        .unwrap_or(0)
}

/// Take ownership of the listening sockets passed in by the service manager.
///
/// Returns an empty list if the process was not socket-activated.
/// The environment variables are left untouched.
pub fn take_activated_listeners() -> std::io::Result<Vec<TcpListener>> {
    let listen_pid = std::env::var("LISTEN_PID").ok();
    let listen_fds = std::env::var("LISTEN_FDS").ok();

    let count = activated_fd_count(
        listen_pid.as_deref(),
        listen_fds.as_deref(),
        std::process::id(),
    );

    let mut listeners = Vec::with_capacity(count);
    for offset in 0..count {
        let fd = SD_LISTEN_FDS_START + offset as RawFd;
        // SAFETY: LISTEN_PID 指向本进程时，systemd 保证 3..3+LISTEN_FDS 是交给我们的监听 socket，
        // 且只在这里被接管一次
        let listener = unsafe { TcpListener::from_raw_fd(fd) };
        listener.set_nonblocking(true)?;
        info!("Using socket-activated listener on fd {}", fd);
        listeners.push(listener);
    }

    Ok(listeners)
}

/// Wait for SIGINT, SIGTERM or SIGQUIT.
///
/// If a handler cannot be installed that signal is skipped; if none can be
/// installed this never resolves.
pub async fn wait_for_termination() -> TerminationSignal {
    let mut interrupt = install(SignalKind::interrupt(), "SIGINT");
    let mut terminate = install(SignalKind::terminate(), "SIGTERM");
    let mut quit = install(SignalKind::quit(), "SIGQUIT");

    tokio::select! {
        Some(_) = recv(&mut interrupt) => TerminationSignal::Interrupt,
        Some(_) = recv(&mut terminate) => TerminationSignal::Terminate,
        Some(_) = recv(&mut quit) => TerminationSignal::Quit,
        else => std::future::pending().await,
    }
}

fn install(kind: SignalKind, name: &str) -> Option<tokio::signal::unix::Signal> {
    match signal(kind) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!("Failed to install {} handler: {}", name, e);
            None
        }
    }
}

async fn recv(stream: &mut Option<tokio::signal::unix::Signal>) -> Option<()> {
    match stream {
        Some(s) => s.recv().await,
        None => std::future::pending().await,
    }
}
