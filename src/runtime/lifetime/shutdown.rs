//! 关闭触发
//!
//! 服务器在以下任一情况下开始优雅关闭：
//! - 收到 SIGINT / SIGTERM / SIGQUIT（Windows 下为 Ctrl+C）
//! - 定期重启计时器到期，由 supervisor 重新拉起以加载新的数据库文件

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::system::platform::{TerminationSignal, wait_for_termination};

/// 关闭原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    Signal(TerminationSignal),
    RestartTimer,
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownCause::Signal(signal) => write!(f, "received {}", signal),
            ShutdownCause::RestartTimer => write!(f, "periodic restart interval elapsed"),
        }
    }
}

/// 将配置的小时数转换为重启间隔（0 = 禁用）
pub fn restart_interval(hours: u64) -> Option<Duration> {
    (hours > 0).then(|| Duration::from_secs(hours.saturating_mul(3600)))
}

/// 等待第一个关闭触发
pub async fn wait_for_shutdown(restart_after: Option<Duration>) -> ShutdownCause {
    let restart_timer = async {
        match restart_after {
            Some(interval) => {
                debug!("Periodic restart scheduled in {:?}", interval);
                tokio::time::sleep(interval).await
            }
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        signal = wait_for_termination() => ShutdownCause::Signal(signal),
        _ = restart_timer => ShutdownCause::RestartTimer,
    }
}
