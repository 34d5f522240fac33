//! 显示接口
//!
//! 核心逻辑只通过 [`GameDisplay`] 输出，具体界面由外部实现。

use std::fmt;
use std::time::Duration;

use protocol::{Grid, Ledger, RoundSummary};
use tracing::{info, warn};

/// 连接状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// 未连接
    #[default]
    Disconnected,
    /// 作为主机，附带名单人数
    Hosting { clients: usize },
    /// 作为客户端已连接
    ConnectedAsClient { address: String },
    /// 正在连接，`dots` 在 0..=3 之间循环
    Connecting { address: String, dots: u8 },
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Not connected"),
            ConnectionStatus::Hosting { clients } => {
                write!(f, "Hosting ({} player{})", clients, if *clients == 1 { "" } else { "s" })
            }
            ConnectionStatus::ConnectedAsClient { address } => write!(f, "Connected to {}", address),
            ConnectionStatus::Connecting { address, dots } => {
                write!(f, "Connecting to {}{}", address, ".".repeat(*dots as usize))
            }
        }
    }
}

/// 显示协作者
pub trait GameDisplay: Send + Sync {
    fn show_board(&self, grid: &Grid);
    fn show_timer(&self, elapsed: Duration, max: Duration);
    fn show_connection_status(&self, status: &ConnectionStatus);
    fn show_round_result(&self, summary: &RoundSummary);
    fn show_ledger(&self, ledger: &Ledger);
    fn show_message(&self, text: &str);
    fn show_error(&self, text: &str);
}

/// 通过 tracing 输出的默认实现
#[derive(Debug, Default)]
pub struct TracingDisplay;

impl GameDisplay for TracingDisplay {
    fn show_board(&self, grid: &Grid) {
        info!("New board:\n{}", grid);
    }

    fn show_timer(&self, elapsed: Duration, max: Duration) {
        // 只在整 10 秒报一次
        let secs = elapsed.as_secs();
        if elapsed.subsec_millis() < 100 && secs % 10 == 0 && secs > 0 {
            info!("{}s left", max.saturating_sub(elapsed).as_secs());
        }
    }

    fn show_connection_status(&self, status: &ConnectionStatus) {
        tracing::debug!("{}", status);
    }

    fn show_round_result(&self, summary: &RoundSummary) {
        info!("Round over\n{}", summary);
    }

    fn show_ledger(&self, ledger: &Ledger) {
        if ledger.is_empty() {
            info!("Scores cleared");
        } else {
            info!("Scores\n{}", ledger);
        }
    }

    fn show_message(&self, text: &str) {
        info!("{}", text);
    }

    fn show_error(&self, text: &str) {
        warn!("{}", text);
    }
}

/// 什么也不显示（电脑对手使用）
#[derive(Debug, Default)]
pub struct NullDisplay;

impl GameDisplay for NullDisplay {
    fn show_board(&self, _grid: &Grid) {}
    fn show_timer(&self, _elapsed: Duration, _max: Duration) {}
    fn show_connection_status(&self, _status: &ConnectionStatus) {}
    fn show_round_result(&self, _summary: &RoundSummary) {}
    fn show_ledger(&self, _ledger: &Ledger) {}
    fn show_message(&self, _text: &str) {}
    fn show_error(&self, _text: &str) {}
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(ConnectionStatus::Disconnected.to_string(), "Not connected");
        assert_eq!(ConnectionStatus::Hosting { clients: 1 }.to_string(), "Hosting (1 player)");
        assert_eq!(ConnectionStatus::Hosting { clients: 3 }.to_string(), "Hosting (3 players)");
        let connecting = ConnectionStatus::Connecting {
            address: "10.0.0.2:9527".to_string(),
            dots: 3,
        };
        assert_eq!(connecting.to_string(), "Connecting to 10.0.0.2:9527...");
    }
}
