//! 连接监视
//!
//! 每秒检查一次：作为主机时清理不可达的客户端；作为客户端时询问主机是否仍承认自己。
//! 检查结果通过 [`GameDisplay::show_connection_status`] 显示。

use std::sync::Arc;

use protocol::{HostHandle, Ledger, SUPERVISOR_INTERVAL};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::display::{ConnectionStatus, GameDisplay};
use crate::node::{Link, Node};

/// 连接监视器
pub struct ConnectionSupervisor {
    node: Arc<Node>,
    display: Arc<dyn GameDisplay>,
    dots: u8,
    connected: bool,
}

impl ConnectionSupervisor {
    pub fn new(node: Arc<Node>) -> Self {
        let display = node.display().clone();
        Self {
            node,
            display,
            dots: 0,
            connected: false,
        }
    }

    /// 后台运行
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(SUPERVISOR_INTERVAL);
        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// 检查一次并刷新显示
    pub async fn tick(&mut self) -> ConnectionStatus {
        let status = match self.node.link() {
            Link::Idle => ConnectionStatus::Disconnected,
            Link::Connecting { address } => {
                self.dots = (self.dots + 1) % 4;
                ConnectionStatus::Connecting {
                    address,
                    dots: self.dots,
                }
            }
            Link::Hosting { coordinator } => {
                coordinator.supervise_clients().await;
                ConnectionStatus::Hosting {
                    clients: coordinator.roster().await.len(),
                }
            }
            Link::Client {
                host,
                endpoint_address,
            } => match host.is_client(&endpoint_address).await {
                Ok(true) => ConnectionStatus::ConnectedAsClient {
                    address: host.address().to_string(),
                },
                Ok(false) => {
                    self.display
                        .show_error(&format!("{} no longer lists this player", host.address()));
                    self.node.host_lost(&host);
                    ConnectionStatus::Disconnected
                }
                Err(e) => {
                    warn!("Host {} unreachable: {}", host.address(), e);
                    self.display
                        .show_error(&format!("Lost connection to {}", host.address()));
                    self.node.host_lost(&host);
                    ConnectionStatus::Disconnected
                }
            },
        };

        let connected = matches!(
            status,
            ConnectionStatus::Hosting { .. } | ConnectionStatus::ConnectedAsClient { .. }
        );
        if self.connected && !connected {
            debug!("Connection dropped, clearing scores");
            self.display.show_ledger(&Ledger::new());
        }
        if !matches!(status, ConnectionStatus::Connecting { .. }) {
            self.dots = 0;
        }
        self.connected = connected;

        self.display.show_connection_status(&status);
        status
    }
}
