//! 节点配置
//!
//! 从环境变量读取，玩家名缺省时取偏好设置。

use std::path::PathBuf;

use anyhow::{Context, Result};
use boggle_server::HostConfig;
use protocol::{NetworkConfig, DEFAULT_PORT};

use crate::prefs::Preferences;

/// 节点配置
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// 玩家名
    pub name: String,
    /// 监听地址（主机服务使用其端口）
    pub network: NetworkConfig,
    /// 作为客户端时端点的监听端口，0 表示由系统分配
    pub client_port: u16,
    /// 词典文件
    pub dictionary: Option<PathBuf>,
    /// 作为主机时的规则配置
    pub host: HostConfig,
    /// 启动后立即加入的主机地址
    pub join: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            network: NetworkConfig::default(),
            client_port: 0,
            dictionary: None,
            host: HostConfig::default(),
            join: None,
        }
    }
}

impl NodeConfig {
    /// 从进程环境变量读取
    pub fn from_env(prefs: &Preferences) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), prefs)
    }

    /// 从任意键值来源读取
    ///
    /// 支持的键：`BOGGLE_NAME`、`BOGGLE_HOST`、`BOGGLE_PORT`、`BOGGLE_CLIENT_PORT`、
    /// `BOGGLE_ADVERTISE`、`BOGGLE_DICTIONARY`、`BOGGLE_CONFIG`（主机规则 JSON 文件）、
    /// `BOGGLE_JOIN`。
    pub fn from_lookup<F>(lookup: F, prefs: &Preferences) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("BOGGLE_NAME").or_else(|| prefs.player_name.clone()) {
            config.name = name;
        }
        if let Some(host) = lookup("BOGGLE_HOST") {
            config.network.host = host;
        }
        config.network.port = match lookup("BOGGLE_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("BOGGLE_PORT is not a port number: {}", port))?,
            None => DEFAULT_PORT,
        };
        if let Some(port) = lookup("BOGGLE_CLIENT_PORT") {
            config.client_port = port
                .parse()
                .with_context(|| format!("BOGGLE_CLIENT_PORT is not a port number: {}", port))?;
        }
        config.network.advertise = lookup("BOGGLE_ADVERTISE");
        config.dictionary = lookup("BOGGLE_DICTIONARY").map(PathBuf::from);
        if let Some(path) = lookup("BOGGLE_CONFIG") {
            config.host = HostConfig::load(&path)?;
        }
        config.join = lookup("BOGGLE_JOIN");

        protocol::Player::validate_name(&config.name)
            .map_err(|e| anyhow::anyhow!("Invalid player name {:?}: {}", config.name, e))?;
        Ok(config)
    }
}
