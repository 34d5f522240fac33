//! 参与者身份与对局标识

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_NAME_LEN;

/// 参与者身份：显示名 + 网络地址
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub address: String,
}

impl Player {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// 验证玩家名
    pub fn validate_name(name: &str) -> Result<(), &'static str> {
        if name.trim().is_empty() {
            return Err("Name is empty");
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err("Name is too long");
        }
        Ok(())
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.address)
    }
}

/// 一轮对局的标识：主机地址 + 每轮随机 id
///
/// 客户端在收到开局或加入成功后记录它，用来确认推送是否属于当前对局。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId {
    host: String,
    nonce: u64,
}

impl SessionId {
    /// 为主机生成新的标识
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            nonce: rand::random(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// 客户端持有的标识是否与探测的标识一致
    ///
    /// 尚未加入任何对局（`None`）时一律不匹配。
    pub fn matches(current: Option<&SessionId>, probe: &SessionId) -> bool {
        current == Some(probe)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:016x}", self.host, self.nonce)
    }
}
