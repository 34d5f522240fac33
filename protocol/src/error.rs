//! 错误类型定义

use thiserror::Error;

use crate::message::ErrorCode;

/// 游戏规则与状态错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoggleError {
    /// 棋盘尺寸或字母非法
    #[error("Invalid grid: {reason}")]
    InvalidGrid { reason: String },

    /// 回合尚未评分就读取分类或分数
    #[error("Turn of {player} has not been marked")]
    NotMarked { player: String },

    /// 单词未落入任何分类（评分策略不完整）
    #[error("Word {word} does not fit into any category")]
    Uncategorized { word: String },

    /// 电脑对手强度越界
    #[error("Invalid strength: {0} (expected 0..=999)")]
    InvalidStrength(u16),

    /// 没有可用词典
    #[error("Dictionary unavailable: {reason}")]
    DictionaryUnavailable { reason: String },
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化错误（bincode）
    #[error("Bincode serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// 协议版本不匹配
    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    /// 帧大小超限
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,

    /// 地址格式错误
    #[error("Malformed address: {0}")]
    MalformedAddress(String),

    /// 地址解析失败
    #[error("Could not resolve {0}")]
    LookupFailed(String),

    /// 对端返回错误
    #[error("Remote error {code}: {message}")]
    Remote { code: ErrorCode, message: String },

    /// 对端返回了不匹配的响应
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// 游戏规则错误
    #[error("Game error: {0}")]
    Game(#[from] BoggleError),
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
