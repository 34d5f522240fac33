//! 消息类型定义
//!
//! 每次远程调用使用一条独立的 TCP 连接：发起方写一帧请求，对端回一帧响应后关闭。

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::ledger::Ledger;
use crate::player::SessionId;
use crate::round::Round;
use crate::turn::Turn;

/// 客户端发给主机的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HostRequest {
    /// 加入对局，`address` 为客户端端点的监听地址
    AddClient { address: String, name: String },
    /// 提交本轮单词
    ReturnResults { session: SessionId, turn: Turn },
    /// 查询某地址是否仍在名单中
    IsClient { address: String },
}

/// 主机的响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HostResponse {
    /// 加入成功，附带当前对局标识
    Joined { session: SessionId },
    /// 提交已接收
    ResultsAccepted,
    /// IsClient 的结果
    IsClient(bool),
    /// 错误
    Error { code: ErrorCode, message: String },
}

/// 主机推送给客户端端点的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientRequest {
    // === 回合 ===
    /// 开始新一轮
    StartRound {
        grid: Grid,
        duration_secs: u64,
        session: SessionId,
    },
    /// 本轮结果与最新积分表
    DeliverResults { round: Round, ledger: Ledger },

    // === 状态 ===
    /// 探测端点是否仍属于该对局
    IsActive { session: SessionId },
    /// 积分表更新（有人加入或离开），附带主机当前的对局标识
    PushLedger { ledger: Ledger, session: SessionId },
}

/// 客户端端点的响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientResponse {
    /// 已处理
    Ack,
    /// IsActive 的结果
    Active(bool),
    /// 错误
    Error { code: ErrorCode, message: String },
}

/// 错误码定义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum ErrorCode {
    // === 地址相关 (1xx) ===
    /// 地址格式错误
    MalformedAddress = 100,
    /// 地址无法解析
    LookupFailed = 101,
    /// 无效昵称
    InvalidName = 102,

    // === 对局相关 (2xx) ===
    /// 不在名单中
    NotInRoster = 200,
    /// 对局标识已过期
    StaleSession = 201,
    /// 评分失败
    ScoringFailed = 202,

    // === 主机相关 (3xx) ===
    /// 主机没有词典
    DictionaryUnavailable = 300,

    // === 系统相关 (5xx) ===
    /// 内部错误
    InternalError = 500,
    /// 超时
    Timeout = 501,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
