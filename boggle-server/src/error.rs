//! 主机端错误类型

use protocol::{BoggleError, ErrorCode, Player, SessionId};
use thiserror::Error;

/// 对局协调错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinatorError {
    /// 提交不属于当前进行中的一轮
    #[error("Session {0} is not the round in progress")]
    StaleSession(SessionId),

    /// 提交者不在名单中（或本轮尚未加入）
    #[error("{0} is not an active member of this game")]
    NotInRoster(Player),

    /// 评分失败
    #[error("Scoring failed: {0}")]
    Scoring(#[from] BoggleError),
}

impl CoordinatorError {
    /// 对应的协议错误码
    pub fn code(&self) -> ErrorCode {
        match self {
            CoordinatorError::StaleSession(_) => ErrorCode::StaleSession,
            CoordinatorError::NotInRoster(_) => ErrorCode::NotInRoster,
            CoordinatorError::Scoring(_) => ErrorCode::ScoringFailed,
        }
    }
}
