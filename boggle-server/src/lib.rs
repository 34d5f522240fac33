//! Boggle 主机端
//!
//! 包含:
//! - 对局状态机与结果分发
//! - 参与者名单
//! - TCP 主机服务
//! - 主机配置

pub mod config;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod roster;

pub use config::HostConfig;
pub use coordinator::{HostEvent, Phase, RoundCoordinator, Scorer};
pub use error::CoordinatorError;
pub use host::{admit_remote, handle_request, HostService, LocalHost};
pub use roster::{Member, Roster};
