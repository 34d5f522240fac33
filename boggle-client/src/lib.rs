//! Boggle 客户端
//!
//! 一个进程可以主持对局（同时作为本地玩家参与），也可以加入别人的对局。
//! 界面通过 [`GameDisplay`] 与 [`WordSource`] 两个协作者接入。

pub mod config;
pub mod display;
pub mod endpoint;
pub mod input;
pub mod node;
pub mod participant;
pub mod prefs;
pub mod supervisor;
pub mod timer;

pub use config::NodeConfig;
pub use display::{ConnectionStatus, GameDisplay, NullDisplay, TracingDisplay};
pub use endpoint::{bind_endpoint, ClientEndpoint};
pub use input::{WordBuffer, WordSource};
pub use node::{Link, Node, NodeError};
pub use participant::{ComputerParticipant, HumanParticipant, Participant};
pub use prefs::Preferences;
pub use supervisor::ConnectionSupervisor;
pub use timer::{ClockTask, RoundClock};
