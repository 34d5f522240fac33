//! Boggle 共享协议库
//!
//! 包含:
//! - 棋盘、骰子、词典等核心数据结构
//! - 路径校验与一轮的评分规则
//! - 累计积分表
//! - 消息类型定义 (HostRequest, ClientRequest 及其响应)
//! - 传输层抽象 (Connection, Listener traits) 与一次一帧的远程调用
//! - 远程调用句柄 (HostHandle, ClientHandle)

mod constants;
mod dice;
mod dictionary;
mod error;
mod grid;
mod ledger;
mod message;
mod path;
mod player;
mod round;
mod rpc;
mod transport;
mod turn;

pub use constants::*;
pub use dice::DiceSet;
pub use dictionary::Dictionary;
pub use error::{BoggleError, ProtocolError, Result};
pub use grid::{Grid, Position};
pub use ledger::Ledger;
pub use message::{ClientRequest, ClientResponse, ErrorCode, HostRequest, HostResponse};
pub use path::{tokenize, CellMask, PathValidator};
pub use player::{Player, SessionId};
pub use round::{Round, RoundScorer, RoundSummary, SummaryEntry};
pub use rpc::{ClientHandle, HostHandle, RemoteClient, RemoteHost};
pub use transport::{
    call, encode_frame, read_frame, validate_address, write_frame, Connection, Listener,
    NetworkConfig, TcpConnection, TcpListener,
};
pub use turn::{is_too_short, word_score, Marking, Turn, WordCategory};
