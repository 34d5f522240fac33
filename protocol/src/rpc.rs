//! 远程调用句柄
//!
//! 主机与客户端端点互相持有对方的句柄。进程内参与者直接实现 trait，
//! 远端参与者通过 [`RemoteClient`] / [`RemoteHost`] 走 TCP。

use async_trait::async_trait;

use crate::error::{ProtocolError, Result};
use crate::grid::Grid;
use crate::ledger::Ledger;
use crate::message::{ClientRequest, ClientResponse, HostRequest, HostResponse};
use crate::player::SessionId;
use crate::round::Round;
use crate::transport::{call, validate_address};
use crate::turn::Turn;

/// 主机可调用的客户端端点
#[async_trait]
pub trait ClientHandle: Send + Sync {
    /// 端点地址（名单中的身份之一）
    fn address(&self) -> &str;

    /// 开始新一轮
    async fn start_round(&self, grid: Grid, duration_secs: u64, session: SessionId) -> Result<()>;

    /// 推送本轮结果与积分表
    async fn deliver_results(&self, round: Round, ledger: Ledger) -> Result<()>;

    /// 端点是否仍属于该对局
    async fn is_active(&self, session: SessionId) -> Result<bool>;

    /// 推送积分表
    ///
    /// 尚未持有对局标识的端点以 `session` 为准，用于刚加入、还没收到加入响应的情况。
    async fn push_ledger(&self, ledger: Ledger, session: SessionId) -> Result<()>;
}

/// 客户端可调用的主机
#[async_trait]
pub trait HostHandle: Send + Sync {
    /// 加入对局，返回当前对局标识
    async fn add_client(&self, address: &str, name: &str) -> Result<SessionId>;

    /// 提交本轮单词
    async fn return_results(&self, session: SessionId, turn: Turn) -> Result<()>;

    /// 地址是否在名单中
    async fn is_client(&self, address: &str) -> Result<bool>;
}

/// 通过 TCP 访问的客户端端点
#[derive(Debug, Clone)]
pub struct RemoteClient {
    address: String,
}

impl RemoteClient {
    pub fn new(address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        validate_address(&address)?;
        Ok(Self { address })
    }

    async fn request(&self, request: ClientRequest) -> Result<ClientResponse> {
        match call(&self.address, &request).await? {
            ClientResponse::Error { code, message } => Err(ProtocolError::Remote { code, message }),
            other => Ok(other),
        }
    }

    async fn expect_ack(&self, request: ClientRequest) -> Result<()> {
        match self.request(request).await? {
            ClientResponse::Ack => Ok(()),
            other => Err(ProtocolError::UnexpectedResponse(format!("{:?}", other))),
        }
    }
}

#[async_trait]
impl ClientHandle for RemoteClient {
    fn address(&self) -> &str {
        &self.address
    }

    async fn start_round(&self, grid: Grid, duration_secs: u64, session: SessionId) -> Result<()> {
        self.expect_ack(ClientRequest::StartRound {
            grid,
            duration_secs,
            session,
        })
        .await
    }

    async fn deliver_results(&self, round: Round, ledger: Ledger) -> Result<()> {
        self.expect_ack(ClientRequest::DeliverResults { round, ledger })
            .await
    }

    async fn is_active(&self, session: SessionId) -> Result<bool> {
        match self.request(ClientRequest::IsActive { session }).await? {
            ClientResponse::Active(active) => Ok(active),
            other => Err(ProtocolError::UnexpectedResponse(format!("{:?}", other))),
        }
    }

    async fn push_ledger(&self, ledger: Ledger, session: SessionId) -> Result<()> {
        self.expect_ack(ClientRequest::PushLedger { ledger, session })
            .await
    }
}

/// 通过 TCP 访问的主机
#[derive(Debug, Clone)]
pub struct RemoteHost {
    address: String,
}

impl RemoteHost {
    pub fn new(address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        validate_address(&address)?;
        Ok(Self { address })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn request(&self, request: HostRequest) -> Result<HostResponse> {
        match call(&self.address, &request).await? {
            HostResponse::Error { code, message } => Err(ProtocolError::Remote { code, message }),
            other => Ok(other),
        }
    }
}

#[async_trait]
impl HostHandle for RemoteHost {
    async fn add_client(&self, address: &str, name: &str) -> Result<SessionId> {
        let request = HostRequest::AddClient {
            address: address.to_string(),
            name: name.to_string(),
        };
        match self.request(request).await? {
            HostResponse::Joined { session } => Ok(session),
            other => Err(ProtocolError::UnexpectedResponse(format!("{:?}", other))),
        }
    }

    async fn return_results(&self, session: SessionId, turn: Turn) -> Result<()> {
        match self.request(HostRequest::ReturnResults { session, turn }).await? {
            HostResponse::ResultsAccepted => Ok(()),
            other => Err(ProtocolError::UnexpectedResponse(format!("{:?}", other))),
        }
    }

    async fn is_client(&self, address: &str) -> Result<bool> {
        let request = HostRequest::IsClient {
            address: address.to_string(),
        };
        match self.request(request).await? {
            HostResponse::IsClient(known) => Ok(known),
            other => Err(ProtocolError::UnexpectedResponse(format!("{:?}", other))),
        }
    }
}
