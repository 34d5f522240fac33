//! 主机的网络入口
//!
//! [`HostService`] 监听 TCP，把每个 [`HostRequest`] 转给协调器；
//! [`LocalHost`] 让同进程的参与者以同样的接口访问协调器。

use std::sync::Arc;

use async_trait::async_trait;
use protocol::{
    validate_address, Connection, ErrorCode, HostHandle, HostRequest, HostResponse, Listener,
    NetworkConfig, Player, ProtocolError, RemoteClient, SessionId, TcpConnection, TcpListener,
    Turn,
};
use tracing::{debug, info, warn};

use crate::coordinator::RoundCoordinator;

/// 按地址加入一个远端客户端
///
/// 地址先做格式检查，再做一次解析，都通过后才进入名单。
pub async fn admit_remote(
    coordinator: &RoundCoordinator,
    address: &str,
    name: &str,
) -> Result<SessionId, ProtocolError> {
    validate_address(address)?;
    Player::validate_name(name).map_err(|e| ProtocolError::Remote {
        code: ErrorCode::InvalidName,
        message: e.to_string(),
    })?;

    let resolved = tokio::net::lookup_host(address)
        .await
        .map_err(|_| ProtocolError::LookupFailed(address.to_string()))?
        .next();
    if resolved.is_none() {
        return Err(ProtocolError::LookupFailed(address.to_string()));
    }

    let handle = Arc::new(RemoteClient::new(address)?);
    let player = Player::new(name.trim(), address);
    Ok(coordinator.add_client(player, handle).await)
}

/// 处理一条主机请求
pub async fn handle_request(coordinator: &RoundCoordinator, request: HostRequest) -> HostResponse {
    match request {
        HostRequest::AddClient { address, name } => {
            match admit_remote(coordinator, &address, &name).await {
                Ok(session) => HostResponse::Joined { session },
                Err(e) => error_response(e),
            }
        }
        HostRequest::ReturnResults { session, turn } => {
            match coordinator.submit_turn(&session, turn).await {
                Ok(()) => HostResponse::ResultsAccepted,
                Err(e) => HostResponse::Error {
                    code: e.code(),
                    message: e.to_string(),
                },
            }
        }
        HostRequest::IsClient { address } => {
            HostResponse::IsClient(coordinator.is_client(&address).await)
        }
    }
}

fn error_response(error: ProtocolError) -> HostResponse {
    let (code, message) = match error {
        ProtocolError::MalformedAddress(addr) => {
            (ErrorCode::MalformedAddress, format!("Malformed address: {}", addr))
        }
        ProtocolError::LookupFailed(addr) => {
            (ErrorCode::LookupFailed, format!("Could not resolve {}", addr))
        }
        ProtocolError::Remote { code, message } => (code, message),
        other => (ErrorCode::InternalError, other.to_string()),
    };
    HostResponse::Error { code, message }
}

/// TCP 主机服务
pub struct HostService {
    coordinator: Arc<RoundCoordinator>,
    listener: TcpListener,
    local_addr: String,
}

impl HostService {
    /// 绑定监听地址
    pub async fn bind(
        coordinator: Arc<RoundCoordinator>,
        config: &NetworkConfig,
    ) -> Result<Self, ProtocolError> {
        let listener = TcpListener::bind(&config.bind_addr()).await?;
        Self::new(coordinator, listener)
    }

    /// 使用已绑定的监听器
    pub fn new(
        coordinator: Arc<RoundCoordinator>,
        listener: TcpListener,
    ) -> Result<Self, ProtocolError> {
        let local_addr = listener
            .local_addr()
            .ok_or_else(|| ProtocolError::MalformedAddress("unbound listener".to_string()))?;
        info!("Host listening on {}", local_addr);
        Ok(Self {
            coordinator,
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> &str {
        &self.local_addr
    }

    /// 接受连接，每条连接处理一个请求
    pub async fn run(mut self) {
        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let coordinator = self.coordinator.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(&coordinator, conn).await {
                            debug!("Host connection ended: {}", e);
                        }
                    });
                }
                Err(e) => warn!("Accept failed: {}", e),
            }
        }
    }
}

async fn serve_connection(
    coordinator: &RoundCoordinator,
    mut conn: TcpConnection,
) -> Result<(), ProtocolError> {
    let request: HostRequest = conn.recv().await?;
    debug!("Host request from {:?}: {:?}", conn.peer_addr(), request_kind(&request));
    let response = handle_request(coordinator, request).await;
    conn.send(&response).await
}

fn request_kind(request: &HostRequest) -> &'static str {
    match request {
        HostRequest::AddClient { .. } => "AddClient",
        HostRequest::ReturnResults { .. } => "ReturnResults",
        HostRequest::IsClient { .. } => "IsClient",
    }
}

/// 进程内访问协调器的主机句柄
#[derive(Clone)]
pub struct LocalHost {
    coordinator: Arc<RoundCoordinator>,
}

impl LocalHost {
    pub fn new(coordinator: Arc<RoundCoordinator>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Arc<RoundCoordinator> {
        &self.coordinator
    }
}

#[async_trait]
impl HostHandle for LocalHost {
    async fn add_client(&self, address: &str, name: &str) -> Result<SessionId, ProtocolError> {
        admit_remote(&self.coordinator, address, name).await
    }

    async fn return_results(&self, session: SessionId, turn: Turn) -> Result<(), ProtocolError> {
        self.coordinator
            .submit_turn(&session, turn)
            .await
            .map_err(|e| ProtocolError::Remote {
                code: e.code(),
                message: e.to_string(),
            })
    }

    async fn is_client(&self, address: &str) -> Result<bool, ProtocolError> {
        Ok(self.coordinator.is_client(address).await)
    }
}
