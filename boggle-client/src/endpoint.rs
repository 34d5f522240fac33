//! 客户端端点
//!
//! 每个参与者对应一个端点。主机通过 [`ClientHandle`] 调用它：开局时启动计时，
//! 时间到后把参与者的单词交回主机；结果和积分表交给显示协作者。
//! 远端参与者的端点通过 [`ClientEndpoint::serve`] 在 TCP 上接受调用。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use protocol::{
    ClientHandle, ClientRequest, ClientResponse, Connection, ErrorCode, Grid, HostHandle, Ledger,
    Listener, NetworkConfig, ProtocolError, Round, SessionId, TcpConnection, TcpListener,
};
use tracing::{debug, info, warn};

use crate::display::GameDisplay;
use crate::participant::{lock, Participant};
use crate::timer::ClockTask;

/// 绑定端点监听地址，返回监听器和对外公布的地址
///
/// 未配置公布地址时使用实际监听地址。
pub async fn bind_endpoint(config: &NetworkConfig) -> Result<(TcpListener, String), ProtocolError> {
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    let local = listener
        .local_addr()
        .ok_or_else(|| ProtocolError::MalformedAddress(config.bind_addr()))?;
    let advertised = match &config.advertise {
        Some(host) => match local.rsplit_once(':') {
            Some((_, port)) => format!("{}:{}", host, port),
            None => local.clone(),
        },
        None => local.clone(),
    };
    info!("Endpoint listening on {} (advertised as {})", local, advertised);
    Ok((listener, advertised))
}

/// 客户端端点
pub struct ClientEndpoint {
    participant: Arc<dyn Participant>,
    display: Arc<dyn GameDisplay>,
    host: Mutex<Option<Arc<dyn HostHandle>>>,
    session: Mutex<Option<SessionId>>,
    clock: Mutex<Option<ClockTask>>,
}

impl ClientEndpoint {
    pub fn new(participant: Arc<dyn Participant>, display: Arc<dyn GameDisplay>) -> Self {
        Self {
            participant,
            display,
            host: Mutex::new(None),
            session: Mutex::new(None),
            clock: Mutex::new(None),
        }
    }

    pub fn participant(&self) -> &Arc<dyn Participant> {
        &self.participant
    }

    /// 设置交回结果的主机
    pub fn set_host(&self, host: Arc<dyn HostHandle>) {
        *lock(&self.host) = Some(host);
    }

    /// 当前持有的对局标识
    pub fn session(&self) -> Option<SessionId> {
        lock(&self.session).clone()
    }

    /// 加入成功后记录标识，已经持有时保持不变
    pub fn adopt_session(&self, session: SessionId) {
        lock(&self.session).get_or_insert(session);
    }

    /// 离开对局：清除标识和主机，停止计时
    pub fn reset(&self) {
        *lock(&self.session) = None;
        *lock(&self.host) = None;
        *lock(&self.clock) = None;
        self.participant.abandon_round();
    }

    /// 在 TCP 上接受主机调用，每条连接一个请求
    pub async fn serve(self: Arc<Self>, mut listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok(conn) => {
                    let endpoint = self.clone();
                    tokio::spawn(async move {
                        if let Err(e) = endpoint.serve_connection(conn).await {
                            debug!("Endpoint connection ended: {}", e);
                        }
                    });
                }
                Err(e) => warn!("Accept failed: {}", e),
            }
        }
    }

    async fn serve_connection(&self, mut conn: TcpConnection) -> Result<(), ProtocolError> {
        let request: ClientRequest = conn.recv().await?;
        let response = self.handle_request(request).await;
        conn.send(&response).await
    }

    /// 处理一条主机请求
    pub async fn handle_request(&self, request: ClientRequest) -> ClientResponse {
        let result = match request {
            ClientRequest::StartRound {
                grid,
                duration_secs,
                session,
            } => self.start_round(grid, duration_secs, session).await,
            ClientRequest::DeliverResults { round, ledger } => {
                self.deliver_results(round, ledger).await
            }
            ClientRequest::IsActive { session } => {
                return ClientResponse::Active(self.is_active(session).await.unwrap_or(false));
            }
            ClientRequest::PushLedger { ledger, session } => {
                self.push_ledger(ledger, session).await
            }
        };
        match result {
            Ok(()) => ClientResponse::Ack,
            Err(e) => ClientResponse::Error {
                code: ErrorCode::InternalError,
                message: e.to_string(),
            },
        }
    }
}

/// 时间到：取回单词交给主机
async fn submit_turn(
    participant: Arc<dyn Participant>,
    host: Option<Arc<dyn HostHandle>>,
    display: Arc<dyn GameDisplay>,
    session: SessionId,
) {
    let turn = participant.finish_round();
    let Some(host) = host else {
        warn!("{} has no host to return results to", participant.player());
        return;
    };
    debug!("{} returning {} words", participant.player(), turn.words().len());
    if let Err(e) = host.return_results(session, turn).await {
        display.show_error(&format!("Could not return results: {}", e));
    }
}

#[async_trait]
impl ClientHandle for ClientEndpoint {
    fn address(&self) -> &str {
        &self.participant.player().address
    }

    async fn start_round(
        &self,
        grid: Grid,
        duration_secs: u64,
        session: SessionId,
    ) -> protocol::Result<()> {
        *lock(&self.session) = Some(session.clone());
        self.display.show_board(&grid);
        self.participant.begin_round(&grid);

        let participant = self.participant.clone();
        let host = lock(&self.host).clone();
        let display = self.display.clone();
        let clock = ClockTask::spawn(
            Duration::from_secs(duration_secs),
            self.display.clone(),
            move || submit_turn(participant, host, display, session),
        );
        // 替换时旧计时被取消
        *lock(&self.clock) = Some(clock);
        Ok(())
    }

    async fn deliver_results(&self, round: Round, ledger: Ledger) -> protocol::Result<()> {
        let ours = SessionId::matches(lock(&self.session).as_ref(), round.session());
        if !ours {
            debug!("Ignoring results of {}", round.session());
            return Ok(());
        }
        self.display.show_round_result(&round.summary());
        self.display.show_ledger(&ledger);
        Ok(())
    }

    async fn is_active(&self, session: SessionId) -> protocol::Result<bool> {
        Ok(SessionId::matches(lock(&self.session).as_ref(), &session))
    }

    async fn push_ledger(&self, ledger: Ledger, session: SessionId) -> protocol::Result<()> {
        self.adopt_session(session);
        self.display.show_ledger(&ledger);
        Ok(())
    }
}
