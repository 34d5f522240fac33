//! 节点：一个进程中的主机或客户端角色
//!
//! 作为主机时运行协调器和 TCP 主机服务，本地玩家和电脑对手以进程内端点加入；
//! 作为客户端时在 TCP 上开放端点，再向远端主机报名。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use boggle_ai::AiConfig;
use boggle_server::{HostEvent, HostService, LocalHost, RoundCoordinator};
use protocol::{
    validate_address, ClientHandle, Dictionary, HostHandle, NetworkConfig, Player, RemoteHost,
    SessionId,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::NodeConfig;
use crate::display::{GameDisplay, NullDisplay};
use crate::endpoint::{bind_endpoint, ClientEndpoint};
use crate::input::WordBuffer;
use crate::participant::{lock, ComputerParticipant, HumanParticipant};

/// 节点操作错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("Cannot host a game without a dictionary")]
    NoDictionary,

    #[error("Not hosting a game")]
    NotHosting,

    #[error("Already hosting a game")]
    AlreadyHosting,

    #[error("Joining {0} was cancelled")]
    JoinCancelled(String),
}

struct Hosting {
    coordinator: Arc<RoundCoordinator>,
    address: String,
    tasks: Vec<JoinHandle<()>>,
    endpoints: Vec<Arc<ClientEndpoint>>,
    computers: usize,
}

impl Drop for Hosting {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        // 端点持有指向协调器的主机句柄，清掉以断开引用环
        for endpoint in &self.endpoints {
            endpoint.reset();
        }
    }
}

struct Joined {
    host: Arc<RemoteHost>,
    endpoint: Arc<ClientEndpoint>,
    server: JoinHandle<()>,
}

impl Drop for Joined {
    fn drop(&mut self) {
        self.server.abort();
        self.endpoint.reset();
    }
}

enum Role {
    Idle,
    Connecting { address: String, attempt: u64 },
    Hosting(Hosting),
    Client(Joined),
}

/// 连接监视器看到的快照
#[derive(Clone)]
pub enum Link {
    Idle,
    Connecting {
        address: String,
    },
    Hosting {
        coordinator: Arc<RoundCoordinator>,
    },
    Client {
        host: Arc<RemoteHost>,
        endpoint_address: String,
    },
}

/// 节点
pub struct Node {
    config: NodeConfig,
    dictionary: Option<Arc<Dictionary>>,
    display: Arc<dyn GameDisplay>,
    words: Arc<WordBuffer>,
    role: Mutex<Role>,
    attempts: AtomicU64,
}

impl Node {
    /// 创建节点并载入词典
    ///
    /// 词典载入失败时只报告错误，节点仍可作为客户端加入别人的对局。
    pub fn new(config: NodeConfig, display: Arc<dyn GameDisplay>) -> Self {
        let dictionary = config.dictionary.as_ref().and_then(|path| {
            match Dictionary::load(path) {
                Ok(dictionary) => Some(Arc::new(dictionary)),
                Err(e) => {
                    display.show_error(&format!("{}; hosting is disabled", e));
                    None
                }
            }
        });
        Self::with_dictionary(config, dictionary, display)
    }

    pub fn with_dictionary(
        config: NodeConfig,
        dictionary: Option<Arc<Dictionary>>,
        display: Arc<dyn GameDisplay>,
    ) -> Self {
        Self {
            config,
            dictionary,
            display,
            words: Arc::new(WordBuffer::new()),
            role: Mutex::new(Role::Idle),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// 本地玩家的单词输入
    pub fn words(&self) -> &Arc<WordBuffer> {
        &self.words
    }

    pub fn display(&self) -> &Arc<dyn GameDisplay> {
        &self.display
    }

    /// 作为主机时的协调器
    pub fn coordinator(&self) -> Option<Arc<RoundCoordinator>> {
        match &*lock(&self.role) {
            Role::Hosting(hosting) => Some(hosting.coordinator.clone()),
            _ => None,
        }
    }

    pub fn link(&self) -> Link {
        match &*lock(&self.role) {
            Role::Idle => Link::Idle,
            Role::Connecting { address, .. } => Link::Connecting {
                address: address.clone(),
            },
            Role::Hosting(hosting) => Link::Hosting {
                coordinator: hosting.coordinator.clone(),
            },
            Role::Client(joined) => Link::Client {
                host: joined.host.clone(),
                endpoint_address: joined.endpoint.address().to_string(),
            },
        }
    }

    // ========================================================================
    // 主机
    // ========================================================================

    /// 开始主持对局，返回主机地址
    pub async fn host_game(&self) -> Result<String> {
        let dictionary = self.dictionary.clone().ok_or(NodeError::NoDictionary)?;
        if matches!(&*lock(&self.role), Role::Hosting(_)) {
            return Err(NodeError::AlreadyHosting.into());
        }
        self.leave();

        let (listener, address) = bind_endpoint(&self.config.network)
            .await
            .context("无法绑定主机地址")?;
        let (coordinator, events) =
            RoundCoordinator::new(self.config.host.clone(), dictionary, address.clone());
        let coordinator = Arc::new(coordinator);
        let service = HostService::new(coordinator.clone(), listener)?;
        let tasks = vec![
            tokio::spawn(service.run()),
            tokio::spawn(forward_events(events, self.display.clone())),
        ];

        let player = Player::new(self.config.name.clone(), address.clone());
        let participant = Arc::new(HumanParticipant::new(player.clone(), self.words.clone()));
        let endpoint = Arc::new(ClientEndpoint::new(participant, self.display.clone()));
        endpoint.set_host(Arc::new(LocalHost::new(coordinator.clone())));

        *lock(&self.role) = Role::Hosting(Hosting {
            coordinator: coordinator.clone(),
            address: address.clone(),
            tasks,
            endpoints: vec![endpoint.clone()],
            computers: 0,
        });

        let session = coordinator.add_client(player, endpoint.clone()).await;
        endpoint.adopt_session(session);
        info!("Hosting on {}", address);
        self.display.show_message(&format!("Hosting a game on {}", address));
        Ok(address)
    }

    /// 开始新一轮（仅主机）
    pub async fn start_round(&self) -> Result<SessionId> {
        let coordinator = self.coordinator().ok_or(NodeError::NotHosting)?;
        Ok(coordinator.start_round().await)
    }

    /// 加入一个电脑对手（仅主机）
    pub async fn add_computer_opponent(&self, strength: u16) -> Result<Player> {
        let config = AiConfig::from_strength(strength)?;
        let dictionary = self.dictionary.clone().ok_or(NodeError::NoDictionary)?;

        let (coordinator, address, number) = match &mut *lock(&self.role) {
            Role::Hosting(hosting) => {
                hosting.computers += 1;
                (hosting.coordinator.clone(), hosting.address.clone(), hosting.computers)
            }
            _ => return Err(NodeError::NotHosting.into()),
        };

        // 电脑对手不监听端口，用主机地址加编号区分
        let player = Player::new(
            format!("Computer {} ({})", number, strength),
            format!("{}/computer-{}", address, number),
        );
        let participant = Arc::new(ComputerParticipant::new(player.clone(), config, dictionary));
        let endpoint = Arc::new(ClientEndpoint::new(participant, Arc::new(NullDisplay)));
        endpoint.set_host(Arc::new(LocalHost::new(coordinator.clone())));
        if let Role::Hosting(hosting) = &mut *lock(&self.role) {
            hosting.endpoints.push(endpoint.clone());
        }

        let session = coordinator.add_client(player.clone(), endpoint.clone()).await;
        endpoint.adopt_session(session);
        Ok(player)
    }

    // ========================================================================
    // 客户端
    // ========================================================================

    /// 加入远端主机，返回当前对局标识
    pub async fn join_game(&self, address: &str) -> Result<SessionId> {
        validate_address(address)?;
        self.leave();

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.role) = Role::Connecting {
            address: address.to_string(),
            attempt,
        };
        self.display.show_message(&format!("Joining {}", address));

        let outcome = self.connect(address).await;

        let mut role = lock(&self.role);
        let current = matches!(&*role, Role::Connecting { attempt: a, .. } if *a == attempt);
        match outcome {
            Ok((joined, session)) if current => {
                *role = Role::Client(joined);
                drop(role);
                info!("Joined {} as {}", address, self.config.name);
                self.display.show_message(&format!("Joined the game at {}", address));
                Ok(session)
            }
            Ok(_) => Err(NodeError::JoinCancelled(address.to_string()).into()),
            Err(e) => {
                if current {
                    *role = Role::Idle;
                }
                drop(role);
                self.display.show_error(&format!("{:#}", e));
                Err(e)
            }
        }
    }

    async fn connect(&self, address: &str) -> Result<(Joined, SessionId)> {
        let host = Arc::new(RemoteHost::new(address)?);
        let network = NetworkConfig {
            port: self.config.client_port,
            ..self.config.network.clone()
        };
        let (listener, endpoint_address) = bind_endpoint(&network)
            .await
            .context("无法绑定客户端端点")?;

        let player = Player::new(self.config.name.clone(), endpoint_address.clone());
        let participant = Arc::new(HumanParticipant::new(player, self.words.clone()));
        let endpoint = Arc::new(ClientEndpoint::new(participant, self.display.clone()));
        endpoint.set_host(host.clone());

        // 报名前先开始监听，主机在加入时就会推送积分表
        let server = tokio::spawn(endpoint.clone().serve(listener));
        let joined = Joined {
            host: host.clone(),
            endpoint: endpoint.clone(),
            server,
        };

        let session = host
            .add_client(&endpoint_address, &self.config.name)
            .await
            .with_context(|| format!("Could not join {}", address))?;
        endpoint.adopt_session(session.clone());
        Ok((joined, session))
    }

    /// 主机不再承认本端点时调用
    ///
    /// 只有仍连着同一主机时才断开。
    pub fn host_lost(&self, host: &RemoteHost) {
        let mut role = lock(&self.role);
        if let Role::Client(joined) = &*role {
            if joined.host.address() == host.address() {
                warn!("Lost host {}", host.address());
                *role = Role::Idle;
            }
        }
    }

    /// 离开当前角色
    pub fn leave(&self) {
        let previous = std::mem::replace(&mut *lock(&self.role), Role::Idle);
        match previous {
            Role::Idle => {}
            Role::Connecting { address, .. } => info!("Stopped joining {}", address),
            Role::Hosting(hosting) => info!("Stopped hosting on {}", hosting.address),
            Role::Client(joined) => info!("Left host {}", joined.host.address()),
        }
    }
}

async fn forward_events(mut events: mpsc::UnboundedReceiver<HostEvent>, display: Arc<dyn GameDisplay>) {
    while let Some(event) = events.recv().await {
        match event {
            HostEvent::Info(text) => display.show_message(&text),
            HostEvent::Problem(text) => display.show_error(&text),
        }
    }
}
