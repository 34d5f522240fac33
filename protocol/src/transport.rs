//! 传输层抽象
//!
//! 主机与客户端端点之间没有长连接：每次调用新建一条 TCP 连接，
//! 交换一帧请求和一帧响应后关闭。

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{ProtocolError, Result};
use crate::{CALL_TIMEOUT, CONNECT_TIMEOUT, DEFAULT_PORT, MAX_FRAME_SIZE, PROTOCOL_VERSION};

/// 网络配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口，0 表示由系统分配
    pub port: u16,
    /// 告知对端的地址；为空时使用监听到的地址
    pub advertise: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            advertise: None,
        }
    }
}

impl NetworkConfig {
    /// 绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 检查 `host:port` 形式的地址
pub fn validate_address(addr: &str) -> Result<()> {
    let malformed = || ProtocolError::MalformedAddress(addr.to_string());
    let (host, port) = addr.rsplit_once(':').ok_or_else(malformed)?;
    if host.trim().is_empty() || host.contains(char::is_whitespace) {
        return Err(malformed());
    }
    port.parse::<u16>().map_err(|_| malformed())?;
    Ok(())
}

/// 一条连接上的请求/响应
#[async_trait]
pub trait Connection: Send + Sync {
    async fn send<M: Serialize + Send + Sync>(&mut self, msg: &M) -> Result<()>;

    async fn recv<M: DeserializeOwned>(&mut self) -> Result<M>;

    /// 对端地址
    fn peer_addr(&self) -> Option<String>;
}

/// 被调用方的监听端
#[async_trait]
pub trait Listener: Send + Sync + Sized {
    type Conn: Connection;

    async fn bind(addr: &str) -> Result<Self>;

    async fn accept(&mut self) -> Result<Self::Conn>;

    /// 实际绑定的地址（端口 0 时由系统分配）
    fn local_addr(&self) -> Option<String>;
}

/// 一次完整的远程调用
///
/// 建连、发一帧请求、收一帧响应，全程受 [`CALL_TIMEOUT`] 约束。
/// 超时或任何传输错误都意味着对端不可达。
pub async fn call<Req, Resp>(addr: &str, request: &Req) -> Result<Resp>
where
    Req: Serialize + Send + Sync,
    Resp: DeserializeOwned + Send,
{
    let exchange = async {
        let mut conn = TcpConnection::connect(addr).await?;
        conn.send(request).await?;
        conn.recv::<Resp>().await
    };
    let result = timeout(CALL_TIMEOUT, exchange)
        .await
        .map_err(|_| ProtocolError::ConnectionTimeout)?;
    if let Err(e) = &result {
        debug!("Call to {} failed: {}", addr, e);
    }
    result
}

// ============================================================================
// TCP
// ============================================================================

/// 一条 TCP 连接，只承载一次请求和一次响应
pub struct TcpConnection {
    stream: TcpStream,
    peer: Option<String>,
}

impl TcpConnection {
    /// 主动连接，受 [`CONNECT_TIMEOUT`] 约束
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| ProtocolError::ConnectionTimeout)??;
        Self::new(stream)
    }

    pub fn new(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr().ok().map(|a| a.to_string());
        Ok(Self { stream, peer })
    }
}

#[async_trait]
impl Connection for TcpConnection {
    async fn send<M: Serialize + Send + Sync>(&mut self, msg: &M) -> Result<()> {
        write_frame(&mut self.stream, msg).await
    }

    async fn recv<M: DeserializeOwned>(&mut self) -> Result<M> {
        read_frame(&mut self.stream).await
    }

    fn peer_addr(&self) -> Option<String> {
        self.peer.clone()
    }
}

/// TCP 监听端
pub struct TcpListener {
    inner: tokio::net::TcpListener,
}

#[async_trait]
impl Listener for TcpListener {
    type Conn = TcpConnection;

    async fn bind(addr: &str) -> Result<Self> {
        let inner = tokio::net::TcpListener::bind(addr).await?;
        Ok(Self { inner })
    }

    async fn accept(&mut self) -> Result<Self::Conn> {
        let (stream, _) = self.inner.accept().await?;
        TcpConnection::new(stream)
    }

    fn local_addr(&self) -> Option<String> {
        self.inner.local_addr().ok().map(|a| a.to_string())
    }
}

// ============================================================================
// 帧格式: [版本 u8][长度 u32 大端][bincode 负载]
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameHeader {
    length: usize,
}

impl FrameHeader {
    const SIZE: usize = 5;

    fn checked(length: usize) -> Result<Self> {
        if length > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge {
                size: length,
                max: MAX_FRAME_SIZE,
            });
        }
        Ok(Self { length })
    }

    fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut bytes = [PROTOCOL_VERSION; Self::SIZE];
        bytes[1..].copy_from_slice(&(self.length as u32).to_be_bytes());
        bytes
    }

    fn parse(bytes: [u8; Self::SIZE]) -> Result<Self> {
        let [version, len @ ..] = bytes;
        if version != PROTOCOL_VERSION {
            return Err(ProtocolError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                actual: version,
            });
        }
        Self::checked(u32::from_be_bytes(len) as usize)
    }
}

/// 把消息编码成完整的一帧
pub fn encode_frame<M: Serialize>(msg: &M) -> Result<Vec<u8>> {
    let payload = bincode::serialize(msg)?;
    let header = FrameHeader::checked(payload.len())?;
    let mut frame = Vec::with_capacity(FrameHeader::SIZE + payload.len());
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// 写出一帧
pub async fn write_frame<W, M>(writer: &mut W, msg: &M) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
    M: Serialize,
{
    let frame = encode_frame(msg)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// 读入一帧并解码
///
/// 对端在帧中途断开时返回 [`ProtocolError::ConnectionClosed`]。
pub async fn read_frame<R, M>(reader: &mut R) -> Result<M>
where
    R: AsyncRead + Unpin + Send,
    M: DeserializeOwned,
{
    let closed = |e: std::io::Error| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => ProtocolError::ConnectionClosed,
        _ => ProtocolError::Io(e),
    };

    let mut header = [0u8; FrameHeader::SIZE];
    reader.read_exact(&mut header).await.map_err(closed)?;
    let header = FrameHeader::parse(header)?;

    let mut payload = vec![0u8; header.length];
    reader.read_exact(&mut payload).await.map_err(closed)?;
    Ok(bincode::deserialize(&payload)?)
}
