//! 协议常量定义

use std::time::Duration;

/// 协议版本号
pub const PROTOCOL_VERSION: u8 = 1;

/// 默认主机端口
pub const DEFAULT_PORT: u16 = 9527;

/// 消息帧最大大小（一轮结果连同全部单词可能较大）
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// 玩家名最大长度
pub const MAX_NAME_LEN: usize = 32;

/// 单词最短有效长度
pub const MIN_WORD_LENGTH: usize = 3;

/// 支持的最大棋盘边长（占用位掩码 64 位）
pub const MAX_SIDE: usize = 8;

/// 默认每轮时长（秒）
pub const DEFAULT_ROUND_SECS: u64 = 180;

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 5;

/// 单次远程调用超时（秒）- 超时即视为对端不可达
pub const CALL_TIMEOUT_SECS: u64 = 10;

/// 巡检探测超时（毫秒）- 巡检期间不能开局，比普通调用短
pub const PROBE_TIMEOUT_MS: u64 = 2000;

/// 连接监视间隔（毫秒）
pub const SUPERVISOR_INTERVAL_MS: u64 = 1000;

/// 计时器刷新间隔（毫秒）
pub const TIMER_TICK_MS: u64 = 100;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);

/// 远程调用超时 Duration
pub const CALL_TIMEOUT: Duration = Duration::from_secs(CALL_TIMEOUT_SECS);

/// 巡检探测超时 Duration
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(PROBE_TIMEOUT_MS);

/// 连接监视间隔 Duration
pub const SUPERVISOR_INTERVAL: Duration = Duration::from_millis(SUPERVISOR_INTERVAL_MS);

/// 计时器刷新间隔 Duration
pub const TIMER_TICK: Duration = Duration::from_millis(TIMER_TICK_MS);
