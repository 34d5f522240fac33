//! 对局协调（主机端）
//!
//! 状态机：`Idle → InProgress → Scoring → Idle`。
//! 所有决定（是否发送结果、名单增删）都在同一把锁内做出，网络调用在释放锁之后进行。

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use protocol::{
    BoggleError, ClientHandle, Dictionary, Grid, Ledger, Player, Round, RoundScorer, SessionId,
    Turn, CALL_TIMEOUT, PROBE_TIMEOUT,
};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::HostConfig;
use crate::error::CoordinatorError;
use crate::roster::{Member, Roster};

/// 对局阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 没有进行中的一轮
    Idle,
    /// 等待各成员提交
    InProgress,
    /// 已评分，正在发送结果
    Scoring,
}

/// 给主机操作者的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Info(String),
    Problem(String),
}

/// 一轮的评分方式
pub trait Scorer: Send + Sync {
    fn mark(&self, session: SessionId, grid: Grid, turns: Vec<Turn>) -> Result<Round, BoggleError>;
}

impl Scorer for RoundScorer {
    fn mark(&self, session: SessionId, grid: Grid, turns: Vec<Turn>) -> Result<Round, BoggleError> {
        RoundScorer::mark(self, session, grid, turns)
    }
}

struct CoordinatorState {
    phase: Phase,
    roster: Roster,
    ledger: Ledger,
    session: SessionId,
    grid: Option<Grid>,
    /// 本轮已收到的提交，按提交者
    turns: HashMap<Player, Turn>,
    results_sent: bool,
}

/// 对局协调器
pub struct RoundCoordinator {
    config: HostConfig,
    scorer: Arc<dyn Scorer>,
    host_address: String,
    state: Mutex<CoordinatorState>,
    /// 开局与巡检互斥，巡检不会拿新一轮的标识去问还没收到开局的成员
    round_gate: Mutex<()>,
    events: mpsc::UnboundedSender<HostEvent>,
}

impl RoundCoordinator {
    /// 创建协调器，同时返回操作者通知的接收端
    pub fn new(
        config: HostConfig,
        dictionary: Arc<Dictionary>,
        host_address: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        Self::with_scorer(config, Arc::new(RoundScorer::new(dictionary)), host_address)
    }

    /// 使用指定评分方式创建协调器
    pub fn with_scorer(
        config: HostConfig,
        scorer: Arc<dyn Scorer>,
        host_address: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let host_address = host_address.into();
        let (events, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            config,
            scorer,
            state: Mutex::new(CoordinatorState {
                phase: Phase::Idle,
                roster: Roster::new(),
                ledger: Ledger::new(),
                session: SessionId::new(host_address.clone()),
                grid: None,
                turns: HashMap::new(),
                results_sent: false,
            }),
            host_address,
            round_gate: Mutex::new(()),
            events,
        };
        (coordinator, rx)
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn host_address(&self) -> &str {
        &self.host_address
    }

    fn notify(&self, event: HostEvent) {
        // 没人接收时直接丢弃
        let _ = self.events.send(event);
    }

    // ========================================================================
    // 名单
    // ========================================================================

    /// 加入参与者，返回当前对局标识
    ///
    /// 一轮进行中加入的成员要等到下一轮才参与。
    pub async fn add_client(&self, player: Player, handle: Arc<dyn ClientHandle>) -> SessionId {
        let (session, is_new, waiting) = {
            let mut st = self.state.lock().await;
            let waiting = st.phase == Phase::InProgress;
            let is_new = st.roster.add(Member::new(player.clone(), handle), waiting);
            st.ledger.add_player(player.clone());
            (st.session.clone(), is_new, waiting)
        };

        if is_new {
            info!("{} joined{}", player, if waiting { " (waiting for next round)" } else { "" });
            let suffix = if waiting { ", playing from the next round" } else { "" };
            self.notify(HostEvent::Info(format!("{} has joined the game{}", player.name, suffix)));
        }

        let failed = self.push_ledger_to_all().await;
        self.prune(failed).await;
        session
    }

    /// 移除参与者
    ///
    /// 名单与积分表同时移除，然后向其余成员重发积分表，并重新检查是否可以发送结果。
    pub async fn remove_clients(&self, players: Vec<Player>) {
        self.prune(players).await;
    }

    /// 地址是否在名单中
    pub async fn is_client(&self, address: &str) -> bool {
        self.state.lock().await.roster.contains_address(address)
    }

    /// 探测所有成员，移除不可达或已转去别的对局的成员
    pub async fn supervise_clients(&self) {
        let _gate = self.round_gate.lock().await;
        let (session, members) = {
            let st = self.state.lock().await;
            (st.session.clone(), st.roster.members())
        };

        let failed = fan_out("probe", PROBE_TIMEOUT, members, move |handle| {
            let session = session.clone();
            async move { handle.is_active(session).await }
        })
        .await;
        self.prune(failed).await;
        self.check_results_send().await;
    }

    // ========================================================================
    // 回合
    // ========================================================================

    /// 掷骰开始新一轮
    pub async fn start_round(&self) -> SessionId {
        let grid = self.config.dice.roll(&mut rand::thread_rng());
        self.start_round_with_grid(grid).await
    }

    /// 用指定棋盘开始新一轮
    ///
    /// 上一轮未发送的结果作废。等待中的成员在此并入。
    pub async fn start_round_with_grid(&self, grid: Grid) -> SessionId {
        let _gate = self.round_gate.lock().await;
        let (session, members) = {
            let mut st = self.state.lock().await;
            let merged = st.roster.merge_waiting();
            if merged > 0 {
                debug!("{} waiting clients merged", merged);
            }
            if st.phase == Phase::InProgress && !st.results_sent {
                debug!("Round {} superseded", st.session);
            }
            st.session = SessionId::new(self.host_address.clone());
            st.grid = Some(grid.clone());
            st.turns.clear();
            st.results_sent = false;
            st.phase = Phase::InProgress;
            (st.session.clone(), st.roster.active_members())
        };

        info!("Round {} started with {} players", session, members.len());

        let duration_secs = self.config.round_secs;
        let round_session = session.clone();
        let failed = fan_out("start round", CALL_TIMEOUT, members, move |handle| {
            let grid = grid.clone();
            let session = round_session.clone();
            async move {
                handle
                    .start_round(grid, duration_secs, session)
                    .await
                    .map(|_| true)
            }
        })
        .await;
        self.prune(failed).await;
        session
    }

    /// 接收一个成员的提交
    ///
    /// 只接受当前进行中一轮的提交，且提交者必须是 active 成员；重复提交覆盖之前的。
    pub async fn submit_turn(&self, session: &SessionId, turn: Turn) -> Result<(), CoordinatorError> {
        {
            let mut st = self.state.lock().await;
            if st.phase != Phase::InProgress || st.session != *session {
                debug!("Stale turn from {} for {}", turn.owner(), session);
                return Err(CoordinatorError::StaleSession(session.clone()));
            }
            if !st.roster.is_active(turn.owner()) {
                return Err(CoordinatorError::NotInRoster(turn.owner().clone()));
            }
            debug!("Turn from {} ({} words)", turn.owner(), turn.words().len());
            st.turns.insert(turn.owner().clone(), turn);
        }

        self.check_results_send().await;
        Ok(())
    }

    /// 所有 active 成员都已提交时评分并发送结果
    ///
    /// 可重复、可并发调用，每轮结果只发送一次。返回本次调用是否发送了结果。
    pub async fn check_results_send(&self) -> bool {
        let (sent, failed) = self.try_send_results().await;
        self.prune(failed).await;
        sent
    }

    async fn try_send_results(&self) -> (bool, Vec<Player>) {
        let (round, ledger, members) = {
            let mut st = self.state.lock().await;
            if st.phase != Phase::InProgress || st.results_sent {
                return (false, Vec::new());
            }
            let active = st.roster.active_players();
            if active.is_empty() || !active.iter().all(|p| st.turns.contains_key(p)) {
                return (false, Vec::new());
            }
            let Some(grid) = st.grid.clone() else {
                return (false, Vec::new());
            };

            st.results_sent = true;
            st.phase = Phase::Scoring;
            let turns: Vec<Turn> = active.iter().filter_map(|p| st.turns.get(p).cloned()).collect();
            let marked = self.scorer.mark(st.session.clone(), grid, turns);
            match marked {
                Ok(round) => {
                    st.ledger.record_round(&round);
                    (round, st.ledger.clone(), st.roster.members())
                }
                Err(e) => {
                    st.phase = Phase::Idle;
                    error!("Round {} could not be scored: {}", st.session, e);
                    self.notify(HostEvent::Problem(format!("Could not score the round: {}", e)));
                    return (false, Vec::new());
                }
            }
        };

        let session = round.session().clone();
        info!("Round {} scored, sending results to {} clients", session, members.len());

        let failed = fan_out("deliver results", CALL_TIMEOUT, members, move |handle| {
            let round = round.clone();
            let ledger = ledger.clone();
            async move { handle.deliver_results(round, ledger).await.map(|_| true) }
        })
        .await;

        {
            let mut st = self.state.lock().await;
            if st.session == session && st.phase == Phase::Scoring {
                st.phase = Phase::Idle;
            }
        }
        (true, failed)
    }

    async fn push_ledger_to_all(&self) -> Vec<Player> {
        let (ledger, session, members) = {
            let st = self.state.lock().await;
            (st.ledger.clone(), st.session.clone(), st.roster.members())
        };
        fan_out("push ledger", CALL_TIMEOUT, members, move |handle| {
            let ledger = ledger.clone();
            let session = session.clone();
            async move { handle.push_ledger(ledger, session).await.map(|_| true) }
        })
        .await
    }

    /// 移除失败的成员，直到一次广播不再产生新的失败
    async fn prune(&self, mut failed: Vec<Player>) {
        while !failed.is_empty() {
            let removed: Vec<Player> = {
                let mut st = self.state.lock().await;
                let removed: Vec<Player> = failed.drain(..).filter(|p| st.roster.remove(p)).collect();
                st.ledger.remove_all(&removed);
                for player in &removed {
                    st.turns.remove(player);
                }
                removed
            };
            if removed.is_empty() {
                break;
            }

            for player in &removed {
                warn!("Removed client {}", player);
                self.notify(HostEvent::Info(format!("{} has left the game", player.name)));
            }

            failed = self.push_ledger_to_all().await;
            let (_, more) = self.try_send_results().await;
            failed.extend(more);
        }
    }

    // ========================================================================
    // 快照
    // ========================================================================

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    pub async fn session(&self) -> SessionId {
        self.state.lock().await.session.clone()
    }

    pub async fn grid(&self) -> Option<Grid> {
        self.state.lock().await.grid.clone()
    }

    pub async fn ledger(&self) -> Ledger {
        self.state.lock().await.ledger.clone()
    }

    /// 全部成员身份
    pub async fn roster(&self) -> Vec<Player> {
        self.state.lock().await.roster.players().cloned().collect()
    }

    pub async fn active_players(&self) -> Vec<Player> {
        self.state.lock().await.roster.active_players()
    }

    pub async fn waiting_players(&self) -> Vec<Player> {
        self.state.lock().await.roster.waiting_players()
    }
}

/// 并发调用每个成员，返回失败（出错、超时或回答 false）的成员
async fn fan_out<F, Fut>(
    what: &'static str,
    limit: Duration,
    members: Vec<Member>,
    call: F,
) -> Vec<Player>
where
    F: Fn(Arc<dyn ClientHandle>) -> Fut,
    Fut: Future<Output = protocol::Result<bool>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for member in members {
        let fut = call(member.handle.clone());
        let player = member.player;
        tasks.spawn(async move { (player, timeout(limit, fut).await) });
    }

    let mut failed = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(Ok(true)))) => {}
            Ok((player, Ok(Ok(false)))) => {
                debug!("{}: {} is no longer in this game", what, player);
                failed.push(player);
            }
            Ok((player, Ok(Err(e)))) => {
                warn!("{}: {} unreachable: {}", what, player, e);
                failed.push(player);
            }
            Ok((player, Err(_))) => {
                warn!("{}: {} timed out", what, player);
                failed.push(player);
            }
            Err(e) => error!("{} task failed: {}", what, e),
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use protocol::{ProtocolError, Round};

    /// 记录调用次数的进程内端点
    struct FakeClient {
        address: String,
        session: std::sync::Mutex<Option<SessionId>>,
        offline: AtomicBool,
        /// 探测永不返回
        hung: AtomicBool,
        starts: AtomicUsize,
        results: AtomicUsize,
        ledgers: AtomicUsize,
        last_round: std::sync::Mutex<Option<Round>>,
    }

    impl FakeClient {
        fn new(port: u16) -> Arc<Self> {
            Arc::new(Self {
                address: format!("127.0.0.1:{}", port),
                session: std::sync::Mutex::new(None),
                offline: AtomicBool::new(false),
                hung: AtomicBool::new(false),
                starts: AtomicUsize::new(0),
                results: AtomicUsize::new(0),
                ledgers: AtomicUsize::new(0),
                last_round: std::sync::Mutex::new(None),
            })
        }

        fn check(&self) -> protocol::Result<()> {
            if self.offline.load(Ordering::SeqCst) {
                Err(ProtocolError::ConnectionClosed)
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ClientHandle for FakeClient {
        fn address(&self) -> &str {
            &self.address
        }

        async fn start_round(&self, _grid: Grid, _secs: u64, session: SessionId) -> protocol::Result<()> {
            self.check()?;
            *self.session.lock().unwrap() = Some(session);
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn deliver_results(&self, round: Round, _ledger: Ledger) -> protocol::Result<()> {
            self.check()?;
            self.results.fetch_add(1, Ordering::SeqCst);
            *self.last_round.lock().unwrap() = Some(round);
            Ok(())
        }

        async fn is_active(&self, session: SessionId) -> protocol::Result<bool> {
            self.check()?;
            if self.hung.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            Ok(SessionId::matches(self.session.lock().unwrap().as_ref(), &session))
        }

        async fn push_ledger(&self, _ledger: Ledger, session: SessionId) -> protocol::Result<()> {
            self.check()?;
            self.session.lock().unwrap().get_or_insert(session);
            self.ledgers.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn sample_grid() -> Grid {
        Grid::from_rows(&["ONEL", "DUBL", "FCOW", "UNKY"]).unwrap()
    }

    fn coordinator() -> (RoundCoordinator, mpsc::UnboundedReceiver<HostEvent>) {
        let dictionary = Dictionary::from_words(["one", "cow", "funky", "double", "bell"]);
        RoundCoordinator::new(HostConfig::default(), Arc::new(dictionary), "127.0.0.1:9527")
    }

    async fn join(c: &RoundCoordinator, name: &str, port: u16) -> (Player, Arc<FakeClient>) {
        let client = FakeClient::new(port);
        let player = Player::new(name, client.address.clone());
        c.add_client(player.clone(), client.clone()).await;
        (player, client)
    }

    async fn assert_roster_matches_ledger(c: &RoundCoordinator) {
        let roster: BTreeSet<Player> = c.roster().await.into_iter().collect();
        let ledger: BTreeSet<Player> = c.ledger().await.players().cloned().collect();
        assert_eq!(roster, ledger);
    }

    #[tokio::test]
    async fn test_add_client() {
        let (c, mut events) = coordinator();
        let client = FakeClient::new(1);
        let player = Player::new("Ann", client.address.clone());

        let session = c.add_client(player.clone(), client.clone()).await;
        assert_eq!(session, c.session().await);
        assert_eq!(c.active_players().await, vec![player.clone()]);
        assert_eq!(c.ledger().await.get(&player), Some(0));
        assert_eq!(client.ledgers.load(Ordering::SeqCst), 1);
        assert!(c.is_client("127.0.0.1:1").await);
        assert!(!c.is_client("127.0.0.1:2").await);
        assert!(matches!(events.try_recv(), Ok(HostEvent::Info(_))));
    }

    #[tokio::test]
    async fn test_full_round() {
        let (c, _events) = coordinator();
        let (a, client_a) = join(&c, "Ann", 1).await;
        let (b, client_b) = join(&c, "Bob", 2).await;

        let session = c.start_round_with_grid(sample_grid()).await;
        assert_eq!(c.phase().await, Phase::InProgress);
        assert_eq!(client_a.starts.load(Ordering::SeqCst), 1);
        assert_eq!(client_b.starts.load(Ordering::SeqCst), 1);

        c.submit_turn(&session, Turn::new(a.clone(), ["cow", "funky"])).await.unwrap();
        assert_eq!(client_a.results.load(Ordering::SeqCst), 0);
        c.submit_turn(&session, Turn::new(b.clone(), ["cow", "one"])).await.unwrap();

        assert_eq!(c.phase().await, Phase::Idle);
        assert_eq!(client_a.results.load(Ordering::SeqCst), 1);
        assert_eq!(client_b.results.load(Ordering::SeqCst), 1);

        let ledger = c.ledger().await;
        assert_eq!(ledger.get(&a), Some(2));
        assert_eq!(ledger.get(&b), Some(1));

        let round = client_a.last_round.lock().unwrap().clone().unwrap();
        assert_eq!(round.session(), &session);
        assert!(round.words_in(protocol::WordCategory::Duplicate).contains("COW"));
    }

    #[tokio::test]
    async fn test_results_sent_exactly_once() {
        let (c, _events) = coordinator();
        let (a, client_a) = join(&c, "Ann", 1).await;
        let (b, client_b) = join(&c, "Bob", 2).await;
        let session = c.start_round_with_grid(sample_grid()).await;

        let (ra, rb) = tokio::join!(
            c.submit_turn(&session, Turn::new(a, ["one"])),
            c.submit_turn(&session, Turn::new(b, ["cow"])),
        );
        ra.unwrap();
        rb.unwrap();

        let (first, second) = tokio::join!(c.check_results_send(), c.check_results_send());
        assert!(!first && !second);
        assert!(!c.check_results_send().await);
        assert_eq!(client_a.results.load(Ordering::SeqCst), 1);
        assert_eq!(client_b.results.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_turns() {
        let (c, _events) = coordinator();
        let (a, _client) = join(&c, "Ann", 1).await;

        // 没有进行中的一轮
        let idle_session = c.session().await;
        assert!(matches!(
            c.submit_turn(&idle_session, Turn::new(a.clone(), ["cow"])).await,
            Err(CoordinatorError::StaleSession(_))
        ));

        let old = c.start_round_with_grid(sample_grid()).await;
        let current = c.start_round_with_grid(sample_grid()).await;
        assert_ne!(old, current);

        let err = c.submit_turn(&old, Turn::new(a.clone(), ["cow"])).await.unwrap_err();
        assert_eq!(err.code(), protocol::ErrorCode::StaleSession);

        let stranger = Player::new("Eve", "127.0.0.1:66");
        let err = c.submit_turn(&current, Turn::new(stranger, ["cow"])).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::NotInRoster(_)));
    }

    #[tokio::test]
    async fn test_resubmission_replaces_turn() {
        let (c, _events) = coordinator();
        let (a, _ca) = join(&c, "Ann", 1).await;
        let (b, _cb) = join(&c, "Bob", 2).await;
        let session = c.start_round_with_grid(sample_grid()).await;

        c.submit_turn(&session, Turn::new(a.clone(), ["cow"])).await.unwrap();
        c.submit_turn(&session, Turn::new(a.clone(), ["double"])).await.unwrap();
        c.submit_turn(&session, Turn::new(b.clone(), ["cow"])).await.unwrap();

        let ledger = c.ledger().await;
        assert_eq!(ledger.get(&a), Some(3));
        assert_eq!(ledger.get(&b), Some(1));
    }

    #[tokio::test]
    async fn test_mid_round_joiner_waits() {
        let (c, _events) = coordinator();
        let (a, client_a) = join(&c, "Ann", 1).await;
        let session = c.start_round_with_grid(sample_grid()).await;

        let (late, client_late) = join(&c, "Late", 3).await;
        assert_eq!(c.waiting_players().await, vec![late.clone()]);
        assert_eq!(client_late.starts.load(Ordering::SeqCst), 0);
        // 中途加入的成员也拿到当前标识，巡检不会误删
        assert!(SessionId::matches(client_late.session.lock().unwrap().as_ref(), &session));

        // 等待中的成员不能提交，也不阻塞结果
        assert!(c.submit_turn(&session, Turn::new(late.clone(), ["one"])).await.is_err());
        c.submit_turn(&session, Turn::new(a.clone(), ["one"])).await.unwrap();
        assert_eq!(client_a.results.load(Ordering::SeqCst), 1);
        assert_eq!(client_late.results.load(Ordering::SeqCst), 1);

        c.start_round_with_grid(sample_grid()).await;
        assert!(c.waiting_players().await.is_empty());
        assert_eq!(client_late.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_push_prunes_only_that_client() {
        let (c, mut events) = coordinator();
        let (a, client_a) = join(&c, "Ann", 1).await;
        let (b, client_b) = join(&c, "Bob", 2).await;
        while events.try_recv().is_ok() {}

        client_b.offline.store(true, Ordering::SeqCst);
        let session = c.start_round_with_grid(sample_grid()).await;

        assert_eq!(client_a.starts.load(Ordering::SeqCst), 1);
        assert_eq!(c.roster().await, vec![a.clone()]);
        assert!(!c.ledger().await.contains(&b));
        assert_roster_matches_ledger(&c).await;
        assert_eq!(events.try_recv(), Ok(HostEvent::Info("Bob has left the game".to_string())));

        // 剩下的成员照常完成一轮
        c.submit_turn(&session, Turn::new(a, ["funky"])).await.unwrap();
        assert_eq!(client_a.results.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_removing_last_holdout_sends_results() {
        let (c, _events) = coordinator();
        let (a, client_a) = join(&c, "Ann", 1).await;
        let (b, _client_b) = join(&c, "Bob", 2).await;
        let session = c.start_round_with_grid(sample_grid()).await;

        c.submit_turn(&session, Turn::new(a.clone(), ["one"])).await.unwrap();
        assert_eq!(client_a.results.load(Ordering::SeqCst), 0);

        c.remove_clients(vec![b]).await;
        assert_eq!(client_a.results.load(Ordering::SeqCst), 1);
        assert_eq!(c.ledger().await.get(&a), Some(1));
        assert_roster_matches_ledger(&c).await;
    }

    #[tokio::test]
    async fn test_supervise_prunes_inactive_clients() {
        let (c, _events) = coordinator();
        let (a, _client_a) = join(&c, "Ann", 1).await;
        let (b, client_b) = join(&c, "Bob", 2).await;
        let (d, client_d) = join(&c, "Dan", 4).await;
        c.start_round_with_grid(sample_grid()).await;

        // Bob 转去了别的对局，Dan 掉线
        *client_b.session.lock().unwrap() = Some(SessionId::new("elsewhere:1"));
        client_d.offline.store(true, Ordering::SeqCst);

        c.supervise_clients().await;
        assert_eq!(c.roster().await, vec![a]);
        assert!(!c.ledger().await.contains(&b));
        assert!(!c.ledger().await.contains(&d));
        assert_roster_matches_ledger(&c).await;
    }

    #[tokio::test]
    async fn test_empty_roster_never_scores() {
        let (c, _events) = coordinator();
        c.start_round_with_grid(sample_grid()).await;
        assert!(!c.check_results_send().await);
        assert_eq!(c.phase().await, Phase::InProgress);
    }

    /// 总是失败的评分
    struct BrokenScorer;

    impl Scorer for BrokenScorer {
        fn mark(&self, _session: SessionId, _grid: Grid, _turns: Vec<Turn>) -> Result<Round, BoggleError> {
            Err(BoggleError::Uncategorized { word: "COW".to_string() })
        }
    }

    #[tokio::test]
    async fn test_scoring_failure_aborts_only_the_round() {
        let (c, mut events) =
            RoundCoordinator::with_scorer(HostConfig::default(), Arc::new(BrokenScorer), "127.0.0.1:9527");
        let (a, client_a) = join(&c, "Ann", 1).await;
        while events.try_recv().is_ok() {}
        let before = c.ledger().await;

        let session = c.start_round_with_grid(sample_grid()).await;
        c.submit_turn(&session, Turn::new(a.clone(), ["cow"])).await.unwrap();

        assert_eq!(c.phase().await, Phase::Idle);
        assert_eq!(c.ledger().await, before);
        assert_eq!(client_a.results.load(Ordering::SeqCst), 0);
        assert!(matches!(events.try_recv(), Ok(HostEvent::Problem(_))));
        // 成员保留，下一轮照常开始
        assert_eq!(c.roster().await, vec![a]);
        c.start_round_with_grid(sample_grid()).await;
        assert_eq!(c.phase().await, Phase::InProgress);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_client_does_not_stall_supervision() {
        let (c, _events) = coordinator();
        let (a, _client_a) = join(&c, "Ann", 1).await;
        let (_b, client_b) = join(&c, "Bob", 2).await;
        c.start_round_with_grid(sample_grid()).await;

        client_b.hung.store(true, Ordering::SeqCst);
        let started = tokio::time::Instant::now();
        c.supervise_clients().await;

        let elapsed = started.elapsed();
        assert!(elapsed >= PROBE_TIMEOUT);
        assert!(elapsed < CALL_TIMEOUT);
        assert_eq!(c.roster().await, vec![a]);
        assert_roster_matches_ledger(&c).await;
    }
}
