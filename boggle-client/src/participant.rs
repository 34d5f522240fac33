//! 参与者：人类玩家与电脑对手
//!
//! 端点只关心两件事：一轮开始时通知参与者，一轮结束时取回它的 [`Turn`]。

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use boggle_ai::{AiConfig, ComputerOpponent};
use protocol::{Dictionary, Grid, Player, Turn};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::input::WordSource;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 一轮中的参与者
pub trait Participant: Send + Sync {
    fn player(&self) -> &Player;

    /// 新一轮开始
    fn begin_round(&self, grid: &Grid);

    /// 时间到，交出本轮单词
    fn finish_round(&self) -> Turn;

    /// 离开对局，放弃进行中的一轮
    fn abandon_round(&self) {}
}

/// 人类玩家：单词来自输入协作者
pub struct HumanParticipant {
    player: Player,
    words: Arc<dyn WordSource>,
}

impl HumanParticipant {
    pub fn new(player: Player, words: Arc<dyn WordSource>) -> Self {
        Self { player, words }
    }
}

impl Participant for HumanParticipant {
    fn player(&self) -> &Player {
        &self.player
    }

    fn begin_round(&self, _grid: &Grid) {
        self.words.clear();
    }

    fn finish_round(&self) -> Turn {
        Turn::new(self.player.clone(), self.words.submitted_words())
    }
}

/// 正在进行的搜索
///
/// 每轮一个单词集合。上一轮的线程停下之前写入的单词只落在它自己的集合里。
struct Search {
    stop: Arc<AtomicBool>,
    found: Arc<Mutex<BTreeSet<String>>>,
    task: JoinHandle<usize>,
}

impl Search {
    fn stop(self) -> Arc<Mutex<BTreeSet<String>>> {
        self.stop.store(true, Ordering::Relaxed);
        // 阻塞线程会在下一个单词前看到停止标志，不必等待
        drop(self.task);
        self.found
    }
}

/// 电脑对手：在后台线程搜索，找到的单词随时记下
pub struct ComputerParticipant {
    player: Player,
    opponent: ComputerOpponent,
    dictionary: Arc<Dictionary>,
    search: Mutex<Option<Search>>,
}

impl ComputerParticipant {
    pub fn new(player: Player, config: AiConfig, dictionary: Arc<Dictionary>) -> Self {
        Self {
            player,
            opponent: ComputerOpponent::new(config),
            dictionary,
            search: Mutex::new(None),
        }
    }

    pub fn opponent(&self) -> &ComputerOpponent {
        &self.opponent
    }

    /// 本轮目前找到的单词
    pub fn found_words(&self) -> BTreeSet<String> {
        match lock(&self.search).as_ref() {
            Some(search) => lock(&search.found).clone(),
            None => BTreeSet::new(),
        }
    }

    /// 停止搜索，返回这一轮的单词集合
    fn stop_search(&self) -> Option<Arc<Mutex<BTreeSet<String>>>> {
        lock(&self.search).take().map(Search::stop)
    }
}

impl Participant for ComputerParticipant {
    fn player(&self) -> &Player {
        &self.player
    }

    fn begin_round(&self, grid: &Grid) {
        self.stop_search();

        let stop = Arc::new(AtomicBool::new(false));
        let found = Arc::new(Mutex::new(BTreeSet::new()));
        let opponent = self.opponent.clone();
        let dictionary = self.dictionary.clone();
        let grid = grid.clone();
        let flag = stop.clone();
        let words = found.clone();

        let task = tokio::task::spawn_blocking(move || {
            let mut rng = opponent.rng();
            opponent.think(&grid, &dictionary, &mut rng, &flag, |word| {
                lock(&words).insert(word);
            })
        });
        debug!("{} started searching", self.player);
        *lock(&self.search) = Some(Search { stop, found, task });
    }

    fn finish_round(&self) -> Turn {
        let words = match self.stop_search() {
            Some(found) => lock(&found).clone(),
            None => BTreeSet::new(),
        };
        Turn::new(self.player.clone(), words)
    }

    fn abandon_round(&self) {
        self.stop_search();
    }
}

impl Drop for ComputerParticipant {
    fn drop(&mut self) {
        self.stop_search();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::WordBuffer;
    use std::time::Duration;

    fn sample_grid() -> Grid {
        Grid::from_rows(&["ONEL", "DUBL", "FCOW", "UNKY"]).unwrap()
    }

    #[test]
    fn test_human_turn_from_buffer() {
        let buffer = Arc::new(WordBuffer::new());
        buffer.push("stale");
        let human = HumanParticipant::new(Player::new("Ann", "127.0.0.1:1"), buffer.clone());

        human.begin_round(&sample_grid());
        buffer.push("cow one");
        let turn = human.finish_round();

        assert_eq!(turn.owner().name, "Ann");
        assert_eq!(turn.words().len(), 2);
        assert!(turn.words().contains("COW"));
    }

    #[tokio::test]
    async fn test_computer_finds_words() {
        let dictionary = Arc::new(Dictionary::from_words(["cow", "one", "funky", "bell"]));
        let config = AiConfig::from_strength(999).unwrap();
        let computer = ComputerParticipant::new(
            Player::new("Computer 1 (999)", "127.0.0.1:1"),
            AiConfig { seed: Some(7), ..config },
            dictionary,
        );

        computer.begin_round(&sample_grid());
        // 最强对手不停顿，3 字母单词必定接受
        for _ in 0..100 {
            if computer.found_words().len() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let turn = computer.finish_round();
        assert!(turn.words().contains("COW"));
        assert!(turn.words().contains("ONE"));
    }

    #[tokio::test]
    async fn test_computer_restarts_each_round() {
        let dictionary = Arc::new(Dictionary::from_words(["cow"]));
        let computer = ComputerParticipant::new(
            Player::new("Computer 1 (999)", "127.0.0.1:1"),
            AiConfig::default(),
            dictionary,
        );

        computer.begin_round(&sample_grid());
        let previous = lock(&computer.search).as_ref().map(|s| s.found.clone()).unwrap();

        computer.begin_round(&Grid::from_rows(&["ABC", "DEF", "GHI"]).unwrap());
        // 上一轮的线程停下之前又写入一个单词
        lock(&previous).insert("stale".to_string());

        let turn = computer.finish_round();
        assert!(!turn.words().contains("STALE"));
        assert!(!turn.words().contains("COW"));
        assert!(computer.found_words().is_empty());
    }
}
