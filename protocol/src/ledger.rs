//! 累计积分表

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::player::Player;
use crate::round::Round;

/// 跨轮累计的积分表，以玩家身份为键
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    scores: BTreeMap<Player, u32>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入玩家，已存在的玩家保留原积分
    pub fn add_player(&mut self, player: Player) {
        self.scores.entry(player).or_insert(0);
    }

    /// 累加一轮得分
    ///
    /// 只累加仍在表中的玩家；评分期间被移除的玩家不会重新出现。
    pub fn record_round(&mut self, round: &Round) {
        for (player, score) in round.scores() {
            if let Some(total) = self.scores.get_mut(player) {
                *total += score;
            }
        }
    }

    pub fn remove(&mut self, player: &Player) -> Option<u32> {
        self.scores.remove(player)
    }

    pub fn remove_all<'a, I>(&mut self, players: I)
    where
        I: IntoIterator<Item = &'a Player>,
    {
        for player in players {
            self.scores.remove(player);
        }
    }

    pub fn get(&self, player: &Player) -> Option<u32> {
        self.scores.get(player).copied()
    }

    pub fn contains(&self, player: &Player) -> bool {
        self.scores.contains_key(player)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.scores.keys()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn clear(&mut self) {
        self.scores.clear();
    }

    /// 排名：积分降序，同分按名字
    pub fn standings(&self) -> Vec<(Player, u32)> {
        let mut rows: Vec<(Player, u32)> =
            self.scores.iter().map(|(p, s)| (p.clone(), *s)).collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name.cmp(&b.0.name)));
        rows
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (player, score) in self.standings() {
            writeln!(f, "{:<20} {:>5}", player.name, score)?;
        }
        Ok(())
    }
}
