//! 参与者名单

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use protocol::{ClientHandle, Player};

/// 名单中的一员：身份 + 可远程调用的句柄
#[derive(Clone)]
pub struct Member {
    pub player: Player,
    pub handle: Arc<dyn ClientHandle>,
}

impl Member {
    pub fn new(player: Player, handle: Arc<dyn ClientHandle>) -> Self {
        Self { player, handle }
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("player", &self.player)
            .field("handle", &self.handle.address())
            .finish()
    }
}

/// 参与者名单
///
/// 进行中的一轮只认 active 成员；中途加入的成员先进入 waiting，下一轮开局时合并。
#[derive(Default)]
pub struct Roster {
    active: BTreeMap<Player, Arc<dyn ClientHandle>>,
    waiting: BTreeMap<Player, Arc<dyn ClientHandle>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入名单，返回是否为新成员
    ///
    /// 已在名单中的身份只更新句柄，位置（active / waiting）不变。
    pub fn add(&mut self, member: Member, wait: bool) -> bool {
        if let Some(handle) = self.active.get_mut(&member.player) {
            *handle = member.handle;
            return false;
        }
        if let Some(handle) = self.waiting.get_mut(&member.player) {
            *handle = member.handle;
            return false;
        }
        if wait {
            self.waiting.insert(member.player, member.handle);
        } else {
            self.active.insert(member.player, member.handle);
        }
        true
    }

    /// 把等待中的成员并入 active，返回并入人数
    pub fn merge_waiting(&mut self) -> usize {
        let count = self.waiting.len();
        self.active.append(&mut self.waiting);
        count
    }

    /// 移除成员
    pub fn remove(&mut self, player: &Player) -> bool {
        self.active.remove(player).is_some() || self.waiting.remove(player).is_some()
    }

    pub fn is_active(&self, player: &Player) -> bool {
        self.active.contains_key(player)
    }

    pub fn contains(&self, player: &Player) -> bool {
        self.active.contains_key(player) || self.waiting.contains_key(player)
    }

    /// 是否有成员使用该地址
    pub fn contains_address(&self, address: &str) -> bool {
        self.players().any(|p| p.address == address)
    }

    pub fn active_players(&self) -> Vec<Player> {
        self.active.keys().cloned().collect()
    }

    pub fn waiting_players(&self) -> Vec<Player> {
        self.waiting.keys().cloned().collect()
    }

    /// 全部成员身份（active 在前）
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.active.keys().chain(self.waiting.keys())
    }

    /// 全部成员（用于广播）
    pub fn members(&self) -> Vec<Member> {
        self.active
            .iter()
            .chain(self.waiting.iter())
            .map(|(player, handle)| Member::new(player.clone(), handle.clone()))
            .collect()
    }

    /// active 成员（用于开局和发送结果）
    pub fn active_members(&self) -> Vec<Member> {
        self.active
            .iter()
            .map(|(player, handle)| Member::new(player.clone(), handle.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.waiting.is_empty()
    }
}
