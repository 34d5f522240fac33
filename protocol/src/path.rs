//! 路径校验
//!
//! 判断一个单词能否沿相邻格（八方向）在棋盘上拼出，且每格至多使用一次。

use crate::grid::{Grid, Position};

/// 已占用格子的位掩码
///
/// 按值传递：每个递归分支拿到自己的副本，兄弟分支互不可见。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellMask(u64);

impl CellMask {
    pub fn is_set(self, index: usize) -> bool {
        self.0 & (1u64 << index) != 0
    }

    #[must_use]
    pub fn with(self, index: usize) -> Self {
        Self(self.0 | (1u64 << index))
    }
}

/// 将单词切分为棋盘符号：大写，"QU" 合并为单个 `'Q'`
///
/// 单独出现的 `Q`（后面不跟 `U`）无法对应任何骰面，返回 `None`。
pub fn tokenize(word: &str) -> Option<Vec<char>> {
    let upper: Vec<char> = word.trim().to_uppercase().chars().collect();
    let mut tokens = Vec::with_capacity(upper.len());
    let mut i = 0;
    while i < upper.len() {
        let c = upper[i];
        if c == 'Q' {
            if upper.get(i + 1) != Some(&'U') {
                return None;
            }
            i += 1;
        }
        tokens.push(c);
        i += 1;
    }
    Some(tokens)
}

/// 棋盘单词校验器
pub struct PathValidator<'a> {
    grid: &'a Grid,
}

impl<'a> PathValidator<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// 单词是否能在棋盘上拼出
    pub fn exists(&self, word: &str) -> bool {
        self.find_path(word).is_some()
    }

    /// 返回拼出单词的一条路径
    pub fn find_path(&self, word: &str) -> Option<Vec<Position>> {
        let tokens = tokenize(word)?;
        if tokens.is_empty() {
            return None;
        }

        for start in self.grid.positions() {
            let mut path = Vec::with_capacity(tokens.len());
            if self.walk(&tokens, start, CellMask::default(), &mut path) {
                return Some(path);
            }
        }
        None
    }

    fn walk(
        &self,
        tokens: &[char],
        pos: Position,
        used: CellMask,
        path: &mut Vec<Position>,
    ) -> bool {
        let index = self.grid.index(pos);
        if used.is_set(index) || self.grid.get(pos) != Some(tokens[0]) {
            return false;
        }

        path.push(pos);
        let rest = &tokens[1..];
        if rest.is_empty() {
            return true;
        }

        let used = used.with(index);
        for next in self.grid.neighbours(pos) {
            if self.walk(rest, next, used, path) {
                return true;
            }
        }

        path.pop();
        false
    }
}
