//! 单词搜索引擎
//!
//! 从每一格出发做深度优先搜索，沿途检查当前前缀是否为词典中的单词。

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use protocol::{CellMask, Dictionary, Grid, Position, MIN_WORD_LENGTH};

/// 在棋盘上枚举词典单词
pub struct SearchEngine<'a> {
    grid: &'a Grid,
    dictionary: &'a Dictionary,
    /// 最长单词（按字母数，"QU" 计为 2）
    max_len: usize,
}

impl<'a> SearchEngine<'a> {
    pub fn new(grid: &'a Grid, dictionary: &'a Dictionary, max_len: usize) -> Self {
        Self {
            grid,
            dictionary,
            max_len,
        }
    }

    /// 按遍历顺序逐个回调找到的单词
    ///
    /// 回调返回 `ControlFlow::Break` 时立即停止搜索。同一单词经不同路径
    /// 可能被回调多次。
    pub fn for_each_word<F>(&self, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(&str) -> ControlFlow<()>,
    {
        let mut word = String::with_capacity(self.max_len + 1);
        for start in self.grid.positions() {
            self.walk(start, CellMask::default(), &mut word, &mut visit)?;
        }
        ControlFlow::Continue(())
    }

    /// 收集全部单词（可能重复）
    pub fn find_all(&self) -> Vec<String> {
        let mut words = Vec::new();
        let _ = self.for_each_word(|w| {
            words.push(w.to_string());
            ControlFlow::Continue(())
        });
        words
    }

    /// 去重后的单词
    pub fn distinct_words(&self) -> BTreeSet<String> {
        self.find_all().into_iter().collect()
    }

    fn walk<F>(&self, pos: Position, used: CellMask, word: &mut String, visit: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&str) -> ControlFlow<()>,
    {
        let index = self.grid.index(pos);
        let Some(letter) = self.grid.get(pos) else {
            return ControlFlow::Continue(());
        };
        if used.is_set(index) {
            return ControlFlow::Continue(());
        }

        let mark = word.len();
        word.push(letter);
        if letter == 'Q' {
            word.push('U');
        }

        let len = word.len();
        if len <= self.max_len {
            if len >= MIN_WORD_LENGTH && self.dictionary.contains(word) {
                visit(word)?;
            }
            if len < self.max_len {
                let used = used.with(index);
                for next in self.grid.neighbours(pos) {
                    self.walk(next, used, word, visit)?;
                }
            }
        }

        word.truncate(mark);
        ControlFlow::Continue(())
    }
}
