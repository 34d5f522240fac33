//! 单词输入

use std::collections::BTreeSet;
use std::sync::Mutex;

/// 输入协作者：本轮输入的单词
pub trait WordSource: Send + Sync {
    /// 到目前为止输入的单词
    fn submitted_words(&self) -> BTreeSet<String>;

    /// 清空（新一轮开始）
    fn clear(&self);
}

/// 默认实现：一个线程安全的单词集合
#[derive(Debug, Default)]
pub struct WordBuffer {
    words: Mutex<BTreeSet<String>>,
}

impl WordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一个或多个单词（按空白分隔），返回新加入的个数
    pub fn push(&self, line: &str) -> usize {
        let Ok(mut words) = self.words.lock() else {
            return 0;
        };
        line.split_whitespace()
            .filter(|w| words.insert(w.to_lowercase()))
            .count()
    }
}

impl WordSource for WordBuffer {
    fn submitted_words(&self) -> BTreeSet<String> {
        self.words.lock().map(|w| w.clone()).unwrap_or_default()
    }

    fn clear(&self) {
        if let Ok(mut words) = self.words.lock() {
            words.clear();
        }
    }
}
