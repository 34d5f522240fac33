//! 词典
//!
//! 启动时一次性载入的单词集合，之后只读。大小写不敏感。

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, info};

use crate::error::BoggleError;

/// 有效单词集合（内部统一大写）
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// 从每行一个单词的文本载入
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BoggleError> {
        let mut words = HashSet::new();
        for line in BufReader::new(reader).lines() {
            let line = line.map_err(|e| BoggleError::DictionaryUnavailable {
                reason: e.to_string(),
            })?;
            let word = line.trim();
            if !word.is_empty() {
                words.insert(word.to_uppercase());
            }
        }
        debug!("Loaded {} words", words.len());
        Ok(Self { words })
    }

    /// 从文件载入
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BoggleError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BoggleError::DictionaryUnavailable {
            reason: format!("{}: {}", path.display(), e),
        })?;
        let dictionary = Self::from_reader(file)?;
        info!("Dictionary {} loaded ({} words)", path.display(), dictionary.len());
        Ok(dictionary)
    }

    /// 由单词列表构造
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_uppercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// 是否为有效单词
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_uppercase())
    }

    /// 单词数量
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
