//! 单个玩家一轮提交的单词

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::MIN_WORD_LENGTH;
use crate::error::BoggleError;
use crate::player::Player;

/// 单词分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WordCategory {
    /// 只有一人找到且有效
    Unique,
    /// 两人及以上找到，所有人都不得分
    Duplicate,
    /// 不在词典中
    Misspelt,
    /// 少于 3 个字母
    TooShort,
    /// 棋盘上拼不出
    NotOnBoard,
}

impl WordCategory {
    /// 全部分类
    pub const ALL: [WordCategory; 5] = [
        WordCategory::Unique,
        WordCategory::Duplicate,
        WordCategory::Misspelt,
        WordCategory::TooShort,
        WordCategory::NotOnBoard,
    ];

    /// 显示名称
    pub fn label(&self) -> &'static str {
        match self {
            WordCategory::Unique => "Unique words",
            WordCategory::Duplicate => "Duplicate words",
            WordCategory::Misspelt => "Misspelt words",
            WordCategory::TooShort => "Too short words",
            WordCategory::NotOnBoard => "Not on board words",
        }
    }
}

/// 单词得分（仅对 unique 单词计分）
///
/// 3-4 字母 1 分，5 字母 2 分，6 字母 3 分，7 字母 5 分，8 字母及以上 11 分。
pub fn word_score(word: &str) -> u32 {
    match word.chars().count() {
        0..=2 => 0,
        3 | 4 => 1,
        5 => 2,
        6 => 3,
        7 => 5,
        _ => 11,
    }
}

/// 是否短于最短有效长度
pub fn is_too_short(word: &str) -> bool {
    word.chars().count() < MIN_WORD_LENGTH
}

/// 评分后的分类结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marking {
    unique: BTreeSet<String>,
    duplicate: BTreeSet<String>,
    misspelt: BTreeSet<String>,
    too_short: BTreeSet<String>,
    not_on_board: BTreeSet<String>,
}

impl Marking {
    pub fn words(&self, category: WordCategory) -> &BTreeSet<String> {
        match category {
            WordCategory::Unique => &self.unique,
            WordCategory::Duplicate => &self.duplicate,
            WordCategory::Misspelt => &self.misspelt,
            WordCategory::TooShort => &self.too_short,
            WordCategory::NotOnBoard => &self.not_on_board,
        }
    }

    pub(crate) fn insert(&mut self, category: WordCategory, word: String) {
        let set = match category {
            WordCategory::Unique => &mut self.unique,
            WordCategory::Duplicate => &mut self.duplicate,
            WordCategory::Misspelt => &mut self.misspelt,
            WordCategory::TooShort => &mut self.too_short,
            WordCategory::NotOnBoard => &mut self.not_on_board,
        };
        set.insert(word);
    }
}

/// 一个玩家一轮的提交
///
/// 单词按集合去重（先去首尾空白并转为大写，空串丢弃），同一单词不能重复计分。
/// 只有评分（[`crate::RoundScorer`]）会写入分类；评分前读取分类或分数是状态错误。
/// 从网络解码的回合同样经过 [`Turn::new`] 的规范化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireTurn")]
pub struct Turn {
    owner: Player,
    words: BTreeSet<String>,
    marking: Option<Marking>,
}

/// 网络上的回合，字段未经规范化
#[derive(Deserialize)]
struct WireTurn {
    owner: Player,
    words: BTreeSet<String>,
    marking: Option<Marking>,
}

impl From<WireTurn> for Turn {
    fn from(wire: WireTurn) -> Self {
        let mut turn = Turn::new(wire.owner, wire.words);
        turn.marking = wire.marking;
        turn
    }
}

impl Turn {
    pub fn new<I, S>(owner: Player, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_uppercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            owner,
            words,
            marking: None,
        }
    }

    /// 提交者
    pub fn owner(&self) -> &Player {
        &self.owner
    }

    /// 提交的全部单词
    pub fn words(&self) -> &BTreeSet<String> {
        &self.words
    }

    /// 是否已评分
    pub fn is_marked(&self) -> bool {
        self.marking.is_some()
    }

    fn marking(&self) -> Result<&Marking, BoggleError> {
        self.marking.as_ref().ok_or_else(|| BoggleError::NotMarked {
            player: self.owner.name.clone(),
        })
    }

    /// 某一分类下的单词
    pub fn words_in(&self, category: WordCategory) -> Result<&BTreeSet<String>, BoggleError> {
        Ok(self.marking()?.words(category))
    }

    /// 本轮得分
    pub fn score(&self) -> Result<u32, BoggleError> {
        Ok(self
            .marking()?
            .words(WordCategory::Unique)
            .iter()
            .map(|w| word_score(w))
            .sum())
    }

    pub(crate) fn set_marking(&mut self, marking: Marking) {
        self.marking = Some(marking);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str) -> Player {
        Player::new(name, format!("{}:1", name))
    }

    #[test]
    fn test_score_table() {
        assert_eq!(word_score("it"), 0);
        assert_eq!(word_score("cow"), 1);
        assert_eq!(word_score("bell"), 1);
        assert_eq!(word_score("funky"), 2);
        assert_eq!(word_score("double"), 3);
        assert_eq!(word_score("cabbage"), 5);
        assert_eq!(word_score("absolute"), 11);
        assert_eq!(word_score("abbreviations"), 11);
    }

    #[test]
    fn test_words_are_deduplicated() {
        let turn = Turn::new(player("A"), ["cow", "COW", " Cow ", "", "duck"]);
        assert_eq!(turn.words().len(), 2);
        assert!(turn.words().contains("COW"));
        assert!(turn.words().contains("DUCK"));
    }

    #[test]
    fn test_decoded_words_are_normalized() {
        let raw = Turn {
            owner: player("A"),
            words: ["cow", "COW", "Cow ", " "].iter().map(|w| w.to_string()).collect(),
            marking: None,
        };
        let bytes = bincode::serialize(&raw).unwrap();
        let turn: Turn = bincode::deserialize(&bytes).unwrap();
        assert_eq!(turn.words().len(), 1);
        assert!(turn.words().contains("COW"));
        assert!(!turn.is_marked());

        // 只算一次分
        let scorer = crate::RoundScorer::new(std::sync::Arc::new(
            crate::Dictionary::from_words(["cow"]),
        ));
        let grid = crate::Grid::from_rows(&["ONEL", "DUBL", "FCOW", "UNKY"]).unwrap();
        let round = scorer
            .mark(crate::SessionId::new("host:9527"), grid, vec![turn])
            .unwrap();
        assert_eq!(round.score_of(&player("A")), Some(1));
    }

    #[test]
    fn test_unmarked_turn_fails_loudly() {
        let turn = Turn::new(player("A"), ["cow"]);
        assert!(!turn.is_marked());
        assert!(matches!(turn.score(), Err(BoggleError::NotMarked { .. })));
        for category in WordCategory::ALL {
            assert!(turn.words_in(category).is_err());
        }
    }

    #[test]
    fn test_score_counts_unique_only() {
        let mut turn = Turn::new(player("A"), ["cow", "funky", "bell"]);
        let mut marking = Marking::default();
        marking.insert(WordCategory::Unique, "COW".to_string());
        marking.insert(WordCategory::Unique, "FUNKY".to_string());
        marking.insert(WordCategory::Duplicate, "BELL".to_string());
        turn.set_marking(marking);

        assert_eq!(turn.score().unwrap(), 3);
        assert_eq!(turn.words_in(WordCategory::Duplicate).unwrap().len(), 1);
    }
}
