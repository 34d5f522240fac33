//! 一轮的评分与结果

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::dictionary::Dictionary;
use crate::error::BoggleError;
use crate::grid::Grid;
use crate::path::PathValidator;
use crate::player::{Player, SessionId};
use crate::turn::{is_too_short, Marking, Turn, WordCategory};

/// 评分器
///
/// 对一轮全部提交做分类并计分，词典在构造时注入。
#[derive(Debug, Clone)]
pub struct RoundScorer {
    dictionary: Arc<Dictionary>,
}

impl RoundScorer {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// 给一轮的全部回合评分
    ///
    /// 分类优先级：拼不出 → 太短 → 已是重复 → 之前唯一（改为重复并撤销其得分）
    /// → 不在词典 → 唯一。
    pub fn mark(
        &self,
        session: SessionId,
        grid: Grid,
        mut turns: Vec<Turn>,
    ) -> Result<Round, BoggleError> {
        let categories = self.sort_words(&grid, &turns);

        let mut scores = BTreeMap::new();
        for turn in turns.iter_mut() {
            let mut marking = Marking::default();
            for word in turn.words() {
                let category = Self::category_of(&categories, word).ok_or_else(|| {
                    error!("Word {} from {} fits no category", word, turn.owner());
                    BoggleError::Uncategorized { word: word.clone() }
                })?;
                marking.insert(category, word.clone());
            }
            turn.set_marking(marking);
            scores.insert(turn.owner().clone(), turn.score()?);
        }

        debug!(
            "Round {} marked: {} turns, {} unique words",
            session,
            turns.len(),
            categories.words(WordCategory::Unique).len()
        );

        Ok(Round {
            session,
            grid,
            turns,
            categories,
            scores,
            finished_at: Utc::now(),
        })
    }

    fn sort_words(&self, grid: &Grid, turns: &[Turn]) -> Marking {
        let validator = PathValidator::new(grid);
        let mut unique: BTreeSet<String> = BTreeSet::new();
        let mut categories = Marking::default();

        for turn in turns {
            for word in turn.words() {
                if !validator.exists(word) {
                    categories.insert(WordCategory::NotOnBoard, word.clone());
                } else if is_too_short(word) {
                    categories.insert(WordCategory::TooShort, word.clone());
                } else if categories.words(WordCategory::Duplicate).contains(word) {
                    // 第三个及以后的发现者
                } else if unique.remove(word) {
                    categories.insert(WordCategory::Duplicate, word.clone());
                } else if !self.dictionary.contains(word) {
                    categories.insert(WordCategory::Misspelt, word.clone());
                } else {
                    unique.insert(word.clone());
                }
            }
        }

        for word in unique {
            categories.insert(WordCategory::Unique, word);
        }
        categories
    }

    fn category_of(categories: &Marking, word: &str) -> Option<WordCategory> {
        [
            WordCategory::NotOnBoard,
            WordCategory::TooShort,
            WordCategory::Misspelt,
            WordCategory::Duplicate,
            WordCategory::Unique,
        ]
        .into_iter()
        .find(|&c| categories.words(c).contains(word))
    }
}

/// 评分完成的一轮
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    session: SessionId,
    grid: Grid,
    turns: Vec<Turn>,
    categories: Marking,
    scores: BTreeMap<Player, u32>,
    finished_at: DateTime<Utc>,
}

impl Round {
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// 已评分的全部回合
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// 某玩家的回合
    pub fn turn_of(&self, player: &Player) -> Option<&Turn> {
        self.turns.iter().find(|t| t.owner() == player)
    }

    /// 全体提交中属于某分类的单词
    pub fn words_in(&self, category: WordCategory) -> &BTreeSet<String> {
        self.categories.words(category)
    }

    /// 每个玩家本轮得分
    pub fn scores(&self) -> &BTreeMap<Player, u32> {
        &self.scores
    }

    pub fn score_of(&self, player: &Player) -> Option<u32> {
        self.scores.get(player).copied()
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// 生成用于显示的摘要
    pub fn summary(&self) -> RoundSummary {
        let mut entries: Vec<SummaryEntry> = self
            .turns
            .iter()
            .map(|turn| SummaryEntry {
                name: turn.owner().name.clone(),
                score: self.score_of(turn.owner()).unwrap_or(0),
                words: WordCategory::ALL
                    .into_iter()
                    .map(|c| {
                        let words = turn
                            .words_in(c)
                            .map(|set| set.iter().cloned().collect())
                            .unwrap_or_default();
                        (c, words)
                    })
                    .collect(),
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));

        RoundSummary {
            grid: self.grid.clone(),
            entries,
        }
    }
}

/// 摘要中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub name: String,
    pub score: u32,
    pub words: Vec<(WordCategory, Vec<String>)>,
}

/// 一轮结果的显示投影，按得分降序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub grid: Grid,
    pub entries: Vec<SummaryEntry>,
}

impl fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid)?;
        for entry in &self.entries {
            writeln!(f)?;
            writeln!(f, "{}: {}", entry.name, entry.score)?;
            for (category, words) in &entry.words {
                if !words.is_empty() {
                    writeln!(f, "  {}: {}", category.label(), words.join(", "))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> Grid {
        Grid::from_rows(&["ONEL", "DUBL", "FCOW", "UNKY"]).unwrap()
    }

    fn scorer() -> RoundScorer {
        RoundScorer::new(Arc::new(Dictionary::from_words([
            "one", "cow", "funky", "double", "bell", "new", "cob", "lob",
        ])))
    }

    fn player(name: &str) -> Player {
        Player::new(name, format!("10.0.0.{}:9527", name.len()))
    }

    fn session() -> SessionId {
        SessionId::new("host:9527")
    }

    #[test]
    fn test_duplicate_cancels_both() {
        let (a, b) = (player("A"), player("BB"));
        let round = scorer()
            .mark(
                session(),
                sample_grid(),
                vec![Turn::new(a.clone(), ["cow"]), Turn::new(b.clone(), ["cow"])],
            )
            .unwrap();

        assert!(round.words_in(WordCategory::Duplicate).contains("COW"));
        assert!(round.words_in(WordCategory::Unique).is_empty());
        assert_eq!(round.score_of(&a), Some(0));
        assert_eq!(round.score_of(&b), Some(0));
    }

    #[test]
    fn test_three_finders_are_all_duplicate() {
        let players = [player("A"), player("BB"), player("CCC")];
        let turns = players
            .iter()
            .map(|p| Turn::new(p.clone(), ["funky", "one"]))
            .collect();
        let round = scorer().mark(session(), sample_grid(), turns).unwrap();

        for p in &players {
            assert_eq!(round.score_of(p), Some(0));
            let turn = round.turn_of(p).unwrap();
            assert_eq!(turn.words_in(WordCategory::Duplicate).unwrap().len(), 2);
        }
    }

    #[test]
    fn test_categories() {
        let a = player("A");
        let turn = Turn::new(a.clone(), ["one", "funky", "hello", "ob", "cob", "lob", "dub"]);
        let round = scorer().mark(session(), sample_grid(), vec![turn]).unwrap();
        let turn = round.turn_of(&a).unwrap();

        let unique = turn.words_in(WordCategory::Unique).unwrap();
        assert!(unique.contains("ONE"));
        assert!(unique.contains("FUNKY"));
        assert!(unique.contains("COB"));
        assert!(turn.words_in(WordCategory::NotOnBoard).unwrap().contains("HELLO"));
        // L(1,3) 与 O(2,2) 斜向相邻
        assert!(unique.contains("LOB"));
        assert!(turn.words_in(WordCategory::TooShort).unwrap().contains("OB"));
        assert!(turn.words_in(WordCategory::Misspelt).unwrap().contains("DUB"));
        // ONE 1 + FUNKY 2 + COB 1 + LOB 1
        assert_eq!(round.score_of(&a), Some(5));
    }

    #[test]
    fn test_categories_partition_every_turn() {
        let turns = vec![
            Turn::new(player("A"), ["one", "cow", "xyz", "on", "double", "bell"]),
            Turn::new(player("BB"), ["cow", "new", "qu", "fun", "on"]),
            Turn::new(player("CCC"), ["cow", "double", "nob"]),
        ];
        let round = scorer().mark(session(), sample_grid(), turns).unwrap();

        for turn in round.turns() {
            let mut seen = BTreeSet::new();
            for category in WordCategory::ALL {
                for word in turn.words_in(category).unwrap() {
                    assert!(seen.insert(word.clone()), "{} in two categories", word);
                }
            }
            assert_eq!(&seen, turn.words());
        }
    }

    #[test]
    fn test_too_short_even_when_on_board() {
        let a = player("A");
        let round = scorer()
            .mark(session(), sample_grid(), vec![Turn::new(a.clone(), ["on"])])
            .unwrap();
        assert!(round.words_in(WordCategory::TooShort).contains("ON"));
        assert_eq!(round.score_of(&a), Some(0));
    }

    #[test]
    fn test_misspelt_by_two_stays_misspelt() {
        let turns = vec![
            Turn::new(player("A"), ["dub"]),
            Turn::new(player("BB"), ["dub"]),
        ];
        let round = scorer().mark(session(), sample_grid(), turns).unwrap();
        assert!(round.words_in(WordCategory::Misspelt).contains("DUB"));
        assert!(round.words_in(WordCategory::Duplicate).is_empty());
    }

    #[test]
    fn test_summary_sorted_by_score() {
        let turns = vec![
            Turn::new(player("A"), ["cow"]),
            Turn::new(player("BB"), ["double", "funky"]),
        ];
        let round = scorer().mark(session(), sample_grid(), turns).unwrap();
        let summary = round.summary();

        assert_eq!(summary.entries[0].name, "BB");
        assert_eq!(summary.entries[0].score, 5);
        assert_eq!(summary.entries[1].score, 1);

        let text = summary.to_string();
        assert!(text.contains("BB: 5"));
        assert!(text.contains("Unique words: DOUBLE, FUNKY"));
    }

    #[test]
    fn test_empty_round() {
        let round = scorer().mark(session(), sample_grid(), vec![]).unwrap();
        assert!(round.turns().is_empty());
        assert!(round.scores().is_empty());
    }
}
