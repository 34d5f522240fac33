//! 电脑对手的强度模型
//!
//! 强度越低，能找到的单词越短、接受单词的概率越低、思考越慢。

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use protocol::{BoggleError, Dictionary, Grid, MIN_WORD_LENGTH};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::search::SearchEngine;

/// 标准强度档位
pub const PRESETS: [u16; 13] = [10, 25, 50, 100, 200, 300, 400, 500, 600, 700, 800, 900, 999];

/// 对手强度，取值 0..=999
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Strength(u16);

impl Strength {
    pub const WEAKEST: Strength = Strength(0);
    pub const STRONGEST: Strength = Strength(999);

    pub fn new(value: u16) -> Result<Self, BoggleError> {
        if value > Self::STRONGEST.0 {
            return Err(BoggleError::InvalidStrength(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// 能找到的最长单词
    pub fn max_word_length(self) -> usize {
        MIN_WORD_LENGTH + (self.0 / 100) as usize
    }

    /// 每次决定后的停顿
    pub fn pause(self) -> Duration {
        Duration::from_millis((Self::STRONGEST.0 - self.0) as u64)
    }

    /// 是否接受一个单词，`roll` 取自 `0..999`
    pub fn accepts(self, word_len: usize, roll: u16) -> bool {
        let difficulty = word_len.saturating_sub(MIN_WORD_LENGTH) as u32 * 10;
        roll as u32 + difficulty <= self.0 as u32
    }
}

impl TryFrom<u16> for Strength {
    type Error = BoggleError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Strength> for u16 {
    fn from(strength: Strength) -> Self {
        strength.0
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self::STRONGEST
    }
}

/// 电脑对手配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub strength: Strength,
    /// 固定随机种子，便于复现
    pub seed: Option<u64>,
}

impl AiConfig {
    pub fn from_strength(value: u16) -> Result<Self, BoggleError> {
        Ok(Self {
            strength: Strength::new(value)?,
            seed: None,
        })
    }

    /// 第 `index` 个标准档位，越界时取最强
    pub fn preset(index: usize) -> Self {
        let value = PRESETS.get(index).copied().unwrap_or(Strength::STRONGEST.0);
        Self {
            strength: Strength(value),
            seed: None,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            strength: Strength::default(),
            seed: None,
        }
    }
}

/// 电脑对手
#[derive(Debug, Clone)]
pub struct ComputerOpponent {
    config: AiConfig,
}

impl ComputerOpponent {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    pub fn strength(&self) -> Strength {
        self.config.strength
    }

    /// 为一轮创建随机数生成器
    pub fn rng(&self) -> ChaCha8Rng {
        match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// 在棋盘上找词（阻塞）
    ///
    /// 每接受一个单词就以小写形式交给 `on_word`。`stop` 置位后尽快返回。
    /// 返回接受的单词数。
    pub fn think<R, F>(
        &self,
        grid: &Grid,
        dictionary: &Dictionary,
        rng: &mut R,
        stop: &AtomicBool,
        mut on_word: F,
    ) -> usize
    where
        R: Rng,
        F: FnMut(String),
    {
        let strength = self.config.strength;
        let pause = strength.pause();
        let engine = SearchEngine::new(grid, dictionary, strength.max_word_length());
        let mut accepted = 0;

        let flow = engine.for_each_word(|word| {
            if stop.load(Ordering::Relaxed) {
                return ControlFlow::Break(());
            }
            let roll = rng.gen_range(0..Strength::STRONGEST.0);
            if strength.accepts(word.len(), roll) {
                on_word(word.to_lowercase());
                accepted += 1;
            }
            if !pause.is_zero() {
                std::thread::sleep(pause);
            }
            if stop.load(Ordering::Relaxed) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        debug!(
            "AI (strength {}) accepted {} words{}",
            strength.value(),
            accepted,
            if flow.is_break() { ", stopped early" } else { "" }
        );
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn sample_grid() -> Grid {
        Grid::from_rows(&["ONEL", "DUBL", "FCOW", "UNKY"]).unwrap()
    }

    #[test]
    fn test_strength_range() {
        assert!(Strength::new(0).is_ok());
        assert!(Strength::new(999).is_ok());
        assert_eq!(Strength::new(1000), Err(BoggleError::InvalidStrength(1000)));
    }

    #[test]
    fn test_strength_model() {
        let s = Strength::new(250).unwrap();
        assert_eq!(s.max_word_length(), 5);
        assert_eq!(s.pause(), Duration::from_millis(749));

        assert_eq!(Strength::WEAKEST.max_word_length(), 3);
        assert_eq!(Strength::STRONGEST.max_word_length(), 12);
        assert!(Strength::STRONGEST.pause().is_zero());
    }

    #[test]
    fn test_accepts() {
        let s = Strength::STRONGEST;
        // 3 字母单词任何掷点都接受
        assert!((0..999).all(|roll| s.accepts(3, roll)));
        // 5 字母单词：掷点 + 20 <= 999
        assert!(s.accepts(5, 979));
        assert!(!s.accepts(5, 980));

        let weak = Strength::new(10).unwrap();
        assert!(weak.accepts(3, 10));
        assert!(!weak.accepts(3, 11));
        assert!(!weak.accepts(4, 0));
    }

    #[test]
    fn test_presets() {
        assert!(PRESETS.iter().all(|&p| Strength::new(p).is_ok()));
        assert_eq!(AiConfig::preset(0).strength.value(), 10);
        assert_eq!(AiConfig::preset(99).strength, Strength::STRONGEST);
    }

    #[test]
    fn test_strongest_takes_every_three_letter_word() {
        let grid = sample_grid();
        let dict = Dictionary::from_words(["one", "cow", "bow", "cob"]);
        let ai = ComputerOpponent::new(AiConfig {
            strength: Strength::STRONGEST,
            seed: Some(1),
        });

        let mut found = BTreeSet::new();
        let stop = AtomicBool::new(false);
        ai.think(&grid, &dict, &mut ai.rng(), &stop, |w| {
            found.insert(w);
        });

        let expected: BTreeSet<String> =
            ["one", "cow", "bow", "cob"].iter().map(|s| s.to_string()).collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_stop_flag_ends_search() {
        let grid = sample_grid();
        let dict = Dictionary::from_words(["one", "cow", "bow", "cob"]);
        let ai = ComputerOpponent::new(AiConfig::default());

        let stop = AtomicBool::new(true);
        let accepted = ai.think(&grid, &dict, &mut ai.rng(), &stop, |_| {});
        assert_eq!(accepted, 0);
    }

    #[test]
    fn test_seeded_runs_agree() {
        let grid = sample_grid();
        let dict = Dictionary::from_words(["one", "cow", "bow", "cob", "bell", "funky", "double"]);
        let ai = ComputerOpponent::new(AiConfig {
            strength: Strength::STRONGEST,
            seed: Some(42),
        });
        let stop = AtomicBool::new(false);

        let mut first = Vec::new();
        ai.think(&grid, &dict, &mut ai.rng(), &stop, |w| first.push(w));
        let mut second = Vec::new();
        ai.think(&grid, &dict, &mut ai.rng(), &stop, |w| second.push(w));
        assert_eq!(first, second);
    }
}
