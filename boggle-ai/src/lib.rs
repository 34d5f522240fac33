//! Boggle 电脑对手
//!
//! 包含:
//! - 全盘单词搜索（深度优先 + 回溯）
//! - 强度模型（可找到的最长单词、接受概率、思考间隔）

mod opponent;
mod search;

pub use opponent::{AiConfig, ComputerOpponent, Strength, PRESETS};
pub use search::SearchEngine;
