//! 字母骰子与掷骰

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// 4x4 经典骰子
const CLASSIC: [&str; 16] = [
    "AEANEG", "AHSPCO", "ASPFFK", "OBJOAB", "IOTMUC", "RYVDEL", "LREIXD", "EIUNES",
    "WNGEEH", "LNHNRZ", "TSTIYD", "OWTOAT", "ERTTYL", "TOESSI", "TERWHV", "NUIHMQ",
];

/// 5x5 大号骰子
const BIG: [&str; 25] = [
    "ETILCI", "MGAEUE", "EAEAEE", "DNANEN", "TMTETO", "AAAFRS", "TCSNWC", "SSNSUE",
    "EMEAEE", "EGNANM", "TETIII", "DHORHL", "SPTEIC", "DORDNL", "HOTHND", "YIRPRH",
    "FRYSIA", "TOOOUT", "NOWOTU", "PCEITL", "ASARIF", "RFSYPI", "OHDRLN", "KQXZJB",
    "WGORRV",
];

/// 使用的骰子组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiceSet {
    /// 16 颗骰子，4x4
    #[default]
    Classic,
    /// 25 颗骰子，5x5
    Big,
}

impl DiceSet {
    /// 每颗骰子的六个面
    pub fn dice(&self) -> &'static [&'static str] {
        match self {
            DiceSet::Classic => &CLASSIC,
            DiceSet::Big => &BIG,
        }
    }

    /// 骰子总数
    pub fn total_dice(&self) -> usize {
        self.dice().len()
    }

    /// 棋盘边长
    pub fn side(&self) -> usize {
        match self {
            DiceSet::Classic => 4,
            DiceSet::Big => 5,
        }
    }

    /// 掷骰：打乱骰子位置并随机取一面
    pub fn roll<R: Rng>(&self, rng: &mut R) -> Grid {
        let mut dice: Vec<&str> = self.dice().to_vec();
        dice.shuffle(rng);

        let cells = dice
            .iter()
            .map(|die| {
                let faces = die.as_bytes();
                faces[rng.gen_range(0..faces.len())] as char
            })
            .collect();

        Grid::new(self.side(), cells).expect("dice sets are square and alphabetic")
    }
}
