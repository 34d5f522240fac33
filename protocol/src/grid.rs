//! 字母棋盘

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_SIDE;
use crate::error::BoggleError;

/// 棋盘坐标，`x` 为行，`y` 为列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// 是否与另一格相邻（八方向，不含自身）
    pub fn is_adjacent(&self, other: Position) -> bool {
        let dx = (self.x as i16 - other.x as i16).abs();
        let dy = (self.y as i16 - other.y as i16).abs();
        dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
    }
}

/// 一轮的字母布局
///
/// `letters[x][y]` 按行优先存储为 `x * side + y`。`'Q'` 格代表 "Qu" 面。
/// 一轮之内不可变。从网络解码时经过与 [`Grid::new`] 相同的校验。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WireGrid")]
pub struct Grid {
    side: usize,
    cells: Vec<char>,
}

/// 网络上的棋盘，尚未校验
#[derive(Deserialize)]
struct WireGrid {
    side: usize,
    cells: Vec<char>,
}

impl TryFrom<WireGrid> for Grid {
    type Error = BoggleError;

    fn try_from(wire: WireGrid) -> Result<Self, Self::Error> {
        Grid::new(wire.side, wire.cells)
    }
}

impl Grid {
    /// 由边长和按行排列的字母创建棋盘
    pub fn new(side: usize, cells: Vec<char>) -> Result<Self, BoggleError> {
        if side == 0 || side > MAX_SIDE {
            return Err(BoggleError::InvalidGrid {
                reason: format!("side length {} outside 1..={}", side, MAX_SIDE),
            });
        }
        if cells.len() != side * side {
            return Err(BoggleError::InvalidGrid {
                reason: format!("expected {} letters, got {}", side * side, cells.len()),
            });
        }
        let cells: Vec<char> = cells.into_iter().map(|c| c.to_ascii_uppercase()).collect();
        if let Some(bad) = cells.iter().find(|c| !c.is_ascii_uppercase()) {
            return Err(BoggleError::InvalidGrid {
                reason: format!("'{}' is not a letter", bad),
            });
        }
        Ok(Self { side, cells })
    }

    /// 由若干行字符串创建，如 `["ONEL", "DUBL", ...]`
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, BoggleError> {
        let side = rows.len();
        let mut cells = Vec::with_capacity(side * side);
        for row in rows {
            let row: Vec<char> = row.as_ref().chars().collect();
            if row.len() != side {
                return Err(BoggleError::InvalidGrid {
                    reason: format!("row of length {} in a {}x{} grid", row.len(), side, side),
                });
            }
            cells.extend(row);
        }
        Self::new(side, cells)
    }

    /// 边长
    pub fn side(&self) -> usize {
        self.side
    }

    /// 格子总数
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 坐标对应的线性下标
    pub fn index(&self, pos: Position) -> usize {
        pos.x as usize * self.side + pos.y as usize
    }

    /// 坐标是否在棋盘内
    pub fn contains(&self, pos: Position) -> bool {
        (pos.x as usize) < self.side && (pos.y as usize) < self.side
    }

    /// 获取指定位置的字母
    pub fn get(&self, pos: Position) -> Option<char> {
        if self.contains(pos) {
            Some(self.cells[self.index(pos)])
        } else {
            None
        }
    }

    /// 所有坐标（行优先）
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let side = self.side as u8;
        (0..side).flat_map(move |x| (0..side).map(move |y| Position::new(x, y)))
    }

    /// 八方向邻格
    pub fn neighbours(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        let side = self.side as i16;
        let (px, py) = (pos.x as i16, pos.y as i16);
        (-1i16..=1)
            .flat_map(move |dx| (-1i16..=1).map(move |dy| (px + dx, py + dy)))
            .filter(move |&(x, y)| (x, y) != (px, py) && x >= 0 && y >= 0 && x < side && y < side)
            .map(|(x, y)| Position::new(x as u8, y as u8))
    }

    /// 按行返回字母
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.chunks(self.side)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let faces: Vec<String> = row
                .iter()
                .map(|&c| if c == 'Q' { "Qu".to_string() } else { c.to_string() })
                .collect();
            writeln!(f, "{}", faces.join(" "))?;
        }
        Ok(())
    }
}
