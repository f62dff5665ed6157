//! 棋子定义
//!
//! 兵种克制关系和子力分值是整个系统唯一的规则表，
//! 引擎、搜索、强化学习三方都从这里读取。

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_COLS, BOARD_ROWS};

/// 兵种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    /// 王
    King,
    /// 后
    Queen,
    /// 车
    Rook,
    /// 象
    Bishop,
    /// 马
    Knight,
    /// 兵
    Pawn,
}

impl Rank {
    /// 克制顺序（数值大者可吃数值小者或同级）
    fn order(&self) -> u8 {
        match self {
            Rank::King => 6,
            Rank::Queen => 5,
            Rank::Rook => 4,
            Rank::Bishop => 3,
            Rank::Knight => 2,
            Rank::Pawn => 1,
        }
    }

    /// 判断本兵种能否吃掉目标兵种
    ///
    /// 两条例外规则：王不能吃兵；兵可以吃王（此外兵只能吃兵）。
    /// 同级互吃合法，吃子时双方同归于尽由棋盘处理。
    pub fn can_capture(&self, target: Rank) -> bool {
        match (self, target) {
            (Rank::King, Rank::Pawn) => false,
            (Rank::Pawn, Rank::King) => true,
            (Rank::Pawn, other) => other == Rank::Pawn,
            (attacker, other) => attacker.order() >= other.order(),
        }
    }

    /// 子力分值（用于评估和步数上限判定）
    pub fn weight(&self) -> f32 {
        match self {
            Rank::King => 10.0,
            Rank::Queen => 7.0,
            Rank::Rook => 5.0,
            Rank::Bishop => 4.0,
            Rank::Knight => 2.5,
            Rank::Pawn => 1.0,
        }
    }

    /// 获取兵种字符（1 号玩家大写，2 号玩家小写）
    pub fn to_char(&self, side: Side) -> char {
        let c = match self {
            Rank::King => 'k',
            Rank::Queen => 'q',
            Rank::Rook => 'r',
            Rank::Bishop => 'b',
            Rank::Knight => 'n',
            Rank::Pawn => 'p',
        };
        match side {
            Side::One => c.to_ascii_uppercase(),
            Side::Two => c,
        }
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// 1 号玩家（先手）
    One,
    /// 2 号玩家（后手）
    Two,
}

impl Side {
    /// 获取对方阵营
    pub fn opponent(&self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// 棋子
///
/// `revealed` 单向递增：一旦翻开永不复原。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub rank: Rank,
    pub side: Side,
    pub revealed: bool,
}

impl Piece {
    /// 创建新棋子（初始背面朝上）
    pub fn new(rank: Rank, side: Side) -> Self {
        Self {
            rank,
            side,
            revealed: false,
        }
    }

    /// 翻开棋子
    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    /// 获取子力分值
    pub fn weight(&self) -> f32 {
        self.rank.weight()
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.revealed {
            write!(f, "{}", self.rank.to_char(self.side))
        } else {
            write!(f, "#")
        }
    }
}

/// 四个正交方向，生成顺序固定为上、下、左、右
pub const DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// 棋盘位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 行 (0-3)
    pub row: u8,
    /// 列 (0-7)
    pub col: u8,
}

impl Position {
    /// 创建新位置
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if (row as usize) < BOARD_ROWS && (col as usize) < BOARD_COLS {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// 创建新位置（不检查边界，内部使用）
    pub const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// 检查位置是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (self.row as usize) < BOARD_ROWS && (self.col as usize) < BOARD_COLS
    }

    /// 获取偏移后的位置
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Position> {
        let new_row = self.row as i8 + dr;
        let new_col = self.col as i8 + dc;
        if new_row >= 0
            && (new_row as usize) < BOARD_ROWS
            && new_col >= 0
            && (new_col as usize) < BOARD_COLS
        {
            Some(Position {
                row: new_row as u8,
                col: new_col as u8,
            })
        } else {
            None
        }
    }

    /// 按固定方向顺序枚举四邻位置（越界的自动跳过）
    pub fn neighbors(&self) -> impl Iterator<Item = Position> + '_ {
        DIRECTIONS.iter().filter_map(|&(dr, dc)| self.offset(dr, dc))
    }

    /// 曼哈顿距离
    pub fn manhattan(&self, other: Position) -> u8 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// 转换为数组索引
    pub fn to_index(&self) -> usize {
        self.row as usize * BOARD_COLS + self.col as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_ROWS * BOARD_COLS {
            Some(Position {
                row: (index / BOARD_COLS) as u8,
                col: (index % BOARD_COLS) as u8,
            })
        } else {
            None
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
