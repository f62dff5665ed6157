//! 棋盘状态与规则引擎
//!
//! 合法性判断、落子、吃子、翻子和终局判定都在这里。
//! 非法请求一律静默拒绝（不改状态、不报错），调用方需要先用
//! `is_valid_move` / `is_valid_capture` 自行校验。

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_COLS, BOARD_ROWS, CELL_COUNT, MAX_STEPS, RANK_COUNTS};
use crate::piece::{Piece, Position, Rank, Side};

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    /// 尚未分出胜负
    Unresolved,
    /// 某方获胜
    Winner(Side),
    /// 和棋
    Draw,
}

impl GameResult {
    /// 对局是否已经结束
    pub fn is_resolved(&self) -> bool {
        !matches!(self, GameResult::Unresolved)
    }
}

/// 棋盘快照
///
/// 逐格记录（兵种、阵营、是否翻开），可哈希、可比较，
/// 强化学习代理用它作为状态键。注意快照包含未翻开棋子的真实身份。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    cells: Vec<Option<(Rank, Side, bool)>>,
}

/// 棋盘
///
/// 4x8 网格，索引为 row * 8 + col，使用 Vec 以支持 serde。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    squares: Vec<Option<Piece>>,
}

impl Board {
    /// 创建空棋盘（测试用）
    pub fn empty() -> Self {
        Self {
            squares: vec![None; CELL_COUNT],
        }
    }

    /// 创建初始棋盘：32 枚棋子均匀随机洗到 32 格，全部背面朝上
    pub fn initial() -> Self {
        Self::initial_with_rng(&mut rand::thread_rng())
    }

    /// 用指定随机源创建初始棋盘（保证可复现）
    pub fn initial_with_rng<R: Rng>(rng: &mut R) -> Self {
        let mut pieces = Vec::with_capacity(CELL_COUNT);
        for side in [Side::One, Side::Two] {
            for (rank, count) in RANK_COUNTS {
                for _ in 0..count {
                    pieces.push(Piece::new(rank, side));
                }
            }
        }
        pieces.shuffle(rng);

        Self {
            squares: pieces.into_iter().map(Some).collect(),
        }
    }

    /// 获取指定位置的棋子
    pub fn get(&self, pos: Position) -> Option<Piece> {
        if pos.is_valid() {
            self.squares[pos.to_index()]
        } else {
            None
        }
    }

    /// 设置指定位置的棋子
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        if pos.is_valid() {
            self.squares[pos.to_index()] = piece;
        }
    }

    /// 翻开指定位置的棋子
    ///
    /// 仅在该格有未翻开棋子时生效，其余情况静默忽略。
    pub fn reveal(&mut self, pos: Position) {
        if !pos.is_valid() {
            return;
        }
        if let Some(piece) = self.squares[pos.to_index()].as_mut() {
            piece.reveal();
        }
    }

    /// 检查走子是否合法：起点有子、终点为空、曼哈顿距离为 1
    pub fn is_valid_move(&self, from: Position, to: Position) -> bool {
        if !from.is_valid() || !to.is_valid() {
            return false;
        }
        self.get(from).is_some() && self.get(to).is_none() && from.manhattan(to) == 1
    }

    /// 检查吃子是否合法
    ///
    /// 要求：双方格子都有子、目标已翻开、阵营不同、四邻相接、
    /// 且进攻方兵种按规则表克制目标兵种。
    pub fn is_valid_capture(&self, from: Position, to: Position) -> bool {
        let (attacker, target) = match (self.get(from), self.get(to)) {
            (Some(a), Some(t)) => (a, t),
            _ => return false,
        };
        if !target.revealed {
            return false;
        }
        if attacker.side == target.side {
            return false;
        }
        if from.manhattan(to) != 1 {
            return false;
        }
        attacker.rank.can_capture(target.rank)
    }

    /// 走子（先经 `is_valid_move` 校验，非法请求静默忽略）
    pub fn move_piece(&mut self, from: Position, to: Position) {
        if self.is_valid_move(from, to) {
            self.squares[to.to_index()] = self.squares[from.to_index()].take();
        }
    }

    /// 吃子（先经 `is_valid_capture` 校验，非法请求静默忽略）
    ///
    /// 同级相吃时双方同归于尽，两格都被清空。
    pub fn capture_piece(&mut self, from: Position, to: Position) {
        if !self.is_valid_capture(from, to) {
            return;
        }
        let attacker = self.squares[from.to_index()].take();
        let target = self.squares[to.to_index()].take();
        if let (Some(attacker), Some(target)) = (attacker, target) {
            if attacker.rank != target.rank {
                self.squares[to.to_index()] = Some(attacker);
            }
        }
    }

    /// 是否所有仍在场的棋子都已翻开
    pub fn all_revealed(&self) -> bool {
        self.squares
            .iter()
            .flatten()
            .all(|piece| piece.revealed)
    }

    /// 获取指定阵营的所有棋子位置（按行优先顺序）
    pub fn pieces(&self, side: Side) -> Vec<(Position, Piece)> {
        let mut result = Vec::new();
        for row in 0..BOARD_ROWS {
            for col in 0..BOARD_COLS {
                let pos = Position::new_unchecked(row as u8, col as u8);
                if let Some(piece) = self.get(pos) {
                    if piece.side == side {
                        result.push((pos, piece));
                    }
                }
            }
        }
        result
    }

    /// 获取所有未翻开棋子的位置（按行优先顺序）
    pub fn unrevealed_positions(&self) -> Vec<Position> {
        let mut result = Vec::new();
        for row in 0..BOARD_ROWS {
            for col in 0..BOARD_COLS {
                let pos = Position::new_unchecked(row as u8, col as u8);
                if let Some(piece) = self.get(pos) {
                    if !piece.revealed {
                        result.push(pos);
                    }
                }
            }
        }
        result
    }

    /// 指定阵营的子力总分
    pub fn score(&self, side: Side) -> f32 {
        self.squares
            .iter()
            .flatten()
            .filter(|piece| piece.side == side)
            .map(|piece| piece.weight())
            .sum()
    }

    /// 指定阵营剩余棋子数
    pub fn piece_count(&self, side: Side) -> usize {
        self.squares
            .iter()
            .flatten()
            .filter(|piece| piece.side == side)
            .count()
    }

    /// 指定阵营是否还有任何合法的走子或吃子
    pub fn side_has_action(&self, side: Side) -> bool {
        for (from, _) in self.pieces(side) {
            for to in from.neighbors() {
                if self.is_valid_move(from, to) || self.is_valid_capture(from, to) {
                    return true;
                }
            }
        }
        false
    }

    /// 终局判定
    ///
    /// 只要还有未翻开的棋子就一律返回 `Unresolved`，哪怕某方已经
    /// 没有棋子。全部翻开之后：无子方负；有子但无任何合法动作方负；
    /// 达到步数上限后按子力分值判胜负，同分和棋。
    pub fn check_winner(&self, step_count: u32) -> GameResult {
        if !self.all_revealed() {
            return GameResult::Unresolved;
        }

        if self.piece_count(Side::One) == 0 {
            return GameResult::Winner(Side::Two);
        }
        if self.piece_count(Side::Two) == 0 {
            return GameResult::Winner(Side::One);
        }

        if !self.side_has_action(Side::One) {
            return GameResult::Winner(Side::Two);
        }
        if !self.side_has_action(Side::Two) {
            return GameResult::Winner(Side::One);
        }

        if step_count >= MAX_STEPS {
            let score_one = self.score(Side::One);
            let score_two = self.score(Side::Two);
            return if score_one > score_two {
                GameResult::Winner(Side::One)
            } else if score_two > score_one {
                GameResult::Winner(Side::Two)
            } else {
                GameResult::Draw
            };
        }

        GameResult::Unresolved
    }

    /// 生成当前局面的快照
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cells: self
                .squares
                .iter()
                .map(|cell| cell.map(|piece| (piece.rank, piece.side, piece.revealed)))
                .collect(),
        }
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..BOARD_ROWS {
            for col in 0..BOARD_COLS {
                match self.squares[row * BOARD_COLS + col] {
                    Some(piece) => write!(f, "{} ", piece)?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
