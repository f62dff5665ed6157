//! 规则常量定义

use crate::piece::Rank;

/// 棋盘行数
pub const BOARD_ROWS: usize = 4;

/// 棋盘列数
pub const BOARD_COLS: usize = 8;

/// 总格数
pub const CELL_COUNT: usize = BOARD_ROWS * BOARD_COLS;

/// 每方棋子总数
pub const PIECES_PER_SIDE: usize = 16;

/// 步数上限：全部翻开后达到此步数按子力分值判定胜负
pub const MAX_STEPS: u32 = 150;

/// 每方各兵种的数量（王、后、车、象、马、兵）
pub const RANK_COUNTS: [(Rank, usize); 6] = [
    (Rank::King, 1),
    (Rank::Queen, 2),
    (Rank::Rook, 2),
    (Rank::Bishop, 3),
    (Rank::Knight, 3),
    (Rank::Pawn, 5),
];
