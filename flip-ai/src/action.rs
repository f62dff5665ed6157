//! 具体动作的生成与应用

use flip_core::{Board, FlipError, Position, Result, Side};

/// 具体动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// 翻开指定位置的棋子
    Reveal(Position),
    /// 从起点到四邻终点的走子或吃子（由棋盘状态决定是哪一种）
    Move { from: Position, to: Position },
}

impl Action {
    /// 应用到棋盘
    ///
    /// 代理只提交自己生成的动作，引擎拒绝说明生成与应用不一致，
    /// 以错误形式上抛而不是像引擎入口那样静默忽略。
    pub fn apply(&self, board: &mut Board) -> Result<()> {
        match *self {
            Action::Reveal(pos) => match board.get(pos) {
                Some(piece) if !piece.revealed => {
                    board.reveal(pos);
                    Ok(())
                }
                _ => Err(FlipError::IllegalReveal { pos }),
            },
            Action::Move { from, to } => {
                if board.is_valid_move(from, to) {
                    board.move_piece(from, to);
                    Ok(())
                } else if board.is_valid_capture(from, to) {
                    board.capture_piece(from, to);
                    Ok(())
                } else if board.get(to).is_some() {
                    Err(FlipError::IllegalCapture { from, to })
                } else {
                    Err(FlipError::IllegalMove { from, to })
                }
            }
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Reveal(pos) => write!(f, "reveal {}", pos),
            Action::Move { from, to } => write!(f, "{} -> {}", from, to),
        }
    }
}

/// 枚举指定阵营所有合法的走子/吃子对
///
/// 只考虑已翻开的己方棋子。顺序固定：源格按行优先，
/// 目标按上、下、左、右，保证搜索的平手裁决是确定性的。
pub fn valid_moves(board: &Board, side: Side) -> Vec<(Position, Position)> {
    let mut moves = Vec::new();
    for (from, piece) in board.pieces(side) {
        if !piece.revealed {
            continue;
        }
        for to in from.neighbors() {
            if board.is_valid_move(from, to) || board.is_valid_capture(from, to) {
                moves.push((from, to));
            }
        }
    }
    moves
}
