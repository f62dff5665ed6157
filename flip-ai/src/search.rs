//! 固定深度 Minimax 搜索
//!
//! 每个分支在克隆出的棋盘副本上展开（引擎没有悔棋操作），
//! 终局分支不消耗深度直接给 ±80/0，平手按生成顺序取第一个。
//!
//! 注意：搜索读取未翻开棋子的真实身份（全知简化），
//! 这是刻意保留的原始行为，不建模部分可观测性。

use flip_core::{Board, GameResult, Side};

use crate::action::{valid_moves, Action};

/// 终局分支的分值
const WIN_SCORE: f32 = 80.0;

/// 搜索配置
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// 搜索深度
    pub depth: u8,
    /// 执棋方
    pub side: Side,
}

impl SearchConfig {
    /// 默认深度 3 的配置
    pub fn new(side: Side) -> Self {
        Self { depth: 3, side }
    }

    /// 指定深度
    pub fn with_depth(side: Side, depth: u8) -> Self {
        Self { depth, side }
    }
}

/// Minimax 搜索代理
pub struct MinMaxAgent {
    config: SearchConfig,
    nodes_searched: u64,
}

impl MinMaxAgent {
    /// 创建新代理
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            nodes_searched: 0,
        }
    }

    /// 选择当前局面的最佳动作
    pub fn choose_action(&mut self, board: &Board, step_count: u32) -> Option<Action> {
        self.nodes_searched = 0;
        let (_, action) = self.minimax(board, self.config.depth, true, step_count);
        action
    }

    /// 静态评估：己方子力分减对方子力分
    pub fn evaluate(&self, board: &Board) -> f32 {
        board.score(self.config.side) - board.score(self.config.side.opponent())
    }

    /// Minimax 递归
    ///
    /// `maximizing` 为真表示当前节点轮到己方行动。
    fn minimax(
        &mut self,
        board: &Board,
        depth: u8,
        maximizing: bool,
        step_count: u32,
    ) -> (f32, Option<Action>) {
        self.nodes_searched += 1;

        // 终局优先于深度判断
        match board.check_winner(step_count) {
            GameResult::Winner(side) if side == self.config.side => return (WIN_SCORE, None),
            GameResult::Winner(_) => return (-WIN_SCORE, None),
            GameResult::Draw => return (0.0, None),
            GameResult::Unresolved => {}
        }

        if depth == 0 {
            return (self.evaluate(board), None);
        }

        let active = if maximizing {
            self.config.side
        } else {
            self.config.side.opponent()
        };

        let moves = valid_moves(board, active);
        if !moves.is_empty() {
            let mut best_score = if maximizing {
                f32::NEG_INFINITY
            } else {
                f32::INFINITY
            };
            let mut best_action = None;

            for (from, to) in moves {
                let mut next = board.clone();
                if next.is_valid_move(from, to) {
                    next.move_piece(from, to);
                } else {
                    next.capture_piece(from, to);
                }
                let (score, _) = self.minimax(&next, depth - 1, !maximizing, step_count + 1);
                let better = if maximizing {
                    score > best_score
                } else {
                    score < best_score
                };
                if better {
                    best_score = score;
                    best_action = Some(Action::Move { from, to });
                }
            }
            return (best_score, best_action);
        }

        // 无子可动且还有未翻开的棋子：退化为翻子动作
        if !board.all_revealed() {
            let reveals = board.unrevealed_positions();
            if reveals.is_empty() {
                return (self.evaluate(board), None);
            }

            let mut best_score = if maximizing {
                f32::NEG_INFINITY
            } else {
                f32::INFINITY
            };
            let mut best_action = None;

            for pos in reveals {
                let mut next = board.clone();
                next.reveal(pos);
                let (score, _) = self.minimax(&next, depth - 1, !maximizing, step_count + 1);
                let better = if maximizing {
                    score > best_score
                } else {
                    score < best_score
                };
                if better {
                    best_score = score;
                    best_action = Some(Action::Reveal(pos));
                }
            }
            return (best_score, best_action);
        }

        (self.evaluate(board), None)
    }

    /// 获取上次搜索访问的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flip_core::{Piece, Position, Rank};

    fn revealed(rank: Rank, side: Side) -> Piece {
        let mut piece = Piece::new(rank, side);
        piece.reveal();
        piece
    }

    #[test]
    fn test_depth_zero_is_static_eval() {
        let mut board = Board::empty();
        board.set(Position::new_unchecked(0, 0), Some(revealed(Rank::Queen, Side::One)));
        board.set(Position::new_unchecked(3, 7), Some(revealed(Rank::Knight, Side::Two)));

        let mut agent = MinMaxAgent::new(SearchConfig::with_depth(Side::One, 0));
        let (score, action) = agent.minimax(&board, 0, true, 0);
        assert_eq!(score, 7.0 - 2.5);
        assert!(action.is_none());
    }

    #[test]
    fn test_prefers_winning_capture() {
        // 己方后可以吃掉对方最后一枚车，吃掉后立即获胜
        let mut board = Board::empty();
        let from = Position::new_unchecked(1, 1);
        let target = Position::new_unchecked(1, 2);
        board.set(from, Some(revealed(Rank::Queen, Side::One)));
        board.set(target, Some(revealed(Rank::Rook, Side::Two)));

        let mut agent = MinMaxAgent::new(SearchConfig::new(Side::One));
        let action = agent.choose_action(&board, 0);
        assert_eq!(action, Some(Action::Move { from, to: target }));
    }

    #[test]
    fn test_reveal_fallback_when_no_moves() {
        // 己方没有已翻开的棋子，只能退化为翻子
        let mut board = Board::empty();
        board.set(Position::new_unchecked(0, 0), Some(Piece::new(Rank::King, Side::One)));
        board.set(Position::new_unchecked(3, 7), Some(Piece::new(Rank::King, Side::Two)));

        let mut agent = MinMaxAgent::new(SearchConfig::with_depth(Side::One, 2));
        let action = agent.choose_action(&board, 0);
        assert!(matches!(action, Some(Action::Reveal(_))));
    }

    #[test]
    fn test_deterministic_tie_break() {
        // 两个等价走子之间取生成顺序靠前者
        let mut board = Board::empty();
        let from = Position::new_unchecked(1, 4);
        board.set(from, Some(revealed(Rank::Pawn, Side::One)));
        board.set(Position::new_unchecked(3, 0), Some(revealed(Rank::Pawn, Side::Two)));

        let mut agent = MinMaxAgent::new(SearchConfig::with_depth(Side::One, 1));
        let first = agent.choose_action(&board, 0);
        let second = agent.choose_action(&board, 0);
        assert_eq!(first, second);
        // 生成顺序首个方向是向上
        assert_eq!(
            first,
            Some(Action::Move {
                from,
                to: Position::new_unchecked(0, 4),
            })
        );
    }

    #[test]
    fn test_terminal_overrides_depth() {
        // 对方已经零子且全部翻开：任意深度都直接返回 +80
        let mut board = Board::empty();
        board.set(Position::new_unchecked(0, 0), Some(revealed(Rank::King, Side::One)));

        let mut agent = MinMaxAgent::new(SearchConfig::with_depth(Side::One, 3));
        let (score, action) = agent.minimax(&board, 3, true, 0);
        assert_eq!(score, WIN_SCORE);
        assert!(action.is_none());

        let mut loser = MinMaxAgent::new(SearchConfig::with_depth(Side::Two, 3));
        let (score, _) = loser.minimax(&board, 3, true, 0);
        assert_eq!(score, -WIN_SCORE);
    }
}
