//! 表格型 Q-Learning 代理
//!
//! 动作空间是粗粒度的（翻子/走子二选一），具体翻哪个、走哪步
//! 在执行时从当前合法选项中均匀随机抽取，不单独估值。
//! 状态键是完整棋盘快照（含未翻开棋子的真实身份，全知简化），
//! Q 值表无容量上限，随访问过的局面数无界增长。

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use flip_core::{Board, GameResult, Result, Side, Snapshot};

use crate::action::{valid_moves, Action};

/// 粗粒度动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoarseAction {
    /// 随机翻开一枚未翻开的棋子
    Flip,
    /// 随机执行一步合法的走子或吃子
    Move,
}

/// 完整动作词表，Q 值更新中的 max 始终在这个范围上取
pub const ACTION_VOCAB: [CoarseAction; 2] = [CoarseAction::Flip, CoarseAction::Move];

/// Q 值表：(状态快照, 粗粒度动作) -> 价值
pub type QTable = HashMap<(Snapshot, CoarseAction), f32>;

/// 一条经验
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub state: Snapshot,
    pub action: CoarseAction,
    pub reward: f32,
    pub next_state: Snapshot,
}

/// 单步执行的结果
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// 执行后的状态快照
    pub next_state: Snapshot,
    /// 本步奖励（终局奖励已叠加）
    pub reward: f32,
    /// 回合是否结束
    pub done: bool,
    /// 人类可读的动作描述，供训练日志使用
    pub detail: String,
}

/// Q-Learning 超参数
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QConfig {
    /// 学习率
    pub alpha: f32,
    /// 折扣因子
    pub gamma: f32,
    /// 探索率
    pub epsilon: f32,
}

impl Default for QConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            gamma: 0.8,
            epsilon: 0.1,
        }
    }
}

/// Q-Learning 代理
pub struct QLearningAgent {
    config: QConfig,
    side: Side,
    q_table: QTable,
    rng: ChaCha8Rng,
}

impl QLearningAgent {
    /// 用默认超参数创建代理
    pub fn new(side: Side) -> Self {
        Self::with_config(side, QConfig::default())
    }

    /// 用指定超参数创建代理
    pub fn with_config(side: Side, config: QConfig) -> Self {
        Self {
            config,
            side,
            q_table: QTable::new(),
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// 用固定随机种子创建代理（保证可复现）
    pub fn with_seed(side: Side, config: QConfig, seed: u64) -> Self {
        Self {
            config,
            side,
            q_table: QTable::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// 执棋方
    pub fn side(&self) -> Side {
        self.side
    }

    /// 当前状态快照
    pub fn state(&self, board: &Board) -> Snapshot {
        board.snapshot()
    }

    /// 已学习的 (状态, 动作) 条目数
    pub fn table_len(&self) -> usize {
        self.q_table.len()
    }

    /// 读取 Q 值（未见过的条目取 0）
    pub fn q_value(&self, state: &Snapshot, action: CoarseAction) -> f32 {
        self.q_table
            .get(&(state.clone(), action))
            .copied()
            .unwrap_or(0.0)
    }

    /// 替换整张 Q 值表（加载持久化数据时使用）
    pub fn set_table(&mut self, table: QTable) {
        self.q_table = table;
    }

    /// 获取 Q 值表引用（保存持久化数据时使用）
    pub fn table(&self) -> &QTable {
        &self.q_table
    }

    /// ε-贪心选择粗粒度动作
    ///
    /// 棋盘上已无未翻开棋子时，翻子动作从候选集中剔除。
    /// 贪心分支按候选顺序取第一个最大值。
    pub fn choose_action(&mut self, state: &Snapshot, board: &Board) -> CoarseAction {
        let flip_available = !board.unrevealed_positions().is_empty();
        let candidates: &[CoarseAction] = if flip_available {
            &ACTION_VOCAB
        } else {
            &[CoarseAction::Move]
        };

        if self.rng.gen::<f32>() < self.config.epsilon {
            return candidates[self.rng.gen_range(0..candidates.len())];
        }

        let mut best = candidates[0];
        let mut best_q = self.q_value(state, best);
        for &action in &candidates[1..] {
            let q = self.q_value(state, action);
            if q > best_q {
                best = action;
                best_q = q;
            }
        }
        best
    }

    /// 执行一步粗粒度动作
    ///
    /// 翻子在没有未翻开棋子时退化为走子；走子无合法选项时
    /// 记 -1 并结束回合（无步可走判负）。执行后重新判定终局，
    /// 己方获胜额外叠加 +80 奖励。
    pub fn step(
        &mut self,
        action: CoarseAction,
        board: &mut Board,
        step_count: u32,
    ) -> Result<StepOutcome> {
        let mut action = action;
        let mut reward = 0.0;
        let mut done = false;
        let mut detail = String::new();

        if action == CoarseAction::Flip {
            let unrevealed = board.unrevealed_positions();
            if unrevealed.is_empty() {
                action = CoarseAction::Move;
            } else {
                let pos = unrevealed[self.rng.gen_range(0..unrevealed.len())];
                Action::Reveal(pos).apply(board)?;
                reward = -1.0;
                if let Some(piece) = board.get(pos) {
                    detail = format!("flipped {} at {}", piece.rank.to_char(piece.side), pos);
                }
            }
        }

        if action == CoarseAction::Move {
            let moves = valid_moves(board, self.side);
            if moves.is_empty() {
                reward = -1.0;
                done = true;
                detail = "no legal move".to_string();
            } else {
                let (from, to) = moves[self.rng.gen_range(0..moves.len())];
                if board.get(to).is_none() {
                    Action::Move { from, to }.apply(board)?;
                    reward = -1.0;
                    detail = format!("moved piece from {} to {}", from, to);
                } else if board.is_valid_capture(from, to) {
                    let captured = board.get(to);
                    Action::Move { from, to }.apply(board)?;
                    reward = 4.0;
                    if let Some(captured) = captured {
                        detail = format!(
                            "captured {} at {} with piece from {}",
                            captured.rank.to_char(captured.side),
                            to,
                            from
                        );
                    }
                } else {
                    // 防御分支：按生成规则不应到达
                    reward = -1.0;
                    done = true;
                    detail = format!("generation mismatch: {} -> {}", from, to);
                }
            }
        }

        let winner = board.check_winner(step_count);
        if winner.is_resolved() {
            if winner == GameResult::Winner(self.side) {
                reward += 80.0;
            }
            done = true;
        }

        Ok(StepOutcome {
            next_state: board.snapshot(),
            reward,
            done,
            detail,
        })
    }

    /// 单步 Q-Learning 更新
    ///
    /// 下一状态的 max 在完整动作词表上取，而不只是当下合法的动作。
    pub fn update(
        &mut self,
        state: &Snapshot,
        action: CoarseAction,
        reward: f32,
        next_state: &Snapshot,
    ) {
        let old_q = self.q_value(state, action);
        let next_max = ACTION_VOCAB
            .iter()
            .map(|&a| self.q_value(next_state, a))
            .fold(f32::NEG_INFINITY, f32::max);
        let new_q = old_q + self.config.alpha * (reward + self.config.gamma * next_max - old_q);
        self.q_table.insert((state.clone(), action), new_q);
    }

    /// 从一批经验回放更新
    pub fn update_from_experience(&mut self, experiences: &[Experience]) {
        for exp in experiences {
            self.update(&exp.state, exp.action, exp.reward, &exp.next_state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flip_core::{Piece, Position, Rank};
    use rand::rngs::StdRng;

    fn revealed(rank: Rank, side: Side) -> Piece {
        let mut piece = Piece::new(rank, side);
        piece.reveal();
        piece
    }

    #[test]
    fn test_q_update_formula() {
        let mut agent = QLearningAgent::with_seed(Side::One, QConfig::default(), 1);
        let board = Board::empty();
        let state = board.snapshot();

        let mut next_board = Board::empty();
        next_board.set(Position::new_unchecked(0, 0), Some(revealed(Rank::Pawn, Side::One)));
        let next_state = next_board.snapshot();

        // 预置下一状态的最大 Q 值为 2
        agent
            .q_table
            .insert((next_state.clone(), CoarseAction::Move), 2.0);
        agent
            .q_table
            .insert((next_state.clone(), CoarseAction::Flip), 1.0);

        // Q = 0 + 0.3 * (4 + 0.8 * 2 - 0) = 1.68
        agent.update(&state, CoarseAction::Move, 4.0, &next_state);
        let q = agent.q_value(&state, CoarseAction::Move);
        assert!((q - 1.68).abs() < 1e-6, "expected 1.68, got {}", q);
    }

    #[test]
    fn test_flip_excluded_when_all_revealed() {
        let mut board = Board::empty();
        board.set(Position::new_unchecked(0, 0), Some(revealed(Rank::King, Side::One)));
        board.set(Position::new_unchecked(3, 7), Some(revealed(Rank::King, Side::Two)));

        let mut agent = QLearningAgent::with_seed(Side::One, QConfig::default(), 2);
        let state = agent.state(&board);
        for _ in 0..50 {
            assert_eq!(agent.choose_action(&state, &board), CoarseAction::Move);
        }
    }

    #[test]
    fn test_greedy_prefers_learned_value() {
        let mut rng = StdRng::seed_from_u64(3);
        let board = Board::initial_with_rng(&mut rng);
        let state = board.snapshot();

        // ε = 0：纯贪心
        let config = QConfig {
            epsilon: 0.0,
            ..QConfig::default()
        };
        let mut agent = QLearningAgent::with_seed(Side::One, config, 4);
        agent.q_table.insert((state.clone(), CoarseAction::Move), 5.0);
        agent.q_table.insert((state.clone(), CoarseAction::Flip), 1.0);

        assert_eq!(agent.choose_action(&state, &board), CoarseAction::Move);

        // 未见过的状态全部默认 0，按候选顺序取第一个（翻子）
        let mut fresh = QLearningAgent::with_seed(Side::One, config, 5);
        assert_eq!(fresh.choose_action(&state, &board), CoarseAction::Flip);
    }

    #[test]
    fn test_flip_step_reveals_and_penalizes() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut board = Board::initial_with_rng(&mut rng);
        let mut agent = QLearningAgent::with_seed(Side::One, QConfig::default(), 7);

        let outcome = agent.step(CoarseAction::Flip, &mut board, 0).unwrap();
        assert_eq!(outcome.reward, -1.0);
        assert!(!outcome.done);
        assert_eq!(board.unrevealed_positions().len(), 31);
        assert!(outcome.detail.starts_with("flipped"));
    }

    #[test]
    fn test_move_step_without_options_ends_episode() {
        // 己方没有已翻开的棋子且棋盘全开：无步可走判负
        let mut board = Board::empty();
        board.set(Position::new_unchecked(0, 0), Some(revealed(Rank::King, Side::Two)));
        let mut agent = QLearningAgent::with_seed(Side::One, QConfig::default(), 8);

        let outcome = agent.step(CoarseAction::Move, &mut board, 0).unwrap();
        assert_eq!(outcome.reward, -1.0);
        assert!(outcome.done);
    }

    #[test]
    fn test_winning_capture_stacks_terminal_bonus() {
        // 角落里的王唯一合法动作是吃马（兵吃不了，空格没有）。
        // 吃完己方 10 分对 1 分，步数已达上限，+4 吃子奖励叠加 +80 终局奖励。
        let mut board = Board::empty();
        let from = Position::new_unchecked(0, 0);
        let to = Position::new_unchecked(1, 0);
        board.set(from, Some(revealed(Rank::King, Side::One)));
        board.set(Position::new_unchecked(0, 1), Some(revealed(Rank::Pawn, Side::Two)));
        board.set(to, Some(revealed(Rank::Knight, Side::Two)));

        let mut agent = QLearningAgent::with_seed(Side::One, QConfig::default(), 9);
        let outcome = agent.step(CoarseAction::Move, &mut board, 150).unwrap();

        assert_eq!(outcome.reward, 84.0);
        assert!(outcome.done);
        assert!(board.get(from).is_none());
        assert_eq!(board.get(to).unwrap().rank, Rank::King);
    }

    #[test]
    fn test_flip_degrades_to_move_when_all_revealed() {
        let mut board = Board::empty();
        let from = Position::new_unchecked(1, 1);
        board.set(from, Some(revealed(Rank::Rook, Side::One)));
        board.set(Position::new_unchecked(3, 7), Some(revealed(Rank::King, Side::Two)));

        let mut agent = QLearningAgent::with_seed(Side::One, QConfig::default(), 10);
        let outcome = agent.step(CoarseAction::Flip, &mut board, 0).unwrap();

        // 翻子退化为走子
        assert_eq!(outcome.reward, -1.0);
        assert!(outcome.detail.starts_with("moved"));
    }

    #[test]
    fn test_update_from_experience() {
        let mut agent = QLearningAgent::with_seed(Side::One, QConfig::default(), 11);
        let state = Board::empty().snapshot();
        let mut next_board = Board::empty();
        next_board.set(Position::new_unchecked(0, 0), Some(revealed(Rank::Pawn, Side::One)));
        let next_state = next_board.snapshot();

        let experiences = vec![Experience {
            state: state.clone(),
            action: CoarseAction::Flip,
            reward: -1.0,
            next_state,
        }];
        agent.update_from_experience(&experiences);

        // Q = 0 + 0.3 * (-1 + 0.8 * 0 - 0) = -0.3
        let q = agent.q_value(&state, CoarseAction::Flip);
        assert!((q + 0.3).abs() < 1e-6);
    }
}
