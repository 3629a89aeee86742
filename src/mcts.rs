//! Monte Carlo Tree Search (MCTS) with UCT selection.
//!
//! Each iteration runs four phases:
//! - selection: descend by UCT score while nodes are fully expanded
//! - expansion: add one random untried play as a new child
//! - simulation: score the new node with a biased [`rollout`]
//! - backpropagation: add the reward to every node on the path
//!
//! Nodes own their children, and backpropagation walks the recorded path
//! of child indices instead of following parent pointers.
//!
//! Rewards are squashed into `[-1, 1]` and stored from the point of view of
//! the player who made the play leading into each node, so every parent
//! picks the child that is best for the side choosing it. The statistics do
//! not depend on which color the AI plays, which keeps a retained tree
//! valid after re-rooting with [`TreeNode::into_child`].

use fastrand::Rng;
use log::{debug, log_enabled, trace, Level};

use crate::board::Color;
use crate::constants::{N_ITERATIONS, REWARD_SCALE, ROLLOUT_DEPTH, ROLLOUT_EPSILON, UCT_C};
use crate::eval::evaluate_board;
use crate::error::SearchError;
use crate::playout::{has_winning_move, rollout};
use crate::state::{GameState, Play};

/// Tunable MCTS parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MctsParams {
    pub iterations: usize,
    pub rollout_depth: usize,
    /// UCT exploration constant.
    pub exploration: f64,
    /// Greedy probability in the rollout policy.
    pub epsilon: f64,
}

impl Default for MctsParams {
    fn default() -> Self {
        Self {
            iterations: N_ITERATIONS,
            rollout_depth: ROLLOUT_DEPTH,
            exploration: UCT_C,
            epsilon: ROLLOUT_EPSILON,
        }
    }
}

/// A node in the MCTS search tree.
pub struct TreeNode {
    /// The game state at this node
    pub state: GameState,
    /// The play that produced `state` (`None` for a fresh root)
    pub play: Option<Play>,
    /// Index of `play` in the parent's `valid_plays()`, used for tie-breaks
    pub order: usize,
    /// Number of visits
    pub visits: u32,
    /// Sum of rewards for the player who made `play`
    pub total_reward: f64,
    /// Expanded children
    pub children: Vec<TreeNode>,
    /// Plays not yet expanded, tagged with their canonical index
    pub untried: Vec<(usize, Play)>,
}

impl TreeNode {
    /// Create a node for `state`, reached by `play`.
    pub fn new(state: GameState, play: Option<Play>) -> Self {
        Self::with_order(state, play, 0)
    }

    fn with_order(state: GameState, play: Option<Play>, order: usize) -> Self {
        let untried = if state.is_game_over(play) {
            Vec::new()
        } else {
            state.valid_plays().into_iter().enumerate().collect()
        };
        Self {
            state,
            play,
            order,
            visits: 0,
            total_reward: 0.0,
            children: Vec::new(),
            untried,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state.is_game_over(self.play)
    }

    /// Average reward for the player who made `play`.
    #[inline]
    pub fn mean_reward(&self) -> f64 {
        if self.visits > 0 {
            self.total_reward / self.visits as f64
        } else {
            0.0
        }
    }

    /// The player who made the play leading here.
    #[inline]
    fn mover(&self) -> Color {
        self.state.current_player().opponent()
    }

    /// Detach the child reached by `play`, dropping the rest of the tree.
    pub fn into_child(self, play: Play) -> Option<TreeNode> {
        self.children.into_iter().find(|c| c.play == Some(play))
    }
}

/// UCT score of `child` under a parent with `parent_visits` visits.
fn uct_score(child: &TreeNode, parent_visits: u32, c: f64) -> f64 {
    if child.visits == 0 {
        return f64::INFINITY;
    }
    let n = child.visits as f64;
    child.total_reward / n + c * ((parent_visits.max(1) as f64).ln() / n).sqrt()
}

/// Select the child with the highest UCT score. Ties go to the first.
fn most_urgent(node: &TreeNode, c: f64) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, child) in node.children.iter().enumerate() {
        let score = uct_score(child, node.visits, c);
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    best
}

/// Descend from the root to a node that is terminal, has untried plays,
/// or has no children. Returns the path of child indices.
fn tree_descend(tree: &TreeNode, c: f64) -> Vec<usize> {
    let mut path = Vec::new();
    let mut node = tree;

    while !node.is_terminal() && node.untried.is_empty() && !node.children.is_empty() {
        let idx = most_urgent(node, c);
        path.push(idx);
        node = &node.children[idx];
    }

    path
}

fn node_at_mut<'a>(tree: &'a mut TreeNode, path: &[usize]) -> &'a mut TreeNode {
    path.iter().fold(tree, |node, &idx| &mut node.children[idx])
}

/// Expand one random untried play of the node at `path`, extending `path`
/// to the new child. Does nothing on terminal or fully expanded nodes.
fn expand(tree: &mut TreeNode, path: &mut Vec<usize>, rng: &mut Rng) {
    let leaf = node_at_mut(tree, path.as_slice());
    if leaf.untried.is_empty() || leaf.is_terminal() {
        return;
    }
    let (order, play) = leaf.untried.swap_remove(rng.usize(..leaf.untried.len()));
    if let Ok(child_state) = leaf.state.play(play) {
        leaf.children.push(TreeNode::with_order(child_state, Some(play), order));
        path.push(leaf.children.len() - 1);
    }
}

/// Add `reward` (from `ai_color`'s point of view) to every node on `path`,
/// flipped for nodes whose play was made by the opponent.
fn tree_update(tree: &mut TreeNode, path: &[usize], reward: f64, ai_color: Color) {
    let credit = |node: &mut TreeNode| {
        node.visits += 1;
        node.total_reward += if node.mover() == ai_color { reward } else { -reward };
    };

    credit(&mut *tree);
    let mut node = tree;
    for &idx in path {
        node = &mut node.children[idx];
        credit(&mut *node);
    }
}

/// Score the node at `path` for `ai_color`, squashed into `[-1, 1]`.
fn simulate(
    tree: &TreeNode,
    path: &[usize],
    params: &MctsParams,
    ai_color: Color,
    rng: &mut Rng,
) -> f64 {
    let node = path.iter().fold(tree, |node, &idx| &node.children[idx]);
    let score = if node.is_terminal() {
        evaluate_board(&node.state, node.play, ai_color)
    } else {
        rollout(
            &node.state,
            node.play,
            params.rollout_depth,
            ai_color,
            params.epsilon,
            rng,
        )
    };
    (score as f64 / REWARD_SCALE).tanh()
}

/// Run `params.iterations` MCTS iterations from `root` and return the
/// chosen play for `ai_color`, who must be the side to move at the root.
pub fn tree_search(
    root: &mut TreeNode,
    params: &MctsParams,
    ai_color: Color,
    rng: &mut Rng,
) -> Option<Play> {
    for _ in 0..params.iterations.max(1) {
        let mut path = tree_descend(root, params.exploration);
        expand(root, &mut path, rng);
        let reward = simulate(root, &path, params, ai_color, rng);
        tree_update(root, &path, reward, ai_color);
    }

    let best = best_child(root, ai_color)?;
    debug!(
        "mcts {} iterations: best {} visits {} mean {:.3} ({} children)",
        params.iterations,
        best.play.map(|p| p.to_string()).unwrap_or_default(),
        best.visits,
        best.mean_reward(),
        root.children.len()
    );
    if log_enabled!(Level::Trace) {
        dump_children(root);
    }
    best.play
}

/// The most visited root child, skipping children that lose for
/// `ai_color` outright or leave the opponent a winning move, as long as
/// some other child is left.
///
/// Ties on visits go to the higher total reward, then to the earlier play
/// in canonical order.
pub fn best_child(root: &TreeNode, ai_color: Color) -> Option<&TreeNode> {
    let risky = |child: &TreeNode| {
        child.state.check_lose() == Some(ai_color)
            || (!child.is_terminal() && has_winning_move(&child.state))
    };
    let safe: Vec<&TreeNode> = root.children.iter().filter(|c| !risky(*c)).collect();
    let candidates: Vec<&TreeNode> = if safe.is_empty() {
        root.children.iter().collect()
    } else {
        safe
    };

    candidates.into_iter().reduce(|best, c| {
        let better = c.visits > best.visits
            || (c.visits == best.visits && c.total_reward > best.total_reward)
            || (c.visits == best.visits
                && c.total_reward == best.total_reward
                && c.order < best.order);
        if better { c } else { best }
    })
}

/// Pick a play for `ai_color` with a fresh tree and an RNG seeded by `seed`.
pub fn mcts_search(
    state: &GameState,
    iterations: usize,
    rollout_depth: usize,
    ai_color: Color,
    seed: u64,
) -> Result<Play, SearchError> {
    if state.check_lose().is_some() {
        return Err(SearchError::GameOver);
    }
    let params = MctsParams {
        iterations,
        rollout_depth,
        ..MctsParams::default()
    };
    let mut rng = Rng::with_seed(seed);
    let mut root = TreeNode::new(state.clone(), None);
    tree_search(&mut root, &params, ai_color, &mut rng).ok_or(SearchError::NoLegalMoves)
}

/// MCTS player that can keep its tree between real plays.
pub struct Mcts {
    params: MctsParams,
    rng: Rng,
    tree: Option<TreeNode>,
    reuse_tree: bool,
}

impl Mcts {
    pub fn new(params: MctsParams, seed: u64, reuse_tree: bool) -> Self {
        Self {
            params,
            rng: Rng::with_seed(seed),
            tree: None,
            reuse_tree,
        }
    }

    /// Search `state` (reached by `last_play`) and return a play for
    /// `ai_color`. A retained tree is used if its root matches `state`.
    ///
    /// The tree is kept rooted at `state`; call [`Mcts::advance`] with every
    /// play made on the real board, including the one returned here.
    pub fn search(
        &mut self,
        state: &GameState,
        last_play: Option<Play>,
        ai_color: Color,
    ) -> Result<Play, SearchError> {
        if state.is_game_over(last_play) {
            return Err(SearchError::GameOver);
        }
        let mut root = match self.tree.take() {
            Some(tree) if tree.state == *state => {
                debug!("mcts reusing tree with {} visits", tree.visits);
                tree
            }
            _ => TreeNode::new(state.clone(), last_play),
        };
        let play = tree_search(&mut root, &self.params, ai_color, &mut self.rng)
            .ok_or(SearchError::NoLegalMoves)?;
        if self.reuse_tree {
            self.tree = Some(root);
        }
        Ok(play)
    }

    /// Follow a play made on the real board. The tree is dropped if the
    /// play was never explored.
    pub fn advance(&mut self, play: Play) {
        self.tree = self.tree.take().and_then(|tree| tree.into_child(play));
    }

    /// Forget the retained tree.
    pub fn reset(&mut self) {
        self.tree = None;
    }
}

/// Log statistics for the root's children.
pub fn dump_children(root: &TreeNode) {
    for child in &root.children {
        trace!(
            "play {} v={} r={:.2} mean={:.3}",
            child.play.map(|p| p.to_string()).unwrap_or_default(),
            child.visits,
            child.total_reward,
            child.mean_reward()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    fn c(s: &str) -> Cell {
        s.parse().unwrap()
    }

    fn quick() -> MctsParams {
        MctsParams {
            iterations: 60,
            rollout_depth: 4,
            ..MctsParams::default()
        }
    }

    #[test]
    fn test_root_is_fully_expanded_first() {
        let state = GameState::new();
        let mut root = TreeNode::new(state.clone(), None);
        let n = state.valid_plays().len();
        let params = MctsParams { iterations: n, ..quick() };
        tree_search(&mut root, &params, Color::Black, &mut Rng::with_seed(1));
        assert_eq!(root.children.len(), n);
        assert!(root.untried.is_empty());
        assert_eq!(root.visits as usize, n);
        assert!(root.children.iter().all(|c| c.visits == 1));
    }

    #[test]
    fn test_update_credits_mover() {
        let state = GameState::new();
        let mut root = TreeNode::new(state, None);
        let mut path = Vec::new();
        expand(&mut root, &mut path, &mut Rng::with_seed(3));
        assert_eq!(path, vec![0]);

        // the child was made by Black; a reward good for White counts against it
        tree_update(&mut root, &path, 0.5, Color::White);
        assert_eq!(root.children[0].visits, 1);
        assert!((root.children[0].total_reward + 0.5).abs() < 1e-12);
        assert!((root.total_reward - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_into_child_keeps_subtree() {
        let mut root = TreeNode::new(GameState::new(), None);
        tree_search(&mut root, &quick(), Color::Black, &mut Rng::with_seed(5));
        let play = root.children[0].play.unwrap();
        let visits = root.children[0].visits;
        let child = root.into_child(play).unwrap();
        assert_eq!(child.visits, visits);
        assert_eq!(child.play, Some(play));
        assert!(TreeNode::new(GameState::new(), None).into_child(Play::Place(c("A1"))).is_none());
    }

    #[test]
    fn test_terminal_root_has_no_plays() {
        let pieces: Vec<(Cell, Color)> =
            ["A3", "B3", "C3", "D3", "E3"].iter().map(|s| (c(s), Color::Black)).collect();
        let state = GameState::from_parts(&pieces, 1, 6, Color::White).unwrap();
        let mut root = TreeNode::new(state, None);
        assert!(root.is_terminal());
        assert_eq!(tree_search(&mut root, &quick(), Color::White, &mut Rng::with_seed(9)), None);
    }
}
