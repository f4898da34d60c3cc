//! Choice of the automated reply.
//!
//! Lines never seen take priority. Once every candidate has been visited, a
//! candidate is drawn with weight
//!
//! ```text
//! w(c) = (1/N + mistakes(c)) / visits(c)
//! ```
//!
//! where N is the number of candidates. The `1/N` term keeps mastered lines
//! (many visits, no mistakes) in rotation at a low rate, while lines the
//! learner keeps getting wrong come back more often.

use crate::board::Coordinate;
use crate::tree::{Candidates, VariationTree};

/// Statistics behind one selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionStatistics {
    /// Candidates never visited; one is chosen uniformly.
    Unvisited(Vec<Coordinate>),
    /// Every candidate visited; roulette-wheel weights in candidate order.
    Weighted(Vec<(Coordinate, f64)>),
}

/// Compute the selection statistics for a candidate set.
pub fn statistics(tree: &VariationTree, candidates: &Candidates) -> SelectionStatistics {
    let unvisited: Vec<Coordinate> = candidates
        .iter()
        .filter(|&(_, id)| tree.node(id).visit_count() == 0)
        .map(|(c, _)| c)
        .collect();
    if !unvisited.is_empty() {
        return SelectionStatistics::Unvisited(unvisited);
    }

    let n = candidates.len() as f64;
    let weights = candidates
        .iter()
        .map(|(c, id)| {
            let node = tree.node(id);
            let w = (1.0 / n + node.mistake_count() as f64) / node.visit_count() as f64;
            (c, w)
        })
        .collect();
    SelectionStatistics::Weighted(weights)
}

/// Picks replies using a seedable random source.
pub struct TrainingSelector {
    rng: fastrand::Rng,
}

impl Default for TrainingSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingSelector {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Deterministic selector for reproducible sessions and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Choose the next line among `candidates`.
    ///
    /// Returns `None` only for an empty candidate set, which callers treat as
    /// the end of the variation.
    pub fn select(&mut self, tree: &VariationTree, candidates: &Candidates) -> Option<Coordinate> {
        if candidates.is_empty() {
            return None;
        }
        match statistics(tree, candidates) {
            SelectionStatistics::Unvisited(coords) => {
                let pick = coords[self.rng.usize(..coords.len())];
                log::debug!("selecting unvisited line {pick} among {}", coords.len());
                Some(pick)
            }
            SelectionStatistics::Weighted(weights) => {
                let total: f64 = weights.iter().map(|&(_, w)| w).sum();
                let draw = self.rng.f64() * total;
                log::debug!("roulette draw {draw:.4} of {total:.4}");
                let mut running = 0.0;
                for &(coord, w) in &weights {
                    running += w;
                    if running >= draw {
                        return Some(coord);
                    }
                }
                // Rounding can leave the draw just past the final sum.
                weights.last().map(|&(c, _)| c)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgf::parse;
    use crate::tree::NodeId;

    /// Root-level candidates: three black openings below one setup node.
    fn three_lines() -> (VariationTree, NodeId) {
        let tree = parse("(;C[start](;B[aa])(;B[bb])(;B[cc]))").unwrap();
        (tree, 1)
    }

    fn visit_all(tree: &mut VariationTree, start: NodeId, times: u32) {
        let children: Vec<NodeId> = tree.node(start).children().to_vec();
        for child in children {
            for _ in 0..times {
                tree.record_visit(child);
            }
        }
    }

    #[test]
    fn test_empty_candidates() {
        let (tree, _) = three_lines();
        let mut selector = TrainingSelector::with_seed(1);
        assert_eq!(selector.select(&tree, &Candidates::default()), None);
    }

    #[test]
    fn test_unvisited_first() {
        let (mut tree, start) = three_lines();
        // Visit aa and cc; bb stays unvisited.
        tree.record_visit(2);
        tree.record_visit(4);
        let candidates = tree.children_by_move(start);
        let mut selector = TrainingSelector::with_seed(42);
        for _ in 0..50 {
            assert_eq!(selector.select(&tree, &candidates), Some(Coordinate::new(2, 2)));
        }
    }

    #[test]
    fn test_weights() {
        let (mut tree, start) = three_lines();
        visit_all(&mut tree, start, 2);
        tree.record_mistake(3);
        let candidates = tree.children_by_move(start);
        let SelectionStatistics::Weighted(weights) = statistics(&tree, &candidates) else {
            panic!("expected weighted statistics");
        };
        let third = 1.0 / 3.0;
        assert!((weights[0].1 - third / 2.0).abs() < 1e-12);
        assert!((weights[1].1 - (third + 1.0) / 2.0).abs() < 1e-12);
        assert!((weights[2].1 - third / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_never_leaves_candidate_set() {
        let (mut tree, start) = three_lines();
        visit_all(&mut tree, start, 3);
        let candidates = tree.children_by_move(start);
        let mut selector = TrainingSelector::with_seed(7);
        for _ in 0..500 {
            let pick = selector.select(&tree, &candidates).unwrap();
            assert!(candidates.contains(pick));
        }
    }

    #[test]
    fn test_uniform_without_mistakes() {
        let (mut tree, start) = three_lines();
        visit_all(&mut tree, start, 5);
        let candidates = tree.children_by_move(start);
        let mut selector = TrainingSelector::with_seed(2024);
        let mut counts = [0usize; 3];
        let trials = 30_000;
        for _ in 0..trials {
            let pick = selector.select(&tree, &candidates).unwrap();
            counts[pick.x - 1] += 1;
        }
        for count in counts {
            let share = count as f64 / trials as f64;
            assert!((share - 1.0 / 3.0).abs() < 0.02, "share {share}");
        }
    }

    #[test]
    fn test_mistakes_resurface_line() {
        let (mut tree, start) = three_lines();
        visit_all(&mut tree, start, 4);
        for _ in 0..3 {
            tree.record_mistake(3);
        }
        let candidates = tree.children_by_move(start);
        let mut selector = TrainingSelector::with_seed(99);
        let mut bb = 0;
        let trials = 10_000;
        for _ in 0..trials {
            if selector.select(&tree, &candidates) == Some(Coordinate::new(2, 2)) {
                bb += 1;
            }
        }
        // Weight share of bb: (1/3 + 3) / (1/3 + 3 + 2/3) = 10/12.
        let share = bb as f64 / trials as f64;
        assert!((share - 10.0 / 12.0).abs() < 0.03, "share {share}");
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let (mut tree, start) = three_lines();
        visit_all(&mut tree, start, 1);
        let candidates = tree.children_by_move(start);
        let mut a = TrainingSelector::with_seed(5);
        let mut b = TrainingSelector::with_seed(5);
        let first: Vec<_> = (0..20).map(|_| a.select(&tree, &candidates)).collect();
        let second: Vec<_> = (0..20).map(|_| b.select(&tree, &candidates)).collect();
        assert_eq!(first, second);
    }
}
