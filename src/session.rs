//! Training session over a variation tree.
//!
//! The learner plays one side; whenever the recorded line continues with the
//! other color, the [`TrainingSelector`] picks the reply. Every accepted move
//! counts a visit on the node entered, every rejected move counts a mistake on
//! the node where it was tried.

use crate::board::{BoardPosition, Color, Coordinate};
use crate::error::Result;
use crate::selector::TrainingSelector;
use crate::tree::{Candidates, NodeId, VariationTree};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    EndOfVariation,
}

/// What happened to a move submitted by the learner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The variation already ended; nothing changed.
    Finished,
    /// Not a recorded continuation. Counts one mistake on the current node.
    Mistake {
        node_mistakes: u32,
        total_mistakes: u64,
        /// The recorded continuations that would have been accepted.
        candidates: Vec<Coordinate>,
    },
    /// The move was accepted.
    Played {
        /// Stones removed by the learner's move and the reply.
        captured: Vec<Coordinate>,
        /// Automated reply, if one was played.
        reply: Option<(Color, Coordinate)>,
        state: SessionState,
    },
}

pub struct Session {
    tree: VariationTree,
    selector: TrainingSelector,
    start: NodeId,
    initial_board: BoardPosition,
    board: BoardPosition,
    current: NodeId,
    candidates: Candidates,
    state: SessionState,
    learner: Color,
    moves_played: usize,
    /// Nodes charged with a mistake this session, most recent last.
    mistakes: Vec<NodeId>,
}

impl Session {
    /// Start a session at the first branch point of `tree`.
    ///
    /// # Errors
    /// `EmptyRecord` if the tree holds no move.
    pub fn new(tree: VariationTree, selector: TrainingSelector) -> Result<Self> {
        let (start, initial_board) = tree.advance_to_first_branch_point()?;
        let candidates = tree.children_by_move(start);
        let learner = candidates.color().unwrap_or(Color::Black);
        log::info!(
            "session starts at node {start}, learner plays {learner}, {} candidates",
            candidates.len()
        );
        Ok(Self {
            board: initial_board.clone(),
            tree,
            selector,
            start,
            initial_board,
            current: start,
            candidates,
            state: SessionState::Playing,
            learner,
            moves_played: 0,
            mistakes: Vec::new(),
        })
    }

    pub fn tree(&self) -> &VariationTree {
        &self.tree
    }

    /// End the session, handing back the tree with its statistics.
    pub fn into_tree(self) -> VariationTree {
        self.tree
    }

    pub fn board(&self) -> &BoardPosition {
        &self.board
    }

    pub fn candidates(&self) -> &Candidates {
        &self.candidates
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Color the learner plays at the start of the session.
    pub fn learner(&self) -> Color {
        self.learner
    }

    pub fn total_mistakes(&self) -> u64 {
        self.tree.total_mistake_count()
    }

    pub fn comment(&self) -> Option<&str> {
        self.tree.comment(self.current)
    }

    /// Submit a learner move.
    pub fn human_move(&mut self, coord: Coordinate) -> MoveOutcome {
        if self.state == SessionState::EndOfVariation {
            return MoveOutcome::Finished;
        }

        let size = self.board.size();
        let legal = (coord.is_tenuki() || coord.on_board(size)) && !self.board.is_occupied(coord);
        let child = if legal { self.candidates.get(coord) } else { None };
        let Some(child) = child else {
            self.tree.record_mistake(self.current);
            self.mistakes.push(self.current);
            log::debug!("mistake at node {}: {coord}", self.current);
            return MoveOutcome::Mistake {
                node_mistakes: self.tree.node(self.current).mistake_count(),
                total_mistakes: self.tree.total_mistake_count(),
                candidates: self.candidates.coordinates().collect(),
            };
        };

        let played_color = self.tree.move_of(child).map(|(c, _)| c).unwrap_or(self.learner);
        let mut captured = self.enter(child);
        if self.state == SessionState::EndOfVariation {
            return MoveOutcome::Played {
                captured,
                reply: None,
                state: self.state,
            };
        }

        let mut reply = None;
        if self.candidates.color() != Some(played_color) {
            if let Some(reply_coord) = self.selector.select(&self.tree, &self.candidates) {
                if let Some(reply_node) = self.candidates.get(reply_coord) {
                    let color = self
                        .tree
                        .move_of(reply_node)
                        .map(|(c, _)| c)
                        .unwrap_or(played_color.opponent());
                    captured.extend(self.enter(reply_node));
                    reply = Some((color, reply_coord));
                }
            }
        }

        MoveOutcome::Played {
            captured,
            reply,
            state: self.state,
        }
    }

    /// Make `node` current: count the visit, update the board and candidates.
    ///
    /// Nodes without a move (comments, setup) below `node` are entered in
    /// turn until a node offers moves. The variation ends only at a leaf.
    fn enter(&mut self, node: NodeId) -> Vec<Coordinate> {
        self.moves_played += 1;
        let mut captured = Vec::new();
        let mut next = Some(node);
        while let Some(id) = next {
            self.current = id;
            self.tree.record_visit(id);
            captured.extend(self.board.apply_node(&self.tree, id, self.moves_played));
            self.candidates = self.tree.children_by_move(id);
            next = if self.candidates.is_empty() {
                self.tree.node(id).children().first().copied()
            } else {
                None
            };
        }
        if self.candidates.is_empty() {
            log::debug!("end of variation at node {}", self.current);
            self.state = SessionState::EndOfVariation;
        }
        captured
    }

    /// Go back to the first branch point with the initial position.
    pub fn restart(&mut self) {
        self.current = self.start;
        self.board = self.initial_board.clone();
        self.candidates = self.tree.children_by_move(self.start);
        self.state = SessionState::Playing;
        self.moves_played = 0;
    }

    /// Withdraw the most recent mistake of this session.
    ///
    /// Returns false when there is nothing left to withdraw.
    pub fn reject_last_mistake(&mut self) -> bool {
        while let Some(node) = self.mistakes.pop() {
            if self.tree.reject_mistake(node) {
                return true;
            }
        }
        false
    }
}
