//! Variation tree: every recorded line plus per-node learning statistics.
//!
//! Nodes live in an arena and refer to each other by index, so parent links
//! carry no ownership. Node 0 is a synthetic root holding whatever precedes the
//! first `;` of the record. After parsing, only the visit and mistake counters
//! change.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{BoardPosition, Color, Coordinate};
use crate::constants::{MOVE_TAGS, TAG_COMMENT};
use crate::error::{Result, TutorError};

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// The synthetic root node.
pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub tag: String,
    pub value: String,
}

impl Property {
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }

    pub fn is_move(&self) -> bool {
        MOVE_TAGS.contains(&self.tag.as_str())
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.tag, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationNode {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) properties: Vec<Property>,
    pub(crate) visit_count: u32,
    pub(crate) mistake_count: u32,
}

impl VariationNode {
    pub(crate) fn new(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            properties: Vec::new(),
            visit_count: 0,
            mistake_count: 0,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }

    pub fn mistake_count(&self) -> u32 {
        self.mistake_count
    }

    /// The node's `B` or `W` property, if any.
    pub fn move_property(&self) -> Option<&Property> {
        self.properties.iter().find(|p| p.is_move())
    }
}

/// Children of one node keyed by the coordinate of their move, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    color: Option<Color>,
    entries: Vec<(Coordinate, NodeId)>,
    inconsistent: bool,
}

impl Candidates {
    /// Color to move, taken from the first child with a move.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn get(&self, coord: Coordinate) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|(c, _)| *c == coord)
            .map(|&(_, id)| id)
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        self.get(coord).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, NodeId)> + '_ {
        self.entries.iter().copied()
    }

    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.entries.iter().map(|&(c, _)| c)
    }

    /// Whether sibling moves mixed colors.
    pub fn is_inconsistent(&self) -> bool {
        self.inconsistent
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationTree {
    board_size: usize,
    nodes: Vec<VariationNode>,
    total_mistake_count: u64,
}

impl VariationTree {
    pub(crate) fn from_nodes(board_size: usize, nodes: Vec<VariationNode>) -> Self {
        Self {
            board_size,
            nodes,
            total_mistake_count: 0,
        }
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn node(&self, id: NodeId) -> &VariationNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn total_mistake_count(&self) -> u64 {
        self.total_mistake_count
    }

    pub fn record_visit(&mut self, id: NodeId) {
        self.nodes[id].visit_count += 1;
    }

    pub fn record_mistake(&mut self, id: NodeId) {
        self.nodes[id].mistake_count += 1;
        self.total_mistake_count += 1;
    }

    /// Withdraw one mistake from a node. Counters stop at zero; returns
    /// whether anything was withdrawn.
    pub fn reject_mistake(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id];
        if node.mistake_count == 0 {
            return false;
        }
        node.mistake_count -= 1;
        self.total_mistake_count = self.total_mistake_count.saturating_sub(1);
        true
    }

    /// Color and coordinate of the node's move, if it has a readable one.
    pub fn move_of(&self, id: NodeId) -> Option<(Color, Coordinate)> {
        let prop = self.nodes[id].move_property()?;
        let color = Color::from_tag(&prop.tag)?;
        let coord = Coordinate::from_sgf(&prop.value, self.board_size)?;
        Some((color, coord))
    }

    /// The node's comment (`C` property), if any.
    pub fn comment(&self, id: NodeId) -> Option<&str> {
        self.nodes[id]
            .properties
            .iter()
            .find(|p| p.tag == TAG_COMMENT)
            .map(|p| p.value.as_str())
    }

    /// Node ids from the root down to `id`, inclusive.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cur = id;
        while let Some(parent) = self.nodes[cur].parent {
            path.push(parent);
            cur = parent;
        }
        path.reverse();
        path
    }

    /// Map each child's move coordinate to the child.
    ///
    /// Children without a move are skipped. If siblings mix colors, the
    /// first-seen color stays authoritative and the conflict is logged.
    pub fn children_by_move(&self, id: NodeId) -> Candidates {
        let mut candidates = Candidates::default();
        for &child in &self.nodes[id].children {
            let Some((color, coord)) = self.move_of(child) else {
                continue;
            };
            match candidates.color {
                None => candidates.color = Some(color),
                Some(expected) if expected != color => {
                    candidates.inconsistent = true;
                    let err = TutorError::InconsistentColor {
                        node: id,
                        child,
                        expected,
                        found: color,
                    };
                    log::warn!("{err}");
                }
                Some(_) => {}
            }
            if candidates.contains(coord) {
                log::warn!("node {id}: duplicate move {coord} in child {child}, keeping the first");
                continue;
            }
            candidates.entries.push((coord, child));
        }
        candidates
    }

    /// Find where a session starts: the parent of the first move in file order.
    ///
    /// Setup stones on the path from the root to that node make up the
    /// initial position.
    pub fn advance_to_first_branch_point(&self) -> Result<(NodeId, BoardPosition)> {
        let mut stack: Vec<NodeId> = self.nodes[ROOT].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.move_property().is_some() {
                let start = node.parent.unwrap_or(ROOT);
                let mut board = BoardPosition::new(self.board_size);
                for step in self.path_to(start) {
                    board.apply_node(self, step, 0);
                }
                log::debug!("session starts at node {start} with {} setup stones", board.len());
                return Ok((start, board));
            }
            stack.extend(node.children.iter().rev().copied());
        }
        Err(TutorError::EmptyRecord)
    }

    /// Check arena links and the mistake total after loading from disk.
    pub fn check_consistency(&self) -> Result<()> {
        let corrupt = |reason: String| TutorError::CorruptState { reason };
        if self.nodes.is_empty() {
            return Err(corrupt("tree has no root".to_string()));
        }
        if self.nodes[ROOT].parent.is_some() {
            return Err(corrupt("root has a parent".to_string()));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                if child >= self.nodes.len() || self.nodes[child].parent != Some(id) {
                    return Err(corrupt(format!("node {id} has a broken child link {child}")));
                }
            }
            if id != ROOT && node.parent.is_none() {
                return Err(corrupt(format!("node {id} is detached")));
            }
        }
        let sum: u64 = self.nodes.iter().map(|n| n.mistake_count as u64).sum();
        if sum != self.total_mistake_count {
            return Err(corrupt(format!(
                "mistake total {} does not match node sum {sum}",
                self.total_mistake_count
            )));
        }
        Ok(())
    }

}

/// Indented outline of the whole tree, one node per line, in file order.
impl fmt::Display for VariationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(ROOT, 0)];
        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id];
            let props: Vec<String> = node.properties.iter().map(|p| p.to_string()).collect();
            writeln!(
                f,
                "{}[{}] visits={} mistakes={}",
                "  ".repeat(depth),
                props.join(", "),
                node.visit_count,
                node.mistake_count
            )?;
            stack.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
        }
        Ok(())
    }
}
