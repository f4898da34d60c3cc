//! Board state derived from the walked path of a variation tree.
//!
//! Stones are keyed by 1-based coordinates. Captures are resolved with a
//! simplified rule set suited to lesson playback: after a stone is placed,
//! every opposing group left without liberties is removed, while the placed
//! stone's own group always stays, even with zero liberties. Neighbours off the
//! board are not liberties.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::constants::{
    COORD_TAGS, TAG_ADD_BLACK, TAG_ADD_EMPTY, TAG_ADD_WHITE, TAG_BLACK, TAG_WHITE,
    TT_PASS_MAX_SIZE,
};
use crate::tree::{NodeId, VariationTree};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Color placed by a move or setup tag.
    pub fn from_tag(tag: &str) -> Option<Color> {
        match tag {
            TAG_BLACK | TAG_ADD_BLACK => Some(Color::Black),
            TAG_WHITE | TAG_ADD_WHITE => Some(Color::White),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// A board intersection, 1-based, or the tenuki sentinel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    /// A move played elsewhere, outside the tracked board.
    pub const TENUKI: Coordinate = Coordinate { x: 0, y: 0 };

    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn is_tenuki(self) -> bool {
        self == Self::TENUKI
    }

    pub fn on_board(self, size: usize) -> bool {
        (1..=size).contains(&self.x) && (1..=size).contains(&self.y)
    }

    /// Decode a record value such as `pd`.
    ///
    /// Letters are case-insensitive. An empty value, and `tt` on boards up to
    /// 19x19, mean tenuki. Returns `None` for anything else outside the first
    /// `size` letters.
    pub fn from_sgf(value: &str, size: usize) -> Option<Coordinate> {
        if value.is_empty() || (value.eq_ignore_ascii_case("tt") && size <= TT_PASS_MAX_SIZE) {
            return Some(Self::TENUKI);
        }
        let bytes = value.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let line = |b: u8| -> Option<usize> {
            let b = b.to_ascii_lowercase();
            if b.is_ascii_lowercase() && ((b - b'a') as usize) < size {
                Some((b - b'a') as usize + 1)
            } else {
                None
            }
        };
        Some(Coordinate::new(line(bytes[0])?, line(bytes[1])?))
    }

    /// Encode as a record value. Tenuki encodes as the empty string.
    pub fn to_sgf(self) -> String {
        if self.is_tenuki() {
            return String::new();
        }
        let letter = |v: usize| (b'a' + (v - 1) as u8) as char;
        format!("{}{}", letter(self.x), letter(self.y))
    }

    /// Parse user input: `tenuki`/`pass`, `16,4`, `16 4`, or record letters `pd`.
    ///
    /// Numeric lines start at 1; a zero is rejected rather than read as tenuki.
    pub fn parse_user(input: &str, size: usize) -> Option<Coordinate> {
        let s = input.trim();
        if s.eq_ignore_ascii_case("tenuki") || s.eq_ignore_ascii_case("pass") {
            return Some(Self::TENUKI);
        }
        let numbers: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        if numbers.len() == 2 {
            if let (Ok(x), Ok(y)) = (numbers[0].parse::<usize>(), numbers[1].parse::<usize>()) {
                return (x > 0 && y > 0).then(|| Coordinate::new(x, y));
            }
        }
        match Coordinate::from_sgf(s, size) {
            Some(c) if !c.is_tenuki() => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_tenuki() {
            write!(f, "tenuki")
        } else {
            write!(f, "{},{}", self.x, self.y)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Stone {
    pub coord: Coordinate,
    pub color: Color,
    /// Move number within the session; 0 for setup stones.
    pub placement_index: usize,
}

/// All stones currently on the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardPosition {
    size: usize,
    stones: HashMap<Coordinate, Stone>,
}

impl BoardPosition {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            stones: HashMap::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, coord: Coordinate) -> Option<&Stone> {
        self.stones.get(&coord)
    }

    pub fn color_at(&self, coord: Coordinate) -> Option<Color> {
        self.stones.get(&coord).map(|s| s.color)
    }

    pub fn is_occupied(&self, coord: Coordinate) -> bool {
        self.stones.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.stones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stones.is_empty()
    }

    pub fn stones(&self) -> impl Iterator<Item = &Stone> {
        self.stones.values()
    }

    /// Put a stone down without resolving captures (setup stones).
    pub fn set(&mut self, stone: Stone) {
        if stone.coord.on_board(self.size) {
            self.stones.insert(stone.coord, stone);
        }
    }

    pub fn remove(&mut self, coord: Coordinate) -> Option<Stone> {
        self.stones.remove(&coord)
    }

    /// Place a stone and remove opposing groups left without liberties.
    ///
    /// Returns the captured coordinates. Tenuki and off-board stones change
    /// nothing.
    pub fn place(&mut self, stone: Stone) -> Vec<Coordinate> {
        if !stone.coord.on_board(self.size) {
            return Vec::new();
        }
        self.stones.insert(stone.coord, stone);

        let opp = stone.color.opponent();
        let mut examined: HashSet<Coordinate> = HashSet::new();
        let mut to_remove: Vec<Coordinate> = Vec::new();
        let opposing: Vec<Coordinate> = self
            .stones
            .values()
            .filter(|s| s.color == opp)
            .map(|s| s.coord)
            .collect();
        for start in opposing {
            if examined.contains(&start) {
                continue;
            }
            let group = self.group(start);
            examined.extend(group.iter().copied());
            if self.group_liberties(&group) == 0 {
                to_remove.extend(group);
            }
        }
        for c in &to_remove {
            self.stones.remove(c);
        }
        to_remove.sort();
        to_remove
    }

    /// On-board orthogonal neighbours.
    fn neighbors(&self, c: Coordinate) -> impl Iterator<Item = Coordinate> + '_ {
        let s = self.size;
        let mut v = Vec::with_capacity(4);
        if c.x > 1 {
            v.push(Coordinate::new(c.x - 1, c.y));
        }
        if c.x < s {
            v.push(Coordinate::new(c.x + 1, c.y));
        }
        if c.y > 1 {
            v.push(Coordinate::new(c.x, c.y - 1));
        }
        if c.y < s {
            v.push(Coordinate::new(c.x, c.y + 1));
        }
        v.into_iter()
    }

    /// The same-color group containing `start`, empty if the point is empty.
    pub fn group(&self, start: Coordinate) -> Vec<Coordinate> {
        let Some(color) = self.color_at(start) else {
            return Vec::new();
        };
        let mut stack = vec![start];
        let mut visited: HashSet<Coordinate> = HashSet::new();
        let mut out = Vec::new();
        while let Some(c) = stack.pop() {
            if !visited.insert(c) {
                continue;
            }
            if self.color_at(c) == Some(color) {
                out.push(c);
                for n in self.neighbors(c) {
                    if !visited.contains(&n) && self.color_at(n) == Some(color) {
                        stack.push(n);
                    }
                }
            }
        }
        out
    }

    /// Liberties of the group containing `start`; 0 for an empty point.
    pub fn liberties(&self, start: Coordinate) -> usize {
        let group = self.group(start);
        self.group_liberties(&group)
    }

    fn group_liberties(&self, group: &[Coordinate]) -> usize {
        let mut libs: HashSet<Coordinate> = HashSet::new();
        for &c in group {
            for n in self.neighbors(c) {
                if !self.is_occupied(n) {
                    libs.insert(n);
                }
            }
        }
        libs.len()
    }

    /// Apply the setup and move properties of one node.
    ///
    /// Setup stones get placement index 0 and capture nothing; a move stone
    /// gets `placement_index`. Returns the coordinates captured by the move.
    pub fn apply_node(
        &mut self,
        tree: &VariationTree,
        node: NodeId,
        placement_index: usize,
    ) -> Vec<Coordinate> {
        let mut captured = Vec::new();
        for prop in tree.node(node).properties() {
            let tag = prop.tag.as_str();
            if !COORD_TAGS.contains(&tag) {
                continue;
            }
            let Some(coord) = Coordinate::from_sgf(&prop.value, self.size) else {
                log::warn!("node {node}: skipping {tag}[{}], not a coordinate", prop.value);
                continue;
            };
            match tag {
                TAG_ADD_EMPTY => {
                    self.remove(coord);
                }
                TAG_ADD_BLACK | TAG_ADD_WHITE => {
                    if let Some(color) = Color::from_tag(tag) {
                        self.set(Stone {
                            coord,
                            color,
                            placement_index: 0,
                        });
                    }
                }
                _ => {
                    if let Some(color) = Color::from_tag(tag) {
                        captured.extend(self.place(Stone {
                            coord,
                            color,
                            placement_index,
                        }));
                    }
                }
            }
        }
        captured
    }

    /// Rebuild the position for the path from the root to `node`.
    pub fn derive(tree: &VariationTree, node: NodeId) -> BoardPosition {
        let mut board = BoardPosition::new(tree.board_size());
        let mut moves = 0;
        for id in tree.path_to(node) {
            if tree.move_of(id).is_some() {
                moves += 1;
            }
            board.apply_node(tree, id, moves);
        }
        board
    }
}

impl fmt::Display for BoardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 1..=self.size {
            for x in 1..=self.size {
                let ch = match self.color_at(Coordinate::new(x, y)) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
