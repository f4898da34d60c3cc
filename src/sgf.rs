//! Record parser: SGF text into a [`VariationTree`].
//!
//! Only the tree structure and property lists are read; property semantics are
//! left to the rest of the crate, except that coordinate-valued tags (`B`, `W`,
//! `AB`, `AW`, `AE`) are checked against the board size and a node may carry at
//! most one move.
//!
//! Node construction is recursive. Each call receives the scan position, the
//! node's depth and the depth at which the innermost open branch began, and
//! returns the position where it stopped. A node that sees `(` becomes the
//! branch origin: the `)` closing a branch is consumed by the origin, and every
//! node deeper than the origin returns as soon as its child does. That is what
//! makes sibling branches attach to their shared ancestor.

use crate::board::Coordinate;
use crate::constants::{COORD_TAGS, DEFAULT_BOARD_SIZE, MAX_RECORD_DEPTH, MOVE_TAGS};
use crate::error::{Result, TutorError};
use crate::tree::{NodeId, Property, VariationNode, VariationTree};

/// Parse a record for the default 19x19 board.
pub fn parse(text: &str) -> Result<VariationTree> {
    parse_with_size(text, DEFAULT_BOARD_SIZE)
}

/// Parse a record, accepting coordinates on a `board_size` board.
///
/// # Errors
/// - `MalformedRecord` - empty text, unterminated value, unbalanced
///   parentheses, value without tag, tag without value, two moves in a node,
///   a line longer than [`MAX_RECORD_DEPTH`] nodes
/// - `InvalidCoordinate` - coordinate letter outside the board
pub fn parse_with_size(text: &str, board_size: usize) -> Result<VariationTree> {
    if text.trim().is_empty() {
        return Err(TutorError::malformed(0, "empty record"));
    }
    check_structure(text.as_bytes())?;

    let mut builder = TreeBuilder {
        text,
        board_size,
        nodes: Vec::new(),
    };
    builder.node(None, 0, 0, 0)?;
    log::debug!("parsed {} nodes", builder.nodes.len());
    Ok(VariationTree::from_nodes(board_size, builder.nodes))
}

/// Index of the `]` closing the value opened at `open`.
fn value_end(bytes: &[u8], open: usize) -> Result<usize> {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b']' => return Ok(i),
            _ => i += 1,
        }
    }
    Err(TutorError::malformed(open, "unterminated property value"))
}

/// Reject unterminated values, unbalanced parentheses and overlong lines up
/// front, so the builder never returns a partial tree or recurses too deep.
fn check_structure(bytes: &[u8]) -> Result<()> {
    // Node depth at each open '('; closing one returns to that depth.
    let mut branches: Vec<usize> = Vec::new();
    let mut depth: usize = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => i = value_end(bytes, i)?,
            b'(' => branches.push(depth),
            b')' => {
                let Some(outer) = branches.pop() else {
                    return Err(TutorError::malformed(i, "unexpected ')'"));
                };
                depth = outer;
            }
            b';' => {
                depth += 1;
                if depth > MAX_RECORD_DEPTH {
                    return Err(too_deep(i));
                }
            }
            _ => {}
        }
        i += 1;
    }
    if !branches.is_empty() {
        return Err(TutorError::malformed(bytes.len(), "unclosed '('"));
    }
    Ok(())
}

fn too_deep(offset: usize) -> TutorError {
    TutorError::malformed(offset, format!("line longer than {MAX_RECORD_DEPTH} nodes"))
}

/// Resolve `\x` escapes; an escaped line break disappears.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('\n') | None => {}
                Some(next) => out.push(next),
            }
        } else {
            out.push(c);
        }
    }
    out
}

struct TreeBuilder<'a> {
    text: &'a str,
    board_size: usize,
    nodes: Vec<VariationNode>,
}

impl TreeBuilder<'_> {
    /// Build one node starting at `pos`; returns its id and where it stopped.
    fn node(
        &mut self,
        parent: Option<NodeId>,
        pos: usize,
        branch_depth: usize,
        depth: usize,
    ) -> Result<(NodeId, usize)> {
        if depth > MAX_RECORD_DEPTH {
            return Err(too_deep(pos));
        }
        let id = self.nodes.len();
        self.nodes.push(VariationNode::new(parent));

        let text = self.text;
        let bytes = text.as_bytes();
        let mut branch_depth = branch_depth;
        let mut last_tag: Option<String> = None;
        let mut pos = pos;

        while pos < bytes.len() {
            match bytes[pos] {
                b';' => {
                    let (child, stop) = self.node(Some(id), pos + 1, branch_depth, depth + 1)?;
                    self.nodes[id].children.push(child);
                    if depth > branch_depth {
                        return Ok((id, stop));
                    }
                    // This node opened the branch: consume its ')'.
                    pos = stop + 1;
                }
                b'(' => {
                    branch_depth = depth;
                    pos += 1;
                }
                b')' => return Ok((id, pos)),
                b'[' => {
                    let Some(tag) = last_tag.clone() else {
                        return Err(TutorError::malformed(pos, "property value without a tag"));
                    };
                    pos = self.property(id, tag, pos)?;
                }
                c if c.is_ascii_alphabetic() => {
                    let start = pos;
                    while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
                        pos += 1;
                    }
                    let tag = text[start..pos].to_string();
                    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                        pos += 1;
                    }
                    if pos >= bytes.len() || bytes[pos] != b'[' {
                        return Err(TutorError::malformed(start, format!("property {tag} has no value")));
                    }
                    last_tag = Some(tag.clone());
                    pos = self.property(id, tag, pos)?;
                }
                _ => pos += 1,
            }
        }
        Ok((id, pos))
    }

    /// Read the value opened at `open` into a property of node `id`; returns
    /// the position after the closing `]`.
    fn property(&mut self, id: NodeId, tag: String, open: usize) -> Result<usize> {
        let close = value_end(self.text.as_bytes(), open)?;
        let value = unescape(&self.text[open + 1..close]);

        if COORD_TAGS.contains(&tag.as_str()) {
            let is_move = MOVE_TAGS.contains(&tag.as_str());
            let valid = match Coordinate::from_sgf(&value, self.board_size) {
                Some(c) if c.is_tenuki() => is_move,
                Some(_) => true,
                None => false,
            };
            if !valid {
                return Err(TutorError::InvalidCoordinate {
                    tag,
                    value,
                    board_size: self.board_size,
                });
            }
        }

        let property = Property::new(tag, value);
        let node = &mut self.nodes[id];
        if property.is_move() && node.move_property().is_some() {
            return Err(TutorError::malformed(open, "node has more than one move"));
        }
        node.properties.push(property);
        Ok(close + 1)
    }
}
