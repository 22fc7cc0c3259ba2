//! Source positions and the generic node wrapper every AST node is built
//! from. Every error this crate reports names the [Position] of the node
//! that raised it.

use std::fmt::{self, Display, Formatter};

/// A `(line, column)` pair identifying where a construct appeared in the
/// original source. Both are 1-indexed, matching the convention of the
/// (out-of-scope) lexer that produces them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A generic AST node container, pairing a node's payload with its
/// [Position]. Every recursive AST node (expressions, statements) is built
/// on top of this; non-recursive declarators carry their own `pos` field
/// directly instead (see `ast::Field`, `ast::Param`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node<K> {
    pub kind: K,
    pub pos: Position,
}

impl<K> Node<K> {
    pub fn new(kind: K, pos: Position) -> Self {
        Self { kind, pos }
    }

    /// Build a new node with the same position, wrapping a value derived
    /// from this node's data (e.g. annotated-tree construction in `sema`).
    pub fn map<L>(&self, kind: L) -> Node<L> {
        Node::new(kind, self.pos)
    }
}
