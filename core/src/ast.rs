//! The raw AST as delivered by the (out-of-scope) parser. No functionality
//! is implemented here beyond basic constructors; everything here is a data
//! container. Every node carries a [Position] via [Node], either directly
//! (as a type alias over it) or as its own `pos` field for leaves that are
//! never nested inside an expression/statement position.
//!
//! This tree is never mutated by the rest of the crate: semantic analysis
//! reads it and produces a parallel, annotated tree in [`crate::typed`]
//! instead (see `DESIGN.md` for why).

use crate::position::{Node, Position};
use serde::{Deserialize, Serialize};

/// A whole compilation unit: top-level functions and class definitions, in
/// declaration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<TopLevelFunction>,
    pub classes: Vec<ClassDef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopLevelFunction {
    pub name: String,
    pub return_type: TypeName,
    pub params: Vec<Param>,
    pub body: Block,
    pub pos: Position,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub parent: Option<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<TopLevelFunction>,
    pub pos: Position,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: TypeName,
    pub pos: Position,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeName,
    pub pos: Position,
}

/// A type as written in source, before it's resolved against the class
/// table into a [`crate::types::Type`]. Kept distinct from `types::Type` so
/// that "class `Foo` doesn't exist" is a semantic error, not something the
/// AST layer has to know about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TypeName {
    Int,
    Boolean,
    String,
    Void,
    Class(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

pub type Stmt = Node<StmtKind>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Empty,
    Decl {
        ty: TypeName,
        declarators: Vec<Declarator>,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    PreIncr(Expr),
    PreDecr(Expr),
    ReturnVoid,
    ReturnValue(Expr),
    If {
        cond: Expr,
        then_branch: Box<Block>,
    },
    IfElse {
        cond: Expr,
        then_branch: Box<Block>,
        else_branch: Box<Block>,
    },
    While {
        cond: Expr,
        body: Box<Block>,
    },
    ExprStmt(Expr),
    BlockStmt(Block),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub name: String,
    pub init: Expr,
    pub pos: Position,
}

pub type Expr = Node<ExprKind>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Var(String),
    /// Carried as `i64` rather than `i32`: the out-of-scope lexer hands the
    /// raw digit-string value through (possibly exceeding 32 bits, e.g. for
    /// `2147483648`), and it's `sema`'s job to reject what doesn't fit.
    LitInt(i64),
    LitTrue,
    LitFalse,
    LitString(String),
    LitNull,
    Call {
        name: String,
        args: Vec<Expr>,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    Attribute {
        receiver: Box<Expr>,
        field: String,
    },
    New(String),
    Cast {
        ty: TypeName,
        inner: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    BinaryOp {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}
