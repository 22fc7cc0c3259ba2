//! The annotated tree produced by `sema` and consumed by `codegen`. This is
//! a parallel representation of `ast::*`, not a mutation of it: every node
//! here additionally carries the resolved [`Type`], and expression nodes
//! carry whatever codegen needs to avoid re-resolving anything (a
//! variable's storage location, a call's target label, a method's vtable
//! slot offset, an interned string's label, ...).

use crate::ast::{BinaryOp, UnaryOp};
use crate::env::StringLabel;
use crate::layout::ClassLayout;
use crate::position::Position;
use crate::storage::StorageLocation;
use crate::types::Type;
use std::rc::Rc;

pub struct Program {
    pub functions: Vec<Function>,
    pub classes: Vec<Class>,
}

pub struct Class {
    pub name: String,
    pub layout: Rc<ClassLayout>,
    pub methods: Vec<Function>,
}

pub struct Function {
    /// `top_<name>` for a free function, `cls_<class>_<method>` for a method.
    pub label: String,
    pub return_type: Type,
    pub param_count: usize,
    pub is_method: bool,
    pub body: Block,
    /// The most-negative offset used for a local, i.e. how far `rsp` must
    /// move down in the prologue (always <= 0).
    pub stack_size: i32,
}

pub struct Block {
    pub stmts: Vec<Stmt>,
}

pub struct Stmt {
    pub kind: StmtKind,
    pub pos: Position,
}

pub struct Declarator {
    pub location: StorageLocation,
    pub init: Expr,
}

pub enum StmtKind {
    Empty,
    Decl(Vec<Declarator>),
    Assign { target: Expr, value: Expr },
    PreIncr(Expr),
    PreDecr(Expr),
    ReturnVoid,
    ReturnValue(Expr),
    If {
        cond: Expr,
        then_branch: Block,
    },
    IfElse {
        cond: Expr,
        then_branch: Block,
        else_branch: Block,
    },
    While {
        cond: Expr,
        body: Block,
    },
    ExprStmt(Expr),
    Block(Block),
}

pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub pos: Position,
}

pub enum ExprKind {
    Var {
        location: StorageLocation,
    },
    LitInt(i32),
    LitTrue,
    LitFalse,
    LitString(StringLabel),
    LitNull,
    /// A call to a top-level function (`top_<name>`).
    Call {
        label: String,
        args: Vec<Expr>,
    },
    /// A virtual dispatch through the receiver's vtable.
    MethodCall {
        receiver: Box<Expr>,
        method_offset: u32,
        args: Vec<Expr>,
    },
    Attribute {
        receiver: Box<Expr>,
        field_offset: u32,
    },
    New {
        class_size: u32,
        vtable_label: String,
        field_count: usize,
    },
    /// A downcast or null-to-class cast; carries no runtime check, so all
    /// that's left after type checking is the inner expression.
    Cast(Box<Expr>),
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `string + string` is lowered to this during semantic analysis rather
    /// than kept as a `BinaryOp`, since it compiles to a call rather than
    /// an arithmetic instruction.
    StrConcat {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    BinaryOp {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl ExprKind {
    /// A reference expression denotes an addressable storage cell. Only
    /// these may appear on the left of an assignment or as the operand of
    /// `++`/`--`.
    pub fn is_reference(&self) -> bool {
        matches!(self, ExprKind::Var { .. } | ExprKind::Attribute { .. })
    }
}

impl Expr {
    pub fn is_reference(&self) -> bool {
        self.kind.is_reference()
    }
}
