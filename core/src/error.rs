//! The compiler's error taxonomy, grouped into a few policy buckets:
//! `Redefinition`, `Type`, `UndefinedVariable`/`NoAttribute`, `NoReturn`,
//! `Cycle`, `InvalidCast`, or a generic `Compile` catch-all. Errors are
//! fatal: the first one returned from any `sema`/`layout` call aborts the
//! pass, rather than being accumulated into a list.

use crate::position::Position;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CompileError {
    #[error("function `{0}` is already defined")]
    DuplicateFunction(String),
    #[error("class `{0}` is already defined")]
    DuplicateClass(String),
    #[error("variable `{0}` is already declared in this scope")]
    DuplicateVariable(String),
    #[error("field `{0}` is declared more than once in this class's inheritance chain")]
    DuplicateField(String),
    #[error("duplicate parameter name `{0}`")]
    DuplicateParam(String),
    #[error(
        "method `{name}` overrides a method of the same name in `{ancestor}` \
         with a different signature"
    )]
    OverrideSignatureMismatch { name: String, ancestor: String },

    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },
    #[error("`void` is not a valid type for a variable, parameter, or value")]
    VoidNotAllowed,
    #[error("operator `{op}` requires operands of type `{expected}`, found `{found}`")]
    BadOperandType {
        op: String,
        expected: String,
        found: String,
    },
    #[error("condition must be of type `boolean`, found `{0}`")]
    NonBoolCondition(String),
    #[error("wrong number of arguments: expected {expected}, found {found}")]
    ArityMismatch { expected: usize, found: usize },
    #[error("integer literal `{0}` is out of range for a 32-bit signed int")]
    IntLiteralOutOfRange(i64),
    #[error("`{0}` is not a reference expression and cannot be assigned to or incremented")]
    NotAReference(String),

    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("undefined function `{0}`")]
    UndefinedFunction(String),
    #[error("undefined class `{0}`")]
    UndefinedClass(String),
    #[error("undefined method `{0}` on class `{1}`")]
    UndefinedMethod(String, String),

    #[error("no attribute `{0}` on class `{1}`")]
    NoAttribute(String, String),

    #[error("non-void function `{0}` does not return on every path")]
    NoReturn(String),

    #[error("inheritance cycle detected, starting at class `{0}`")]
    InheritanceCycle(String),

    #[error("cannot cast from `{from}` to `{to}`")]
    InvalidCast { from: String, to: String },

    #[error("{0}")]
    Compile(String),
}

/// A [CompileError] paired with the [Position] of the node that raised it.
/// This is the error type every fallible `sema`/`layout`/`codegen` function
/// in this crate returns.
#[derive(Debug, PartialEq)]
pub struct Spanned<E> {
    pub error: E,
    pub pos: Position,
}

impl<E> Spanned<E> {
    pub fn new(error: E, pos: Position) -> Self {
        Self { error, pos }
    }
}

impl Display for Spanned<CompileError> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pos, self.error)
    }
}

impl std::error::Error for Spanned<CompileError> {}

pub type Result<T> = std::result::Result<T, Spanned<CompileError>>;
