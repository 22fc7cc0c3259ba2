//! Core implementation of the `mjc` compiler: semantic analysis, class
//! layout resolution, and x86-64 NASM code generation for a statically
//! typed, Java-like imperative language with single inheritance. The AST is
//! expected to have already been produced by an external parser; this crate
//! starts from [`ast::Program`] and ends at NASM assembly text.
//!
//! ```
//! use mjc::{CompileOptions, Compiler};
//!
//! let program = mjc::ast::Program {
//!     functions: vec![],
//!     classes: vec![],
//! };
//! let result = Compiler::new(program).check();
//! assert!(result.is_err()); // no `main` function declared
//! ```

#![deny(unused_must_use)]

#[macro_use]
extern crate log;

pub mod ast;
pub mod codegen;
pub mod env;
pub mod error;
pub mod layout;
pub mod position;
pub mod sema;
pub mod storage;
pub mod types;
pub mod typed;

pub use error::{CompileError, Spanned};

use std::fmt::Debug;

/// Options controlling the code generator's output, independent of the
/// program's semantics. Currently just the assembly-comment toggle; the
/// `cli` crate exposes this as `--emit-comments`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// When set, the generator interleaves human-readable comments (source
    /// line numbers, statement/expression kinds) into the emitted assembly.
    /// Purely cosmetic — never affects the emitted instructions.
    pub emit_comments: bool,
}

/// Errors produced by a compile. This analyzer stops at the first semantic
/// error found rather than accumulating a list.
pub type CompileErrors = Spanned<CompileError>;

/// Staged compiler pipeline. `T` is the type of the program at the current
/// stage, which restricts which methods are callable: only a
/// `Compiler<ast::Program>` can be `check`ed, and only the `Checked` result
/// of that can be `generate`d. This mirrors the staged shape of the program
/// itself (raw AST -> type-annotated tree -> assembly text) in the type
/// system.
#[derive(Debug)]
pub struct Compiler<T: Debug>(T);

impl<T: Debug> Compiler<T> {
    /// Prints the compiler's current stage, if debug logging is enabled.
    /// Chains through the pipeline like every other stage method.
    pub fn debug(self) -> Self {
        debug!("{:?}", &self);
        self
    }
}

impl Compiler<ast::Program> {
    /// Starts a new compiler pipeline from a parsed (or deserialized) AST.
    pub fn new(program: ast::Program) -> Self {
        Compiler(program)
    }

    /// Runs semantic analysis: builds the function/class tables, resolves
    /// class layouts, and type-checks every function and method body.
    pub fn check(self) -> Result<Compiler<Checked>, CompileErrors> {
        let (program, strings) = sema::check_program(&self.0)?;
        Ok(Compiler(Checked { program, strings }))
    }
}

/// The program after semantic analysis: a fully type-annotated tree plus the
/// string-literal table accumulated while checking it. Opaque from outside
/// this crate — the only thing you can do with it is `generate`.
#[derive(Debug)]
pub struct Checked {
    program: typed::Program,
    strings: env::StringTable,
}

impl Compiler<Checked> {
    /// Emits NASM (Intel-syntax) assembly text for the checked program.
    pub fn generate(self, options: CompileOptions) -> String {
        codegen::generate(&self.0.program, &self.0.strings, options)
    }
}

/// Convenience wrapper running the full pipeline (`check` then `generate`)
/// in one call, for callers that don't need to observe the intermediate
/// checked stage.
pub fn compile(
    program: ast::Program,
    options: CompileOptions,
) -> Result<String, CompileErrors> {
    Ok(Compiler::new(program).check()?.generate(options))
}
