//! Code generation: walks the annotated tree from `sema` and emits x86-64
//! NASM text, driven by a fresh-label counter and the register discipline
//! fixed in `crate::storage`.

pub mod expr;
pub mod function;
pub mod labels;
pub mod program;
pub mod stmt;

pub use program::generate;

use crate::CompileOptions;
use labels::LabelAllocator;

/// The generator's mutable state: the output buffer and the label counter.
/// Comments are interspersed via `comment` when `options.emit_comments` is
/// set; `emit` always pushes its line unconditionally.
#[derive(Default)]
pub struct Codegen {
    pub labels: LabelAllocator,
    pub options: CompileOptions,
    out: Vec<String>,
}

impl Codegen {
    /// `label_start` continues the process-wide label counter from wherever
    /// string interning left it (see `env::StringTable::counter`), so jump
    /// labels never collide with string labels in the emitted assembly.
    pub fn new(options: CompileOptions, label_start: u32) -> Self {
        Codegen {
            labels: LabelAllocator::starting_at(label_start),
            options,
            out: Vec::new(),
        }
    }

    pub fn emit(&mut self, line: impl Into<String>) {
        self.out.push(line.into());
    }

    pub fn extend(&mut self, lines: Vec<String>) {
        self.out.extend(lines);
    }

    /// Pushes a `; text` line, but only when `--emit-comments` is enabled.
    pub fn comment(&mut self, text: impl Into<String>) {
        if self.options.emit_comments {
            self.out.push(format!("; {}", text.into()));
        }
    }

    pub fn into_text(self) -> String {
        self.out.join("\n")
    }
}
