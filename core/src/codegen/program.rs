//! Overall emitted file layout: `global`/`extern` declarations, the
//! `.data` section (interned strings and vtables), then `.text`.

use crate::codegen::{function, Codegen};
use crate::env::StringTable;
use crate::typed::Program;
use crate::CompileOptions;

const RUNTIME_EXTERNS: [&str; 6] = [
    "top_printInt",
    "top_printString",
    "top_error",
    "top_readInt",
    "top_readString",
    "top_strConcat",
];

fn emit_header(cg: &mut Codegen) {
    cg.emit("global top_main".to_string());
    for name in RUNTIME_EXTERNS {
        cg.emit(format!("extern {}", name));
    }
    cg.emit("extern malloc".to_string());
}

/// Render a string literal's decoded bytes as a NASM `db` byte list,
/// NUL-terminated. Using a decimal value per byte, rather than mixing in
/// quoted ASCII runs, sidesteps re-escaping anything that needs it (quotes,
/// backslashes, non-ASCII) since every byte renders the same way.
fn encode_bytes(text: &str) -> String {
    let mut parts: Vec<String> = text.bytes().map(|b| b.to_string()).collect();
    parts.push("0".to_string());
    parts.join(",")
}

fn emit_data(cg: &mut Codegen, program: &Program, strings: &StringTable) {
    cg.emit("section .data".to_string());
    for (text, label) in strings.entries() {
        cg.emit(format!("{} db {}", label, encode_bytes(text)));
    }
    for c in &program.classes {
        let mut slots: Vec<String> = c
            .layout
            .vtable
            .iter()
            .map(|slot| format!("cls_{}_{}", slot.defining_class, slot.method))
            .collect();
        slots.push("0".to_string());
        cg.emit(format!("vtable_{} dq {}", c.name, slots.join(",")));
    }
}

pub fn generate(program: &Program, strings: &StringTable, options: CompileOptions) -> String {
    let mut cg = Codegen::new(options, strings.counter());
    emit_header(&mut cg);
    emit_data(&mut cg, program, strings);

    cg.emit("section .text".to_string());
    for f in &program.functions {
        function::emit_function(&mut cg, f);
    }
    for c in &program.classes {
        for m in &c.methods {
            function::emit_function(&mut cg, m);
        }
    }

    let mut text = cg.into_text();
    text.push('\n');
    text
}
