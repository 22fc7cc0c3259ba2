//! Function/method prologue and epilogue. Every `ret` inside the body is
//! emitted by `codegen::stmt`; this module only wraps the body with the
//! frame setup.

use crate::codegen::{stmt, Codegen};
use crate::typed::Function;

pub fn emit_function(cg: &mut Codegen, f: &Function) {
    cg.comment(format!("function {}", f.label));
    cg.emit(format!("{}:", f.label));
    cg.emit("push rbp".to_string());
    cg.emit("mov rbp, rsp".to_string());
    if f.stack_size != 0 {
        cg.emit(format!("add rsp, {}", f.stack_size));
    }
    stmt::emit_block(cg, &f.body);
}
