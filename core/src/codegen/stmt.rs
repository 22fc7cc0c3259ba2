//! Statement emission: walks a checked [`typed::Block`] and appends
//! assembly text to the generator's output buffer.

use crate::codegen::{expr, Codegen};
use crate::storage::{self, StorageLocation};
use crate::typed::{Block, Expr, Stmt, StmtKind};

pub fn emit_block(cg: &mut Codegen, block: &Block) {
    for s in &block.stmts {
        emit_stmt(cg, s);
    }
}

fn emit_epilogue(cg: &mut Codegen) {
    cg.emit("mov rsp, rbp".to_string());
    cg.emit("pop rbp".to_string());
    cg.emit("ret".to_string());
}

fn emit_stmt(cg: &mut Codegen, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Empty => {}

        StmtKind::Decl(decls) => {
            for d in decls {
                expr::emit_into(cg, &d.init, storage::RAX);
                cg.extend(storage::mov_to_memory(
                    &StorageLocation::Register(storage::RAX),
                    &d.location,
                ));
            }
        }

        StmtKind::Assign { target, value } => emit_assign(cg, target, value),

        StmtKind::PreIncr(operand) => emit_incr_decr(cg, "inc", operand),
        StmtKind::PreDecr(operand) => emit_incr_decr(cg, "dec", operand),

        StmtKind::ReturnVoid => emit_epilogue(cg),
        StmtKind::ReturnValue(value) => {
            expr::emit_into(cg, value, storage::RAX);
            emit_epilogue(cg);
        }

        StmtKind::If { cond, then_branch } => {
            cg.comment("if");
            let l_true = cg.labels.fresh();
            let l_end = cg.labels.fresh();
            expr::emit_bool_jump(cg, cond, l_true, l_end);
            cg.emit(format!("{}:", l_true));
            emit_block(cg, then_branch);
            cg.emit(format!("{}:", l_end));
        }

        StmtKind::IfElse {
            cond,
            then_branch,
            else_branch,
        } => {
            cg.comment("if/else");
            let l_true = cg.labels.fresh();
            let l_false = cg.labels.fresh();
            let l_end = cg.labels.fresh();
            expr::emit_bool_jump(cg, cond, l_true, l_false);
            cg.emit(format!("{}:", l_true));
            emit_block(cg, then_branch);
            cg.emit(format!("jmp {}", l_end));
            cg.emit(format!("{}:", l_false));
            emit_block(cg, else_branch);
            cg.emit(format!("{}:", l_end));
        }

        StmtKind::While { cond, body } => {
            cg.comment("while");
            let l_top = cg.labels.fresh();
            let l_body = cg.labels.fresh();
            let l_end = cg.labels.fresh();
            cg.emit(format!("{}:", l_top));
            expr::emit_bool_jump(cg, cond, l_body, l_end);
            cg.emit(format!("{}:", l_body));
            emit_block(cg, body);
            cg.emit(format!("jmp {}", l_top));
            cg.emit(format!("{}:", l_end));
        }

        StmtKind::ExprStmt(e) => expr::emit_into(cg, e, storage::RAX),

        StmtKind::Block(block) => emit_block(cg, block),
    }
}

fn emit_assign(cg: &mut Codegen, target: &Expr, value: &Expr) {
    expr::emit_into(cg, value, storage::RAX);
    let loc = expr::reference_location(cg, target);
    cg.extend(storage::mov_to_memory(
        &StorageLocation::Register(storage::RAX),
        &loc,
    ));
}

fn emit_incr_decr(cg: &mut Codegen, mnemonic: &str, operand: &Expr) {
    let loc = expr::reference_location(cg, operand);
    cg.emit(format!("{} {}", mnemonic, loc));
}
