//! Expression emission: materializing a value into a register, computing a
//! reference expression's storage location, and the boolean-jump protocol
//! that drives short-circuit evaluation without ever storing an
//! intermediate boolean.

use crate::ast::{BinaryOp, UnaryOp};
use crate::codegen::Codegen;
use crate::storage::{self, Register, StorageLocation};
use crate::typed::{Expr, ExprKind};

fn is_bool_producing(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::And
            | BinaryOp::Or
    )
}

/// The storage location a reference expression (`Var`, `Attribute`) reads
/// from or writes to, evaluating the receiver of an attribute access as a
/// side effect.
pub fn reference_location(cg: &mut Codegen, e: &Expr) -> StorageLocation {
    match &e.kind {
        ExprKind::Var { location } => location.clone(),
        ExprKind::Attribute {
            receiver,
            field_offset,
        } => {
            emit_into(cg, receiver, storage::R14);
            StorageLocation::Pointer {
                base: storage::R14,
                offset: *field_offset as i32,
                size: e.ty.get_size(),
            }
        }
        _ => unreachable!("only reference expressions have a storage location"),
    }
}

/// Leave `e`'s value in `dest` (narrow alias for 4-byte values, full alias
/// for 8-byte ones).
pub fn emit_into(cg: &mut Codegen, e: &Expr, dest: Register) {
    match &e.kind {
        ExprKind::Var { .. } | ExprKind::Attribute { .. } => {
            let loc = reference_location(cg, e);
            cg.extend(storage::mov_to_register(&loc, dest));
        }
        ExprKind::LitInt(v) => cg.emit(format!("mov {}, {}", dest.name_for_width(4), v)),
        ExprKind::LitTrue | ExprKind::LitFalse | ExprKind::UnaryOp { op: UnaryOp::Not, .. } => {
            emit_bool_materialize(cg, e, dest)
        }
        ExprKind::LitString(label) => cg.emit(format!("lea {}, [{}]", dest.full, label)),
        ExprKind::LitNull => cg.emit(format!("mov {}, 0", dest.full)),
        ExprKind::Call { label, args } => emit_call(cg, label, args, dest),
        ExprKind::MethodCall {
            receiver,
            method_offset,
            args,
        } => emit_method_call(cg, receiver, *method_offset, args, dest),
        ExprKind::New {
            class_size,
            vtable_label,
            field_count,
        } => emit_new(cg, *class_size, vtable_label, *field_count, dest),
        ExprKind::Cast(inner) => emit_into(cg, inner, dest),
        ExprKind::UnaryOp {
            op: UnaryOp::Neg,
            operand,
        } => {
            emit_into(cg, operand, dest);
            cg.emit(format!("neg {}", dest.name_for_width(4)));
        }
        ExprKind::StrConcat { lhs, rhs } => emit_str_concat(cg, lhs, rhs, dest),
        ExprKind::BinaryOp { op, lhs, rhs } => {
            if is_bool_producing(*op) {
                emit_bool_materialize(cg, e, dest);
            } else {
                emit_arith(cg, *op, lhs, rhs, dest);
            }
        }
    }
}

/// Emit direct branches to `t`/`f` for a boolean-valued expression, per the
/// boolean-jump protocol: comparisons and `&&`/`||`/`!` jump without ever
/// materializing an intermediate 0/1 value; anything else falls back to
/// materializing into `eax` and comparing against zero.
pub fn emit_bool_jump(cg: &mut Codegen, e: &Expr, t: super::labels::JumpLabel, f: super::labels::JumpLabel) {
    match &e.kind {
        ExprKind::LitTrue => cg.emit(format!("jmp {}", t)),
        ExprKind::LitFalse => cg.emit(format!("jmp {}", f)),
        ExprKind::UnaryOp {
            op: UnaryOp::Not,
            operand,
        } => emit_bool_jump(cg, operand, f, t),
        ExprKind::BinaryOp {
            op: BinaryOp::And,
            lhs,
            rhs,
        } => {
            let mid = cg.labels.fresh();
            emit_bool_jump(cg, lhs, mid, f);
            cg.emit(format!("{}:", mid));
            emit_bool_jump(cg, rhs, t, f);
        }
        ExprKind::BinaryOp {
            op: BinaryOp::Or,
            lhs,
            rhs,
        } => {
            let mid = cg.labels.fresh();
            emit_bool_jump(cg, lhs, t, mid);
            cg.emit(format!("{}:", mid));
            emit_bool_jump(cg, rhs, t, f);
        }
        ExprKind::BinaryOp {
            op: op @ (BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge),
            lhs,
            rhs,
        } => {
            emit_operands_spilled(cg, lhs, rhs, storage::RAX, storage::RBX, 4);
            cg.emit("cmp eax, ebx".to_string());
            let cc = match op {
                BinaryOp::Lt => "jl",
                BinaryOp::Le => "jle",
                BinaryOp::Gt => "jg",
                BinaryOp::Ge => "jge",
                _ => unreachable!(),
            };
            cg.emit(format!("{} {}", cc, t));
            cg.emit(format!("jmp {}", f));
        }
        ExprKind::BinaryOp {
            op: op @ (BinaryOp::Eq | BinaryOp::Ne),
            lhs,
            rhs,
        } => {
            emit_operands_spilled(cg, lhs, rhs, storage::RAX, storage::RBX, 8);
            cg.emit("cmp rax, rbx".to_string());
            let cc = if *op == BinaryOp::Eq { "je" } else { "jne" };
            cg.emit(format!("{} {}", cc, t));
            cg.emit(format!("jmp {}", f));
        }
        _ => {
            emit_into(cg, e, storage::RAX);
            cg.emit("cmp eax, 0".to_string());
            cg.emit(format!("jne {}", t));
            cg.emit(format!("jmp {}", f));
        }
    }
}

/// `mov 1`/`mov 0` wrapper over the boolean-jump protocol, for contexts
/// that need an actual 0/1 value (assigning a `boolean` local, returning
/// one, passing it as an argument, ...).
fn emit_bool_materialize(cg: &mut Codegen, e: &Expr, dest: Register) {
    let t = cg.labels.fresh();
    let f = cg.labels.fresh();
    let end = cg.labels.fresh();
    emit_bool_jump(cg, e, t, f);
    cg.emit(format!("{}:", t));
    cg.emit(format!("mov {}, 1", dest.full));
    cg.emit(format!("jmp {}", end));
    cg.emit(format!("{}:", f));
    cg.emit(format!("mov {}, 0", dest.full));
    cg.emit(format!("{}:", end));
}

/// Evaluate `lhs` into `r1`, spill it across evaluating `rhs` into `r1`
/// (which may itself need `r1` as scratch), then move `rhs`'s value into
/// `r2` and restore `lhs`'s value into `r1`. Mirrors the two-operand
/// evaluation order used throughout the arithmetic/comparison operators.
fn emit_operands_spilled(cg: &mut Codegen, lhs: &Expr, rhs: &Expr, r1: Register, r2: Register, width: u32) {
    emit_into(cg, lhs, r1);
    cg.emit("push rax".to_string());
    emit_into(cg, rhs, r1);
    cg.emit(format!("mov {}, {}", r2.name_for_width(width), r1.name_for_width(width)));
    cg.emit("pop rax".to_string());
}

fn emit_arith(cg: &mut Codegen, op: BinaryOp, lhs: &Expr, rhs: &Expr, dest: Register) {
    emit_operands_spilled(cg, lhs, rhs, storage::RAX, storage::RBX, 4);
    match op {
        BinaryOp::Add => cg.emit("add eax, ebx".to_string()),
        BinaryOp::Sub => cg.emit("sub eax, ebx".to_string()),
        BinaryOp::Mul => cg.emit("imul eax, ebx".to_string()),
        BinaryOp::Div => {
            cg.emit("push rdx".to_string());
            cg.emit("cdq".to_string());
            cg.emit("idiv ebx".to_string());
            cg.emit("pop rdx".to_string());
        }
        BinaryOp::Mod => {
            cg.emit("push rdx".to_string());
            cg.emit("cdq".to_string());
            cg.emit("idiv ebx".to_string());
            cg.emit("mov eax, edx".to_string());
            cg.emit("pop rdx".to_string());
        }
        _ => unreachable!("not an arithmetic operator"),
    }
    if dest != storage::RAX {
        cg.extend(storage::mov_to_register(
            &StorageLocation::Register(storage::RAX),
            dest,
        ));
    }
}

/// Align the stack for a call and push its arguments right-to-left. `r12` is
/// itself pushed/popped around the pre-call `rsp` it holds, so a call
/// nested inside another call's own argument list (e.g. `f(a, g(b), c)`)
/// restores its own `rsp` without disturbing the outer call's.
fn push_call_args(cg: &mut Codegen, args: &[&Expr], extra: usize) {
    cg.emit("push r12".to_string());
    cg.emit("mov r12, rsp".to_string());
    cg.emit("and rsp, -16".to_string());
    if (args.len() + extra) % 2 == 0 {
        cg.emit("sub rsp, 8".to_string());
    }
    for arg in args.iter().rev() {
        emit_into(cg, arg, storage::RAX);
        cg.emit("push rax".to_string());
    }
}

fn finish_call(cg: &mut Codegen, dest: Register) {
    cg.emit("mov rsp, r12".to_string());
    cg.emit("pop r12".to_string());
    if dest != storage::RAX {
        cg.extend(storage::mov_to_register(
            &StorageLocation::Register(storage::RAX),
            dest,
        ));
    }
}

fn emit_call(cg: &mut Codegen, label: &str, args: &[Expr], dest: Register) {
    let refs: Vec<&Expr> = args.iter().collect();
    push_call_args(cg, &refs, 0);
    cg.emit(format!("call {}", label));
    finish_call(cg, dest);
}

fn emit_str_concat(cg: &mut Codegen, lhs: &Expr, rhs: &Expr, dest: Register) {
    push_call_args(cg, &[lhs, rhs], 0);
    cg.emit("call top_strConcat".to_string());
    finish_call(cg, dest);
}

/// A virtual dispatch: evaluate the receiver into `r14`, stash the caller's
/// `r13` for restoring after the call, then evaluate the arguments *before*
/// installing the new receiver/vtable pointer — an argument may itself read
/// the enclosing method's own `this` (an implicit self-field, or an
/// explicit attribute/method-call receiver), so `r13` must still hold the
/// caller's receiver, and `r14` must still be free as scratch, while
/// arguments are evaluated. The new receiver is held in `rdx` across that
/// window: the only other user of `rdx` (`idiv` for `/`/`%`) always saves
/// and restores it around itself, so it is safe to keep a value there
/// through an arbitrary sub-expression's emission.
fn emit_method_call(cg: &mut Codegen, receiver: &Expr, method_offset: u32, args: &[Expr], dest: Register) {
    emit_into(cg, receiver, storage::R14);
    cg.emit("push r13".to_string());
    cg.emit("mov rdx, r14".to_string());

    let refs: Vec<&Expr> = args.iter().collect();
    push_call_args(cg, &refs, 1);
    cg.emit("mov r13, rdx".to_string());
    cg.emit("mov r14, [rdx]".to_string());
    cg.emit("push r13".to_string());
    cg.emit(format!("call [r14+{}]", method_offset));
    finish_call(cg, dest);
    cg.emit("pop r13".to_string());
}

fn emit_new(cg: &mut Codegen, class_size: u32, vtable_label: &str, field_count: usize, dest: Register) {
    cg.emit(format!("mov rdi, {}", class_size));
    cg.emit("call malloc".to_string());
    cg.emit(format!("mov QWORD [rax], {}", vtable_label));
    for k in 0..field_count {
        cg.emit(format!("mov QWORD [rax+{}], 0", 8 + 8 * k));
    }
    if dest != storage::RAX {
        cg.extend(storage::mov_to_register(
            &StorageLocation::Register(storage::RAX),
            dest,
        ));
    }
}
