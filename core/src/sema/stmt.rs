//! The statement checker: type-checks one statement at a time and tracks
//! whether control reaches the end of a sequence, folding literal
//! conditions so `if(true)`/`if(false)`/`while(true)` are recognised as
//! definite (non-)returns rather than merely possible ones.

use crate::ast::{self, BinaryOp, StmtKind, UnaryOp};
use crate::env::Environment;
use crate::error::{CompileError, Spanned};
use crate::sema::expr;
use crate::types::Type;
use crate::typed;

type Result<T> = std::result::Result<T, Spanned<CompileError>>;

fn err(pos: crate::position::Position, e: CompileError) -> Spanned<CompileError> {
    Spanned::new(e, pos)
}

/// Fold a condition to a compile-time boolean constant, if possible, by
/// traversing literal operators only (`true`, `false`, `!`, `&&`, `||` of
/// other foldable operands). Anything else (a variable, a call, a
/// comparison) is not foldable.
fn fold_const_bool(e: &ast::Expr) -> Option<bool> {
    match &e.kind {
        ast::ExprKind::LitTrue => Some(true),
        ast::ExprKind::LitFalse => Some(false),
        ast::ExprKind::UnaryOp {
            op: UnaryOp::Not,
            operand,
        } => fold_const_bool(operand).map(|b| !b),
        ast::ExprKind::BinaryOp {
            op: BinaryOp::And,
            lhs,
            rhs,
        } => Some(fold_const_bool(lhs)? && fold_const_bool(rhs)?),
        ast::ExprKind::BinaryOp {
            op: BinaryOp::Or,
            lhs,
            rhs,
        } => Some(fold_const_bool(lhs)? || fold_const_bool(rhs)?),
        _ => None,
    }
}

fn check_condition(env: &mut Environment, cond: &ast::Expr) -> Result<typed::Expr> {
    let t = expr::check_expr(env, cond)?;
    if t.ty != Type::Bool {
        return Err(err(cond.pos, CompileError::NonBoolCondition(t.ty.to_string())));
    }
    Ok(t)
}

/// Check a whole statement sequence, threading whether a return has
/// definitely been reached so far. Returns the checked statements and
/// whether the sequence definitely returns on every path that reaches it.
pub fn check_stmts(env: &mut Environment, stmts: &[ast::Stmt]) -> Result<(Vec<typed::Stmt>, bool)> {
    let mut out = Vec::with_capacity(stmts.len());
    let mut returned = false;
    for s in stmts {
        let (checked, always_returns) = check_stmt(env, s)?;
        out.push(checked);
        returned = returned || always_returns;
    }
    Ok((out, returned))
}

pub fn check_block(env: &mut Environment, block: &ast::Block) -> Result<(typed::Block, bool)> {
    env.push_scope();
    let (stmts, returned) = check_stmts(env, &block.stmts)?;
    env.pop_scope();
    Ok((typed::Block { stmts }, returned))
}

fn check_stmt(env: &mut Environment, stmt: &ast::Stmt) -> Result<(typed::Stmt, bool)> {
    let pos = stmt.pos;
    match &stmt.kind {
        StmtKind::Empty => Ok((
            typed::Stmt {
                kind: typed::StmtKind::Empty,
                pos,
            },
            false,
        )),

        StmtKind::Decl { ty, declarators } => {
            let declared_ty = expr::resolve_type_name(env, ty, pos)?;
            if declared_ty == Type::Void {
                return Err(err(pos, CompileError::VoidNotAllowed));
            }
            let mut out = Vec::with_capacity(declarators.len());
            for d in declarators {
                let init = expr::check_expr(env, &d.init)?;
                if !crate::types::is_subtype(&init.ty, &declared_ty, &*env) {
                    return Err(err(
                        d.pos,
                        CompileError::TypeMismatch {
                            expected: declared_ty.to_string(),
                            found: init.ty.to_string(),
                        },
                    ));
                }
                let location = env.alloc_local(declared_ty.get_size());
                env.declare_var(&d.name, declared_ty.clone(), location.clone())
                    .map_err(|_| err(d.pos, CompileError::DuplicateVariable(d.name.clone())))?;
                out.push(typed::Declarator { location, init });
            }
            Ok((
                typed::Stmt {
                    kind: typed::StmtKind::Decl(out),
                    pos,
                },
                false,
            ))
        }

        StmtKind::Assign { target, value } => {
            let ttarget = expr::check_expr(env, target)?;
            if !ttarget.is_reference() {
                return Err(err(target.pos, CompileError::NotAReference(format!("{:?}", target.kind))));
            }
            let tvalue = expr::check_expr(env, value)?;
            if !crate::types::is_subtype(&tvalue.ty, &ttarget.ty, &*env) {
                return Err(err(
                    value.pos,
                    CompileError::TypeMismatch {
                        expected: ttarget.ty.to_string(),
                        found: tvalue.ty.to_string(),
                    },
                ));
            }
            Ok((
                typed::Stmt {
                    kind: typed::StmtKind::Assign {
                        target: ttarget,
                        value: tvalue,
                    },
                    pos,
                },
                false,
            ))
        }

        StmtKind::PreIncr(operand) => Ok((
            typed::Stmt {
                kind: typed::StmtKind::PreIncr(check_int_reference(env, operand)?),
                pos,
            },
            false,
        )),
        StmtKind::PreDecr(operand) => Ok((
            typed::Stmt {
                kind: typed::StmtKind::PreDecr(check_int_reference(env, operand)?),
                pos,
            },
            false,
        )),

        StmtKind::ReturnVoid => {
            let (_, ret_ty) = env
                .current_fun
                .clone()
                .expect("return statements only occur inside a function body");
            if ret_ty != Type::Void {
                return Err(err(
                    pos,
                    CompileError::TypeMismatch {
                        expected: ret_ty.to_string(),
                        found: Type::Void.to_string(),
                    },
                ));
            }
            Ok((
                typed::Stmt {
                    kind: typed::StmtKind::ReturnVoid,
                    pos,
                },
                true,
            ))
        }

        StmtKind::ReturnValue(value) => {
            let (_, ret_ty) = env
                .current_fun
                .clone()
                .expect("return statements only occur inside a function body");
            let tvalue = expr::check_expr(env, value)?;
            if ret_ty == Type::Void || !crate::types::is_subtype(&tvalue.ty, &ret_ty, &*env) {
                return Err(err(
                    value.pos,
                    CompileError::TypeMismatch {
                        expected: ret_ty.to_string(),
                        found: tvalue.ty.to_string(),
                    },
                ));
            }
            Ok((
                typed::Stmt {
                    kind: typed::StmtKind::ReturnValue(tvalue),
                    pos,
                },
                true,
            ))
        }

        StmtKind::If { cond, then_branch } => {
            let tcond = check_condition(env, cond)?;
            let (tthen, then_returns) = check_block(env, then_branch)?;
            let always_returns = match fold_const_bool(cond) {
                Some(true) => then_returns,
                Some(false) => false,
                None => false,
            };
            Ok((
                typed::Stmt {
                    kind: typed::StmtKind::If {
                        cond: tcond,
                        then_branch: tthen,
                    },
                    pos,
                },
                always_returns,
            ))
        }

        StmtKind::IfElse {
            cond,
            then_branch,
            else_branch,
        } => {
            let tcond = check_condition(env, cond)?;
            let (tthen, then_returns) = check_block(env, then_branch)?;
            let (telse, else_returns) = check_block(env, else_branch)?;
            let always_returns = match fold_const_bool(cond) {
                Some(true) => then_returns,
                Some(false) => else_returns,
                None => then_returns && else_returns,
            };
            Ok((
                typed::Stmt {
                    kind: typed::StmtKind::IfElse {
                        cond: tcond,
                        then_branch: tthen,
                        else_branch: telse,
                    },
                    pos,
                },
                always_returns,
            ))
        }

        StmtKind::While { cond, body } => {
            let tcond = check_condition(env, cond)?;
            let (tbody, _) = check_block(env, body)?;
            // No `break` statement exists in this language, so a condition
            // that folds to `true` never falls through to the statement
            // after the loop.
            let always_returns = fold_const_bool(cond) == Some(true);
            Ok((
                typed::Stmt {
                    kind: typed::StmtKind::While {
                        cond: tcond,
                        body: tbody,
                    },
                    pos,
                },
                always_returns,
            ))
        }

        StmtKind::ExprStmt(e) => {
            let te = expr::check_expr(env, e)?;
            Ok((
                typed::Stmt {
                    kind: typed::StmtKind::ExprStmt(te),
                    pos,
                },
                false,
            ))
        }

        StmtKind::BlockStmt(block) => {
            let (tblock, returns) = check_block(env, block)?;
            Ok((
                typed::Stmt {
                    kind: typed::StmtKind::Block(tblock),
                    pos,
                },
                returns,
            ))
        }
    }
}

fn check_int_reference(env: &mut Environment, operand: &ast::Expr) -> Result<typed::Expr> {
    let t = expr::check_expr(env, operand)?;
    if !t.is_reference() {
        return Err(err(
            operand.pos,
            CompileError::NotAReference(format!("{:?}", operand.kind)),
        ));
    }
    if t.ty != Type::Int {
        return Err(err(
            operand.pos,
            CompileError::BadOperandType {
                op: "++/--".to_string(),
                expected: "int".to_string(),
                found: t.ty.to_string(),
            },
        ));
    }
    Ok(t)
}
