//! The expression checker: `get_type` plus annotation for every expression
//! kind, producing a [`typed::Expr`] from an [`ast::Expr`].

use crate::ast::{self, BinaryOp, ExprKind, UnaryOp};
use crate::env::Environment;
use crate::error::{CompileError, Spanned};
use crate::layout;
use crate::storage::{self, StorageLocation};
use crate::types::{self, Type};
use crate::typed;

type Result<T> = std::result::Result<T, Spanned<CompileError>>;

fn err(pos: crate::position::Position, e: CompileError) -> Spanned<CompileError> {
    Spanned::new(e, pos)
}

pub fn resolve_type_name(
    env: &Environment,
    ty: &ast::TypeName,
    pos: crate::position::Position,
) -> Result<Type> {
    Ok(match ty {
        ast::TypeName::Int => Type::Int,
        ast::TypeName::Boolean => Type::Bool,
        ast::TypeName::String => Type::String,
        ast::TypeName::Void => Type::Void,
        ast::TypeName::Class(name) => {
            if env.lookup_class(name).is_none() {
                return Err(err(pos, CompileError::UndefinedClass(name.clone())));
            }
            Type::Class(name.clone())
        }
    })
}

/// Check and annotate a single expression.
pub fn check_expr(env: &mut Environment, expr: &ast::Expr) -> Result<typed::Expr> {
    let pos = expr.pos;
    match &expr.kind {
        ExprKind::Var(name) => {
            if let Some(entry) = env.lookup_var(name).cloned() {
                return Ok(typed::Expr {
                    kind: typed::ExprKind::Var {
                        location: entry.location,
                    },
                    ty: entry.ty,
                    pos,
                });
            }
            // Not a local or parameter: inside a method, a bare name may
            // still resolve to an inherited or own attribute, read off the
            // receiver that method bodies keep pinned in r13.
            if let Some(class_name) = env.in_class.clone() {
                let layout = env
                    .layouts
                    .get(&class_name)
                    .expect("in_class is only set for a registered class");
                if let Some(field_offset) = layout.field_offset(name) {
                    let field_ty = layout
                        .field_type(name)
                        .expect("field_offset succeeded, so field_type must too")
                        .clone();
                    let receiver = typed::Expr {
                        kind: typed::ExprKind::Var {
                            location: StorageLocation::Register(storage::R13),
                        },
                        ty: Type::Class(class_name),
                        pos,
                    };
                    return Ok(typed::Expr {
                        kind: typed::ExprKind::Attribute {
                            receiver: Box::new(receiver),
                            field_offset,
                        },
                        ty: field_ty,
                        pos,
                    });
                }
            }
            Err(err(pos, CompileError::UndefinedVariable(name.clone())))
        }

        ExprKind::LitInt(value) => {
            if *value < i32::MIN as i64 || *value > i32::MAX as i64 {
                return Err(err(pos, CompileError::IntLiteralOutOfRange(*value)));
            }
            Ok(typed::Expr {
                kind: typed::ExprKind::LitInt(*value as i32),
                ty: Type::Int,
                pos,
            })
        }

        ExprKind::LitTrue => Ok(typed::Expr {
            kind: typed::ExprKind::LitTrue,
            ty: Type::Bool,
            pos,
        }),
        ExprKind::LitFalse => Ok(typed::Expr {
            kind: typed::ExprKind::LitFalse,
            ty: Type::Bool,
            pos,
        }),
        ExprKind::LitString(text) => {
            let label = env.intern_string(text);
            Ok(typed::Expr {
                kind: typed::ExprKind::LitString(label),
                ty: Type::String,
                pos,
            })
        }
        ExprKind::LitNull => Ok(typed::Expr {
            kind: typed::ExprKind::LitNull,
            ty: Type::Null,
            pos,
        }),

        ExprKind::Call { name, args } => {
            let sig = env
                .lookup_fun(name)
                .cloned()
                .ok_or_else(|| err(pos, CompileError::UndefinedFunction(name.clone())))?;
            if sig.params.len() != args.len() {
                return Err(err(
                    pos,
                    CompileError::ArityMismatch {
                        expected: sig.params.len(),
                        found: args.len(),
                    },
                ));
            }
            let mut targs = Vec::with_capacity(args.len());
            for (arg, expected) in args.iter().zip(&sig.params) {
                let t = check_expr(env, arg)?;
                if !types::is_subtype(&t.ty, expected, &*env) {
                    return Err(err(
                        arg.pos,
                        CompileError::TypeMismatch {
                            expected: expected.to_string(),
                            found: t.ty.to_string(),
                        },
                    ));
                }
                targs.push(t);
            }
            Ok(typed::Expr {
                kind: typed::ExprKind::Call {
                    label: sig.label.clone(),
                    args: targs,
                },
                ty: sig.return_type.clone(),
                pos,
            })
        }

        ExprKind::MethodCall {
            receiver,
            method,
            args,
        } => {
            let trecv = check_expr(env, receiver)?;
            let class_name = trecv.ty.class_name().ok_or_else(|| {
                err(
                    receiver.pos,
                    CompileError::TypeMismatch {
                        expected: "a class type".to_string(),
                        found: trecv.ty.to_string(),
                    },
                )
            })?;
            let sig = layout::resolve_method(class_name, method, &env.cls)
                .cloned()
                .ok_or_else(|| {
                    err(
                        pos,
                        CompileError::UndefinedMethod(method.clone(), class_name.to_string()),
                    )
                })?;
            if sig.params.len() != args.len() {
                return Err(err(
                    pos,
                    CompileError::ArityMismatch {
                        expected: sig.params.len(),
                        found: args.len(),
                    },
                ));
            }
            let mut targs = Vec::with_capacity(args.len());
            for (arg, expected) in args.iter().zip(&sig.params) {
                let t = check_expr(env, arg)?;
                if !types::is_subtype(&t.ty, expected, &*env) {
                    return Err(err(
                        arg.pos,
                        CompileError::TypeMismatch {
                            expected: expected.to_string(),
                            found: t.ty.to_string(),
                        },
                    ));
                }
                targs.push(t);
            }
            let layout = env
                .layouts
                .get(class_name)
                .expect("every registered class has a layout");
            let method_offset = layout
                .method_offset(method)
                .expect("resolve_method found it, so the layout has a slot for it");
            Ok(typed::Expr {
                kind: typed::ExprKind::MethodCall {
                    receiver: Box::new(trecv),
                    method_offset,
                    args: targs,
                },
                ty: sig.return_type.clone(),
                pos,
            })
        }

        ExprKind::Attribute { receiver, field } => {
            let trecv = check_expr(env, receiver)?;
            let class_name = trecv.ty.class_name().ok_or_else(|| {
                err(
                    receiver.pos,
                    CompileError::TypeMismatch {
                        expected: "a class type".to_string(),
                        found: trecv.ty.to_string(),
                    },
                )
            })?;
            let layout = env
                .layouts
                .get(class_name)
                .expect("every registered class has a layout");
            let field_offset = layout.field_offset(field).ok_or_else(|| {
                err(
                    pos,
                    CompileError::NoAttribute(field.clone(), class_name.to_string()),
                )
            })?;
            let field_ty = layout
                .field_type(field)
                .expect("field_offset succeeded, so field_type must too")
                .clone();
            Ok(typed::Expr {
                kind: typed::ExprKind::Attribute {
                    receiver: Box::new(trecv),
                    field_offset,
                },
                ty: field_ty,
                pos,
            })
        }

        ExprKind::New(class_name) => {
            let layout = env.layouts.get(class_name).ok_or_else(|| {
                err(pos, CompileError::UndefinedClass(class_name.clone()))
            })?;
            Ok(typed::Expr {
                kind: typed::ExprKind::New {
                    class_size: layout.size(),
                    vtable_label: format!("vtable_{}", class_name),
                    field_count: layout.fields.len(),
                },
                ty: Type::Class(class_name.clone()),
                pos,
            })
        }

        ExprKind::Cast { ty, inner } => {
            let to = resolve_type_name(env, ty, pos)?;
            let tinner = check_expr(env, inner)?;
            if !types::can_cast(&tinner.ty, &to, &*env) {
                return Err(err(
                    pos,
                    CompileError::InvalidCast {
                        from: tinner.ty.to_string(),
                        to: to.to_string(),
                    },
                ));
            }
            Ok(typed::Expr {
                kind: typed::ExprKind::Cast(Box::new(tinner)),
                ty: to,
                pos,
            })
        }

        ExprKind::UnaryOp { op, operand } => {
            let t = check_expr(env, operand)?;
            match op {
                UnaryOp::Neg => {
                    if t.ty != Type::Int {
                        return Err(err(
                            pos,
                            CompileError::BadOperandType {
                                op: "-".to_string(),
                                expected: "int".to_string(),
                                found: t.ty.to_string(),
                            },
                        ));
                    }
                    Ok(typed::Expr {
                        kind: typed::ExprKind::UnaryOp {
                            op: *op,
                            operand: Box::new(t),
                        },
                        ty: Type::Int,
                        pos,
                    })
                }
                UnaryOp::Not => {
                    if t.ty != Type::Bool {
                        return Err(err(
                            pos,
                            CompileError::BadOperandType {
                                op: "!".to_string(),
                                expected: "boolean".to_string(),
                                found: t.ty.to_string(),
                            },
                        ));
                    }
                    Ok(typed::Expr {
                        kind: typed::ExprKind::UnaryOp {
                            op: *op,
                            operand: Box::new(t),
                        },
                        ty: Type::Bool,
                        pos,
                    })
                }
            }
        }

        ExprKind::BinaryOp { op, lhs, rhs } => check_binary_op(env, *op, lhs, rhs, pos),
    }
}

fn check_binary_op(
    env: &mut Environment,
    op: BinaryOp,
    lhs: &ast::Expr,
    rhs: &ast::Expr,
    pos: crate::position::Position,
) -> Result<typed::Expr> {
    let tl = check_expr(env, lhs)?;
    let tr = check_expr(env, rhs)?;

    let int_op = |tl: typed::Expr, tr: typed::Expr, name: &str| -> Result<(typed::Expr, typed::Expr)> {
        for t in [&tl, &tr] {
            if t.ty != Type::Int {
                return Err(err(
                    pos,
                    CompileError::BadOperandType {
                        op: name.to_string(),
                        expected: "int".to_string(),
                        found: t.ty.to_string(),
                    },
                ));
            }
        }
        Ok((tl, tr))
    };
    let bool_op = |tl: typed::Expr, tr: typed::Expr, name: &str| -> Result<(typed::Expr, typed::Expr)> {
        for t in [&tl, &tr] {
            if t.ty != Type::Bool {
                return Err(err(
                    pos,
                    CompileError::BadOperandType {
                        op: name.to_string(),
                        expected: "boolean".to_string(),
                        found: t.ty.to_string(),
                    },
                ));
            }
        }
        Ok((tl, tr))
    };

    match op {
        BinaryOp::Add => {
            if tl.ty == Type::String && tr.ty == Type::String {
                return Ok(typed::Expr {
                    kind: typed::ExprKind::StrConcat {
                        lhs: Box::new(tl),
                        rhs: Box::new(tr),
                    },
                    ty: Type::String,
                    pos,
                });
            }
            let (tl, tr) = int_op(tl, tr, "+")?;
            Ok(typed::Expr {
                kind: typed::ExprKind::BinaryOp {
                    op,
                    lhs: Box::new(tl),
                    rhs: Box::new(tr),
                },
                ty: Type::Int,
                pos,
            })
        }
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let (tl, tr) = int_op(tl, tr, op_symbol(op))?;
            Ok(typed::Expr {
                kind: typed::ExprKind::BinaryOp {
                    op,
                    lhs: Box::new(tl),
                    rhs: Box::new(tr),
                },
                ty: Type::Int,
                pos,
            })
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let (tl, tr) = int_op(tl, tr, op_symbol(op))?;
            Ok(typed::Expr {
                kind: typed::ExprKind::BinaryOp {
                    op,
                    lhs: Box::new(tl),
                    rhs: Box::new(tr),
                },
                ty: Type::Bool,
                pos,
            })
        }
        BinaryOp::Eq | BinaryOp::Ne => {
            if !types::is_subtype(&tl.ty, &tr.ty, &*env) && !types::is_subtype(&tr.ty, &tl.ty, &*env) {
                return Err(err(
                    pos,
                    CompileError::TypeMismatch {
                        expected: tl.ty.to_string(),
                        found: tr.ty.to_string(),
                    },
                ));
            }
            Ok(typed::Expr {
                kind: typed::ExprKind::BinaryOp {
                    op,
                    lhs: Box::new(tl),
                    rhs: Box::new(tr),
                },
                ty: Type::Bool,
                pos,
            })
        }
        BinaryOp::And | BinaryOp::Or => {
            let (tl, tr) = bool_op(tl, tr, op_symbol(op))?;
            Ok(typed::Expr {
                kind: typed::ExprKind::BinaryOp {
                    op,
                    lhs: Box::new(tl),
                    rhs: Box::new(tr),
                },
                ty: Type::Bool,
                pos,
            })
        }
    }
}

fn op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}
