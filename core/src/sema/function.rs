//! The function checker: binds parameters to stack offsets, type-checks the
//! body, and enforces return-definiteness.

use crate::ast;
use crate::env::Environment;
use crate::error::{CompileError, Spanned};
use crate::sema::{expr, stmt};
use crate::storage::StorageLocation;
use crate::types::Type;
use crate::typed;
use std::collections::HashSet;

type Result<T> = std::result::Result<T, Spanned<CompileError>>;

fn err(pos: crate::position::Position, e: CompileError) -> Spanned<CompileError> {
    Spanned::new(e, pos)
}

/// Check one function or method body. `label` is the already-computed
/// emitted label (`top_<name>` or `cls_<class>_<method>`); `is_method`
/// controls whether parameter offsets start at +16 or +24 (reserving +16
/// for the implicit receiver).
pub fn check_function(
    env: &mut Environment,
    f: &ast::TopLevelFunction,
    label: String,
    is_method: bool,
) -> Result<typed::Function> {
    debug!("checking function `{}` ({})", f.name, label);
    let return_type = expr::resolve_type_name(env, &f.return_type, f.pos)?;
    env.current_fun = Some((f.name.clone(), return_type.clone()));
    env.push_scope();
    env.stack_counter = 0;

    let mut offset: i32 = if is_method { 24 } else { 16 };
    let mut seen = HashSet::new();
    for p in &f.params {
        if !seen.insert(p.name.clone()) {
            return Err(err(p.pos, CompileError::DuplicateParam(p.name.clone())));
        }
        let ty = expr::resolve_type_name(env, &p.ty, p.pos)?;
        if ty == Type::Void {
            return Err(err(p.pos, CompileError::VoidNotAllowed));
        }
        let location = StorageLocation::rbp(offset, ty.get_size());
        env.declare_var(&p.name, ty, location)
            .map_err(|_| err(p.pos, CompileError::DuplicateParam(p.name.clone())))?;
        offset += 8;
    }

    let (mut body, always_returns) = stmt::check_block(env, &f.body)?;

    if !always_returns {
        if return_type == Type::Void {
            body.stmts.push(typed::Stmt {
                kind: typed::StmtKind::ReturnVoid,
                pos: f.pos,
            });
        } else {
            env.pop_scope();
            env.current_fun = None;
            return Err(err(f.pos, CompileError::NoReturn(f.name.clone())));
        }
    }

    let stack_size = env.stack_counter;
    env.pop_scope();
    env.current_fun = None;

    Ok(typed::Function {
        label,
        return_type,
        param_count: f.params.len(),
        is_method,
        body,
        stack_size,
    })
}
