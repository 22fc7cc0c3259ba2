//! The class checker: analyzes every method of a class against its
//! already-resolved layout (built once for the whole class table in
//! `sema::program`, before any method body is checked).

use crate::ast;
use crate::env::Environment;
use crate::error::{CompileError, Spanned};
use crate::sema::function;
use crate::typed;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Spanned<CompileError>>;

pub fn check_class(env: &mut Environment, c: &ast::ClassDef) -> Result<typed::Class> {
    debug!("checking class `{}` ({} method(s))", c.name, c.methods.len());
    let layout = env
        .layouts
        .get(&c.name)
        .cloned()
        .expect("every class has a layout built before sema::class runs");

    let mut methods = Vec::with_capacity(c.methods.len());
    for m in &c.methods {
        env.in_class = Some(c.name.clone());
        let label = format!("cls_{}_{}", c.name, m.name);
        let checked = function::check_function(env, m, label, true)?;
        env.in_class = None;
        methods.push(checked);
    }

    Ok(typed::Class {
        name: c.name.clone(),
        layout: Rc::new(layout),
        methods,
    })
}
