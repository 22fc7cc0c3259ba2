//! The program-level checker: the entry point of semantic analysis. Builds
//! the function and class tables, validates the inheritance structure, and
//! then dispatches into `sema::function`/`sema::class` for every body.

use crate::ast;
use crate::env::{ClassInfo, Environment, FunctionSig};
use crate::error::{CompileError, Spanned};
use crate::layout::{self, ClassLayout};
use crate::position::Position;
use crate::sema::{class, function};
use crate::types::Type;
use crate::typed;
use std::collections::{HashMap, HashSet};

type Result<T> = std::result::Result<T, Spanned<CompileError>>;

fn err(pos: Position, e: CompileError) -> Spanned<CompileError> {
    Spanned::new(e, pos)
}

fn resolve_ty(ty: &ast::TypeName, known_classes: &HashSet<String>, pos: Position) -> Result<Type> {
    Ok(match ty {
        ast::TypeName::Int => Type::Int,
        ast::TypeName::Boolean => Type::Bool,
        ast::TypeName::String => Type::String,
        ast::TypeName::Void => Type::Void,
        ast::TypeName::Class(name) => {
            if !known_classes.contains(name) {
                return Err(err(pos, CompileError::UndefinedClass(name.clone())));
            }
            Type::Class(name.clone())
        }
    })
}

/// The runtime's free functions, seeded into `env.fun` before any
/// user-declared function is registered (so a clashing user declaration is
/// rejected as a redefinition, the same as clashing with another
/// user-declared function).
fn intrinsics() -> HashMap<String, FunctionSig> {
    let mut fun = HashMap::new();
    fun.insert(
        "printInt".to_string(),
        FunctionSig {
            return_type: Type::Void,
            params: vec![Type::Int],
            label: "top_printInt".to_string(),
        },
    );
    fun.insert(
        "printString".to_string(),
        FunctionSig {
            return_type: Type::Void,
            params: vec![Type::String],
            label: "top_printString".to_string(),
        },
    );
    fun.insert(
        "error".to_string(),
        FunctionSig {
            return_type: Type::Void,
            params: vec![],
            label: "top_error".to_string(),
        },
    );
    fun.insert(
        "readInt".to_string(),
        FunctionSig {
            return_type: Type::Int,
            params: vec![],
            label: "top_readInt".to_string(),
        },
    );
    fun.insert(
        "readString".to_string(),
        FunctionSig {
            return_type: Type::String,
            params: vec![],
            label: "top_readString".to_string(),
        },
    );
    fun
}

fn param_sig(
    params: &[ast::Param],
    known_classes: &HashSet<String>,
) -> Result<Vec<Type>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(params.len());
    for p in params {
        if !seen.insert(p.name.clone()) {
            return Err(err(p.pos, CompileError::DuplicateParam(p.name.clone())));
        }
        let ty = resolve_ty(&p.ty, known_classes, p.pos)?;
        if ty == Type::Void {
            return Err(err(p.pos, CompileError::VoidNotAllowed));
        }
        out.push(ty);
    }
    Ok(out)
}

/// Register every class. A parent may name any other class in the program,
/// declared before or after it — declaration order is not a constraint;
/// `build_layouts`'s chain walk (`layout::resolve_chain`) is what rejects an
/// inheritance cycle, by detecting a revisited class name.
fn build_class_table(classes: &[ast::ClassDef]) -> Result<HashMap<String, ClassInfo>> {
    let mut known_classes: HashSet<String> = HashSet::new();
    for c in classes {
        if !known_classes.insert(c.name.clone()) {
            return Err(err(c.pos, CompileError::DuplicateClass(c.name.clone())));
        }
    }

    let mut cls = HashMap::new();
    for c in classes {
        if let Some(parent) = &c.parent {
            if !known_classes.contains(parent) {
                return Err(err(c.pos, CompileError::UndefinedClass(parent.clone())));
            }
        }

        let mut own_fields = Vec::with_capacity(c.fields.len());
        let mut seen_fields = HashSet::new();
        for f in &c.fields {
            if !seen_fields.insert(f.name.clone()) {
                return Err(err(f.pos, CompileError::DuplicateField(f.name.clone())));
            }
            let ty = resolve_ty(&f.ty, &known_classes, f.pos)?;
            if ty == Type::Void {
                return Err(err(f.pos, CompileError::VoidNotAllowed));
            }
            own_fields.push((f.name.clone(), ty));
        }

        let mut own_methods = HashMap::new();
        for m in &c.methods {
            if own_methods.contains_key(&m.name) {
                return Err(err(m.pos, CompileError::DuplicateFunction(m.name.clone())));
            }
            let return_type = resolve_ty(&m.return_type, &known_classes, m.pos)?;
            let params = param_sig(&m.params, &known_classes)?;
            own_methods.insert(
                m.name.clone(),
                FunctionSig {
                    return_type,
                    params,
                    label: format!("cls_{}_{}", c.name, m.name),
                },
            );
        }

        cls.insert(
            c.name.clone(),
            ClassInfo {
                name: c.name.clone(),
                parent: c.parent.clone(),
                own_fields,
                own_methods,
                pos: c.pos,
            },
        );
    }
    Ok(cls)
}

fn build_function_table(
    functions: &[ast::TopLevelFunction],
    known_classes: &HashSet<String>,
) -> Result<HashMap<String, FunctionSig>> {
    let mut fun = intrinsics();
    for f in functions {
        if fun.contains_key(&f.name) {
            return Err(err(f.pos, CompileError::DuplicateFunction(f.name.clone())));
        }
        let return_type = resolve_ty(&f.return_type, known_classes, f.pos)?;
        let params = param_sig(&f.params, known_classes)?;
        fun.insert(
            f.name.clone(),
            FunctionSig {
                return_type,
                params,
                label: format!("top_{}", f.name),
            },
        );
    }
    let has_valid_main = functions
        .iter()
        .any(|f| f.name == "main" && f.params.is_empty());
    if !has_valid_main {
        return Err(err(
            Position::default(),
            CompileError::Compile("program must declare a `main` function taking no parameters".to_string()),
        ));
    }
    Ok(fun)
}

fn build_layouts(cls: &HashMap<String, ClassInfo>) -> Result<HashMap<String, ClassLayout>> {
    let mut layouts = HashMap::new();
    for (name, info) in cls {
        let (built, pos) = layout::build_layout(name, cls, info.pos).map_err(|e| err(pos, e))?;
        layouts.insert(name.clone(), built);
    }
    Ok(layouts)
}

/// Check a whole program and return the annotated tree alongside the
/// accumulated string-literal table, which the code generator needs to
/// emit the `.data` section.
pub fn check_program(
    program: &ast::Program,
) -> Result<(typed::Program, crate::env::StringTable)> {
    debug!(
        "building class and function tables ({} class(es), {} function(s))",
        program.classes.len(),
        program.functions.len()
    );
    let cls = build_class_table(&program.classes)?;
    let known_classes: HashSet<String> = cls.keys().cloned().collect();
    let fun = build_function_table(&program.functions, &known_classes)?;
    let layouts = build_layouts(&cls)?;
    debug!("class layouts resolved, checking bodies");

    let mut env = Environment::new(fun, cls, layouts);

    let mut functions = Vec::with_capacity(program.functions.len());
    for f in &program.functions {
        let label = format!("top_{}", f.name);
        functions.push(function::check_function(&mut env, f, label, false)?);
    }

    let mut classes = Vec::with_capacity(program.classes.len());
    for c in &program.classes {
        classes.push(class::check_class(&mut env, c)?);
    }

    debug!("semantic analysis complete");
    Ok((typed::Program { functions, classes }, env.strings))
}
