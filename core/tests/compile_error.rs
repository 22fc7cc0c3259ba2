//! Integration tests covering programs that must be rejected during
//! semantic analysis, one per `CompileError` variant that's reachable from
//! a whole-program compile (as opposed to the narrower unit tests in
//! `sema`/`layout`'s own `#[cfg(test)]` modules).

mod common;

use common::*;
use mjc::ast::{BinaryOp, TypeName};
use mjc::{CompileError, CompileOptions, Compiler};

fn expect_error(p: mjc::ast::Program) -> CompileError {
    Compiler::new(p).check().unwrap_err().error
}

#[test]
fn program_without_main_is_rejected() {
    let p = program(vec![], vec![]);
    assert!(matches!(expect_error(p), CompileError::Compile(_)));
}

#[test]
fn function_without_return_on_every_path_is_rejected() {
    // The condition isn't foldable (it depends on a parameter), so neither
    // branch of `if` without `else` can be assumed to run.
    let f = func(
        "f",
        TypeName::Int,
        vec![param("x", TypeName::Int)],
        vec![if_stmt(
            bin(BinaryOp::Gt, var("x"), lit_int(0)),
            vec![ret(lit_int(1))],
        )],
    );
    let p = program(vec![main_fn(vec![ret(lit_int(0))]), f], vec![]);
    assert!(matches!(expect_error(p), CompileError::NoReturn(name) if name == "f"));
}

#[test]
fn if_true_without_else_is_recognized_as_definitely_returning() {
    // `if (true) return 1;` with no other statement is accepted: the
    // condition folds to a known-true constant.
    let f = func("f", TypeName::Int, vec![], vec![if_stmt(lit_true(), vec![ret(lit_int(1))])]);
    let p = program(vec![main_fn(vec![ret(lit_int(0))]), f], vec![]);
    assert!(Compiler::new(p).check().is_ok());
}

#[test]
fn undefined_variable_is_rejected() {
    let p = program(vec![main_fn(vec![ret(var("nope"))])], vec![]);
    assert!(matches!(expect_error(p), CompileError::UndefinedVariable(name) if name == "nope"));
}

#[test]
fn type_mismatch_in_return_is_rejected() {
    let p = program(vec![main_fn(vec![ret(lit_true())])], vec![]);
    assert!(matches!(expect_error(p), CompileError::TypeMismatch { .. }));
}

#[test]
fn bad_operand_type_for_arithmetic_is_rejected() {
    let p = program(
        vec![main_fn(vec![ret(bin(BinaryOp::Add, lit_int(1), lit_true()))])],
        vec![],
    );
    assert!(matches!(expect_error(p), CompileError::BadOperandType { .. }));
}

#[test]
fn class_referencing_undefined_parent_is_rejected() {
    let p = program(
        vec![main_fn(vec![ret(lit_int(0))])],
        vec![class("B", Some("A"), vec![], vec![])],
    );
    assert!(matches!(expect_error(p), CompileError::UndefinedClass(name) if name == "A"));
}

#[test]
fn inheritance_cycle_is_rejected() {
    let p = program(
        vec![main_fn(vec![ret(lit_int(0))])],
        vec![
            class("A", Some("B"), vec![], vec![]),
            class("B", Some("A"), vec![], vec![]),
        ],
    );
    assert!(matches!(expect_error(p), CompileError::InheritanceCycle(_)));
}

#[test]
fn duplicate_class_is_rejected() {
    let p = program(
        vec![main_fn(vec![ret(lit_int(0))])],
        vec![
            class("A", None, vec![], vec![]),
            class("A", None, vec![], vec![]),
        ],
    );
    assert!(matches!(expect_error(p), CompileError::DuplicateClass(name) if name == "A"));
}

#[test]
fn duplicate_field_across_inheritance_chain_is_rejected() {
    let p = program(
        vec![main_fn(vec![ret(lit_int(0))])],
        vec![
            class("A", None, vec![field("x", TypeName::Int)], vec![]),
            class("B", Some("A"), vec![field("x", TypeName::Int)], vec![]),
        ],
    );
    assert!(matches!(expect_error(p), CompileError::DuplicateField(name) if name == "x"));
}

#[test]
fn method_override_with_different_signature_is_rejected() {
    let get_int = func("get", TypeName::Int, vec![], vec![ret(lit_int(0))]);
    let get_bool = func("get", TypeName::Boolean, vec![], vec![ret(lit_true())]);
    let p = program(
        vec![main_fn(vec![ret(lit_int(0))])],
        vec![
            class("A", None, vec![], vec![get_int]),
            class("B", Some("A"), vec![], vec![get_bool]),
        ],
    );
    assert!(matches!(
        expect_error(p),
        CompileError::OverrideSignatureMismatch { name, ancestor } if name == "get" && ancestor == "A"
    ));
}

#[test]
fn int_literal_out_of_32_bit_range_is_rejected() {
    let p = program(vec![main_fn(vec![ret(lit_int(1i64 << 40))])], vec![]);
    assert!(matches!(expect_error(p), CompileError::IntLiteralOutOfRange(_)));
}

#[test]
fn arity_mismatch_is_rejected() {
    let helper = func("helper", TypeName::Int, vec![param("a", TypeName::Int)], vec![ret(var("a"))]);
    let p = program(
        vec![main_fn(vec![ret(call("helper", vec![]))]), helper],
        vec![],
    );
    assert!(matches!(expect_error(p), CompileError::ArityMismatch { expected: 1, found: 0 }));
}

#[test]
fn emit_comments_toggle_does_not_affect_semantic_checking() {
    // `CompileOptions` only governs `generate`; a program that's otherwise
    // invalid stays invalid no matter how it's configured downstream.
    let p = program(vec![main_fn(vec![ret(var("nope"))])], vec![]);
    let _ = CompileOptions { emit_comments: true };
    assert!(matches!(expect_error(p), CompileError::UndefinedVariable(_)));
}
