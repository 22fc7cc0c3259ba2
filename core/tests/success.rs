//! Integration tests covering programs that must compile successfully,
//! asserting on the shape of the emitted NASM text rather than assembling
//! and running it (out of scope for this crate).

mod common;

use common::*;
use mjc::ast::{BinaryOp, TypeName};
use mjc::{CompileOptions, Compiler};

fn generate(p: mjc::ast::Program) -> String {
    Compiler::new(p)
        .check()
        .unwrap_or_else(|e| panic!("expected successful compile, got {}", e))
        .generate(CompileOptions::default())
}

#[test]
fn minimal_main_emits_a_labeled_prologue_and_epilogue() {
    let p = program(vec![main_fn(vec![ret(lit_int(0))])], vec![]);
    let asm = generate(p);
    assert!(asm.contains("global top_main"));
    assert!(asm.contains("top_main:"));
    assert!(asm.contains("push rbp"));
    assert!(asm.contains("mov rbp, rsp"));
    assert!(asm.contains("mov eax, 0"));
    assert!(asm.contains("ret"));
}

#[test]
fn string_literal_is_interned_once_and_appears_in_data_section() {
    let f = func(
        "f",
        TypeName::Void,
        vec![],
        vec![
            expr_stmt(call("printString", vec![lit_string("hi")])),
            expr_stmt(call("printString", vec![lit_string("hi")])),
            ret_void(),
        ],
    );
    let p = program(vec![main_fn(vec![ret(lit_int(0))]), f], vec![]);
    let asm = generate(p);
    assert!(asm.contains("section .data"));
    // "hi" interned as two ASCII byte values plus the NUL terminator.
    assert!(asm.contains("104,105,0"));
    // Only one label is defined for the string's `db` line (both calls
    // reuse it), even though two `call top_printString` sites reference it.
    let db_lines = asm.lines().filter(|l| l.contains("db 104,105,0")).count();
    assert_eq!(db_lines, 1);
}

#[test]
fn if_else_emits_distinct_false_and_end_labels_with_a_jump_over_the_else_branch() {
    let f = func(
        "f",
        TypeName::Int,
        vec![param("x", TypeName::Int)],
        vec![if_else(
            bin(BinaryOp::Gt, var("x"), lit_int(0)),
            vec![ret(lit_int(1))],
            vec![ret(lit_int(-1))],
        )],
    );
    let p = program(vec![main_fn(vec![ret(lit_int(0))]), f], vec![]);
    let asm = generate(p);
    // Three distinct labels per if/else (true/false/end), and an explicit
    // jump from the then-branch over the else-branch.
    assert!(asm.contains("jg "));
    assert!(asm.contains("jmp "));
    let jumps = asm.lines().filter(|l| l.trim_start().starts_with("jmp ")).count();
    assert!(jumps >= 2, "expected a fallthrough jmp plus the else-skip jmp, got {}", jumps);
}

#[test]
fn while_loop_emits_a_condition_recheck_before_each_iteration() {
    let f = func(
        "count",
        TypeName::Void,
        vec![],
        vec![
            decl(TypeName::Int, "i", lit_int(0)),
            while_stmt(
                bin(BinaryOp::Lt, var("i"), lit_int(10)),
                vec![assign(var("i"), bin(BinaryOp::Add, var("i"), lit_int(1)))],
            ),
            ret_void(),
        ],
    );
    let p = program(vec![main_fn(vec![ret(lit_int(0))]), f], vec![]);
    let asm = generate(p);
    assert!(asm.contains("jl "));
    assert!(asm.contains("add eax, ebx"));
}

#[test]
fn class_may_forward_reference_a_parent_declared_later_in_the_program() {
    // `B`'s parent `A` is declared after it; only a revisited name (an
    // actual cycle) is rejected, not mere declaration order.
    let b = class("B", Some("A"), vec![], vec![]);
    let a = class("A", None, vec![field("x", TypeName::Int)], vec![]);
    let p = program(vec![main_fn(vec![ret(lit_int(0))])], vec![b, a]);
    assert!(Compiler::new(p).check().is_ok());
}

#[test]
fn class_hierarchy_emits_one_vtable_per_class_with_override_in_place() {
    let get_a = func("get", TypeName::Int, vec![], vec![ret(lit_int(1))]);
    let get_b = func("get", TypeName::Int, vec![], vec![ret(lit_int(2))]);
    let a = class("A", None, vec![field("x", TypeName::Int)], vec![get_a]);
    let b = class("B", Some("A"), vec![], vec![get_b]);
    let f = func(
        "make",
        TypeName::Int,
        vec![],
        vec![
            decl(TypeName::Class("A".to_string()), "obj", new_obj("B")),
            ret(method_call(var("obj"), "get", vec![])),
        ],
    );
    let p = program(vec![main_fn(vec![ret(lit_int(0))]), f], vec![a, b]);
    let asm = generate(p);
    assert!(asm.contains("vtable_A dq cls_A_get,0"));
    assert!(asm.contains("vtable_B dq cls_B_get,0"));
    assert!(asm.contains("cls_A_get:"));
    assert!(asm.contains("cls_B_get:"));
    assert!(asm.contains("call malloc"));
    assert!(asm.contains("call [r14+0]"));
}

#[test]
fn method_call_argument_reads_the_caller_receiver_before_dispatch_is_installed() {
    // `get`'s argument to `helper` is its own implicit self-field `x`; the
    // callee's receiver/vtable must not be installed into r13/r14 until
    // after that argument is evaluated against the *caller's* receiver.
    let helper = func("helper", TypeName::Int, vec![param("y", TypeName::Int)], vec![ret(var("y"))]);
    let get = func(
        "get",
        TypeName::Int,
        vec![param("other", TypeName::Class("A".to_string()))],
        vec![ret(method_call(var("other"), "helper", vec![var("x")]))],
    );
    let a = class("A", None, vec![field("x", TypeName::Int)], vec![helper, get]);
    let f = func(
        "make",
        TypeName::Int,
        vec![],
        vec![
            decl(TypeName::Class("A".to_string()), "a1", new_obj("A")),
            decl(TypeName::Class("A".to_string()), "a2", new_obj("A")),
            ret(method_call(var("a1"), "get", vec![var("a2")])),
        ],
    );
    let p = program(vec![main_fn(vec![ret(lit_int(0))]), f], vec![a]);
    let asm = generate(p);
    assert!(asm.contains("mov rdx, r14"));
    assert!(asm.contains("mov r13, rdx"));
    assert!(asm.contains("mov r14, [rdx]"));
}

#[test]
fn call_nested_inside_another_calls_argument_list_each_save_and_restore_r12() {
    // `g(...)`'s own call-alignment bookkeeping runs while still inside
    // `f`'s argument-evaluation window; each call's `push r12`/`pop r12`
    // must be independent for the outer call's `rsp` restore to be valid.
    let g = func("g", TypeName::Int, vec![param("y", TypeName::Int)], vec![ret(var("y"))]);
    let f = func(
        "f",
        TypeName::Int,
        vec![
            param("a", TypeName::Int),
            param("b", TypeName::Int),
            param("c", TypeName::Int),
        ],
        vec![ret(bin(BinaryOp::Add, bin(BinaryOp::Add, var("a"), var("b")), var("c")))],
    );
    let caller = func(
        "run",
        TypeName::Int,
        vec![],
        vec![ret(call("f", vec![lit_int(1), call("g", vec![lit_int(2)]), lit_int(3)]))],
    );
    let p = program(vec![main_fn(vec![ret(lit_int(0))]), g, f, caller], vec![]);
    let asm = generate(p);
    let push_r12 = asm.lines().filter(|l| l.trim() == "push r12").count();
    let pop_r12 = asm.lines().filter(|l| l.trim() == "pop r12").count();
    assert_eq!(push_r12, pop_r12);
    assert!(push_r12 >= 2, "expected at least one push r12 per call site, got {}", push_r12);
}

#[test]
fn bare_name_inside_a_method_falls_back_to_an_implicit_attribute_read() {
    // `x` isn't a local or parameter of `get`, so it resolves to the
    // receiver's own field, read through `r14` at its flattened offset.
    let getter = func("get", TypeName::Int, vec![], vec![ret(var("x"))]);
    let a = class("A", None, vec![field("x", TypeName::Int)], vec![getter]);
    let f = func(
        "make",
        TypeName::Int,
        vec![],
        vec![ret(method_call(new_obj("A"), "get", vec![]))],
    );
    let p = program(vec![main_fn(vec![ret(lit_int(0))]), f], vec![a]);
    let asm = generate(p);
    assert!(asm.contains("DWORD [r14+8]"));
}

#[test]
fn explicit_attribute_expression_reads_through_a_pointer_offset() {
    let f = func(
        "make",
        TypeName::Int,
        vec![],
        vec![
            decl(TypeName::Class("A".to_string()), "obj", new_obj("A")),
            ret(attribute(var("obj"), "x")),
        ],
    );
    let a = class("A", None, vec![field("x", TypeName::Int)], vec![]);
    let p = program(vec![main_fn(vec![ret(lit_int(0))]), f], vec![a]);
    let asm = generate(p);
    assert!(asm.contains("DWORD [r14+8]"));
}

#[test]
fn emit_comments_adds_cosmetic_lines_without_changing_instructions() {
    let p = program(vec![main_fn(vec![ret(lit_int(0))])], vec![]);
    let plain = Compiler::new(p.clone())
        .check()
        .unwrap()
        .generate(CompileOptions::default());
    let commented = Compiler::new(p)
        .check()
        .unwrap()
        .generate(CompileOptions { emit_comments: true });
    assert!(!plain.contains("; function top_main"));
    assert!(commented.contains("; function top_main"));
}
