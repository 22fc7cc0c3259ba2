//! Shared AST-builder helpers for the integration tests below. Since this
//! crate starts from an already-built AST rather than source text, these
//! stand in for the lexer/parser a real front end would provide.

use mjc::ast::*;
use mjc::position::{Node, Position};

pub fn pos() -> Position {
    Position::new(1, 1)
}

pub fn lit_int(v: i64) -> Expr {
    Node::new(ExprKind::LitInt(v), pos())
}

pub fn lit_true() -> Expr {
    Node::new(ExprKind::LitTrue, pos())
}

pub fn lit_false() -> Expr {
    Node::new(ExprKind::LitFalse, pos())
}

pub fn lit_string(text: &str) -> Expr {
    Node::new(ExprKind::LitString(text.to_string()), pos())
}

pub fn var(name: &str) -> Expr {
    Node::new(ExprKind::Var(name.to_string()), pos())
}

pub fn bin(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Node::new(
        ExprKind::BinaryOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        pos(),
    )
}

pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Node::new(
        ExprKind::Call {
            name: name.to_string(),
            args,
        },
        pos(),
    )
}

pub fn method_call(receiver: Expr, method: &str, args: Vec<Expr>) -> Expr {
    Node::new(
        ExprKind::MethodCall {
            receiver: Box::new(receiver),
            method: method.to_string(),
            args,
        },
        pos(),
    )
}

pub fn attribute(receiver: Expr, field: &str) -> Expr {
    Node::new(
        ExprKind::Attribute {
            receiver: Box::new(receiver),
            field: field.to_string(),
        },
        pos(),
    )
}

pub fn new_obj(class_name: &str) -> Expr {
    Node::new(ExprKind::New(class_name.to_string()), pos())
}

pub fn assign(target: Expr, value: Expr) -> Stmt {
    Node::new(StmtKind::Assign { target, value }, pos())
}

pub fn ret(e: Expr) -> Stmt {
    Node::new(StmtKind::ReturnValue(e), pos())
}

pub fn ret_void() -> Stmt {
    Node::new(StmtKind::ReturnVoid, pos())
}

pub fn expr_stmt(e: Expr) -> Stmt {
    Node::new(StmtKind::ExprStmt(e), pos())
}

pub fn if_stmt(cond: Expr, then_branch: Vec<Stmt>) -> Stmt {
    Node::new(
        StmtKind::If {
            cond,
            then_branch: Box::new(block(then_branch)),
        },
        pos(),
    )
}

pub fn if_else(cond: Expr, then_branch: Vec<Stmt>, else_branch: Vec<Stmt>) -> Stmt {
    Node::new(
        StmtKind::IfElse {
            cond,
            then_branch: Box::new(block(then_branch)),
            else_branch: Box::new(block(else_branch)),
        },
        pos(),
    )
}

pub fn while_stmt(cond: Expr, body: Vec<Stmt>) -> Stmt {
    Node::new(
        StmtKind::While {
            cond,
            body: Box::new(block(body)),
        },
        pos(),
    )
}

pub fn decl(ty: TypeName, name: &str, init: Expr) -> Stmt {
    Node::new(
        StmtKind::Decl {
            ty,
            declarators: vec![Declarator {
                name: name.to_string(),
                init,
                pos: pos(),
            }],
        },
        pos(),
    )
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    Block { stmts }
}

pub fn param(name: &str, ty: TypeName) -> Param {
    Param {
        name: name.to_string(),
        ty,
        pos: pos(),
    }
}

pub fn func(name: &str, return_type: TypeName, params: Vec<Param>, stmts: Vec<Stmt>) -> TopLevelFunction {
    TopLevelFunction {
        name: name.to_string(),
        return_type,
        params,
        body: block(stmts),
        pos: pos(),
    }
}

pub fn main_fn(stmts: Vec<Stmt>) -> TopLevelFunction {
    func("main", TypeName::Int, vec![], stmts)
}

pub fn field(name: &str, ty: TypeName) -> Field {
    Field {
        name: name.to_string(),
        ty,
        pos: pos(),
    }
}

pub fn class(
    name: &str,
    parent: Option<&str>,
    fields: Vec<Field>,
    methods: Vec<TopLevelFunction>,
) -> ClassDef {
    ClassDef {
        name: name.to_string(),
        parent: parent.map(|s| s.to_string()),
        fields,
        methods,
        pos: pos(),
    }
}

pub fn program(functions: Vec<TopLevelFunction>, classes: Vec<ClassDef>) -> Program {
    Program { functions, classes }
}
