// tests/analyze_script.rs
//! End-to-end analysis of a whole script against a host-populated catalog,
//! driving the crate the way an embedding application would.

use skink::frontend::ast::*;
use skink::frontend::{Interner, Span};
use skink::ir::{IrExpr, IrStmt, MethodRef};
use skink::sema::{CastKind, Type, TypeCatalog, analyze};

fn at(offset: usize) -> Span {
    Span::new(offset, offset + 1, 1, 1)
}

fn expr(kind: ExprKind, offset: usize) -> Expr {
    Expr {
        kind,
        span: at(offset),
    }
}

fn var(interner: &mut Interner, name: &str, offset: usize) -> Expr {
    expr(ExprKind::Var(interner.intern(name)), offset)
}

fn decl(
    interner: &mut Interner,
    ty: TypeExpr,
    name: &str,
    init: Option<Expr>,
    offset: usize,
) -> Stmt {
    Stmt::Declaration(DeclStmt {
        ty,
        name: interner.intern(name),
        init,
        span: at(offset),
    })
}

fn expr_stmt(expr: Expr) -> Stmt {
    let span = expr.span;
    Stmt::Expression(ExprStmt { expr, span })
}

/// Catalog population is the host's pre-analysis setup step
fn host_catalog() -> TypeCatalog {
    let mut catalog = TypeCatalog::new();
    let object = catalog.register_class("Object");
    let bool_ty = catalog.register_class("bool");
    let int = catalog.register_class("int");
    let string = catalog.register_class("String");
    catalog.add_supertype(string, object);
    let iterator = catalog.register_class("Iterator");
    let list = catalog.register_class("List");
    catalog.add_supertype(list, object);
    catalog.register_method(list, "iterator", &[], Type::Concrete(iterator));
    catalog.register_method(list, "add", &[Type::Dynamic], Type::Concrete(bool_ty));
    catalog.register_field(list, "length", Type::Concrete(int));
    catalog.register_constructor(list, &[]);
    catalog
}

/// ```text
/// List items = new List();
/// items.add("one");
/// def source = items;
/// List sink = new List();
/// for (String s in source) {
///     sink.add(s);
/// }
/// return sink.length;
/// ```
#[test]
fn analyze_list_pipeline_script() {
    let catalog = host_catalog();
    let mut interner = Interner::new();
    let i = &mut interner;

    let list_ty = TypeExpr::Named(i.intern("List"));
    let new_items = expr(
        ExprKind::New {
            ty: TypeExpr::Named(i.intern("List")),
            args: vec![],
        },
        13,
    );
    let decl_items = decl(i, list_ty, "items", Some(new_items), 0);

    let add_receiver = var(i, "items", 26);
    let add_one = expr_stmt(expr(
        ExprKind::Call {
            receiver: Box::new(add_receiver),
            method: i.intern("add"),
            args: vec![expr(ExprKind::StringLiteral("one".to_string()), 36)],
        },
        32,
    ));

    let items_again = var(i, "items", 57);
    let decl_source = decl(i, TypeExpr::Dynamic, "source", Some(items_again), 44);

    let list_ty = TypeExpr::Named(i.intern("List"));
    let new_sink = expr(
        ExprKind::New {
            ty: TypeExpr::Named(i.intern("List")),
            args: vec![],
        },
        76,
    );
    let decl_sink = decl(i, list_ty, "sink", Some(new_sink), 64);

    let sink_add = expr_stmt(expr(
        ExprKind::Call {
            receiver: Box::new(var(i, "sink", 120)),
            method: i.intern("add"),
            args: vec![var(i, "s", 129)],
        },
        125,
    ));
    let string_ty = TypeExpr::Named(i.intern("String"));
    let loop_stmt = Stmt::ForEach(ForEachStmt {
        decl_ty: string_ty,
        name: i.intern("s"),
        iterable: var(i, "source", 106),
        body: Block {
            stmts: vec![sink_add],
            span: at(114),
        },
        span: at(90),
    });

    let ret = Stmt::Return(ReturnStmt {
        value: Some(expr(
            ExprKind::Field {
                receiver: Box::new(var(i, "sink", 147)),
                field: i.intern("length"),
            },
            152,
        )),
        span: at(140),
    });

    let program = Block {
        stmts: vec![decl_items, add_one, decl_source, decl_sink, loop_stmt, ret],
        span: at(0),
    };

    let analysis = analyze(&catalog, &interner, &program).unwrap();
    assert_eq!(analysis.root.stmts.len(), 6);

    // items.add("one") resolved statically, argument boxed into def
    let IrStmt::Expression(node) = &analysis.root.stmts[1] else {
        panic!("expected expression statement");
    };
    let IrExpr::Call(call) = &node.expr else {
        panic!("expected call");
    };
    assert!(matches!(call.method, MethodRef::Resolved(_)));
    assert!(matches!(
        call.args[0],
        IrExpr::Cast { cast, .. } if cast.kind == CastKind::BoxToDynamic
    ));

    // `def source = items` boxes the List value
    let IrStmt::Declaration(source_decl) = &analysis.root.stmts[2] else {
        panic!("expected declaration");
    };
    assert!(matches!(
        source_decl.init,
        Some(IrExpr::Cast { cast, .. }) if cast.kind == CastKind::BoxToDynamic
    ));

    // The loop's iterable is def, so the protocol method is deferred and
    // the loop variable unboxes each element with a runtime check
    let IrStmt::ForEachIterable(each) = &analysis.root.stmts[4] else {
        panic!("expected iterable-protocol loop, got {:?}", analysis.root.stmts[4]);
    };
    assert_eq!(each.method, MethodRef::Deferred);
    assert_eq!(each.cast.kind, CastKind::UnboxFromDynamic);
    assert!(each.cast.can_fail);
    assert!(!each.continuous);
    assert_eq!(each.body.stmts.len(), 1);

    // Inside the body, `sink` resolved through the loop frame to the outer
    // declaration, and `s` boxed back into the def parameter of add
    let IrStmt::Expression(body_stmt) = &each.body.stmts[0] else {
        panic!("expected expression statement in body");
    };
    let IrExpr::Call(body_call) = &body_stmt.expr else {
        panic!("expected call in body");
    };
    assert!(matches!(body_call.method, MethodRef::Resolved(_)));
    assert!(matches!(
        body_call.args[0],
        IrExpr::Cast { cast, .. } if cast.kind == CastKind::BoxToDynamic
    ));

    // return sink.length boxes the int on the way out
    let IrStmt::Return(ret_node) = &analysis.root.stmts[5] else {
        panic!("expected return");
    };
    assert!(matches!(
        ret_node.value,
        Some(IrExpr::Cast { cast, .. }) if cast.kind == CastKind::BoxToDynamic
    ));

    // The iterator handle was pinned in the loop's frame with its
    // offset-derived name
    let synthetic: Vec<_> = analysis
        .variables
        .iter()
        .filter_map(|v| v.name.synthetic())
        .collect();
    assert_eq!(synthetic, vec!["#itr90"]);
}

#[test]
fn analysis_requires_well_known_types() {
    // A catalog the host forgot to populate is a setup defect surfaced
    // before any analysis runs
    let catalog = TypeCatalog::new();
    let interner = Interner::new();
    let program = Block {
        stmts: vec![],
        span: at(0),
    };

    let err = analyze(&catalog, &interner, &program).unwrap_err();
    assert!(matches!(
        err,
        skink::errors::SemanticError::UnresolvedName { .. }
    ));
}
