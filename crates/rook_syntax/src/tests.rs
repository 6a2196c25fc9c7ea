//! Syntax tree and builder tests.

use pretty_assertions::assert_eq;

use crate::build::file;
use crate::common::*;
use crate::item::DeclNode;

#[test]
fn test_type_ref_parses_path_and_dimension() {
    let syntax = file("a.rk", |top| {
        top.variable(Visibility::Public, "geo.shapes.Point[][]", "grid");
    });
    let DeclNode::Variable(var) = &syntax.root.declarations[0] else {
        panic!("expected variable");
    };
    assert_eq!(var.ty.dotted(), "geo.shapes.Point");
    assert_eq!(var.ty.dimension, 2);
    assert_eq!(var.ty.to_string(), "geo.shapes.Point[][]");
    assert_eq!(var.ty.name().map(|i| i.name.as_str()), Some("Point"));
}

#[test]
fn test_builder_gives_each_name_its_own_line() {
    let syntax = file("a.rk", |top| {
        top.function(Visibility::None, "foo", &[], &["integer"]);
        top.function(Visibility::None, "bar", &[], &["integer"]);
    });
    let first = syntax.root.declarations[0].name().range;
    let second = syntax.root.declarations[1].name().range;
    assert!(first.start.line < second.start.line);
    assert_ne!(first, second);
}

#[test]
fn test_nested_namespaces_and_imports() {
    let syntax = file("a.rk", |top| {
        top.namespace("outer", |outer| {
            outer.import("collections.list");
            outer.namespace("inner", |inner| {
                inner.enumeration(Visibility::Public, "Color", &["Red", "Green"]);
            });
        });
    });
    let outer = &syntax.root.children[0];
    assert_eq!(outer.name.as_ref().map(|n| n.name.as_str()), Some("outer"));
    assert_eq!(outer.imports[0].path.len(), 2);
    let inner = &outer.children[0];
    assert_eq!(inner.declarations[0].name().name, "Color");
}

#[test]
fn test_class_members_and_constructor_name() {
    let syntax = file("a.rk", |top| {
        top.class(Visibility::Public, "Dog", &["Animal", "Pet"], |m| {
            m.variable(Visibility::Public, "string", "name");
            m.constructor(Visibility::Public, &["string"]);
            m.function(Visibility::Public, "Speak", &[], &["string"]);
        });
    });
    let DeclNode::Class(class) = &syntax.root.declarations[0] else {
        panic!("expected class");
    };
    assert_eq!(class.inherits.len(), 2);
    assert_eq!(class.constructors[0].name.name, "Dog");
    assert_eq!(class.functions[0].returns[0].dotted(), "string");
}

#[test]
fn test_range_contains_and_within() {
    let outer = Range::new(Position::new(1, 0), Position::new(5, 0));
    let inner = Range::on_line(2, 4, 3);
    assert!(inner.within(&outer));
    assert!(inner.contains(Position::new(2, 7)));
    assert!(!inner.contains(Position::new(2, 8)));
    assert!(inner.extent() < outer.extent());
}

#[test]
fn test_inverted_range_has_zero_extent() {
    let backwards = Range::new(Position::new(4, 9), Position::new(2, 1));
    assert_eq!(backwards.extent(), (0, 0));
    let same_line = Range::new(Position::new(3, 9), Position::new(3, 2));
    assert_eq!(same_line.extent(), (0, 0));
}

#[test]
fn test_visibility_keywords() {
    assert_eq!(Visibility::from_keyword("space"), Some(Visibility::Space));
    assert_eq!(Visibility::from_keyword("private"), Some(Visibility::None));
    assert_eq!(Visibility::from_keyword("static"), None);
    assert_eq!(Visibility::Protected.keyword(), "protected");
}
