//! Hand-built syntax trees shared by the scenario tests.

#![allow(dead_code)]

use scriptgate::prelude::*;

pub fn module(body: Vec<Node>) -> NodeRef {
    Node::new(NodeKind::Module)
        .with_field("body", body)
        .with_field("type_ignores", Vec::<Node>::new())
        .into_ref()
}

pub fn name(id: &str) -> Node {
    Node::new(NodeKind::Name)
        .with_field("id", id)
        .with_field("ctx", Node::new(NodeKind::Load))
}

pub fn store(id: &str) -> Node {
    Node::new(NodeKind::Name)
        .with_field("id", id)
        .with_field("ctx", Node::new(NodeKind::Store))
}

pub fn constant(value: i64) -> Node {
    Node::new(NodeKind::Constant)
        .with_field("value", value)
        .with_field("kind", None::<String>)
}

/// `target = value`
pub fn assign(target: &str, value: Node) -> Node {
    Node::new(NodeKind::Assign)
        .with_field("targets", vec![store(target)])
        .with_field("value", value)
        .with_field("type_comment", None::<String>)
}

/// `func(args...)`
pub fn call(func: &str, args: Vec<Node>) -> Node {
    call_expr(name(func), args)
}

pub fn call_expr(func: Node, args: Vec<Node>) -> Node {
    Node::new(NodeKind::Call)
        .with_field("func", func)
        .with_field("args", args)
        .with_field("keywords", Vec::<Node>::new())
}

/// Expression statement
pub fn expr(value: Node) -> Node {
    Node::new(NodeKind::Expr).with_field("value", value)
}

/// `value.attr`
pub fn attribute(value: Node, attr: &str) -> Node {
    Node::new(NodeKind::Attribute)
        .with_field("value", value)
        .with_field("attr", attr)
        .with_field("ctx", Node::new(NodeKind::Load))
}

/// `import module_name`
pub fn import(module_name: &str) -> Node {
    Node::new(NodeKind::Import).with_field(
        "names",
        vec![
            Node::new(NodeKind::Alias)
                .with_field("name", module_name)
                .with_field("asname", None::<String>),
        ],
    )
}

/// `def name(): body`
pub fn function_def(name: &str, body: Vec<Node>) -> Node {
    let arguments = Node::new(NodeKind::Arguments)
        .with_field("posonlyargs", Vec::<Node>::new())
        .with_field("args", Vec::<Node>::new())
        .with_field("vararg", None::<Node>)
        .with_field("kwonlyargs", Vec::<Node>::new())
        .with_field("kw_defaults", Vec::<Node>::new())
        .with_field("kwarg", None::<Node>)
        .with_field("defaults", Vec::<Node>::new());
    Node::new(NodeKind::FunctionDef)
        .with_field("name", name)
        .with_field("args", arguments)
        .with_field("body", body)
        .with_field("decorator_list", Vec::<Node>::new())
        .with_field("returns", None::<Node>)
}

/// `return value`
pub fn return_value(value: Node) -> Node {
    Node::new(NodeKind::Return).with_field("value", value)
}

/// `lambda: body`
pub fn lambda(body: Node) -> Node {
    Node::new(NodeKind::Lambda).with_field("body", body)
}
