//! Default call-target lists and kind sets for the built-in profiles.

use crate::tree::NodeKind;

/// Prefix reserved for interpreter internals (`__class__`, `_module`...)
pub const RESERVED_PREFIX: &str = "_";

/// Kinds that pull in external modules
pub const IMPORT_KINDS: &[NodeKind] = &[NodeKind::Import, NodeKind::ImportFrom];

/// Kinds whose `name` field defines a callable routine
pub const DEFINITION_KINDS: &[NodeKind] = &[NodeKind::FunctionDef, NodeKind::AsyncFunctionDef];

/// Built-in routines a restricted script may call by name
pub const SAFE_CALL_TARGETS: &[&str] = &[
    // Numbers
    "abs",
    "bin",
    "complex",
    "divmod",
    "float",
    "hex",
    "int",
    "oct",
    "pow",
    "round",
    // Text
    "ascii",
    "chr",
    "format",
    "ord",
    "repr",
    "str",
    // Containers
    "bytearray",
    "bytes",
    "dict",
    "frozenset",
    "list",
    "range",
    "set",
    "slice",
    "tuple",
    // Iteration
    "all",
    "any",
    "enumerate",
    "filter",
    "iter",
    "len",
    "map",
    "max",
    "min",
    "next",
    "reversed",
    "sorted",
    "sum",
    "zip",
    // Types and classes
    "bool",
    "callable",
    "classmethod",
    "hasattr",
    "hash",
    "id",
    "isinstance",
    "issubclass",
    "object",
    "property",
    "staticmethod",
    "super",
    "type",
];

/// Built-in routines that reach introspection, evaluation or I/O
pub const DANGEROUS_CALL_TARGETS: &[&str] = &[
    // Evaluation
    "compile",
    "eval",
    "exec",
    "__import__",
    // Introspection
    "delattr",
    "dir",
    "getattr",
    "globals",
    "locals",
    "setattr",
    "vars",
    "memoryview",
    // Interaction and I/O
    "help",
    "input",
    "open",
    "print",
];
