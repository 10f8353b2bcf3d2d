//! Node kind vocabulary.
//!
//! The set of kinds is closed: it is the grammar's node-kind set, and a
//! parser never produces a kind outside of it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Broad syntactic category of a node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindCategory {
    /// Top-level program containers
    Module,
    /// Statements
    Statement,
    /// Expressions
    Expression,
    /// Load/store/delete markers
    Context,
    /// Boolean, binary, unary and comparison operators
    Operator,
    /// Structural pattern matching patterns
    Pattern,
    /// Helper nodes (arguments, keywords, aliases, handlers...)
    Auxiliary,
}

impl KindCategory {
    /// Get a human-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            KindCategory::Module => "module",
            KindCategory::Statement => "statement",
            KindCategory::Expression => "expression",
            KindCategory::Context => "context",
            KindCategory::Operator => "operator",
            KindCategory::Pattern => "pattern",
            KindCategory::Auxiliary => "auxiliary",
        }
    }
}

macro_rules! node_kinds {
    ($($variant:ident = $name:literal => $category:ident),* $(,)?) => {
        /// One syntactic construct of the script grammar
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum NodeKind {
            $(
                #[doc = concat!("`", $name, "` node")]
                $variant,
            )*
        }

        impl NodeKind {
            /// Every kind the grammar can produce
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$variant),*];

            /// Canonical grammar name, used as the document and schema key
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(NodeKind::$variant => $name,)*
                }
            }

            /// Syntactic category of this kind
            pub fn category(&self) -> KindCategory {
                match self {
                    $(NodeKind::$variant => KindCategory::$category,)*
                }
            }
        }

        impl FromStr for NodeKind {
            type Err = UnknownNodeKind;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(NodeKind::$variant),)*
                    _ => Err(UnknownNodeKind(s.to_string())),
                }
            }
        }
    };
}

node_kinds! {
    // Containers
    Module = "Module" => Module,
    Interactive = "Interactive" => Module,
    Expression = "Expression" => Module,
    FunctionType = "FunctionType" => Module,
    Suite = "Suite" => Module,

    // Statements
    FunctionDef = "FunctionDef" => Statement,
    AsyncFunctionDef = "AsyncFunctionDef" => Statement,
    ClassDef = "ClassDef" => Statement,
    Return = "Return" => Statement,
    Delete = "Delete" => Statement,
    Assign = "Assign" => Statement,
    AugAssign = "AugAssign" => Statement,
    AnnAssign = "AnnAssign" => Statement,
    For = "For" => Statement,
    AsyncFor = "AsyncFor" => Statement,
    While = "While" => Statement,
    If = "If" => Statement,
    With = "With" => Statement,
    AsyncWith = "AsyncWith" => Statement,
    Match = "Match" => Statement,
    Raise = "Raise" => Statement,
    Try = "Try" => Statement,
    TryStar = "TryStar" => Statement,
    Assert = "Assert" => Statement,
    Import = "Import" => Statement,
    ImportFrom = "ImportFrom" => Statement,
    Global = "Global" => Statement,
    Nonlocal = "Nonlocal" => Statement,
    Expr = "Expr" => Statement,
    Pass = "Pass" => Statement,
    Break = "Break" => Statement,
    Continue = "Continue" => Statement,
    TypeAlias = "TypeAlias" => Statement,

    // Expressions
    BoolOp = "BoolOp" => Expression,
    NamedExpr = "NamedExpr" => Expression,
    BinOp = "BinOp" => Expression,
    UnaryOp = "UnaryOp" => Expression,
    Lambda = "Lambda" => Expression,
    IfExp = "IfExp" => Expression,
    Dict = "Dict" => Expression,
    Set = "Set" => Expression,
    ListComp = "ListComp" => Expression,
    SetComp = "SetComp" => Expression,
    DictComp = "DictComp" => Expression,
    GeneratorExp = "GeneratorExp" => Expression,
    Await = "Await" => Expression,
    Yield = "Yield" => Expression,
    YieldFrom = "YieldFrom" => Expression,
    Compare = "Compare" => Expression,
    Call = "Call" => Expression,
    FormattedValue = "FormattedValue" => Expression,
    JoinedStr = "JoinedStr" => Expression,
    Constant = "Constant" => Expression,
    Num = "Num" => Expression,
    Str = "Str" => Expression,
    Bytes = "Bytes" => Expression,
    NameConstant = "NameConstant" => Expression,
    Ellipsis = "Ellipsis" => Expression,
    Attribute = "Attribute" => Expression,
    Subscript = "Subscript" => Expression,
    Starred = "Starred" => Expression,
    Name = "Name" => Expression,
    List = "List" => Expression,
    Tuple = "Tuple" => Expression,
    Slice = "Slice" => Expression,

    // Expression contexts
    Load = "Load" => Context,
    Store = "Store" => Context,
    Del = "Del" => Context,
    AugLoad = "AugLoad" => Context,
    AugStore = "AugStore" => Context,
    Param = "Param" => Context,

    // Boolean operators
    And = "And" => Operator,
    Or = "Or" => Operator,

    // Binary operators
    Add = "Add" => Operator,
    Sub = "Sub" => Operator,
    Mult = "Mult" => Operator,
    MatMult = "MatMult" => Operator,
    Div = "Div" => Operator,
    Mod = "Mod" => Operator,
    Pow = "Pow" => Operator,
    LShift = "LShift" => Operator,
    RShift = "RShift" => Operator,
    BitOr = "BitOr" => Operator,
    BitXor = "BitXor" => Operator,
    BitAnd = "BitAnd" => Operator,
    FloorDiv = "FloorDiv" => Operator,

    // Unary operators
    Invert = "Invert" => Operator,
    Not = "Not" => Operator,
    UAdd = "UAdd" => Operator,
    USub = "USub" => Operator,

    // Comparison operators
    Eq = "Eq" => Operator,
    NotEq = "NotEq" => Operator,
    Lt = "Lt" => Operator,
    LtE = "LtE" => Operator,
    Gt = "Gt" => Operator,
    GtE = "GtE" => Operator,
    Is = "Is" => Operator,
    IsNot = "IsNot" => Operator,
    In = "In" => Operator,
    NotIn = "NotIn" => Operator,

    // Patterns
    MatchValue = "MatchValue" => Pattern,
    MatchSingleton = "MatchSingleton" => Pattern,
    MatchSequence = "MatchSequence" => Pattern,
    MatchMapping = "MatchMapping" => Pattern,
    MatchClass = "MatchClass" => Pattern,
    MatchStar = "MatchStar" => Pattern,
    MatchAs = "MatchAs" => Pattern,
    MatchOr = "MatchOr" => Pattern,

    // Type parameters
    TypeVar = "TypeVar" => Auxiliary,
    ParamSpec = "ParamSpec" => Auxiliary,
    TypeVarTuple = "TypeVarTuple" => Auxiliary,

    // Helpers
    Index = "Index" => Auxiliary,
    ExtSlice = "ExtSlice" => Auxiliary,
    Comprehension = "comprehension" => Auxiliary,
    ExceptHandler = "ExceptHandler" => Auxiliary,
    Arguments = "arguments" => Auxiliary,
    Arg = "arg" => Auxiliary,
    Keyword = "keyword" => Auxiliary,
    Alias = "alias" => Auxiliary,
    WithItem = "withitem" => Auxiliary,
    MatchCase = "match_case" => Auxiliary,
    TypeIgnore = "TypeIgnore" => Auxiliary,
}

impl NodeKind {
    /// Whether this kind is a field-less marker (expression context or operator).
    ///
    /// Parsers commonly hand out one shared instance per marker kind, so
    /// markers may be reachable from many parents.
    pub fn is_marker(&self) -> bool {
        matches!(
            self.category(),
            KindCategory::Context | KindCategory::Operator
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// A name that is not part of the node kind vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown node kind: {0}")]
pub struct UnknownNodeKind(pub String);
