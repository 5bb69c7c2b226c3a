//! Shared expression/statement AST for the Slang interpreter.
//!
//! Both node sets are closed sum types matched exhaustively by every
//! downstream pass (resolver, interpreter, printer); adding a pass never
//! touches these definitions.  Lifetime `'a` ties nodes that reference
//! tokens back to the borrowed token buffer held by the driver.
//!
//! Every `Variable`, `Assign`, and `This` node carries an explicit `id`
//! assigned by the parser at construction time.  The resolver keys its
//! scope-distance map by that id, so binding resolution never depends on
//! node addresses.

use crate::token::Token;

/// A literal constant that appears directly in the source code.
///
/// These variants are the terminal leaves of the expression tree and do not
/// retain a reference to the originating [`Token`]; the parser copies the
/// value out at parse time so literals carry no lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal, stored as IEEE-754 `f64`.  Integral lexemes such as
    /// `"3"` are still parsed as `3.0`.
    Number(f64),

    /// String literal without the surrounding quotes.
    Str(String),

    True,
    False,

    /// The `nil` literal.
    Nil,
}

/// AST node for every kind of *expression*.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub-expression: `"(" expression ")"`.
    Grouping(Box<Expr<'a>>),

    /// Prefix unary operator expression, e.g. `!ready` or `-42`.
    Unary {
        /// The operator token (`!` or `-`).
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Infix binary operator expression, e.g. `a + b`, `x <= y`.
    Binary {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Short-circuiting `and` / `or`.
    Logical {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Variable read.
    Variable {
        /// Unique node id, the key of the resolver's distance map.
        id: usize,
        name: &'a Token<'a>,
    },

    /// Assignment expression: `identifier "=" expression`.
    Assign {
        id: usize,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// Function, method, or class call.
    Call {
        callee: Box<Expr<'a>>,
        /// The closing `)` token, retained for error reporting.
        paren: &'a Token<'a>,
        arguments: Vec<Expr<'a>>,
    },

    /// Property read: `object.name`.
    Get {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
    },

    /// Property write: `object.name = value`.
    Set {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// The `this` keyword inside a method body.
    This {
        id: usize,
        keyword: &'a Token<'a>,
    },
}

/// AST node for *statements*.  A program is the `Vec<Stmt>` returned by the
/// parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    /// Stand-alone expression terminated by a semicolon.
    Expression(Expr<'a>),

    /// `print` statement.
    Print(Expr<'a>),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: &'a Token<'a>,
        initializer: Option<Expr<'a>>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt<'a>>),

    /// `if` / `else` conditional.
    If {
        condition: Expr<'a>,
        then_branch: Box<Stmt<'a>>,
        else_branch: Option<Box<Stmt<'a>>>,
    },

    /// `while` loop.  `for` loops desugar to this in the parser.
    While {
        condition: Expr<'a>,
        body: Box<Stmt<'a>>,
    },

    /// Function declaration; becomes a first-class callable value.
    Function {
        name: &'a Token<'a>,

        /// Parameter name tokens (arity ≤ 255).
        params: Vec<&'a Token<'a>>,

        body: Vec<Stmt<'a>>,
    },

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token, for error locations.
        keyword: &'a Token<'a>,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr<'a>>,
    },

    /// Class declaration.  Methods reuse the `Function` variant.
    Class {
        name: &'a Token<'a>,
        methods: Vec<Stmt<'a>>,
    },
}
