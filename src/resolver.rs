//! Static scope resolution pass.
//!
//! One walk over the AST does three jobs:
//! 1. Build lexical scopes (a stack of `HashMap<&str, bool>` tracking
//!    declared/defined names), pushed on block/function/class entry and
//!    popped on exit.  The stack exists only during this pass.
//! 2. Report static errors — duplicate declaration in a scope, reading a
//!    variable inside its own initializer, `return` outside a function,
//!    `this` outside a class.  Errors go to the diagnostics accumulator and
//!    resolution continues over the rest of the tree.
//! 3. Record, for every variable occurrence found in some scope, how many
//!    frames separate the use from the declaration, by calling back into
//!    [`Interpreter::resolve`] keyed by the node's id.  Occurrences found in
//!    no scope are left unrecorded: the interpreter treats them as globals.
//!
//! The pass never mutates the AST and never evaluates anything.

use std::collections::HashMap;

use log::{debug, info};

use crate::ast::{Expr, Stmt};
use crate::error::{Diagnostics, SlangError};
use crate::interpreter::Interpreter;
use crate::token::Token;

/// Are we inside a user function?  Validates `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
}

/// Are we inside a class body?  Validates `this`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
}

pub struct Resolver<'a, 'interp> {
    interpreter: &'interp mut Interpreter<'a>,
    scopes: Vec<HashMap<&'a str, bool>>, // false = declared, true = defined
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'a, 'interp> Resolver<'a, 'interp> {
    pub fn new(interpreter: &'interp mut Interpreter<'a>) -> Self {
        info!("resolver instantiated");

        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    /// Walk all top-level statements, pushing distances into the interpreter
    /// and static errors into `diags`.
    pub fn resolve(&mut self, statements: &[Stmt<'a>], diags: &mut Diagnostics) {
        info!("beginning resolve pass over {} statement(s)", statements.len());

        for stmt in statements {
            self.resolve_stmt(stmt, diags);
        }
    }

    // ───────────────────────── statements ─────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt<'a>, diags: &mut Diagnostics) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                for s in statements {
                    self.resolve_stmt(s, diags);
                }
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define, so a read of the
                // name inside its own initializer is caught below.
                self.declare(name, diags);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr, diags);
                }
                self.define(name);
            }

            Stmt::Function { name, params, body } => {
                // The name is visible inside its own body (recursion).
                self.declare(name, diags);
                self.define(name);
                self.resolve_function(params, body, FunctionType::Function, diags);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr, diags);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition, diags);
                self.resolve_stmt(then_branch, diags);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb, diags);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition, diags);
                self.resolve_stmt(body, diags);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    diags.report(SlangError::resolve(
                        keyword,
                        "Cannot return from top-level code.",
                    ));
                }
                if let Some(expr) = value {
                    self.resolve_expr(expr, diags);
                }
            }

            Stmt::Class { name, methods } => {
                let enclosing_class = self.current_class;
                self.current_class = ClassType::Class;

                self.declare(name, diags);
                self.define(name);

                // One extra scope binds `this` for every method body.
                self.begin_scope();
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert("this", true);
                }

                for method in methods {
                    let Stmt::Function { params, body, .. } = method else {
                        unreachable!("parser emits only Function nodes as class methods");
                    };

                    self.resolve_function(params, body, FunctionType::Method, diags);
                }

                self.end_scope();

                self.current_class = enclosing_class;
            }
        }
    }

    // ───────────────────────── expressions ────────────────────────

    fn resolve_expr(&mut self, expr: &Expr<'a>, diags: &mut Diagnostics) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => {
                self.resolve_expr(inner, diags);
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(right, diags);
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left, diags);
                self.resolve_expr(right, diags);
            }

            Expr::Variable { id, name } => {
                // Declared but not yet defined in the innermost scope means
                // the initializer is reading the name it initializes.
                if let Some(scope) = self.scopes.last() {
                    if scope.get(name.lexeme) == Some(&false) {
                        diags.report(SlangError::resolve(
                            name,
                            "Cannot read local variable in its own initializer.",
                        ));
                    }
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                // RHS first, then bind the target.
                self.resolve_expr(value, diags);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee, diags);
                for argument in arguments {
                    self.resolve_expr(argument, diags);
                }
            }

            // Property names are looked up dynamically at runtime; only the
            // object expression resolves statically.
            Expr::Get { object, .. } => self.resolve_expr(object, diags),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(object, diags);
                self.resolve_expr(value, diags);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    diags.report(SlangError::resolve(
                        keyword,
                        "Cannot use 'this' outside of a class.",
                    ));
                    return;
                }

                self.resolve_local(*id, keyword);
            }
        }
    }

    // ───────────────────────── helpers ─────────────────────────

    /// Fresh scope for a function's parameters, nested statements inside it.
    fn resolve_function(
        &mut self,
        params: &[&'a Token<'a>],
        body: &[Stmt<'a>],
        function_type: FunctionType,
        diags: &mut Diagnostics,
    ) {
        let enclosing = self.current_function;
        self.current_function = function_type;

        self.begin_scope();
        for param in params {
            self.declare(param, diags);
            self.define(param);
        }
        for stmt in body {
            self.resolve_stmt(stmt, diags);
        }
        self.end_scope();

        self.current_function = enclosing;
    }

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Mark a name present-but-unusable in the current scope.  Redeclaring a
    /// name in the *same* scope is an error; shadowing across scopes is not.
    fn declare(&mut self, name: &Token<'a>, diags: &mut Diagnostics) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name.lexeme) {
                diags.report(SlangError::resolve(
                    name,
                    "Already a variable with this name in this scope.",
                ));
                return;
            }

            scope.insert(name.lexeme, false);
        }
    }

    fn define(&mut self, name: &Token<'a>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme, true);
        }
    }

    /// Record this occurrence as a local at the innermost matching depth, or
    /// leave it unrecorded (global fallback) when no scope matches.
    fn resolve_local(&mut self, id: usize, name: &Token<'a>) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name.lexeme) {
                debug!("'{}' resolved at depth {}", name.lexeme, depth);

                self.interpreter.resolve(id, depth);
                return;
            }
        }

        debug!("'{}' resolved as global", name.lexeme);
    }
}
