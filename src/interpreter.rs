//! Tree-walking interpreter for the Slang AST.
//!
//! Evaluation is single-threaded, synchronous, and depth-first recursive:
//! the host call stack *is* the interpreter's call stack.  Storage is a
//! chain of mutable [`Environment`]s; variable references resolved by the
//! static pass hop a pre-computed number of frames instead of searching the
//! chain by name, and anything the resolver left unresolved falls back to
//! the global environment (late-bound globals, REPL declarations).
//!
//! `return` is not modeled as an error or exception.  Statement execution
//! yields a [`Flow`] value that every block/statement executor checks and
//! propagates, unwinding exactly to the nearest function-call boundary.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};

use crate::ast::{Expr, LiteralValue, Stmt};
use crate::environment::Environment;
use crate::error::{Result, SlangError};
use crate::token::{Token, TokenType};
use crate::value::{SlangClass, SlangFunction, SlangInstance, Value};

/// Outcome of executing one statement: either fall through to the next, or
/// unwind to the nearest enclosing function call carrying a value.
#[derive(Debug)]
pub enum Flow<'a> {
    Normal,
    Return(Value<'a>),
}

/// The native `clock()` function: seconds since the Unix epoch as an `f64`.
fn native_clock<'a>(_args: &[Value<'a>]) -> std::result::Result<Value<'a>, String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("Clock error: {}", e))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}

pub struct Interpreter<'a> {
    /// The global scope, targeted directly by unresolved references.
    globals: Rc<RefCell<Environment<'a>>>,

    /// The scope currently executing.
    environment: Rc<RefCell<Environment<'a>>>,

    /// Resolver output: expression node id → enclosing-frame distance.
    locals: HashMap<usize, usize>,

    /// Sink for `print`; stdout by default, a buffer under test.
    out: Box<dyn Write>,
}

impl<'a> Default for Interpreter<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter printing to stdout, with the `clock` native
    /// registered in the global environment.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Create an interpreter printing to an arbitrary sink.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("initializing interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock",
                arity: 0,
                func: native_clock,
            },
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    /// Record a resolver-computed scope distance for an expression node.
    /// Called by the resolver; nodes it never mentions are globals.
    pub fn resolve(&mut self, id: usize, depth: usize) {
        debug!("resolved node {} at depth {}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Execute a program top to bottom.  The first runtime fault aborts the
    /// remaining statements and is returned; earlier side effects stand.
    pub fn interpret(&mut self, statements: &[Stmt<'a>]) -> Result<()> {
        info!("interpreting {} statement(s)", statements.len());

        for stmt in statements {
            if let Flow::Return(_) = self.execute(stmt)? {
                // The resolver rejects top-level `return`; if resolution was
                // skipped, stop quietly rather than crash.
                break;
            }
        }

        Ok(())
    }

    // ───────────────────────── statements ─────────────────────────

    fn execute(&mut self, stmt: &Stmt<'a>) -> Result<Flow<'a>> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;

                writeln!(self.out, "{}", value)?;

                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("var '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(name.lexeme, value);

                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let inner = Environment::with_enclosing(Rc::clone(&self.environment));

                self.execute_block(statements, Rc::new(RefCell::new(inner)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Normal => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Function { name, params, body } => {
                // The closure captures the *current* environment by
                // reference; later mutations in this scope remain visible
                // inside the function.
                let function = SlangFunction {
                    name: name.lexeme.to_owned(),
                    params: params.clone(),
                    body: Rc::new(body.clone()),
                    closure: Rc::clone(&self.environment),
                };

                debug!("defined <fn {}>", name.lexeme);

                self.environment
                    .borrow_mut()
                    .define(name.lexeme, Value::Function(Rc::new(function)));

                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Ok(Flow::Return(value))
            }

            Stmt::Class { name, methods } => {
                // Bind the name to nil first so method bodies may refer to
                // the class before its value exists.
                self.environment.borrow_mut().define(name.lexeme, Value::Nil);

                let mut method_table: HashMap<String, Rc<SlangFunction<'a>>> = HashMap::new();

                for method in methods {
                    let Stmt::Function {
                        name: method_name,
                        params,
                        body,
                    } = method
                    else {
                        unreachable!("parser emits only Function nodes as class methods");
                    };

                    let function = SlangFunction {
                        name: method_name.lexeme.to_owned(),
                        params: params.clone(),
                        body: Rc::new(body.clone()),
                        closure: Rc::clone(&self.environment),
                    };

                    method_table.insert(method_name.lexeme.to_owned(), Rc::new(function));
                }

                let class = Value::Class(Rc::new(SlangClass {
                    name: name.lexeme.to_owned(),
                    methods: method_table,
                }));

                debug!("defined class {}", name.lexeme);

                self.environment.borrow_mut().assign(name, class)?;

                Ok(Flow::Normal)
            }
        }
    }

    /// Execute `statements` inside `environment`, restoring the previous
    /// environment on every exit path — normal completion, `return` unwind,
    /// or error.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt<'a>],
        environment: Rc<RefCell<Environment<'a>>>,
    ) -> Result<Flow<'a>> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut flow = Ok(Flow::Normal);

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    flow = other;
                    break;
                }
            }
        }

        self.environment = previous;

        flow
    }

    // ───────────────────────── expressions ────────────────────────

    pub fn evaluate(&mut self, expr: &Expr<'a>) -> Result<Value<'a>> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                // Short-circuit: the deciding operand value is the result,
                // not a coerced boolean.
                let left_value = self.evaluate(left)?;

                match operator.token_type {
                    TokenType::OR if left_value.is_truthy() => Ok(left_value),
                    TokenType::AND if !left_value.is_truthy() => Ok(left_value),
                    _ => self.evaluate(right),
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(name, *id),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?;
                    }
                    None => {
                        self.globals.borrow_mut().assign(name, value.clone())?;
                    }
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_value = self.evaluate(callee)?;

                let mut argument_values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    argument_values.push(self.evaluate(argument)?);
                }

                self.call_value(callee_value, paren, argument_values)
            }

            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => SlangInstance::get(&instance, name),
                    _ => Err(SlangError::runtime(name, "Only instances have properties.")),
                }
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;

                let Value::Instance(instance) = object else {
                    return Err(SlangError::runtime(name, "Only instances have fields."));
                };

                let value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(keyword, *id),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token<'a>, right: &Expr<'a>) -> Result<Value<'a>> {
        let right_value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right_value {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(SlangError::runtime(operator, "Operand must be a number.")),
            },

            TokenType::BANG => Ok(Value::Bool(!right_value.is_truthy())),

            _ => unreachable!("parser emits only '!' and '-' as unary operators"),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &Expr<'a>,
        operator: &Token<'a>,
        right: &Expr<'a>,
    ) -> Result<Value<'a>> {
        let left_value = self.evaluate(left)?;
        let right_value = self.evaluate(right)?;

        match operator.token_type {
            // `+` is overloaded: numeric addition or string concatenation,
            // never a mix and never coerced.
            TokenType::PLUS => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(SlangError::runtime(
                    operator,
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::MINUS => {
                let (a, b) = self.number_operands(operator, left_value, right_value)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = self.number_operands(operator, left_value, right_value)?;
                Ok(Value::Number(a * b))
            }

            TokenType::SLASH => {
                let (a, b) = self.number_operands(operator, left_value, right_value)?;

                if b == 0.0 {
                    return Err(SlangError::runtime(operator, "Cannot divide by zero."));
                }

                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => {
                let (a, b) = self.number_operands(operator, left_value, right_value)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = self.number_operands(operator, left_value, right_value)?;
                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = self.number_operands(operator, left_value, right_value)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = self.number_operands(operator, left_value, right_value)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_value.equals(&right_value))),
            TokenType::BANG_EQUAL => Ok(Value::Bool(!left_value.equals(&right_value))),

            _ => unreachable!("parser emits no other binary operators"),
        }
    }

    fn number_operands(
        &self,
        operator: &Token<'a>,
        left: Value<'a>,
        right: Value<'a>,
    ) -> Result<(f64, f64)> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok((a, b)),
            _ => Err(SlangError::runtime(operator, "Operands must be numbers.")),
        }
    }

    /// Distance-indexed lookup when the resolver recorded this node,
    /// otherwise straight to the globals.
    fn look_up_variable(&self, name: &Token<'a>, id: usize) -> Result<Value<'a>> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Dispatch a call: evaluate order is callee, then arguments (already
    /// done by the caller); arity is checked before any body runs.
    fn call_value(
        &mut self,
        callee: Value<'a>,
        paren: &Token<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        match callee {
            Value::NativeFunction { name, arity, func } => {
                self.check_arity(arity, arguments.len(), paren)?;

                debug!("calling <native fn {}>", name);

                func(&arguments).map_err(|msg| SlangError::runtime(paren, msg))
            }

            Value::Function(function) => {
                self.check_arity(function.arity(), arguments.len(), paren)?;

                function.call(self, arguments)
            }

            Value::Class(class) => {
                self.check_arity(class.arity(), arguments.len(), paren)?;

                Ok(SlangClass::instantiate(&class))
            }

            _ => Err(SlangError::runtime(
                paren,
                "Can only call functions and classes.",
            )),
        }
    }

    fn check_arity(&self, expected: usize, got: usize, paren: &Token<'a>) -> Result<()> {
        if expected != got {
            return Err(SlangError::runtime(
                paren,
                format!("Expected {} arguments but got {}.", expected, got),
            ));
        }

        Ok(())
    }
}
