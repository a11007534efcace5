//! # Symbolic Engine Module
//!
//! Core expression tree used everywhere in the sandbox: the decomposer splits it into
//! draggable tokens, the reconstructor sums token contributions back into it, and the
//! solver, differentiator and integrator consume it.
//!
//! ## Main Structures
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic variables like "x"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `tanh` and their inverses
//!
//! ### `Equation`
//! A pair `lhs = rhs`. The sandbox always produces equations of the form `expr = 0`.
//!
//! ## Printing
//!
//! `Display` produces conventional infix notation with the minimum number of brackets:
//! `2*x - 2`, `x/2`, `3*cos(x) + exp(x)`. Integral constants are printed without a
//! decimal point and simple fractions are printed as `n/d`, so the history log reads
//! like the output of a computer algebra system rather than a debug dump.
//!
//! Function names follow the mathematical notation used across the crate (`tg`, `arctg`).

#![allow(non_camel_case_types)]

use std::collections::BTreeSet;
use std::fmt;

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use RustedDragSolve::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// assert_eq!(expr.to_string(), "x + 2");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "y")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
    /// Tangent function: tan(x) - uses mathematical notation 'tg'
    tg(Box<Expr>),
    /// Hyperbolic tangent: tanh(x)
    tanh(Box<Expr>),
    /// Arcsine function: arcsin(x)
    arcsin(Box<Expr>),
    /// Arccosine function: arccos(x)
    arccos(Box<Expr>),
    /// Arctangent function: arctan(x) - uses mathematical notation 'arctg'
    arctg(Box<Expr>),
    /// Inverse hyperbolic tangent: arctanh(x)
    arctanh(Box<Expr>),
}

/// An equation `lhs = rhs`.
#[derive(Clone, Debug, PartialEq)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

impl Equation {
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Equation { lhs, rhs }
    }

    /// `expr = 0`
    pub fn equals_zero(expr: Expr) -> Self {
        Equation {
            lhs: expr,
            rhs: Expr::Const(0.0),
        }
    }

    /// Moves everything to the left: `lhs - rhs`, simplified.
    pub fn residual(&self) -> Expr {
        if self.rhs.is_zero() {
            self.lhs.simplify()
        } else {
            (self.lhs.clone() - self.rhs.clone()).simplify()
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// Display implementation for pretty printing symbolic expressions.
///
/// Brackets are only emitted where operator precedence requires them; a sum whose
/// right operand carries a negative sign is printed as a subtraction.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", format_number(*val)),
            Expr::Add(lhs, rhs) => match rhs.negated_form() {
                Some(positive) => {
                    write!(f, "{} - {}", lhs, Bracketed(&positive, positive.precedence() <= 1))
                }
                None => write!(f, "{} + {}", lhs, rhs),
            },
            Expr::Sub(lhs, rhs) => match rhs.negated_form() {
                Some(positive) => write!(f, "{} + {}", lhs, positive),
                None => write!(f, "{} - {}", lhs, Bracketed(rhs, rhs.precedence() <= 1)),
            },
            Expr::Mul(lhs, rhs) => fmt_product(f, lhs, rhs),
            Expr::Div(lhs, rhs) => write!(
                f,
                "{}/{}",
                Bracketed(lhs, lhs.precedence() < 2),
                Bracketed(rhs, rhs.precedence() <= 2)
            ),
            Expr::Pow(base, exp) => match self.reciprocal_denominator() {
                Some(den) => write!(f, "1/{}", Bracketed(&den, den.precedence() <= 2)),
                None => write!(
                    f,
                    "{}^{}",
                    Bracketed(base, base.precedence() <= 3),
                    Bracketed(exp, exp.precedence() <= 3)
                ),
            },
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
            Expr::tanh(expr) => write!(f, "tanh({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctg({})", expr),
            Expr::arctanh(expr) => write!(f, "arctanh({})", expr),
        }
    }
}

fn fmt_product(f: &mut fmt::Formatter, lhs: &Expr, rhs: &Expr) -> fmt::Result {
    if let Expr::Const(c) = lhs {
        let wrap_rhs = rhs.precedence() <= 1 || rhs.negated_form().is_some();
        if *c == -1.0 {
            return write!(f, "-{}", Bracketed(rhs, wrap_rhs));
        }
        if let Some(den) = rhs.reciprocal_denominator() {
            if c.fract() == 0.0 {
                let wrap_den = den.precedence() <= 2;
                return write!(f, "{}/{}", format_number(*c), Bracketed(&den, wrap_den));
            }
        }
        // 0.5*x reads better as x/2
        if let Some((num, den)) = rational_approx(*c) {
            if den != 1 {
                let rhs = Bracketed(rhs, wrap_rhs);
                return match num {
                    1 => write!(f, "{}/{}", rhs, den),
                    -1 => write!(f, "-{}/{}", rhs, den),
                    _ => write!(f, "{}*{}/{}", num, rhs, den),
                };
            }
        }
    }
    write!(
        f,
        "{}*{}",
        Bracketed(lhs, lhs.precedence() < 2),
        Bracketed(rhs, rhs.precedence() < 2 || rhs.negated_form().is_some())
    )
}

/// Helper that prints an expression, optionally wrapped in round brackets
struct Bracketed<'a>(&'a Expr, bool);

impl fmt::Display for Bracketed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.1 {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Renders a number the way a CAS would: `2` instead of `2.0`, `1/2` instead of `0.5`.
pub fn format_number(val: f64) -> String {
    if !val.is_finite() {
        return val.to_string();
    }
    if val == val.trunc() && val.abs() < 1e15 {
        // -0.0 prints as 0
        return format!("{}", val as i64);
    }
    if let Some((num, den)) = rational_approx(val) {
        return format!("{}/{}", num, den);
    }
    let fixed = format!("{:.10}", val);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Finds `num/den` with a small denominator (up to 12) that matches `val`.
pub fn rational_approx(val: f64) -> Option<(i64, i64)> {
    if !val.is_finite() {
        return None;
    }
    (1..=12i64).find_map(|den| {
        let num = val * den as f64;
        if (num - num.round()).abs() < 1e-9 && num.abs() < 1e12 {
            Some((num.round() as i64, den))
        } else {
            None
        }
    })
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::AddAssign for Expr {
    fn add_assign(&mut self, rhs: Self) {
        let lhs = std::mem::replace(self, Expr::Const(0.0));
        *self = lhs + rhs;
    }
}

impl std::ops::SubAssign for Expr {
    fn sub_assign(&mut self, rhs: Self) {
        let lhs = std::mem::replace(self, Expr::Const(0.0));
        *self = lhs - rhs;
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Checks if expression is exactly zero (constant 0.0).
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    pub fn as_const(&self) -> Option<f64> {
        match self {
            Expr::Const(val) => Some(*val),
            _ => None,
        }
    }

    /// Operator precedence used by the printer: 1 sums, 2 products, 3 powers, 4 atoms.
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Pow(..) if self.reciprocal_denominator().is_some() => 2,
            Expr::Pow(..) => 3,
            Expr::Const(c) if *c < 0.0 => 2,
            Expr::Const(c) if rational_approx(*c).is_some_and(|(_, den)| den != 1) => 2,
            _ => 4,
        }
    }

    /// If the expression prints with a leading minus sign, returns its positive counterpart.
    pub(crate) fn negated_form(&self) -> Option<Expr> {
        match self {
            Expr::Const(c) if *c < 0.0 => Some(Expr::Const(-c)),
            Expr::Mul(lhs, rhs) => match lhs.as_ref() {
                Expr::Const(c) if *c == -1.0 => Some(rhs.as_ref().clone()),
                Expr::Const(c) if *c < 0.0 => {
                    Some(Expr::Mul(Box::new(Expr::Const(-c)), rhs.clone()))
                }
                _ => None,
            },
            Expr::Div(lhs, rhs) => lhs
                .negated_form()
                .map(|positive| Expr::Div(Box::new(positive), rhs.clone())),
            _ => None,
        }
    }

    /// `d` for `1/d` and for `d^-n` (as `d^n`), `None` otherwise.
    pub(crate) fn reciprocal_denominator(&self) -> Option<Expr> {
        match self {
            Expr::Div(num, den) if num.as_const() == Some(1.0) => Some(den.as_ref().clone()),
            Expr::Pow(base, exp) => match exp.as_const() {
                Some(e) if e == -1.0 => Some(base.as_ref().clone()),
                Some(e) if e < 0.0 => Some(Expr::Pow(base.clone(), Box::new(Expr::Const(-e)))),
                _ => None,
            },
            _ => None,
        }
    }

    /// Name and argument of a unary function node, `None` for everything else.
    pub fn function_parts(&self) -> Option<(&'static str, &Expr)> {
        match self {
            Expr::Exp(arg) => Some(("exp", arg)),
            Expr::Ln(arg) => Some(("ln", arg)),
            Expr::sin(arg) => Some(("sin", arg)),
            Expr::cos(arg) => Some(("cos", arg)),
            Expr::tg(arg) => Some(("tg", arg)),
            Expr::tanh(arg) => Some(("tanh", arg)),
            Expr::arcsin(arg) => Some(("arcsin", arg)),
            Expr::arccos(arg) => Some(("arccos", arg)),
            Expr::arctg(arg) => Some(("arctg", arg)),
            Expr::arctanh(arg) => Some(("arctanh", arg)),
            _ => None,
        }
    }

    /// Builds the same unary function around a new argument.
    /// Non-function nodes are returned unchanged.
    pub fn with_argument(&self, arg: Expr) -> Expr {
        let arg = Box::new(arg);
        match self {
            Expr::Exp(_) => Expr::Exp(arg),
            Expr::Ln(_) => Expr::Ln(arg),
            Expr::sin(_) => Expr::sin(arg),
            Expr::cos(_) => Expr::cos(arg),
            Expr::tg(_) => Expr::tg(arg),
            Expr::tanh(_) => Expr::tanh(arg),
            Expr::arcsin(_) => Expr::arcsin(arg),
            Expr::arccos(_) => Expr::arccos(arg),
            Expr::arctg(_) => Expr::arctg(arg),
            Expr::arctanh(_) => Expr::arctanh(arg),
            _ => self.clone(),
        }
    }

    /// Substitutes a variable with an expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(
                Box::new(lhs.substitute_variable(var, expr)),
                Box::new(rhs.substitute_variable(var, expr)),
            ),
            Expr::Sub(lhs, rhs) => Expr::Sub(
                Box::new(lhs.substitute_variable(var, expr)),
                Box::new(rhs.substitute_variable(var, expr)),
            ),
            Expr::Mul(lhs, rhs) => Expr::Mul(
                Box::new(lhs.substitute_variable(var, expr)),
                Box::new(rhs.substitute_variable(var, expr)),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(lhs.substitute_variable(var, expr)),
                Box::new(rhs.substitute_variable(var, expr)),
            ),
            Expr::Pow(base, exp) => Expr::Pow(
                Box::new(base.substitute_variable(var, expr)),
                Box::new(exp.substitute_variable(var, expr)),
            ),
            _ => match self.function_parts() {
                Some((_, arg)) => self.with_argument(arg.substitute_variable(var, expr)),
                None => self.clone(),
            },
        }
    }

    /// Substitutes a variable with a constant value throughout the expression.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        self.substitute_variable(var, &Expr::Const(value))
    }

    /// Check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        self.count_variable(var_name) > 0
    }

    /// Number of occurrences of a variable in the tree
    pub fn count_variable(&self, var_name: &str) -> usize {
        match self {
            Expr::Var(name) => usize::from(name == var_name),
            Expr::Const(_) => 0,
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.count_variable(var_name) + right.count_variable(var_name)
            }
            _ => self
                .function_parts()
                .map_or(0, |(_, arg)| arg.count_variable(var_name)),
        }
    }

    /// All variable names appearing in the expression, sorted
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                out.insert(name.clone());
            }
            Expr::Const(_) => {}
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            _ => {
                if let Some((_, arg)) = self.function_parts() {
                    arg.collect_variables(out);
                }
            }
        }
    }
}
