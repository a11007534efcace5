//! # Symbolic Engine Derivatives Module
//!
//! Analytical differentiation and numerical evaluation of expression trees.
//!
//! ## Key Methods
//!
//! ### Differentiation
//! - `diff(var: &str)` - analytical derivative using sum, product, quotient, power and
//!   chain rules for every supported function. The result is not simplified.
//!
//! ### Function evaluation
//! - `eval_expression()` - direct evaluation for a list of variables
//! - `try_eval_expression()` - same, but an unbound variable is an error
//! - `eval()` / `try_eval()` - single variable shortcuts used by the numeric root finder

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_error::SymbolicError;

impl Expr {
    /// Analytical derivative with respect to `var`.
    ///
    /// # Example
    /// ```rust, ignore
    /// let expr = Expr::parse_expression("x^2 + sin(x)").unwrap();
    /// assert_eq!(expr.diff("x").simplify().to_string(), "2*x + cos(x)");
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(Box::new(rhs.diff(var)), lhs.clone())),
                )),
                Box::new(Expr::Pow(rhs.clone(), Box::new(Expr::Const(2.0)))),
            ),
            Expr::Pow(base, exp) => {
                if !exp.contains_variable(var) {
                    // n*b^(n-1)*b'
                    Expr::Mul(
                        Box::new(Expr::Mul(
                            exp.clone(),
                            Box::new(Expr::Pow(
                                base.clone(),
                                Box::new(Expr::Sub(exp.clone(), Box::new(Expr::Const(1.0)))),
                            )),
                        )),
                        Box::new(base.diff(var)),
                    )
                } else {
                    // b^e * (e'*ln(b) + e*b'/b)
                    Expr::Mul(
                        Box::new(self.clone()),
                        Box::new(Expr::Add(
                            Box::new(Expr::Mul(
                                Box::new(exp.diff(var)),
                                Box::new(Expr::Ln(base.clone())),
                            )),
                            Box::new(Expr::Div(
                                Box::new(Expr::Mul(exp.clone(), Box::new(base.diff(var)))),
                                base.clone(),
                            )),
                        )),
                    )
                }
            }
            Expr::Exp(expr) => {
                Expr::Mul(Box::new(Expr::Exp(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::Ln(expr) => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            Expr::sin(expr) => {
                Expr::Mul(Box::new(Expr::cos(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::cos(expr) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::sin(expr.clone())),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::tg(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Pow(
                    Box::new(Expr::cos(expr.clone())),
                    Box::new(Expr::Const(2.0)),
                )),
            ),
            Expr::tanh(expr) => Expr::Mul(
                Box::new(Expr::Sub(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::tanh(expr.clone())),
                        Box::new(Expr::Const(2.0)),
                    )),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::arcsin(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Pow(
                    Box::new(Expr::Sub(
                        Box::new(Expr::Const(1.0)),
                        Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                    )),
                    Box::new(Expr::Const(0.5)),
                )),
            ),
            Expr::arccos(expr) => Expr::Div(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(expr.diff(var)),
                )),
                Box::new(Expr::Pow(
                    Box::new(Expr::Sub(
                        Box::new(Expr::Const(1.0)),
                        Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                    )),
                    Box::new(Expr::Const(0.5)),
                )),
            ),
            Expr::arctg(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Add(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                )),
            ),
            Expr::arctanh(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Sub(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                )),
            ),
        }
    }

    /// Evaluates the expression, binding `vars[i]` to `values[i]`.
    pub fn try_eval_expression(&self, vars: &[&str], values: &[f64]) -> Result<f64, SymbolicError> {
        let value = match self {
            Expr::Var(name) => {
                let index = vars
                    .iter()
                    .position(|&v| v == name)
                    .ok_or_else(|| SymbolicError::UnboundVariable(name.clone()))?;
                values
                    .get(index)
                    .copied()
                    .ok_or_else(|| SymbolicError::UnboundVariable(name.clone()))?
            }
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => {
                lhs.try_eval_expression(vars, values)? + rhs.try_eval_expression(vars, values)?
            }
            Expr::Sub(lhs, rhs) => {
                lhs.try_eval_expression(vars, values)? - rhs.try_eval_expression(vars, values)?
            }
            Expr::Mul(lhs, rhs) => {
                lhs.try_eval_expression(vars, values)? * rhs.try_eval_expression(vars, values)?
            }
            Expr::Div(lhs, rhs) => {
                lhs.try_eval_expression(vars, values)? / rhs.try_eval_expression(vars, values)?
            }
            Expr::Pow(base, exp) => {
                let base = base.try_eval_expression(vars, values)?;
                let exp = exp.try_eval_expression(vars, values)?;
                base.powf(exp)
            }
            Expr::Exp(expr) => expr.try_eval_expression(vars, values)?.exp(),
            Expr::Ln(expr) => expr.try_eval_expression(vars, values)?.ln(),
            Expr::sin(expr) => expr.try_eval_expression(vars, values)?.sin(),
            Expr::cos(expr) => expr.try_eval_expression(vars, values)?.cos(),
            Expr::tg(expr) => expr.try_eval_expression(vars, values)?.tan(),
            Expr::tanh(expr) => expr.try_eval_expression(vars, values)?.tanh(),
            Expr::arcsin(expr) => expr.try_eval_expression(vars, values)?.asin(),
            Expr::arccos(expr) => expr.try_eval_expression(vars, values)?.acos(),
            Expr::arctg(expr) => expr.try_eval_expression(vars, values)?.atan(),
            Expr::arctanh(expr) => expr.try_eval_expression(vars, values)?.atanh(),
        };
        Ok(value)
    }

    /// Evaluates the expression; unbound variables give NaN.
    pub fn eval_expression(&self, vars: &[&str], values: &[f64]) -> f64 {
        self.try_eval_expression(vars, values).unwrap_or(f64::NAN)
    }

    /// Single variable evaluation, an unbound variable is an error
    pub fn try_eval(&self, var: &str, value: f64) -> Result<f64, SymbolicError> {
        self.try_eval_expression(&[var], &[value])
    }

    /// Single variable evaluation, NaN when other variables are present
    pub fn eval(&self, var: &str, value: f64) -> f64 {
        self.eval_expression(&[var], &[value])
    }
}
