//! # Equation Solving Module
//!
//! Finds the real roots of a single-unknown equation `lhs = rhs`.
//!
//! ## Strategy
//!
//! The residual `lhs - rhs` is simplified and then handled by the first applicable method:
//!
//! 1. **Exact polynomial roots** for degree one and two (real only, sorted, de-duplicated)
//! 2. **Isolation** when the unknown occurs exactly once: inverse operations are applied
//!    from the outside in (`a*sin(2*x) + b = 0` → `x = asin(-b/a)/2`, plus the second branch
//!    of `sin`/`cos`), skipping values outside the domain of the inverse
//! 3. **Numeric scan**: the residual is sampled on a bracket range, every sign change is
//!    refined by bisection and polished by Newton-Raphson with the analytic derivative
//!
//! An equation without the unknown (`0 = 0`, `3 = 0`) has an empty solution list.
//! Other unknowns in the equation are an error.

use crate::symbolic::symbolic_engine::{Equation, Expr};
use crate::symbolic::symbolic_error::SymbolicError;
use log::{debug, trace};
use std::f64::consts::PI;

/// Settings of the numeric fallback
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// absolute tolerance on the root position
    pub tolerance: f64,
    /// residual accepted as zero when verifying a root
    pub residual_tolerance: f64,
    pub max_iterations: usize,
    /// bracket range scanned for sign changes
    pub scan_range: (f64, f64),
    pub scan_steps: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            tolerance: 1e-12,
            residual_tolerance: 1e-7,
            max_iterations: 200,
            scan_range: (-50.0, 50.0),
            scan_steps: 4000,
        }
    }
}

impl Equation {
    /// Real roots of the equation in `var`, as constants in ascending order.
    pub fn solve(&self, var: &str) -> Result<Vec<Expr>, SymbolicError> {
        self.solve_with(var, &SolverConfig::default())
    }

    pub fn solve_with(&self, var: &str, config: &SolverConfig) -> Result<Vec<Expr>, SymbolicError> {
        let residual = self.residual();
        let others: Vec<String> = residual
            .variables()
            .into_iter()
            .filter(|v| v != var)
            .collect();
        if !others.is_empty() {
            return Err(SymbolicError::Unsupported(format!(
                "equation {} = 0 has other unknowns besides {}: {}",
                residual,
                var,
                others.join(", ")
            )));
        }
        if !residual.contains_variable(var) {
            debug!("{} = 0 does not depend on {}, no solutions", residual, var);
            return Ok(Vec::new());
        }

        let roots = if let Some(roots) =
            polynomial_coefficients(&residual, var).map(|coeffs| solve_polynomial(&coeffs))
        {
            debug!("{} = 0 solved as a polynomial", residual);
            roots
        } else if residual.count_variable(var) == 1 {
            debug!("{} = 0 solved by isolating {}", residual, var);
            let candidates = isolate(&residual, 0.0, var)?;
            verified(&residual, var, candidates, config)
        } else {
            debug!("{} = 0 solved numerically", residual);
            let roots = numeric_roots(&residual, var, config);
            if roots.is_empty() {
                return Err(SymbolicError::NoSolution(format!("{} = 0", residual)));
            }
            roots
        };
        Ok(distinct_sorted(roots).into_iter().map(Expr::Const).collect())
    }
}

/// highest degree with closed-form roots here
const MAX_POLYNOMIAL_DEGREE: usize = 2;

/// Coefficients `[c0, c1, c2]` of a simplified polynomial in `var` of degree at most two,
/// `None` otherwise
pub fn polynomial_coefficients(expr: &Expr, var: &str) -> Option<Vec<f64>> {
    let mut coeffs: Vec<f64> = Vec::new();
    for term in expr.ordered_terms() {
        let (c, rest) = term.as_coeff_mul();
        let degree = match &rest {
            Expr::Const(one) if *one == 1.0 => 0,
            Expr::Var(name) if name == var => 1,
            Expr::Pow(base, exp) => match (base.as_ref(), exp.as_const()) {
                (Expr::Var(name), Some(n)) if name == var && n >= 0.0 && n.fract() == 0.0 => {
                    n as usize
                }
                _ => return None,
            },
            _ => return None,
        };
        if degree > MAX_POLYNOMIAL_DEGREE {
            return None;
        }
        if coeffs.len() <= degree {
            coeffs.resize(degree + 1, 0.0);
        }
        coeffs[degree] += c;
    }
    Some(coeffs)
}

/// Real roots of c0 + c1*x + c2*x^2 (leading coefficient non-zero)
fn solve_polynomial(coeffs: &[f64]) -> Vec<f64> {
    match coeffs {
        [_] | [] => Vec::new(),
        [c0, c1] => vec![-c0 / c1],
        [c0, c1, c2, ..] => {
            let disc = c1 * c1 - 4.0 * c2 * c0;
            if disc < 0.0 {
                Vec::new()
            } else if disc == 0.0 {
                vec![-c1 / (2.0 * c2)]
            } else {
                let sqrt_disc = disc.sqrt();
                vec![(-c1 - sqrt_disc) / (2.0 * c2), (-c1 + sqrt_disc) / (2.0 * c2)]
            }
        }
    }
}

fn constant_value(expr: &Expr) -> Result<f64, SymbolicError> {
    expr.try_eval_expression(&[], &[])
}

/// Values of `var` for which `expr == target`, when `var` occurs once in `expr`
fn isolate(expr: &Expr, target: f64, var: &str) -> Result<Vec<f64>, SymbolicError> {
    trace!("isolating {} in {} = {}", var, expr, target);
    if !target.is_finite() {
        return Ok(Vec::new());
    }
    match expr {
        Expr::Var(name) if name == var => Ok(vec![target]),
        Expr::Add(a, b) => {
            if a.contains_variable(var) {
                isolate(a, target - constant_value(b)?, var)
            } else {
                isolate(b, target - constant_value(a)?, var)
            }
        }
        Expr::Sub(a, b) => {
            if a.contains_variable(var) {
                isolate(a, target + constant_value(b)?, var)
            } else {
                isolate(b, constant_value(a)? - target, var)
            }
        }
        Expr::Mul(a, b) => {
            let (inner, factor) = if a.contains_variable(var) { (a, b) } else { (b, a) };
            let factor = constant_value(factor)?;
            if factor == 0.0 {
                return Ok(Vec::new());
            }
            isolate(inner, target / factor, var)
        }
        Expr::Div(a, b) => {
            if a.contains_variable(var) {
                isolate(a, target * constant_value(b)?, var)
            } else if target == 0.0 {
                Ok(Vec::new())
            } else {
                isolate(b, constant_value(a)? / target, var)
            }
        }
        Expr::Pow(base, exp) => {
            if base.contains_variable(var) {
                let n = constant_value(exp)?;
                if n == 0.0 {
                    return Ok(Vec::new());
                }
                let candidates = if n.fract() == 0.0 && (n as i64) % 2 == 0 {
                    if target < 0.0 {
                        Vec::new()
                    } else {
                        let r = target.powf(1.0 / n);
                        vec![-r, r]
                    }
                } else if n.fract() == 0.0 {
                    vec![target.signum() * target.abs().powf(1.0 / n)]
                } else if target >= 0.0 {
                    vec![target.powf(1.0 / n)]
                } else {
                    Vec::new()
                };
                isolate_each(base, candidates, var)
            } else {
                let c = constant_value(base)?;
                if c <= 0.0 || c == 1.0 || target <= 0.0 {
                    return Ok(Vec::new());
                }
                isolate(exp, target.ln() / c.ln(), var)
            }
        }
        Expr::Exp(arg) if target > 0.0 => isolate(arg, target.ln(), var),
        Expr::Ln(arg) => isolate(arg, target.exp(), var),
        Expr::sin(arg) if target.abs() <= 1.0 => {
            let principal = target.asin();
            isolate_each(arg, vec![principal, PI - principal], var)
        }
        Expr::cos(arg) if target.abs() <= 1.0 => {
            let principal = target.acos();
            isolate_each(arg, vec![principal, 2.0 * PI - principal], var)
        }
        Expr::tg(arg) => isolate(arg, target.atan(), var),
        Expr::tanh(arg) if target.abs() < 1.0 => isolate(arg, target.atanh(), var),
        Expr::arcsin(arg) if target.abs() <= PI / 2.0 => isolate(arg, target.sin(), var),
        Expr::arccos(arg) if (0.0..=PI).contains(&target) => isolate(arg, target.cos(), var),
        Expr::arctg(arg) if target.abs() < PI / 2.0 => isolate(arg, target.tan(), var),
        Expr::arctanh(arg) => isolate(arg, target.tanh(), var),
        // the target lies outside the range of the function
        Expr::Exp(_)
        | Expr::sin(_)
        | Expr::cos(_)
        | Expr::tanh(_)
        | Expr::arcsin(_)
        | Expr::arccos(_)
        | Expr::arctg(_) => Ok(Vec::new()),
        Expr::Var(_) | Expr::Const(_) => Err(SymbolicError::NoSolution(format!(
            "{} = {} does not contain {}",
            expr, target, var
        ))),
    }
}

fn isolate_each(expr: &Expr, targets: Vec<f64>, var: &str) -> Result<Vec<f64>, SymbolicError> {
    let mut out = Vec::new();
    for target in targets {
        out.extend(isolate(expr, target, var)?);
    }
    Ok(out)
}

/// Keeps the candidates that make the residual vanish
fn verified(residual: &Expr, var: &str, candidates: Vec<f64>, config: &SolverConfig) -> Vec<f64> {
    candidates
        .into_iter()
        .filter(|x| {
            let value = residual.eval(var, *x);
            let ok = x.is_finite() && value.abs() <= config.residual_tolerance * (1.0 + x.abs());
            if !ok {
                trace!("rejected candidate {} with residual {}", x, value);
            }
            ok
        })
        .collect()
}

/// Scan for sign changes, refine by bisection, polish with Newton-Raphson
fn numeric_roots(residual: &Expr, var: &str, config: &SolverConfig) -> Vec<f64> {
    let derivative = residual.diff(var).simplify();
    let f = |x: f64| residual.eval(var, x);
    let (lo, hi) = config.scan_range;
    let step = (hi - lo) / config.scan_steps as f64;

    let mut candidates = Vec::new();
    let mut a = lo;
    let mut fa = f(a);
    for i in 1..=config.scan_steps {
        let b = lo + step * i as f64;
        let fb = f(b);
        if fa == 0.0 {
            candidates.push(a);
        } else if fa.is_finite() && fb.is_finite() && fa * fb < 0.0 {
            if let Some(root) = bisection(&f, a, b, fa, config) {
                candidates.push(newton_polish(&f, &derivative, var, root, a, b, config));
            }
        }
        a = b;
        fa = fb;
    }
    if fa == 0.0 {
        candidates.push(a);
    }
    // poles of tg and 1/x also change sign; those fail the residual check
    verified(residual, var, candidates, config)
}

fn bisection<F>(f: &F, mut a: f64, mut b: f64, mut fa: f64, config: &SolverConfig) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    for _ in 0..config.max_iterations {
        let c = 0.5 * (a + b);
        let fc = f(c);
        if !fc.is_finite() {
            return None;
        }
        if fc == 0.0 || (b - a).abs() < config.tolerance {
            return Some(c);
        }
        if fa * fc < 0.0 {
            b = c;
        } else {
            a = c;
            fa = fc;
        }
    }
    Some(0.5 * (a + b))
}

fn newton_polish<F>(
    f: &F,
    derivative: &Expr,
    var: &str,
    mut x: f64,
    a: f64,
    b: f64,
    config: &SolverConfig,
) -> f64
where
    F: Fn(f64) -> f64,
{
    for _ in 0..8 {
        let fx = f(x);
        let fpx = derivative.eval(var, x);
        if fx == 0.0 || !fpx.is_finite() || fpx.abs() < 1e-15 {
            break;
        }
        let x_new = x - fx / fpx;
        // stay inside the bracket
        if !(a..=b).contains(&x_new) {
            break;
        }
        if (x_new - x).abs() < config.tolerance {
            x = x_new;
            break;
        }
        x = x_new;
    }
    x
}

/// Sorted, with near-equal values merged and near-integers snapped
fn distinct_sorted(mut roots: Vec<f64>) -> Vec<f64> {
    roots.retain(|r| r.is_finite());
    for r in roots.iter_mut() {
        if (*r - r.round()).abs() < 1e-9 {
            // +0.0 turns -0.0 into 0.0
            *r = r.round() + 0.0;
        }
    }
    roots.sort_by(|a, b| a.total_cmp(b));
    roots.dedup_by(|a, b| (*a - *b).abs() < 1e-7 * (1.0 + b.abs()));
    roots
}
