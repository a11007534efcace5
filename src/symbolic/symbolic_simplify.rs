//! # Symbolic Expression Simplification Module
//!
//! This module provides the algebraic simplification the sandbox relies on: every equation
//! reconstructed from the token layout and every expression split into tokens passes
//! through `simplify` first.
//!
//! ## Simplification Strategy
//!
//! 1. **Constant Folding**: Evaluates arithmetic operations on numerical constants
//! 2. **Algebraic Identities**: x + 0 = x, x * 1 = x, x * 0 = 0, x^1 = x, x^0 = 1,
//!    exp(0) = 1, ln(1) = 0, sin(0) = 0, ln(exp(a)) = a, exp(ln(a)) = a
//! 3. **Product Normalization**: constant factors are multiplied together, equal bases are
//!    merged by adding their exponents, a constant multiple of a sum is distributed
//! 4. **Like Term Collection**: sums are flattened and collected as `coefficient * term`
//!
//! ## Canonical Form
//!
//! A simplified sum is rebuilt in a fixed order:
//! - polynomial monomials first, by descending total degree (`x^2`, `x`, ...)
//! - then terms containing non-polynomial factors (functions, symbolic powers, quotients),
//!   ordered by their printed form
//! - the constant term last
//!
//! So `3 + x - 5 + x` and `2*x - 2` simplify to the same tree, and simplifying a simplified
//! expression returns it unchanged.

use crate::symbolic::symbolic_engine::Expr;
use log::trace;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// coefficients smaller than this are treated as cancelled
const ZERO_TOLERANCE: f64 = 1e-12;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Public interface for expression simplification.
    ///
    /// # Returns
    /// Simplified expression in canonical form
    pub fn simplify(&self) -> Expr {
        let simplified = self.simplify_();
        trace!("simplified {} into {}", self, simplified);
        simplified
    }

    /// Recursive bottom-up simplification
    pub fn simplify_(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(..) | Expr::Sub(..) => {
                let mut terms = Vec::new();
                flatten_add(self, 1.0, &mut terms);
                let terms = terms
                    .into_iter()
                    .map(|(scale, term)| (scale, term.simplify_()))
                    .collect();
                collect_sum(terms)
            }
            Expr::Mul(..) => {
                let mut factors = Vec::new();
                flatten_mul(self, &mut factors);
                simplify_product(factors.iter().map(|f| f.simplify_()).collect())
            }
            Expr::Div(num, den) => simplify_quotient(num.simplify_(), den.simplify_()),
            Expr::Pow(base, exp) => simplify_power(base.simplify_(), exp.simplify_()),
            _ => match self.function_parts() {
                Some((_, arg)) => simplify_function(self.with_argument(arg.simplify_())),
                None => self.clone(),
            },
        }
    }

    /// Summands of the simplified expression in canonical order.
    ///
    /// `2*x + 3 - 5` gives `[2*x, -2]`; a non-sum gives a single term.
    pub fn ordered_terms(&self) -> Vec<Expr> {
        let simplified = self.simplify();
        let mut terms = Vec::new();
        collect_summands(&simplified, &mut terms);
        terms
    }

    /// Splits a term into its numeric coefficient and the remaining factor.
    ///
    /// `3*x^2` gives `(3, x^2)`, `-sin(x)` gives `(-1, sin(x))`, `5` gives `(5, 1)`.
    pub fn as_coeff_mul(&self) -> (f64, Expr) {
        match self {
            Expr::Const(c) => (*c, Expr::Const(1.0)),
            Expr::Mul(lhs, rhs) => match lhs.as_ref() {
                Expr::Const(c) => (*c, rhs.as_ref().clone()),
                _ => (1.0, self.clone()),
            },
            _ => (1.0, self.clone()),
        }
    }
}

fn collect_summands(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Add(lhs, rhs) => {
            collect_summands(lhs, out);
            collect_summands(rhs, out);
        }
        _ => out.push(expr.clone()),
    }
}

/// Represents the polynomial part of a term (monomial).
///
/// A monomial key encodes which variables appear in a term and their respective
/// integer exponents. For example, the term `3x^2y` has monomial key `{"x": 2, "y": 1}`
/// and coefficient `3`. `BTreeMap` keeps `x*y` and `y*x` identical.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MonomialKey(pub BTreeMap<String, i32>);

impl MonomialKey {
    pub fn degree(&self) -> i32 {
        self.0.values().sum()
    }
}

/// A term split into `coeff * monomial * atoms`, where atoms are non-polynomial factors
/// such as `sin(x)`, `x^y` or `(x + 1)`, kept sorted by their printed form
#[derive(Clone, Debug)]
struct TermParts {
    coeff: f64,
    monomial: MonomialKey,
    atoms: Vec<Expr>,
    /// printed atoms, used as the collection key
    atom_key: String,
}

impl TermParts {
    fn new(coeff: f64, monomial: MonomialKey, mut atoms: Vec<Expr>) -> Self {
        atoms.sort_by_cached_key(|a| a.to_string());
        let atom_key = atoms
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join("*");
        TermParts {
            coeff,
            monomial,
            atoms,
            atom_key,
        }
    }

    /// 0 for pure polynomial terms, 1 for terms with atoms, 2 for the constant
    fn category(&self) -> u8 {
        if !self.atoms.is_empty() {
            1
        } else if self.monomial.0.is_empty() {
            2
        } else {
            0
        }
    }

    fn canonical_order(&self, other: &TermParts) -> Ordering {
        self.category()
            .cmp(&other.category())
            .then_with(|| match self.category() {
                0 => other
                    .monomial
                    .degree()
                    .cmp(&self.monomial.degree())
                    .then_with(|| self.monomial.cmp(&other.monomial)),
                1 => build_term(1.0, &self.monomial, &self.atoms)
                    .to_string()
                    .cmp(&build_term(1.0, &other.monomial, &other.atoms).to_string()),
                _ => Ordering::Equal,
            })
    }

    fn into_expr(self) -> Expr {
        build_term(self.coeff, &self.monomial, &self.atoms)
    }
}

/// Flatten nested Add/Sub expressions into a list of scaled terms.
///
/// - `a - b` becomes `[(1, a), (-1, b)]`
/// - `c * (a + b)` becomes `[(c, a), (c, b)]`
/// - `(a + b) / c` becomes `[(1/c, a), (1/c, b)]`
fn flatten_add(expr: &Expr, scale: f64, out: &mut Vec<(f64, Expr)>) {
    match expr {
        Expr::Add(a, b) => {
            flatten_add(a, scale, out);
            flatten_add(b, scale, out);
        }
        Expr::Sub(a, b) => {
            flatten_add(a, scale, out);
            flatten_add(b, -scale, out);
        }
        Expr::Mul(lhs, rhs) => match (lhs.as_ref(), rhs.as_ref()) {
            (Expr::Const(c), sum @ (Expr::Add(..) | Expr::Sub(..)))
            | (sum @ (Expr::Add(..) | Expr::Sub(..)), Expr::Const(c)) => {
                flatten_add(sum, scale * c, out)
            }
            _ => out.push((scale, expr.clone())),
        },
        Expr::Div(num, den) => match (num.as_ref(), den.as_ref()) {
            (sum @ (Expr::Add(..) | Expr::Sub(..)), Expr::Const(c)) if *c != 0.0 => {
                flatten_add(sum, scale / c, out)
            }
            _ => out.push((scale, expr.clone())),
        },
        _ => out.push((scale, expr.clone())),
    }
}

/// Flatten nested multiplication expressions into a list of factors.
///
/// - `(a * b) * c` → `[a, b, c]`
fn flatten_mul(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Mul(a, b) => {
            flatten_mul(a, out);
            flatten_mul(b, out);
        }
        _ => out.push(expr.clone()),
    }
}

/// Split an already simplified product into coefficient, monomial and atoms.
fn term_parts(expr: &Expr) -> TermParts {
    let mut factors = Vec::new();
    flatten_mul(expr, &mut factors);
    let mut coeff = 1.0;
    let mut monomial = MonomialKey::default();
    let mut atoms = Vec::new();
    for factor in factors {
        match factor {
            Expr::Const(c) => coeff *= c,
            Expr::Var(v) => *monomial.0.entry(v).or_insert(0) += 1,
            Expr::Pow(ref base, ref exp) => match (base.as_ref(), integer_exponent(exp)) {
                (Expr::Var(v), Some(n)) => *monomial.0.entry(v.clone()).or_insert(0) += n,
                _ => atoms.push(factor),
            },
            other => atoms.push(other),
        }
    }
    monomial.0.retain(|_, n| *n != 0);
    TermParts::new(coeff, monomial, atoms)
}

fn integer_exponent(exp: &Expr) -> Option<i32> {
    match exp {
        Expr::Const(n) if n.fract() == 0.0 && n.abs() < i32::MAX as f64 => Some(*n as i32),
        _ => None,
    }
}

/// Build a term from coefficient, monomial and atoms.
///
/// - `coeff: 5, {}` → `5`
/// - `coeff: 3, {"x": 1}` → `3*x`
/// - `coeff: 1, {"x": 2}, [sin(x)]` → `x^2*sin(x)`
fn build_term(coeff: f64, monomial: &MonomialKey, atoms: &[Expr]) -> Expr {
    let mut factors: Vec<Expr> = Vec::new();
    for (var, exp) in &monomial.0 {
        let var_expr = Expr::Var(var.clone());
        if *exp == 1 {
            factors.push(var_expr);
        } else {
            factors.push(Expr::Pow(Box::new(var_expr), Box::new(Expr::Const(*exp as f64))));
        }
    }
    factors.extend(atoms.iter().cloned());

    let product = factors
        .into_iter()
        .reduce(|a, b| Expr::Mul(Box::new(a), Box::new(b)));
    match product {
        None => Expr::Const(coeff),
        Some(product) if coeff == 1.0 => product,
        Some(product) => Expr::Mul(Box::new(Expr::Const(coeff)), Box::new(product)),
    }
}

/// Collect scaled, already simplified terms into a canonical sum.
fn collect_sum(terms: Vec<(f64, Expr)>) -> Expr {
    let mut leaves = Vec::new();
    for (scale, term) in &terms {
        flatten_add(term, *scale, &mut leaves);
    }

    let mut collected: Vec<TermParts> = Vec::new();
    for (scale, leaf) in leaves {
        let mut parts = term_parts(&leaf);
        parts.coeff *= scale;
        match collected
            .iter_mut()
            .find(|t| t.monomial == parts.monomial && t.atom_key == parts.atom_key)
        {
            Some(existing) => existing.coeff += parts.coeff,
            None => collected.push(parts),
        }
    }
    collected.retain(|t| t.coeff.abs() > ZERO_TOLERANCE);
    collected.sort_by(|a, b| a.canonical_order(b));

    collected
        .into_iter()
        .map(TermParts::into_expr)
        .reduce(|a, b| Expr::Add(Box::new(a), Box::new(b)))
        .unwrap_or(Expr::Const(0.0))
}

/// Multiply simplified factors: constants are folded, equal bases merged, and a constant
/// multiple of a single sum is distributed.
fn simplify_product(factors: Vec<Expr>) -> Expr {
    let mut coeff = 1.0;
    let mut bases: Vec<(Expr, Expr)> = Vec::new();
    let mut flat = Vec::new();
    for factor in &factors {
        flatten_mul(factor, &mut flat);
    }
    for factor in flat {
        let (base, exp) = match factor {
            Expr::Const(c) => {
                coeff *= c;
                continue;
            }
            Expr::Pow(base, exp) => (*base, *exp),
            other => (other, Expr::Const(1.0)),
        };
        match bases.iter_mut().find(|(b, _)| *b == base) {
            Some((_, total)) => {
                let sum = std::mem::replace(total, Expr::Const(0.0));
                *total = collect_sum(vec![(1.0, sum), (1.0, exp)]);
            }
            None => bases.push((base, exp)),
        }
    }
    if coeff == 0.0 {
        return Expr::Const(0.0);
    }

    let mut rebuilt = Vec::new();
    for (base, exp) in bases {
        match simplify_power(base, exp) {
            Expr::Const(c) => coeff *= c,
            power => rebuilt.push(power),
        }
    }
    if let [single @ (Expr::Add(..) | Expr::Sub(..))] = rebuilt.as_slice() {
        if coeff == 1.0 {
            return single.clone();
        }
        return collect_sum(vec![(coeff, single.clone())]);
    }
    let mut parts = term_parts(&build_term(1.0, &MonomialKey::default(), &rebuilt));
    parts.coeff = coeff;
    parts.into_expr()
}

fn simplify_quotient(num: Expr, den: Expr) -> Expr {
    match (&num, &den) {
        (Expr::Const(a), Expr::Const(b)) if *b != 0.0 => return Expr::Const(a / b),
        (_, Expr::Const(b)) if *b == 0.0 => return Expr::Div(Box::new(num), Box::new(den)),
        (_, Expr::Const(b)) => return simplify_product(vec![Expr::Const(1.0 / b), num]),
        (Expr::Const(a), _) if *a == 0.0 => return Expr::Const(0.0),
        _ if num == den => return Expr::Const(1.0),
        _ => {}
    }
    // a denominator made of powers is moved up with negated exponents
    let mut den_factors = Vec::new();
    flatten_mul(&den, &mut den_factors);
    let invertible = den_factors.iter().all(|f| {
        matches!(f, Expr::Const(c) if *c != 0.0)
            || matches!(f, Expr::Var(_))
            || matches!(f, Expr::Pow(_, exp) if exp.as_const().is_some())
    });
    if invertible {
        let mut factors = vec![num];
        for f in den_factors {
            factors.push(match f {
                Expr::Const(c) => Expr::Const(1.0 / c),
                Expr::Pow(base, exp) => {
                    let exp = exp.as_const().unwrap_or(1.0);
                    Expr::Pow(base, Box::new(Expr::Const(-exp)))
                }
                other => Expr::Pow(Box::new(other), Box::new(Expr::Const(-1.0))),
            });
        }
        return simplify_product(factors);
    }
    // otherwise keep the quotient as an atom, with the numeric coefficients pulled out
    let (num_coeff, num_rest) = num.as_coeff_mul();
    let (den_coeff, den_rest) = den.as_coeff_mul();
    let quotient = if num_rest == den_rest {
        Expr::Const(1.0)
    } else {
        Expr::Div(Box::new(num_rest), Box::new(den_rest))
    };
    simplify_product(vec![Expr::Const(num_coeff / den_coeff), quotient])
}

fn simplify_power(base: Expr, exp: Expr) -> Expr {
    match (&base, &exp) {
        (Expr::Const(a), Expr::Const(b)) => {
            let value = a.powf(*b);
            if value.is_finite() {
                return Expr::Const(value);
            }
        }
        (_, Expr::Const(e)) if *e == 0.0 => return Expr::Const(1.0),
        (_, Expr::Const(e)) if *e == 1.0 => return base,
        (Expr::Const(b), _) if *b == 1.0 => return Expr::Const(1.0),
        (Expr::Pow(inner_base, inner_exp), Expr::Const(outer)) if outer.fract() == 0.0 => {
            if let Some(inner) = inner_exp.as_const() {
                return simplify_power(inner_base.as_ref().clone(), Expr::Const(inner * outer));
            }
        }
        _ => {}
    }
    Expr::Pow(Box::new(base), Box::new(exp))
}

fn simplify_function(expr: Expr) -> Expr {
    match &expr {
        Expr::Ln(arg) => {
            if let Expr::Exp(inner) = arg.as_ref() {
                return inner.as_ref().clone();
            }
        }
        Expr::Exp(arg) => {
            if let Expr::Ln(inner) = arg.as_ref() {
                return inner.as_ref().clone();
            }
        }
        _ => {}
    }
    // functions of constants fold only to integers: exp(0), ln(1), cos(0), arccos(1)
    if let Some((_, Expr::Const(_))) = expr.function_parts() {
        if let Ok(value) = expr.try_eval_expression(&[], &[]) {
            if value.is_finite() && (value - value.round()).abs() < ZERO_TOLERANCE {
                return Expr::Const(value.round());
            }
        }
    }
    expr
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Expr {
        Expr::parse_expression(s).unwrap()
    }

    fn simplified(s: &str) -> String {
        parse(s).simplify().to_string()
    }

    #[test]
    fn test_constant_folding_in_sum() {
        assert_eq!(simplified("2*x + 3 - 5"), "2*x - 2");
        assert_eq!(simplified("1 + 2*3"), "7");
        assert_eq!(simplified("x - x"), "0");
    }

    #[test]
    fn test_like_terms_are_collected() {
        assert_eq!(simplified("3*x + 2*x - x"), "4*x");
        assert_eq!(simplified("x*x + 2*x + x^2"), "2*x^2 + 2*x");
        assert_eq!(simplified("sin(x) + 2*sin(x) - 1"), "3*sin(x) - 1");
    }

    #[test]
    fn test_canonical_order_is_independent_of_input_order() {
        let a = parse("5 + exp(x) + x + x^2").simplify();
        let b = parse("x^2 + exp(x) + 5 + x").simplify();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "x^2 + x + exp(x) + 5");
    }

    #[test]
    fn test_simplify_is_idempotent() {
        for s in [
            "2*x + 3 - 5",
            "x/2 - 3*cos(x) + exp(2*x)",
            "x*(x + 1) - 4/(x + 1)",
            "-(x - 3)*2 + x^y",
            "arcsin(x) - 1",
        ] {
            let once = parse(s).simplify();
            assert_eq!(once.simplify(), once, "{}", s);
        }
    }

    #[test]
    fn test_identities() {
        assert_eq!(simplified("x + 0"), "x");
        assert_eq!(simplified("1*x"), "x");
        assert_eq!(simplified("0*sin(x)"), "0");
        assert_eq!(simplified("x^1"), "x");
        assert_eq!(simplified("x^0"), "1");
        assert_eq!(simplified("exp(0) + ln(1) + sin(0)"), "1");
        assert_eq!(simplified("ln(exp(x))"), "x");
    }

    #[test]
    fn test_division_by_constant_becomes_coefficient() {
        assert_eq!(simplified("x/2"), "x/2");
        assert_eq!(
            parse("x/2").simplify(),
            Expr::Mul(Box::new(Expr::Const(0.5)), Box::new(Expr::var("x")))
        );
        assert_eq!(simplified("(2*x + 4)/2"), "x + 2");
    }

    #[test]
    fn test_distribution_of_constant() {
        assert_eq!(simplified("-(x + 1)"), "-x - 1");
        assert_eq!(simplified("3*(x - 2) + 6"), "3*x");
    }

    #[test]
    fn test_products_merge_bases() {
        assert_eq!(simplified("x*x*x"), "x^3");
        assert_eq!(simplified("x^2/x"), "x");
        assert_eq!(simplified("2*x*3"), "6*x");
        assert_eq!(simplified("sin(x)*sin(x)"), "sin(x)^2");
    }

    #[test]
    fn test_ordered_terms_and_coeff() {
        let terms = parse("2*x + 3 - 5").ordered_terms();
        assert_eq!(terms, vec![parse("2*x"), Expr::Const(-2.0)]);
        assert_eq!(terms[0].as_coeff_mul(), (2.0, Expr::var("x")));
        assert_eq!(terms[1].as_coeff_mul(), (-2.0, Expr::Const(1.0)));
        assert_eq!(
            parse("-sin(x)").simplify().as_coeff_mul(),
            (-1.0, Expr::sin(Box::new(Expr::var("x"))))
        );
        assert_eq!(parse("x").ordered_terms(), vec![Expr::var("x")]);
    }
}
