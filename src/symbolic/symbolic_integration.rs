use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_error::SymbolicError;
use log::debug;

impl Expr {
    /// SYMBOLIC INTEGRATION

    /// Main integration method - integrates with respect to a variable
    /// Returns the indefinite integral (without constant of integration), simplified.
    /// This module deals with simple integrals: polynomials, functions of a linear argument,
    /// x^n*exp(a*x + b), x^n*ln(x) and f'(x)/f(x).
    pub fn integrate(&self, var: &str) -> Result<Expr, SymbolicError> {
        let integrand = self.simplify();
        let result = integrand.integrate_(var)?;
        debug!("integral of {} d{} is {}", integrand, var, result);
        Ok(result.simplify())
    }

    fn integrate_(&self, var: &str) -> Result<Expr, SymbolicError> {
        let x = Expr::Var(var.to_string());
        // ∫ c dx = c*x, also for expressions free of the variable
        if !self.contains_variable(var) {
            return Ok(self.clone() * x);
        }
        match self {
            // ∫ x dx = x²/2
            Expr::Var(_) => Ok(x.pow(Expr::Const(2.0)) * Expr::Const(0.5)),
            // ∫ (f + g) dx = ∫ f dx + ∫ g dx
            Expr::Add(lhs, rhs) => Ok(lhs.integrate_(var)? + rhs.integrate_(var)?),
            // ∫ (f - g) dx = ∫ f dx - ∫ g dx
            Expr::Sub(lhs, rhs) => Ok(lhs.integrate_(var)? - rhs.integrate_(var)?),
            Expr::Mul(..) => self.integrate_multiplication(var),
            Expr::Div(num, den) => self.integrate_division(num, den, var),
            Expr::Pow(base, exp) => self.integrate_power(base, exp, var),
            Expr::Ln(arg) => self.integrate_logarithm(arg, var),
            Expr::Exp(arg) | Expr::sin(arg) | Expr::cos(arg) | Expr::tg(arg) | Expr::tanh(arg) => {
                self.integrate_linear_argument(arg, var)
            }
            Expr::arcsin(arg) | Expr::arccos(arg) | Expr::arctg(arg) | Expr::arctanh(arg) => {
                self.integrate_inverse_function(arg, var)
            }
            Expr::Const(_) => Ok(self.clone() * x),
        }
    }

    fn cannot_integrate(&self) -> SymbolicError {
        SymbolicError::CannotIntegrate(self.to_string())
    }

    /// Multiplication: constant factors are pulled out, then x^n*exp(ax+b) and x^n*ln(x)
    /// are recognised
    fn integrate_multiplication(&self, var: &str) -> Result<Expr, SymbolicError> {
        let mut factors = Vec::new();
        flatten_product(self, &mut factors);
        let (constant, variable): (Vec<Expr>, Vec<Expr>) =
            factors.into_iter().partition(|f| !f.contains_variable(var));
        let constant = constant
            .into_iter()
            .reduce(|a, b| a * b)
            .unwrap_or(Expr::Const(1.0));

        let integral = match variable.as_slice() {
            [single] => single.integrate_(var)?,
            [first, second] => integrate_by_parts_pattern(first, second, var)
                .or_else(|| integrate_by_parts_pattern(second, first, var))
                .ok_or_else(|| self.cannot_integrate())?,
            _ => return Err(self.cannot_integrate()),
        };
        Ok(constant * integral)
    }

    /// Handle division in integration
    fn integrate_division(&self, num: &Expr, den: &Expr, var: &str) -> Result<Expr, SymbolicError> {
        // If denominator is constant: ∫ f(x)/c dx = (1/c) * ∫ f(x) dx
        if !den.contains_variable(var) {
            return Ok(num.integrate_(var)? / den.clone());
        }
        // ∫ k*f'(x)/f(x) dx = k*ln(f(x))
        let derivative = den.diff(var).simplify();
        if !derivative.is_zero() {
            let ratio = (num.clone() / derivative).simplify();
            if !ratio.contains_variable(var) {
                return Ok(ratio * Expr::Ln(Box::new(den.clone())));
            }
        }
        Err(self.cannot_integrate())
    }

    /// Handle power integration
    fn integrate_power(&self, base: &Expr, exp: &Expr, var: &str) -> Result<Expr, SymbolicError> {
        // ∫ (a*x + b)^n dx = (a*x + b)^(n+1)/((n+1)*a), ln(a*x + b)/a for n = -1
        if let (Some((a, _)), Expr::Const(n)) = (linear_coefficients(base, var), exp) {
            if (*n + 1.0).abs() < f64::EPSILON {
                return Ok(Expr::Ln(Box::new(base.clone())) / Expr::Const(a));
            }
            let new_exp = Expr::Const(n + 1.0);
            return Ok(base.clone().pow(new_exp) / Expr::Const((n + 1.0) * a));
        }
        // ∫ c^(a*x + b) dx = c^(a*x + b)/(a*ln(c))
        if let (Expr::Const(c), Some((a, _))) = (base, linear_coefficients(exp, var)) {
            if *c > 0.0 && (*c - 1.0).abs() > f64::EPSILON {
                return Ok(self.clone() / (Expr::Const(a) * Expr::Ln(Box::new(Expr::Const(*c)))));
            }
        }
        Err(self.cannot_integrate())
    }

    /// ∫ f(a*x + b) dx = F(a*x + b)/a for exp, sin, cos, tg and tanh
    fn integrate_linear_argument(&self, arg: &Expr, var: &str) -> Result<Expr, SymbolicError> {
        let (a, _) = linear_coefficients(arg, var).ok_or_else(|| self.cannot_integrate())?;
        let u = Box::new(arg.clone());
        let antiderivative = match self {
            Expr::Exp(_) => self.clone(),
            Expr::sin(_) => -Expr::cos(u),
            Expr::cos(_) => Expr::sin(u),
            Expr::tg(_) => -Expr::Ln(Box::new(Expr::cos(u))),
            // ln(cosh(u)) up to a constant
            Expr::tanh(_) => Expr::Ln(Box::new(
                Expr::Exp(u.clone()) + Expr::Exp(Box::new(-arg.clone())),
            )),
            _ => return Err(self.cannot_integrate()),
        };
        Ok(antiderivative / Expr::Const(a))
    }

    /// Handle logarithm integration using integration by parts
    fn integrate_logarithm(&self, arg: &Expr, var: &str) -> Result<Expr, SymbolicError> {
        // ∫ ln(a*x + b) dx = ((a*x + b)*ln(a*x + b) - (a*x + b))/a
        let (a, _) = linear_coefficients(arg, var).ok_or_else(|| self.cannot_integrate())?;
        let u = arg.clone();
        Ok((u.clone() * self.clone() - u) / Expr::Const(a))
    }

    /// ∫ arcsin(x), arccos(x), arctg(x), arctanh(x) by parts
    fn integrate_inverse_function(&self, arg: &Expr, var: &str) -> Result<Expr, SymbolicError> {
        let x = Expr::Var(var.to_string());
        if *arg != x {
            return Err(self.cannot_integrate());
        }
        let one_minus_x2 = Expr::Const(1.0) - x.clone().pow(Expr::Const(2.0));
        let one_plus_x2 = Expr::Const(1.0) + x.clone().pow(Expr::Const(2.0));
        let by_parts = x.clone() * self.clone();
        let result = match self {
            Expr::arcsin(_) => by_parts + one_minus_x2.pow(Expr::Const(0.5)),
            Expr::arccos(_) => by_parts - one_minus_x2.pow(Expr::Const(0.5)),
            Expr::arctg(_) => by_parts - Expr::Ln(Box::new(one_plus_x2)) * Expr::Const(0.5),
            Expr::arctanh(_) => by_parts + Expr::Ln(Box::new(one_minus_x2)) * Expr::Const(0.5),
            _ => return Err(self.cannot_integrate()),
        };
        Ok(result)
    }
}

fn flatten_product(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Mul(a, b) => {
            flatten_product(a, out);
            flatten_product(b, out);
        }
        _ => out.push(expr.clone()),
    }
}

/// `(a, b)` when `expr` is `a*var + b` with numeric `a != 0` and `b`
pub(crate) fn linear_coefficients(expr: &Expr, var: &str) -> Option<(f64, f64)> {
    if !expr.contains_variable(var) {
        return None;
    }
    let a = expr.diff(var).simplify().as_const()?;
    let b = expr.set_variable(var, 0.0).simplify().as_const()?;
    if a == 0.0 || !a.is_finite() || !b.is_finite() {
        return None;
    }
    Some((a, b))
}

/// Non-negative integer n when `expr` is `var^n` (`var` itself is n = 1)
fn power_of_variable(expr: &Expr, var: &str) -> Option<i32> {
    match expr {
        Expr::Var(x) if x == var => Some(1),
        Expr::Pow(base, exp) => match (base.as_ref(), exp.as_ref()) {
            (Expr::Var(x), Expr::Const(n)) if x == var && n.fract() == 0.0 => Some(*n as i32),
            _ => None,
        },
        _ => None,
    }
}

/// x^n*exp(a*x + b) and x^n*ln(x), `poly` being the power factor
fn integrate_by_parts_pattern(poly: &Expr, other: &Expr, var: &str) -> Option<Expr> {
    let n = power_of_variable(poly, var)?;
    let x = Expr::Var(var.to_string());
    match other {
        Expr::Exp(inner) if n >= 0 => {
            let (a, _) = linear_coefficients(inner, var)?;
            Some(integrate_xn_times_exp(n, a, other.clone(), var))
        }
        Expr::Ln(inner) if **inner == x => {
            if n == -1 {
                // ∫ ln(x)/x dx = ln(x)²/2
                return Some(other.clone().pow(Expr::Const(2.0)) * Expr::Const(0.5));
            }
            let m = (n + 1) as f64;
            let x_m = x.pow(Expr::Const(m));
            // x^(n+1)/(n+1)*ln(x) - x^(n+1)/(n+1)²
            Some(x_m.clone() * other.clone() / Expr::Const(m) - x_m / Expr::Const(m * m))
        }
        _ => None,
    }
}

/// ∫ x^n e^u dx = e^u Σ_{k=0..n} (-1)^k n!/(n-k)! x^(n-k) / a^(k+1), u = a*x + b
fn integrate_xn_times_exp(n: i32, a: f64, exp_u: Expr, var: &str) -> Expr {
    let x = Expr::Var(var.to_string());
    let mut falling = 1.0;
    let mut sum = Expr::Const(0.0);
    for k in 0..=n {
        if k > 0 {
            falling *= (n - k + 1) as f64;
        }
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        let coeff = sign * falling / a.powi(k + 1);
        sum += Expr::Const(coeff) * x.clone().pow(Expr::Const((n - k) as f64));
    }
    exp_u * sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(s: &str) -> Expr {
        Expr::parse_expression(s).unwrap()
    }

    /// the derivative of the antiderivative must give back the integrand
    fn check_antiderivative(s: &str, points: &[f64]) {
        let integrand = parse(s);
        let integral = integrand.integrate("x").unwrap();
        let back = integral.diff("x");
        for &x0 in points {
            assert_relative_eq!(
                back.eval("x", x0),
                integrand.eval("x", x0),
                epsilon = 1e-9,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn test_integrate_polynomial() {
        assert_eq!(parse("2*x - 2").integrate("x").unwrap().to_string(), "x^2 - 2*x");
        assert_eq!(parse("x").integrate("x").unwrap().to_string(), "x^2/2");
        assert_eq!(parse("3*x^2 + 1").integrate("x").unwrap().to_string(), "x^3 + x");
        assert_eq!(parse("5").integrate("x").unwrap().to_string(), "5*x");
    }

    #[test]
    fn test_integrate_one_over_x() {
        assert_eq!(parse("1/x").integrate("x").unwrap().to_string(), "ln(x)");
        check_antiderivative("3/(2*x + 1)", &[0.5, 2.0]);
    }

    #[test]
    fn test_integrate_functions_of_linear_argument() {
        assert_eq!(parse("exp(x)").integrate("x").unwrap().to_string(), "exp(x)");
        assert_eq!(parse("sin(x)").integrate("x").unwrap().to_string(), "-cos(x)");
        check_antiderivative("exp(2*x + 1) + cos(3*x) - 4*sin(x/2)", &[0.1, 0.8, -1.3]);
        check_antiderivative("tan(x) + tanh(2*x)", &[0.2, -0.6]);
        check_antiderivative("ln(x) + ln(2*x + 3)", &[0.5, 1.5]);
        check_antiderivative("2^x + (3*x - 1)^3", &[0.5, 1.5]);
    }

    #[test]
    fn test_integrate_by_parts() {
        check_antiderivative("x^2*exp(-x)", &[0.0, 1.0, 2.0]);
        check_antiderivative("x*exp(3*x + 1)", &[0.0, 0.5]);
        check_antiderivative("x^2*ln(x)", &[0.5, 2.0]);
        check_antiderivative("ln(x)/x", &[0.5, 2.0]);
        check_antiderivative("arcsin(x) + arccos(x) + arctg(x) + arctanh(x)", &[0.1, 0.6]);
    }

    #[test]
    fn test_integrate_log_derivative() {
        check_antiderivative("2*x/(x^2 + 1)", &[0.0, 1.0, -2.0]);
    }

    #[test]
    fn test_integrate_failure() {
        let result = parse("sin(x^2)").integrate("x");
        assert!(matches!(result, Err(SymbolicError::CannotIntegrate(_))));
        let result = parse("exp(x)*sin(x)").integrate("x");
        assert!(matches!(result, Err(SymbolicError::CannotIntegrate(_))));
    }
}
