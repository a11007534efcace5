#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```rust, ignore
/// use RustedDragSolve::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("2x + 3 - 5").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
///  ```
/// ____________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) defines the expression tree and the equation type
/// 2) turns a symbolic expression into a string expression for printing and control results
///# Example#
/// ```rust, ignore
/// use RustedDragSolve::symbolic::symbolic_engine::{Equation, Expr};
/// let expr = Expr::parse_expression("2*x + 3 - 5").unwrap().simplify();
/// let equation = Equation::equals_zero(expr);
/// println!("{}", equation); // 2*x - 2 = 0
/// let df_dx = equation.lhs.diff("x").simplify();
/// println!("df_dx = {}", df_dx); // 2
/// let roots = equation.solve("x").unwrap();
/// println!("x = {:?}", roots); // [Const(1.0)]
/// ```
pub mod symbolic_engine;
/// differentiation and numerical evaluation of expressions
pub mod symbolic_engine_derivatives;
/// error type of the symbolic layer
pub mod symbolic_error;
/// indefinite integrals of elementary expressions
pub mod symbolic_integration;
/// canonical simplification, ordered terms and coefficient extraction
pub mod symbolic_simplify;
/// real roots of single-unknown equations
pub mod symbolic_solve;
/// bracket utilities for the parser
pub mod utils;
