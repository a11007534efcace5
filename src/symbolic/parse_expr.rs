use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_error::SymbolicError;
use crate::symbolic::utils::{
    brackets_balanced, find_char_position_outside_brackets, find_pair_to_this_bracket,
    find_rightmost_operator_outside_brackets, is_wrapped_in_brackets,
};
use log::trace;
use regex::Regex;
use std::sync::LazyLock;
/// a module turns a String expression into a symbolic expression
///# Example
/// ```rust, ignore
/// use RustedDragSolve::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("2x + 3 - 5").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// ```
//                  search recursion diagram
//                "y^2+exp(x)-x/2"                  |
//                |       left  | right             |
//                |_________________________________|
//                |     rightmost  + or -           |
//                |_________________________________|
//                | y^2+exp(x)  |      x/2          |
//                |       |     |          |        |
//                |_____ \|/    |          |        |
//                |     rightmost  + or -  |        |
//                |_________________________________|
//                |   y^2 | exp(x)         |        |
//                |_______|________________|________|
//                |  leftmost ^ |   rightmost * or /|
//                |   y   |  2  |    x     |   2    |
//                |_______Ok____|__________Ok_______|
//
// before splitting, the input is normalized: whitespace is removed, '**' becomes '^',
// implicit products get an explicit '*' and unary minus is rewritten as '~'

/// number, identifier or single character operator/bracket
static LEXEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?|[A-Za-z_][A-Za-z_0-9]*|\*\*|[-+*/^()]|\s+")
        .expect("lexeme regex is valid")
});
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("number regex is valid")
});
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z_0-9]*$").expect("identifier regex is valid"));

const UNARY_MINUS: char = '~';

/// names accepted in front of a bracket, in the spelling used by the user
const FUNCTION_NAMES: [&str; 17] = [
    "exp", "ln", "log", "sin", "cos", "tan", "tg", "tanh", "asin", "arcsin", "acos", "arccos",
    "atan", "arctg", "arctan", "atanh", "arctanh",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lexeme {
    Number,
    Identifier,
    Function,
    Operator,
    Open,
    Close,
}

fn classify(text: &str) -> Lexeme {
    match text {
        "(" => Lexeme::Open,
        ")" => Lexeme::Close,
        "+" | "-" | "*" | "/" | "^" => Lexeme::Operator,
        _ if NUMBER.is_match(text) => Lexeme::Number,
        _ if FUNCTION_NAMES.contains(&text) => Lexeme::Function,
        _ => Lexeme::Identifier,
    }
}

/// Removes whitespace, replaces `**` by `^`, inserts implicit multiplication signs and
/// marks unary minus with `~`. Unknown characters and unbalanced brackets are rejected here.
pub fn normalize(input: &str) -> Result<String, SymbolicError> {
    if !brackets_balanced(input) {
        return Err(SymbolicError::parse(input, "unbalanced brackets"));
    }
    let mut lexemes: Vec<(String, Lexeme)> = Vec::new();
    let mut cursor = 0;
    for found in LEXEME.find_iter(input) {
        if found.start() != cursor {
            let bad = &input[cursor..found.start()];
            return Err(SymbolicError::parse(input, format!("unexpected character '{}'", bad)));
        }
        cursor = found.end();
        let text = found.as_str();
        if text.trim().is_empty() {
            continue;
        }
        let text = if text == "**" { "^" } else { text };
        let kind = classify(text);
        // exponents are written out so their sign is never taken for an operator
        let text = if kind == Lexeme::Number && text.contains(['e', 'E']) {
            let value: f64 = text.parse().map_err(|_| {
                SymbolicError::parse(input, format!("invalid number '{}'", text))
            })?;
            value.to_string()
        } else {
            text.to_string()
        };
        lexemes.push((text, kind));
    }
    if cursor != input.len() {
        let bad = &input[cursor..];
        return Err(SymbolicError::parse(input, format!("unexpected character '{}'", bad)));
    }

    let mut out = String::with_capacity(input.len() * 2);
    let mut prev: Option<Lexeme> = None;
    for (i, (text, kind)) in lexemes.iter().enumerate() {
        let next = lexemes.get(i + 1).map(|(_, k)| *k);
        match kind {
            Lexeme::Function if next != Some(Lexeme::Open) => {
                return Err(SymbolicError::parse(
                    input,
                    format!("function '{}' needs an argument in brackets", text),
                ));
            }
            Lexeme::Identifier if next == Some(Lexeme::Open) => {
                return Err(SymbolicError::parse(input, format!("unknown function '{}'", text)));
            }
            _ => {}
        }
        let operand_ended = matches!(
            prev,
            Some(Lexeme::Number) | Some(Lexeme::Identifier) | Some(Lexeme::Close)
        );
        let operand_starts = matches!(
            kind,
            Lexeme::Number | Lexeme::Identifier | Lexeme::Function | Lexeme::Open
        );
        if operand_ended && operand_starts {
            out.push('*');
        }
        let unary_position = matches!(prev, None | Some(Lexeme::Operator) | Some(Lexeme::Open));
        match (*kind, text.as_str()) {
            (Lexeme::Operator, "-") if unary_position => out.push(UNARY_MINUS),
            // unary plus changes nothing
            (Lexeme::Operator, "+") if unary_position => {}
            _ => out.push_str(text),
        }
        // '~' and a dropped '+' keep the parser in "expecting operand" state
        prev = Some(*kind);
    }
    trace!("normalized '{}' into '{}'", input, out);
    Ok(out)
}

fn function_from_name(name: &str, arg: Expr) -> Option<Expr> {
    let arg = Box::new(arg);
    let expr = match name {
        "exp" => Expr::Exp(arg),
        "ln" | "log" => Expr::Ln(arg),
        "sin" => Expr::sin(arg),
        "cos" => Expr::cos(arg),
        "tan" | "tg" => Expr::tg(arg),
        "tanh" => Expr::tanh(arg),
        "asin" | "arcsin" => Expr::arcsin(arg),
        "acos" | "arccos" => Expr::arccos(arg),
        "atan" | "arctg" | "arctan" => Expr::arctg(arg),
        "atanh" | "arctanh" => Expr::arctanh(arg),
        _ => return None,
    };
    Some(expr)
}

/// Recursive splitter over a normalized string. `source` is the user input kept for messages.
fn parse_normalized(input: &str, source: &str) -> Result<Expr, SymbolicError> {
    trace!("parsing '{}'", input);
    if input.is_empty() {
        return Err(SymbolicError::parse(source, "missing operand"));
    }
    // sums and differences, left associative
    if let Some((pos, op)) = find_rightmost_operator_outside_brackets(input, &['+', '-']) {
        let left = parse_normalized(&input[..pos], source)?;
        let right = parse_normalized(&input[pos + 1..], source)?;
        return Ok(match op {
            '+' => Expr::Add(Box::new(left), Box::new(right)),
            _ => Expr::Sub(Box::new(left), Box::new(right)),
        });
    }
    // products and quotients, left associative
    if let Some((pos, op)) = find_rightmost_operator_outside_brackets(input, &['*', '/']) {
        let left = parse_normalized(&input[..pos], source)?;
        let right = parse_normalized(&input[pos + 1..], source)?;
        return Ok(match op {
            '*' => Expr::Mul(Box::new(left), Box::new(right)),
            _ => Expr::Div(Box::new(left), Box::new(right)),
        });
    }
    // unary minus binds weaker than '^': -x^2 = -(x^2)
    if let Some(rest) = input.strip_prefix(UNARY_MINUS) {
        return Ok(match parse_normalized(rest, source)? {
            Expr::Const(val) => Expr::Const(-val),
            inner => -inner,
        });
    }
    // powers, right associative
    if let Some(pos) = find_char_position_outside_brackets(input, '^') {
        let base = parse_normalized(&input[..pos], source)?;
        let exponent = parse_normalized(&input[pos + 1..], source)?;
        return Ok(Expr::Pow(Box::new(base), Box::new(exponent)));
    }
    if is_wrapped_in_brackets(input) {
        return parse_normalized(&input[1..input.len() - 1], source);
    }
    // function call: name(...) with the matching bracket at the very end
    if let Some(open) = input.find('(') {
        let name = &input[..open];
        if find_pair_to_this_bracket(input, open) == Some(input.len() - 1) {
            let arg = parse_normalized(&input[open + 1..input.len() - 1], source)?;
            return function_from_name(name, arg).ok_or_else(|| {
                SymbolicError::parse(source, format!("unknown function '{}'", name))
            });
        }
        return Err(SymbolicError::parse(source, format!("cannot interpret '{}'", input)));
    }
    if NUMBER.is_match(input) {
        return input
            .parse::<f64>()
            .map(Expr::Const)
            .map_err(|e| SymbolicError::parse(source, e.to_string()));
    }
    if IDENTIFIER.is_match(input) {
        if input == "pi" {
            return Ok(Expr::Const(std::f64::consts::PI));
        }
        return Ok(Expr::Var(input.to_string()));
    }
    Err(SymbolicError::parse(source, format!("cannot interpret '{}'", input)))
}

/// Parses a string into an expression tree without simplifying it.
pub fn parse_expression_func(input: &str) -> Result<Expr, SymbolicError> {
    if input.trim().is_empty() {
        return Err(SymbolicError::parse(input, "empty expression"));
    }
    let normalized = normalize(input)?;
    parse_normalized(&normalized, input)
}

impl Expr {
    /// Parses a string into an expression tree without simplifying it.
    pub fn parse_expression(input: &str) -> Result<Expr, SymbolicError> {
        parse_expression_func(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Expr {
        Expr::parse_expression(s).unwrap()
    }

    fn x() -> Box<Expr> {
        Box::new(Expr::Var("x".to_string()))
    }

    #[test]
    fn test_parse_sum_is_left_associative() {
        let expected = Expr::Sub(
            Box::new(Expr::Add(
                Box::new(Expr::Mul(Box::new(Expr::Const(2.0)), x())),
                Box::new(Expr::Const(3.0)),
            )),
            Box::new(Expr::Const(5.0)),
        );
        assert_eq!(parse("2*x + 3 - 5"), expected);
    }

    #[test]
    fn test_parse_division_is_left_associative() {
        let expected = Expr::Div(
            Box::new(Expr::Div(Box::new(Expr::Const(8.0)), Box::new(Expr::Const(4.0)))),
            Box::new(Expr::Const(2.0)),
        );
        assert_eq!(parse("8/4/2"), expected);
    }

    #[test]
    fn test_parse_power_is_right_associative() {
        let expected = Expr::Pow(
            x(),
            Box::new(Expr::Pow(Box::new(Expr::Const(2.0)), Box::new(Expr::Const(3.0)))),
        );
        assert_eq!(parse("x^2^3"), expected);
        assert_eq!(parse("x**2**3"), expected);
    }

    #[test]
    fn test_parse_unary_minus() {
        assert_eq!(parse("-3"), Expr::Const(-3.0));
        assert_eq!(
            parse("-x^2"),
            Expr::Mul(
                Box::new(Expr::Const(-1.0)),
                Box::new(Expr::Pow(x(), Box::new(Expr::Const(2.0))))
            )
        );
        assert_eq!(
            parse("2*-x"),
            Expr::Mul(
                Box::new(Expr::Const(2.0)),
                Box::new(Expr::Mul(Box::new(Expr::Const(-1.0)), x()))
            )
        );
        assert_eq!(
            parse("x - -1"),
            Expr::Sub(x(), Box::new(Expr::Const(-1.0)))
        );
    }

    #[test]
    fn test_parse_implicit_multiplication() {
        assert_eq!(parse("2x"), Expr::Mul(Box::new(Expr::Const(2.0)), x()));
        assert_eq!(normalize("3(x+1)(x-1)").unwrap(), "3*(x+1)*(x-1)");
        assert_eq!(normalize("2sin(x)").unwrap(), "2*sin(x)");
        assert_eq!(normalize("1.5e3x").unwrap(), "1500*x");
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(parse("sin(x)"), Expr::sin(x()));
        assert_eq!(parse("tan(x)"), Expr::tg(x()));
        assert_eq!(parse("log(x)"), Expr::Ln(x()));
        assert_eq!(parse("atanh(x)"), Expr::arctanh(x()));
        assert_eq!(
            parse("3*exp(2*x)"),
            Expr::Mul(
                Box::new(Expr::Const(3.0)),
                Box::new(Expr::Exp(Box::new(Expr::Mul(Box::new(Expr::Const(2.0)), x()))))
            )
        );
        assert_eq!(
            parse("sin(x)^2"),
            Expr::Pow(Box::new(Expr::sin(x())), Box::new(Expr::Const(2.0)))
        );
    }

    #[test]
    fn test_parse_scientific_notation() {
        assert_eq!(parse("2.5e-3"), Expr::Const(2.5e-3));
        assert_eq!(
            parse("1e+2*x - 1"),
            Expr::Sub(
                Box::new(Expr::Mul(Box::new(Expr::Const(100.0)), x())),
                Box::new(Expr::Const(1.0))
            )
        );
        assert_eq!(parse("3e-1x"), Expr::Mul(Box::new(Expr::Const(0.3)), x()));
        assert_eq!(parse("-2E+1"), Expr::Const(-20.0));
        // an identifier with digits and 'e' stays one name
        assert_eq!(
            parse("x2e-1"),
            Expr::Sub(Box::new(Expr::var("x2e")), Box::new(Expr::Const(1.0)))
        );
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "(x+1", "x+", "2*x $ 3", "foo(x)", "sin x", "*x"] {
            let result = Expr::parse_expression(bad);
            assert!(
                matches!(result, Err(SymbolicError::Parse { .. })),
                "{} should not parse, got {:?}",
                bad,
                result
            );
        }
    }
}
