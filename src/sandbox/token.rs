//! Draggable tokens and the store that owns them.
//!
//! Tokens are created once by the decomposer and never deleted; interaction only
//! changes their position, side and inversion flag. Identity is the `TokenId`, so
//! two terms that render the same never collide.
use crate::sandbox::layout::HitBox;
use crate::symbolic::symbolic_engine::Expr;
use std::fmt;
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    #[default]
    Lhs,
    Rhs,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Lhs => Side::Rhs,
            Side::Rhs => Side::Lhs,
        }
    }

    /// `expr` as a contribution of this side: unchanged on the left, negated on the right
    pub fn apply(&self, expr: Expr) -> Expr {
        match self {
            Side::Lhs => expr,
            Side::Rhs => -expr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// a whole term
    Single,
    /// numeric coefficient of a split term
    Coeff,
    /// what is left of a split term after removing the coefficient
    Rest,
    /// a unit-coefficient function term
    Func,
}

/// Functions that may be inverted by dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum FunctionTag {
    Sin,
    Cos,
    Tan,
    Exp,
    Tanh,
}

impl FunctionTag {
    /// `f(arg)` for a recognized `f`
    pub fn of(expr: &Expr) -> Option<(FunctionTag, &Expr)> {
        match expr {
            Expr::sin(arg) => Some((FunctionTag::Sin, arg)),
            Expr::cos(arg) => Some((FunctionTag::Cos, arg)),
            Expr::tg(arg) => Some((FunctionTag::Tan, arg)),
            Expr::Exp(arg) => Some((FunctionTag::Exp, arg)),
            Expr::tanh(arg) => Some((FunctionTag::Tanh, arg)),
            _ => None,
        }
    }

    /// Accepts `f(arg)` and `c*f(arg)`, returning the tag, the coefficient and the argument.
    pub fn recognize(expr: &Expr) -> Option<(FunctionTag, f64, &Expr)> {
        match expr {
            Expr::Mul(lhs, rhs) => match lhs.as_ref() {
                Expr::Const(c) => FunctionTag::of(rhs).map(|(tag, arg)| (tag, *c, arg)),
                _ => None,
            },
            _ => FunctionTag::of(expr).map(|(tag, arg)| (tag, 1.0, arg)),
        }
    }

    pub fn inverse(&self, arg: Expr) -> Expr {
        let arg = Box::new(arg);
        match self {
            FunctionTag::Sin => Expr::arcsin(arg),
            FunctionTag::Cos => Expr::arccos(arg),
            FunctionTag::Tan => Expr::arctg(arg),
            FunctionTag::Exp => Expr::Ln(arg),
            FunctionTag::Tanh => Expr::arctanh(arg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub id: TokenId,
    pub group: Option<GroupId>,
    pub role: Role,
    pub label: String,
    pub value: Expr,
    pub position: (f32, f32),
    pub side: Side,
    pub inverted: bool,
    pub function: Option<FunctionTag>,
}

impl Token {
    /// The value with its recognized function replaced by the inverse, keeping the
    /// coefficient: `-sin(x)` gives `-arcsin(x)`. `None` when the token carries no function.
    pub fn inverted_value(&self) -> Option<Expr> {
        let (tag, coeff, arg) = FunctionTag::recognize(&self.value)?;
        let inverse = tag.inverse(arg.clone());
        Some(if coeff == 1.0 {
            inverse
        } else {
            Expr::Const(coeff) * inverse
        })
    }

    /// What the token contributes before the sign of its side is applied.
    pub fn effective_value(&self, inverts_functions: bool) -> Expr {
        if inverts_functions && self.role == Role::Func && self.inverted {
            if let Some(value) = self.inverted_value() {
                return value;
            }
        }
        self.value.clone()
    }

    pub fn contribution(&self, inverts_functions: bool) -> Expr {
        self.side.apply(self.effective_value(inverts_functions))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStore {
    tokens: Vec<Token>,
}

impl TokenStore {
    pub fn new() -> Self {
        TokenStore { tokens: Vec::new() }
    }

    /// Adds a token on the left-hand side, not inverted, and returns its id.
    pub fn push(
        &mut self,
        group: Option<GroupId>,
        role: Role,
        label: impl Into<String>,
        value: Expr,
        position: (f32, f32),
        function: Option<FunctionTag>,
    ) -> TokenId {
        let id = TokenId(self.tokens.len());
        self.tokens.push(Token {
            id,
            group,
            role,
            label: label.into(),
            value,
            position,
            side: Side::Lhs,
            inverted: false,
            function,
        });
        id
    }

    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id.0)
    }

    pub fn get_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.tokens.get_mut(id.0)
    }

    /// Tokens in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn group_members(&self, group: GroupId) -> Vec<&Token> {
        self.tokens
            .iter()
            .filter(|token| token.group == Some(group))
            .collect()
    }

    /// First token, in creation order, whose hit box contains `point`
    pub fn hit_test(&self, point: (f32, f32), hit_box: &HitBox) -> Option<TokenId> {
        self.tokens
            .iter()
            .find(|token| hit_box.contains(token.position, point))
            .map(|token| token.id)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn parse(s: &str) -> Expr {
        Expr::parse_expression(s).unwrap()
    }

    #[test]
    fn test_side_helpers() {
        assert_eq!(Side::Rhs.opposite(), Side::Lhs);
        assert_eq!(Side::Lhs.apply(parse("x")), parse("x"));
        assert_eq!(Side::Rhs.to_string(), "rhs");
        assert_eq!(Side::Rhs.apply(parse("x")).simplify().to_string(), "-x");
    }

    #[test]
    fn test_recognize_functions() {
        let expr = parse("sin(2*x)");
        let (tag, coeff, arg) = FunctionTag::recognize(&expr).unwrap();
        assert_eq!(tag, FunctionTag::Sin);
        assert_eq!(coeff, 1.0);
        assert_eq!(arg.to_string(), "2*x");

        let expr = parse("3*exp(x)");
        let (tag, coeff, _) = FunctionTag::recognize(&expr).unwrap();
        assert_eq!((tag, coeff), (FunctionTag::Exp, 3.0));

        assert!(FunctionTag::recognize(&parse("ln(x)")).is_none());
        assert!(FunctionTag::recognize(&parse("x^2")).is_none());
    }

    #[test]
    fn test_inverse_table() {
        let x = Expr::var("x");
        let names: Vec<String> = FunctionTag::iter()
            .map(|tag| tag.inverse(x.clone()).to_string())
            .collect();
        assert_eq!(names, vec!["arcsin(x)", "arccos(x)", "arctg(x)", "ln(x)", "arctanh(x)"]);
        let written = ["sin(x)", "cos(x)", "tan(x)", "exp(x)", "tanh(x)"];
        for (tag, text) in FunctionTag::iter().zip(written) {
            assert_eq!(FunctionTag::of(&parse(text)).map(|(t, _)| t), Some(tag));
        }
    }

    #[test]
    fn test_effective_value_of_inverted_function() {
        let mut store = TokenStore::new();
        let id = store.push(
            Some(GroupId(0)),
            Role::Func,
            "-sin(x)",
            parse("-sin(x)").simplify(),
            (150.0, 200.0),
            Some(FunctionTag::Sin),
        );
        let token = store.get_mut(id).unwrap();
        assert_eq!(token.effective_value(true).to_string(), "-sin(x)");
        token.inverted = true;
        token.side = Side::Rhs;
        assert_eq!(token.effective_value(true).to_string(), "-arcsin(x)");
        assert_eq!(token.effective_value(false).to_string(), "-sin(x)");
        assert_eq!(token.contribution(true).simplify().to_string(), "arcsin(x)");
    }

    #[test]
    fn test_store_identity_and_hit_test() {
        let mut store = TokenStore::new();
        let a = store.push(None, Role::Single, "x", Expr::var("x"), (200.0, 200.0), None);
        let b = store.push(None, Role::Single, "x", Expr::var("x"), (350.0, 200.0), None);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        let hit = HitBox::default();
        assert_eq!(store.hit_test((360.0, 210.0), &hit), Some(b));
        assert_eq!(store.hit_test((200.0, 400.0), &hit), None);
        // overlapping boxes resolve to the earliest token
        assert_eq!(store.hit_test((290.0, 210.0), &hit), Some(a));
        assert!(store.group_members(GroupId(0)).is_empty());
    }
}
