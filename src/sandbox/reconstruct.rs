//! Rebuilds `expression = 0` from where the tokens currently are.
use crate::sandbox::token::{GroupId, Role, Token, TokenStore};
use crate::sandbox::variant::Variant;
use crate::symbolic::symbolic_engine::{Equation, Expr};
use log::trace;
use std::collections::HashSet;

/// Sums the signed contributions of all tokens into `lhs = 0`.
///
/// A coefficient/remainder pair on one side contributes `c*r`; split across the
/// sides it contributes `r/c`, or the inverse function of an inverted remainder in
/// the function-aware variant. The sign is taken from the remainder's side. Groups
/// of any other shape fall back to the tokens' own signed values.
pub fn reconstruct(store: &TokenStore, variant: Variant) -> Equation {
    let inverts = variant.inverts_functions();
    let mut total = Expr::Const(0.0);
    let mut visited: HashSet<GroupId> = HashSet::new();

    for token in store.iter() {
        match token.group {
            Some(group) => {
                if !visited.insert(group) {
                    continue;
                }
                let members = store.group_members(group);
                match coefficient_pair(&members) {
                    Some((coeff, rest)) => total += pair_contribution(coeff, rest, inverts),
                    None => {
                        for member in members {
                            total += member.contribution(inverts);
                        }
                    }
                }
            }
            None => total += token.contribution(inverts),
        }
    }

    let lhs = total.simplify();
    trace!("reconstructed {} from {} tokens", lhs, store.len());
    Equation::equals_zero(lhs)
}

/// `(coeff, rest)` when the group is exactly one coefficient and one other token
fn coefficient_pair<'a>(members: &[&'a Token]) -> Option<(&'a Token, &'a Token)> {
    match members {
        [a, b] if a.role == Role::Coeff && b.role != Role::Coeff => Some((*a, *b)),
        [a, b] if b.role == Role::Coeff && a.role != Role::Coeff => Some((*b, *a)),
        _ => None,
    }
}

fn pair_contribution(coeff: &Token, rest: &Token, inverts: bool) -> Expr {
    let value = if coeff.side == rest.side {
        coeff.value.clone() * rest.value.clone()
    } else {
        match rest.inverted_value().filter(|_| inverts && rest.inverted) {
            Some(inverse) => inverse,
            None => rest.value.clone() / coeff.value.clone(),
        }
    };
    rest.side.apply(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::decompose::decompose;
    use crate::sandbox::layout::Layout;
    use crate::sandbox::token::{FunctionTag, Side, TokenId};

    fn store_of(input: &str, variant: Variant) -> TokenStore {
        let expr = Expr::parse_expression(input).unwrap();
        decompose(&expr, "x", variant, &Layout::for_variant(variant))
    }

    fn place(store: &mut TokenStore, id: usize, side: Side) {
        let token = store.get_mut(TokenId(id)).unwrap();
        token.side = side;
        if token.function.is_some() {
            token.inverted = side == Side::Rhs;
        }
    }

    #[test]
    fn test_all_left_reproduces_expression() {
        for variant in [Variant::Whole, Variant::Split, Variant::Functions] {
            let store = store_of("2*x + 3 - 5", variant);
            assert_eq!(reconstruct(&store, variant).to_string(), "2*x - 2 = 0");
            let store = store_of("3*x^2 - 2*sin(x) + exp(x) - 4", variant);
            assert_eq!(
                reconstruct(&store, variant).lhs,
                Expr::parse_expression("3*x^2 - 2*sin(x) + exp(x) - 4").unwrap().simplify()
            );
        }
    }

    #[test]
    fn test_whole_side_flips_sign() {
        let mut store = store_of("2*x + 3 - 5", Variant::Whole);
        place(&mut store, 1, Side::Rhs);
        assert_eq!(reconstruct(&store, Variant::Whole).to_string(), "2*x + 2 = 0");
        place(&mut store, 0, Side::Rhs);
        assert_eq!(reconstruct(&store, Variant::Whole).to_string(), "-2*x + 2 = 0");
    }

    #[test]
    fn test_moving_everything_across_and_back() {
        for variant in [Variant::Whole, Variant::Split, Variant::Functions] {
            let mut store = store_of("x^2 - 3*x + sin(x) + 2", variant);
            let original = reconstruct(&store, variant);
            for id in 0..store.len() {
                place(&mut store, id, Side::Rhs);
            }
            let across = reconstruct(&store, variant);
            if variant == Variant::Whole {
                assert_eq!(across.lhs, (-original.lhs.clone()).simplify());
            }
            for id in 0..store.len() {
                place(&mut store, id, Side::Lhs);
            }
            assert_eq!(reconstruct(&store, variant), original);
        }
    }

    #[test]
    fn test_pair_on_same_side_multiplies() {
        let mut store = store_of("2*x + 3", Variant::Split);
        place(&mut store, 0, Side::Rhs);
        place(&mut store, 1, Side::Rhs);
        assert_eq!(reconstruct(&store, Variant::Split).to_string(), "-2*x + 3 = 0");
    }

    #[test]
    fn test_split_pair_divides() {
        let mut store = store_of("2*x + 3", Variant::Split);
        place(&mut store, 0, Side::Rhs);
        assert_eq!(reconstruct(&store, Variant::Split).to_string(), "x/2 + 3 = 0");
        place(&mut store, 0, Side::Lhs);
        place(&mut store, 1, Side::Rhs);
        assert_eq!(reconstruct(&store, Variant::Split).to_string(), "-x/2 + 3 = 0");
    }

    #[test]
    fn test_inverted_remainder_uses_inverse() {
        let mut store = store_of("2*sin(x)", Variant::Functions);
        assert_eq!(store.get(TokenId(1)).unwrap().function, Some(FunctionTag::Sin));
        place(&mut store, 1, Side::Rhs);
        assert_eq!(reconstruct(&store, Variant::Functions).to_string(), "-arcsin(x) = 0");
        // without inversion the same placement divides
        let mut store = store_of("2*sin(x)", Variant::Split);
        place(&mut store, 1, Side::Rhs);
        assert_eq!(reconstruct(&store, Variant::Split).to_string(), "-sin(x)/2 = 0");
    }

    #[test]
    fn test_func_token_inverts_on_right() {
        let mut store = store_of("exp(x) - 5", Variant::Functions);
        let func = store.iter().find(|t| t.role == Role::Func).unwrap().id;
        place(&mut store, func.0, Side::Rhs);
        assert_eq!(reconstruct(&store, Variant::Functions).to_string(), "-ln(x) - 5 = 0");
    }

    #[test]
    fn test_func_token_keeps_its_sign() {
        let mut store = store_of("-cos(x)", Variant::Functions);
        place(&mut store, 0, Side::Rhs);
        assert_eq!(reconstruct(&store, Variant::Functions).to_string(), "arccos(x) = 0");
    }

    #[test]
    fn test_degenerate_group_falls_back_to_tokens() {
        let mut store = TokenStore::new();
        let group = Some(GroupId(0));
        store.push(group, Role::Coeff, "2", Expr::Const(2.0), (0.0, 0.0), None);
        store.push(group, Role::Coeff, "3", Expr::Const(3.0), (0.0, 0.0), None);
        store.push(group, Role::Rest, "x", Expr::var("x"), (0.0, 0.0), None);
        place(&mut store, 1, Side::Rhs);
        assert_eq!(reconstruct(&store, Variant::Split).to_string(), "x - 1 = 0");
    }
}
