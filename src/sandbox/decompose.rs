//! Turns an expression into the initial set of tokens, all on the left-hand side.
use crate::sandbox::layout::Layout;
use crate::sandbox::token::{FunctionTag, GroupId, Role, TokenStore};
use crate::sandbox::variant::Variant;
use crate::symbolic::symbolic_engine::{Expr, format_number};
use log::debug;

/// Builds the token store of `expr` for the given variant.
///
/// The expression is simplified first, so `2*x + 3 - 5` yields the tokens of `2*x - 2`.
/// In the splitting variants every term consumes one group id, whether it ends up
/// grouped or not, and the slot of a term is its group number.
pub fn decompose(expr: &Expr, var: &str, variant: Variant, layout: &Layout) -> TokenStore {
    let mut store = TokenStore::new();
    let terms = expr.ordered_terms();
    debug!("decomposing {} into {} terms ({} variant)", expr, terms.len(), variant);

    for (slot, term) in terms.into_iter().enumerate() {
        let position = layout.slot_position(slot);
        if !variant.splits_coefficients() {
            store.push(None, Role::Single, term.to_string(), term, position, None);
            continue;
        }

        let group = GroupId(slot);
        let (coeff, rest) = term.as_coeff_mul();
        let is_product = matches!(term, Expr::Mul(..));
        let unit_function = FunctionTag::recognize(&term)
            .filter(|(_, c, _)| variant.inverts_functions() && (*c == 1.0 || *c == -1.0))
            .map(|(tag, _, _)| tag);

        if is_product && term.contains_variable(var) && coeff != 1.0 && coeff != -1.0 {
            let tag = if variant.inverts_functions() {
                FunctionTag::of(&rest).map(|(tag, _)| tag)
            } else {
                None
            };
            store.push(
                Some(group),
                Role::Coeff,
                format_number(coeff),
                Expr::Const(coeff),
                position,
                None,
            );
            store.push(
                Some(group),
                Role::Rest,
                rest.to_string(),
                rest,
                layout.rest_position(slot),
                tag,
            );
        } else if let Some(tag) = unit_function {
            store.push(Some(group), Role::Func, term.to_string(), term, position, Some(tag));
        } else {
            store.push(None, Role::Single, term.to_string(), term, position, None);
        }
    }

    for token in store.iter() {
        debug!(
            "token {} {} '{}' group {:?} at {:?}",
            token.id, token.role, token.label, token.group, token.position
        );
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::token::Side;

    fn tokens(input: &str, variant: Variant) -> TokenStore {
        let expr = Expr::parse_expression(input).unwrap();
        decompose(&expr, "x", variant, &Layout::for_variant(variant))
    }

    fn labels(store: &TokenStore) -> Vec<String> {
        store.iter().map(|t| t.label.clone()).collect()
    }

    #[test]
    fn test_whole_terms_are_single_tokens() {
        let store = tokens("2*x + 3 - 5", Variant::Whole);
        assert_eq!(labels(&store), vec!["2*x", "-2"]);
        let positions: Vec<(f32, f32)> = store.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![(200.0, 200.0), (350.0, 200.0)]);
        assert!(store.iter().all(|t| t.role == Role::Single && t.group.is_none()));
        assert!(store.iter().all(|t| t.side == Side::Lhs && !t.inverted));
    }

    #[test]
    fn test_whole_keeps_duplicate_renderings_apart() {
        let store = tokens("x^2 + x + 1", Variant::Whole);
        assert_eq!(store.len(), 3);
        let ids: Vec<usize> = store.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_split_coefficient_and_rest() {
        let store = tokens("3*x^2 - x + 4", Variant::Split);
        assert_eq!(labels(&store), vec!["3", "x^2", "-x", "4"]);
        let coeff = store.get(crate::sandbox::token::TokenId(0)).unwrap();
        let rest = store.get(crate::sandbox::token::TokenId(1)).unwrap();
        assert_eq!((coeff.role, rest.role), (Role::Coeff, Role::Rest));
        assert_eq!(coeff.group, Some(GroupId(0)));
        assert_eq!(rest.group, Some(GroupId(0)));
        assert_eq!(coeff.value, Expr::Const(3.0));
        assert_eq!(coeff.position, (150.0, 200.0));
        assert_eq!(rest.position, (210.0, 200.0));
        // the group counter advances for ungrouped terms too
        let constant = store.iter().last().unwrap();
        assert_eq!(constant.group, None);
        assert_eq!(constant.position, (450.0, 200.0));
    }

    #[test]
    fn test_split_does_not_tag_functions() {
        let store = tokens("2*sin(x) + cos(x)", Variant::Split);
        assert!(store.iter().all(|t| t.function.is_none()));
        assert!(store.iter().all(|t| t.role != Role::Func));
    }

    #[test]
    fn test_functions_variant_tags() {
        let store = tokens("2*sin(x) - cos(x) + exp(x) + ln(x)", Variant::Functions);
        let summary: Vec<(String, Role, Option<FunctionTag>)> = store
            .iter()
            .map(|t| (t.label.clone(), t.role, t.function))
            .collect();
        assert!(summary.contains(&("2".to_string(), Role::Coeff, None)));
        assert!(summary.contains(&("sin(x)".to_string(), Role::Rest, Some(FunctionTag::Sin))));
        assert!(summary.contains(&("-cos(x)".to_string(), Role::Func, Some(FunctionTag::Cos))));
        assert!(summary.contains(&("exp(x)".to_string(), Role::Func, Some(FunctionTag::Exp))));
        assert!(summary.contains(&("ln(x)".to_string(), Role::Single, None)));
        let func = store.iter().find(|t| t.role == Role::Func).unwrap();
        assert_eq!(store.group_members(func.group.unwrap()).len(), 1);
    }

    #[test]
    fn test_constant_multiple_without_variable_is_single() {
        let store = tokens("2*y + x", Variant::Split);
        assert!(store.iter().all(|t| t.role == Role::Single));
    }
}
