// the collection of utility functions mainly for bracket parsing and proceeding
// all inputs are normalized ASCII strings, so byte indices and char indices coincide

/// true when every '(' has its ')' and no ')' comes before its '('
pub fn brackets_balanced(s: &str) -> bool {
    let mut depth: i64 = 0;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

// function to find the rightmost occurrence of operators at the same precedence level,
// which makes binary operators of that level left associative
pub fn find_rightmost_operator_outside_brackets(
    input: &str,
    operators: &[char],
) -> Option<(usize, char)> {
    let mut bracket_depth = 0;
    let mut last_op = None;

    for (i, c) in input.char_indices() {
        match c {
            '(' => bracket_depth += 1,
            ')' => bracket_depth -= 1,
            _ if bracket_depth == 0 && operators.contains(&c) => {
                last_op = Some((i, c));
            }
            _ => {}
        }
    }
    last_op
}

// find position of the first given char outside brackets (used for right associative '^')
pub fn find_char_position_outside_brackets(s: &str, target: char) -> Option<usize> {
    let mut depth = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if ch == target && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

// code finds the position of the bracket closing the one opened at bracket_start
pub fn find_pair_to_this_bracket(input: &str, bracket_start: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, c) in input.char_indices().skip_while(|(i, _)| *i < bracket_start) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// "(a+b)" -> true, "(a)+(b)" -> false
pub fn is_wrapped_in_brackets(s: &str) -> bool {
    s.starts_with('(') && find_pair_to_this_bracket(s, 0) == Some(s.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brackets_balanced() {
        assert!(brackets_balanced("(x+(y*2))"));
        assert!(!brackets_balanced("(x+1"));
        assert!(!brackets_balanced(")x("));
    }

    #[test]
    fn test_rightmost_operator() {
        assert_eq!(
            find_rightmost_operator_outside_brackets("a-b+(c-d)", &['+', '-']),
            Some((3, '+'))
        );
        assert_eq!(find_rightmost_operator_outside_brackets("(a+b)", &['+']), None);
    }

    #[test]
    fn test_pair_bracket() {
        assert_eq!(find_pair_to_this_bracket("(a+(b))*c", 0), Some(6));
        assert_eq!(find_pair_to_this_bracket("(a+(b))*c", 3), Some(5));
        assert!(is_wrapped_in_brackets("(a+(b))"));
        assert!(!is_wrapped_in_brackets("(a)+(b)"));
        assert_eq!(find_char_position_outside_brackets("(x^2)^y^z", '^'), Some(5));
    }
}
