/*
Pretty printing of the token layout and the history after a headless run.
*/
use crate::sandbox::controller::Sandbox;
use tabled::settings::Style;
use tabled::{Table, Tabled, builder::Builder};

#[derive(Debug, PartialEq, Tabled)]
pub struct TokenRow {
    id: usize,
    label: String,
    role: String,
    group: String,
    side: String,
    inverted: bool,
}

pub fn token_rows(sandbox: &Sandbox) -> Vec<TokenRow> {
    sandbox
        .store()
        .iter()
        .map(|token| TokenRow {
            id: token.id.0,
            label: token.label.clone(),
            role: token.role.to_string(),
            group: token
                .group
                .map(|g| g.to_string())
                .unwrap_or_else(|| "-".to_string()),
            side: token.side.to_string(),
            inverted: token.inverted,
        })
        .collect()
}

pub fn token_table(sandbox: &Sandbox) -> String {
    let mut table = Table::new(token_rows(sandbox));
    table.with(Style::modern_rounded());
    table.to_string()
}

/// Full history, numbered, plus the current equation and solution
pub fn summary_table(sandbox: &Sandbox) -> String {
    let mut rows: Vec<Vec<String>> = vec![vec!["#".to_string(), "entry".to_string()]];
    for (i, entry) in sandbox.history().entries().iter().enumerate() {
        rows.push(vec![(i + 1).to_string(), entry.clone()]);
    }
    rows.push(vec!["equation".to_string(), sandbox.equation().to_string()]);
    if let Some(solution) = sandbox.solution() {
        rows.push(vec![
            "solution".to_string(),
            format!("{} = {}", sandbox.var(), solution),
        ]);
    }
    let mut table = Builder::from(rows).build();
    table.with(Style::modern_rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::controller::{Command, SandboxEvent};
    use crate::sandbox::variant::Variant;

    #[test]
    fn test_token_rows() {
        let sandbox = Sandbox::from_input("2*x + 3 - 5", "x", Variant::Split, 5).unwrap();
        let rows = token_rows(&sandbox);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            TokenRow {
                id: 0,
                label: "2".to_string(),
                role: "coeff".to_string(),
                group: "0".to_string(),
                side: "lhs".to_string(),
                inverted: false,
            }
        );
        assert_eq!(rows[2].group, "-");
        let table = token_table(&sandbox);
        assert!(table.contains("label"));
        assert!(table.contains("coeff"));
    }

    #[test]
    fn test_summary_table() {
        let mut sandbox = Sandbox::from_input("2*x + 3 - 5", "x", Variant::Split, 5).unwrap();
        sandbox.handle(SandboxEvent::Key(Command::Solve)).unwrap();
        let table = summary_table(&sandbox);
        assert!(table.contains("Solved equation: 2*x - 2 = 0 -> x = [1]"));
        assert!(table.contains("x = [1]"));
        assert!(table.contains("2*x - 2 = 0"));
    }
}
