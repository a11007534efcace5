use crate::sandbox::controller::Command;
use strum_macros::{Display, EnumIter, EnumString};

/// Behaviour of the sandbox.
///
/// - `Whole`: every additive term is one token, moving it across flips its sign
/// - `Split`: a term `c*r` with `c != ±1` becomes a coefficient token and a remainder token
/// - `Functions`: as `Split`, plus sin/cos/tan/exp/tanh tokens that turn into their inverse
///   on the RHS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Variant {
    Whole,
    #[default]
    Split,
    Functions,
}

impl Variant {
    /// terms with a non-unit coefficient are split in two tokens
    pub fn splits_coefficients(&self) -> bool {
        !matches!(self, Variant::Whole)
    }

    /// function tokens are replaced by their inverse on the right-hand side
    pub fn inverts_functions(&self) -> bool {
        matches!(self, Variant::Functions)
    }

    /// symbolic failures are recorded in history instead of ending the session
    pub fn recovers_errors(&self) -> bool {
        matches!(self, Variant::Functions)
    }

    pub fn supports(&self, command: Command) -> bool {
        match command {
            Command::Solve => true,
            Command::Integrate | Command::Differentiate => matches!(self, Variant::Functions),
        }
    }

    pub fn updated_entry(&self, equation: &str) -> String {
        match self {
            Variant::Whole | Variant::Split => format!("Updated equation: {}", equation),
            Variant::Functions => format!("Updated eq: {}", equation),
        }
    }

    pub fn solved_entry(&self, equation: &str, var: &str, solution: &str) -> String {
        match self {
            Variant::Whole => {
                format!("Solving for {}: {} -> {} = {}", var, equation, var, solution)
            }
            Variant::Split => format!("Solved equation: {} -> {} = {}", equation, var, solution),
            Variant::Functions => format!("Solved eq: {} -> {} = {}", equation, var, solution),
        }
    }
}
