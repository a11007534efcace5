/// # Equation sandbox
/// Terms of an expression become draggable tokens on a canvas split into a left-hand side
/// and a right-hand side. Where the tokens lie defines the equation `sum = 0`, which can be
/// solved, differentiated or integrated.
///# Example
/// ```rust, ignore
/// use RustedDragSolve::sandbox::controller::{Command, Sandbox, SandboxEvent};
/// use RustedDragSolve::sandbox::token::{Side, TokenId};
/// use RustedDragSolve::sandbox::variant::Variant;
/// let mut sandbox = Sandbox::from_input("2*x + 3", "x", Variant::Split, 5).unwrap();
/// sandbox.move_token(TokenId(0), Side::Rhs).unwrap(); // x/2 + 3 = 0
/// sandbox.handle(SandboxEvent::Key(Command::Solve)).unwrap();
/// println!("{}", sandbox.solution().unwrap()); // [-6]
/// ```
pub mod controller;
/// expression -> tokens
pub mod decompose;
/// render-agnostic frame description
pub mod frame;
pub mod history;
/// canvas geometry per variant
pub mod layout;
/// tokens -> equation
pub mod reconstruct;
pub mod sandbox_error;
/// scripted interaction for headless runs
pub mod script;
pub mod token;
pub mod variant;
