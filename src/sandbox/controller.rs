//! State of one sandbox session and its reaction to pointer and key events.
use crate::sandbox::decompose::decompose;
use crate::sandbox::frame::{Frame, SideBox, TextItem, TokenSprite};
use crate::sandbox::history::History;
use crate::sandbox::layout::Layout;
use crate::sandbox::reconstruct::reconstruct;
use crate::sandbox::sandbox_error::SandboxError;
use crate::sandbox::token::{Side, TokenId, TokenStore};
use crate::sandbox::variant::Variant;
use crate::symbolic::symbolic_engine::{Equation, Expr};
use crate::symbolic::symbolic_error::SymbolicError;
use itertools::Itertools;
use log::{debug, info, warn};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// Symbolic action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Command {
    #[strum(to_string = "solve", serialize = "s")]
    Solve,
    #[strum(to_string = "integrate", serialize = "i")]
    Integrate,
    #[strum(to_string = "differentiate", serialize = "diff", serialize = "d")]
    Differentiate,
}

impl Command {
    pub fn from_key(key: char) -> Option<Command> {
        match key.to_ascii_lowercase() {
            's' => Some(Command::Solve),
            'i' => Some(Command::Integrate),
            'd' => Some(Command::Differentiate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SandboxEvent {
    PointerDown(f32, f32),
    PointerMove(f32, f32),
    PointerUp,
    Key(Command),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Result of the last command shown on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    Roots(Vec<Expr>),
    Expression(Expr),
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Solution::Roots(roots) => write!(f, "[{}]", roots.iter().join(", ")),
            Solution::Expression(expr) => write!(f, "{}", expr),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sandbox {
    variant: Variant,
    var: String,
    expression: Expr,
    layout: Layout,
    store: TokenStore,
    history: History,
    solution: Option<Solution>,
    dragging: Option<TokenId>,
}

impl Sandbox {
    pub fn new(expression: Expr, var: &str, variant: Variant, history_window: usize) -> Self {
        let layout = Layout::for_variant(variant);
        let store = decompose(&expression, var, variant, &layout);
        info!(
            "sandbox on '{}' for {} ({} variant, {} tokens)",
            expression,
            var,
            variant,
            store.len()
        );
        Sandbox {
            variant,
            var: var.to_string(),
            expression,
            layout,
            store,
            history: History::new(history_window),
            solution: None,
            dragging: None,
        }
    }

    /// Parses `input` and starts a session on it; malformed input is rejected here.
    pub fn from_input(
        input: &str,
        var: &str,
        variant: Variant,
        history_window: usize,
    ) -> Result<Self, SandboxError> {
        let expression = Expr::parse_expression(input)?;
        Ok(Sandbox::new(expression, var, variant, history_window))
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn var(&self) -> &str {
        &self.var
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    pub fn dragging(&self) -> Option<TokenId> {
        self.dragging
    }

    /// The equation described by the current token placement
    pub fn equation(&self) -> Equation {
        reconstruct(&self.store, self.variant)
    }

    /// Reconstructs the equation and records it in history.
    pub fn update_equation(&mut self) -> Equation {
        let equation = self.equation();
        self.history
            .push(self.variant.updated_entry(&equation.to_string()));
        equation
    }

    pub fn handle(&mut self, event: SandboxEvent) -> Result<Flow, SandboxError> {
        match event {
            SandboxEvent::PointerDown(x, y) => {
                if self.dragging.is_none() {
                    self.dragging = self.store.hit_test((x, y), &self.layout.hit_box);
                    if let Some(id) = self.dragging {
                        debug!("picked token {} at ({}, {})", id, x, y);
                    }
                }
            }
            SandboxEvent::PointerMove(x, y) => {
                if let Some(token) = self.dragging.and_then(|id| self.store.get_mut(id)) {
                    token.position = (x, y);
                }
            }
            SandboxEvent::PointerUp => {
                if let Some(id) = self.dragging.take() {
                    self.drop_token(id)?;
                    self.update_equation();
                }
            }
            SandboxEvent::Key(command) => {
                if self.variant.supports(command) {
                    self.run(command)?;
                } else {
                    debug!("{} is not available in the {} variant", command, self.variant);
                }
            }
            SandboxEvent::Quit => {
                info!("session closed with {} history entries", self.history.len());
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    fn drop_token(&mut self, id: TokenId) -> Result<(), SandboxError> {
        let side = {
            let token = self.store.get(id).ok_or(SandboxError::UnknownToken(id.0))?;
            self.layout.side_at(token.position.0)
        };
        let inverts = self.variant.inverts_functions();
        let token = self
            .store
            .get_mut(id)
            .ok_or(SandboxError::UnknownToken(id.0))?;
        token.side = side;
        if inverts && token.function.is_some() {
            token.inverted = side == Side::Rhs;
        }
        debug!(
            "token {} '{}' dropped on {}{}",
            id,
            token.label,
            side,
            if token.inverted { " (inverted)" } else { "" }
        );
        Ok(())
    }

    /// Drags token `id` to `point` and drops it there.
    pub fn drag_to(&mut self, id: TokenId, point: (f32, f32)) -> Result<Flow, SandboxError> {
        if self.store.get(id).is_none() {
            return Err(SandboxError::UnknownToken(id.0));
        }
        self.dragging = Some(id);
        self.handle(SandboxEvent::PointerMove(point.0, point.1))?;
        self.handle(SandboxEvent::PointerUp)
    }

    /// Drags token `id` into the box of `side`.
    pub fn move_token(&mut self, id: TokenId, side: Side) -> Result<Flow, SandboxError> {
        let y = self
            .store
            .get(id)
            .ok_or(SandboxError::UnknownToken(id.0))?
            .position
            .1;
        let point = self.layout.drop_point(side, id.0, y);
        self.drag_to(id, point)
    }

    fn run(&mut self, command: Command) -> Result<(), SandboxError> {
        let equation = self.update_equation();
        let var = self.var.clone();
        let outcome = match command {
            Command::Solve => equation.solve(&var).map(|roots| {
                let solution = Solution::Roots(roots);
                let entry = self.variant.solved_entry(
                    &equation.to_string(),
                    &var,
                    &solution.to_string(),
                );
                (solution, entry)
            }),
            Command::Integrate => equation.lhs.integrate(&var).map(|integral| {
                let entry = format!("Integrated eq lhs: {} d{} -> {}", equation.lhs, var, integral);
                (Solution::Expression(integral), entry)
            }),
            Command::Differentiate => {
                let derivative = equation.lhs.diff(&var).simplify();
                let entry = format!("Differentiated eq lhs: {} -> {}", equation.lhs, derivative);
                Ok((Solution::Expression(derivative), entry))
            }
        };

        match outcome {
            Ok((solution, entry)) => {
                self.history.push(entry);
                self.solution = Some(solution);
                Ok(())
            }
            Err(error) => self.recover(command, error),
        }
    }

    fn recover(&mut self, command: Command, error: SymbolicError) -> Result<(), SandboxError> {
        if !self.variant.recovers_errors() {
            return Err(error.into());
        }
        warn!("{} failed: {}", command, error);
        let action = match command {
            Command::Solve => "solving",
            Command::Integrate => "integrating",
            Command::Differentiate => "differentiating",
        };
        self.history.push(format!("Error {} eq: {}", action, error));
        Ok(())
    }

    /// What to draw for the current state
    pub fn frame(&self) -> Frame {
        let layout = &self.layout;
        let boxes = vec![
            SideBox {
                side: Side::Lhs,
                rect: layout.lhs_box,
                label: TextItem::new("LHS", layout.lhs_label_at),
            },
            SideBox {
                side: Side::Rhs,
                rect: layout.rhs_box,
                label: TextItem::new("RHS", layout.rhs_label_at),
            },
        ];
        let tokens = self
            .store
            .iter()
            .map(|token| TokenSprite {
                id: token.id,
                label: token.label.clone(),
                at: token.position,
                side: token.side,
                dragging: self.dragging == Some(token.id),
            })
            .collect();
        let solution = self.solution.as_ref().map(|solution| {
            TextItem::new(
                format!("Solution: {} = {}", self.var, solution),
                layout.solution_at,
            )
        });
        let history = self
            .history
            .recent()
            .iter()
            .enumerate()
            .map(|(line, entry)| TextItem::new(entry.clone(), layout.history_line(line)))
            .collect();
        Frame {
            width: layout.width,
            height: layout.height,
            boxes,
            equals: TextItem::new("=", layout.equals_at),
            tokens,
            solution,
            history,
        }
    }
}
