//! Scripted interaction for headless runs: `move 1 rhs; drag 0 700 210; solve`.
use crate::sandbox::controller::{Command, Flow, Sandbox, SandboxEvent};
use crate::sandbox::sandbox_error::SandboxError;
use crate::sandbox::token::{Side, TokenId};
use log::info;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{alpha1, digit1, multispace0, multispace1},
    combinator::{all_consuming, map, map_res, value},
    sequence::{delimited, pair, preceded, separated_pair},
};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// drop the token into the box of a side
    Move(TokenId, Side),
    /// drop the token at a canvas point
    Drag(TokenId, (f32, f32)),
    Run(Command),
}

/// Steps are separated by `;` or new lines; blank steps and `#` comments are skipped.
pub fn parse_script(source: &str) -> Result<Vec<ScriptStep>, SandboxError> {
    source
        .split([';', '\n'])
        .map(|step| step.split('#').next().unwrap_or("").trim())
        .filter(|step| !step.is_empty())
        .map(|step| match all_consuming(parse_step).parse(step) {
            Ok((_, parsed)) => Ok(parsed),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(SandboxError::script(
                step,
                format!("{} (stopped at '{}')", EXPECTED_STEP, e.input),
            )),
            Err(nom::Err::Incomplete(_)) => Err(SandboxError::script(step, EXPECTED_STEP)),
        })
        .collect()
}

const EXPECTED_STEP: &str = "expected 'move <id> <lhs|rhs>', 'drag <id> <x> <y>' or a command";

/// one step: `move`, `drag` or a command word, surrounding whitespace allowed
fn parse_step(input: &str) -> IResult<&str, ScriptStep> {
    let mut parser = delimited(
        multispace0,
        alt((parse_move, parse_drag, parse_command)),
        multispace0,
    );
    parser.parse(input)
}

fn parse_token_id(input: &str) -> IResult<&str, TokenId> {
    let mut parser = map(map_res(digit1, |s: &str| s.parse::<usize>()), TokenId);
    parser.parse(input)
}

fn parse_side(input: &str) -> IResult<&str, Side> {
    let mut parser = alt((
        value(Side::Lhs, alt((tag_no_case("lhs"), tag_no_case("left")))),
        value(Side::Rhs, alt((tag_no_case("rhs"), tag_no_case("right")))),
    ));
    parser.parse(input)
}

/// a canvas coordinate, anything `f32` accepts up to the next whitespace
fn parse_coordinate(input: &str) -> IResult<&str, f32> {
    let number = take_while1(|c: char| !c.is_whitespace());
    let mut parser = map_res(number, |s: &str| s.parse::<f32>());
    parser.parse(input)
}

/// `move <id> <side>`
fn parse_move(input: &str) -> IResult<&str, ScriptStep> {
    let arguments = separated_pair(parse_token_id, multispace1, parse_side);
    let mut parser = map(
        preceded(pair(tag_no_case("move"), multispace1), arguments),
        |(id, side)| ScriptStep::Move(id, side),
    );
    parser.parse(input)
}

/// `drag <id> <x> <y>`
fn parse_drag(input: &str) -> IResult<&str, ScriptStep> {
    let (input, _) = pair(tag_no_case("drag"), multispace1).parse(input)?;
    let (input, id) = parse_token_id(input)?;
    let (input, x) = preceded(multispace1, parse_coordinate).parse(input)?;
    let (input, y) = preceded(multispace1, parse_coordinate).parse(input)?;
    Ok((input, ScriptStep::Drag(id, (x, y))))
}

/// a command word as typed on the keyboard or spelled out (`s`, `solve`, `diff`...)
fn parse_command(input: &str) -> IResult<&str, ScriptStep> {
    let mut parser = map_res(alpha1, |word: &str| {
        Command::from_str(&word.to_ascii_lowercase()).map(ScriptStep::Run)
    });
    parser.parse(input)
}

impl Sandbox {
    /// Plays the steps in order; stops at the first error.
    pub fn run_script(&mut self, steps: &[ScriptStep]) -> Result<Flow, SandboxError> {
        for step in steps {
            info!("script step {:?}", step);
            let flow = match step {
                ScriptStep::Move(id, side) => self.move_token(*id, *side)?,
                ScriptStep::Drag(id, point) => self.drag_to(*id, *point)?,
                ScriptStep::Run(command) => self.handle(SandboxEvent::Key(*command))?,
            };
            if flow == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::variant::Variant;

    #[test]
    fn test_parse_script() {
        let steps = parse_script("move 1 rhs; drag 0 700 210\n solve ;; # comment\nd").unwrap();
        assert_eq!(
            steps,
            vec![
                ScriptStep::Move(TokenId(1), Side::Rhs),
                ScriptStep::Drag(TokenId(0), (700.0, 210.0)),
                ScriptStep::Run(Command::Solve),
                ScriptStep::Run(Command::Differentiate),
            ]
        );
    }

    #[test]
    fn test_parse_token_id_and_side() {
        assert_eq!(parse_token_id("12 rhs"), Ok((" rhs", TokenId(12))));
        assert!(parse_token_id("x").is_err());
        assert_eq!(parse_side("Left"), Ok(("", Side::Lhs)));
        assert_eq!(parse_side("RHS 3"), Ok((" 3", Side::Rhs)));
        assert!(parse_side("up").is_err());
    }

    #[test]
    fn test_parse_step_variants() {
        assert_eq!(
            parse_step("  MOVE\t3   left "),
            Ok(("", ScriptStep::Move(TokenId(3), Side::Lhs)))
        );
        assert_eq!(
            parse_step("drag 2 -5.5 1e2"),
            Ok(("", ScriptStep::Drag(TokenId(2), (-5.5, 100.0))))
        );
        assert_eq!(parse_step("Integrate"), Ok(("", ScriptStep::Run(Command::Integrate))));
        assert_eq!(parse_step("diff"), Ok(("", ScriptStep::Run(Command::Differentiate))));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_script("move x rhs"), Err(SandboxError::Script { .. })));
        assert!(matches!(parse_script("move 1 up"), Err(SandboxError::Script { .. })));
        assert!(matches!(parse_script("jump"), Err(SandboxError::Script { .. })));
        assert!(matches!(parse_script("drag 1 2"), Err(SandboxError::Script { .. })));
        assert!(matches!(parse_script("drag 1 2 y"), Err(SandboxError::Script { .. })));
        assert!(matches!(parse_script("move 1 rhs 2"), Err(SandboxError::Script { .. })));
        match parse_script("solve; move 1 rhsx") {
            Err(SandboxError::Script { step, reason }) => {
                assert_eq!(step, "move 1 rhsx");
                assert!(reason.starts_with("expected"));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_run_script_solves_after_moves() {
        let mut sandbox = Sandbox::from_input("2*x + 3", "x", Variant::Split, 5).unwrap();
        let steps = parse_script("move 0 rhs; solve").unwrap();
        sandbox.run_script(&steps).unwrap();
        assert_eq!(
            sandbox.history().entries(),
            &[
                "Updated equation: x/2 + 3 = 0".to_string(),
                "Updated equation: x/2 + 3 = 0".to_string(),
                "Solved equation: x/2 + 3 = 0 -> x = [-6]".to_string(),
            ]
        );
    }

    #[test]
    fn test_run_script_unknown_token() {
        let mut sandbox = Sandbox::from_input("2*x + 3", "x", Variant::Split, 5).unwrap();
        let steps = parse_script("move 7 rhs").unwrap();
        assert!(matches!(sandbox.run_script(&steps), Err(SandboxError::UnknownToken(7))));
    }
}
