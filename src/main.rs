#![allow(non_snake_case)]
use RustedDragSolve::Utils::config::AppConfig;
use RustedDragSolve::Utils::logger::{init_logging, parse_level};
use RustedDragSolve::Utils::terminal_canvas::run_interactive;
use RustedDragSolve::Utils::token_table::{summary_table, token_table};
use RustedDragSolve::sandbox::controller::Sandbox;
use RustedDragSolve::sandbox::script::parse_script;
use RustedDragSolve::sandbox::variant::Variant;
use clap::Parser;
use log::info;
use std::error::Error;
use std::path::PathBuf;

/// Drag the terms of an equation between its sides and solve it.
#[derive(Debug, Parser)]
#[command(name = "drag-solve", version, about)]
struct Cli {
    /// expression whose terms become tokens, e.g. "2*x + 3 - 5"
    #[arg(short, long)]
    expr: Option<String>,
    /// whole, split or functions
    #[arg(long)]
    variant: Option<Variant>,
    /// unknown to solve for
    #[arg(long = "var")]
    variable: Option<String>,
    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// off, error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// run headless, e.g. "move 1 rhs; solve"
    #[arg(short, long)]
    script: Option<String>,
    /// write the full history to this file when the session ends
    #[arg(long)]
    history_out: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<(AppConfig, Option<String>, Option<PathBuf>), Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(expr) = self.expr {
            config.expression = expr;
        }
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if let Some(variable) = self.variable {
            config.variable = variable;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(file) = self.log_file {
            config.log_file = Some(file);
        }
        Ok((config, self.script, self.history_out))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let (config, script, history_out) = Cli::parse().into_config()?;
    let interactive = script.is_none();
    init_logging(
        parse_level(&config.log_level)?,
        interactive,
        config.log_file.as_deref(),
    )?;

    let mut sandbox = Sandbox::from_input(
        &config.expression,
        &config.variable,
        config.variant,
        config.history_window,
    )?;

    let outcome = match &script {
        Some(source) => {
            let steps = parse_script(source)?;
            sandbox.run_script(&steps).map(|_| ())
        }
        None => run_interactive(&mut sandbox),
    };

    if let Some(path) = &history_out {
        sandbox.history().save_to_file(path)?;
    }
    outcome?;

    if !interactive {
        println!("{}", token_table(&sandbox));
        println!("{}", summary_table(&sandbox));
    }
    info!("Program ended");
    Ok(())
}
