//! different utility modules used around the sandbox
/// settings file
pub mod config;
/// logger set-up (simplelog)
pub mod logger;
/// crossterm front end
pub mod terminal_canvas;
/// pretty-printing of tokens and history with tabled
pub mod token_table;
