//! Guessifyctl library - exposes modules for testing

pub mod commands;
pub mod logging;
pub mod output;
