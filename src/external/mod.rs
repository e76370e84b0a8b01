//! External tool abstractions
//!
//! This module provides trait-based abstractions for external CLI tools like Git,
//! enabling testable code through dependency injection and fake implementations.
//!
//! Pure logic (decision making) stays separate from impure effects (external
//! command execution).

pub mod command;

pub use command::{
    CommandError, CommandExecutor, CommandOutcome, CommandOutput, ProcessCommandExecutor,
    DEFAULT_COMMAND_TIMEOUT, TIMED_OUT_OUTPUT,
};
