//! Policy gate applied to every oracle-proposed step before it may run.

use tracing::warn;

use crate::oracle::RecoveryStep;

/// The only program a recovery step may invoke.
pub const VCS_PROGRAM: &str = "git";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepDecision {
    /// Run `git` with these arguments
    Execute { args: Vec<String> },
    SkipForeignCommand,
    SkipForceBlocked,
}

/// Decides, per step, whether a recovery command may reach the runner.
#[derive(Debug, Clone, Copy)]
pub struct StepGuard {
    force_allowed: bool,
}

impl StepGuard {
    pub fn new(force_allowed: bool) -> Self {
        Self { force_allowed }
    }

    /// `requires_force` on the plan is deliberately not an input here.
    pub fn evaluate(&self, step: &RecoveryStep) -> StepDecision {
        let mut tokens = tokenize(&step.command).into_iter();

        match tokens.next() {
            Some(program) if program == VCS_PROGRAM => {}
            _ => {
                warn!("Skipping non-git command: {}", step.command);
                return StepDecision::SkipForeignCommand;
            }
        }

        let args: Vec<String> = tokens.collect();
        if !self.force_allowed && args.iter().any(|arg| is_force_flag(arg)) {
            warn!("Skipping force operation (disabled in config): {}", step.command);
            return StepDecision::SkipForceBlocked;
        }

        StepDecision::Execute { args }
    }
}

/// Split a command line on whitespace, honoring single and double quotes.
///
/// No shell semantics: operators such as `&&` or `|` come through as
/// ordinary arguments. An unterminated quote runs to the end of the input.
pub fn tokenize(command: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some('"') if c == '\\' => match chars.next() {
                Some(next @ ('"' | '\\')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            },
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Short options that take their value in the same argument when glued,
/// e.g. `-mmessage`, `-bbranch`, `-Xours`.
const VALUE_SHORT_OPTIONS: [char; 8] = ['m', 'b', 'B', 'c', 'C', 'F', 's', 'X'];

/// True for arguments that make git overwrite remote or local history by force.
pub fn is_force_flag(arg: &str) -> bool {
    if arg == "--force" || arg.starts_with("--force-") || arg.starts_with("--force=") {
        return true;
    }
    // Short option cluster such as `-f` or `-uf`; scanning stops at an option
    // whose value is glued on, so `-mfix` is a message, not a force flag.
    if let Some(cluster) = arg.strip_prefix('-') {
        if !cluster.starts_with('-') {
            for c in cluster.chars() {
                if c == 'f' {
                    return true;
                }
                if !c.is_ascii_alphabetic() || VALUE_SHORT_OPTIONS.contains(&c) {
                    break;
                }
            }
        }
    }
    // `+refspec` forces that single ref update
    arg.len() > 1 && arg.starts_with('+')
}
