//! Interactive confirmation gate

use crate::error::{MigrateError, MigrateResult};
use std::io::{IsTerminal, Write};

/// Yes/no confirmation asked before destructive operations.
///
/// Injected into the runner so tests can script answers and so the
/// terminal dependency stays at the edge.
pub trait Confirmation: Send + Sync {
    fn confirm(&self, prompt: &str) -> MigrateResult<bool>;
}

/// Confirmation over the controlling terminal.
///
/// Refuses to prompt when stdin is not a terminal: an unattended run
/// would otherwise block forever on a read nobody will answer. The
/// error tells the operator to pass `--force` instead.
pub struct TerminalConfirmation;

impl Confirmation for TerminalConfirmation {
    fn confirm(&self, prompt: &str) -> MigrateResult<bool> {
        if !std::io::stdin().is_terminal() {
            return Err(MigrateError::ConfirmationUnavailable(
                "stdin is not a terminal; pass --force to proceed without confirmation"
                    .to_string(),
            ));
        }

        print!("[ WARNING ] {prompt} (yes/no): ");
        std::io::stdout().flush()?;

        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        Ok(answer.trim().eq_ignore_ascii_case("yes"))
    }
}
