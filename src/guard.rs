//! Scoped teardown for provisioned stacks.
//!
//! [`DestroyGuard`] pairs an apply with a destroy that runs exactly once,
//! whether the scenario body completes, returns early with an error, or
//! panics on a failed assertion. Call [`DestroyGuard::finish`] to observe
//! the teardown result; letting the guard drop tears down best-effort.

use std::io::{self, Write};

use crate::options::StackOptions;
use crate::runner::{CommandOutput, CommandRunner};
use crate::verify::{Verifier, VerifyError};

/// Tears down a stack when dropped, unless disarmed by [`DestroyGuard::finish`].
#[derive(Debug)]
pub struct DestroyGuard<'v, R: CommandRunner> {
    verifier: &'v Verifier<R>,
    options: StackOptions,
    armed: bool,
}

impl<'v, R: CommandRunner> DestroyGuard<'v, R> {
    /// Arms a guard that will destroy the stack described by `options`.
    #[must_use]
    pub const fn new(verifier: &'v Verifier<R>, options: StackOptions) -> Self {
        Self {
            verifier,
            options,
            armed: true,
        }
    }

    /// Returns the options the guard will destroy with.
    #[must_use]
    pub const fn options(&self) -> &StackOptions {
        &self.options
    }

    /// Destroys the stack now and disarms the guard.
    ///
    /// Use this instead of relying on drop when the teardown result matters,
    /// since drop cannot report failures to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when the destroy phase fails.
    pub fn finish(mut self) -> Result<CommandOutput, VerifyError> {
        self.armed = false;
        self.verifier.destroy(&self.options)
    }
}

impl<R: CommandRunner> Drop for DestroyGuard<'_, R> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        if let Err(err) = self.verifier.destroy(&self.options) {
            // Drop cannot propagate; note the leak where a test log will show it.
            writeln!(
                io::stderr(),
                "teardown of {} failed, resources may remain: {err}",
                self.options.dir()
            )
            .ok();
        }
    }
}
