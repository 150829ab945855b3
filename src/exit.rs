// src/exit.rs
//! Standardized process exit codes for `jsgram`.
//!
//! Provides a stable contract for scripts and automation.

use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum JsgramExit {
    /// Operation completed successfully.
    Success = 0,
    /// Generic error (I/O, persistence, config, model).
    Error = 1,
    /// Input validation failed (no inputs, threshold out of range, no index to update).
    InvalidInput = 2,
    /// Every input file was excluded; nothing was analyzed.
    NothingAnalyzed = 3,
}

impl JsgramExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl Termination for JsgramExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}
