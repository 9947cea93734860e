//! In-page session re-verification.
//!
//! The route guard runs before anything renders. The page shell repeats the
//! check once mounted: it shows a loading indicator while verifying, then
//! either renders its children or renders nothing while redirecting.

use chrono::{DateTime, Utc};

use super::guard::{SessionGuard, LOGIN_ROUTE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Verifying,
    Authorized,
    Redirecting { to: &'static str },
}

#[derive(Debug)]
pub struct PageShell {
    state: ShellState,
}

impl Default for PageShell {
    fn default() -> Self {
        Self::new()
    }
}

impl PageShell {
    pub fn new() -> Self {
        Self {
            state: ShellState::Verifying,
        }
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    /// Run the check and settle the shell
    pub fn verify(&mut self, guard: &SessionGuard) -> ShellState {
        self.verify_at(guard, Utc::now())
    }

    pub fn verify_at(&mut self, guard: &SessionGuard, now: DateTime<Utc>) -> ShellState {
        self.state = if guard.is_authenticated_at(now) {
            ShellState::Authorized
        } else {
            ShellState::Redirecting { to: LOGIN_ROUTE }
        };
        self.state
    }

    pub fn shows_loading(&self) -> bool {
        self.state == ShellState::Verifying
    }

    pub fn renders_children(&self) -> bool {
        self.state == ShellState::Authorized
    }

    pub fn redirect_target(&self) -> Option<&'static str> {
        match self.state {
            ShellState::Redirecting { to } => Some(to),
            _ => None,
        }
    }
}
