//! Page automation abstraction.
//!
//! The manufacturer sites render their dealer lists with JavaScript, so
//! discovery needs a live browser session. Everything adapters do with
//! that session goes through [`PageSession`], so the rest of the pipeline
//! can be exercised against a fake engine serving fixture HTML.

mod chrome;
#[cfg(test)]
pub(crate) mod fake;

pub use chrome::{ChromeEngine, ChromeSession};

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// How an adapter points the session at an element.
///
/// `ButtonText` exists because consent banners and submit controls are most
/// reliably identified by their visible label; the Chrome engine maps it to
/// an XPath `contains(.)` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    ButtonText(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Locator {
        Locator::Css(selector.into())
    }

    pub fn button_text(text: impl Into<String>) -> Locator {
        Locator::ButtonText(text.into())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(sel) => write!(f, "css:{sel}"),
            Locator::ButtonText(text) => write!(f, "button:{text}"),
        }
    }
}

/// Scroll destination for triggering lazy-loaded results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Top,
    Bottom,
}

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("failed to launch rendering session: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("element {locator} not found")]
    ElementNotFound { locator: String },

    #[error("{step} failed for {locator}: {reason}")]
    Interaction {
        step: &'static str,
        locator: String,
        reason: String,
    },

    #[error("{step} timed out after {timeout_secs}s")]
    Timeout { step: &'static str, timeout_secs: u64 },

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("rendering session error: {0}")]
    Session(String),
}

/// One isolated rendering session.
///
/// An adapter run owns exactly one session for its full lifetime and must
/// call [`PageSession::close`] on every exit path; `close` is idempotent.
pub trait PageSession: Send + Sync {
    /// Navigate and wait for the page to settle.
    fn navigate(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), AutomationError>> + Send;

    /// Whether the element is present and visible within the deadline.
    fn is_visible(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> impl Future<Output = bool> + Send;

    /// Click an element. With `force`, clicks via script so overlays cannot
    /// intercept the interaction.
    fn click(
        &self,
        locator: &Locator,
        force: bool,
    ) -> impl Future<Output = Result<(), AutomationError>> + Send;

    /// Focus an input and type text into it.
    fn fill(
        &self,
        locator: &Locator,
        text: &str,
    ) -> impl Future<Output = Result<(), AutomationError>> + Send;

    /// Confirm an input via the keyboard (submit fallback).
    fn press_enter(
        &self,
        locator: &Locator,
    ) -> impl Future<Output = Result<(), AutomationError>> + Send;

    /// Forcibly hide matching elements so they cannot intercept clicks.
    fn hide(&self, locator: &Locator)
        -> impl Future<Output = Result<(), AutomationError>> + Send;

    fn scroll_to(
        &self,
        target: ScrollTarget,
    ) -> impl Future<Output = Result<(), AutomationError>> + Send;

    /// Full rendered-DOM HTML snapshot of the current page.
    fn content(&self) -> impl Future<Output = Result<String, AutomationError>> + Send;

    /// Release the session. Safe to call more than once.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// Launches fresh, isolated rendering sessions — one per adapter run.
pub trait AutomationEngine: Send + Sync {
    type Session: PageSession;

    fn launch(&self) -> impl Future<Output = Result<Self::Session, AutomationError>> + Send;
}
