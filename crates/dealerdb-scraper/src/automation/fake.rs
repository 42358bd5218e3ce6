//! In-memory automation engine for pipeline tests.
//!
//! Serves canned HTML keyed by URL substring, records every launch and
//! navigation, and can be told to fail navigation for one source so
//! adapter isolation can be asserted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{AutomationEngine, AutomationError, Locator, PageSession, ScrollTarget};

#[derive(Default)]
pub(crate) struct FakeEngineInner {
    pub launches: AtomicUsize,
    pub navigations: Mutex<Vec<String>>,
    /// URL-substring → HTML served for that page.
    pub pages: Mutex<Vec<(String, String)>>,
    /// Navigations to URLs containing this substring fail.
    pub fail_url_containing: Mutex<Option<String>>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeEngine {
    pub inner: Arc<FakeEngineInner>,
}

impl FakeEngine {
    pub fn serve(&self, url_fragment: &str, html: &str) {
        self.inner
            .pages
            .lock()
            .unwrap()
            .push((url_fragment.to_string(), html.to_string()));
    }

    pub fn fail_navigation_containing(&self, url_fragment: &str) {
        *self.inner.fail_url_containing.lock().unwrap() = Some(url_fragment.to_string());
    }

    pub fn launch_count(&self) -> usize {
        self.inner.launches.load(Ordering::SeqCst)
    }

    pub fn navigated_urls(&self) -> Vec<String> {
        self.inner.navigations.lock().unwrap().clone()
    }
}

impl AutomationEngine for FakeEngine {
    type Session = FakeSession;

    async fn launch(&self) -> Result<FakeSession, AutomationError> {
        self.inner.launches.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            engine: Arc::clone(&self.inner),
            current_html: Mutex::new(String::from("<html><body></body></html>")),
        })
    }
}

pub(crate) struct FakeSession {
    engine: Arc<FakeEngineInner>,
    current_html: Mutex<String>,
}

impl PageSession for FakeSession {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), AutomationError> {
        self.engine
            .navigations
            .lock()
            .unwrap()
            .push(url.to_string());

        if let Some(fragment) = self.engine.fail_url_containing.lock().unwrap().as_deref() {
            if url.contains(fragment) {
                return Err(AutomationError::Navigation {
                    url: url.to_string(),
                    reason: "simulated navigation timeout".to_string(),
                });
            }
        }

        let pages = self.engine.pages.lock().unwrap();
        let html = pages
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, html)| html.clone())
            .unwrap_or_else(|| String::from("<html><body></body></html>"));
        *self.current_html.lock().unwrap() = html;
        Ok(())
    }

    async fn is_visible(&self, _locator: &Locator, _timeout: Duration) -> bool {
        false
    }

    async fn click(&self, _locator: &Locator, _force: bool) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn fill(&self, _locator: &Locator, _text: &str) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn press_enter(&self, _locator: &Locator) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn hide(&self, _locator: &Locator) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn scroll_to(&self, _target: ScrollTarget) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn content(&self) -> Result<String, AutomationError> {
        Ok(self.current_html.lock().unwrap().clone())
    }

    async fn close(&self) {}
}
