//! Headless Chrome implementation of the automation traits.
//!
//! `headless_chrome` is a blocking CDP client, so every call runs on the
//! blocking thread pool and is bounded by an async timeout. Each session
//! owns its own browser process; the process is killed when the session
//! value drops, which backstops `close` on cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, Element, LaunchOptions, Tab};

use super::{AutomationEngine, AutomationError, Locator, PageSession, ScrollTarget};

const VIEWPORT: (u32, u32) = (1920, 1080);

/// Launches one fresh headless Chrome session per adapter run.
#[derive(Debug, Clone)]
pub struct ChromeEngine {
    step_timeout: Duration,
}

impl ChromeEngine {
    #[must_use]
    pub fn new(step_timeout: Duration) -> Self {
        Self { step_timeout }
    }
}

impl AutomationEngine for ChromeEngine {
    type Session = ChromeSession;

    async fn launch(&self) -> Result<ChromeSession, AutomationError> {
        let step_timeout = self.step_timeout;
        let task = tokio::task::spawn_blocking(move || -> Result<(Browser, Arc<Tab>), String> {
            let options = LaunchOptions::default_builder()
                .headless(true)
                .window_size(Some(VIEWPORT))
                .build()
                .map_err(|e| e.to_string())?;
            let browser = Browser::new(options).map_err(|e| e.to_string())?;
            let tab = browser.new_tab().map_err(|e| e.to_string())?;
            tab.set_default_timeout(step_timeout);
            Ok((browser, tab))
        });

        let (browser, tab) = task
            .await
            .map_err(|e| AutomationError::Session(e.to_string()))?
            .map_err(AutomationError::Launch)?;

        Ok(ChromeSession {
            _browser: browser,
            tab,
            step_timeout,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// One live tab in a dedicated browser process.
pub struct ChromeSession {
    // Held only to keep the browser process alive for the tab's lifetime.
    _browser: Browser,
    tab: Arc<Tab>,
    step_timeout: Duration,
    closed: Arc<AtomicBool>,
}

impl ChromeSession {
    /// Run a blocking CDP interaction, bounded by `timeout`.
    async fn blocking<T, F>(
        &self,
        step: &'static str,
        timeout: Duration,
        f: F,
    ) -> Result<T, AutomationError>
    where
        F: FnOnce(&Tab) -> Result<T, AutomationError> + Send + 'static,
        T: Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        let task = tokio::task::spawn_blocking(move || f(&tab));
        match tokio::time::timeout(timeout, task).await {
            Err(_) => Err(AutomationError::Timeout {
                step,
                timeout_secs: timeout.as_secs(),
            }),
            Ok(Err(join)) => Err(AutomationError::Session(join.to_string())),
            Ok(Ok(result)) => result,
        }
    }
}

fn find_element<'a>(tab: &'a Tab, locator: &Locator) -> Result<Element<'a>, AutomationError> {
    let result = match locator {
        Locator::Css(selector) => tab.wait_for_element(selector),
        Locator::ButtonText(text) => {
            tab.wait_for_xpath(&format!("//button[contains(., \"{text}\")]"))
        }
    };
    result.map_err(|_| AutomationError::ElementNotFound {
        locator: locator.to_string(),
    })
}

fn interaction(step: &'static str, locator: &Locator, reason: String) -> AutomationError {
    AutomationError::Interaction {
        step,
        locator: locator.to_string(),
        reason,
    }
}

const HIDE_STYLES: &str =
    "this.style.display = 'none'; this.style.visibility = 'hidden'; this.style.pointerEvents = 'none';";

impl PageSession for ChromeSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), AutomationError> {
        let url = url.to_string();
        self.blocking("navigate", timeout, move |tab| {
            tab.navigate_to(&url)
                .and_then(|t| t.wait_until_navigated())
                .map(|_| ())
                .map_err(|e| AutomationError::Navigation {
                    url: url.clone(),
                    reason: e.to_string(),
                })
        })
        .await
    }

    async fn is_visible(&self, locator: &Locator, timeout: Duration) -> bool {
        let locator = locator.clone();
        self.blocking("is_visible", timeout, move |tab| {
            Ok(find_element(tab, &locator).is_ok())
        })
        .await
        .unwrap_or(false)
    }

    async fn click(&self, locator: &Locator, force: bool) -> Result<(), AutomationError> {
        let locator = locator.clone();
        self.blocking("click", self.step_timeout(), move |tab| {
            let element = find_element(tab, &locator)?;
            if force {
                // Script-dispatched click; bypasses overlays that would
                // intercept a trusted pointer event.
                element
                    .call_js_fn("function() { this.click(); }", vec![], false)
                    .map(|_| ())
                    .map_err(|e| interaction("click", &locator, e.to_string()))
            } else {
                element
                    .click()
                    .map(|_| ())
                    .map_err(|e| interaction("click", &locator, e.to_string()))
            }
        })
        .await
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<(), AutomationError> {
        let locator = locator.clone();
        let text = text.to_string();
        self.blocking("fill", self.step_timeout(), move |tab| {
            let element = find_element(tab, &locator)?;
            element
                .click()
                .and_then(|el| el.type_into(&text))
                .map(|_| ())
                .map_err(|e| interaction("fill", &locator, e.to_string()))
        })
        .await
    }

    async fn press_enter(&self, locator: &Locator) -> Result<(), AutomationError> {
        let locator = locator.clone();
        self.blocking("press_enter", self.step_timeout(), move |tab| {
            let element = find_element(tab, &locator)?;
            element
                .click()
                .map_err(|e| interaction("press_enter", &locator, e.to_string()))?;
            tab.press_key("Enter")
                .map(|_| ())
                .map_err(|e| interaction("press_enter", &locator, e.to_string()))
        })
        .await
    }

    async fn hide(&self, locator: &Locator) -> Result<(), AutomationError> {
        let locator = locator.clone();
        self.blocking("hide", self.step_timeout(), move |tab| {
            match &locator {
                Locator::Css(selector) => {
                    let script = format!(
                        "document.querySelectorAll(\"{selector}\").forEach((el) => {{ \
                             el.style.display = 'none'; \
                             el.style.visibility = 'hidden'; \
                             el.style.pointerEvents = 'none'; \
                         }});"
                    );
                    tab.evaluate(&script, false)
                        .map(|_| ())
                        .map_err(|e| AutomationError::Script(e.to_string()))
                }
                Locator::ButtonText(_) => {
                    let element = find_element(tab, &locator)?;
                    element
                        .call_js_fn(&format!("function() {{ {HIDE_STYLES} }}"), vec![], false)
                        .map(|_| ())
                        .map_err(|e| AutomationError::Script(e.to_string()))
                }
            }
        })
        .await
    }

    async fn scroll_to(&self, target: ScrollTarget) -> Result<(), AutomationError> {
        let script = match target {
            ScrollTarget::Top => "window.scrollTo(0, 0);",
            ScrollTarget::Bottom => "window.scrollTo(0, document.body.scrollHeight);",
        };
        self.blocking("scroll", self.step_timeout(), move |tab| {
            tab.evaluate(script, false)
                .map(|_| ())
                .map_err(|e| AutomationError::Script(e.to_string()))
        })
        .await
    }

    async fn content(&self) -> Result<String, AutomationError> {
        self.blocking("content", self.step_timeout(), |tab| {
            tab.get_content()
                .map_err(|e| AutomationError::Session(e.to_string()))
        })
        .await
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let tab = Arc::clone(&self.tab);
        // Best effort; dropping the session kills the browser process anyway.
        let _ = tokio::task::spawn_blocking(move || tab.close(false)).await;
    }
}

impl ChromeSession {
    fn step_timeout(&self) -> Duration {
        // The tab's default timeout governs element waits; bound the async
        // caller slightly above it so the blocking call wins the race.
        self.step_timeout + Duration::from_secs(1)
    }
}
