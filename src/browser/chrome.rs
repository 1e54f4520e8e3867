//! Chromium implementation of the browser traits.
//!
//! Launches a local Chrome/Chromium through `chromiumoxide` and drives a
//! single tab. The CDP event handler runs on a background task for the
//! lifetime of the session and is aborted by [`ChromeSession::quit`].

use super::{BrowserError, BrowserSession, ElementHandle};
use crate::config::Settings;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// A running browser with one open tab.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    /// Start the browser and open a blank tab.
    #[instrument(level = "info", skip_all, fields(headless = settings.headless))]
    pub async fn launch(settings: &Settings) -> Result<Self, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .window_size(settings.window_width, settings.window_height)
            .args([
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-blink-features=AutomationControlled",
                "--no-first-run",
            ]);
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // Chrome emits CDP messages chromiumoxide cannot always decode; keep
        // draining instead of stopping on the first error.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler error (continuing)");
                }
            }
            debug!("CDP handler finished");
        });

        let page = browser.new_page("about:blank").await?;
        info!("Browser launched");
        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

/// Quote a Rust string as a JavaScript string literal.
fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

impl BrowserSession for ChromeSession {
    type Element = ChromeElement;

    #[instrument(level = "info", skip(self))]
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<ChromeElement, BrowserError> {
        self.page
            .find_element(selector)
            .await
            .map(ChromeElement)
            .map_err(|e| BrowserError::NotFound(format!("{selector} ({e})")))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ChromeElement>, BrowserError> {
        let elements = self.page.find_elements(selector).await?;
        Ok(elements.into_iter().map(ChromeElement).collect())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, BrowserError> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                const style = window.getComputedStyle(el);
                const rect = el.getBoundingClientRect();
                return style.visibility !== 'hidden' && style.display !== 'none'
                    && rect.width > 0 && rect.height > 0;
            }})()"#,
            selector = js_string(selector)
        );
        self.page
            .evaluate(script)
            .await?
            .into_value::<bool>()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    #[instrument(level = "debug", skip(self))]
    async fn select_option_by_text(
        &self,
        select_selector: &str,
        option_text: &str,
    ) -> Result<(), BrowserError> {
        let script = format!(
            r#"(() => {{
                const select = document.querySelector({select});
                if (!select) return false;
                const option = Array.from(select.options).find(o => o.text.trim() === {text});
                if (!option) return false;
                select.value = option.value;
                select.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            select = js_string(select_selector),
            text = js_string(option_text)
        );
        let selected = self
            .page
            .evaluate(script)
            .await?
            .into_value::<bool>()
            .map_err(|e| BrowserError::Script(e.to_string()))?;

        if selected {
            Ok(())
        } else {
            Err(BrowserError::NotFound(format!(
                "option '{option_text}' in '{select_selector}'"
            )))
        }
    }

    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        let params = ScreenshotParams::builder().full_page(true).build();
        self.page.save_screenshot(params, path).await?;
        Ok(())
    }

    async fn quit(mut self) -> Result<(), BrowserError> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            debug!(error = %e, "Browser process wait failed");
        }
        self.handler.abort();
        closed?;
        Ok(())
    }
}

/// A DOM node inside the session's tab.
pub struct ChromeElement(Element);

impl ElementHandle for ChromeElement {
    async fn find_child(&self, selector: &str) -> Result<Self, BrowserError> {
        self.0
            .find_element(selector)
            .await
            .map(ChromeElement)
            .map_err(|e| BrowserError::NotFound(format!("{selector} ({e})")))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, BrowserError> {
        Ok(self.0.attribute(name).await?)
    }

    async fn text(&self) -> Result<String, BrowserError> {
        let text = self.0.inner_text().await?.unwrap_or_default();
        Ok(text.trim().to_string())
    }

    async fn is_stale(&self) -> bool {
        // A detached node reports isConnected = false; a node from a destroyed
        // document cannot be called at all.
        match self
            .0
            .call_js_fn("function() { return this.isConnected; }", false)
            .await
        {
            Ok(returns) => returns.result.value.and_then(|v| v.as_bool()) != Some(true),
            Err(_) => true,
        }
    }

    async fn click(&self) -> Result<(), BrowserError> {
        self.0.click().await?;
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), BrowserError> {
        self.0.click().await?.type_str(text).await?;
        Ok(())
    }

    async fn press_enter(&self) -> Result<(), BrowserError> {
        self.0.press_key("Enter").await?;
        Ok(())
    }
}
