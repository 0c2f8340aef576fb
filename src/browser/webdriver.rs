//! WebDriver-backed browser session
//!
//! Talks to a chromedriver/geckodriver/Selenium endpoint through thirtyfour.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use thirtyfour::prelude::*;
use tracing::{debug, info};

use super::{Browser, BrowserError};

/// Installs listeners that record uncaught errors and unhandled rejections
const INSTALL_ERROR_HOOK: &str = r#"
if (!window.__saleorE2eHooked) {
  window.__saleorE2eHooked = true;
  window.__saleorE2eErrors = [];
  window.addEventListener('error', function (e) {
    window.__saleorE2eErrors.push(String(e.message || e.error));
  });
  window.addEventListener('unhandledrejection', function (e) {
    var r = e.reason;
    window.__saleorE2eErrors.push(String(r && r.message ? r.message : r));
  });
}
"#;

const CLEAR_STORAGE: &str = r#"
try { window.localStorage.clear(); window.sessionStorage.clear(); } catch (e) {}
"#;

const DRAIN_ERRORS: &str = r#"
var errs = window.__saleorE2eErrors || [];
window.__saleorE2eErrors = [];
return errs;
"#;

/// How to start the browser session
#[derive(Clone, Debug)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub page_load_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            page_load_timeout: Duration::from_secs(30),
        }
    }
}

fn driver_error(e: WebDriverError) -> BrowserError {
    BrowserError::Driver(e.to_string())
}

/// Chrome session driven over the WebDriver protocol
pub struct WebDriverBrowser {
    driver: WebDriver,
    // Errors drained from pages we navigated away from
    pending_errors: Mutex<Vec<String>>,
}

impl WebDriverBrowser {
    /// Open a new session against the WebDriver server
    pub async fn connect(settings: &BrowserSettings) -> Result<Self, BrowserError> {
        info!(
            "Starting browser session via {} (headless: {})",
            settings.webdriver_url, settings.headless
        );

        let mut caps = DesiredCapabilities::chrome();
        if settings.headless {
            caps.set_headless().map_err(driver_error)?;
        }
        caps.add_arg(&format!(
            "--window-size={},{}",
            settings.viewport_width, settings.viewport_height
        ))
        .map_err(driver_error)?;

        let driver = WebDriver::new(settings.webdriver_url.as_str(), caps)
            .await
            .map_err(driver_error)?;
        driver
            .set_window_rect(0, 0, settings.viewport_width, settings.viewport_height)
            .await
            .map_err(driver_error)?;
        driver
            .set_page_load_timeout(settings.page_load_timeout)
            .await
            .map_err(driver_error)?;

        Ok(Self {
            driver,
            pending_errors: Mutex::new(Vec::new()),
        })
    }

    /// Always close the session explicitly
    pub async fn quit(self) -> Result<(), BrowserError> {
        self.driver.quit().await.map_err(driver_error)
    }

    async fn collect_page_errors(&self) -> Result<Vec<String>, BrowserError> {
        let ret = self
            .driver
            .execute(DRAIN_ERRORS, Vec::new())
            .await
            .map_err(driver_error)?;
        let errors = ret
            .json()
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(errors)
    }

    fn stash(&self, errors: Vec<String>) {
        if let Ok(mut pending) = self.pending_errors.lock() {
            pending.extend(errors);
        }
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    type Element = WebElement;

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        // The page's error buffer dies with the navigation
        if let Ok(errors) = self.collect_page_errors().await {
            self.stash(errors);
        }

        debug!("Navigating to {}", url);
        self.driver.goto(url).await.map_err(driver_error)?;
        self.driver
            .execute(INSTALL_ERROR_HOOK, Vec::new())
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        let url = self.driver.current_url().await.map_err(driver_error)?;
        Ok(url.to_string())
    }

    async fn body_text(&self) -> Result<String, BrowserError> {
        let body = self
            .driver
            .find(By::Tag("body"))
            .await
            .map_err(driver_error)?;
        body.text().await.map_err(driver_error)
    }

    async fn find_all(&self, css: &str) -> Result<Vec<WebElement>, BrowserError> {
        self.driver
            .find_all(By::Css(css))
            .await
            .map_err(driver_error)
    }

    async fn text(&self, element: &WebElement) -> Result<String, BrowserError> {
        element.text().await.map_err(driver_error)
    }

    async fn is_displayed(&self, element: &WebElement) -> Result<bool, BrowserError> {
        element.is_displayed().await.map_err(driver_error)
    }

    async fn attribute(
        &self,
        element: &WebElement,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        element.attr(name).await.map_err(driver_error)
    }

    async fn clear(&self, element: &WebElement) -> Result<(), BrowserError> {
        element.clear().await.map_err(driver_error)
    }

    async fn send_keys(&self, element: &WebElement, text: &str) -> Result<(), BrowserError> {
        element.send_keys(text).await.map_err(driver_error)
    }

    async fn click(&self, element: &WebElement) -> Result<(), BrowserError> {
        element.click().await.map_err(driver_error)
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>, BrowserError> {
        self.driver.screenshot_as_png().await.map_err(driver_error)
    }

    async fn drain_uncaught_errors(&self) -> Result<Vec<String>, BrowserError> {
        let current = self.collect_page_errors().await?;
        let mut errors = match self.pending_errors.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => Vec::new(),
        };
        errors.extend(current);
        Ok(errors)
    }

    async fn reset_session(&self, origin: &str) -> Result<(), BrowserError> {
        // Cookies and storage are scoped to the current document's origin
        self.driver.goto(origin).await.map_err(driver_error)?;
        self.driver.delete_all_cookies().await.map_err(driver_error)?;
        if let Err(e) = self.driver.execute(CLEAR_STORAGE, Vec::new()).await {
            debug!("Skipped clearing web storage: {}", e);
        }
        Ok(())
    }
}
