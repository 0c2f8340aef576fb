//! In-memory stand-in for the Saleor dashboard, used by unit tests
//!
//! Models just enough of the app: unauthenticated visits land on
//! `/dashboard/login/`, a correct email/password pair moves to `/dashboard/`,
//! wrong credentials leave the browser on the login page with an error.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{Browser, BrowserError};

pub const ORIGIN: &str = "http://localhost:9000";

/// Which attributes the login inputs carry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginMarkup {
    /// `name` and `type` attributes
    Standard,
    /// Only `type`, so lookups must fall back
    TypedInputsOnly,
}

#[derive(Clone, Debug)]
pub struct FakeElement {
    key: &'static str,
    tag: &'static str,
    attrs: Vec<(&'static str, &'static str)>,
    text: String,
    displayed: bool,
}

impl FakeElement {
    fn new(key: &'static str, tag: &'static str) -> Self {
        Self {
            key,
            tag,
            attrs: Vec::new(),
            text: String::new(),
            displayed: true,
        }
    }

    fn attr(mut self, name: &'static str, value: &'static str) -> Self {
        self.attrs.push((name, value));
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    fn hidden(mut self, hidden: bool) -> Self {
        self.displayed = !hidden;
        self
    }

    fn get_attr(&self, name: &str) -> Option<&'static str> {
        self.attrs.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }
}

#[derive(Debug, Default)]
struct FakeState {
    url: String,
    authenticated: bool,
    email: String,
    password: String,
    login_error: bool,
    menu_open: bool,
    failing_gotos: usize,
    visits: Vec<String>,
    uncaught: Vec<String>,
}

pub struct FakeDashboard {
    valid_email: String,
    valid_password: String,
    markup: LoginMarkup,
    state: Mutex<FakeState>,
}

impl Default for FakeDashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDashboard {
    pub fn new() -> Self {
        Self {
            valid_email: "admin@example.com".to_string(),
            valid_password: "admin123".to_string(),
            markup: LoginMarkup::Standard,
            state: Mutex::new(FakeState {
                url: "about:blank".to_string(),
                ..Default::default()
            }),
        }
    }

    pub fn with_credentials(mut self, email: &str, password: &str) -> Self {
        self.valid_email = email.to_string();
        self.valid_password = password.to_string();
        self
    }

    pub fn with_markup(mut self, markup: LoginMarkup) -> Self {
        self.markup = markup;
        self
    }

    pub fn authenticated(self) -> Self {
        self.state.lock().unwrap().authenticated = true;
        self
    }

    /// The next `n` navigations fail with a driver error
    pub fn failing_gotos(self, n: usize) -> Self {
        self.state.lock().unwrap().failing_gotos = n;
        self
    }

    /// Queue uncaught exception messages for the next drain
    pub fn raise_uncaught(&self, message: &str) {
        self.state.lock().unwrap().uncaught.push(message.to_string());
    }

    pub fn visits(&self) -> Vec<String> {
        self.state.lock().unwrap().visits.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().unwrap().authenticated
    }

    fn elements(&self) -> Vec<FakeElement> {
        let state = self.state.lock().unwrap();
        let mut elements = vec![FakeElement::new("body", "body").text(page_text(&state))];

        if !state.url.starts_with(ORIGIN) {
            return elements;
        }

        if !state.authenticated {
            let (email, password) = match self.markup {
                LoginMarkup::Standard => (
                    FakeElement::new("email", "input")
                        .attr("name", "email")
                        .attr("type", "email"),
                    FakeElement::new("password", "input")
                        .attr("name", "password")
                        .attr("type", "password"),
                ),
                LoginMarkup::TypedInputsOnly => (
                    FakeElement::new("email", "input").attr("type", "email"),
                    FakeElement::new("password", "input").attr("type", "password"),
                ),
            };
            elements.push(email.attr("required", ""));
            elements.push(password.attr("required", ""));
            elements.push(
                FakeElement::new("forgot", "button")
                    .attr("type", "button")
                    .text("Forgot password?"),
            );
            elements.push(
                FakeElement::new("submit", "button")
                    .attr("type", "submit")
                    .text("Sign in"),
            );
            if state.login_error {
                elements.push(FakeElement::new("error", "p").text("Invalid credentials"));
            }
            return elements;
        }

        elements.push(FakeElement::new("nav", "nav").text("Products Orders Customers"));
        elements.push(
            FakeElement::new("nav-products", "a")
                .attr("href", "/dashboard/products/")
                .text("Products"),
        );
        elements.push(
            FakeElement::new("nav-orders", "a")
                .attr("href", "/dashboard/orders/")
                .text("Orders"),
        );
        elements.push(
            FakeElement::new("nav-customers", "a")
                .attr("href", "/dashboard/customers/")
                .text("Customers"),
        );
        elements.push(FakeElement::new("user-menu", "button").attr("data-test-id", "user-menu"));
        elements.push(
            FakeElement::new("logout", "li")
                .attr("role", "menuitem")
                .text("Logout")
                .hidden(!state.menu_open),
        );
        elements
    }
}

fn page_text(state: &FakeState) -> String {
    if !state.url.starts_with(ORIGIN) {
        return "GraphQL Playground".to_string();
    }
    if !state.authenticated {
        let mut text = "Sign in\nEmail\nPassword\nForgot password?\nSign in".to_string();
        if state.login_error {
            text.push_str("\nInvalid credentials");
        }
        return text;
    }
    let section = if state.url.contains("/products") {
        "All products"
    } else if state.url.contains("/orders") {
        "All orders"
    } else if state.url.contains("/customers") {
        "All customers"
    } else {
        "Home"
    };
    format!("Saleor Dashboard\nProducts\nOrders\nCustomers\n{section}")
}

fn matches_selector(element: &FakeElement, selector: &str) -> bool {
    selector
        .split(',')
        .any(|simple| matches_simple(element, simple.trim()))
}

fn matches_simple(element: &FakeElement, selector: &str) -> bool {
    let (tag, mut rest) = match selector.find('[') {
        Some(i) => (&selector[..i], &selector[i..]),
        None => (selector, ""),
    };
    if !tag.is_empty() && tag != "*" && tag != element.tag {
        return false;
    }
    while let Some(start) = rest.find('[') {
        let Some(len) = rest[start..].find(']') else {
            return false;
        };
        let end = start + len;
        let condition = &rest[start + 1..end];
        let matched = match condition.split_once('=') {
            Some((name, value)) => {
                element.get_attr(name) == Some(value.trim_matches('"').trim_matches('\''))
            }
            None => element.get_attr(condition).is_some(),
        };
        if !matched {
            return false;
        }
        rest = &rest[end + 1..];
    }
    true
}

#[async_trait]
impl Browser for FakeDashboard {
    type Element = FakeElement;

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        state.visits.push(url.to_string());
        if state.failing_gotos > 0 {
            state.failing_gotos -= 1;
            return Err(BrowserError::Driver("navigation failed".to_string()));
        }

        state.login_error = false;
        state.menu_open = false;
        state.url = if !url.starts_with(ORIGIN) {
            url.to_string()
        } else if !state.authenticated {
            format!("{ORIGIN}/dashboard/login/")
        } else {
            let path = &url[ORIGIN.len()..];
            if path.is_empty() || path == "/" || path.contains("/login") {
                format!("{ORIGIN}/dashboard/")
            } else {
                url.to_string()
            }
        };
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn body_text(&self) -> Result<String, BrowserError> {
        Ok(page_text(&self.state.lock().unwrap()))
    }

    async fn find_all(&self, css: &str) -> Result<Vec<FakeElement>, BrowserError> {
        Ok(self
            .elements()
            .into_iter()
            .filter(|e| matches_selector(e, css))
            .collect())
    }

    async fn text(&self, element: &FakeElement) -> Result<String, BrowserError> {
        Ok(element.text.clone())
    }

    async fn is_displayed(&self, element: &FakeElement) -> Result<bool, BrowserError> {
        Ok(element.displayed)
    }

    async fn attribute(
        &self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        Ok(element.get_attr(name).map(str::to_string))
    }

    async fn clear(&self, element: &FakeElement) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        match element.key {
            "email" => state.email.clear(),
            "password" => state.password.clear(),
            _ => {}
        }
        Ok(())
    }

    async fn send_keys(&self, element: &FakeElement, text: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        match element.key {
            "email" => state.email.push_str(text),
            "password" => state.password.push_str(text),
            other => {
                return Err(BrowserError::Driver(format!(
                    "element {other} is not interactable"
                )))
            }
        }
        Ok(())
    }

    async fn click(&self, element: &FakeElement) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        match element.key {
            "submit" => {
                if state.email == self.valid_email && state.password == self.valid_password {
                    state.authenticated = true;
                    state.url = format!("{ORIGIN}/dashboard/");
                } else {
                    state.login_error = true;
                }
            }
            "nav-products" => state.url = format!("{ORIGIN}/dashboard/products/"),
            "nav-orders" => state.url = format!("{ORIGIN}/dashboard/orders/"),
            "nav-customers" => state.url = format!("{ORIGIN}/dashboard/customers/"),
            "user-menu" => state.menu_open = true,
            "logout" => {
                state.authenticated = false;
                state.menu_open = false;
                state.url = format!("{ORIGIN}/dashboard/login/");
            }
            _ => {}
        }
        Ok(())
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>, BrowserError> {
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn drain_uncaught_errors(&self) -> Result<Vec<String>, BrowserError> {
        Ok(std::mem::take(&mut self.state.lock().unwrap().uncaught))
    }

    async fn reset_session(&self, origin: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        state.url = origin.to_string();
        state.menu_open = false;
        state.login_error = false;
        // Only the dashboard origin holds the session
        if !origin.starts_with(ORIGIN) {
            return Ok(());
        }
        state.authenticated = false;
        state.email.clear();
        state.password.clear();
        Ok(())
    }
}
