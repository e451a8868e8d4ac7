//! Open a URL with the default handler.

use serde::Deserialize;
use vdock_core::{ActionConfig, ActionResult};

use crate::error::ActionError;
use crate::handler::{describe_field, finish, parse_settings, ActionHandler};
use crate::services::Services;

const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "file"];

#[derive(Debug, Deserialize)]
struct UrlSettings {
    url: String,
}

/// Opens `url`, adding `https://` when no scheme is given.
///
/// Only `http`, `https` and `file` are accepted. Anything else, such as
/// `javascript:` or `data:`, is rejected during validation.
pub struct UrlAction<'a> {
    config: ActionConfig,
    services: &'a Services,
}

impl<'a> UrlAction<'a> {
    pub fn new(config: ActionConfig, services: &'a Services) -> Self {
        Self { config, services }
    }

    fn target(&self) -> Result<String, ActionError> {
        let settings: UrlSettings = parse_settings(&self.config)?;
        normalize_url(&settings.url)
    }

    fn run(&self) -> Result<ActionResult, ActionError> {
        let url = self.target()?;
        self.services
            .launcher
            .open(&url)
            .map_err(|source| ActionError::Open {
                target: url.clone(),
                source,
            })?;
        tracing::info!(url = %url, "Opened URL");
        Ok(ActionResult::ok(format!("Opened URL: {url}")).with_entry("url", url))
    }
}

impl ActionHandler for UrlAction<'_> {
    fn validate(&self) -> Result<(), ActionError> {
        self.target().map(|_| ())
    }

    fn execute(&self) -> ActionResult {
        finish(self.run())
    }

    fn describe(&self) -> String {
        format!("Open URL: {}", describe_field(&self.config, "url"))
    }
}

/// Add a default scheme and reject schemes outside the allow-list.
pub(crate) fn normalize_url(raw: &str) -> Result<String, ActionError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(ActionError::InvalidConfig("URL must not be empty".to_string()));
    }
    match scheme_of(url) {
        Some(scheme) if ALLOWED_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) => {
            Ok(url.to_string())
        }
        Some(scheme) => Err(ActionError::UnsupportedScheme(scheme.to_string())),
        None => Ok(format!("https://{url}")),
    }
}

/// The scheme of `url`, if it has one. `localhost:8080` is host and port,
/// not a scheme.
fn scheme_of(url: &str) -> Option<&str> {
    let (scheme, rest) = url.split_once(':')?;
    let valid = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return None;
    }
    let looks_like_port = rest
        .split('/')
        .next()
        .is_some_and(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()));
    if looks_like_port && !rest.starts_with("//") {
        return None;
    }
    Some(scheme)
}
