//! Access token handling
//!
//! The token only ever exists in three places: the [`AccessToken`] itself, the
//! [`PushUrl`] built from it, and (for the duration of the push) the remote's
//! `url` key. Neither type prints its secret through `Debug` or `Display`, and
//! every error text produced while the credentialed URL is installed goes
//! through [`PushUrl::scrub`] before it leaves the push stage.

use std::fmt;
use url::Url;

use crate::core::{REDACTED, TOKEN_USERNAME};

const HTTPS_SCHEME: &str = "https";

/// Opaque access token
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({REDACTED})")
    }
}

/// The URL the remote points at while a push runs
///
/// For `https://` repository URLs the token is embedded as
/// `x-access-token:<token>@`, replacing any userinfo already present. Every
/// other scheme (SSH, `file://`, plain paths) is used verbatim: the token does
/// not apply to them.
#[derive(Clone)]
pub struct PushUrl {
    url: String,
    secrets: Vec<String>,
}

impl PushUrl {
    pub fn build(repo_url: &str, token: &AccessToken) -> Self {
        match credentialed(repo_url, token) {
            Some((url, password)) => {
                let mut secrets = vec![password];
                if token.expose() != secrets[0] {
                    secrets.push(token.expose().to_string());
                }
                Self { url, secrets }
            }
            None => Self {
                url: repo_url.to_string(),
                secrets: Vec::new(),
            },
        }
    }

    /// Whether a token was embedded
    pub fn is_credentialed(&self) -> bool {
        !self.secrets.is_empty()
    }

    pub(crate) fn expose(&self) -> &str {
        &self.url
    }

    /// Replaces every occurrence of the token in `text`
    pub fn scrub(&self, text: &str) -> String {
        self.secrets
            .iter()
            .filter(|secret| !secret.is_empty())
            .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), REDACTED))
    }
}

impl fmt::Debug for PushUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PushUrl").field(&self.scrub(&self.url)).finish()
    }
}

impl fmt::Display for PushUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scrub(&self.url))
    }
}

/// The https URL with the token as userinfo, and the password as it appears in it
///
/// None for other schemes, unparsable URLs and an empty token.
fn credentialed(repo_url: &str, token: &AccessToken) -> Option<(String, String)> {
    if token.is_empty() {
        return None;
    }

    let mut url = Url::parse(repo_url).ok()?;
    if url.scheme() != HTTPS_SCHEME {
        return None;
    }
    url.set_username(TOKEN_USERNAME).ok()?;
    url.set_password(Some(token.expose())).ok()?;

    let password = url.password()?.to_string();
    Some((url.into(), password))
}
