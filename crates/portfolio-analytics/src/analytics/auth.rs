use crate::config::AuthConfig;
use axum::http::{header, HeaderMap};

/// Who is asking for a report. Established outside the engine; the engine only checks
/// whether the caller is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerSession {
    Authenticated { subject: String },
    Anonymous,
}

impl CallerSession {
    pub fn authenticated(subject: impl Into<String>) -> Self {
        Self::Authenticated {
            subject: subject.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Authenticated { subject } => Some(subject),
            Self::Anonymous => None,
        }
    }
}

/// Resolves a [`CallerSession`] from the `Authorization: Bearer` header.
#[derive(Debug, Clone, Default)]
pub struct SessionAuthenticator {
    api_token: Option<String>,
}

impl SessionAuthenticator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            api_token: config.api_token.clone(),
        }
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> CallerSession {
        let Some(token) = bearer_token(headers) else {
            return CallerSession::Anonymous;
        };

        match &self.api_token {
            Some(expected) if expected != token => CallerSession::Anonymous,
            Some(_) => CallerSession::authenticated("api-token"),
            None => CallerSession::authenticated(token),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
