use std::collections::HashSet;

/// Decides whether a bearer token may use the back office.
pub trait SessionValidator: Send + Sync {
    fn is_valid(&self, token: &str) -> bool;

    /// Requests without a token are rejected unless an implementation says otherwise.
    fn authorize(&self, token: Option<&str>) -> bool {
        token.is_some_and(|token| self.is_valid(token))
    }
}

/// Accepts a fixed set of tokens.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenValidator {
    tokens: HashSet<String>,
}

impl StaticTokenValidator {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }
}

impl SessionValidator for StaticTokenValidator {
    fn is_valid(&self, token: &str) -> bool {
        !token.is_empty() && self.tokens.contains(token)
    }
}

/// Accepts every request, token or not. Used by the local CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustedLocal;

impl SessionValidator for TrustedLocal {
    fn is_valid(&self, _token: &str) -> bool {
        true
    }

    fn authorize(&self, _token: Option<&str>) -> bool {
        true
    }
}
