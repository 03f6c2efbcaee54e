//! Identity of the party making a request

use super::validation::normalize_email;

/// Per-request record of the authenticated principal
///
/// Built by the request-handling layer (typically from a verified token)
/// and passed explicitly into every self-service operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    principal: Option<String>,
}

impl CallerContext {
    /// A caller whose identity has been established
    pub fn authenticated(email: impl AsRef<str>) -> Self {
        Self {
            principal: Some(normalize_email(email.as_ref())),
        }
    }

    /// A caller with no established identity
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Email of the authenticated principal, if any
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticated_normalizes() {
        let caller = CallerContext::authenticated(" Someone@Example.com");
        assert_eq!(caller.principal(), Some("someone@example.com"));
        assert!(caller.is_authenticated());
    }

    #[test]
    fn test_anonymous() {
        let caller = CallerContext::anonymous();
        assert_eq!(caller.principal(), None);
        assert!(!caller.is_authenticated());
    }
}
