//! Result type for conditional GETs (`If-None-Match` / `If-Modified-Since`).
//!
//! When a caller holds a validator from an earlier response, the server may
//! answer 304 Not Modified. Callers must then skip every downstream write;
//! the stored validator stays as it was.

/// Which validator header pair a conditional request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// `ETag` / `If-None-Match`.
    ETag,
    /// `Last-Modified` / `If-Modified-Since`.
    LastModified,
}

impl Validator {
    /// Request header carrying the cached validator.
    pub fn request_header(self) -> &'static str {
        match self {
            Validator::ETag => "If-None-Match",
            Validator::LastModified => "If-Modified-Since",
        }
    }

    /// Response header carrying the new validator.
    pub fn response_header(self) -> &'static str {
        match self {
            Validator::ETag => "ETag",
            Validator::LastModified => "Last-Modified",
        }
    }
}

/// `(body_or_none, new_validator, changed)` triple of a conditional fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional<T> {
    /// Parsed body; `None` on 304.
    pub body: Option<T>,
    /// Validator to persist. On 304 this echoes the one that was sent.
    pub validator: Option<String>,
    /// `false` when upstream reported the resource unchanged.
    pub changed: bool,
}

impl<T> Conditional<T> {
    /// A 304 response for a request that sent `sent_validator`.
    pub fn not_modified(sent_validator: Option<&str>) -> Self {
        Self {
            body: None,
            validator: sent_validator.map(str::to_string),
            changed: false,
        }
    }

    /// A 200 response.
    pub fn fetched(body: T, validator: Option<String>) -> Self {
        Self {
            body: Some(body),
            validator,
            changed: true,
        }
    }

    #[inline]
    pub fn is_not_modified(&self) -> bool {
        !self.changed
    }

    /// Body if fetched, `None` if not modified.
    pub fn into_body(self) -> Option<T> {
        self.body
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Conditional<U> {
        Conditional {
            body: self.body.map(f),
            validator: self.validator,
            changed: self.changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_modified_echoes_sent_validator() {
        let c: Conditional<u32> = Conditional::not_modified(Some("Wed, 04 Feb 2026 03:31:52 GMT"));
        assert!(c.is_not_modified());
        assert!(c.body.is_none());
        assert_eq!(c.validator.as_deref(), Some("Wed, 04 Feb 2026 03:31:52 GMT"));
    }

    #[test]
    fn fetched_is_changed() {
        let c = Conditional::fetched(7u32, Some("\"abc\"".to_string()));
        assert!(c.changed);
        assert_eq!(c.clone().into_body(), Some(7));
        assert_eq!(c.map(|v| v * 2).body, Some(14));
    }

    #[test]
    fn validator_headers() {
        assert_eq!(Validator::ETag.request_header(), "If-None-Match");
        assert_eq!(Validator::ETag.response_header(), "ETag");
        assert_eq!(Validator::LastModified.request_header(), "If-Modified-Since");
        assert_eq!(Validator::LastModified.response_header(), "Last-Modified");
    }
}
