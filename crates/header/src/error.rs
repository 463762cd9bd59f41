use thiserror::Error;

/// Errors raised while reading or parsing a header value.
///
/// Every variant is fatal to the parse call that produced it; the reader
/// does not recover or resynchronize. Callers that can tolerate a bad
/// header catch the error and treat the header as absent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("unexpected end of header at index {at}")]
    UnexpectedEnd { at: usize },

    #[error("unbalanced quoted string at index {at}")]
    UnbalancedQuotedString { at: usize },

    #[error("unbalanced comment at index {at}")]
    UnbalancedComment { at: usize },

    #[error("comments are not allowed in this context, index {at}")]
    CommentsNotAllowed { at: usize },

    #[error("expected {expected} but found {found} at index {at}")]
    UnexpectedEvent { expected: &'static str, found: &'static str, at: usize },

    #[error("expected separator '{expected}' instead of '{found}' at index {at}")]
    UnexpectedSeparator { expected: char, found: char, at: usize },

    #[error("whitespace is not allowed at index {at}")]
    WhitespaceNotAllowed { at: usize },

    #[error("invalid entity tag: {header}")]
    InvalidEntityTag { header: String },

    #[error("invalid cookie: {reason}")]
    InvalidCookie { reason: String },
}

impl GrammarError {
    pub fn unexpected_end(at: usize) -> Self {
        Self::UnexpectedEnd { at }
    }

    pub fn unbalanced_quoted_string(at: usize) -> Self {
        Self::UnbalancedQuotedString { at }
    }

    pub fn unbalanced_comment(at: usize) -> Self {
        Self::UnbalancedComment { at }
    }

    pub fn comments_not_allowed(at: usize) -> Self {
        Self::CommentsNotAllowed { at }
    }

    pub fn unexpected_event(expected: &'static str, found: &'static str, at: usize) -> Self {
        Self::UnexpectedEvent { expected, found, at }
    }

    pub fn unexpected_separator(expected: char, found: char, at: usize) -> Self {
        Self::UnexpectedSeparator { expected, found, at }
    }

    pub fn whitespace_not_allowed(at: usize) -> Self {
        Self::WhitespaceNotAllowed { at }
    }

    pub fn invalid_entity_tag<S: ToString>(header: S) -> Self {
        Self::InvalidEntityTag { header: header.to_string() }
    }

    pub fn invalid_cookie<S: ToString>(reason: S) -> Self {
        Self::InvalidCookie { reason: reason.to_string() }
    }
}
