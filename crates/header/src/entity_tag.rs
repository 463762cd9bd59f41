//! Entity tag (`ETag`) header values.

use std::fmt;
use std::str::FromStr;

use crate::reader::{Event, HeaderReader};
use crate::GrammarError;

/// A strong or weak entity tag.
///
/// The rendered form is always double-quoted and carries a `W/` prefix when
/// the tag is weak; [`EntityTag::raw_value`] returns the bare value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTag {
    value: String,
    weak: bool,
}

impl EntityTag {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), weak: false }
    }

    pub fn weak(value: impl Into<String>) -> Self {
        Self { value: value.into(), weak: true }
    }

    pub fn raw_value(&self) -> &str {
        &self.value
    }

    pub fn is_weak(&self) -> bool {
        self.weak
    }
}

impl FromStr for EntityTag {
    type Err = GrammarError;

    /// Accepts `"value"` for a strong tag or `W/"value"` for a weak one.
    fn from_str(header: &str) -> Result<Self, Self::Err> {
        let mut reader = HeaderReader::new(header);

        match reader.next(false, false)? {
            Event::QuotedString(value) => return Ok(Self::new(value)),
            Event::Token(token) if token.starts_with('W') => {
                reader.next_separator('/')?;
                return Ok(Self::weak(reader.next_quoted_string()?));
            }
            _ => {}
        }

        Err(GrammarError::invalid_entity_tag(header))
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            write!(f, "W/\"{}\"", self.value)
        } else {
            write!(f, "\"{}\"", self.value)
        }
    }
}
