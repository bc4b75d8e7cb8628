//! Single-placeholder templates for rendering a [`Tsid`] inside other text.

use crate::{Error, Result, Tsid, decode_base_n, encode_base_n};

/// The representations a template can embed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `%S`: canonical string, upper case.
    CanonicalUpper,
    /// `%s`: canonical string, lower case.
    CanonicalLower,
    /// `%X`: 16 hex digits, upper case.
    HexUpper,
    /// `%x`: 16 hex digits, lower case.
    HexLower,
    /// `%d`: 20 decimal digits.
    Decimal,
    /// `%z`: 11 base-62 digits.
    Base62,
}

impl Placeholder {
    /// Maps the character following `%` to a placeholder.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'S' => Some(Self::CanonicalUpper),
            's' => Some(Self::CanonicalLower),
            'X' => Some(Self::HexUpper),
            'x' => Some(Self::HexLower),
            'd' => Some(Self::Decimal),
            'z' => Some(Self::Base62),
            _ => None,
        }
    }

    /// The character that selects this placeholder after `%`.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::CanonicalUpper => 'S',
            Self::CanonicalLower => 's',
            Self::HexUpper => 'X',
            Self::HexLower => 'x',
            Self::Decimal => 'd',
            Self::Base62 => 'z',
        }
    }

    fn render(self, id: Tsid) -> Result<String> {
        match self {
            Self::CanonicalUpper => Ok(id.to_string()),
            Self::CanonicalLower => Ok(id.to_lower()),
            Self::HexUpper => encode_base_n(id.to_raw(), 16),
            Self::HexLower => encode_base_n(id.to_raw(), 16).map(|s| s.to_ascii_lowercase()),
            Self::Decimal => encode_base_n(id.to_raw(), 10),
            Self::Base62 => encode_base_n(id.to_raw(), 62),
        }
    }

    fn extract(self, s: &str) -> Result<Tsid> {
        match self {
            Self::CanonicalUpper | Self::CanonicalLower => s.parse(),
            Self::HexUpper | Self::HexLower => {
                decode_base_n(&s.to_ascii_uppercase(), 16).map(Tsid::from_raw)
            }
            Self::Decimal => decode_base_n(s, 10).map(Tsid::from_raw),
            Self::Base62 => decode_base_n(s, 62).map(Tsid::from_raw),
        }
    }
}

/// A parsed template: literal head, one placeholder, literal tail.
///
/// Only the first `%` is significant. Everything after the placeholder
/// character is literal text, including further `%` signs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Template<'a> {
    head: &'a str,
    placeholder: Placeholder,
    tail: &'a str,
}

impl<'a> Template<'a> {
    /// Splits `template` around its placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if there is no `%`, the `%` is the
    /// last character, or the following character is not a known
    /// placeholder.
    pub fn parse(template: &'a str) -> Result<Self> {
        let Some(i) = template.find('%') else {
            return Err(Error::InvalidFormat {
                reason: "template has no placeholder",
            });
        };
        let head = &template[..i];
        let mut rest = template[i + 1..].chars();
        let Some(c) = rest.next() else {
            return Err(Error::InvalidFormat {
                reason: "template ends with '%'",
            });
        };
        let Some(placeholder) = Placeholder::from_char(c) else {
            return Err(Error::InvalidFormat {
                reason: "unknown placeholder",
            });
        };
        Ok(Self {
            head,
            placeholder,
            tail: rest.as_str(),
        })
    }

    /// Literal text before the placeholder.
    #[must_use]
    pub const fn head(&self) -> &'a str {
        self.head
    }

    /// The single placeholder and the representation it stands for.
    #[must_use]
    pub const fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    /// Literal text after the placeholder.
    #[must_use]
    pub const fn tail(&self) -> &'a str {
        self.tail
    }

    /// Substitutes `id` for the placeholder.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors. The fixed radices used here never produce
    /// one in practice.
    pub fn render(&self, id: Tsid) -> Result<String> {
        let body = self.placeholder.render(id)?;
        let mut out = String::with_capacity(self.head.len() + body.len() + self.tail.len());
        out.push_str(self.head);
        out.push_str(&body);
        out.push_str(self.tail);
        Ok(out)
    }

    /// Recovers the id from text produced by [`Template::render`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] when `formatted` does not carry the
    /// template's head and tail, and any error from decoding the embedded
    /// representation.
    pub fn extract(&self, formatted: &str) -> Result<Tsid> {
        let body = formatted
            .strip_prefix(self.head)
            .and_then(|rest| rest.strip_suffix(self.tail))
            .ok_or(Error::InvalidFormat {
                reason: "input does not match the template",
            })?;
        self.placeholder.extract(body)
    }
}
