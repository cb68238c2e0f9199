use thiserror::Error;

/// Everything a parse or render call can fail with.
///
/// The set is closed: each failure condition of the engine maps to exactly
/// one kind, and [`Error::from_code`] keeps the numeric codes of the
/// underlying engine taxonomy round-trippable through [`Unknown`] for codes
/// this crate does not know yet.
///
/// [`Unknown`]: Error::Unknown
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A system resource failed, typically writing the rendered output.
    #[error("system failure")]
    System,
    /// The template ended inside a tag or with sections still open.
    #[error("unexpected end of template")]
    UnexpectedEnd,
    /// A tag with no content, such as `{{}}`.
    #[error("empty tag")]
    EmptyTag,
    /// Tag content longer than the fixed maximum.
    #[error("tag too long")]
    TagTooLong,
    /// A malformed delimiter-change tag.
    #[error("bad separators")]
    BadSeparators,
    /// Sections nested beyond the fixed parse-time maximum.
    #[error("too deep")]
    TooDeep,
    /// A section close without a matching open, or with the wrong name.
    #[error("closing")]
    Closing,
    /// An unescape tag with mismatched braces, such as `{{{x}}`.
    #[error("bad unescape tag")]
    BadUnescapeTag,
    /// A collaborator does not implement a required capability.
    #[error("invalid interface")]
    InvalidInterface,
    /// A named template was requested that the registry does not hold.
    #[error("item not found")]
    ItemNotFound,
    /// A partial reference that neither the store nor the data satisfies.
    #[error("partial not found")]
    PartialNotFound,
    /// An unresolvable variable tag under the strict-undefined extension.
    #[error("undefined tag")]
    UndefinedTag,
    /// Partial expansion nested beyond the fixed render-time maximum.
    #[error("too much nesting")]
    TooMuchNesting,
    /// A numeric code outside the known set.
    #[error("unknown error code {0}")]
    Unknown(i32),
}

impl Error {
    /// The numeric code of this kind in the engine taxonomy.
    pub fn code(&self) -> i32 {
        match self {
            Error::System => -1,
            Error::UnexpectedEnd => -2,
            Error::EmptyTag => -3,
            Error::TagTooLong => -4,
            Error::BadSeparators => -5,
            Error::TooDeep => -6,
            Error::Closing => -7,
            Error::BadUnescapeTag => -8,
            Error::InvalidInterface => -9,
            Error::ItemNotFound => -10,
            Error::PartialNotFound => -11,
            Error::UndefinedTag => -12,
            Error::TooMuchNesting => -13,
            Error::Unknown(code) => *code,
        }
    }

    /// The kind for a numeric code, [`Error::Unknown`] when unmapped.
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Error::System,
            -2 => Error::UnexpectedEnd,
            -3 => Error::EmptyTag,
            -4 => Error::TagTooLong,
            -5 => Error::BadSeparators,
            -6 => Error::TooDeep,
            -7 => Error::Closing,
            -8 => Error::BadUnescapeTag,
            -9 => Error::InvalidInterface,
            -10 => Error::ItemNotFound,
            -11 => Error::PartialNotFound,
            -12 => Error::UndefinedTag,
            -13 => Error::TooMuchNesting,
            other => Error::Unknown(other),
        }
    }
}

/// Failure to parse a data document, raised before rendering begins.
///
/// Deliberately opaque: callers only learn that the document was not
/// acceptable JSON, not where.
#[derive(Error, Debug)]
#[error("cannot parse document: {0}")]
pub struct DocumentError(#[from] serde_json::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in -13..=-1 {
            let error = Error::from_code(code);
            assert_ne!(error, Error::Unknown(code));
            assert_eq!(error.code(), code);
        }
    }

    #[test]
    fn unknown_codes_are_kept() {
        assert_eq!(Error::from_code(-77), Error::Unknown(-77));
        assert_eq!(Error::from_code(-77).code(), -77);
        assert_eq!(Error::from_code(0), Error::Unknown(0));
    }
}
