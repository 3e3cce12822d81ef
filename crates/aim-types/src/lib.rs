//! Validated primitive types shared by the AIM template crates.
//!
//! - [`NonEmptyText`]: trimmed text guaranteed to hold at least one non-whitespace character.
//! - [`parse_bool_token`] / [`bool_token`]: the boolean lexical forms accepted and emitted in
//!   annotation template attributes.

/// Errors that can occur when creating validated primitive values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input was not one of the accepted boolean tokens
    #[error("'{0}' is not a valid boolean token (expected true, false, 1 or 0)")]
    InvalidBoolean(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction, so a code value
/// such as `" RID5 "` is stored as `"RID5"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Parses a boolean attribute token.
///
/// `true` and `false` are matched case-insensitively; the XML Schema lexical forms `1` and `0`
/// are also accepted. Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`TextError::InvalidBoolean`] for any other input, including the empty string.
pub fn parse_bool_token(raw: &str) -> Result<bool, TextError> {
    let token = raw.trim();
    if token.eq_ignore_ascii_case("true") || token == "1" {
        Ok(true)
    } else if token.eq_ignore_ascii_case("false") || token == "0" {
        Ok(false)
    } else {
        Err(TextError::InvalidBoolean(raw.to_owned()))
    }
}

/// Returns the canonical token written for a boolean attribute.
pub fn bool_token(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  RID5 ").expect("should accept padded text");
        assert_eq!(text.as_str(), "RID5");
        assert_eq!(text.to_string(), "RID5");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty() {
        let err = serde_json::from_str::<NonEmptyText>("\"  \"").expect_err("should reject");
        assert!(err.to_string().contains("Text cannot be empty"));

        let ok: NonEmptyText = serde_json::from_str("\"RadLex\"").expect("should parse");
        assert_eq!(ok.as_str(), "RadLex");
    }

    #[test]
    fn bool_token_accepts_any_case() {
        assert_eq!(parse_bool_token("true"), Ok(true));
        assert_eq!(parse_bool_token("TRUE"), Ok(true));
        assert_eq!(parse_bool_token("True"), Ok(true));
        assert_eq!(parse_bool_token("false"), Ok(false));
        assert_eq!(parse_bool_token("FaLsE"), Ok(false));
        assert_eq!(parse_bool_token(" 1 "), Ok(true));
        assert_eq!(parse_bool_token("0"), Ok(false));
    }

    #[test]
    fn bool_token_rejects_other_words() {
        for raw in ["notabool", "", "yes", "2", "t"] {
            assert_eq!(
                parse_bool_token(raw),
                Err(TextError::InvalidBoolean(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn bool_token_round_trips_canonical_form() {
        assert_eq!(parse_bool_token(bool_token(true)), Ok(true));
        assert_eq!(parse_bool_token(bool_token(false)), Ok(false));
    }
}
