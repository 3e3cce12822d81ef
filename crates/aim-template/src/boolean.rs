//! Serde adapters for boolean attributes.
//!
//! Template files written by other tools use `True`/`FALSE` as often as `true`/`false`, so
//! decoding goes through [`aim_types::parse_bool_token`]. Encoding always emits the lowercase
//! canonical token.

use aim_types::{bool_token, parse_bool_token};
use serde::{Deserialize, Deserializer, Serializer};

pub(crate) mod required {
    use super::*;

    pub(crate) fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(bool_token(*value))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_bool_token(&raw).map_err(serde::de::Error::custom)
    }
}

pub(crate) mod optional {
    use super::*;

    pub(crate) fn serialize<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(bool_token(*value)),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_bool_token(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
