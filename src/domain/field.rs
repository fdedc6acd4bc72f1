//! Tri-state optional fields.
//!
//! Several node fields use absence to mean "inherit" and an explicit `null`
//! to mean "cleared". `Option<T>` collapses the two, so these fields are
//! stored as [`Field`] and serialized with
//! `#[serde(default, skip_serializing_if = "Field::is_absent")]`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field that is absent, explicitly null, or set to a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// Not present in the source document
    Absent,
    /// Present with a `null` value
    Null,
    /// Present with a value
    Set(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    /// The value, if one is set. Absent and null both yield `None`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Set(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Set(v),
            None => Field::Absent,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Set(v) => v.serialize(serializer),
            // Absent is skipped by the container attribute; if it gets here it is written as null
            Field::Null | Field::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Only called when the key is present; missing keys go through `Default`.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Field::Set(v),
            None => Field::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Probe {
        #[serde(default, skip_serializing_if = "Field::is_absent")]
        width: Field<u8>,
    }

    #[test]
    fn given_missing_key_when_deserializing_then_absent_and_omitted_again() {
        let probe: Probe = serde_json::from_value(json!({})).unwrap();
        assert_eq!(probe.width, Field::Absent);
        assert_eq!(serde_json::to_value(&probe).unwrap(), json!({}));
    }

    #[test]
    fn given_explicit_null_when_round_tripping_then_null_is_kept() {
        let probe: Probe = serde_json::from_value(json!({"width": null})).unwrap();
        assert_eq!(probe.width, Field::Null);
        assert_eq!(serde_json::to_value(&probe).unwrap(), json!({"width": null}));
    }

    #[test]
    fn given_value_when_round_tripping_then_value_is_kept() {
        let probe: Probe = serde_json::from_value(json!({"width": 4})).unwrap();
        assert_eq!(probe.width.value(), Some(&4));
        assert_eq!(serde_json::to_value(&probe).unwrap(), json!({"width": 4}));
    }
}
