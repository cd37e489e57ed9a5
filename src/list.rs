//! The flat sequence: oson's wire-level graph representation.
//!
//! Linearization turns a value graph into an [`Oson`]: either a bare magic
//! sentinel, or an ordered list of entries addressed by position. Position 0
//! holds the root. Each [`OsonValue`] entry is a primitive scalar, an array
//! of references, a tagged entry (label plus references), or a big-integer
//! entry carrying sign-magnitude hex text.
//!
//! Once JSON-encoded, the format is self-describing: an entry that is a JSON
//! array is a *tagged* entry exactly when its first element is a string (the
//! empty string labels plain objects), and a plain *array* entry when its
//! first element is a number or the array-hole sentinel. The serde
//! implementations here preserve that discriminator byte-for-byte.
//!
//! ## Examples
//!
//! ```rust
//! use oson::{listify, oson, Oson};
//!
//! let flat = listify(&oson!({ "a": 0 })).unwrap();
//! assert_eq!(serde_json::to_string(&flat).unwrap(), r#"[["",1,2],"a",0]"#);
//!
//! let back: Oson = serde_json::from_str(r#"[["",1,2],"a",0]"#).unwrap();
//! assert_eq!(back, flat);
//! ```

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::constructors::BIG_INT_LABEL;
use crate::value::Number;

/// An encoded oson document: a bare sentinel or a flat entry sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Oson {
    /// The root itself was non-representable (undefined, NaN, ±Infinity).
    Magic(i64),
    /// The flat sequence; position 0 is the root entry.
    List(Vec<OsonValue>),
}

impl Oson {
    /// Returns the entry list, or `None` for a bare sentinel.
    #[must_use]
    pub fn as_list(&self) -> Option<&[OsonValue]> {
        match self {
            Oson::Magic(_) => None,
            Oson::List(list) => Some(list),
        }
    }
}

impl From<Vec<OsonValue>> for Oson {
    fn from(list: Vec<OsonValue>) -> Self {
        Oson::List(list)
    }
}

/// One entry of the flat sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum OsonValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// An array entry: one reference per source slot. A reference is a
    /// non-negative position or the array-hole sentinel.
    Array(Vec<i64>),
    /// A tagged entry: a type label followed by references to the decomposed
    /// sub-values. The empty label denotes a plain object.
    Tagged { label: String, refs: Vec<i64> },
    /// A big-integer entry: sign-magnitude base-16 text stored inline under
    /// the reserved `"BigInt"` label.
    BigInt(String),
}

impl Serialize for Oson {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Oson::Magic(number) => serializer.serialize_i64(*number),
            Oson::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for entry in list {
                    seq.serialize_element(entry)?;
                }
                seq.end()
            }
        }
    }
}

impl Serialize for OsonValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            OsonValue::Null => serializer.serialize_unit(),
            OsonValue::Bool(b) => serializer.serialize_bool(*b),
            OsonValue::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            // flat sequences never hold special numbers; they travel as
            // sentinels instead
            OsonValue::Number(n) => serializer.serialize_f64(n.as_f64()),
            OsonValue::String(s) => serializer.serialize_str(s),
            OsonValue::Array(refs) => {
                let mut seq = serializer.serialize_seq(Some(refs.len()))?;
                for reference in refs {
                    seq.serialize_element(reference)?;
                }
                seq.end()
            }
            OsonValue::Tagged { label, refs } => {
                let mut seq = serializer.serialize_seq(Some(1 + refs.len()))?;
                seq.serialize_element(label)?;
                for reference in refs {
                    seq.serialize_element(reference)?;
                }
                seq.end()
            }
            OsonValue::BigInt(hex) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(BIG_INT_LABEL)?;
                seq.serialize_element(hex)?;
                seq.end()
            }
        }
    }
}

/// Head element of an encoded entry array: a reference number marks a plain
/// array entry, a label string marks a tagged entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum Head {
    Reference(i64),
    Label(String),
}

impl<'de> Deserialize<'de> for Oson {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OsonVisitor;

        impl<'de> Visitor<'de> for OsonVisitor {
            type Value = Oson;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a sentinel number or an entry sequence")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Oson::Magic(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(Oson::Magic)
                    .map_err(|_| E::custom("sentinel out of range"))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut list = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(entry) = seq.next_element()? {
                    list.push(entry);
                }
                Ok(Oson::List(list))
            }
        }

        deserializer.deserialize_any(OsonVisitor)
    }
}

impl<'de> Deserialize<'de> for OsonValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = OsonValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an oson entry")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(OsonValue::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(OsonValue::Number(Number::Integer(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                if let Ok(value) = i64::try_from(value) {
                    Ok(OsonValue::Number(Number::Integer(value)))
                } else {
                    Ok(OsonValue::Number(Number::Float(value as f64)))
                }
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(OsonValue::Number(Number::Float(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(OsonValue::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(OsonValue::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(OsonValue::Null)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                match seq.next_element::<Head>()? {
                    None => Ok(OsonValue::Array(Vec::new())),
                    Some(Head::Reference(first)) => {
                        let mut refs = vec![first];
                        while let Some(reference) = seq.next_element::<i64>()? {
                            refs.push(reference);
                        }
                        Ok(OsonValue::Array(refs))
                    }
                    Some(Head::Label(label)) if label == BIG_INT_LABEL => {
                        let hex: String = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("big-integer entry without digits"))?;
                        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
                        Ok(OsonValue::BigInt(hex))
                    }
                    Some(Head::Label(label)) => {
                        let mut refs = Vec::new();
                        while let Some(reference) = seq.next_element::<i64>()? {
                            refs.push(reference);
                        }
                        Ok(OsonValue::Tagged { label, refs })
                    }
                }
            }
        }

        deserializer.deserialize_any(EntryVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_json(oson: &Oson) -> String {
        serde_json::to_string(oson).unwrap()
    }

    fn from_json(text: &str) -> Oson {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn magic_serializes_as_bare_number() {
        assert_eq!(to_json(&Oson::Magic(-1)), "-1");
        assert_eq!(from_json("-3"), Oson::Magic(-3));
    }

    #[test]
    fn primitive_entries_are_verbatim() {
        let list = Oson::List(vec![
            OsonValue::Number(Number::Integer(3)),
            OsonValue::String("a".to_string()),
            OsonValue::Bool(true),
            OsonValue::Null,
            OsonValue::Number(Number::Float(-1.5)),
        ]);
        assert_eq!(to_json(&list), r#"[3,"a",true,null,-1.5]"#);
        assert_eq!(from_json(r#"[3,"a",true,null,-1.5]"#), list);
    }

    #[test]
    fn integers_keep_integer_notation() {
        // an i64 entry must not pick up a fractional part on the wire
        let list = Oson::List(vec![OsonValue::Number(Number::Integer(42))]);
        assert_eq!(to_json(&list), "[42]");
    }

    #[test]
    fn array_entries_are_reference_lists() {
        let list = Oson::List(vec![OsonValue::Array(vec![1, -2, 2])]);
        assert_eq!(to_json(&list), "[[1,-2,2]]");
        assert_eq!(from_json("[[1,-2,2]]"), list);
        assert_eq!(from_json("[[]]"), Oson::List(vec![OsonValue::Array(vec![])]));
    }

    #[test]
    fn tagged_entries_lead_with_their_label() {
        let list = Oson::List(vec![OsonValue::Tagged {
            label: String::new(),
            refs: vec![1, 2],
        }]);
        assert_eq!(to_json(&list), r#"[["",1,2]]"#);
        assert_eq!(from_json(r#"[["",1,2]]"#), list);

        let map = Oson::List(vec![OsonValue::Tagged {
            label: "Map".to_string(),
            refs: vec![],
        }]);
        assert_eq!(to_json(&map), r#"[["Map"]]"#);
        assert_eq!(from_json(r#"[["Map"]]"#), map);
    }

    #[test]
    fn big_integer_entries_inline_their_digits() {
        let list = Oson::List(vec![OsonValue::BigInt("-3".to_string())]);
        assert_eq!(to_json(&list), r#"[["BigInt","-3"]]"#);
        assert_eq!(from_json(r#"[["BigInt","-3"]]"#), list);
    }

    #[test]
    fn head_discriminator_separates_entry_kinds() {
        // number head: array entry; string head: tagged entry
        assert_eq!(from_json("[[0]]"), Oson::List(vec![OsonValue::Array(vec![0])]));
        assert_eq!(
            from_json(r#"[["Set",1]]"#),
            Oson::List(vec![OsonValue::Tagged {
                label: "Set".to_string(),
                refs: vec![1],
            }])
        );
    }
}
