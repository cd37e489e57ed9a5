//! Graph linearization: turning a value graph into a flat sequence.
//!
//! [`listify`] walks a [`Value`] graph in pre-order and assigns every
//! distinct reference a position in the output sequence, replacing nested
//! references with position numbers. The identity index maps each value to
//! its position *before* its sub-values are visited, so a container that
//! reaches itself resolves to its own already-reserved position instead of
//! recursing forever. The same mechanism collapses repeated references to one
//! shared entry.
//!
//! ## Examples
//!
//! ```rust
//! use oson::{listify, oson};
//!
//! let flat = listify(&oson!([1, 2, 3])).unwrap();
//! assert_eq!(serde_json::to_string(&flat).unwrap(), "[[1,2,3],1,2,3]");
//! ```

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use std::collections::HashMap;
use std::rc::Rc;

use crate::constructors::{registry_label, ConstructorMap, PLAIN_OBJECT_LABEL};
use crate::error::Result;
use crate::global_constructor_map;
use crate::list::{Oson, OsonValue};
use crate::magic::{to_magic_number, ARRAY_HOLE_INDEX};
use crate::value::{Element, Value};

/// Encodes a value graph into a flat sequence using the default constructor
/// map.
///
/// Returns [`Oson::Magic`] when the root itself is non-representable
/// (`undefined`, `NaN`, `±Infinity`), otherwise a sequence whose position 0
/// is the root entry.
///
/// # Examples
///
/// ```rust
/// use oson::{listify, oson, Oson};
///
/// assert_eq!(listify(&oson!(undefined)).unwrap(), Oson::Magic(-1));
///
/// let flat = listify(&oson!({ "a": 0 })).unwrap();
/// assert_eq!(serde_json::to_string(&flat).unwrap(), r#"[["",1,2],"a",0]"#);
/// ```
///
/// # Errors
///
/// Returns an error only when a caller-registered `from` procedure fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn listify(value: &Value) -> Result<Oson> {
    listify_with(value, global_constructor_map())
}

/// Encodes a value graph into a flat sequence using an explicit constructor
/// map.
///
/// # Errors
///
/// Returns an error only when a caller-registered `from` procedure fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn listify_with(value: &Value, constructors: &ConstructorMap) -> Result<Oson> {
    if let Some(magic) = to_magic_number(value) {
        return Ok(Oson::Magic(magic));
    }
    let mut listifier = Listifier {
        constructors,
        list: Vec::new(),
        index: HashMap::new(),
    };
    listifier.add(value)?;
    Ok(Oson::List(listifier.list))
}

/// Key of the identity index: by value for primitives and value-typed
/// instances, by allocation address for shared containers.
#[derive(PartialEq, Eq, Hash)]
enum IdentityKey {
    Null,
    Bool(bool),
    /// Integral numbers key by exact value, so `Integer(3)` and `Float(3.0)`
    /// share one position and large integers never collide through an `f64`.
    Integer(i64),
    /// Bit pattern of a non-integral float.
    Float(u64),
    String(String),
    BigInt(BigInt),
    Date(DateTime<Utc>),
    Pattern(String, String),
    Url(String),
    Address(usize),
}

impl IdentityKey {
    fn of(value: &Value) -> IdentityKey {
        match value {
            // Undefined and non-finite numbers are sentinels and never
            // reach the index
            Value::Undefined => IdentityKey::Null,
            Value::Null => IdentityKey::Null,
            Value::Bool(b) => IdentityKey::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => IdentityKey::Integer(i),
                None => IdentityKey::Float(n.as_f64().to_bits()),
            },
            Value::String(s) => IdentityKey::String(s.clone()),
            Value::BigInt(b) => IdentityKey::BigInt(b.clone()),
            Value::Date(d) => IdentityKey::Date(*d),
            Value::Pattern(p) => IdentityKey::Pattern(p.source.clone(), p.flags.clone()),
            Value::Url(u) => IdentityKey::Url(u.as_str().to_string()),
            Value::Array(a) => IdentityKey::Address(Rc::as_ptr(a) as usize),
            Value::Object(o) => IdentityKey::Address(Rc::as_ptr(o) as usize),
            Value::Map(m) => IdentityKey::Address(Rc::as_ptr(m) as usize),
            Value::Set(s) => IdentityKey::Address(Rc::as_ptr(s) as usize),
            Value::Error(e) => IdentityKey::Address(Rc::as_ptr(e) as usize),
            Value::Bytes(b) => IdentityKey::Address(Rc::as_ptr(b) as usize),
            Value::Custom(c) => IdentityKey::Address(c.data_address()),
        }
    }
}

struct Listifier<'a> {
    constructors: &'a ConstructorMap,
    list: Vec<OsonValue>,
    index: HashMap<IdentityKey, usize>,
}

impl Listifier<'_> {
    /// Returns the reference for `value`: a sentinel, an existing position,
    /// or a freshly reserved one.
    fn add(&mut self, value: &Value) -> Result<i64> {
        if let Some(magic) = to_magic_number(value) {
            return Ok(magic);
        }
        let key = IdentityKey::of(value);
        if let Some(&position) = self.index.get(&key) {
            return Ok(position as i64);
        }

        // reserve the position and index it before recursing into
        // sub-values; a cycle back to this value must hit the index
        let position = self.list.len();
        self.list.push(OsonValue::Null);
        self.index.insert(key, position);

        let entry = match value {
            Value::Null => OsonValue::Null,
            Value::Bool(b) => OsonValue::Bool(*b),
            Value::Number(n) => OsonValue::Number(n.clone()),
            Value::String(s) => OsonValue::String(s.clone()),
            Value::BigInt(b) => OsonValue::BigInt(b.to_str_radix(16)),
            Value::Array(elements) => {
                let snapshot: Vec<Element> = elements.borrow().clone();
                let mut refs = Vec::with_capacity(snapshot.len());
                for element in &snapshot {
                    refs.push(match element {
                        Element::Hole => ARRAY_HOLE_INDEX,
                        Element::Item(item) => self.add(item)?,
                    });
                }
                OsonValue::Array(refs)
            }
            Value::Object(object) => {
                let pairs: Vec<(String, Value)> = object
                    .borrow()
                    .iter()
                    .map(|(key, val)| (key.clone(), val.clone()))
                    .collect();
                self.plain_object_entry(pairs)?
            }
            other => self.constructed_entry(other)?,
        };
        self.list[position] = entry;
        Ok(position as i64)
    }

    /// Entry for a plain object: alternating key and value references.
    fn plain_object_entry(&mut self, pairs: Vec<(String, Value)>) -> Result<OsonValue> {
        let mut refs = Vec::with_capacity(pairs.len() * 2);
        for (key, val) in pairs {
            refs.push(self.add(&Value::String(key))?);
            refs.push(self.add(&val)?);
        }
        Ok(OsonValue::Tagged {
            label: PLAIN_OBJECT_LABEL.to_string(),
            refs,
        })
    }

    /// Entry for an instance that decomposes through the constructor map.
    fn constructed_entry(&mut self, value: &Value) -> Result<OsonValue> {
        let label = match registry_label(value) {
            Some(label) => label.to_string(),
            None => return self.plain_object_entry(Vec::new()),
        };
        match self.constructors.get(&label) {
            Some(constructor) => {
                let parts = constructor.from(value)?;
                let mut refs = Vec::with_capacity(parts.len());
                for part in &parts {
                    refs.push(self.add(part)?);
                }
                Ok(OsonValue::Tagged { label, refs })
            }
            // without a registered constructor the payload is opaque;
            // encode it as an empty plain object, the same degradation the
            // enumerable-fields fallback produces for unknown classes
            None => self.plain_object_entry(Vec::new()),
        }
    }
}
