//! Graph materialization: rebuilding a value graph from a flat sequence.
//!
//! [`delistify`] is the inverse of [`listify`](crate::listify). It walks the
//! sequence from position 0, keeping a position-indexed output arena. An
//! array or bucket stub is stored in the arena *before* its sub-values are
//! recovered, so references back to an entry under construction resolve to
//! the same shared handle — that is what restores cycles and shared
//! references without unbounded recursion.
//!
//! ## Examples
//!
//! ```rust
//! use oson::{delistify, oson, Oson};
//!
//! let flat: Oson = serde_json::from_str(r#"[["",1,2],"a",0]"#).unwrap();
//! assert_eq!(delistify(&flat).unwrap(), oson!({ "a": 0 }));
//! ```

use num_bigint::BigInt;
use std::cell::RefCell;
use std::rc::Rc;

use crate::constructors::{ConstructorMap, SerializableConstructor, PLAIN_OBJECT_LABEL};
use crate::error::{Capability, Error, Result};
use crate::global_constructor_map;
use crate::list::{Oson, OsonValue};
use crate::magic::{from_magic_number, ARRAY_HOLE_INDEX};
use crate::map::ObjectMap;
use crate::value::{ArrayRef, Element, ObjectRef, Value};

/// Decodes a flat sequence back into a value graph using the default
/// constructor map.
///
/// # Examples
///
/// ```rust
/// use oson::{delistify, Oson, Value};
///
/// assert_eq!(delistify(&Oson::Magic(-1)).unwrap(), Value::Undefined);
/// ```
///
/// # Errors
///
/// Fails with [`Error::EmptyData`] for an empty sequence,
/// [`Error::InvalidData`] for a bare number that is not a recognized
/// sentinel, [`Error::UnknownType`] when a label has no constructor, and
/// [`Error::BadReference`]/[`Error::MalformedEntry`] for inconsistent
/// entries.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn delistify(oson: &Oson) -> Result<Value> {
    delistify_with(oson, global_constructor_map())
}

/// Decodes a flat sequence back into a value graph using an explicit
/// constructor map.
///
/// # Errors
///
/// See [`delistify`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn delistify_with(oson: &Oson, constructors: &ConstructorMap) -> Result<Value> {
    let list = match oson {
        Oson::Magic(number) => {
            return from_magic_number(*number).ok_or(Error::InvalidData(*number))
        }
        Oson::List(list) => list,
    };
    if list.is_empty() {
        return Err(Error::EmptyData);
    }
    let mut delistifier = Delistifier {
        constructors,
        list,
        index: vec![None; list.len()],
        composing: vec![false; list.len()],
    };
    delistifier.recover(0)
}

struct Delistifier<'a> {
    constructors: &'a ConstructorMap,
    list: &'a [OsonValue],
    /// Position-indexed arena of recovered values; a slot is filled before
    /// its entry's sub-values are recovered.
    index: Vec<Option<Value>>,
    /// Positions currently inside a value-constructor recovery, to reject
    /// cycles that no stub can break.
    composing: Vec<bool>,
}

impl Delistifier<'_> {
    fn recover(&mut self, reference: i64) -> Result<Value> {
        if let Some(value) = from_magic_number(reference) {
            return Ok(value);
        }
        let position =
            usize::try_from(reference).map_err(|_| Error::BadReference(reference))?;
        if position >= self.list.len() {
            return Err(Error::BadReference(reference));
        }
        if let Some(value) = &self.index[position] {
            return Ok(value.clone());
        }

        match &self.list[position] {
            OsonValue::Null => Ok(self.store(position, Value::Null)),
            OsonValue::Bool(b) => Ok(self.store(position, Value::Bool(*b))),
            OsonValue::Number(n) => Ok(self.store(position, Value::Number(n.clone()))),
            OsonValue::String(s) => Ok(self.store(position, Value::String(s.clone()))),
            OsonValue::BigInt(hex) => {
                let bigint = BigInt::parse_bytes(hex.as_bytes(), 16)
                    .ok_or_else(|| Error::malformed(format!("invalid big-integer digits {hex:?}")))?;
                Ok(self.store(position, Value::BigInt(bigint)))
            }
            OsonValue::Array(refs) => {
                let refs = refs.clone();
                let elements: ArrayRef = Rc::new(RefCell::new(Vec::with_capacity(refs.len())));
                self.index[position] = Some(Value::Array(Rc::clone(&elements)));
                for reference in refs {
                    let element = if reference == ARRAY_HOLE_INDEX {
                        Element::Hole
                    } else {
                        Element::Item(self.recover(reference)?)
                    };
                    elements.borrow_mut().push(element);
                }
                Ok(Value::Array(elements))
            }
            OsonValue::Tagged { label, refs } if label == PLAIN_OBJECT_LABEL => {
                let refs = refs.clone();
                if refs.len() % 2 != 0 {
                    return Err(Error::malformed("object entry with a dangling key reference"));
                }
                let object: ObjectRef =
                    Rc::new(RefCell::new(ObjectMap::with_capacity(refs.len() / 2)));
                self.index[position] = Some(Value::Object(Rc::clone(&object)));
                for pair in refs.chunks(2) {
                    let key = match self.recover(pair[0])? {
                        Value::String(key) => key,
                        other => return Err(Error::type_mismatch("string key", &other)),
                    };
                    let value = self.recover(pair[1])?;
                    object.borrow_mut().insert(key, value);
                }
                Ok(Value::Object(object))
            }
            OsonValue::Tagged { label, refs } => {
                let (label, refs) = (label.clone(), refs.clone());
                self.constructed(position, &label, &refs)
            }
        }
    }

    fn constructed(&mut self, position: usize, label: &str, refs: &[i64]) -> Result<Value> {
        let constructors = self.constructors;
        let constructor = constructors
            .get(label)
            .ok_or_else(|| Error::unknown_type(label, Capability::Stub))?;
        match constructor {
            SerializableConstructor::Value { create, .. } => {
                if self.composing[position] {
                    return Err(Error::malformed(format!(
                        "cycle through value constructor {label:?}"
                    )));
                }
                self.composing[position] = true;
                let parts = self.recover_all(refs)?;
                self.composing[position] = false;
                let value = create(parts)?;
                Ok(self.store(position, value))
            }
            SerializableConstructor::Bucket { stub, hydrate, .. } => {
                // the stub enters the arena before its parts are recovered,
                // so parts referencing this entry resolve to the stub
                let value = stub();
                self.index[position] = Some(value.clone());
                let parts = self.recover_all(refs)?;
                hydrate(&value, parts)?;
                Ok(value)
            }
        }
    }

    fn recover_all(&mut self, refs: &[i64]) -> Result<Vec<Value>> {
        refs.iter().map(|reference| self.recover(*reference)).collect()
    }

    fn store(&mut self, position: usize, value: Value) -> Value {
        self.index[position] = Some(value.clone());
        value
    }
}
