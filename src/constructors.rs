//! The type registry: labels mapped to decompose/recompose procedures.
//!
//! A [`ConstructorMap`] tells the codec how to take a typed instance apart
//! into an ordered list of sub-values and how to put it back together. Two
//! kinds of entry exist:
//!
//! - **Value constructors** (`from` + `create`) for immutable instances that
//!   can be built in one step from their fully-decoded parts — timestamps,
//!   byte buffers, patterns, URLs. These cannot be part of a reference cycle.
//! - **Bucket constructors** (`from` + `stub` + `hydrate`) for containers
//!   that must exist as an empty placeholder *before* their parts are
//!   decoded, because a part may reference the container itself — maps, sets,
//!   errors.
//!
//! [`global_constructor_map`] returns the shared default map covering the
//! built-in labels. It is built once and never mutated; to change resolution
//! for a call, pass your own map to the `_with` API variants.
//!
//! ## Registering a custom type
//!
//! ```rust
//! use oson::{ConstructorMap, Error, Value};
//!
//! #[derive(Default)]
//! struct Point { x: f64, y: f64 }
//!
//! let mut constructors = ConstructorMap::with_defaults();
//! constructors.insert_value(
//!     "Point",
//!     |value| {
//!         let custom = value.as_custom().ok_or_else(|| Error::type_mismatch("Point", value))?;
//!         custom
//!             .with(|p: &Point| vec![Value::from(p.x), Value::from(p.y)])
//!             .ok_or_else(|| Error::type_mismatch("Point", value))
//!     },
//!     |parts| match (parts[0].as_f64(), parts[1].as_f64()) {
//!         (Some(x), Some(y)) => Ok(Value::custom("Point", Point { x, y })),
//!         _ => Err(Error::malformed("Point expects two numbers")),
//!     },
//! );
//!
//! let point = Value::custom("Point", Point { x: 1.0, y: 2.0 });
//! let text = oson::stringify_with(&point, &constructors).unwrap();
//! let back = oson::parse_with(&text, &constructors).unwrap();
//! assert_eq!(back.as_custom().unwrap().with(|p: &Point| p.x), Some(1.0));
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use std::sync::{Arc, OnceLock};
use url::Url;

use crate::error::{Error, Result};
use crate::value::{Element, ErrorValue, Pattern, Value};

/// Label for plain key-value objects. Reserved; cannot be overridden.
pub const PLAIN_OBJECT_LABEL: &str = "";
/// Reserved label for big-integer entries.
pub const BIG_INT_LABEL: &str = "BigInt";
/// Label for error instances.
pub const ERROR_LABEL: &str = "Error";
/// Label for byte buffers.
pub const UINT8_ARRAY_LABEL: &str = "Uint8Array";
/// Label for ordered key-value maps.
pub const MAP_LABEL: &str = "Map";
/// Label for sets.
pub const SET_LABEL: &str = "Set";
/// Label for timestamps.
pub const DATE_LABEL: &str = "Date";
/// Label for regular-expression patterns.
pub const REG_EXP_LABEL: &str = "RegExp";
/// Label for absolute URLs.
pub const URL_LABEL: &str = "URL";

/// Decomposes an instance into an ordered list of sub-values.
pub type FromFn = Arc<dyn Fn(&Value) -> Result<Vec<Value>> + Send + Sync>;
/// Builds an instance in one step from its decoded sub-values.
pub type CreateFn = Arc<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;
/// Creates an empty, not-yet-hydrated instance.
pub type StubFn = Arc<dyn Fn() -> Value + Send + Sync>;
/// Fills a stub with its decoded sub-values.
pub type HydrateFn = Arc<dyn Fn(&Value, Vec<Value>) -> Result<()> + Send + Sync>;

/// A registered serializer for one label.
#[derive(Clone)]
pub enum SerializableConstructor {
    /// An immutable instance built directly from its parts.
    Value { from: FromFn, create: CreateFn },
    /// A container hydrated in place so its parts may reference it.
    Bucket {
        from: FromFn,
        stub: StubFn,
        hydrate: HydrateFn,
    },
}

impl SerializableConstructor {
    /// Decomposes `value` using this entry's `from` procedure.
    pub fn from(&self, value: &Value) -> Result<Vec<Value>> {
        match self {
            SerializableConstructor::Value { from, .. } => from(value),
            SerializableConstructor::Bucket { from, .. } => from(value),
        }
    }
}

/// A map from type labels to their serializers.
///
/// Iteration order is insertion order; lookups are by label. The built-in
/// defaults cover `Error`, `Uint8Array`, `Map`, `Set`, `Date`, `RegExp` and
/// `URL`, mirroring the labels other oson implementations emit.
#[derive(Clone, Default)]
pub struct ConstructorMap(IndexMap<String, SerializableConstructor>);

impl ConstructorMap {
    /// Creates an empty map with no registered labels.
    #[must_use]
    pub fn new() -> Self {
        ConstructorMap(IndexMap::new())
    }

    /// Creates a map pre-populated with the built-in default serializers.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut map = ConstructorMap::new();
        register_error(&mut map);
        register_uint8_array(&mut map);
        register_map(&mut map);
        register_set(&mut map);
        register_date(&mut map);
        register_reg_exp(&mut map);
        register_url(&mut map);
        map
    }

    /// Registers a value constructor for `label`, replacing any existing
    /// entry.
    pub fn insert_value<F, C>(&mut self, label: impl Into<String>, from: F, create: C)
    where
        F: Fn(&Value) -> Result<Vec<Value>> + Send + Sync + 'static,
        C: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        self.0.insert(
            label.into(),
            SerializableConstructor::Value {
                from: Arc::new(from),
                create: Arc::new(create),
            },
        );
    }

    /// Registers a bucket constructor for `label`, replacing any existing
    /// entry.
    pub fn insert_bucket<F, S, H>(&mut self, label: impl Into<String>, from: F, stub: S, hydrate: H)
    where
        F: Fn(&Value) -> Result<Vec<Value>> + Send + Sync + 'static,
        S: Fn() -> Value + Send + Sync + 'static,
        H: Fn(&Value, Vec<Value>) -> Result<()> + Send + Sync + 'static,
    {
        self.0.insert(
            label.into(),
            SerializableConstructor::Bucket {
                from: Arc::new(from),
                stub: Arc::new(stub),
                hydrate: Arc::new(hydrate),
            },
        );
    }

    /// Looks up the serializer registered for `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&SerializableConstructor> {
        self.0.get(label)
    }

    /// Returns `true` if a serializer is registered for `label`.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.0.contains_key(label)
    }

    /// Removes the serializer registered for `label`.
    pub fn remove(&mut self, label: &str) -> Option<SerializableConstructor> {
        self.0.shift_remove(label)
    }
}

/// Returns the shared default constructor map.
///
/// Built on first use and immutable afterwards; all top-level operations
/// without an explicit map resolve labels through it.
#[must_use]
pub fn global_constructor_map() -> &'static ConstructorMap {
    static GLOBAL: OnceLock<ConstructorMap> = OnceLock::new();
    GLOBAL.get_or_init(ConstructorMap::with_defaults)
}

/// Built-in label for a value, or `None` for variants the linearizer encodes
/// structurally (scalars, arrays, plain objects).
pub(crate) fn registry_label(value: &Value) -> Option<&str> {
    match value {
        Value::Error(_) => Some(ERROR_LABEL),
        Value::Bytes(_) => Some(UINT8_ARRAY_LABEL),
        Value::Map(_) => Some(MAP_LABEL),
        Value::Set(_) => Some(SET_LABEL),
        Value::Date(_) => Some(DATE_LABEL),
        Value::Pattern(_) => Some(REG_EXP_LABEL),
        Value::Url(_) => Some(URL_LABEL),
        Value::Custom(custom) => Some(custom.label()),
        _ => None,
    }
}

fn expect_string(part: Option<Value>, what: &str) -> Result<String> {
    match part {
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(Error::type_mismatch(what, &other)),
        None => Err(Error::malformed(format!("missing {what}"))),
    }
}

fn register_error(map: &mut ConstructorMap) {
    map.insert_bucket(
        ERROR_LABEL,
        |value| {
            let error = value
                .as_error()
                .ok_or_else(|| Error::type_mismatch("error", value))?;
            let error = error.borrow();
            let mut parts = vec![
                Value::from(error.name.clone()),
                Value::from(error.message.clone()),
            ];
            if let Some(stack) = &error.stack {
                parts.push(Value::from(stack.clone()));
            }
            if let Some(cause) = &error.cause {
                // keep the part list unambiguous: a cause without a stack
                // gets an explicit absent placeholder in the stack slot
                if error.stack.is_none() {
                    parts.push(Value::Undefined);
                }
                parts.push(cause.clone());
            }
            Ok(parts)
        },
        || Value::error(ErrorValue::default()),
        |stub, parts| {
            let error = stub
                .as_error()
                .ok_or_else(|| Error::type_mismatch("error", stub))?;
            let mut error = error.borrow_mut();
            let mut parts = parts.into_iter();
            error.name = expect_string(parts.next(), "error name")?;
            error.message = expect_string(parts.next(), "error message")?;
            error.stack = match parts.next() {
                Some(Value::String(stack)) => Some(stack),
                Some(Value::Undefined) | None => None,
                Some(other) => return Err(Error::type_mismatch("error stack", &other)),
            };
            error.cause = parts.next();
            Ok(())
        },
    );
}

fn register_uint8_array(map: &mut ConstructorMap) {
    map.insert_value(
        UINT8_ARRAY_LABEL,
        |value| {
            let bytes = value
                .as_bytes()
                .ok_or_else(|| Error::type_mismatch("bytes", value))?;
            Ok(vec![Value::from(BASE64.encode(bytes.as_slice()))])
        },
        |parts| {
            let mut parts = parts.into_iter();
            let text = expect_string(parts.next(), "base64 data")?;
            let data = BASE64
                .decode(text.as_bytes())
                .map_err(|err| Error::malformed(format!("invalid base64 data: {err}")))?;
            Ok(Value::bytes(data))
        },
    );
}

fn register_map(map: &mut ConstructorMap) {
    map.insert_bucket(
        MAP_LABEL,
        |value| {
            let entries = value
                .as_map()
                .ok_or_else(|| Error::type_mismatch("map", value))?;
            Ok(entries
                .borrow()
                .iter()
                .map(|(key, val)| Value::array(vec![key.clone(), val.clone()]))
                .collect())
        },
        || Value::map(Vec::new()),
        |stub, parts| {
            let entries = stub
                .as_map()
                .ok_or_else(|| Error::type_mismatch("map", stub))?;
            for part in parts {
                let pair = part
                    .as_array()
                    .ok_or_else(|| Error::type_mismatch("map entry pair", &part))?;
                let pair = pair.borrow();
                if pair.len() != 2 {
                    return Err(Error::malformed("map entry is not a pair"));
                }
                let (key, value) = match (&pair[0], &pair[1]) {
                    (Element::Item(key), Element::Item(value)) => (key.clone(), value.clone()),
                    _ => return Err(Error::malformed("map entry contains a hole")),
                };
                drop(pair);
                entries.borrow_mut().push((key, value));
            }
            Ok(())
        },
    );
}

fn register_set(map: &mut ConstructorMap) {
    map.insert_bucket(
        SET_LABEL,
        |value| {
            let values = value
                .as_set()
                .ok_or_else(|| Error::type_mismatch("set", value))?;
            Ok(values.borrow().iter().cloned().collect())
        },
        || Value::set(Vec::new()),
        |stub, parts| {
            let values = stub
                .as_set()
                .ok_or_else(|| Error::type_mismatch("set", stub))?;
            values.borrow_mut().extend(parts);
            Ok(())
        },
    );
}

fn register_date(map: &mut ConstructorMap) {
    map.insert_value(
        DATE_LABEL,
        |value| {
            let date = value
                .as_date()
                .ok_or_else(|| Error::type_mismatch("date", value))?;
            // millisecond precision with a Z suffix, the wire text other
            // oson implementations emit
            Ok(vec![Value::from(
                date.to_rfc3339_opts(SecondsFormat::Millis, true),
            )])
        },
        |parts| {
            let mut parts = parts.into_iter();
            let text = expect_string(parts.next(), "date text")?;
            let date = DateTime::parse_from_rfc3339(&text)
                .map_err(|err| Error::malformed(format!("invalid date {text:?}: {err}")))?;
            Ok(Value::Date(date.with_timezone(&Utc)))
        },
    );
}

fn register_reg_exp(map: &mut ConstructorMap) {
    map.insert_value(
        REG_EXP_LABEL,
        |value| {
            let pattern = value
                .as_pattern()
                .ok_or_else(|| Error::type_mismatch("regexp", value))?;
            let mut parts = vec![Value::from(pattern.source.clone())];
            if !pattern.flags.is_empty() {
                parts.push(Value::from(pattern.flags.clone()));
            }
            Ok(parts)
        },
        |parts| {
            let mut parts = parts.into_iter();
            let source = expect_string(parts.next(), "pattern source")?;
            let flags = match parts.next() {
                Some(Value::String(flags)) => flags,
                None => String::new(),
                Some(other) => return Err(Error::type_mismatch("pattern flags", &other)),
            };
            Ok(Value::Pattern(Pattern { source, flags }))
        },
    );
}

fn register_url(map: &mut ConstructorMap) {
    map.insert_value(
        URL_LABEL,
        |value| {
            let url = value
                .as_url()
                .ok_or_else(|| Error::type_mismatch("url", value))?;
            Ok(vec![Value::from(url.as_str())])
        },
        |parts| {
            let mut parts = parts.into_iter();
            let href = expect_string(parts.next(), "url href")?;
            let url = Url::parse(&href)
                .map_err(|err| Error::malformed(format!("invalid url {href:?}: {err}")))?;
            Ok(Value::Url(url))
        },
    );
}
