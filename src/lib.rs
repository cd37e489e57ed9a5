//! # oson
//!
//! oson structured object notation: a superset of JSON that can faithfully
//! round-trip the values JSON cannot — `undefined`, `NaN` and `±Infinity`,
//! sparse arrays, arbitrary-precision integers, circular and repeated
//! references, and class-like instances via a pluggable constructor map.
//!
//! ## How it works
//!
//! Instead of nesting, oson *linearizes*: every distinct value in the graph
//! gets a position in one flat, JSON-compatible array, and containers store
//! the positions of their children. Two fields that share a value share a
//! position, and a container may reference its own position, so identity and
//! cycles survive the trip through text. The flat sequence is then wrapped
//! in ordinary JSON.
//!
//! ## Quick Start
//!
//! ```rust
//! use oson::{oson, parse, stringify};
//!
//! let value = oson!({ "a": 0 });
//! let text = stringify(&value).unwrap();
//! assert_eq!(text, r#"[["",1,2],"a",0]"#);
//! assert_eq!(parse(&text).unwrap(), value);
//! ```
//!
//! Values that JSON would mangle come back intact:
//!
//! ```rust
//! use oson::{oson, parse, stringify, Value};
//!
//! let text = stringify(&oson!(undefined)).unwrap();
//! assert_eq!(text, "-1");
//! assert_eq!(parse(&text).unwrap(), Value::Undefined);
//! ```
//!
//! And so do circular references:
//!
//! ```rust
//! use oson::{oson, parse, stringify, Value};
//!
//! let object = oson!({});
//! object
//!     .as_object()
//!     .unwrap()
//!     .borrow_mut()
//!     .insert("self".to_string(), object.clone());
//!
//! let text = stringify(&object).unwrap();
//! assert_eq!(text, r#"[["",1,0],"self"]"#);
//!
//! let back = parse(&text).unwrap();
//! let field = back.as_object().unwrap().borrow().get("self").cloned().unwrap();
//! assert!(back.ptr_eq(&field));
//! ```
//!
//! ## Built-in and custom types
//!
//! The default [`ConstructorMap`] covers errors, byte buffers, ordered maps,
//! sets, timestamps, patterns and URLs. Registering your own label is a
//! matter of supplying decompose/recompose procedures; the core codec never
//! changes. See the [`constructors`] module.
//!
//! ## Layers
//!
//! - [`listify`] / [`delistify`]: the graph transform, operating on
//!   [`Oson`] flat sequences
//! - [`stringify`] / [`parse`]: the same plus the outer JSON text codec

pub mod constructors;
pub mod de;
pub mod error;
pub mod list;
pub mod macros;
pub mod magic;
pub mod map;
pub mod ser;
pub mod value;

pub use constructors::{
    global_constructor_map, ConstructorMap, SerializableConstructor, BIG_INT_LABEL,
    DATE_LABEL, ERROR_LABEL, MAP_LABEL, PLAIN_OBJECT_LABEL, REG_EXP_LABEL, SET_LABEL,
    UINT8_ARRAY_LABEL, URL_LABEL,
};
pub use de::{delistify, delistify_with};
pub use error::{Capability, Error, Result};
pub use list::{Oson, OsonValue};
pub use map::ObjectMap;
pub use ser::{listify, listify_with};
pub use value::{
    ArrayRef, BytesRef, CustomValue, Element, ErrorRef, ErrorValue, MapRef, Number, ObjectRef,
    Pattern, SetRef, Value,
};

/// Encodes a value graph to oson text using the default constructor map.
///
/// This is [`listify`] followed by standard JSON text encoding.
///
/// # Examples
///
/// ```rust
/// use oson::{oson, stringify};
///
/// assert_eq!(stringify(&oson!([1, 2, 3])).unwrap(), "[[1,2,3],1,2,3]");
/// ```
///
/// # Errors
///
/// Returns an error when a caller-registered decompose procedure fails or
/// the JSON encoder reports a failure.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn stringify(value: &Value) -> Result<String> {
    stringify_with(value, global_constructor_map())
}

/// Encodes a value graph to oson text using an explicit constructor map.
///
/// # Errors
///
/// See [`stringify`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn stringify_with(value: &Value, constructors: &ConstructorMap) -> Result<String> {
    let oson = listify_with(value, constructors)?;
    Ok(serde_json::to_string(&oson)?)
}

/// Decodes oson text back into a value graph using the default constructor
/// map.
///
/// This is standard JSON text decoding followed by [`delistify`].
///
/// # Examples
///
/// ```rust
/// use oson::{oson, parse};
///
/// assert_eq!(parse("[[1,2,3],1,2,3]").unwrap(), oson!([1, 2, 3]));
/// ```
///
/// # Errors
///
/// Returns an error when the text is not valid JSON or the decoded sequence
/// is not valid oson (see [`delistify`]).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<Value> {
    parse_with(text, global_constructor_map())
}

/// Decodes oson text back into a value graph using an explicit constructor
/// map.
///
/// # Errors
///
/// See [`parse`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with(text: &str, constructors: &ConstructorMap) -> Result<Value> {
    let oson: Oson = serde_json::from_str(text)?;
    delistify_with(&oson, constructors)
}
