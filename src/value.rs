//! Dynamic value representation for oson graphs.
//!
//! This module provides the [`Value`] enum, the in-memory form of everything
//! oson can encode. Unlike a plain JSON value tree, a `Value` is a *graph*:
//! the container variants hold `Rc<RefCell<..>>` handles, so two fields can
//! share one allocation and a container can reach itself. The linearizer
//! collapses shared handles to one sequence position and the materializer
//! restores them, which is how object identity and cycles survive a round
//! trip.
//!
//! ## Core Types
//!
//! - [`Value`]: any oson value (scalars, containers, built-in instances, and
//!   open [`CustomValue`] extension instances)
//! - [`Number`]: numeric values including `Infinity`, `-Infinity` and `NaN`
//! - [`Element`]: one slot of an array, either a value or a genuine hole
//!
//! ## Examples
//!
//! ```rust
//! use oson::{oson, Value};
//!
//! let value = oson!({ "name": "Alice", "tags": ["admin", "vip"] });
//! assert!(value.is_object());
//!
//! // Shared handles stay shared: both fields point at one array.
//! let inner = oson!([1, 2]);
//! let outer = oson!({});
//! if let Some(object) = outer.as_object() {
//!     let mut object = object.borrow_mut();
//!     object.insert("x".to_string(), inner.clone());
//!     object.insert("y".to_string(), inner.clone());
//! }
//! ```

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use url::Url;

use crate::map::ObjectMap;

/// Shared handle to an array's slots.
pub type ArrayRef = Rc<RefCell<Vec<Element>>>;
/// Shared handle to a plain object's fields.
pub type ObjectRef = Rc<RefCell<ObjectMap>>;
/// Shared handle to an ordered key-value map's entry pairs.
pub type MapRef = Rc<RefCell<Vec<(Value, Value)>>>;
/// Shared handle to a set's values.
pub type SetRef = Rc<RefCell<Vec<Value>>>;
/// Shared handle to an error instance.
pub type ErrorRef = Rc<RefCell<ErrorValue>>;
/// Shared handle to an immutable byte buffer.
pub type BytesRef = Rc<Vec<u8>>;

/// A dynamically-typed representation of any oson value.
///
/// Container variants share their payload through `Rc`, so cloning a `Value`
/// is cheap and preserves identity: the clone refers to the same allocation.
///
/// # Examples
///
/// ```rust
/// use oson::{Number, Value};
///
/// let null = Value::Null;
/// let num = Value::Number(Number::Integer(42));
/// let text = Value::String("hello".to_string());
///
/// assert!(null.is_null());
/// assert!(num.is_number());
/// assert!(text.is_string());
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The absent value (`undefined`). Distinct from `Null`.
    Undefined,
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    BigInt(BigInt),
    String(String),
    Array(ArrayRef),
    Object(ObjectRef),
    Map(MapRef),
    Set(SetRef),
    Error(ErrorRef),
    Bytes(BytesRef),
    Date(DateTime<Utc>),
    Pattern(Pattern),
    Url(Url),
    Custom(CustomValue),
}

/// A numeric value that can be an integer, float, or one of the
/// JavaScript-style special values.
///
/// Equality is numeric: `Integer(3) == Float(3.0)`, and `NaN == NaN` (so
/// round-tripped values compare equal). The special variants are what the
/// magic codec recognizes; a finite `Float` or an `Integer` is stored
/// verbatim in the flat sequence.
///
/// # Examples
///
/// ```rust
/// use oson::Number;
///
/// assert_eq!(Number::Integer(3), Number::Float(3.0));
/// assert_eq!(Number::NaN, Number::NaN);
/// assert!(Number::Infinity.is_special());
/// ```
#[derive(Clone, Debug)]
pub enum Number {
    Integer(i64),
    Float(f64),
    Infinity,
    NegativeInfinity,
    NaN,
}

/// One slot of an array: either a present value or a genuine hole.
///
/// Holes are what sparse arrays are made of. A hole is not the same as an
/// `Undefined` value: `[1, <hole>, 3]` and `[1, undefined, 3]` encode
/// differently and round-trip to different arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Hole,
    Item(Value),
}

/// The decomposed state of an error instance.
///
/// `stack` and `cause` are optional; `cause` may reference any value,
/// including the error itself, which is why errors decode through a stub.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorValue {
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
    pub cause: Option<Value>,
}

impl ErrorValue {
    /// Creates an error value with a name and message and no stack or cause.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorValue {
            name: name.into(),
            message: message.into(),
            stack: None,
            cause: None,
        }
    }
}

/// A regular-expression instance: source text plus flags.
///
/// The pattern is carried as text only; no regex engine is involved. Empty
/// flags are omitted from the encoded form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub source: String,
    pub flags: String,
}

impl Pattern {
    /// Creates a pattern from source text and flags.
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Pattern {
            source: source.into(),
            flags: flags.into(),
        }
    }
}

/// An instance of a caller-registered type: an explicit label plus an opaque,
/// shared payload.
///
/// The codec never looks inside the payload; the constructor map entry for
/// the label decomposes and rebuilds it. The payload is shared, so a custom
/// instance participates in identity tracking and cycles like any container.
///
/// # Examples
///
/// ```rust
/// use oson::Value;
///
/// struct Point { x: f64, y: f64 }
///
/// let value = Value::custom("Point", Point { x: 1.0, y: 2.0 });
/// let custom = value.as_custom().unwrap();
/// assert_eq!(custom.label(), "Point");
/// assert_eq!(custom.with(|p: &Point| p.x), Some(1.0));
/// ```
#[derive(Clone)]
pub struct CustomValue {
    label: Rc<str>,
    data: Rc<RefCell<dyn Any>>,
}

impl CustomValue {
    /// Wraps a payload under the given label.
    pub fn new<T: 'static>(label: impl Into<String>, data: T) -> Self {
        CustomValue {
            label: Rc::from(label.into()),
            data: Rc::new(RefCell::new(data)),
        }
    }

    /// Returns the label this instance is registered under.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Runs `f` against the payload if it is a `T`.
    pub fn with<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let borrowed = self.data.borrow();
        borrowed.downcast_ref::<T>().map(f)
    }

    /// Runs `f` against the payload mutably if it is a `T`.
    pub fn with_mut<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut borrowed = self.data.borrow_mut();
        borrowed.downcast_mut::<T>().map(f)
    }

    /// Returns `true` if both handles point at the same payload.
    #[must_use]
    pub fn ptr_eq(&self, other: &CustomValue) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    pub(crate) fn data_address(&self) -> usize {
        Rc::as_ptr(&self.data) as *const () as usize
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValue")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Number {
    /// Returns `true` if this is an integer value.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    /// Returns `true` if this is a floating-point value.
    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Returns `true` if this is a special value (Infinity, -Infinity, NaN).
    #[inline]
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(
            self,
            Number::Infinity | Number::NegativeInfinity | Number::NaN
        )
    }

    /// Converts this number to an `i64` if it is integral and in range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use oson::Number;
    ///
    /// assert_eq!(Number::Integer(42).as_i64(), Some(42));
    /// assert_eq!(Number::Float(42.0).as_i64(), Some(42));
    /// assert_eq!(Number::Float(42.5).as_i64(), None);
    /// assert_eq!(Number::Infinity.as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Converts this number to an `f64`. Always succeeds.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
            Number::Infinity => f64::INFINITY,
            Number::NegativeInfinity => f64::NEG_INFINITY,
            Number::NaN => f64::NAN,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::NaN, Number::NaN) => true,
            (Number::Infinity, Number::Infinity) => true,
            (Number::NegativeInfinity, Number::NegativeInfinity) => true,
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                a.is_finite() && b.is_finite() && a == b
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(fl) => write!(f, "{}", fl),
            Number::Infinity => write!(f, "Infinity"),
            Number::NegativeInfinity => write!(f, "-Infinity"),
            Number::NaN => write!(f, "NaN"),
        }
    }
}

impl From<i8> for Number {
    fn from(value: i8) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<i16> for Number {
    fn from(value: i16) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<u8> for Number {
    fn from(value: u8) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<u16> for Number {
    fn from(value: u16) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::from(value as f64)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Number::NaN
        } else if value == f64::INFINITY {
            Number::Infinity
        } else if value == f64::NEG_INFINITY {
            Number::NegativeInfinity
        } else {
            Number::Float(value)
        }
    }
}

impl Value {
    /// Creates a dense array from a list of values.
    #[must_use]
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(
            items.into_iter().map(Element::Item).collect(),
        )))
    }

    /// Creates an array from explicit slots, which may include holes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use oson::{Element, Value};
    ///
    /// let sparse = Value::sparse_array(vec![
    ///     Element::Item(Value::from(1)),
    ///     Element::Hole,
    ///     Element::Item(Value::from(3)),
    /// ]);
    /// assert_eq!(sparse.as_array().unwrap().borrow().len(), 3);
    /// ```
    #[must_use]
    pub fn sparse_array(elements: Vec<Element>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// Creates a plain object from an ordered map.
    #[must_use]
    pub fn object(map: ObjectMap) -> Value {
        Value::Object(Rc::new(RefCell::new(map)))
    }

    /// Creates an empty plain object.
    #[must_use]
    pub fn empty_object() -> Value {
        Value::object(ObjectMap::new())
    }

    /// Creates an ordered key-value map from entry pairs.
    #[must_use]
    pub fn map(pairs: Vec<(Value, Value)>) -> Value {
        Value::Map(Rc::new(RefCell::new(pairs)))
    }

    /// Creates a set from an ordered list of values.
    #[must_use]
    pub fn set(values: Vec<Value>) -> Value {
        Value::Set(Rc::new(RefCell::new(values)))
    }

    /// Creates an error instance.
    #[must_use]
    pub fn error(error: ErrorValue) -> Value {
        Value::Error(Rc::new(RefCell::new(error)))
    }

    /// Creates a byte buffer.
    #[must_use]
    pub fn bytes(data: Vec<u8>) -> Value {
        Value::Bytes(Rc::new(data))
    }

    /// Wraps a caller-defined payload under a label registered in a
    /// constructor map.
    #[must_use]
    pub fn custom<T: 'static>(label: impl Into<String>, data: T) -> Value {
        Value::Custom(CustomValue::new(label, data))
    }

    /// Returns `true` if the value is `undefined`.
    #[inline]
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if the value is a number.
    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns `true` if the value is a string.
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if the value is an array.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns `true` if the value is a plain object.
    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// If the value is a boolean, returns it.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is an integral number, returns it as `i64`.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// If the value is a number, returns it as `f64`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a big integer, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(b) => Some(b),
            _ => None,
        }
    }

    /// If the value is an array, returns its shared handle.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// If the value is a plain object, returns its shared handle.
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// If the value is an ordered map, returns its shared handle.
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// If the value is a set, returns its shared handle.
    #[inline]
    #[must_use]
    pub fn as_set(&self) -> Option<&SetRef> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an error, returns its shared handle.
    #[inline]
    #[must_use]
    pub fn as_error(&self) -> Option<&ErrorRef> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    /// If the value is a byte buffer, returns its shared handle.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&BytesRef> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// If the value is a timestamp, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    /// If the value is a pattern, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            Value::Pattern(p) => Some(p),
            _ => None,
        }
    }

    /// If the value is a URL, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Value::Url(u) => Some(u),
            _ => None,
        }
    }

    /// If the value is a custom instance, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_custom(&self) -> Option<&CustomValue> {
        match self {
            Value::Custom(c) => Some(c),
            _ => None,
        }
    }

    /// Returns `true` if both values are the same shared allocation.
    ///
    /// This is the "same reference" notion from the encoding side: two
    /// handles the linearizer would collapse into one position. Value-typed
    /// variants (numbers, strings, dates, ...) have no allocation and always
    /// return `false`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use oson::{oson, Value};
    ///
    /// let a = oson!([1]);
    /// let b = a.clone();
    /// assert!(a.ptr_eq(&b));
    /// assert!(!a.ptr_eq(&oson!([1])));
    /// ```
    #[must_use]
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Set(a), Value::Set(b)) => Rc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b),
            (Value::Bytes(a), Value::Bytes(b)) => Rc::ptr_eq(a, b),
            (Value::Custom(a), Value::Custom(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// A short name for the value's kind, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Error(_) => "error",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Pattern(_) => "regexp",
            Value::Url(_) => "url",
            Value::Custom(_) => "custom",
        }
    }
}

/// Structural equality with a pointer-equality shortcut.
///
/// Two handles to the same allocation are equal without recursion, which is
/// what makes `decoded == decoded` and self-referential field checks safe.
/// Comparing two *distinct* isomorphic cyclic graphs does not terminate;
/// cycle-sensitive tests compare identity via [`Value::ptr_eq`] instead.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Pattern(a), Value::Pattern(b)) => a == b,
            (Value::Url(a), Value::Url(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Set(a), Value::Set(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Custom(a), Value::Custom(b)) => a.label() == b.label() && a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

macro_rules! value_from_number {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Number(Number::from(value))
            }
        })*
    };
}

value_from_number!(i8, i16, i32, i64, u8, u16, u32, f32, f64);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::BigInt(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl From<Pattern> for Value {
    fn from(value: Pattern) -> Self {
        Value::Pattern(value)
    }
}

impl From<Url> for Value {
    fn from(value: Url) -> Self {
        Value::Url(value)
    }
}

impl From<ObjectMap> for Value {
    fn from(value: ObjectMap) -> Self {
        Value::object(value)
    }
}

impl From<ErrorValue> for Value {
    fn from(value: ErrorValue) -> Self {
        Value::error(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::bytes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::array(value)
    }
}
