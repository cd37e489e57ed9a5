/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Beyond JSON, the literal may use `undefined` for the absent value. Arrays
/// and objects allocate fresh shared handles; to express *shared* or cyclic
/// structure, clone the resulting `Value` and insert it in multiple places.
///
/// # Examples
///
/// ```rust
/// use oson::{oson, Value};
///
/// let value = oson!({
///     "name": "Alice",
///     "age": 30,
///     "tags": ["rust", "oson"],
///     "nick": undefined
/// });
/// assert!(value.is_object());
/// assert_eq!(oson!(null), Value::Null);
/// assert_eq!(oson!(undefined), Value::Undefined);
/// ```
#[macro_export]
macro_rules! oson {
    // Keywords
    (null) => {
        $crate::Value::Null
    };

    (undefined) => {
        $crate::Value::Undefined
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    // Arrays
    ([]) => {
        $crate::Value::array(::std::vec::Vec::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::array(::std::vec![$($crate::oson!($elem)),*])
    };

    // Objects
    ({}) => {
        $crate::Value::empty_object()
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::ObjectMap::new();
        $(
            object.insert($key.to_string(), $crate::oson!($value));
        )*
        $crate::Value::object(object)
    }};

    // Anything else with a From impl: numbers, strings, booleans in
    // variables, ...
    ($other:expr) => {
        $crate::Value::from($other)
    };
}
