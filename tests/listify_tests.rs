//! Exact wire vectors for the linearizer, asserted against the JSON text of
//! the flat sequence. These pin down the format, not just round-trip
//! behavior: two fields that share a value must share a position, and a
//! container may reference its own position.

use chrono::{TimeZone, Utc};
use num_bigint::BigInt;
use oson::{listify, oson, ErrorValue, Pattern, Value};
use url::Url;

fn wire(value: &Value) -> String {
    let oson = listify(value).expect("listify failed");
    serde_json::to_string(&oson).expect("JSON encoding failed")
}

#[test]
fn serializes_numbers() {
    assert_eq!(wire(&oson!(3)), "[3]");
    assert_eq!(wire(&oson!(0)), "[0]");
    assert_eq!(wire(&oson!(-1)), "[-1]");
    assert_eq!(wire(&oson!(-1.3)), "[-1.3]");
    assert_eq!(wire(&Value::from(f64::NAN)), "-3");
    assert_eq!(wire(&Value::from(f64::INFINITY)), "-4");
    assert_eq!(wire(&Value::from(f64::NEG_INFINITY)), "-5");
}

#[test]
fn serializes_strings() {
    assert_eq!(wire(&oson!("a")), r#"["a"]"#);
    assert_eq!(wire(&oson!("abc")), r#"["abc"]"#);
    assert_eq!(wire(&oson!("")), r#"[""]"#);
}

#[test]
fn serializes_booleans() {
    assert_eq!(wire(&oson!(true)), "[true]");
    assert_eq!(wire(&oson!(false)), "[false]");
}

#[test]
fn serializes_nullish_values() {
    assert_eq!(wire(&oson!(undefined)), "-1");
    assert_eq!(wire(&oson!(null)), "[null]");
}

#[test]
fn serializes_bigints() {
    assert_eq!(wire(&Value::from(BigInt::from(0))), r#"[["BigInt","0"]]"#);
    assert_eq!(wire(&Value::from(BigInt::from(-3))), r#"[["BigInt","-3"]]"#);

    let positive: BigInt = "34632049865209468204965".parse().unwrap();
    assert_eq!(wire(&Value::from(positive)), r#"[["BigInt","755683d47f1a120b7a5"]]"#);

    let negative: BigInt = "-1314293875349763465329750293542387".parse().unwrap();
    assert_eq!(
        wire(&Value::from(negative)),
        r#"[["BigInt","-40ccb88ce2f250ce016cffd6f5f3"]]"#
    );
}

#[test]
fn serializes_arrays() {
    assert_eq!(wire(&oson!(["a", "b", "c"])), r#"[[1,2,3],"a","b","c"]"#);
    assert_eq!(wire(&oson!([1, 2, 3])), "[[1,2,3],1,2,3]");
    assert_eq!(wire(&oson!([])), "[[]]");
    assert_eq!(wire(&oson!([(-1)])), "[[1],-1]");
    assert_eq!(wire(&oson!([0, ""])), r#"[[1,2],0,""]"#);
}

#[test]
fn serializes_sparse_arrays() {
    use oson::Element::{Hole, Item};

    let sparse = |elements| wire(&Value::sparse_array(elements));
    assert_eq!(sparse(vec![Hole, Item(oson!(1))]), "[[-2,1],1]");
    assert_eq!(
        sparse(vec![Item(oson!(1)), Hole, Item(oson!(3))]),
        "[[1,-2,2],1,3]"
    );
    assert_eq!(
        sparse(vec![Item(oson!(1)), Hole, Item(oson!(3)), Hole, Item(oson!(4))]),
        "[[1,-2,2,-2,3],1,3,4]"
    );
    assert_eq!(
        sparse(vec![Item(oson!(1)), Hole, Hole, Hole, Item(oson!(-1)), Hole]),
        "[[1,-2,-2,-2,2,-2],1,-1]"
    );
}

#[test]
fn serializes_objects() {
    assert_eq!(wire(&oson!({ "a": 0 })), r#"[["",1,2],"a",0]"#);
    assert_eq!(wire(&oson!({ "a": "b" })), r#"[["",1,2],"a","b"]"#);
    assert_eq!(wire(&oson!({ "a": 0, "b": 1 })), r#"[["",1,2,3,4],"a",0,"b",1]"#);
    assert_eq!(wire(&oson!({})), r#"[[""]]"#);
}

#[test]
fn serializes_builtin_containers() {
    let error = Value::error(ErrorValue::new("Error", "msg"));
    assert_eq!(wire(&error), r#"[["Error",1,2],"Error","msg"]"#);

    let named = Value::error(ErrorValue::new("name", "msg"));
    assert_eq!(wire(&named), r#"[["Error",1,2],"name","msg"]"#);

    // a cause without a stack still occupies the stack slot, as undefined
    if let Some(handle) = named.as_error() {
        handle.borrow_mut().cause = Some(named.clone());
    }
    assert_eq!(wire(&named), r#"[["Error",1,2,-1,0],"name","msg"]"#);

    assert_eq!(wire(&Value::map(vec![])), r#"[["Map"]]"#);
    assert_eq!(
        wire(&Value::map(vec![(oson!("a"), oson!(0))])),
        r#"[["Map",1],[2,3],"a",0]"#
    );
    assert_eq!(wire(&Value::set(vec![])), r#"[["Set"]]"#);
    assert_eq!(wire(&Value::set(vec![oson!("a")])), r#"[["Set",1],"a"]"#);

    let url = Url::parse("http://example.com/path?param#route").unwrap();
    assert_eq!(
        wire(&Value::Url(url)),
        r#"[["URL",1],"http://example.com/path?param#route"]"#
    );
}

#[test]
fn serializes_bytes_and_dates_and_patterns() {
    assert_eq!(
        wire(&Value::bytes(vec![3, 2, 1])),
        r#"[["Uint8Array",1],"AwIB"]"#
    );

    let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    assert_eq!(
        wire(&Value::Date(instant)),
        r#"[["Date",1],"2024-05-01T12:00:00.000Z"]"#
    );

    assert_eq!(
        wire(&Value::Pattern(Pattern::new("asdf", ""))),
        r#"[["RegExp",1],"asdf"]"#
    );
    assert_eq!(
        wire(&Value::Pattern(Pattern::new("jjj.+", "gmi"))),
        r#"[["RegExp",1,2],"jjj.+","gmi"]"#
    );
}

#[test]
fn serializes_nested_objects() {
    assert_eq!(
        wire(&oson!({ "a": { "b": 0 } })),
        r#"[["",1,2],"a",["",3,4],"b",0]"#
    );
    assert_eq!(
        wire(&oson!({ "a": ["", 0] })),
        r#"[["",1,2],"a",[3,4],"",0]"#
    );
    assert_eq!(
        wire(&oson!({ "a": 0, "b": 1, "c": [{ "x": "a", "y": ["b"] }] })),
        r#"[["",1,2,3,4,5,6],"a",0,"b",1,"c",[7],["",8,1,9,10],"x","y",[3]]"#
    );
    assert_eq!(
        wire(&oson!({ "v": { "w": {} } })),
        r#"[["",1,2],"v",["",3,4],"w",[""]]"#
    );
}

#[test]
fn serializes_circular_references() {
    // obj.a.b.c = obj
    let obj = oson!({ "a": { "b": { "c": 0 } } });
    let a = obj.as_object().unwrap().borrow().get("a").cloned().unwrap();
    let b = a.as_object().unwrap().borrow().get("b").cloned().unwrap();
    b.as_object()
        .unwrap()
        .borrow_mut()
        .insert("c".to_string(), obj.clone());
    assert_eq!(wire(&obj), r#"[["",1,2],"a",["",3,4],"b",["",5,0],"c"]"#);

    // left.value = right, right.value = left
    let left = oson!({ "value": 0 });
    let right = oson!({ "value": 0 });
    left.as_object()
        .unwrap()
        .borrow_mut()
        .insert("value".to_string(), right.clone());
    right
        .as_object()
        .unwrap()
        .borrow_mut()
        .insert("value".to_string(), left.clone());
    assert_eq!(
        wire(&oson!([{ "pair": 0 }])),
        r#"[[1],["",2,3],"pair",0]"#
    );
    assert_eq!(
        wire(&Value::array(vec![left, right])),
        r#"[[1,3],["",2,3],"value",["",2,1]]"#
    );
}

#[test]
fn serializes_repeated_references() {
    let inner = oson!({ "a": { "b": 42 } });
    let outer = oson!({});
    {
        let mut map = outer.as_object().unwrap().borrow_mut();
        map.insert("x".to_string(), inner.clone());
        map.insert("y".to_string(), inner.clone());
    }
    assert_eq!(
        wire(&outer),
        r#"[["",1,2,7,2],"x",["",3,4],"a",["",5,6],"b",42,"y"]"#
    );
}
