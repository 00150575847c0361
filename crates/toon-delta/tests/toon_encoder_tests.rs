/// Layout tests for the TOON writer.
///
/// Every expected string is the complete encoder output, so indentation,
/// header syntax and quoting are all pinned.
use serde_json::{json, Value};
use toon_delta::{encode_toon, Delimiter, EncodeOptions, ToonEncoder};

fn with_delimiter(value: &Value, delimiter: Delimiter) -> String {
    ToonEncoder::new(EncodeOptions {
        delimiter,
        ..EncodeOptions::default()
    })
    .encode_value(value)
}

// ============================================================================
// Primitives at the root
// ============================================================================

#[test]
fn root_primitives() {
    assert_eq!(encode_toon(&json!(null)), "null");
    assert_eq!(encode_toon(&json!(true)), "true");
    assert_eq!(encode_toon(&json!(42)), "42");
    assert_eq!(encode_toon(&json!("hello")), "hello");
}

#[test]
fn root_string_that_looks_like_a_literal_is_quoted() {
    assert_eq!(encode_toon(&json!("true")), "\"true\"");
    assert_eq!(encode_toon(&json!("12")), "\"12\"");
}

#[test]
fn empty_root_object_is_empty_text() {
    assert_eq!(encode_toon(&json!({})), "");
}

// ============================================================================
// Objects
// ============================================================================

#[test]
fn flat_object_keeps_insertion_order() {
    let value: Value = serde_json::from_str(r#"{"name":"Alice","age":30}"#).unwrap();
    assert_eq!(encode_toon(&value), "name: Alice\nage: 30");
}

#[test]
fn nested_object_is_indented() {
    let value = json!({"user": {"id": 1, "name": "Ada"}});
    assert_eq!(encode_toon(&value), "user:\n  id: 1\n  name: Ada");
}

#[test]
fn empty_nested_object_is_bare_key() {
    let value = json!({"meta": {}});
    assert_eq!(encode_toon(&value), "meta:");
}

#[test]
fn custom_indent_width() {
    let value = json!({"a": {"b": 1}});
    let toon = ToonEncoder::new(EncodeOptions {
        indent: 4,
        ..EncodeOptions::default()
    })
    .encode_value(&value);
    assert_eq!(toon, "a:\n    b: 1");
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn small_object_with_inline_array() {
    let value: Value = serde_json::from_str(r#"{"a": [1,2,3]}"#).unwrap();
    assert_eq!(encode_toon(&value), "a[3]: 1,2,3");
}

#[test]
fn empty_array_field() {
    assert_eq!(encode_toon(&json!({"items": []})), "items[0]:");
}

#[test]
fn root_primitive_array() {
    let value = json!([1, "two", true, null]);
    assert_eq!(encode_toon(&value), "[4]: 1,two,true,null");
}

#[test]
fn tabular_array_of_uniform_objects() {
    let value: Value =
        serde_json::from_str(r#"{"items":[{"sku":"A1","qty":2},{"sku":"B2","qty":1}]}"#).unwrap();
    assert_eq!(encode_toon(&value), "items[2]{sku,qty}:\n  A1,2\n  B2,1");
}

#[test]
fn tabular_rows_follow_first_object_key_order() {
    let value: Value = serde_json::from_str(r#"[{"a":1,"b":2},{"b":3,"a":4}]"#).unwrap();
    assert_eq!(encode_toon(&value), "[2]{a,b}:\n  1,2\n  4,3");
}

#[test]
fn tabular_cells_quote_delimiter_and_colon() {
    let value: Value =
        serde_json::from_str(r#"{"rows":[{"name":"a,b","n":1},{"name":"x:y","n":2}]}"#).unwrap();
    assert_eq!(
        encode_toon(&value),
        "rows[2]{name,n}:\n  \"a,b\",1\n  \"x:y\",2"
    );
}

#[test]
fn objects_with_different_keys_become_list_items() {
    let value: Value = serde_json::from_str(r#"{"items":[{"a":1,"b":2},{"a":3}]}"#).unwrap();
    assert_eq!(encode_toon(&value), "items[2]:\n  - a: 1\n    b: 2\n  - a: 3");
}

#[test]
fn mixed_array_uses_list_items() {
    let value = json!({"items": [1, {"a": 1}, "x"]});
    assert_eq!(encode_toon(&value), "items[3]:\n  - 1\n  - a: 1\n  - x");
}

#[test]
fn nested_object_in_list_item_sits_below_siblings() {
    let value: Value = serde_json::from_str(r#"{"items":[{"cfg":{"x":1},"id":2},5]}"#).unwrap();
    assert_eq!(
        encode_toon(&value),
        "items[2]:\n  - cfg:\n      x: 1\n    id: 2\n  - 5"
    );
}

#[test]
fn array_of_arrays() {
    let value = json!({"pairs": [[1, 2], [3, 4]]});
    assert_eq!(encode_toon(&value), "pairs[2]:\n  - [2]: 1,2\n  - [2]: 3,4");
}

#[test]
fn empty_object_list_item_is_bare_hyphen() {
    let value = json!({"items": [{}, 1]});
    assert_eq!(encode_toon(&value), "items[2]:\n  -\n  - 1");
}

#[test]
fn tabular_array_as_first_field_of_list_item() {
    let value: Value =
        serde_json::from_str(r#"{"groups":[{"members":[{"id":1},{"id":2}],"name":"g"}]}"#)
            .unwrap();
    assert_eq!(
        encode_toon(&value),
        "groups[1]:\n  - members[2]{id}:\n      1\n      2\n    name: g"
    );
}

// ============================================================================
// Delimiters
// ============================================================================

#[test]
fn pipe_delimiter_is_announced_in_headers() {
    let value: Value =
        serde_json::from_str(r#"{"items":[{"sku":"A1","qty":2},{"sku":"B2","qty":1}]}"#).unwrap();
    assert_eq!(
        with_delimiter(&value, Delimiter::Pipe),
        "items[2|]{sku|qty}:\n  A1|2\n  B2|1"
    );
}

#[test]
fn tab_delimiter_inline_array() {
    let value = json!({"tags": ["a", "b"]});
    assert_eq!(with_delimiter(&value, Delimiter::Tab), "tags[2\t]: a\tb");
}

#[test]
fn quoting_follows_active_delimiter() {
    let value = json!({"tags": ["a,b", "c|d"]});
    assert_eq!(
        with_delimiter(&value, Delimiter::Comma),
        "tags[2]: \"a,b\",c|d"
    );
    assert_eq!(
        with_delimiter(&value, Delimiter::Pipe),
        "tags[2|]: a,b|\"c|d\""
    );
}

#[test]
fn delimiter_parses_from_names() {
    assert_eq!("comma".parse::<Delimiter>(), Ok(Delimiter::Comma));
    assert_eq!("tab".parse::<Delimiter>(), Ok(Delimiter::Tab));
    assert_eq!("|".parse::<Delimiter>(), Ok(Delimiter::Pipe));
    assert!("semicolon".parse::<Delimiter>().is_err());
}

// ============================================================================
// Strings, keys, numbers
// ============================================================================

#[test]
fn ambiguous_strings_are_quoted() {
    let value: Value = serde_json::from_str(
        r#"{"a":"","b":" pad","c":"true","d":"42","e":"05","f":"x:y","g":"-dash","h":"a,b","i":"say \"hi\"","j":"line\nbreak","k":"[x]","l":"plain text"}"#,
    )
    .unwrap();
    let expected = [
        r#"a: """#,
        r#"b: " pad""#,
        r#"c: "true""#,
        r#"d: "42""#,
        r#"e: "05""#,
        r#"f: "x:y""#,
        r#"g: "-dash""#,
        r#"h: "a,b""#,
        r#"i: "say \"hi\"""#,
        r#"j: "line\nbreak""#,
        r#"k: "[x]""#,
        "l: plain text",
    ]
    .join("\n");
    assert_eq!(encode_toon(&value), expected);
}

#[test]
fn unicode_strings_stay_bare() {
    let value = json!({"city": "Zürich", "greeting": "你好"});
    assert_eq!(encode_toon(&value), "city: Zürich\ngreeting: 你好");
}

#[test]
fn keys_outside_identifier_pattern_are_quoted() {
    let value: Value =
        serde_json::from_str(r#"{"first name":1,"user.id":2,"9lives":3,"":4,"_ok":5}"#).unwrap();
    assert_eq!(
        encode_toon(&value),
        "\"first name\": 1\nuser.id: 2\n\"9lives\": 3\n\"\": 4\n_ok: 5"
    );
}

#[test]
fn numbers_are_normalized() {
    let value: Value = serde_json::from_str(
        r#"{"a":1.50,"b":1.0,"c":-0.0,"d":1e21,"e":0.000001,"f":18446744073709551615,"g":-7}"#,
    )
    .unwrap();
    assert_eq!(
        encode_toon(&value),
        "a: 1.5\nb: 1\nc: 0\nd: 1000000000000000000000\ne: 0.000001\nf: 18446744073709551615\ng: -7"
    );
}

#[test]
fn output_has_no_trailing_newline() {
    let value = json!({"a": {"b": [1, 2]}, "c": [{"d": 1}, {"d": 2}]});
    let toon = encode_toon(&value);
    assert!(!toon.ends_with('\n'));
    assert_eq!(toon, toon.trim_end());
}
