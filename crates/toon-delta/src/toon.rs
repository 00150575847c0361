//! TOON v3 writer: the compact side of the comparison.
//!
//! Output shapes, chosen per value:
//!
//! - **Fields**: `key: value`, nested objects as `key:` plus an indented block
//! - **Inline arrays**: primitive arrays as `key[N]: v1,v2,v3`
//! - **Tabular arrays**: uniform primitive-only objects as
//!   `key[N]{f1,f2}:` followed by one `v1,v2` row per object
//! - **List items**: everything else as `key[N]:` followed by `- item` lines;
//!   an object item carries its first field on the hyphen line
//!
//! Strings are quoted only when an unquoted form would be ambiguous, and the
//! active delimiter is announced in every array header except for the
//! default comma.
//!
//! ```
//! use serde_json::json;
//! use toon_delta::toon::ToonEncoder;
//!
//! let value = json!({"name": "Alice", "tags": ["rust", "wasm"]});
//! let toon = ToonEncoder::default().encode_value(&value);
//! assert_eq!(toon, "name: Alice\ntags[2]: rust,wasm");
//! ```

use std::str::FromStr;

use serde_json::{Map, Number, Value};

/// Separator between inline array values, tabular cells and header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Pipe,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// Marker written inside `[N...]`; comma is implied and left out.
    fn header_marker(self) -> &'static str {
        match self {
            Delimiter::Comma => "",
            Delimiter::Tab => "\t",
            Delimiter::Pipe => "|",
        }
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comma" | "," => Ok(Delimiter::Comma),
            "tab" | "\t" => Ok(Delimiter::Tab),
            "pipe" | "|" => Ok(Delimiter::Pipe),
            other => Err(format!(
                "unknown delimiter '{other}' (expected comma, tab or pipe)"
            )),
        }
    }
}

/// Layout options for [`ToonEncoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    pub delimiter: Delimiter,
}

impl EncodeOptions {
    pub const DEFAULT: EncodeOptions = EncodeOptions {
        indent: 2,
        delimiter: Delimiter::Comma,
    };
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Encoder from a decoded JSON value to TOON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToonEncoder {
    options: EncodeOptions,
}

impl ToonEncoder {
    pub const DEFAULT: ToonEncoder = ToonEncoder {
        options: EncodeOptions::DEFAULT,
    };

    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EncodeOptions {
        self.options
    }

    /// Encode `value`. Total over every JSON value; the output has no
    /// trailing newline.
    pub fn encode_value(&self, value: &Value) -> String {
        let mut writer = LineWriter::new(self.options);
        match value {
            Value::Object(map) => writer.fields(map, 0),
            Value::Array(items) => writer.array(None, items, 0, false),
            _ => return primitive(value, self.options.delimiter),
        }
        writer.finish()
    }
}

/// Accumulates output lines, each already indented.
struct LineWriter {
    unit: String,
    delimiter: Delimiter,
    lines: Vec<String>,
}

impl LineWriter {
    fn new(options: EncodeOptions) -> Self {
        Self {
            unit: " ".repeat(options.indent),
            delimiter: options.delimiter,
            lines: Vec::new(),
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }

    fn push(&mut self, depth: usize, line: &str) {
        let mut out = self.unit.repeat(depth);
        out.push_str(line);
        self.lines.push(out);
    }

    /// Emit the first line of a construct at logical `depth`. When the
    /// construct opens a list item, the line moves one level out behind `- `
    /// so that its children still land at `depth + 1`.
    fn lead(&mut self, depth: usize, as_item: bool, line: &str) {
        if as_item {
            self.push(depth.saturating_sub(1), &format!("- {line}"));
        } else {
            self.push(depth, line);
        }
    }

    fn fields(&mut self, map: &Map<String, Value>, depth: usize) {
        for (key, value) in map {
            self.field(key, value, depth, false);
        }
    }

    fn field(&mut self, key: &str, value: &Value, depth: usize, as_item: bool) {
        let key = encode_key(key);
        match value {
            Value::Array(items) => self.array(Some(key.as_str()), items, depth, as_item),
            Value::Object(map) => {
                self.lead(depth, as_item, &format!("{key}:"));
                self.fields(map, depth + 1);
            }
            _ => {
                let text = primitive(value, self.delimiter);
                self.lead(depth, as_item, &format!("{key}: {text}"));
            }
        }
    }

    fn array(&mut self, key: Option<&str>, items: &[Value], depth: usize, as_item: bool) {
        if items.is_empty() {
            let header = self.header(key, 0, None);
            self.lead(depth, as_item, &header);
            return;
        }

        if items.iter().all(is_primitive) {
            let header = self.header(key, items.len(), None);
            let values = self.join(items.iter().map(|v| primitive(v, self.delimiter)));
            self.lead(depth, as_item, &format!("{header} {values}"));
            return;
        }

        if let Some(fields) = tabular_fields(items) {
            let header = self.header(key, items.len(), Some(fields.as_slice()));
            self.lead(depth, as_item, &header);
            for item in items {
                if let Value::Object(map) = item {
                    let row = self.join(fields.iter().map(|field| {
                        map.get(field)
                            .map(|v| primitive(v, self.delimiter))
                            .unwrap_or_default()
                    }));
                    self.push(depth + 1, &row);
                }
            }
            return;
        }

        let header = self.header(key, items.len(), None);
        self.lead(depth, as_item, &header);
        for item in items {
            self.list_item(item, depth + 1);
        }
    }

    fn list_item(&mut self, item: &Value, depth: usize) {
        match item {
            Value::Object(map) if map.is_empty() => self.push(depth, "-"),
            Value::Object(map) => {
                for (i, (key, value)) in map.iter().enumerate() {
                    self.field(key, value, depth + 1, i == 0);
                }
            }
            Value::Array(inner) => self.array(None, inner, depth + 1, true),
            _ => {
                let text = primitive(item, self.delimiter);
                self.push(depth, &format!("- {text}"));
            }
        }
    }

    /// `key[N]:`, `[N|]{a|b}:` and friends.
    fn header(&self, key: Option<&str>, len: usize, fields: Option<&[String]>) -> String {
        let mut out = String::new();
        if let Some(key) = key {
            out.push_str(key);
        }
        out.push('[');
        out.push_str(&len.to_string());
        out.push_str(self.delimiter.header_marker());
        out.push(']');
        if let Some(fields) = fields {
            out.push('{');
            out.push_str(&self.join(fields.iter().map(|f| encode_key(f))));
            out.push('}');
        }
        out.push(':');
        out
    }

    fn join(&self, parts: impl Iterator<Item = String>) -> String {
        let sep = self.delimiter.as_char().to_string();
        parts.collect::<Vec<_>>().join(&sep)
    }
}

fn is_primitive(value: &Value) -> bool {
    !value.is_object() && !value.is_array()
}

/// Field names of a tabular array: every item is an object with the same
/// key set as the first one, and every value is primitive.
fn tabular_fields(items: &[Value]) -> Option<Vec<String>> {
    let first = items.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }
    let fields: Vec<String> = first.keys().cloned().collect();
    let uniform = items.iter().all(|item| match item.as_object() {
        Some(obj) => {
            obj.len() == fields.len()
                && fields.iter().all(|f| obj.get(f).is_some_and(is_primitive))
        }
        None => false,
    });
    uniform.then_some(fields)
}

/// Scalar rendering. Composite values never reach here.
fn primitive(value: &Value, delimiter: Delimiter) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => encode_string(s, delimiter),
        _ => String::from("null"),
    }
}

/// Integers verbatim; floats in shortest decimal form. `f64`'s `Display`
/// never uses an exponent, and `-0` collapses to `0`.
fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => String::from("0"),
        Some(f) if f.is_finite() => f.to_string(),
        _ => String::from("null"),
    }
}

fn encode_string(s: &str, delimiter: Delimiter) -> String {
    if is_safe_unquoted(s, delimiter) {
        s.to_string()
    } else {
        quote(s)
    }
}

/// A string may go unquoted only if reading it back yields the same string.
fn is_safe_unquoted(s: &str, delimiter: Delimiter) -> bool {
    !s.is_empty()
        && s.trim() == s
        && !matches!(s, "true" | "false" | "null")
        && !looks_numeric(s)
        && !s.contains([':', '"', '\\', '[', ']', '{', '}', '\n', '\r', '\t'])
        && !s.contains(delimiter.as_char())
        && !s.starts_with('-')
}

/// `-?\d+(\.\d+)?([eE][+-]?\d+)?`, which also covers leading-zero forms
/// such as `05`.
fn looks_numeric(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut pos = usize::from(bytes.first() == Some(&b'-'));

    let digits = |pos: &mut usize| {
        let start = *pos;
        while bytes.get(*pos).is_some_and(u8::is_ascii_digit) {
            *pos += 1;
        }
        *pos > start
    };

    if !digits(&mut pos) {
        return false;
    }
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        if !digits(&mut pos) {
            return false;
        }
    }
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        if !digits(&mut pos) {
            return false;
        }
    }
    pos == bytes.len()
}

/// Keys matching `^[A-Za-z_][A-Za-z0-9_.]*$` stay bare; anything else is quoted.
fn encode_key(key: &str) -> String {
    let mut chars = key.chars();
    let bare = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if bare {
        key.to_string()
    } else {
        quote(key)
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
