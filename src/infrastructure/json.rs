//! JSON codec for outline documents
//!
//! Output uses a fixed indentation width and leaves non-ASCII text unescaped.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};

/// Serialize `value` as pretty JSON with `indent` spaces per level.
pub fn to_pretty_string<T: Serialize + ?Sized>(value: &T, indent: usize) -> serde_json::Result<String> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Decode a UTF-8 JSON document.
pub fn from_str(content: &str) -> serde_json::Result<Value> {
    serde_json::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_non_ascii_text_when_rendering_then_keeps_it_unescaped() {
        let out = to_pretty_string(&json!({"title": "བྱང་ཆུབ།"}), 4).unwrap();
        assert_eq!(out, "{\n    \"title\": \"བྱང་ཆུབ།\"\n}\n");
    }
}
