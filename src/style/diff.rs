use bytes::Bytes;

use crate::style::traits::{hex_pairs, quote, Style};

/// A plain, diff-friendly dialect: no per-class labels on records or
/// sequences, bare keys where the key is identifier-like, and the same
/// line structure as `pretty` so structural diffs line up.
pub struct DiffStyle;

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl Style for DiffStyle {
    fn name(&self) -> &'static str {
        "diff"
    }

    fn record_key(&self, key: &str) -> String {
        if is_bare_key(key) {
            key.to_string()
        } else {
            quote(key)
        }
    }

    fn record_empty(&self, _class: &str) -> String {
        "{}".to_string()
    }

    fn record_head(&self, _class: &str) -> String {
        "{\n".to_string()
    }

    fn record_tail(&self, indent: &str) -> String {
        format!("{indent}}}")
    }

    fn record_key_val_sep(&self) -> &'static str {
        ": "
    }

    fn record_entry_sep(&self) -> &'static str {
        ",\n"
    }

    fn map_empty(&self, _class: &str) -> String {
        "Map {}".to_string()
    }

    fn map_head(&self, _class: &str) -> String {
        "Map {\n".to_string()
    }

    fn map_tail(&self, indent: &str) -> String {
        format!("{indent}}}")
    }

    fn map_key_start(&self) -> &'static str {
        ""
    }

    fn map_key_val_sep(&self) -> &'static str {
        " => "
    }

    fn map_entry_sep(&self) -> &'static str {
        ",\n"
    }

    fn seq_empty(&self, _class: &str) -> String {
        "[]".to_string()
    }

    fn seq_head(&self, _class: &str) -> String {
        "[\n".to_string()
    }

    fn seq_tail(&self, indent: &str) -> String {
        format!("{indent}]")
    }

    fn seq_entry_sep(&self) -> &'static str {
        ",\n"
    }

    fn set_empty(&self, _class: &str) -> String {
        "Set {}".to_string()
    }

    fn set_head(&self, _class: &str) -> String {
        "Set {\n".to_string()
    }

    fn set_tail(&self, indent: &str) -> String {
        format!("{indent}}}")
    }

    fn set_entry_sep(&self) -> &'static str {
        ",\n"
    }

    fn string_empty(&self) -> String {
        "\"\"".to_string()
    }

    fn string_one_line(&self, s: &str) -> String {
        quote(s)
    }

    fn string_head(&self) -> &'static str {
        "String(\n"
    }

    fn string_line(&self, s: &str) -> String {
        s.to_string()
    }

    fn string_line_sep(&self) -> &'static str {
        ""
    }

    fn string_tail(&self, indent: &str) -> String {
        format!("{indent})")
    }

    fn buffer_chunk_size(&self) -> usize {
        16
    }

    fn buffer_empty(&self) -> String {
        "Buffer <>".to_string()
    }

    fn buffer_start(&self) -> &'static str {
        "Buffer <"
    }

    fn buffer_body(&self, b: &Bytes) -> String {
        hex_pairs(b)
    }

    fn buffer_end(&self, _b: &Bytes) -> String {
        ">".to_string()
    }

    fn buffer_head(&self) -> &'static str {
        "Buffer <\n"
    }

    fn buffer_key(&self, _offset: usize) -> String {
        // offsets would make inserts ripple through every later line
        String::new()
    }

    fn buffer_key_sep(&self) -> &'static str {
        ""
    }

    fn buffer_line(&self, chunk: &Bytes, _chunk_size: usize) -> String {
        hex_pairs(chunk)
    }

    fn buffer_line_sep(&self) -> &'static str {
        "\n"
    }

    fn buffer_tail(&self, indent: &str) -> String {
        format!("\n{indent}>")
    }

    fn error_empty(&self, class: &str, message: &str) -> String {
        if message.is_empty() {
            format!("{class} {{}}")
        } else {
            format!("{class}: {message}")
        }
    }

    fn error_head(&self, class: &str, message: &str) -> String {
        if message.is_empty() {
            format!("{class} {{\n")
        } else {
            format!("{class}: {message} {{\n")
        }
    }

    fn error_tail(&self, indent: &str) -> String {
        format!("{indent}}}")
    }
}
