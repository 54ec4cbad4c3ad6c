use bytes::Bytes;

use crate::style::traits::{hex_pairs, quote, Style};

/// The default human-oriented dialect: type labels on non-plain
/// containers, JSON-quoted keys, hex blobs with offsets.
pub struct PrettyStyle;

impl Style for PrettyStyle {
    fn name(&self) -> &'static str {
        "pretty"
    }

    fn record_key(&self, key: &str) -> String {
        quote(key)
    }

    fn record_empty(&self, class: &str) -> String {
        match class {
            "Object" => "{}".to_string(),
            _ => format!("{class} {{}}"),
        }
    }

    fn record_head(&self, class: &str) -> String {
        // plain records with a default prototype carry no label
        match class {
            "Object" => "{\n".to_string(),
            _ => format!("{class} {{\n"),
        }
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

    fn map_empty(&self, class: &str) -> String {
        format!("{class} {{}}")
    }

    fn map_head(&self, class: &str) -> String {
        format!("{class} {{\n")
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

    fn seq_empty(&self, class: &str) -> String {
        match class {
            "Array" => "[]".to_string(),
            _ => format!("{class} []"),
        }
    }

    fn seq_head(&self, class: &str) -> String {
        match class {
            "Array" => "[\n".to_string(),
            _ => format!("{class} [\n"),
        }
    }

    fn seq_tail(&self, indent: &str) -> String {
        format!("{indent}]")
    }

    fn seq_entry_sep(&self) -> &'static str {
        ",\n"
    }

    fn set_empty(&self, class: &str) -> String {
        format!("{class} {{}}")
    }

    fn set_head(&self, class: &str) -> String {
        format!("{class} {{\n")
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

    fn buffer_key(&self, offset: usize) -> String {
        format!("{offset:04x}")
    }

    fn buffer_key_sep(&self) -> &'static str {
        ": "
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

    fn markup(&self, source: &str) -> Option<String> {
        Some(source.trim().to_string())
    }
}
