use bytes::Bytes;

/// The framing tokens of one output dialect.
///
/// Every method is a pure function from the node's context (type name,
/// indentation, key text, body chunk) to literal framing text. The
/// renderer decides *what* to print and in which order; a style decides
/// only what the markers look like.
pub trait Style {
    fn name(&self) -> &'static str;

    /// Prefix framing: indentation, key label, and key/value separator.
    fn start(&self, indent: &str, key: &str, sep: &str) -> String {
        format!("{indent}{key}{sep}")
    }

    /// Tag for a node whose identity was assigned a reference ID.
    fn node_id(&self, id: u32) -> String {
        format!("&ref_{id} ")
    }

    /// Marker substituted for the body of a true ancestor cycle.
    fn circular(&self, id: u32) -> String {
        format!("<*ref_{id}>")
    }

    fn function(&self, class: &str, name: Option<&str>) -> String {
        match name {
            Some(name) => format!("[{class}: {name}]"),
            None => format!("[{class} (anonymous)]"),
        }
    }

    /// `family` is "Symbol" or "Symbol.for" depending on registration.
    fn symbol(&self, family: &str, name: &str) -> String {
        format!("{family}({name})")
    }

    // generic keyed record
    fn record_key(&self, key: &str) -> String;
    fn record_empty(&self, class: &str) -> String;
    fn record_head(&self, class: &str) -> String;
    fn record_tail(&self, indent: &str) -> String;
    fn record_key_val_sep(&self) -> &'static str;
    fn record_entry_sep(&self) -> &'static str;

    // key-keyed collection
    fn map_empty(&self, class: &str) -> String;
    fn map_head(&self, class: &str) -> String;
    fn map_tail(&self, indent: &str) -> String;
    fn map_key_start(&self) -> &'static str;
    fn map_key_val_sep(&self) -> &'static str;
    fn map_entry_sep(&self) -> &'static str;

    // ordered sequence
    fn seq_empty(&self, class: &str) -> String;
    fn seq_head(&self, class: &str) -> String;
    fn seq_tail(&self, indent: &str) -> String;
    fn seq_entry_sep(&self) -> &'static str;

    // unique-element collection
    fn set_empty(&self, class: &str) -> String;
    fn set_head(&self, class: &str) -> String;
    fn set_tail(&self, indent: &str) -> String;
    fn set_entry_sep(&self) -> &'static str;

    // text
    fn string_empty(&self) -> String;
    fn string_one_line(&self, s: &str) -> String;
    fn string_head(&self) -> &'static str;
    /// One line of a multi-line text body; `s` keeps its trailing newline.
    fn string_line(&self, s: &str) -> String;
    fn string_line_sep(&self) -> &'static str;
    fn string_tail(&self, indent: &str) -> String;

    // byte blob
    fn buffer_chunk_size(&self) -> usize;
    fn buffer_empty(&self) -> String;
    fn buffer_start(&self) -> &'static str;
    fn buffer_body(&self, b: &Bytes) -> String;
    fn buffer_end(&self, b: &Bytes) -> String;
    fn buffer_head(&self) -> &'static str;
    fn buffer_key(&self, offset: usize) -> String;
    fn buffer_key_sep(&self) -> &'static str;
    fn buffer_line(&self, chunk: &Bytes, chunk_size: usize) -> String;
    fn buffer_line_sep(&self) -> &'static str;
    fn buffer_tail(&self, indent: &str) -> String;

    // exception-like
    fn error_empty(&self, class: &str, message: &str) -> String;
    fn error_head(&self, class: &str, message: &str) -> String;
    fn error_tail(&self, indent: &str) -> String;

    /// Opaque markup rendering; `None` means the dialect has no markup
    /// form and such values fall back to their record view.
    fn markup(&self, source: &str) -> Option<String> {
        let _ = source;
        None
    }
}

/// JSON-style quoting, shared by dialects for keys and one-line strings.
pub fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}"))
}

/// Space-separated hex pairs for byte blob bodies.
pub fn hex_pairs(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
