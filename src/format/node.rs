use std::cell::{Cell, OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use bytes::Bytes;
use chrono::SecondsFormat;
use tracing::trace;

use crate::format::classify::{classify, Category};
use crate::format::keys::{collect_keys, lookup_field};
use crate::format::options::FormatOptions;
use crate::style::Style;
use crate::value::{FieldAccess, PropKey, SymbolValue, Value, ValueRef};

/// Per-render-call identity state, shared by the root and every
/// descendant node: subjects in discovery order plus a side table from
/// pointer identity to the allocated reference ID.
#[derive(Default)]
pub struct IdTable {
    subjects: Vec<ValueRef>,
    index: HashMap<usize, u32>,
    counter: u32,
}

impl IdTable {
    fn id_for(&mut self, subject: &ValueRef) -> u32 {
        let addr = Rc::as_ptr(subject) as *const () as usize;
        if let Some(&id) = self.index.get(&addr) {
            return id;
        }
        self.counter += 1;
        self.subjects.push(Rc::clone(subject));
        self.index.insert(addr, self.counter);
        self.counter
    }
}

/// Resolved configuration, shared down the recursion.
struct RenderConfig {
    style: &'static dyn Style,
    indent: String,
    sort: bool,
    chunk_size: usize,
    include_enumerable: bool,
    include_getters: bool,
    markup_string: bool,
}

/// Overridable cycle-detection hook.
///
/// A diff-aware extension installs its own notion of "already rendering
/// this subject" here while reusing the rest of the traversal. The
/// default behavior is [`Format::default_seen`].
pub trait SeenHook {
    fn seen<'a>(&self, node: &Format<'a>) -> Option<&'a Format<'a>>;
}

/// How a node was reached from its parent.
#[derive(Debug, Clone, Default)]
pub enum NodeKey {
    #[default]
    None,
    /// Position within a sequence, blob, or text body.
    Index(usize),
    /// Record property key.
    Prop(PropKey),
    /// Key value within a key-keyed collection.
    Value(ValueRef),
}

/// Options for constructing a child node.
#[derive(Default)]
pub struct ChildSpec {
    pub key: NodeKey,
    /// The child renders a key-position value of a key-keyed collection.
    pub is_key: bool,
    /// Drop hook overrides: key-position children always use the base
    /// cycle logic.
    pub plain: bool,
}

/// One node of the recursive render. A node wraps a subject, knows the
/// ancestor chain it was reached through, and renders to its memo at
/// most once.
pub struct Format<'a> {
    object: ValueRef,
    parent: Option<&'a Format<'a>>,
    level: usize,
    key: NodeKey,
    is_key: bool,
    memo: RefCell<Option<String>>,
    id: Cell<Option<u32>>,
    ids: Rc<RefCell<IdTable>>,
    cfg: Rc<RenderConfig>,
    seen_hook: Option<Rc<dyn SeenHook>>,
    seq_view: OnceCell<Option<Rc<Vec<ValueRef>>>>,
}

impl Format<'static> {
    /// Construct the root node of a render call.
    pub fn root(object: ValueRef, options: FormatOptions) -> Format<'static> {
        let style = options.style.style();
        let chunk_size = options
            .chunk_size
            .unwrap_or_else(|| style.buffer_chunk_size());
        Format {
            object,
            parent: None,
            level: 0,
            key: NodeKey::None,
            is_key: false,
            memo: RefCell::new(None),
            id: Cell::new(None),
            ids: Rc::new(RefCell::new(IdTable::default())),
            cfg: Rc::new(RenderConfig {
                style,
                indent: options.indent,
                sort: options.sort,
                chunk_size,
                include_enumerable: options.include_enumerable,
                include_getters: options.include_getters,
                markup_string: options.markup_string,
            }),
            seen_hook: None,
            seq_view: OnceCell::new(),
        }
    }

    /// Install a cycle-detection override, inherited by every child.
    pub fn with_seen_hook(mut self, hook: Rc<dyn SeenHook>) -> Self {
        self.seen_hook = Some(hook);
        self
    }
}

impl<'a> Format<'a> {
    pub fn object(&self) -> &ValueRef {
        &self.object
    }

    pub fn parent(&self) -> Option<&'a Format<'a>> {
        self.parent
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn is_key(&self) -> bool {
        self.is_key
    }

    /// Construct a correctly-parented child node sharing this render
    /// call's identity table, configuration, and style.
    pub fn child(&self, object: ValueRef, spec: ChildSpec) -> Format<'_> {
        assert!(
            !spec.is_key || self.category() == Category::Map,
            "is_key is only valid for children of key-keyed collections"
        );
        Format {
            object,
            parent: Some(self),
            level: self.level + 1,
            key: spec.key,
            is_key: spec.is_key,
            memo: RefCell::new(None),
            id: Cell::new(None),
            ids: Rc::clone(&self.ids),
            cfg: Rc::clone(&self.cfg),
            seen_hook: if spec.plain {
                None
            } else {
                self.seen_hook.clone()
            },
            seq_view: OnceCell::new(),
        }
    }

    /// The subject's category, refined by per-node state: a sequence
    /// whose probe fails renders as a record for the rest of this call,
    /// and markup only stays markup when the configuration and dialect
    /// both allow the opaque form.
    pub fn category(&self) -> Category {
        match classify(&self.object) {
            Category::Sequence => {
                if matches!(&*self.object, Value::Iterable(_)) && self.sequence_view().is_none() {
                    Category::Record
                } else {
                    Category::Sequence
                }
            }
            Category::Markup => match &*self.object {
                Value::Markup(m)
                    if self.cfg.markup_string && self.cfg.style.markup(&m.source).is_some() =>
                {
                    Category::Markup
                }
                _ => Category::Record,
            },
            category => category,
        }
    }

    /// Normalized sequence view, memoized the first time this node
    /// probes a sequence-like subject.
    fn sequence_view(&self) -> Option<Rc<Vec<ValueRef>>> {
        self.seq_view
            .get_or_init(|| match &*self.object {
                Value::List(list) => Some(Rc::new(list.items.borrow().clone())),
                Value::Iterable(iter) => match &iter.probe {
                    crate::value::IterProbe::Items(items) => Some(Rc::new(items.clone())),
                    crate::value::IterProbe::Fails => None,
                },
                _ => None,
            })
            .clone()
    }

    /// The reference ID for this node's subject, allocating on first use.
    pub fn get_id(&self) -> u32 {
        if let Some(id) = self.id.get() {
            return id;
        }
        let id = self.ids.borrow_mut().id_for(&self.object);
        self.id.set(Some(id));
        id
    }

    fn node_id_tag(&self) -> String {
        match self.id.get() {
            Some(id) => self.cfg.style.node_id(id),
            None => String::new(),
        }
    }

    /// Find the nearest ancestor already rendering this subject, if any.
    /// Dispatches to the installed hook, falling back to
    /// [`Format::default_seen`].
    pub fn seen(&self) -> Option<&'a Format<'a>> {
        if let Some(hook) = &self.seen_hook {
            return hook.seen(self);
        }
        self.default_seen()
    }

    /// Walk the parent chain comparing subject identity. Only composite
    /// subjects are tracked; the matching ancestor gets its reference ID
    /// assigned at discovery time so it is available when that ancestor
    /// decorates itself.
    pub fn default_seen(&self) -> Option<&'a Format<'a>> {
        if !self.object.is_composite() {
            return None;
        }
        let mut ancestor = self.parent;
        while let Some(node) = ancestor {
            if Rc::ptr_eq(&node.object, &self.object) {
                node.get_id();
                return Some(node);
            }
            ancestor = node.parent;
        }
        None
    }

    /// Render this node to text. Idempotent: the first call computes the
    /// memo, later calls return it unchanged.
    pub fn print(&self) -> String {
        if let Some(memo) = self.memo.borrow().as_ref() {
            return memo.clone();
        }
        trace!(level = self.level, category = ?self.category(), "rendering node");
        let mut body = String::new();
        match self.seen() {
            Some(ancestor) => self.print_circular(&mut body, ancestor),
            None => self.print_value(&mut body),
        }
        let mut out = String::new();
        self.print_start(&mut out);
        out.push_str(&body);
        self.print_end(&mut out);
        *self.memo.borrow_mut() = Some(out.clone());
        out
    }

    fn print_circular(&self, out: &mut String, ancestor: &Format) {
        out.push_str(&self.cfg.style.circular(ancestor.get_id()));
    }

    fn indent_level(&self) -> String {
        self.cfg.indent.repeat(self.level)
    }

    /// Keyless nodes carry no key label: the root, members of sequence,
    /// set, byte-blob, and multi-line-text bodies, and key-position
    /// nodes themselves.
    fn is_keyless(&self) -> bool {
        let Some(parent) = self.parent else {
            return true;
        };
        self.is_key
            || matches!(
                parent.category(),
                Category::Sequence | Category::Set | Category::Text | Category::Bytes
            )
    }

    fn key_label(&self) -> String {
        let Some(parent) = self.parent else {
            return String::new();
        };
        if parent.category() == Category::Map {
            let key_value = match &self.key {
                NodeKey::Value(v) => Rc::clone(v),
                _ => Value::absent(),
            };
            let key_node = parent.child(
                key_value,
                ChildSpec {
                    key: NodeKey::None,
                    is_key: true,
                    plain: true,
                },
            );
            return format!("{}{}", self.cfg.style.map_key_start(), key_node.print());
        }
        match &self.key {
            NodeKey::Prop(PropKey::Text(name)) => self.cfg.style.record_key(name),
            NodeKey::Prop(PropKey::Symbol(sym)) => {
                format!("[{}]", symbol_text(self.cfg.style, sym))
            }
            NodeKey::Index(i) => self.cfg.style.record_key(&i.to_string()),
            NodeKey::Value(_) | NodeKey::None => String::new(),
        }
    }

    /// Prefix decoration: indentation, key label, key/value separator,
    /// and the node's reference-ID tag. The root gets only its tag.
    fn print_start(&self, out: &mut String) {
        if self.parent.is_none() {
            out.push_str(&self.node_id_tag());
            return;
        }
        let indent = if self.is_key {
            String::new()
        } else {
            self.indent_level()
        };
        let key = if self.is_keyless() {
            String::new()
        } else {
            self.key_label()
        };
        let sep = if key.is_empty() {
            ""
        } else if self.parent.is_some_and(|p| p.category() == Category::Map) {
            self.cfg.style.map_key_val_sep()
        } else {
            self.cfg.style.record_key_val_sep()
        };
        out.push_str(&self.cfg.style.start(&indent, &key, sep));
        out.push_str(&self.node_id_tag());
    }

    /// Suffix decoration: the entry separator chosen by the parent's
    /// category. Suppressed for the root and for key-position nodes;
    /// blob and text parents separate lines themselves.
    fn print_end(&self, out: &mut String) {
        let Some(parent) = self.parent else {
            return;
        };
        if self.is_key {
            return;
        }
        let style = self.cfg.style;
        let sep = match parent.category() {
            Category::Map => style.map_entry_sep(),
            Category::Bytes | Category::Text => "",
            Category::Sequence => style.seq_entry_sep(),
            Category::Set => style.set_entry_sep(),
            _ => style.record_entry_sep(),
        };
        out.push_str(sep);
    }

    fn print_value(&self, out: &mut String) {
        let style = self.cfg.style;
        match self.category() {
            Category::Absent => out.push_str("undefined"),
            Category::Null => out.push_str("null"),
            Category::Boolean => {
                let Value::Bool(b) = &*self.object else {
                    unreachable!()
                };
                out.push_str(if *b { "true" } else { "false" });
            }
            Category::Number => {
                let Value::Number(n) = &*self.object else {
                    unreachable!()
                };
                out.push_str(&format_number(*n));
            }
            Category::BigInt => {
                let Value::BigInt(n) = &*self.object else {
                    unreachable!()
                };
                out.push_str(&format!("{n}n"));
            }
            Category::Text => self.print_text(out),
            Category::Symbol => {
                let Value::Symbol(sym) = &*self.object else {
                    unreachable!()
                };
                out.push_str(&symbol_text(style, sym));
            }
            Category::Function => {
                let Value::Function(f) = &*self.object else {
                    unreachable!()
                };
                out.push_str(&style.function(&f.class, f.name.as_deref()));
            }
            Category::Instant => {
                let Value::Instant(t) = &*self.object else {
                    unreachable!()
                };
                out.push_str(&t.to_rfc3339_opts(SecondsFormat::Millis, true));
            }
            Category::Pattern => {
                let Value::Pattern(p) = &*self.object else {
                    unreachable!()
                };
                out.push_str(&format!("/{}/{}", p.source, p.flags));
            }
            Category::Bytes => self.print_bytes(out),
            Category::Sequence => self.print_sequence(out),
            Category::Set => self.print_set(out),
            Category::Map => self.print_map(out),
            Category::ErrorLike => self.print_error(out),
            Category::Record => self.print_record(out),
            Category::Markup => self.print_markup(out),
        }
    }

    fn print_text(&self, out: &mut String) {
        let Value::Text(s) = &*self.object else {
            unreachable!()
        };
        let style = self.cfg.style;
        if self.parent.is_some_and(|p| p.category() == Category::Text) {
            out.push_str(&style.string_line(s));
        } else if s.is_empty() {
            out.push_str(&style.string_empty());
        } else if is_one_line(s) {
            out.push_str(&style.string_one_line(s));
        } else {
            out.push_str(style.string_head());
            self.print_text_body(out, s);
            out.push_str(&style.string_tail(&self.indent_level()));
        }
    }

    fn print_text_body(&self, out: &mut String, s: &str) {
        let mut lines: Vec<&str> = s.split('\n').collect();
        if lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        let style = self.cfg.style;
        let count = lines.len();
        for (i, line) in lines.into_iter().enumerate() {
            let child = self.child(
                Value::text(format!("{line}\n")),
                ChildSpec {
                    key: NodeKey::Index(i),
                    ..ChildSpec::default()
                },
            );
            out.push_str(&child.print());
            if i + 1 < count {
                out.push_str(style.string_line_sep());
            }
        }
    }

    fn print_bytes(&self, out: &mut String) {
        let Value::Bytes(b) = &*self.object else {
            unreachable!()
        };
        let style = self.cfg.style;
        let chunk = self.cfg.chunk_size;
        if self.parent.is_some_and(|p| p.category() == Category::Bytes) {
            // one chunk line; the offset label is part of the body
            let offset = match &self.key {
                NodeKey::Index(i) => *i,
                _ => 0,
            };
            out.push_str(&style.buffer_key(offset));
            out.push_str(style.buffer_key_sep());
            out.push_str(&style.buffer_line(b, chunk));
        } else if b.is_empty() {
            out.push_str(&style.buffer_empty());
        } else if b.len() < chunk + 5 {
            out.push_str(style.buffer_start());
            out.push_str(&style.buffer_body(b));
            out.push_str(&style.buffer_end(b));
        } else {
            out.push_str(style.buffer_head());
            self.print_bytes_body(out, b, chunk);
            out.push_str(&style.buffer_tail(&self.indent_level()));
        }
    }

    fn print_bytes_body(&self, out: &mut String, b: &Bytes, chunk: usize) {
        let style = self.cfg.style;
        let mut offset = 0;
        // full chunks, then whatever remains as a short final line
        while offset + chunk < b.len() {
            let child = self.child(
                Value::bytes(b.slice(offset..offset + chunk)),
                ChildSpec {
                    key: NodeKey::Index(offset),
                    ..ChildSpec::default()
                },
            );
            out.push_str(&child.print());
            out.push_str(style.buffer_line_sep());
            offset += chunk;
        }
        let child = self.child(
            Value::bytes(b.slice(offset..)),
            ChildSpec {
                key: NodeKey::Index(offset),
                ..ChildSpec::default()
            },
        );
        out.push_str(&child.print());
    }

    fn print_sequence(&self, out: &mut String) {
        let Some(items) = self.sequence_view() else {
            unreachable!("sequence category without a sequence view")
        };
        let style = self.cfg.style;
        let class = self.object.type_label();
        if items.is_empty() {
            out.push_str(&style.seq_empty(&class));
            return;
        }
        out.push_str(&style.seq_head(&class));
        for (i, item) in items.iter().enumerate() {
            let child = self.child(
                Rc::clone(item),
                ChildSpec {
                    key: NodeKey::Index(i),
                    ..ChildSpec::default()
                },
            );
            out.push_str(&child.print());
        }
        out.push_str(&style.seq_tail(&self.indent_level()));
    }

    fn print_set(&self, out: &mut String) {
        let Value::Set(set) = &*self.object else {
            unreachable!()
        };
        let style = self.cfg.style;
        let class = self.object.type_label();
        let items = set.items.borrow().clone();
        if items.is_empty() {
            out.push_str(&style.set_empty(&class));
            return;
        }
        out.push_str(&style.set_head(&class));
        for item in &items {
            let child = self.child(
                Rc::clone(item),
                ChildSpec {
                    key: NodeKey::Value(Rc::clone(item)),
                    ..ChildSpec::default()
                },
            );
            out.push_str(&child.print());
        }
        out.push_str(&style.set_tail(&self.indent_level()));
    }

    fn print_map(&self, out: &mut String) {
        let style = self.cfg.style;
        let class = self.object.type_label();
        let entries = self.map_entries();
        if entries.is_empty() {
            out.push_str(&style.map_empty(&class));
            return;
        }
        out.push_str(&style.map_head(&class));
        for (key, value) in &entries {
            let child = self.child(
                Rc::clone(value),
                ChildSpec {
                    key: NodeKey::Value(Rc::clone(key)),
                    ..ChildSpec::default()
                },
            );
            out.push_str(&child.print());
        }
        out.push_str(&style.map_tail(&self.indent_level()));
    }

    /// Entries of a key-keyed subject. Panics when the subject is not a
    /// key-keyed collection; that is a caller bug, not an input error.
    pub fn map_entries(&self) -> Vec<(ValueRef, ValueRef)> {
        match &*self.object {
            Value::Map(map) => map.entries.borrow().clone(),
            _ => panic!("map entries requested for a non-map subject"),
        }
    }

    fn print_error(&self, out: &mut String) {
        let Value::Error(err) = &*self.object else {
            unreachable!()
        };
        let style = self.cfg.style;
        let entries = self.record_entries();
        if entries.is_empty() {
            out.push_str(&style.error_empty(&err.class, &err.message));
            return;
        }
        out.push_str(&style.error_head(&err.class, &err.message));
        self.print_record_body(out, entries);
        out.push_str(&style.error_tail(&self.indent_level()));
    }

    fn print_record(&self, out: &mut String) {
        let style = self.cfg.style;
        let class = self.object.type_label();
        let entries = self.record_entries();
        if entries.is_empty() {
            out.push_str(&style.record_empty(&class));
            return;
        }
        out.push_str(&style.record_head(&class));
        self.print_record_body(out, entries);
        out.push_str(&style.record_tail(&self.indent_level()));
    }

    fn print_record_body(&self, out: &mut String, entries: Vec<(PropKey, ValueRef)>) {
        for (key, value) in entries {
            let child = self.child(
                value,
                ChildSpec {
                    key: NodeKey::Prop(key),
                    ..ChildSpec::default()
                },
            );
            out.push_str(&child.print());
        }
    }

    /// Resolved key/value pairs of a record-ish subject, in collection
    /// order or sorted when configured. A raising accessor resolves to
    /// the absent placeholder rather than aborting the render.
    pub fn record_entries(&self) -> Vec<(PropKey, ValueRef)> {
        let Some(props) = self.object.props() else {
            return Vec::new();
        };
        let is_error = matches!(&*self.object, Value::Error(_));
        let keys = collect_keys(
            props,
            is_error,
            self.cfg.include_enumerable,
            self.cfg.include_getters,
        );
        let mut entries: Vec<(PropKey, ValueRef)> = keys
            .into_iter()
            .map(|key| {
                let value = match lookup_field(props, &key) {
                    Some(FieldAccess::Value(v)) => v,
                    Some(FieldAccess::Raises) | None => Value::absent(),
                };
                (key, value)
            })
            .collect();
        if self.cfg.sort {
            entries.sort_by_cached_key(|(key, _)| {
                let display = key.display();
                (display.to_lowercase(), display)
            });
        }
        entries
    }

    fn print_markup(&self, out: &mut String) {
        let Value::Markup(m) = &*self.object else {
            unreachable!()
        };
        match self.cfg.style.markup(&m.source) {
            Some(text) => {
                let joint = format!("\n{}", self.indent_level());
                out.push_str(&text.split('\n').collect::<Vec<_>>().join(&joint));
            }
            None => self.print_record(out),
        }
    }
}

fn symbol_text(style: &dyn Style, sym: &SymbolValue) -> String {
    if sym.well_known {
        format!("Symbol.{}", sym.name)
    } else if sym.registered {
        style.symbol("Symbol.for", &sym.name)
    } else {
        style.symbol("Symbol", &sym.name)
    }
}

fn is_one_line(s: &str) -> bool {
    match s.find('\n') {
        None => true,
        Some(pos) => pos == s.len() - 1,
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{n}")
    }
}
