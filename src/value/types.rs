use std::cell::RefCell;
use std::rc::Rc;

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Shared handle to a subject value.
///
/// Object identity is `Rc` pointer identity; that is what the cycle
/// tracker compares, never structural equality.
pub type ValueRef = Rc<Value>;

/// The closed set of subject kinds the renderer understands.
///
/// Composite variants hold children behind `ValueRef` with `RefCell`
/// interiors so cyclic graphs can be tied together after construction.
#[derive(Debug)]
pub enum Value {
    /// The "undefined" placeholder, also used when a field access raises.
    Absent,
    Null,
    Bool(bool),
    Number(f64),
    /// Large integer, rendered with a distinguishing `n` suffix.
    BigInt(i128),
    /// Text scalar; multi-line text gets per-line child rendering.
    Text(String),
    Symbol(SymbolValue),
    Function(FunctionValue),
    Instant(DateTime<Utc>),
    Pattern(PatternValue),
    Bytes(Bytes),
    List(ListValue),
    Set(SetValue),
    Map(MapValue),
    Error(ErrorValue),
    Record(RecordValue),
    Iterable(IterableValue),
    Markup(MarkupValue),
}

/// A unique interned token, possibly registered in a global registry or
/// matching a well-known name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolValue {
    pub name: String,
    /// Registered in the global symbol registry (`Symbol.for(name)`).
    pub registered: bool,
    /// Matches a well-known global token (`Symbol.name`).
    pub well_known: bool,
}

#[derive(Debug, Clone)]
pub struct FunctionValue {
    pub name: Option<String>,
    /// Most specific callable class, e.g. "Function" or "AsyncFunction".
    pub class: String,
}

#[derive(Debug, Clone)]
pub struct PatternValue {
    pub source: String,
    pub flags: String,
}

#[derive(Debug)]
pub struct ListValue {
    /// Constructor name when it is not a plain "Array".
    pub class: Option<String>,
    pub items: RefCell<Vec<ValueRef>>,
}

#[derive(Debug)]
pub struct SetValue {
    pub class: Option<String>,
    /// Insertion-ordered; uniqueness is the builder's concern.
    pub items: RefCell<Vec<ValueRef>>,
}

#[derive(Debug)]
pub struct MapValue {
    pub class: Option<String>,
    /// Keys may themselves be composite values.
    pub entries: RefCell<Vec<(ValueRef, ValueRef)>>,
}

#[derive(Debug)]
pub struct ErrorValue {
    pub class: String,
    pub message: String,
    pub props: Props,
}

#[derive(Debug)]
pub struct RecordValue {
    pub label: RecordLabel,
    pub props: Props,
}

/// How a generic record announces its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLabel {
    /// Default prototype; styles usually omit the label entirely.
    Plain,
    /// No prototype at all.
    NullProto,
    /// Constructor name differing from the intrinsic tag.
    Class(String),
}

impl RecordLabel {
    pub fn name(&self) -> &str {
        match self {
            RecordLabel::Plain => "Object",
            RecordLabel::NullProto => "Null Object",
            RecordLabel::Class(name) => name,
        }
    }
}

/// A value exposing forward iteration without being one of the
/// specialized collections. Probing may fail, in which case the value
/// renders as a generic record over its `props`.
#[derive(Debug)]
pub struct IterableValue {
    pub class: Option<String>,
    pub probe: IterProbe,
    pub props: Props,
}

#[derive(Debug)]
pub enum IterProbe {
    Items(Vec<ValueRef>),
    Fails,
}

/// A markup-like element. When the configuration and style allow it, the
/// `source` string is rendered opaquely; otherwise the structural `props`
/// view is used.
#[derive(Debug)]
pub struct MarkupValue {
    pub source: String,
    pub props: Props,
}

/// Property table of a record-ish value: own fields plus a prototype
/// chain (nearest first) for the inherited-key collection modes.
#[derive(Debug, Default)]
pub struct Props {
    pub own: RefCell<Vec<Field>>,
    pub protos: Vec<ProtoProps>,
}

#[derive(Debug, Default)]
pub struct ProtoProps {
    pub fields: Vec<Field>,
}

#[derive(Debug)]
pub struct Field {
    pub key: PropKey,
    pub access: FieldAccess,
    pub enumerable: bool,
    pub getter: bool,
}

impl Field {
    pub fn new(key: impl Into<String>, value: ValueRef) -> Self {
        Self {
            key: PropKey::Text(key.into()),
            access: FieldAccess::Value(value),
            enumerable: true,
            getter: false,
        }
    }

    /// Present but not enumerable, e.g. the well-known hidden fields of
    /// exception-like values.
    pub fn hidden(key: impl Into<String>, value: ValueRef) -> Self {
        Self {
            enumerable: false,
            ..Self::new(key, value)
        }
    }

    pub fn symbol_keyed(sym: SymbolValue, value: ValueRef) -> Self {
        Self {
            key: PropKey::Symbol(sym),
            access: FieldAccess::Value(value),
            enumerable: true,
            getter: false,
        }
    }

    pub fn getter(key: impl Into<String>, value: ValueRef) -> Self {
        Self {
            getter: true,
            ..Self::new(key, value)
        }
    }

    /// An accessor whose read raises; renders as the absent placeholder.
    pub fn raising(key: impl Into<String>) -> Self {
        Self {
            key: PropKey::Text(key.into()),
            access: FieldAccess::Raises,
            enumerable: true,
            getter: true,
        }
    }
}

/// Reading a field either produces a value or raises.
#[derive(Debug, Clone)]
pub enum FieldAccess {
    Value(ValueRef),
    Raises,
}

/// A record property key: text-named or token-named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropKey {
    Text(String),
    Symbol(SymbolValue),
}

impl PropKey {
    /// Display form used for sorting and symbol key labels.
    pub fn display(&self) -> String {
        match self {
            PropKey::Text(s) => s.clone(),
            PropKey::Symbol(sym) => format!("Symbol({})", sym.name),
        }
    }
}

impl Value {
    pub fn absent() -> ValueRef {
        Rc::new(Value::Absent)
    }

    pub fn null() -> ValueRef {
        Rc::new(Value::Null)
    }

    pub fn boolean(b: bool) -> ValueRef {
        Rc::new(Value::Bool(b))
    }

    pub fn number(n: f64) -> ValueRef {
        Rc::new(Value::Number(n))
    }

    pub fn bigint(n: i128) -> ValueRef {
        Rc::new(Value::BigInt(n))
    }

    pub fn text(s: impl Into<String>) -> ValueRef {
        Rc::new(Value::Text(s.into()))
    }

    pub fn symbol(name: impl Into<String>) -> ValueRef {
        Rc::new(Value::Symbol(SymbolValue {
            name: name.into(),
            registered: false,
            well_known: false,
        }))
    }

    pub fn symbol_for(name: impl Into<String>) -> ValueRef {
        Rc::new(Value::Symbol(SymbolValue {
            name: name.into(),
            registered: true,
            well_known: false,
        }))
    }

    pub fn well_known_symbol(name: impl Into<String>) -> ValueRef {
        Rc::new(Value::Symbol(SymbolValue {
            name: name.into(),
            registered: false,
            well_known: true,
        }))
    }

    pub fn function(name: Option<&str>) -> ValueRef {
        Rc::new(Value::Function(FunctionValue {
            name: name.map(str::to_string),
            class: "Function".to_string(),
        }))
    }

    pub fn instant(t: DateTime<Utc>) -> ValueRef {
        Rc::new(Value::Instant(t))
    }

    pub fn pattern(source: impl Into<String>, flags: impl Into<String>) -> ValueRef {
        Rc::new(Value::Pattern(PatternValue {
            source: source.into(),
            flags: flags.into(),
        }))
    }

    pub fn bytes(b: impl Into<Bytes>) -> ValueRef {
        Rc::new(Value::Bytes(b.into()))
    }

    pub fn list(items: impl IntoIterator<Item = ValueRef>) -> ValueRef {
        Rc::new(Value::List(ListValue {
            class: None,
            items: RefCell::new(items.into_iter().collect()),
        }))
    }

    pub fn set(items: impl IntoIterator<Item = ValueRef>) -> ValueRef {
        Rc::new(Value::Set(SetValue {
            class: None,
            items: RefCell::new(items.into_iter().collect()),
        }))
    }

    pub fn map(entries: impl IntoIterator<Item = (ValueRef, ValueRef)>) -> ValueRef {
        Rc::new(Value::Map(MapValue {
            class: None,
            entries: RefCell::new(entries.into_iter().collect()),
        }))
    }

    pub fn record<K: Into<String>>(
        pairs: impl IntoIterator<Item = (K, ValueRef)>,
    ) -> ValueRef {
        Self::record_labeled(RecordLabel::Plain, pairs)
    }

    pub fn record_class<K: Into<String>>(
        name: impl Into<String>,
        pairs: impl IntoIterator<Item = (K, ValueRef)>,
    ) -> ValueRef {
        Self::record_labeled(RecordLabel::Class(name.into()), pairs)
    }

    pub fn record_null_proto<K: Into<String>>(
        pairs: impl IntoIterator<Item = (K, ValueRef)>,
    ) -> ValueRef {
        Self::record_labeled(RecordLabel::NullProto, pairs)
    }

    pub fn record_labeled<K: Into<String>>(
        label: RecordLabel,
        pairs: impl IntoIterator<Item = (K, ValueRef)>,
    ) -> ValueRef {
        let own = pairs
            .into_iter()
            .map(|(k, v)| Field::new(k, v))
            .collect::<Vec<_>>();
        Rc::new(Value::Record(RecordValue {
            label,
            props: Props {
                own: RefCell::new(own),
                protos: Vec::new(),
            },
        }))
    }

    pub fn error(class: impl Into<String>, message: impl Into<String>) -> ValueRef {
        Rc::new(Value::Error(ErrorValue {
            class: class.into(),
            message: message.into(),
            props: Props::default(),
        }))
    }

    pub fn iterable(items: impl IntoIterator<Item = ValueRef>) -> ValueRef {
        Rc::new(Value::Iterable(IterableValue {
            class: None,
            probe: IterProbe::Items(items.into_iter().collect()),
            props: Props::default(),
        }))
    }

    /// An iterable whose probe fails; `pairs` is the record fallback view.
    pub fn broken_iterable<K: Into<String>>(
        pairs: impl IntoIterator<Item = (K, ValueRef)>,
    ) -> ValueRef {
        let own = pairs
            .into_iter()
            .map(|(k, v)| Field::new(k, v))
            .collect::<Vec<_>>();
        Rc::new(Value::Iterable(IterableValue {
            class: None,
            probe: IterProbe::Fails,
            props: Props {
                own: RefCell::new(own),
                protos: Vec::new(),
            },
        }))
    }

    pub fn markup<K: Into<String>>(
        source: impl Into<String>,
        pairs: impl IntoIterator<Item = (K, ValueRef)>,
    ) -> ValueRef {
        let own = pairs
            .into_iter()
            .map(|(k, v)| Field::new(k, v))
            .collect::<Vec<_>>();
        Rc::new(Value::Markup(MarkupValue {
            source: source.into(),
            props: Props {
                own: RefCell::new(own),
                protos: Vec::new(),
            },
        }))
    }

    /// Append a field to a record-ish value. Used to tie cyclic graphs
    /// together after the `Rc` exists.
    pub fn insert(&self, key: impl Into<String>, value: ValueRef) {
        match self.props() {
            Some(props) => props.own.borrow_mut().push(Field::new(key, value)),
            None => panic!("insert is only valid on record-like values"),
        }
    }

    pub fn insert_field(&self, field: Field) {
        match self.props() {
            Some(props) => props.own.borrow_mut().push(field),
            None => panic!("insert_field is only valid on record-like values"),
        }
    }

    /// Append an element to a list or set.
    pub fn push(&self, value: ValueRef) {
        match self {
            Value::List(list) => list.items.borrow_mut().push(value),
            Value::Set(set) => set.items.borrow_mut().push(value),
            _ => panic!("push is only valid on sequences and sets"),
        }
    }

    /// Append an entry to a key-keyed collection.
    pub fn map_insert(&self, key: ValueRef, value: ValueRef) {
        match self {
            Value::Map(map) => map.entries.borrow_mut().push((key, value)),
            _ => panic!("map_insert is only valid on key-keyed collections"),
        }
    }

    /// The property table of a record-ish value, if it has one.
    pub fn props(&self) -> Option<&Props> {
        match self {
            Value::Record(r) => Some(&r.props),
            Value::Error(e) => Some(&e.props),
            Value::Iterable(i) => Some(&i.props),
            Value::Markup(m) => Some(&m.props),
            _ => None,
        }
    }

    /// Reference-typed subjects participate in identity tracking;
    /// scalars never do.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Value::Bytes(_)
                | Value::List(_)
                | Value::Set(_)
                | Value::Map(_)
                | Value::Error(_)
                | Value::Record(_)
                | Value::Iterable(_)
                | Value::Markup(_)
        )
    }

    /// The most specific type name, used by head/empty framing tokens.
    pub fn type_label(&self) -> String {
        match self {
            Value::List(l) => l.class.clone().unwrap_or_else(|| "Array".to_string()),
            Value::Set(s) => s.class.clone().unwrap_or_else(|| "Set".to_string()),
            Value::Map(m) => m.class.clone().unwrap_or_else(|| "Map".to_string()),
            Value::Error(e) => e.class.clone(),
            Value::Record(r) => r.label.name().to_string(),
            Value::Iterable(i) => i.class.clone().unwrap_or_else(|| "Object".to_string()),
            // demoted markup renders as a plain record, so no label
            Value::Markup(_) => "Object".to_string(),
            Value::Bytes(_) => "Buffer".to_string(),
            Value::Function(f) => f.class.clone(),
            _ => "Object".to_string(),
        }
    }
}
