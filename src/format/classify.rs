use crate::value::Value;

/// The structural category of a subject. Rendering dispatches on this,
/// so adding a subject kind is a compile-time-checked exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Absent,
    Null,
    Boolean,
    Number,
    BigInt,
    Text,
    Symbol,
    Function,
    Instant,
    Pattern,
    Bytes,
    Sequence,
    Set,
    Map,
    ErrorLike,
    Record,
    Markup,
}

/// Classify a subject by shape alone.
///
/// Specialized collections (bytes, sets, maps, exceptions) claim their
/// category before anything that merely iterates, so they can never be
/// mis-rendered as a plain sequence. `Iterable` and `Markup` results are
/// provisional: the render node demotes them to `Record` when the
/// sequence probe fails or when the configuration/dialect has no opaque
/// markup form.
pub fn classify(value: &Value) -> Category {
    match value {
        Value::Absent => Category::Absent,
        Value::Null => Category::Null,
        Value::Bool(_) => Category::Boolean,
        Value::Number(_) => Category::Number,
        Value::BigInt(_) => Category::BigInt,
        Value::Text(_) => Category::Text,
        Value::Symbol(_) => Category::Symbol,
        Value::Function(_) => Category::Function,
        Value::Instant(_) => Category::Instant,
        Value::Pattern(_) => Category::Pattern,
        Value::Bytes(_) => Category::Bytes,
        Value::Set(_) => Category::Set,
        Value::Map(_) => Category::Map,
        Value::Error(_) => Category::ErrorLike,
        Value::List(_) | Value::Iterable(_) => Category::Sequence,
        Value::Record(_) => Category::Record,
        Value::Markup(_) => Category::Markup,
    }
}
