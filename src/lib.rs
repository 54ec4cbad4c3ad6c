//! # valfmt
//!
//! Cycle-safe rendering of arbitrary, possibly self-referential value
//! graphs into stable, human-readable text. This is the engine beneath a
//! test-assertion reporter: when an expectation fails, both sides must be
//! shown in a readable, consistently indented form so a human or a
//! structural diff can see exactly what differed.
//!
//! The pieces:
//!
//! - [`value`]: the subject model, a closed graph type whose composite
//!   variants share children by reference so cycles can exist.
//! - [`format`]: the recursive render node, the classifier, the identity
//!   tracker, and the key collector.
//! - [`style`]: pluggable output dialects supplying every framing token.
//!
//! ```
//! use valfmt::value::Value;
//!
//! let subject = Value::record([("a", Value::number(1.0))]);
//! assert_eq!(valfmt::format(&subject), "{\n  \"a\": 1,\n}");
//! ```

pub mod format;
pub mod style;
pub mod value;

pub use format::{
    format, format_with, ChildSpec, Format, FormatError, FormatOptions, NodeKey, SeenHook,
    StyleKind,
};

#[cfg(test)]
mod tests;
