pub mod classify;
pub mod keys;
pub mod node;
pub mod options;

pub use classify::*;
pub use keys::*;
pub use node::*;
pub use options::*;

use std::rc::Rc;

use crate::value::ValueRef;

/// Render a subject with the default options (pretty dialect).
pub fn format(value: &ValueRef) -> String {
    Format::root(Rc::clone(value), FormatOptions::default()).print()
}

/// Render a subject with explicit options.
pub fn format_with(value: &ValueRef, options: FormatOptions) -> String {
    Format::root(Rc::clone(value), options).print()
}
