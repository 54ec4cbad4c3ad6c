pub mod diff;
pub mod pretty;
pub mod traits;

pub use diff::*;
pub use pretty::*;
pub use traits::*;

pub static PRETTY: PrettyStyle = PrettyStyle;
pub static DIFF: DiffStyle = DiffStyle;

/// Resolve a dialect by name.
pub fn lookup(name: &str) -> Option<&'static dyn Style> {
    match name {
        "pretty" => Some(&PRETTY),
        "diff" => Some(&DIFF),
        _ => None,
    }
}
