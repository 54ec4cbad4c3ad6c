use crate::value::{FieldAccess, PropKey, Props};

/// Well-known hidden fields of exception-like values, always shown when
/// present even though they are not enumerable.
const ERROR_KEYS: [&str; 2] = ["errors", "cause"];

/// Resolve the ordered key set of a record-ish subject.
///
/// Modes:
/// - default: own enumerable keys only, text-named then token-named;
/// - `include_getters`: also enumerable accessors declared on the
///   immediate prototype;
/// - `include_enumerable`: every enumerable key along the full prototype
///   chain, text keys first, then token keys.
///
/// Duplicates across the walk are dropped, first occurrence wins.
pub fn collect_keys(
    props: &Props,
    is_error: bool,
    include_enumerable: bool,
    include_getters: bool,
) -> Vec<PropKey> {
    let mut keys: Vec<PropKey> = Vec::new();
    let own = props.own.borrow();

    if is_error {
        for name in ERROR_KEYS {
            let hidden = own
                .iter()
                .any(|f| !f.enumerable && f.key == PropKey::Text(name.to_string()));
            if hidden {
                keys.push(PropKey::Text(name.to_string()));
            }
        }
    }

    if include_enumerable {
        for field in own.iter() {
            if field.enumerable && matches!(field.key, PropKey::Text(_)) {
                keys.push(field.key.clone());
            }
        }
        for proto in &props.protos {
            for field in &proto.fields {
                if field.enumerable && matches!(field.key, PropKey::Text(_)) {
                    keys.push(field.key.clone());
                }
            }
        }
        for field in own.iter() {
            if field.enumerable && matches!(field.key, PropKey::Symbol(_)) {
                keys.push(field.key.clone());
            }
        }
        for proto in &props.protos {
            for field in &proto.fields {
                if field.enumerable && matches!(field.key, PropKey::Symbol(_)) {
                    keys.push(field.key.clone());
                }
            }
        }
        return dedup(keys);
    }

    for field in own.iter() {
        if field.enumerable && matches!(field.key, PropKey::Text(_)) {
            keys.push(field.key.clone());
        }
    }
    for field in own.iter() {
        if field.enumerable && matches!(field.key, PropKey::Symbol(_)) {
            keys.push(field.key.clone());
        }
    }

    if include_getters {
        if let Some(proto) = props.protos.first() {
            for field in &proto.fields {
                if field.enumerable && field.getter {
                    keys.push(field.key.clone());
                }
            }
        }
    }

    dedup(keys)
}

/// Read a field through the prototype chain, nearest declaration first.
/// `None` means the key resolved to nothing; the caller renders the
/// absent placeholder either way.
pub fn lookup_field(props: &Props, key: &PropKey) -> Option<FieldAccess> {
    if let Some(field) = props.own.borrow().iter().find(|f| &f.key == key) {
        return Some(field.access.clone());
    }
    for proto in &props.protos {
        if let Some(field) = proto.fields.iter().find(|f| &f.key == key) {
            return Some(field.access.clone());
        }
    }
    None
}

fn dedup(keys: Vec<PropKey>) -> Vec<PropKey> {
    let mut out: Vec<PropKey> = Vec::with_capacity(keys.len());
    for key in keys {
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}
