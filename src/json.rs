use serde::Serialize;

/// Serializes `value` as JSON indented with four spaces.
///
/// Struct fields are written in declaration order and `BTreeMap`s in key order, so
/// types declared with sorted fields produce key-sorted documents.
pub fn to_pretty_vec<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(1024);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}
