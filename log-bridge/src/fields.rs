//! Structured key/value fields shared by both sides of the bridge.
//!
//! The platform carries a record as a list of fields; the hierarchy carries
//! the same list as the record's `extras`. Keys are unique and keep their
//! insertion order.
use std::borrow::Cow;
use std::fmt;

/// The formatted message. Every platform record carries one.
pub const MESSAGE: &str = "MESSAGE";
/// journald priority, `"0"` (emergency) to `"7"` (debug).
pub const PRIORITY: &str = "PRIORITY";
/// The platform domain of the record.
pub const GLIB_DOMAIN: &str = "GLIB_DOMAIN";
/// Source file of the log call.
pub const CODE_FILE: &str = "CODE_FILE";
/// Source line of the log call.
pub const CODE_LINE: &str = "CODE_LINE";
/// Function containing the log call.
pub const CODE_FUNC: &str = "CODE_FUNC";

/// The record's message before any handler formatting.
pub const LOGGER_MESSAGE: &str = "LOGGER_MESSAGE";
/// Module the record was emitted from.
pub const LOGGER_MODULE: &str = "LOGGER_MODULE";
/// Hierarchy logger the record was emitted on.
pub const LOGGER_NAME: &str = "LOGGER_NAME";
/// Name of the emitting thread.
pub const LOGGER_THREAD_NAME: &str = "LOGGER_THREAD_NAME";
/// Id of the emitting thread.
pub const LOGGER_THREAD_ID: &str = "LOGGER_THREAD_ID";
/// Type name of the attached error.
pub const LOGGER_EXC: &str = "LOGGER_EXC";
/// Message of the attached error.
pub const LOGGER_EXC_MESSAGE: &str = "LOGGER_EXC_MESSAGE";

/// Value of a single field.
///
/// The platform knows two kinds of values: NUL-free text and arbitrary
/// bytes. Text that is not valid UTF-8 stays as bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// A UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Decodes raw bytes, keeping them as bytes when they are not UTF-8.
    pub fn from_utf8_or_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(s) => FieldValue::Str(s),
            Err(err) => FieldValue::Bytes(err.into_bytes()),
        }
    }

    /// Returns the value as a string slice if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            FieldValue::Bytes(_) => None,
        }
    }

    /// Returns the value as text, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Str(s) => Cow::Borrowed(s),
            FieldValue::Bytes(b) => String::from_utf8_lossy(b),
        }
    }

    /// Returns the raw bytes of the value.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FieldValue::Str(s) => s.as_bytes(),
            FieldValue::Bytes(b) => b,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<Cow<'_, str>> for FieldValue {
    fn from(s: Cow<'_, str>) -> Self {
        FieldValue::Str(s.into_owned())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        FieldValue::Bytes(b)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(b: &[u8]) -> Self {
        FieldValue::Bytes(b.to_vec())
    }
}

macro_rules! impl_from_display {
    ($($t:ty),+) => {
        $(
            impl From<$t> for FieldValue {
                fn from(val: $t) -> FieldValue {
                    FieldValue::Str(val.to_string())
                }
            }
        )+
    };
}

impl_from_display!(i32, i64, u32, u64, usize, bool);

/// An ordered set of fields with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(Cow<'static, str>, FieldValue)>,
}

impl Fields {
    /// Creates an empty set.
    pub fn new() -> Self {
        Fields::default()
    }

    /// Creates an empty set with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Fields {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Sets `key` to `value`. An existing key keeps its position.
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<Cow<'static, str>>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`Fields::insert`].
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: Into<FieldValue>,
    {
        self.insert(key, value);
        self
    }

    /// Returns the value of `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns the value of `key` if it is text.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Iterates over the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts every field of `other`, overriding existing keys.
    pub fn extend_from(&mut self, other: &Fields) {
        for (k, v) in &other.entries {
            self.insert(k.clone(), v.clone());
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<Cow<'static, str>>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl<K, V> Extend<(K, V)> for Fields
where
    K: Into<Cow<'static, str>>,
    V: Into<FieldValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut fields = Fields::new()
            .with(MESSAGE, "first")
            .with("A", "a")
            .with("B", "b");
        fields.insert(MESSAGE, "second");

        let keys: Vec<_> = fields.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![MESSAGE, "A", "B"]);
        assert_eq!(fields.get_str(MESSAGE), Some("second"));
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn remove_and_contains() {
        let mut fields: Fields = [("A", "a"), ("B", "b")].into_iter().collect();
        assert!(fields.contains_key("A"));
        assert_eq!(fields.remove("A"), Some(FieldValue::from("a")));
        assert!(!fields.contains_key("A"));
        assert_eq!(fields.remove("A"), None);
    }

    #[test]
    fn extend_from_overrides() {
        let mut base = Fields::new().with("A", "a").with("B", "b");
        let other = Fields::new().with("B", "override").with("C", "c");
        base.extend_from(&other);
        assert_eq!(base.get_str("B"), Some("override"));
        assert_eq!(base.get_str("C"), Some("c"));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn invalid_utf8_stays_bytes() {
        let value = FieldValue::from_utf8_or_bytes(vec![0x66, 0x6f, 0xff]);
        assert_eq!(value, FieldValue::Bytes(vec![0x66, 0x6f, 0xff]));
        assert_eq!(value.as_str(), None);
        assert_eq!(value.to_string_lossy(), "fo\u{fffd}");

        let value = FieldValue::from_utf8_or_bytes(b"ok".to_vec());
        assert_eq!(value.as_str(), Some("ok"));
    }

    #[test]
    fn numbers_become_text() {
        let fields = Fields::new().with(CODE_LINE, 42u32);
        assert_eq!(fields.get_str(CODE_LINE), Some("42"));
    }
}
