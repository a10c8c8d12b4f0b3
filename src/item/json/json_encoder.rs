use std::{
    borrow::Cow,
    io::{self, Write},
    sync::LazyLock,
};

use serde::{Serialize, ser::Error as _};
use serde_json::{Serializer, Value, ser::Formatter};

use crate::error::FormatError;

/// Formatting knobs of the JSON encoder.
///
/// The default set escapes non-ASCII characters, keeps key order, and uses the
/// `", "` / `": "` separators on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOptions {
    ensure_ascii: bool,
    sort_keys: bool,
    indent: Option<usize>,
    separators: Option<(String, String)>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        EncoderOptions {
            ensure_ascii: true,
            sort_keys: false,
            indent: None,
            separators: None,
        }
    }
}

impl EncoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escape every non-ASCII character as `\uXXXX` UTF-16 code units.
    pub fn ensure_ascii(mut self, yes: bool) -> Self {
        self.ensure_ascii = yes;
        self
    }

    pub fn sort_keys(mut self, yes: bool) -> Self {
        self.sort_keys = yes;
        self
    }

    /// Pretty print with `indent` spaces per level.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    /// Item and key separators, overriding the defaults derived from the
    /// indentation.
    pub fn separators(mut self, item: &str, key: &str) -> Self {
        self.separators = Some((item.to_string(), key.to_string()));
        self
    }

    pub fn is_default(&self) -> bool {
        *self == EncoderOptions::default()
    }
}

/// `serde_json` formatter implementing [`EncoderOptions`].
///
/// Holds the per-call nesting state, so a new one is created for every
/// encoding.
pub struct RecordFormatter<'a> {
    encoder: &'a JsonEncoder,
    current_indent: usize,
    has_value: bool,
}

impl RecordFormatter<'_> {
    fn write_newline_indent<W: ?Sized + Write>(&self, writer: &mut W) -> io::Result<()> {
        if let Some(indent) = &self.encoder.indent {
            writer.write_all(b"\n")?;
            for _ in 0..self.current_indent {
                writer.write_all(indent)?;
            }
        }
        Ok(())
    }
}

impl Formatter for RecordFormatter<'_> {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.current_indent += 1;
        self.has_value = false;
        writer.write_all(b"[")
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.current_indent -= 1;
        if self.has_value {
            self.write_newline_indent(writer)?;
        }
        writer.write_all(b"]")
    }

    fn begin_array_value<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if !first {
            writer.write_all(&self.encoder.item_separator)?;
        }
        self.write_newline_indent(writer)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.current_indent += 1;
        self.has_value = false;
        writer.write_all(b"{")
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.current_indent -= 1;
        if self.has_value {
            self.write_newline_indent(writer)?;
        }
        writer.write_all(b"}")
    }

    fn begin_object_key<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if !first {
            writer.write_all(&self.encoder.item_separator)?;
        }
        self.write_newline_indent(writer)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.encoder.key_separator)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        if !self.encoder.options.ensure_ascii {
            return writer.write_all(fragment.as_bytes());
        }

        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Record-aware JSON encoder.
///
/// Any [`Serialize`] value can be encoded; records (`dyn Record`) expand to
/// their attribute mapping wherever they are nested. The encoder only holds
/// immutable configuration and can be shared between threads.
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    options: EncoderOptions,
    indent: Option<Vec<u8>>,
    item_separator: Vec<u8>,
    key_separator: Vec<u8>,
}

static DEFAULT_ENCODER: LazyLock<JsonEncoder> =
    LazyLock::new(|| JsonEncoder::new(EncoderOptions::default()));

impl JsonEncoder {
    pub fn new(options: EncoderOptions) -> Self {
        let indent = options.indent.map(|width| vec![b' '; width]);
        let (item_separator, key_separator) = match &options.separators {
            Some((item, key)) => (item.as_bytes().to_vec(), key.as_bytes().to_vec()),
            None if indent.is_some() => (b",".to_vec(), b": ".to_vec()),
            None => (b", ".to_vec(), b": ".to_vec()),
        };

        JsonEncoder {
            options,
            indent,
            item_separator,
            key_separator,
        }
    }

    /// Shared encoder with the default options, built on first use.
    pub fn default_encoder() -> &'static JsonEncoder {
        &DEFAULT_ENCODER
    }

    /// The shared encoder when `options` are the defaults, a new one otherwise.
    pub fn for_options(options: &EncoderOptions) -> Cow<'static, JsonEncoder> {
        if options.is_default() {
            Cow::Borrowed(Self::default_encoder())
        } else {
            Cow::Owned(JsonEncoder::new(options.clone()))
        }
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    fn formatter(&self) -> RecordFormatter<'_> {
        RecordFormatter {
            encoder: self,
            current_indent: 0,
            has_value: false,
        }
    }

    pub fn encode_to<T, W>(&self, value: &T, writer: W) -> Result<(), FormatError>
    where
        T: ?Sized + Serialize,
        W: Write,
    {
        let mut serializer = Serializer::with_formatter(writer, self.formatter());
        if self.options.sort_keys {
            let mut value = serde_json::to_value(value)?;
            sort_keys(&mut value);
            value.serialize(&mut serializer)?;
        } else {
            value.serialize(&mut serializer)?;
        }
        Ok(())
    }

    pub fn encode<T>(&self, value: &T) -> Result<String, FormatError>
    where
        T: ?Sized + Serialize,
    {
        let mut buffer = Vec::with_capacity(128);
        self.encode_to(value, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|error| FormatError::Json(serde_json::Error::custom(error)))
    }
}

fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (_, entry) in entries.iter_mut() {
                sort_keys(entry);
            }
            *map = entries.into_iter().collect();
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}

/// Encodes `value` into `writer`.
///
/// The shared default encoder is used when `options` are the defaults.
pub fn dump_json<T, W>(value: &T, writer: W, options: &EncoderOptions) -> Result<(), FormatError>
where
    T: ?Sized + Serialize,
    W: Write,
{
    JsonEncoder::for_options(options).encode_to(value, writer)
}

/// Encodes `value` to a string.
///
/// ```
/// use jobstats::item::json::{dumps_json, EncoderOptions};
/// use serde_json::json;
///
/// let value = json!({"job": "café", "maps": [1, 2]});
///
/// assert_eq!(
///     dumps_json(&value, &EncoderOptions::default()).unwrap(),
///     r#"{"job": "caf\u00e9", "maps": [1, 2]}"#
/// );
/// let compact = EncoderOptions::new().ensure_ascii(false).separators(",", ":");
/// assert_eq!(
///     dumps_json(&value, &compact).unwrap(),
///     r#"{"job":"café","maps":[1,2]}"#
/// );
/// ```
pub fn dumps_json<T>(value: &T, options: &EncoderOptions) -> Result<String, FormatError>
where
    T: ?Sized + Serialize,
{
    JsonEncoder::for_options(options).encode(value)
}

/// Encodes `value` into `writer` with a caller supplied formatter.
pub fn dump_json_with_formatter<T, W, F>(
    value: &T,
    writer: W,
    formatter: F,
) -> Result<(), FormatError>
where
    T: ?Sized + Serialize,
    W: Write,
    F: Formatter,
{
    let mut serializer = Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{borrow::Cow, collections::HashMap, error::Error};

    use serde_json::{json, ser::PrettyFormatter};

    use super::{EncoderOptions, JsonEncoder, dump_json, dump_json_with_formatter, dumps_json};
    use crate::error::FormatError;

    #[test]
    fn default_options_should_use_shared_encoder() {
        let encoder = JsonEncoder::for_options(&EncoderOptions::default());
        match encoder {
            Cow::Borrowed(shared) => {
                assert!(std::ptr::eq(shared, JsonEncoder::default_encoder()))
            }
            Cow::Owned(_) => panic!("default options should reuse the shared encoder"),
        }

        let encoder = JsonEncoder::for_options(&EncoderOptions::new().indent(2));
        assert!(matches!(encoder, Cow::Owned(_)));
    }

    #[test]
    fn shared_and_fresh_encoders_should_agree() -> Result<(), Box<dyn Error>> {
        let value = json!({"b": [1, {"c": null}], "a": "é", "d": {}});
        let shared = JsonEncoder::default_encoder().encode(&value)?;
        let fresh = JsonEncoder::new(EncoderOptions::default()).encode(&value)?;

        assert_eq!(shared, fresh);
        assert_eq!(shared, r#"{"b": [1, {"c": null}], "a": "\u00e9", "d": {}}"#);
        Ok(())
    }

    #[test]
    fn indent_should_pretty_print() -> Result<(), Box<dyn Error>> {
        let value = json!({"columns": ["a", "b"], "data": [], "meta": {}});
        let encoded = dumps_json(&value, &EncoderOptions::new().indent(2))?;

        assert_eq!(
            encoded,
            "{\n  \"columns\": [\n    \"a\",\n    \"b\"\n  ],\n  \"data\": [],\n  \"meta\": {}\n}"
        );
        Ok(())
    }

    #[test]
    fn sort_keys_should_sort_nested_objects() -> Result<(), Box<dyn Error>> {
        let value = json!({"z": 1, "a": {"y": 2, "b": 3}, "m": [{"k": 1, "c": 2}]});
        let encoded = dumps_json(&value, &EncoderOptions::new().sort_keys(true))?;

        assert_eq!(
            encoded,
            r#"{"a": {"b": 3, "y": 2}, "m": [{"c": 2, "k": 1}], "z": 1}"#
        );
        Ok(())
    }

    #[test]
    fn astral_characters_should_use_surrogate_pairs() -> Result<(), Box<dyn Error>> {
        let encoded = dumps_json("a😀b", &EncoderOptions::default())?;
        assert_eq!(encoded, r#""a\ud83d\ude00b""#);

        let raw = dumps_json("a😀b", &EncoderOptions::new().ensure_ascii(false))?;
        assert_eq!(raw, "\"a😀b\"");
        Ok(())
    }

    #[test]
    fn control_characters_should_stay_escaped() -> Result<(), Box<dyn Error>> {
        let encoded = dumps_json("line\n\"quoted\"\u{1}", &EncoderOptions::default())?;
        assert_eq!(encoded, r#""line\n\"quoted\"\u0001""#);
        Ok(())
    }

    #[test]
    fn dump_json_should_write_into_sink() -> Result<(), Box<dyn Error>> {
        let mut buffer = Vec::new();
        dump_json(&vec![1, 2, 3], &mut buffer, &EncoderOptions::default())?;
        buffer.push(b'\n');

        assert_eq!(String::from_utf8(buffer)?, "[1, 2, 3]\n");
        Ok(())
    }

    #[test]
    fn custom_formatter_should_be_used() -> Result<(), Box<dyn Error>> {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"\t");
        dump_json_with_formatter(&json!({"a": [1]}), &mut buffer, formatter)?;

        assert_eq!(String::from_utf8(buffer)?, "{\n\t\"a\": [\n\t\t1\n\t]\n}");
        Ok(())
    }

    #[test]
    fn non_string_keys_should_fail() {
        let mut value = HashMap::new();
        value.insert((1, 2), "pair");

        let result = dumps_json(&value, &EncoderOptions::default());
        assert!(matches!(result, Err(FormatError::Json(_))));
    }
}
