//! Record encoding matching the layout of previously produced dataset files.
//!
//! Records are pretty printed with a two space indent and every line after
//! the first carries a two space prefix, so each record sits one level deep
//! inside the surrounding array. Strings escape `<`, `>`, `&`, U+2028 and
//! U+2029, and floats in the plain-decimal range drop the trailing `.0`.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};

const INDENT: &[u8] = b"  ";
const LINE_PREFIX: &[u8] = b"  ";

/// Encode one value: indented, prefixed, newline terminated.
pub fn encode_record<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut pretty = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut pretty, PrefixedFormatter::new());
    value.serialize(&mut serializer)?;

    let mut out = Vec::with_capacity(pretty.len() + pretty.len() / 8 + 1);
    for byte in pretty {
        out.push(byte);
        // Raw newlines only occur between tokens; string contents are escaped.
        if byte == b'\n' {
            out.extend_from_slice(LINE_PREFIX);
        }
    }
    out.push(b'\n');
    Ok(out)
}

struct PrefixedFormatter {
    pretty: PrettyFormatter<'static>,
}

impl PrefixedFormatter {
    fn new() -> Self {
        Self {
            pretty: PrettyFormatter::with_indent(INDENT),
        }
    }
}

impl Formatter for PrefixedFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let abs = value.abs();
        if value.is_finite() && (abs == 0.0 || (1e-6..1e21).contains(&abs)) {
            writer.write_all(value.to_string().as_bytes())
        } else {
            self.pretty.write_f64(writer, value)
        }
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            let escaped: &[u8] = match ch {
                '<' => b"\\u003c",
                '>' => b"\\u003e",
                '&' => b"\\u0026",
                '\u{2028}' => b"\\u2028",
                '\u{2029}' => b"\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..index].as_bytes())?;
            writer.write_all(escaped)?;
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.end_object_value(writer)
    }
}
