//! String escaping policies for JSON output

use std::io;

use serde_json::ser::Formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapePolicy {
    /// Only the escapes JSON requires; `á`, `ñ`, `<` are written verbatim
    Relaxed,
    /// Non-ASCII and HTML-sensitive characters are written as `\uXXXX`
    #[default]
    Strict,
}

/// Characters escaped by [`EscapePolicy::Strict`] even though they are ASCII
const HTML_SENSITIVE: &[char] = &['<', '>', '&', '\'', '+', '`'];

/// Compact formatter implementing [`EscapePolicy::Strict`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictFormatter;

impl Formatter for StrictFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, c) in fragment.char_indices() {
            if c.is_ascii() && !HTML_SENSITIVE.contains(&c) {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..index])?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04X}", unit)?;
            }
            start = index + c.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}
