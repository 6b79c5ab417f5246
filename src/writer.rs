//! Low-level XML emitter.
//!
//! Writes tags, attributes and character data into an in-memory buffer.
//! Escaping follows the usual split: attribute values escape `& < > " '`,
//! character data escapes only `& < >`. Tab, line feed and carriage return
//! are written as character references where a parser would otherwise
//! normalize them away. Characters outside the XML 1.0 `Char` production are
//! rejected.

use crate::error::{Error, Result};
use quick_xml::escape::{escape, partial_escape};

pub const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, Default)]
pub struct XmlWriter {
    buf: String,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declaration(&mut self) {
        self.buf.push_str(DECLARATION);
    }

    /// Write `<name`. Attributes may follow until the tag is closed.
    pub fn open_start(&mut self, name: &str) {
        self.buf.push('<');
        self.buf.push_str(name);
    }

    pub fn attribute(&mut self, name: &str, value: &str) -> Result<()> {
        check_chars(value)?;
        self.buf.push(' ');
        self.buf.push_str(name);
        self.buf.push_str("=\"");
        for c in escape(value).chars() {
            match c {
                '\t' => self.buf.push_str("&#x9;"),
                '\n' => self.buf.push_str("&#xA;"),
                '\r' => self.buf.push_str("&#xD;"),
                c => self.buf.push(c),
            }
        }
        self.buf.push('"');
        Ok(())
    }

    pub fn close_start(&mut self) {
        self.buf.push('>');
    }

    /// Close the open tag as a self-closing element.
    pub fn close_empty(&mut self) {
        self.buf.push_str(" />");
    }

    pub fn text(&mut self, text: &str) -> Result<()> {
        check_chars(text)?;
        for c in partial_escape(text).chars() {
            match c {
                '\r' => self.buf.push_str("&#xD;"),
                c => self.buf.push(c),
            }
        }
        Ok(())
    }

    pub fn end(&mut self, name: &str) {
        self.buf.push_str("</");
        self.buf.push_str(name);
        self.buf.push('>');
    }

    /// `<name>text</name>`
    pub fn leaf(&mut self, name: &str, text: &str) -> Result<()> {
        self.open_start(name);
        self.close_start();
        self.text(text)?;
        self.end(name);
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

fn check_chars(text: &str) -> Result<()> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(Error::IllegalCharacter(c)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_closing_element() {
        let mut w = XmlWriter::new();
        w.open_start("a");
        w.attribute("b", "1").unwrap();
        w.close_empty();
        assert_eq!(w.into_string(), r#"<a b="1" />"#);
    }

    #[test]
    fn test_attribute_escaping() {
        let mut w = XmlWriter::new();
        w.open_start("a");
        w.attribute("v", r#"<&>"'"#).unwrap();
        w.close_empty();
        assert_eq!(w.into_string(), r#"<a v="&lt;&amp;&gt;&quot;&apos;" />"#);
    }

    #[test]
    fn test_attribute_whitespace_survives_normalization() {
        let mut w = XmlWriter::new();
        w.open_start("a");
        w.attribute("v", "x\ty\nz\r").unwrap();
        w.close_empty();
        assert_eq!(w.into_string(), r#"<a v="x&#x9;y&#xA;z&#xD;" />"#);
    }

    #[test]
    fn test_text_escaping_leaves_quotes() {
        let mut w = XmlWriter::new();
        w.leaf("a", r#"<&>"'"#).unwrap();
        assert_eq!(w.into_string(), r#"<a>&lt;&amp;&gt;"'</a>"#);
    }

    #[test]
    fn test_text_keeps_line_feeds() {
        let mut w = XmlWriter::new();
        w.leaf("a", "1\n2\r\n").unwrap();
        assert_eq!(w.into_string(), "<a>1\n2&#xD;\n</a>");
    }

    #[test]
    fn test_illegal_characters_are_rejected() {
        let mut w = XmlWriter::new();
        w.open_start("a");
        assert_eq!(w.attribute("v", "a\u{1}"), Err(Error::IllegalCharacter('\u{1}')));
        assert_eq!(w.text("x\0y"), Err(Error::IllegalCharacter('\0')));
        assert_eq!(w.text("\u{FFFF}"), Err(Error::IllegalCharacter('\u{FFFF}')));
        assert!(w.text("\u{10000}").is_ok());
    }

    #[test]
    fn test_non_ascii_text_is_untouched() {
        let mut w = XmlWriter::new();
        w.leaf("a", "héllo ✓").unwrap();
        assert_eq!(w.as_str(), "<a>héllo ✓</a>");
    }
}
