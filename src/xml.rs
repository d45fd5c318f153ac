//! Conversion between XML text and the nested-mapping document form
//!
//! Attributes become `@name` keys, element text becomes `$`, repeated
//! sibling elements become arrays and elements holding only text become
//! plain strings, kept as written (an empty element is the empty string).
//! Namespace declarations found below the root are hoisted onto the root
//! mapping. Output is compact, without indentation.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::Value;

use crate::descriptor::Document;
use crate::error::{Error, Result};
use crate::name::{ATTRIBUTE_MARKER, TEXT};

/// Root element name and content of a parsed XML document
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// Tag of the root element as written, including any prefix
    pub root: String,
    /// Root element content, with every namespace declaration
    pub document: Document,
}

struct Frame {
    name: String,
    content: Document,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            content: Document::new(),
            text: String::new(),
        }
    }

    fn into_value(mut self) -> (String, Value) {
        // Text-only content is kept as written, an empty element being empty
        // text. Whitespace next to attributes or child elements is layout.
        if self.content.is_empty() {
            return (self.name, Value::String(self.text));
        }
        if self.text.trim().is_empty() {
            return (self.name, Value::Object(self.content));
        }
        let has_children = self
            .content
            .keys()
            .any(|key| !key.starts_with(ATTRIBUTE_MARKER));
        let text = if has_children {
            self.text.trim().to_string()
        } else {
            self.text
        };
        self.content.insert(TEXT.to_string(), Value::String(text));
        (self.name, Value::Object(self.content))
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::InvalidXml(e.to_string()))
}

fn append_child(parent: &mut Document, name: String, value: Value) {
    match parent.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.insert(name, value);
        }
    }
}

fn resolve_reference(name: &str) -> Result<String> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        };
        return parsed
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| Error::InvalidXml(format!("invalid character reference &{};", name)));
    }
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidXml(format!("undefined entity &{};", name)))
}

/// Parse XML text into its root tag and nested-mapping content
///
/// Document type declarations are rejected.
///
/// # Example
///
/// ```
/// use bom_xml::xml::parse_document;
/// use serde_json::json;
///
/// let parsed = parse_document(r#"<a xmlns="urn:x"><b u="kg">2</b><c>x</c><c>y</c></a>"#).unwrap();
/// assert_eq!(parsed.root, "a");
/// assert_eq!(
///     serde_json::Value::Object(parsed.document),
///     json!({"@xmlns": "urn:x", "b": {"@u": "kg", "$": "2"}, "c": ["x", "y"]})
/// );
/// ```
pub fn parse_document(xml: &str) -> Result<XmlDocument> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut declarations: Vec<(String, String)> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = reader.read_event_into(&mut buf);
        let is_empty = matches!(event, Ok(Event::Empty(_)));
        match event {
            Ok(Event::DocType(_)) => {
                return Err(Error::InvalidXml(
                    "DTD declarations are not allowed in BoM documents".to_string(),
                ));
            }
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if root.is_some() {
                    return Err(Error::InvalidXml(
                        "content after the root element".to_string(),
                    ));
                }
                let name = utf8(e.name().as_ref())?.to_string();
                let mut frame = Frame::new(name);
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| Error::InvalidXml(e.to_string()))?;
                    let key = utf8(attr.key.as_ref())?;
                    let value = unescape(utf8(&attr.value)?)
                        .map_err(|e| Error::InvalidXml(e.to_string()))?
                        .into_owned();
                    let key = format!("{}{}", ATTRIBUTE_MARKER, key);
                    if !stack.is_empty() && crate::NamespaceResolver::is_declaration(&key) {
                        declarations.push((key, value));
                    } else {
                        frame.content.insert(key, Value::String(value));
                    }
                }
                stack.push(frame);
                if is_empty {
                    close_element(&mut stack, &mut root)?;
                }
            }
            Ok(Event::End(_)) => {
                close_element(&mut stack, &mut root)?;
            }
            Ok(Event::Text(ref t)) => {
                let text = t.decode().map_err(|e| Error::InvalidXml(e.to_string()))?;
                push_text(&mut stack, &text)?;
            }
            Ok(Event::CData(ref c)) => {
                push_text(&mut stack, utf8(c)?)?;
            }
            Ok(Event::GeneralRef(ref r)) => {
                let text = resolve_reference(utf8(r)?)?;
                push_text(&mut stack, &text)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::InvalidXml("unexpected end of document".to_string()));
    }
    let (root, value) =
        root.ok_or_else(|| Error::InvalidXml("document has no root element".to_string()))?;
    let mut document = match value {
        Value::Object(content) => content,
        Value::String(text) if text.is_empty() => Document::new(),
        text => {
            let mut content = Document::new();
            content.insert(TEXT.to_string(), text);
            content
        }
    };
    for (key, uri) in declarations {
        match document.get(&key).and_then(Value::as_str) {
            Some(bound) if bound != uri => {
                return Err(Error::InvalidXml(format!(
                    "conflicting namespace declarations for {}",
                    key
                )));
            }
            Some(_) => {}
            None => {
                document.insert(key, Value::String(uri));
            }
        }
    }
    Ok(XmlDocument { root, document })
}

fn push_text(stack: &mut [Frame], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(frame) => {
            frame.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(Error::InvalidXml("text outside the root element".to_string())),
    }
}

fn close_element(stack: &mut Vec<Frame>, root: &mut Option<(String, Value)>) -> Result<()> {
    let frame = stack
        .pop()
        .ok_or_else(|| Error::InvalidXml("unbalanced end tag".to_string()))?;
    let (name, value) = frame.into_value();
    match stack.last_mut() {
        Some(parent) => append_child(&mut parent.content, name, value),
        None => *root = Some((name, value)),
    }
    Ok(())
}

fn scalar_text(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(Error::xml_write(format!(
            "{} must hold a single value",
            key
        ))),
    }
}

/// Write a root element and its nested-mapping content as XML text
///
/// # Example
///
/// ```
/// use bom_xml::xml::write_document;
/// use serde_json::json;
///
/// let doc = json!({"@xmlns": "urn:x", "c": ["x", "y"]});
/// let xml = write_document("a", doc.as_object().unwrap()).unwrap();
/// assert!(xml.ends_with(r#"<a xmlns="urn:x"><c>x</c><c>y</c></a>"#));
/// ```
pub fn write_document(root: &str, document: &Document) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| Error::xml_write(format!("Failed to write XML declaration: {}", e)))?;
    write_element(&mut writer, root, document)?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::xml_write(format!("Output is not UTF-8: {}", e)))
}

fn write_value(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                write_value(writer, name, item)?;
            }
            Ok(())
        }
        Value::Object(content) => write_element(writer, name, content),
        Value::Null => writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(|e| Error::xml_write(format!("Failed to write <{}>: {}", name, e))),
        scalar => {
            let text = scalar_text(name, scalar)?;
            write_text_element(writer, BytesStart::new(name), name, &text)
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, content: &Document) -> Result<()> {
    let mut start = BytesStart::new(name);
    let mut text = None;
    let mut children = Vec::new();
    for (key, value) in content {
        if key == TEXT {
            text = Some(scalar_text(key, value)?);
        } else if let Some(attribute) = key.strip_prefix(ATTRIBUTE_MARKER) {
            let value = scalar_text(key, value)?;
            start.push_attribute((attribute, value.as_str()));
        } else {
            children.push((key, value));
        }
    }

    if children.is_empty() {
        return match text {
            Some(text) => write_text_element(writer, start, name, &text),
            None => writer
                .write_event(Event::Empty(start))
                .map_err(|e| Error::xml_write(format!("Failed to write <{}>: {}", name, e))),
        };
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::xml_write(format!("Failed to write <{}>: {}", name, e)))?;
    if let Some(text) = text {
        writer
            .write_event(Event::Text(BytesText::new(&text)))
            .map_err(|e| Error::xml_write(format!("Failed to write text of <{}>: {}", name, e)))?;
    }
    for (key, value) in children {
        write_value(writer, key, value)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| Error::xml_write(format!("Failed to write </{}>: {}", name, e)))
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    start: BytesStart<'_>,
    name: &str,
    text: &str,
) -> Result<()> {
    writer
        .write_event(Event::Start(start))
        .and_then(|_| writer.write_event(Event::Text(BytesText::new(text))))
        .and_then(|_| writer.write_event(Event::End(BytesEnd::new(name))))
        .map_err(|e| Error::xml_write(format!("Failed to write <{}>: {}", name, e)))
}
