//! Minimal XML-RPC codec
//!
//! Covers what rTorrent speaks: scalar values, arrays, structs, and faults.
//! Requests are written as strings; responses are read into a small element
//! tree with `quick-xml` and then interpreted.

use crate::RtorrentError;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fmt::Write;

/// An XML-RPC value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `<i4>`, `<i8>`, or `<int>`
    Int(i64),
    /// `<boolean>`
    Bool(bool),
    /// `<double>`
    Double(f64),
    /// `<string>` or an untyped `<value>`
    String(String),
    /// `<array>`
    Array(Vec<Value>),
    /// `<struct>`, members in document order
    Struct(Vec<(String, Value)>),
    /// `<nil/>`
    Nil,
}

impl Value {
    /// Get the value as an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Consume the value as an array
    pub fn into_array(self) -> Option<Vec<Value>> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Look up a struct member by name
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Encode a method call document
///
/// # Examples
///
/// ```
/// use reaper_rtorrent::xmlrpc::{encode_call, Value};
///
/// let body = encode_call("d.name", &[Value::from("ABC")]);
/// assert!(body.contains("<methodName>d.name</methodName>"));
/// assert!(body.contains("<string>ABC</string>"));
/// ```
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?><methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(n) => {
            let _ = write!(out, "<i8>{}</i8>", n);
        }
        Value::Bool(b) => {
            let _ = write!(out, "<boolean>{}</boolean>", if *b { 1 } else { 0 });
        }
        Value::Double(d) => {
            let _ = write!(out, "<double>{}</double>", d);
        }
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::Array(values) => {
            out.push_str("<array><data>");
            for v in values {
                write_value(out, v);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, v) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, v);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

fn invalid(message: impl Into<String>) -> RtorrentError {
    RtorrentError::InvalidResponse(message.into())
}

fn parse_tree(xml: &str) -> Result<Element, RtorrentError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Element {
                name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                ..Default::default()
            }),
            Ok(Event::Empty(e)) => {
                let element = Element {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    ..Default::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| invalid("unbalanced end tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| invalid(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(invalid(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(invalid("document ended inside an element"));
    }
    root.ok_or_else(|| invalid("empty document"))
}

fn decode_value(value: &Element) -> Result<Value, RtorrentError> {
    let Some(typed) = value.children.first() else {
        // An untyped <value> is a string, whitespace included
        return Ok(Value::String(value.text.clone()));
    };

    match typed.name.as_str() {
        "i4" | "i8" | "int" => typed
            .text
            .trim()
            .parse()
            .map(Value::Int)
            .map_err(|e| invalid(format!("bad integer '{}': {}", typed.text, e))),
        "boolean" => Ok(Value::Bool(typed.text.trim() == "1")),
        "double" => typed
            .text
            .trim()
            .parse()
            .map(Value::Double)
            .map_err(|e| invalid(format!("bad double '{}': {}", typed.text, e))),
        "string" | "base64" | "dateTime.iso8601" => Ok(Value::String(typed.text.clone())),
        "nil" => Ok(Value::Nil),
        "array" => {
            let data = typed.child("data").ok_or_else(|| invalid("array without data"))?;
            data.children
                .iter()
                .filter(|c| c.name == "value")
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "struct" => typed
            .children
            .iter()
            .filter(|c| c.name == "member")
            .map(|member| -> Result<(String, Value), RtorrentError> {
                let name = member.child("name").ok_or_else(|| invalid("member without name"))?;
                let value = member.child("value").ok_or_else(|| invalid("member without value"))?;
                Ok((name.text.clone(), decode_value(value)?))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Struct),
        other => Err(invalid(format!("unsupported value type '{}'", other))),
    }
}

/// Decode a method response document into its single return value
///
/// A `<fault>` response becomes [`RtorrentError::Fault`].
pub fn decode_response(xml: &str) -> Result<Value, RtorrentError> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(invalid(format!("unexpected root element '{}'", root.name)));
    }

    if let Some(fault) = root.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| invalid("fault without value"))
            .and_then(decode_value)?;
        return Err(RtorrentError::Fault {
            code: value.member("faultCode").and_then(Value::as_i64).unwrap_or(0),
            message: value
                .member("faultString")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }

    let value = root
        .child("params")
        .and_then(|params| params.child("param"))
        .and_then(|param| param.child("value"))
        .ok_or_else(|| invalid("response without a return value"))?;
    decode_value(value)
}
