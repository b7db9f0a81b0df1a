//! XML-RPC wire format
//!
//! Value model plus encoding of `<methodCall>` documents and decoding of
//! `<methodResponse>` documents, including `<fault>` payloads. The daemon
//! speaks plain XML-RPC over HTTP; nothing here is hellanzb-specific.

use crate::error::RpcError;
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use std::collections::BTreeMap;

/// An XML-RPC value
///
/// Covers the scalar and composite types the daemon actually emits.
/// `DateTime` keeps the raw ISO 8601 text; callers that need a parsed
/// timestamp convert it themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `<int>` / `<i4>`
    Int(i32),
    /// `<boolean>` (wire format "1"/"0")
    Bool(bool),
    /// `<string>`, or bare text inside `<value>`
    String(String),
    /// `<double>`
    Double(f64),
    /// `<dateTime.iso8601>`, kept as the raw text
    DateTime(String),
    /// `<array>`
    Array(Vec<Value>),
    /// `<struct>`
    Struct(BTreeMap<String, Value>),
}

impl Value {
    fn write_xml(&self, out: &mut String) {
        out.push_str("<value>");
        match self {
            Value::Int(i) => {
                out.push_str("<int>");
                out.push_str(&i.to_string());
                out.push_str("</int>");
            }
            Value::Bool(b) => {
                out.push_str("<boolean>");
                out.push(if *b { '1' } else { '0' });
                out.push_str("</boolean>");
            }
            Value::String(s) => {
                out.push_str("<string>");
                out.push_str(&escape(s));
                out.push_str("</string>");
            }
            Value::Double(d) => {
                out.push_str("<double>");
                out.push_str(&d.to_string());
                out.push_str("</double>");
            }
            Value::DateTime(s) => {
                out.push_str("<dateTime.iso8601>");
                out.push_str(&escape(s));
                out.push_str("</dateTime.iso8601>");
            }
            Value::Array(items) => {
                out.push_str("<array><data>");
                for item in items {
                    item.write_xml(out);
                }
                out.push_str("</data></array>");
            }
            Value::Struct(members) => {
                out.push_str("<struct>");
                for (name, value) in members {
                    out.push_str("<member><name>");
                    out.push_str(&escape(name));
                    out.push_str("</name>");
                    value.write_xml(out);
                    out.push_str("</member>");
                }
                out.push_str("</struct>");
            }
        }
        out.push_str("</value>");
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Int(i) => serde_json::Value::from(i),
            Value::Bool(b) => serde_json::Value::from(b),
            Value::String(s) | Value::DateTime(s) => serde_json::Value::from(s),
            Value::Double(d) => serde_json::Value::from(d),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Struct(members) => serde_json::Value::Object(
                members
                    .into_iter()
                    .map(|(name, value)| (name, value.into()))
                    .collect(),
            ),
        }
    }
}

/// Encode an XML-RPC `<methodCall>` document
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::with_capacity(128);
    out.push_str("<?xml version=\"1.0\"?><methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        param.write_xml(&mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Decode an XML-RPC `<methodResponse>` document
///
/// A `<fault>` response decodes to [`RpcError::Fault`]; anything that is
/// not a well-formed response decodes to [`RpcError::Malformed`].
pub fn decode_response(xml: &str) -> Result<Value, RpcError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_fault = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"fault" => in_fault = true,
                b"value" => {
                    let value = read_value(&mut reader)?;
                    return if in_fault {
                        Err(fault_from_value(value))
                    } else {
                        Ok(value)
                    };
                }
                // methodResponse, params, param
                _ => {}
            },
            Ok(Event::Eof) => {
                return Err(RpcError::Malformed(
                    "response contains no value".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(RpcError::Malformed(e.to_string())),
        }
    }
}

/// Read one value; the opening `<value>` tag has already been consumed
fn read_value(reader: &mut Reader<&[u8]>) -> Result<Value, RpcError> {
    let mut bare_text: Option<String> = None;
    let mut typed: Option<Value> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| RpcError::Malformed(e.to_string()))?;
                bare_text = Some(text.into_owned());
            }
            Ok(Event::Start(e)) => {
                let parsed = match e.name().as_ref() {
                    b"int" | b"i4" => {
                        let text = read_text(reader, "int")?;
                        Value::Int(text.trim().parse().map_err(|_| {
                            RpcError::Malformed(format!("invalid int: {text:?}"))
                        })?)
                    }
                    b"boolean" => {
                        let text = read_text(reader, "boolean")?;
                        Value::Bool(text.trim() == "1")
                    }
                    b"double" => {
                        let text = read_text(reader, "double")?;
                        Value::Double(text.trim().parse().map_err(|_| {
                            RpcError::Malformed(format!("invalid double: {text:?}"))
                        })?)
                    }
                    b"string" => Value::String(read_text(reader, "string")?),
                    b"dateTime.iso8601" => Value::DateTime(read_text(reader, "dateTime")?),
                    b"base64" => Value::String(read_text(reader, "base64")?),
                    b"array" => read_array(reader)?,
                    b"struct" => read_struct(reader)?,
                    other => {
                        return Err(RpcError::Malformed(format!(
                            "unsupported value type: {}",
                            String::from_utf8_lossy(other)
                        )));
                    }
                };
                typed = Some(parsed);
            }
            Ok(Event::Empty(e)) => {
                // Self-closing scalar, e.g. <string/>
                typed = Some(match e.name().as_ref() {
                    b"boolean" | b"int" | b"i4" | b"double" => {
                        return Err(RpcError::Malformed(format!(
                            "empty {} value",
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    }
                    _ => Value::String(String::new()),
                });
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"value" => {
                // Bare text inside <value> is a string per the XML-RPC spec
                return Ok(typed
                    .or(bare_text.map(Value::String))
                    .unwrap_or_else(|| Value::String(String::new())));
            }
            Ok(Event::Eof) => {
                return Err(RpcError::Malformed("unterminated <value>".to_string()));
            }
            Ok(_) => {}
            Err(e) => return Err(RpcError::Malformed(e.to_string())),
        }
    }
}

/// Collect text content up to the closing tag of the current element
fn read_text(reader: &mut Reader<&[u8]>, what: &str) -> Result<String, RpcError> {
    let mut out = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| RpcError::Malformed(e.to_string()))?;
                out.push_str(&text);
            }
            Ok(Event::End(_)) => return Ok(out),
            Ok(Event::Eof) => {
                return Err(RpcError::Malformed(format!("unterminated <{what}>")));
            }
            Ok(_) => {}
            Err(e) => return Err(RpcError::Malformed(e.to_string())),
        }
    }
}

/// Read array items; the opening `<array>` tag has already been consumed
fn read_array(reader: &mut Reader<&[u8]>) -> Result<Value, RpcError> {
    let mut items = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"value" => {
                items.push(read_value(reader)?);
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"data" => {}
            Ok(Event::Empty(e)) if e.name().as_ref() == b"value" => {
                items.push(Value::String(String::new()));
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"array" => {
                return Ok(Value::Array(items));
            }
            // </data>
            Ok(Event::End(_)) => {}
            Ok(Event::Eof) => {
                return Err(RpcError::Malformed("unterminated <array>".to_string()));
            }
            Ok(_) => {}
            Err(e) => return Err(RpcError::Malformed(e.to_string())),
        }
    }
}

/// Read struct members; the opening `<struct>` tag has already been consumed
fn read_struct(reader: &mut Reader<&[u8]>) -> Result<Value, RpcError> {
    let mut members = BTreeMap::new();
    let mut pending_name: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"member" => {}
                b"name" => pending_name = Some(read_text(reader, "name")?),
                b"value" => {
                    let value = read_value(reader)?;
                    let name = pending_name.take().ok_or_else(|| {
                        RpcError::Malformed("struct member value without name".to_string())
                    })?;
                    members.insert(name, value);
                }
                other => {
                    return Err(RpcError::Malformed(format!(
                        "unexpected element in struct: {}",
                        String::from_utf8_lossy(other)
                    )));
                }
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"value" => {
                let name = pending_name.take().ok_or_else(|| {
                    RpcError::Malformed("struct member value without name".to_string())
                })?;
                members.insert(name, Value::String(String::new()));
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"struct" => {
                return Ok(Value::Struct(members));
            }
            // </member>
            Ok(Event::End(_)) => {}
            Ok(Event::Eof) => {
                return Err(RpcError::Malformed("unterminated <struct>".to_string()));
            }
            Ok(_) => {}
            Err(e) => return Err(RpcError::Malformed(e.to_string())),
        }
    }
}

/// Turn a decoded `<fault>` value into [`RpcError::Fault`]
fn fault_from_value(value: Value) -> RpcError {
    if let Value::Struct(members) = &value {
        let code = match members.get("faultCode") {
            Some(Value::Int(code)) => *code,
            _ => 0,
        };
        let message = match members.get("faultString") {
            Some(Value::String(message)) => message.clone(),
            _ => "unknown fault".to_string(),
        };
        return RpcError::Fault { code, message };
    }
    RpcError::Malformed("fault payload is not a struct".to_string())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_call_no_params() {
        let xml = encode_call("status", &[]);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?><methodCall><methodName>status</methodName>\
             <params></params></methodCall>"
        );
    }

    #[test]
    fn test_encode_call_with_params() {
        let xml = encode_call(
            "move",
            &[Value::String("12".to_string()), Value::Int(2)],
        );
        assert!(xml.contains("<methodName>move</methodName>"));
        assert!(xml.contains("<param><value><string>12</string></value></param>"));
        assert!(xml.contains("<param><value><int>2</int></value></param>"));
    }

    #[test]
    fn test_encode_escapes_markup() {
        let xml = encode_call("log", &[Value::String("a<b&c".to_string())]);
        assert!(xml.contains("<string>a&lt;b&amp;c</string>"));
        assert!(!xml.contains("a<b&c"));
    }

    #[test]
    fn test_decode_scalar_types() {
        let xml = r#"<?xml version="1.0"?>
            <methodResponse><params><param>
              <value><int>42</int></value>
            </param></params></methodResponse>"#;
        assert_eq!(decode_response(xml).unwrap(), Value::Int(42));

        let xml = "<methodResponse><params><param>\
                   <value><boolean>1</boolean></value>\
                   </param></params></methodResponse>";
        assert_eq!(decode_response(xml).unwrap(), Value::Bool(true));

        let xml = "<methodResponse><params><param>\
                   <value><double>3.5</double></value>\
                   </param></params></methodResponse>";
        assert_eq!(decode_response(xml).unwrap(), Value::Double(3.5));
    }

    #[test]
    fn test_decode_implicit_string() {
        // Bare text inside <value> is a string
        let xml = "<methodResponse><params><param>\
                   <value>hella</value>\
                   </param></params></methodResponse>";
        assert_eq!(
            decode_response(xml).unwrap(),
            Value::String("hella".to_string())
        );
    }

    #[test]
    fn test_decode_unescapes_entities() {
        let xml = "<methodResponse><params><param>\
                   <value><string>a&lt;b&amp;c</string></value>\
                   </param></params></methodResponse>";
        assert_eq!(
            decode_response(xml).unwrap(),
            Value::String("a<b&c".to_string())
        );
    }

    #[test]
    fn test_decode_status_struct() {
        let xml = "<methodResponse><params><param><value><struct>\
                   <member><name>is_paused</name><value><boolean>0</boolean></value></member>\
                   <member><name>rate</name><value><double>512.5</double></value></member>\
                   <member><name>maxrate</name><value><int>0</int></value></member>\
                   <member><name>uptime</name><value><string>2 days</string></value></member>\
                   </struct></value></param></params></methodResponse>";

        let value = decode_response(xml).unwrap();
        let Value::Struct(members) = value else {
            panic!("expected struct");
        };
        assert_eq!(members["is_paused"], Value::Bool(false));
        assert_eq!(members["rate"], Value::Double(512.5));
        assert_eq!(members["maxrate"], Value::Int(0));
        assert_eq!(members["uptime"], Value::String("2 days".to_string()));
    }

    #[test]
    fn test_decode_queue_array() {
        let xml = "<methodResponse><params><param><value><array><data>\
                   <value><struct>\
                   <member><name>id</name><value><int>4</int></value></member>\
                   <member><name>nzbName</name><value><string>Some.Archive</string></value></member>\
                   </struct></value>\
                   <value><struct>\
                   <member><name>id</name><value><int>7</int></value></member>\
                   <member><name>nzbName</name><value><string>Other.Archive</string></value></member>\
                   </struct></value>\
                   </data></array></value></param></params></methodResponse>";

        let Value::Array(items) = decode_response(xml).unwrap() else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 2);
        let Value::Struct(first) = &items[0] else {
            panic!("expected struct");
        };
        assert_eq!(first["id"], Value::Int(4));
    }

    #[test]
    fn test_decode_empty_array() {
        let xml = "<methodResponse><params><param>\
                   <value><array><data></data></array></value>\
                   </param></params></methodResponse>";
        assert_eq!(decode_response(xml).unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn test_decode_fault() {
        let xml = "<methodResponse><fault><value><struct>\
                   <member><name>faultCode</name><value><int>8001</int></value></member>\
                   <member><name>faultString</name><value><string>no such method</string></value></member>\
                   </struct></value></fault></methodResponse>";

        match decode_response(xml) {
            Err(RpcError::Fault { code, message }) => {
                assert_eq!(code, 8001);
                assert_eq!(message, "no such method");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_response("this is not xml at all"),
            Err(RpcError::Malformed(_))
        ));
        assert!(matches!(
            decode_response("<methodResponse></methodResponse>"),
            Err(RpcError::Malformed(_))
        ));
    }

    #[test]
    fn test_json_bridge() {
        let mut members = BTreeMap::new();
        members.insert("id".to_string(), Value::Int(4));
        members.insert("nzbName".to_string(), Value::String("x".to_string()));
        let json: serde_json::Value = Value::Array(vec![Value::Struct(members)]).into();

        assert_eq!(json[0]["id"], 4);
        assert_eq!(json[0]["nzbName"], "x");
    }

    #[test]
    fn test_roundtrip_nested() {
        let mut inner = BTreeMap::new();
        inner.insert("name".to_string(), Value::String("a&b".to_string()));
        let original = Value::Array(vec![Value::Struct(inner), Value::Bool(true)]);

        let mut xml = String::from("<methodResponse><params><param>");
        original.write_xml(&mut xml);
        xml.push_str("</param></params></methodResponse>");

        assert_eq!(decode_response(&xml).unwrap(), original);
    }
}
