//! Shared helpers for the two hand-coded XML codecs (`context_xml`,
//! `webapp_xml`).
//!
//! Parsing uses `quick-xml` events; serialization builds the document as a
//! plain string so that attribute order, indentation, and header comments
//! come out exactly as Tomcat ships them. Helper errors are plain reason
//! strings — the per-file parse entry points wrap them into
//! [`TomcatKitError::Parse`](crate::TomcatKitError::Parse) with the file path.

use quick_xml::events::BytesStart;
use quick_xml::name::LocalName;

pub(crate) type RawResult<T> = std::result::Result<T, String>;

/// Escape text or attribute content for XML output.
pub(crate) fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub(crate) fn local_name_as_str<'a>(name: &'a LocalName<'a>) -> &'a str {
    std::str::from_utf8(name.as_ref()).unwrap_or_default()
}

/// Look up an attribute by (case-sensitive) name, unescaping its value.
pub(crate) fn attr(event: &BytesStart, key: &str) -> RawResult<Option<String>> {
    for attr in event.attributes().with_checks(false) {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// All attributes of an element in declaration order, unescaped.
pub(crate) fn all_attrs(event: &BytesStart) -> RawResult<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attr in event.attributes().with_checks(false) {
        let attr = attr.map_err(|e| e.to_string())?;
        let name = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| e.to_string())?
            .to_string();
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        out.push((name, value.into_owned()));
    }
    Ok(out)
}

pub(crate) fn attr_bool(event: &BytesStart, key: &str) -> RawResult<Option<bool>> {
    match attr(event, key)? {
        None => Ok(None),
        Some(v) => match v.as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => Err(format!("attribute '{key}' is not a boolean: '{other}'")),
        },
    }
}

pub(crate) fn attr_i64(event: &BytesStart, key: &str) -> RawResult<Option<i64>> {
    match attr(event, key)? {
        None => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .map(Some)
            .map_err(|_| format!("attribute '{key}' is not an integer: '{v}'")),
    }
}

// --- serialization side ---

/// Append ` name="value"` with the value escaped.
pub(crate) fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&xml_escape(value));
    out.push('"');
}

pub(crate) fn push_attr_opt(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(v) = value {
        push_attr(out, name, v);
    }
}

pub(crate) fn push_attr_bool(out: &mut String, name: &str, value: Option<bool>) {
    if let Some(v) = value {
        push_attr(out, name, if v { "true" } else { "false" });
    }
}

pub(crate) fn push_attr_i64(out: &mut String, name: &str, value: Option<i64>) {
    if let Some(v) = value {
        push_attr(out, name, &v.to_string());
    }
}

/// Append an indented `<tag>text</tag>` line (used by the element-per-value
/// web.xml format).
pub(crate) fn push_text_element(out: &mut String, indent: &str, tag: &str, text: &str) {
    out.push_str(indent);
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&xml_escape(text));
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;
    use quick_xml::events::Event;

    fn first_start(doc: &str) -> BytesStart<'static> {
        let mut reader = Reader::from_str(doc);
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) => return e.into_owned(),
                Event::Eof => panic!("no element in {doc}"),
                _ => {}
            }
        }
    }

    #[test]
    fn escape_covers_attribute_metacharacters() {
        assert_eq!(
            xml_escape(r#"a & b < c > d " e"#),
            "a &amp; b &lt; c &gt; d &quot; e"
        );
    }

    #[test]
    fn attr_reads_and_unescapes() {
        let e = first_start(r#"<Resource name="jdbc/Main" url="a&amp;b"/>"#);
        assert_eq!(attr(&e, "name").unwrap().unwrap(), "jdbc/Main");
        assert_eq!(attr(&e, "url").unwrap().unwrap(), "a&b");
        assert!(attr(&e, "missing").unwrap().is_none());
    }

    #[test]
    fn attr_bool_rejects_garbage() {
        let e = first_start(r#"<Loader delegate="maybe"/>"#);
        let err = attr_bool(&e, "delegate").unwrap_err();
        assert!(err.contains("delegate"));
    }

    #[test]
    fn attr_i64_parses() {
        let e = first_start(r#"<Resource maxTotal="100"/>"#);
        assert_eq!(attr_i64(&e, "maxTotal").unwrap(), Some(100));
    }

    #[test]
    fn all_attrs_preserves_order() {
        let e = first_start(r#"<Valve className="X" prefix="p" suffix="s"/>"#);
        let attrs = all_attrs(&e).unwrap();
        let names: Vec<&str> = attrs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["className", "prefix", "suffix"]);
    }

    #[test]
    fn push_attr_skips_unset_options() {
        let mut out = String::from("<Context");
        push_attr_opt(&mut out, "path", Some("/app"));
        push_attr_bool(&mut out, "reloadable", Some(false));
        push_attr_bool(&mut out, "crossContext", None);
        push_attr_i64(&mut out, "cacheMaxSize", None);
        out.push_str("/>");
        assert_eq!(out, r#"<Context path="/app" reloadable="false"/>"#);
    }

    #[test]
    fn text_element_escapes_body() {
        let mut out = String::new();
        push_text_element(&mut out, "    ", "servlet-name", "a<b");
        assert_eq!(out, "    <servlet-name>a&lt;b</servlet-name>\n");
    }
}
