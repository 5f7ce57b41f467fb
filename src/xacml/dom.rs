//! Generic XML element tree
//!
//! Turns a quick-xml event stream into owned elements. Element and
//! attribute names are stored by local name so documents using a prefixed
//! XACML namespace parse the same as ones using the default namespace.

use crate::error::{PolicyError, PolicyResult};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Deepest element nesting a document may have
pub const MAX_DEPTH: usize = 64;

/// An owned XML element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Concatenated character data directly inside this element
    pub text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> PolicyResult<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();

        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| {
                PolicyError::malformed(format!("invalid attribute on <{}>: {}", name, e))
            })?;

            let raw_key = attribute.key.as_ref();
            if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
                continue;
            }

            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| {
                    PolicyError::malformed(format!("invalid value for attribute '{}': {}", key, e))
                })?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Get an attribute value by local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child element with the given local name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All child elements with the given local name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// Parse a document into its root element
pub fn parse(xml: &str) -> PolicyResult<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            PolicyError::malformed(format!(
                "invalid XML near byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(start) => {
                check_depth(&stack)?;
                stack.push(Element::from_start(&start)?);
            }
            Event::Empty(start) => {
                check_depth(&stack)?;
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| PolicyError::malformed("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let value = text
                        .unescape()
                        .map_err(|e| PolicyError::malformed(format!("invalid text: {}", e)))?;
                    current.text.push_str(&value);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(PolicyError::malformed(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| PolicyError::malformed("document has no root element"))
}

// Both the tree walk and the drop of an `Element` recurse per level.
fn check_depth(stack: &[Element]) -> PolicyResult<()> {
    if stack.len() >= MAX_DEPTH {
        return Err(PolicyError::malformed(format!(
            "document nesting exceeds {} levels",
            MAX_DEPTH
        )));
    }
    Ok(())
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> PolicyResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(PolicyError::malformed("document has more than one root element"));
    }
    *root = Some(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let root = parse(r#"<a x="1"><b>hello</b><c/><b>world</b></a>"#).unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attribute("x"), Some("1"));
        assert_eq!(root.children.len(), 3);
        let texts: Vec<&str> = root.children_named("b").map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "world"]);
        assert!(root.child("c").is_some());
    }

    #[test]
    fn test_parse_strips_prefixes_and_namespace_declarations() {
        let root = parse(r#"<x:Policy xmlns:x="urn:test" x:PolicyId="p"><x:Rule/></x:Policy>"#)
            .unwrap();
        assert_eq!(root.name, "Policy");
        assert_eq!(root.attributes, vec![("PolicyId".to_string(), "p".to_string())]);
        assert_eq!(root.children[0].name, "Rule");
    }

    #[test]
    fn test_parse_unescapes_text_and_attributes() {
        let root = parse(r#"<a v="&lt;&amp;&gt;">R&amp;D<![CDATA[<x>]]></a>"#).unwrap();
        assert_eq!(root.attribute("v"), Some("<&>"));
        assert_eq!(root.text, "R&D<x>");
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("<a><b></a>").is_err());
        assert!(parse("<a>").is_err());
        assert!(parse("<a/><b/>").is_err());
    }

    fn nested(depth: usize, leaf: &str) -> String {
        format!("{}{}{}", "<a>".repeat(depth), leaf, "</a>".repeat(depth))
    }

    #[test]
    fn test_parse_accepts_nesting_up_to_limit() {
        let root = parse(&nested(MAX_DEPTH, "")).unwrap();
        let mut depth = 1;
        let mut current = &root;
        while let Some(child) = current.child("a") {
            depth += 1;
            current = child;
        }
        assert_eq!(depth, MAX_DEPTH);
    }

    #[test]
    fn test_parse_rejects_nesting_past_limit() {
        for xml in [nested(MAX_DEPTH + 1, ""), nested(MAX_DEPTH, "<b/>"), nested(100_000, "")] {
            match parse(&xml) {
                Err(PolicyError::Malformed(message)) => assert!(message.contains("nesting")),
                other => panic!("expected nesting error, got {:?}", other.map(|e| e.name)),
            }
        }
    }
}
