/**
 * A small owned XML element tree on top of quick-xml's event reader and writer.
 *
 * The QTI export works by deep-copying validated template fragments and rewriting
 * a handful of attributes and text fields, so the tree only needs to support
 * cloning, descendant lookup by name, and attribute/text mutation. Namespace
 * declarations are carried verbatim as ordinary attributes; element names keep
 * their prefixes as written.
 */
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::common::{ExportError, Result};


#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    /// Attributes in source order; order is preserved on serialization.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}


impl Element {
    pub fn new(name: &str) -> Self {
        Element {
            name: String::from(name),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Parse an XML document and return its root element. Comments, processing
    /// instructions and the XML declaration are discarded; whitespace-only text is
    /// trimmed away.
    pub fn parse(xml: &str) -> Result<Element> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    stack.push(element_from_tag(e)?);
                },
                Ok(Event::Empty(ref e)) => {
                    let element = element_from_tag(e)?;
                    attach(&mut stack, &mut root, Node::Element(element));
                },
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ExportError::Xml(String::from("unmatched end tag")))?;
                    attach(&mut stack, &mut root, Node::Element(element));
                },
                Ok(Event::Text(ref e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| ExportError::Xml(err.to_string()))?;
                    attach(&mut stack, &mut root, Node::Text(text.into_owned()));
                },
                Ok(Event::CData(ref e)) => {
                    let text = String::from_utf8_lossy(e).into_owned();
                    attach(&mut stack, &mut root, Node::Text(text));
                },
                Ok(Event::Eof) => break,
                Ok(_) => {},
                Err(err) => return Err(ExportError::Xml(err.to_string())),
            }
        }

        if !stack.is_empty() {
            return Err(ExportError::Xml(String::from("unclosed element")));
        }
        root.ok_or_else(|| ExportError::Xml(String::from("document has no root element")))
    }

    /// Serialize the element as an XML document, optionally with a declaration.
    pub fn to_xml(&self, declaration: bool) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        if declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
                .map_err(|err| ExportError::Xml(err.to_string()))?;
        }
        write_element(&mut writer, self)?;
        String::from_utf8(writer.into_inner())
            .map_err(|err| ExportError::Xml(err.to_string()))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value or appending a new pair.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        for (key, existing) in self.attrs.iter_mut() {
            if key == name {
                *existing = String::from(value);
                return;
            }
        }
        self.attrs.push((String::from(name), String::from(value)));
    }

    /// The direct child elements, in order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// The first descendant element with the given name, depth-first.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        for child in self.children.iter_mut() {
            if let Node::Element(el) = child {
                if el.name == name {
                    return Some(el);
                }
                if let Some(found) = el.find_mut(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// All descendant elements with the given name, depth-first. Matched elements
    /// are not searched for nested matches.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        for child in self.elements() {
            if child.name == name {
                found.push(child);
            } else {
                found.extend(child.find_all(name));
            }
        }
        found
    }

    pub fn find_all_mut(&mut self, name: &str) -> Vec<&mut Element> {
        let mut found = Vec::new();
        for child in self.children.iter_mut() {
            if let Node::Element(el) = child {
                if el.name == name {
                    found.push(el);
                } else {
                    found.extend(el.find_all_mut(name));
                }
            }
        }
        found
    }

    /// Remove all direct child elements with the given name.
    pub fn remove_children(&mut self, name: &str) {
        self.children.retain(|node| match node {
            Node::Element(el) => el.name != name,
            Node::Text(_) => true,
        });
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// The concatenated direct text content of the element.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in self.children.iter() {
            if let Node::Text(t) = node {
                text.push_str(t);
            }
        }
        text
    }

    /// Replace the element's text content, leaving child elements in place.
    pub fn set_text(&mut self, text: &str) {
        self.children.retain(|node| match node {
            Node::Element(_) => true,
            Node::Text(_) => false,
        });
        self.children.insert(0, Node::Text(String::from(text)));
    }
}


fn element_from_tag(tag: &BytesStart) -> Result<Element> {
    let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in tag.attributes() {
        let attr = attr.map_err(|err| ExportError::Xml(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| ExportError::Xml(err.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(Element { name, attrs, children: Vec::new() })
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if let Node::Element(el) = node {
        if root.is_none() {
            *root = Some(el);
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in element.attrs.iter() {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|err| ExportError::Xml(err.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|err| ExportError::Xml(err.to_string()))?;
    for child in element.children.iter() {
        match child {
            Node::Element(el) => write_element(writer, el)?,
            Node::Text(text) => {
                writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(|err| ExportError::Xml(err.to_string()))?;
            },
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|err| ExportError::Xml(err.to_string()))
}


#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root version="2">
  <section ident="s1">
    <item ident="i1" title="first"><label>one</label></item>
    <item ident="i2" title="second"><label>two</label></item>
  </section>
</root>"#;

    #[test]
    fn can_parse_and_navigate() {
        let root = Element::parse(SAMPLE).unwrap();
        assert_eq!(root.name, "root");
        assert_eq!(root.attr("version"), Some("2"));

        let section = root.find("section").unwrap();
        assert_eq!(section.attr("ident"), Some("s1"));

        let items = root.find_all("item");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].attr("title"), Some("second"));
        assert_eq!(items[0].find("label").unwrap().text(), "one");
    }

    #[test]
    fn cloned_fragments_are_independent() {
        let root = Element::parse(SAMPLE).unwrap();
        let mut copy = root.find("item").unwrap().clone();
        copy.set_attr("ident", "i9");
        copy.find_mut("label").unwrap().set_text("nine");

        assert_eq!(root.find("item").unwrap().attr("ident"), Some("i1"));
        assert_eq!(root.find("label").unwrap().text(), "one");
        assert_eq!(copy.find("label").unwrap().text(), "nine");
    }

    #[test]
    fn can_remove_and_append_children() {
        let mut root = Element::parse(SAMPLE).unwrap();
        let section = root.find_mut("section").unwrap();
        section.remove_children("item");
        assert!(root.find("item").is_none());

        let section = root.find_mut("section").unwrap();
        section.push(Element::new("item"));
        assert_eq!(root.find_all("item").len(), 1);
    }

    #[test]
    fn text_escapes_survive_a_round_trip() {
        let mut element = Element::new("mattext");
        element.set_attr("texttype", "text/html");
        element.set_text("<div>2 &lt; 3</div>");

        let xml = element.to_xml(false).unwrap();
        assert!(xml.contains("&lt;div&gt;"));

        let parsed = Element::parse(&xml).unwrap();
        assert_eq!(parsed.text(), "<div>2 &lt; 3</div>");
        assert_eq!(parsed.attr("texttype"), Some("text/html"));
    }

    #[test]
    fn declaration_is_optional() {
        let element = Element::new("empty");
        assert!(element.to_xml(true).unwrap().starts_with("<?xml"));
        assert!(element.to_xml(false).unwrap().starts_with("<empty"));
    }
}
