//! A tolerant HTML tree and a small CSS selector matcher.
//!
//! Enough of a browser DOM for product extraction from pasted or fetched
//! pages: elements, attributes and text, built without ever failing on
//! malformed markup. Not a conforming HTML5 parser.
//!
//! Supported selectors are compound forms only (`tag`, `.class`, `[attr]`,
//! `[attr="v"]`, `[attr*="v"]`, combined like `a[href*="/x/"]`) joined by
//! commas. No descendant or child combinators.

/// Index of a node in a [`Document`].
pub type NodeId = usize;

/// Elements that never have children.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose contents are dropped entirely.
const SKIPPED_ELEMENTS: [&str; 2] = ["script", "style"];

/// Elements whose contents are plain text, not markup.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["textarea", "title"];

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Parsed HTML document. Node 0 is the document root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Root node id.
    pub const ROOT: NodeId = 0;

    /// Build a tree from arbitrary HTML.
    pub fn parse(html: &str) -> Self {
        let mut builder = TreeBuilder::new();
        builder.run(html);
        Self {
            nodes: builder.nodes,
        }
    }

    /// Tag name of an element, lower-cased.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Attribute value of an element.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Concatenated text of every descendant text node.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            match &self.nodes[id].kind {
                NodeKind::Text(t) => out.push_str(t),
                _ => stack.extend(self.nodes[id].children.iter().rev().copied()),
            }
        }
    }

    /// Descendants of `scope` in document order (not including `scope`).
    fn descendants(&self, scope: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: self.nodes[scope].children.iter().rev().copied().collect(),
        }
    }

    /// Every descendant element of `scope` matching `selector`, in document order.
    pub fn select(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|&id| self.matches(id, selector))
            .collect()
    }

    /// First descendant element of `scope` matching `selector`.
    pub fn select_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope).find(|&id| self.matches(id, selector))
    }

    /// `id` itself or its nearest ancestor matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.matches(node, selector) {
                return Some(node);
            }
            current = self.nodes[node].parent;
        }
        None
    }

    /// Whether an element matches any compound in `selector`.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        let NodeKind::Element { tag, attrs } = &self.nodes[id].kind else {
            return false;
        };
        selector.compounds.iter().any(|c| c.matches(tag, attrs))
    }
}

/// Pre-order walk with an explicit stack, so depth never touches the call stack.
struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.nodes[id].children.iter().rev().copied());
        Some(id)
    }
}

// === Selectors ===

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, tag: &str, attrs: &[(String, String)]) -> bool {
        if let Some(ref want) = self.tag {
            if want != "*" && want != tag {
                return false;
            }
        }

        let lookup = |name: &str| attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());

        if !self.classes.is_empty() {
            let class_attr = lookup("class").unwrap_or("");
            let has = |c: &String| class_attr.split_ascii_whitespace().any(|x| x == c);
            if !self.classes.iter().all(has) {
                return false;
            }
        }

        self.attrs.iter().all(|sel| match (lookup(&sel.name), &sel.op) {
            (None, _) => false,
            (Some(_), AttrOp::Exists) => true,
            (Some(v), AttrOp::Equals(want)) => v == want,
            (Some(v), AttrOp::Contains(want)) => !want.is_empty() && v.contains(want.as_str()),
        })
    }
}

/// A comma-separated list of compound selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Compound>,
}

impl Selector {
    /// Parse a selector list. Malformed pieces are dropped rather than
    /// rejected; an empty list matches nothing.
    pub fn new(source: &str) -> Self {
        let compounds = split_top_level(source)
            .into_iter()
            .map(parse_compound)
            .filter(|c| !c.is_empty())
            .collect();
        Self { compounds }
    }
}

/// Split on commas that are not inside `[...]` or quotes.
fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in source.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(source[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(source[start..].trim());
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(source: &str) -> Compound {
    let mut compound = Compound::default();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;

    let read_ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident_char(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    if i < chars.len() && (chars[i] == '*' || is_ident_char(chars[i])) {
        if chars[i] == '*' {
            i += 1;
            compound.tag = Some("*".to_string());
        } else {
            compound.tag = Some(read_ident(&mut i).to_ascii_lowercase());
        }
    }

    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                let class = read_ident(&mut i);
                if !class.is_empty() {
                    compound.classes.push(class);
                }
            }
            '[' => {
                i += 1;
                let close = chars[i..].iter().position(|&c| c == ']').map(|p| p + i);
                let Some(close) = close else { break };
                let body: String = chars[i..close].iter().collect();
                if let Some(sel) = parse_attr_selector(&body) {
                    compound.attrs.push(sel);
                }
                i = close + 1;
            }
            _ => i += 1,
        }
    }
    compound
}

fn parse_attr_selector(body: &str) -> Option<AttrSelector> {
    let unquote = |v: &str| {
        let v = v.trim();
        v.strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| v.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
            .unwrap_or(v)
            .to_string()
    };

    if let Some((name, value)) = body.split_once("*=") {
        return Some(AttrSelector {
            name: name.trim().to_ascii_lowercase(),
            op: AttrOp::Contains(unquote(value)),
        });
    }
    if let Some((name, value)) = body.split_once('=') {
        return Some(AttrSelector {
            name: name.trim().to_ascii_lowercase(),
            op: AttrOp::Equals(unquote(value)),
        });
    }
    let name = body.trim().to_ascii_lowercase();
    (!name.is_empty()).then_some(AttrSelector {
        name,
        op: AttrOp::Exists,
    })
}

// === Tree building ===

struct TreeBuilder {
    nodes: Vec<Node>,
    /// Open elements, innermost last. Always starts with the root.
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            open: vec![Document::ROOT],
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(Document::ROOT)
    }

    fn append(&mut self, kind: NodeKind) -> NodeId {
        let parent = self.current();
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn append_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let text = decode_entities(raw);
        // Merge with a preceding text node
        let parent = self.current();
        if let Some(&last) = self.nodes[parent].children.last() {
            if let NodeKind::Text(ref mut existing) = self.nodes[last].kind {
                existing.push_str(&text);
                return;
            }
        }
        self.append(NodeKind::Text(text));
    }

    fn open_tag_name(&self, id: NodeId) -> &str {
        match &self.nodes[id].kind {
            NodeKind::Element { tag, .. } => tag,
            _ => "",
        }
    }

    /// Pop the innermost open element named `tag`, and everything inside it.
    fn close(&mut self, tag: &str) {
        if let Some(pos) = self.open.iter().rposition(|&id| self.open_tag_name(id) == tag) {
            if pos > 0 {
                self.open.truncate(pos);
            }
        }
    }

    /// Implied end tags: a new `<li>` ends an open `<li>` in the same list,
    /// a new `<p>` or block ends an open `<p>`.
    fn close_implied(&mut self, tag: &str) {
        let scope_of = |t: &str| matches!(t, "ul" | "ol" | "div" | "section" | "article" | "body");
        match tag {
            "li" => {
                for idx in (1..self.open.len()).rev() {
                    let name = self.open_tag_name(self.open[idx]);
                    if name == "li" {
                        self.open.truncate(idx);
                        return;
                    }
                    if scope_of(name) {
                        return;
                    }
                }
            }
            "p" | "div" | "ul" | "ol" | "section" | "article" | "h1" | "h2" | "h3" | "h4"
            | "h5" | "h6" | "table" => {
                if let Some(&last) = self.open.last() {
                    if self.open_tag_name(last) == "p" {
                        self.open.pop();
                    }
                }
            }
            _ => {}
        }
    }

    fn run(&mut self, html: &str) {
        let bytes = html.as_bytes();
        let mut pos = 0;
        let mut text_start = 0;

        while pos < bytes.len() {
            if bytes[pos] != b'<' {
                pos += 1;
                continue;
            }

            let rest = &html[pos..];
            if rest.starts_with("<!--") {
                self.append_text(&html[text_start..pos]);
                pos = match rest[4..].find("-->") {
                    Some(end) => pos + 4 + end + 3,
                    None => bytes.len(),
                };
                text_start = pos;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.append_text(&html[text_start..pos]);
                pos = match rest.find('>') {
                    Some(end) => pos + end + 1,
                    None => bytes.len(),
                };
                text_start = pos;
            } else if rest.starts_with("</") {
                self.append_text(&html[text_start..pos]);
                let end = rest.find('>').map(|e| pos + e + 1).unwrap_or(bytes.len());
                let name: String = rest[2..]
                    .chars()
                    .take_while(|&c| is_tag_name_char(c))
                    .collect::<String>()
                    .to_ascii_lowercase();
                if !name.is_empty() {
                    self.close(&name);
                }
                pos = end;
                text_start = pos;
            } else if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                self.append_text(&html[text_start..pos]);
                let (tag, attrs, self_closing, consumed) = parse_start_tag(rest);
                pos += consumed;

                self.close_implied(&tag);
                let is_void = VOID_ELEMENTS.contains(&tag.as_str());
                let skipped = SKIPPED_ELEMENTS.contains(&tag.as_str());
                let raw = RAW_TEXT_ELEMENTS.contains(&tag.as_str());

                if skipped {
                    pos = skip_past_end_tag(html, pos, &tag);
                } else {
                    let id = self.append(NodeKind::Element {
                        tag: tag.clone(),
                        attrs,
                    });
                    if raw {
                        let body_end = find_end_tag(html, pos, &tag).unwrap_or(bytes.len());
                        self.open.push(id);
                        self.append_text(&html[pos..body_end]);
                        self.open.pop();
                        pos = skip_past_end_tag(html, body_end, &tag);
                    } else if !is_void && !self_closing {
                        self.open.push(id);
                    }
                }
                text_start = pos;
            } else {
                // A lone '<' is text
                pos += 1;
            }
        }
        self.append_text(&html[text_start..]);
    }
}

fn is_tag_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'
}

fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_')
}

/// Byte offset of `</tag` at or after `from`, case-insensitively.
fn find_end_tag(html: &str, from: usize, tag: &str) -> Option<usize> {
    let bytes = html.as_bytes();
    let mut at = from;
    while let Some(offset) = html[at..].find("</") {
        let start = at + offset;
        let name = start + 2;
        if bytes
            .get(name..name + tag.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(tag.as_bytes()))
        {
            return Some(start);
        }
        at = start + 2;
    }
    None
}

/// Position just past `</tag ...>`, or end of input.
fn skip_past_end_tag(html: &str, from: usize, tag: &str) -> usize {
    match find_end_tag(html, from, tag) {
        Some(start) => html[start..]
            .find('>')
            .map(|e| start + e + 1)
            .unwrap_or(html.len()),
        None => html.len(),
    }
}

/// Parse `<tag attr=...>` at the start of `input`.
///
/// Returns (tag, attributes, self-closing, bytes consumed). Scans bytes in
/// place: every delimiter is ASCII, so slicing at them stays on char
/// boundaries.
fn parse_start_tag(input: &str) -> (String, Vec<(String, String)>, bool, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let skip_ws = |i: &mut usize| {
        while *i < len && bytes[*i].is_ascii_whitespace() {
            *i += 1;
        }
    };

    let mut i = 1;
    while i < len && is_tag_name_byte(bytes[i]) {
        i += 1;
    }
    let tag = input[1..i].to_ascii_lowercase();

    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        skip_ws(&mut i);
        if i >= len {
            return (tag, attrs, self_closing, len);
        }
        match bytes[i] {
            b'>' => return (tag, attrs, self_closing, i + 1),
            b'/' => {
                self_closing = true;
                i += 1;
                continue;
            }
            _ => {}
        }
        self_closing = false;

        let start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/') {
            i += 1;
        }
        if i == start {
            // A stray '=' with no name before it
            i += 1;
            continue;
        }
        let name = input[start..i].to_ascii_lowercase();

        skip_ws(&mut i);
        let mut value = "";
        if i < len && bytes[i] == b'=' {
            i += 1;
            skip_ws(&mut i);
            if i < len && matches!(bytes[i], b'"' | b'\'') {
                let quote = bytes[i];
                i += 1;
                let vstart = i;
                while i < len && bytes[i] != quote {
                    i += 1;
                }
                value = &input[vstart..i];
                i = (i + 1).min(len);
            } else {
                let vstart = i;
                while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                value = &input[vstart..i];
            }
        }

        // First occurrence wins, as in browsers
        if !attrs.iter().any(|(k, _)| *k == name) {
            attrs.push((name, decode_entities(value)));
        }
    }
}

/// Decode the common named entities and numeric character references.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let end = after
            .char_indices()
            .take(32)
            .find(|&(_, c)| c == ';')
            .map(|(i, _)| i);

        let decoded = end.and_then(|end| {
            let name = &after[..end];
            let c = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                "copy" => Some('\u{a9}'),
                "reg" => Some('\u{ae}'),
                "euro" => Some('\u{20ac}'),
                "pound" => Some('\u{a3}'),
                "hellip" => Some('\u{2026}'),
                "ndash" => Some('\u{2013}'),
                "mdash" => Some('\u{2014}'),
                _ => {
                    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                    } else if let Some(dec) = name.strip_prefix('#') {
                        dec.parse::<u32>().ok().and_then(char::from_u32)
                    } else {
                        None
                    }
                }
            };
            c.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(doc: &Document, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| doc.text(id).trim().to_string()).collect()
    }

    #[test]
    fn test_parse_nested_elements() {
        let doc = Document::parse(
            r#"<div class="grid"><div class="card"><h3>Lens</h3><span class="price">$12</span></div></div>"#,
        );
        let cards = doc.select(Document::ROOT, &Selector::new(".card"));
        assert_eq!(cards.len(), 1);
        assert_eq!(doc.text(cards[0]), "Lens$12");
        let title = doc.select_first(cards[0], &Selector::new("h1, h2, h3")).unwrap();
        assert_eq!(doc.tag(title), Some("h3"));
    }

    #[test]
    fn test_void_and_self_closing() {
        let doc = Document::parse(r#"<div><img src="a.jpg"><br/><span>after</span></div>"#);
        let div = doc.select_first(Document::ROOT, &Selector::new("div")).unwrap();
        let img = doc.select_first(div, &Selector::new("img")).unwrap();
        assert_eq!(doc.attr(img, "src"), Some("a.jpg"));
        // span is a sibling of img, not its child
        let span = doc.select_first(div, &Selector::new("span")).unwrap();
        assert_eq!(doc.closest(span, &Selector::new("div")), Some(div));
        assert!(doc.select(img, &Selector::new("span")).is_empty());
    }

    #[test]
    fn test_unclosed_list_items() {
        let doc = Document::parse("<ul><li>One<li>Two<li>Three</ul><p>after");
        let items = doc.select(Document::ROOT, &Selector::new("li"));
        assert_eq!(texts(&doc, &items), vec!["One", "Two", "Three"]);
        let p = doc.select_first(Document::ROOT, &Selector::new("p")).unwrap();
        assert_eq!(doc.text(p), "after");
    }

    #[test]
    fn test_stray_end_tags_ignored() {
        let doc = Document::parse("<div><span>a</b></span></div></section><p>b</p>");
        assert_eq!(doc.text(Document::ROOT), "ab");
    }

    #[test]
    fn test_comments_scripts_and_styles_skipped() {
        let doc = Document::parse(
            "<!DOCTYPE html><div><!-- <p>hidden</p> --><script>var x = '<p>';</script>\
             <style>.a{}</style><p>shown</p></div>",
        );
        let ps = doc.select(Document::ROOT, &Selector::new("p"));
        assert_eq!(texts(&doc, &ps), vec!["shown"]);
        assert_eq!(doc.text(Document::ROOT), "shown");
    }

    #[test]
    fn test_attribute_parsing() {
        let doc = Document::parse(
            r#"<a HREF='/products/x' data-id=42 hidden title="Tom &amp; Jerry">x</a>"#,
        );
        let a = doc.select_first(Document::ROOT, &Selector::new("a")).unwrap();
        assert_eq!(doc.attr(a, "href"), Some("/products/x"));
        assert_eq!(doc.attr(a, "data-id"), Some("42"));
        assert_eq!(doc.attr(a, "hidden"), Some(""));
        assert_eq!(doc.attr(a, "title"), Some("Tom & Jerry"));
    }

    #[test]
    fn test_selector_forms() {
        let doc = Document::parse(
            r#"<div>
                <span aria-label="Price">1</span>
                <span class="sale-price big">2</span>
                <span data-price="3">3</span>
                <a href="/products/abc">4</a>
                <a href="/about">5</a>
            </div>"#,
        );
        let count = |sel: &str| doc.select(Document::ROOT, &Selector::new(sel)).len();
        assert_eq!(count(r#"[aria-label="Price"]"#), 1);
        assert_eq!(count(r#"[class*="price"]"#), 1);
        assert_eq!(count(".big.sale-price"), 1);
        assert_eq!(count(".price"), 0);
        assert_eq!(count("[data-price]"), 1);
        assert_eq!(count(r#"a[href*="/products/"]"#), 1);
        assert_eq!(count("a, span"), 5);
        assert_eq!(count(""), 0);
    }

    #[test]
    fn test_select_in_document_order() {
        let doc = Document::parse("<li>a<ul><li>b</li></ul></li><li>c</li>");
        let items = doc.select(Document::ROOT, &Selector::new("li"));
        assert_eq!(items.len(), 3);
        assert_eq!(doc.text(items[1]), "b");
        assert_eq!(doc.text(items[2]), "c");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&#36;5 &#x20AC;6"), "$5 \u{20ac}6");
        assert_eq!(decode_entities("caf&eacute; &"), "caf&eacute; &");
        assert_eq!(decode_entities("1&nbsp;2"), "1\u{a0}2");
    }

    #[test]
    fn test_start_tag_with_multibyte_attribute() {
        let doc = Document::parse(r#"<p title="Café · 5€" class=x>ok</p><span>next</span>"#);
        let p = doc.select_first(Document::ROOT, &Selector::new("p.x")).unwrap();
        assert_eq!(doc.attr(p, "title"), Some("Café · 5€"));
        assert_eq!(doc.text(p), "ok");
        assert!(doc.select_first(Document::ROOT, &Selector::new("span")).is_some());
    }

    #[test]
    fn test_unterminated_start_tag() {
        let doc = Document::parse(r#"<div><a href="/products/x"#);
        let a = doc.select_first(Document::ROOT, &Selector::new("a")).unwrap();
        assert_eq!(doc.attr(a, "href"), Some("/products/x"));
    }

    #[test]
    fn test_deeply_nested_markup() {
        let depth = 100_000;
        let html = format!("{}deep{}", "<b>".repeat(depth), "</b>".repeat(depth));
        let doc = Document::parse(&html);
        assert_eq!(doc.text(Document::ROOT), "deep");
        assert_eq!(doc.select(Document::ROOT, &Selector::new("b")).len(), depth);
    }

    #[test]
    fn test_end_tag_search_ignores_case() {
        let doc = Document::parse("<SCRIPT>x</Script ><TITLE>t</tItLe><p>after</p>");
        assert_eq!(doc.text(Document::ROOT), "tafter");
    }

    #[test]
    fn test_raw_text_elements_keep_markup_as_text() {
        let doc = Document::parse("<title>A <b>bold</b> title</title><b>real</b>");
        let title = doc.select_first(Document::ROOT, &Selector::new("title")).unwrap();
        assert_eq!(doc.text(title), "A <b>bold</b> title");
        assert_eq!(doc.select(Document::ROOT, &Selector::new("b")).len(), 1);
    }
}
