use crate::selector::{SelectorError, SelectorList, parse_selector_list};
use crate::types::{Id, Mutation, Node, NodeKind};

/// A mutable page: `#document > html > (head, body)` plus whatever the
/// caller builds below it.
///
/// Every structural or attribute change is recorded and handed out by
/// [`Document::take_mutations`] in the order it happened.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    mutations: Vec<Mutation>,
    head: Id,
    body: Id,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                id: Id(0),
                parent: None,
                kind: NodeKind::Document,
                children: Vec::new(),
            }],
            mutations: Vec::new(),
            head: Id(0),
            body: Id(0),
        };
        let html = doc.append_element(doc.root(), "html", &[]);
        doc.head = doc.append_element(html, "head", &[]);
        doc.body = doc.append_element(html, "body", &[]);
        doc.mutations.clear();
        doc
    }

    #[inline]
    pub fn root(&self) -> Id {
        Id(0)
    }

    #[inline]
    pub fn head(&self) -> Id {
        self.head
    }

    #[inline]
    pub fn body(&self) -> Id {
        self.body
    }

    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn push_node(&mut self, parent: Id, kind: NodeKind) -> Id {
        let id = Id(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            parent: Some(parent),
            kind,
            children: Vec::new(),
        });
        if let Some(p) = self.nodes.get_mut(parent.0 as usize) {
            p.children.push(id);
        }
        self.mutations.push(Mutation::ChildList { target: parent });
        id
    }

    pub fn append_element(&mut self, parent: Id, name: &str, attributes: &[(&str, &str)]) -> Id {
        let attributes = attributes
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), Some(v.to_string())))
            .collect();
        self.push_node(
            parent,
            NodeKind::Element {
                name: name.to_ascii_lowercase(),
                attributes,
            },
        )
    }

    pub fn append_text(&mut self, parent: Id, text: &str) -> Id {
        self.push_node(
            parent,
            NodeKind::Text {
                text: text.to_string(),
            },
        )
    }

    pub fn parent_element(&self, id: Id) -> Option<Id> {
        let parent = self.node(id)?.parent?;
        self.node(parent)
            .filter(|n| n.is_element())
            .map(|n| n.id)
    }

    /// Whether `id` is `ancestor` or lies somewhere below it.
    pub fn contains(&self, ancestor: Id, id: Id) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).and_then(|n| n.parent);
        }
        false
    }

    pub fn attribute(&self, id: Id, name: &str) -> Option<&str> {
        self.node(id)?
            .attributes()
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn set_attribute(&mut self, id: Id, name: &str, value: &str) {
        let Some(Node {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(id.0 as usize)
        else {
            return;
        };
        match attributes.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = Some(value.to_string()),
            None => attributes.push((name.to_ascii_lowercase(), Some(value.to_string()))),
        }
        self.mutations.push(Mutation::Attribute {
            target: id,
            name: name.to_ascii_lowercase(),
        });
    }

    pub fn text_content(&self, id: Id) -> String {
        fn walk(doc: &Document, id: Id, out: &mut String) {
            let Some(node) = doc.node(id) else {
                return;
            };
            match &node.kind {
                NodeKind::Text { text } => out.push_str(text),
                _ => {
                    for &child in &node.children {
                        walk(doc, child, out);
                    }
                }
            }
        }
        let mut out = String::new();
        walk(self, id, &mut out);
        out
    }

    /// Replace every child of `id` with a single text node.
    pub fn set_text_content(&mut self, id: Id, text: &str) {
        let Some(node) = self.nodes.get_mut(id.0 as usize) else {
            return;
        };
        if let NodeKind::Text { text: existing } = &mut node.kind {
            *existing = text.to_string();
            self.mutations.push(Mutation::ChildList { target: id });
            return;
        }
        let detached = std::mem::take(&mut node.children);
        for child in detached {
            if let Some(c) = self.nodes.get_mut(child.0 as usize) {
                c.parent = None;
            }
        }
        if text.is_empty() {
            self.mutations.push(Mutation::ChildList { target: id });
        } else {
            self.append_text(id, text);
        }
    }

    pub fn query_selector_all(&self, selectors: &str) -> Result<Vec<Id>, SelectorError> {
        self.query_selector_all_within(self.root(), selectors)
    }

    /// Matching elements strictly below `scope`, in document order.
    pub fn query_selector_all_within(&self, scope: Id, selectors: &str) -> Result<Vec<Id>, SelectorError> {
        let list = parse_selector_list(selectors)?;
        Ok(self.select(scope, &list))
    }

    pub fn select(&self, scope: Id, list: &SelectorList) -> Vec<Id> {
        let mut out = Vec::new();
        let mut stack: Vec<Id> = self
            .node(scope)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if node.is_element() && list.matches(self, id) {
                out.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    fn title_element(&self) -> Option<Id> {
        self.query_selector_all_within(self.head, "title")
            .ok()?
            .into_iter()
            .next()
    }

    pub fn title(&self) -> String {
        self.title_element()
            .map(|id| self.text_content(id))
            .unwrap_or_default()
    }

    pub fn set_title(&mut self, title: &str) {
        let id = match self.title_element() {
            Some(id) => id,
            None => self.append_element(self.head, "title", &[]),
        };
        self.set_text_content(id, title);
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }
}
