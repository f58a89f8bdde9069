pub type NodeId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub NodeId);

#[derive(Clone, Debug)]
pub enum NodeKind {
    Document,
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
    },
    Text {
        text: String,
    },
}

/// Arena slot. Detached nodes keep their slot with `parent == None` so
/// stale handles never alias a newer node.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: Id,
    pub parent: Option<Id>,
    pub kind: NodeKind,
    pub children: Vec<Id>,
}

impl Node {
    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    pub fn element_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &[(String, Option<String>)] {
        match &self.kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }
}

/// A change recorded by the document, in the spirit of a mutation record:
/// observers decide relevance by checking whether `target` lies inside the
/// subtree they watch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    ChildList { target: Id },
    Attribute { target: Id, name: String },
}

impl Mutation {
    pub fn target(&self) -> Id {
        match self {
            Mutation::ChildList { target } => *target,
            Mutation::Attribute { target, .. } => *target,
        }
    }
}
