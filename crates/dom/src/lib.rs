mod document;
mod selector;
mod types;

pub use crate::document::Document;
pub use crate::selector::{
    Combinator, ComplexSelector, Compound, SelectorError, SelectorList, SimpleSelector,
    parse_selector_list,
};
pub use crate::types::{Id, Mutation, Node, NodeId, NodeKind};
