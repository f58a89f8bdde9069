use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use crate::{Document, Id};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected {found:?} at byte {at}")]
    Unexpected { found: char, at: usize },
    #[error("unexpected end of selector")]
    UnexpectedEnd,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Type(String),
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compound(pub Vec<SimpleSelector>);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// `compounds[i]` and `compounds[i + 1]` are joined by `combinators[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    pub compounds: Vec<Compound>,
    pub combinators: Vec<Combinator>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

fn get_attribute<'a>(attributes: &'a [(String, Option<String>)], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_deref().unwrap_or(""))
}

fn matches_simple(name: &str, attributes: &[(String, Option<String>)], selector: &SimpleSelector) -> bool {
    match selector {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(t) => name.eq_ignore_ascii_case(t),
        SimpleSelector::Id(want) => get_attribute(attributes, "id") == Some(want.as_str()),
        SimpleSelector::Class(want) => get_attribute(attributes, "class")
            .map(|list| list.split_whitespace().any(|c| c == want))
            .unwrap_or(false),
        SimpleSelector::Attribute { name: key, value } => match (get_attribute(attributes, key), value) {
            (Some(_), None) => true,
            (Some(have), Some(want)) => have == want,
            (None, _) => false,
        },
    }
}

impl Compound {
    fn matches(&self, doc: &Document, id: Id) -> bool {
        let Some(node) = doc.node(id) else {
            return false;
        };
        let Some(name) = node.element_name() else {
            return false;
        };
        self.0
            .iter()
            .all(|s| matches_simple(name, node.attributes(), s))
    }
}

impl ComplexSelector {
    pub fn matches(&self, doc: &Document, id: Id) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.match_at(n - 1, doc, id),
        }
    }

    // Right-to-left, backtracking over ancestors for descendant combinators.
    fn match_at(&self, index: usize, doc: &Document, id: Id) -> bool {
        if !self.compounds[index].matches(doc, id) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => doc
                .parent_element(id)
                .is_some_and(|parent| self.match_at(index - 1, doc, parent)),
            Combinator::Descendant => {
                let mut cursor = doc.parent_element(id);
                while let Some(ancestor) = cursor {
                    if self.match_at(index - 1, doc, ancestor) {
                        return true;
                    }
                    cursor = doc.parent_element(ancestor);
                }
                false
            }
        }
    }
}

impl SelectorList {
    pub fn matches(&self, doc: &Document, id: Id) -> bool {
        self.0.iter().any(|complex| complex.matches(doc, id))
    }
}

pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    let mut parser = Parser {
        chars: input.char_indices().peekable(),
    };
    let mut list = Vec::new();
    loop {
        parser.skip_whitespace();
        if parser.peek().is_none() {
            return Err(if list.is_empty() {
                SelectorError::Empty
            } else {
                SelectorError::UnexpectedEnd
            });
        }
        list.push(parser.complex()?);
        match parser.next() {
            None => break,
            Some((_, ',')) => continue,
            Some((at, found)) => return Err(SelectorError::Unexpected { found, at }),
        }
    }
    Ok(SelectorList(list))
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

impl Parser<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn next(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(char::is_whitespace) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn unexpected(&mut self) -> SelectorError {
        match self.chars.peek() {
            Some(&(at, found)) => SelectorError::Unexpected { found, at },
            None => SelectorError::UnexpectedEnd,
        }
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.chars.next();
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_space => combinators.push(Combinator::Descendant),
                Some(_) => return Err(self.unexpected()),
            }
            compounds.push(self.compound()?);
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut parts = Vec::new();
        match self.peek() {
            Some('*') => {
                self.chars.next();
                parts.push(SimpleSelector::Universal);
            }
            Some(c) if is_ident_char(c) => {
                parts.push(SimpleSelector::Type(self.ident()?.to_ascii_lowercase()));
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.chars.next();
                    parts.push(SimpleSelector::Id(self.ident()?));
                }
                Some('.') => {
                    self.chars.next();
                    parts.push(SimpleSelector::Class(self.ident()?));
                }
                Some('[') => {
                    self.chars.next();
                    parts.push(self.attribute()?);
                }
                _ => break,
            }
        }
        if parts.is_empty() {
            return Err(self.unexpected());
        }
        Ok(Compound(parts))
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|&c| is_ident_char(c)) {
            out.push(c);
            self.chars.next();
        }
        if out.is_empty() {
            return Err(self.unexpected());
        }
        Ok(out)
    }

    fn attribute(&mut self) -> Result<SimpleSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let value = match self.peek() {
            Some('=') => {
                self.chars.next();
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.chars.next();
                        let mut value = String::new();
                        loop {
                            match self.next() {
                                Some((_, c)) if c == quote => break,
                                Some((_, c)) => value.push(c),
                                None => return Err(SelectorError::UnexpectedEnd),
                            }
                        }
                        value
                    }
                    _ => self.ident()?,
                };
                self.skip_whitespace();
                Some(value)
            }
            _ => None,
        };
        match self.next() {
            Some((_, ']')) => Ok(SimpleSelector::Attribute { name, value }),
            Some((at, found)) => Err(SelectorError::Unexpected { found, at }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }
}
