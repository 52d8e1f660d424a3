//! Closed markdown AST built from pulldown-cmark's offset iterator

use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};

/// Node kinds the walker distinguishes; everything else is `Other`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Heading(u8),
    Paragraph,
    BlockQuote,
    UnorderedList,
    OrderedList,
    ListItem,
    Strong,
    Emphasis,
    InlineCode,
    Link { destination: String },
    Other,
}

/// An AST node with its byte range in the parsed text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// `None` means: don't style this node, but still visit its children
    pub range: Option<Range<usize>>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, range: Option<Range<usize>>) -> Self {
        Self {
            kind,
            range,
            children: Vec::new(),
        }
    }

    /// Depth-first pre-order iterator over this node and its descendants
    pub fn descendants(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn kind_for(tag: Tag<'_>) -> NodeKind {
    match tag {
        Tag::Heading { level, .. } => NodeKind::Heading(heading_level(level)),
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::BlockQuote(_) => NodeKind::BlockQuote,
        Tag::List(None) => NodeKind::UnorderedList,
        Tag::List(Some(_)) => NodeKind::OrderedList,
        Tag::Item => NodeKind::ListItem,
        Tag::Strong => NodeKind::Strong,
        Tag::Emphasis => NodeKind::Emphasis,
        Tag::Link { dest_url, .. } => NodeKind::Link {
            destination: dest_url.to_string(),
        },
        _ => NodeKind::Other,
    }
}

/// Parse markdown into a tree rooted at a `Document` node.
///
/// Never fails: malformed input yields whatever structure the parser
/// recognises, possibly just an empty document.
pub fn parse(text: &str) -> Node {
    let mut stack = vec![Node::new(NodeKind::Document, Some(0..text.len()))];

    for (event, range) in Parser::new_ext(text, options()).into_offset_iter() {
        match event {
            Event::Start(tag) => stack.push(Node::new(kind_for(tag), Some(range))),
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(node) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node);
                        }
                    }
                }
            }
            Event::Code(_) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .children
                        .push(Node::new(NodeKind::InlineCode, Some(range)));
                }
            }
            _ => {}
        }
    }

    // Fold anything left open back into the root
    while let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => return node,
        }
    }
    Node::new(NodeKind::Document, Some(0..text.len()))
}
