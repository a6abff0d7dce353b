//! Types for the tagged logical structure tree.
//!
//! Structure element roles follow the standard structure types of ISO
//! 32000-1:2008 Section 14.8.4; custom roles are resolved through the
//! document's RoleMap before falling back to [`Role::Custom`].

use std::collections::HashSet;

use lopdf::ObjectId;

/// The tagged structure tree of a document.
///
/// An untagged document yields an empty tree, never a missing one: most
/// techniques then report Fail ("untagged document" is itself a common
/// violation) rather than NotApplicable.
#[derive(Debug, Clone, Default)]
pub struct StructureTree {
    /// Root structure elements, in document order.
    pub roots: Vec<StructureNode>,
    /// RoleMap entries (custom tag name to mapped tag name).
    pub role_map: std::collections::HashMap<String, String>,
    /// Annotation objects referenced from the tree via OBJR entries.
    /// Used to decide whether an annotation is tagged.
    pub referenced_annotations: HashSet<ObjectId>,
}

impl StructureTree {
    /// True when the document carries no usable structure tree.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// All structure nodes in depth-first (reading) order.
    pub fn nodes(&self) -> Vec<&StructureNode> {
        let mut out = Vec::new();
        for root in &self.roots {
            collect(root, &mut out);
        }
        out
    }

    /// Marked-content identifiers claimed by the tree for `page`, in
    /// depth-first traversal order. This is the declared reading order of
    /// that page's content items.
    pub fn content_order(&self, page: usize) -> Vec<u32> {
        let mut out = Vec::new();
        for root in &self.roots {
            content_order(root, page, &mut out);
        }
        out
    }

    /// Whether any node overrides the document language.
    pub fn has_language_override(&self) -> bool {
        self.nodes()
            .iter()
            .any(|n| n.lang.as_deref().is_some_and(|l| !l.is_empty()))
    }
}

fn collect<'a>(node: &'a StructureNode, out: &mut Vec<&'a StructureNode>) {
    out.push(node);
    for child in &node.children {
        if let StructureChild::Node(n) = child {
            collect(n, out);
        }
    }
}

fn content_order(node: &StructureNode, page: usize, out: &mut Vec<u32>) {
    for child in &node.children {
        match child {
            StructureChild::Node(n) => content_order(n, page, out),
            StructureChild::ContentItem { page: p, mcid } => {
                if *p == Some(page) {
                    out.push(*mcid);
                }
            }
            StructureChild::AnnotationRef(_) => {}
        }
    }
}

/// One element of the structure tree.
#[derive(Debug, Clone)]
pub struct StructureNode {
    /// Resolved role (after RoleMap mapping).
    pub role: Role,
    /// Tag name as written in the document, before mapping.
    pub raw_role: String,
    /// Children in document order.
    pub children: Vec<StructureChild>,
    /// Page this element appears on, when declared via /Pg.
    pub page: Option<usize>,
    /// Alternate text (/Alt).
    pub alt: Option<String>,
    /// Replacement text (/ActualText).
    pub actual_text: Option<String>,
    /// Language override (/Lang).
    pub lang: Option<String>,
    /// Table cell scope attribute (/Scope from a /Table attribute owner).
    pub scope: Option<String>,
    /// Table cell header associations (/Headers attribute).
    pub headers: Vec<String>,
}

impl StructureNode {
    /// Create a node with the given role and no children.
    pub fn new(role: Role) -> Self {
        let raw_role = role.tag_name().to_string();
        Self {
            role,
            raw_role,
            children: Vec::new(),
            page: None,
            alt: None,
            actual_text: None,
            lang: None,
            scope: None,
            headers: Vec::new(),
        }
    }

    /// Child nodes only (content items filtered out).
    pub fn child_nodes(&self) -> impl Iterator<Item = &StructureNode> {
        self.children.iter().filter_map(|c| match c {
            StructureChild::Node(n) => Some(n.as_ref()),
            _ => None,
        })
    }

    /// All descendant nodes including self, depth-first.
    pub fn descendants(&self) -> Vec<&StructureNode> {
        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }

    /// Non-empty alternate text, if any ( /Alt preferred, /ActualText
    /// accepted as a textual replacement).
    pub fn alternate_text(&self) -> Option<&str> {
        self.alt
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.actual_text.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

/// Child of a structure element.
#[derive(Debug, Clone)]
pub enum StructureChild {
    /// A nested structure element.
    Node(Box<StructureNode>),
    /// A marked-content item inside a page content stream.
    ContentItem {
        /// Owning page index (0-based), when known.
        page: Option<usize>,
        /// Marked content identifier.
        mcid: u32,
    },
    /// An object reference (OBJR), typically to an annotation.
    AnnotationRef(ObjectId),
}

/// Standard structure roles, plus a fallback for unmapped custom tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Document root.
    Document,
    /// Part (major division).
    Part,
    /// Article.
    Art,
    /// Section.
    Sect,
    /// Division.
    Div,
    /// Paragraph.
    P,
    /// Generic heading.
    H,
    /// Heading level 1.
    H1,
    /// Heading level 2.
    H2,
    /// Heading level 3.
    H3,
    /// Heading level 4.
    H4,
    /// Heading level 5.
    H5,
    /// Heading level 6.
    H6,
    /// List.
    L,
    /// List item.
    LI,
    /// List item label.
    Lbl,
    /// List item body.
    LBody,
    /// Table.
    Table,
    /// Table row.
    TR,
    /// Table header cell.
    TH,
    /// Table data cell.
    TD,
    /// Table header row group.
    THead,
    /// Table body row group.
    TBody,
    /// Table footer row group.
    TFoot,
    /// Inline span.
    Span,
    /// Quotation.
    Quote,
    /// Note (footnote/endnote).
    Note,
    /// Reference to other content.
    Reference,
    /// Bibliography entry.
    BibEntry,
    /// Code fragment.
    Code,
    /// Link.
    Link,
    /// Annotation association.
    Annot,
    /// Figure (illustration).
    Figure,
    /// Formula.
    Formula,
    /// Interactive form element.
    Form,
    /// A tag with no standard mapping.
    Custom(String),
}

impl Role {
    /// Parse a tag name into a role.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Document" => Self::Document,
            "Part" => Self::Part,
            "Art" => Self::Art,
            "Sect" => Self::Sect,
            "Div" => Self::Div,
            "P" => Self::P,
            "H" => Self::H,
            "H1" => Self::H1,
            "H2" => Self::H2,
            "H3" => Self::H3,
            "H4" => Self::H4,
            "H5" => Self::H5,
            "H6" => Self::H6,
            "L" => Self::L,
            "LI" => Self::LI,
            "Lbl" => Self::Lbl,
            "LBody" => Self::LBody,
            "Table" => Self::Table,
            "TR" => Self::TR,
            "TH" => Self::TH,
            "TD" => Self::TD,
            "THead" => Self::THead,
            "TBody" => Self::TBody,
            "TFoot" => Self::TFoot,
            "Span" => Self::Span,
            "Quote" => Self::Quote,
            "Note" => Self::Note,
            "Reference" => Self::Reference,
            "BibEntry" => Self::BibEntry,
            "Code" => Self::Code,
            "Link" => Self::Link,
            "Annot" => Self::Annot,
            "Figure" => Self::Figure,
            "Formula" => Self::Formula,
            "Form" => Self::Form,
            other => Self::Custom(other.to_string()),
        }
    }

    /// The standard tag name for this role.
    pub fn tag_name(&self) -> &str {
        match self {
            Self::Document => "Document",
            Self::Part => "Part",
            Self::Art => "Art",
            Self::Sect => "Sect",
            Self::Div => "Div",
            Self::P => "P",
            Self::H => "H",
            Self::H1 => "H1",
            Self::H2 => "H2",
            Self::H3 => "H3",
            Self::H4 => "H4",
            Self::H5 => "H5",
            Self::H6 => "H6",
            Self::L => "L",
            Self::LI => "LI",
            Self::Lbl => "Lbl",
            Self::LBody => "LBody",
            Self::Table => "Table",
            Self::TR => "TR",
            Self::TH => "TH",
            Self::TD => "TD",
            Self::THead => "THead",
            Self::TBody => "TBody",
            Self::TFoot => "TFoot",
            Self::Span => "Span",
            Self::Quote => "Quote",
            Self::Note => "Note",
            Self::Reference => "Reference",
            Self::BibEntry => "BibEntry",
            Self::Code => "Code",
            Self::Link => "Link",
            Self::Annot => "Annot",
            Self::Figure => "Figure",
            Self::Formula => "Formula",
            Self::Form => "Form",
            Self::Custom(name) => name,
        }
    }

    /// Heading level, if this is a heading role. The generic `H` tag is
    /// treated as level 1 for sequencing purposes.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Self::H | Self::H1 => Some(1),
            Self::H2 => Some(2),
            Self::H3 => Some(3),
            Self::H4 => Some(4),
            Self::H5 => Some(5),
            Self::H6 => Some(6),
            _ => None,
        }
    }

    /// Whether this role is a table cell.
    pub fn is_table_cell(&self) -> bool {
        matches!(self, Self::TH | Self::TD)
    }
}
