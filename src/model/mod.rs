//! The semantic document model.
//!
//! Built once per input file from the object graph, immutable afterwards,
//! and shared read-only across technique evaluations. Everything here is
//! plain owned data (`Send + Sync`); nothing holds a handle back into the
//! object graph.

mod builder;
pub mod content;
pub mod metadata;
pub mod structure;

pub use builder::ModelBuilder;
pub use content::{ArtifactSpan, MarkedContentSpan, PageContent, SpanKind};
pub use metadata::Metadata;
pub use structure::{Role, StructureChild, StructureNode, StructureTree};

use bitflags::bitflags;
use lopdf::ObjectId;

/// The queryable in-memory model of one PDF document.
#[derive(Debug, Clone, Default)]
pub struct DocumentModel {
    /// Pages in document order; page index is 0-based and contiguous.
    pub pages: Vec<Page>,
    /// Merged metadata (info dictionary, XMP, catalog entries).
    pub metadata: Metadata,
    /// Tagged structure tree; empty when the document is untagged.
    pub structure: StructureTree,
    /// All annotations, across pages.
    pub annotations: Vec<Annotation>,
    /// Leaf form fields of the interactive form, if any.
    pub form_fields: Vec<FormField>,
    /// Whether the catalog carries an /AcroForm at all.
    pub has_form: bool,
    /// Fonts referenced by page resources.
    pub fonts: Vec<FontInfo>,
    /// Page label number tree, if declared.
    pub page_labels: Option<PageLabels>,
    /// Number of top-level outline (bookmark) items.
    pub bookmark_count: usize,
    /// Recoverable anomalies encountered during model construction.
    pub warnings: Vec<BuilderWarning>,
}

impl DocumentModel {
    /// External link annotations (URI actions).
    pub fn external_links(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(|a| a.uri.is_some())
    }

    /// Whether `annotation` is reachable from the structure tree, either
    /// through a /StructParent back-pointer or an OBJR entry.
    pub fn is_annotation_tagged(&self, annotation: &Annotation) -> bool {
        if annotation.struct_parent.is_some() {
            return true;
        }
        annotation
            .id
            .map(|id| self.structure.referenced_annotations.contains(&id))
            .unwrap_or(false)
    }
}

/// One page of the document.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// 0-based position in the document.
    pub index: usize,
    /// Scanned content-stream facts (marked content, artifacts, text).
    pub content: PageContent,
    /// Names of fonts selected by this page's resources.
    pub font_names: Vec<String>,
    /// Whether /Tabs selects structure order for this page.
    pub tabs_structure_order: bool,
}

impl Page {
    /// Content items in approximate visual order: top-to-bottom, then
    /// left-to-right within a line band.
    pub fn visual_order(&self) -> Vec<u32> {
        let mut spans: Vec<&MarkedContentSpan> = self.content.spans.iter().collect();
        // Band tolerance absorbs baseline jitter within a line.
        const BAND: f32 = 3.0;
        spans.sort_by(|a, b| {
            let dy = b.y - a.y;
            if dy.abs() > BAND {
                // Higher y first (PDF user space grows upward).
                b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal)
            } else {
                a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
            }
        });
        spans.iter().map(|s| s.mcid).collect()
    }
}

/// A non-content marking on a page.
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Object id, when the annotation is an indirect object.
    pub id: Option<ObjectId>,
    /// Owning page index.
    pub page: usize,
    /// Annotation subtype (Link, Widget, ...).
    pub subtype: String,
    /// Bounding rectangle, when declared.
    pub rect: Option<[f32; 4]>,
    /// /Contents text.
    pub contents: Option<String>,
    /// /Alt replacement text (some producers attach it to link
    /// annotations directly).
    pub alt: Option<String>,
    /// Target of a URI action, when this is an external link.
    pub uri: Option<String>,
    /// /StructParent key into the structure parent tree.
    pub struct_parent: Option<i64>,
}

impl Annotation {
    /// Non-empty accessible text for this annotation.
    pub fn accessible_text(&self) -> Option<&str> {
        self.contents
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.alt.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

bitflags! {
    /// Form field flags (/Ff), ISO 32000-1 Table 221/226/228.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldFlags: u32 {
        /// Field is read-only.
        const READ_ONLY = 1;
        /// Field is required.
        const REQUIRED = 1 << 1;
        /// Field is not exported.
        const NO_EXPORT = 1 << 2;
        /// Button field is a set of radio buttons.
        const RADIO = 1 << 15;
        /// Button field is a push button.
        const PUSH_BUTTON = 1 << 16;
        /// Choice field is a combo box.
        const COMBO = 1 << 17;
    }
}

/// Form field type (/FT).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Text input.
    Text,
    /// Button (push button, checkbox, radio).
    Button,
    /// Choice (list or combo box).
    Choice,
    /// Digital signature.
    Signature,
    /// A type outside the standard set.
    Unknown(String),
}

impl FieldType {
    /// Parse an /FT name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Tx" => Self::Text,
            "Btn" => Self::Button,
            "Ch" => Self::Choice,
            "Sig" => Self::Signature,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Action attached to a form field (/A).
#[derive(Debug, Clone)]
pub struct FieldAction {
    /// Action type (/S), e.g. "SubmitForm" or "JavaScript".
    pub kind: String,
    /// Whether a /JS entry is present (for JavaScript actions).
    pub has_js: bool,
}

/// A leaf field of the interactive form.
#[derive(Debug, Clone)]
pub struct FormField {
    /// Partial field name (/T).
    pub name: Option<String>,
    /// Tooltip / accessible name (/TU).
    pub tooltip: Option<String>,
    /// Field type, when declared.
    pub field_type: Option<FieldType>,
    /// Field flags.
    pub flags: FieldFlags,
    /// Whether the field carries a value, default value or options
    /// (/V, /DV or /Opt).
    pub has_value: bool,
    /// Attached action, if any.
    pub action: Option<FieldAction>,
}

impl FormField {
    /// Whether this field is a push button.
    pub fn is_push_button(&self) -> bool {
        self.field_type == Some(FieldType::Button) && self.flags.contains(FieldFlags::PUSH_BUTTON)
    }

    /// The label accessibility software can announce: /TU preferred,
    /// /T tolerated (common in the wild).
    pub fn label(&self) -> Option<&str> {
        self.tooltip
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.name.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

/// A font referenced from page resources.
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// Base font name.
    pub name: String,
    /// Font subtype (Type1, TrueType, Type0, ...).
    pub subtype: Option<String>,
    /// Whether a font program is embedded.
    pub embedded: bool,
}

/// Page label number tree (/PageLabels).
#[derive(Debug, Clone, Default)]
pub struct PageLabels {
    /// (start page index, label) pairs as declared in /Nums.
    pub entries: Vec<(i64, PageLabel)>,
    /// Whether the /Nums array itself was malformed (odd length,
    /// non-integer keys).
    pub malformed: bool,
}

/// One page label range entry.
#[derive(Debug, Clone, Default)]
pub struct PageLabel {
    /// Numbering style (/S): D, r, R, A or a.
    pub style: Option<String>,
    /// Label prefix (/P).
    pub prefix: Option<String>,
    /// Value of the numeric portion for the first page of the range
    /// (/St).
    pub start: Option<i64>,
}

/// A recoverable structural anomaly found while building the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderWarning {
    /// Human-readable description.
    pub message: String,
    /// Where in the document it happened, when known.
    pub context: Option<String>,
}

impl BuilderWarning {
    /// Create a warning.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
        }
    }

    /// Attach a location.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl std::fmt::Display for BuilderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref ctx) = self.context {
            write!(f, " (at {})", ctx)?;
        }
        Ok(())
    }
}
