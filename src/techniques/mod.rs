//! Accessibility techniques and the technique registry.
//!
//! Each technique checks one requirement against the document model and
//! returns a [`Verdict`]. Techniques are read-only over the model and
//! independent of each other; the engine decides how to schedule them.

mod document;
mod figures;
mod forms;
mod links;
mod structure;
mod tables;

pub use document::{Bookmarks, DocumentLanguage, DocumentTitle, PageLabelFormat, ScannedDocument};
pub use figures::{ArtifactImages, FigureAltText};
pub use forms::{FieldLabels, SubmitControl};
pub use links::LinkText;
pub use structure::{HeadingOrder, ReadingOrder, TaggedStructure};
pub use tables::TableHeaders;

use crate::error::Result;
use crate::model::DocumentModel;
use crate::report::Verdict;

/// Document aspect a technique inspects. Purely descriptive, used for
/// report grouping and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    /// Tagged logical structure.
    Structure,
    /// Document-level metadata.
    Metadata,
    /// Navigation aids (bookmarks, page labels).
    Navigation,
    /// Images and other graphics.
    Graphics,
    /// Tables.
    Tables,
    /// Interactive forms.
    Forms,
    /// Link annotations.
    Links,
}

/// One accessibility check.
pub trait Technique: Send + Sync {
    /// Stable identifier, e.g. "WCAG.PDF.01".
    fn id(&self) -> &'static str;

    /// One-line description of what is checked.
    fn description(&self) -> &'static str;

    /// Aspects of the document this technique inspects.
    fn facets(&self) -> &'static [Facet];

    /// Evaluate the technique against a document model.
    ///
    /// Returns `Err` only for internal evaluation failures; a violation
    /// in the document is a `Fail` verdict, not an error.
    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict>;
}

/// The full technique catalog, in reporting order.
pub fn registry() -> Vec<Box<dyn Technique>> {
    vec![
        Box::new(TaggedStructure),
        Box::new(DocumentTitle),
        Box::new(DocumentLanguage),
        Box::new(FigureAltText),
        Box::new(ArtifactImages),
        Box::new(Bookmarks),
        Box::new(ReadingOrder::default()),
        Box::new(HeadingOrder),
        Box::new(TableHeaders),
        Box::new(FieldLabels),
        Box::new(SubmitControl),
        Box::new(LinkText),
        Box::new(PageLabelFormat),
        Box::new(ScannedDocument),
    ]
}
