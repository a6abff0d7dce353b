//! Document-level checks: title, language, navigation aids and scanned
//! content detection.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Result;
use crate::model::DocumentModel;
use crate::report::{EvidenceItem, Verdict};
use crate::techniques::{Facet, Technique};

lazy_static! {
    /// Primary-subtag shape of a BCP 47 language tag.
    static ref LANG_TAG_RE: Regex =
        Regex::new(r"^[a-zA-Z]{2,3}(-[a-zA-Z0-9]{1,8})*$").unwrap();
}

/// The document must declare a title and ask viewers to display it.
pub struct DocumentTitle;

impl Technique for DocumentTitle {
    fn id(&self) -> &'static str {
        "WCAG.PDF.18"
    }

    fn description(&self) -> &'static str {
        "Document declares a title and displays it instead of the file name"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Metadata]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        let title = match model.metadata.title() {
            Some(t) => t,
            None => return Ok(Verdict::fail("document has no title")),
        };
        if !model.metadata.display_doc_title {
            return Ok(Verdict::fail_with(
                "title is set but viewers are not asked to display it",
                vec![EvidenceItem::document(
                    "/ViewerPreferences /DisplayDocTitle is not true",
                )],
            ));
        }
        Ok(Verdict::pass(format!("document title: {:?}", title)))
    }
}

/// The document must declare its primary natural language.
pub struct DocumentLanguage;

impl Technique for DocumentLanguage {
    fn id(&self) -> &'static str {
        "WCAG.PDF.16"
    }

    fn description(&self) -> &'static str {
        "Document declares its primary natural language"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Metadata]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        let lang = match model.metadata.language() {
            Some(l) => l,
            None => {
                // Per-element overrides can cover the text when the
                // document default is missing.
                if model.structure.has_language_override() {
                    return Ok(Verdict::pass(
                        "language declared on structure elements",
                    ));
                }
                return Ok(Verdict::fail("no document language declared"));
            }
        };
        if !LANG_TAG_RE.is_match(lang) {
            return Ok(Verdict::fail_with(
                format!("declared language {:?} is not a valid language tag", lang),
                vec![EvidenceItem::document(format!("/Lang value {:?}", lang))],
            ));
        }
        Ok(Verdict::pass(format!("document language: {}", lang)))
    }
}

/// Multi-page documents should offer bookmarks.
pub struct Bookmarks;

impl Technique for Bookmarks {
    fn id(&self) -> &'static str {
        "WCAG.PDF.02"
    }

    fn description(&self) -> &'static str {
        "Multi-page document provides bookmarks"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Navigation]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        if model.pages.len() <= 1 {
            return Ok(Verdict::not_applicable("single-page document"));
        }
        if model.bookmark_count == 0 {
            return Ok(Verdict::fail(format!(
                "{} pages without any bookmarks",
                model.pages.len()
            )));
        }
        Ok(Verdict::pass(format!(
            "{} bookmark(s) for {} pages",
            model.bookmark_count,
            model.pages.len()
        )))
    }
}

/// Declared page labels must be usable: a range starting at the first
/// page and recognized numbering styles.
pub struct PageLabelFormat;

const LABEL_STYLES: &[&str] = &["D", "r", "R", "A", "a"];

impl Technique for PageLabelFormat {
    fn id(&self) -> &'static str {
        "WCAG.PDF.17"
    }

    fn description(&self) -> &'static str {
        "Page labels are well-formed"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Navigation]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        let labels = match &model.page_labels {
            Some(l) => l,
            None => return Ok(Verdict::not_applicable("no page labels declared")),
        };

        let mut items = Vec::new();
        if labels.malformed {
            items.push(EvidenceItem::document("/PageLabels number tree is malformed"));
        }
        if !labels.entries.iter().any(|(start, _)| *start == 0) {
            items.push(EvidenceItem::document(
                "no label range starts at the first page",
            ));
        }
        let mut previous: Option<i64> = None;
        for (start, label) in &labels.entries {
            if let Some(prev) = previous {
                if *start <= prev {
                    items.push(EvidenceItem::document(format!(
                        "label range keys not strictly increasing at {}",
                        start
                    )));
                }
            }
            previous = Some(*start);

            let has_style = label
                .style
                .as_deref()
                .map(|s| LABEL_STYLES.contains(&s))
                .unwrap_or(false);
            let has_prefix = label
                .prefix
                .as_deref()
                .is_some_and(|p| !p.trim().is_empty());
            if !has_style && !has_prefix {
                items.push(EvidenceItem::document(format!(
                    "label range at page {} has neither numbering style nor prefix",
                    start + 1
                )));
            } else if let Some(style) = label.style.as_deref() {
                if !LABEL_STYLES.contains(&style) {
                    items.push(EvidenceItem::document(format!(
                        "unknown numbering style {:?} at page {}",
                        style,
                        start + 1
                    )));
                }
            }
        }

        if items.is_empty() {
            Ok(Verdict::pass(format!(
                "{} well-formed label range(s)",
                labels.entries.len()
            )))
        } else {
            Ok(Verdict::fail_with("page labels are not usable", items))
        }
    }
}

/// A document whose pages are only images, with no text, is a scan
/// without an accessible text layer.
pub struct ScannedDocument;

impl Technique for ScannedDocument {
    fn id(&self) -> &'static str {
        "EGOVMON.PDF.08"
    }

    fn description(&self) -> &'static str {
        "Document is not an image-only scan"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Graphics]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        if model.pages.is_empty() {
            return Ok(Verdict::not_applicable("document has no pages"));
        }
        let image_only = model
            .pages
            .iter()
            .all(|p| !p.content.has_text && p.content.image_count > 0);
        if image_only {
            return Ok(Verdict::fail(format!(
                "all {} page(s) are images without a text layer",
                model.pages.len()
            )));
        }
        Ok(Verdict::pass("document has a text layer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, PageLabel, PageLabels};
    use crate::report::Status;

    #[test]
    fn test_missing_title_fails() {
        let model = DocumentModel::default();
        let verdict = DocumentTitle.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Fail);
    }

    #[test]
    fn test_title_without_display_preference_fails() {
        let mut model = DocumentModel::default();
        model.metadata.title = Some("Report".into());
        let verdict = DocumentTitle.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Fail);
        assert!(verdict.items[0].detail.contains("DisplayDocTitle"));
    }

    #[test]
    fn test_title_with_display_preference_passes() {
        let mut model = DocumentModel::default();
        model.metadata.title = Some("Report".into());
        model.metadata.display_doc_title = true;
        let verdict = DocumentTitle.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Pass);
    }

    #[test]
    fn test_language_tag_validation() {
        let mut model = DocumentModel::default();
        assert_eq!(
            DocumentLanguage.evaluate(&model).unwrap().status,
            Status::Fail
        );
        model.metadata.language = Some("nb-NO".into());
        assert_eq!(
            DocumentLanguage.evaluate(&model).unwrap().status,
            Status::Pass
        );
        model.metadata.language = Some("not a language".into());
        assert_eq!(
            DocumentLanguage.evaluate(&model).unwrap().status,
            Status::Fail
        );
    }

    #[test]
    fn test_structure_language_override_accepted() {
        use crate::model::structure::{Role, StructureNode};
        let mut node = StructureNode::new(Role::P);
        node.lang = Some("en".into());
        let mut model = DocumentModel::default();
        model.structure.roots = vec![node];
        let verdict = DocumentLanguage.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Pass);
    }

    #[test]
    fn test_bookmarks_single_page_not_applicable() {
        let mut model = DocumentModel::default();
        model.pages = vec![Page::default()];
        let verdict = Bookmarks.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::NotApplicable);
    }

    #[test]
    fn test_bookmarks_required_for_multi_page() {
        let mut model = DocumentModel::default();
        model.pages = vec![Page::default(), Page::default()];
        assert_eq!(Bookmarks.evaluate(&model).unwrap().status, Status::Fail);
        model.bookmark_count = 4;
        assert_eq!(Bookmarks.evaluate(&model).unwrap().status, Status::Pass);
    }

    fn labels(entries: Vec<(i64, PageLabel)>) -> DocumentModel {
        let mut model = DocumentModel::default();
        model.page_labels = Some(PageLabels {
            entries,
            malformed: false,
        });
        model
    }

    #[test]
    fn test_page_labels_absent_is_not_applicable() {
        let model = DocumentModel::default();
        let verdict = PageLabelFormat.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::NotApplicable);
    }

    #[test]
    fn test_page_labels_well_formed_pass() {
        let model = labels(vec![
            (
                0,
                PageLabel {
                    style: Some("r".into()),
                    prefix: None,
                    start: None,
                },
            ),
            (
                4,
                PageLabel {
                    style: Some("D".into()),
                    prefix: None,
                    start: Some(1),
                },
            ),
        ]);
        let verdict = PageLabelFormat.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Pass);
    }

    #[test]
    fn test_page_labels_missing_first_range_fails() {
        let model = labels(vec![(
            2,
            PageLabel {
                style: Some("D".into()),
                prefix: None,
                start: None,
            },
        )]);
        let verdict = PageLabelFormat.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Fail);
        assert!(verdict.items[0].detail.contains("first page"));
    }

    #[test]
    fn test_page_labels_unknown_style_fails() {
        let model = labels(vec![(
            0,
            PageLabel {
                style: Some("X".into()),
                prefix: None,
                start: None,
            },
        )]);
        let verdict = PageLabelFormat.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Fail);
    }

    #[test]
    fn test_page_labels_prefix_only_is_fine() {
        let model = labels(vec![(
            0,
            PageLabel {
                style: None,
                prefix: Some("Cover ".into()),
                start: None,
            },
        )]);
        let verdict = PageLabelFormat.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Pass);
    }

    fn page(has_text: bool, image_count: usize) -> Page {
        let mut page = Page::default();
        page.content.has_text = has_text;
        page.content.image_count = image_count;
        page
    }

    #[test]
    fn test_scanned_document_detected() {
        let mut model = DocumentModel::default();
        model.pages = vec![page(false, 1), page(false, 1)];
        let verdict = ScannedDocument.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Fail);
    }

    #[test]
    fn test_text_layer_passes() {
        let mut model = DocumentModel::default();
        model.pages = vec![page(false, 1), page(true, 1)];
        let verdict = ScannedDocument.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Pass);
    }

    #[test]
    fn test_no_pages_is_not_applicable() {
        let model = DocumentModel::default();
        let verdict = ScannedDocument.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::NotApplicable);
    }
}
