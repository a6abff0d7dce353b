//! External link checks.

use crate::error::Result;
use crate::model::DocumentModel;
use crate::report::{EvidenceItem, Verdict};
use crate::techniques::{Facet, Technique};

/// External links must be reachable through the structure tree and carry
/// descriptive text.
pub struct LinkText;

impl Technique for LinkText {
    fn id(&self) -> &'static str {
        "WCAG.PDF.SC244"
    }

    fn description(&self) -> &'static str {
        "External links are tagged and have descriptive text"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Links, Facet::Structure]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        let links: Vec<_> = model.external_links().collect();
        if links.is_empty() {
            return Ok(Verdict::not_applicable("document has no external links"));
        }
        if model.structure.is_empty() {
            return Ok(Verdict::fail(format!(
                "{} external link(s) in an untagged document",
                links.len()
            )));
        }

        let mut items = Vec::new();
        for link in &links {
            let target = link.uri.as_deref().unwrap_or("?");
            if !model.is_annotation_tagged(link) {
                items.push(EvidenceItem::on_page(
                    link.page,
                    format!("link to {} not reachable from the structure tree", target),
                ));
            } else if link.accessible_text().is_none() {
                items.push(EvidenceItem::on_page(
                    link.page,
                    format!("link to {} without /Contents or /Alt text", target),
                ));
            }
        }

        if items.is_empty() {
            Ok(Verdict::pass(format!(
                "all {} external link(s) are tagged and described",
                links.len()
            )))
        } else {
            Ok(Verdict::fail_with(
                format!(
                    "{} of {} external link(s) with problems",
                    items.len(),
                    links.len()
                ),
                items,
            ))
        }
    }
}
