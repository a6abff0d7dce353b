//! Checks on images: alternate text for meaningful figures, artifact
//! marking for decorative graphics.

use crate::error::Result;
use crate::model::structure::Role;
use crate::model::{DocumentModel, SpanKind};
use crate::report::{EvidenceItem, Verdict};
use crate::techniques::{Facet, Technique};

/// Figure elements must carry alternate text.
pub struct FigureAltText;

impl Technique for FigureAltText {
    fn id(&self) -> &'static str {
        "WCAG.PDF.01"
    }

    fn description(&self) -> &'static str {
        "Figures have alternate or replacement text"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Graphics, Facet::Structure]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        let figures: Vec<_> = model
            .structure
            .nodes()
            .into_iter()
            .filter(|n| matches!(n.role, Role::Figure | Role::Formula))
            .collect();
        if figures.is_empty() {
            return Ok(Verdict::not_applicable("document has no figures"));
        }

        let mut items = Vec::new();
        for figure in &figures {
            if figure.alternate_text().is_none() {
                let detail = format!("{} without /Alt or /ActualText", figure.role.tag_name());
                items.push(match figure.page {
                    Some(p) => EvidenceItem::on_page(p, detail),
                    None => EvidenceItem::document(detail),
                });
            }
        }

        if items.is_empty() {
            Ok(Verdict::pass(format!(
                "all {} figure(s) have alternate text",
                figures.len()
            )))
        } else {
            Ok(Verdict::fail_with(
                format!(
                    "{} of {} figure(s) without alternate text",
                    items.len(),
                    figures.len()
                ),
                items,
            ))
        }
    }
}

/// Every painted image must be reachable through the structure tree or
/// be explicitly marked as an artifact.
pub struct ArtifactImages;

impl Technique for ArtifactImages {
    fn id(&self) -> &'static str {
        "WCAG.PDF.04"
    }

    fn description(&self) -> &'static str {
        "Decorative images are marked as artifacts"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Graphics]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        let total: usize = model.pages.iter().map(|p| p.content.image_count).sum();
        if total == 0 {
            return Ok(Verdict::not_applicable("document paints no images"));
        }

        let mut items = Vec::new();
        for page in &model.pages {
            let tagged = page
                .content
                .spans
                .iter()
                .filter(|s| s.kind == SpanKind::Image)
                .count();
            let artifact: usize = page
                .content
                .artifacts
                .iter()
                .filter(|a| a.well_formed)
                .map(|a| a.image_count)
                .sum();
            let malformed: usize = page
                .content
                .artifacts
                .iter()
                .filter(|a| !a.well_formed)
                .map(|a| a.image_count)
                .sum();
            let stray = page.content.image_count.saturating_sub(tagged + artifact + malformed);
            if stray > 0 {
                items.push(EvidenceItem::on_page(
                    page.index,
                    format!("{} image(s) neither tagged nor marked as artifact", stray),
                ));
            }
            if malformed > 0 {
                items.push(EvidenceItem::on_page(
                    page.index,
                    format!("{} image(s) inside malformed artifact markings", malformed),
                ));
            }
        }

        if items.is_empty() {
            Ok(Verdict::pass(format!(
                "all {} image(s) are tagged or marked as artifacts",
                total
            )))
        } else {
            Ok(Verdict::fail_with(
                "images outside the structure tree are not marked as artifacts",
                items,
            ))
        }
    }
}
