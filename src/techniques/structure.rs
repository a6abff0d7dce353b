//! Checks on the tagged logical structure: presence, reading order and
//! heading sequencing.

use crate::error::Result;
use crate::model::DocumentModel;
use crate::report::{EvidenceItem, Verdict};
use crate::techniques::{Facet, Technique};

/// The document must carry a tagged structure tree at all.
pub struct TaggedStructure;

impl Technique for TaggedStructure {
    fn id(&self) -> &'static str {
        "EGOVMON.PDF.03"
    }

    fn description(&self) -> &'static str {
        "Document content is tagged with a logical structure tree"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Structure]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        if model.structure.is_empty() {
            return Ok(Verdict::fail("document is not tagged"));
        }
        Ok(Verdict::pass(format!(
            "structure tree with {} elements",
            model.structure.nodes().len()
        )))
    }
}

/// Declared reading order must roughly agree with the visual layout.
pub struct ReadingOrder {
    /// Fraction of out-of-order content item pairs a page may have
    /// before it is flagged.
    pub tolerance: f64,
}

impl Default for ReadingOrder {
    fn default() -> Self {
        // A fifth of the pairs inverted is well past layout jitter.
        Self { tolerance: 0.2 }
    }
}

impl ReadingOrder {
    /// Fraction of pairs of `declared` that appear inverted in `visual`.
    fn inversion_fraction(declared: &[u32], visual: &[u32]) -> Option<f64> {
        let position: std::collections::HashMap<u32, usize> = visual
            .iter()
            .enumerate()
            .map(|(idx, mcid)| (*mcid, idx))
            .collect();
        let placed: Vec<usize> = declared
            .iter()
            .filter_map(|mcid| position.get(mcid).copied())
            .collect();
        if placed.len() < 2 {
            return None;
        }
        let mut inversions = 0usize;
        let mut pairs = 0usize;
        for i in 0..placed.len() {
            for j in (i + 1)..placed.len() {
                pairs += 1;
                if placed[i] > placed[j] {
                    inversions += 1;
                }
            }
        }
        Some(inversions as f64 / pairs as f64)
    }
}

impl Technique for ReadingOrder {
    fn id(&self) -> &'static str {
        "WCAG.PDF.03"
    }

    fn description(&self) -> &'static str {
        "Structure tree order agrees with the visual reading order"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Structure]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        if model.structure.is_empty() {
            return Ok(Verdict::not_applicable(
                "untagged document, no declared reading order",
            ));
        }

        let mut checked = 0usize;
        let mut items = Vec::new();
        for page in &model.pages {
            let declared = model.structure.content_order(page.index);
            if declared.len() < 2 {
                continue;
            }
            let visual = page.visual_order();
            if let Some(fraction) = Self::inversion_fraction(&declared, &visual) {
                checked += 1;
                if fraction > self.tolerance {
                    items.push(EvidenceItem::on_page(
                        page.index,
                        format!(
                            "{:.0}% of content item pairs out of visual order",
                            fraction * 100.0
                        ),
                    ));
                }
            }
        }

        if checked == 0 {
            return Ok(Verdict::not_applicable(
                "no page has enough ordered content items to compare",
            ));
        }
        if items.is_empty() {
            Ok(Verdict::pass(format!(
                "declared order matches visual order on {} page(s)",
                checked
            )))
        } else {
            Ok(Verdict::fail_with(
                format!("{} page(s) with diverging reading order", items.len()),
                items,
            ))
        }
    }
}

/// Heading levels must not skip downward (H1 followed by H3).
pub struct HeadingOrder;

impl Technique for HeadingOrder {
    fn id(&self) -> &'static str {
        "WCAG.PDF.09"
    }

    fn description(&self) -> &'static str {
        "Heading levels are nested without skipping"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Structure]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        let headings: Vec<_> = model
            .structure
            .nodes()
            .into_iter()
            .filter_map(|n| n.role.heading_level().map(|level| (level, n.page)))
            .collect();
        if headings.is_empty() {
            return Ok(Verdict::not_applicable("document has no headings"));
        }

        let mut items = Vec::new();
        let mut previous: Option<u8> = None;
        for (level, page) in &headings {
            if let Some(prev) = previous {
                if *level > prev + 1 {
                    let detail = format!("H{} follows H{}", level, prev);
                    items.push(match page {
                        Some(p) => EvidenceItem::on_page(*p, detail),
                        None => EvidenceItem::document(detail),
                    });
                }
            }
            previous = Some(*level);
        }

        if items.is_empty() {
            Ok(Verdict::pass(format!(
                "{} heading(s) in consistent order",
                headings.len()
            )))
        } else {
            Ok(Verdict::fail_with(
                format!("{} heading level skip(s)", items.len()),
                items,
            ))
        }
    }
}
