//! Page content scanning: marked-content index and rough geometry.
//!
//! Each page's content operators are scanned exactly once. The scan
//! records, per marked-content identifier, the position at which the
//! item first paints (text position or current transform translation),
//! plus artifact spans and text/image presence. Positions are
//! approximate; they only need to support ordering comparisons, not
//! rendering.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use lopdf::content::Content;
use lopdf::Object;
use regex::Regex;

use crate::graph::{int_value, name_str, number_value};

lazy_static! {
    /// Image/form XObject naming convention used by common producers.
    static ref IMAGE_NAME_RE: Regex = Regex::new(r"^(Im|Fm)\d+").unwrap();
}

/// What a marked-content span paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Shown text.
    Text,
    /// A placed image XObject.
    Image,
}

/// First paint position of one marked-content item.
#[derive(Debug, Clone)]
pub struct MarkedContentSpan {
    /// Marked content identifier.
    pub mcid: u32,
    /// Approximate horizontal position in user space.
    pub x: f32,
    /// Approximate vertical position in user space.
    pub y: f32,
    /// Content kind.
    pub kind: SpanKind,
}

/// One /Artifact marked-content region.
#[derive(Debug, Clone)]
pub struct ArtifactSpan {
    /// Whether the artifact was declared with a usable property list
    /// (BDC with an inline dictionary or a resolvable /Properties name;
    /// BMC artifacts are trivially well-formed).
    pub well_formed: bool,
    /// Pagination subtype (/Header, /Footer, ...) when declared.
    pub subtype: Option<String>,
    /// Number of image XObjects painted inside the region.
    pub image_count: usize,
}

/// Result of scanning one page's content stream.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// First-paint spans, in content-stream order.
    pub spans: Vec<MarkedContentSpan>,
    /// Artifact regions, in content-stream order.
    pub artifacts: Vec<ArtifactSpan>,
    /// Whether any text-showing operator was seen.
    pub has_text: bool,
    /// Number of image XObject placements.
    pub image_count: usize,
}

enum McFrame {
    Tagged(Option<u32>),
    Artifact(ArtifactSpan),
}

/// Scan decoded page content operators.
///
/// `properties` maps /Properties resource names to their MCID entry;
/// `xobjects` maps XObject resource names to whether they are images.
/// Both are pre-resolved by the model builder so the scan itself needs
/// no access to the object graph.
pub fn scan(
    content: &Content,
    properties: &HashMap<String, Option<u32>>,
    xobjects: &HashMap<String, bool>,
) -> PageContent {
    let mut out = PageContent::default();
    let mut stack: Vec<McFrame> = Vec::new();
    let mut seen: HashSet<u32> = HashSet::new();

    // Approximate positions: text position from BT/Tm/Td, placement
    // translation from the last cm. q/Q save and restore the latter.
    let (mut tx, mut ty) = (0.0f32, 0.0f32);
    let mut leading = 0.0f32;
    let (mut cx, mut cy) = (0.0f32, 0.0f32);
    let mut gs_stack: Vec<(f32, f32)> = Vec::new();

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => gs_stack.push((cx, cy)),
            "Q" => {
                if let Some((x, y)) = gs_stack.pop() {
                    cx = x;
                    cy = y;
                }
            }
            "cm" => {
                if op.operands.len() == 6 {
                    cx = number_value(&op.operands[4]).unwrap_or(cx);
                    cy = number_value(&op.operands[5]).unwrap_or(cy);
                }
            }
            "BT" => {
                tx = 0.0;
                ty = 0.0;
            }
            "Tm" => {
                if op.operands.len() == 6 {
                    tx = number_value(&op.operands[4]).unwrap_or(tx);
                    ty = number_value(&op.operands[5]).unwrap_or(ty);
                }
            }
            "Td" | "TD" => {
                if op.operands.len() == 2 {
                    tx += number_value(&op.operands[0]).unwrap_or(0.0);
                    ty += number_value(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        leading = -number_value(&op.operands[1]).unwrap_or(0.0);
                    }
                }
            }
            "TL" => {
                if let Some(l) = op.operands.first().and_then(number_value) {
                    leading = l;
                }
            }
            "T*" => ty -= leading,
            "Tj" | "TJ" | "'" | "\"" => {
                if op.operator != "Tj" && op.operator != "TJ" {
                    ty -= leading;
                }
                out.has_text = true;
                if let Some(mcid) = current_mcid(&stack) {
                    if seen.insert(mcid) {
                        out.spans.push(MarkedContentSpan {
                            mcid,
                            x: tx,
                            y: ty,
                            kind: SpanKind::Text,
                        });
                    }
                }
            }
            "Do" => {
                let name = op.operands.first().and_then(name_str);
                let is_image = name
                    .map(|n| xobjects.get(n).copied().unwrap_or(false))
                    .unwrap_or(false);
                if is_image {
                    out.image_count += 1;
                    if let Some(mcid) = current_mcid(&stack) {
                        if seen.insert(mcid) {
                            out.spans.push(MarkedContentSpan {
                                mcid,
                                x: cx,
                                y: cy,
                                kind: SpanKind::Image,
                            });
                        }
                    }
                }
                // Inside an artifact, any image-like XObject counts: some
                // producers paint decorative images through form XObjects.
                let artifact_image =
                    is_image || name.map(|n| IMAGE_NAME_RE.is_match(n)).unwrap_or(false);
                if artifact_image {
                    if let Some(McFrame::Artifact(span)) = stack
                        .iter_mut()
                        .rev()
                        .find(|f| matches!(f, McFrame::Artifact(_)))
                    {
                        span.image_count += 1;
                    }
                }
            }
            "BMC" => {
                let tag = op.operands.first().and_then(name_str).unwrap_or("");
                if tag == "Artifact" {
                    stack.push(McFrame::Artifact(ArtifactSpan {
                        well_formed: true,
                        subtype: None,
                        image_count: 0,
                    }));
                } else {
                    stack.push(McFrame::Tagged(None));
                }
            }
            "BDC" => {
                let tag = op.operands.first().and_then(name_str).unwrap_or("");
                let props = op.operands.get(1);
                if tag == "Artifact" {
                    stack.push(McFrame::Artifact(artifact_from_props(props)));
                } else {
                    stack.push(McFrame::Tagged(mcid_from_props(props, properties)));
                }
            }
            "EMC" => {
                if let Some(McFrame::Artifact(span)) = stack.pop() {
                    out.artifacts.push(span);
                }
            }
            _ => {}
        }
    }

    // Unbalanced BDC/EMC: flush dangling artifacts so they are not lost.
    for frame in stack {
        if let McFrame::Artifact(span) = frame {
            out.artifacts.push(span);
        }
    }

    out
}

fn current_mcid(stack: &[McFrame]) -> Option<u32> {
    for frame in stack.iter().rev() {
        match frame {
            McFrame::Artifact(_) => return None,
            McFrame::Tagged(mcid) => {
                if mcid.is_some() {
                    return *mcid;
                }
            }
        }
    }
    None
}

fn mcid_from_props(
    props: Option<&Object>,
    properties: &HashMap<String, Option<u32>>,
) -> Option<u32> {
    match props {
        Some(Object::Dictionary(dict)) => dict
            .get(b"MCID")
            .ok()
            .and_then(int_value)
            .filter(|i| *i >= 0)
            .map(|i| i as u32),
        Some(Object::Name(name)) => std::str::from_utf8(name)
            .ok()
            .and_then(|n| properties.get(n).copied())
            .flatten(),
        _ => None,
    }
}

fn artifact_from_props(props: Option<&Object>) -> ArtifactSpan {
    match props {
        Some(Object::Dictionary(dict)) => {
            let subtype = dict
                .get(b"Subtype")
                .ok()
                .and_then(name_str)
                .map(str::to_string);
            ArtifactSpan {
                well_formed: true,
                subtype,
                image_count: 0,
            }
        }
        // A name operand points into the page's /Properties resource.
        Some(Object::Name(_)) => ArtifactSpan {
            well_formed: true,
            subtype: None,
            image_count: 0,
        },
        _ => ArtifactSpan {
            well_formed: false,
            subtype: None,
            image_count: 0,
        },
    }
}
