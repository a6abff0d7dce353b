//! Accessibility conformance checking for PDF documents.
//!
//! The crate parses a PDF into a semantic [`DocumentModel`] and runs a
//! catalog of accessibility techniques (derived from the WCAG 2.0 PDF
//! techniques) against it, producing a per-technique [`Report`].
//!
//! # Example
//!
//! ```no_run
//! use pdfwam::check_file;
//!
//! let report = check_file("document.pdf")?;
//! println!("overall: {}", report.overall);
//! for entry in &report.entries {
//!     println!("{}: {}", entry.technique_id, entry.verdict.status);
//! }
//! # Ok::<(), pdfwam::Error>(())
//! ```
//!
//! # Pipeline
//!
//! 1. [`ObjectGraph`] wraps the parsed file behind cycle-safe reference
//!    resolution and cached stream decoding.
//! 2. [`ModelBuilder`] extracts pages, structure tree, metadata,
//!    annotations and form fields into an immutable [`DocumentModel`],
//!    downgrading local defects to warnings.
//! 3. [`EvaluationEngine`] runs the [`techniques::registry`] over the
//!    model, isolating each check.
//! 4. [`Report::aggregate`] folds the verdicts into an overall outcome
//!    where a demonstrated failure outranks an incomplete check.

pub mod engine;
pub mod error;
pub mod graph;
pub mod model;
pub mod report;
pub mod techniques;

pub use engine::EvaluationEngine;
pub use error::{Error, Result};
pub use graph::ObjectGraph;
pub use model::{DocumentModel, ModelBuilder};
pub use report::{Overall, Report, ReportEntry, Status, Verdict};
pub use techniques::Technique;

use std::path::Path;

/// Check a PDF document given as raw bytes.
///
/// Fails only on fatal conditions (unparseable or encrypted input);
/// accessibility violations are reported through the returned
/// [`Report`].
pub fn check_bytes(bytes: &[u8]) -> Result<Report> {
    let graph = ObjectGraph::load(bytes)?;
    let model = ModelBuilder::new(&graph).build()?;
    let entries = EvaluationEngine::new().run(&model, &techniques::registry());
    Ok(Report::aggregate(entries))
}

/// Check a PDF document on disk.
pub fn check_file<P: AsRef<Path>>(path: P) -> Result<Report> {
    let bytes = std::fs::read(path)?;
    check_bytes(&bytes)
}
