//! Check verdicts and the aggregated conformance report.

use serde::{Deserialize, Serialize};

/// Outcome category of a single technique check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The requirement is satisfied.
    Pass,
    /// The requirement is violated.
    Fail,
    /// The technique's subject matter does not occur in the document.
    NotApplicable,
    /// The check itself could not complete.
    Error,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Pass => "pass",
            Status::Fail => "fail",
            Status::NotApplicable => "not applicable",
            Status::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// One located piece of evidence behind a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// 1-based page number, when the finding is page-local.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// What was found there.
    pub detail: String,
}

impl EvidenceItem {
    /// Document-level evidence.
    pub fn document(detail: impl Into<String>) -> Self {
        Self {
            page: None,
            detail: detail.into(),
        }
    }

    /// Evidence on a specific page (0-based index in, 1-based out).
    pub fn on_page(page_index: usize, detail: impl Into<String>) -> Self {
        Self {
            page: Some(page_index as u32 + 1),
            detail: detail.into(),
        }
    }
}

/// The verdict of one technique, with supporting evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Outcome category.
    pub status: Status,
    /// One-line explanation.
    pub message: String,
    /// Located findings, possibly empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<EvidenceItem>,
}

impl Verdict {
    /// A passing verdict.
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            status: Status::Pass,
            message: message.into(),
            items: Vec::new(),
        }
    }

    /// A failing verdict.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: Status::Fail,
            message: message.into(),
            items: Vec::new(),
        }
    }

    /// A failing verdict with located findings.
    pub fn fail_with(message: impl Into<String>, items: Vec<EvidenceItem>) -> Self {
        Self {
            status: Status::Fail,
            message: message.into(),
            items,
        }
    }

    /// The technique's subject matter does not occur.
    pub fn not_applicable(message: impl Into<String>) -> Self {
        Self {
            status: Status::NotApplicable,
            message: message.into(),
            items: Vec::new(),
        }
    }

    /// The check could not complete.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            items: Vec::new(),
        }
    }
}

/// One line of the report: a technique and its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Stable technique identifier, e.g. "WCAG.PDF.01".
    pub technique_id: String,
    /// Human-readable description of what was checked.
    pub description: String,
    /// The verdict.
    pub verdict: Verdict,
}

/// Overall document-level outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overall {
    /// At least one pass, no failures or errors.
    Pass,
    /// At least one technique failed.
    Fail,
    /// Nothing was applicable.
    NotApplicable,
    /// No failures, but at least one check errored.
    Error,
}

impl std::fmt::Display for Overall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Overall::Pass => "pass",
            Overall::Fail => "fail",
            Overall::NotApplicable => "not applicable",
            Overall::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// The full conformance report for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Overall outcome, aggregated over all entries.
    pub overall: Overall,
    /// Per-technique results, in registry order.
    pub entries: Vec<ReportEntry>,
}

impl Report {
    /// Aggregate per-technique entries into a report.
    ///
    /// A demonstrated violation outweighs an incomplete check, so Fail
    /// dominates Error; Error in turn taints an otherwise clean result.
    pub fn aggregate(entries: Vec<ReportEntry>) -> Self {
        let mut any_fail = false;
        let mut any_error = false;
        let mut any_pass = false;
        for entry in &entries {
            match entry.verdict.status {
                Status::Fail => any_fail = true,
                Status::Error => any_error = true,
                Status::Pass => any_pass = true,
                Status::NotApplicable => {}
            }
        }
        let overall = if any_fail {
            Overall::Fail
        } else if any_error {
            Overall::Error
        } else if any_pass {
            Overall::Pass
        } else {
            Overall::NotApplicable
        };
        Self { overall, entries }
    }

    /// Entries with the given status.
    pub fn with_status(&self, status: Status) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(move |e| e.verdict.status == status)
    }

    /// Process exit code for this outcome: 0 clean, 1 failed, 2 tainted
    /// by check errors.
    pub fn exit_code(&self) -> i32 {
        match self.overall {
            Overall::Pass | Overall::NotApplicable => 0,
            Overall::Fail => 1,
            Overall::Error => 2,
        }
    }
}
