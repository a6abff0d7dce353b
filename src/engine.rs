//! Runs the technique catalog against a document model.
//!
//! Techniques are isolated from each other: a panicking or erroring
//! check becomes an Error verdict for that technique and the rest of the
//! run proceeds. Results always come back in registry order, whether
//! evaluated in parallel or sequentially.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;

use crate::model::DocumentModel;
use crate::report::{ReportEntry, Verdict};
use crate::techniques::Technique;

/// Schedules technique evaluation over a document model.
pub struct EvaluationEngine {
    parallel: bool,
}

impl Default for EvaluationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationEngine {
    /// Engine with parallel evaluation enabled.
    pub fn new() -> Self {
        Self { parallel: true }
    }

    /// Toggle parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Evaluate `techniques` against `model`, one entry per technique.
    pub fn run(&self, model: &DocumentModel, techniques: &[Box<dyn Technique>]) -> Vec<ReportEntry> {
        if self.parallel {
            techniques
                .par_iter()
                .map(|t| evaluate_one(t.as_ref(), model))
                .collect()
        } else {
            techniques
                .iter()
                .map(|t| evaluate_one(t.as_ref(), model))
                .collect()
        }
    }
}

fn evaluate_one(technique: &dyn Technique, model: &DocumentModel) -> ReportEntry {
    let verdict = match catch_unwind(AssertUnwindSafe(|| technique.evaluate(model))) {
        Ok(Ok(verdict)) => verdict,
        Ok(Err(e)) => {
            log::warn!("technique {} errored: {}", technique.id(), e);
            Verdict::error(format!("check failed: {}", e))
        }
        Err(_) => {
            log::warn!("technique {} panicked", technique.id());
            Verdict::error("check aborted unexpectedly")
        }
    };
    ReportEntry {
        technique_id: technique.id().to_string(),
        description: technique.description().to_string(),
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::report::Status;
    use crate::techniques::Facet;

    struct Fixed(Status);

    impl Technique for Fixed {
        fn id(&self) -> &'static str {
            "TEST.FIXED"
        }
        fn description(&self) -> &'static str {
            "always returns its configured status"
        }
        fn facets(&self) -> &'static [Facet] {
            &[Facet::Metadata]
        }
        fn evaluate(&self, _: &DocumentModel) -> Result<Verdict> {
            Ok(match self.0 {
                Status::Pass => Verdict::pass("ok"),
                Status::Fail => Verdict::fail("bad"),
                Status::NotApplicable => Verdict::not_applicable("n/a"),
                Status::Error => Verdict::error("err"),
            })
        }
    }

    struct Panics;

    impl Technique for Panics {
        fn id(&self) -> &'static str {
            "TEST.PANIC"
        }
        fn description(&self) -> &'static str {
            "panics on evaluation"
        }
        fn facets(&self) -> &'static [Facet] {
            &[Facet::Metadata]
        }
        fn evaluate(&self, _: &DocumentModel) -> Result<Verdict> {
            panic!("boom")
        }
    }

    struct Errors;

    impl Technique for Errors {
        fn id(&self) -> &'static str {
            "TEST.ERROR"
        }
        fn description(&self) -> &'static str {
            "returns an evaluation error"
        }
        fn facets(&self) -> &'static [Facet] {
            &[Facet::Metadata]
        }
        fn evaluate(&self, _: &DocumentModel) -> Result<Verdict> {
            Err(Error::Evaluator("no data".into()))
        }
    }

    #[test]
    fn test_panic_becomes_error_verdict() {
        let model = DocumentModel::default();
        let techniques: Vec<Box<dyn Technique>> =
            vec![Box::new(Panics), Box::new(Fixed(Status::Pass))];
        let entries = EvaluationEngine::new()
            .with_parallel(false)
            .run(&model, &techniques);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].verdict.status, Status::Error);
        // The panic does not poison the following technique.
        assert_eq!(entries[1].verdict.status, Status::Pass);
    }

    #[test]
    fn test_error_result_becomes_error_verdict() {
        let model = DocumentModel::default();
        let techniques: Vec<Box<dyn Technique>> = vec![Box::new(Errors)];
        let entries = EvaluationEngine::new().run(&model, &techniques);
        assert_eq!(entries[0].verdict.status, Status::Error);
        assert!(entries[0].verdict.message.contains("no data"));
    }

    #[test]
    fn test_parallel_preserves_registry_order() {
        let model = DocumentModel::default();
        let techniques: Vec<Box<dyn Technique>> = vec![
            Box::new(Fixed(Status::Pass)),
            Box::new(Fixed(Status::Fail)),
            Box::new(Fixed(Status::NotApplicable)),
        ];
        let parallel = EvaluationEngine::new().run(&model, &techniques);
        let sequential = EvaluationEngine::new()
            .with_parallel(false)
            .run(&model, &techniques);
        assert_eq!(parallel, sequential);
        assert_eq!(parallel[1].verdict.status, Status::Fail);
    }
}
