//! Aggregation and serialization behavior of the report types.

use pdfwam::report::{EvidenceItem, Overall, Report, ReportEntry, Status, Verdict};
use proptest::prelude::*;

fn entry(id: &str, verdict: Verdict) -> ReportEntry {
    ReportEntry {
        technique_id: id.to_string(),
        description: format!("check {}", id),
        verdict,
    }
}

fn verdict_for(status: Status) -> Verdict {
    match status {
        Status::Pass => Verdict::pass("ok"),
        Status::Fail => Verdict::fail("violation"),
        Status::NotApplicable => Verdict::not_applicable("nothing to check"),
        Status::Error => Verdict::error("check broke"),
    }
}

#[test]
fn test_aggregation_keeps_entry_order() {
    let report = Report::aggregate(vec![
        entry("B", Verdict::pass("ok")),
        entry("A", Verdict::fail("bad")),
        entry("C", Verdict::not_applicable("n/a")),
    ]);
    let ids: Vec<&str> = report
        .entries
        .iter()
        .map(|e| e.technique_id.as_str())
        .collect();
    assert_eq!(ids, vec!["B", "A", "C"]);
}

#[test]
fn test_json_shape_is_stable() {
    let report = Report::aggregate(vec![entry(
        "WCAG.PDF.16",
        Verdict::fail_with(
            "no document language declared",
            vec![EvidenceItem::document("catalog has no /Lang")],
        ),
    )]);
    let value: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["overall"], "fail");
    assert_eq!(value["entries"][0]["technique_id"], "WCAG.PDF.16");
    assert_eq!(value["entries"][0]["verdict"]["status"], "fail");
    assert_eq!(
        value["entries"][0]["verdict"]["items"][0]["detail"],
        "catalog has no /Lang"
    );
}

fn status_strategy() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Pass),
        Just(Status::Fail),
        Just(Status::NotApplicable),
        Just(Status::Error),
    ]
}

proptest! {
    #[test]
    fn test_any_fail_makes_overall_fail(statuses in prop::collection::vec(status_strategy(), 1..20)) {
        let entries: Vec<ReportEntry> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| entry(&format!("T{}", i), verdict_for(*s)))
            .collect();
        let report = Report::aggregate(entries);

        if statuses.contains(&Status::Fail) {
            prop_assert_eq!(report.overall, Overall::Fail);
        } else if statuses.contains(&Status::Error) {
            prop_assert_eq!(report.overall, Overall::Error);
        } else if statuses.contains(&Status::Pass) {
            prop_assert_eq!(report.overall, Overall::Pass);
        } else {
            prop_assert_eq!(report.overall, Overall::NotApplicable);
        }
    }

    #[test]
    fn test_serde_round_trip_preserves_report(statuses in prop::collection::vec(status_strategy(), 0..10)) {
        let entries: Vec<ReportEntry> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| entry(&format!("T{}", i), verdict_for(*s)))
            .collect();
        let report = Report::aggregate(entries);
        let json = serde_json::to_string(&report).unwrap();
        let back: Report = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, report);
    }

    #[test]
    fn test_exit_code_matches_overall(statuses in prop::collection::vec(status_strategy(), 0..10)) {
        let entries: Vec<ReportEntry> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| entry(&format!("T{}", i), verdict_for(*s)))
            .collect();
        let report = Report::aggregate(entries);
        let expected = match report.overall {
            Overall::Pass | Overall::NotApplicable => 0,
            Overall::Fail => 1,
            Overall::Error => 2,
        };
        prop_assert_eq!(report.exit_code(), expected);
    }
}
