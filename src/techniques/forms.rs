//! Interactive form checks: field labelling and submit controls.

use crate::error::Result;
use crate::model::DocumentModel;
use crate::report::{EvidenceItem, Verdict};
use crate::techniques::{Facet, Technique};

/// Form fields must expose a name assistive software can announce.
pub struct FieldLabels;

impl Technique for FieldLabels {
    fn id(&self) -> &'static str {
        "WCAG.PDF.12"
    }

    fn description(&self) -> &'static str {
        "Form fields expose name, role and value"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Forms]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        if !model.has_form || model.form_fields.is_empty() {
            return Ok(Verdict::not_applicable("document has no form fields"));
        }

        let mut checked = 0usize;
        let mut items = Vec::new();
        for (idx, field) in model.form_fields.iter().enumerate() {
            // Push buttons carry their label in the widget appearance and
            // are covered by the submit-control check.
            if field.is_push_button() {
                continue;
            }
            checked += 1;
            if field.field_type.is_none() {
                items.push(EvidenceItem::document(format!(
                    "field #{} without a field type",
                    idx + 1
                )));
                continue;
            }
            if field.label().is_none() {
                items.push(EvidenceItem::document(format!(
                    "field #{} without /TU or /T label",
                    idx + 1
                )));
            }
        }

        if checked == 0 {
            return Ok(Verdict::not_applicable(
                "form contains only push buttons",
            ));
        }
        if items.is_empty() {
            Ok(Verdict::pass(format!("all {} field(s) are labelled", checked)))
        } else {
            Ok(Verdict::fail_with(
                format!("{} of {} field(s) without an accessible name", items.len(), checked),
                items,
            ))
        }
    }
}

/// Forms with push buttons must offer a submit control.
pub struct SubmitControl;

impl Technique for SubmitControl {
    fn id(&self) -> &'static str {
        "WCAG.PDF.15"
    }

    fn description(&self) -> &'static str {
        "Interactive form offers a submit control"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Forms]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        if !model.has_form || model.form_fields.is_empty() {
            return Ok(Verdict::not_applicable("document has no interactive form"));
        }
        let buttons: Vec<_> = model
            .form_fields
            .iter()
            .filter(|f| f.is_push_button())
            .collect();
        if buttons.is_empty() {
            return Ok(Verdict::not_applicable("form has no push buttons"));
        }

        let submits = buttons
            .iter()
            .filter(|b| {
                b.action.as_ref().is_some_and(|a| {
                    a.kind == "SubmitForm" || (a.kind == "JavaScript" && a.has_js)
                })
            })
            .count();
        if submits > 0 {
            Ok(Verdict::pass(format!("{} submit control(s) found", submits)))
        } else {
            Ok(Verdict::fail(format!(
                "{} push button(s), none submits the form",
                buttons.len()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldAction, FieldFlags, FieldType, FormField};
    use crate::report::Status;

    fn field(
        name: Option<&str>,
        tooltip: Option<&str>,
        field_type: Option<FieldType>,
        flags: FieldFlags,
        action: Option<FieldAction>,
    ) -> FormField {
        FormField {
            name: name.map(str::to_string),
            tooltip: tooltip.map(str::to_string),
            field_type,
            flags,
            has_value: false,
            action,
        }
    }

    fn form_model(fields: Vec<FormField>) -> DocumentModel {
        DocumentModel {
            has_form: true,
            form_fields: fields,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_form_is_not_applicable() {
        let model = DocumentModel::default();
        assert_eq!(
            FieldLabels.evaluate(&model).unwrap().status,
            Status::NotApplicable
        );
        assert_eq!(
            SubmitControl.evaluate(&model).unwrap().status,
            Status::NotApplicable
        );
    }

    #[test]
    fn test_labelled_fields_pass() {
        let model = form_model(vec![
            field(None, Some("Full name"), Some(FieldType::Text), FieldFlags::empty(), None),
            field(Some("email"), None, Some(FieldType::Text), FieldFlags::empty(), None),
        ]);
        let verdict = FieldLabels.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Pass);
    }

    #[test]
    fn test_unlabelled_field_fails() {
        let model = form_model(vec![field(
            None,
            None,
            Some(FieldType::Text),
            FieldFlags::empty(),
            None,
        )]);
        let verdict = FieldLabels.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Fail);
        assert!(verdict.items[0].detail.contains("field #1"));
    }

    #[test]
    fn test_push_buttons_skipped_by_label_check() {
        let model = form_model(vec![field(
            None,
            None,
            Some(FieldType::Button),
            FieldFlags::PUSH_BUTTON,
            None,
        )]);
        let verdict = FieldLabels.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::NotApplicable);
    }

    #[test]
    fn test_missing_field_type_fails() {
        let model = form_model(vec![field(
            Some("x"),
            None,
            None,
            FieldFlags::empty(),
            None,
        )]);
        let verdict = FieldLabels.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Fail);
        assert!(verdict.items[0].detail.contains("field type"));
    }

    #[test]
    fn test_submit_form_action_passes() {
        let model = form_model(vec![field(
            Some("send"),
            None,
            Some(FieldType::Button),
            FieldFlags::PUSH_BUTTON,
            Some(FieldAction {
                kind: "SubmitForm".into(),
                has_js: false,
            }),
        )]);
        let verdict = SubmitControl.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Pass);
    }

    #[test]
    fn test_javascript_submit_passes() {
        let model = form_model(vec![field(
            Some("send"),
            None,
            Some(FieldType::Button),
            FieldFlags::PUSH_BUTTON,
            Some(FieldAction {
                kind: "JavaScript".into(),
                has_js: true,
            }),
        )]);
        let verdict = SubmitControl.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Pass);
    }

    #[test]
    fn test_push_button_without_submit_fails() {
        let model = form_model(vec![field(
            Some("decor"),
            None,
            Some(FieldType::Button),
            FieldFlags::PUSH_BUTTON,
            None,
        )]);
        let verdict = SubmitControl.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Fail);
    }

    #[test]
    fn test_form_without_push_buttons_is_not_applicable() {
        let model = form_model(vec![field(
            Some("email"),
            None,
            Some(FieldType::Text),
            FieldFlags::empty(),
            None,
        )]);
        let verdict = SubmitControl.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::NotApplicable);
    }
}
