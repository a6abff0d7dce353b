//! Table structure checks.

use crate::error::Result;
use crate::model::structure::{Role, StructureNode};
use crate::model::DocumentModel;
use crate::report::{EvidenceItem, Verdict};
use crate::techniques::{Facet, Technique};

/// Tables must associate data cells with headers, either through TH
/// cells or through /Headers attributes on the data cells.
pub struct TableHeaders;

impl TableHeaders {
    fn table_has_headers(table: &StructureNode) -> bool {
        let cells: Vec<_> = table
            .descendants()
            .into_iter()
            .filter(|n| n.role.is_table_cell())
            .collect();
        if cells.is_empty() {
            // A table with no cells has nothing to associate.
            return true;
        }
        if cells.iter().any(|c| c.role == Role::TH) {
            return true;
        }
        cells
            .iter()
            .filter(|c| c.role == Role::TD)
            .all(|c| !c.headers.is_empty())
    }
}

impl Technique for TableHeaders {
    fn id(&self) -> &'static str {
        "WCAG.PDF.06"
    }

    fn description(&self) -> &'static str {
        "Tables mark their header cells"
    }

    fn facets(&self) -> &'static [Facet] {
        &[Facet::Tables, Facet::Structure]
    }

    fn evaluate(&self, model: &DocumentModel) -> Result<Verdict> {
        let mut tables = Vec::new();
        for node in model.structure.nodes() {
            if node.role == Role::Table {
                tables.push(node);
            }
        }
        if tables.is_empty() {
            return Ok(Verdict::not_applicable("document has no tables"));
        }

        let mut items = Vec::new();
        for table in &tables {
            if !Self::table_has_headers(table) {
                let detail = "table without TH cells or /Headers attributes";
                items.push(match table.page {
                    Some(p) => EvidenceItem::on_page(p, detail),
                    None => EvidenceItem::document(detail),
                });
            }
        }

        if items.is_empty() {
            Ok(Verdict::pass(format!(
                "all {} table(s) mark their headers",
                tables.len()
            )))
        } else {
            Ok(Verdict::fail_with(
                format!(
                    "{} of {} table(s) without header markup",
                    items.len(),
                    tables.len()
                ),
                items,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::structure::StructureChild;
    use crate::report::Status;

    fn table_model(rows: Vec<Vec<StructureNode>>) -> DocumentModel {
        let mut table = StructureNode::new(Role::Table);
        for cells in rows {
            let mut row = StructureNode::new(Role::TR);
            row.children = cells
                .into_iter()
                .map(|c| StructureChild::Node(Box::new(c)))
                .collect();
            table.children.push(StructureChild::Node(Box::new(row)));
        }
        let mut model = DocumentModel::default();
        model.structure.roots = vec![table];
        model
    }

    #[test]
    fn test_table_with_th_passes() {
        let model = table_model(vec![
            vec![StructureNode::new(Role::TH), StructureNode::new(Role::TH)],
            vec![StructureNode::new(Role::TD), StructureNode::new(Role::TD)],
        ]);
        let verdict = TableHeaders.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Pass);
    }

    #[test]
    fn test_table_with_headers_attributes_passes() {
        let mut td1 = StructureNode::new(Role::TD);
        td1.headers = vec!["h1".into()];
        let mut td2 = StructureNode::new(Role::TD);
        td2.headers = vec!["h2".into()];
        let model = table_model(vec![vec![td1, td2]]);
        let verdict = TableHeaders.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Pass);
    }

    #[test]
    fn test_table_without_headers_fails() {
        let model = table_model(vec![vec![
            StructureNode::new(Role::TD),
            StructureNode::new(Role::TD),
        ]]);
        let verdict = TableHeaders.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Fail);
        assert_eq!(verdict.items.len(), 1);
    }

    #[test]
    fn test_mixed_tds_partial_headers_fail() {
        let mut with = StructureNode::new(Role::TD);
        with.headers = vec!["h1".into()];
        let without = StructureNode::new(Role::TD);
        let model = table_model(vec![vec![with, without]]);
        let verdict = TableHeaders.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::Fail);
    }

    #[test]
    fn test_no_tables_is_not_applicable() {
        let model = DocumentModel::default();
        let verdict = TableHeaders.evaluate(&model).unwrap();
        assert_eq!(verdict.status, Status::NotApplicable);
    }
}
