//! Sales rows and the per-day documents they are grouped into.
//!
//! The wire names on [`Document`] and [`DocumentLine`] are those expected by
//! the `palacete/Internos` endpoint, so they are Portuguese on purpose.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// One row of the sales-by-product view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub doc_type: String,
    pub work_date: NaiveDate,
    pub designation: String,
    pub quantity: u32,
}

/// Grouping key: one document per document type and work date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub doc_type: String,
    pub work_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLine {
    #[serde(rename = "artigo")]
    pub item: String,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
}

/// Submission unit for one `(doc_type, work_date)` key.
///
/// Always has at least one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    #[serde(rename = "tipoDoc")]
    pub doc_type: String,
    /// Four-digit year of the work date.
    #[serde(rename = "serie")]
    pub series: String,
    /// ISO-8601 work date.
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "linhas")]
    pub lines: Vec<DocumentLine>,
}

impl Document {
    fn open(key: &DocumentKey) -> Self {
        Self {
            doc_type: key.doc_type.clone(),
            series: format!("{:04}", key.work_date.year()),
            date: key.work_date.format("%Y-%m-%d").to_string(),
            lines: Vec::new(),
        }
    }
}

/// Incremental grouper so rows can be folded in while they stream from the
/// data source.
///
/// Documents come out in the order their key was first seen; lines keep row
/// order and are never merged, so repeated items stay separate lines.
#[derive(Debug, Default)]
pub struct DocumentGrouper {
    index: HashMap<DocumentKey, usize>,
    documents: Vec<Document>,
}

impl DocumentGrouper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: SourceRow) {
        let key = DocumentKey {
            doc_type: row.doc_type,
            work_date: row.work_date,
        };
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.documents.push(Document::open(&key));
                let slot = self.documents.len() - 1;
                self.index.insert(key, slot);
                slot
            }
        };
        self.documents[slot].lines.push(DocumentLine {
            item: row.designation,
            quantity: row.quantity,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[must_use]
    pub fn finish(self) -> Vec<Document> {
        self.documents
    }
}

/// Group a full sequence of rows into documents.
pub fn group<I>(rows: I) -> Vec<Document>
where
    I: IntoIterator<Item = SourceRow>,
{
    let mut grouper = DocumentGrouper::new();
    for row in rows {
        grouper.push(row);
    }
    grouper.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(doc_type: &str, date: (i32, u32, u32), item: &str, qty: u32) -> SourceRow {
        SourceRow {
            doc_type: doc_type.to_string(),
            work_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            designation: item.to_string(),
            quantity: qty,
        }
    }

    fn line(item: &str, quantity: u32) -> DocumentLine {
        DocumentLine {
            item: item.to_string(),
            quantity,
        }
    }

    #[test]
    fn empty_input_produces_no_documents() {
        assert!(group(Vec::new()).is_empty());
    }

    #[test]
    fn groups_by_doc_type_and_date() {
        let docs = group(vec![
            row("FT", (2024, 1, 1), "A", 2),
            row("FT", (2024, 1, 1), "B", 1),
            row("NC", (2024, 1, 1), "C", 5),
        ]);

        assert_eq!(
            docs,
            vec![
                Document {
                    doc_type: "FT".to_string(),
                    series: "2024".to_string(),
                    date: "2024-01-01".to_string(),
                    lines: vec![line("A", 2), line("B", 1)],
                },
                Document {
                    doc_type: "NC".to_string(),
                    series: "2024".to_string(),
                    date: "2024-01-01".to_string(),
                    lines: vec![line("C", 5)],
                },
            ]
        );
    }

    #[test]
    fn same_type_on_different_days_splits() {
        let docs = group(vec![
            row("FT", (2023, 12, 31), "A", 1),
            row("FT", (2024, 1, 1), "A", 1),
        ]);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].series, "2023");
        assert_eq!(docs[1].series, "2024");
    }

    #[test]
    fn interleaved_rows_keep_first_seen_order_and_row_order() {
        let docs = group(vec![
            row("NC", (2024, 1, 2), "X", 1),
            row("FT", (2024, 1, 2), "A", 1),
            row("NC", (2024, 1, 2), "Y", 2),
        ]);
        assert_eq!(docs[0].doc_type, "NC");
        assert_eq!(docs[0].lines, vec![line("X", 1), line("Y", 2)]);
        assert_eq!(docs[1].doc_type, "FT");
    }

    #[test]
    fn duplicate_items_are_not_merged() {
        let docs = group(vec![
            row("FT", (2024, 1, 1), "A", 2),
            row("FT", (2024, 1, 1), "A", 3),
        ]);
        assert_eq!(docs[0].lines, vec![line("A", 2), line("A", 3)]);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let docs = group(vec![row("FT", (2024, 1, 1), "Cafe", 2)]);
        let value = serde_json::to_value(&docs[0]).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "tipoDoc": "FT",
                "serie": "2024",
                "data": "2024-01-01",
                "linhas": [{ "artigo": "Cafe", "quantidade": 2 }]
            })
        );
    }
}
