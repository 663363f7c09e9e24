use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;

use crate::core::{AnalyserError, Result};
use crate::pipelines::sentiment_analysis_pipeline::SentimentLabel;

/// Name of the column bulk analysis appends to the uploaded table.
pub const SENTIMENT_COLUMN: &str = "sentiment_class";

/// A parsed CSV upload: header row plus string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl UploadedTable {
    /// Parses CSV with a header row. Rows may be shorter or longer than the
    /// header; missing cells read as empty.
    pub fn from_reader(name: impl Into<String>, reader: impl Read) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let headers = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect();
        let rows = csv_reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<std::result::Result<Vec<Vec<String>>, _>>()?;
        Ok(Self {
            name: name.into(),
            headers,
            rows,
        })
    }

    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        Self::from_reader(name, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Every cell of `column`, in row order.
    pub fn column(&self, column: &str) -> Result<Vec<&str>> {
        let index = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| AnalyserError::UnknownColumn(column.to_string()))?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(index).map_or("", String::as_str))
            .collect())
    }
}

/// One analysed cell and its arg-max label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkRow {
    pub text: String,
    pub label: SentimentLabel,
}

/// Per-label occurrence counts, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCounts {
    counts: Vec<(SentimentLabel, usize)>,
}

impl LabelCounts {
    /// Labels that never occur are left out; equal counts keep the fixed
    /// label order.
    pub fn tally<'a>(labels: impl IntoIterator<Item = &'a SentimentLabel>) -> Self {
        let mut by_label: BTreeMap<SentimentLabel, usize> = BTreeMap::new();
        for label in labels {
            *by_label.entry(*label).or_default() += 1;
        }
        let mut counts: Vec<(SentimentLabel, usize)> = by_label.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        Self { counts }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SentimentLabel, usize)> + '_ {
        self.counts.iter().copied()
    }

    pub fn get(&self, label: SentimentLabel) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| *l == label)
            .map_or(0, |(_, c)| *c)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    /// `Positive: 2, Negative: 1`
    pub fn summary(&self) -> String {
        self.counts
            .iter()
            .map(|(label, count)| format!("{label}: {count}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Bulk analysis output: the upload with a `sentiment_class` column attached.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkTable {
    source: UploadedTable,
    column: String,
    rows: Vec<BulkRow>,
    counts: LabelCounts,
}

impl BulkTable {
    /// `rows` holds one entry per row of `source`, in the same order.
    pub fn new(source: UploadedTable, column: impl Into<String>, rows: Vec<BulkRow>) -> Self {
        let counts = LabelCounts::tally(rows.iter().map(|r| &r.label));
        Self {
            source,
            column: column.into(),
            rows,
            counts,
        }
    }

    /// The upload the labels were computed from.
    pub fn source(&self) -> &UploadedTable {
        &self.source
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn rows(&self) -> &[BulkRow] {
        &self.rows
    }

    pub fn counts(&self) -> &LabelCounts {
        &self.counts
    }

    pub fn labels(&self) -> impl Iterator<Item = SentimentLabel> + '_ {
        self.rows.iter().map(|r| r.label)
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(|r| r.text.as_str())
    }

    /// Writes every uploaded column followed by `sentiment_class`.
    ///
    /// Short rows are padded with empty cells; cells past the last header
    /// have no column and are dropped.
    pub fn write_csv(&self, writer: impl std::io::Write) -> Result<()> {
        let width = self.source.headers.len();
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header: Vec<&str> = self.source.headers.iter().map(String::as_str).collect();
        header.push(SENTIMENT_COLUMN);
        csv_writer.write_record(&header)?;

        for (cells, row) in self.source.rows.iter().zip(&self.rows) {
            let mut record: Vec<&str> = (0..width)
                .map(|i| cells.get(i).map_or("", String::as_str))
                .collect();
            record.push(row.label.as_str());
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SentimentLabel::*;

    const REVIEWS: &str = "id,review\n1,great!\n2,terrible\n3,meh\n";

    #[test]
    fn parses_headers_and_column_values() {
        let table = UploadedTable::from_bytes("reviews.csv", REVIEWS.as_bytes()).unwrap();
        assert_eq!(table.headers(), &["id", "review"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.column("review").unwrap(), vec!["great!", "terrible", "meh"]);
    }

    #[test]
    fn unknown_column_is_an_error() {
        let table = UploadedTable::from_bytes("reviews.csv", REVIEWS.as_bytes()).unwrap();
        let err = table.column("comment").unwrap_err();
        assert!(matches!(err, AnalyserError::UnknownColumn(c) if c == "comment"));
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let table = UploadedTable::from_bytes("t.csv", "a,b\n1\n2,x\n".as_bytes()).unwrap();
        assert_eq!(table.column("b").unwrap(), vec!["", "x"]);
    }

    #[test]
    fn counts_sort_by_frequency_then_label_order() {
        let labels = [Negative, Positive, Negative, Neutral, Positive];
        let counts = LabelCounts::tally(labels.iter());
        let order: Vec<_> = counts.iter().collect();
        assert_eq!(order, vec![(Positive, 2), (Negative, 2), (Neutral, 1)]);
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.summary(), "Positive: 2, Negative: 2, Neutral: 1");
    }

    #[test]
    fn absent_labels_are_omitted() {
        let counts = LabelCounts::tally([Negative, Negative].iter());
        assert_eq!(counts.iter().count(), 1);
        assert_eq!(counts.get(Positive), 0);
    }

    #[test]
    fn bulk_table_keeps_every_uploaded_column() {
        let source =
            UploadedTable::from_bytes("reviews.csv", "id,review,stars
1,great!,5
2,meh
".as_bytes())
                .unwrap();
        let table = BulkTable::new(
            source,
            "review",
            vec![
                BulkRow {
                    text: "great!".into(),
                    label: Positive,
                },
                BulkRow {
                    text: "meh".into(),
                    label: Neutral,
                },
            ],
        );
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,review,stars,sentiment_class\n1,great!,5,Positive\n2,meh,,Neutral\n"
        );
        assert_eq!(table.source().name(), "reviews.csv");
    }
}
