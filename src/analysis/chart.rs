use serde::Serialize;
use serde_json::{json, Value};

use super::table::LabelCounts;
use crate::pipelines::sentiment_analysis_pipeline::{RankedResult, SentimentLabel};

const BAR_COLOR: &str = "green";
const CATEGORY_TITLE: &str = "Reviews";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub label: SentimentLabel,
    pub value: f64,
}

/// Horizontal bar chart: one bar per sentiment label, drawn in row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    rows: Vec<ChartRow>,
    value_title: &'static str,
}

impl BarChart {
    /// Ranked probabilities, most confident label first.
    pub fn from_ranked(ranked: &RankedResult) -> Self {
        Self {
            rows: ranked
                .iter()
                .map(|s| ChartRow {
                    label: s.label,
                    value: f64::from(s.score),
                })
                .collect(),
            value_title: "Sentiment Scores",
        }
    }

    /// Label occurrence counts from a bulk run.
    pub fn from_counts(counts: &LabelCounts) -> Self {
        Self {
            rows: counts
                .iter()
                .map(|(label, count)| ChartRow {
                    label,
                    value: count as f64,
                })
                .collect(),
            value_title: "Sentiment Counts",
        }
    }

    pub fn rows(&self) -> &[ChartRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Label of the longest bar; the first one wins a tie.
    pub fn longest(&self) -> Option<SentimentLabel> {
        self.rows
            .iter()
            .fold(None::<&ChartRow>, |best, row| match best {
                Some(b) if b.value >= row.value => Some(b),
                _ => Some(row),
            })
            .map(|row| row.label)
    }

    /// Text rendering for terminals; bars are scaled so the largest value
    /// spans `width` cells.
    pub fn render_text(&self, width: usize) -> String {
        let max = self.rows.iter().map(|r| r.value).fold(0.0_f64, f64::max);
        let label_width = self
            .rows
            .iter()
            .map(|r| r.label.as_str().len())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for row in &self.rows {
            let cells = if max > 0.0 {
                ((row.value / max) * width as f64).round() as usize
            } else {
                0
            };
            let value = if row.value.fract() == 0.0 && row.value >= 1.0 {
                format!("{}", row.value as u64)
            } else {
                format!("{:.4}", row.value)
            };
            out.push_str(&format!(
                "{:>label_width$} | {} {value}\n",
                row.label.as_str(),
                "█".repeat(cells),
            ));
        }
        out
    }

    /// Vega-Lite spec: green horizontal bars, categories kept in row order.
    pub fn to_vega_lite(&self) -> Value {
        let values: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                json!({
                    CATEGORY_TITLE: row.label.as_str(),
                    self.value_title: row.value,
                })
            })
            .collect();

        json!({
            "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
            "data": { "values": values },
            "mark": { "type": "bar", "color": BAR_COLOR },
            "encoding": {
                "y": { "field": CATEGORY_TITLE, "type": "nominal", "sort": null },
                "x": { "field": self.value_title, "type": "quantitative" }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::sentiment_analysis_pipeline::SentimentScoreSet;

    #[test]
    fn ranked_chart_has_three_bars_in_rank_order() {
        let chart = BarChart::from_ranked(&SentimentScoreSet::new([0.1, 0.6, 0.3]).ranked());
        let labels: Vec<_> = chart.rows().iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![
                SentimentLabel::Neutral,
                SentimentLabel::Negative,
                SentimentLabel::Positive
            ]
        );
        assert_eq!(chart.longest(), Some(SentimentLabel::Neutral));
    }

    #[test]
    fn text_rendering_scales_to_the_largest_bar() {
        let chart = BarChart::from_ranked(&SentimentScoreSet::new([0.5, 0.25, 0.25]).ranked());
        let text = chart.render_text(8);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Positive | ████████ 0.5000"));
        assert!(lines[1].starts_with(" Neutral | ████ 0.2500"));
    }

    #[test]
    fn count_bars_print_whole_numbers() {
        let counts = LabelCounts::tally(
            [
                SentimentLabel::Positive,
                SentimentLabel::Negative,
                SentimentLabel::Positive,
            ]
            .iter(),
        );
        let text = BarChart::from_counts(&counts).render_text(4);
        assert_eq!(text, "Positive | ████ 2\nNegative | ██ 1\n");
    }

    #[test]
    fn vega_lite_keeps_row_order_and_styling() {
        let chart = BarChart::from_ranked(&SentimentScoreSet::new([0.7, 0.2, 0.1]).ranked());
        let spec = chart.to_vega_lite();
        assert_eq!(spec["mark"]["color"], "green");
        assert!(spec["encoding"]["y"]["sort"].is_null());
        assert_eq!(spec["data"]["values"][0]["Reviews"], "Positive");
        assert_eq!(spec["encoding"]["x"]["field"], "Sentiment Scores");
    }
}
