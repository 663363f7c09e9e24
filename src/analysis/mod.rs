//! The analysis orchestrator.
//!
//! [`Analyser`] owns a classifier and a chat model, both injected by the
//! caller. Each run classifies, shapes the scores into a chart, asks the chat
//! model to narrate them, and hands back an [`AnalysisReport`] whose greeting
//! and narration are revealed through [`NarrationStream`]s.

pub mod chart;
pub mod prompt;
pub mod table;

pub use chart::{BarChart, ChartRow};
pub use table::{BulkRow, BulkTable, LabelCounts, UploadedTable, SENTIMENT_COLUMN};

use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::chat::ChatModel;
use crate::core::{ConversationHistory, Result, GREETING};
use crate::pipelines::sentiment_analysis_pipeline::{
    RankedResult, SentimentClassifier, SentimentLabel,
};
use crate::streaming::{row_progress, simulated_ticks, NarrationStream, Progress};

/// Text analysed when the user submits without typing anything.
pub const PLACEHOLDER_TEXT: &str =
    "Welcome to the sentiment analyser...Enter your text into the text area";

/// What the user asked to analyse.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    Text(String),
    Table {
        table: UploadedTable,
        column: String,
    },
}

/// Classifier result of a run, before narration.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Text { input: String, ranked: RankedResult },
    Table(BulkTable),
}

/// Everything a run produced. `chart` and `outcome` make up the analysis
/// view; `greeting` and `narration` make up the summary view.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub outcome: AnalysisOutcome,
    pub chart: BarChart,
    pub prompt: String,
    pub greeting: String,
    pub narration: String,
}

impl AnalysisReport {
    pub fn greeting_stream(&self, delay: Duration) -> NarrationStream {
        NarrationStream::paced(&self.greeting, delay)
    }

    pub fn narration_stream(&self, delay: Duration) -> NarrationStream {
        NarrationStream::paced(&self.narration, delay)
    }
}

pub struct Analyser<C, M> {
    classifier: C,
    chat: M,
}

impl<C: SentimentClassifier, M: ChatModel> Analyser<C, M> {
    pub fn new(classifier: C, chat: M) -> Self {
        Self { classifier, chat }
    }

    pub async fn run(
        &self,
        request: &AnalysisRequest,
        history: &ConversationHistory,
        progress: impl FnMut(Progress),
    ) -> Result<AnalysisReport> {
        match request {
            AnalysisRequest::Text(text) => self.analyse_text(text, history, progress).await,
            AnalysisRequest::Table { table, column } => {
                self.analyse_table(table, column, history, progress).await
            }
        }
    }

    /// Scores one text, ranks the labels, and narrates the ranking.
    /// Blank input falls back to [`PLACEHOLDER_TEXT`].
    pub async fn analyse_text(
        &self,
        text: &str,
        history: &ConversationHistory,
        mut progress: impl FnMut(Progress),
    ) -> Result<AnalysisReport> {
        let input = if text.trim().is_empty() {
            PLACEHOLDER_TEXT
        } else {
            text
        };

        simulated_ticks().for_each(&mut progress);
        let ranked = self.classifier.classify(input)?.ranked();
        info!(top = %ranked.top(), "single text classified");

        let chart = BarChart::from_ranked(&ranked);
        let prompt = prompt::single_text_prompt(input, &ranked);
        let narration = self.narrate(&prompt, history).await?;

        Ok(AnalysisReport {
            outcome: AnalysisOutcome::Text {
                input: input.to_string(),
                ranked,
            },
            chart,
            prompt,
            greeting: greeting_of(history),
            narration,
        })
    }

    /// Labels every cell of `column`, tallies the labels, and narrates the
    /// tally.
    pub async fn analyse_table(
        &self,
        table: &UploadedTable,
        column: &str,
        history: &ConversationHistory,
        progress: impl FnMut(Progress),
    ) -> Result<AnalysisReport> {
        let bulk = self.classify_table(table, column, progress)?;
        info!(rows = bulk.rows().len(), counts = %bulk.counts().summary(), "table classified");

        let chart = BarChart::from_counts(bulk.counts());
        let prompt = prompt::bulk_prompt(&bulk);
        let narration = self.narrate(&prompt, history).await?;

        Ok(AnalysisReport {
            outcome: AnalysisOutcome::Table(bulk),
            chart,
            prompt,
            greeting: greeting_of(history),
            narration,
        })
    }

    /// Assigns the arg-max label to every cell. Each distinct text is
    /// classified once.
    pub fn classify_table(
        &self,
        table: &UploadedTable,
        column: &str,
        mut progress: impl FnMut(Progress),
    ) -> Result<BulkTable> {
        let cells = table.column(column)?;
        let mut labels: HashMap<&str, SentimentLabel> = HashMap::new();
        let mut rows = Vec::with_capacity(cells.len());

        for (index, text) in cells.iter().copied().enumerate() {
            let label = match labels.get(text) {
                Some(label) => *label,
                None => {
                    let label = self.classifier.classify(text)?.top();
                    debug!(row = index, %label, "row classified");
                    labels.insert(text, label);
                    label
                }
            };
            rows.push(BulkRow {
                text: text.to_string(),
                label,
            });
            progress(row_progress(index, cells.len()));
        }

        Ok(BulkTable::new(table.clone(), column, rows))
    }

    async fn narrate(&self, prompt: &str, history: &ConversationHistory) -> Result<String> {
        let mut session = self.chat.start_session(history);
        session.send(prompt).await
    }
}

fn greeting_of(history: &ConversationHistory) -> String {
    history.greeting().unwrap_or(GREETING).to_string()
}
