use std::fmt::Display;

use super::table::BulkTable;
use crate::pipelines::sentiment_analysis_pipeline::RankedResult;

fn bracketed<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    let joined = items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

/// Narration request for one text and its ranked scores.
pub fn single_text_prompt(input_text: &str, ranked: &RankedResult) -> String {
    let labels = bracketed(ranked.labels());
    let scores = bracketed(ranked.scores());
    format!(
        "You are an AI assistant built to analyse sentiments in text. You are provided with the \
         following input text by the user and the corresponding sentiment scores in the order \
         {labels}. Give a detailed, understandable, not too long explanation of why the scores \
         are matched like that.\n\nInput text:\n\n{input_text}\n\nSentiment scores: {scores}"
    )
}

/// Narration request for a bulk run: every label, the tally, and the inputs.
pub fn bulk_prompt(table: &BulkTable) -> String {
    let labels = bracketed(table.labels());
    let counts = table.counts().summary();
    let texts = bracketed(table.texts().map(|t| format!("'{t}'")));
    format!(
        "You are an AI assistant built to analyse sentiments in text. You are provided with the \
         following input texts by the user from an uploaded csv file, and the following \
         sentiments were deduced: {labels}. Based on this, the number of times each sentiment \
         occurs is: {counts}. Provide a detailed, understandable, not too long explanation of why \
         certain sentiment types appear to be more dominant than the others. Focus your \
         explanation on all the sentiment types.\n\nInput text: {texts}"
    )
}
