//! Incremental presentation of already complete text.
//!
//! The narration arrives from the chat service in one piece; these helpers
//! reveal it word by word and produce the cosmetic progress ticks shown
//! while the classifier runs.

use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// Splits `text` on single spaces, yielding each segment followed by one
/// trailing space.
///
/// Concatenating the chunks gives back `text` with one extra space at the end.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(' ').map(|word| format!("{word} "))
}

pin_project! {
    /// Finite, single-use stream of word chunks with optional pacing.
    pub struct NarrationStream {
        #[pin]
        inner: BoxStream<'static, String>,
    }
}

impl NarrationStream {
    /// Chunks of `text`, available immediately.
    pub fn new(text: &str) -> Self {
        Self::paced(text, Duration::ZERO)
    }

    /// Chunks of `text`, each released `delay` after the previous one.
    pub fn paced(text: &str, delay: Duration) -> Self {
        let chunks: Vec<String> = words(text).collect();
        let inner = if delay.is_zero() {
            stream::iter(chunks).boxed()
        } else {
            stream::iter(chunks)
                .then(move |chunk| async move {
                    tokio::time::sleep(delay).await;
                    chunk
                })
                .boxed()
        };
        Self { inner }
    }

    /// Get the next chunk; `None` once the text is exhausted.
    pub async fn next(&mut self) -> Option<String> {
        self.inner.next().await
    }

    /// Drain the remaining chunks into one `String`.
    pub async fn collect(mut self) -> String {
        let mut out = String::new();
        while let Some(chunk) = self.inner.next().await {
            out.push_str(&chunk);
        }
        out
    }
}

impl Stream for NarrationStream {
    type Item = String;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}

/// One step of the classify-phase progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub percent: u8,
}

impl Progress {
    pub const LABEL: &'static str = "Analysing ....";

    pub fn complete() -> Self {
        Self { percent: 100 }
    }
}

/// Fixed ticks from 1% to 100% for single-text mode, where there is no real
/// work to measure.
pub fn simulated_ticks() -> impl Iterator<Item = Progress> {
    (1..=100u8).map(|percent| Progress { percent })
}

/// Progress after finishing row `index` (zero based) of `rows`.
pub fn row_progress(index: usize, rows: usize) -> Progress {
    let percent = if rows <= 1 {
        100
    } else {
        (index.min(rows - 1) * 100 / (rows - 1)) as u8
    };
    Progress { percent }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_word_gets_one_trailing_space() {
        let chunks: Vec<String> = words("I love this").collect();
        assert_eq!(chunks, vec!["I ", "love ", "this "]);
    }

    #[test]
    fn newlines_stay_inside_chunks() {
        let chunks: Vec<String> = words("Bot...\nRead below.").collect();
        assert_eq!(chunks, vec!["Bot...\nRead ", "below. "]);
    }

    #[tokio::test]
    async fn stream_concatenates_back_to_text() {
        let text = "Mostly positive with a hint of doubt";
        let collected = NarrationStream::new(text).collect().await;
        assert_eq!(collected, format!("{text} "));
    }

    #[tokio::test]
    async fn paced_stream_yields_every_chunk() {
        let mut stream = NarrationStream::paced("one two three", Duration::from_millis(1));
        let mut count = 0;
        while let Some(chunk) = stream.next().await {
            assert!(chunk.ends_with(' '));
            count += 1;
        }
        assert_eq!(count, 3);
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn simulated_ticks_run_to_completion() {
        let ticks: Vec<u8> = simulated_ticks().map(|p| p.percent).collect();
        assert_eq!(ticks.len(), 100);
        assert_eq!(ticks.first(), Some(&1));
        assert_eq!(ticks.last(), Some(&100));
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn row_progress_spans_zero_to_hundred() {
        assert_eq!(row_progress(0, 5).percent, 0);
        assert_eq!(row_progress(2, 5).percent, 50);
        assert_eq!(row_progress(4, 5).percent, 100);
        assert_eq!(row_progress(0, 1), Progress::complete());
    }
}
