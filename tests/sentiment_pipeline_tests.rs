// Downloads the multilingual DistilBERT student from the Hugging Face hub.
// Run with `--ignored` when network access is available.

use sentiment_narrator::pipelines::sentiment_analysis_pipeline::*;
use sentiment_narrator::pipelines::utils::DeviceSelectable;

#[tokio::test]
#[ignore]
async fn probabilities_cover_three_labels() -> anyhow::Result<()> {
    let pipeline = SentimentAnalysisPipelineBuilder::distilbert()
        .cpu()
        .build()
        .await?;
    assert_eq!(pipeline.labels().len(), 3);
    assert!(pipeline.device().is_cpu());

    let scores = pipeline.classify("I love this")?;
    assert_eq!(scores.iter().count(), 3);
    assert!((scores.total() - 1.0).abs() < 1e-3);
    assert_eq!(scores.top(), SentimentLabel::Positive);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn cached_model_is_shared_between_builds() -> anyhow::Result<()> {
    let first = SentimentAnalysisPipelineBuilder::distilbert().cpu().build().await?;
    let second = SentimentAnalysisPipelineBuilder::distilbert().cpu().build().await?;

    let a = first.classify("Das Essen war schrecklich")?;
    let b = second.classify("Das Essen war schrecklich")?;
    assert_eq!(a, b);
    Ok(())
}
