use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use sentiment_narrator::analysis::{AnalysisOutcome, AnalysisReport, Analyser};
use sentiment_narrator::pipelines::sentiment_analysis_pipeline::SentimentAnalysisPipelineBuilder;
use sentiment_narrator::pipelines::utils::DeviceSelectable;
use sentiment_narrator::streaming::Progress;
use sentiment_narrator::{ChatConfig, Command, GeminiChatModel, InputMode, Session, UiEvent};

const CHART_WIDTH: usize = 40;

#[derive(Parser)]
#[command(name = "sentiment-narrator", version, about = "Sentiment analysis with narrated results")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Run the classifier on CPU even when CUDA is available.
    #[arg(long, global = true)]
    cpu: bool,

    /// Pause between narrated words, in milliseconds.
    #[arg(long, global = true, default_value_t = 100)]
    delay_ms: u64,

    /// Also write the chart as a Vega-Lite spec to this path.
    #[arg(long, global = true)]
    chart_json: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Mode {
    /// Analyse a single text.
    Text {
        /// Text to analyse; the placeholder paragraph when omitted.
        text: Option<String>,
    },
    /// Analyse one column of a CSV file.
    Csv {
        /// CSV file with a header row.
        file: Option<PathBuf>,

        /// Column to analyse; the first column when omitted.
        #[arg(long)]
        column: Option<String>,

        /// Write the upload with a sentiment_class column added to this CSV.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn events_for(mode: &Mode) -> anyhow::Result<Vec<UiEvent>> {
    let mut events = Vec::new();
    match mode {
        Mode::Text { text } => {
            events.push(UiEvent::ModeSelected(InputMode::SingleText));
            if let Some(text) = text {
                events.push(UiEvent::TextEdited(text.clone()));
            }
        }
        Mode::Csv { file, column, .. } => {
            events.push(UiEvent::ModeSelected(InputMode::BulkCsv));
            if let Some(path) = file {
                events.push(UiEvent::FileUploaded {
                    name: path.display().to_string(),
                    contents: std::fs::read(path)?,
                });
                if let Some(column) = column {
                    events.push(UiEvent::ColumnSelected(column.clone()));
                }
            }
        }
    }
    events.push(UiEvent::AnalyseClicked);
    Ok(events)
}

fn show_progress(progress: Progress) {
    eprint!("\r{} {:>3}%", Progress::LABEL, progress.percent);
    if progress.percent >= 100 {
        eprintln!();
    }
}

async fn present(report: &AnalysisReport, delay: Duration) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();

    writeln!(stdout, "\n== ANALYSIS ==\n")?;
    write!(stdout, "{}", report.chart.render_text(CHART_WIDTH))?;
    if let AnalysisOutcome::Table(table) = &report.outcome {
        writeln!(stdout, "\n{} ({})", table.source().name(), table.column())?;
        for row in table.rows() {
            writeln!(stdout, "{:<10} {}", row.label, row.text)?;
        }
    }

    writeln!(stdout, "\n== SUMMARY ==\n")?;
    for mut stream in [
        report.greeting_stream(delay),
        report.narration_stream(delay),
    ] {
        while let Some(chunk) = stream.next().await {
            write!(stdout, "{chunk}")?;
            stdout.flush()?;
        }
        writeln!(stdout, "\n")?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let chat_config = ChatConfig::from_env()?;

    let mut session = Session::new();
    let mut command = Command::Idle;
    for event in events_for(&cli.mode)? {
        command = session.handle(event)?;
    }

    let request = match command {
        Command::Analyse(request) => request,
        Command::Notice(notice) => {
            eprintln!("{notice}");
            return Ok(());
        }
        Command::Idle => return Ok(()),
    };

    let mut builder = SentimentAnalysisPipelineBuilder::distilbert();
    if cli.cpu {
        builder = builder.cpu();
    }
    let classifier = builder.build().await?;
    tracing::info!(
        device = ?classifier.device().location(),
        labels = ?classifier.labels(),
        "sentiment classifier ready"
    );
    let chat = GeminiChatModel::new(chat_config)?;
    let analyser = Analyser::new(classifier, chat);

    let report = analyser
        .run(&request, session.history(), show_progress)
        .await?;

    if let Some(path) = &cli.chart_json {
        std::fs::write(path, serde_json::to_string_pretty(&report.chart.to_vega_lite())?)?;
        tracing::info!(path = %path.display(), "chart spec written");
    }
    if let (Mode::Csv { output: Some(path), .. }, AnalysisOutcome::Table(table)) =
        (&cli.mode, &report.outcome)
    {
        table.write_csv(std::fs::File::create(path)?)?;
        tracing::info!(path = %path.display(), "labelled table written");
    }

    present(&report, Duration::from_millis(cli.delay_ms)).await
}
