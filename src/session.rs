//! Per-user interaction state driven by named UI events.
//!
//! A front end feeds [`UiEvent`]s into [`Session::handle`] and acts on the
//! returned [`Command`]: nothing to do, a notice to display, or an
//! [`AnalysisRequest`] to hand to the [`Analyser`](crate::analysis::Analyser).

use crate::analysis::{AnalysisRequest, UploadedTable, PLACEHOLDER_TEXT};
use crate::core::{AnalyserError, ConversationHistory, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    SingleText,
    BulkCsv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ModeSelected(InputMode),
    TextEdited(String),
    FileUploaded { name: String, contents: Vec<u8> },
    FileCleared,
    ColumnSelected(String),
    AnalyseClicked,
}

/// Inline messages shown instead of running an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    UploadRequired,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::UploadRequired => "Upload CSV file containing data to analyse",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Idle,
    Notice(Notice),
    Analyse(AnalysisRequest),
}

#[derive(Debug, Clone)]
pub struct Session {
    mode: InputMode,
    text: String,
    table: Option<UploadedTable>,
    column: Option<String>,
    history: ConversationHistory,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            mode: InputMode::default(),
            text: PLACEHOLDER_TEXT.to_string(),
            table: None,
            column: None,
            history: ConversationHistory::seeded(),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn table(&self) -> Option<&UploadedTable> {
        self.table.as_ref()
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Read-only seed for every narration; runs never append to it.
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Notice the page shows without any event: bulk mode with no upload.
    pub fn standing_notice(&self) -> Option<Notice> {
        (self.mode == InputMode::BulkCsv && self.table.is_none()).then_some(Notice::UploadRequired)
    }

    pub fn handle(&mut self, event: UiEvent) -> Result<Command> {
        match event {
            UiEvent::ModeSelected(mode) => {
                self.mode = mode;
            }
            UiEvent::TextEdited(text) => {
                self.text = text;
            }
            UiEvent::FileUploaded { name, contents } => {
                let table = UploadedTable::from_bytes(name, &contents)?;
                self.column = table.headers().first().cloned();
                self.table = Some(table);
            }
            UiEvent::FileCleared => {
                self.table = None;
                self.column = None;
            }
            UiEvent::ColumnSelected(column) => {
                let table = self.table.as_ref().ok_or(AnalyserError::MissingUpload)?;
                if !table.has_column(&column) {
                    return Err(AnalyserError::UnknownColumn(column));
                }
                self.column = Some(column);
            }
            UiEvent::AnalyseClicked => return Ok(self.analyse_command()),
        }
        Ok(Command::Idle)
    }

    fn analyse_command(&self) -> Command {
        match self.mode {
            InputMode::SingleText => Command::Analyse(AnalysisRequest::Text(self.text.clone())),
            InputMode::BulkCsv => match (&self.table, &self.column) {
                (Some(table), Some(column)) => Command::Analyse(AnalysisRequest::Table {
                    table: table.clone(),
                    column: column.clone(),
                }),
                _ => Command::Notice(Notice::UploadRequired),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(session: &mut Session) {
        session
            .handle(UiEvent::FileUploaded {
                name: "reviews.csv".into(),
                contents: b"id,review\n1,great!\n".to_vec(),
            })
            .unwrap();
    }

    #[test]
    fn new_session_starts_in_single_text_mode_with_placeholder() {
        let session = Session::new();
        assert_eq!(session.mode(), InputMode::SingleText);
        assert_eq!(session.text(), PLACEHOLDER_TEXT);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.standing_notice(), None);
    }

    #[test]
    fn analyse_in_single_mode_uses_current_text() {
        let mut session = Session::new();
        session
            .handle(UiEvent::TextEdited("I love this".into()))
            .unwrap();
        let command = session.handle(UiEvent::AnalyseClicked).unwrap();
        assert_eq!(
            command,
            Command::Analyse(AnalysisRequest::Text("I love this".into()))
        );
    }

    #[test]
    fn bulk_without_upload_shows_notice() {
        let mut session = Session::new();
        session
            .handle(UiEvent::ModeSelected(InputMode::BulkCsv))
            .unwrap();
        assert_eq!(session.standing_notice(), Some(Notice::UploadRequired));
        let command = session.handle(UiEvent::AnalyseClicked).unwrap();
        assert_eq!(command, Command::Notice(Notice::UploadRequired));
    }

    #[test]
    fn upload_selects_first_column() {
        let mut session = Session::new();
        session
            .handle(UiEvent::ModeSelected(InputMode::BulkCsv))
            .unwrap();
        upload(&mut session);
        assert_eq!(session.column(), Some("id"));

        session
            .handle(UiEvent::ColumnSelected("review".into()))
            .unwrap();
        match session.handle(UiEvent::AnalyseClicked).unwrap() {
            Command::Analyse(AnalysisRequest::Table { column, table }) => {
                assert_eq!(column, "review");
                assert_eq!(table.len(), 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn selecting_unknown_column_is_rejected() {
        let mut session = Session::new();
        upload(&mut session);
        let err = session
            .handle(UiEvent::ColumnSelected("comment".into()))
            .unwrap_err();
        assert!(matches!(err, AnalyserError::UnknownColumn(_)));
        assert_eq!(session.column(), Some("id"));
    }

    #[test]
    fn clearing_the_file_brings_the_notice_back() {
        let mut session = Session::new();
        session
            .handle(UiEvent::ModeSelected(InputMode::BulkCsv))
            .unwrap();
        upload(&mut session);
        session.handle(UiEvent::FileCleared).unwrap();
        assert_eq!(
            session.handle(UiEvent::AnalyseClicked).unwrap(),
            Command::Notice(Notice::UploadRequired)
        );
    }
}
