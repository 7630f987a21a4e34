use std::io;

use crate::client::history::{HistoryRepository, HistoryStore, ListOutcome};
use crate::client::search;

pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

const ALLOWED_MIME: [&str; 3] = ["audio/wav", "audio/mpeg", "audio/mp3"];

/// A selected audio file: the playable reference the UI keeps while the
/// relay call is in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFile {
    pub name: String,
    pub size: u64,
    pub mime: String,
}

/// The active transcript shown in the transcript pane. Superseded by
/// each new upload or history selection.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    pub filename: String,
    pub is_mock: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub content: String,
    pub sender: Sender,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Empty,
    FileSelected(AudioFile),
    Uploading(AudioFile),
    TranscriptReady,
    UploadFailed { error: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Transient banner shown above the upload area.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusBanner {
    pub message: String,
    pub kind: StatusKind,
}

/// Everything the UI can ask the controller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectFile(AudioFile),
    UploadStarted,
    TranscriptionSucceeded(TranscriptionResult),
    TranscriptionFailed { error: String },
    SelectHistoryEntry { id: i64 },
    ClearTranscript,
    SetSearchTerm(String),
    SendMessage(String),
    AssistantReplied(String),
    ChatFailed { error: String },
}

/// Relay calls the driver must perform on the controller's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Transcribe { file: AudioFile },
    Chat { message: String, context: Option<String> },
}

pub fn validate_audio_file(file: &AudioFile) -> Result<(), String> {
    let name = file.name.to_lowercase();
    let valid_type = ALLOWED_MIME.contains(&file.mime.as_str())
        || name.ends_with(".wav")
        || name.ends_with(".mp3");

    if !valid_type {
        return Err("Please select a .wav or .mp3 audio file".to_string());
    }
    if file.size > MAX_FILE_BYTES {
        return Err("File size must be less than 50MB".to_string());
    }
    Ok(())
}

/// Root controller owning all client state: the upload state machine,
/// the active transcript, the chat log, the history store, and the
/// search term. Persistence happens only as a side effect of history
/// mutation, through the injected repository.
pub struct AppController {
    upload: UploadState,
    audio: Option<AudioFile>,
    current_transcript: Option<TranscriptionResult>,
    history: HistoryStore,
    chat_log: Vec<ChatMessage>,
    chat_input_enabled: bool,
    chat_pending: bool,
    search_term: String,
    status: Option<StatusBanner>,
}

impl AppController {
    pub fn new(repo: Box<dyn HistoryRepository>) -> io::Result<Self> {
        let history = HistoryStore::open(repo)?;
        let chat_input_enabled = !history.is_empty();

        Ok(Self {
            upload: UploadState::Empty,
            audio: None,
            current_transcript: None,
            history,
            chat_log: Vec::new(),
            chat_input_enabled,
            chat_pending: false,
            search_term: String::new(),
            status: None,
        })
    }

    pub fn apply(&mut self, command: Command) -> io::Result<Option<Effect>> {
        match command {
            Command::SelectFile(file) => {
                if let Err(message) = validate_audio_file(&file) {
                    self.status = Some(StatusBanner {
                        message,
                        kind: StatusKind::Error,
                    });
                    return Ok(None);
                }

                self.audio = Some(file.clone());
                self.upload = UploadState::FileSelected(file.clone());
                self.status = Some(StatusBanner {
                    message: format!("Audio file loaded: {}", file.name),
                    kind: StatusKind::Success,
                });
                Ok(Some(Effect::Transcribe { file }))
            }

            Command::UploadStarted => {
                if let UploadState::FileSelected(file) = &self.upload {
                    self.upload = UploadState::Uploading(file.clone());
                }
                Ok(None)
            }

            Command::TranscriptionSucceeded(result) => {
                self.history.add(&result.filename, &result.text)?;
                self.status = Some(StatusBanner {
                    message: format!("Successfully transcribed: {}", result.filename),
                    kind: StatusKind::Success,
                });
                self.current_transcript = Some(result);
                self.upload = UploadState::TranscriptReady;
                self.chat_input_enabled = true;
                Ok(None)
            }

            Command::TranscriptionFailed { error } => {
                self.status = Some(StatusBanner {
                    message: format!("Error: {}", error),
                    kind: StatusKind::Error,
                });
                self.upload = UploadState::UploadFailed { error };
                Ok(None)
            }

            Command::SelectHistoryEntry { id } => {
                let Some(entry) = self.history.get(id) else {
                    return Ok(None);
                };

                self.current_transcript = Some(TranscriptionResult {
                    text: entry.transcript.clone(),
                    filename: entry.name.clone(),
                    is_mock: false,
                });
                self.status = Some(StatusBanner {
                    message: format!("Loaded: {}", entry.name),
                    kind: StatusKind::Success,
                });
                // Selection does not remove the entry and leaves the
                // chat log alone, so discussion continues across files.
                self.audio = None;
                self.upload = UploadState::TranscriptReady;
                self.chat_input_enabled = true;
                Ok(None)
            }

            Command::ClearTranscript => {
                self.current_transcript = None;
                self.audio = None;
                self.upload = UploadState::Empty;
                self.chat_input_enabled = false;
                self.status = None;
                // The chat log is intentionally kept.
                Ok(None)
            }

            Command::SetSearchTerm(term) => {
                self.search_term = term;
                Ok(None)
            }

            Command::SendMessage(message) => {
                let message = message.trim().to_string();
                if message.is_empty() || !self.chat_input_enabled || self.chat_pending {
                    return Ok(None);
                }

                // Optimistic append; send stays disabled until the
                // exchange completes.
                self.chat_log.push(ChatMessage {
                    content: message.clone(),
                    sender: Sender::User,
                });
                self.chat_pending = true;

                Ok(Some(Effect::Chat {
                    context: self.build_context(),
                    message,
                }))
            }

            Command::AssistantReplied(content) => {
                self.chat_log.push(ChatMessage {
                    content,
                    sender: Sender::Assistant,
                });
                self.chat_pending = false;
                Ok(None)
            }

            Command::ChatFailed { error } => {
                self.chat_log.push(ChatMessage {
                    content: format!("Sorry, there was an error: {}", error),
                    sender: Sender::Assistant,
                });
                self.chat_pending = false;
                Ok(None)
            }
        }
    }

    /// Context for the chat relay: every history entry, most recent
    /// first, falling back to the active transcript alone.
    pub fn build_context(&self) -> Option<String> {
        if !self.history.is_empty() {
            let joined = self
                .history
                .entries()
                .iter()
                .map(|e| format!("File: {}\n{}", e.name, e.transcript))
                .collect::<Vec<_>>()
                .join("\n\n");
            return Some(joined);
        }

        self.current_transcript.as_ref().map(|t| t.text.clone())
    }

    /// History list with the current search filter applied, so the view
    /// stays consistent with an active search after every mutation.
    pub fn visible_history(&self) -> ListOutcome<'_> {
        self.history.list(&self.search_term)
    }

    /// Active transcript with search highlighting applied.
    pub fn transcript_view(&self) -> Option<String> {
        self.current_transcript
            .as_ref()
            .map(|t| search::highlight(&t.text, &self.search_term))
    }

    pub fn chat_enabled(&self) -> bool {
        self.chat_input_enabled
    }

    pub fn chat_send_ready(&self) -> bool {
        self.chat_input_enabled && !self.chat_pending
    }

    pub fn chat_log(&self) -> &[ChatMessage] {
        &self.chat_log
    }

    pub fn upload_state(&self) -> &UploadState {
        &self.upload
    }

    pub fn audio(&self) -> Option<&AudioFile> {
        self.audio.as_ref()
    }

    pub fn current_transcript(&self) -> Option<&TranscriptionResult> {
        self.current_transcript.as_ref()
    }

    pub fn status(&self) -> Option<&StatusBanner> {
        self.status.as_ref()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::history::JsonFileRepository;

    fn controller() -> (AppController, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("history.json"));
        (AppController::new(Box::new(repo)).unwrap(), dir)
    }

    fn wav(name: &str, size: u64) -> AudioFile {
        AudioFile {
            name: name.to_string(),
            size,
            mime: "audio/wav".to_string(),
        }
    }

    fn transcribed(ctrl: &mut AppController, filename: &str, text: &str) {
        ctrl.apply(Command::TranscriptionSucceeded(TranscriptionResult {
            text: text.to_string(),
            filename: filename.to_string(),
            is_mock: false,
        }))
        .unwrap();
    }

    #[test]
    fn selecting_a_valid_file_triggers_transcription() {
        let (mut ctrl, _dir) = controller();

        let effect = ctrl
            .apply(Command::SelectFile(wav("meeting.wav", 2 * 1024 * 1024)))
            .unwrap();

        assert!(matches!(effect, Some(Effect::Transcribe { .. })));
        assert!(matches!(ctrl.upload_state(), UploadState::FileSelected(_)));
        assert!(ctrl.audio().is_some());
    }

    #[test]
    fn wrong_type_is_rejected_before_any_relay_call() {
        let (mut ctrl, _dir) = controller();

        let effect = ctrl
            .apply(Command::SelectFile(AudioFile {
                name: "notes.txt".to_string(),
                size: 100,
                mime: "text/plain".to_string(),
            }))
            .unwrap();

        assert_eq!(effect, None);
        assert_eq!(ctrl.upload_state(), &UploadState::Empty);
        let status = ctrl.status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.message.contains(".wav or .mp3"));
    }

    #[test]
    fn oversize_file_is_rejected_before_any_relay_call() {
        let (mut ctrl, _dir) = controller();

        let effect = ctrl
            .apply(Command::SelectFile(wav("big.wav", MAX_FILE_BYTES + 1)))
            .unwrap();

        assert_eq!(effect, None);
        assert!(ctrl.status().unwrap().message.contains("50MB"));
    }

    #[test]
    fn chat_stays_disabled_until_a_transcript_exists() {
        let (mut ctrl, _dir) = controller();

        assert!(!ctrl.chat_enabled());
        let effect = ctrl
            .apply(Command::SendMessage("hello?".to_string()))
            .unwrap();
        assert_eq!(effect, None);
        assert!(ctrl.chat_log().is_empty());

        transcribed(&mut ctrl, "meeting.mp3", "Hello world");
        assert!(ctrl.chat_enabled());
    }

    #[test]
    fn send_appends_optimistically_and_blocks_until_reply() {
        let (mut ctrl, _dir) = controller();
        transcribed(&mut ctrl, "meeting.mp3", "Hello world");

        let effect = ctrl
            .apply(Command::SendMessage("What was discussed?".to_string()))
            .unwrap();

        assert!(matches!(effect, Some(Effect::Chat { .. })));
        assert_eq!(ctrl.chat_log().len(), 1);
        assert_eq!(ctrl.chat_log()[0].sender, Sender::User);
        assert!(!ctrl.chat_send_ready());

        // A second send while pending is dropped.
        let effect = ctrl
            .apply(Command::SendMessage("Anything else?".to_string()))
            .unwrap();
        assert_eq!(effect, None);

        ctrl.apply(Command::AssistantReplied("The roadmap.".to_string()))
            .unwrap();
        assert_eq!(ctrl.chat_log().len(), 2);
        assert!(ctrl.chat_send_ready());
    }

    #[test]
    fn context_concatenates_all_history_entries() {
        let (mut ctrl, _dir) = controller();
        transcribed(&mut ctrl, "first.mp3", "one");
        transcribed(&mut ctrl, "meeting.mp3", "Hello world");

        let effect = ctrl
            .apply(Command::SendMessage("What was discussed?".to_string()))
            .unwrap();

        let Some(Effect::Chat { context, .. }) = effect else {
            panic!("expected a chat effect");
        };
        assert_eq!(
            context.unwrap(),
            "File: meeting.mp3\nHello world\n\nFile: first.mp3\none"
        );
    }

    #[test]
    fn chat_failure_appears_as_an_assistant_message() {
        let (mut ctrl, _dir) = controller();
        transcribed(&mut ctrl, "meeting.mp3", "Hello world");
        ctrl.apply(Command::SendMessage("hi".to_string())).unwrap();

        ctrl.apply(Command::ChatFailed {
            error: "Chat service error".to_string(),
        })
        .unwrap();

        let last = ctrl.chat_log().last().unwrap();
        assert_eq!(last.sender, Sender::Assistant);
        assert!(last.content.contains("Sorry, there was an error"));
        assert!(ctrl.chat_send_ready());
    }

    #[test]
    fn selecting_history_keeps_entry_and_chat_log() {
        let (mut ctrl, _dir) = controller();
        transcribed(&mut ctrl, "meeting.mp3", "Hello world");
        ctrl.apply(Command::SendMessage("hi".to_string())).unwrap();
        ctrl.apply(Command::AssistantReplied("hello".to_string()))
            .unwrap();

        let id = ctrl.history().entries()[0].id;
        ctrl.apply(Command::SelectHistoryEntry { id }).unwrap();

        assert_eq!(ctrl.current_transcript().unwrap().filename, "meeting.mp3");
        assert_eq!(ctrl.history().len(), 1);
        assert_eq!(ctrl.chat_log().len(), 2);
        assert!(ctrl.audio().is_none());
    }

    #[test]
    fn clear_resets_upload_but_keeps_chat_log() {
        let (mut ctrl, _dir) = controller();
        transcribed(&mut ctrl, "meeting.mp3", "Hello world");
        ctrl.apply(Command::SendMessage("hi".to_string())).unwrap();
        ctrl.apply(Command::AssistantReplied("hello".to_string()))
            .unwrap();

        ctrl.apply(Command::ClearTranscript).unwrap();

        assert_eq!(ctrl.upload_state(), &UploadState::Empty);
        assert!(ctrl.current_transcript().is_none());
        assert!(!ctrl.chat_enabled());
        assert_eq!(ctrl.chat_log().len(), 2);
    }

    #[test]
    fn upload_failure_keeps_the_file_for_retry() {
        let (mut ctrl, _dir) = controller();
        ctrl.apply(Command::SelectFile(wav("meeting.wav", 1024)))
            .unwrap();
        ctrl.apply(Command::UploadStarted).unwrap();

        ctrl.apply(Command::TranscriptionFailed {
            error: "Transcription failed".to_string(),
        })
        .unwrap();

        assert!(matches!(
            ctrl.upload_state(),
            UploadState::UploadFailed { .. }
        ));
        assert!(ctrl.audio().is_some());
        assert_eq!(ctrl.status().unwrap().kind, StatusKind::Error);
    }

    #[test]
    fn visible_history_reapplies_the_active_filter_after_adds() {
        let (mut ctrl, _dir) = controller();
        transcribed(&mut ctrl, "standup.mp3", "daily notes");
        ctrl.apply(Command::SetSearchTerm("meeting".to_string()))
            .unwrap();

        assert_eq!(ctrl.visible_history(), ListOutcome::NoMatches);

        transcribed(&mut ctrl, "meeting.mp3", "Hello world");
        match ctrl.visible_history() {
            ListOutcome::Entries(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].name, "meeting.mp3");
            }
            other => panic!("expected entries, got {:?}", other),
        }
    }

    #[test]
    fn transcript_view_is_highlighted_by_the_search_term() {
        let (mut ctrl, _dir) = controller();
        transcribed(&mut ctrl, "meeting.mp3", "Hello world");

        ctrl.apply(Command::SetSearchTerm("world".to_string()))
            .unwrap();
        let view = ctrl.transcript_view().unwrap();
        assert!(view.contains("search-highlight"));

        ctrl.apply(Command::SetSearchTerm(String::new())).unwrap();
        assert_eq!(ctrl.transcript_view().unwrap(), "Hello world");
    }

    #[test]
    fn chat_is_enabled_at_startup_when_history_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        {
            let repo = JsonFileRepository::new(&path);
            let mut ctrl = AppController::new(Box::new(repo)).unwrap();
            transcribed(&mut ctrl, "meeting.mp3", "Hello world");
        }

        let ctrl = AppController::new(Box::new(JsonFileRepository::new(&path))).unwrap();
        assert!(ctrl.chat_enabled());
        assert_eq!(ctrl.history().len(), 1);
    }
}
