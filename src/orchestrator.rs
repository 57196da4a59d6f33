//! Request orchestration.
//!
//! Composes the URL resolver, transcript source, prompt builder, inference
//! client and session store into the single ask operation each request runs.
//! The orchestrator holds no state of its own.

use crate::config::{Prompts, Settings};
use crate::error::{Result, SvarError};
use crate::inference::{AnswerModel, OpenAiModel};
use crate::prompt::build_grounded_prompt;
use crate::session::{Session, SessionStore};
use crate::transcript::{TimedTextSource, TranscriptSource};
use crate::video_url::resolve_video_id;
use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// A successful answer for one question.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The model's answer text, verbatim.
    pub answer: String,
    /// The session identifier, echoed back for follow-ups.
    pub session_id: String,
    /// The resolved video identifier.
    pub video_id: String,
}

/// Composes the question-answering pipeline.
pub struct Orchestrator {
    transcripts: Arc<dyn TranscriptSource>,
    model: Arc<dyn AnswerModel>,
    sessions: Arc<SessionStore>,
    prompts: Prompts,
}

impl Orchestrator {
    /// Create an orchestrator with production components from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let transcripts = Arc::new(TimedTextSource::new(
            &settings.transcript.language,
            Duration::from_secs(settings.transcript.request_timeout_seconds),
        ));

        let model = Arc::new(OpenAiModel::new(
            &settings.inference.model,
            settings.inference.max_tokens,
            Duration::from_secs(settings.inference.request_timeout_seconds),
        ));

        let sessions = Arc::new(SessionStore::new(
            settings.session.max_history_entries,
            ChronoDuration::minutes(settings.session.idle_timeout_minutes),
        ));

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        Ok(Self {
            transcripts,
            model,
            sessions,
            prompts,
        })
    }

    /// Create an orchestrator from explicit components.
    pub fn with_components(
        transcripts: Arc<dyn TranscriptSource>,
        model: Arc<dyn AnswerModel>,
        sessions: Arc<SessionStore>,
        prompts: Prompts,
    ) -> Self {
        Self {
            transcripts,
            model,
            sessions,
            prompts,
        }
    }

    /// The session store, shared with the caller (e.g. for idle sweeps).
    pub fn sessions(&self) -> Arc<SessionStore> {
        self.sessions.clone()
    }

    /// Answer one question about a video within a session.
    ///
    /// The transcript is fetched once per session, on the first question.
    /// A fetch failure leaves no session behind, so the next question
    /// retries the fetch.
    #[instrument(skip(self, url, question), fields(session_id = %session_id))]
    pub async fn ask(&self, url: &str, question: &str, session_id: &str) -> Result<Answer> {
        if url.trim().is_empty() || question.trim().is_empty() {
            return Err(SvarError::Validation(
                "Both a video URL and a question are required".to_string(),
            ));
        }
        if session_id.trim().is_empty() {
            return Err(SvarError::Validation(
                "A session identifier is required".to_string(),
            ));
        }

        let video_id = resolve_video_id(url)?;

        let handle = match self.sessions.get(session_id) {
            Some(handle) => handle,
            None => {
                info!("New session, fetching transcript for {}", video_id);
                let transcript = self.transcripts.fetch(&video_id).await?;
                self.sessions.insert(
                    session_id,
                    Session::new(video_id.clone(), transcript.formatted),
                )
            }
        };

        // Hold the session lock for the whole exchange so concurrent
        // questions on one session cannot interleave history updates.
        let mut session = handle.state.lock().await;

        let prompt = build_grounded_prompt(
            question,
            &session.transcript,
            &session.video_id,
            &session.history,
            &self.prompts,
        );

        let answer = self.model.complete(&prompt.system, &prompt.messages).await?;

        session.push_exchange(question, &answer, self.sessions.max_history());
        debug!(
            "Session {} history at {} entries",
            session_id,
            session.history.len()
        );

        Ok(Answer {
            answer,
            session_id: session_id.to_string(),
            video_id: session.video_id.clone(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::session::ChatTurn;
    use crate::transcript::{Transcript, TranscriptSegment};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transcript source returning a canned transcript and counting fetches.
    pub struct StubTranscripts {
        pub segments: Vec<TranscriptSegment>,
        pub fetches: AtomicUsize,
        pub fail_with: Option<fn() -> SvarError>,
    }

    impl StubTranscripts {
        pub fn with_segments(segments: Vec<TranscriptSegment>) -> Self {
            Self {
                segments,
                fetches: AtomicUsize::new(0),
                fail_with: None,
            }
        }

        pub fn failing(fail_with: fn() -> SvarError) -> Self {
            Self {
                segments: Vec::new(),
                fetches: AtomicUsize::new(0),
                fail_with: Some(fail_with),
            }
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranscriptSource for StubTranscripts {
        async fn fetch(&self, video_id: &str) -> Result<Transcript> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            Ok(Transcript::new(video_id.to_string(), self.segments.clone()))
        }
    }

    /// Model echoing a fixed answer and recording the last prompt.
    pub struct StubModel {
        pub answer: String,
        pub last_system: std::sync::Mutex<String>,
        pub last_turns: std::sync::Mutex<Vec<ChatTurn>>,
    }

    impl StubModel {
        pub fn answering(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                last_system: std::sync::Mutex::new(String::new()),
                last_turns: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AnswerModel for StubModel {
        async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
            *self.last_system.lock().unwrap() = system.to_string();
            *self.last_turns.lock().unwrap() = turns.to_vec();
            Ok(self.answer.clone())
        }
    }

    pub fn orchestrator_with(
        transcripts: Arc<StubTranscripts>,
        model: Arc<StubModel>,
    ) -> Orchestrator {
        Orchestrator::with_components(
            transcripts,
            model,
            Arc::new(SessionStore::new(10, ChronoDuration::minutes(60))),
            Prompts::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::session::Role;
    use crate::transcript::TranscriptSegment;

    fn hello_world_transcripts() -> Arc<StubTranscripts> {
        Arc::new(StubTranscripts::with_segments(vec![
            TranscriptSegment::new(0.0, 2.0, "Hello world".to_string()),
        ]))
    }

    #[tokio::test]
    async fn test_end_to_end_ask() {
        let transcripts = hello_world_transcripts();
        let model = Arc::new(StubModel::answering("It opens with a greeting."));
        let orchestrator = orchestrator_with(transcripts.clone(), model.clone());

        let answer = orchestrator
            .ask(
                "https://youtu.be/abc123",
                "What is discussed at the start?",
                "fresh-session",
            )
            .await
            .unwrap();

        assert_eq!(answer.answer, "It opens with a greeting.");
        assert_eq!(answer.session_id, "fresh-session");
        assert_eq!(answer.video_id, "abc123");
        assert_eq!(transcripts.fetch_count(), 1);

        // The prompt embedded the formatted transcript and the question
        assert!(model
            .last_system
            .lock()
            .unwrap()
            .contains("[00:00] Hello world"));
        let turns = model.last_turns.lock().unwrap();
        assert_eq!(turns.last().unwrap().content, "What is discussed at the start?");
    }

    #[tokio::test]
    async fn test_transcript_fetched_once_per_session() {
        let transcripts = hello_world_transcripts();
        let model = Arc::new(StubModel::answering("ok"));
        let orchestrator = orchestrator_with(transcripts.clone(), model);

        let url = "https://youtu.be/abc123";
        orchestrator.ask(url, "first?", "s1").await.unwrap();
        orchestrator.ask(url, "second?", "s1").await.unwrap();
        assert_eq!(transcripts.fetch_count(), 1);

        // A different session fetches again
        orchestrator.ask(url, "third?", "s2").await.unwrap();
        assert_eq!(transcripts.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_history_grows_and_trims() {
        let transcripts = hello_world_transcripts();
        let model = Arc::new(StubModel::answering("answer"));
        let orchestrator = orchestrator_with(transcripts, model.clone());

        for i in 1..=6 {
            orchestrator
                .ask("https://youtu.be/abc123", &format!("q{}", i), "s1")
                .await
                .unwrap();
        }

        let handle = orchestrator.sessions().get("s1").unwrap();
        let session = handle.state.lock().await;
        assert_eq!(session.history.len(), 10);
        assert_eq!(session.history[0].content, "q2");
        assert_eq!(session.history[0].role, Role::User);

        // The 6th request saw the 5 prior exchanges plus its own question
        assert_eq!(model.last_turns.lock().unwrap().len(), 11);
    }

    #[tokio::test]
    async fn test_no_transcript_creates_no_session() {
        let transcripts = Arc::new(StubTranscripts::failing(|| SvarError::NoTranscript));
        let model = Arc::new(StubModel::answering("unused"));
        let orchestrator = orchestrator_with(transcripts.clone(), model);

        let err = orchestrator
            .ask("https://youtu.be/abc123", "anything?", "s1")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "No transcript available for this video.");
        assert!(orchestrator.sessions().is_empty());

        // Next question retries the fetch
        let _ = orchestrator
            .ask("https://youtu.be/abc123", "again?", "s1")
            .await;
        assert_eq!(transcripts.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_inference_failure_leaves_history_untouched() {
        struct FailingModel;

        #[async_trait::async_trait]
        impl AnswerModel for FailingModel {
            async fn complete(
                &self,
                _system: &str,
                _turns: &[crate::session::ChatTurn],
            ) -> Result<String> {
                Err(SvarError::Inference("quota exceeded".to_string()))
            }
        }

        let orchestrator = Orchestrator::with_components(
            hello_world_transcripts(),
            Arc::new(FailingModel),
            Arc::new(SessionStore::new(10, ChronoDuration::minutes(60))),
            Prompts::default(),
        );

        let err = orchestrator
            .ask("https://youtu.be/abc123", "anything?", "s1")
            .await
            .unwrap_err();
        assert!(matches!(err, SvarError::Inference(_)));

        // The session exists (transcript was fetched) but no partial exchange
        let handle = orchestrator.sessions().get("s1").unwrap();
        assert!(handle.state.lock().await.history.is_empty());
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let orchestrator =
            orchestrator_with(hello_world_transcripts(), Arc::new(StubModel::answering("x")));

        assert!(matches!(
            orchestrator.ask("", "question?", "s1").await,
            Err(SvarError::Validation(_))
        ));
        assert!(matches!(
            orchestrator.ask("https://youtu.be/abc123", "  ", "s1").await,
            Err(SvarError::Validation(_))
        ));
        assert!(matches!(
            orchestrator.ask("https://youtu.be/abc123", "q?", "").await,
            Err(SvarError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_propagates() {
        let orchestrator =
            orchestrator_with(hello_world_transcripts(), Arc::new(StubModel::answering("x")));

        assert!(matches!(
            orchestrator.ask("https://vimeo.com/123", "q?", "s1").await,
            Err(SvarError::InvalidUrl(_))
        ));
    }
}
