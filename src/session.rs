//! Session state machine.
//!
//! One `Session` record tracks a single run through the pipeline. All of a
//! run's transient data lives here and is discarded wholesale when a new
//! upload starts; there are no ambient globals and no resumption of a
//! failed run.

use crate::analysis::AnalysisResult;
use crate::error::ReferatError;
use crate::meeting::MeetingType;
use crate::transcription::Transcript;
use serde::Serialize;
use tracing::debug;

/// Pipeline stages a run moves through.
///
/// `Ready` is terminal-success; `Failed` is terminal and reachable from any
/// in-flight stage. `Notifying` is a post-success excursion that always
/// returns to `Ready` — a failed delivery never invalidates the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Validating,
    Extracting,
    Transcribing,
    Summarizing,
    Ready,
    Notifying,
    Failed,
}

impl Stage {
    /// Whether the pipeline may move from `self` to `next`.
    ///
    /// Extraction and transcription are optional hops: a text upload goes
    /// straight from validation to summarizing, an audio upload skips
    /// extraction.
    pub fn can_transition_to(self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Extracting)
                | (Validating, Transcribing)
                | (Validating, Summarizing)
                | (Extracting, Transcribing)
                | (Transcribing, Summarizing)
                | (Summarizing, Ready)
                | (Ready, Notifying)
                | (Notifying, Ready)
                | (Validating, Failed)
                | (Extracting, Failed)
                | (Transcribing, Failed)
                | (Summarizing, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Ready | Stage::Failed)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// State for a single run.
#[derive(Debug, Clone)]
pub struct Session {
    stage: Stage,
    meeting_type: MeetingType,
    pub transcript: Option<Transcript>,
    pub analysis: Option<AnalysisResult>,
    error: Option<String>,
    user_error: Option<String>,
    client_fault: bool,
    delivery_error: Option<String>,
}

impl Session {
    /// Start a fresh session in `Idle`.
    pub fn new(meeting_type: MeetingType) -> Self {
        Self {
            stage: Stage::Idle,
            meeting_type,
            transcript: None,
            analysis: None,
            error: None,
            user_error: None,
            client_fault: false,
            delivery_error: None,
        }
    }

    /// Discard everything from the prior run and start over.
    pub fn reset(&mut self, meeting_type: MeetingType) {
        *self = Session::new(meeting_type);
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn meeting_type(&self) -> MeetingType {
        self.meeting_type
    }

    pub fn is_ready(&self) -> bool {
        self.stage == Stage::Ready
    }

    /// The fatal error that moved this session to `Failed`, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Short human-readable message for the failure, mapped from its kind.
    pub fn user_error(&self) -> Option<&str> {
        self.user_error.as_deref()
    }

    /// Whether the recorded failure was the uploader's fault (bad file)
    /// rather than a service problem.
    pub fn failed_on_client_fault(&self) -> bool {
        self.client_fault
    }

    /// The last delivery failure, if any. The session stays `Ready`.
    pub fn delivery_error(&self) -> Option<&str> {
        self.delivery_error.as_deref()
    }

    /// Advance to the next stage, enforcing the transition table.
    pub fn advance(&mut self, next: Stage) -> crate::error::Result<()> {
        if !self.stage.can_transition_to(next) {
            return Err(ReferatError::InvalidInput(format!(
                "Illegal stage transition: {} -> {}",
                self.stage, next
            )));
        }
        debug!("Stage {} -> {}", self.stage, next);
        self.stage = next;
        Ok(())
    }

    /// Record a failure.
    ///
    /// A non-fatal delivery error returns the session to `Ready` with the
    /// error noted; anything else moves to terminal `Failed` and aborts the
    /// remaining stages.
    pub fn fail(&mut self, err: &ReferatError) {
        self.fail_with_user_message(err, err.to_string());
    }

    /// Record a failure along with the message the user should see.
    pub fn fail_with_user_message(&mut self, err: &ReferatError, user_message: String) {
        if err.is_non_fatal() && matches!(self.stage, Stage::Ready | Stage::Notifying) {
            self.delivery_error = Some(err.to_string());
            self.stage = Stage::Ready;
        } else {
            self.error = Some(err.to_string());
            self.user_error = Some(user_message);
            self.client_fault = err.is_client_fault();
            self.stage = Stage::Failed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut session = Session::new(MeetingType::Standup);
        for next in [
            Stage::Validating,
            Stage::Extracting,
            Stage::Transcribing,
            Stage::Summarizing,
            Stage::Ready,
        ] {
            session.advance(next).unwrap();
        }
        assert!(session.is_ready());
        assert!(session.stage().is_terminal());
        assert!(session.error().is_none());
    }

    #[test]
    fn test_text_upload_skips_media_stages() {
        let mut session = Session::new(MeetingType::General);
        session.advance(Stage::Validating).unwrap();
        session.advance(Stage::Summarizing).unwrap();
        session.advance(Stage::Ready).unwrap();
        assert!(session.is_ready());
    }

    #[test]
    fn test_illegal_transition_rejected() {
        let mut session = Session::new(MeetingType::General);
        assert!(session.advance(Stage::Summarizing).is_err());
        assert_eq!(session.stage(), Stage::Idle);
    }

    #[test]
    fn test_stage_failure_is_terminal() {
        let mut session = Session::new(MeetingType::General);
        session.advance(Stage::Validating).unwrap();
        session.advance(Stage::Transcribing).unwrap();
        session.fail(&ReferatError::EmptyTranscript);

        assert_eq!(session.stage(), Stage::Failed);
        assert!(session.error().unwrap().contains("speech"));
        // No onward transition out of Failed
        assert!(session.advance(Stage::Summarizing).is_err());
    }

    #[test]
    fn test_delivery_failure_keeps_session_ready() {
        let mut session = Session::new(MeetingType::Standup);
        session.advance(Stage::Validating).unwrap();
        session.advance(Stage::Summarizing).unwrap();
        session.advance(Stage::Ready).unwrap();
        session.advance(Stage::Notifying).unwrap();
        session.fail(&ReferatError::DeliveryFailed("HTTP 500".into()));

        assert!(session.is_ready());
        assert!(session.error().is_none());
        assert!(session.delivery_error().unwrap().contains("HTTP 500"));
    }

    #[test]
    fn test_reset_discards_prior_run() {
        let mut session = Session::new(MeetingType::Planning);
        session.advance(Stage::Validating).unwrap();
        session.fail(&ReferatError::EmptyFile);
        assert_eq!(session.stage(), Stage::Failed);

        session.reset(MeetingType::Standup);
        assert_eq!(session.stage(), Stage::Idle);
        assert_eq!(session.meeting_type(), MeetingType::Standup);
        assert!(session.error().is_none());
        assert!(session.transcript.is_none());
    }
}
