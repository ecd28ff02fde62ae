//! Narration adapter over a speech synthesis backend.
//!
//! At most one utterance is ever active. A new `speak` cancels the in-flight
//! utterance before starting, and every utterance's [`Completion`] resolves:
//! finished, cancelled or failed. Failures are recorded on the narrator and
//! never surface to the caller as errors.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crossbeam::channel::{self, Receiver, Sender};
use tokio::sync::oneshot;

/// Error type for speech synthesis
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("Speech engine unavailable: {0}")]
    Unavailable(String),
    #[error("Speech synthesis error: {0}")]
    Synthesis(String),
    #[error("Voice error: {0}")]
    Voice(String),
}

/// Identifier the narrator assigns to each utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

/// How an utterance ended, as seen by the caller of [`Narrator::speak`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    Finished,
    Cancelled,
    /// Details are kept in [`Narrator::last_error`]
    Failed,
}

/// End-of-utterance report sent by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceEvent {
    pub id: UtteranceId,
    pub end: UtteranceEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceEnd {
    Finished,
    Failed(String),
}

/// Channel backends use to report utterance ends
pub type UtteranceSender = Sender<UtteranceEvent>;

/// A voice offered by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
}

/// Speech synthesis engine.
///
/// `start` must return promptly; the end of the utterance is reported on
/// `events`. Utterances cancelled through `cancel` need not be reported.
pub trait SpeechBackend {
    fn start(&mut self, id: UtteranceId, text: &str, events: UtteranceSender)
        -> Result<(), SpeechError>;

    fn cancel(&mut self, id: UtteranceId);

    fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }

    fn set_voice(&mut self, _voice: &VoiceInfo) -> Result<(), SpeechError> {
        Ok(())
    }

    /// Speaking rate relative to the engine's normal rate (1.0)
    fn set_rate(&mut self, _rate: f32) -> Result<(), SpeechError> {
        Ok(())
    }
}

impl<B: SpeechBackend + ?Sized> SpeechBackend for Box<B> {
    fn start(
        &mut self,
        id: UtteranceId,
        text: &str,
        events: UtteranceSender,
    ) -> Result<(), SpeechError> {
        (**self).start(id, text, events)
    }

    fn cancel(&mut self, id: UtteranceId) {
        (**self).cancel(id)
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        (**self).voices()
    }

    fn set_voice(&mut self, voice: &VoiceInfo) -> Result<(), SpeechError> {
        (**self).set_voice(voice)
    }

    fn set_rate(&mut self, rate: f32) -> Result<(), SpeechError> {
        (**self).set_rate(rate)
    }
}

/// Pick a voice by vendor preference.
///
/// Vendors are tried in order; for each, the first voice whose name contains
/// it wins. `None` means "keep the platform default".
pub fn select_voice<'a>(voices: &'a [VoiceInfo], preferred: &[String]) -> Option<&'a VoiceInfo> {
    preferred
        .iter()
        .find_map(|vendor| voices.iter().find(|voice| voice.name.contains(vendor.as_str())))
}

/// Completion signal for one utterance.
///
/// Can be polled from a frame loop with [`Completion::try_outcome`] or awaited.
/// If the narrator goes away first, it resolves as cancelled.
#[derive(Debug)]
pub struct Completion {
    id: UtteranceId,
    rx: oneshot::Receiver<SpeechOutcome>,
    resolved: Option<SpeechOutcome>,
}

impl Completion {
    pub fn id(&self) -> UtteranceId {
        self.id
    }

    /// Outcome if the utterance has ended, without blocking
    pub fn try_outcome(&mut self) -> Option<SpeechOutcome> {
        if self.resolved.is_none() {
            self.resolved = match self.rx.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(oneshot::error::TryRecvError::Empty) => None,
                Err(oneshot::error::TryRecvError::Closed) => Some(SpeechOutcome::Cancelled),
            };
        }
        self.resolved
    }
}

impl Future for Completion {
    type Output = SpeechOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(outcome) = this.resolved {
            return Poll::Ready(outcome);
        }
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(result) => {
                let outcome = result.unwrap_or(SpeechOutcome::Cancelled);
                this.resolved = Some(outcome);
                Poll::Ready(outcome)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Narrator state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarratorState {
    Idle,
    Speaking { id: UtteranceId },
}

struct Pending {
    id: UtteranceId,
    done: oneshot::Sender<SpeechOutcome>,
}

/// Serializing speech adapter owned by a playback controller
pub struct Narrator<B: SpeechBackend> {
    backend: B,
    events_tx: Sender<UtteranceEvent>,
    events_rx: Receiver<UtteranceEvent>,
    state: NarratorState,
    pending: Option<Pending>,
    next_id: u64,
    last_error: Option<SpeechError>,
}

impl<B: SpeechBackend> Narrator<B> {
    pub fn new(backend: B) -> Self {
        let (events_tx, events_rx) = channel::unbounded();

        Self {
            backend,
            events_tx,
            events_rx,
            state: NarratorState::Idle,
            pending: None,
            next_id: 1,
            last_error: None,
        }
    }

    /// Apply the vendor voice preference; keeps the default voice when nothing matches.
    pub fn prefer_voices(&mut self, preferred: &[String]) -> Option<VoiceInfo> {
        let voices = self.backend.voices();
        let voice = select_voice(&voices, preferred)?.clone();

        match self.backend.set_voice(&voice) {
            Ok(()) => {
                tracing::info!(voice = %voice.name, "narration voice selected");
                Some(voice)
            }
            Err(e) => {
                tracing::warn!(voice = %voice.name, error = %e, "failed to select voice");
                self.last_error = Some(e);
                None
            }
        }
    }

    pub fn set_rate(&mut self, rate: f32) {
        if let Err(e) = self.backend.set_rate(rate) {
            tracing::warn!(rate, error = %e, "failed to set speech rate");
            self.last_error = Some(e);
        }
    }

    /// Speak `text`, preempting any utterance in flight.
    pub fn speak(&mut self, text: &str) -> Completion {
        self.cancel_current();
        self.last_error = None;

        let id = UtteranceId(self.next_id);
        self.next_id += 1;
        let (done, rx) = oneshot::channel();

        match self.backend.start(id, text, self.events_tx.clone()) {
            Ok(()) => {
                tracing::debug!(utterance = id.0, text, "narration started");
                self.state = NarratorState::Speaking { id };
                self.pending = Some(Pending { id, done });
            }
            Err(e) => {
                tracing::warn!(utterance = id.0, error = %e, "narration failed to start");
                self.last_error = Some(e);
                let _ = done.send(SpeechOutcome::Failed);
            }
        }

        Completion {
            id,
            rx,
            resolved: None,
        }
    }

    /// Cancel the utterance in flight, if any.
    pub fn stop(&mut self) {
        self.cancel_current();
    }

    /// Drain backend reports, resolving the active utterance when it ends.
    ///
    /// Reports for utterances that were already cancelled are ignored.
    pub fn poll(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            let is_current = matches!(&self.pending, Some(p) if p.id == event.id);
            if !is_current {
                tracing::trace!(utterance = event.id.0, "ignoring stale utterance report");
                continue;
            }

            let Some(pending) = self.pending.take() else {
                continue;
            };
            self.state = NarratorState::Idle;

            let outcome = match event.end {
                UtteranceEnd::Finished => SpeechOutcome::Finished,
                UtteranceEnd::Failed(message) => {
                    tracing::warn!(utterance = event.id.0, error = %message, "narration failed");
                    self.last_error = Some(SpeechError::Synthesis(message));
                    SpeechOutcome::Failed
                }
            };
            let _ = pending.done.send(outcome);
        }
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self.state, NarratorState::Speaking { .. })
    }

    pub fn state(&self) -> NarratorState {
        self.state
    }

    /// Most recent synthesis failure; cleared by the next `speak`
    pub fn last_error(&self) -> Option<&SpeechError> {
        self.last_error.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn cancel_current(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.backend.cancel(pending.id);
            tracing::debug!(utterance = pending.id.0, "narration cancelled");
            let _ = pending.done.send(SpeechOutcome::Cancelled);
        }
        self.state = NarratorState::Idle;
    }
}

impl<B: SpeechBackend> Drop for Narrator<B> {
    fn drop(&mut self) {
        self.cancel_current();
    }
}
