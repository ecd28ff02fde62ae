pub mod backend;
pub mod speech;

pub use backend::{ManualBackend, SystemSpeech};
pub use speech::{
    select_voice, Completion, Narrator, NarratorState, SpeechBackend, SpeechError,
    SpeechOutcome, UtteranceEnd, UtteranceEvent, UtteranceId, VoiceInfo,
};
