//! Speech backends.
//!
//! `SystemSpeech` uses the platform engine: the `tts` crate on Windows and
//! macOS, the `espeak` command on Linux. `ManualBackend` only finishes
//! utterances when told to, for headless hosts and tests.

use crate::audio::speech::{
    SpeechBackend, SpeechError, UtteranceEnd, UtteranceEvent, UtteranceId, UtteranceSender,
    VoiceInfo,
};

#[cfg(target_os = "linux")]
pub use espeak::EspeakBackend as SystemSpeech;
#[cfg(not(target_os = "linux"))]
pub use system_tts::TtsBackend as SystemSpeech;

/// Backend whose utterances end only when the host says so
#[derive(Debug)]
pub struct ManualBackend {
    voices: Vec<VoiceInfo>,
    selected_voice: Option<VoiceInfo>,
    rate: f32,
    started: Vec<(UtteranceId, String)>,
    cancelled: Vec<UtteranceId>,
    active: Option<(UtteranceId, UtteranceSender)>,
    fail_next_start: Option<String>,
    auto_finish: bool,
}

impl ManualBackend {
    pub fn new() -> Self {
        Self {
            voices: Vec::new(),
            selected_voice: None,
            rate: 1.0,
            started: Vec::new(),
            cancelled: Vec::new(),
            active: None,
            fail_next_start: None,
            auto_finish: false,
        }
    }

    /// Backend that reports every utterance finished as soon as it starts.
    /// Stands in for a missing speech engine, so nothing is recorded.
    pub fn silent() -> Self {
        Self {
            auto_finish: true,
            ..Self::new()
        }
    }

    pub fn with_voices(mut self, voices: Vec<VoiceInfo>) -> Self {
        self.voices = voices;
        self
    }

    /// Make the next `start` call fail with `SpeechError::Unavailable`
    pub fn fail_next_start(&mut self, message: &str) {
        self.fail_next_start = Some(message.to_string());
    }

    /// Texts of every started utterance, oldest first
    pub fn started(&self) -> Vec<&str> {
        self.started.iter().map(|(_, text)| text.as_str()).collect()
    }

    pub fn cancelled(&self) -> &[UtteranceId] {
        &self.cancelled
    }

    /// Utterance currently being "spoken"
    pub fn current(&self) -> Option<(UtteranceId, &str)> {
        let (id, _) = self.active.as_ref()?;
        self.started
            .iter()
            .rev()
            .find(|(started_id, _)| started_id == id)
            .map(|(id, text)| (*id, text.as_str()))
    }

    pub fn selected_voice(&self) -> Option<&VoiceInfo> {
        self.selected_voice.as_ref()
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Report `id` as finished, even if it is no longer active
    pub fn finish(&mut self, id: UtteranceId) {
        self.report(id, UtteranceEnd::Finished);
    }

    pub fn finish_current(&mut self) {
        if let Some((id, _)) = &self.active {
            let id = *id;
            self.report(id, UtteranceEnd::Finished);
        }
    }

    pub fn fail_current(&mut self, message: &str) {
        if let Some((id, _)) = &self.active {
            let id = *id;
            self.report(id, UtteranceEnd::Failed(message.to_string()));
        }
    }

    fn report(&mut self, id: UtteranceId, end: UtteranceEnd) {
        let Some((_, sender)) = &self.active else {
            return;
        };
        let _ = sender.send(UtteranceEvent { id, end });
        if matches!(&self.active, Some((active_id, _)) if *active_id == id) {
            self.active = None;
        }
    }
}

impl SpeechBackend for ManualBackend {
    fn start(
        &mut self,
        id: UtteranceId,
        text: &str,
        events: UtteranceSender,
    ) -> Result<(), SpeechError> {
        if let Some(message) = self.fail_next_start.take() {
            return Err(SpeechError::Unavailable(message));
        }
        if self.auto_finish {
            let _ = events.send(UtteranceEvent {
                id,
                end: UtteranceEnd::Finished,
            });
            return Ok(());
        }
        self.started.push((id, text.to_string()));
        self.active = Some((id, events));
        Ok(())
    }

    fn cancel(&mut self, id: UtteranceId) {
        if !self.auto_finish {
            self.cancelled.push(id);
        }
        if matches!(&self.active, Some((active_id, _)) if *active_id == id) {
            self.active = None;
        }
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        self.voices.clone()
    }

    fn set_voice(&mut self, voice: &VoiceInfo) -> Result<(), SpeechError> {
        if !self.voices.contains(voice) {
            return Err(SpeechError::Voice(voice.name.clone()));
        }
        self.selected_voice = Some(voice.clone());
        Ok(())
    }

    fn set_rate(&mut self, rate: f32) -> Result<(), SpeechError> {
        self.rate = rate;
        Ok(())
    }
}

impl Default for ManualBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "linux")]
mod espeak {
    use std::io::Read;
    use std::process::{Child, Command, Stdio};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use super::*;

    const PROGRAM: &str = "espeak";
    const NORMAL_WPM: f32 = 175.0;
    const POLL_INTERVAL: Duration = Duration::from_millis(25);

    struct Running {
        id: UtteranceId,
        child: Arc<Mutex<Child>>,
        cancelled: Arc<AtomicBool>,
    }

    /// Narration through the `espeak` command
    pub struct EspeakBackend {
        voice: Option<String>,
        words_per_minute: u32,
        running: Option<Running>,
    }

    impl EspeakBackend {
        /// Fails when `espeak` is not installed.
        pub fn new() -> Result<Self, SpeechError> {
            Command::new(PROGRAM)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map_err(|e| SpeechError::Unavailable(format!("{PROGRAM}: {e}")))?;

            Ok(Self {
                voice: None,
                words_per_minute: NORMAL_WPM as u32,
                running: None,
            })
        }
    }

    /// Read a child's stderr to the end on its own thread, so a full pipe
    /// never stalls the child
    fn drain_stderr<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
        thread::spawn(move || {
            let mut stderr = String::new();
            if let Some(mut pipe) = pipe {
                let _ = pipe.read_to_string(&mut stderr);
            }
            stderr
        })
    }

    /// Parse `espeak --voices` output:
    /// `Pty Language Age/Gender VoiceName File Other Languages`
    fn parse_voices(listing: &str) -> Vec<VoiceInfo> {
        listing
            .lines()
            .skip(1)
            .filter_map(|line| {
                let columns: Vec<&str> = line.split_whitespace().collect();
                let name = columns.get(3)?;
                let file = columns.get(4)?;
                Some(VoiceInfo {
                    id: file.to_string(),
                    name: name.to_string(),
                })
            })
            .collect()
    }

    impl SpeechBackend for EspeakBackend {
        fn start(
            &mut self,
            id: UtteranceId,
            text: &str,
            events: UtteranceSender,
        ) -> Result<(), SpeechError> {
            let mut command = Command::new(PROGRAM);
            command.arg("-s").arg(self.words_per_minute.to_string());
            if let Some(voice) = &self.voice {
                command.arg("-v").arg(voice);
            }
            let mut child = command
                .arg(text)
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(|e| SpeechError::Unavailable(format!("{PROGRAM}: {e}")))?;

            let stderr_reader = drain_stderr(child.stderr.take());

            let child = Arc::new(Mutex::new(child));
            let cancelled = Arc::new(AtomicBool::new(false));
            self.running = Some(Running {
                id,
                child: Arc::clone(&child),
                cancelled: Arc::clone(&cancelled),
            });

            thread::spawn(move || {
                let status = loop {
                    let polled = match child.lock() {
                        Ok(mut guard) => guard.try_wait(),
                        Err(_) => return,
                    };
                    match polled {
                        Ok(None) => thread::sleep(POLL_INTERVAL),
                        Ok(Some(status)) => break Ok(status),
                        Err(e) => break Err(e),
                    }
                };
                let stderr = stderr_reader.join().unwrap_or_default();
                let end = match status {
                    Ok(status) if status.success() => UtteranceEnd::Finished,
                    Ok(status) => UtteranceEnd::Failed(format!(
                        "{PROGRAM} exited with {status}: {}",
                        stderr.trim()
                    )),
                    Err(e) => UtteranceEnd::Failed(e.to_string()),
                };
                if !cancelled.load(Ordering::Acquire) {
                    let _ = events.send(UtteranceEvent { id, end });
                }
            });

            Ok(())
        }

        fn cancel(&mut self, id: UtteranceId) {
            if !matches!(&self.running, Some(running) if running.id == id) {
                return;
            }
            let Some(running) = self.running.take() else {
                return;
            };
            running.cancelled.store(true, Ordering::Release);
            if let Ok(mut child) = running.child.lock() {
                let _ = child.kill();
            };
        }

        fn voices(&self) -> Vec<VoiceInfo> {
            match Command::new(PROGRAM).arg("--voices").output() {
                Ok(output) => parse_voices(&String::from_utf8_lossy(&output.stdout)),
                Err(e) => {
                    tracing::debug!(error = %e, "could not list espeak voices");
                    Vec::new()
                }
            }
        }

        fn set_voice(&mut self, voice: &VoiceInfo) -> Result<(), SpeechError> {
            self.voice = Some(voice.id.clone());
            Ok(())
        }

        fn set_rate(&mut self, rate: f32) -> Result<(), SpeechError> {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(SpeechError::Synthesis(format!("invalid rate {rate}")));
            }
            self.words_per_minute = (NORMAL_WPM * rate).round().clamp(80.0, 450.0) as u32;
            Ok(())
        }
    }

    impl Drop for EspeakBackend {
        fn drop(&mut self) {
            if let Some(running) = self.running.take() {
                running.cancelled.store(true, Ordering::Release);
                if let Ok(mut child) = running.child.lock() {
                    let _ = child.kill();
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_voices() {
            let listing = "Pty Language Age/Gender VoiceName          File          Other Languages\n \
                           5  af             M  afrikaans            other/af\n \
                           5  en-gb          M  english              default       (en 2)\n";
            let voices = parse_voices(listing);
            assert_eq!(voices.len(), 2);
            assert_eq!(voices[0].name, "afrikaans");
            assert_eq!(voices[0].id, "other/af");
            assert_eq!(voices[1].name, "english");
        }

        #[test]
        fn test_drain_stderr_reads_past_pipe_buffer() {
            let noise = "warning: unknown phoneme\n".repeat(8_192);
            let drained = drain_stderr(Some(std::io::Cursor::new(noise.clone().into_bytes())))
                .join()
                .unwrap();
            assert_eq!(drained.len(), noise.len());
            assert_eq!(drain_stderr(None::<std::io::Empty>).join().unwrap(), "");
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod system_tts {
    use std::sync::{Arc, Mutex};

    use super::*;

    type Active = Arc<Mutex<Option<(UtteranceId, tts::UtteranceId, UtteranceSender)>>>;

    /// Narration through the platform speech engine
    pub struct TtsBackend {
        tts: tts::Tts,
        callbacks: bool,
        active: Active,
    }

    impl TtsBackend {
        pub fn new() -> Result<Self, SpeechError> {
            let tts = tts::Tts::default().map_err(|e| SpeechError::Unavailable(e.to_string()))?;
            let callbacks = tts.supported_features().utterance_callbacks;
            let active: Active = Arc::new(Mutex::new(None));

            if callbacks {
                let ended = Arc::clone(&active);
                tts.on_utterance_end(Some(Box::new(move |utterance| {
                    let Ok(mut slot) = ended.lock() else {
                        return;
                    };
                    if matches!(slot.as_ref(), Some((_, theirs, _)) if *theirs == utterance) {
                        if let Some((id, _, sender)) = slot.take() {
                            let _ = sender.send(UtteranceEvent {
                                id,
                                end: UtteranceEnd::Finished,
                            });
                        }
                    }
                })))
                .map_err(|e| SpeechError::Unavailable(e.to_string()))?;
            }

            Ok(Self {
                tts,
                callbacks,
                active,
            })
        }
    }

    impl SpeechBackend for TtsBackend {
        fn start(
            &mut self,
            id: UtteranceId,
            text: &str,
            events: UtteranceSender,
        ) -> Result<(), SpeechError> {
            let utterance = self
                .tts
                .speak(text, true)
                .map_err(|e| SpeechError::Synthesis(e.to_string()))?;

            match (utterance, self.callbacks) {
                (Some(theirs), true) => {
                    if let Ok(mut slot) = self.active.lock() {
                        *slot = Some((id, theirs, events));
                    }
                }
                _ => {
                    // No end-of-utterance callbacks on this platform
                    let _ = events.send(UtteranceEvent {
                        id,
                        end: UtteranceEnd::Finished,
                    });
                }
            }
            Ok(())
        }

        fn cancel(&mut self, id: UtteranceId) {
            if let Ok(mut slot) = self.active.lock() {
                if matches!(slot.as_ref(), Some((ours, _, _)) if *ours == id) {
                    *slot = None;
                }
            }
            if let Err(e) = self.tts.stop() {
                tracing::debug!(error = %e, "failed to stop speech");
            }
        }

        fn voices(&self) -> Vec<VoiceInfo> {
            match self.tts.voices() {
                Ok(voices) => voices
                    .into_iter()
                    .map(|voice| VoiceInfo {
                        id: voice.id(),
                        name: voice.name(),
                    })
                    .collect(),
                Err(e) => {
                    tracing::debug!(error = %e, "could not list voices");
                    Vec::new()
                }
            }
        }

        fn set_voice(&mut self, voice: &VoiceInfo) -> Result<(), SpeechError> {
            let voices = self
                .tts
                .voices()
                .map_err(|e| SpeechError::Voice(e.to_string()))?;
            let chosen = voices
                .iter()
                .find(|candidate| candidate.id() == voice.id)
                .ok_or_else(|| SpeechError::Voice(voice.name.clone()))?;
            self.tts
                .set_voice(chosen)
                .map_err(|e| SpeechError::Voice(e.to_string()))
        }

        fn set_rate(&mut self, rate: f32) -> Result<(), SpeechError> {
            let target = (self.tts.normal_rate() * rate)
                .clamp(self.tts.min_rate(), self.tts.max_rate());
            self.tts
                .set_rate(target)
                .map(|_| ())
                .map_err(|e| SpeechError::Synthesis(e.to_string()))
        }
    }
}
