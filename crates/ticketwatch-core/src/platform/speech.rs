use crate::capabilities::{Speaker, SpeechParams};
use crate::error::NotifyError;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Text-to-speech programs tried in order when none is configured.
pub const SPEECH_ENGINES: [&str; 4] = ["espeak-ng", "espeak", "spd-say", "say"];

/// How a speech program takes its voice parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// espeak / espeak-ng: words per minute, pitch 0-99, amplitude 0-200
    Espeak,
    /// speech-dispatcher's spd-say: everything relative, -100..=100
    SpeechDispatcher,
    /// macOS say: words per minute only
    Say,
    /// Unknown program, text only
    Plain,
}

impl EngineKind {
    pub fn from_program(program: &Path) -> Self {
        let name = program
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        match name {
            "espeak" | "espeak-ng" => EngineKind::Espeak,
            "spd-say" => EngineKind::SpeechDispatcher,
            "say" => EngineKind::Say,
            _ => EngineKind::Plain,
        }
    }

    pub fn args(&self, params: SpeechParams) -> Vec<String> {
        let words_per_minute = (175.0 * params.rate).round() as i32;
        match self {
            EngineKind::Espeak => vec![
                "-s".to_string(),
                words_per_minute.to_string(),
                "-p".to_string(),
                ((50.0 * params.pitch).round() as i32).clamp(0, 99).to_string(),
                "-a".to_string(),
                ((100.0 * params.volume).round() as i32).clamp(0, 200).to_string(),
            ],
            EngineKind::SpeechDispatcher => vec![
                "-r".to_string(),
                relative(params.rate).to_string(),
                "-p".to_string(),
                relative(params.pitch).to_string(),
                "-i".to_string(),
                relative(params.volume).to_string(),
            ],
            EngineKind::Say => vec!["-r".to_string(), words_per_minute.to_string()],
            EngineKind::Plain => Vec::new(),
        }
    }
}

// 1.0 is the engine default, mapped to 0 on a -100..=100 scale
fn relative(factor: f32) -> i32 {
    (((factor - 1.0) * 100.0).round() as i32).clamp(-100, 100)
}

#[derive(Debug, Clone)]
struct Engine {
    program: PathBuf,
    kind: EngineKind,
}

/// Speaks by spawning a local TTS program. Without one, speaking is a logged no-op.
pub struct CommandSpeaker {
    engine: Option<Engine>,
    child: Mutex<Option<Child>>,
}

impl CommandSpeaker {
    /// Use `preferred` when given, otherwise the first of [`SPEECH_ENGINES`] on PATH.
    pub fn detect(preferred: Option<&str>) -> Self {
        let program = match preferred {
            Some(name) => which::which(name)
                .map_err(|e| {
                    warn!(operation = "detect_speech", engine = %name, error = %e, "Configured speech engine not found");
                })
                .ok(),
            None => SPEECH_ENGINES.iter().find_map(|name| which::which(name).ok()),
        };

        match program {
            Some(program) => {
                let kind = EngineKind::from_program(&program);
                info!(operation = "detect_speech", program = %program.display(), kind = ?kind, "Using speech engine");
                Self::with_engine(program, kind)
            }
            None => {
                warn!(
                    operation = "detect_speech",
                    "No speech engine found (tried espeak-ng, espeak, spd-say, say); alerts will be silent"
                );
                Self::silent()
            }
        }
    }

    pub fn with_engine(program: impl Into<PathBuf>, kind: EngineKind) -> Self {
        Self {
            engine: Some(Engine {
                program: program.into(),
                kind,
            }),
            child: Mutex::new(None),
        }
    }

    pub fn silent() -> Self {
        Self {
            engine: None,
            child: Mutex::new(None),
        }
    }

    pub fn program(&self) -> Option<&Path> {
        self.engine.as_ref().map(|e| e.program.as_path())
    }

    fn kill_running(&self, slot: &mut Option<Child>) {
        if let Some(mut child) = slot.take() {
            // Already exited is fine
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, text: &str, params: SpeechParams) -> Result<(), NotifyError> {
        let Some(engine) = &self.engine else {
            debug!(operation = "speak", "No speech engine, skipping");
            return Ok(());
        };

        let mut slot = self.child.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.kill_running(&mut slot);

        let child = Command::new(&engine.program)
            .args(engine.kind.args(params))
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| NotifyError::Launch {
                program: engine.program.display().to_string(),
                source,
            })?;
        *slot = Some(child);
        Ok(())
    }

    fn stop_speaking(&self) {
        let Some(engine) = &self.engine else {
            return;
        };
        let mut slot = self.child.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.kill_running(&mut slot);

        // spd-say hands the text to a server, killing the client does not silence it
        // Called with the alert lock held, so the cancel runs without waiting on it
        if engine.kind == EngineKind::SpeechDispatcher {
            match Command::new(&engine.program)
                .arg("-C")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(mut cancel) => {
                    std::thread::spawn(move || {
                        let _ = cancel.wait();
                    });
                }
                Err(e) => {
                    debug!(operation = "stop_speaking", error = %e, "Failed to cancel speech-dispatcher");
                }
            }
        }
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        let slot = self.child.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(mut child) = slot.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::ALERT_SPEECH;

    #[test]
    fn test_engine_kind_from_program_path() {
        assert_eq!(EngineKind::from_program(Path::new("/usr/bin/espeak-ng")), EngineKind::Espeak);
        assert_eq!(EngineKind::from_program(Path::new("espeak")), EngineKind::Espeak);
        assert_eq!(EngineKind::from_program(Path::new("/usr/bin/spd-say")), EngineKind::SpeechDispatcher);
        assert_eq!(EngineKind::from_program(Path::new("/usr/bin/say")), EngineKind::Say);
        assert_eq!(EngineKind::from_program(Path::new("/opt/festival")), EngineKind::Plain);
    }

    #[test]
    fn test_alert_voice_maps_onto_engine_flags() {
        assert_eq!(EngineKind::Espeak.args(ALERT_SPEECH), ["-s", "158", "-p", "65", "-a", "100"]);
        assert_eq!(
            EngineKind::SpeechDispatcher.args(ALERT_SPEECH),
            ["-r", "-10", "-p", "30", "-i", "0"]
        );
        assert_eq!(EngineKind::Say.args(ALERT_SPEECH), ["-r", "158"]);
        assert!(EngineKind::Plain.args(ALERT_SPEECH).is_empty());
    }

    #[test]
    fn test_extreme_params_are_clamped() {
        let loud = SpeechParams {
            rate: 1.0,
            pitch: 2.0,
            volume: 5.0,
        };
        assert_eq!(EngineKind::Espeak.args(loud)[3], "99");
        assert_eq!(EngineKind::Espeak.args(loud)[5], "200");
        assert_eq!(EngineKind::SpeechDispatcher.args(loud)[5], "100");
    }

    #[test]
    fn test_silent_speaker_is_a_no_op() {
        let speaker = CommandSpeaker::silent();
        assert!(speaker.program().is_none());
        speaker.speak("hello", ALERT_SPEECH).unwrap();
        speaker.stop_speaking();
    }

    #[cfg(unix)]
    #[test]
    fn test_cancelling_speech_dispatcher_returns_immediately() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::{Duration, Instant};

        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("spd-say");
        std::fs::write(&program, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let speaker = CommandSpeaker::with_engine(&program, EngineKind::SpeechDispatcher);
        let started = Instant::now();
        speaker.stop_speaking();
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_missing_program_reports_launch_failure() {
        let speaker = CommandSpeaker::with_engine("/nonexistent/ticketwatch-tts", EngineKind::Plain);
        assert!(matches!(
            speaker.speak("hello", ALERT_SPEECH),
            Err(NotifyError::Launch { .. })
        ));
    }
}
