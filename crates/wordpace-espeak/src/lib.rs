#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

use wordpace_core::{
    EngineNotice, ReaderError, SpeechEngine, UtteranceId, UtteranceOutcome, UtteranceRequest,
    VoiceInfo,
};

/// Words per minute at a rate multiplier of 1.0.
pub const BASE_WPM: f32 = 175.0;

// espeak-ng rejects speeds outside this range.
const WPM_MIN: f32 = 80.0;
const WPM_MAX: f32 = 450.0;

/// Map a playback rate multiplier onto espeak's words-per-minute scale.
#[must_use]
pub fn rate_to_wpm(rate: f32) -> u32 {
    let wpm = (BASE_WPM * rate).round().clamp(WPM_MIN, WPM_MAX);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        wpm as u32
    }
}

/// Parse `espeak-ng --voices` tabular output into the voice catalog.
///
/// The first line is the column header. Data lines look like
/// `` 5  af  --/M  Afrikaans  gmw/af``; the voice file doubles as the id
/// espeak accepts back via `-v`.
#[must_use]
pub fn parse_voices(output: &str) -> Vec<VoiceInfo> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 5 {
                return None;
            }
            Some(VoiceInfo {
                id: cols[4].to_string(),
                name: cols[3].to_string(),
                language: cols[1].to_string(),
            })
        })
        .collect()
}

struct LiveUtterance {
    id: UtteranceId,
    cancel_tx: oneshot::Sender<()>,
}

/// [`SpeechEngine`] that shells out to `espeak-ng`, one process per word.
///
/// Every `speak` spawns a child and a watcher task; the watcher reports
/// [`EngineNotice::UtteranceFinished`] on the notice channel unless the
/// utterance was cancelled first, in which case the child is killed and no
/// notice is sent. Must be used from within a Tokio runtime.
pub struct EspeakEngine {
    notice_tx: mpsc::UnboundedSender<EngineNotice>,
    current: Option<LiveUtterance>,
}

impl EspeakEngine {
    /// Create an engine that reports utterance lifecycle on `notice_tx`.
    #[must_use]
    pub const fn new(notice_tx: mpsc::UnboundedSender<EngineNotice>) -> Self {
        Self {
            notice_tx,
            current: None,
        }
    }

    /// Check voice availability in the background.
    ///
    /// Sends [`EngineNotice::VoicesChanged`] once `espeak-ng --voices`
    /// answers, so hosts can defer voice pickers until the catalog is real.
    pub fn probe_voices(&self) {
        let notice_tx = self.notice_tx.clone();
        tokio::spawn(async move {
            match Command::new("espeak-ng").arg("--voices").output().await {
                Ok(output) if output.status.success() => {
                    let _ = notice_tx.send(EngineNotice::VoicesChanged);
                }
                Ok(output) => {
                    tracing::warn!(status = %output.status, "espeak-ng --voices failed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "espeak-ng not available on PATH");
                }
            }
        });
    }

    fn cancel_current(&mut self) {
        if let Some(live) = self.current.take() {
            tracing::debug!(id = ?live.id, "killing in-flight espeak-ng");
            // Watcher already gone means the child already exited.
            let _ = live.cancel_tx.send(());
        }
    }
}

#[async_trait]
impl SpeechEngine for EspeakEngine {
    fn speak(&mut self, request: UtteranceRequest) -> Result<(), ReaderError> {
        self.cancel_current();

        let mut command = Command::new("espeak-ng");
        command
            .arg("-s")
            .arg(rate_to_wpm(request.rate).to_string());
        if let Some(voice) = &request.voice {
            command.arg("-v").arg(voice);
        }
        command
            .arg("--")
            .arg(&request.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| ReaderError::EngineFailure(format!("failed to spawn espeak-ng: {e}")))?;

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let notice_tx = self.notice_tx.clone();
        let id = request.id;
        tracing::debug!(?id, word = %request.text, "espeak-ng spawned");

        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    let outcome = match status {
                        Ok(s) if s.success() => UtteranceOutcome::Completed,
                        Ok(s) => UtteranceOutcome::Errored(format!("espeak-ng exited with {s}")),
                        Err(e) => UtteranceOutcome::Errored(format!("failed to reap espeak-ng: {e}")),
                    };
                    let _ = notice_tx.send(EngineNotice::UtteranceFinished { id, outcome });
                }
                _ = cancel_rx => {
                    if let Err(e) = child.start_kill() {
                        tracing::debug!(error = %e, "espeak-ng already exited on cancel");
                    }
                    let _ = child.wait().await;
                }
            }
        });

        self.current = Some(LiveUtterance { id, cancel_tx });
        Ok(())
    }

    fn pause(&mut self) {
        // espeak-ng has no suspend; kill the word and let resume re-speak it.
        self.cancel_current();
    }

    fn resume(&mut self) {
        tracing::debug!("resume is a re-speak, nothing to do engine-side");
    }

    fn cancel(&mut self) {
        self.cancel_current();
    }

    fn set_rate(&mut self, rate: f32) {
        // A running child cannot change speed; the next word's spawn carries
        // the new rate.
        tracing::debug!(rate, wpm = rate_to_wpm(rate), "rate change applies from the next word");
    }

    async fn voices(&self) -> Result<Vec<VoiceInfo>, ReaderError> {
        let output = Command::new("espeak-ng")
            .arg("--voices")
            .output()
            .await
            .map_err(|e| {
                ReaderError::EngineFailure(format!("failed to run espeak-ng --voices: {e}"))
            })?;
        if !output.status.success() {
            return Err(ReaderError::EngineFailure(format!(
                "espeak-ng --voices exited with {}",
                output.status
            )));
        }
        Ok(parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Drop for EspeakEngine {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wpm_mapping_is_anchored_at_175() {
        assert_eq!(rate_to_wpm(1.0), 175);
        assert_eq!(rate_to_wpm(2.0), 350);
        assert_eq!(rate_to_wpm(0.5), 88);
    }

    #[test]
    fn wpm_mapping_clamps_to_espeak_limits() {
        assert_eq!(rate_to_wpm(0.1), 80);
        assert_eq!(rate_to_wpm(10.0), 450);
    }

    #[test]
    fn voices_table_parses_into_catalog() {
        let output = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af             --/M      Afrikaans          gmw/af
 5  am             --/M      Amharic            sem/am
 5  en-gb          --/M      English_(Great_Britain) gmw/en               (en 2)
";
        let voices = parse_voices(output);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[0].id, "gmw/af");
        assert_eq!(voices[0].name, "Afrikaans");
        assert_eq!(voices[0].language, "af");
        assert_eq!(voices[2].id, "gmw/en");
        assert_eq!(voices[2].language, "en-gb");
    }

    #[test]
    fn malformed_voice_lines_are_skipped() {
        let output = "header\n\nshort line here\n 5  af  --/M  Afrikaans  gmw/af\n";
        let voices = parse_voices(output);
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].id, "gmw/af");
    }

    #[test]
    fn idle_engine_commands_are_harmless() {
        tokio_test::block_on(async {
            let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
            let mut engine = EspeakEngine::new(notice_tx);

            engine.pause();
            engine.resume();
            engine.cancel();
            engine.set_rate(2.0);

            assert!(notice_rx.try_recv().is_err(), "no notices expected");
        });
    }
}
