//! CLI entry point - the composition root.
//!
//! This is the only place where the engine, the terminal view, and the
//! timer are wired onto the controller. The host loop below owns all four
//! event sources (engine notices, timer fires, keystrokes, reader events)
//! and funnels them into plain method calls on the controller.

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;

use wordpace_cli::{Cli, Commands, KeyCommand, TerminalView, spawn_key_reader};
use wordpace_core::{
    EngineNotice, Phase, ReadAloudController, ReaderConfig, ReaderEvent, SpeechEngine,
    TokioDelayTimer,
};
use wordpace_espeak::EspeakEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never fight the alternate-screen view.
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Read {
            file,
            rate,
            delay_multiplier,
            voice,
            from,
        } => {
            let config = ReaderConfig {
                rate,
                delay_multiplier,
                voice,
            };
            read_aloud(&file, config, from).await
        }
        Commands::Voices => list_voices().await,
    }
}

fn load_text(file: &str) -> anyhow::Result<String> {
    let raw = if file == "-" {
        std::io::read_to_string(std::io::stdin()).context("cannot read stdin")?
    } else {
        std::fs::read_to_string(file).with_context(|| format!("cannot read {file}"))?
    };
    // The tokenizer splits on single spaces; collapse free-form whitespace
    // here so paragraphs and newlines read naturally.
    Ok(raw.split_whitespace().collect::<Vec<_>>().join(" "))
}

async fn read_aloud(file: &str, config: ReaderConfig, from: Option<usize>) -> anyhow::Result<()> {
    let text = load_text(file)?;
    if text.is_empty() {
        anyhow::bail!("{file} contains no words");
    }

    let (notice_tx, mut notices) = mpsc::unbounded_channel();
    let engine = EspeakEngine::new(notice_tx);
    engine.probe_voices();
    let (timer, mut timer_fires) = TokioDelayTimer::new();

    let view = TerminalView::new(text.clone()).context("cannot take over the terminal")?;
    let (mut controller, mut events) = ReadAloudController::new(
        Box::new(engine),
        Box::new(view.handle()),
        Box::new(timer),
        config,
    )?;
    let mut keys = spawn_key_reader().context("cannot start key reader")?;

    controller.start_from(&text, from)?;
    update_status(&view, &controller);

    loop {
        tokio::select! {
            Some(notice) = notices.recv() => match notice {
                EngineNotice::UtteranceFinished { id, outcome } => {
                    controller.utterance_finished(id, outcome);
                }
                EngineNotice::VoicesChanged => tracing::debug!("voice catalog ready"),
            },
            Some(generation) = timer_fires.recv() => controller.delay_elapsed(generation),
            Some(command) = keys.recv() => match command {
                KeyCommand::TogglePause => {
                    if controller.phase() == Phase::Speaking {
                        controller.pause();
                    } else {
                        controller.resume();
                    }
                }
                KeyCommand::Stop => controller.stop(),
                KeyCommand::Quit => break,
                KeyCommand::RateUp => {
                    let rate = controller.config().rate;
                    controller.set_rate(rate + 0.25);
                }
                KeyCommand::RateDown => {
                    let rate = controller.config().rate;
                    controller.set_rate(rate - 0.25);
                }
                KeyCommand::GapUp => {
                    let multiplier = controller.config().delay_multiplier;
                    controller.set_delay_multiplier(multiplier + 0.25);
                }
                KeyCommand::GapDown => {
                    let multiplier = controller.config().delay_multiplier;
                    controller.set_delay_multiplier(multiplier - 0.25);
                }
            },
            Some(event) = events.recv() => match event {
                ReaderEvent::Finished => break,
                ReaderEvent::Error(message) => tracing::warn!(%message, "reader error"),
                ReaderEvent::PhaseChanged(_)
                | ReaderEvent::WordStarted { .. }
                | ReaderEvent::WordCount(_) => {}
            },
            else => break,
        }
        update_status(&view, &controller);
    }

    controller.stop();
    Ok(())
}

fn update_status(view: &TerminalView, controller: &ReadAloudController) {
    let phase = match controller.phase() {
        Phase::Idle => "idle",
        Phase::Speaking => "speaking",
        Phase::Paused => "paused",
    };
    let (word, total) = controller
        .session()
        .map_or((0, 0), |s| ((s.cursor() + 1).min(s.len()), s.len()));
    let config = controller.config();
    view.set_status(format!(
        "[{phase}] word {word}/{total}  rate {:.2}  gap x{:.2}  space=pause/resume s=stop q=quit",
        config.rate, config.delay_multiplier,
    ));
}

async fn list_voices() -> anyhow::Result<()> {
    let (notice_tx, _notices) = mpsc::unbounded_channel();
    let engine = EspeakEngine::new(notice_tx);
    let voices = engine
        .voices()
        .await
        .context("is espeak-ng installed and on PATH?")?;

    println!("{:<24} {:<10} NAME", "ID", "LANGUAGE");
    for voice in voices {
        println!("{:<24} {:<10} {}", voice.id, voice.language, voice.name);
    }
    Ok(())
}
