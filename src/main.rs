use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use voiceid::cli::{Cli, Commands, EngineArgs};
use voiceid::config::Config;
use voiceid::engine::{self, EngineOptions};
use voiceid::profile::SpeakerProfile;
use voiceid::segment::{Segmenter, SegmenterConfig};
use voiceid::session::{self, EnrollOptions, TestOptions};
use voiceid::RecognitionEngine;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose > 0 {
        eprintln!("voiceid {}", voiceid::version_string());
    }

    if cli.show_audio_devices {
        list_audio_devices()?;
        return Ok(());
    }

    match cli.command {
        None => {
            eprintln!("Please specify a command: enroll or test");
            std::process::exit(2);
        }
        Some(Commands::Enroll {
            engine,
            output_profile,
        }) => {
            let config = load_config(cli.config.as_deref(), &engine)?;
            run_enroll_command(config, engine, output_profile, cli.quiet).await?;
        }
        Some(Commands::Test {
            engine,
            input_profiles,
            min_speech_duration,
            include_activation_frame,
            output_dir,
        }) => {
            let config = load_config(cli.config.as_deref(), &engine)?;
            run_test_command(
                config,
                engine,
                input_profiles,
                min_speech_duration,
                include_activation_frame,
                output_dir,
                cli.quiet,
            )
            .await?;
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Command-line flags
/// 2. Environment variable overrides
/// 3. Custom config path from CLI (--config), or the default config path
/// 4. Built-in defaults
fn load_config(custom_path: Option<&Path>, engine: &EngineArgs) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };
    let mut config = config.with_env_overrides();

    if engine.device.is_some() {
        config.audio.device = engine.device.clone();
    }
    if engine.model_path.is_some() {
        config.engine.model_path = engine.model_path.clone();
    }
    if engine.library_path.is_some() {
        config.engine.library_path = engine.library_path.clone();
    }

    Ok(config)
}

/// Collect vendor engine options from the merged config and CLI flags.
fn engine_options(config: &Config, engine_args: &EngineArgs) -> EngineOptions {
    EngineOptions {
        access_key: engine_args.access_key.clone(),
        model_path: config.engine.model_path.clone(),
        library_path: config.engine.library_path.clone(),
    }
}

/// Spawn a task that flips the stop flag on Ctrl-C.
fn install_interrupt_handler() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::Relaxed);
        }
    });
    stop
}

async fn run_enroll_command(
    config: Config,
    engine_args: EngineArgs,
    output_profile: std::path::PathBuf,
    quiet: bool,
) -> Result<()> {
    let sample_rate = config.audio.sample_rate;
    let device = config.audio.device.clone();
    let output_audio = engine_args.output_audio.clone();
    let options = engine_options(&config, &engine_args);
    let stop = install_interrupt_handler();

    tokio::task::spawn_blocking(move || -> voiceid::Result<()> {
        let mut engine = engine::build_enrollment_engine(&options, sample_rate)?;
        let mut source = open_audio_source(device.as_deref(), sample_rate)?;
        let opts = EnrollOptions {
            output_profile,
            output_audio,
            quiet,
        };
        session::run_enroll(engine.as_mut(), source.as_mut(), &opts, &stop)?;
        Ok(())
    })
    .await??;

    Ok(())
}

async fn run_test_command(
    config: Config,
    engine_args: EngineArgs,
    input_profiles: Vec<std::path::PathBuf>,
    min_speech_duration: Option<Duration>,
    include_activation_frame: bool,
    output_dir: std::path::PathBuf,
    quiet: bool,
) -> Result<()> {
    let sample_rate = config.audio.sample_rate;
    let device = config.audio.device.clone();
    let output_audio = engine_args.output_audio.clone();
    let options = engine_options(&config, &engine_args);

    let segmenter_config = SegmenterConfig {
        min_speech_duration: min_speech_duration
            .unwrap_or_else(|| config.segmenter.min_speech_duration()),
        include_activation_frame: include_activation_frame
            || config.segmenter.include_activation_frame,
    };

    let stop = install_interrupt_handler();

    let summary = tokio::task::spawn_blocking(move || -> voiceid::Result<session::TestSummary> {
        let profiles = SpeakerProfile::load_all(&input_profiles)?;
        let mut engine = engine::build_recognition_engine(&options, &profiles)?;
        let labels = engine.labels().to_vec();
        let mut segmenter = Segmenter::new(labels, segmenter_config);
        let mut source = open_audio_source(device.as_deref(), sample_rate)?;
        let opts = TestOptions {
            output_dir,
            output_audio,
            quiet,
        };
        session::run_test(engine.as_mut(), source.as_mut(), &mut segmenter, &opts, &stop)
    })
    .await??;

    if !quiet {
        eprintln!(
            "Processed {} frames, exported {} segment(s)",
            summary.frames_processed, summary.segments_exported
        );
    }
    Ok(())
}

#[cfg(feature = "cpal-audio")]
fn open_audio_source(
    device: Option<&str>,
    sample_rate: u32,
) -> voiceid::Result<Box<dyn voiceid::AudioSource>> {
    let source = voiceid::audio::capture::CpalAudioSource::new(device, sample_rate)?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "cpal-audio"))]
fn open_audio_source(
    _device: Option<&str>,
    _sample_rate: u32,
) -> voiceid::Result<Box<dyn voiceid::AudioSource>> {
    Err(voiceid::VoiceIdError::AudioCapture {
        message: "built without the cpal-audio feature; no microphone backend available"
            .to_string(),
    })
}

/// List available audio input devices.
#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = voiceid::audio::capture::list_devices()?;

    if devices.is_empty() {
        eprintln!("No audio input devices found");
        std::process::exit(1);
    }

    println!("Available audio input devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn list_audio_devices() -> Result<()> {
    eprintln!("No audio input devices found");
    std::process::exit(1);
}
