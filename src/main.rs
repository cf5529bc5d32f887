use anyhow::{Context, Result, bail};
use awaaz::audio;
use awaaz::cli::Cli;
use awaaz::config::Config;
use awaaz::output::{self, Format};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;

    let format = match cli.format {
        Some(format) => format,
        None => config
            .output
            .format
            .parse::<Format>()
            .map_err(|e| anyhow::anyhow!(e))
            .context("invalid output.format in configuration")?,
    };
    let include_speakers = config.output.speakers && !cli.no_speakers;

    let buffer = audio::wav::load(&cli.input)?.normalized();
    let duration = buffer.duration_seconds();
    if !cli.quiet {
        eprintln!("awaaz: {} ({duration:.1}s)", cli.input.display());
    }

    let plan = audio::plan(duration, &config.model.size);
    let chunks = audio::split(&buffer, plan);

    let result = transcribe(&cli, &config, &chunks, plan.chunk_length_s)?;

    println!("{}", output::format(&result, format, include_speakers));
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => Config::default(),
        },
    };

    let mut config = config.with_env_overrides();
    if let Some(model) = &cli.model {
        config.model.size = model.clone();
    }
    if let Some(device) = &cli.device {
        config.model.device = device.clone();
    }
    if let Some(language) = &cli.language {
        config.language.input = language.clone();
    }
    Ok(config)
}

#[cfg(feature = "whisper")]
fn transcribe(
    cli: &Cli,
    config: &Config,
    chunks: &[audio::AudioChunk],
    chunk_length_s: f64,
) -> Result<awaaz::transcript::TranscriptionResult> {
    use awaaz::asr::whisper::WhisperProvider;
    use awaaz::asr::{Device, EngineConfig, TranscriptionEngine};

    let device = match config.model.device.as_str() {
        "cuda" => Device::Cuda,
        "cpu" => Device::Cpu,
        other => bail!("unknown device '{other}' (expected cpu or cuda)"),
    };

    let model_dir = cli
        .model_dir
        .clone()
        .unwrap_or_else(WhisperProvider::default_model_dir);
    let provider = WhisperProvider::new(model_dir);

    let mut engine = TranscriptionEngine::new(
        Box::new(provider),
        EngineConfig {
            model_size: config.model.size.clone(),
            device,
            quiet: cli.quiet,
        },
    )?;

    let quiet = cli.quiet;
    let mut progress = |done: usize, total: usize| {
        if !quiet && total > 1 {
            eprintln!("awaaz: chunk {done}/{total}");
        }
    };

    let result = engine.transcribe_chunks(
        chunks,
        Some(config.language.input.as_str()),
        chunk_length_s,
        Some(&mut progress),
    )?;
    Ok(result)
}

#[cfg(not(feature = "whisper"))]
fn transcribe(
    _cli: &Cli,
    _config: &Config,
    _chunks: &[audio::AudioChunk],
    _chunk_length_s: f64,
) -> Result<awaaz::transcript::TranscriptionResult> {
    bail!(
        "This binary was built without speech recognition.\n\
         To fix: cargo build --release --features whisper\n\
         If the build fails with cmake errors, install: sudo apt install cmake"
    );
}
