use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mediacut::ai::align::{Aligner, SilenceSnapAligner};
use mediacut::ai::gemini::GeminiClient;
use mediacut::ai::parse_clips;
use mediacut::config::{Config, OutputFormat};
use mediacut::media::cut::{cut_video, export_clips};
use mediacut::media::probe_duration;
use mediacut::pipeline::{analyze_media, print_summary, translate_track, PipelineConfig};
use mediacut::session::TranscriptSession;
use mediacut::subtitle::{create_formatter, cues_from_segments};
use mediacut::timeline::clip::{assemble, ExportRange};
use mediacut::timeline::overlay::LanguageOverlay;
use mediacut::timeline::store::SegmentStore;

#[derive(Parser)]
#[command(name = "mediacut")]
#[command(version, about = "Transcript-driven media editing with AI")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe a media file into an editable segment timeline
    Transcribe {
        /// Input video/audio file
        input: PathBuf,

        /// Context about the recording, passed to the model
        #[arg(long, default_value = "")]
        context: String,

        /// Domain terms the model should spell correctly
        #[arg(long, default_value = "")]
        glossary: String,

        /// Number of distinct speakers, when known
        #[arg(long)]
        speakers: Option<u32>,

        /// Drop filler words from the transcription
        #[arg(long)]
        remove_fillers: bool,

        /// Skip silence removal before analysis
        #[arg(long)]
        keep_silence: bool,

        /// Snap segment boundaries out of detected silence after analysis
        #[arg(long)]
        align: bool,
    },

    /// Translate the transcript and write subtitles in the target language
    Translate {
        /// Media file with an existing transcript sidecar
        input: PathBuf,

        /// Target language (e.g. French, Japanese)
        #[arg(short, long)]
        language: String,

        /// Context hints for the translator
        #[arg(long, default_value = "")]
        context: String,

        /// Output subtitle format: srt, vtt, txt
        #[arg(short, long)]
        format: Option<String>,

        /// Output subtitle file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write subtitles from the existing transcript
    Subtitles {
        /// Media file with an existing transcript sidecar
        input: PathBuf,

        /// Output subtitle format: srt, vtt, txt
        #[arg(short, long)]
        format: Option<String>,

        /// Output subtitle file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Cut one or more time ranges out of a media file into a single output
    Cut {
        /// Input media file
        input: PathBuf,

        /// Ranges to keep, as start-end second pairs (e.g. "10.5-20,35-40")
        #[arg(short, long)]
        ranges: String,

        /// Output media file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate and export AI-suggested clips
    Clips {
        /// Media file with an existing transcript sidecar
        input: PathBuf,

        /// Number of clips to suggest
        #[arg(short, long, default_value = "3")]
        count: u32,

        /// Minimum clip duration in seconds
        #[arg(long, default_value = "15")]
        min_duration: u32,

        /// Maximum clip duration in seconds
        #[arg(long, default_value = "60")]
        max_duration: u32,

        /// Seconds of lead-in before each clip range
        #[arg(long, default_value = "0.5")]
        pre_pad: f64,

        /// Seconds of tail after each clip range
        #[arg(long, default_value = "0.5")]
        post_pad: f64,

        /// Directory for the exported clips
        #[arg(short, long, default_value = "clips")]
        output_dir: PathBuf,

        /// Stream-copy single-range clips instead of re-encoding
        #[arg(long)]
        fast: bool,

        /// Also write a subtitle file next to each clip
        #[arg(long)]
        subtitles: bool,
    },

    /// Rename a speaker across the whole transcript
    RenameSpeaker {
        /// Media file with an existing transcript sidecar
        input: PathBuf,

        /// Current speaker name
        #[arg(long)]
        from: String,

        /// New speaker name
        #[arg(long)]
        to: String,

        /// Skip the confirmation prompt when merging into an existing speaker
        #[arg(short, long)]
        yes: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn load_session(input: &Path) -> Result<TranscriptSession> {
    TranscriptSession::load(input)
        .context("Failed to read transcript sidecar")?
        .with_context(|| {
            format!(
                "No transcript found for {}. Run `mediacut transcribe` first.",
                input.display()
            )
        })
}

fn resolve_format(arg: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match arg {
        Some(s) => s.parse().map_err(|e: String| anyhow::anyhow!(e)),
        None => Ok(config.default_format),
    }
}

fn subtitle_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut output = input.to_path_buf();
    output.set_file_name(format!("{}.{}", stem.to_string_lossy(), format.extension()));
    output
}

fn parse_ranges(arg: &str) -> Result<Vec<ExportRange>> {
    arg.split(',')
        .map(|part| {
            let (start, end) = part
                .trim()
                .split_once('-')
                .with_context(|| format!("Invalid range '{}', expected start-end", part))?;
            let start: f64 = start.trim().parse().context("Invalid range start")?;
            let end: f64 = end.trim().parse().context("Invalid range end")?;
            if end <= start {
                bail!("Range '{}' ends before it starts", part);
            }
            Ok(ExportRange { start, end })
        })
        .collect()
}

fn gemini_client(config: &Config) -> Result<GeminiClient> {
    let api_key = config
        .gemini_api_key
        .clone()
        .context("GEMINI_API_KEY not set")?;
    Ok(GeminiClient::new(api_key)
        .with_base_url(config.base_url.clone())
        .with_model(config.model.clone()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Transcribe {
            input,
            context,
            glossary,
            speakers,
            remove_fillers,
            keep_silence,
            align,
        } => {
            config.validate().context("Configuration validation failed")?;

            let pipeline_config = PipelineConfig {
                context,
                glossary,
                speaker_count: speakers,
                remove_filler_words: remove_fillers,
                remove_silence: !keep_silence,
                show_progress: true,
            };

            let snap_aligner = SilenceSnapAligner::new();
            let aligner = align.then_some(&snap_aligner as &dyn Aligner);
            let result = analyze_media(&input, &config, &pipeline_config, aligner).await?;
            print_summary(&result);
            println!(
                "{} {}",
                style("Transcript saved to").green(),
                TranscriptSession::sidecar_path(&input).display()
            );
        }

        Commands::Translate {
            input,
            language,
            context,
            format,
            output,
        } => {
            config.validate().context("Configuration validation failed")?;

            let session = load_session(&input)?;
            let client = gemini_client(&config)?;

            let mut overlay = LanguageOverlay::new(SegmentStore::new(session.segments));
            translate_track(&client, &mut overlay, &language, &context).await?;

            let format = resolve_format(format.as_deref(), &config)?;
            let output = output.unwrap_or_else(|| {
                let stem = input.file_stem().unwrap_or_default();
                let mut path = input.clone();
                path.set_file_name(format!(
                    "{}.{}.{}",
                    stem.to_string_lossy(),
                    language.to_lowercase(),
                    format.extension()
                ));
                path
            });

            let cues = cues_from_segments(overlay.active().segments());
            let formatter = create_formatter(format);
            std::fs::write(&output, formatter.format(&cues))?;

            println!(
                "{} {}",
                style("Translated subtitles written to").green(),
                output.display()
            );
        }

        Commands::Subtitles {
            input,
            format,
            output,
        } => {
            let session = load_session(&input)?;
            let format = resolve_format(format.as_deref(), &config)?;
            let output = output.unwrap_or_else(|| subtitle_output_path(&input, format));

            let cues = cues_from_segments(&session.segments);
            let formatter = create_formatter(format);
            std::fs::write(&output, formatter.format(&cues))?;

            info!("Wrote {} cues", cues.len());
            println!(
                "{} {}",
                style("Subtitles written to").green(),
                output.display()
            );
        }

        Commands::Cut {
            input,
            ranges,
            output,
        } => {
            let ranges = parse_ranges(&ranges)?;

            let pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{bar:40.green} {percent}% {msg}")
                    .unwrap(),
            );
            pb.set_message("Cutting");

            cut_video(&input, &ranges, &output, |p| {
                pb.set_position((p * 100.0) as u64);
            })?;
            pb.finish_with_message("done");

            println!("{} {}", style("Cut written to").green(), output.display());
        }

        Commands::Clips {
            input,
            count,
            min_duration,
            max_duration,
            pre_pad,
            post_pad,
            output_dir,
            fast,
            subtitles,
        } => {
            config.validate().context("Configuration validation failed")?;

            let session = load_session(&input)?;
            let client = gemini_client(&config)?;

            let transcript_json = serde_json::to_string(&session.segments)?;
            let response = client
                .generate_clips(&transcript_json, count, min_duration, max_duration)
                .await?;
            let clips = parse_clips(&response)?;
            info!("Model suggested {} clips", clips.len());

            let media_duration = probe_duration(&input)?;
            let plans: Vec<_> = clips
                .iter()
                .map(|clip| assemble(clip, &session.segments, pre_pad, post_pad, media_duration))
                .collect();

            let outputs = export_clips(&input, &plans, &output_dir, fast, |progress| {
                println!("  [{}/{}] {}", progress.current_clip, progress.total_clips, progress.message);
            })?;

            if subtitles {
                let formatter = create_formatter(config.default_format);
                for (plan, path) in plans.iter().zip(&outputs) {
                    let sub_path = path.with_extension(formatter.extension());
                    std::fs::write(&sub_path, formatter.format(&plan.cues))?;
                }
            }

            println!();
            for (clip, path) in clips.iter().zip(&outputs) {
                println!(
                    "{} {} {}",
                    style(path.display()).green(),
                    style(&clip.title).bold(),
                    style(&clip.reason).dim()
                );
            }
        }

        Commands::RenameSpeaker { input, from, to, yes } => {
            let session = load_session(&input)?;
            let store = SegmentStore::new(session.segments.clone());

            if !store.speakers().contains(&from.as_str()) {
                bail!("No segments spoken by '{}'", from);
            }

            // Renaming onto an existing speaker merges the two irreversibly.
            if store.speakers().contains(&to.as_str()) && !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "'{}' already exists; merging '{}' into it cannot be undone. Continue?",
                        to, from
                    ))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("{}", style("Aborted").yellow());
                    return Ok(());
                }
            }

            let renamed = store.rename_speaker(&from, &to);
            let mut session = session;
            session.segments = renamed.into_segments();
            session.save(&input)?;

            println!(
                "{} '{}' -> '{}'",
                style("Renamed speaker").green(),
                from,
                to
            );
        }
    }

    Ok(())
}
