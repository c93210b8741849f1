//! The end-to-end analysis pipeline.
//!
//! Prepares a compact audio copy, optionally compacts away long silences,
//! sends the audio to the model, and maps the returned timestamps back onto
//! the original media timeline before handing the segments to the editing
//! layer.

use std::path::Path;
use std::time::{Duration, Instant};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::ai::align::{align_or_keep, Aligner};
use crate::ai::gemini::{AnalyzeRequest, GeminiClient};
use crate::ai::{parse_segments, remap_segments};
use crate::config::Config;
use crate::error::{MediacutError, Result};
use crate::media::silence::remove_silence;
use crate::media::{check_ffmpeg, prepare_audio_for_ai};
use crate::session::TranscriptSession;
use crate::timeline::offset::OffsetMap;
use crate::timeline::overlay::LanguageOverlay;
use crate::timeline::silence::filter_silent_segments;
use crate::timeline::store::SegmentStore;

/// Configuration for one analysis run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Free-form description of the recording, passed to the model.
    pub context: String,
    /// Domain terms the model should spell correctly.
    pub glossary: String,
    /// Number of distinct speakers, when known.
    pub speaker_count: Option<u32>,
    /// Drop filler words from the transcription.
    pub remove_filler_words: bool,
    /// Compact silences longer than the configured minimum before analysis.
    pub remove_silence: bool,
    /// Show progress spinners.
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context: String::new(),
            glossary: String::new(),
            speaker_count: None,
            remove_filler_words: false,
            remove_silence: true,
            show_progress: true,
        }
    }
}

/// Statistics from one analysis run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub total_time: Duration,
    pub preparation_time: Duration,
    pub analysis_time: Duration,
    pub audio_duration: Duration,
    pub silence_intervals_removed: usize,
    pub segments: usize,
}

/// Result of the analysis pipeline.
#[derive(Debug)]
pub struct PipelineResult {
    /// Segments on the original media timeline, sorted by start.
    pub store: SegmentStore,
    pub stats: PipelineStats,
}

fn spinner(mp: Option<&MultiProgress>, message: &str) -> Option<ProgressBar> {
    mp.map(|mp| {
        let pb = mp.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    })
}

/// Analyze a media file into a time-coded, speaker-attributed transcript.
///
/// Stages:
/// 1. Strip video and compress the audio for upload
/// 2. Optionally splice out long silences, recording the time offsets
/// 3. Transcribe with Gemini (inline payload or Files API)
/// 4. Remap timestamps onto the original timeline, align, filter, sort
/// 5. Persist the session sidecar next to the media file
pub async fn analyze_media(
    input: &Path,
    config: &Config,
    pipeline_config: &PipelineConfig,
    aligner: Option<&dyn Aligner>,
) -> Result<PipelineResult> {
    let start_time = Instant::now();

    if !input.exists() {
        return Err(MediacutError::FileNotFound(input.display().to_string()));
    }
    check_ffmpeg()?;

    let api_key = config
        .gemini_api_key
        .clone()
        .ok_or_else(|| MediacutError::Config("Gemini API key not set".to_string()))?;

    let multi_progress = if pipeline_config.show_progress {
        Some(MultiProgress::new())
    } else {
        None
    };

    // Intermediate audio lives in a temp directory cleaned up on drop.
    let temp_dir = TempDir::new()?;
    debug!("Using temp directory: {}", temp_dir.path().display());

    // Stage 1: audio preparation
    info!("Stage 1/4: Preparing audio from {}", input.display());
    let preparation_start = Instant::now();

    let prep_pb = spinner(multi_progress.as_ref(), "Preparing audio...");
    let audio_info = prepare_audio_for_ai(input, temp_dir.path()).await?;
    if let Some(pb) = prep_pb {
        pb.finish_with_message(format!(
            "Audio prepared ({:.1}s)",
            audio_info.duration.as_secs_f64()
        ));
    }

    // Stage 2: silence compaction
    let (analysis_path, offsets, silence_intervals) = if pipeline_config.remove_silence {
        info!("Stage 2/4: Removing long silences");
        let silence_pb = spinner(multi_progress.as_ref(), "Detecting silence...");
        let processed = remove_silence(&audio_info.path, config.silence_min_duration)?;
        if let Some(pb) = silence_pb {
            pb.finish_with_message(format!(
                "Removed {} silence interval(s)",
                processed.silence_intervals.len()
            ));
        }
        (
            processed.path,
            processed.offsets,
            processed.silence_intervals,
        )
    } else {
        info!("Stage 2/4: Silence removal disabled");
        (audio_info.path.clone(), Vec::new(), Vec::new())
    };
    let preparation_time = preparation_start.elapsed();

    // Stage 3: transcription
    info!("Stage 3/4: Transcribing with {}", config.model);
    let analysis_start = Instant::now();

    let client = GeminiClient::new(api_key)
        .with_base_url(config.base_url.clone())
        .with_model(config.model.clone());

    let analyze_pb = spinner(multi_progress.as_ref(), "Transcribing audio...");
    let payload = client.load_audio(&analysis_path).await?;
    let request = AnalyzeRequest {
        context: pipeline_config.context.clone(),
        glossary: pipeline_config.glossary.clone(),
        speaker_count: pipeline_config.speaker_count,
        remove_filler_words: pipeline_config.remove_filler_words,
    };
    let response = client.analyze_audio(&request, &payload).await?;
    let raw_segments = parse_segments(&response)?;
    if let Some(pb) = analyze_pb {
        pb.finish_with_message(format!("Transcribed {} segments", raw_segments.len()));
    }
    let analysis_time = analysis_start.elapsed();

    // Stage 4: retiming and cleanup
    info!("Stage 4/4: Mapping timestamps onto original timeline");
    let offset_map = OffsetMap::new(offsets);
    let segments = if offset_map.is_empty() {
        raw_segments
    } else {
        remap_segments(&raw_segments, &offset_map)
    };

    let segments = align_or_keep(aligner, input, segments).await;

    let kept = filter_silent_segments(&segments, &silence_intervals);
    debug!(
        "Dropped {} segment(s) lying inside removed silence",
        segments.len() - kept.len()
    );

    let store = SegmentStore::new(kept).sorted_by_start();

    let mut session = TranscriptSession::new(store.segments().to_vec());
    session.context = pipeline_config.context.clone();
    session.glossary = pipeline_config.glossary.clone();
    session.speaker_count = pipeline_config.speaker_count;
    session.remove_filler_words = pipeline_config.remove_filler_words;
    session.save(input)?;

    let stats = PipelineStats {
        total_time: start_time.elapsed(),
        preparation_time,
        analysis_time,
        audio_duration: audio_info.duration,
        silence_intervals_removed: silence_intervals.len(),
        segments: store.len(),
    };

    info!(
        "Analysis complete: {} segments in {:.2}s",
        stats.segments,
        stats.total_time.as_secs_f64()
    );

    Ok(PipelineResult { store, stats })
}

/// Translate the Original track into `language` and add it to the overlay.
///
/// An existing track is activated rather than refetched, so repeated
/// requests never clobber edits made to the translation. On a fresh fetch
/// the model response is parsed and validated before anything touches the
/// overlay; a malformed response leaves it unchanged.
pub async fn translate_track(
    client: &GeminiClient,
    overlay: &mut LanguageOverlay,
    language: &str,
    context: &str,
) -> Result<bool> {
    if overlay.has(language) {
        debug!("Track '{}' already exists, activating", language);
        overlay.activate(language);
        return Ok(false);
    }

    let original = overlay.get(crate::timeline::overlay::ORIGINAL_TRACK);
    let transcript_json = serde_json::to_string(original.segments())?;

    let response = client
        .translate_transcript(&transcript_json, language, context)
        .await?;
    let segments = parse_segments(&response)?;

    if segments.len() != original.len() {
        return Err(MediacutError::ResponseFormat(format!(
            "translation returned {} segments for {} inputs",
            segments.len(),
            original.len()
        )));
    }

    overlay.add_language(language, SegmentStore::new(segments));
    Ok(true)
}

/// Print a summary of the analysis results.
pub fn print_summary(result: &PipelineResult) {
    println!();
    println!("Analysis complete");
    println!("  Segments:         {}", result.stats.segments);
    println!(
        "  Audio duration:   {:.1}s",
        result.stats.audio_duration.as_secs_f64()
    );
    println!(
        "  Silences removed: {}",
        result.stats.silence_intervals_removed
    );
    println!("  Timing:");
    println!(
        "    Prepare:   {:.2}s",
        result.stats.preparation_time.as_secs_f64()
    );
    println!(
        "    Analyze:   {:.2}s",
        result.stats.analysis_time.as_secs_f64()
    );
    println!(
        "    Total:     {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
}
