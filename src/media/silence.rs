//! Silence detection and removal.
//!
//! Detection parses ffmpeg's `silencedetect` log lines; removal splices the
//! silent stretches out with an `atrim`/`concat` filter graph and records
//! one cumulative [`SegmentOffset`] breakpoint per kept stretch, so model
//! timestamps measured against the compacted file can be mapped back onto
//! the original timeline.

use std::path::{Path, PathBuf};
use std::process::Command;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MediacutError, Result};
use crate::timeline::offset::SegmentOffset;
use crate::timeline::silence::SilenceInterval;

use super::{check_ffmpeg, probe_duration};

/// The product of one silence-removal run.
///
/// `silence_intervals` and `offsets` describe the same excisions in two
/// representations and are always derived together; mixing fields from
/// different runs breaks timestamp remapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedAudio {
    pub path: PathBuf,
    pub silence_intervals: Vec<SilenceInterval>,
    pub offsets: Vec<SegmentOffset>,
}

/// Noise floor below which audio counts as silence.
const NOISE_THRESHOLD_DB: f64 = -30.0;

/// Detect silence intervals with ffmpeg's `silencedetect` filter.
pub fn detect_silence(input: &Path, min_duration: f64) -> Result<Vec<SilenceInterval>> {
    check_ffmpeg()?;

    if !input.exists() {
        return Err(MediacutError::FileNotFound(input.display().to_string()));
    }

    info!(
        "Detecting silence in {} (min {}s)",
        input.display(),
        min_duration
    );

    let output = Command::new("ffmpeg")
        .args(["-i"])
        .arg(input)
        .args([
            "-af",
            &format!(
                "silencedetect=noise={}dB:d={}",
                NOISE_THRESHOLD_DB, min_duration
            ),
            "-f",
            "null",
            "-",
        ])
        .output()
        .map_err(|e| MediacutError::Media(format!("Failed to run FFmpeg: {e}")))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    Ok(parse_silencedetect(&stderr))
}

/// Parse `silence_start:`/`silence_end:` pairs from ffmpeg log output.
fn parse_silencedetect(log: &str) -> Vec<SilenceInterval> {
    let re_start = Regex::new(r"silence_start: (\d+(?:\.\d+)?)").expect("Invalid regex");
    let re_end = Regex::new(r"silence_end: (\d+(?:\.\d+)?)").expect("Invalid regex");

    let mut intervals = Vec::new();
    let mut current_start = None;

    for line in log.lines() {
        if let Some(caps) = re_start.captures(line) {
            if let Ok(val) = caps[1].parse::<f64>() {
                current_start = Some(val);
                debug!("Silence start at {}", val);
            }
        } else if let Some(caps) = re_end.captures(line) {
            if let (Ok(end), Some(start)) = (caps[1].parse::<f64>(), current_start.take()) {
                debug!("Silence interval {} - {}", start, end);
                intervals.push(SilenceInterval::new(start, end));
            }
        }
    }

    intervals
}

/// The stretches of audio to keep, plus the remap breakpoints they imply.
///
/// Pure planning step, separated out so the offset math is testable without
/// ffmpeg. Each kept stretch contributes one breakpoint: at the compacted
/// time where it begins, the cumulative offset equals the original start
/// minus the compacted start.
pub fn plan_keep_segments(
    intervals: &[SilenceInterval],
    total_duration: f64,
) -> (Vec<(f64, f64)>, Vec<SegmentOffset>) {
    let mut keep = Vec::new();
    let mut last_end = 0.0;

    for interval in intervals {
        if interval.start > last_end {
            keep.push((last_end, interval.start));
        }
        last_end = interval.end;
    }
    if total_duration > last_end {
        keep.push((last_end, total_duration));
    }

    let mut offsets = Vec::with_capacity(keep.len());
    let mut compacted_time = 0.0;
    for &(start, end) in &keep {
        offsets.push(SegmentOffset {
            min_time: compacted_time,
            offset: start - compacted_time,
        });
        compacted_time += end - start;
    }

    (keep, offsets)
}

/// Remove detected silence, producing a compacted Ogg copy next to the
/// input plus the data needed to undo the time shift.
///
/// When nothing qualifies for removal the input passes through untouched
/// with a single zero breakpoint.
pub fn remove_silence(input: &Path, min_duration: f64) -> Result<ProcessedAudio> {
    let silence_intervals = detect_silence(input, min_duration)?;

    if silence_intervals.is_empty() {
        return Ok(ProcessedAudio {
            path: input.to_path_buf(),
            silence_intervals,
            offsets: vec![SegmentOffset {
                min_time: 0.0,
                offset: 0.0,
            }],
        });
    }

    let duration = probe_duration(input)?;
    let (keep, offsets) = plan_keep_segments(&silence_intervals, duration);

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio".to_string());
    let output = input.with_file_name(format!("{}_nosilence.ogg", stem));

    let filter_complex = build_silence_filter(&keep);
    info!(
        "Removing {} silence intervals from {}",
        silence_intervals.len(),
        input.display()
    );

    let status = Command::new("ffmpeg")
        .args(["-y", "-i"])
        .arg(input)
        .args([
            "-filter_complex",
            &filter_complex,
            "-map",
            "[outa]",
            "-c:a",
            "libvorbis",
            "-q:a",
            "4",
        ])
        .arg(&output)
        .status()
        .map_err(|e| MediacutError::Media(format!("Failed to run FFmpeg: {e}")))?;

    if !status.success() {
        return Err(MediacutError::Media(
            "FFmpeg silence removal failed".to_string(),
        ));
    }

    info!("Silence removed: {}", output.display());

    Ok(ProcessedAudio {
        path: output,
        silence_intervals,
        offsets,
    })
}

fn build_silence_filter(keep: &[(f64, f64)]) -> String {
    let mut filter = String::new();
    let mut inputs = String::new();

    for (i, (start, end)) in keep.iter().enumerate() {
        filter.push_str(&format!(
            "[0:a]atrim=start={}:end={},asetpts=PTS-STARTPTS[a{}];",
            start, end, i
        ));
        inputs.push_str(&format!("[a{}]", i));
    }

    filter.push_str(&format!("{}concat=n={}:v=0:a=1[outa]", inputs, keep.len()));
    filter
}
