//! Cutting and exporting media from padded export plans.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{MediacutError, Result};
use crate::timeline::clip::{ExportPlan, ExportRange};

use super::check_ffmpeg;

/// Progress event emitted while exporting clips.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    pub percentage: f64,
    pub current_clip: usize,
    pub total_clips: usize,
    pub message: String,
}

/// Cut possibly non-contiguous ranges out of a media file and concatenate
/// them into one output, in a single ffmpeg pass.
pub fn cut_video<F>(
    input: &Path,
    ranges: &[ExportRange],
    output: &Path,
    mut on_progress: F,
) -> Result<()>
where
    F: FnMut(f64),
{
    check_ffmpeg()?;

    if !input.exists() {
        return Err(MediacutError::FileNotFound(input.display().to_string()));
    }
    if ranges.is_empty() {
        return Err(MediacutError::Export("No ranges to cut".to_string()));
    }

    let filter_complex = build_cut_filter(ranges);
    let total: f64 = ranges.iter().map(|r| r.end - r.start).sum();

    info!(
        "Cutting {} range(s) from {} into {}",
        ranges.len(),
        input.display(),
        output.display()
    );

    let mut child = Command::new("ffmpeg")
        .args(["-y", "-progress", "pipe:1", "-i"])
        .arg(input)
        .args([
            "-filter_complex",
            &filter_complex,
            "-map",
            "[v]",
            "-map",
            "[a]",
            "-c:v",
            "libx264",
            "-c:a",
            "aac",
        ])
        .arg(output)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| MediacutError::Export(format!("Failed to spawn FFmpeg: {e}")))?;

    if let Some(stdout) = child.stdout.take() {
        let reader = BufReader::new(stdout);
        for line in reader.lines().map_while(|l| l.ok()) {
            if let Some(value) = line.strip_prefix("out_time_us=") {
                if let Ok(time_us) = value.trim().parse::<i64>() {
                    if time_us > 0 && total > 0.0 {
                        let secs = time_us as f64 / 1_000_000.0;
                        on_progress((secs / total).min(1.0));
                    }
                }
            }
        }
    }

    let status = child
        .wait()
        .map_err(|e| MediacutError::Export(format!("Failed to wait for FFmpeg: {e}")))?;

    if !status.success() {
        return Err(MediacutError::Export("FFmpeg cut failed".to_string()));
    }

    on_progress(1.0);
    Ok(())
}

/// One `trim`/`atrim` pair per range, concatenated into `[v][a]`.
fn build_cut_filter(ranges: &[ExportRange]) -> String {
    let mut filter = String::new();
    let mut inputs = String::new();

    for (i, range) in ranges.iter().enumerate() {
        filter.push_str(&format!(
            "[0:v]trim=start={:.3}:end={:.3},setpts=PTS-STARTPTS[v{}];",
            range.start, range.end, i
        ));
        filter.push_str(&format!(
            "[0:a]atrim=start={:.3}:end={:.3},asetpts=PTS-STARTPTS[a{}];",
            range.start, range.end, i
        ));
        inputs.push_str(&format!("[v{}][a{}]", i, i));
    }

    filter.push_str(&format!(
        "{}concat=n={}:v=1:a=1[v][a]",
        inputs,
        ranges.len()
    ));
    filter
}

/// Export each plan as its own clip file under `output_dir`.
///
/// `fast_mode` stream-copies single-range clips without re-encoding; spliced
/// clips always go through the filter graph, which requires a re-encode.
pub fn export_clips<F>(
    input: &Path,
    plans: &[ExportPlan],
    output_dir: &Path,
    fast_mode: bool,
    mut on_progress: F,
) -> Result<Vec<PathBuf>>
where
    F: FnMut(ExportProgress),
{
    check_ffmpeg()?;

    if output_dir.exists() {
        if !output_dir.is_dir() {
            return Err(MediacutError::Export(format!(
                "Output path exists and is not a directory: {}",
                output_dir.display()
            )));
        }
    } else {
        std::fs::create_dir_all(output_dir)?;
    }

    let total_clips = plans.len();
    let mut outputs = Vec::with_capacity(total_clips);

    for (i, plan) in plans.iter().enumerate() {
        let filename = clip_filename(i, &plan.title);
        let output = output_dir.join(&filename);

        on_progress(ExportProgress {
            percentage: i as f64 / total_clips as f64 * 100.0,
            current_clip: i + 1,
            total_clips,
            message: format!("Exporting {}", filename),
        });

        if fast_mode && plan.ranges.len() == 1 {
            export_single_range_copy(input, &plan.ranges[0], &output)?;
        } else {
            cut_video(input, &plan.ranges, &output, |p| {
                debug!("Clip {} progress: {:.0}%", i + 1, p * 100.0);
            })?;
        }

        outputs.push(output);
    }

    on_progress(ExportProgress {
        percentage: 100.0,
        current_clip: total_clips,
        total_clips,
        message: "Export complete".to_string(),
    });

    Ok(outputs)
}

fn export_single_range_copy(input: &Path, range: &ExportRange, output: &Path) -> Result<()> {
    let status = Command::new("ffmpeg")
        .args(["-y", "-ss", &format!("{:.3}", range.start)])
        .args(["-to", &format!("{:.3}", range.end)])
        .arg("-i")
        .arg(input)
        .args(["-c", "copy"])
        .arg(output)
        .status()
        .map_err(|e| MediacutError::Export(format!("Failed to run FFmpeg: {e}")))?;

    if !status.success() {
        return Err(MediacutError::Export(
            "FFmpeg stream-copy export failed".to_string(),
        ));
    }
    Ok(())
}

/// `clip_NNN.mp4`, with the title appended when it sanitizes to something.
fn clip_filename(index: usize, title: &str) -> String {
    let suffix: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if suffix.is_empty() {
        format!("clip_{:03}.mp4", index + 1)
    } else {
        format!("clip_{:03}_{}.mp4", index + 1, suffix)
    }
}
