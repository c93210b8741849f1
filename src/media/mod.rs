pub mod cut;
pub mod silence;

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{MediacutError, Result};

/// The compact audio copy handed to the transcription collaborator.
#[derive(Debug, Clone)]
pub struct AudioInfo {
    pub path: PathBuf,
    pub size: u64,
    pub duration: Duration,
}

/// Check if FFmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map_err(|e| {
            MediacutError::Media(format!(
                "FFmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(MediacutError::Media("FFmpeg check failed".to_string()));
    }

    debug!("FFmpeg is available");
    Ok(())
}

/// Check if FFprobe is installed and accessible.
pub fn check_ffprobe() -> Result<()> {
    let output = Command::new("ffprobe")
        .arg("-version")
        .output()
        .map_err(|e| {
            MediacutError::Media(format!(
                "FFprobe not found. Please install FFmpeg (includes FFprobe). Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(MediacutError::Media("FFprobe check failed".to_string()));
    }

    debug!("FFprobe is available");
    Ok(())
}

/// Authoritative media duration in seconds, via FFprobe.
pub fn probe_duration(input: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .output()
        .map_err(|e| MediacutError::Media(format!("Failed to run FFprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediacutError::Media(format!("FFprobe failed: {stderr}")));
    }

    let duration_str = String::from_utf8_lossy(&output.stdout);
    duration_str.trim().parse().map_err(|e| {
        MediacutError::Media(format!(
            "Failed to parse duration '{}': {e}",
            duration_str.trim()
        ))
    })
}

/// Strip the video track and transcode to Ogg Vorbis under `work_dir`.
///
/// A small compressed copy keeps inline-payload requests under the API size
/// threshold for most recordings.
pub async fn prepare_audio_for_ai(input: &Path, work_dir: &Path) -> Result<AudioInfo> {
    check_ffmpeg()?;
    check_ffprobe()?;

    if !input.exists() {
        return Err(MediacutError::FileNotFound(input.display().to_string()));
    }

    info!("Preparing audio copy of {}", input.display());

    let duration = probe_duration(input)?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio".to_string());
    let output = work_dir.join(format!("{}.ogg", stem));

    let status = Command::new("ffmpeg")
        .args(["-y", "-i"])
        .arg(input)
        .args(["-vn", "-c:a", "libvorbis", "-q:a", "4"])
        .arg(&output)
        .status()
        .map_err(|e| MediacutError::Media(format!("Failed to run FFmpeg: {e}")))?;

    if !status.success() {
        return Err(MediacutError::Media(
            "FFmpeg audio preparation failed".to_string(),
        ));
    }

    let size = std::fs::metadata(&output)?.len();
    info!("Audio prepared: {} ({} bytes)", output.display(), size);

    Ok(AudioInfo {
        path: output,
        size,
        duration: Duration::from_secs_f64(duration),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_check_ffmpeg() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: FFmpeg not available");
            return;
        }
        assert!(check_ffmpeg().is_ok());
    }

    #[tokio::test]
    async fn test_prepare_audio_file_not_found() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: FFmpeg not available");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let result = prepare_audio_for_ai(Path::new("/nonexistent/file.mp4"), dir.path()).await;
        assert!(matches!(result, Err(MediacutError::FileNotFound(_))));
    }
}
