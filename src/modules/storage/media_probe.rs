//! External media tooling
//!
//! Wraps ImageMagick `identify`, `ffprobe` and `ffmpeg` to recover image
//! dimensions, video duration and a poster frame for uploaded files.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Error type for media probing operations.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{tool} could not be started: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("{tool} failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse {tool} output: {output}")]
    Parse { tool: String, output: String },
}

/// Subset of `ffprobe -print_format json -show_format` output.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Media probing backed by external binaries
#[derive(Debug, Clone)]
pub struct MediaProbe {
    identify_bin: String,
    ffprobe_bin: String,
    ffmpeg_bin: String,
}

impl MediaProbe {
    pub fn new(
        identify_bin: impl Into<String>,
        ffprobe_bin: impl Into<String>,
        ffmpeg_bin: impl Into<String>,
    ) -> Self {
        Self {
            identify_bin: identify_bin.into(),
            ffprobe_bin: ffprobe_bin.into(),
            ffmpeg_bin: ffmpeg_bin.into(),
        }
    }

    /// Width and height of an image in pixels.
    ///
    /// Only the first frame is inspected so animated GIFs report one size.
    pub async fn image_dimensions(&self, path: &Path) -> Result<(u32, u32), ProbeError> {
        let target = format!("{}[0]", path.display());
        let stdout = run(&self.identify_bin, |cmd| {
            cmd.args(["-format", "%w %h"]).arg(&target);
        })
        .await?;

        parse_dimensions(&stdout).ok_or_else(|| ProbeError::Parse {
            tool: self.identify_bin.clone(),
            output: stdout,
        })
    }

    /// Duration of a video in seconds.
    pub async fn video_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        let stdout = run(&self.ffprobe_bin, |cmd| {
            cmd.args(["-v", "quiet", "-print_format", "json", "-show_format"])
                .arg(path);
        })
        .await?;

        parse_ffprobe_duration(&stdout).ok_or_else(|| ProbeError::Parse {
            tool: self.ffprobe_bin.clone(),
            output: stdout,
        })
    }

    /// Write a single JPEG frame taken one second into the video.
    pub async fn extract_poster(&self, video: &Path, output: &Path) -> Result<(), ProbeError> {
        run(&self.ffmpeg_bin, |cmd| {
            cmd.args(["-y", "-v", "error", "-ss", "1", "-i"])
                .arg(video)
                .args(["-frames:v", "1", "-q:v", "3"])
                .arg(output);
        })
        .await?;
        Ok(())
    }
}

async fn run(
    tool: &str,
    configure: impl FnOnce(&mut tokio::process::Command),
) -> Result<String, ProbeError> {
    let mut cmd = tokio::process::Command::new(tool);
    configure(&mut cmd);

    let output = cmd.output().await.map_err(|source| ProbeError::Spawn {
        tool: tool.to_string(),
        source,
    })?;

    if !output.status.success() {
        return Err(ProbeError::ExecutionFailed {
            tool: tool.to_string(),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Parse `identify -format "%w %h"` output.
pub fn parse_dimensions(output: &str) -> Option<(u32, u32)> {
    let mut parts = output.split_whitespace();
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

/// Pull `format.duration` out of ffprobe's JSON output.
pub fn parse_ffprobe_duration(output: &str) -> Option<f64> {
    let parsed: FfprobeOutput = serde_json::from_str(output).ok()?;
    parsed
        .format
        .duration?
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("1920 1080"), Some((1920, 1080)));
        assert_eq!(parse_dimensions("640 480\n"), Some((640, 480)));
        assert_eq!(parse_dimensions("640"), None);
        assert_eq!(parse_dimensions("0 480"), None);
        assert_eq!(parse_dimensions("abc def"), None);
    }

    #[test]
    fn test_parse_ffprobe_duration() {
        let output = r#"{"format": {"filename": "clip.mp4", "duration": "12.480000", "size": "1024"}}"#;
        assert_eq!(parse_ffprobe_duration(output), Some(12.48));

        let no_duration = r#"{"format": {"filename": "clip.mp4"}}"#;
        assert_eq!(parse_ffprobe_duration(no_duration), None);

        assert_eq!(parse_ffprobe_duration("not json"), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported_as_spawn_error() {
        let probe = MediaProbe::new(
            "definitely-not-identify",
            "definitely-not-ffprobe",
            "definitely-not-ffmpeg",
        );

        let err = probe
            .image_dimensions(Path::new("/tmp/nothing.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));

        let err = probe
            .video_duration(Path::new("/tmp/nothing.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }
}
