// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! External media tool invocation.
//!
//! The media tool (ffmpeg by default) is treated as a black box that trims,
//! overlays, concatenates and grabs frames. This module builds its argument
//! lists and runs it through a [`ToolRunner`], so that the export pipeline
//! can be driven by a fake runner in tests.

use crate::error::ExportError;
use crate::models::clip::Clip;
use crate::util::time::{format_time, ms_to_secs_arg};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Runs one external program to completion.
pub trait ToolRunner: Send + Sync {
    /// Run `program` with `args`. Returns stdout on exit code 0; any other
    /// exit code yields [`ExportError::Tool`] carrying stderr verbatim.
    fn run(&self, program: &Path, args: &[OsString]) -> Result<String, ExportError>;
}

/// Runs programs as child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<String, ExportError> {
        let name = program.display().to_string();
        log::debug!("Running {} {:?}", name, args);

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let output = command.output().map_err(|source| ExportError::Spawn {
            program: name.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(ExportError::Tool {
                program: name,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Video codec for the final concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportCodec {
    /// Stream copy, fastest, keeps the source encoding.
    #[default]
    Copy,
    /// H.264 re-encode for maximum player compatibility.
    H264,
    /// HEVC re-encode, smaller files.
    H265,
}

impl ExportCodec {
    pub const ALL: [ExportCodec; 3] = [ExportCodec::Copy, ExportCodec::H264, ExportCodec::H265];

    pub fn label(self) -> &'static str {
        match self {
            ExportCodec::Copy => "Copy (fast)",
            ExportCodec::H264 => "H.264 (compatible)",
            ExportCodec::H265 => "H.265 (small)",
        }
    }
}

/// Output container for batch exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    #[default]
    Mp4,
    Avi,
    Mov,
}

impl Container {
    pub const ALL: [Container; 3] = [Container::Mp4, Container::Avi, Container::Mov];

    pub fn extension(self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Avi => "avi",
            Container::Mov => "mov",
        }
    }
}

/// One line group of a concat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConcatEntry {
    /// A complete file, e.g. an overlaid temporary.
    Whole(PathBuf),
    /// A range of the source video.
    Range {
        video: PathBuf,
        start_ms: u64,
        end_ms: u64,
    },
}

impl ConcatEntry {
    pub fn range(video: &Path, clip: &Clip) -> Self {
        ConcatEntry::Range {
            video: video.to_path_buf(),
            start_ms: clip.start_ms,
            end_ms: clip.end_ms,
        }
    }
}

/// Text of a concat demuxer list for `entries`, in order.
pub fn concat_list_text(entries: &[ConcatEntry]) -> String {
    let mut text = String::new();
    for entry in entries {
        match entry {
            ConcatEntry::Whole(path) => {
                text.push_str(&format!("file {}\n", quote_list_path(path)));
            }
            ConcatEntry::Range {
                video,
                start_ms,
                end_ms,
            } => {
                text.push_str(&format!("file {}\n", quote_list_path(video)));
                text.push_str(&format!("inpoint {}\n", ms_to_secs_arg(*start_ms)));
                text.push_str(&format!("outpoint {}\n", ms_to_secs_arg(*end_ms)));
            }
        }
    }
    text
}

pub fn write_concat_list(path: &Path, entries: &[ConcatEntry]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(concat_list_text(entries).as_bytes())?;
    file.sync_all()
}

/// Single-quote a path for a concat list; embedded quotes become `'\''`.
fn quote_list_path(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// Escape text for use inside a quoted drawtext value.
pub fn escape_drawtext(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str(r"\\"),
            ':' => escaped.push_str(r"\:"),
            '%' => escaped.push_str(r"\%"),
            '\'' => escaped.push('\u{2019}'),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Caption burned into an overlaid clip.
pub fn overlay_caption(clip: &Clip) -> String {
    format!("{}  {}", clip.name, format_time(clip.start_ms))
}

/// Argument builders for the media and probe executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTool {
    pub program: PathBuf,
    pub probe: PathBuf,
}

impl Default for MediaTool {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl MediaTool {
    pub fn new(program: impl Into<PathBuf>, probe: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            probe: probe.into(),
        }
    }

    /// Trim `[start_ms, end_ms)` with stream copy of both tracks.
    pub fn trim_copy_args(&self, video: &Path, start_ms: u64, end_ms: u64, out: &Path) -> Vec<OsString> {
        let mut args = seek_args(video, start_ms, end_ms);
        args.extend(["-c", "copy", "-y"].map(OsString::from));
        args.push(out.into());
        args
    }

    /// Trim a clip and burn its caption in. Video is re-encoded, audio copied.
    pub fn overlay_args(&self, video: &Path, clip: &Clip, out: &Path) -> Vec<OsString> {
        let filter = format!(
            "drawtext=text='{}':fontcolor=white:fontsize=28:box=1:boxcolor=black@0.55:boxborderw=10:x=24:y=24",
            escape_drawtext(&overlay_caption(clip))
        );
        let mut args = seek_args(video, clip.start_ms, clip.end_ms);
        args.push("-vf".into());
        args.push(filter.into());
        args.extend(
            [
                "-c:v", "libx264", "-preset", "veryfast", "-crf", "23", "-c:a", "copy", "-y",
            ]
            .map(OsString::from),
        );
        args.push(out.into());
        args
    }

    /// Concatenate a list file into `out`.
    pub fn concat_args(&self, list: &Path, out: &Path, codec: ExportCodec) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-f", "concat", "-safe", "0", "-i"]
            .map(OsString::from)
            .into();
        args.push(list.into());
        let encoder = match codec {
            ExportCodec::Copy => None,
            ExportCodec::H264 => Some("libx264"),
            ExportCodec::H265 => Some("libx265"),
        };
        match encoder {
            None => args.extend(["-c", "copy"].map(OsString::from)),
            Some(encoder) => args.extend(
                [
                    "-c:v", encoder, "-preset", "medium", "-crf", "23", "-c:a", "aac", "-b:a",
                    "128k",
                ]
                .map(OsString::from),
            ),
        }
        args.push("-y".into());
        args.push(out.into());
        args
    }

    /// Grab one frame at `position_ms` as a high quality JPEG.
    pub fn screenshot_args(&self, video: &Path, position_ms: u64, out: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-ss".into(), ms_to_secs_arg(position_ms).into()];
        args.push("-i".into());
        args.push(video.into());
        args.extend(["-frames:v", "1", "-q:v", "2", "-y"].map(OsString::from));
        args.push(out.into());
        args
    }

    pub fn probe_args(&self, video: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-v", "error", "-show_entries", "format=duration", "-of", "json"]
            .map(OsString::from)
            .into();
        args.push(video.into());
        args
    }

    /// Duration of `video` in milliseconds, read with the probe executable.
    pub fn probe_duration_ms(&self, runner: &dyn ToolRunner, video: &Path) -> Result<u64, ExportError> {
        let stdout = runner.run(&self.probe, &self.probe_args(video))?;
        parse_probe_duration(&stdout).ok_or_else(|| ExportError::Tool {
            program: self.probe.display().to_string(),
            stderr: format!("no duration in probe output: {}", stdout.trim()),
        })
    }
}

fn seek_args(video: &Path, start_ms: u64, end_ms: u64) -> Vec<OsString> {
    vec![
        "-ss".into(),
        ms_to_secs_arg(start_ms).into(),
        "-i".into(),
        video.into(),
        "-t".into(),
        ms_to_secs_arg(end_ms.saturating_sub(start_ms)).into(),
    ]
}

/// Extract `format.duration` (seconds, as a string or number) in ms.
pub fn parse_probe_duration(stdout: &str) -> Option<u64> {
    let json: serde_json::Value = serde_json::from_str(stdout).ok()?;
    let duration = &json["format"]["duration"];
    let secs = match duration {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        other => other.as_f64()?,
    };
    (secs.is_finite() && secs >= 0.0).then(|| (secs * 1000.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip() -> Clip {
        Clip {
            start_ms: 65_000,
            end_ms: 75_500,
            category: "SALIDA".into(),
            sequence_number: 3,
            name: "SALIDA 3".into(),
            color: "#2980b9".into(),
            tag_ids: Default::default(),
            notes: String::new(),
        }
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_trim_is_seek_duration_copy() {
        let tool = MediaTool::default();
        let args = tool.trim_copy_args(Path::new("m.mp4"), 65_000, 75_500, Path::new("out.mp4"));
        assert_eq!(
            strings(&args),
            ["-ss", "65.000", "-i", "m.mp4", "-t", "10.500", "-c", "copy", "-y", "out.mp4"]
        );
    }

    #[test]
    fn test_overlay_reencodes_video_and_copies_audio() {
        let tool = MediaTool::default();
        let args = strings(&tool.overlay_args(Path::new("m.mp4"), &clip(), Path::new("t.mp4")));
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert!(args[vf + 1].starts_with("drawtext=text='SALIDA 3  01\\:05'"));
        let tail = &args[vf + 2..];
        assert_eq!(
            tail,
            ["-c:v", "libx264", "-preset", "veryfast", "-crf", "23", "-c:a", "copy", "-y", "t.mp4"]
        );
    }

    #[test]
    fn test_concat_modes() {
        let tool = MediaTool::default();
        let copy = strings(&tool.concat_args(Path::new("l.txt"), Path::new("o.mp4"), ExportCodec::Copy));
        assert_eq!(
            copy,
            ["-f", "concat", "-safe", "0", "-i", "l.txt", "-c", "copy", "-y", "o.mp4"]
        );
        let h265 = strings(&tool.concat_args(Path::new("l.txt"), Path::new("o.mp4"), ExportCodec::H265));
        assert!(h265.windows(2).any(|w| w == ["-c:v", "libx265"]));
        assert!(h265.windows(2).any(|w| w == ["-b:a", "128k"]));
    }

    #[test]
    fn test_concat_list_mixes_files_and_ranges() {
        let entries = vec![
            ConcatEntry::Whole(PathBuf::from("/tmp/clip_0.mp4")),
            ConcatEntry::range(Path::new("/videos/it's a match.mp4"), &clip()),
        ];
        assert_eq!(
            concat_list_text(&entries),
            "file '/tmp/clip_0.mp4'\n\
             file '/videos/it'\\''s a match.mp4'\n\
             inpoint 65.000\n\
             outpoint 75.500\n"
        );
    }

    #[test]
    fn test_drawtext_escaping() {
        assert_eq!(escape_drawtext("a:b%c\\d'e"), "a\\:b\\%c\\\\d\u{2019}e");
    }

    #[test]
    fn test_probe_output_parsing() {
        assert_eq!(
            parse_probe_duration(r#"{"format": {"duration": "5400.123"}}"#),
            Some(5_400_123)
        );
        assert_eq!(parse_probe_duration(r#"{"format": {"duration": 12.5}}"#), Some(12_500));
        assert_eq!(parse_probe_duration(r#"{"format": {}}"#), None);
        assert_eq!(parse_probe_duration("garbage"), None);
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let err = ProcessRunner
            .run(Path::new("/definitely/not/a/real/tool"), &[])
            .unwrap_err();
        assert!(matches!(err, ExportError::Spawn { .. }));
    }
}
