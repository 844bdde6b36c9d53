// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Export pipeline: playlists, batch exports, single-clip renders and
//! screenshots.
//!
//! Every operation runs on its own worker thread and reports back through an
//! [`ExportEvent`] channel that the UI polls each frame. A job owns a
//! snapshot of the clips it renders, so edits made after launch do not
//! affect it.

use super::media::{write_concat_list, ConcatEntry, ExportCodec, MediaTool, ToolRunner};
use super::paths::safe_file_name;
use crate::error::ExportError;
use crate::models::clip::Clip;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

/// Progress and completion signals from a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    /// Percentage, 0 to 100.
    Progress(u8),
    Finished(PathBuf),
    Failed(String),
}

/// One concatenation job: a playlist or a whole-project export.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub video: PathBuf,
    pub clips: Vec<Clip>,
    pub output: PathBuf,
    pub codec: ExportCodec,
    /// Burn a caption into each clip before concatenating.
    pub overlay: bool,
    /// Where per-clip temporaries and the concat list are written.
    pub temp_dir: PathBuf,
    /// Unique per job; keeps temporaries of concurrent jobs apart.
    pub stamp: String,
}

impl ExportJob {
    pub fn new(video: &Path, clips: Vec<Clip>, output: PathBuf, temp_dir: PathBuf) -> Self {
        Self {
            video: video.to_path_buf(),
            clips,
            output,
            codec: ExportCodec::Copy,
            overlay: false,
            temp_dir,
            stamp: chrono::Local::now().format("%Y%m%d%H%M%S%3f").to_string(),
        }
    }

    fn temp_clip_path(&self, index: usize) -> PathBuf {
        self.temp_dir
            .join(format!("clip_{}_{:03}.mp4", self.stamp, index))
    }

    fn list_path(&self) -> PathBuf {
        self.temp_dir.join(format!("concat_{}.txt", self.stamp))
    }
}

/// Deletes the files it holds when dropped, whatever the outcome.
struct TempFiles(Vec<PathBuf>);

impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in &self.0 {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    log::warn!("Could not remove temporary {}: {}", path.display(), e);
                }
            }
        }
    }
}

/// Run a concatenation job on the calling thread.
///
/// Progress: 0 to 50 across per-clip processing, 75 once the list file is
/// written, 100 after the final concatenation. A clip whose overlay fails is
/// taken straight from the source video instead.
pub fn run_export(
    job: &ExportJob,
    tool: &MediaTool,
    runner: &dyn ToolRunner,
    emit: &mut dyn FnMut(ExportEvent),
) -> Result<PathBuf, ExportError> {
    if job.clips.is_empty() {
        return Err(ExportError::NoClips);
    }
    emit(ExportEvent::Progress(0));
    std::fs::create_dir_all(&job.temp_dir)?;
    let mut temps = TempFiles(Vec::new());

    let total = job.clips.len();
    let mut entries = Vec::with_capacity(total);
    for (index, clip) in job.clips.iter().enumerate() {
        let entry = if job.overlay {
            let temp = job.temp_clip_path(index);
            temps.0.push(temp.clone());
            match runner.run(&tool.program, &tool.overlay_args(&job.video, clip, &temp)) {
                Ok(_) => ConcatEntry::Whole(temp),
                Err(e) => {
                    log::warn!("Overlay failed for {}, using source range: {}", clip.name, e);
                    ConcatEntry::range(&job.video, clip)
                }
            }
        } else {
            ConcatEntry::range(&job.video, clip)
        };
        entries.push(entry);
        emit(ExportEvent::Progress((50 * (index + 1) / total) as u8));
    }

    let list = job.list_path();
    temps.0.push(list.clone());
    write_concat_list(&list, &entries)?;
    emit(ExportEvent::Progress(75));

    if let Some(parent) = job.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    runner.run(&tool.program, &tool.concat_args(&list, &job.output, job.codec))?;
    emit(ExportEvent::Progress(100));
    log::info!("Exported {} clips to {}", total, job.output.display());
    Ok(job.output.clone())
}

/// Output path of a single-clip render.
pub fn render_output_path(folder: &Path, clip: &Clip) -> PathBuf {
    folder.join(format!("{}_{}.mp4", safe_file_name(&clip.name), clip.start_ms))
}

/// Trim one clip with stream copy into `folder`.
pub fn render_clip(
    video: &Path,
    clip: &Clip,
    folder: &Path,
    tool: &MediaTool,
    runner: &dyn ToolRunner,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(folder)?;
    let out = render_output_path(folder, clip);
    runner.run(
        &tool.program,
        &tool.trim_copy_args(video, clip.start_ms, clip.end_ms, &out),
    )?;
    log::info!("Rendered {} to {}", clip.name, out.display());
    Ok(out)
}

/// Grab the frame at `position_ms` into `dir/Cap_{position_ms}.jpg`.
pub fn capture_frame(
    video: &Path,
    position_ms: u64,
    dir: &Path,
    tool: &MediaTool,
    runner: &dyn ToolRunner,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let out = dir.join(format!("Cap_{}.jpg", position_ms));
    runner.run(&tool.program, &tool.screenshot_args(video, position_ms, &out))?;
    Ok(out)
}

/// Run `work` on a new thread, forwarding its events and a terminal
/// `Finished` or `Failed`.
pub fn spawn_worker<F>(name: &str, work: F) -> Receiver<ExportEvent>
where
    F: FnOnce(&mut dyn FnMut(ExportEvent)) -> Result<PathBuf, ExportError> + Send + 'static,
{
    let (sender, receiver) = channel();
    let name = name.to_string();
    std::thread::spawn(move || {
        let progress = sender.clone();
        let mut emit = move |event: ExportEvent| {
            let _ = progress.send(event);
        };
        let terminal = match work(&mut emit) {
            Ok(path) => ExportEvent::Finished(path),
            Err(e) => {
                log::error!("{} failed: {}", name, e);
                ExportEvent::Failed(e.to_string())
            }
        };
        let _ = sender.send(terminal);
    });
    receiver
}

pub fn spawn_export(job: ExportJob, tool: MediaTool, runner: Arc<dyn ToolRunner>) -> Receiver<ExportEvent> {
    spawn_worker("Export", move |emit| run_export(&job, &tool, runner.as_ref(), emit))
}

pub fn spawn_render(
    video: PathBuf,
    clip: Clip,
    folder: PathBuf,
    tool: MediaTool,
    runner: Arc<dyn ToolRunner>,
) -> Receiver<ExportEvent> {
    spawn_worker("Render", move |emit| {
        emit(ExportEvent::Progress(0));
        render_clip(&video, &clip, &folder, &tool, runner.as_ref())
    })
}

pub fn spawn_capture(
    video: PathBuf,
    position_ms: u64,
    dir: PathBuf,
    tool: MediaTool,
    runner: Arc<dyn ToolRunner>,
) -> Receiver<ExportEvent> {
    spawn_worker("Screenshot", move |_| {
        capture_frame(&video, position_ms, &dir, &tool, runner.as_ref())
    })
}

/// Probe the video duration off the UI thread.
pub fn spawn_probe(video: PathBuf, tool: MediaTool, runner: Arc<dyn ToolRunner>) -> Receiver<Result<u64, String>> {
    let (sender, receiver) = channel();
    std::thread::spawn(move || {
        let result = tool
            .probe_duration_ms(runner.as_ref(), &video)
            .map_err(|e| e.to_string());
        let _ = sender.send(result);
    });
    receiver
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::sync::Mutex;

    /// Records calls, creates the output file of successful ones and fails
    /// any call whose output path contains `fail_on`.
    #[derive(Default)]
    struct FakeRunner {
        calls: Mutex<Vec<Vec<String>>>,
        lists: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl FakeRunner {
        fn failing_on(marker: &str) -> Self {
            Self {
                fail_on: Some(marker.to_string()),
                ..Default::default()
            }
        }
    }

    impl ToolRunner for FakeRunner {
        fn run(&self, program: &Path, args: &[OsString]) -> Result<String, ExportError> {
            let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
            self.calls.lock().unwrap().push(args.clone());
            if let Some(i) = args.iter().position(|a| a == "concat") {
                let list = &args[i + 4];
                self.lists
                    .lock()
                    .unwrap()
                    .push(std::fs::read_to_string(list).unwrap());
            }
            let out = args.last().cloned().unwrap_or_default();
            if let Some(marker) = &self.fail_on {
                if out.contains(marker.as_str()) {
                    return Err(ExportError::Tool {
                        program: program.display().to_string(),
                        stderr: "Invalid data found when processing input".into(),
                    });
                }
            }
            std::fs::write(&out, b"fake").unwrap();
            Ok(String::new())
        }
    }

    fn clips() -> Vec<Clip> {
        (0..3u64)
            .map(|i| Clip {
                start_ms: 10_000 * (i + 1),
                end_ms: 10_000 * (i + 1) + 5_000,
                category: "SALIDA".into(),
                sequence_number: i as u32 + 1,
                name: format!("SALIDA {}", i + 1),
                color: "#2980b9".into(),
                tag_ids: Default::default(),
                notes: String::new(),
            })
            .collect()
    }

    fn job(dir: &Path, overlay: bool) -> ExportJob {
        let mut job = ExportJob::new(
            Path::new("/videos/match.mp4"),
            clips(),
            dir.join("out").join("PLAYLIST.mp4"),
            dir.join("tmp"),
        );
        job.overlay = overlay;
        job.stamp = "test".into();
        job
    }

    fn collect(job: &ExportJob, runner: &FakeRunner) -> (Result<PathBuf, ExportError>, Vec<ExportEvent>) {
        let mut events = Vec::new();
        let result = run_export(job, &MediaTool::default(), runner, &mut |e| events.push(e));
        (result, events)
    }

    #[test]
    fn test_plain_playlist_concatenates_source_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default();
        let job = job(dir.path(), false);
        let (result, events) = collect(&job, &runner);

        assert_eq!(result.unwrap(), job.output);
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let list = &runner.lists.lock().unwrap()[0];
        assert_eq!(list.matches("inpoint").count(), 3);
        assert!(list.starts_with("file '/videos/match.mp4'\ninpoint 10.000\noutpoint 15.000\n"));

        assert_eq!(events.first(), Some(&ExportEvent::Progress(0)));
        assert_eq!(events.last(), Some(&ExportEvent::Progress(100)));
        assert!(events.contains(&ExportEvent::Progress(50)));
        assert!(events.contains(&ExportEvent::Progress(75)));
    }

    #[test]
    fn test_failed_overlay_falls_back_to_source_range() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::failing_on("clip_test_001");
        let job = job(dir.path(), true);
        let (result, _) = collect(&job, &runner);
        assert!(result.is_ok());

        let list = &runner.lists.lock().unwrap()[0];
        let files: Vec<&str> = list.lines().filter(|l| l.starts_with("file ")).collect();
        assert_eq!(files.len(), 3);
        assert!(files[0].contains("clip_test_000.mp4"));
        assert_eq!(files[1], "file '/videos/match.mp4'");
        assert!(files[2].contains("clip_test_002.mp4"));
        assert!(list.contains("inpoint 20.000\noutpoint 25.000\n"));
    }

    #[test]
    fn test_temporaries_are_removed_after_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join("tmp");

        let ok = FakeRunner::default();
        collect(&job(dir.path(), true), &ok).0.unwrap();
        assert_eq!(std::fs::read_dir(&tmp).unwrap().count(), 0);

        let failing = FakeRunner::failing_on("PLAYLIST");
        let (result, events) = collect(&job(dir.path(), true), &failing);
        match result {
            Err(ExportError::Tool { stderr, .. }) => {
                assert_eq!(stderr, "Invalid data found when processing input")
            }
            other => panic!("expected tool failure, got {other:?}"),
        }
        assert!(!events.contains(&ExportEvent::Progress(100)));
        assert_eq!(std::fs::read_dir(&tmp).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_job_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job(dir.path(), false);
        job.clips.clear();
        assert!(matches!(
            collect(&job, &FakeRunner::default()).0,
            Err(ExportError::NoClips)
        ));
    }

    #[test]
    fn test_worker_reports_terminal_event() {
        let dir = tempfile::tempdir().unwrap();
        let rx = spawn_export(
            job(dir.path(), false),
            MediaTool::default(),
            Arc::new(FakeRunner::default()),
        );
        let events: Vec<_> = rx.iter().collect();
        assert_eq!(
            events.last(),
            Some(&ExportEvent::Finished(dir.path().join("out").join("PLAYLIST.mp4")))
        );
    }

    #[test]
    fn test_render_writes_named_output() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("Salida_Propia");
        let clip = &clips()[1];
        let rx = spawn_render(
            PathBuf::from("/videos/match.mp4"),
            clip.clone(),
            folder.clone(),
            MediaTool::default(),
            Arc::new(FakeRunner::default()),
        );
        let events: Vec<_> = rx.iter().collect();
        let expected = folder.join("SALIDA_2_20000.mp4");
        assert_eq!(events, [ExportEvent::Progress(0), ExportEvent::Finished(expected.clone())]);
        assert!(expected.is_file());
    }

    #[test]
    fn test_render_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let rx = spawn_render(
            PathBuf::from("/videos/match.mp4"),
            clips()[0].clone(),
            dir.path().to_path_buf(),
            MediaTool::default(),
            Arc::new(FakeRunner::failing_on("SALIDA_1")),
        );
        match rx.iter().last() {
            Some(ExportEvent::Failed(msg)) => {
                assert!(msg.ends_with("Invalid data found when processing input"))
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_capture_names_file_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let out = capture_frame(
            Path::new("/videos/match.mp4"),
            754_000,
            dir.path(),
            &MediaTool::default(),
            &FakeRunner::default(),
        )
        .unwrap();
        assert_eq!(out, dir.path().join("Cap_754000.jpg"));
    }
}
