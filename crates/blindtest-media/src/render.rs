//! Timeline rendering with FFmpeg.
//!
//! Every segment is encoded to an intermediate Matroska file with the same
//! codecs and stream layout, then the concat demuxer joins them with stream
//! copy. The joined file is moved onto the requested output only once it is
//! complete.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use blindtest_core::{Assembler, RenderError};
use blindtest_models::{ClipPlan, EncodingConfig, RenderMode, Segment, SilenceSpec, Timeline};

use crate::command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
use crate::fs_utils::move_file;

/// Per-segment encode timeout in seconds.
const SEGMENT_TIMEOUT_SECS: u64 = 300;

const CONCAT_LIST_NAME: &str = "concat.txt";

/// Assembles timelines into one file using the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegAssembler {
    /// Parent of the per-render scratch directory
    work_dir: PathBuf,
}

impl FfmpegAssembler {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Intermediate encode for one clip.
    fn clip_command(
        clip: &ClipPlan,
        mode: RenderMode,
        encoding: &EncodingConfig,
        output: &Path,
    ) -> FfmpegCommand {
        let cmd = FfmpegCommand::new(clip.source.path(), output)
            .seek(clip.start_offset)
            .duration(clip.length);

        let cmd = match mode {
            RenderMode::Audio => cmd.output_args(["-map", "0:a:0"]).no_video(),
            RenderMode::AudioVideo => cmd
                .output_args(["-map", "0:v:0", "-map", "0:a:0"])
                .video_filter(encoding.canvas_filter())
                .output_args(encoding.video_args()),
        };

        cmd.output_args(encoding.audio_args())
    }

    /// Generated gap matching the clips' stream layout.
    fn silence_command(
        silence: &SilenceSpec,
        mode: RenderMode,
        encoding: &EncodingConfig,
        output: &Path,
    ) -> FfmpegCommand {
        let layout = if encoding.channels == 1 { "mono" } else { "stereo" };
        let audio_src = format!("anullsrc=r={}:cl={}", encoding.sample_rate, layout);

        let cmd = match mode {
            RenderMode::Audio => FfmpegCommand::lavfi(audio_src, output),
            RenderMode::AudioVideo => {
                let graph = format!(
                    "color=c=black:s={}x{}:r={}[out0];{}[out1]",
                    encoding.width, encoding.height, encoding.fps, audio_src
                );
                FfmpegCommand::lavfi(graph, output).output_args(encoding.video_args())
            }
        };

        cmd.duration(silence.length).output_args(encoding.audio_args())
    }

    /// One command per rendered segment, in timeline order.
    ///
    /// Zero-length silences produce no command.
    fn segment_commands(
        timeline: &Timeline,
        mode: RenderMode,
        encoding: &EncodingConfig,
        scratch: &Path,
    ) -> Vec<(usize, FfmpegCommand)> {
        timeline
            .segments()
            .iter()
            .enumerate()
            .filter_map(|(index, segment)| {
                let path = scratch.join(format!("segment_{index:04}.mkv"));
                let cmd = match segment {
                    Segment::Clip(clip) => Self::clip_command(clip, mode, encoding, &path),
                    Segment::Silence(silence) if silence.is_empty() => return None,
                    Segment::Silence(silence) => {
                        Self::silence_command(silence, mode, encoding, &path)
                    }
                };
                Some((index, cmd))
            })
            .collect()
    }
}

#[async_trait]
impl Assembler for FfmpegAssembler {
    #[instrument(skip(self, timeline), fields(segments = timeline.len(), output = %output.display()))]
    async fn render(
        &self,
        timeline: &Timeline,
        mode: RenderMode,
        output: &Path,
    ) -> Result<PathBuf, RenderError> {
        if timeline.is_empty() {
            return Err(RenderError::EmptyTimeline);
        }
        check_ffmpeg().map_err(|e| RenderError::ToolUnavailable(e.to_string()))?;

        let extension = output
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let encoding = EncodingConfig::default().for_output_extension(extension.as_deref());

        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|e| RenderError::Output(e.to_string()))?;
        let scratch = tempfile::Builder::new()
            .prefix("render-")
            .tempdir_in(&self.work_dir)
            .map_err(|e| RenderError::Output(e.to_string()))?;

        let runner = FfmpegRunner::new().with_timeout(SEGMENT_TIMEOUT_SECS);
        let commands = Self::segment_commands(timeline, mode, &encoding, scratch.path());
        let total = commands.len();
        let mut parts = Vec::with_capacity(total);

        for (done, (index, cmd)) in commands.into_iter().enumerate() {
            debug!(index, "Encoding segment {}/{}", done + 1, total);
            runner
                .run(&cmd)
                .await
                .map_err(|e| RenderError::SegmentFailed {
                    index,
                    message: e.detailed(),
                })?;
            parts.push(cmd.output_path().to_path_buf());
        }

        let list_path = scratch.path().join(CONCAT_LIST_NAME);
        tokio::fs::write(&list_path, concat_list(&parts))
            .await
            .map_err(|e| RenderError::ConcatFailed(e.to_string()))?;

        let joined_ext = extension.unwrap_or_else(|| default_extension(mode).to_string());
        let joined = scratch.path().join(format!("joined.{joined_ext}"));

        let mut concat = FfmpegCommand::new(&list_path, &joined)
            .input_args(["-f", "concat", "-safe", "0"])
            .stream_copy();
        if needs_faststart(&joined_ext) {
            concat = concat.faststart();
        }
        runner
            .run(&concat)
            .await
            .map_err(|e| RenderError::ConcatFailed(e.detailed()))?;

        move_file(&joined, output)
            .await
            .map_err(|e| RenderError::Output(e.to_string()))?;

        info!(
            parts = parts.len(),
            total_secs = timeline.total_duration().as_secs_f64(),
            "Rendered blind test"
        );

        Ok(output.to_path_buf())
    }
}

/// Concat demuxer input listing `parts` in order.
fn concat_list(parts: &[PathBuf]) -> String {
    parts
        .iter()
        .map(|p| format!("file '{}'\n", p.display().to_string().replace('\'', r"'\''")))
        .collect()
}

fn needs_faststart(extension: &str) -> bool {
    matches!(extension, "mp4" | "m4a" | "mov")
}

fn default_extension(mode: RenderMode) -> &'static str {
    match mode {
        RenderMode::Audio => "m4a",
        RenderMode::AudioVideo => "mp4",
    }
}
