//! The per-upload pipeline: copy, apply, verify, correct once.
pub mod report;

use crate::MediaStamperError;
use crate::hashing::digest_file;
use crate::invoke::{
    ExifToolReader, ProcessRunner, TagReader, ToolOutput, ToolRunner, Verification, verify,
};
use crate::media::MediaKind;
use crate::plan::critical::corrective_plan;
use crate::plan::reduce::reduce_plan;
use crate::plan::{CommandPlan, EXIFTOOL, PreservedTag, WriteMode, build_plan};
use crate::record::MetadataRecord;
use crate::record::trend::TREND_RECORD;
use crate::routing::FieldMapping;
use crate::staging::{capture_overlay, new_identifier, processed_path, stage_upload};
use bon::{Builder, bon};
use chrono::Utc;
use report::{Attempt, AttemptKind, Classification, Stage, StampIssue, StampReport};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_REMUX_TIMEOUT: Duration = Duration::from_secs(300);

/// Tunables for [`MediaStamper`].
#[derive(Debug, Clone, Builder)]
pub struct StampSettings {
    #[builder(default = EXIFTOOL.to_string(), into)]
    pub exiftool_program: String,
    #[builder(default = "ffmpeg".to_string(), into)]
    pub ffmpeg_program: String,
    #[builder(default = DEFAULT_TOOL_TIMEOUT)]
    pub tool_timeout: Duration,
    #[builder(default = DEFAULT_REMUX_TIMEOUT)]
    pub remux_timeout: Duration,
    /// Keep the source's orientation instead of writing the record's.
    #[builder(default = true)]
    pub preserve_orientation: bool,
    /// Remux videos through ffmpeg instead of a byte copy.
    #[builder(default)]
    pub remux_video: bool,
}

impl Default for StampSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// One upload to stamp. `destination` must be unique to this upload.
#[derive(Debug, Clone, Builder)]
pub struct StampRequest {
    #[builder(into)]
    pub source: PathBuf,
    #[builder(into)]
    pub destination: PathBuf,
    /// Detected from the source extension when not given.
    pub kind: Option<MediaKind>,
    /// Per-request values layered over the configured record.
    pub overlay: Option<MetadataRecord>,
}

/// Rewrites uploads with a fixed metadata record.
///
/// Build one with [`MediaStamper::builder`] and reuse it across uploads; the
/// record and mappings are read-only after construction.
///
/// ```rust,no_run
/// # use media_stamper::{MediaStamper, MediaStamperError, StampRequest};
/// # #[tokio::main]
/// # async fn main() -> Result<(), MediaStamperError> {
/// let stamper = MediaStamper::builder().build()?;
/// let request = StampRequest::builder()
///     .source("uploads/photo.jpg")
///     .destination("processed/photo-with-metadata.jpg")
///     .build();
/// let report = stamper.stamp(&request).await;
/// println!("{:?}: {:?}", report.stage, report.issues);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MediaStamper<R = ProcessRunner, T = ExifToolReader> {
    runner: R,
    reader: T,
    record: MetadataRecord,
    settings: StampSettings,
}

#[bon]
impl MediaStamper {
    /// Constructs a stamper that drives the real `exiftool` and `ffmpeg` binaries.
    ///
    /// # Builder Arguments
    ///
    /// * `exiftool_path: Option<PathBuf>` - Specific `exiftool` executable. Searched in `PATH` when `None`.
    /// * `ffmpeg_path: Option<PathBuf>` - Specific `ffmpeg` executable, only used when `remux_video` is set.
    /// * `tool_timeout: Duration` - (Default: 120 s) Ceiling for each exiftool run and each tag read-back.
    /// * `remux_timeout: Duration` - (Default: 300 s) Ceiling for the ffmpeg remux.
    /// * `preserve_orientation: bool` - (Default: `true`) Keep the source's `Orientation`.
    /// * `remux_video: bool` - (Default: `false`) Remux videos instead of copying them.
    /// * `record: MetadataRecord` - (Default: the bundled trend record) Values to write.
    ///
    /// # Errors
    ///
    /// Returns [`MediaStamperError::Exiftool`] when the `exiftool` reader process
    /// cannot be started.
    #[builder]
    pub fn new(
        exiftool_path: Option<PathBuf>,
        ffmpeg_path: Option<PathBuf>,
        #[builder(default = DEFAULT_TOOL_TIMEOUT)] tool_timeout: Duration,
        #[builder(default = DEFAULT_REMUX_TIMEOUT)] remux_timeout: Duration,
        #[builder(default = true)] preserve_orientation: bool,
        #[builder(default)] remux_video: bool,
        record: Option<MetadataRecord>,
    ) -> Result<Self, MediaStamperError> {
        let reader = match &exiftool_path {
            Some(path) => ExifToolReader::with_executable(path)?,
            None => ExifToolReader::new()?,
        };
        let settings = StampSettings::builder()
            .maybe_exiftool_program(
                exiftool_path.map(|path| path.to_string_lossy().into_owned()),
            )
            .maybe_ffmpeg_program(ffmpeg_path.map(|path| path.to_string_lossy().into_owned()))
            .tool_timeout(tool_timeout)
            .remux_timeout(remux_timeout)
            .preserve_orientation(preserve_orientation)
            .remux_video(remux_video)
            .build();
        Ok(Self::from_parts(
            ProcessRunner,
            reader,
            record.unwrap_or_else(|| TREND_RECORD.clone()),
            settings,
        ))
    }
}

impl<R: ToolRunner, T: TagReader> MediaStamper<R, T> {
    pub fn from_parts(runner: R, reader: T, record: MetadataRecord, settings: StampSettings) -> Self {
        Self {
            runner,
            reader,
            record,
            settings,
        }
    }

    pub fn record(&self) -> &MetadataRecord {
        &self.record
    }

    pub fn settings(&self) -> &StampSettings {
        &self.settings
    }

    /// The plan a stamp would run, without touching any file. Orientation is
    /// not read back here, so the preserved argument is absent.
    pub fn preview_plan(
        &self,
        kind: MediaKind,
        source: &Path,
        destination: &Path,
        write_mode: WriteMode,
        overlay: Option<&MetadataRecord>,
    ) -> CommandPlan {
        let record = self.effective_record(overlay);
        let mapping = match kind {
            MediaKind::StillImage if self.settings.preserve_orientation => {
                FieldMapping::still_image().without("orientation")
            }
            MediaKind::StillImage => FieldMapping::still_image(),
            MediaKind::VideoContainer => FieldMapping::video_container(&record),
        };
        build_plan()
            .kind(kind)
            .record(&record)
            .mapping(&mapping)
            .source(source)
            .destination(destination)
            .write_mode(write_mode)
            .program(self.settings.exiftool_program.clone())
            .call()
    }

    /// Runs the full pipeline for one upload.
    ///
    /// Never fails: every problem is recorded in the returned report. As long
    /// as the copy succeeded there is a usable file at the destination.
    pub async fn stamp(&self, request: &StampRequest) -> StampReport {
        let report = StampReport::received(request.destination.clone());

        let detected = request
            .kind
            .map_or_else(|| MediaKind::detect(&request.source), Ok);
        let kind = match detected {
            Ok(kind) => kind,
            Err(error) => {
                warn!(source = %request.source.display(), %error, "rejecting upload");
                return report.fail(StampIssue::UnsupportedMedia {
                    reason: error.to_string(),
                });
            }
        };
        let mut report = StampReport {
            kind: Some(kind),
            ..report
        };
        info!(source = %request.source.display(), %kind, "upload received");

        if let Err(issue) = self.copy_into_place(kind, request, &mut report).await {
            warn!(destination = %request.destination.display(), %issue, "copy failed");
            return report.fail(issue);
        }
        report.stage = Stage::Copied;
        info!(destination = %request.destination.display(), "upload copied");

        let record = self.effective_record(request.overlay.as_ref());
        let (mapping, preserved) = self.mapping_for(kind, &record, &request.source).await;
        let plan = build_plan()
            .kind(kind)
            .record(&record)
            .mapping(&mapping)
            .source(&request.source)
            .destination(&request.destination)
            .maybe_preserved(preserved.as_ref())
            .program(self.settings.exiftool_program.clone())
            .call();

        let mut output = self.attempt(AttemptKind::Primary, &plan, &mut report).await;
        if !output.success()
            && kind == MediaKind::VideoContainer
            && let Some(reduced) = reduce_plan(&plan, &output.stderr)
        {
            info!("retrying with unsupported tags removed");
            output = self.attempt(AttemptKind::Reduced, &reduced, &mut report).await;
        }

        let tool_succeeded = output.success();
        if tool_succeeded {
            report.stage = Stage::MetadataApplied;
        } else {
            warn!(exit_code = ?output.exit_code, stderr = %output.stderr.trim(), "metadata tool failed");
            report.stage = Stage::MetadataAppliedPartial;
            report.issues.push(StampIssue::ToolInvocationFailure {
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }

        let mut corrected = false;
        let verification = tokio::time::timeout(
            self.settings.tool_timeout,
            verify(&self.reader, &request.destination, kind, &record),
        )
        .await
        .unwrap_or_else(|_| {
            warn!(timeout = ?self.settings.tool_timeout, "critical tag read-back timed out");
            Verification::Inconclusive(format!(
                "tag read-back timed out after {}s",
                self.settings.tool_timeout.as_secs_f32()
            ))
        });
        match verification {
            Verification::Matched => debug!("critical tags verified"),
            Verification::Inconclusive(reason) => {
                report
                    .issues
                    .push(StampIssue::VerificationInconclusive { reason });
            }
            Verification::Mismatched(mismatches) => {
                warn!(count = mismatches.len(), "critical tags mismatched, running corrective pass");
                report
                    .issues
                    .push(StampIssue::PartialMetadataFailure { mismatches });
                let corrective = corrective_plan(
                    kind,
                    &record,
                    &request.destination,
                    &self.settings.exiftool_program,
                );
                // Accepted whatever it returns; there is no second correction.
                self.attempt(AttemptKind::Corrective, &corrective, &mut report)
                    .await;
                corrected = true;
            }
        }

        report.classification = if tool_succeeded && !corrected {
            Classification::Success
        } else {
            Classification::PartialSuccess
        };
        report.digest = digest_file(&request.destination).await;
        info!(stage = ?report.stage, classification = ?report.classification, "upload stamped");
        report
    }

    /// Saves an upload's bytes under `upload_dir`, then stamps it into
    /// `processed_dir` with fresh capture timestamps and content identifier.
    ///
    /// # Errors
    ///
    /// Staging problems come back as [`MediaStamperError::Staging`] and a
    /// `processed_dir` that cannot be created as [`MediaStamperError::Io`].
    /// Once staged, the upload's outcome is in the report.
    pub async fn stamp_upload(
        &self,
        upload_dir: &Path,
        processed_dir: &Path,
        owner: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StampReport, MediaStamperError> {
        let now = Utc::now();
        let staged = stage_upload(upload_dir, owner, original_name, bytes, now).await?;
        tokio::fs::create_dir_all(processed_dir).await?;
        let request = StampRequest::builder()
            .destination(processed_path(processed_dir, &staged))
            .source(staged)
            .overlay(capture_overlay(now, &new_identifier()))
            .build();
        Ok(self.stamp(&request).await)
    }

    fn effective_record(&self, overlay: Option<&MetadataRecord>) -> MetadataRecord {
        match overlay {
            Some(overlay) => self.record.overlay(overlay),
            None => self.record.clone(),
        }
    }

    /// The mapping for `kind`, plus the source orientation to carry over for
    /// still images.
    async fn mapping_for(
        &self,
        kind: MediaKind,
        record: &MetadataRecord,
        source: &Path,
    ) -> (FieldMapping, Option<PreservedTag>) {
        match kind {
            MediaKind::VideoContainer => (FieldMapping::video_container(record), None),
            MediaKind::StillImage if !self.settings.preserve_orientation => {
                (FieldMapping::still_image(), None)
            }
            MediaKind::StillImage => {
                let read = tokio::time::timeout(
                    self.settings.tool_timeout,
                    self.reader.read_tag(source, "Orientation"),
                );
                let preserved = match read.await {
                    Ok(Ok(value)) => value.map(|value| PreservedTag {
                        tag: "EXIF:Orientation".to_string(),
                        value,
                    }),
                    Ok(Err(error)) => {
                        warn!(%error, "could not read source orientation");
                        None
                    }
                    Err(_) => {
                        warn!(timeout = ?self.settings.tool_timeout, "source orientation read timed out");
                        None
                    }
                };
                (FieldMapping::still_image().without("orientation"), preserved)
            }
        }
    }

    async fn copy_into_place(
        &self,
        kind: MediaKind,
        request: &StampRequest,
        report: &mut StampReport,
    ) -> Result<(), StampIssue> {
        if kind == MediaKind::VideoContainer && self.settings.remux_video {
            let source = request.source.to_string_lossy().into_owned();
            let destination = request.destination.to_string_lossy().into_owned();
            let args: Vec<String> = [
                "-y",
                "-loglevel",
                "error",
                "-i",
                source.as_str(),
                "-map",
                "0",
                "-c",
                "copy",
                "-map_metadata",
                "0",
                destination.as_str(),
            ]
            .iter()
            .map(|arg| (*arg).to_string())
            .collect();
            let output = self
                .runner
                .run(&self.settings.ffmpeg_program, &args, self.settings.remux_timeout)
                .await;
            let remuxed = output.success();
            report.attempts.push(Attempt {
                kind: AttemptKind::Remux,
                program: self.settings.ffmpeg_program.clone(),
                args,
                output,
            });
            if remuxed && tokio::fs::try_exists(&request.destination).await.unwrap_or(false) {
                return Ok(());
            }
            warn!("remux failed, falling back to a plain copy");
        }

        tokio::fs::copy(&request.source, &request.destination)
            .await
            .map(|_| ())
            .map_err(|error| StampIssue::CopyFailure {
                destination: request.destination.display().to_string(),
                message: error.to_string(),
            })
    }

    async fn attempt(
        &self,
        kind: AttemptKind,
        plan: &CommandPlan,
        report: &mut StampReport,
    ) -> ToolOutput {
        debug!(?kind, command = %plan.display(), "running metadata tool");
        let output = self.runner.run_plan(plan, self.settings.tool_timeout).await;
        report.attempts.push(Attempt {
            kind,
            program: plan.program.clone(),
            args: plan.arg_texts(),
            output: output.clone(),
        });
        output
    }
}
