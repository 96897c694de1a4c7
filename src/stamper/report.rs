use crate::invoke::{Mismatch, ToolOutput};
use crate::media::MediaKind;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Where an upload ended up in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Received,
    Copied,
    MetadataApplied,
    /// The tool exited non-zero; the copy is still served.
    MetadataAppliedPartial,
    /// The copy itself failed. No metadata was attempted.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Classification {
    Success,
    PartialSuccess,
    Failure,
}

/// A problem met while stamping. None of these abort the pipeline once the
/// copy exists.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StampIssue {
    #[error("Unsupported media: {reason}")]
    UnsupportedMedia { reason: String },

    #[error("Copy to {destination} failed: {message}")]
    CopyFailure { destination: String, message: String },

    #[error("Metadata tool failed ({}): {stderr}", describe_exit(.exit_code))]
    ToolInvocationFailure {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Critical tags did not match: {}", join_mismatches(.mismatches))]
    PartialMetadataFailure { mismatches: Vec<Mismatch> },

    #[error("Verification could not run: {reason}")]
    VerificationInconclusive { reason: String },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    exit_code.map_or_else(|| "no exit status".to_string(), |code| format!("exit code {code}"))
}

fn join_mismatches(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttemptKind {
    Remux,
    Primary,
    Reduced,
    Corrective,
}

/// One subprocess run made on behalf of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub kind: AttemptKind,
    pub program: String,
    pub args: Vec<String>,
    pub output: ToolOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StampReport {
    pub stage: Stage,
    pub classification: Classification,
    pub kind: Option<MediaKind>,
    pub destination: PathBuf,
    pub attempts: Vec<Attempt>,
    pub issues: Vec<StampIssue>,
    /// BLAKE3 digest of the finished file.
    pub digest: Option<String>,
}

impl StampReport {
    pub(crate) fn received(destination: PathBuf) -> Self {
        Self {
            stage: Stage::Received,
            classification: Classification::Failure,
            kind: None,
            destination,
            attempts: Vec::new(),
            issues: Vec::new(),
            digest: None,
        }
    }

    pub(crate) fn fail(mut self, issue: StampIssue) -> Self {
        self.stage = Stage::Failed;
        self.classification = Classification::Failure;
        self.issues.push(issue);
        self
    }

    /// Whether a usable file exists at the destination.
    pub fn has_output(&self) -> bool {
        self.classification != Classification::Failure
    }

    pub fn attempts_of(&self, kind: AttemptKind) -> impl Iterator<Item = &Attempt> {
        self.attempts.iter().filter(move |attempt| attempt.kind == kind)
    }
}
