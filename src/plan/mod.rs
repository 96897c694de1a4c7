//! Turns a record into an ordered exiftool argument list.
//!
//! A plan is laid out in sections: global flags, native tag writes in mapping
//! order, the preserved orientation, the residual blob, critical overrides and
//! finally the paths. exiftool applies the last write of a tag, so the layout
//! is part of the contract.
pub mod critical;
pub mod reduce;
mod still;
mod video;

use crate::media::MediaKind;
use crate::record::MetadataRecord;
use crate::routing::FieldMapping;
use bon::builder;
use std::path::Path;

pub const EXIFTOOL: &str = "exiftool";

/// How exiftool writes the destination file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Rewrite the destination in place with `-overwrite_original`.
    #[default]
    OverwriteInPlace,
    /// Read the source and write a new destination with `-o`.
    NewPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    GlobalFlag,
    Native,
    Preserved,
    Residual,
    CriticalOverride,
    Path,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanArg {
    pub section: Section,
    /// The tag this argument writes, if it is a tag write.
    pub tag: Option<String>,
    pub text: String,
}

impl PlanArg {
    pub(crate) fn flag(text: &str) -> Self {
        Self {
            section: Section::GlobalFlag,
            tag: None,
            text: text.to_string(),
        }
    }

    pub(crate) fn write(section: Section, tag: &str, value: &str) -> Self {
        Self {
            section,
            tag: Some(tag.to_string()),
            text: format!("-{tag}={value}"),
        }
    }

    pub(crate) fn path(path: &Path) -> Self {
        Self {
            section: Section::Path,
            tag: None,
            text: path.to_string_lossy().into_owned(),
        }
    }
}

/// A fully assembled tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    pub program: String,
    pub args: Vec<PlanArg>,
}

impl CommandPlan {
    pub fn arg_texts(&self) -> Vec<String> {
        self.args.iter().map(|arg| arg.text.clone()).collect()
    }

    pub fn contains_arg(&self, text: &str) -> bool {
        self.args.iter().any(|arg| arg.text == text)
    }

    pub fn section(&self, section: Section) -> impl Iterator<Item = &PlanArg> {
        self.args.iter().filter(move |arg| arg.section == section)
    }

    /// Shell-like rendering, for logs and dry runs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(|arg| arg.text.as_str()))
            .map(|part| {
                if part.contains([' ', '"', '\'']) {
                    format!("'{}'", part.replace('\'', r"'\''"))
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A tag value read from the source that must survive the rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreservedTag {
    pub tag: String,
    pub value: String,
}

pub(crate) fn global_flags(write_mode: WriteMode) -> Vec<PlanArg> {
    let mut flags = vec![PlanArg::flag("-m"), PlanArg::flag("-q")];
    if write_mode == WriteMode::OverwriteInPlace {
        flags.push(PlanArg::flag("-overwrite_original"));
    }
    flags
}

pub(crate) fn path_args(write_mode: WriteMode, source: &Path, destination: &Path) -> Vec<PlanArg> {
    match write_mode {
        WriteMode::OverwriteInPlace => vec![PlanArg::path(destination)],
        WriteMode::NewPath => vec![
            PlanArg {
                section: Section::Path,
                tag: None,
                text: "-o".to_string(),
            },
            PlanArg::path(destination),
            PlanArg::path(source),
        ],
    }
}

/// Builds the plan that rewrites `destination` for the given media kind.
///
/// Still images get the native EXIF writes, the residual blob and the fixed
/// critical overrides. Video containers get only the native writes of their
/// (QuickTime `Keys`) mapping.
#[builder]
pub fn build_plan(
    kind: MediaKind,
    record: &MetadataRecord,
    mapping: &FieldMapping,
    source: &Path,
    destination: &Path,
    #[builder(default)] write_mode: WriteMode,
    preserved: Option<&PreservedTag>,
    #[builder(default = EXIFTOOL.to_string(), into)] program: String,
) -> CommandPlan {
    let mut args = global_flags(write_mode);
    match kind {
        MediaKind::StillImage => args.extend(still::tag_args(record, mapping, preserved)),
        MediaKind::VideoContainer => args.extend(video::tag_args(record, mapping, preserved)),
    }
    args.extend(path_args(write_mode, source, destination));

    CommandPlan { program, args }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::trend::TREND_RECORD;
    use std::path::PathBuf;

    fn still_plan(write_mode: WriteMode) -> CommandPlan {
        let src = PathBuf::from("uploads/in.jpg");
        let dst = PathBuf::from("processed/in-with-metadata.jpg");
        build_plan()
            .kind(MediaKind::StillImage)
            .record(&TREND_RECORD)
            .mapping(&FieldMapping::still_image())
            .source(&src)
            .destination(&dst)
            .write_mode(write_mode)
            .call()
    }

    #[test]
    fn test_sections_are_in_contract_order() {
        let plan = still_plan(WriteMode::OverwriteInPlace);
        let rank = |section: Section| match section {
            Section::GlobalFlag => 0,
            Section::Native => 1,
            Section::Preserved => 2,
            Section::Residual => 3,
            Section::CriticalOverride => 4,
            Section::Path => 5,
        };
        let ranks: Vec<u8> = plan.args.iter().map(|arg| rank(arg.section)).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        assert_eq!(ranks, sorted);
        assert_eq!(plan.program, "exiftool");
    }

    #[test]
    fn test_overwrite_mode_flags_and_paths() {
        let plan = still_plan(WriteMode::OverwriteInPlace);
        let texts = plan.arg_texts();
        assert_eq!(&texts[..3], &["-m", "-q", "-overwrite_original"]);
        assert_eq!(
            texts.last().map(String::as_str),
            Some("processed/in-with-metadata.jpg")
        );
    }

    #[test]
    fn test_new_path_mode_flags_and_paths() {
        let plan = still_plan(WriteMode::NewPath);
        let texts = plan.arg_texts();
        assert_eq!(&texts[..2], &["-m", "-q"]);
        assert!(!plan.contains_arg("-overwrite_original"));
        let tail: Vec<&str> = texts[texts.len() - 3..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec!["-o", "processed/in-with-metadata.jpg", "uploads/in.jpg"]
        );
    }

    #[test]
    fn test_display_quotes_values_with_spaces() {
        let plan = CommandPlan {
            program: "exiftool".to_string(),
            args: vec![
                PlanArg::flag("-m"),
                PlanArg::write(Section::Native, "EXIF:Make", "Meta View"),
            ],
        };
        assert_eq!(plan.display(), "exiftool -m '-EXIF:Make=Meta View'");
    }
}
