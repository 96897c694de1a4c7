//! The critical fields: device identity and GPS. They are written literally,
//! read back after the main write, and corrected once if the read-back does
//! not match.
use crate::media::MediaKind;
use crate::plan::{CommandPlan, PlanArg, Section, WriteMode, global_flags, path_args};
use crate::record::MetadataRecord;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriticalField {
    pub record_key: &'static str,
    /// Tag used when writing the literal value.
    pub write_tag: &'static str,
    /// Tag name as it appears in exiftool's JSON read-back.
    pub read_tag: &'static str,
}

const fn field(
    record_key: &'static str,
    write_tag: &'static str,
    read_tag: &'static str,
) -> CriticalField {
    CriticalField {
        record_key,
        write_tag,
        read_tag,
    }
}

pub const STILL_IMAGE_FIELDS: &[CriticalField] = &[
    field("make", "Make", "Make"),
    field("model", "Model", "Model"),
    field("gps_latitude", "GPSLatitude", "GPSLatitude"),
    field("gps_latitude_ref", "GPSLatitudeRef", "GPSLatitudeRef"),
    field("gps_longitude", "GPSLongitude", "GPSLongitude"),
    field("gps_longitude_ref", "GPSLongitudeRef", "GPSLongitudeRef"),
];

pub const VIDEO_CONTAINER_FIELDS: &[CriticalField] = &[
    field("model", "Keys:Model", "Model"),
    field("gps_position", "Keys:GPSCoordinates", "GPSCoordinates"),
];

pub const fn critical_fields(kind: MediaKind) -> &'static [CriticalField] {
    match kind {
        MediaKind::StillImage => STILL_IMAGE_FIELDS,
        MediaKind::VideoContainer => VIDEO_CONTAINER_FIELDS,
    }
}

/// Literal writes for every critical field the record has a value for.
pub fn literal_args(kind: MediaKind, record: &MetadataRecord) -> Vec<PlanArg> {
    critical_fields(kind)
        .iter()
        .filter_map(|field| {
            record
                .text(field.record_key)
                .map(|value| PlanArg::write(Section::CriticalOverride, field.write_tag, &value))
        })
        .collect()
}

/// The single corrective pass: only the critical literals, rewritten in place.
pub fn corrective_plan(
    kind: MediaKind,
    record: &MetadataRecord,
    destination: &Path,
    program: &str,
) -> CommandPlan {
    let mut args = global_flags(WriteMode::OverwriteInPlace);
    args.extend(literal_args(kind, record));
    args.extend(path_args(WriteMode::OverwriteInPlace, destination, destination));
    CommandPlan {
        program: program.to_string(),
        args,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::trend::TREND_RECORD;

    #[test]
    fn test_literal_args_skip_missing_fields() {
        let record = MetadataRecord::new().with("model", "Ray-Ban Meta Smart Glasses");
        let args = literal_args(MediaKind::StillImage, &record);
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].text, "-Model=Ray-Ban Meta Smart Glasses");
        assert_eq!(args[0].tag.as_deref(), Some("Model"));
    }

    #[test]
    fn test_corrective_plan_is_minimal() {
        let plan = corrective_plan(
            MediaKind::StillImage,
            &TREND_RECORD,
            Path::new("out.jpg"),
            "exiftool",
        );
        assert_eq!(
            plan.arg_texts(),
            vec![
                "-m",
                "-q",
                "-overwrite_original",
                "-Make=Meta View",
                "-Model=Ray-Ban Meta Smart Glasses",
                "-GPSLatitude=22 deg 58' 46.24\" S",
                "-GPSLatitudeRef=South",
                "-GPSLongitude=43 deg 24' 42.09\" W",
                "-GPSLongitudeRef=West",
                "out.jpg",
            ]
        );
    }

    #[test]
    fn test_video_corrective_plan_uses_keys() {
        let plan = corrective_plan(
            MediaKind::VideoContainer,
            &TREND_RECORD,
            Path::new("out.mp4"),
            "exiftool",
        );
        assert!(plan.contains_arg("-Keys:Model=Ray-Ban Meta Smart Glasses"));
        assert!(plan.contains_arg(
            "-Keys:GPSCoordinates=22 deg 58' 46.24\" S, 43 deg 24' 42.09\" W"
        ));
    }
}
