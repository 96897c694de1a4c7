use crate::media::MediaKind;
use crate::plan::critical::literal_args;
use crate::plan::{PlanArg, PreservedTag, Section};
use crate::record::MetadataRecord;
use crate::routing::{FieldMapping, route};

/// Everything between the global flags and the paths of a still-image plan.
pub(super) fn tag_args(
    record: &MetadataRecord,
    mapping: &FieldMapping,
    preserved: Option<&PreservedTag>,
) -> Vec<PlanArg> {
    let routed = route(record, mapping);

    let mut args: Vec<PlanArg> = routed
        .native
        .iter()
        .map(|field| PlanArg::write(Section::Native, &field.tag, &field.value))
        .collect();
    if let Some(preserved) = preserved {
        args.push(PlanArg::write(
            Section::Preserved,
            &preserved.tag,
            &preserved.value,
        ));
    }
    args.push(PlanArg::write(
        Section::Residual,
        "XMP-dc:Description",
        &routed.residual_json(),
    ));
    // Written again after the systematic pass even when already emitted above.
    args.extend(literal_args(MediaKind::StillImage, record));
    args
}

#[cfg(test)]
mod tests {
    use crate::media::MediaKind;
    use crate::plan::{PreservedTag, Section, build_plan};
    use crate::record::MetadataRecord;
    use crate::record::trend::TREND_RECORD;
    use crate::routing::FieldMapping;
    use std::path::Path;

    #[test]
    fn test_model_is_written_natively_and_as_override() {
        let record = MetadataRecord::new()
            .with("make", "Meta View")
            .with("model", "Ray-Ban Meta Smart Glasses");
        let plan = build_plan()
            .kind(MediaKind::StillImage)
            .record(&record)
            .mapping(&FieldMapping::still_image())
            .source(Path::new("in.jpg"))
            .destination(Path::new("out.jpg"))
            .call();

        assert!(plan.contains_arg("-EXIF:Model=Ray-Ban Meta Smart Glasses"));
        assert!(plan.contains_arg("-Model=Ray-Ban Meta Smart Glasses"));
        let native = plan
            .args
            .iter()
            .position(|a| a.text == "-EXIF:Model=Ray-Ban Meta Smart Glasses");
        let critical = plan
            .args
            .iter()
            .position(|a| a.text == "-Model=Ray-Ban Meta Smart Glasses");
        assert!(native < critical, "override must come after the native write");
        assert_eq!(
            plan.section(Section::CriticalOverride)
                .map(|a| a.text.as_str())
                .collect::<Vec<_>>(),
            vec!["-Make=Meta View", "-Model=Ray-Ban Meta Smart Glasses"]
        );
    }

    #[test]
    fn test_trend_record_still_plan_contents() {
        let plan = build_plan()
            .kind(MediaKind::StillImage)
            .record(&TREND_RECORD)
            .mapping(&FieldMapping::still_image())
            .source(Path::new("in.heic"))
            .destination(Path::new("out.heic"))
            .call();

        assert!(plan.contains_arg("-EXIF:ExifVersion=0220"));
        assert!(plan.contains_arg("-EXIF:ExifImageWidth=4032"));
        assert!(plan.contains_arg("-EXIF:GPSLatitude=22 deg 58' 46.24\" S"));
        assert!(plan.contains_arg("-GPSLatitudeRef=South"));
        assert!(plan.contains_arg("-GPSLongitudeRef=West"));

        let residual: Vec<&str> = plan
            .section(Section::Residual)
            .map(|a| a.text.as_str())
            .collect();
        assert_eq!(residual.len(), 1);
        assert!(residual[0].starts_with("-XMP-dc:Description={\"checksum\":"));
        assert!(!residual[0].contains("\"model\""));
        assert!(residual[0].contains("\"gps_latitude_ref\":\"South\""));
        assert!(residual[0].contains("\"raw_header\":\"00 00 00 18 "));
        assert!(!residual[0].contains("copyright"));
    }

    #[test]
    fn test_preserved_tag_sits_between_native_and_residual() {
        let preserved = PreservedTag {
            tag: "EXIF:Orientation".to_string(),
            value: "Rotate 90 CW".to_string(),
        };
        let plan = build_plan()
            .kind(MediaKind::StillImage)
            .record(&TREND_RECORD)
            .mapping(&FieldMapping::still_image().without("orientation"))
            .source(Path::new("in.jpg"))
            .destination(Path::new("out.jpg"))
            .preserved(&preserved)
            .call();

        let texts = plan.arg_texts();
        let at = |needle: &str| texts.iter().position(|t| t.starts_with(needle));
        assert!(at("-EXIF:GPSLongitude=") < at("-EXIF:Orientation=Rotate 90 CW"));
        assert!(at("-EXIF:Orientation=Rotate 90 CW") < at("-XMP-dc:Description="));
        assert!(!plan.contains_arg("-EXIF:Orientation=Horizontal (normal)"));
    }
}
