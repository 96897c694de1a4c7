use crate::plan::{PlanArg, PreservedTag, Section};
use crate::record::MetadataRecord;
use crate::routing::{FieldMapping, route};

/// Video plans carry only the curated native writes; container metadata has
/// no room for the residual blob.
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
    args
}

#[cfg(test)]
mod tests {
    use crate::media::MediaKind;
    use crate::plan::{Section, build_plan};
    use crate::record::MetadataRecord;
    use crate::record::trend::TREND_RECORD;
    use crate::routing::FieldMapping;
    use std::path::Path;

    #[test]
    fn test_video_plan_uses_keys_namespace() {
        let record = TREND_RECORD.overlay(
            &MetadataRecord::new()
                .with("content_identifier", "F00D")
                .with("create_date", "2026:10:17 09:30:00"),
        );
        let plan = build_plan()
            .kind(MediaKind::VideoContainer)
            .record(&record)
            .mapping(&FieldMapping::video_container(&record))
            .source(Path::new("in.mp4"))
            .destination(Path::new("out.mp4"))
            .call();

        let tags: Vec<&str> = plan
            .section(Section::Native)
            .filter_map(|a| a.tag.as_deref())
            .collect();
        assert_eq!(
            tags,
            vec![
                "Keys:Copyright",
                "Keys:Make",
                "Keys:Model",
                "Keys:Comment",
                "Keys:GPSCoordinates",
                "QuickTime:CreateDate",
            ]
        );
        assert!(plan.contains_arg(
            "-Keys:Comment=app=Meta View;device=Ray-Ban Meta Smart Glasses;id=F00D"
        ));
        assert!(plan.contains_arg(
            "-Keys:GPSCoordinates=22 deg 58' 46.24\" S, 43 deg 24' 42.09\" W"
        ));
        assert_eq!(plan.section(Section::Residual).count(), 0);
        assert_eq!(plan.section(Section::CriticalOverride).count(), 0);
    }
}
