//! Builds the reduced retry plan after exiftool rejects tags for a container.
use crate::plan::CommandPlan;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref UNSUPPORTED_TAG_PATTERNS: Vec<Regex> = [
        r"Tag '([^']+)' is not (?:defined|supported|writable)",
        r"Sorry, ([\w-]+(?::[\w-]+)?) (?:doesn't exist or isn't writable|is not writable|is not supported)",
        r"(?:Can't|Cannot) (?:write|add) ([\w-]+:[\w-]+)",
        r"([\w-]+:[\w-]+) (?:is )?(?:not supported|unsupported)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("unsupported-tag pattern is valid"))
    .collect();
}

/// Tag names that exiftool's diagnostics report as unsupported, in order of
/// first mention.
pub fn unsupported_tags(stderr: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for line in stderr.lines() {
        for pattern in UNSUPPORTED_TAG_PATTERNS.iter() {
            for caps in pattern.captures_iter(line) {
                if let Some(tag) = caps.get(1).map(|m| m.as_str().to_string())
                    && !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag))
                {
                    tags.push(tag);
                }
            }
        }
    }
    tags
}

/// Compares a reported tag with a plan tag. The group prefix only counts
/// when both sides carry one.
fn tag_matches(reported: &str, planned: &str) -> bool {
    match (reported.split_once(':'), planned.split_once(':')) {
        (Some(_), Some(_)) => reported.eq_ignore_ascii_case(planned),
        (Some((_, name)), None) => name.eq_ignore_ascii_case(planned),
        (None, Some((_, name))) => reported.eq_ignore_ascii_case(name),
        (None, None) => reported.eq_ignore_ascii_case(planned),
    }
}

/// The retry plan with the tags named in `stderr` removed.
///
/// Returns `None` when the diagnostics name no tag, or none of the named tags
/// are in the plan; a retry would then only repeat the failure.
pub fn reduce_plan(plan: &CommandPlan, stderr: &str) -> Option<CommandPlan> {
    let rejected = unsupported_tags(stderr);
    if rejected.is_empty() {
        return None;
    }
    let is_rejected = |tag: &Option<String>| {
        tag.as_deref()
            .is_some_and(|tag| rejected.iter().any(|r| tag_matches(r, tag)))
    };
    if !plan.args.iter().any(|arg| is_rejected(&arg.tag)) {
        return None;
    }
    Some(CommandPlan {
        program: plan.program.clone(),
        args: plan
            .args
            .iter()
            .filter(|arg| !is_rejected(&arg.tag))
            .cloned()
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;
    use crate::plan::build_plan;
    use crate::record::trend::TREND_RECORD;
    use crate::routing::FieldMapping;
    use std::path::Path;

    fn video_plan() -> CommandPlan {
        build_plan()
            .kind(MediaKind::VideoContainer)
            .record(&TREND_RECORD)
            .mapping(&FieldMapping::video_container(&TREND_RECORD))
            .source(Path::new("in.mp4"))
            .destination(Path::new("out.mp4"))
            .call()
    }

    #[test]
    fn test_unsupported_tags_from_diagnostics() {
        let stderr = "Warning: Sorry, Keys:Copyright doesn't exist or isn't writable\n\
                      Warning: Tag 'Keys:GPSCoordinates' is not defined\n\
                      Error: Keys:Copyright is not supported for this container subtype";
        assert_eq!(
            unsupported_tags(stderr),
            vec!["Keys:Copyright".to_string(), "Keys:GPSCoordinates".to_string()]
        );
        assert!(unsupported_tags("Error: File format error - out.mp4").is_empty());
    }

    #[test]
    fn test_reduced_plan_drops_only_the_rejected_tag() {
        let plan = video_plan();
        let reduced = reduce_plan(
            &plan,
            "Error: Keys:Copyright is not supported for this container subtype",
        )
        .expect("a reduced plan");

        let expected: Vec<_> = plan
            .args
            .iter()
            .filter(|arg| arg.tag.as_deref() != Some("Keys:Copyright"))
            .cloned()
            .collect();
        assert_eq!(reduced.args, expected);
        assert_eq!(reduced.args.len(), plan.args.len() - 1);
        assert_eq!(reduced.program, plan.program);
    }

    #[test]
    fn test_group_less_report_matches_grouped_tag() {
        let reduced = reduce_plan(&video_plan(), "Warning: Sorry, Copyright is not writable")
            .expect("a reduced plan");
        assert!(
            !reduced
                .args
                .iter()
                .any(|a| a.tag.as_deref() == Some("Keys:Copyright"))
        );
    }

    #[test]
    fn test_no_reduction_without_a_matching_tag() {
        let plan = video_plan();
        assert_eq!(reduce_plan(&plan, "Error: Not a valid MOV"), None);
        assert_eq!(
            reduce_plan(&plan, "Warning: Tag 'XMP:Rating' is not defined"),
            None
        );
    }

    #[test]
    fn test_tag_matches_rules() {
        assert!(tag_matches("keys:copyright", "Keys:Copyright"));
        assert!(!tag_matches("UserData:Copyright", "Keys:Copyright"));
        assert!(tag_matches("Copyright", "Keys:Copyright"));
        assert!(tag_matches("Keys:Model", "Model"));
    }
}
