use crate::record::MetadataRecord;
use lazy_static::lazy_static;
use serde_json::Value;

/// One row of a [`FieldMapping`]: a record key, the tag it is written to and
/// an optional literal that replaces the record value.
#[derive(Debug, Clone, PartialEq)]
pub struct TagMapping {
    pub key: String,
    pub tag: String,
    pub literal: Option<Value>,
}

/// An ordered table from logical record key to native tag.
///
/// Keys are unique. Iteration order is the order the tag arguments are
/// emitted in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMapping {
    entries: Vec<TagMapping>,
}

/// Written to `Keys:Copyright` when the record has no `copyright` of its own.
pub const VIDEO_COPYRIGHT: &str = "Meta Platforms, Inc.";

lazy_static! {
    static ref STILL_IMAGE_MAPPING: FieldMapping = FieldMapping::new()
        .with_tag("make", "EXIF:Make")
        .with_tag("model", "EXIF:Model")
        .with_tag("orientation", "EXIF:Orientation")
        .with_literal("exif_version", "EXIF:ExifVersion", "0220")
        .with_tag("subject_distance", "EXIF:SubjectDistance")
        .with_tag("user_comment", "EXIF:UserComment")
        .with_tag("color_space", "EXIF:ColorSpace")
        .with_tag("exif_image_width", "EXIF:ExifImageWidth")
        .with_tag("exif_image_height", "EXIF:ExifImageHeight")
        .with_tag("digital_zoom_ratio", "EXIF:DigitalZoomRatio")
        .with_tag("subject_distance_range", "EXIF:SubjectDistanceRange")
        .with_tag("gps_latitude", "EXIF:GPSLatitude")
        .with_tag("gps_longitude", "EXIF:GPSLongitude")
        .with_tag("date_time_original", "EXIF:DateTimeOriginal")
        .with_tag("create_date", "EXIF:CreateDate");
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// The EXIF mapping used for still images.
    pub fn still_image() -> Self {
        STILL_IMAGE_MAPPING.clone()
    }

    /// The QuickTime `Keys` mapping used for video containers.
    ///
    /// The `comment` entry is a composite built from the record: application
    /// (the `make` field), device (`model`) and a content identifier, taken
    /// from `content_identifier` when an overlay supplied one and from
    /// `user_comment` otherwise.
    pub fn video_container(record: &MetadataRecord) -> Self {
        let identifier = record
            .text("content_identifier")
            .or_else(|| record.text("user_comment"));
        let parts: Vec<String> = [
            ("app", record.text("make")),
            ("device", record.text("model")),
            ("id", identifier),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| format!("{name}={v}")))
        .collect();

        let mapping = match record.text("copyright") {
            Some(_) => Self::new().with_tag("copyright", "Keys:Copyright"),
            None => Self::new().with_literal("copyright", "Keys:Copyright", VIDEO_COPYRIGHT),
        };
        let mapping = mapping
            .with_tag("make", "Keys:Make")
            .with_tag("model", "Keys:Model");
        let mapping = if parts.is_empty() {
            mapping.with_tag("comment", "Keys:Comment")
        } else {
            mapping.with_literal("comment", "Keys:Comment", parts.join(";"))
        };
        mapping
            .with_tag("gps_position", "Keys:GPSCoordinates")
            .with_tag("create_date", "QuickTime:CreateDate")
            .with_tag("modify_date", "QuickTime:ModifyDate")
    }

    /// Maps `key` to `tag`, replacing an existing row for the same key in place.
    #[must_use]
    pub fn with_tag(self, key: impl Into<String>, tag: impl Into<String>) -> Self {
        self.insert(TagMapping {
            key: key.into(),
            tag: tag.into(),
            literal: None,
        })
    }

    /// Maps `key` to `tag` with a literal that takes precedence over the record value.
    #[must_use]
    pub fn with_literal(
        self,
        key: impl Into<String>,
        tag: impl Into<String>,
        literal: impl Into<Value>,
    ) -> Self {
        self.insert(TagMapping {
            key: key.into(),
            tag: tag.into(),
            literal: Some(literal.into()),
        })
    }

    /// A copy of this mapping with `key` removed, so its value falls through
    /// to the residual set.
    #[must_use]
    pub fn without(&self, key: &str) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|entry| entry.key != key)
                .cloned()
                .collect(),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    pub fn entries(&self) -> &[TagMapping] {
        &self.entries
    }

    fn insert(mut self, mapping: TagMapping) -> Self {
        match self.entries.iter_mut().find(|e| e.key == mapping.key) {
            Some(existing) => *existing = mapping,
            None => self.entries.push(mapping),
        }
        self
    }
}
