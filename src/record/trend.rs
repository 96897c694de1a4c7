use crate::record::MetadataRecord;
use lazy_static::lazy_static;

const TREND_JSON: &str = include_str!("trend.json");

lazy_static! {
    /// The built-in fingerprint written when no other record is configured.
    pub static ref TREND_RECORD: MetadataRecord =
        MetadataRecord::from_json_str(TREND_JSON).expect("bundled trend record is valid JSON");
}
