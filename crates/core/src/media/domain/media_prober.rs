use std::path::Path;

use crate::shared::media_info::MediaInfo;

/// Reads container-level metadata without decoding the streams.
pub trait MediaProber: Send {
    fn probe(&self, path: &Path) -> Result<MediaInfo, Box<dyn std::error::Error>>;
}
