use std::path::Path;

use crate::media::domain::media_prober::MediaProber;
use crate::shared::media_info::MediaInfo;

/// Reads container metadata using ffmpeg-next, without decoding frames.
pub struct FfmpegProber;

impl MediaProber for FfmpegProber {
    fn probe(&self, path: &Path) -> Result<MediaInfo, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        // Container duration is in AV_TIME_BASE units (microseconds).
        let duration_secs = ictx.duration() as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE);

        let audio_sample_rate = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => {
                let codec_ctx =
                    ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
                Some(codec_ctx.decoder().audio()?.rate())
            }
            None => None,
        };

        Ok(MediaInfo {
            duration_secs,
            has_audio: audio_sample_rate.is_some(),
            audio_sample_rate,
            source_path: Some(path.to_path_buf()),
        })
    }
}
