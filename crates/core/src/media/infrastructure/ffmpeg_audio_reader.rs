use std::path::Path;

use crate::media::domain::audio_reader::AudioReader;
use crate::media::domain::audio_segment::AudioSegment;

/// Decodes and downmixes audio using ffmpeg-next.
///
/// Whatever the source stream looks like, the resampler emits planar f32
/// mono at the requested rate, which is exactly what the RMS analysis wants.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn read_mono(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        decode_mono(path, target_sample_rate, None, None)
    }

    fn read_mono_window(
        &self,
        path: &Path,
        target_sample_rate: u32,
        start: f64,
        duration: f64,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        let max_samples = (duration * f64::from(target_sample_rate)).ceil() as usize;
        decode_mono(path, target_sample_rate, Some(start), Some(max_samples))
    }
}

/// Shared decode loop. `seek_secs` jumps to the nearest keyframe before that
/// timestamp; `max_samples` stops decoding once enough audio is collected.
fn decode_mono(
    path: &Path,
    target_sample_rate: u32,
    seek_secs: Option<f64>,
    max_samples: Option<usize>,
) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
    ffmpeg_next::init()?;

    let mut ictx = ffmpeg_next::format::input(path)?;

    if let Some(start) = seek_secs {
        let ts = (start * f64::from(ffmpeg_next::ffi::AV_TIME_BASE)) as i64;
        ictx.seek(ts, ..ts)?;
    }

    let audio_stream = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
        Some(stream) => stream,
        None => return Ok(None),
    };

    let audio_stream_index = audio_stream.index();
    let codec_ctx =
        ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())?;
    let mut decoder = codec_ctx.decoder().audio()?;

    let mut resampler = ffmpeg_next::software::resampling::Context::get(
        decoder.format(),
        decoder.channel_layout(),
        decoder.rate(),
        ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
        ffmpeg_next::ChannelLayout::MONO,
        target_sample_rate,
    )?;

    let mut samples: Vec<f32> = Vec::new();
    let mut decoded = ffmpeg_next::util::frame::audio::Audio::empty();
    let mut resampled = ffmpeg_next::util::frame::audio::Audio::empty();
    let enough = |collected: usize| max_samples.is_some_and(|m| collected >= m);

    for (stream, packet) in ictx.packets() {
        if stream.index() != audio_stream_index {
            continue;
        }

        decoder.send_packet(&packet)?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            resampler.run(&decoded, &mut resampled)?;
            collect_mono_f32(&resampled, &mut samples);
        }
        if enough(samples.len()) {
            break;
        }
    }

    // Drain decoder and resampler buffers
    if !enough(samples.len()) {
        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            resampler.run(&decoded, &mut resampled)?;
            collect_mono_f32(&resampled, &mut samples);
        }
        if let Ok(Some(delay)) = resampler.flush(&mut resampled) {
            if delay.output > 0 {
                collect_mono_f32(&resampled, &mut samples);
            }
        }
    }

    if let Some(m) = max_samples {
        samples.truncate(m);
    }

    Ok(Some(AudioSegment::new(samples, target_sample_rate)))
}

/// Appends the f32 samples of a planar mono frame.
fn collect_mono_f32(frame: &ffmpeg_next::util::frame::audio::Audio, out: &mut Vec<f32>) {
    let count = frame.samples();
    if count == 0 {
        return;
    }
    let data = frame.data(0);
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, count) };
    out.extend_from_slice(floats);
}
