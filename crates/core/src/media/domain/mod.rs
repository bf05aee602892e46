pub mod audio_reader;
pub mod audio_segment;
pub mod media_prober;
pub mod segment_cutter;
