pub mod rms_silence_detector;
