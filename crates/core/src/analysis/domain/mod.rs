pub mod silence_detector;
pub mod volume_profile;
