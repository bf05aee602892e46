pub mod constants;
pub mod media_info;
pub mod time_interval;
