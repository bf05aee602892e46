pub mod batch_processor;
pub mod pipeline_logger;
pub mod remove_silence_use_case;
