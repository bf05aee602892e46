pub mod analysis;
pub mod media;
pub mod pipeline;
pub mod planning;
pub mod shared;
