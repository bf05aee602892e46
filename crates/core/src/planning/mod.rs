pub mod planner_config;
pub mod segment_planner;
