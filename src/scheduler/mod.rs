pub mod clock;
pub mod frame_scheduler;
pub mod module;
pub mod stats;
