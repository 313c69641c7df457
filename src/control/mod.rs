pub mod channel_bridge;
pub mod random_pilot;
pub mod sine_pilot;
