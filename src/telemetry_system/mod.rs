pub mod flight_recorder;
