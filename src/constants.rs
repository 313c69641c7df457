// Physical Constants
pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225; // kg/m³

// Topics
pub const CONTROLS_TOPIC: &str = "controls";
pub const AIRCRAFT_STATE_TOPIC: &str = "aircraft_state";
pub const LIFECYCLE_TOPIC: &str = "sim_lifecycle";
pub const TELEMETRY_TOPIC: &str = "frame_telemetry";

// Scheduler Parameters
pub const DEFAULT_FRAME_RATE: u32 = 60; // Hz

// Aircraft Mass Properties (light single-engine trainer)
pub const AIRCRAFT_MASS: f64 = 1000.0; // kg
pub const INERTIA_ROLL: f64 = 2000.0; // kg·m²
pub const INERTIA_PITCH: f64 = 3000.0; // kg·m²
pub const INERTIA_YAW: f64 = 4000.0; // kg·m²

// Aerodynamic Constants
pub const WING_AREA: f64 = 16.2; // m²
pub const LIFT_COEFFICIENT_ZERO: f64 = 0.3;
pub const LIFT_CURVE_SLOPE: f64 = 5.0; // per rad
pub const DRAG_COEFFICIENT_ZERO: f64 = 0.03;
pub const DRAG_ALPHA_FACTOR: f64 = 0.5; // per rad²

// Propulsion Constants
pub const MAX_THRUST: f64 = 6000.0; // N

// Control Authority
pub const ROLL_AUTHORITY: f64 = 5000.0; // N·m at full aileron
pub const PITCH_AUTHORITY: f64 = 3000.0; // N·m at full elevator
pub const YAW_AUTHORITY: f64 = 1000.0; // N·m at full rudder

// Initial Conditions
pub const INITIAL_ALTITUDE: f64 = 1000.0; // m
pub const INITIAL_AIRSPEED: f64 = 50.0; // m/s
