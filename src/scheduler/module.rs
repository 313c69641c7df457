use crate::errors::SimulationError;

/// Anything that can be offered to the frame scheduler.
///
/// A component takes part in the frame loop only if it exposes the update
/// capability through [`Component::as_module`]. Components that merely
/// subscribe to topics keep the default and are turned away at registration.
pub trait Component: Send {
    fn name(&self) -> &str;

    fn as_module(&mut self) -> Option<&mut dyn Module> {
        None
    }
}

/// Per-frame update capability.
pub trait Module: Component {
    fn update(&mut self) -> Result<(), SimulationError>;
}
