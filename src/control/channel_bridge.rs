use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::{
    constants::{AIRCRAFT_STATE_TOPIC, CONTROLS_TOPIC},
    errors::SimulationError,
    messaging::{message::Message, router::MessageRouter},
    scheduler::module::{Component, Module},
    state_model::{aircraft_state::AircraftState, controls::ControlInputs},
};

/// Host side of a [`ChannelBridge`]: owned by the I/O worker thread.
pub struct HostLink {
    pub controls: Sender<ControlInputs>,
    pub states: Receiver<AircraftState>,
}

/// Moves data between a host-simulator worker thread and the frame loop.
///
/// The worker pushes controls into a channel at its own pace; `update()`
/// drains it on the frame thread and publishes only the newest set. State
/// snapshots go the other way through a bounded channel; when it is full the
/// snapshot is dropped and counted rather than blocking the tick.
pub struct ChannelBridge {
    router: Arc<MessageRouter>,
    inbound: Receiver<ControlInputs>,
    host_connected: bool,
    controls_forwarded: u64,
    states_dropped: Arc<AtomicU64>,
}

impl ChannelBridge {
    pub fn new(router: Arc<MessageRouter>, capacity: usize) -> (Self, HostLink) {
        let (control_tx, control_rx) = bounded(capacity.max(1));
        let (state_tx, state_rx) = bounded::<AircraftState>(capacity.max(1));
        let states_dropped = Arc::new(AtomicU64::new(0));

        let dropped = Arc::clone(&states_dropped);
        router.subscribe(AIRCRAFT_STATE_TOPIC, move |message| {
            let Some(state) = message.as_aircraft_state() else {
                return Err(SimulationError::UnexpectedPayload(
                    AIRCRAFT_STATE_TOPIC.to_string(),
                ));
            };
            match state_tx.try_send(state.clone()) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => {
                    dropped.fetch_add(1, Ordering::Relaxed);
                    log::trace!("Host state queue full, snapshot dropped");
                    Ok(())
                }
                Err(TrySendError::Disconnected(_)) => Err(SimulationError::ChannelClosed(
                    "host state receiver dropped".to_string(),
                )),
            }
        });

        let bridge = ChannelBridge {
            router,
            inbound: control_rx,
            host_connected: true,
            controls_forwarded: 0,
            states_dropped,
        };
        let link = HostLink {
            controls: control_tx,
            states: state_rx,
        };
        (bridge, link)
    }

    pub fn is_host_connected(&self) -> bool {
        self.host_connected
    }

    pub fn controls_forwarded(&self) -> u64 {
        self.controls_forwarded
    }

    pub fn states_dropped(&self) -> u64 {
        self.states_dropped.load(Ordering::Relaxed)
    }
}

impl Component for ChannelBridge {
    fn name(&self) -> &str {
        "ChannelBridge"
    }

    fn as_module(&mut self) -> Option<&mut dyn Module> {
        Some(self)
    }
}

impl Module for ChannelBridge {
    fn update(&mut self) -> Result<(), SimulationError> {
        let mut latest = None;
        let mut disconnected = false;
        loop {
            match self.inbound.try_recv() {
                Ok(controls) => latest = Some(controls),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if let Some(controls) = latest {
            self.controls_forwarded += 1;
            self.router.publish(CONTROLS_TOPIC, Message::Controls(controls));
        }

        // Reported once; afterwards the bridge idles and the last controls stand.
        if disconnected && self.host_connected {
            self.host_connected = false;
            return Err(SimulationError::ChannelClosed(
                "host control sender dropped".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;

    #[test]
    fn test_only_newest_controls_published() {
        let router = Arc::new(MessageRouter::new());
        let received = Arc::new(Mutex::new(Vec::new()));
        {
            let received = Arc::clone(&received);
            router.subscribe(CONTROLS_TOPIC, move |message: &Message| {
                if let Some(controls) = message.as_controls() {
                    received.lock().unwrap().push(*controls);
                }
                Ok(())
            });
        }
        let (mut bridge, link) = ChannelBridge::new(Arc::clone(&router), 8);

        link.controls.send(ControlInputs::new(0.1, 0.0, 0.0, 0.0)).unwrap();
        link.controls.send(ControlInputs::new(0.9, 0.0, 0.0, 0.0)).unwrap();
        bridge.update().unwrap();
        bridge.update().unwrap();

        assert_eq!(*received.lock().unwrap(), vec![ControlInputs::new(0.9, 0.0, 0.0, 0.0)]);
        assert_eq!(bridge.controls_forwarded(), 1);
    }

    #[test]
    fn test_controls_from_worker_thread() {
        let router = Arc::new(MessageRouter::new());
        let (mut bridge, link) = ChannelBridge::new(Arc::clone(&router), 4);

        let worker = thread::spawn(move || {
            link.controls
                .send(ControlInputs::new(0.5, 0.25, 0.0, 0.0))
                .unwrap();
        });
        worker.join().unwrap();

        // sender dropped with the worker: the pending set is still delivered
        let result = bridge.update();

        assert!(matches!(result, Err(SimulationError::ChannelClosed(_))));
        assert_eq!(bridge.controls_forwarded(), 1);
        assert!(!bridge.is_host_connected());
        assert!(bridge.update().is_ok());
    }

    #[test]
    fn test_states_forwarded_to_host() {
        let router = Arc::new(MessageRouter::new());
        let (_bridge, link) = ChannelBridge::new(Arc::clone(&router), 4);
        let state = AircraftState::new(1000.0, Default::default());

        router.publish(AIRCRAFT_STATE_TOPIC, Message::AircraftState(state.clone()));

        assert_eq!(link.states.try_recv().unwrap(), state);
    }

    #[test]
    fn test_full_state_queue_drops_without_failing() {
        let router = Arc::new(MessageRouter::new());
        let (bridge, _link) = ChannelBridge::new(Arc::clone(&router), 1);
        let state = AircraftState::new(1000.0, Default::default());

        router.publish(AIRCRAFT_STATE_TOPIC, Message::AircraftState(state.clone()));
        router.publish(AIRCRAFT_STATE_TOPIC, Message::AircraftState(state));

        assert_eq!(bridge.states_dropped(), 1);
        assert_eq!(router.stats().handler_failures, 0);
    }

    #[test]
    fn test_dropped_host_receiver_reported_as_delivery_error() {
        let router = Arc::new(MessageRouter::new());
        let (_bridge, link) = ChannelBridge::new(Arc::clone(&router), 1);
        drop(link);

        let delivered = router.publish(
            AIRCRAFT_STATE_TOPIC,
            Message::AircraftState(AircraftState::new(1000.0, Default::default())),
        );

        assert_eq!(delivered, 1);
        assert_eq!(router.stats().handler_failures, 1);
    }
}
