//! Property tests for routing, relay and dispatch.

use heapless::Vec;
use proptest::prelude::*;

use racelap_core::traits::{Passthrough, Tuner};
use racelap_core::{ChainPolicy, Device, Engine, Forwarded, LapTimerSubsystem, Outcome, RelayAll};
use racelap_protocol::commands::{MSP_SET_DEVICE_ID, MSP_SET_LAP_MAX};
use racelap_protocol::{encode_frame, Direction, ParseState, Port, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};

struct NullTuner;

impl Tuner for NullTuner {
    fn tune(&mut self, _frequency_mhz: u16) {}
}

type TestEngine = Engine<Device<NullTuner, (), Passthrough>>;
type Buf = Vec<u8, MAX_FRAME_SIZE>;

fn engine() -> TestEngine {
    Engine::new(Device::new(NullTuner, (), Passthrough))
}

fn encoded(direction: Direction, id: u8, command: u8, payload: &[u8]) -> Buf {
    let mut out = Buf::new();
    encode_frame(&mut out, direction, id, command, payload).unwrap();
    out
}

proptest! {
    #[test]
    fn relay_all_is_verbatim_except_enumeration(
        response in any::<bool>(),
        id in any::<u8>(),
        command in any::<u8>().prop_filter("enumeration", |c| *c != MSP_SET_DEVICE_ID),
        payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE),
    ) {
        let direction = if response { Direction::Response } else { Direction::Request };
        let bytes = encoded(direction, id, command, &payload);
        let mut engine = engine();
        let mut port = Port::new();
        let (mut reply, mut forward) = (Buf::new(), Buf::new());

        for &b in bytes.iter() {
            engine.feed(&mut port, &RelayAll, b, &mut reply, &mut forward).unwrap();
        }
        prop_assert!(reply.is_empty());
        prop_assert_eq!(forward, bytes);
    }

    #[test]
    fn enumeration_relay_carries_next_id(local in any::<u8>(), payload in any::<u8>()) {
        let mut engine = engine();
        engine.subsystem_mut().set_device_id(local);
        let bytes = encoded(Direction::Request, 200, MSP_SET_DEVICE_ID, &[payload]);
        let mut port = Port::new();
        let (mut reply, mut forward) = (Buf::new(), Buf::new());

        let mut last = Outcome::NotFrame;
        for &b in bytes.iter() {
            last = engine.feed(&mut port, &RelayAll, b, &mut reply, &mut forward).unwrap();
        }
        let next_id = local.wrapping_add(1);
        match last {
            Outcome::Handled(handled) => {
                prop_assert_eq!(handled.forwarded, Some(Forwarded::Enumerated { next_id }));
            }
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
        prop_assert_eq!(forward, encoded(Direction::Request, 200, MSP_SET_DEVICE_ID, &[next_id]));
    }

    #[test]
    fn lap_maximum_never_exceeds_hard_limit(requested in any::<u8>()) {
        let mut engine = engine();
        let bytes = encoded(Direction::Request, 1, MSP_SET_LAP_MAX, &[requested]);
        let mut port = Port::new();
        let (mut reply, mut forward) = (Buf::new(), Buf::new());
        for &b in bytes.iter() {
            engine.feed(&mut port, &ChainPolicy, b, &mut reply, &mut forward).unwrap();
        }
        prop_assert_eq!(engine.subsystem().max_laps(), requested.min(50));
    }

    #[test]
    fn noise_leaves_port_consistent(noise in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut engine = engine();
        let mut port = Port::new();
        for &b in &noise {
            let (mut reply, mut forward) = (Buf::new(), Buf::new());
            let outcome = engine
                .feed(&mut port, &ChainPolicy, b, &mut reply, &mut forward)
                .unwrap();
            if let Outcome::Handled(_) | Outcome::Dropped(_) = outcome {
                prop_assert_eq!(port.state(), ParseState::Idle);
            }
            prop_assert!(!port.has_frame());
        }
    }
}
