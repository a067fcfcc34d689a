//! Three lap timers on one serial line.
//!
//! Each node has a host-facing port (routed with `ChainPolicy`) and a
//! downstream port (routed with `RelayAll`). Frames are delivered through a
//! FIFO so relays happen in the order a real line would carry them.

use std::collections::VecDeque;

use heapless::Vec;
use racelap_core::config::Settings;
use racelap_core::traits::{Passthrough, Tuner};
use racelap_core::{ChainPolicy, Device, Engine, LapTimerSubsystem, RelayAll, RoutingPolicy};
use racelap_protocol::commands::{MSP_CHANNEL, MSP_DEVICE_ID, MSP_SET_CHANNEL, MSP_SET_DEVICE_ID};
use racelap_protocol::{encode_frame, Direction, Port, MAX_FRAME_SIZE, WILDCARD_DEVICE_ID};

#[derive(Debug, Default)]
struct NullTuner;

impl Tuner for NullTuner {
    fn tune(&mut self, _frequency_mhz: u16) {}
}

type Node = (Engine<Device<NullTuner, (), Passthrough>>, Port, Port);

#[derive(Debug, Clone, Copy)]
enum Hop {
    /// Towards a node's host-facing port
    Down(usize),
    /// Towards a node's downstream port
    Up(usize),
}

struct Line {
    nodes: std::vec::Vec<Node>,
    host: Port,
    received: std::vec::Vec<(Direction, u8, u8, std::vec::Vec<u8>)>,
}

impl Line {
    fn new(len: usize) -> Self {
        let nodes = (0..len)
            .map(|_| {
                let device =
                    Device::from_settings(&Settings::default(), NullTuner, (), Passthrough);
                (Engine::new(device), Port::new(), Port::new())
            })
            .collect();
        Self {
            nodes,
            host: Port::new(),
            received: std::vec::Vec::new(),
        }
    }

    /// Deliver a frame towards whatever sits above `index`
    fn upstream_of(index: usize) -> Option<Hop> {
        index.checked_sub(1).map(Hop::Up)
    }

    fn send(&mut self, target: u8, command: u8, payload: &[u8]) {
        let mut bytes = Vec::<u8, MAX_FRAME_SIZE>::new();
        encode_frame(&mut bytes, Direction::Request, target, command, payload).unwrap();

        let mut queue = VecDeque::new();
        queue.push_back((Hop::Down(0), bytes));

        while let Some((hop, bytes)) = queue.pop_front() {
            let (index, towards_host) = match hop {
                Hop::Down(i) => (i, false),
                Hop::Up(i) => (i, true),
            };
            if index >= self.nodes.len() {
                continue;
            }

            for &byte in bytes.iter() {
                let mut reply = Vec::<u8, MAX_FRAME_SIZE>::new();
                let mut forward = Vec::<u8, MAX_FRAME_SIZE>::new();
                let (engine, host_port, down_port) = &mut self.nodes[index];
                if towards_host {
                    feed(engine, down_port, &RelayAll, byte, &mut reply, &mut forward);
                    // Frames from below continue towards the host.
                    self.deliver_up(index, forward, &mut queue);
                } else {
                    feed(engine, host_port, &ChainPolicy, byte, &mut reply, &mut forward);
                    if !forward.is_empty() {
                        queue.push_back((Hop::Down(index + 1), forward));
                    }
                    self.deliver_up(index, reply, &mut queue);
                }
            }
        }
    }

    fn deliver_up(
        &mut self,
        index: usize,
        bytes: Vec<u8, MAX_FRAME_SIZE>,
        queue: &mut VecDeque<(Hop, Vec<u8, MAX_FRAME_SIZE>)>,
    ) {
        if bytes.is_empty() {
            return;
        }
        match Self::upstream_of(index) {
            Some(hop) => queue.push_back((hop, bytes)),
            None => {
                for &byte in bytes.iter() {
                    let _ = self.host.feed(byte);
                    if let Some(frame) = self.host.frame() {
                        self.received.push((
                            frame.direction,
                            frame.target_id,
                            frame.command,
                            frame.payload.to_vec(),
                        ));
                        self.host.reset();
                    }
                }
            }
        }
    }

    fn ids(&self) -> std::vec::Vec<u8> {
        self.nodes.iter().map(|(e, _, _)| e.subsystem().device_id()).collect()
    }
}

fn feed<P: RoutingPolicy>(
    engine: &mut Engine<Device<NullTuner, (), Passthrough>>,
    port: &mut Port,
    policy: &P,
    byte: u8,
    reply: &mut Vec<u8, MAX_FRAME_SIZE>,
    forward: &mut Vec<u8, MAX_FRAME_SIZE>,
) {
    engine.feed(port, policy, byte, reply, forward).unwrap();
}

#[test]
fn enumeration_assigns_consecutive_ids() {
    let mut line = Line::new(3);
    line.send(WILDCARD_DEVICE_ID, MSP_SET_DEVICE_ID, &[1]);

    assert_eq!(line.ids(), [1, 2, 3]);

    // Every device acknowledged with its new id, nearest first.
    let acks: std::vec::Vec<u8> = line.received.iter().map(|r| r.1).collect();
    assert_eq!(acks, [1, 2, 3]);
    for (direction, _, command, payload) in &line.received {
        assert_eq!(*direction, Direction::Response);
        assert_eq!(*command, MSP_SET_DEVICE_ID);
        assert!(payload.is_empty());
    }
}

#[test]
fn wildcard_id_enumeration_keeps_first_device() {
    // Fresh devices all boot as id 1; the host asks for the wildcard id.
    let mut line = Line::new(3);
    assert_eq!(line.ids(), [1, 1, 1]);
    line.send(WILDCARD_DEVICE_ID, MSP_SET_DEVICE_ID, &[0]);

    // The first device keeps 1 and stamps 2, the next adopts 2 and stamps 3.
    assert_eq!(line.ids(), [1, 2, 3]);
    let acks: std::vec::Vec<u8> = line.received.iter().map(|r| r.1).collect();
    assert_eq!(acks, [1, 2, 3]);

    // Wildcard frames still reach the whole chain.
    line.received.clear();
    line.send(WILDCARD_DEVICE_ID, MSP_CHANNEL, &[]);
    let ids: std::vec::Vec<u8> = line.received.iter().map(|r| r.1).collect();
    assert_eq!(ids, [1, 2, 3]);
}

#[test]
fn enumeration_from_arbitrary_base() {
    let mut line = Line::new(3);
    line.send(WILDCARD_DEVICE_ID, MSP_SET_DEVICE_ID, &[10]);
    assert_eq!(line.ids(), [10, 11, 12]);
}

#[test]
fn addressed_query_answered_by_one_device() {
    let mut line = Line::new(3);
    line.send(WILDCARD_DEVICE_ID, MSP_SET_DEVICE_ID, &[1]);
    line.received.clear();

    line.send(3, MSP_DEVICE_ID, &[]);
    assert_eq!(line.received.len(), 1);
    let (direction, id, command, payload) = &line.received[0];
    assert_eq!(*direction, Direction::Response);
    assert_eq!(*id, 3);
    assert_eq!(*command, MSP_DEVICE_ID);
    assert_eq!(payload.as_slice(), &[3]);
}

#[test]
fn addressed_action_changes_only_its_target() {
    let mut line = Line::new(3);
    line.send(WILDCARD_DEVICE_ID, MSP_SET_DEVICE_ID, &[1]);

    line.send(2, MSP_SET_CHANNEL, &5905u16.to_le_bytes());
    let channels: std::vec::Vec<u16> = line
        .nodes
        .iter()
        .map(|(e, _, _)| e.subsystem().channel())
        .collect();
    assert_eq!(channels, [5865, 5905, 5865]);
}

#[test]
fn wildcard_query_answered_by_every_device() {
    let mut line = Line::new(3);
    line.send(WILDCARD_DEVICE_ID, MSP_SET_DEVICE_ID, &[1]);
    line.received.clear();

    line.send(WILDCARD_DEVICE_ID, MSP_CHANNEL, &[]);
    let ids: std::vec::Vec<u8> = line.received.iter().map(|r| r.1).collect();
    assert_eq!(ids, [1, 2, 3]);
}
