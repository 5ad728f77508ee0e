#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::Value;
use visit_beacon::{Beacon, ManualClock, MemoryStore, Transport};

/// Transport double that keeps every decoded payload.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, Value)>>,
}

impl RecordingTransport {
    pub fn bodies(&self) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, url: &str, body: Vec<u8>) -> bool {
        let value = serde_json::from_slice(&body).expect("beacon sent invalid json");
        self.sent.lock().unwrap().push((url.to_string(), value));
        true
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub transport: Arc<RecordingTransport>,
    pub beacon: Beacon,
}

pub fn harness(start_millis: i64) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_millis));
    let transport = Arc::new(RecordingTransport::default());
    let beacon = Beacon::builder(store.clone(), transport.clone())
        .with_clock(clock.clone())
        .build();

    Harness {
        store,
        clock,
        transport,
        beacon,
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
