//! In-process daemon fake for session and batch unit tests.

use std::cell::RefCell;

use fpd_client::{ClientError, FingerprintDaemon, Notification};

/// Records every request and replays a scripted notification stream on the
/// first subscription.
pub struct FakeDaemon {
    fingers: Vec<String>,
    events: RefCell<Vec<Result<Notification, ClientError>>>,
    calls: RefCell<Vec<String>>,
}

impl FakeDaemon {
    pub fn new(fingers: &[&str]) -> Self {
        Self {
            fingers: fingers.iter().map(|f| f.to_string()).collect(),
            events: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_events(self, events: Vec<Notification>) -> Self {
        *self.events.borrow_mut() = events.into_iter().map(Ok).collect();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

impl FingerprintDaemon for FakeDaemon {
    type Events = std::vec::IntoIter<Result<Notification, ClientError>>;

    fn enroll(&self, finger: &str) -> Result<(), ClientError> {
        self.record(format!("enroll {finger}"));
        Ok(())
    }

    fn identify(&self) -> Result<(), ClientError> {
        self.record("identify");
        Ok(())
    }

    fn remove(&self, finger: &str) -> Result<(), ClientError> {
        self.record(format!("remove {finger}"));
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.record("clear");
        Ok(())
    }

    fn fingerprints(&self) -> Result<Vec<String>, ClientError> {
        self.record("list");
        Ok(self.fingers.clone())
    }

    fn subscribe(&self) -> Result<Self::Events, ClientError> {
        self.record("subscribe");
        Ok(std::mem::take(&mut *self.events.borrow_mut()).into_iter())
    }
}
