//! Client library for the fpd fingerprint daemon.
//!
//! The daemon owns the sensor, the matcher, and the template store; this
//! crate only speaks its socket protocol. Requests are fire-and-forget
//! triggers — enrollment progress, identification results, and failures all
//! arrive asynchronously on a notification subscription.

mod error;
pub mod paths;
pub mod protocol;
mod proxy;

pub use error::ClientError;
pub use protocol::{
    send_request, FpdRequest, FpdResponse, Notification, ENROLL_DONE, UNRECOGNIZED_ACQUISITION,
};
pub use proxy::{FingerprintDaemon, FpdProxy, Subscription};
