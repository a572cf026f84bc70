//! Aegis Testing Framework
//!
//! Scripted detectors, failing sinks and gateway fixtures for exercising
//! the pipeline without a real key or log collector.

pub mod recognizers;
pub mod sinks;

pub use recognizers::{Behavior, MockRecognizer};
pub use sinks::FailingSink;

use aegis_foundation::{Detector, Gateway, GatewaySettings, MemoryAuditSink, SecretKey};
use std::sync::Arc;

/// Fixed key so blobs from one test can be opened in another.
pub const TEST_KEY_BYTES: [u8; 32] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f,
];

pub fn test_key() -> SecretKey {
    SecretKey::from(TEST_KEY_BYTES)
}

/// A gateway over `settings` with [`test_key`] and an in-memory sink.
///
/// Panics when the settings do not build; fixtures are for valid settings.
pub fn gateway_with(settings: GatewaySettings) -> (Gateway, Arc<MemoryAuditSink>) {
    gateway_with_detectors(settings, Vec::<Detector>::new())
}

/// Like [`gateway_with`], registering `detectors` after the defaults.
pub fn gateway_with_detectors(
    settings: GatewaySettings,
    detectors: impl IntoIterator<Item = impl Into<Detector>>,
) -> (Gateway, Arc<MemoryAuditSink>) {
    let sink = Arc::new(MemoryAuditSink::new());
    let mut builder = Gateway::builder(settings).key(test_key()).sink(sink.clone());
    for detector in detectors {
        builder = builder.detector(detector);
    }
    let gateway = builder.build().expect("fixture settings must build");
    (gateway, sink)
}
