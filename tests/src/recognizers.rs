use aegis_kernel::error::DetectionError;
use aegis_kernel::security::{EntityType, Finding, Recognizer};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// What a [`MockRecognizer`] does when called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    /// Return the scripted findings
    #[default]
    Findings,
    /// Return a [`DetectionError::Failed`]
    Fail,
    /// Panic inside `analyze`
    Panic,
    /// Sleep, then return the scripted findings
    Sleep(Duration),
}

/// A scripted detector.
///
/// Clones share state, so a test can keep one handle while the gateway owns
/// another and still inspect the calls made.
#[derive(Clone)]
pub struct MockRecognizer {
    name: String,
    entities: Vec<EntityType>,
    findings: Arc<Mutex<Vec<Finding>>>,
    behavior: Arc<Mutex<Behavior>>,
    /// Every text passed to `analyze`
    pub call_history: Arc<Mutex<Vec<String>>>,
}

impl MockRecognizer {
    pub fn new(name: &str, entity: EntityType) -> Self {
        Self {
            name: name.to_string(),
            entities: vec![entity],
            findings: Arc::new(Mutex::new(Vec::new())),
            behavior: Arc::new(Mutex::new(Behavior::Findings)),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a finding returned on every call.
    #[must_use]
    pub fn with_finding(self, start: usize, end: usize, confidence: f64) -> Self {
        let entity = self.entities[0];
        self.findings
            .lock()
            .push(Finding::new(entity, start, end, confidence));
        self
    }

    #[must_use]
    pub fn with_behavior(self, behavior: Behavior) -> Self {
        self.set_behavior(behavior);
        self
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn history(&self) -> Vec<String> {
        self.call_history.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_history.lock().len()
    }
}

impl Recognizer for MockRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_entities(&self) -> &[EntityType] {
        &self.entities
    }

    fn analyze(&self, text: &str) -> Result<Vec<Finding>, DetectionError> {
        self.call_history.lock().push(text.to_string());
        let behavior = *self.behavior.lock();
        match behavior {
            Behavior::Findings => {}
            Behavior::Fail => {
                return Err(DetectionError::Failed {
                    detector: self.name.clone(),
                    reason: "scripted failure".into(),
                });
            }
            Behavior::Panic => panic!("scripted panic in {}", self.name),
            Behavior::Sleep(duration) => std::thread::sleep(duration),
        }
        Ok(self.findings.lock().clone())
    }
}

#[macro_export]
macro_rules! assert_detector_called {
    ($detector:expr, $expected_count:expr) => {
        let count = $detector.call_count();
        assert_eq!(
            count,
            $expected_count,
            "Expected detector '{}' to be called {} times, but was called {} times",
            aegis_kernel::security::Recognizer::name(&$detector),
            $expected_count,
            count
        );
    };
}
