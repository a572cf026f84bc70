//! Scanner
//!
//! Runs every registered detector relevant to the requested entity types
//! and unions their findings. A detector that errors, panics or runs past its
//! budget contributes nothing; the scan carries on with the rest.
//!
//! Post-processing, in order:
//! 1. drop findings of unrequested types and spans that do not fit the text
//! 2. de-duplicate by `(entity_type, start, end)`, keeping the highest confidence
//! 3. drop findings below `min_confidence`
//! 4. sort by `(start, end, entity_type)`
//!
//! Overlapping findings of different types are kept; the redactor resolves them.

use crate::registry::Registry;
use aegis_kernel::error::{AegisResult, DetectionError, GatewayError};
use aegis_kernel::security::{EntitySet, EntityType, Finding, Recognizer};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Outcome of one scan, including recovered detector failures.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Post-processed findings
    pub findings: Vec<Finding>,
    /// Detectors whose contribution was discarded
    pub failures: Vec<DetectionError>,
    /// Wall time of the whole scan
    pub elapsed: Duration,
    /// Number of detectors that ran
    pub detectors_run: usize,
    /// `true` when the scan budget ran out before every detector ran
    pub budget_exhausted: bool,
}

/// Runs a [`Registry`] over text.
#[derive(Debug)]
pub struct Scanner {
    registry: Registry,
    min_confidence: f64,
    detector_timeout: Option<Duration>,
    scan_timeout: Option<Duration>,
}

impl Scanner {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            min_confidence: 0.0,
            detector_timeout: None,
            scan_timeout: None,
        }
    }

    /// Findings below this confidence are dropped. Clamped to `[0, 1]`.
    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = if min_confidence.is_nan() {
            0.0
        } else {
            min_confidence.clamp(0.0, 1.0)
        };
        self
    }

    /// Budget per detector. A detector that overruns it contributes nothing.
    #[must_use]
    pub fn with_detector_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.detector_timeout = timeout;
        self
    }

    /// Budget for the whole scan. [`scan`](Self::scan) fails once it is exceeded.
    #[must_use]
    pub fn with_scan_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.scan_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn scan_timeout(&self) -> Option<Duration> {
        self.scan_timeout
    }

    /// Findings for `entities` in `text`.
    ///
    /// Fails only with [`GatewayError::ScanTimeout`]; detector failures are
    /// recovered and logged.
    pub fn scan(&self, text: &str, entities: &EntitySet) -> AegisResult<Vec<Finding>> {
        let report = self.scan_report(text, entities);

        if let Some(budget) = self.scan_timeout {
            if report.budget_exhausted || report.elapsed > budget {
                return Err(GatewayError::ScanTimeout {
                    elapsed_ms: millis(report.elapsed),
                    budget_ms: millis(budget),
                });
            }
        }

        Ok(report.findings)
    }

    /// Like [`scan`](Self::scan) but never fails; the caller inspects the report.
    pub fn scan_report(&self, text: &str, entities: &EntitySet) -> ScanReport {
        let started = Instant::now();
        let mut report = ScanReport::default();
        let mut best: BTreeMap<(usize, usize, EntityType), f64> = BTreeMap::new();

        for detector in self.registry.detectors() {
            if !detector
                .supported_entities()
                .iter()
                .any(|e| entities.contains(*e))
            {
                continue;
            }

            if let Some(budget) = self.scan_timeout {
                if started.elapsed() > budget {
                    report.budget_exhausted = true;
                    break;
                }
            }

            report.detectors_run += 1;
            match self.run_detector(detector, text) {
                Ok(findings) => {
                    for finding in findings {
                        if !entities.contains(finding.entity_type) {
                            continue;
                        }
                        if !finding.fits(text) {
                            warn!(
                                detector = detector.name(),
                                entity = %finding.entity_type,
                                start = finding.start,
                                end = finding.end,
                                "Dropping finding with invalid span"
                            );
                            continue;
                        }
                        best.entry(finding.key())
                            .and_modify(|c| *c = c.max(finding.confidence))
                            .or_insert(finding.confidence);
                    }
                }
                Err(err) => {
                    warn!(detector = detector.name(), error = %err, "Detector contribution discarded");
                    report.failures.push(err);
                }
            }
        }

        report.findings = best
            .into_iter()
            .filter(|(_, confidence)| *confidence >= self.min_confidence)
            .map(|((start, end, entity), confidence)| Finding::new(entity, start, end, confidence))
            .collect();
        report.elapsed = started.elapsed();

        debug!(
            detectors_run = report.detectors_run,
            finding_count = report.findings.len(),
            failures = report.failures.len(),
            elapsed_ms = millis(report.elapsed),
            "Scan complete"
        );
        report
    }

    fn run_detector(
        &self,
        detector: &dyn Recognizer,
        text: &str,
    ) -> Result<Vec<Finding>, DetectionError> {
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| detector.analyze(text)));
        let elapsed = started.elapsed();

        let findings = match outcome {
            Ok(result) => result?,
            Err(payload) => {
                return Err(DetectionError::Panicked {
                    detector: detector.name().to_string(),
                    message: panic_message(payload.as_ref()),
                });
            }
        };

        if let Some(budget) = self.detector_timeout {
            if elapsed > budget {
                return Err(DetectionError::TimedOut {
                    detector: detector.name().to_string(),
                    elapsed_ms: millis(elapsed),
                    budget_ms: millis(budget),
                });
            }
        }

        Ok(findings)
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
