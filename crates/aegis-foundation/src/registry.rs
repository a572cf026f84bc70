//! Entity recognition registry
//!
//! An ordered, immutable list of [`Detector`]s built once at gateway
//! construction. Registration checks every detector against the configured
//! recognized-entity set; nothing can be added after [`RegistryBuilder::build`].

use crate::recognizers::{BuiltinRecognizer, Detector, PatternRecognizer};
use aegis_kernel::config::GatewaySettings;
use aegis_kernel::error::{ConfigurationError, RegistryError};
use aegis_kernel::security::{EntitySet, EntityType, Recognizer};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Hex characters kept from the SHA-256 fingerprint.
const VERSION_LEN: usize = 16;

/// Collects detectors before freezing them into a [`Registry`].
#[derive(Debug)]
pub struct RegistryBuilder {
    entities: EntitySet,
    detectors: Vec<Detector>,
}

impl RegistryBuilder {
    pub fn new(entities: EntitySet) -> Self {
        Self {
            entities,
            detectors: Vec::new(),
        }
    }

    /// Appends a detector.
    ///
    /// Fails when the detector declares no entity types, declares one outside
    /// the recognized set, or reuses a registered name.
    pub fn register(&mut self, detector: impl Into<Detector>) -> Result<&mut Self, RegistryError> {
        let detector = detector.into();
        let name = detector.name().to_string();

        if detector.supported_entities().is_empty() {
            return Err(RegistryError::NoEntities(name));
        }

        if let Some(entity) = detector
            .supported_entities()
            .iter()
            .copied()
            .find(|e| !self.entities.contains(*e))
        {
            return Err(RegistryError::UnrecognizedEntity {
                detector: name,
                entity,
            });
        }

        if self.detectors.iter().any(|d| d.name() == name) {
            return Err(RegistryError::DuplicateDetector(name));
        }

        debug!(detector = %name, kind = detector.kind(), "Registered detector");
        self.detectors.push(detector);
        Ok(self)
    }

    /// Registers the shipped detectors for every recognized entity type:
    /// one built-in per PII type, and the vendor key patterns for `API_KEY`.
    pub fn register_defaults(&mut self) -> Result<&mut Self, RegistryError> {
        let entities: Vec<EntityType> = self.entities.iter().collect();
        for entity in entities {
            match BuiltinRecognizer::for_entity(entity) {
                Some(builtin) => self.register(builtin)?,
                None => self.register(PatternRecognizer::api_keys())?,
            };
        }
        Ok(self)
    }

    /// A builder holding the shipped detectors for the configured entities
    /// followed by the configured pattern rules, in declaration order.
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self, ConfigurationError> {
        let mut builder = Self::new(settings.recognized_entities.clone());
        builder.register_defaults()?;
        for rule in &settings.patterns {
            builder.register(PatternRecognizer::from_rule(rule)?)?;
        }
        Ok(builder)
    }

    pub fn build(self) -> Registry {
        let version = fingerprint(&self.detectors);
        Registry {
            entities: self.entities,
            detectors: self.detectors,
            version,
        }
    }
}

/// Frozen, versioned detector list. Shared read-only across threads.
#[derive(Debug)]
pub struct Registry {
    entities: EntitySet,
    detectors: Vec<Detector>,
    version: String,
}

impl Registry {
    pub fn builder(entities: EntitySet) -> RegistryBuilder {
        RegistryBuilder::new(entities)
    }

    /// See [`RegistryBuilder::from_settings`].
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self, ConfigurationError> {
        RegistryBuilder::from_settings(settings).map(RegistryBuilder::build)
    }

    /// Entity types the registry was built for.
    pub fn entities(&self) -> &EntitySet {
        &self.entities
    }

    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Stable fingerprint of the ordered `(name, entity types)` list.
    pub fn version(&self) -> &str {
        &self.version
    }
}

fn fingerprint(detectors: &[Detector]) -> String {
    let mut hasher = Sha256::new();
    for detector in detectors {
        hasher.update(detector.name().as_bytes());
        hasher.update(b":");
        for entity in detector.supported_entities() {
            hasher.update(entity.as_str().as_bytes());
            hasher.update(b",");
        }
        hasher.update(b"\n");
    }
    let mut version = hex::encode(hasher.finalize());
    version.truncate(VERSION_LEN);
    version
}
