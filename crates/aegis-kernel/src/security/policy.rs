//! Redaction policy
//!
//! Maps each [`EntityType`] to the [`RedactionStrategy`] used to substitute
//! its findings. A finding whose entity type has no entry is never emitted
//! verbatim: the redactor fails the call instead.

use super::types::{EntitySet, EntityType, RedactionStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entity → substitution mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionPolicy {
    rules: BTreeMap<EntityType, RedactionStrategy>,
}

impl Default for RedactionPolicy {
    /// `<ENTITY_TYPE>` placeholders for every known entity type.
    fn default() -> Self {
        EntityType::ALL
            .into_iter()
            .map(|e| (e, RedactionStrategy::default()))
            .collect()
    }
}

impl RedactionPolicy {
    /// A policy with no rules. Every redaction fails closed until rules are added.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Sets the strategy for one entity type, replacing any previous rule.
    #[must_use]
    pub fn with_rule(mut self, entity: EntityType, strategy: RedactionStrategy) -> Self {
        self.rules.insert(entity, strategy);
        self
    }

    /// Removes the rule for one entity type.
    #[must_use]
    pub fn without_rule(mut self, entity: EntityType) -> Self {
        self.rules.remove(&entity);
        self
    }

    #[must_use]
    pub fn strategy_for(&self, entity: EntityType) -> Option<&RedactionStrategy> {
        self.rules.get(&entity)
    }

    /// Returns the first entity in `entities` with no rule, if any.
    #[must_use]
    pub fn first_uncovered(&self, entities: &EntitySet) -> Option<EntityType> {
        entities.iter().find(|e| !self.rules.contains_key(e))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityType, &RedactionStrategy)> {
        self.rules.iter().map(|(e, s)| (*e, s))
    }
}

impl FromIterator<(EntityType, RedactionStrategy)> for RedactionPolicy {
    fn from_iter<I: IntoIterator<Item = (EntityType, RedactionStrategy)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
