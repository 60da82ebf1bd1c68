//! Physical-to-logical key remapping
//!
//! Translates whatever the capture source reports into one of the four
//! movement roles. Keys that are not part of the active mapping resolve to
//! `None` and are ignored downstream.
//!
//! ## Usage
//!
//! ```
//! use counterstrafe_testkit::keyboard::{KeyMapping, KeyRemapper, LogicalKey, PhysicalKey};
//!
//! let mut remapper = KeyRemapper::new();
//! assert_eq!(remapper.resolve(&PhysicalKey::new("a")), Some(LogicalKey::Left));
//!
//! // Arrow-key layout
//! remapper
//!     .update_mapping(KeyMapping::new("UP", "DOWN", "LEFT", "RIGHT"))
//!     .unwrap();
//! assert_eq!(remapper.resolve(&PhysicalKey::new("a")), None);
//! ```

use super::{LogicalKey, PhysicalKey};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which physical key drives each movement role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMapping {
    pub forward: PhysicalKey,
    pub back: PhysicalKey,
    pub left: PhysicalKey,
    pub right: PhysicalKey,
}

impl Default for KeyMapping {
    fn default() -> Self {
        Self::new("W", "S", "A", "D")
    }
}

impl KeyMapping {
    pub fn new(
        forward: impl Into<PhysicalKey>,
        back: impl Into<PhysicalKey>,
        left: impl Into<PhysicalKey>,
        right: impl Into<PhysicalKey>,
    ) -> Self {
        Self {
            forward: forward.into(),
            back: back.into(),
            left: left.into(),
            right: right.into(),
        }
    }

    /// Physical key bound to a role
    pub fn key_for(&self, role: LogicalKey) -> &PhysicalKey {
        match role {
            LogicalKey::Forward => &self.forward,
            LogicalKey::Back => &self.back,
            LogicalKey::Left => &self.left,
            LogicalKey::Right => &self.right,
        }
    }

    /// Check that every role has a key and no key serves two roles
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut seen: HashMap<&PhysicalKey, LogicalKey> = HashMap::new();
        for role in LogicalKey::ALL {
            let key = self.key_for(role);
            if key.is_empty() {
                return Err(CoreError::UnmappedRole(role));
            }
            if let Some(&first) = seen.get(key) {
                return Err(CoreError::DuplicateMapping {
                    key: key.clone(),
                    first,
                    second: role,
                });
            }
            seen.insert(key, role);
        }
        Ok(())
    }
}

/// Resolves physical keys to logical roles through the active mapping
#[derive(Debug, Clone)]
pub struct KeyRemapper {
    mapping: KeyMapping,
    reverse: HashMap<PhysicalKey, LogicalKey>,
}

impl Default for KeyRemapper {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyRemapper {
    /// Create a remapper with the default W/S/A/D layout
    pub fn new() -> Self {
        let mapping = KeyMapping::default();
        let reverse = Self::build_reverse(&mapping);
        Self { mapping, reverse }
    }

    /// Create a remapper from a mapping, rejecting invalid ones
    pub fn with_mapping(mapping: KeyMapping) -> Result<Self, CoreError> {
        let mut remapper = Self::new();
        remapper.update_mapping(mapping)?;
        Ok(remapper)
    }

    fn build_reverse(mapping: &KeyMapping) -> HashMap<PhysicalKey, LogicalKey> {
        LogicalKey::ALL
            .iter()
            .map(|&role| (mapping.key_for(role).clone(), role))
            .collect()
    }

    /// Look up the role for a physical key
    pub fn resolve(&self, key: &PhysicalKey) -> Option<LogicalKey> {
        self.reverse.get(key).copied()
    }

    /// Replace the active mapping.
    ///
    /// On error the previous mapping stays in effect.
    pub fn update_mapping(&mut self, mapping: KeyMapping) -> Result<(), CoreError> {
        mapping.validate()?;
        self.reverse = Self::build_reverse(&mapping);
        self.mapping = mapping;
        Ok(())
    }

    /// Currently active mapping
    pub fn mapping(&self) -> &KeyMapping {
        &self.mapping
    }
}
