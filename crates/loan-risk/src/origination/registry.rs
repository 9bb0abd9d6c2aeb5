use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::info;

use crate::assessment::{
    ConfigVersion, ConfigurationDraft, ConfigurationError, MissingConfigurationError,
    RiskConfiguration,
};

/// Error raised while authoring, activating, or resolving configurations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Invalid(#[from] ConfigurationError),
    #[error("configuration version {0} already exists")]
    DuplicateVersion(ConfigVersion),
    #[error("configuration version {0} not found")]
    UnknownVersion(ConfigVersion),
    #[error("configuration version {0} has been activated and can no longer be edited")]
    Immutable(ConfigVersion),
    #[error(transparent)]
    NoActive(#[from] MissingConfigurationError),
    #[error("configuration registry unavailable: {0}")]
    Unavailable(String),
}

/// Listing entry exposing whether a version is the active one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationEntry {
    pub configuration: RiskConfiguration,
    pub is_active: bool,
    pub locked: bool,
}

#[derive(Debug, Default)]
struct RegistryState {
    configurations: BTreeMap<ConfigVersion, RiskConfiguration>,
    activated: BTreeSet<ConfigVersion>,
    active: Option<ConfigVersion>,
}

/// In-process store of versioned configurations.
///
/// Activation swaps the active version under a write lock, so readers resolving the active
/// configuration always see one complete value.
#[derive(Debug, Default)]
pub struct ConfigurationRegistry {
    state: RwLock<RegistryState>,
}

impl ConfigurationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding a single, already active configuration.
    pub fn with_active(configuration: RiskConfiguration) -> Self {
        let version = configuration.version().clone();
        let mut state = RegistryState::default();
        state.configurations.insert(version.clone(), configuration);
        state.activated.insert(version.clone());
        state.active = Some(version);
        Self {
            state: RwLock::new(state),
        }
    }

    /// Rebuild a registry from persisted drafts, validating every one of them.
    ///
    /// `locked` lists every version that was ever activated. Those stay immutable after the
    /// reload even when another version is the active one.
    pub fn load(
        drafts: Vec<ConfigurationDraft>,
        locked: Vec<ConfigVersion>,
        active: Option<ConfigVersion>,
    ) -> Result<Self, RegistryError> {
        let registry = Self::new();
        for draft in drafts {
            registry.create(draft)?;
        }
        {
            let mut state = registry.write()?;
            for version in locked {
                if !state.configurations.contains_key(&version) {
                    return Err(RegistryError::UnknownVersion(version));
                }
                state.activated.insert(version);
            }
        }
        if let Some(version) = active {
            registry.activate(&version)?;
        }
        Ok(registry)
    }

    /// Validate and store a new, inactive configuration.
    pub fn create(&self, draft: ConfigurationDraft) -> Result<RiskConfiguration, RegistryError> {
        let configuration = RiskConfiguration::try_from(draft)?;
        let mut state = self.write()?;
        let version = configuration.version().clone();
        if state.configurations.contains_key(&version) {
            return Err(RegistryError::DuplicateVersion(version));
        }
        state
            .configurations
            .insert(version.clone(), configuration.clone());
        info!(%version, "risk configuration created");
        Ok(configuration)
    }

    /// Replace a configuration that has never been activated.
    pub fn update(&self, draft: ConfigurationDraft) -> Result<RiskConfiguration, RegistryError> {
        let configuration = RiskConfiguration::try_from(draft)?;
        let mut state = self.write()?;
        let version = configuration.version().clone();
        if !state.configurations.contains_key(&version) {
            return Err(RegistryError::UnknownVersion(version));
        }
        if state.activated.contains(&version) {
            return Err(RegistryError::Immutable(version));
        }
        state
            .configurations
            .insert(version.clone(), configuration.clone());
        info!(%version, "risk configuration updated");
        Ok(configuration)
    }

    /// Make `version` the active configuration, returning the one it replaced.
    pub fn activate(
        &self,
        version: &ConfigVersion,
    ) -> Result<Option<ConfigVersion>, RegistryError> {
        let mut state = self.write()?;
        let configuration = state
            .configurations
            .get(version)
            .ok_or_else(|| RegistryError::UnknownVersion(version.clone()))?;
        configuration.validate()?;

        state.activated.insert(version.clone());
        let previous = state.active.replace(version.clone());
        info!(
            %version,
            previous = previous.as_ref().map(|v| v.0.as_str()).unwrap_or("none"),
            "risk configuration activated"
        );
        Ok(previous)
    }

    /// Resolve the active configuration into an owned value.
    pub fn active(&self) -> Result<RiskConfiguration, RegistryError> {
        let state = self.read()?;
        state
            .active
            .as_ref()
            .and_then(|version| state.configurations.get(version))
            .cloned()
            .ok_or(RegistryError::NoActive(MissingConfigurationError))
    }

    pub fn get(&self, version: &ConfigVersion) -> Result<RiskConfiguration, RegistryError> {
        let state = self.read()?;
        state
            .configurations
            .get(version)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownVersion(version.clone()))
    }

    pub fn entries(&self) -> Result<Vec<ConfigurationEntry>, RegistryError> {
        let state = self.read()?;
        Ok(state
            .configurations
            .iter()
            .map(|(version, configuration)| ConfigurationEntry {
                configuration: configuration.clone(),
                is_active: state.active.as_ref() == Some(version),
                locked: state.activated.contains(version),
            })
            .collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RegistryState>, RegistryError> {
        self.state
            .read()
            .map_err(|_| RegistryError::Unavailable("registry lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RegistryState>, RegistryError> {
        self.state
            .write()
            .map_err(|_| RegistryError::Unavailable("registry lock poisoned".to_string()))
    }
}
