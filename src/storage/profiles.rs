//! Profile storage and persistence.
//!
//! Speed profiles, the current profile per channel and user settings live in
//! one JSON file. Cross-platform: uses appropriate config directories for
//! each OS.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info};

use crate::config::APP_NAME;
use crate::cooling::{AppliedCurves, Channel, SpeedCurve};
use crate::error::{KrakenError, Result};
use crate::storage::defaults::default_profiles;
use crate::storage::types::{ProfileFile, Settings, StoreEvent, StoredProfile};

// =============================================================================
// Config Path
// =============================================================================

const PROFILES_FILE: &str = "profiles.json";

/// Get the configuration directory path.
/// - Linux: ~/.config/nzxt-kraken-control/
/// - Windows: %APPDATA%\nzxt-kraken-control\
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .ok_or_else(|| KrakenError::InvalidInput("Could not find config directory".into()))
}

/// Get the full path to the profiles file.
pub fn get_profiles_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(PROFILES_FILE))
}

// =============================================================================
// Validation
// =============================================================================

/// Check steps for a profile on `channel`.
fn validate_steps(channel: Channel, single_step: bool, steps: &[(u8, u8)]) -> Result<()> {
    if steps.is_empty() {
        return Err(KrakenError::InvalidProfile(
            "a profile needs at least one step".into(),
        ));
    }
    if single_step && steps.len() != 1 {
        return Err(KrakenError::InvalidProfile(format!(
            "a fixed profile takes exactly one step, got {}",
            steps.len()
        )));
    }
    SpeedCurve::new(steps.iter().copied())?.validate_for(channel)
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(KrakenError::InvalidInput("profile name cannot be empty".into()));
    }
    Ok(name.to_string())
}

// =============================================================================
// ProfileStore
// =============================================================================

/// File-backed profile store.
///
/// Every change is written to disk before subscribers are notified.
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    data: ProfileFile,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl ProfileStore {
    /// Open the store in the user's config directory.
    pub fn open_default() -> Result<Self> {
        Self::open(get_profiles_path()?)
    }

    /// Open the store at `path`, seeding the built-in profiles if the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            ProfileFile {
                profiles: default_profiles(),
                ..ProfileFile::default()
            }
        };

        let store = Self {
            path,
            data,
            subscribers: Vec::new(),
        };
        if !store.path.exists() {
            store.save()?;
            info!("Created default profiles at: {}", store.path.display());
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Receive change notifications from now on.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Profiles of a channel, in id order.
    pub fn list(&self, channel: Channel) -> Vec<&StoredProfile> {
        let mut profiles: Vec<_> = self
            .data
            .profiles
            .iter()
            .filter(|p| p.channel == channel)
            .collect();
        profiles.sort_by_key(|p| p.id);
        profiles
    }

    pub fn get(&self, id: u32) -> Result<&StoredProfile> {
        self.data
            .profiles
            .iter()
            .find(|p| p.id == id)
            .ok_or(KrakenError::ProfileNotFound(id))
    }

    /// Profile currently applied to `channel`, if any.
    pub fn current(&self, channel: Channel) -> Option<&StoredProfile> {
        let id = self.data.current.get(channel)?;
        self.get(id).ok()
    }

    /// Curves of the current profiles.
    pub fn current_curves(&self) -> AppliedCurves {
        let curve = |channel| self.current(channel).and_then(|p| p.curve().ok());
        AppliedCurves {
            fan: curve(Channel::Fan),
            pump: curve(Channel::Pump),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.data.settings
    }

    // =========================================================================
    // Changes
    // =========================================================================

    /// Add a user profile and return its id.
    pub fn create(&mut self, channel: Channel, name: &str, steps: Vec<(u8, u8)>) -> Result<u32> {
        let name = validate_name(name)?;
        validate_steps(channel, false, &steps)?;

        let id = self.data.profiles.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        self.data.profiles.push(StoredProfile {
            id,
            channel,
            name,
            read_only: false,
            single_step: false,
            steps,
        });
        self.commit(&[StoreEvent::Inserted(id)])?;
        Ok(id)
    }

    pub fn update_steps(&mut self, id: u32, steps: Vec<(u8, u8)>) -> Result<()> {
        let profile = self.get_mut_writable(id)?;
        validate_steps(profile.channel, profile.single_step, &steps)?;
        profile.steps = steps;
        self.commit(&[StoreEvent::Updated(id)])
    }

    pub fn rename(&mut self, id: u32, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        self.get_mut_writable(id)?.name = name;
        self.commit(&[StoreEvent::Updated(id)])
    }

    /// Delete a user profile. A deleted current profile is cleared.
    pub fn delete(&mut self, id: u32) -> Result<()> {
        let channel = self.get_mut_writable(id)?.channel;
        self.data.profiles.retain(|p| p.id != id);

        let mut events = vec![StoreEvent::Deleted(id)];
        if self.data.current.get(channel) == Some(id) {
            self.data.current.set(channel, None);
            events.push(StoreEvent::CurrentChanged { channel, id: None });
        }
        self.commit(&events)
    }

    /// Mark `id` as applied to its channel.
    pub fn set_current(&mut self, channel: Channel, id: u32) -> Result<()> {
        let profile = self.get(id)?;
        if profile.channel != channel {
            return Err(KrakenError::InvalidInput(format!(
                "profile {} belongs to the {} channel",
                id, profile.channel
            )));
        }

        self.data.current.set(channel, Some(id));
        self.commit(&[StoreEvent::CurrentChanged {
            channel,
            id: Some(id),
        }])
    }

    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        if settings.refresh_interval_secs == 0 {
            return Err(KrakenError::InvalidInput(
                "refresh interval must be at least 1 second".into(),
            ));
        }
        self.data.settings = settings;
        self.commit(&[StoreEvent::SettingsChanged])
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn get_mut_writable(&mut self, id: u32) -> Result<&mut StoredProfile> {
        let profile = self
            .data
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(KrakenError::ProfileNotFound(id))?;
        if profile.read_only {
            return Err(KrakenError::ReadOnlyProfile(id));
        }
        Ok(profile)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn commit(&mut self, events: &[StoreEvent]) -> Result<()> {
        self.save()?;
        debug!("Profile store changed: {:?}", events);
        self.subscribers
            .retain(|tx| events.iter().all(|event| tx.send(*event).is_ok()));
        Ok(())
    }
}
