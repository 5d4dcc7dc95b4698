//! In-memory settings store.

use super::{DeviceSetting, SettingsStore, SettingsTier, SharedSettings};
use crate::identity::default_device_name;
use crate::{BookMasterError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Settings store that keeps both tiers in memory.
///
/// One instance can back several registries with different device ids, which
/// models several devices that see the same synced shared document. Saves can
/// be made to fail per tier to exercise partial-write handling.
#[derive(Default)]
pub struct MemorySettingsStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    shared: Option<SharedSettings>,
    devices: HashMap<String, DeviceSetting>,
    fail_shared_saves: bool,
    fail_device_saves: bool,
    shared_saves: usize,
    device_saves: usize,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent saves of `tier` fail (or succeed again).
    pub fn set_fail_saves(&self, tier: SettingsTier, fail: bool) -> Result<()> {
        let mut state = self.lock()?;
        match tier {
            SettingsTier::Shared => state.fail_shared_saves = fail,
            SettingsTier::Device => state.fail_device_saves = fail,
        }
        Ok(())
    }

    /// Number of successful saves of `tier`.
    pub fn save_count(&self, tier: SettingsTier) -> Result<usize> {
        let state = self.lock()?;
        Ok(match tier {
            SettingsTier::Shared => state.shared_saves,
            SettingsTier::Device => state.device_saves,
        })
    }

    /// Last saved shared document, if any.
    pub fn saved_shared(&self) -> Result<Option<SharedSettings>> {
        Ok(self.lock()?.shared.clone())
    }

    /// Last saved document for a device, if any.
    pub fn saved_device(&self, device_id: &str) -> Result<Option<DeviceSetting>> {
        Ok(self.lock()?.devices.get(device_id).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| BookMasterError::Other("Settings store lock poisoned".to_string()))
    }
}

fn injected_failure(tier: SettingsTier) -> BookMasterError {
    BookMasterError::Io {
        message: format!("Injected {tier} save failure"),
        path: None,
        source: Some(std::io::Error::other("injected failure")),
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load_shared(&self) -> Result<SharedSettings> {
        Ok(self.lock()?.shared.clone().unwrap_or_default())
    }

    async fn save_shared(&self, settings: &SharedSettings) -> Result<()> {
        let mut state = self.lock()?;
        if state.fail_shared_saves {
            return Err(injected_failure(SettingsTier::Shared));
        }
        state.shared = Some(settings.clone());
        state.shared_saves += 1;
        Ok(())
    }

    async fn load_device(&self, device_id: &str) -> Result<DeviceSetting> {
        Ok(self
            .lock()?
            .devices
            .entry(device_id.to_string())
            .or_insert_with(|| DeviceSetting::new(device_id, default_device_name()))
            .clone())
    }

    async fn save_device(&self, device: &DeviceSetting) -> Result<()> {
        let mut state = self.lock()?;
        if state.fail_device_saves {
            return Err(injected_failure(SettingsTier::Device));
        }
        state
            .devices
            .insert(device.device_id.clone(), device.clone());
        state.device_saves += 1;
        Ok(())
    }
}
