// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform-specific block-device discovery (spec.md §2 item 9 "Abstract
//! backends", §4.5.1). Ground: `aws.py::_find_blockdev_by_vid_linux`,
//! byte-for-byte semantics.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockDeviceError {
    #[error("block device discovery is unsupported on this platform")]
    Unsupported,
    #[error("failed reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Finds the guest device path for a volume id by its cloud-reported
/// serial number.
pub trait BlockDeviceFinder: Send + Sync {
    /// Returns `Ok(None)` if no matching device has appeared yet.
    fn find_by_volume_id(&self, volume_id: &str) -> Result<Option<String>, BlockDeviceError>;
}

/// Linux/Nitro implementation: strip dashes from `volume_id`, glob
/// `/sys/block/*/device/serial`, and return `/dev/<name>` for the first
/// match (spec.md §4.5.1).
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxBlockDeviceFinder;

impl BlockDeviceFinder for LinuxBlockDeviceFinder {
    #[cfg(target_os = "linux")]
    fn find_by_volume_id(&self, volume_id: &str) -> Result<Option<String>, BlockDeviceError> {
        let stripped = volume_id.replace('-', "");
        for entry in glob::glob("/sys/block/*/device/serial")
            .map_err(|_| BlockDeviceError::Unsupported)?
            .flatten()
        {
            let serial = match std::fs::read_to_string(&entry) {
                Ok(s) => s,
                Err(_) => continue,
            };
            if serial.trim() == stripped {
                let name = entry
                    .parent()
                    .and_then(|p| p.parent())
                    .and_then(|p| p.file_name())
                    .and_then(|n| n.to_str())
                    .unwrap_or_default();
                return Ok(Some(format!("/dev/{name}")));
            }
        }
        Ok(None)
    }

    #[cfg(not(target_os = "linux"))]
    fn find_by_volume_id(&self, _volume_id: &str) -> Result<Option<String>, BlockDeviceError> {
        Err(BlockDeviceError::Unsupported)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! Scripted [`BlockDeviceFinder`] test double.
    #![cfg_attr(coverage_nightly, coverage(off))]

    use super::{BlockDeviceError, BlockDeviceFinder};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct FakeBlockDeviceFinder {
        devices: Mutex<HashMap<String, String>>,
    }

    impl FakeBlockDeviceFinder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set(&self, volume_id: impl Into<String>, device: impl Into<String>) {
            self.devices.lock().insert(volume_id.into(), device.into());
        }
    }

    impl BlockDeviceFinder for FakeBlockDeviceFinder {
        fn find_by_volume_id(&self, volume_id: &str) -> Result<Option<String>, BlockDeviceError> {
            Ok(self.devices.lock().get(volume_id).cloned())
        }
    }

    #[cfg(test)]
    #[path = "blockdev_fake_tests.rs"]
    mod tests;
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeBlockDeviceFinder;
