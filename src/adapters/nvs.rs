//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] for the persisted pin-mode table and the
//! controller configuration.
//!
//! - On ESP32 every write is followed by `nvs_commit()`, which is atomic.
//! - The simulation backend is an in-memory map keyed by
//!   `namespace::key`; contents vanish with the process.
//! - NVS limits namespaces and keys to 15 bytes.  Longer names are
//!   rejected rather than truncated so two keys can never alias.

use crate::app::ports::{StorageError, StoragePort};
use log::info;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::warn;

/// Longest NVS namespace or key name, excluding the NUL terminator.
const NVS_NAME_MAX: usize = 15;

pub struct NvsStore {
    #[cfg(not(target_os = "espidf"))]
    store: HashMap<String, Vec<u8>>,
}

impl NvsStore {
    /// Initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the partition is erased
    /// and re-initialised.  Returns `Err(StorageError::IoError)` if that
    /// also fails.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as esp_err_t {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as esp_err_t {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK as esp_err_t {
                return Err(StorageError::IoError);
            }
            info!("NvsStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsStore: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: HashMap::new(),
        })
    }

    /// NUL-terminated copy of an NVS name.
    fn c_name(name: &str) -> Result<[u8; NVS_NAME_MAX + 1], StorageError> {
        let bytes = name.as_bytes();
        if bytes.is_empty() || bytes.len() > NVS_NAME_MAX || bytes.contains(&0) {
            return Err(StorageError::NotFound);
        }
        let mut buf = [0u8; NVS_NAME_MAX + 1];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(buf)
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> Result<String, StorageError> {
        Self::c_name(namespace)?;
        Self::c_name(key)?;
        Ok(format!("{}::{}", namespace, key))
    }

    /// Open a namespace, run `f` with the handle, then close it.
    #[cfg(target_os = "espidf")]
    fn with_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, esp_err_t>,
    {
        let ns = Self::c_name(namespace)?;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let mut handle: nvs_handle_t = 0;
        // SAFETY: `ns` is NUL-terminated; `handle` is a valid out-pointer.
        let ret = unsafe { nvs_open(ns.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK as esp_err_t {
            return Err(Self::map_err(ret));
        }

        let result = f(handle);
        // SAFETY: `handle` was opened above and is not used afterwards.
        unsafe {
            nvs_close(handle);
        }
        result.map_err(Self::map_err)
    }

    #[cfg(target_os = "espidf")]
    fn map_err(ret: esp_err_t) -> StorageError {
        if ret == ESP_ERR_NVS_NOT_FOUND as esp_err_t {
            StorageError::NotFound
        } else if ret == ESP_ERR_NVS_NOT_ENOUGH_SPACE as esp_err_t {
            StorageError::Full
        } else if ret == ESP_ERR_NVS_INVALID_LENGTH as esp_err_t {
            StorageError::Corrupted
        } else {
            warn!("NvsStore: NVS error {}", ret);
            StorageError::IoError
        }
    }
}

impl StoragePort for NvsStore {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key)?;
            let data = self.store.get(&composite).ok_or(StorageError::NotFound)?;
            // NVS refuses to read a blob into a short buffer.
            if data.len() > buf.len() {
                return Err(StorageError::Corrupted);
            }
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }

        #[cfg(target_os = "espidf")]
        {
            let k = Self::c_name(key)?;
            Self::with_handle(namespace, false, |handle| {
                let mut size = buf.len();
                // SAFETY: `buf` is valid for `size` bytes; `k` is NUL-terminated.
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        k.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                Ok(size)
            })
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key)?;
            self.store.insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let k = Self::c_name(key)?;
            Self::with_handle(namespace, true, |handle| {
                // SAFETY: `data` is valid for `data.len()` bytes.
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        k.as_ptr() as *const _,
                        data.as_ptr() as *const _,
                        data.len(),
                    )
                };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                Ok(())
            })?;
            info!("NvsStore: wrote {}::{} ({} bytes)", namespace, key, data.len());
            Ok(())
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key)?;
            self.store.remove(&composite);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let k = Self::c_name(key)?;
            Self::with_handle(namespace, true, |handle| {
                let ret = unsafe { nvs_erase_key(handle, k.as_ptr() as *const _) };
                if ret != ESP_OK as esp_err_t && ret != ESP_ERR_NVS_NOT_FOUND as esp_err_t {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                Ok(())
            })
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            Self::composite_key(namespace, key)
                .map(|composite| self.store.contains_key(&composite))
                .unwrap_or(false)
        }

        #[cfg(target_os = "espidf")]
        {
            let Ok(k) = Self::c_name(key) else {
                return false;
            };
            Self::with_handle(namespace, false, |handle| {
                let ret =
                    unsafe { nvs_find_key(handle, k.as_ptr() as *const _, core::ptr::null_mut()) };
                Ok(ret == ESP_OK as esp_err_t)
            })
            .unwrap_or(false)
        }
    }
}
