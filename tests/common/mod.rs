//! Shared fixtures: in-process catalog and volume sources.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use vaultvol::error::FetchError;
use vaultvol::source::{CatalogSource, VolumeSource};
use vaultvol::{VaultRef, VaultVolumeSample, VolumeFigures};

pub fn vault(address: &str, tvl: f64, is_priority: bool) -> VaultRef {
    VaultRef {
        address: address.to_string(),
        name: format!("Vault {address}"),
        tvl,
        is_priority,
        is_closed: false,
    }
}

pub fn vaults(n: usize) -> Vec<VaultRef> {
    (0..n)
        .map(|i| vault(&format!("0x{i:02}"), 1_000.0 + i as f64, i % 3 == 0))
        .collect()
}

pub fn sample(day: f64) -> VaultVolumeSample {
    VaultVolumeSample {
        spot: VolumeFigures {
            day,
            week: day * 7.0,
            month: day * 30.0,
            all_time: day * 365.0,
        },
        perp: VolumeFigures {
            day: day / 2.0,
            week: day * 3.5,
            month: day * 15.0,
            all_time: day * 182.5,
        },
    }
}

/// How the fake answers for one address.
#[derive(Clone, Copy)]
pub enum Behaviour {
    Ok,
    /// Rate limited this many times, then succeeds.
    RateLimited(u32),
    Upstream,
    Panic,
}

/// Volume source answering from a per-address script; unscripted addresses succeed.
#[derive(Default)]
pub struct FakeVolumes {
    script: HashMap<String, Behaviour>,
    calls: Mutex<HashMap<String, u32>>,
    total_calls: AtomicUsize,
}

impl FakeVolumes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, b: Behaviour) -> Self {
        self.script.insert(address.to_string(), b);
        self
    }

    pub fn calls_for(&self, address: &str) -> u32 {
        self.calls
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

impl VolumeSource for FakeVolumes {
    fn fetch_volume(&self, address: &str) -> Result<VaultVolumeSample, FetchError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let c = calls.entry(address.to_string()).or_insert(0);
            *c += 1;
            *c
        };
        match self.script.get(address).copied().unwrap_or(Behaviour::Ok) {
            Behaviour::Ok => Ok(sample(call as f64)),
            Behaviour::RateLimited(k) if call <= k => {
                Err(FetchError::RateLimited("API returned status 429".into()))
            }
            Behaviour::RateLimited(_) => Ok(sample(1.0)),
            Behaviour::Upstream => Err(FetchError::Upstream("API returned status 500".into())),
            Behaviour::Panic => panic!("fake source blew up on {address}"),
        }
    }
}

/// Catalog returning a fixed list, or failing.
pub struct FakeCatalog(pub Option<Vec<VaultRef>>);

impl CatalogSource for FakeCatalog {
    fn fetch_vaults(&self) -> vaultvol::Result<Vec<VaultRef>> {
        self.0
            .clone()
            .ok_or_else(|| anyhow::anyhow!("catalog unavailable"))
    }
}
