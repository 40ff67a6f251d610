//! Picks the adapter a person would call "my internet connection" out of everything the OS
//! reports, skipping hypervisor, VPN and loopback adapters.
//!
//! Candidates pass through three tiers, each less strict than the last; within a tier the
//! highest nominal link speed wins. The last successful pick is remembered and returned
//! when no tier yields anything.

use crate::config::SelectorConfig;
use crate::sources::{InterfaceDescriptor, InterfaceKind, InterfaceSource};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Up, physical, carrying a routable IPv4 address
    Routable,
    /// Up, physical
    Up,
    /// Physical, any state
    Any,
}

impl Tier {
    const ALL: [Tier; 3] = [Tier::Routable, Tier::Up, Tier::Any];

    fn admits(self, d: &InterfaceDescriptor) -> bool {
        match self {
            Tier::Routable => d.is_up() && d.has_routable_ipv4(),
            Tier::Up => d.is_up(),
            Tier::Any => true,
        }
    }
}

pub struct AdapterSelector {
    deny_list: Vec<String>,
    cached: Option<InterfaceDescriptor>,
}

impl AdapterSelector {
    pub fn new(config: &SelectorConfig) -> Self {
        Self {
            deny_list: config.deny_list.iter().map(|s| s.to_lowercase()).collect(),
            cached: None,
        }
    }

    /// Last successful pick, possibly from an earlier cycle
    pub fn cached(&self) -> Option<&InterfaceDescriptor> {
        self.cached.as_ref()
    }

    /// Loopback-typed adapters, or any whose "name description" contains a deny-list entry
    pub fn is_virtual_or_unwanted(&self, d: &InterfaceDescriptor) -> bool {
        if d.kind == InterfaceKind::Loopback {
            return true;
        }
        let haystack = format!("{} {}", d.name, d.description).to_lowercase();
        self.deny_list.iter().any(|needle| haystack.contains(needle.as_str()))
    }

    fn is_physical(&self, d: &InterfaceDescriptor) -> bool {
        matches!(d.kind, InterfaceKind::Ethernet | InterfaceKind::Wireless)
            && !self.is_virtual_or_unwanted(d)
    }

    /// Enumerate and pick. An enumeration failure is treated like an empty snapshot.
    pub fn select(&mut self, source: &dyn InterfaceSource) -> Option<InterfaceDescriptor> {
        let snapshot = match source.snapshot() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "interface snapshot failed; keeping last selection");
                Vec::new()
            }
        };
        self.select_from(&snapshot)
    }

    pub fn select_from(
        &mut self,
        candidates: &[InterfaceDescriptor],
    ) -> Option<InterfaceDescriptor> {
        let physical: Vec<&InterfaceDescriptor> =
            candidates.iter().filter(|d| self.is_physical(d)).collect();

        for tier in Tier::ALL {
            if let Some(best) = fastest(physical.iter().copied().filter(|d| tier.admits(d))) {
                debug!(id = %best.id, ?tier, "adapter selected");
                self.cached = Some(best.clone());
                return Some(best.clone());
            }
        }
        debug!(cached = self.cached.is_some(), "no qualifying adapter");
        self.cached.clone()
    }
}

/// Highest speed first; on equal speed the earlier candidate is kept.
fn fastest<'a>(
    candidates: impl Iterator<Item = &'a InterfaceDescriptor>,
) -> Option<&'a InterfaceDescriptor> {
    candidates.fold(None, |best: Option<&InterfaceDescriptor>, d| match best {
        Some(b) if b.speed_bps.unwrap_or(0) >= d.speed_bps.unwrap_or(0) => Some(b),
        _ => Some(d),
    })
}
