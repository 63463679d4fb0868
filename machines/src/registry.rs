//! Machine registry for automatic front-end discovery.
//!
//! Each front-end-capable machine self-registers via [`inventory::submit!`]
//! with a [`MachineEntry`] containing its CLI name and a factory function.
//! The front-end discovers available machines at runtime without any
//! central list.

use vermilion_core::core::machine::Machine;

use crate::rom_loader::RomImage;

/// Build-time options a machine factory may honor.
pub struct MachineOptions {
    /// Number of 8 KiB banked-RAM banks to populate.
    pub num_ram_banks: usize,
    /// Skip the expensive render path on most frames.
    pub warp: bool,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            num_ram_banks: crate::x16::DEFAULT_RAM_BANKS,
            warp: false,
        }
    }
}

/// Describes a front-end-capable machine.
pub struct MachineEntry {
    /// CLI name used to select this machine (e.g., "x16").
    pub name: &'static str,
    /// Factory: construct a Machine from a loaded ROM image.
    pub create: fn(RomImage, &MachineOptions) -> Box<dyn Machine>,
}

impl MachineEntry {
    pub const fn new(
        name: &'static str,
        create: fn(RomImage, &MachineOptions) -> Box<dyn Machine>,
    ) -> Self {
        Self { name, create }
    }
}

inventory::collect!(MachineEntry);

/// Return all registered front-end-capable machines, sorted by name.
pub fn all() -> Vec<&'static MachineEntry> {
    let mut entries: Vec<_> = inventory::iter::<MachineEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

/// Look up a machine by its CLI name.
pub fn find(name: &str) -> Option<&'static MachineEntry> {
    inventory::iter::<MachineEntry>
        .into_iter()
        .find(|e| e.name == name)
}
