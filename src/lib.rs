//! Cartridge boards for a NES emulator core.
//!
//! A [`Cartridge`] is built from a [`BoardDescriptor`] and the ROM images, and
//! resolves every CPU access in $4020-$FFFF and every PPU access in
//! $0000-$3FFF through its board's banking registers.

pub mod banks;
pub mod board;
pub mod cart;
#[cfg(feature = "serde")]
pub mod savestate;
pub mod vram;

pub use cart::{BoardDescriptor, Cartridge, LoadError};
#[cfg(feature = "serde")]
pub use savestate::SnapshotError;
pub use vram::{Mirroring, VideoMem};
