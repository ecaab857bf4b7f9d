use crate::{banks::Banks, cart::BoardDescriptor};

use super::Board;

// Mapper 0
// https://www.nesdev.org/wiki/NROM
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NRom;

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for NRom {
  fn configure(desc: &BoardDescriptor, _: &mut Banks) -> Option<Box<Self>> {
    let fits = desc.matches(&["MAPPER000", "NES-NROM-128", "NES-NROM-256", "HVC-NROM-128", "HVC-NROM-256"])
      && matches!(desc.prg_size, 0x4000 | 0x8000)
      && desc.chr_real_size() == 0x2000;

    // a 16 KiB image is mirrored into both halves by the single 32 KiB page
    fits.then(|| Box::new(Self))
  }

  fn name(&self) -> &'static str { "NROM" }

  fn prg_write(&mut self, _: &mut Banks, _: usize, _: u8) {}
}
