use crate::{banks::Banks, cart::BoardDescriptor};

use super::Board;

// Mapper 66
// https://www.nesdev.org/wiki/GxROM
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GxRom;

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for GxRom {
  fn configure(desc: &BoardDescriptor, _: &mut Banks) -> Option<Box<Self>> {
    let fits = desc.matches(&["MAPPER066", "NES-GNROM", "NES-MHROM", "BANDAI-GNROM"])
      && desc.prg_size >= 32*1024
      && desc.prg_size <= 128*1024
      && desc.chr_real_size() <= 32*1024;

    fits.then(|| Box::new(Self))
  }

  fn name(&self) -> &'static str { "GxROM" }

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8) {
    if addr < 0x8000 { return; }

    banks.chr.set_page(0, val as usize & 0b0000_0011);
    banks.prg.set_page(0, (val as usize & 0b0011_0000) >> 4);
  }
}
