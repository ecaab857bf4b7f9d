use crate::{banks::Banks, cart::BoardDescriptor, vram::Mirroring};

use super::Board;

// Mapper 7
// https://www.nesdev.org/wiki/AxROM
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxRom;

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for AxRom {
  fn configure(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<Self>> {
    let fits = desc.matches(&["MAPPER007", "NES-ANROM", "NES-AN1ROM", "NES-AMROM", "NES-AOROM"])
      && desc.prg_size >= 32*1024
      && desc.prg_size <= 512*1024
      && desc.chr_real_size() == 0x2000;
    if !fits { return None; }

    banks.set_mirroring(Mirroring::SingleScreenA);
    Some(Box::new(Self))
  }

  fn name(&self) -> &'static str { "AxROM" }

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8) {
    if addr < 0x8000 { return; }

    banks.prg.set_page(0, val as usize & 0b1111);
    banks.set_mirroring(match val & 0b0001_0000 != 0 {
      false => Mirroring::SingleScreenA,
      true  => Mirroring::SingleScreenB,
    });
  }
}
