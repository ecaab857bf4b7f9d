use crate::{banks::{Banking, Banks}, cart::BoardDescriptor};

use super::Board;

// Mapper 3
// https://www.nesdev.org/wiki/INES_Mapper_003
// https://www.nesdev.org/wiki/CNROM
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CNRom;

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for CNRom {
  fn configure(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<Self>> {
    let fits = desc.matches(&["MAPPER003", "NES-CNROM", "HVC-CNROM"])
      && matches!(desc.prg_size, 0x4000 | 0x8000)
      && desc.chr_real_size() <= 2048*1024;
    if !fits { return None; }

    banks.chr = Banking::new_chr(desc, 1);
    Some(Box::new(Self))
  }

  fn name(&self) -> &'static str { "CNROM" }

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8) {
    if addr >= 0x8000 {
      banks.chr.set_page(0, val as usize);
    }
  }
}
