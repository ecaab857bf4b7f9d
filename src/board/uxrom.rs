use crate::{banks::{Banking, Banks}, cart::BoardDescriptor};

use super::Board;

// Mapper 2
// https://www.nesdev.org/wiki/UxROM
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UxRom;

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for UxRom {
  fn configure(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<Self>> {
    let fits = desc.matches(&["MAPPER002", "NES-UNROM", "NES-UOROM", "HVC-UNROM", "HVC-UN1ROM"])
      && desc.prg_size >= 32*1024
      && desc.prg_size <= 4*1024*1024
      && desc.chr_real_size() == 0x2000;
    if !fits { return None; }

    banks.prg = Banking::new_prg(desc, 2);
    banks.prg.set_page_to_last_bank(1);

    Some(Box::new(Self))
  }

  fn name(&self) -> &'static str { "UxROM" }

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8) {
    if addr >= 0x8000 {
      banks.prg.set_page(0, val as usize);
    }
  }
}
