use crate::{banks::{Banking, Banks}, cart::BoardDescriptor, vram::Mirroring};

use super::Board;

// Mapper 71
// https://www.nesdev.org/wiki/INES_Mapper_071
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Codemasters {
  // only the BF9097 (Fire Hawk) wires the one screen mirroring register
  mirroring_ctrl: bool,
}

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for Codemasters {
  fn configure(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<Self>> {
    let fits = desc.matches(&["MAPPER071", "CAMERICA-BF9093", "CAMERICA-BF9097", "CAMERICA-ALGN"])
      && desc.prg_size >= 64*1024
      && desc.prg_size <= 256*1024
      && desc.chr_real_size() == 0x2000;
    if !fits { return None; }

    banks.prg = Banking::new_prg(desc, 2);
    banks.prg.set_page_to_last_bank(1);

    let mirroring_ctrl = desc.board == "CAMERICA-BF9097" || desc.submapper == 1;
    Some(Box::new(Self { mirroring_ctrl }))
  }

  fn name(&self) -> &'static str { "Codemasters" }

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8) {
    match addr {
      0x8000..=0x9FFF if self.mirroring_ctrl => banks.set_mirroring(match (val >> 4) & 1 != 0 {
        false => Mirroring::SingleScreenA,
        true  => Mirroring::SingleScreenB,
      }),
      0xC000..=0xFFFF => banks.prg.set_page(0, val as usize & 0b1111),
      _ => {}
    }
  }
}
