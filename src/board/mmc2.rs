use crate::{banks::{Banking, Banks}, cart::BoardDescriptor, vram::Mirroring};

use super::Board;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Clone, Copy, PartialEq)]
enum Latch { FD, #[default] FE }

// Mapper 9
// https://www.nesdev.org/wiki/MMC2
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MMC2 {
  chr_selects0: [u8; 2],
  chr_selects1: [u8; 2],
  latches: [Latch; 2],
}

impl MMC2 {
  fn update_chr_banks(&self, banks: &mut Banks) {
    banks.chr.set_page(0, self.chr_selects0[self.latches[0] as usize] as usize);
    banks.chr.set_page(1, self.chr_selects1[self.latches[1] as usize] as usize);
  }
}

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for MMC2 {
  fn configure(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<Self>> {
    let fits = desc.matches(&["MAPPER009", "NES-PNROM", "NES-PEEOROM", "HVC-PNROM"])
      && desc.prg_size == 128*1024
      && desc.chr_real_size() <= 128*1024;
    if !fits { return None; }

    banks.prg = Banking::new_prg(desc, 4);
    let last = banks.prg.last_bank();
    banks.prg.set_page(1, last-2);
    banks.prg.set_page(2, last-1);
    banks.prg.set_page(3, last);

    banks.chr = Banking::new_chr(desc, 2);

    Some(Box::new(Self {
      chr_selects0: [0; 2],
      chr_selects1: [0; 2],
      latches: [Latch::FE; 2],
    }))
  }

  fn name(&self) -> &'static str { "MMC2" }

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8) {
    let val = val & 0b1_1111;

    match addr {
      0xA000..=0xAFFF => banks.prg.set_page(0, val as usize & 0b1111),
      0xB000..=0xBFFF => self.chr_selects0[Latch::FD as usize] = val,
      0xC000..=0xCFFF => self.chr_selects0[Latch::FE as usize] = val,
      0xD000..=0xDFFF => self.chr_selects1[Latch::FD as usize] = val,
      0xE000..=0xEFFF => self.chr_selects1[Latch::FE as usize] = val,
      0xF000..=0xFFFF => banks.set_mirroring(match val & 1 {
        0 => Mirroring::Vertical,
        _ => Mirroring::Horizontal,
      }),
      _ => return,
    }

    self.update_chr_banks(banks);
  }

  // The latches flip after the tile fetch that hit them
  fn notify_chr_read(&mut self, banks: &mut Banks, addr: usize) {
    let (latch, val) = match addr {
      0x0FD8 => (0, Latch::FD),
      0x0FE8 => (0, Latch::FE),
      0x1FD8..=0x1FDF => (1, Latch::FD),
      0x1FE8..=0x1FEF => (1, Latch::FE),
      _ => return,
    };

    self.latches[latch] = val;
    self.update_chr_banks(banks);
  }
}
