use crate::{banks::{Banking, Banks}, cart::BoardDescriptor, vram::Mirroring};

use super::{set_byte_hi, set_byte_lo, Board, Counter, IrqAck, IrqClock, PrgTarget};

// Mapper 69
// https://www.nesdev.org/wiki/Sunsoft_FME-7
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SunsoftFME7 {
  // decoded on every parameter write
  command: u8,
  wram_banked: bool,
  wram_enabled: bool,
  irq: IrqClock,
}

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for SunsoftFME7 {
  fn configure(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<Self>> {
    let fits = desc.matches(&["MAPPER069", "SUNSOFT-FME-7", "SUNSOFT-5A", "SUNSOFT-5B"])
      && desc.prg_size >= 32*1024
      && desc.prg_size <= 512*1024
      && desc.chr_real_size() <= 256*1024;
    if !fits { return None; }

    // page 0 is the $6000 window, either rom or wram
    banks.prg = Banking::new(desc.prg_size, 0x6000, 8*1024, 5);
    banks.prg.set_page_to_last_bank(4);
    banks.chr = Banking::new_chr(desc, 8);

    let mut irq = IrqClock::new(Counter::Down16, IrqAck::RegisterWrite);
    irq.output = false;

    Some(Box::new(Self {
      command: 0,
      wram_banked: false,
      wram_enabled: false,
      irq,
    }))
  }

  fn name(&self) -> &'static str { "Sunsoft FME-7" }

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8) {
    match addr {
      0x8000..=0x9FFF => self.command = val & 0b1111,
      0xA000..=0xBFFF => match self.command & 0b1111 {
        page @ 0x0..=0x7 => banks.chr.set_page(page as usize, val as usize),
        0x8 => {
          self.wram_banked = (val >> 6) & 1 != 0;
          self.wram_enabled = val >> 7 != 0;

          let bank = val as usize & 0b11_1111;
          if self.wram_banked {
            banks.wram.set_page(0, bank);
          } else {
            banks.prg.set_page(0, bank);
          }
        }
        // the first page is the $6000 window, hence the + 1
        cmd @ 0x9..=0xB => banks.prg.set_page(cmd as usize - 0x9 + 1, val as usize & 0b11_1111),
        0xC => banks.set_mirroring(match val & 0b11 {
          0 => Mirroring::Vertical,
          1 => Mirroring::Horizontal,
          2 => Mirroring::SingleScreenA,
          _ => Mirroring::SingleScreenB,
        }),
        0xD => {
          self.irq.output = val & 1 != 0;
          self.irq.enabled = val >> 7 != 0;
          self.irq.clear();
        }
        0xE => self.irq.count = set_byte_lo(self.irq.count, val),
        _ => self.irq.count = set_byte_hi(self.irq.count, val),
      }
      _ => {}
    }
  }

  fn map_prg_addr(&self, banks: &Banks, addr: usize) -> PrgTarget {
    match addr {
      0x6000..=0x7FFF if !self.wram_banked => PrgTarget::Prg(banks.prg.translate(addr)),
      0x6000..=0x7FFF if self.wram_enabled && !banks.wram.is_empty() => PrgTarget::Wram(banks.wram.translate(addr)),
      0x6000..=0x7FFF => PrgTarget::OpenBus,
      0x8000..=0xFFFF => PrgTarget::Prg(banks.prg.translate(addr)),
      _ => PrgTarget::OpenBus,
    }
  }

  fn clock(&mut self) {
    self.irq.clock();
  }

  fn irq(&self) -> Option<&IrqClock> { Some(&self.irq) }
  fn irq_mut(&mut self) -> Option<&mut IrqClock> { Some(&mut self.irq) }
}

#[cfg(test)]
mod fme7_tests {
  use super::*;

  #[test]
  fn stale_command_byte_decodes_in_range() {
    let desc = BoardDescriptor::for_mapper(69, 256*1024, 256*1024);
    let mut banks = Banks::new(&desc);
    let mut board = SunsoftFME7::configure(&desc, &mut banks).unwrap();

    // high bits can only come from a restored state
    board.command = 0xF9;
    board.prg_write(&mut banks, 0xA000, 5);
    assert_eq!(banks.prg.bank(1), 5);

    board.command = 0x17;
    board.prg_write(&mut banks, 0xA000, 3);
    assert_eq!(banks.chr.bank(7), 3);
  }
}
