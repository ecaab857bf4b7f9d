use bitfield_struct::bitfield;

use crate::{banks::{Banking, Banks}, cart::BoardDescriptor, vram::Mirroring};

use super::{Board, Counter, IrqAck, IrqClock, IrqCtrl, IrqMode, PrgTarget};

#[bitfield(u16, order = Lsb)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct ChrSelect {
  #[bits(4)]
  lo: u8,
  #[bits(5)]
  hi: u8,
  #[bits(7)]
  __: u8,
}

// Mappers 21, 22, 23, 25
// https://www.nesdev.org/wiki/VRC2_and_VRC4
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VRC2_4 {
  mapper: u16,
  prg_select0: u8,
  chr_selects: [ChrSelect; 8],
  swap_mode: bool,
  // VRC2 boards without work ram have a one bit latch at $6000
  latch: Option<bool>,
  irq: Option<IrqClock>,
}

impl VRC2_4 {
  // iNes compatibility, folds every board wiring of A0/A1 onto $x000-$x003
  // https://github.com/SourMesen/Mesen2/blob/master/Core/NES/Mappers/Konami/VRC2_4.h
  fn translate_addr(&self, addr: usize) -> usize {
    let (a0, a1) = match self.mapper {
      // VRC4a/VRC4c
      21 => (
        ((addr >> 1) & 1) | ((addr >> 6) & 1),
        ((addr >> 2) & 1) | ((addr >> 7) & 1),
      ),
      // VRC2a
      22 => ((addr >> 1) & 1, addr & 1),
      // VRC2b/VRC4e/VRC4f
      23 => (
        (addr & 1) | ((addr >> 2) & 1),
        ((addr >> 1) & 1) | ((addr >> 3) & 1),
      ),
      // VRC2c/VRC4b/VRC4d
      _ => (
        ((addr >> 1) & 1) | ((addr >> 3) & 1),
        (addr & 1) | ((addr >> 2) & 1),
      ),
    };

    (addr & 0xFF00 | (a1 << 1) | a0) & 0xF00F
  }

  fn update_prg_banks(&self, banks: &mut Banks) {
    let second_last = banks.prg.banks_count().saturating_sub(2);
    let (fixed, swapped) = if self.swap_mode { (0, 2) } else { (2, 0) };
    banks.prg.set_page(swapped, self.prg_select0 as usize);
    banks.prg.set_page(fixed, second_last);
  }

  fn update_chr_bank(&self, banks: &mut Banks, page: usize) {
    let bank = self.chr_selects[page].into_bits() as usize;
    // VRC2a ignores the low bit of the bank select
    let bank = if self.mapper == 22 { bank >> 1 } else { bank };
    banks.chr.set_page(page, bank);
  }
}

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for VRC2_4 {
  fn configure(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<Self>> {
    let mapper = match desc.board.as_str() {
      "KONAMI-VRC-4" | "KONAMI-VRC-2" => 23,
      _ => desc.mapper().filter(|m| [21, 22, 23, 25].contains(m))?,
    };
    let fits = desc.prg_size >= 32*1024
      && desc.prg_size <= 256*1024
      && desc.chr_real_size() <= 512*1024;
    if !fits { return None; }

    banks.prg = Banking::new_prg(desc, 4);
    banks.prg.set_page_to_last_bank(3);
    banks.chr = Banking::new_chr(desc, 8);

    // the VRC2 has no irq counter
    let irq = (mapper != 22).then(|| IrqClock::new(Counter::Up8, IrqAck::RegisterWrite));
    let latch = (mapper == 22 || desc.wram_size == 0).then_some(false);

    let board = Self {
      mapper,
      prg_select0: 0,
      chr_selects: [ChrSelect::new(); 8],
      swap_mode: false,
      latch,
      irq,
    };
    board.update_prg_banks(banks);

    Some(Box::new(board))
  }

  fn name(&self) -> &'static str { "VRC2/VRC4" }

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8) {
    if addr < 0x8000 {
      if let (Some(latch), 0x6000..=0x7FFF) = (&mut self.latch, addr) {
        *latch = val & 1 != 0;
      }
      return;
    }

    match self.translate_addr(addr) {
      0x8000..=0x8003 => {
        self.prg_select0 = val & 0b1_1111;
        self.update_prg_banks(banks);
      }
      0x9002 if self.irq.is_some() => {
        self.swap_mode = val & 0b10 != 0;
        self.update_prg_banks(banks);
      }
      0x9000..=0x9003 => banks.set_mirroring(match val & 0b11 {
        0 => Mirroring::Vertical,
        1 => Mirroring::Horizontal,
        2 => Mirroring::SingleScreenA,
        _ => Mirroring::SingleScreenB,
      }),
      0xA000..=0xA003 => banks.prg.set_page(1, val as usize & 0b1_1111),
      addr @ 0xB000..=0xE003 => {
        // two registers per page, low nibble then high bits
        let page = ((addr - 0xB000) >> 12) * 2 + ((addr >> 1) & 1);
        let select = &mut self.chr_selects[page];
        if addr & 1 == 0 {
          select.set_lo(val & 0b1111);
        } else {
          select.set_hi(val & 0b1_1111);
        }
        self.update_chr_bank(banks, page);
      }
      addr @ 0xF000..=0xF003 => if let Some(irq) = &mut self.irq {
        match addr {
          0xF000 => irq.latch = (irq.latch & 0xF0) | (val as u16 & 0b1111),
          0xF001 => irq.latch = (irq.latch & 0x0F) | ((val as u16 & 0b1111) << 4),
          0xF002 => {
            let ctrl = irq.write_ctrl(val);
            irq.mode = if ctrl.contains(IrqCtrl::MODE) { IrqMode::Cycle } else { IrqMode::Scanline };
          }
          _ => irq.write_ack(),
        }
      }
      _ => {}
    }
  }

  fn map_prg_addr(&self, banks: &Banks, addr: usize) -> PrgTarget {
    match addr {
      0x6000..=0x7FFF if self.latch.is_some() => PrgTarget::Cart,
      0x6000..=0x7FFF if !banks.wram.is_empty() => PrgTarget::Wram(banks.wram.translate(addr)),
      0x8000..=0xFFFF => PrgTarget::Prg(banks.prg.translate(addr)),
      _ => PrgTarget::OpenBus,
    }
  }

  fn cart_read(&self, _addr: usize) -> u8 {
    self.latch.unwrap_or_default() as u8
  }

  fn clock(&mut self) {
    if let Some(irq) = &mut self.irq {
      irq.clock();
    }
  }

  fn irq(&self) -> Option<&IrqClock> { self.irq.as_ref() }
  fn irq_mut(&mut self) -> Option<&mut IrqClock> { self.irq.as_mut() }
}
