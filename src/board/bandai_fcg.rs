use log::debug;

use crate::{banks::{Banking, Banks}, cart::BoardDescriptor, vram::Mirroring};

use super::{set_byte_hi, set_byte_lo, Board, Counter, IrqAck, IrqClock, PrgTarget};

// Mapper 16
// https://www.nesdev.org/wiki/INES_Mapper_016
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandaiFCG {
  submapper: u8,
  irq: IrqClock,
}

impl BandaiFCG {
  // FCG-1/2 decode $6000-$7FFF, LZ93D50 decodes $8000-$FFFF, iNes 16 without submapper both
  fn decodes(&self, addr: usize) -> bool {
    match self.submapper {
      4 => (0x6000..=0x7FFF).contains(&addr),
      5 => addr >= 0x8000,
      _ => addr >= 0x6000,
    }
  }
}

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for BandaiFCG {
  fn configure(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<Self>> {
    let fits = desc.matches(&["MAPPER016", "BANDAI-FCG-1", "BANDAI-FCG-2", "BANDAI-LZ93D50"])
      && desc.prg_size >= 32*1024
      && desc.prg_size <= 256*1024
      && desc.chr_real_size() <= 256*1024;
    if !fits { return None; }

    banks.prg = Banking::new_prg(desc, 2);
    banks.prg.set_page_to_last_bank(1);
    banks.chr = Banking::new_chr(desc, 8);

    let submapper = match desc.board.as_str() {
      "BANDAI-FCG-1" | "BANDAI-FCG-2" => 4,
      "BANDAI-LZ93D50" => 5,
      _ => desc.submapper,
    };

    Some(Box::new(Self {
      submapper,
      irq: IrqClock::new(Counter::Down16Zero, IrqAck::RegisterWrite),
    }))
  }

  fn name(&self) -> &'static str { "Bandai FCG" }

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8) {
    if !self.decodes(addr) { return; }

    match addr & 0x000F {
      0x0..=0x7 => banks.chr.set_page(addr & 0x07, val as usize),
      0x8 => banks.prg.set_page(0, val as usize & 0b1111),
      0x9 => banks.set_mirroring(match val & 0b11 {
        0 => Mirroring::Vertical,
        1 => Mirroring::Horizontal,
        2 => Mirroring::SingleScreenA,
        _ => Mirroring::SingleScreenB,
      }),
      0xA => {
        self.irq.enabled = val & 1 != 0;
        self.irq.clear();
        // the LZ93D50 copies its latch into the counter, the FCG has no latch
        if self.submapper != 4 && addr >= 0x8000 {
          self.irq.count = self.irq.latch;
        }
      }
      // the FCG writes the counter directly
      0xB if self.submapper == 4 || addr < 0x8000 => self.irq.count = set_byte_lo(self.irq.count, val),
      0xC if self.submapper == 4 || addr < 0x8000 => self.irq.count = set_byte_hi(self.irq.count, val),
      0xB => self.irq.latch = set_byte_lo(self.irq.latch, val),
      0xC => self.irq.latch = set_byte_hi(self.irq.latch, val),
      // TODO: serial EEPROM on $800D for the 24C02 boards
      0xD => debug!("Bandai EEPROM write {val:02X} ignored"),
      _ => {}
    }
  }

  fn map_prg_addr(&self, banks: &Banks, addr: usize) -> PrgTarget {
    match addr {
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
