use crate::{banks::{Banking, Banks}, cart::BoardDescriptor};

use super::{Board, Counter, IrqAck, IrqClock, IrqCtrl};

// Mapper 73
// https://www.nesdev.org/wiki/VRC3
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VRC3 {
  irq: IrqClock,
}

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for VRC3 {
  fn configure(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<Self>> {
    let fits = desc.matches(&["MAPPER073", "KONAMI-VRC-3"])
      && desc.prg_size >= 32*1024
      && desc.prg_size <= 128*1024
      && desc.chr_real_size() == 8*1024;
    if !fits { return None; }

    banks.prg = Banking::new_prg(desc, 2);
    banks.prg.set_page_to_last_bank(1);

    Some(Box::new(Self {
      irq: IrqClock::new(Counter::Up16, IrqAck::RegisterWrite),
    }))
  }

  fn name(&self) -> &'static str { "VRC3" }

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8) {
    let nibble = val as u16 & 0b1111;
    match addr {
      0x8000..=0x8FFF => self.irq.latch = (self.irq.latch & 0xFFF0) | nibble,
      0x9000..=0x9FFF => self.irq.latch = (self.irq.latch & 0xFF0F) | (nibble << 4),
      0xA000..=0xAFFF => self.irq.latch = (self.irq.latch & 0xF0FF) | (nibble << 8),
      0xB000..=0xBFFF => self.irq.latch = (self.irq.latch & 0x0FFF) | (nibble << 12),
      0xC000..=0xCFFF => {
        let ctrl = self.irq.write_ctrl(val);
        self.irq.counter = if ctrl.contains(IrqCtrl::MODE) { Counter::Up8Low } else { Counter::Up16 };
      }
      0xD000..=0xDFFF => self.irq.write_ack(),
      0xF000..=0xFFFF => banks.prg.set_page(0, val as usize & 0b111),
      _ => {}
    }
  }

  fn clock(&mut self) {
    self.irq.clock();
  }

  fn irq(&self) -> Option<&IrqClock> { Some(&self.irq) }
  fn irq_mut(&mut self) -> Option<&mut IrqClock> { Some(&mut self.irq) }
}
