use log::debug;
use bitfield_struct::bitfield;

use crate::{banks::{Banking, Banks}, cart::BoardDescriptor, vram::Mirroring};

use super::{Board, Counter, IrqAck, IrqClock, PrgTarget};

#[bitfield(u8, order = Lsb)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, Eq)]
struct BankSelect {
  #[bits(3)]
  reg: u8,
  #[bits(3)]
  __: u8,
  prg_fix_first: bool,
  chr_inverted: bool,
}

// Mapper 04
// https://www.nesdev.org/wiki/MMC3
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MMC3 {
  select: BankSelect,
  regs: [u8; 8],
  hardwired_mirroring: bool,

  wram_read_enabled: bool,
  wram_write_enabled: bool,

  irq_reload: bool,
  irq: IrqClock,
}

impl MMC3 {
  fn update_banks(&self, banks: &mut Banks) {
    let second_last = banks.prg.banks_count().saturating_sub(2);
    let (r6, r7) = (self.regs[6] as usize, self.regs[7] as usize);

    if self.select.prg_fix_first() {
      banks.prg.set_page(0, second_last);
      banks.prg.set_page(2, r6);
    } else {
      banks.prg.set_page(0, r6);
      banks.prg.set_page(2, second_last);
    }
    banks.prg.set_page(1, r7);
    banks.prg.set_page_to_last_bank(3);

    // 2 KiB banks go to one pattern table, 1 KiB banks to the other
    let (big, small) = if self.select.chr_inverted() { (4, 0) } else { (0, 4) };
    let (r0, r1) = (self.regs[0] as usize & !1, self.regs[1] as usize & !1);
    banks.chr.set_page(big, r0);
    banks.chr.set_page(big + 1, r0 | 1);
    banks.chr.set_page(big + 2, r1);
    banks.chr.set_page(big + 3, r1 | 1);
    for i in 0..4 {
      banks.chr.set_page(small + i, self.regs[2 + i] as usize);
    }
  }
}

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for MMC3 {
  fn configure(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<Self>> {
    let fits = desc.matches(&[
      "MAPPER004", "NES-TBROM", "NES-TEROM", "NES-TFROM", "NES-TGROM", "NES-TKROM",
      "NES-TLROM", "NES-TL1ROM", "NES-TL2ROM", "NES-TNROM", "NES-TR1ROM", "NES-TSROM", "NES-TVROM",
      "HVC-TLROM", "HVC-TKROM",
    ])
      && desc.prg_size >= 32*1024
      && desc.prg_size <= 512*1024
      && desc.chr_real_size() <= 256*1024;
    if !fits { return None; }

    banks.prg = Banking::new_prg(desc, 4);
    banks.chr = Banking::new_chr(desc, 8);

    let mapper = Self {
      select: BankSelect::new(),
      regs: [0, 2, 4, 5, 6, 7, 0, 1],
      hardwired_mirroring: desc.mirroring == Mirroring::FourScreen,
      wram_read_enabled: true,
      wram_write_enabled: true,
      irq_reload: false,
      // counted by notify_scanline, never clocked
      irq: IrqClock::new(Counter::Down16, IrqAck::RegisterWrite),
    };
    mapper.update_banks(banks);

    Some(Box::new(mapper))
  }

  fn name(&self) -> &'static str { "MMC3" }

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8) {
    let addr_even = addr % 2 == 0;
    match (addr, addr_even) {
      (0x8000..=0x9FFF, true) => {
        self.select = BankSelect::from_bits(val);
        self.update_banks(banks);
      }
      (0x8000..=0x9FFF, false) => {
        self.regs[self.select.reg() as usize] = val;
        self.update_banks(banks);
      }
      (0xA000..=0xBFFF, true) if self.hardwired_mirroring => debug!("MMC3 mirroring write on a four screen board"),
      (0xA000..=0xBFFF, true) => banks.set_mirroring(match val & 1 != 0 {
        false => Mirroring::Vertical,
        true  => Mirroring::Horizontal,
      }),
      (0xA000..=0xBFFF, false) => {
        self.wram_write_enabled = val & 0b0100_0000 == 0;
        self.wram_read_enabled  = val & 0b1000_0000 != 0;
      }
      (0xC000..=0xDFFF, true) => self.irq.latch = val as u16,
      (0xC000..=0xDFFF, false) => {
        self.irq.count = 0;
        self.irq_reload = true;
      }
      (0xE000..=0xFFFF, true) => {
        self.irq.enabled = false;
        self.irq.clear();
      }
      (0xE000..=0xFFFF, false) => self.irq.enabled = true,
      _ => {}
    }
  }

  fn map_prg_addr(&self, banks: &Banks, addr: usize) -> PrgTarget {
    match addr {
      0x6000..=0x7FFF if banks.wram.is_empty() || !self.wram_read_enabled => PrgTarget::OpenBus,
      0x6000..=0x7FFF if self.wram_write_enabled => PrgTarget::Wram(banks.wram.translate(addr)),
      0x6000..=0x7FFF => PrgTarget::WramReadOnly(banks.wram.translate(addr)),
      0x8000..=0xFFFF => PrgTarget::Prg(banks.prg.translate(addr)),
      _ => PrgTarget::OpenBus,
    }
  }

  // The counter is clocked by the rising edges of PPU A12, once per scanline while rendering
  fn notify_scanline(&mut self) {
    if self.irq.count == 0 || self.irq_reload {
      self.irq.count = self.irq.latch;
      self.irq_reload = false;
    } else {
      self.irq.count -= 1;
    }

    if self.irq.enabled && self.irq.count == 0 {
      self.irq.raise();
    }
  }

  fn irq(&self) -> Option<&IrqClock> { Some(&self.irq) }
  fn irq_mut(&mut self) -> Option<&mut IrqClock> { Some(&mut self.irq) }
}
