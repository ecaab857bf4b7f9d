use crate::{banks::{Banking, Banks}, cart::BoardDescriptor, vram::Mirroring};

use super::{Board, PrgTarget};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Clone, Copy, PartialEq)]
enum PrgMode { Bank32kb, FixFirst16kb, #[default] FixLast16kb }
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Clone, Copy, PartialEq)]
enum ChrMode { #[default] Bank8kb, Bank4kb }

// Mapper 1
// https://www.nesdev.org/wiki/MMC1
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MMC1 {
  shift_reg: u8,
  shift_writes: u8,
  prg_mode: PrgMode,
  chr_mode: ChrMode,

  chr_select0: u8,
  chr_select1: u8,
  prg_select: u8,
  wram_enabled: bool,

  // SUROM: chr bank 0 bit 4 picks the 256 KiB outer prg bank
  outer_prg_select: bool,
  // SOROM/SXROM: chr bank 0 bits 2-3 pick the 8 KiB wram bank
  wram_banks: usize,
}

impl MMC1 {
  fn write_ctrl(&mut self, banks: &mut Banks, val: u8) {
    banks.set_mirroring(match val & 0b11 {
      0 => Mirroring::SingleScreenA,
      1 => Mirroring::SingleScreenB,
      2 => Mirroring::Vertical,
      _ => Mirroring::Horizontal,
    });

    self.prg_mode = match (val >> 2) & 0b11 {
      0 | 1 => PrgMode::Bank32kb,
      2 => PrgMode::FixFirst16kb,
      _ => PrgMode::FixLast16kb,
    };

    self.chr_mode = match (val >> 4) & 1 != 0 {
      false => ChrMode::Bank8kb,
      true  => ChrMode::Bank4kb,
    };
  }

  fn update_banks(&self, banks: &mut Banks) {
    match self.chr_mode {
      ChrMode::Bank8kb => {
        banks.chr.set_page(0, self.chr_select0 as usize & !1);
        banks.chr.set_page(1, self.chr_select0 as usize | 1);
      }
      ChrMode::Bank4kb => {
        banks.chr.set_page(0, self.chr_select0 as usize);
        banks.chr.set_page(1, self.chr_select1 as usize);
      }
    }

    let outer = if self.outer_prg_select {
      self.chr_select0 as usize & 0b1_0000
    } else { 0 };
    let bank = outer | (self.prg_select as usize & 0b1111);

    // TODO: in 4 KiB chr mode the bank follows whichever chr register the ppu last used
    let wram_bank = match self.wram_banks {
      4 => (self.chr_select0 as usize >> 2) & 0b11,
      2 => (self.chr_select0 as usize >> 3) & 1,
      _ => 0,
    };
    banks.wram.set_page(0, wram_bank);

    match self.prg_mode {
      PrgMode::Bank32kb => {
        banks.prg.set_page(0, bank & !1);
        banks.prg.set_page(1, bank | 1);
      }
      PrgMode::FixFirst16kb => {
        banks.prg.set_page(0, outer);
        banks.prg.set_page(1, bank);
      }
      PrgMode::FixLast16kb => {
        banks.prg.set_page(0, bank);
        banks.prg.set_page(1, outer | 0b1111);
      }
    }
  }
}

#[cfg_attr(feature = "serde", typetag::serde)]
impl Board for MMC1 {
  fn configure(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<Self>> {
    let fits = desc.matches(&[
      "MAPPER001", "NES-SAROM", "NES-SBROM", "NES-SCROM", "NES-SEROM", "NES-SGROM", "NES-SKROM",
      "NES-SLROM", "NES-SL1ROM", "NES-SNROM", "NES-SOROM", "NES-SUROM", "NES-SXROM", "HVC-SNROM",
    ])
      && desc.prg_size >= 32*1024
      && desc.prg_size <= 512*1024
      && desc.chr_real_size() <= 128*1024
      && desc.wram_size <= 32*1024;
    if !fits { return None; }

    banks.prg = Banking::new_prg(desc, 2);
    banks.chr = Banking::new_chr(desc, 2);

    let mapper = Self {
      shift_reg: 0,
      shift_writes: 0,
      prg_mode: PrgMode::FixLast16kb,
      chr_mode: ChrMode::Bank8kb,
      chr_select0: 0,
      chr_select1: 0,
      prg_select: 0,
      wram_enabled: true,
      outer_prg_select: desc.prg_size == 512*1024,
      wram_banks: desc.wram_size / (8*1024),
    };
    mapper.update_banks(banks);

    Some(Box::new(mapper))
  }

  fn name(&self) -> &'static str { "MMC1" }

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8) {
    if addr < 0x8000 { return; }

    if val & 0b1000_0000 != 0 {
      self.shift_reg = 0;
      self.shift_writes = 0;
      self.prg_mode = PrgMode::FixLast16kb;
      self.update_banks(banks);
      return;
    }

    self.shift_reg = (self.shift_reg >> 1) | ((val & 1) << 4);
    self.shift_writes += 1;

    if self.shift_writes < 5 { return; }

    match addr {
      0x8000..=0x9FFF => self.write_ctrl(banks, self.shift_reg),
      0xA000..=0xBFFF => self.chr_select0 = self.shift_reg & 0b1_1111,
      0xC000..=0xDFFF => self.chr_select1 = self.shift_reg & 0b1_1111,
      _ => {
        self.prg_select = self.shift_reg & 0b1111;
        self.wram_enabled = self.shift_reg & 0b1_0000 == 0;
      }
    }
    self.update_banks(banks);

    self.shift_writes = 0;
    self.shift_reg = 0;
  }

  fn validate(&self) -> bool {
    self.shift_writes < 5
  }

  fn map_prg_addr(&self, banks: &Banks, addr: usize) -> PrgTarget {
    match addr {
      0x6000..=0x7FFF if self.wram_enabled && !banks.wram.is_empty() =>
        PrgTarget::Wram(banks.wram.translate(addr)),
      0x8000..=0xFFFF => PrgTarget::Prg(banks.prg.translate(addr)),
      _ => PrgTarget::OpenBus,
    }
  }
}
