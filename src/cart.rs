use std::rc::Rc;

use log::info;
use thiserror::Error;

use crate::{banks::Banks, board::{self, Board, PpuTarget, PrgTarget}, vram::{Mirroring, VideoMem}};

/// Facts about a cartridge, produced once by the loader's board classifier.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BoardDescriptor {
  /// Board name, either a cartridge part name ("NES-TLROM") or the generic
  /// iNes form ("MAPPER004").
  pub board: String,
  pub submapper: u8,

  pub prg_size: usize,
  /// Zero when the cartridge carries CHR-RAM instead of CHR-ROM.
  pub chr_size: usize,
  pub chr_ram_size: usize,
  pub wram_size: usize,
  pub has_battery: bool,
  /// Hardwired nametable pads.
  pub mirroring: Mirroring,
}

impl BoardDescriptor {
  pub fn new(board: &str, prg_size: usize, chr_size: usize) -> Self {
    Self {
      board: board.to_string(),
      prg_size,
      chr_size,
      // carts with no CHR-ROM are assumed to ship 8 KiB of CHR-RAM
      chr_ram_size: if chr_size == 0 { 8*1024 } else { 0 },
      ..Default::default()
    }
  }

  pub fn for_mapper(mapper: u16, prg_size: usize, chr_size: usize) -> Self {
    Self::new(&format!("MAPPER{mapper:03}"), prg_size, chr_size)
  }

  pub fn with_wram(mut self, wram_size: usize, has_battery: bool) -> Self {
    self.wram_size = wram_size;
    self.has_battery = has_battery;
    self
  }

  pub fn with_mirroring(mut self, mirroring: Mirroring) -> Self {
    self.mirroring = mirroring;
    self
  }

  pub fn with_submapper(mut self, submapper: u8) -> Self {
    self.submapper = submapper;
    self
  }

  pub fn uses_chr_ram(&self) -> bool { self.chr_size == 0 }

  pub fn chr_real_size(&self) -> usize {
    if self.uses_chr_ram() {
      self.chr_ram_size
    } else {
      self.chr_size
    }
  }

  pub fn matches(&self, boards: &[&str]) -> bool {
    boards.contains(&self.board.as_str())
  }

  /// iNes mapper number, for descriptors using the generic "MAPPERnnn" form.
  pub fn mapper(&self) -> Option<u16> {
    self.board.strip_prefix("MAPPER")?.parse().ok()
  }

  /// Checks the facts every board relies on for total address translation.
  pub fn validate(&self) -> Result<(), LoadError> {
    let invalid = |reason: &'static str| Err(LoadError::InvalidDescriptor { board: self.board.clone(), reason });

    if self.prg_size < 8*1024 || !self.prg_size.is_power_of_two() {
      return invalid("PRG size must be a power of two of at least 8 KiB");
    }
    if self.chr_real_size() == 0 || !self.chr_real_size().is_power_of_two() {
      return invalid("CHR size must be a non-zero power of two");
    }
    if self.wram_size != 0 && !self.wram_size.is_power_of_two() {
      return invalid("WRAM size must be zero or a power of two");
    }
    if self.has_battery && self.wram_size == 0 {
      return invalid("battery backed carts need WRAM");
    }
    Ok(())
  }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoadError {
  #[error("invalid board descriptor for {board}: {reason}")]
  InvalidDescriptor { board: String, reason: &'static str },
  #[error("{region} buffer is {found} bytes, descriptor says {expected}")]
  BufferSize { region: &'static str, expected: usize, found: usize },
  #[error("board {0} not implemented, game can't be loaded correctly")]
  NoBoard(String),
  #[error("save ram is {found} bytes, cart has {expected}")]
  SramSize { expected: usize, found: usize },
}

/// A loaded cartridge: the board, its banking state and its work RAM.
///
/// This is what the CPU and PPU cores drive. ROM buffers stay owned by the
/// loader and are only read through shared handles.
pub struct Cartridge {
  pub(crate) descriptor: BoardDescriptor,
  pub(crate) prg: Rc<[u8]>,
  pub(crate) chr: Rc<[u8]>,
  pub(crate) wram: Box<[u8]>,
  pub(crate) banks: Banks,
  pub(crate) board: Box<dyn Board>,
}

impl Cartridge {
  pub fn new(descriptor: BoardDescriptor, prg: Rc<[u8]>, chr: Rc<[u8]>) -> Result<Self, LoadError> {
    descriptor.validate()?;

    if prg.len() != descriptor.prg_size {
      return Err(LoadError::BufferSize { region: "PRG", expected: descriptor.prg_size, found: prg.len() });
    }
    if chr.len() != descriptor.chr_size {
      return Err(LoadError::BufferSize { region: "CHR", expected: descriptor.chr_size, found: chr.len() });
    }

    let (board, banks) = board::configure(&descriptor)
      .ok_or_else(|| LoadError::NoBoard(descriptor.board.clone()))?;

    info!("Loaded {} as {} ({})", descriptor.board, board.name(), board::mapper_name(descriptor.mapper()));

    let wram = vec![0; descriptor.wram_size].into_boxed_slice();
    Ok(Self { descriptor, prg, chr, wram, banks, board })
  }

  pub fn descriptor(&self) -> &BoardDescriptor { &self.descriptor }
  pub fn board_name(&self) -> &'static str { self.board.name() }
  pub fn mirroring(&self) -> Mirroring { self.banks.mirroring() }

  /// CPU read in $4020-$FFFF.
  pub fn read_prg(&self, addr: u16) -> u8 {
    let addr = addr as usize;
    match self.board.map_prg_addr(&self.banks, addr) {
      PrgTarget::Prg(addr) => self.prg[addr],
      PrgTarget::Wram(addr) | PrgTarget::WramReadOnly(addr) => self.wram[addr],
      PrgTarget::Cart => self.board.cart_read(addr),
      // TODO: open bus should return the last value seen on the data bus
      PrgTarget::OpenBus => 0,
    }
  }

  /// CPU write in $4020-$FFFF. Work RAM is written first, then the board
  /// sees the write, as some boards decode registers over the RAM window.
  pub fn write_prg(&mut self, addr: u16, val: u8) {
    let addr = addr as usize;
    if let PrgTarget::Wram(addr) = self.board.map_prg_addr(&self.banks, addr) {
      self.wram[addr] = val;
    }

    self.board.prg_write(&mut self.banks, addr, val);
  }

  /// PPU read in $0000-$3FFF.
  pub fn read_chr(&mut self, vram: &VideoMem, addr: u16) -> u8 {
    let addr = addr as usize & 0x3FFF;
    let val = match self.board.map_ppu_addr(&self.banks, addr) {
      PpuTarget::Chr(addr) if self.descriptor.uses_chr_ram() => vram.chr_ram[addr],
      PpuTarget::Chr(addr) => self.chr[addr],
      PpuTarget::Ciram(addr) => vram.ciram[addr],
    };

    self.board.notify_chr_read(&mut self.banks, addr);
    val
  }

  /// PPU write in $0000-$3FFF. Writes to CHR-ROM are dropped.
  pub fn write_chr(&mut self, vram: &mut VideoMem, addr: u16, val: u8) {
    let addr = addr as usize & 0x3FFF;
    match self.board.map_ppu_addr(&self.banks, addr) {
      PpuTarget::Chr(addr) if self.descriptor.uses_chr_ram() => vram.chr_ram[addr] = val,
      PpuTarget::Chr(_) => {}
      PpuTarget::Ciram(addr) => vram.ciram[addr] = val,
    }
  }

  /// Called once per CPU cycle.
  pub fn clock(&mut self) {
    self.board.clock();
  }

  /// Called once per rendered scanline.
  pub fn notify_scanline(&mut self) {
    self.board.notify_scanline();
  }

  pub fn irq_pending(&self) -> bool {
    self.board.irq().is_some_and(|irq| irq.pending())
  }

  /// CPU side interrupt acknowledge. Boards whose line is only cleared by a
  /// register write keep it raised, and every implemented board clears its
  /// line that way, so for them this is a no-op.
  pub fn acknowledge_irq(&mut self) {
    if let Some(irq) = self.board.irq_mut() {
      irq.acknowledge();
    }
  }

  pub fn sram(&self) -> Option<&[u8]> {
    self.descriptor.has_battery.then_some(&*self.wram)
  }

  pub fn load_sram(&mut self, data: &[u8]) -> Result<(), LoadError> {
    if data.len() != self.wram.len() {
      return Err(LoadError::SramSize { expected: self.wram.len(), found: data.len() });
    }

    self.wram.copy_from_slice(data);
    Ok(())
  }
}
