use log::trace;

use crate::{banks::Banks, cart::BoardDescriptor};

mod irq;
mod nrom;
mod mmc1;
mod uxrom;
mod cnrom;
mod mmc3;
mod axrom;
mod mmc2;
mod colordreams;
mod bandai_fcg;
mod vrc2_4;
mod gxrom;
mod sunsoft_fme_7;
mod codemasters;
mod vrc3;

pub use irq::{Counter, IrqAck, IrqClock, IrqCtrl, IrqMode};

use axrom::AxRom;
use bandai_fcg::BandaiFCG;
use cnrom::CNRom;
use codemasters::Codemasters;
use colordreams::ColorDreams;
use gxrom::GxRom;
use mmc1::MMC1;
use mmc2::MMC2;
use mmc3::MMC3;
use nrom::NRom;
use sunsoft_fme_7::SunsoftFME7;
use uxrom::UxRom;
use vrc2_4::VRC2_4;
use vrc3::VRC3;

pub enum PrgTarget { Prg(usize), Wram(usize), WramReadOnly(usize), Cart, OpenBus }
pub enum PpuTarget { Chr(usize), Ciram(usize) }

/// Cartridge board hardware behind the uniform CPU/PPU memory contract.
///
/// Only [`Board::prg_write`] changes banking registers, mirroring or IRQ
/// configuration; [`Board::clock`] and [`Board::notify_scanline`] are the only
/// time driven changes. Everything a board must remember to behave the same
/// after a savestate restore lives in its fields or in [`Banks`] page
/// selections, never in derived values.
#[cfg_attr(feature = "serde", typetag::serde)]
pub trait Board {
  /// Checks the descriptor against this board's hardware and sets up its
  /// banks. Returns `None`, leaving `banks` untouched, when it doesn't fit.
  fn configure(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<Self>> where Self: Sized;

  fn name(&self) -> &'static str;

  fn prg_write(&mut self, banks: &mut Banks, addr: usize, val: u8);

  fn map_prg_addr(&self, banks: &Banks, addr: usize) -> PrgTarget {
    match addr {
      0x6000..=0x7FFF if !banks.wram.is_empty() => PrgTarget::Wram(banks.wram.translate(addr)),
      0x8000..=0xFFFF => PrgTarget::Prg(banks.prg.translate(addr)),
      _ => PrgTarget::OpenBus,
    }
  }

  fn map_ppu_addr(&self, banks: &Banks, addr: usize) -> PpuTarget {
    match addr {
      0x0000..=0x1FFF => PpuTarget::Chr(banks.chr.translate(addr)),
      // $3000-$3EFF mirrors the nametables, palettes never reach the cart
      _ => PpuTarget::Ciram(banks.ciram.translate(0x2000 | (addr & 0x0FFF))),
    }
  }

  fn cart_read(&self, _addr: usize) -> u8 { 0 }

  // Mmc2 latches
  fn notify_chr_read(&mut self, _banks: &mut Banks, _addr: usize) {}

  // Generic cpu cycle notify
  fn clock(&mut self) {}

  // Mmc3 scanline notify
  fn notify_scanline(&mut self) {}

  fn irq(&self) -> Option<&IrqClock> { None }
  fn irq_mut(&mut self) -> Option<&mut IrqClock> { None }

  /// Checks registers that decoding alone can't bound, for restored boards.
  fn validate(&self) -> bool {
    self.irq().map_or(true, IrqClock::is_valid)
  }
}

type Configure = fn(&BoardDescriptor, &mut Banks) -> Option<Box<dyn Board>>;

fn candidate<B: Board + 'static>(desc: &BoardDescriptor, banks: &mut Banks) -> Option<Box<dyn Board>> {
  B::configure(desc, banks).map(|board| board as Box<dyn Board>)
}

// Tried in order, the first board accepting the descriptor wins.
const BOARDS: [(&str, Configure); 14] = [
  ("NROM", candidate::<NRom>),
  ("MMC1", candidate::<MMC1>),
  ("UxROM", candidate::<UxRom>),
  ("CNROM", candidate::<CNRom>),
  ("MMC3", candidate::<MMC3>),
  ("AxROM", candidate::<AxRom>),
  ("MMC2", candidate::<MMC2>),
  ("Color Dreams", candidate::<ColorDreams>),
  ("Bandai FCG", candidate::<BandaiFCG>),
  ("VRC2/VRC4", candidate::<VRC2_4>),
  ("GxROM", candidate::<GxRom>),
  ("Sunsoft FME-7", candidate::<SunsoftFME7>),
  ("Codemasters", candidate::<Codemasters>),
  ("VRC3", candidate::<VRC3>),
];

/// Selects and builds the board matching a descriptor, along with the banks
/// it configured. Every candidate gets its own fresh banks.
pub fn configure(desc: &BoardDescriptor) -> Option<(Box<dyn Board>, Banks)> {
  BOARDS.iter().find_map(|(name, configure)| {
    let mut banks = Banks::new(desc);
    let board = configure(desc, &mut banks);
    if board.is_none() {
      trace!("{name} does not fit {}", desc.board);
    }
    board.map(|board| (board, banks))
  })
}

pub fn mapper_name(id: Option<u16>) -> &'static str {
  MAPPERS_TABLE.iter()
    .find(|m| Some(m.0) == id)
    .map(|m| m.1)
    .unwrap_or("named board")
}

const MAPPERS_TABLE: [(u16, &str); 17] = [
  (0, "NRom"),
  (1, "MMC1"),
  (2, "UxRom"),
  (3, "CNRom (INesMapper003)"),
  (4, "MMC3"),
  (7, "AxRom"),
  (9, "MMC2"),
  (11, "ColorDreams"),
  (16, "Bandai FCG"),
  (21, "VRC4a/VRC4c"),
  (22, "VRC2a"),
  (23, "VRC2b/VRC4e"),
  (25, "VRC2c/VRC4b/VRC4d"),
  (66, "GxRom"),
  (69, "Sunsoft FME-7"),
  (71, "Codemasters (INesMapper071)"),
  (73, "VRC3"),
];

pub fn set_byte_hi(dst: u16, val: u8) -> u16 {
  (dst & 0x00FF) | ((val as u16) << 8)
}

pub fn set_byte_lo(dst: u16, val: u8) -> u16 {
  (dst & 0xFF00) | val as u16
}
