use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{board::{self, Board}, cart::{BoardDescriptor, Cartridge}, vram::Mirroring};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum SnapshotError {
  #[error("malformed snapshot: {0}")]
  Codec(#[from] pot::Error),
  #[error("snapshot version {found}, expected {expected}")]
  Version { found: u32, expected: u32 },
  #[error("snapshot was taken from a different cartridge")]
  Descriptor,
  #[error("snapshot holds a {found} board, cartridge is {expected}")]
  Board { found: String, expected: &'static str },
  #[error("snapshot {0} layout doesn't match the cartridge")]
  Layout(&'static str),
}

// Bank masks and page geometry are never stored, they are rebuilt from the
// descriptor by configuring the board again on restore.
#[derive(Serialize)]
struct SnapshotRef<'a> {
  version: u32,
  descriptor: &'a BoardDescriptor,
  prg_pages: Vec<usize>,
  chr_pages: Vec<usize>,
  wram_pages: Vec<usize>,
  ciram_pages: Vec<usize>,
  mirroring: Mirroring,
  wram: &'a [u8],
  board: &'a dyn Board,
}

#[derive(Deserialize)]
struct Snapshot {
  version: u32,
  descriptor: BoardDescriptor,
  prg_pages: Vec<usize>,
  chr_pages: Vec<usize>,
  wram_pages: Vec<usize>,
  ciram_pages: Vec<usize>,
  mirroring: Mirroring,
  wram: Vec<u8>,
  board: Box<dyn Board>,
}

impl Cartridge {
  /// Encodes the complete mutable state of the board, its banks and work RAM.
  pub fn snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
    let snap = SnapshotRef {
      version: SNAPSHOT_VERSION,
      descriptor: &self.descriptor,
      prg_pages: self.banks.prg.pages(),
      chr_pages: self.banks.chr.pages(),
      wram_pages: self.banks.wram.pages(),
      ciram_pages: self.banks.ciram.pages(),
      mirroring: self.banks.mirroring(),
      wram: &self.wram,
      board: self.board.as_ref(),
    };

    Ok(pot::to_vec(&snap)?)
  }

  /// Restores a state produced by [`Cartridge::snapshot`] on a cartridge built
  /// from the same descriptor. On any error the cartridge is left untouched.
  pub fn restore(&mut self, data: &[u8]) -> Result<(), SnapshotError> {
    let snap: Snapshot = pot::from_slice(data)?;

    if snap.version != SNAPSHOT_VERSION {
      return Err(SnapshotError::Version { found: snap.version, expected: SNAPSHOT_VERSION });
    }
    if snap.descriptor != self.descriptor {
      return Err(SnapshotError::Descriptor);
    }

    // the same descriptor always selects the same board
    let (fresh, mut banks) = board::configure(&self.descriptor)
      .ok_or(SnapshotError::Descriptor)?;
    if snap.board.name() != fresh.name() {
      return Err(SnapshotError::Board { found: snap.board.name().to_string(), expected: fresh.name() });
    }
    if !snap.board.validate() {
      return Err(SnapshotError::Layout("board"));
    }

    banks.set_mirroring(snap.mirroring);
    if !banks.prg.restore_pages(&snap.prg_pages) { return Err(SnapshotError::Layout("PRG")); }
    if !banks.chr.restore_pages(&snap.chr_pages) { return Err(SnapshotError::Layout("CHR")); }
    if !banks.wram.restore_pages(&snap.wram_pages) { return Err(SnapshotError::Layout("WRAM")); }
    if !banks.ciram.restore_pages(&snap.ciram_pages) { return Err(SnapshotError::Layout("nametable")); }
    if snap.wram.len() != self.wram.len() {
      return Err(SnapshotError::Layout("WRAM"));
    }

    self.banks = banks;
    self.board = snap.board;
    self.wram = snap.wram.into_boxed_slice();
    debug!("Restored {} snapshot ({} bytes)", self.board.name(), data.len());
    Ok(())
  }
}
