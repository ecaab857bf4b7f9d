use crate::cart::BoardDescriptor;

pub const NAMETBL_SIZE: usize = 1024;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
  #[default] Horizontal,
  Vertical,
  SingleScreenA,
  SingleScreenB,
  FourScreen,
}

impl Mirroring {
  /// Physical nametable page backing one of the four logical nametables
  /// ($2000, $2400, $2800, $2C00).
  pub fn nametable_page(self, nametbl: usize) -> usize {
    let nametbl = nametbl & 0b11;
    match self {
      Mirroring::Horizontal => nametbl >> 1,
      Mirroring::Vertical => nametbl & 1,
      Mirroring::SingleScreenA => 0,
      Mirroring::SingleScreenB => 1,
      Mirroring::FourScreen => nametbl,
    }
  }
}

/// Video memory owned by the PPU core and lent to the cartridge on every
/// pattern or nametable access.
///
/// The nametable arena always holds four pages so every mirroring mode,
/// four screen included, resolves inside it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct VideoMem {
  pub chr_ram: Box<[u8]>,
  pub ciram: Box<[u8]>,
}

impl VideoMem {
  pub fn new(desc: &BoardDescriptor) -> Self {
    let chr_ram_size = if desc.uses_chr_ram() { desc.chr_ram_size } else { 0 };
    Self {
      chr_ram: vec![0; chr_ram_size].into_boxed_slice(),
      ciram: vec![0; 4*NAMETBL_SIZE].into_boxed_slice(),
    }
  }
}

#[cfg(test)]
mod vram_tests {
  use super::*;

  const MODES: [Mirroring; 5] = [
    Mirroring::Horizontal,
    Mirroring::Vertical,
    Mirroring::SingleScreenA,
    Mirroring::SingleScreenB,
    Mirroring::FourScreen,
  ];

  #[test]
  fn pages_are_stable_per_mode() {
    for mode in MODES {
      for nametbl in 0..4 {
        let page = mode.nametable_page(nametbl);
        assert!(page < 4);
        assert_eq!(page, mode.nametable_page(nametbl));
        assert_eq!(page, mode.nametable_page(nametbl + 4));
      }
    }
  }

  #[test]
  fn two_page_layouts() {
    let pages = |mode: Mirroring| (0..4).map(|i| mode.nametable_page(i)).collect::<Vec<_>>();
    assert_eq!(pages(Mirroring::Horizontal), [0, 0, 1, 1]);
    assert_eq!(pages(Mirroring::Vertical), [0, 1, 0, 1]);
    assert_eq!(pages(Mirroring::SingleScreenA), [0, 0, 0, 0]);
    assert_eq!(pages(Mirroring::SingleScreenB), [1, 1, 1, 1]);
    assert_eq!(pages(Mirroring::FourScreen), [0, 1, 2, 3]);
  }
}
