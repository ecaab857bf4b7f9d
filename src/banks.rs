use crate::{cart::BoardDescriptor, vram::{Mirroring, NAMETBL_SIZE}};

#[derive(Debug, Default, Clone)]
pub struct PrgBanking;
#[derive(Debug, Default, Clone)]
pub struct ChrBanking;
#[derive(Debug, Default, Clone)]
pub struct WramBanking;
#[derive(Debug, Default, Clone)]
pub struct CiramBanking;

/// Maps a window of pages in an address space onto banks of a backing buffer.
///
/// Every geometry value is derived once, in [`Banking::new`]. Bank numbers are
/// masked with `banks_count - 1` when they are stored, and offsets are masked
/// with the smaller of page and buffer size when they are translated, so a
/// translated address is always below `data_size`.
#[derive(Debug, Clone)]
pub struct Banking<T> {
  data_size: usize,
  pages_start: usize,
  page_size_shift: usize,
  banks_count: usize,
  bank_mask: usize,
  offset_mask: usize,
  bankings: Box<[usize]>,
  kind: std::marker::PhantomData<T>,
}

// https://stackoverflow.com/questions/25787613/division-and-multiplication-by-power-of-2
impl<T> Banking<T> {
  pub fn new(data_size: usize, pages_start: usize, page_size: usize, pages_count: usize) -> Self {
    debug_assert!(page_size.is_power_of_two());
    debug_assert!(data_size == 0 || data_size.is_power_of_two());

    let bankings = vec![0; pages_count].into_boxed_slice();
    // buffers smaller than a page are mirrored inside it
    let banks_count = (data_size / page_size).max(1);
    let offset_mask = page_size.min(data_size).saturating_sub(1);

    Self {
      data_size,
      pages_start,
      page_size_shift: page_size.ilog2() as usize,
      banks_count,
      bank_mask: banks_count - 1,
      offset_mask,
      bankings,
      kind: std::marker::PhantomData::<T>,
    }
  }

  pub fn is_empty(&self) -> bool { self.data_size == 0 }
  pub fn banks_count(&self) -> usize { self.banks_count }
  pub fn pages_count(&self) -> usize { self.bankings.len() }
  pub fn last_bank(&self) -> usize { self.banks_count - 1 }

  pub fn set_page(&mut self, page: usize, bank: usize) {
    // some games write bigger bank numbers than really available
    let bank = bank & self.bank_mask;
    self.bankings[page] = bank << self.page_size_shift;
  }

  pub fn set_page_to_last_bank(&mut self, page: usize) {
    self.set_page(page, self.last_bank());
  }

  pub fn bank(&self, page: usize) -> usize {
    self.bankings[page] >> self.page_size_shift
  }

  /// Bank number currently selected in every page, in page order.
  pub fn pages(&self) -> Vec<usize> {
    (0..self.pages_count()).map(|page| self.bank(page)).collect()
  }

  /// Reselects every page from a list produced by [`Banking::pages`].
  /// Fails without touching anything when the page count differs.
  pub fn restore_pages(&mut self, banks: &[usize]) -> bool {
    if banks.len() != self.pages_count() { return false; }

    for (page, bank) in banks.iter().enumerate() {
      self.set_page(page, *bank);
    }
    true
  }

  pub fn page_to_bank_addr(&self, page: usize, addr: usize) -> usize {
    self.bankings[page] | (addr & self.offset_mask)
  }

  pub fn translate(&self, addr: usize) -> usize {
    // the bus always hands in addresses inside this window
    let page = (addr - self.pages_start) >> self.page_size_shift;
    self.page_to_bank_addr(page, addr)
  }
}

impl Banking<PrgBanking> {
  pub fn new_prg(desc: &BoardDescriptor, pages_count: usize) -> Self {
    let pages_size = 32*1024 / pages_count;
    Self::new(desc.prg_size, 0x8000, pages_size, pages_count)
  }
}

impl Banking<ChrBanking> {
  pub fn new_chr(desc: &BoardDescriptor, pages_count: usize) -> Self {
    let pages_size = 8*1024 / pages_count;
    Self::new(desc.chr_real_size(), 0, pages_size, pages_count)
  }
}

impl Banking<WramBanking> {
  pub fn new_wram(desc: &BoardDescriptor) -> Self {
    Self::new(desc.wram_size, 0x6000, 8*1024, 1)
  }
}

impl Banking<CiramBanking> {
  pub fn new_ciram(mirroring: Mirroring) -> Self {
    let mut res = Self::new(4*NAMETBL_SIZE, 0x2000, NAMETBL_SIZE, 4);
    res.update(mirroring);
    res
  }

  pub fn update(&mut self, mirroring: Mirroring) {
    for nametbl in 0..4 {
      self.set_page(nametbl, mirroring.nametable_page(nametbl));
    }
  }
}

/// Banking state of one loaded cartridge, handed to the board on every access.
#[derive(Debug, Clone)]
pub struct Banks {
  pub prg:   Banking<PrgBanking>,
  pub chr:   Banking<ChrBanking>,
  pub wram:  Banking<WramBanking>,
  pub ciram: Banking<CiramBanking>,
  mirroring: Mirroring,
}

impl Banks {
  pub fn new(desc: &BoardDescriptor) -> Self {
    Self {
      prg: Banking::new_prg(desc, 1),
      chr: Banking::new_chr(desc, 1),
      wram: Banking::new_wram(desc),
      ciram: Banking::new_ciram(desc.mirroring),
      mirroring: desc.mirroring,
    }
  }

  pub fn mirroring(&self) -> Mirroring { self.mirroring }

  pub fn set_mirroring(&mut self, mirroring: Mirroring) {
    self.mirroring = mirroring;
    self.ciram.update(mirroring);
  }
}

#[cfg(test)]
mod banks_tests {
  use super::*;

  #[test]
  fn bank_select_is_masked_by_rom_size() {
    // 32 KiB in 8 KiB banks: four banks, mask 3
    let mut prg = Banking::<PrgBanking>::new(32*1024, 0x8000, 8*1024, 4);

    prg.set_page(0, 2);
    assert_eq!(prg.translate(0x8000), 2 * 8192);

    prg.set_page(0, 5);
    assert_eq!(prg.translate(0x8000), (5 & 3) * 8192);
    assert_eq!(prg.translate(0x9FFF), 8192 + 0x1FFF);
  }

  #[test]
  fn small_rom_mirrors_inside_page() {
    let prg = Banking::<PrgBanking>::new(16*1024, 0x8000, 32*1024, 1);
    assert_eq!(prg.translate(0x8000), 0);
    assert_eq!(prg.translate(0xC000), 0);
    assert_eq!(prg.translate(0xFFFF), 0x3FFF);
  }

  #[test]
  fn translate_stays_inside_buffer() {
    for (size, page_size, pages) in [(128*1024, 16*1024, 2), (8*1024, 1024, 8), (256*1024, 8*1024, 4)] {
      let mut chr = Banking::<ChrBanking>::new(size, 0, page_size, pages);
      for bank in 0..=0xFF {
        chr.set_page(bank % pages, bank * 7);
        for addr in (0..pages * page_size).step_by(page_size / 4) {
          assert!(chr.translate(addr) < size);
        }
      }
    }
  }

  #[test]
  fn pages_roundtrip() {
    let mut prg = Banking::<PrgBanking>::new(128*1024, 0x8000, 8*1024, 4);
    prg.set_page(0, 3);
    prg.set_page(1, 9);
    prg.set_page_to_last_bank(3);

    let pages = prg.pages();
    assert_eq!(pages, vec![3, 9, 0, 15]);

    let mut other = Banking::<PrgBanking>::new(128*1024, 0x8000, 8*1024, 4);
    assert!(other.restore_pages(&pages));
    assert_eq!(other.pages(), pages);
    assert!(!other.restore_pages(&pages[..2]));
  }

  #[test]
  fn ciram_follows_mirroring() {
    let mut ciram = Banking::<CiramBanking>::new_ciram(Mirroring::Horizontal);
    assert_eq!(ciram.translate(0x2000), ciram.translate(0x2400));
    assert_ne!(ciram.translate(0x2000), ciram.translate(0x2800));

    ciram.update(Mirroring::Vertical);
    assert_ne!(ciram.translate(0x2000), ciram.translate(0x2400));
    assert_eq!(ciram.translate(0x2000), ciram.translate(0x2800));
  }
}
