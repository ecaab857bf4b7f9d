#![allow(dead_code)]

use std::rc::Rc;

use nen_boards::{BoardDescriptor, Cartridge, VideoMem};

pub const PRG_BANK: usize = 8*1024;
pub const CHR_BANK: usize = 1024;

pub fn init_log() {
  let mut builder = colog::basic_builder();
  builder.filter_level(log::LevelFilter::Trace);
  builder.is_test(true);
  let _ = builder.try_init();
}

/// Rom where every byte holds the number of the bank it sits in.
pub fn tagged_rom(size: usize, bank_size: usize) -> Rc<[u8]> {
  (0..size).map(|i| (i / bank_size) as u8).collect()
}

pub fn load(desc: BoardDescriptor) -> (Cartridge, VideoMem) {
  init_log();
  let prg = tagged_rom(desc.prg_size, PRG_BANK);
  let chr = tagged_rom(desc.chr_size, CHR_BANK);
  let vram = VideoMem::new(&desc);
  let cart = Cartridge::new(desc, prg, chr).unwrap();
  (cart, vram)
}

/// Which 8 KiB PRG bank is visible at a CPU address.
pub fn prg_bank(cart: &Cartridge, addr: u16) -> u8 {
  cart.read_prg(addr)
}

/// Which 1 KiB CHR bank is visible at a PPU address.
pub fn chr_bank(cart: &mut Cartridge, vram: &VideoMem, addr: u16) -> u8 {
  cart.read_chr(vram, addr)
}

/// Xorshift generator, seeded from the OS and logged so failures can be replayed.
pub struct Rng(u64);

impl Rng {
  pub fn new() -> Self {
    let mut seed = [0; 8];
    getrandom::fill(&mut seed).unwrap();
    Self::with_seed(u64::from_le_bytes(seed))
  }

  pub fn with_seed(seed: u64) -> Self {
    log::info!("rng seed {seed:#018X}");
    Self(seed | 1)
  }

  pub fn next(&mut self) -> u64 {
    let mut x = self.0;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    self.0 = x;
    x
  }

  pub fn byte(&mut self) -> u8 { self.next() as u8 }

  pub fn below(&mut self, n: usize) -> usize { (self.next() % n as u64) as usize }

  pub fn addr(&mut self, start: u16, end: u16) -> u16 {
    start + self.below((end - start) as usize + 1) as u16
  }
}

/// One descriptor per implemented board, sized so every bank register matters.
pub fn all_boards() -> Vec<BoardDescriptor> {
  vec![
    BoardDescriptor::for_mapper(0, 32*1024, 8*1024),
    BoardDescriptor::for_mapper(1, 256*1024, 128*1024).with_wram(8*1024, true),
    BoardDescriptor::for_mapper(1, 512*1024, 0).with_wram(8*1024, true),
    BoardDescriptor::for_mapper(2, 256*1024, 0),
    BoardDescriptor::for_mapper(3, 32*1024, 32*1024),
    BoardDescriptor::for_mapper(4, 512*1024, 256*1024).with_wram(8*1024, true),
    BoardDescriptor::for_mapper(7, 256*1024, 0),
    BoardDescriptor::for_mapper(9, 128*1024, 128*1024),
    BoardDescriptor::for_mapper(11, 128*1024, 128*1024),
    BoardDescriptor::for_mapper(16, 256*1024, 256*1024),
    BoardDescriptor::for_mapper(21, 256*1024, 256*1024).with_wram(8*1024, false),
    BoardDescriptor::for_mapper(22, 128*1024, 128*1024),
    BoardDescriptor::for_mapper(23, 256*1024, 256*1024).with_wram(8*1024, false),
    BoardDescriptor::for_mapper(25, 256*1024, 256*1024),
    BoardDescriptor::for_mapper(66, 128*1024, 32*1024),
    BoardDescriptor::for_mapper(69, 256*1024, 256*1024).with_wram(8*1024, true),
    BoardDescriptor::for_mapper(71, 256*1024, 0),
    BoardDescriptor::for_mapper(73, 128*1024, 0),
  ]
}
