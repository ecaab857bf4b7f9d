use bitflags::bitflags;

bitflags! {
  /// Konami style IRQ control register, also used by VRC3.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub struct IrqCtrl: u8 {
    const ENABLE_AFTER_ACK = 0b001;
    const ENABLE           = 0b010;
    const MODE             = 0b100;
  }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum IrqMode {
  #[default] Cycle,
  // 341 dots prescaler, 3 dots per cpu cycle
  Scanline,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
  /// Counts up, fires and reloads from the latch when clocked at $FF.
  #[default] Up8,
  /// Counts up, fires and reloads from the latch when clocked at $FFFF.
  Up16,
  /// Only the low byte counts; fires and reloads the low byte at $xxFF.
  Up8Low,
  /// Counts down, fires when wrapping from $0000 to $FFFF. No reload.
  Down16,
  /// Counts down, fires when clocked at $0000 and keeps going. No reload.
  Down16Zero,
}

/// Who clears a raised IRQ line.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum IrqAck {
  /// Only a write to one of the board registers clears the line.
  #[default] RegisterWrite,
  /// The CPU acknowledge clears the line.
  Cpu,
}

// https://www.nesdev.org/wiki/VRC_IRQ
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IrqClock {
  pub latch: u16,
  pub count: u16,
  pub prescaler: i16,
  pub enabled: bool,
  pub enabled_after_ack: bool,
  /// When false the counter still runs but rollovers don't raise the line.
  pub output: bool,
  pub mode: IrqMode,
  pub counter: Counter,
  pending: bool,
  ack: IrqAck,
}

impl IrqClock {
  pub const PRESCALER_PERIOD: i16 = 341;

  pub fn new(counter: Counter, ack: IrqAck) -> Self {
    Self { counter, ack, output: true, ..Default::default() }
  }

  pub fn pending(&self) -> bool { self.pending }

  /// False when the prescaler left the range `clock` keeps it in.
  pub fn is_valid(&self) -> bool {
    (0..=Self::PRESCALER_PERIOD).contains(&self.prescaler)
  }

  pub fn raise(&mut self) {
    self.pending = true;
  }

  /// Board side acknowledge, for register writes that clear the line.
  pub fn clear(&mut self) {
    self.pending = false;
  }

  /// CPU side acknowledge.
  pub fn acknowledge(&mut self) {
    if self.ack == IrqAck::Cpu {
      self.pending = false;
    }
  }

  pub fn write_ctrl(&mut self, val: u8) -> IrqCtrl {
    let ctrl = IrqCtrl::from_bits_truncate(val);
    self.enabled_after_ack = ctrl.contains(IrqCtrl::ENABLE_AFTER_ACK);
    self.enabled = ctrl.contains(IrqCtrl::ENABLE);

    self.pending = false;
    if self.enabled {
      self.count = self.latch;
      self.prescaler = Self::PRESCALER_PERIOD;
    }
    ctrl
  }

  pub fn write_ack(&mut self) {
    self.pending = false;
    self.enabled = self.enabled_after_ack;
  }

  /// Advances by one cpu cycle. Returns true on rollover.
  pub fn clock(&mut self) -> bool {
    if !self.enabled { return false; }

    if self.mode == IrqMode::Scanline {
      self.prescaler -= 3;
      if self.prescaler > 0 { return false; }
      self.prescaler += Self::PRESCALER_PERIOD;
    }

    let rollover = self.step();
    if rollover && self.output {
      self.pending = true;
    }
    rollover
  }

  fn step(&mut self) -> bool {
    match self.counter {
      Counter::Up8 => {
        if self.count & 0xFF == 0xFF {
          self.count = self.latch & 0xFF;
          true
        } else {
          self.count += 1;
          false
        }
      }
      Counter::Up16 => {
        if self.count == 0xFFFF {
          self.count = self.latch;
          true
        } else {
          self.count += 1;
          false
        }
      }
      Counter::Up8Low => {
        if self.count & 0xFF == 0xFF {
          self.count = (self.count & 0xFF00) | (self.latch & 0x00FF);
          true
        } else {
          self.count += 1;
          false
        }
      }
      Counter::Down16 => {
        self.count = self.count.wrapping_sub(1);
        self.count == 0xFFFF
      }
      Counter::Down16Zero => {
        let rollover = self.count == 0;
        self.count = self.count.wrapping_sub(1);
        rollover
      }
    }
  }
}
