use std::fs;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{ChipError, Result};
use crate::framebuffer::FrameBuffer;
use crate::keyboard::{Keypad, KEY_COUNT};
use crate::memory::{Addr, Memory, MAX_PROGRAM_SIZE, PROGRAM_START};
use crate::registers::{Registers, Stack};
use crate::timer::Timer;

/// Construction-time configuration: the two behavior quirks, the batch
/// size per timer tick, and an optional RNG seed for deterministic runs.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// 8XY6/8XYE shift VY into VX instead of shifting VX in place
    /// (COSMAC VIP behavior).
    pub shift_quirk: bool,
    /// FX55/FX65 advance I by X+1 after the transfer (COSMAC VIP behavior).
    pub increment_index: bool,
    /// Instructions executed between timer ticks.
    pub instructions_per_tick: u32,
    /// Fixed seed for the CXNN random source; None draws from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            shift_quirk: true,
            increment_index: true,
            instructions_per_tick: 10,
            rng_seed: None,
        }
    }
}

/// The whole machine: memory, registers, call stack, timers, display,
/// keypad, and the quirk configuration. All mutation goes through the
/// execution engine (`step`), the timer tick, and `set_key`.
pub struct Machine {
    pub(crate) mem: Memory,
    pub(crate) regs: Registers,
    pub(crate) stack: Stack,
    pub(crate) pc: Addr,
    pub(crate) index: u16,
    pub(crate) delay: Timer,
    pub(crate) sound: Timer,
    pub(crate) fb: FrameBuffer,
    pub(crate) keypad: Keypad,
    /// FX0A destination register while a key-wait is pending.
    pub(crate) waiting_key: Option<u8>,
    pub(crate) draw_flag: bool,
    pub(crate) options: Options,
    pub(crate) rng: StdRng,
}

impl Machine {
    pub fn new(options: Options) -> Self {
        let rng = match options.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            mem: Memory::new(),
            regs: Registers::new(),
            stack: Stack::new(),
            pc: PROGRAM_START,
            index: 0,
            delay: Timer::new(),
            sound: Timer::new(),
            fb: FrameBuffer::new(),
            keypad: Keypad::new(),
            waiting_key: None,
            draw_flag: false,
            options,
            rng,
        }
    }

    /// Re-zeroes all machine state and reloads the font. Options survive.
    pub fn reset(&mut self) {
        self.mem.reset();
        self.regs.reset();
        self.stack.reset();
        self.pc = PROGRAM_START;
        self.index = 0;
        self.delay.set(0);
        self.sound.set(0);
        self.fb.clear();
        self.keypad.reset();
        self.waiting_key = None;
        self.draw_flag = false;
    }

    /// Loads a program image at 0x200. An oversized image is rejected
    /// without touching any state; on success the machine starts from a
    /// fresh reset.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > MAX_PROGRAM_SIZE {
            return Err(ChipError::RomTooLarge {
                size: bytes.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        self.reset();
        self.mem.write_program(bytes);
        info!("loaded {} byte program", bytes.len());
        Ok(())
    }

    /// Reads a ROM image from disk and loads it.
    pub fn load_rom_file(&mut self, path: &str) -> Result<()> {
        let bytes = fs::read(path)?;
        self.load_rom(&bytes)
    }

    /// Press/release edge from the input collaborator. A press resolves a
    /// pending key-wait by storing the key number in the recorded register.
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        if key >= KEY_COUNT as u8 {
            debug!("ignoring out-of-range key {key:#x}");
            return;
        }
        self.keypad.set(key, pressed);
        if pressed {
            if let Some(reg) = self.waiting_key.take() {
                self.regs.set(reg, key);
            }
        }
    }

    /// One logical 60 Hz timer tick; true while the beeper should sound.
    /// Runs even when the engine is halted or waiting for a key.
    pub fn tick_timers(&mut self) -> bool {
        self.delay.tick();
        self.sound.tick();
        self.sound.active()
    }

    /// Clears and returns the redraw flag; the renderer polls this once
    /// per tick.
    pub fn take_draw_flag(&mut self) -> bool {
        std::mem::take(&mut self.draw_flag)
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.fb
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.regs.get(reg)
    }

    pub fn pc(&self) -> Addr {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn sound_active(&self) -> bool {
        self.sound.active()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}
