use log::debug;
use rand::Rng;

use crate::decode::OpCode;
use crate::machine::Machine;
use crate::memory::Addr;

/// Last address a two-byte fetch fits under. A PC at or past this halts
/// the engine instead of faulting; runaway programs just stop.
const PC_LIMIT: Addr = 4094;

impl Machine {
    /// Runs one fetch-decode-execute cycle. Declines to advance while a
    /// key-wait is pending or the program counter has run off the end;
    /// timers keep ticking either way.
    pub fn step(&mut self) {
        if self.waiting_key.is_some() || self.pc >= PC_LIMIT {
            return;
        }
        let at = self.pc;
        let word = self.mem.read_word(at);
        self.pc += 2;
        self.execute(at, OpCode::decode(word));
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc += 2;
        }
    }

    /// Applies one instruction. `at` is the address it was fetched from;
    /// the PC already points at the following instruction.
    fn execute(&mut self, at: Addr, op: OpCode) {
        match op {
            OpCode::Clear => {
                self.fb.clear();
                self.draw_flag = true;
            }
            OpCode::Return => {
                // the stack holds call sites, so resume just past one
                if let Some(addr) = self.stack.pop() {
                    self.pc = addr + 2;
                }
            }
            OpCode::Jump(nnn) => self.pc = nnn,
            OpCode::Call(nnn) => {
                self.stack.push(at);
                self.pc = nnn;
            }
            OpCode::SkipEqImm(x, nn) => self.skip_if(self.regs.get(x) == nn),
            OpCode::SkipNeImm(x, nn) => self.skip_if(self.regs.get(x) != nn),
            OpCode::SkipEqReg(x, y) => self.skip_if(self.regs.get(x) == self.regs.get(y)),
            OpCode::SkipNeReg(x, y) => self.skip_if(self.regs.get(x) != self.regs.get(y)),
            OpCode::LoadImm(x, nn) => self.regs.set(x, nn),
            OpCode::AddImm(x, nn) => {
                // wraps mod 256, carry flag untouched
                self.regs.set(x, self.regs.get(x).wrapping_add(nn));
            }
            OpCode::Move(x, y) => self.regs.set(x, self.regs.get(y)),
            OpCode::Or(x, y) => {
                self.regs.set(x, self.regs.get(x) | self.regs.get(y));
                self.regs.set_flag(0);
            }
            OpCode::And(x, y) => {
                self.regs.set(x, self.regs.get(x) & self.regs.get(y));
                self.regs.set_flag(0);
            }
            OpCode::Xor(x, y) => {
                self.regs.set(x, self.regs.get(x) ^ self.regs.get(y));
                self.regs.set_flag(0);
            }
            OpCode::Add(x, y) => {
                let (sum, carry) = self.regs.get(x).overflowing_add(self.regs.get(y));
                self.regs.set(x, sum);
                self.regs.set_flag(carry as u8);
            }
            OpCode::Sub(x, y) => {
                let (vx, vy) = (self.regs.get(x), self.regs.get(y));
                self.regs.set_flag((vx >= vy) as u8);
                self.regs.set(x, vx.wrapping_sub(vy));
            }
            OpCode::SubN(x, y) => {
                let (vx, vy) = (self.regs.get(x), self.regs.get(y));
                self.regs.set_flag((vy >= vx) as u8);
                self.regs.set(x, vy.wrapping_sub(vx));
            }
            OpCode::ShiftRight(x, y) => {
                let src = if self.options.shift_quirk { y } else { x };
                let val = self.regs.get(src);
                self.regs.set_flag(val & 1);
                self.regs.set(x, val >> 1);
            }
            OpCode::ShiftLeft(x, y) => {
                let src = if self.options.shift_quirk { y } else { x };
                let val = self.regs.get(src);
                self.regs.set_flag(val >> 7);
                self.regs.set(x, val << 1);
            }
            OpCode::SetIndex(nnn) => self.index = nnn,
            OpCode::JumpOffset(nnn) => self.pc = nnn + self.regs.get(0) as u16,
            OpCode::Random(x, nn) => {
                let byte: u8 = self.rng.gen();
                self.regs.set(x, byte & nn);
            }
            OpCode::Draw(x, y, n) => {
                let sprite: Vec<u8> = (0..n)
                    .map(|row| self.mem.get(self.index.wrapping_add(row as u16)))
                    .collect();
                self.regs.set_flag(0);
                if self.fb.blit(self.regs.get(x), self.regs.get(y), &sprite) {
                    self.regs.set_flag(1);
                }
                self.draw_flag = true;
            }
            OpCode::SkipKeyPressed(x) => {
                let key = self.regs.get(x) & 0xF;
                self.skip_if(self.keypad.is_pressed(key));
            }
            OpCode::SkipKeyReleased(x) => {
                let key = self.regs.get(x) & 0xF;
                self.skip_if(!self.keypad.is_pressed(key));
            }
            OpCode::GetDelay(x) => self.regs.set(x, self.delay.get()),
            OpCode::WaitKey(x) => self.waiting_key = Some(x),
            OpCode::SetDelay(x) => self.delay.set(self.regs.get(x)),
            OpCode::SetSound(x) => self.sound.set(self.regs.get(x)),
            OpCode::AddIndex(x) => {
                // I is a full 16-bit register; memory masks on access
                self.index = self.index.wrapping_add(self.regs.get(x) as u16);
            }
            OpCode::FontGlyph(x) => {
                self.index = (self.regs.get(x) & 0xF) as u16 * 5;
            }
            OpCode::StoreBcd(x) => {
                let v = self.regs.get(x);
                self.mem.set(self.index, v / 100);
                self.mem.set(self.index.wrapping_add(1), v / 10 % 10);
                self.mem.set(self.index.wrapping_add(2), v % 10);
            }
            OpCode::StoreRegs(x) => {
                for reg in 0..=x {
                    self.mem
                        .set(self.index.wrapping_add(reg as u16), self.regs.get(reg));
                }
                if self.options.increment_index {
                    self.index = self.index.wrapping_add(x as u16 + 1);
                }
            }
            OpCode::LoadRegs(x) => {
                for reg in 0..=x {
                    let val = self.mem.get(self.index.wrapping_add(reg as u16));
                    self.regs.set(reg, val);
                }
                if self.options.increment_index {
                    self.index = self.index.wrapping_add(x as u16 + 1);
                }
            }
            OpCode::Unknown(word) => {
                debug!("unknown opcode {word:#06x} at {at:#05x}");
            }
        }
    }
}
