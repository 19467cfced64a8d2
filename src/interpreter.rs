use crate::disassembler::{Decoded, Disassembler, Operands};
use crate::display::Display;
use crate::error::Error;
use crate::input::Input;
use crate::memory::{Chip8MemoryMap, CHIP8_PROGRAM_ADDR};
use crate::opcode::Opcode;
use crate::sound::Audio;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Call stack depth, in 16-bit return addresses.
const CHIP8_STACK_SIZE: usize = 16;

/// The program counter is effectively 12 bits.
const CHIP8_PC_MASK: u16 = 0x0FFF;

/// How long the wait-for-keypress opcode idles before re-executing itself.
const CHIP8_WAIT_KEY_IDLE: Duration = Duration::from_millis(1);

/// Machine configuration. Immutable once the interpreter is built; persists
/// across program loads and resets.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Instructions per second for the run loop. Must be positive.
    pub frequency: u32,
    /// When set, the shift opcodes take their source bit from Vy; when
    /// clear, Vy is aliased to Vx first (the behavior many programs assume).
    pub shift_quirks: bool,
    /// When set, call/return past the stack bounds is an error. When clear
    /// the stack pointer silently wraps modulo the stack depth.
    pub strict_stack: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            frequency: 300,
            shift_quirks: false,
            strict_stack: false,
        }
    }
}

/// Read-only machine state handed to an Observer before each tick executes.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    pub opcode: u16,
    pub pattern: Opcode,
    pub program_counter: u16,
    pub stack_pointer: usize,
    pub index: u16,
    pub registers: [u8; 16],
    pub delta_timer: u8,
    pub sound_timer: u8,
}

/// Receives a state snapshot immediately before each tick mutates anything:
/// the program counter has not yet advanced. For tracing and debug UIs.
pub trait Observer {
    fn before_tick(&mut self, snapshot: &Snapshot);
}

/// Side effects of one tick, as reported to the caller. The collaborators
/// have already been notified by the time tick returns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Effects {
    /// A screen-affecting opcode ran this tick.
    pub drew: bool,
    /// The sound timer went 1 -> 0 this tick.
    pub beeped: bool,
}

/// The CHIP-8 machine: memory, registers, stack, timers, and the
/// fetch/decode/execute cycle, wired to its display, audio and input
/// collaborators.
pub struct Chip8Interpreter<'a> {
    memory: Chip8MemoryMap,
    display: &'a mut dyn Display,
    audio: &'a mut dyn Audio,
    input: &'a mut dyn Input,
    observer: Option<&'a mut dyn Observer>,
    disassembler: Disassembler,
    registers: [u8; 16],
    stack: [u16; CHIP8_STACK_SIZE],
    stack_pointer: usize,
    program_counter: u16,
    index: u16,
    delta_timer: u8,
    sound_timer: u8,
    config: Config,
    rng: SmallRng,
    halted: bool,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        display: &'a mut dyn Display,
        audio: &'a mut dyn Audio,
        input: &'a mut dyn Input,
        config: Config,
    ) -> Result<Chip8Interpreter<'a>, Error> {
        if config.frequency == 0 {
            return Err(Error::InvalidConfig {
                frequency: config.frequency,
            });
        }
        Ok(Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            display,
            audio,
            input,
            observer: None,
            disassembler: Disassembler::new(),
            registers: [0; 16],
            stack: [0; CHIP8_STACK_SIZE],
            stack_pointer: 0,
            program_counter: CHIP8_PROGRAM_ADDR,
            index: 0,
            delta_timer: 0,
            sound_timer: 0,
            config,
            rng: SmallRng::from_entropy(),
            halted: false,
        })
    }

    /// Install a tracing observer. It fires before every tick's mutation.
    pub fn set_observer(&mut self, observer: &'a mut dyn Observer) {
        self.observer = Some(observer);
    }

    /// Zero everything except configuration and the RNG.
    fn reset(&mut self) {
        self.memory = Chip8MemoryMap::new();
        self.registers = [0; 16];
        self.stack = [0; CHIP8_STACK_SIZE];
        self.stack_pointer = 0;
        self.program_counter = CHIP8_PROGRAM_ADDR;
        self.index = 0;
        self.delta_timer = 0;
        self.sound_timer = 0;
    }

    /// Load a chip8 program: full reset, then the raw big-endian
    /// instruction stream is copied to the program origin.
    pub fn load_program(&mut self, data: &[u8]) -> Result<(), Error> {
        self.reset();
        self.memory.load_program(data)
    }

    /// Pause or resume instruction execution. A halted machine still polls
    /// input and keeps its loop cadence.
    pub fn toggle_halted(&mut self) {
        self.halted = !self.halted;
    }

    /// The run loop: poll input, execute one tick unless halted, idle to
    /// hold the configured frequency. Single-threaded and cooperative; the
    /// only instruction-level suspension is wait-for-keypress repeating
    /// itself inside tick.
    pub fn run(&mut self) -> Result<(), Error> {
        self.display.clear()?;
        let period = Duration::from_secs_f64(1.0 / self.config.frequency as f64);
        loop {
            self.input.poll()?;
            if !self.halted {
                self.tick(None)?;
            }
            spin_sleep::sleep(period);
        }
    }

    /// One machine cycle: fetch (unless an opcode is supplied), decode,
    /// advance the program counter, execute, update timers, notify the
    /// display if the screen changed.
    ///
    /// The program counter is advanced *before* execution, so every opcode
    /// sees the already-advanced value: call pushes it, skip adds another
    /// two on top of it, jump overwrites it.
    pub fn tick(&mut self, opcode_override: Option<u16>) -> Result<Effects, Error> {
        let opcode = match opcode_override {
            Some(op) => op,
            None => self.memory.read_word(self.program_counter),
        };
        let decoded = self.disassembler.disassemble(opcode)?;

        if let Some(observer) = self.observer.as_deref_mut() {
            observer.before_tick(&Snapshot {
                opcode,
                pattern: decoded.pattern,
                program_counter: self.program_counter,
                stack_pointer: self.stack_pointer,
                index: self.index,
                registers: self.registers,
                delta_timer: self.delta_timer,
                sound_timer: self.sound_timer,
            });
        }

        self.program_counter = (self.program_counter + 2) & CHIP8_PC_MASK;

        let drew = self.execute(&decoded)?;

        if self.delta_timer > 0 {
            self.delta_timer -= 1;
        }
        let mut beeped = false;
        if self.sound_timer > 0 {
            if self.sound_timer == 1 {
                self.audio.beep().map_err(Error::Audio)?;
                beeped = true;
            }
            self.sound_timer -= 1;
        }

        if drew {
            self.display.notify_frame_complete()?;
        }

        Ok(Effects { drew, beeped })
    }

    /// Skip the next instruction.
    fn skip(&mut self) {
        self.program_counter = (self.program_counter + 2) & CHIP8_PC_MASK;
    }

    fn execute(&mut self, decoded: &Decoded) -> Result<bool, Error> {
        let Operands { x, y, n } = decoded.args;
        let (x, y) = (x as usize, y as usize);
        let nn = n as u8;
        let mut drew = false;

        match decoded.pattern {
            Opcode::Sys => {} // host system call on the original machine; ignored

            Opcode::ClearScreen => {
                self.display.clear()?;
                drew = true;
            }

            Opcode::Return => {
                if self.config.strict_stack && self.stack_pointer == 0 {
                    return Err(Error::StackUnderflow {
                        pc: self.program_counter,
                    });
                }
                self.program_counter = self.stack[self.stack_pointer];
                self.stack_pointer = (self.stack_pointer + CHIP8_STACK_SIZE - 1) % CHIP8_STACK_SIZE;
            }

            Opcode::Jump => self.program_counter = n,

            Opcode::Call => {
                if self.config.strict_stack && self.stack_pointer == CHIP8_STACK_SIZE - 1 {
                    return Err(Error::StackOverflow {
                        pc: self.program_counter,
                    });
                }
                self.stack_pointer = (self.stack_pointer + 1) % CHIP8_STACK_SIZE;
                self.stack[self.stack_pointer] = self.program_counter;
                self.program_counter = n;
            }

            Opcode::SkipEqImm => {
                if self.registers[x] == nn {
                    self.skip();
                }
            }

            Opcode::SkipNeImm => {
                if self.registers[x] != nn {
                    self.skip();
                }
            }

            Opcode::SkipEqReg => {
                if self.registers[x] == self.registers[y] {
                    self.skip();
                }
            }

            Opcode::LoadImm => self.registers[x] = nn,

            // no carry flag on the immediate add
            Opcode::AddImm => self.registers[x] = self.registers[x].wrapping_add(nn),

            Opcode::Move => self.registers[x] = self.registers[y],

            Opcode::Or => self.registers[x] |= self.registers[y],

            Opcode::And => self.registers[x] &= self.registers[y],

            Opcode::Xor => self.registers[x] ^= self.registers[y],

            Opcode::AddReg => {
                let sum = self.registers[x] as u16 + self.registers[y] as u16;
                self.registers[0xF] = (sum > 0xFF) as u8;
                self.registers[x] = sum as u8;
            }

            Opcode::Sub => {
                let not_borrow = self.registers[x] >= self.registers[y];
                self.registers[0xF] = not_borrow as u8;
                self.registers[x] = self.registers[x].wrapping_sub(self.registers[y]);
            }

            Opcode::ShiftRight => {
                let src = if self.config.shift_quirks { y } else { x };
                self.registers[0xF] = self.registers[src] & 0x01;
                self.registers[x] >>= 1;
            }

            Opcode::SubFrom => {
                let not_borrow = self.registers[y] >= self.registers[x];
                self.registers[0xF] = not_borrow as u8;
                self.registers[x] = self.registers[y].wrapping_sub(self.registers[x]);
            }

            Opcode::ShiftLeft => {
                let src = if self.config.shift_quirks { y } else { x };
                self.registers[0xF] = self.registers[src] >> 7;
                self.registers[x] <<= 1;
            }

            Opcode::SkipNeReg => {
                if self.registers[x] != self.registers[y] {
                    self.skip();
                }
            }

            Opcode::SetIndex => self.index = n,

            Opcode::JumpOffset => {
                self.program_counter = (n + self.registers[0] as u16) & CHIP8_PC_MASK;
            }

            Opcode::Random => self.registers[x] = self.rng.gen::<u8>() & nn,

            Opcode::Draw => {
                let (width, height) = self.display.resolution();
                let origin_x = self.registers[x] as usize;
                let origin_y = self.registers[y] as usize;
                let mut collision = false;
                for row in 0..n {
                    let sprite_byte = self.memory.read(self.index.wrapping_add(row));
                    for bit in 0..8usize {
                        if sprite_byte & (0x80 >> bit) != 0 {
                            let px = (origin_x + bit) % width;
                            let py = (origin_y + row as usize) % height;
                            collision |= self.display.toggle_pixel(px, py);
                        }
                    }
                }
                self.registers[0xF] = collision as u8;
                drew = true;
            }

            Opcode::SkipKeyPressed => {
                if self.input.pressed_key() == Some(self.registers[x]) {
                    self.skip();
                }
            }

            Opcode::SkipKeyNotPressed => {
                if self.input.pressed_key() != Some(self.registers[x]) {
                    self.skip();
                }
            }

            Opcode::ReadDeltaTimer => self.registers[x] = self.delta_timer,

            Opcode::WaitKey => match self.input.pressed_key() {
                Some(key) => self.registers[x] = key,
                None => {
                    // loop on this instruction until a key arrives: undo
                    // the advance so the next tick fetches it again
                    spin_sleep::sleep(CHIP8_WAIT_KEY_IDLE);
                    self.program_counter = self.program_counter.wrapping_sub(2) & CHIP8_PC_MASK;
                }
            },

            Opcode::SetDeltaTimer => self.delta_timer = self.registers[x],

            Opcode::SetSoundTimer => self.sound_timer = self.registers[x],

            Opcode::AddIndex => self.index = self.index.wrapping_add(self.registers[x] as u16),

            Opcode::GlyphAddress => self.index = Chip8MemoryMap::glyph_addr(self.registers[x]),

            Opcode::StoreBcd => {
                let value = self.registers[x];
                self.memory.write(self.index, value / 100);
                self.memory.write(self.index.wrapping_add(1), value / 10 % 10);
                self.memory.write(self.index.wrapping_add(2), value % 10);
            }

            Opcode::StoreRegisters => {
                for r in 0..=x {
                    self.memory
                        .write(self.index.wrapping_add(r as u16), self.registers[r]);
                }
                self.index = self.index.wrapping_add(x as u16 + 1);
            }

            Opcode::LoadRegisters => {
                for r in 0..=x {
                    self.registers[r] = self.memory.read(self.index.wrapping_add(r as u16));
                }
                self.index = self.index.wrapping_add(x as u16 + 1);
            }
        }

        Ok(drew)
    }
}
