use std::error::Error;
use std::fs;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use log::debug;

use ocho::display::{MonoTermDisplay, CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH};
use ocho::input::TermInput;
use ocho::interpreter::{Chip8Interpreter, Config, Observer, Snapshot};
use ocho::sound::{Audio, Mute, SimpleBeep};

/// A CHIP-8 virtual machine in the terminal.
///
/// Loads a raw big-endian CHIP-8 instruction stream and runs it at the
/// configured clock frequency. Keys map to the left-hand side of a qwerty
/// keyboard; press escape to quit.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The ROM file to run
    rom: PathBuf,

    /// Clock frequency in instructions per second
    #[arg(short, long, default_value_t = 300)]
    frequency: u32,

    /// Take the shift opcodes' source bit from Vy instead of Vx
    #[arg(long)]
    shift_quirks: bool,

    /// Error on call-stack overflow/underflow instead of wrapping
    #[arg(long)]
    strict_stack: bool,

    /// Disable sound
    #[arg(short, long)]
    mute: bool,

    /// Log a machine-state line before every instruction (RUST_LOG=debug)
    #[arg(short, long)]
    trace: bool,
}

/// Logs pc, sp, index, opcode and the register file ahead of each tick.
struct TraceObserver;

impl Observer for TraceObserver {
    fn before_tick(&mut self, s: &Snapshot) {
        debug!(
            "pc={:03x} sp={:x} i={:03x} opcode={:04x} ({:?}) dt={:02x} st={:02x} v={:02x?}",
            s.program_counter,
            s.stack_pointer,
            s.index,
            s.opcode,
            s.pattern,
            s.delta_timer,
            s.sound_timer,
            s.registers,
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let rom = fs::read(&args.rom)?;

    let mut display = MonoTermDisplay::new(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT)?;
    let mut input = TermInput::new()?;
    let mut beeper = SimpleBeep::new();
    let mut muted = Mute::new();
    let audio: &mut dyn Audio = if args.mute { &mut muted } else { &mut beeper };
    let mut tracer = TraceObserver;

    let config = Config {
        frequency: args.frequency,
        shift_quirks: args.shift_quirks,
        strict_stack: args.strict_stack,
    };
    let mut interpreter = Chip8Interpreter::new(&mut display, audio, &mut input, config)?;
    if args.trace {
        interpreter.set_observer(&mut tracer);
    }
    interpreter.load_program(&rom)?;

    match interpreter.run() {
        // escape quits the run loop via an interrupted poll
        Err(ocho::error::Error::Io(e)) if e.kind() == io::ErrorKind::Interrupted => Ok(()),
        other => other.map_err(Into::into),
    }
}
