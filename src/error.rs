use std::io;

/// Everything that can go wrong inside the machine.
///
/// Decode failures are surfaced to the caller rather than aborting the
/// process, so a host can choose to halt, skip or report when it runs a
/// malformed program.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The fetched instruction matched no catalog entry.
    #[error("opcode {opcode:#06x} could not be disassembled")]
    Decode { opcode: u16 },

    /// Rejected at construction: the clock frequency must be positive.
    #[error("clock frequency must be greater than zero")]
    InvalidConfig { frequency: u32 },

    /// The ROM does not fit between the program origin and the end of RAM.
    #[error("program is {len} bytes but only {capacity} bytes of RAM are available")]
    ProgramTooLarge { len: usize, capacity: usize },

    /// A call was made with the stack already full (strict stack mode only).
    #[error("call stack overflow at pc {pc:#05x}")]
    StackOverflow { pc: u16 },

    /// A return was executed with an empty stack (strict stack mode only).
    #[error("call stack underflow at pc {pc:#05x}")]
    StackUnderflow { pc: u16 },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("audio device failure: {0}")]
    Audio(Box<dyn std::error::Error>),
}
