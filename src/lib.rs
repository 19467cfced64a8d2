//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the machine core is the interpreter: fetch, decode, execute and timer
//!   update happen exactly once per `tick()`
//! * decoding is data-driven: every instruction family is a 4-hex-digit
//!   pattern ("1NNN", "8XY4", ...) compiled once into a bitmask catalog;
//!   when several patterns match an opcode the one with the most fixed
//!   bits wins, which is how 00E0 shadows the generic 0NNN
//! * the interpreter owns nothing peripheral: display, audio and input are
//!   traits so a variety of front ends can plug in; the bundled ones draw
//!   with TUI in-console, beep the pc speaker and read crossterm events
//! * timing is cooperative: the run loop executes a tick then sleeps to
//!   hold the configured frequency, and only the wait-for-keypress opcode
//!   can suspend across ticks (by re-executing itself)
//! * unknown opcodes, oversized programs and bad configuration surface as
//!   `error::Error` values for the host to handle, never a process exit
//! * quirk switches (shift source, strict stack bounds) live in an
//!   explicit `interpreter::Config` with documented defaults

pub mod disassembler;
pub mod display;
pub mod error;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod sound;
