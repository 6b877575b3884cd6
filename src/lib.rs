//! A streaming, event-driven decoder for WebAssembly modules in the binary
//! format.
//!
//! The decoder walks an in-memory module and drives a [`Sink`] through one
//! event per structural element it finds: sections, types, imports,
//! instructions, data segments, name entries, relocations. Nothing is
//! retained; string and byte events borrow from the caller's buffer.
//!
//! The main entry point is the [`decode()`] function:
//!
//! ```
//! use wasink::{DecodeOptions, NopSink, decode};
//!
//! // The eight-byte preamble is the smallest valid module.
//! let module = [0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];
//! decode(&module, &mut NopSink, DecodeOptions::default()).unwrap();
//! ```
#![forbid(unsafe_code)]

mod decode;
mod error;
mod features;
pub mod integer;
mod logging;
mod opcode;
mod sink;
mod types;

pub use decode::{DecodeOptions, decode};
pub use error::{DecodeError, ErrorKind};
pub use features::Features;
pub use logging::LoggingSink;
pub use opcode::{Opcode, RawOpcode};
pub use sink::{NopSink, Sink, SinkError, SinkResult};
pub use types::{BinarySection, ExternalKind, Limits, MAX_PAGES, RelocType, Type};
