//! The decoder: cursor state, section dispatch, and per-section readers.
mod custom;
mod instructions;
mod module;
mod sections;

use crate::error::{DecodeError, ErrorKind};
use crate::features::Features;
use crate::integer;
use crate::logging::LoggingSink;
use crate::opcode::{Opcode, RawOpcode};
use crate::sink::Sink;
use crate::types::{BinarySection, Type};
use std::io;

/// Options for a decode call.
pub struct DecodeOptions<'a> {
    /// Which binary-format extensions to accept.
    pub features: Features,

    /// Whether to decode `"name"` custom sections; when false they are
    /// skipped like any unknown custom section.
    pub read_debug_names: bool,

    /// When set, a [`LoggingSink`] is interposed between the decoder and
    /// the caller's sink, printing one trace line per event to this stream.
    pub log_stream: Option<&'a mut dyn io::Write>,
}

impl Default for DecodeOptions<'_> {
    fn default() -> Self {
        DecodeOptions {
            features: Features::default(),
            read_debug_names: false,
            log_stream: None,
        }
    }
}

/// Decodes the module in `data`, driving `sink` through one event per
/// structural element.
///
/// The input must be a complete binary module; `data` is never mutated and
/// string or byte events borrow from it. Returns the first error
/// encountered, positioned at the byte offset where it was detected.
pub fn decode<S: Sink + ?Sized>(
    data: &[u8],
    sink: &mut S,
    mut options: DecodeOptions<'_>,
) -> Result<(), DecodeError> {
    match options.log_stream.take() {
        Some(stream) => {
            let mut logging = LoggingSink::new(stream, sink);
            Decoder::new(data, &mut logging, &options).read_module()
        }
        None => Decoder::new(data, sink, &options).read_module(),
    }
}

/// Reports a sink callback failure as a decode error, naming the callback.
macro_rules! callback {
    ($self:ident, $method:ident $(, $arg:expr)* $(,)?) => {
        if $self.sink.$method($($arg),*).is_err() {
            return Err($self.fail(crate::error::ErrorKind::Callback(stringify!($method))));
        }
    };
}
pub(crate) use callback;

/// Transient decoder state; lives for one [`decode`] call.
pub(crate) struct Decoder<'a, 'd, S: Sink + ?Sized> {
    data: &'a [u8],
    /// Next unread byte; never exceeds `read_end`.
    offset: usize,
    /// Cap of the current window: the input size outside sections, the
    /// section end inside one, the subsection end inside a name or linking
    /// subsection.
    read_end: usize,
    sink: &'d mut S,
    features: Features,
    read_debug_names: bool,
    last_known_section: Option<BinarySection>,

    // Entity counters, each set once by its defining section so later
    // sections can bounds-check indices against the totals.
    num_signatures: u32,
    num_imports: u32,
    num_func_imports: u32,
    num_table_imports: u32,
    num_memory_imports: u32,
    num_global_imports: u32,
    num_exception_imports: u32,
    num_function_signatures: u32,
    num_tables: u32,
    num_memories: u32,
    num_globals: u32,
    num_exports: u32,
    num_function_bodies: u32,
    num_exceptions: u32,

    // Scratch buffers reused across entries.
    param_types: Vec<Type>,
    target_depths: Vec<u32>,
}

impl<'a, 'd, S: Sink + ?Sized> Decoder<'a, 'd, S> {
    pub(crate) fn new(data: &'a [u8], sink: &'d mut S, options: &DecodeOptions<'_>) -> Self {
        Decoder {
            data,
            offset: 0,
            read_end: data.len(),
            sink,
            features: options.features,
            read_debug_names: options.read_debug_names,
            last_known_section: None,
            num_signatures: 0,
            num_imports: 0,
            num_func_imports: 0,
            num_table_imports: 0,
            num_memory_imports: 0,
            num_global_imports: 0,
            num_exception_imports: 0,
            num_function_signatures: 0,
            num_tables: 0,
            num_memories: 0,
            num_globals: 0,
            num_exports: 0,
            num_function_bodies: 0,
            num_exceptions: 0,
            param_types: Vec::new(),
            target_depths: Vec::new(),
        }
    }

    /// Builds the error for `kind` at the current offset, first offering
    /// the message to the sink.
    pub(crate) fn fail(&mut self, kind: ErrorKind) -> DecodeError {
        self.fail_at(self.offset, kind)
    }

    pub(crate) fn fail_at(&mut self, offset: usize, kind: ErrorKind) -> DecodeError {
        let message = kind.to_string();
        if !self.sink.on_error(offset, &message) {
            // Not great to just print, but we don't want to eat the error
            // either.
            eprintln!("*ERROR*: @{offset:#010x}: {message}");
        }
        DecodeError { offset, kind }
    }

    fn window(&self) -> &'a [u8] {
        &self.data[self.offset..self.read_end]
    }

    pub(crate) fn read_u8(&mut self, desc: &'static str) -> Result<u8, DecodeError> {
        if self.offset + 1 > self.read_end {
            return Err(self.fail(ErrorKind::ReadFixed { ty: "u8", desc }));
        }
        let value = self.data[self.offset];
        self.offset += 1;
        Ok(value)
    }

    pub(crate) fn read_u32(&mut self, desc: &'static str) -> Result<u32, DecodeError> {
        match self.window().first_chunk::<4>() {
            Some(bytes) => {
                self.offset += 4;
                Ok(u32::from_le_bytes(*bytes))
            }
            None => Err(self.fail(ErrorKind::ReadFixed { ty: "u32", desc })),
        }
    }

    pub(crate) fn read_f32_bits(&mut self, desc: &'static str) -> Result<u32, DecodeError> {
        match self.window().first_chunk::<4>() {
            Some(bytes) => {
                self.offset += 4;
                Ok(u32::from_le_bytes(*bytes))
            }
            None => Err(self.fail(ErrorKind::ReadFixed { ty: "f32", desc })),
        }
    }

    pub(crate) fn read_f64_bits(&mut self, desc: &'static str) -> Result<u64, DecodeError> {
        match self.window().first_chunk::<8>() {
            Some(bytes) => {
                self.offset += 8;
                Ok(u64::from_le_bytes(*bytes))
            }
            None => Err(self.fail(ErrorKind::ReadFixed { ty: "f64", desc })),
        }
    }

    pub(crate) fn read_u32_leb128(&mut self, desc: &'static str) -> Result<u32, DecodeError> {
        match integer::read_u32_leb128(self.window()) {
            Some((value, bytes_read)) => {
                self.offset += bytes_read;
                Ok(value)
            }
            None => Err(self.fail(ErrorKind::ReadU32Leb128(desc))),
        }
    }

    pub(crate) fn read_i32_leb128(&mut self, desc: &'static str) -> Result<i32, DecodeError> {
        match integer::read_i32_leb128(self.window()) {
            Some((value, bytes_read)) => {
                self.offset += bytes_read;
                Ok(value)
            }
            None => Err(self.fail(ErrorKind::ReadI32Leb128(desc))),
        }
    }

    pub(crate) fn read_i64_leb128(&mut self, desc: &'static str) -> Result<i64, DecodeError> {
        match integer::read_i64_leb128(self.window()) {
            Ok((value, bytes_read)) => {
                self.offset += bytes_read;
                Ok(value)
            }
            Err(integer::I64LebError::InvalidSignExtension) => {
                Err(self.fail(ErrorKind::InvalidI64Leb128(desc)))
            }
            Err(integer::I64LebError::PastEnd) => Err(self.fail(ErrorKind::ReadI64Leb128(desc))),
        }
    }

    /// A u32 LEB128 used as an index into one of the module's index spaces.
    pub(crate) fn read_index(&mut self, desc: &'static str) -> Result<u32, DecodeError> {
        self.read_u32_leb128(desc)
    }

    /// A u32 LEB128 used as a byte offset or size.
    pub(crate) fn read_offset(&mut self, desc: &'static str) -> Result<usize, DecodeError> {
        Ok(self.read_u32_leb128(desc)? as usize)
    }

    /// A length-prefixed UTF-8 string, borrowed from the input.
    pub(crate) fn read_str(&mut self, desc: &'static str) -> Result<&'a str, DecodeError> {
        let len = self.read_u32_leb128("string length")? as usize;
        if self.offset + len > self.read_end {
            return Err(self.fail(ErrorKind::ReadString(desc)));
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s),
            Err(_) => Err(self.fail(ErrorKind::InvalidUtf8(desc))),
        }
    }

    /// A length-prefixed byte range, borrowed from the input.
    pub(crate) fn read_bytes(&mut self, desc: &'static str) -> Result<&'a [u8], DecodeError> {
        let len = self.read_u32_leb128("data size")? as usize;
        if self.offset + len > self.read_end {
            return Err(self.fail(ErrorKind::ReadData(desc)));
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    /// A type tag: a signed LEB128 constrained to the single-byte value
    /// range `[-128, 127)`, reinterpreted through the marker table.
    pub(crate) fn read_type(&mut self, desc: &'static str) -> Result<Type, DecodeError> {
        let code = self.read_i32_leb128(desc)?;
        if !(-128..127).contains(&code) {
            return Err(self.fail(ErrorKind::InvalidType(code)));
        }
        match Type::from_code(code) {
            Some(ty) => Ok(ty),
            None => Err(self.fail(ErrorKind::InvalidType(code))),
        }
    }

    /// One opcode: a byte, or a prefix byte followed by a u32 LEB128 code.
    ///
    /// An unknown encoding is not an error here; the caller decides between
    /// "unexpected opcode" and "unexpected opcode in initializer
    /// expression".
    pub(crate) fn read_opcode(
        &mut self,
        desc: &'static str,
    ) -> Result<(Option<Opcode>, RawOpcode), DecodeError> {
        let byte = self.read_u8(desc)?;
        if Opcode::is_prefix_byte(byte) {
            let code = self.read_u32_leb128(desc)?;
            Ok((
                Opcode::from_prefixed(byte, code),
                RawOpcode {
                    prefix: Some(byte),
                    code,
                },
            ))
        } else {
            Ok((
                Opcode::from_code(byte),
                RawOpcode {
                    prefix: None,
                    code: byte.into(),
                },
            ))
        }
    }

    pub(crate) fn num_total_funcs(&self) -> u32 {
        self.num_func_imports + self.num_function_signatures
    }

    pub(crate) fn num_total_tables(&self) -> u32 {
        self.num_table_imports + self.num_tables
    }

    pub(crate) fn num_total_memories(&self) -> u32 {
        self.num_memory_imports + self.num_memories
    }

    pub(crate) fn num_total_globals(&self) -> u32 {
        self.num_global_imports + self.num_globals
    }
}
