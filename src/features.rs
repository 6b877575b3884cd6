//! Optional binary-format extensions the decoder can be asked to accept.

/// The set of post-MVP extensions enabled for a decode call.
///
/// Everything defaults to off; a module using a disabled extension fails
/// with an "unexpected opcode" or kind error at the offending byte.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    /// Exception handling: the `try`/`catch`/`catch_all`/`throw`/`rethrow`
    /// opcodes, exception imports and exports, and the `exception` custom
    /// section.
    pub exceptions: bool,

    /// The saturating float-to-int conversions behind the 0xFC opcode
    /// prefix (`i32.trunc_s:sat/f32` and friends).
    pub saturating_float_to_int: bool,
}
