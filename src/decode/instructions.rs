//! The function-body instruction decoder.
//!
//! One loop over the body window: read an opcode, read the immediates its
//! shape dictates, emit the matching events. The terminating `end` must
//! land exactly on the window boundary.
use crate::decode::{Decoder, callback};
use crate::error::{DecodeError, ErrorKind};
use crate::opcode::Opcode;
use crate::sink::Sink;
use crate::types::Type;

impl<S: Sink + ?Sized> Decoder<'_, '_, S> {
    /// Reads an inline block signature: a concrete value type, or `Void`
    /// reported as `None`.
    fn read_block_sig(&mut self, desc: &'static str) -> Result<Option<Type>, DecodeError> {
        let sig_type = self.read_type(desc)?;
        if !sig_type.is_inline_sig() {
            return Err(self.fail(ErrorKind::InvalidBlockSignature(sig_type)));
        }
        Ok(match sig_type {
            Type::Void => None,
            ty => Some(ty),
        })
    }

    pub(crate) fn read_function_body(&mut self, end_offset: usize) -> Result<(), DecodeError> {
        let mut seen_end_opcode = false;
        while self.offset < end_offset {
            let (opcode, raw) = self.read_opcode("opcode")?;
            let Some(opcode) = opcode else {
                return Err(self.fail(ErrorKind::UnexpectedOpcode(raw)));
            };
            callback!(self, on_opcode, opcode);
            if !opcode.is_enabled(&self.features) {
                return Err(self.fail(ErrorKind::UnexpectedOpcode(raw)));
            }

            match opcode {
                Opcode::Unreachable => {
                    callback!(self, on_unreachable);
                    callback!(self, on_opcode_bare);
                }

                Opcode::Block => {
                    let sig = self.read_block_sig("block signature type")?;
                    callback!(self, on_block, sig);
                    callback!(self, on_opcode_block_sig, sig);
                }

                Opcode::Loop => {
                    let sig = self.read_block_sig("loop signature type")?;
                    callback!(self, on_loop, sig);
                    callback!(self, on_opcode_block_sig, sig);
                }

                Opcode::If => {
                    let sig = self.read_block_sig("if signature type")?;
                    callback!(self, on_if, sig);
                    callback!(self, on_opcode_block_sig, sig);
                }

                Opcode::Else => {
                    callback!(self, on_else);
                    callback!(self, on_opcode_bare);
                }

                Opcode::Select => {
                    callback!(self, on_select);
                    callback!(self, on_opcode_bare);
                }

                Opcode::Br => {
                    let depth = self.read_index("br depth")?;
                    callback!(self, on_br, depth);
                    callback!(self, on_opcode_index, depth);
                }

                Opcode::BrIf => {
                    let depth = self.read_index("br_if depth")?;
                    callback!(self, on_br_if, depth);
                    callback!(self, on_opcode_index, depth);
                }

                Opcode::BrTable => {
                    let num_targets = self.read_index("br_table target count")?;
                    self.target_depths.clear();
                    for _ in 0..num_targets {
                        let depth = self.read_index("br_table target depth")?;
                        self.target_depths.push(depth);
                    }
                    let default_target_depth =
                        self.read_index("br_table default target depth")?;
                    callback!(self, on_br_table, &self.target_depths, default_target_depth);
                }

                Opcode::Return => {
                    callback!(self, on_return);
                    callback!(self, on_opcode_bare);
                }

                Opcode::Nop => {
                    callback!(self, on_nop);
                    callback!(self, on_opcode_bare);
                }

                Opcode::Drop => {
                    callback!(self, on_drop);
                    callback!(self, on_opcode_bare);
                }

                Opcode::End => {
                    if self.offset == end_offset {
                        seen_end_opcode = true;
                        callback!(self, on_end_func);
                    } else {
                        callback!(self, on_end_expr);
                    }
                }

                Opcode::I32Const => {
                    let value = self.read_i32_leb128("i32.const value")?;
                    callback!(self, on_i32_const, value);
                    callback!(self, on_opcode_u32, value as u32);
                }

                Opcode::I64Const => {
                    let value = self.read_i64_leb128("i64.const value")?;
                    callback!(self, on_i64_const, value);
                    callback!(self, on_opcode_u64, value as u64);
                }

                Opcode::F32Const => {
                    let value_bits = self.read_f32_bits("f32.const value")?;
                    callback!(self, on_f32_const, value_bits);
                    callback!(self, on_opcode_f32, value_bits);
                }

                Opcode::F64Const => {
                    let value_bits = self.read_f64_bits("f64.const value")?;
                    callback!(self, on_f64_const, value_bits);
                    callback!(self, on_opcode_f64, value_bits);
                }

                Opcode::GetGlobal => {
                    let global_index = self.read_index("get_global global index")?;
                    callback!(self, on_get_global, global_index);
                    callback!(self, on_opcode_index, global_index);
                }

                Opcode::GetLocal => {
                    let local_index = self.read_index("get_local local index")?;
                    callback!(self, on_get_local, local_index);
                    callback!(self, on_opcode_index, local_index);
                }

                Opcode::SetGlobal => {
                    let global_index = self.read_index("set_global global index")?;
                    callback!(self, on_set_global, global_index);
                    callback!(self, on_opcode_index, global_index);
                }

                Opcode::SetLocal => {
                    let local_index = self.read_index("set_local local index")?;
                    callback!(self, on_set_local, local_index);
                    callback!(self, on_opcode_index, local_index);
                }

                Opcode::TeeLocal => {
                    let local_index = self.read_index("tee_local local index")?;
                    callback!(self, on_tee_local, local_index);
                    callback!(self, on_opcode_index, local_index);
                }

                Opcode::Call => {
                    let func_index = self.read_index("call function index")?;
                    if func_index >= self.num_total_funcs() {
                        return Err(self.fail(ErrorKind::InvalidCallFunctionIndex(func_index)));
                    }
                    callback!(self, on_call, func_index);
                    callback!(self, on_opcode_index, func_index);
                }

                Opcode::CallIndirect => {
                    let sig_index = self.read_index("call_indirect signature index")?;
                    if sig_index >= self.num_signatures {
                        return Err(self.fail(ErrorKind::InvalidCallIndirectSignatureIndex));
                    }
                    let reserved = self.read_u32_leb128("call_indirect reserved")?;
                    if reserved != 0 {
                        return Err(self.fail(ErrorKind::CallIndirectReservedNonzero));
                    }
                    callback!(self, on_call_indirect, sig_index);
                    callback!(self, on_opcode_u32_u32, sig_index, reserved);
                }

                Opcode::I32Load8S
                | Opcode::I32Load8U
                | Opcode::I32Load16S
                | Opcode::I32Load16U
                | Opcode::I64Load8S
                | Opcode::I64Load8U
                | Opcode::I64Load16S
                | Opcode::I64Load16U
                | Opcode::I64Load32S
                | Opcode::I64Load32U
                | Opcode::I32Load
                | Opcode::I64Load
                | Opcode::F32Load
                | Opcode::F64Load => {
                    let alignment_log2 = self.read_u32_leb128("load alignment")?;
                    let offset = self.read_u32_leb128("load offset")?;
                    callback!(self, on_load, opcode, alignment_log2, offset);
                    callback!(self, on_opcode_u32_u32, alignment_log2, offset);
                }

                Opcode::I32Store8
                | Opcode::I32Store16
                | Opcode::I64Store8
                | Opcode::I64Store16
                | Opcode::I64Store32
                | Opcode::I32Store
                | Opcode::I64Store
                | Opcode::F32Store
                | Opcode::F64Store => {
                    let alignment_log2 = self.read_u32_leb128("store alignment")?;
                    let offset = self.read_u32_leb128("store offset")?;
                    callback!(self, on_store, opcode, alignment_log2, offset);
                    callback!(self, on_opcode_u32_u32, alignment_log2, offset);
                }

                Opcode::CurrentMemory => {
                    let reserved = self.read_u32_leb128("current_memory reserved")?;
                    if reserved != 0 {
                        return Err(self.fail(ErrorKind::CurrentMemoryReservedNonzero));
                    }
                    callback!(self, on_current_memory);
                    callback!(self, on_opcode_u32, reserved);
                }

                Opcode::GrowMemory => {
                    let reserved = self.read_u32_leb128("grow_memory reserved")?;
                    if reserved != 0 {
                        return Err(self.fail(ErrorKind::GrowMemoryReservedNonzero));
                    }
                    callback!(self, on_grow_memory);
                    callback!(self, on_opcode_u32, reserved);
                }

                Opcode::I32Add
                | Opcode::I32Sub
                | Opcode::I32Mul
                | Opcode::I32DivS
                | Opcode::I32DivU
                | Opcode::I32RemS
                | Opcode::I32RemU
                | Opcode::I32And
                | Opcode::I32Or
                | Opcode::I32Xor
                | Opcode::I32Shl
                | Opcode::I32ShrU
                | Opcode::I32ShrS
                | Opcode::I32Rotr
                | Opcode::I32Rotl
                | Opcode::I64Add
                | Opcode::I64Sub
                | Opcode::I64Mul
                | Opcode::I64DivS
                | Opcode::I64DivU
                | Opcode::I64RemS
                | Opcode::I64RemU
                | Opcode::I64And
                | Opcode::I64Or
                | Opcode::I64Xor
                | Opcode::I64Shl
                | Opcode::I64ShrU
                | Opcode::I64ShrS
                | Opcode::I64Rotr
                | Opcode::I64Rotl
                | Opcode::F32Add
                | Opcode::F32Sub
                | Opcode::F32Mul
                | Opcode::F32Div
                | Opcode::F32Min
                | Opcode::F32Max
                | Opcode::F32Copysign
                | Opcode::F64Add
                | Opcode::F64Sub
                | Opcode::F64Mul
                | Opcode::F64Div
                | Opcode::F64Min
                | Opcode::F64Max
                | Opcode::F64Copysign => {
                    callback!(self, on_binary, opcode);
                    callback!(self, on_opcode_bare);
                }

                Opcode::I32Eq
                | Opcode::I32Ne
                | Opcode::I32LtS
                | Opcode::I32LeS
                | Opcode::I32LtU
                | Opcode::I32LeU
                | Opcode::I32GtS
                | Opcode::I32GeS
                | Opcode::I32GtU
                | Opcode::I32GeU
                | Opcode::I64Eq
                | Opcode::I64Ne
                | Opcode::I64LtS
                | Opcode::I64LeS
                | Opcode::I64LtU
                | Opcode::I64LeU
                | Opcode::I64GtS
                | Opcode::I64GeS
                | Opcode::I64GtU
                | Opcode::I64GeU
                | Opcode::F32Eq
                | Opcode::F32Ne
                | Opcode::F32Lt
                | Opcode::F32Le
                | Opcode::F32Gt
                | Opcode::F32Ge
                | Opcode::F64Eq
                | Opcode::F64Ne
                | Opcode::F64Lt
                | Opcode::F64Le
                | Opcode::F64Gt
                | Opcode::F64Ge => {
                    callback!(self, on_compare, opcode);
                    callback!(self, on_opcode_bare);
                }

                Opcode::I32Clz
                | Opcode::I32Ctz
                | Opcode::I32Popcnt
                | Opcode::I64Clz
                | Opcode::I64Ctz
                | Opcode::I64Popcnt
                | Opcode::F32Abs
                | Opcode::F32Neg
                | Opcode::F32Ceil
                | Opcode::F32Floor
                | Opcode::F32Trunc
                | Opcode::F32Nearest
                | Opcode::F32Sqrt
                | Opcode::F64Abs
                | Opcode::F64Neg
                | Opcode::F64Ceil
                | Opcode::F64Floor
                | Opcode::F64Trunc
                | Opcode::F64Nearest
                | Opcode::F64Sqrt => {
                    callback!(self, on_unary, opcode);
                    callback!(self, on_opcode_bare);
                }

                Opcode::I32TruncSF32
                | Opcode::I32TruncSF64
                | Opcode::I32TruncUF32
                | Opcode::I32TruncUF64
                | Opcode::I32WrapI64
                | Opcode::I64TruncSF32
                | Opcode::I64TruncSF64
                | Opcode::I64TruncUF32
                | Opcode::I64TruncUF64
                | Opcode::I64ExtendSI32
                | Opcode::I64ExtendUI32
                | Opcode::F32ConvertSI32
                | Opcode::F32ConvertUI32
                | Opcode::F32ConvertSI64
                | Opcode::F32ConvertUI64
                | Opcode::F32DemoteF64
                | Opcode::F32ReinterpretI32
                | Opcode::F64ConvertSI32
                | Opcode::F64ConvertUI32
                | Opcode::F64ConvertSI64
                | Opcode::F64ConvertUI64
                | Opcode::F64PromoteF32
                | Opcode::F64ReinterpretI64
                | Opcode::I32ReinterpretF32
                | Opcode::I64ReinterpretF64
                | Opcode::I32Eqz
                | Opcode::I64Eqz => {
                    callback!(self, on_convert, opcode);
                    callback!(self, on_opcode_bare);
                }

                Opcode::Try => {
                    let sig = self.read_block_sig("try signature type")?;
                    callback!(self, on_try, sig);
                    callback!(self, on_opcode_block_sig, sig);
                }

                Opcode::Catch => {
                    let except_index = self.read_index("exception index")?;
                    callback!(self, on_catch, except_index);
                    callback!(self, on_opcode_index, except_index);
                }

                Opcode::CatchAll => {
                    callback!(self, on_catch_all);
                    callback!(self, on_opcode_bare);
                }

                Opcode::Rethrow => {
                    let depth = self.read_index("catch depth")?;
                    callback!(self, on_rethrow, depth);
                    callback!(self, on_opcode_index, depth);
                }

                Opcode::Throw => {
                    let except_index = self.read_index("exception index")?;
                    callback!(self, on_throw, except_index);
                    callback!(self, on_opcode_index, except_index);
                }

                Opcode::I32TruncSSatF32
                | Opcode::I32TruncUSatF32
                | Opcode::I32TruncSSatF64
                | Opcode::I32TruncUSatF64
                | Opcode::I64TruncSSatF32
                | Opcode::I64TruncUSatF32
                | Opcode::I64TruncSSatF64
                | Opcode::I64TruncUSatF64 => {
                    callback!(self, on_convert, opcode);
                    callback!(self, on_opcode_bare);
                }
            }
        }
        if self.offset != end_offset {
            return Err(self.fail(ErrorKind::FunctionBodyPastEnd));
        }
        if !seen_end_opcode {
            return Err(self.fail(ErrorKind::FunctionBodyNoEnd));
        }
        Ok(())
    }
}
