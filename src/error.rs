//! Decode failures, each carrying the byte offset where it was detected.
use crate::opcode::RawOpcode;
use crate::types::{BinarySection, Type};
use thiserror::Error;

/// The error returned by a failed decode call.
///
/// Every failure is terminal. Before this value is returned, the formatted
/// message has already been offered to the sink's `on_error` callback.
#[derive(Debug, Error)]
#[error("@{offset:#010x}: {kind}")]
pub struct DecodeError {
    /// Byte offset into the input at which the problem was detected.
    pub offset: usize,
    pub kind: ErrorKind,
}

/// Everything that can go wrong while decoding a module.
#[derive(Debug, Error, PartialEq)]
pub enum ErrorKind {
    // Primitive reads.
    #[error("unable to read {ty}: {desc}")]
    ReadFixed { ty: &'static str, desc: &'static str },

    #[error("unable to read u32 leb128: {0}")]
    ReadU32Leb128(&'static str),

    #[error("unable to read i32 leb128: {0}")]
    ReadI32Leb128(&'static str),

    #[error("unable to read i64 leb128: {0}")]
    ReadI64Leb128(&'static str),

    #[error("invalid i64 leb128: {0}")]
    InvalidI64Leb128(&'static str),

    #[error("unable to read string: {0}")]
    ReadString(&'static str),

    #[error("unable to read data: {0}")]
    ReadData(&'static str),

    #[error("invalid utf-8 encoding: {0}")]
    InvalidUtf8(&'static str),

    #[error("invalid type: {0}")]
    InvalidType(i32),

    // Module header and section framing.
    #[error("bad magic value")]
    BadMagic,

    #[error("bad wasm file version: {actual:#x} (expected {expected:#x})")]
    BadVersion { actual: u32, expected: u32 },

    #[error("invalid section code: {0}; max is {max}", max = BinarySection::COUNT - 1)]
    InvalidSectionCode(u32),

    #[error("invalid section size: extends past end")]
    SectionExtendsPastEnd,

    #[error("section {0} out of order")]
    SectionOutOfOrder(BinarySection),

    #[error("unfinished section (expected end: {expected_end:#x})")]
    UnfinishedSection { expected_end: usize },

    // Type section.
    #[error("unexpected type form: {0}")]
    UnexpectedTypeForm(Type),

    #[error("expected valid param type (got {0})")]
    InvalidParamType(Type),

    #[error("result count must be 0 or 1")]
    InvalidResultCount,

    #[error("expected valid result type: {0}")]
    InvalidResultType(Type),

    // Imports and the shared table/memory/global/exception readers.
    #[error("invalid import signature index")]
    InvalidImportSignatureIndex,

    #[error("invalid import kind: {0}")]
    InvalidImportKind(u32),

    #[error("invalid import exception kind: exceptions not allowed")]
    ImportExceptionsDisabled,

    #[error("table elem type must be anyfunc")]
    TableElemTypeNotAnyfunc,

    #[error("table initial elem count must be <= max elem count")]
    TableInitialPastMax,

    #[error("invalid memory initial size")]
    InvalidMemoryInitialSize,

    #[error("invalid memory max size")]
    InvalidMemoryMaxSize,

    #[error("memory initial size must be <= max size")]
    MemoryInitialPastMax,

    #[error("invalid global type: {0}")]
    InvalidGlobalType(Type),

    #[error("global mutability must be 0 or 1")]
    InvalidGlobalMutability,

    #[error("expected valid exception value type (got {0})")]
    InvalidExceptionValueType(Type),

    // Function, table, memory, export, start sections.
    #[error("invalid function signature index: {0}")]
    InvalidFunctionSignatureIndex(u32),

    #[error("table count ({0}) must be 0 or 1")]
    InvalidTableCount(u32),

    #[error("memory count must be 0 or 1")]
    InvalidMemoryCount(u32),

    #[error("invalid export external kind: {0}")]
    InvalidExportExternalKind(u8),

    #[error("invalid export {kind} index: {index}")]
    InvalidExportIndex { kind: &'static str, index: u32 },

    #[error("invalid export exception kind: exceptions not allowed")]
    ExportExceptionsDisabled,

    #[error("invalid start function index: {0}")]
    InvalidStartFunctionIndex(u32),

    // Element, code, data sections.
    #[error("elem section without table section")]
    ElemSectionWithoutTable,

    #[error("function signature count != function body count")]
    FunctionCountMismatch,

    #[error("expected valid local type")]
    InvalidLocalType(Type),

    #[error("function body longer than given size")]
    FunctionBodyPastEnd,

    #[error("function body must end with END opcode")]
    FunctionBodyNoEnd,

    #[error("data section without memory section")]
    DataSectionWithoutMemory,

    // Instructions.
    #[error("unexpected opcode: {0}")]
    UnexpectedOpcode(RawOpcode),

    #[error("unexpected opcode in initializer expression: {0}")]
    UnexpectedOpcodeInInitExpr(RawOpcode),

    #[error("expected END opcode after initializer expression")]
    ExpectedEndAfterInitExpr,

    #[error("expected valid block signature type")]
    InvalidBlockSignature(Type),

    #[error("invalid call function index: {0}")]
    InvalidCallFunctionIndex(u32),

    #[error("invalid call_indirect signature index")]
    InvalidCallIndirectSignatureIndex,

    #[error("call_indirect reserved value must be 0")]
    CallIndirectReservedNonzero,

    #[error("current_memory reserved value must be 0")]
    CurrentMemoryReservedNonzero,

    #[error("grow_memory reserved value must be 0")]
    GrowMemoryReservedNonzero,

    // Custom sections: names, reloc, linking.
    #[error("duplicate sub-section")]
    DuplicateSubSection,

    #[error("out-of-order sub-section")]
    OutOfOrderSubSection,

    #[error("invalid sub-section size: extends past end")]
    SubSectionExtendsPastEnd,

    #[error("unfinished sub-section (expected end: {expected_end:#x})")]
    UnfinishedSubSection { expected_end: usize },

    #[error("duplicate function name: {0}")]
    DuplicateFunctionName(u32),

    #[error("function index out of order: {0}")]
    FunctionNameIndexOutOfOrder(u32),

    #[error("invalid function index: {0}")]
    InvalidFunctionIndex(u32),

    #[error("locals function index out of order: {0}")]
    LocalsFunctionIndexOutOfOrder(u32),

    #[error("duplicate local index: {0}")]
    DuplicateLocalIndex(u32),

    #[error("local index out of order: {0}")]
    LocalIndexOutOfOrder(u32),

    #[error("invalid reloc type: {0}")]
    InvalidRelocType(u32),

    // Sink aborts.
    #[error("{0} callback failed")]
    Callback(&'static str),
}
