//! Error types for the Sensible Soccer ROM team-data codec.
//!
//! This module defines the codec's failure taxonomy:
//! structural errors raised by the locator/walker/builder (fatal to the
//! enclosing operation), content errors raised by the attribute/text
//! validators (collected by `validate`, fatal to `update`), and soft
//! warnings that never fail an operation.

use thiserror::Error;

/// The error type for all ROM codec operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RomError {
    /// The locator could not find a valid pointer table / region layout
    /// anywhere in the ROM image.
    #[error("ROM structure not recognised: no valid team pointer table found")]
    RomStructureUnrecognised,

    /// A block's size prefix fell outside the valid 160..=500 range.
    #[error("bad block size {size} at offset 0x{offset:06X}")]
    BadBlockSize {
        /// Byte offset of the offending block.
        offset: usize,
        /// The size word that was read.
        size: u16,
    },

    /// Chain-walking a region did not land exactly on the region's end.
    #[error(
        "chain walk for region starting at 0x{start:06X} ended at 0x{actual_end:06X}, expected 0x{expected_end:06X}"
    )]
    ChainUnterminated {
        /// Start offset of the region being walked.
        start: usize,
        /// Offset where the walk actually stopped.
        actual_end: usize,
        /// Offset the walk was required to land on.
        expected_end: usize,
    },

    /// The encoded team data does not fit in the space available before
    /// the next non-zero word in the ROM.
    #[error("new team data overflows available space: need {need} bytes, have {have} bytes")]
    Overflow {
        /// Bytes required by the newly encoded regions.
        need: usize,
        /// Bytes available before the next occupied data.
        have: usize,
    },

    /// A character outside the 5-bit charset was found in a string.
    #[error("invalid character {ch:?} in {path}")]
    InvalidCharacter {
        /// The offending character.
        ch: char,
        /// A human-readable path identifying the field (e.g. "national[2].players[5].name").
        path: String,
    },

    /// A 5-bit-packed string exceeded 30 characters without a terminator.
    #[error("string at {path} exceeded 30 characters without a terminator")]
    StringTooLong {
        /// A human-readable path identifying the field.
        path: String,
    },

    /// A raw 5-bit value of 31 (outside the 0..=30 charset) was read from
    /// the bitstream.
    #[error("corrupt bitstream at {path}: raw value {value} has no charset mapping")]
    CorruptBitstream {
        /// The offending raw 5-bit value (always 31).
        value: u8,
        /// A human-readable path identifying the field.
        path: String,
    },

    /// An enum field held a value outside its valid range, or an unknown name.
    #[error("invalid value for {field}: {value}")]
    InvalidEnum {
        /// The field name.
        field: String,
        /// A display of the offending value.
        value: String,
    },

    /// A numeric field fell outside its valid range.
    #[error("{field} out of range: {value} (expected {expected})")]
    OutOfRange {
        /// The field name.
        field: String,
        /// A display of the offending value.
        value: String,
        /// A description of the valid range.
        expected: String,
    },

    /// The number of teams in a category, or players on a team, did not
    /// match what the ROM structure requires.
    #[error("{category}: expected {expected}, got {got}")]
    CountMismatch {
        /// What was being counted (e.g. "national teams", "club team 3 players").
        category: String,
        /// The expected count.
        expected: usize,
        /// The actual count found.
        got: usize,
    },

    /// A byte-offset read ran past the end of the ROM buffer.
    #[error("unexpected end of ROM data: expected at least {expected} bytes, found {available}")]
    UnexpectedEof {
        /// Bytes required.
        expected: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// `update` was called with a document that `validate` rejects.
    #[error("refusing to update: {count} validation error(s), first: {first}")]
    ValidationFailed {
        /// Total number of validation errors.
        count: usize,
        /// The first reported error, for a quick-glance message.
        first: String,
    },
}

/// A specialized `Result` type for ROM codec operations.
pub type Result<T> = std::result::Result<T, RomError>;
