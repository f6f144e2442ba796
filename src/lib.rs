//! # ss-rom-teams
//!
//! A reader/writer for the team-data section of a Sensible Soccer-style
//! Mega Drive cartridge image.
//!
//! The ROM stores three team regions (national, club, custom) as
//! singly-linked chains of variable-size blocks. Each block opens with a
//! fixed 150-byte attribute section (kit colours, tactic, skill, and 16
//! player records) followed by 19 null-terminated strings packed 5 bits
//! per character. Neither region's address nor the pointer table that
//! names them is fixed across ROM editions, so every read starts with a
//! heuristic scan.
//!
//! ## Quick start
//!
//! ```no_run
//! use ss_rom_teams::{decode, validate, update};
//!
//! fn edit_rom(rom: &[u8]) -> ss_rom_teams::error::Result<Vec<u8>> {
//!     let mut doc = decode(rom)?;
//!     doc.national[0].team = "NEW NAME".to_string();
//!
//!     let report = validate(rom, &doc)?;
//!     assert!(report.is_ok(), "{:?}", report.errors);
//!
//!     update(rom, &doc)
//! }
//! ```
//!
//! ## Module overview
//!
//! - [`error`] — the [`error::RomError`] failure taxonomy shared by every operation
//! - [`bitcodec`] — the 5-bit charset and MSB-first bitstream primitives
//! - [`attrs`] — the 150-byte attribute section and its enum vocabulary
//! - [`doc`] — the JSON-isomorphic [`doc::TeamsDoc`] document model
//! - [`locator`] — heuristic discovery of the region pointer table
//! - [`walker`] — block-chain walking and block decoding
//! - [`builder`] — re-encoding edited teams and rewriting the ROM
//! - [`validate`] — structural/content validation of a candidate document

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod attrs;
pub mod bitcodec;
pub mod builder;
pub mod doc;
pub mod error;
pub mod locator;
pub mod validate;
pub mod walker;

pub use doc::{AttributeDiscrepancy, PositionMismatch, RomEdition, TeamRecord, TeamsDoc, CATEGORIES};
pub use error::{Result, RomError};
pub use locator::RegionLocator;
pub use validate::ValidationReport;

/// National team count that identifies the International edition (spec
/// §6: informal identification only, never affects codec behaviour).
const INTERNATIONAL_NATIONAL_COUNT: usize = 51;

/// Decodes a ROM image into a structured team document.
///
/// Locates the region pointer table, walks each region's block chain,
/// and decodes every block's attributes and packed text. Diagnostics
/// that never fail the decode — byte 18/19 tactic discrepancies and
/// stored-vs-recomputed text-position mismatches — are attached to the
/// returned document rather than raised.
///
/// # Errors
///
/// Returns [`RomError::RomStructureUnrecognised`] if no pointer table
/// can be found, or any error the block walker or attribute/text
/// decoders raise for a structurally corrupt ROM.
pub fn decode(rom: &[u8]) -> Result<TeamsDoc> {
    decode_with_locator(rom, &RegionLocator::default())
}

/// As [`decode`], but with an injectable [`RegionLocator`] (for ROMs
/// whose national-team vocabulary falls outside the built-in list).
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_with_locator(rom: &[u8], locator: &RegionLocator) -> Result<TeamsDoc> {
    let table = locator.locate(rom)?;
    let region_bounds = [
        (table.nat_start, table.nat_end),
        (table.club_start, table.club_end),
        (table.cust_start, table.cust_end),
    ];

    let mut categories: [Vec<TeamRecord>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut discrepancies = Vec::new();
    let mut position_mismatches = Vec::new();

    for (cat_idx, &(start, end)) in region_bounds.iter().enumerate() {
        let cat_name = CATEGORIES[cat_idx];
        let block_offsets = walker::chain_walk_region(rom, start, end)?;

        for (i, &block_off) in block_offsets.iter().enumerate() {
            let decoded = walker::decode_team_block(rom, block_off)?;

            if let Some((byte18, byte19)) = decoded.discrepancy {
                discrepancies.push(AttributeDiscrepancy {
                    category: cat_name.to_string(),
                    index: i,
                    byte18,
                    byte19,
                });
            }

            let section = &rom[block_off..block_off + attrs::ATTR_SIZE];
            let stored = attrs::read_position_words(section);
            let text_bytes = builder::encode_team_text(&decoded.team)?;
            let recomputed = builder::compute_packed_positions(&text_bytes);
            for (string_idx, (&s, &r)) in stored.iter().zip(recomputed.iter()).enumerate() {
                if s != r {
                    position_mismatches.push(PositionMismatch {
                        category: cat_name.to_string(),
                        index: i,
                        string_index: string_idx,
                        stored: s,
                        recomputed: r,
                    });
                }
            }

            categories[cat_idx].push(decoded.team);
        }
    }

    let [national, club, custom] = categories;
    let edition = if national.len() == INTERNATIONAL_NATIONAL_COUNT {
        Some(RomEdition::International)
    } else {
        Some(RomEdition::Other)
    };

    Ok(TeamsDoc { national, club, custom, edition, discrepancies, position_mismatches })
}

/// Validates a candidate document against `rom`'s structure.
///
/// # Errors
///
/// Returns [`RomError::RomStructureUnrecognised`] if no pointer table
/// can be found, or a walker error for a corrupt ROM. Problems with
/// `doc` itself are reported in the returned [`ValidationReport`].
pub fn validate(rom: &[u8], doc: &TeamsDoc) -> Result<ValidationReport> {
    validate::validate(rom, doc, &RegionLocator::default())
}

/// Produces a modified ROM image with `doc`'s team data re-embedded.
///
/// Calls [`validate`] internally and refuses to proceed if it reports
/// any error.
///
/// # Errors
///
/// Returns [`RomError::ValidationFailed`] if `doc` does not pass
/// validation, [`RomError::Overflow`] if the edited regions do not fit
/// in the space available, or any structural error from locating or
/// walking the ROM.
pub fn update(rom: &[u8], doc: &TeamsDoc) -> Result<Vec<u8>> {
    builder::update_rom(rom, doc, &RegionLocator::default()).map(|report| report.rom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_unrecognisable_rom() {
        let err = decode(&vec![0u8; 1024]).unwrap_err();
        assert!(matches!(err, RomError::RomStructureUnrecognised));
    }

    #[test]
    fn validate_rejects_unrecognisable_rom() {
        let doc = TeamsDoc {
            national: vec![],
            club: vec![],
            custom: vec![],
            edition: None,
            discrepancies: vec![],
            position_mismatches: vec![],
        };
        let err = validate(&vec![0u8; 1024], &doc).unwrap_err();
        assert!(matches!(err, RomError::RomStructureUnrecognised));
    }
}
