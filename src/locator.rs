//! Heuristic discovery of the three team regions inside a ROM image.
//!
//! The game never stores a fixed address for its team data tables; two
//! shipping editions place the pointer table at different offsets. The
//! locator finds it by scanning for plausible team text, then searching
//! nearby ROM code for a 6-longword pointer table whose entries are
//! internally consistent (spec §4's region/pointer-table rules).

use std::collections::HashSet;

use crate::attrs::ATTR_SIZE;
use crate::bitcodec::unpack_string;
use crate::error::{Result, RomError};

const SCAN_START: usize = 0x020000;
const SCAN_END: usize = 0x030000;
const TABLE_SEARCH_END: usize = 0x030000;
const MIN_NAME_LEN: usize = 3;
const MAX_NAME_LEN: usize = 25;

/// The six-longword region pointer table and the offset it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerTable {
    /// Start of the national-team region.
    pub nat_start: usize,
    /// Start of the club-team region.
    pub club_start: usize,
    /// Start of the custom-team region.
    pub cust_start: usize,
    /// End of the national-team region.
    pub nat_end: usize,
    /// End of the club-team region.
    pub club_end: usize,
    /// End of the custom-team region.
    pub cust_end: usize,
    /// ROM offset of the pointer table's first longword.
    pub table_base: usize,
}

/// Returns the built-in set of recognised national team names, used by
/// [`RegionLocator::default`] to validate candidate team text during the
/// heuristic scan.
#[must_use]
pub fn default_known_countries() -> HashSet<String> {
    [
        "ENGLAND", "SCOTLAND", "WALES", "NORTHERN IRELAND", "REPUBLIC OF IRELAND", "FRANCE",
        "GERMANY", "ITALY", "SPAIN", "HOLLAND", "BELGIUM", "PORTUGAL", "AUSTRIA", "SWITZERLAND",
        "SWEDEN", "NORWAY", "DENMARK", "FINLAND", "GREECE", "TURKEY", "ROMANIA", "BULGARIA",
        "HUNGARY", "POLAND", "CZECHOSLOVAKIA", "CROATIA", "SLOVENIA", "RUSSIA", "UKRAINE",
        "ALBANIA", "CYPRUS", "ICELAND", "ISRAEL", "LUXEMBOURG", "MALTA", "ESTONIA", "LATVIA",
        "LITHUANIA", "FAEROE ISLES",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

/// Scans a ROM image for the region pointer table, with an injectable
/// vocabulary of recognised country names (spec §9's redesign note: the
/// original hard-coded this list at module scope).
pub struct RegionLocator {
    /// Country names accepted as a valid national-team text match during
    /// the heuristic scan.
    pub known_countries: HashSet<String>,
}

impl Default for RegionLocator {
    fn default() -> Self {
        Self { known_countries: default_known_countries() }
    }
}

impl RegionLocator {
    /// Locates the region pointer table in `rom`.
    ///
    /// # Errors
    ///
    /// Returns [`RomError::RomStructureUnrecognised`] if no team-like
    /// text, or no internally-consistent pointer table near it, is
    /// found.
    pub fn locate(&self, rom: &[u8]) -> Result<PointerTable> {
        find_pointer_table(rom, &self.known_countries)
    }
}

/// Scans `rom[scan_start..scan_end]` for byte offsets that look like the
/// start of a team's packed text (plausible team name, a recognised
/// country, a plausible coach name and a plausible first player name in
/// sequence).
fn auto_find_teams(
    rom: &[u8],
    scan_start: usize,
    scan_end: usize,
    known_countries: &HashSet<String>,
) -> Vec<usize> {
    let mut found = Vec::new();
    let mut offset = scan_start;
    let scan_end = scan_end.min(rom.len());

    while offset < scan_end {
        if let Some(text_end) = probe_team_text(rom, offset, known_countries) {
            found.push(offset);
            offset = text_end + 100;
        } else {
            offset += 1;
        }
    }
    found
}

fn plausible_name(s: &str) -> bool {
    let len = s.chars().count();
    (MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len)
}

/// Attempts to decode team/country/coach/first-player strings starting
/// at `offset`. Returns the byte offset just past the fourth string on
/// success.
fn probe_team_text(rom: &[u8], offset: usize, known_countries: &HashSet<String>) -> Option<usize> {
    let (name, b1, bit1) = unpack_string(rom, offset, 0, "scan.team").ok()?;
    if !plausible_name(&name) {
        return None;
    }
    let (country, b2, bit2) = unpack_string(rom, b1, bit1, "scan.country").ok()?;
    if !known_countries.contains(country.as_str()) {
        return None;
    }
    let (manager, b3, bit3) = unpack_string(rom, b2, bit2, "scan.coach").ok()?;
    if !plausible_name(&manager) {
        return None;
    }
    let (player1, b4, bit4) = unpack_string(rom, b3, bit3, "scan.player").ok()?;
    if !plausible_name(&player1) {
        return None;
    }
    Some(b4 + usize::from(bit4 > 0))
}

fn find_subslice(haystack: &[u8], needle: &[u8], from: usize, to: usize) -> Option<usize> {
    let end = to.min(haystack.len());
    if from >= end || needle.len() > end - from {
        return None;
    }
    haystack[from..end].windows(needle.len()).position(|w| w == needle).map(|i| i + from)
}

#[allow(clippy::similar_names)]
fn validate_table(rom: &[u8], table_base: usize) -> Option<PointerTable> {
    if table_base + 24 > rom.len() {
        return None;
    }
    let word = |i: usize| -> usize {
        let o = table_base + i * 4;
        u32::from_be_bytes([rom[o], rom[o + 1], rom[o + 2], rom[o + 3]]) as usize
    };
    let (nat_s, club_s, cust_s, nat_e, club_e, cust_e) =
        (word(0), word(1), word(2), word(3), word(4), word(5));

    let ok = nat_s < club_s
        && club_s < cust_s
        && nat_s < nat_e
        && nat_e <= club_s
        && club_s < club_e
        && club_e <= cust_s
        && cust_s < cust_e
        && nat_s > 0x010000
        && nat_s < 0x040000;

    ok.then_some(PointerTable {
        nat_start: nat_s,
        club_start: club_s,
        cust_start: cust_s,
        nat_end: nat_e,
        club_end: club_e,
        cust_end: cust_e,
        table_base,
    })
}

/// Finds the region pointer table by locating plausible team text, then
/// searching nearby ROM code for a 4-byte-aligned match to that block's
/// computed start offset at each of the table's four possible slot
/// positions.
///
/// # Errors
///
/// Returns [`RomError::RomStructureUnrecognised`] if no candidate
/// satisfies every ordering invariant.
pub fn find_pointer_table(rom: &[u8], known_countries: &HashSet<String>) -> Result<PointerTable> {
    let text_offsets = auto_find_teams(rom, SCAN_START, SCAN_END, known_countries);
    let search_end = TABLE_SEARCH_END.min(rom.len());

    for text_off in text_offsets {
        if text_off < ATTR_SIZE {
            continue;
        }
        let block_start = text_off - ATTR_SIZE;
        let target = (block_start as u32).to_be_bytes();

        let mut pos = 0usize;
        while pos < search_end {
            let Some(found) = find_subslice(rom, &target, pos, search_end) else {
                break;
            };
            for slot in 0..3usize {
                if found < slot * 4 {
                    continue;
                }
                if let Some(table) = validate_table(rom, found - slot * 4) {
                    return Ok(table);
                }
            }
            pos = found + 1;
        }
    }

    Err(RomError::RomStructureUnrecognised)
}
