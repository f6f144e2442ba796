//! Chain-walking a region's blocks and decoding each into a [`TeamRecord`].
//!
//! A region is a singly-linked chain: each block opens with a big-endian
//! u16 byte count, and the next block sits immediately after. Walking
//! stops when the chain lands exactly on the region's end offset (an
//! off-by-one anywhere in the chain is a corrupt ROM, not a recoverable
//! condition).

use crate::attrs::{self, ATTR_SIZE};
use crate::bitcodec;
use crate::doc::{PlayerRecord, TeamRecord};
use crate::error::{Result, RomError};

/// Valid block size range (the attribute section plus at least a
/// handful of characters of packed text).
const MIN_BLOCK_SIZE: u16 = 160;
const MAX_BLOCK_SIZE: u16 = 500;

/// One decoded block: its team record and, if the source ROM's
/// attribute bytes 18/19 disagreed on tactic, that discrepancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBlock {
    /// The decoded team.
    pub team: TeamRecord,
    /// `Some((byte18, byte19))` when the source bytes disagreed.
    pub discrepancy: Option<(u8, u8)>,
}

/// Walks a region's block chain, returning each block's start offset.
///
/// # Errors
///
/// Returns [`RomError::BadBlockSize`] if a size prefix falls outside
/// 160..=500, or [`RomError::ChainUnterminated`] if the chain does not
/// land exactly on `region_end`.
pub fn chain_walk_region(rom: &[u8], region_start: usize, region_end: usize) -> Result<Vec<usize>> {
    let mut blocks = Vec::new();
    let mut pos = region_start;
    while pos < region_end {
        if pos + 2 > rom.len() {
            return Err(RomError::UnexpectedEof { expected: pos + 2, available: rom.len() });
        }
        let size = u16::from_be_bytes([rom[pos], rom[pos + 1]]);
        if size < MIN_BLOCK_SIZE || size > MAX_BLOCK_SIZE {
            return Err(RomError::BadBlockSize { offset: pos, size });
        }
        blocks.push(pos);
        pos += size as usize;
    }
    if pos != region_end {
        return Err(RomError::ChainUnterminated {
            start: region_start,
            actual_end: pos,
            expected_end: region_end,
        });
    }
    Ok(blocks)
}

/// Decodes one block's attribute section and packed text into a full
/// [`TeamRecord`].
///
/// # Errors
///
/// Propagates any [`RomError`] raised by the attribute or text decoders.
pub fn decode_team_block(rom: &[u8], block_offset: usize) -> Result<DecodedBlock> {
    if block_offset + ATTR_SIZE > rom.len() {
        return Err(RomError::UnexpectedEof {
            expected: block_offset + ATTR_SIZE,
            available: rom.len(),
        });
    }
    let section = &rom[block_offset..block_offset + ATTR_SIZE];

    let kit = attrs::decode_kit(section)?;
    let team_attrs = attrs::decode_team_attrs(section)?;
    let player_attrs = attrs::decode_players(section)?;

    let mut byte_off = block_offset + ATTR_SIZE;
    let mut bit_off = 0u32;
    let mut next_string = |path: &str| -> Result<String> {
        let (s, nb, nbit) = bitcodec::unpack_string(rom, byte_off, bit_off, path)?;
        byte_off = nb;
        bit_off = nbit;
        Ok(s)
    };

    let team_name = next_string("team")?;
    let country = next_string("country")?;
    let coach = next_string("coach")?;

    let mut players = Vec::with_capacity(player_attrs.len());
    for (i, pa) in player_attrs.iter().enumerate() {
        let name = next_string(&format!("players[{i}].name"))?;
        players.push(PlayerRecord {
            name,
            number: pa.number,
            position: pa.position,
            role: pa.role,
            head: pa.head,
            star: pa.star,
        });
    }

    Ok(DecodedBlock {
        team: TeamRecord {
            team: team_name,
            country,
            coach,
            tactic: team_attrs.tactic,
            skill: team_attrs.skill,
            flag: team_attrs.flag,
            kit,
            players,
        },
        discrepancy: team_attrs.discrepancy,
    })
}

/// Walks and decodes every block in a region.
///
/// # Errors
///
/// Propagates any [`RomError`] from chain-walking or block decoding.
pub fn decode_region(rom: &[u8], region_start: usize, region_end: usize) -> Result<Vec<DecodedBlock>> {
    chain_walk_region(rom, region_start, region_end)?
        .into_iter()
        .map(|off| decode_team_block(rom, off))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_walk_rejects_bad_size() {
        let mut rom = vec![0u8; 64];
        rom[0] = 0x00;
        rom[1] = 0x02; // size 2, below MIN_BLOCK_SIZE
        let err = chain_walk_region(&rom, 0, 64).unwrap_err();
        assert!(matches!(err, RomError::BadBlockSize { offset: 0, size: 2 }));
    }

    #[test]
    fn chain_walk_rejects_misaligned_end() {
        let mut rom = vec![0u8; 500];
        rom[0] = 0x00;
        rom[1] = 0xC8; // size 200
        let err = chain_walk_region(&rom, 0, 300).unwrap_err();
        assert!(matches!(err, RomError::ChainUnterminated { start: 0, .. }));
    }

    #[test]
    fn chain_walk_accepts_exact_region() {
        let mut rom = vec![0u8; 400];
        rom[0] = 0x00;
        rom[1] = 0xC8; // 200
        rom[200] = 0x00;
        rom[201] = 0xC8; // 200
        let blocks = chain_walk_region(&rom, 0, 400).unwrap();
        assert_eq!(blocks, vec![0, 200]);
    }
}
