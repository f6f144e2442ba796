//! The logical, JSON-isomorphic team document (`TeamsDoc`) returned by
//! [`crate::decode`] and accepted by [`crate::validate`]/[`crate::update`].
//!
//! These types carry no ROM-layout detail (no byte offsets, no packed
//! position words) — they are the normalised view described in spec §3,
//! round-tripped through `serde_json` exactly as documented in §6.

use serde::{Deserialize, Serialize};

use crate::attrs::{Colour, FormationSlot, Head, Role, Style, Tactic};

/// The three team categories a ROM's pointer table always carries, in
/// the fixed order the codec walks them.
pub const CATEGORIES: [&str; 3] = ["national", "club", "custom"];

/// One kit's five colour/style fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitDescriptor {
    /// Shirt pattern.
    pub style: Style,
    /// Primary shirt colour.
    pub shirt1: Colour,
    /// Secondary shirt colour (trim/sleeves).
    pub shirt2: Colour,
    /// Shorts colour.
    pub shorts: Colour,
    /// Socks colour.
    pub socks: Colour,
}

/// A team's home ("first") and away ("second") kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kit {
    /// Home kit.
    pub first: KitDescriptor,
    /// Away kit.
    pub second: KitDescriptor,
}

/// One of a team's 16 squad members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Player name (5-bit charset, upper-cased on write).
    pub name: String,
    /// Shirt number, 1..=16.
    pub number: u8,
    /// Formation slot (0..=10, or 15 for substitute).
    pub position: FormationSlot,
    /// Playing role.
    pub role: Role,
    /// Head/hair appearance.
    pub head: Head,
    /// Star player flag. Omitted from JSON output when `false`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub star: bool,
}

/// One team's full record: identity, tactics, kit and 16 players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    /// Team name.
    pub team: String,
    /// Country name (national teams only carry meaningful values here;
    /// club/custom teams still decode whatever string the ROM stores).
    pub country: String,
    /// Coach/manager name.
    pub coach: String,
    /// Formation preset.
    pub tactic: Tactic,
    /// Skill tier, 0 (best) .. 7 (weakest).
    pub skill: u8,
    /// Flag bit (0 or 1); meaning is opaque to the codec.
    pub flag: u8,
    /// Home and away kit.
    pub kit: Kit,
    /// The 16 squad members, in attribute-section order.
    pub players: Vec<PlayerRecord>,
}

/// The full decoded (or to-be-encoded) team document.
///
/// `edition` and `discrepancies` are decode-time diagnostics (see
/// SPEC_FULL.md §3.1 / §9) and are never part of the on-disk JSON shape:
/// they are skipped on both serialize and deserialize, so a document
/// saved to disk and loaded back is unaffected by their presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamsDoc {
    /// National teams.
    pub national: Vec<TeamRecord>,
    /// Club teams.
    pub club: Vec<TeamRecord>,
    /// Custom (editable) teams.
    pub custom: Vec<TeamRecord>,

    /// Informal edition identification; does not affect codec behaviour.
    #[serde(skip)]
    pub edition: Option<RomEdition>,

    /// Blocks where the source ROM's attribute bytes 18 and 19 disagreed
    /// on tactic (see the Open Question in SPEC_FULL.md §9).
    #[serde(skip)]
    pub discrepancies: Vec<AttributeDiscrepancy>,

    /// Blocks where a stored packed text-position word did not match
    /// the position recomputed from the decoded text (spec §4's
    /// redundant-but-checked position words).
    #[serde(skip)]
    pub position_mismatches: Vec<PositionMismatch>,
}

impl TeamsDoc {
    /// Returns the team list for a category by name, if recognised.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&[TeamRecord]> {
        match name {
            "national" => Some(&self.national),
            "club" => Some(&self.club),
            "custom" => Some(&self.custom),
            _ => None,
        }
    }
}

/// Informal edition identification (spec §6): two shipping editions are
/// known, distinguished by national team count. Identification never
/// changes codec behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RomEdition {
    /// The 51-national-team edition.
    International,
    /// Any other structurally valid ROM (53 national teams, or unknown).
    Other,
}

/// Records that a source block's attribute bytes 18 (stored tactic) and
/// 19 (gameplay-active tactic) disagreed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDiscrepancy {
    /// Category the block belongs to.
    pub category: String,
    /// Index within the category (0-based).
    pub index: usize,
    /// Raw byte 18 value from the source ROM.
    pub byte18: u8,
    /// Raw byte 19 value from the source ROM.
    pub byte19: u8,
}

/// Records that a source block's Nth stored packed text-position word
/// did not match the position recomputed from its decoded text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMismatch {
    /// Category the block belongs to.
    pub category: String,
    /// Index within the category (0-based).
    pub index: usize,
    /// Which of the 19 strings (0 = team, 1 = country, 2 = coach, 3..19
    /// = players 0..16) the mismatch was found at.
    pub string_index: usize,
    /// The position word stored in the ROM.
    pub stored: u16,
    /// The position word recomputed from the decoded text.
    pub recomputed: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_player() -> PlayerRecord {
        PlayerRecord {
            name: "SMITH".to_string(),
            number: 1,
            position: FormationSlot::Goalkeeper,
            role: Role::Goalkeeper,
            head: Head::WhiteDark,
            star: false,
        }
    }

    #[test]
    fn star_false_is_omitted_from_json() {
        let p = sample_player();
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("star"));
    }

    #[test]
    fn star_true_is_serialized() {
        let mut p = sample_player();
        p.star = true;
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"star\":true"));
    }

    #[test]
    fn edition_and_discrepancies_are_not_on_disk() {
        let doc = TeamsDoc {
            national: vec![],
            club: vec![],
            custom: vec![],
            edition: Some(RomEdition::International),
            discrepancies: vec![AttributeDiscrepancy {
                category: "national".to_string(),
                index: 0,
                byte18: 1,
                byte19: 2,
            }],
            position_mismatches: vec![],
        };
        let json = serde_json::to_value(&doc).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("edition"));
        assert!(!obj.contains_key("discrepancies"));
        assert!(!obj.contains_key("position_mismatches"));

        let round_tripped: TeamsDoc = serde_json::from_value(json).unwrap();
        assert_eq!(round_tripped.edition, None);
        assert!(round_tripped.discrepancies.is_empty());
        assert!(round_tripped.position_mismatches.is_empty());
    }

    #[test]
    fn category_lookup() {
        let doc = TeamsDoc {
            national: vec![],
            club: vec![],
            custom: vec![],
            edition: None,
            discrepancies: vec![],
            position_mismatches: vec![],
        };
        assert!(doc.category("national").is_some());
        assert!(doc.category("bogus").is_none());
    }
}
