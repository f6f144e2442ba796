//! The fixed-layout 150-byte attribute section and its enum vocabulary.
//!
//! Every block begins with this section (spec §3's table): two bytes of
//! block size, three packed text positions, two 5-byte kit descriptors,
//! a mirrored tactic byte pair, a reserved byte, a skill/flag byte, and
//! sixteen 8-byte player records. This module is a pure
//! offset-in/offset-out (de)serializer — it never touches the ROM's
//! region or block-chain structure, and it never touches text.
//!
//! Enum fields follow the re-architecture called for in spec §9: each
//! has an explicit `from_name`/`from_int` constructor pair and a single
//! canonical `to_name`, generated by the [`rom_enum!`] macro below so the
//! JSON adapter can accept either form on input while always emitting
//! the canonical string on output.

use serde::{Deserialize, Serialize};

use crate::doc::{Kit, KitDescriptor, PlayerRecord};
use crate::error::{Result, RomError};

/// Size in bytes of the fixed attribute section at the start of every block.
pub const ATTR_SIZE: usize = 150;

/// Byte offsets within the attribute section of the 19 packed text
/// position words, in string order: team, country, coach, then 16
/// players.
pub const ATTR_OFFSETS: [usize; 19] =
    [2, 4, 6, 22, 30, 38, 46, 54, 62, 70, 78, 86, 94, 102, 110, 118, 126, 134, 142];

/// Declares a fieldless enum with paired string/int conversions and a
/// `serde` impl that accepts either form on input but always emits the
/// canonical name on output (spec §9's "tagged-variant enums").
macro_rules! rom_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $int:literal => $str_name:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Constructs from the canonical lower/snake-case string name.
            #[must_use]
            pub fn from_name(s: &str) -> Option<Self> {
                match s {
                    $( $str_name => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Constructs from the underlying ROM integer code.
            #[must_use]
            pub fn from_int(v: u8) -> Option<Self> {
                match v {
                    $( $int => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// The canonical string name, used for JSON output.
            #[must_use]
            pub fn to_name(self) -> &'static str {
                match self {
                    $( Self::$variant => $str_name, )+
                }
            }

            /// The underlying ROM integer code.
            #[must_use]
            pub fn to_int(self) -> u8 {
                match self {
                    $( Self::$variant => $int, )+
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.to_name())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                #[derive(Deserialize)]
                #[serde(untagged)]
                enum IntOrString {
                    Int(u8),
                    Str(String),
                }
                match IntOrString::deserialize(deserializer)? {
                    IntOrString::Int(v) => Self::from_int(v).ok_or_else(|| {
                        serde::de::Error::custom(format!(
                            "invalid {} integer value: {v}",
                            stringify!($name)
                        ))
                    }),
                    IntOrString::Str(s) => Self::from_name(&s).ok_or_else(|| {
                        serde::de::Error::custom(format!(
                            "invalid {} name: {s:?}",
                            stringify!($name)
                        ))
                    }),
                }
            }
        }
    };
}

rom_enum! {
    /// Kit shirt pattern.
    pub enum Style {
        Plain = 0 => "plain",
        Sleeves = 1 => "sleeves",
        Vertical = 2 => "vertical",
        Horizontal = 3 => "horizontal",
    }
}

rom_enum! {
    /// Named kit colour, 1..=15.
    pub enum Colour {
        Grey = 0x01 => "grey",
        White = 0x02 => "white",
        Black = 0x03 => "black",
        Brown = 0x04 => "brown",
        DarkOrange = 0x05 => "dark_orange",
        Orange = 0x06 => "orange",
        LightGrey = 0x07 => "light_grey",
        DarkGrey = 0x08 => "dark_grey",
        DarkGrey2 = 0x09 => "dark_grey_2",
        Red = 0x0A => "red",
        Blue = 0x0B => "blue",
        DarkRed = 0x0C => "dark_red",
        LightBlue = 0x0D => "light_blue",
        Green = 0x0E => "green",
        Yellow = 0x0F => "yellow",
    }
}

rom_enum! {
    /// Formation preset, 0..=7.
    pub enum Tactic {
        FourFourTwo = 0 => "4-4-2",
        FiveFourOne = 1 => "5-4-1",
        FourFiveOne = 2 => "4-5-1",
        FiveThreeTwo = 3 => "5-3-2",
        ThreeFiveTwo = 4 => "3-5-2",
        FourThreeThree = 5 => "4-3-3",
        ThreeThreeFour = 6 => "3-3-4",
        SixThreeOne = 7 => "6-3-1",
    }
}

rom_enum! {
    /// A player's on-pitch role, 0..=3.
    pub enum Role {
        Goalkeeper = 0 => "goalkeeper",
        Defender = 1 => "defender",
        Midfielder = 2 => "midfielder",
        Forward = 3 => "forward",
    }
}

rom_enum! {
    /// Head/hair appearance, 0..=2.
    pub enum Head {
        WhiteDark = 0 => "white_dark",
        WhiteBlonde = 1 => "white_blonde",
        BlackDark = 2 => "black_dark",
    }
}

rom_enum! {
    /// Formation slot: 0..=10 for starters, 15 for substitute.
    pub enum FormationSlot {
        Goalkeeper = 0 => "goalkeeper",
        RightBack = 1 => "right_back",
        LeftBack = 2 => "left_back",
        CentreBack = 3 => "centre_back",
        Defender = 4 => "defender",
        RightMidfielder = 5 => "right_midfielder",
        CentreMidfielder = 6 => "centre_midfielder",
        LeftMidfielder = 7 => "left_midfielder",
        Midfielder = 8 => "midfielder",
        Forward = 9 => "forward",
        SecondForward = 10 => "second_forward",
        Sub = 15 => "sub",
    }
}

/// Decoded fields of one 8-byte player attribute record, before the
/// player's name (decoded separately from the text section) is joined
/// in by the block walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerAttrs {
    /// Shirt number, 1..=16.
    pub number: u8,
    /// Formation slot.
    pub position: FormationSlot,
    /// Playing role.
    pub role: Role,
    /// Head appearance.
    pub head: Head,
    /// Star player flag.
    pub star: bool,
}

fn invalid_enum(field: impl Into<String>, value: u8) -> RomError {
    RomError::InvalidEnum { field: field.into(), value: value.to_string() }
}

/// Decodes the two 5-field kit descriptors from attribute-section bytes
/// 8..18.
///
/// # Errors
///
/// Returns [`RomError::InvalidEnum`] if a style or colour byte is
/// outside its valid range.
pub fn decode_kit(attrs: &[u8]) -> Result<Kit> {
    let parse_one = |off: usize, which: &str| -> Result<KitDescriptor> {
        Ok(KitDescriptor {
            style: Style::from_int(attrs[off])
                .ok_or_else(|| invalid_enum(format!("kit.{which}.style"), attrs[off]))?,
            shirt1: Colour::from_int(attrs[off + 1])
                .ok_or_else(|| invalid_enum(format!("kit.{which}.shirt1"), attrs[off + 1]))?,
            shirt2: Colour::from_int(attrs[off + 2])
                .ok_or_else(|| invalid_enum(format!("kit.{which}.shirt2"), attrs[off + 2]))?,
            shorts: Colour::from_int(attrs[off + 3])
                .ok_or_else(|| invalid_enum(format!("kit.{which}.shorts"), attrs[off + 3]))?,
            socks: Colour::from_int(attrs[off + 4])
                .ok_or_else(|| invalid_enum(format!("kit.{which}.socks"), attrs[off + 4]))?,
        })
    };
    Ok(Kit { first: parse_one(8, "first")?, second: parse_one(13, "second")? })
}

/// Writes the two kit descriptors into attribute-section bytes 8..18.
pub fn apply_kit(attrs: &mut [u8], kit: &Kit) {
    let write_one = |attrs: &mut [u8], off: usize, k: &KitDescriptor| {
        attrs[off] = k.style.to_int();
        attrs[off + 1] = k.shirt1.to_int();
        attrs[off + 2] = k.shirt2.to_int();
        attrs[off + 3] = k.shorts.to_int();
        attrs[off + 4] = k.socks.to_int();
    };
    write_one(attrs, 8, &kit.first);
    write_one(attrs, 13, &kit.second);
}

/// Decoded team-level attributes (bytes 18..22), plus the raw byte 18/19
/// pair when they disagree (spec §9's Open Question).
pub struct TeamAttrs {
    /// Tactic, derived from byte 19 (the gameplay-active copy).
    pub tactic: Tactic,
    /// Skill tier, 0 (best)..7 (weakest).
    pub skill: u8,
    /// Flag bit, 0 or 1.
    pub flag: u8,
    /// `Some((byte18, byte19))` when the source bytes disagreed.
    pub discrepancy: Option<(u8, u8)>,
}

/// Decodes team-level attributes from bytes 18..22 of the attribute
/// section.
///
/// # Errors
///
/// Returns [`RomError::InvalidEnum`] if byte 19 is not a valid tactic
/// value (0..=7).
pub fn decode_team_attrs(attrs: &[u8]) -> Result<TeamAttrs> {
    let byte18 = attrs[18];
    let byte19 = attrs[19];
    let tactic = Tactic::from_int(byte19).ok_or_else(|| invalid_enum("tactic", byte19))?;
    let skill = (attrs[21] >> 3) & 0x07;
    let flag = attrs[21] & 0x01;
    let discrepancy = (byte18 != byte19).then_some((byte18, byte19));
    Ok(TeamAttrs { tactic, skill, flag, discrepancy })
}

/// Writes the tactic value into both byte 18 and byte 19, clears the
/// reserved byte 20, and packs skill/flag into byte 21.
///
/// Always writes the same value to both bytes: any byte 18/19
/// discrepancy present in a source ROM (see [`TeamAttrs::discrepancy`])
/// is collapsed on write, since a document only ever carries one
/// tactic value to write back.
pub fn apply_team_attrs(attrs: &mut [u8], tactic: Tactic, skill: u8, flag: u8) {
    let t = tactic.to_int();
    attrs[18] = t;
    attrs[19] = t;
    attrs[20] = 0x00;
    attrs[21] = ((skill & 0x07) << 3) | (flag & 0x01);
}

/// Reads the 19 stored packed text-position words from the attribute
/// section, in the same string order as [`ATTR_OFFSETS`].
#[must_use]
pub fn read_position_words(attrs: &[u8]) -> [u16; 19] {
    let mut out = [0u16; 19];
    for (i, &off) in ATTR_OFFSETS.iter().enumerate() {
        out[i] = u16::from_be_bytes([attrs[off], attrs[off + 1]]);
    }
    out
}

/// Writes 19 packed text-position words into the attribute section.
pub fn write_position_words(attrs: &mut [u8], positions: &[u16; 19]) {
    for (i, &off) in ATTR_OFFSETS.iter().enumerate() {
        let bytes = positions[i].to_be_bytes();
        attrs[off] = bytes[0];
        attrs[off + 1] = bytes[1];
    }
}

/// Decodes the 16 player attribute records starting at byte 22.
///
/// # Errors
///
/// Returns [`RomError::InvalidEnum`] if a position, role or head value
/// is outside its valid range.
pub fn decode_players(attrs: &[u8]) -> Result<Vec<PlayerAttrs>> {
    let mut players = Vec::with_capacity(16);
    for i in 0..16 {
        let rec_off = 22 + i * 8 + 2;
        let pos_byte = attrs[rec_off];
        let app_byte = attrs[rec_off + 1];
        let pos_slot = (pos_byte >> 4) & 0x0F;
        let role_val = (app_byte >> 2) & 0x03;
        let head_val = app_byte & 0x03;
        let star = (app_byte >> 4) & 0x01 != 0;

        players.push(PlayerAttrs {
            number: (pos_byte & 0x0F) + 1,
            position: FormationSlot::from_int(pos_slot)
                .ok_or_else(|| invalid_enum(format!("players[{i}].position"), pos_slot))?,
            role: Role::from_int(role_val)
                .ok_or_else(|| invalid_enum(format!("players[{i}].role"), role_val))?,
            head: Head::from_int(head_val)
                .ok_or_else(|| invalid_enum(format!("players[{i}].head"), head_val))?,
            star,
        });
    }
    Ok(players)
}

/// Writes the 16 player attribute records starting at byte 22.
///
/// # Errors
///
/// Returns [`RomError::OutOfRange`] if a shirt number falls outside
/// 1..=16.
pub fn apply_players(attrs: &mut [u8], players: &[PlayerRecord]) -> Result<()> {
    for (i, p) in players.iter().enumerate() {
        if !(1..=16).contains(&p.number) {
            return Err(RomError::OutOfRange {
                field: format!("players[{i}].number"),
                value: p.number.to_string(),
                expected: "1..=16".to_string(),
            });
        }
        let rec_off = 22 + i * 8 + 2;
        let pos = p.position.to_int();
        let role = p.role.to_int();
        let head = p.head.to_int();
        let star = u8::from(p.star);
        attrs[rec_off] = ((pos & 0x0F) << 4) | ((p.number - 1) & 0x0F);
        attrs[rec_off + 1] = (star << 4) | ((role & 0x03) << 2) | (head & 0x03);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_int_name_round_trip() {
        for v in 0..=3u8 {
            let s = Style::from_int(v).unwrap();
            assert_eq!(s.to_int(), v);
            assert_eq!(Style::from_name(s.to_name()), Some(s));
        }
        assert_eq!(Style::from_int(4), None);
    }

    #[test]
    fn colour_accepts_both_forms() {
        assert_eq!(Colour::from_name("red"), Colour::from_int(0x0A));
        assert_eq!(Colour::from_int(0), None);
        assert_eq!(Colour::from_int(16), None);
    }

    #[test]
    fn tactic_names_are_formation_strings() {
        assert_eq!(Tactic::from_name("4-4-2"), Some(Tactic::FourFourTwo));
        assert_eq!(Tactic::from_int(7), Some(Tactic::SixThreeOne));
        assert_eq!(Tactic::from_int(8), None);
    }

    #[test]
    fn formation_slot_skips_11_to_14() {
        assert_eq!(FormationSlot::from_int(10), Some(FormationSlot::SecondForward));
        assert_eq!(FormationSlot::from_int(11), None);
        assert_eq!(FormationSlot::from_int(14), None);
        assert_eq!(FormationSlot::from_int(15), Some(FormationSlot::Sub));
    }

    #[test]
    fn enum_serializes_as_canonical_name() {
        let json = serde_json::to_string(&Tactic::FourFourTwo).unwrap();
        assert_eq!(json, "\"4-4-2\"");
    }

    #[test]
    fn enum_deserializes_from_name_or_int() {
        let from_name: Tactic = serde_json::from_str("\"5-3-2\"").unwrap();
        let from_int: Tactic = serde_json::from_str("3").unwrap();
        assert_eq!(from_name, Tactic::FiveThreeTwo);
        assert_eq!(from_int, Tactic::FiveThreeTwo);
    }

    #[test]
    fn enum_deserialize_rejects_unknown() {
        let result: std::result::Result<Tactic, _> = serde_json::from_str("\"9-0-1\"");
        assert!(result.is_err());
    }

    fn blank_attrs() -> Vec<u8> {
        vec![0u8; ATTR_SIZE]
    }

    #[test]
    fn decode_kit_round_trips_through_apply() {
        let mut attrs = blank_attrs();
        let kit = Kit {
            first: KitDescriptor {
                style: Style::Sleeves,
                shirt1: Colour::Red,
                shirt2: Colour::White,
                shorts: Colour::Black,
                socks: Colour::Red,
            },
            second: KitDescriptor {
                style: Style::Plain,
                shirt1: Colour::Blue,
                shirt2: Colour::Blue,
                shorts: Colour::Blue,
                socks: Colour::White,
            },
        };
        apply_kit(&mut attrs, &kit);
        let decoded = decode_kit(&attrs).unwrap();
        assert_eq!(decoded, kit);
    }

    #[test]
    fn team_attrs_mirror_tactic_by_default() {
        let mut attrs = blank_attrs();
        apply_team_attrs(&mut attrs, Tactic::ThreeFiveTwo, 2, 1);
        assert_eq!(attrs[18], 4);
        assert_eq!(attrs[19], 4);
        let decoded = decode_team_attrs(&attrs).unwrap();
        assert_eq!(decoded.tactic, Tactic::ThreeFiveTwo);
        assert_eq!(decoded.skill, 2);
        assert_eq!(decoded.flag, 1);
        assert_eq!(decoded.discrepancy, None);
    }

    #[test]
    fn team_attrs_reports_byte18_19_discrepancy() {
        let mut attrs = blank_attrs();
        attrs[18] = 1;
        attrs[19] = 2;
        let decoded = decode_team_attrs(&attrs).unwrap();
        assert_eq!(decoded.tactic, Tactic::FourFiveOne);
        assert_eq!(decoded.discrepancy, Some((1, 2)));
    }

    #[test]
    fn apply_team_attrs_collapses_byte18_19_to_one_value() {
        let mut attrs = blank_attrs();
        attrs[18] = 5;
        attrs[19] = 6;
        apply_team_attrs(&mut attrs, Tactic::FourFourTwo, 0, 0);
        assert_eq!(attrs[18], 0);
        assert_eq!(attrs[19], 0);
    }

    #[test]
    fn player_attrs_round_trip() {
        let mut attrs = blank_attrs();
        let players: Vec<PlayerRecord> = (0..16)
            .map(|i| PlayerRecord {
                name: String::new(),
                number: (i % 16) + 1,
                position: if i == 0 { FormationSlot::Goalkeeper } else { FormationSlot::Sub },
                role: Role::Midfielder,
                head: Head::BlackDark,
                star: i == 3,
            })
            .collect();
        apply_players(&mut attrs, &players).unwrap();
        let decoded = decode_players(&attrs).unwrap();
        for (i, (p, d)) in players.iter().zip(decoded.iter()).enumerate() {
            assert_eq!(d.number, p.number, "player {i}");
            assert_eq!(d.position, p.position);
            assert_eq!(d.role, p.role);
            assert_eq!(d.head, p.head);
            assert_eq!(d.star, p.star);
        }
    }

    #[test]
    fn position_words_round_trip() {
        let mut attrs = blank_attrs();
        let mut positions = [0u16; 19];
        for (i, p) in positions.iter_mut().enumerate() {
            *p = (150 + i as u16) << 5;
        }
        write_position_words(&mut attrs, &positions);
        assert_eq!(read_position_words(&attrs), positions);
    }

    #[test]
    fn apply_players_rejects_bad_number() {
        let mut attrs = blank_attrs();
        let players = vec![PlayerRecord {
            name: String::new(),
            number: 0,
            position: FormationSlot::Goalkeeper,
            role: Role::Goalkeeper,
            head: Head::WhiteDark,
            star: false,
        }];
        let err = apply_players(&mut attrs, &players).unwrap_err();
        assert!(matches!(err, RomError::OutOfRange { .. }));
    }
}
