//! Synthetic ROM fixture builder shared by the integration tests.
//!
//! No real Sensible Soccer ROM ships in this workspace, so the fixture
//! builder constructs a minimal but structurally valid ROM image using
//! the crate's own `builder::build_region`, the same code path
//! `update` uses to write real ROMs. This means a round-trip through
//! `decode` is exercising the identical region-building logic the tests
//! are checking the output of, by construction rather than by accident.

#![allow(dead_code)]

use ss_rom_teams::attrs::{Colour, FormationSlot, Head, Role, Style, Tactic};
use ss_rom_teams::builder::build_region;
use ss_rom_teams::doc::{Kit, KitDescriptor, PlayerRecord, TeamRecord};

/// Start of the national region in every fixture ROM. Chosen so the
/// first block's text (`NAT_START + 150`) falls inside the locator's
/// `0x020000..0x030000` scan window.
pub const NAT_START: usize = 0x020000;
/// Total size of every fixture ROM, comfortably above the locator's
/// `nat_start < 0x040000` requirement.
pub const ROM_SIZE: usize = 0x040000;
/// Offset the fixture's 6-longword pointer table is written at.
pub const TABLE_BASE: usize = 0x001000;

fn blank_kit() -> Kit {
    let d = KitDescriptor {
        style: Style::Plain,
        shirt1: Colour::White,
        shirt2: Colour::Blue,
        shorts: Colour::White,
        socks: Colour::Red,
    };
    Kit { first: d, second: d }
}

/// Letters used to distinguish player names within a squad. The charset
/// has no digit mapping (see `bitcodec::value_for_char`), so slots are
/// told apart with letters rather than numbers.
const SLOT_LETTERS: &[char] = &['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K'];
const SUB_LETTERS: &[char] = &['L', 'M', 'N', 'O', 'P'];

/// Builds one full 16-player squad: 11 starters occupying the distinct
/// formation slots, 5 substitutes.
pub fn full_squad(prefix: &str) -> Vec<PlayerRecord> {
    let mut players = Vec::with_capacity(16);
    for slot in 0..11u8 {
        let letter = SLOT_LETTERS[slot as usize];
        players.push(PlayerRecord {
            name: format!("{prefix}STARTER{letter}"),
            number: slot + 1,
            position: FormationSlot::from_int(slot).unwrap(),
            role: Role::Midfielder,
            head: Head::WhiteDark,
            star: slot == 9,
        });
    }
    for (i, &letter) in SUB_LETTERS.iter().enumerate() {
        players.push(PlayerRecord {
            name: format!("{prefix}SUB{letter}"),
            number: 12 + i as u8,
            position: FormationSlot::Sub,
            role: Role::Midfielder,
            head: Head::BlackDark,
            star: false,
        });
    }
    players
}

/// Builds one team with a full squad and the given name/country/coach.
pub fn team(name: &str, country: &str, coach: &str) -> TeamRecord {
    TeamRecord {
        team: name.to_string(),
        country: country.to_string(),
        coach: coach.to_string(),
        tactic: Tactic::FourFourTwo,
        skill: 3,
        flag: 0,
        kit: blank_kit(),
        players: full_squad(name),
    }
}

/// A built fixture ROM plus the team lists it was built from, so tests
/// can compare decoded output back against the source.
pub struct Fixture {
    pub rom: Vec<u8>,
    pub national: Vec<TeamRecord>,
    pub club: Vec<TeamRecord>,
    pub custom: Vec<TeamRecord>,
}

/// Builds a synthetic ROM with the given team lists, leaving `slack`
/// zero bytes of headroom after the custom region before a sentinel
/// non-zero word (simulating the next occupied ROM data `update`'s
/// overflow check scans for).
pub fn build_fixture(national: Vec<TeamRecord>, club: Vec<TeamRecord>, custom: Vec<TeamRecord>, slack: usize) -> Fixture {
    let nat_bytes = build_region_bytes(&national);
    let club_bytes = build_region_bytes(&club);
    let cust_bytes = build_region_bytes(&custom);

    let nat_start = NAT_START;
    let nat_end = nat_start + nat_bytes.len();
    let club_start = nat_end + 2;
    let club_end = club_start + club_bytes.len();
    let cust_start = club_end + 2;
    let cust_end = cust_start + cust_bytes.len();

    let mut rom = vec![0u8; ROM_SIZE];
    rom[nat_start..nat_end].copy_from_slice(&nat_bytes);
    rom[club_start..club_end].copy_from_slice(&club_bytes);
    rom[cust_start..cust_end].copy_from_slice(&cust_bytes);

    // Sentinel non-zero word marking "next occupied data", `slack` bytes
    // after the custom region ends.
    let sentinel_pos = cust_end + slack;
    rom[sentinel_pos..sentinel_pos + 2].copy_from_slice(&0xFFFFu16.to_be_bytes());

    for (i, value) in
        [nat_start, club_start, cust_start, nat_end, club_end, cust_end].into_iter().enumerate()
    {
        let o = TABLE_BASE + i * 4;
        rom[o..o + 4].copy_from_slice(&(value as u32).to_be_bytes());
    }

    Fixture { rom, national, club, custom }
}

fn build_region_bytes(teams: &[TeamRecord]) -> Vec<u8> {
    let attr_blocks: Vec<Vec<u8>> = teams.iter().map(|_| vec![0u8; ss_rom_teams::attrs::ATTR_SIZE]).collect();
    build_region(&attr_blocks, teams, teams).expect("fixture team data must encode cleanly").bytes
}
