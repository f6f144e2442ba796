//! Validates a candidate [`TeamsDoc`] against a ROM's structural
//! constraints without writing anything back.
//!
//! Errors are structural/content violations that make `update` refuse
//! to proceed; warnings are soft advisories (formation slot coverage)
//! that never block a write. Content errors accumulate up to
//! [`MAX_ERRORS`] so a caller sees multiple issues per pass, rather than
//! stopping at the first one.

use std::collections::HashSet;

use crate::attrs::FormationSlot;
use crate::bitcodec::value_for_char;
use crate::doc::{TeamRecord, TeamsDoc, CATEGORIES};
use crate::error::Result;
use crate::locator::RegionLocator;
use crate::walker;

/// Cap on accumulated content errors per [`validate`] call.
pub const MAX_ERRORS: usize = 64;

/// Expected number of players on a full squad.
const SQUAD_SIZE: usize = 16;
/// Expected number of outfield starting slots (0..=10).
const STARTER_SLOTS: usize = 11;
/// Expected number of substitutes (formation slot 15).
const EXPECTED_SUBS: usize = 5;

/// The outcome of a [`validate`] call: structural/content errors and
/// soft warnings, both as human-readable strings (spec §6's facade
/// shape).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Structural or content violations. A non-empty list means
    /// `update` must refuse to proceed.
    pub errors: Vec<String>,
    /// Soft advisories that never block a write.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// True if no errors were recorded (warnings may still be present).
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

fn bad_chars(text: &str) -> Vec<char> {
    text.to_uppercase().chars().filter(|&c| value_for_char(c).is_none()).collect()
}

/// Validates `doc` against the region/block structure of `rom`.
///
/// # Errors
///
/// Returns [`crate::error::RomError`] only for conditions that prevent
/// validation from running at all (the pointer table cannot be located,
/// or a region's block chain is corrupt). Content problems with `doc`
/// itself are reported in the returned [`ValidationReport`], not as an
/// `Err`.
pub fn validate(rom: &[u8], doc: &TeamsDoc, locator: &RegionLocator) -> Result<ValidationReport> {
    let table = locator.locate(rom)?;
    let region_bounds = [
        (table.nat_start, table.nat_end),
        (table.club_start, table.club_end),
        (table.cust_start, table.cust_end),
    ];
    let category_docs = [&doc.national, &doc.club, &doc.custom];

    let mut report = ValidationReport::default();

    'categories: for (cat_idx, (cat, teams)) in CATEGORIES.iter().zip(category_docs.iter()).enumerate() {
        let (start, end) = region_bounds[cat_idx];
        let rom_count = walker::chain_walk_region(rom, start, end)?.len();

        if teams.len() != rom_count {
            report.errors.push(format!(
                "{cat}: expected {rom_count} teams in JSON, got {}",
                teams.len()
            ));
            continue;
        }

        for (i, team) in teams.iter().enumerate() {
            if report.errors.len() >= MAX_ERRORS {
                break 'categories;
            }
            validate_team(cat, i, team, &mut report);
        }
    }

    Ok(report)
}

fn validate_team(cat: &str, i: usize, team: &TeamRecord, report: &mut ValidationReport) {
    let ctx = format!("{cat} team {} '{}'", i + 1, team.team);

    if team.players.len() != SQUAD_SIZE {
        report.errors.push(format!("{ctx}: expected 16 players, got {}", team.players.len()));
    }

    for (label, text) in [("team", &team.team), ("country", &team.country), ("coach", &team.coach)] {
        let bad = bad_chars(text);
        if !bad.is_empty() {
            report.errors.push(format!("{ctx} {label}: invalid chars {bad:?} in '{text}'"));
        }
    }

    if team.skill > 7 {
        report.errors.push(format!("{ctx}: skill must be 0-7, got {}", team.skill));
    }
    if team.flag > 1 {
        report.errors.push(format!("{ctx}: flag must be 0 or 1, got {}", team.flag));
    }

    let mut starter_slots = Vec::new();
    let mut sub_count = 0usize;

    for (j, p) in team.players.iter().enumerate() {
        let pctx = format!("{ctx} player {}", j + 1);
        let bad = bad_chars(&p.name);
        if !bad.is_empty() {
            report.errors.push(format!("{pctx}: invalid chars {bad:?} in '{}'", p.name));
        }
        if !(1..=16).contains(&p.number) {
            report.errors.push(format!("{pctx}: number must be 1-16, got {}", p.number));
        }
        if p.position == FormationSlot::Sub {
            sub_count += 1;
        } else {
            starter_slots.push(p.position.to_int());
        }
    }

    check_formation_coverage(&ctx, &starter_slots, sub_count, report);
}

fn check_formation_coverage(ctx: &str, starter_slots: &[u8], sub_count: usize, report: &mut ValidationReport) {
    let mut sorted = starter_slots.to_vec();
    sorted.sort_unstable();
    let expected: Vec<u8> = (0..STARTER_SLOTS as u8).collect();

    if sorted != expected {
        let present: HashSet<u8> = starter_slots.iter().copied().collect();
        let missing: Vec<u8> = (0..STARTER_SLOTS as u8).filter(|s| !present.contains(s)).collect();

        let mut seen = HashSet::new();
        let mut duped = Vec::new();
        for &s in starter_slots {
            if !seen.insert(s) && !duped.contains(&s) {
                duped.push(s);
            }
        }
        duped.sort_unstable();

        let name_of = |v: u8| {
            FormationSlot::from_int(v).map_or_else(|| v.to_string(), |s| s.to_name().to_string())
        };
        let missing_names: Vec<String> = missing.iter().copied().map(name_of).collect();
        let duped_names: Vec<String> = duped.iter().copied().map(name_of).collect();

        report.warnings.push(format!(
            "{ctx}: formation slots invalid — missing {missing_names:?}, duplicated {duped_names:?}"
        ));
    }

    if sub_count != EXPECTED_SUBS {
        report.warnings.push(format!("{ctx}: expected 5 subs, got {sub_count}"));
    }
}
