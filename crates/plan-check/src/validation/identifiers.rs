//! AOID (room identifier) validation.

use super::domain::{Finding, RuleCode};
use super::geometry::{contains_point, Point, Polygon};
use crate::room_list::RoomList;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// One AOID text as placed in the drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct AoidOccurrence {
    pub value: String,
    pub location: Option<Point>,
    pub handle: String,
}

impl AoidOccurrence {
    pub fn new(value: impl Into<String>, location: Option<Point>) -> Self {
        Self {
            value: value.into(),
            location,
            handle: String::new(),
        }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = handle.into();
        self
    }
}

/// `NNNN.XX.NN.NNN`, e.g. `2011.DM.04.015`.
pub fn is_well_formed(value: &str) -> bool {
    static AOID_RE: OnceLock<Regex> = OnceLock::new();
    let regex = AOID_RE.get_or_init(|| {
        Regex::new(r"^\d{4}\.[A-Z]{2}\.\d{2}\.\d{3}$").expect("aoid regex compiles")
    });
    regex.is_match(value)
}

pub fn format_findings(occurrences: &[AoidOccurrence]) -> Vec<Finding> {
    occurrences
        .iter()
        .filter(|occurrence| !is_well_formed(&occurrence.value))
        .map(|occurrence| {
            Finding::warning(
                RuleCode::Aoid001,
                format!("AOID format invalid: \"{}\"", occurrence.value),
            )
            .at(occurrence.location)
            .for_handle(occurrence.handle.clone())
        })
        .collect()
}

/// One error per occurrence after the first of each value.
pub fn duplicate_findings(occurrences: &[AoidOccurrence]) -> Vec<Finding> {
    let mut seen = HashSet::new();
    occurrences
        .iter()
        .filter(|occurrence| !seen.insert(occurrence.value.as_str()))
        .map(|occurrence| {
            Finding::error(
                RuleCode::Aoid002,
                format!("Duplicate AOID found: \"{}\"", occurrence.value),
            )
            .at(occurrence.location)
            .for_handle(occurrence.handle.clone())
        })
        .collect()
}

/// Drawing AOIDs that the room list does not know. Reported once per value, at its first
/// placement. Skipped while no room list is supplied.
pub fn unlisted_findings(occurrences: &[AoidOccurrence], room_list: &RoomList) -> Vec<Finding> {
    if room_list.is_empty() {
        return Vec::new();
    }

    let listed = room_list.aoids();
    let mut reported = HashSet::new();
    occurrences
        .iter()
        .filter(|occurrence| !listed.contains(occurrence.value.as_str()))
        .filter(|occurrence| reported.insert(occurrence.value.as_str()))
        .map(|occurrence| {
            Finding::warning(
                RuleCode::Aoid003,
                format!("AOID \"{}\" not found in Excel room list", occurrence.value),
            )
            .at(occurrence.location)
            .for_handle(occurrence.handle.clone())
        })
        .collect()
}

/// Room-list entries with no AOID text in the drawing, in room-list order.
pub fn undrawn_findings(occurrences: &[AoidOccurrence], room_list: &RoomList) -> Vec<Finding> {
    let drawn: HashSet<&str> = occurrences
        .iter()
        .map(|occurrence| occurrence.value.as_str())
        .collect();
    let mut reported = HashSet::new();
    room_list
        .entries()
        .iter()
        .filter(|entry| !drawn.contains(entry.aoid.as_str()))
        .filter(|entry| reported.insert(entry.aoid.as_str()))
        .map(|entry| {
            Finding::error(
                RuleCode::Aoid004,
                format!("Room \"{}\" from room list is missing in drawing", entry.aoid),
            )
        })
        .collect()
}

/// AOID texts whose insertion point lies outside every room polygon.
pub fn placement_findings(occurrences: &[AoidOccurrence], rooms: &[&Polygon]) -> Vec<Finding> {
    if rooms.is_empty() {
        return Vec::new();
    }

    occurrences
        .iter()
        .filter_map(|occurrence| {
            let location = occurrence.location?;
            (!rooms.iter().any(|room| contains_point(room, location))).then(|| {
                Finding::error(
                    RuleCode::Aoid005,
                    format!("AOID \"{}\" is not placed inside a room polygon", occurrence.value),
                )
                .at(Some(location))
                .for_handle(occurrence.handle.clone())
            })
        })
        .collect()
}

/// Format, uniqueness and room-list cross references, in that order.
pub fn validate(occurrences: &[AoidOccurrence], room_list: &RoomList) -> Vec<Finding> {
    let mut findings = format_findings(occurrences);
    findings.extend(duplicate_findings(occurrences));
    findings.extend(unlisted_findings(occurrences, room_list));
    if !room_list.is_empty() {
        findings.extend(undrawn_findings(occurrences, room_list));
    }
    findings
}
