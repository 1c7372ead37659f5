//! Room derivation: closed room polygons paired with the AOID text placed inside them.

use super::config::ValidationConfig;
use super::domain::{Finding, ReviewStatus, Room};
use super::geometry::{area, contains_point, is_closed, Polygon};
use super::identifiers::AoidOccurrence;
use crate::drawing::{Drawing, AOID_LAYER, ROOM_POLYGON_LAYER};
use crate::room_list::RoomList;
use std::collections::BTreeMap;

/// Closed outline on the room polygon layer, before room-list data is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomOutline {
    pub handle: String,
    pub aoid: Option<String>,
    pub polygon: Polygon,
    pub area_m2: f64,
}

/// Non-empty texts on the AOID layer, in drawing order.
pub fn aoid_occurrences(drawing: &Drawing) -> Vec<AoidOccurrence> {
    drawing
        .texts()
        .filter(|(entity, text)| entity.layer == AOID_LAYER && !text.value.is_empty())
        .map(|(entity, text)| {
            AoidOccurrence::new(text.value.clone(), Some(text.insertion))
                .with_handle(entity.handle.clone())
        })
        .collect()
}

/// Outlines of every closed room polygon; the first AOID inside a polygon names it.
pub fn outlines(
    drawing: &Drawing,
    occurrences: &[AoidOccurrence],
    config: &ValidationConfig,
) -> Vec<RoomOutline> {
    drawing
        .polylines_on(ROOM_POLYGON_LAYER)
        .filter_map(|(entity, polyline)| {
            let polygon = polyline.polygon();
            if !polygon.is_finite() || !is_closed(&polygon, config.epsilon) {
                return None;
            }
            let aoid = occurrences
                .iter()
                .find(|occurrence| {
                    occurrence
                        .location
                        .is_some_and(|location| contains_point(&polygon, location))
                })
                .map(|occurrence| occurrence.value.clone());
            Some(RoomOutline {
                handle: entity.handle.clone(),
                aoid,
                area_m2: config.to_square_meters(area(&polygon)),
                polygon,
            })
        })
        .collect()
}

/// Worst severity among findings tied to the outline, either by handle or by a location
/// inside the polygon.
pub fn outline_status(outline: &RoomOutline, findings: &[Finding]) -> ReviewStatus {
    findings
        .iter()
        .filter(|finding| {
            finding.handle.as_deref() == Some(outline.handle.as_str())
                || finding
                    .location
                    .is_some_and(|location| contains_point(&outline.polygon, location))
        })
        .map(|finding| ReviewStatus::from_severity(finding.severity))
        .max()
        .unwrap_or(ReviewStatus::Ok)
}

/// Rooms for every named outline, with function from the room list and status from the
/// findings of the run.
pub fn build_rooms(
    outlines: &[RoomOutline],
    room_list: &RoomList,
    findings: &[Finding],
) -> Vec<Room> {
    outlines
        .iter()
        .filter_map(|outline| {
            let aoid = outline.aoid.clone()?;
            let function = room_list
                .get(&aoid)
                .map(|entry| entry.function)
                .unwrap_or_default();
            Some(Room {
                function,
                handle: Some(outline.handle.clone()),
                polygon: outline.polygon.clone(),
                area_m2: outline.area_m2,
                status: outline_status(outline, findings),
                aoid,
            })
        })
        .collect()
}

/// AOID to status; an AOID used by several rooms keeps the worst status.
pub fn room_statuses(rooms: &[Room]) -> BTreeMap<String, ReviewStatus> {
    let mut statuses = BTreeMap::new();
    for room in rooms {
        statuses
            .entry(room.aoid.clone())
            .and_modify(|status: &mut ReviewStatus| *status = (*status).max(room.status))
            .or_insert(room.status);
    }
    statuses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{Entity, Polyline, Shape, TextLabel, BYLAYER};
    use crate::room_list::RoomListEntry;
    use crate::validation::domain::{RoomFunction, RuleCode};
    use crate::validation::geometry::Point;

    fn square(handle: &str, x: f64, closed: bool) -> Entity {
        Entity {
            handle: handle.to_string(),
            kind: "LWPOLYLINE".to_string(),
            layer: ROOM_POLYGON_LAYER.to_string(),
            color: BYLAYER,
            shape: Shape::Polyline(Polyline {
                closed,
                width: 0.0,
                points: vec![
                    Point::new(x, 0.0),
                    Point::new(x + 4000.0, 0.0),
                    Point::new(x + 4000.0, 3000.0),
                    Point::new(x, 3000.0),
                ],
            }),
        }
    }

    fn aoid(handle: &str, value: &str, x: f64) -> Entity {
        Entity {
            handle: handle.to_string(),
            kind: "TEXT".to_string(),
            layer: AOID_LAYER.to_string(),
            color: BYLAYER,
            shape: Shape::Text(TextLabel {
                value: value.to_string(),
                insertion: Point::new(x, 1500.0),
                height: 100.0,
                style: "Standard".to_string(),
            }),
        }
    }

    fn drawing() -> Drawing {
        Drawing {
            entities: vec![
                square("10", 0.0, true),
                square("11", 5000.0, true),
                square("12", 10000.0, false),
                aoid("20", "2011.DM.04.001", 2000.0),
                aoid("21", "2011.DM.04.002", 7000.0),
            ],
            ..Drawing::default()
        }
    }

    #[test]
    fn outlines_pick_up_contained_aoids() {
        let drawing = drawing();
        let occurrences = aoid_occurrences(&drawing);
        let outlines = outlines(&drawing, &occurrences, &ValidationConfig::default());

        assert_eq!(outlines.len(), 2);
        assert_eq!(outlines[0].aoid.as_deref(), Some("2011.DM.04.001"));
        assert_eq!(outlines[1].aoid.as_deref(), Some("2011.DM.04.002"));
        assert!((outlines[0].area_m2 - 12.0).abs() < 1e-9);
    }

    #[test]
    fn rooms_take_function_and_status() {
        let drawing = drawing();
        let occurrences = aoid_occurrences(&drawing);
        let outlines = outlines(&drawing, &occurrences, &ValidationConfig::default());
        let list: RoomList = vec![RoomListEntry {
            function: RoomFunction::Office,
            ..RoomListEntry::new("2011.DM.04.001")
        }]
        .into_iter()
        .collect();
        let findings = vec![
            Finding::warning(RuleCode::Aoid003, "unlisted").at(Some(Point::new(7000.0, 1500.0))),
            Finding::error(RuleCode::Geom005, "width").for_handle("10"),
        ];

        let rooms = build_rooms(&outlines, &list, &findings);
        let statuses = room_statuses(&rooms);

        assert_eq!(rooms[0].function, RoomFunction::Office);
        assert_eq!(rooms[1].function, RoomFunction::Unknown);
        assert_eq!(statuses["2011.DM.04.001"], ReviewStatus::Error);
        assert_eq!(statuses["2011.DM.04.002"], ReviewStatus::Warning);
    }

    #[test]
    fn info_findings_leave_rooms_ok() {
        let drawing = drawing();
        let occurrences = aoid_occurrences(&drawing);
        let outlines = outlines(&drawing, &occurrences, &ValidationConfig::default());
        let findings =
            vec![Finding::info(RuleCode::Text004, "color").at(Some(Point::new(2000.0, 1500.0)))];

        assert_eq!(outline_status(&outlines[0], &findings), ReviewStatus::Ok);
    }
}
