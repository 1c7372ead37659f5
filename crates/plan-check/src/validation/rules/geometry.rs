use super::{finite_polygon, Rule, RuleContext, RuleFailure};
use crate::drawing::OUTLINE_LAYERS;
use crate::validation::domain::{Finding, RuleCategory, RuleCode, Severity};
use crate::validation::geometry::{
    first_non_planar, is_closed, polygons_overlap, self_intersection,
};

pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule::new(
            RuleCode::Geom001,
            "Polylinien geschlossen",
            RuleCategory::Geometry,
            Severity::Error,
            "Prüft, ob alle Raumpolygone geschlossen sind (Start- und Endpunkt identisch)",
            outlines_closed,
        ),
        Rule::new(
            RuleCode::Geom002,
            "Polylinien planar",
            RuleCategory::Geometry,
            Severity::Error,
            "Prüft, ob alle Polylinien auf Z=0 liegen (2D-Konformität)",
            polylines_planar,
        ),
        Rule::new(
            RuleCode::Geom003,
            "Keine Selbstüberschneidungen",
            RuleCategory::Geometry,
            Severity::Error,
            "Prüft, ob Raumpolygone sich nicht selbst überschneiden",
            no_self_intersections,
        ),
        Rule::new(
            RuleCode::Geom004,
            "Minimale Raumgrösse",
            RuleCategory::Geometry,
            Severity::Warning,
            "Prüft, ob alle Räume eine Mindestfläche von 1 m² haben",
            minimum_room_area,
        ),
        Rule::new(
            RuleCode::Geom005,
            "Polylinienbreite 0",
            RuleCategory::Geometry,
            Severity::Warning,
            "Prüft, ob alle Polylinien mit Breite 0 gezeichnet sind",
            zero_width,
        ),
        Rule::new(
            RuleCode::Geom006,
            "Keine Raumüberlappungen",
            RuleCategory::Geometry,
            Severity::Error,
            "Prüft, ob sich Raumpolygone nicht gegenseitig überlappen",
            no_room_overlaps,
        ),
        Rule::new(
            RuleCode::Geom007,
            "Fläche gemäss Raumliste",
            RuleCategory::Geometry,
            Severity::Warning,
            "Prüft, ob die gezeichnete Raumfläche der Fläche in der Raumliste entspricht",
            area_matches_room_list,
        ),
    ]
}

fn outlines_closed(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    let mut findings = Vec::new();
    for (entity, polyline) in ctx.drawing.polylines() {
        if !OUTLINE_LAYERS.contains(&entity.layer.as_str()) {
            continue;
        }
        let polygon = finite_polygon(entity, polyline)?;
        if !is_closed(&polygon, ctx.config.epsilon) {
            findings.push(
                Finding::error(
                    RuleCode::Geom001,
                    format!("Polyline on layer \"{}\" is not closed", entity.layer),
                )
                .at(polygon.first())
                .on_layer(entity.layer.clone())
                .for_handle(entity.handle.clone()),
            );
        }
    }
    Ok(findings)
}

fn polylines_planar(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    let mut findings = Vec::new();
    for (entity, polyline) in ctx.drawing.polylines() {
        let polygon = finite_polygon(entity, polyline)?;
        if let Some(point) = first_non_planar(&polygon, ctx.config.epsilon) {
            findings.push(
                Finding::error(
                    RuleCode::Geom002,
                    format!("Polyline is not planar (z = {})", point.z),
                )
                .at(Some(point))
                .on_layer(entity.layer.clone())
                .for_handle(entity.handle.clone()),
            );
        }
    }
    Ok(findings)
}

fn no_self_intersections(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    let mut findings = Vec::new();
    for (entity, polyline) in ctx.drawing.polylines() {
        if !OUTLINE_LAYERS.contains(&entity.layer.as_str()) {
            continue;
        }
        let polygon = finite_polygon(entity, polyline)?;
        if let Some(point) = self_intersection(&polygon, ctx.config.epsilon) {
            findings.push(
                Finding::error(
                    RuleCode::Geom003,
                    format!("Polygon on layer \"{}\" intersects itself", entity.layer),
                )
                .at(Some(point))
                .on_layer(entity.layer.clone())
                .for_handle(entity.handle.clone()),
            );
        }
    }
    Ok(findings)
}

fn minimum_room_area(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    let minimum = ctx.config.min_room_area_m2;
    Ok(ctx
        .outlines
        .iter()
        .filter(|outline| outline.area_m2 < minimum)
        .map(|outline| {
            Finding::warning(
                RuleCode::Geom004,
                format!(
                    "Room area {:.3} m² is below the minimum of {} m²",
                    outline.area_m2, minimum
                ),
            )
            .at(outline.polygon.first())
            .on_layer(crate::drawing::ROOM_POLYGON_LAYER)
            .for_handle(outline.handle.clone())
        })
        .collect())
}

fn zero_width(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    Ok(ctx
        .drawing
        .polylines()
        .filter(|(_, polyline)| polyline.width != 0.0)
        .map(|(entity, polyline)| {
            Finding::warning(
                RuleCode::Geom005,
                format!("Polyline width is {}, expected 0", polyline.width),
            )
            .at(entity.anchor())
            .on_layer(entity.layer.clone())
            .for_handle(entity.handle.clone())
        })
        .collect())
}

/// One finding per overlapping pair, attached to the earlier outline.
fn no_room_overlaps(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    let mut findings = Vec::new();
    for (index, first) in ctx.outlines.iter().enumerate() {
        for second in &ctx.outlines[index + 1..] {
            if polygons_overlap(&first.polygon, &second.polygon, ctx.config.epsilon) {
                findings.push(
                    Finding::error(
                        RuleCode::Geom006,
                        format!(
                            "Room polygons {} and {} overlap",
                            first.handle, second.handle
                        ),
                    )
                    .at(first.polygon.first())
                    .on_layer(crate::drawing::ROOM_POLYGON_LAYER)
                    .for_handle(first.handle.clone()),
                );
            }
        }
    }
    Ok(findings)
}

/// Skipped while no room list is supplied and for entries without an area.
fn area_matches_room_list(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    if ctx.room_list.is_empty() {
        return Ok(Vec::new());
    }

    let tolerance = ctx.config.area_tolerance;
    let mut findings = Vec::new();
    for outline in &ctx.outlines {
        let Some(aoid) = outline.aoid.as_deref() else {
            continue;
        };
        let Some(listed) = ctx.room_list.get(aoid).and_then(|entry| entry.area_m2) else {
            continue;
        };
        if !listed.is_finite() {
            return Err(RuleFailure::Unavailable(format!(
                "room list area of \"{aoid}\" is not a number"
            )));
        }

        let deviation = (outline.area_m2 - listed).abs();
        if deviation > listed.abs() * tolerance {
            findings.push(
                Finding::warning(
                    RuleCode::Geom007,
                    format!(
                        "Room \"{}\" measures {:.2} m², room list states {:.2} m²",
                        aoid, outline.area_m2, listed
                    ),
                )
                .at(outline.polygon.first())
                .on_layer(crate::drawing::ROOM_POLYGON_LAYER)
                .for_handle(outline.handle.clone()),
            );
        }
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{Drawing, Entity, Polyline, Shape, TextLabel, BYLAYER};
    use crate::room_list::{RoomList, RoomListEntry};
    use crate::validation::config::ValidationConfig;
    use crate::validation::geometry::Point;

    fn polyline(handle: &str, layer: &str, closed: bool, points: &[(f64, f64)]) -> Entity {
        Entity {
            handle: handle.to_string(),
            kind: "LWPOLYLINE".to_string(),
            layer: layer.to_string(),
            color: BYLAYER,
            shape: Shape::Polyline(Polyline {
                closed,
                width: 0.0,
                points: points.iter().map(|(x, y)| Point::new(*x, *y)).collect(),
            }),
        }
    }

    fn rectangle(handle: &str, x: f64, width: f64, height: f64) -> Entity {
        polyline(
            handle,
            "R_RAUMPOLYGON",
            true,
            &[(x, 0.0), (x + width, 0.0), (x + width, height), (x, height)],
        )
    }

    fn aoid(value: &str, x: f64, y: f64) -> Entity {
        Entity {
            handle: format!("T-{value}"),
            kind: "TEXT".to_string(),
            layer: "R_AOID".to_string(),
            color: BYLAYER,
            shape: Shape::Text(TextLabel {
                value: value.to_string(),
                insertion: Point::new(x, y),
                height: 100.0,
                style: "Standard".to_string(),
            }),
        }
    }

    fn run(check: super::super::CheckFn, drawing: &Drawing, list: &RoomList) -> Vec<Finding> {
        let config = ValidationConfig::default();
        let ctx = RuleContext::new(drawing, list, &config);
        check(&ctx).expect("check runs")
    }

    #[test]
    fn open_outline_is_reported_once() {
        let drawing = Drawing {
            entities: vec![
                polyline("A1", "R_RAUMPOLYGON", false, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
                polyline("A2", "V_PLANLAYOUT", false, &[(0.0, 0.0), (10.0, 0.0)]),
                rectangle("A3", 0.0, 10.0, 10.0),
            ],
            ..Drawing::default()
        };

        let findings = run(outlines_closed, &drawing, &RoomList::default());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].handle.as_deref(), Some("A1"));
    }

    #[test]
    fn raised_vertex_breaks_planarity() {
        let mut entity = rectangle("B1", 0.0, 10.0, 10.0);
        if let Shape::Polyline(polyline) = &mut entity.shape {
            polyline.points[2].z = 150.0;
        }
        let drawing = Drawing {
            entities: vec![entity],
            ..Drawing::default()
        };

        let findings = run(polylines_planar, &drawing, &RoomList::default());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location.map(|point| point.z), Some(150.0));
    }

    #[test]
    fn small_rooms_are_warned() {
        let drawing = Drawing {
            entities: vec![
                rectangle("C1", 0.0, 900.0, 900.0),
                rectangle("C2", 2000.0, 4000.0, 3000.0),
            ],
            ..Drawing::default()
        };

        let findings = run(minimum_room_area, &drawing, &RoomList::default());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].handle.as_deref(), Some("C1"));
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn overlapping_rooms_are_paired() {
        let drawing = Drawing {
            entities: vec![
                rectangle("D1", 0.0, 4000.0, 3000.0),
                rectangle("D2", 3000.0, 4000.0, 3000.0),
                rectangle("D3", 7000.0, 4000.0, 3000.0),
            ],
            ..Drawing::default()
        };

        let findings = run(no_room_overlaps, &drawing, &RoomList::default());

        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("D1"));
        assert!(findings[0].message.contains("D2"));
    }

    #[test]
    fn wide_polylines_are_warned() {
        let mut entity = rectangle("E1", 0.0, 10.0, 10.0);
        if let Shape::Polyline(polyline) = &mut entity.shape {
            polyline.width = 25.0;
        }
        let drawing = Drawing {
            entities: vec![entity],
            ..Drawing::default()
        };

        let findings = run(zero_width, &drawing, &RoomList::default());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Polyline width is 25, expected 0");
    }

    #[test]
    fn drawn_area_is_compared_with_room_list() {
        let drawing = Drawing {
            entities: vec![
                rectangle("F1", 0.0, 4000.0, 3000.0),
                rectangle("F2", 5000.0, 4000.0, 3000.0),
                aoid("2011.DM.04.001", 2000.0, 1500.0),
                aoid("2011.DM.04.002", 7000.0, 1500.0),
            ],
            ..Drawing::default()
        };
        let list: RoomList = vec![
            RoomListEntry {
                area_m2: Some(12.1),
                ..RoomListEntry::new("2011.DM.04.001")
            },
            RoomListEntry {
                area_m2: Some(18.0),
                ..RoomListEntry::new("2011.DM.04.002")
            },
        ]
        .into_iter()
        .collect();

        let findings = run(area_matches_room_list, &drawing, &list);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].handle.as_deref(), Some("F2"));
        assert!(run(area_matches_room_list, &drawing, &RoomList::default()).is_empty());
    }

    #[test]
    fn non_finite_coordinates_fail_the_check() {
        let drawing = Drawing {
            entities: vec![polyline(
                "G1",
                "R_RAUMPOLYGON",
                true,
                &[(0.0, 0.0), (f64::NAN, 0.0), (10.0, 10.0)],
            )],
            ..Drawing::default()
        };
        let config = ValidationConfig::default();
        let list = RoomList::default();
        let ctx = RuleContext::new(&drawing, &list, &config);

        let err = outlines_closed(&ctx).expect_err("nan coordinates");
        assert!(matches!(err, RuleFailure::NonFiniteGeometry { handle } if handle == "G1"));
    }

    #[test]
    fn non_numeric_listed_area_fails_the_check() {
        let drawing = Drawing {
            entities: vec![
                rectangle("F1", 0.0, 4000.0, 3000.0),
                aoid("2011.DM.04.001", 2000.0, 1500.0),
            ],
            ..Drawing::default()
        };
        let list: RoomList = std::iter::once(RoomListEntry {
            area_m2: Some(f64::NAN),
            ..RoomListEntry::new("2011.DM.04.001")
        })
        .collect();
        let config = ValidationConfig::default();
        let ctx = RuleContext::new(&drawing, &list, &config);

        let err = area_matches_room_list(&ctx).expect_err("nan area");
        assert!(matches!(err, RuleFailure::Unavailable(reason) if reason.contains("2011.DM.04.001")));
    }
}
