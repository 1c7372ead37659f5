use crate::validation::domain::RoomFunction;

const FUNCTION_LABELS: &[(&str, RoomFunction)] = &[
    ("buero", RoomFunction::Office),
    ("office", RoomFunction::Office),
    ("einzelbuero", RoomFunction::Office),
    ("grossraumbuero", RoomFunction::Office),
    ("sitzungszimmer", RoomFunction::Conference),
    ("konferenz", RoomFunction::Conference),
    ("konferenzraum", RoomFunction::Conference),
    ("conference", RoomFunction::Conference),
    ("besprechung", RoomFunction::Meeting),
    ("besprechungsraum", RoomFunction::Meeting),
    ("meeting", RoomFunction::Meeting),
    ("lager", RoomFunction::Storage),
    ("archiv", RoomFunction::Storage),
    ("storage", RoomFunction::Storage),
    ("wc", RoomFunction::Wc),
    ("toilette", RoomFunction::Wc),
    ("sanitaer", RoomFunction::Wc),
    ("halle", RoomFunction::Hall),
    ("foyer", RoomFunction::Hall),
    ("hall", RoomFunction::Hall),
    ("korridor", RoomFunction::Circulation),
    ("gang", RoomFunction::Circulation),
    ("treppenhaus", RoomFunction::Circulation),
    ("verkehrsflaeche", RoomFunction::Circulation),
    ("circulation", RoomFunction::Circulation),
    ("technik", RoomFunction::Technical),
    ("technikraum", RoomFunction::Technical),
    ("technical", RoomFunction::Technical),
];

/// Map a room-list function label (German or English) onto [`RoomFunction`].
pub fn function_for_label(label: &str) -> RoomFunction {
    let normalized = normalize_label(label);
    FUNCTION_LABELS
        .iter()
        .find(|(key, _)| *key == normalized)
        .map(|(_, function)| *function)
        .unwrap_or(RoomFunction::Unknown)
}

fn normalize_label(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace('ä', "ae")
        .replace('ö', "oe")
        .replace('ü', "ue")
        .replace(['-', '_', ' '], "")
}
