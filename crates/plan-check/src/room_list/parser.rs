use super::mapping::function_for_label;
use super::{RoomListEntry, RoomListImportError};
use crate::validation::domain::AreaCategory;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
struct RoomListRow {
    #[serde(rename = "AOID", alias = "aoid", alias = "Aoid", default)]
    aoid: Option<String>,
    #[serde(
        rename = "Name",
        alias = "Raumname",
        alias = "name",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    name: Option<String>,
    #[serde(
        rename = "Funktion",
        alias = "Function",
        alias = "Nutzung",
        alias = "function",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    function: Option<String>,
    #[serde(
        rename = "Fläche",
        alias = "Flaeche",
        alias = "Area",
        alias = "area",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    area: Option<String>,
    #[serde(
        rename = "Flächenart",
        alias = "Flaechenart",
        alias = "Category",
        alias = "category",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    category: Option<String>,
}

pub(super) fn parse_entries(raw: &str) -> Result<Vec<RoomListEntry>, RoomListImportError> {
    let raw = raw.trim_start_matches('\u{feff}');
    let delimiter = sniff_delimiter(raw);
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let has_aoid_column = csv_reader
        .headers()?
        .iter()
        .any(|header| header.trim().eq_ignore_ascii_case("aoid"));
    if !has_aoid_column {
        return Err(RoomListImportError::MissingAoidColumn);
    }

    let mut entries = Vec::new();
    for record in csv_reader.deserialize::<RoomListRow>() {
        let row = record?;
        let Some(aoid) = row.aoid.map(|value| value.trim().to_string()) else {
            continue;
        };
        if aoid.is_empty() {
            continue;
        }

        let area_m2 = match row.area {
            Some(value) => Some(parse_area(&value).ok_or_else(|| {
                RoomListImportError::InvalidArea {
                    aoid: aoid.clone(),
                    value: value.clone(),
                }
            })?),
            None => None,
        };

        entries.push(RoomListEntry {
            function: row
                .function
                .as_deref()
                .map(function_for_label)
                .unwrap_or_default(),
            area_category: row.category.as_deref().and_then(AreaCategory::parse),
            name: row.name,
            area_m2,
            aoid,
        });
    }

    Ok(entries)
}

fn sniff_delimiter(raw: &str) -> u8 {
    let header = raw.lines().next().unwrap_or_default();
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

/// The rightmost of `,` and `.` is the decimal separator; the other one groups thousands.
fn parse_area(value: &str) -> Option<f64> {
    let trimmed = value
        .trim()
        .trim_end_matches("m²")
        .trim_end_matches("m2")
        .trim();
    let grouping = match (trimmed.rfind(','), trimmed.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => '.',
        (Some(_), Some(_)) => ',',
        _ => '\'',
    };
    let cleaned: String = trimmed
        .chars()
        .filter(|c| *c != '\'' && *c != grouping)
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|area| area.is_finite() && *area >= 0.0)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::super::{RoomListImportError, RoomListImporter};
    use super::*;
    use crate::validation::domain::RoomFunction;
    use std::io::Cursor;

    #[test]
    fn reads_comma_separated_exports() {
        let csv = "AOID,Name,Funktion,Fläche,Flächenart\n\
                   2011.DM.04.001,Raum 1.01,Sitzungszimmer,24.45,HNF\n\
                   2011.DM.04.002,Raum 1.02,Büro,18.32,HNF\n";
        let list = RoomListImporter::from_reader(Cursor::new(csv)).expect("room list parses");

        assert_eq!(list.len(), 2);
        let first = &list.entries()[0];
        assert_eq!(first.aoid, "2011.DM.04.001");
        assert_eq!(first.name.as_deref(), Some("Raum 1.01"));
        assert_eq!(first.function, RoomFunction::Conference);
        assert_eq!(first.area_m2, Some(24.45));
        assert_eq!(first.area_category, Some(AreaCategory::Hnf));
    }

    #[test]
    fn reads_semicolon_exports_with_decimal_commas() {
        let csv = "AOID;Raumname;Nutzung;Fläche\n2011.DM.04.006;WC Damen;WC;12,45\n;;;\n";
        let list = RoomListImporter::from_reader(Cursor::new(csv)).expect("room list parses");

        assert_eq!(list.len(), 1);
        assert_eq!(list.entries()[0].function, RoomFunction::Wc);
        assert_eq!(list.entries()[0].area_m2, Some(12.45));
    }

    #[test]
    fn thousands_separators_are_dropped() {
        let csv = "AOID;Fläche\n\
                   2011.DM.04.001;1.234,50\n\
                   2011.DM.04.002;1'234.5 m²\n\
                   2011.DM.04.003;1,234.50\n";
        let list = RoomListImporter::from_reader(Cursor::new(csv)).expect("room list parses");

        let areas: Vec<_> = list.entries().iter().map(|entry| entry.area_m2).collect();
        assert_eq!(areas, vec![Some(1234.5), Some(1234.5), Some(1234.5)]);
    }

    #[test]
    fn optional_columns_may_be_missing() {
        let csv = "AOID\n2011.DM.04.001\n2011.DM.04.002\n";
        let list = RoomListImporter::from_reader(Cursor::new(csv)).expect("room list parses");
        assert_eq!(list.len(), 2);
        assert!(list.contains("2011.DM.04.002"));
        assert_eq!(list.entries()[1].area_m2, None);
    }

    #[test]
    fn rejects_lists_without_aoid_column() {
        let csv = "Raum,Fläche\n1.01,24\n";
        let err = RoomListImporter::from_reader(Cursor::new(csv)).expect_err("aoid required");
        assert!(matches!(err, RoomListImportError::MissingAoidColumn));
    }

    #[test]
    fn rejects_unreadable_areas() {
        let csv = "AOID,Fläche\n2011.DM.04.001,gross\n";
        let err = RoomListImporter::from_reader(Cursor::new(csv)).expect_err("bad area");
        match err {
            RoomListImportError::InvalidArea { aoid, value } => {
                assert_eq!(aoid, "2011.DM.04.001");
                assert_eq!(value, "gross");
            }
            other => panic!("expected invalid area, got {other:?}"),
        }
    }
}
