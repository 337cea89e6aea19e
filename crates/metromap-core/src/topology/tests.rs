use super::*;

fn two_line_doc() -> &'static str {
    r##"{
        "image_resolution": [400, 600],
        "info_filename": "info.png",
        "font_filename": "map.ttf",
        "lines": [
            {
                "name": "Красная",
                "line_color": "#d6083b",
                "logo_filename": "logo_red.png",
                "type": "metro",
                "priority": 1,
                "start": [100, 100],
                "direction": "right",
                "elements": [
                    { "type": "station", "name": "А", "name_offset": [0, -20],
                      "orientation": "up", "name_relative_to": "down" },
                    { "type": "line_segment", "length": 120 },
                    { "type": "station", "name": "Б", "name_offset": [0, -20],
                      "orientation": "up", "name_relative_to": "down" },
                    { "type": "line_segment", "length": 80 },
                    { "type": "turn", "direction": "down" },
                    { "type": "line_segment", "length": 60 },
                    { "type": "station", "name": "В", "name_offset": [12, 0],
                      "orientation": "right", "name_relative_to": "left" }
                ]
            },
            {
                "name": "Синяя",
                "line_color": "#0078bf",
                "logo_filename": "logo_blue.png",
                "type": "mcd",
                "priority": 2,
                "start": [220, 40],
                "direction": "down",
                "elements": [
                    { "type": "station", "name": "Г", "name_offset": [12, 0],
                      "orientation": "right", "name_relative_to": "left" },
                    { "type": "line_segment", "length": 70 },
                    { "type": "station", "name": "Д", "name_offset": [12, 0],
                      "orientation": "right", "name_relative_to": "left" }
                ]
            }
        ],
        "transfers": [
            {
                "station1": { "line_name": "Красная", "station_name": "Б" },
                "station2": { "line_name": "Синяя", "station_name": "Д" },
                "is_direct": true
            }
        ]
    }"##
}

#[test]
fn station_positions_derive_from_nominal_walk() {
    let network = Network::from_json_str(two_line_doc()).unwrap();
    let line = network.line("Красная").unwrap();

    let (_, a) = line.station("А").unwrap();
    let (_, b) = line.station("Б").unwrap();
    let (_, v) = line.station("В").unwrap();
    assert_eq!(a.position, point(100, 100));
    assert_eq!(b.position, point(220, 100));
    // Turn changes the walk direction; the turn itself does not move the
    // nominal cursor.
    assert_eq!(v.position, point(300, 160));
}

#[test]
fn transfer_closure_is_symmetric() {
    let network = Network::from_json_str(two_line_doc()).unwrap();
    let b = network.station_id("Красная", "Б").unwrap();
    let d = network.station_id("Синяя", "Д").unwrap();

    let b_station = network.station_at(b);
    let d_station = network.station_at(d);
    assert!(b_station.is_transfer());
    assert!(d_station.is_transfer());
    assert_eq!(b_station.transfers[0].station, d);
    assert_eq!(d_station.transfers[0].station, b);
    assert!(b_station.transfers[0].is_direct);
}

#[test]
fn missing_lookups_are_errors() {
    let network = Network::from_json_str(two_line_doc()).unwrap();
    assert!(matches!(
        network.line("Зелёная"),
        Err(Error::LineNotFound { .. })
    ));
    assert!(matches!(
        network.station_id("Красная", "Нет"),
        Err(Error::StationNotFound { .. })
    ));
}

#[test]
fn transfer_naming_unknown_station_fails_build() {
    let mut doc: serde_json::Value = serde_json::from_str(two_line_doc()).unwrap();
    doc["transfers"][0]["station2"]["station_name"] = "Призрак".into();
    let err = Network::from_json_str(&doc.to_string()).unwrap_err();
    assert!(matches!(err, Error::StationNotFound { .. }));
}

#[test]
fn line_without_style_fails_build() {
    let mut doc: serde_json::Value = serde_json::from_str(two_line_doc()).unwrap();
    doc["lines"][0]
        .as_object_mut()
        .unwrap()
        .remove("line_color");
    let err = Network::from_json_str(&doc.to_string()).unwrap_err();
    assert!(matches!(err, Error::InvalidLine { .. }));
}

/// Builds a bare line whose elements carry only what the planned-status scan
/// looks at: `S` station, `s` planned station, `e` explicitly-built station,
/// `-` segment, `p` planned segment, `t` turn.
fn planned_fixture(pattern: &str) -> Line {
    let elements = pattern
        .chars()
        .map(|c| match c {
            'S' => Element::Station(station("x", None)),
            's' => Element::Station(station("x", Some(true))),
            'e' => Element::Station(station("x", Some(false))),
            '-' => Element::Segment(SegmentElement {
                length: 50,
                is_planned: None,
            }),
            'p' => Element::Segment(SegmentElement {
                length: 50,
                is_planned: Some(true),
            }),
            't' => Element::Turn(TurnElement {
                direction: Direction::Down,
                is_planned: None,
            }),
            other => panic!("bad fixture char {other}"),
        })
        .collect();
    Line {
        name: "fixture".to_string(),
        style: LineStyle::Color("#000000".to_string()),
        planned_style: None,
        logo_filename: "logo.png".to_string(),
        kind: LineKind::Metro,
        priority: 0,
        bidirectional: false,
        start_logo_offset: None,
        end_logo_offset: None,
        start: point(0, 0),
        direction: Direction::Right,
        elements,
    }
}

fn station(name: &str, is_planned: Option<bool>) -> StationElement {
    StationElement {
        name: name.to_string(),
        name_offset: (0, 0),
        orientation: Orientation::Up,
        name_relative_to: Anchor::Left,
        hide_name: false,
        is_planned,
        position: point(0, 0),
        transfers: Vec::new(),
    }
}

/// Direct reference implementation: an element is planned iff, scanning
/// outwards in either direction, an explicit planned flag is reachable
/// before any terminating boundary (explicit built flag or unflagged
/// station).
fn planned_oracle(line: &Line, index: usize) -> bool {
    let scan = |indices: &mut dyn Iterator<Item = usize>| -> bool {
        for i in indices {
            match line.elements[i].planned_flag() {
                Some(true) => return true,
                Some(false) => return false,
                None if line.elements[i].is_station() => return false,
                None => {}
            }
        }
        false
    };
    scan(&mut (index..line.elements.len())) || scan(&mut (0..=index).rev())
}

#[test]
fn planned_resolution_matches_reference() {
    let patterns = [
        "S-S-S",
        "S-s-S",
        "s-S",
        "S-ts-S",
        "e-s",
        "Sps",
        "S-e-s-S",
        "s-t-s",
        "S",
        "s",
        "St-S-s",
        "e-S-s-e",
    ];
    for pattern in patterns {
        let line = planned_fixture(pattern);
        for index in 0..line.elements.len() {
            assert_eq!(
                line.is_actually_planned(index),
                planned_oracle(&line, index),
                "pattern {pattern}, index {index}"
            );
        }
    }
}

#[test]
fn planned_segment_flag_marks_run_up_to_stations() {
    // A planned station makes the segments touching it planned, up to the
    // nearest unflagged station on each side.
    let line = planned_fixture("S-s-S");
    assert!(!line.is_actually_planned(0));
    assert!(line.is_actually_planned(1));
    assert!(line.is_actually_planned(2));
    assert!(line.is_actually_planned(3));
    assert!(!line.is_actually_planned(4));
}

#[test]
fn linked_stations_bounded_by_indirect_hops() {
    // The fixture carries one direct edge (К:Б to С:Д); the direct group of
    // each endpoint is exactly the other.
    let network = Network::from_json_str(two_line_doc()).unwrap();
    let b = network.station_id("Красная", "Б").unwrap();
    let d = network.station_id("Синяя", "Д").unwrap();
    assert_eq!(network.linked_stations(b), vec![d]);
    assert_eq!(network.linked_stations(d), vec![b]);
}

#[test]
fn linked_stations_indirect_chain_stops_after_one_hop() {
    let mut doc: serde_json::Value = serde_json::from_str(two_line_doc()).unwrap();
    // Indirect edges Б/Д and Д/Г: from Б the group must include Д but not Г
    // (that path would spend two indirect hops).
    doc["transfers"][0]["is_direct"] = false.into();
    doc["transfers"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::json!({
            "station1": { "line_name": "Синяя", "station_name": "Д" },
            "station2": { "line_name": "Синяя", "station_name": "Г" },
            "is_direct": false
        }));
    let network = Network::from_json_str(&doc.to_string()).unwrap();

    let b = network.station_id("Красная", "Б").unwrap();
    let d = network.station_id("Синяя", "Д").unwrap();
    let g = network.station_id("Синяя", "Г").unwrap();

    let linked = network.linked_stations(b);
    assert!(linked.contains(&d));
    assert!(!linked.contains(&g));

    // From Д both neighbors are one indirect hop away.
    let linked = network.linked_stations(d);
    assert!(linked.contains(&b));
    assert!(linked.contains(&g));
}

#[test]
fn derived_line_recomputes_station_positions() {
    let network = Network::from_json_str(two_line_doc()).unwrap();
    let source = network.line("Красная").unwrap();

    // Rebuild the same elements on a fresh vertical baseline; the stale
    // positions carried in must be overwritten by the walk.
    let derived = source.derived(point(10, 20), Direction::Down, source.elements.clone());
    assert_eq!(derived.name, source.name);
    assert_eq!(derived.priority, source.priority);

    let positions: Vec<Point> = derived.stations().map(|(_, s)| s.position).collect();
    assert_eq!(positions[0], point(10, 20));
    assert_eq!(positions[1], point(10, 140));
    // The turn to "down" is a no-op on a walk that already heads down.
    assert_eq!(positions[2], point(10, 280));
}
