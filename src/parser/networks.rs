//! Pipe-delimited network tables.
//!
//! kvas prints two tables that look alike but differ in width: networks
//! available for tunneling always carry an address column, while networks
//! picked up by a scan may or may not. No header token tells them apart, so
//! the row shape is decided from the data itself.

use crate::models::NetworkEntry;

/// Which table a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// `name | ip | interface | description`, always four columns
    Available,
    /// Either the four-column shape or `name | interface | description`
    Scanned,
}

/// Column layout chosen for one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    /// `name | ip | interface [| description]`
    WithAddress,
    /// `name | interface | description`
    WithoutAddress,
}

/// Dotted-decimal address, optionally with a `/prefix` (`192.168.1.0/24`).
///
/// Interface names such as `eth2.4` contain dots too, so a dot alone is not
/// enough.
fn looks_like_address(field: &str) -> bool {
    let address = field.split_once('/').map_or(field, |(address, _)| address);
    address.starts_with(|c: char| c.is_ascii_digit())
        && address.contains('.')
        && address.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Decide how to read a row, or `None` if it is too short for `mode`.
///
/// In scanned mode an address-shaped second field selects the four-column
/// layout. Only the second field is inspected, so dots in the name column
/// never matter; a network whose interface column is itself dotted-decimal
/// would be misread as an address.
pub fn row_shape(mode: ListMode, fields: &[&str]) -> Option<RowShape> {
    match mode {
        ListMode::Available if fields.len() >= 4 => Some(RowShape::WithAddress),
        ListMode::Available => None,
        ListMode::Scanned if fields.len() >= 3 && looks_like_address(fields[1]) => {
            Some(RowShape::WithAddress)
        }
        ListMode::Scanned if fields.len() >= 3 => Some(RowShape::WithoutAddress),
        ListMode::Scanned => None,
    }
}

/// Split `eth2.4[wifi]` into (`eth2.4`, `Some("wifi")`)
fn split_interface(raw: &str) -> (String, Option<String>) {
    match raw.split_once('[') {
        Some((name, rest)) => {
            let rest = rest.trim();
            let sub_type = rest.strip_suffix(']').unwrap_or(rest).trim();
            (name.trim().to_string(), non_empty(sub_type))
        }
        None => (raw.to_string(), None),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

pub fn parse_row(mode: ListMode, line: &str) -> Option<NetworkEntry> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();

    let (name, ip, interface, description) = match row_shape(mode, &fields)? {
        RowShape::WithAddress => (
            fields[0],
            Some(fields[1]),
            fields[2],
            fields.get(3).copied(),
        ),
        RowShape::WithoutAddress => (fields[0], None, fields[1], Some(fields[2])),
    };

    // Table rules such as `-----|-----|-----` reach here as bare pipes
    if name.is_empty() && interface.is_empty() {
        return None;
    }

    let (interface, sub_type) = split_interface(interface);
    Some(NetworkEntry {
        name: name.to_string(),
        ip: ip.and_then(non_empty),
        interface,
        description: description.and_then(|d| non_empty(d.trim_matches('"'))),
        sub_type,
    })
}

/// Parse every row of a network table, skipping short and empty rows
pub fn parse_networks(body: &[String], mode: ListMode) -> Vec<NetworkEntry> {
    body.iter()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let entry = parse_row(mode, line);
            if entry.is_none() {
                tracing::debug!("Skipping {:?} network row: {}", mode, line);
            }
            entry
        })
        .collect()
}
