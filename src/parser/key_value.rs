//! "Label, wide gap, value" sections: internet gateway and tunnel

use crate::models::{Gateway, Tunnel};
use regex::Regex;
use std::sync::LazyLock;

static WIDE_GAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("static regex must compile"));

const LABEL_NAME: &str = "Название";
const LABEL_KEENETIC: &str = "Keenetic-имя";
const LABEL_INTERFACE: &str = "Сетевой интерфейс";
const LABEL_CONNECTION: &str = "Подключение";
const LABEL_IP: &str = "IP";

/// Column title kvas prints next to `Название` in the gateway table header
const HEADER_PROVIDER: &str = "Provider";

/// Value kvas prints when a connection is up ("present")
const PRESENT: &str = "есть";

/// Split a body line on its first run of two or more spaces.
///
/// Lines without such a gap yield `None` and are skipped by callers.
pub fn split_pair(line: &str) -> Option<(&str, &str)> {
    let mut parts = WIDE_GAP_RE.splitn(line.trim(), 2);
    let label = parts.next()?.trim();
    let value = parts.next()?.trim();
    if label.is_empty() {
        return None;
    }
    Some((label, value))
}

/// Connection flags are true only for the exact localized "present" token
pub fn is_present(value: &str) -> bool {
    value == PRESENT
}

fn is_column_header(line: &str) -> bool {
    line.starts_with(LABEL_NAME) && line.contains(HEADER_PROVIDER)
}

pub fn parse_gateway(body: &[String]) -> Gateway {
    let lines = match body.split_first() {
        Some((first, rest)) if is_column_header(first) => rest,
        _ => body,
    };

    let mut gateway = Gateway::default();
    for (label, value) in lines.iter().filter_map(|line| split_pair(line)) {
        match label {
            LABEL_NAME => gateway.provider = Some(value.to_string()),
            LABEL_KEENETIC => gateway.keenetic = Some(value.to_string()),
            LABEL_INTERFACE => gateway.interface = Some(value.to_string()),
            LABEL_CONNECTION => gateway.connection = is_present(value),
            LABEL_IP => gateway.ip = Some(value.to_string()),
            other => tracing::debug!("Ignoring gateway label: {}", other),
        }
    }
    gateway
}

/// Read the tunnel block; the embedded config is filled in separately
pub fn parse_tunnel(body: &[String]) -> Tunnel {
    let mut tunnel = Tunnel::default();
    for (label, value) in body.iter().filter_map(|line| split_pair(line)) {
        match label {
            LABEL_NAME => tunnel.name = Some(value.to_string()),
            LABEL_CONNECTION => tunnel.connection = is_present(value),
            LABEL_IP => tunnel.ip = Some(value.to_string()),
            other => tracing::debug!("Ignoring tunnel label: {}", other),
        }
    }
    tunnel
}
