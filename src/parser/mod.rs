//! Parsers for kvas console output
//!
//! The status report (`kvas tunnel`) goes through a single pass:
//! normalize, split into sections, route each section by its heading, and
//! merge the extracted pieces into one [`StatusReport`]. Anything that does
//! not fit is logged and left at its default; the report is always produced.

pub mod domains;
pub mod embedded;
pub mod key_value;
pub mod networks;
pub mod normalize;
pub mod sections;

pub use domains::{
    parse_add_outcome, parse_clear_outcome, parse_del_outcome, parse_domain_list, AddOutcome,
    ClearOutcome, DelOutcome,
};

use crate::models::StatusReport;
use networks::ListMode;
use sections::{split_sections, SectionKind};

/// Build a structured report from raw `kvas tunnel` output
pub fn parse_status_report(raw: &str) -> StatusReport {
    let text = normalize::normalize_report(raw);
    let mut report = StatusReport::default();

    for section in split_sections(&text) {
        let Some(kind) = SectionKind::classify(&section.heading) else {
            tracing::debug!("Unknown section header: {}", section.heading);
            continue;
        };

        match kind {
            SectionKind::Gateway => report.gateway = key_value::parse_gateway(&section.body),
            SectionKind::Tunnel => {
                // The config section may come first; keep what it produced.
                let config = report.tunnel.config.take();
                report.tunnel = key_value::parse_tunnel(&section.body);
                report.tunnel.config = config;
            }
            SectionKind::Config => match embedded::parse_tunnel_config(&section.body) {
                Ok(config) => report.tunnel.config = Some(config),
                Err(e) => tracing::warn!(
                    "Error parsing config JSON: {}. JSON: {}",
                    e,
                    embedded::reassemble(&section.body)
                ),
            },
            SectionKind::AvailableNetworks => {
                report.available = networks::parse_networks(&section.body, ListMode::Available)
            }
            SectionKind::ScannedNetworks => {
                report.scanned = networks::parse_networks(&section.body, ListMode::Scanned)
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NetworkEntry, TunnelConfig};

    const TUNNEL_OUTPUT: &str = "\
2025/02/13 19:51:47 Output:
\x1b[36m----------------------------------------------------------------------\x1b[0m
Интернет шлюз:
Название                                                             Rostelecom
Keenetic-имя                                                         GigabitEthernet0/Vlan4
Сетевой интерфейс                                                    eth2.4
Подключение                                                          есть
IP                                                                   10.4.135.112
----------------------------------------------------------------------
Тоннель:
Название                                                             ShadowSocks
Подключение                                                          есть
IP                                                                   185.119.196.115
----------------------------------------------------------------------
Конфигурация shadowsocks:
\"server\": \"185.119.196.115\",
\"server_port\": 62084,
\"local_port\": 1181,
\"method\": \"chacha20-ietf-poly1305\",
password проверьте самостоятельно!
----------------------------------------------------------------------
Доступные для тоннеля сети:
Home | 192.168.1.0/24 | br0[bridge] | \"Домашняя сеть\"
----------------------------------------------------------------------
Полученные сканированием сети:
home | 192.168.1.5 | eth2.4[wifi] | Living room
printer | eth2.4 | \"Office\"
----------------------------------------------------------------------
Версия:
kvas 1.1.9
";

    #[test]
    fn test_full_report() {
        let report = parse_status_report(TUNNEL_OUTPUT);

        assert_eq!(report.gateway.provider.as_deref(), Some("Rostelecom"));
        assert_eq!(report.gateway.keenetic.as_deref(), Some("GigabitEthernet0/Vlan4"));
        assert_eq!(report.gateway.interface.as_deref(), Some("eth2.4"));
        assert_eq!(report.gateway.ip.as_deref(), Some("10.4.135.112"));
        assert!(report.gateway.connection);

        assert_eq!(report.tunnel.name.as_deref(), Some("ShadowSocks"));
        assert!(report.tunnel.connection);
        assert_eq!(report.tunnel.ip.as_deref(), Some("185.119.196.115"));
        assert_eq!(
            report.tunnel.config,
            Some(TunnelConfig {
                server: Some("185.119.196.115".into()),
                server_port: Some(62084),
                local_port: Some(1181),
                method: Some("chacha20-ietf-poly1305".into()),
            })
        );

        assert_eq!(
            report.available,
            vec![NetworkEntry {
                name: "Home".into(),
                ip: Some("192.168.1.0/24".into()),
                interface: "br0".into(),
                description: Some("Домашняя сеть".into()),
                sub_type: Some("bridge".into()),
            }]
        );
        assert_eq!(report.scanned.len(), 2);
        assert_eq!(report.scanned[0].sub_type.as_deref(), Some("wifi"));
        assert_eq!(report.scanned[1].name, "printer");
        assert_eq!(report.scanned[1].ip, None);
        assert_eq!(report.scanned[1].description.as_deref(), Some("Office"));
    }

    #[test]
    fn test_no_headings_gives_default_report() {
        assert_eq!(parse_status_report(""), StatusReport::default());
        assert_eq!(
            parse_status_report("sh: kvas: not found\nexit 127"),
            StatusReport::default()
        );
    }

    #[test]
    fn test_malformed_config_keeps_rest_of_report() {
        let raw = "\
Тоннель:
Название    ShadowSocks
Конфигурация:
\"server\": \"1.2.3.4\",
\"server_port\": eighty,
---
Полученные сканированием сети:
printer | eth2.4 | \"Office\"
";
        let report = parse_status_report(raw);
        assert_eq!(report.tunnel.name.as_deref(), Some("ShadowSocks"));
        assert_eq!(report.tunnel.config, None);
        assert_eq!(report.scanned.len(), 1);
    }

    #[test]
    fn test_config_before_tunnel_is_kept() {
        let raw = "\
Конфигурация:
\"server\": \"1.2.3.4\",
---
Тоннель:
Название    Vless
";
        let report = parse_status_report(raw);
        assert_eq!(report.tunnel.name.as_deref(), Some("Vless"));
        let config = report.tunnel.config.unwrap();
        assert_eq!(config.server.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_absent_connection_is_false() {
        let raw = "Интернет шлюз:\nПодключение    нет\nIP    10.0.0.1\n";
        let report = parse_status_report(raw);
        assert!(!report.gateway.connection);
        assert!(!report.tunnel.connection);
        assert_eq!(report.gateway.ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_table_rule_rows_are_not_entries() {
        let raw = "\
Доступные для тоннеля сети:
-----|-----|-----|-----
Home | 192.168.1.0/24 | br0 | home
----------------------------------------------------------------------
Полученные сканированием сети:
-----|-----|-----
printer | eth2.4 | \"Office\"
";
        let report = parse_status_report(raw);
        assert_eq!(report.available.len(), 1);
        assert_eq!(report.available[0].name, "Home");
        assert_eq!(report.scanned.len(), 1);
        assert_eq!(report.scanned[0].name, "printer");
        assert_eq!(report.scanned[0].ip, None);
    }
}
