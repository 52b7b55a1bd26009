//! Embedded tunnel configuration.
//!
//! kvas prints the client config as the inside of a JSON object without its
//! braces, sometimes followed by free-form notes:
//!
//! ```text
//! "server": "185.119.196.115",
//! "server_port": 62084,
//! "method": "chacha20-ietf-poly1305",
//! password проверьте самостоятельно!
//! ```

use crate::models::TunnelConfig;

/// Rebuild an object literal from the quoted-key lines of a section body
pub fn reassemble(body: &[String]) -> String {
    let members: Vec<&str> = body
        .iter()
        .map(|line| line.trim())
        .filter(|line| line.starts_with('"'))
        .map(|line| line.strip_suffix(',').unwrap_or(line))
        .collect();
    format!("{{{}}}", members.join(","))
}

pub fn parse_tunnel_config(body: &[String]) -> Result<TunnelConfig, serde_json::Error> {
    serde_json::from_str(&reassemble(body))
}
