use std::net::{Ipv4Addr, SocketAddr};

use tracing::warn;

const DEFAULT_ADMIN_PORT: u32 = 7222;

pub fn get_default_admin_port() -> u32 {
    DEFAULT_ADMIN_PORT
}

const HUB_BIND: &str = "QUEUE_HUB_BIND";

const DEFAULT_BIND: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);

pub fn get_bind_addr() -> SocketAddr {
    get_bind_override().unwrap_or(DEFAULT_BIND)
}

/// Bind address from `QUEUE_HUB_BIND`, if set to something parseable
pub fn get_bind_override() -> Option<SocketAddr> {
    std::env::var(HUB_BIND)
        .ok()
        .and_then(|value| parse_bind_addr(&value))
}

fn parse_bind_addr(value: &str) -> Option<SocketAddr> {
    match value.trim().parse() {
        Ok(addr) => Some(addr),
        Err(e) => {
            warn!("ignoring {HUB_BIND}='{value}': {e}");
            None
        }
    }
}

/// Case-insensitive substring match used by every queue blocklist
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_uppercase().contains(&needle.to_uppercase())
}
