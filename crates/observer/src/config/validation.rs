use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;

static DEBUG_ADDR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([0-9]{1,5})$").expect("debug address pattern is valid"));

/// Parse a debug address of the form `:<port>`.
///
/// Valid ports are strictly between 0 and 65535.
pub fn parse_debug_addr(addr: &str) -> Result<u16, ConfigError> {
    let port: u32 = DEBUG_ADDR
        .captures(addr)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| ConfigError::DebugAddrFormat(addr.to_string()))?;

    if !(port > 0 && port < 65535) {
        return Err(ConfigError::DebugAddrPort { addr: addr.to_string(), port });
    }

    // Range checked above.
    Ok(port as u16)
}
