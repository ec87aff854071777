//! Shared fixtures and helpers for `at_parser_core` integration tests.

#![allow(unreachable_pub, dead_code)]

use at_parser_core::{AtParser, Result};

// ─── Modem responses ─────────────────────────────────────────────────────────

/// One notification line followed by every kind of ending a modem produces.
pub const SINGLELINE: [&str; 8] = [
    "+CEREG: 2,\"76C1\",\"0102DA04\", 7\r\n+CME ERROR: 10\r\n",
    "+CEREG: 2,\"76C1\",\"0102DA04\", 7\r\n+CMS ERROR: 11\r\n",
    "+CEREG: 2,\"76C1\",\"0102DA04\", 7\r\nOK\r\n",
    "+CEREG: 2,\"76C1\",\"0102DA04\", 7\rOK\r\n",
    "+CEREG: 2,\"76C1\",\"0102DA04\", 7\r\n",
    "+CEREG: 2,\"76C1\",\"0102DA04\", 7\r",
    "+CEREG: 2,\"76C1\",\"0102DA04\", 7\n",
    "+CEREG: 2,\"76C1\",\"0102DA04\", 7",
];

/// Three QoS lines with trailing empty subparameters, with CRLF, CR and LF
/// terminators and blank lines in between.
pub const MULTILINE: [&str; 6] = [
    "+CGEQOSRDP: 0,0,,\r\n+CGEQOSRDP: 1,2,,\r\n+CGEQOSRDP: 2,4,,,1,65280000\r\n",
    "+CGEQOSRDP: 0,0,,\r\n+CGEQOSRDP: 1,2,,\r\n+CGEQOSRDP: 2,4,,,1,65280000\r\nOK\r\n",
    "+CGEQOSRDP: 0,0,,\r\n+CGEQOSRDP: 1,2,,\r\n+CGEQOSRDP: 2,4,,,1,65280000\r\nERROR\r\n",
    "+CGEQOSRDP: 0,0,,\r+CGEQOSRDP: 1,2,,\r+CGEQOSRDP: 2,4,,,1,65280000\rOK\r\n",
    "+CGEQOSRDP: 0,0,,\n+CGEQOSRDP: 1,2,,\n+CGEQOSRDP: 2,4,,,1,65280000\nOK\r\n",
    "\r\n+CGEQOSRDP: 0,0,,\r\n\r\n+CGEQOSRDP: 1,2,,\r\n\r\n+CGEQOSRDP: 2,4,,,1,65280000\r\n\r\nOK\r\n",
];

/// SMS notification with the PDU on its own line.
pub const PDULINE: [&str; 5] = [
    "+CMT: \"12345678\", 24\r\n06917429000171040A91747966543100009160402143708006C8329BFD0601\r\n+CME ERROR: 123\r\n",
    "+CMT: \"12345678\", 24\r\n06917429000171040A91747966543100009160402143708006C8329BFD0601\r\nOK\r\n",
    "\r\n+CMT: \"12345678\", 24\r\n06917429000171040A91747966543100009160402143708006C8329BFD0601\r\n\r\nOK\r\n",
    "+CMT: \"12345678\", 24\r\n06917429000171040A91747966543100009160402143708006C8329BFD0601\r\n",
    "\r\n+CMT: \"12345678\", 24\r\n06917429000171040A91747966543100009160402143708006C8329BFD0601\r\n",
];

/// The PDU carried by [`PDULINE`].
pub const PDU: &str = "06917429000171040A91747966543100009160402143708006C8329BFD0601";

/// Firmware version reply: a single opaque line.
pub const SINGLEPARAMLINE: [&str; 4] = [
    "mfw_nrf9160_0.7.0-23.prealpha\r\n+CMS ERROR: 123\r\n",
    "mfw_nrf9160_0.7.0-23.prealpha\r\nOK\r\n",
    "mfw_nrf9160_0.7.0-23.prealpha\r\n",
    "mfw_nrf9160_0.7.0-23.prealpha\r",
];

/// PSM reply with two empty subparameters in the middle.
pub const EMPTYPARAMLINE: [&str; 3] = [
    "+CPSMS: 1,,,\"10101111\",\"01101100\"\r\n",
    "+CPSMS: 1,,,\"10101111\",\"01101100\"\r\nOK\r\n",
    "+CPSMS: 1,,,\"10101111\",\"01101100\"\r\n+CME ERROR: 123\r\n",
];

/// Credential listing with a long quoted certificate.
pub const CERTIFICATE: &str = "%CMNG: 12345678, 0, \"978C...02C4\",\
\"-----BEGIN CERTIFICATE-----MIIBc464......bW9aAa4-----END CERTIFICATE-----\"\r\nERROR\r\n";

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Copy the string at `index` through `get_string` with a 128-byte buffer.
pub fn copied(parser: &mut AtParser<'_>, index: usize) -> Result<String> {
    let mut buf = [0u8; 128];
    let len = parser.get_string(index, &mut buf)?;
    assert_eq!(buf[len], 0, "string at {index} is not NUL-terminated");
    Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
}
