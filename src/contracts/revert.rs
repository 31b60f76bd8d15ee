//! Revert reason extraction
//!
//! Structured revert data is preferred; the text of an RPC error is only
//! searched when the node did not return any.

use alloy::hex;
use alloy::sol_types::{decode_revert_reason, Revert, SolError};

/// Decode ABI revert data (`Error(string)`, `Panic(uint256)` or a raw string)
pub fn decode_revert_data(data: &[u8]) -> Option<String> {
    if let Ok(revert) = Revert::abi_decode(data) {
        return Some(revert.reason);
    }
    decode_revert_reason(data)
}

/// Parse a revert reason from an RPC or contract error message
///
/// Falls back to the full error text when no reason can be found.
pub fn parse_revert_reason(error: &str) -> String {
    if !error.contains("revert") {
        return error.to_string();
    }

    let embedded = embedded_revert_data(error).and_then(|data| decode_revert_data(&data));
    if let Some(reason) = embedded {
        return reason;
    }

    // "execution reverted: revert: Exceeds the max total supply available."
    if let Some(start) = error.find("revert: ") {
        return trim_reason(&error[start + 8..]);
    }

    // "error code 3: execution reverted: Ether sent is incorrect, data: \"0x..\""
    if let Some(start) = error.find("execution reverted: ") {
        let reason = trim_reason(&error[start + 20..]);
        if !reason.is_empty() && !reason.starts_with("0x") {
            return reason;
        }
    }

    if error.contains("execution reverted") {
        return "execution reverted".to_string();
    }

    error.to_string()
}

/// Hex payload following `data: "0x` in an error message
fn embedded_revert_data(error: &str) -> Option<Vec<u8>> {
    let start = error.find("data: \"0x")? + 7;
    let tail = &error[start..];
    let end = tail[2..]
        .find(|c: char| !c.is_ascii_hexdigit())
        .map_or(tail.len(), |i| i + 2);
    hex::decode(&tail[..end]).ok()
}

fn trim_reason(reason: &str) -> String {
    let reason = reason.split(", data:").next().unwrap_or(reason);
    let reason = reason.split('"').next().unwrap_or(reason);
    reason.trim().to_string()
}
