//! Display formatting for token amounts

use alloy::primitives::U256;

/// Decimals of the Crypto Dev Token (and of ether)
pub const TOKEN_DECIMALS: u32 = 18;

/// Format a U256 value with decimals
pub fn format_units(value: U256, decimals: u32) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        // Format with decimal places
        let remainder_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = remainder_str.trim_end_matches('0');
        format!("{}.{}", whole, trimmed)
    }
}

/// Format a token or wei amount with 18 decimals
pub fn format_ether(value: U256) -> String {
    format_units(value, TOKEN_DECIMALS)
}
