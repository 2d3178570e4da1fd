//! Wei denominations

use primitive_types::U256;

/// Wei per gwei
pub const GWEI: u128 = 1_000_000_000;

/// Wei per ether
pub const ETHER: u128 = 1_000_000_000_000_000_000;

/// Convert a gwei amount to wei
pub fn gwei(amount: u64) -> u128 {
    amount as u128 * GWEI
}

/// Render a wei amount as a decimal ether string, trailing zeros trimmed
pub fn format_ether(wei: U256) -> String {
    let unit = U256::from(ETHER);
    let whole = wei / unit;
    let frac = wei % unit;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>18}", frac.to_string());
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
