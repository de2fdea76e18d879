//! SPI clock divider resolution
//!
//! The host divides the system clock as `f_sck = f_sys / (2 * (CLKDIV + 1))`
//! with a 16-bit CLKDIV. Requests are rounded down in frequency: the
//! resolver picks the smallest divider whose output does not exceed the
//! requested rate.
//!
//! All comparisons are done in 64-bit integers so no rounding happens on
//! the way.

/// Number of CLKDIV values (16-bit field)
pub const DIVIDER_STEPS: u64 = 1 << 16;

/// Divider resolution failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// System clock or requested frequency is zero
    Zero,
    /// Below `f_sys / (2 * 65536)`
    TooLow,
    /// Above `f_sys / 2`
    TooHigh,
}

/// Lowest reachable SCK frequency, rounded up to whole hertz
pub const fn min_frequency(sys_clk_hz: u32) -> u32 {
    (sys_clk_hz as u64).div_ceil(2 * DIVIDER_STEPS) as u32
}

/// Highest reachable SCK frequency (divider 0)
pub const fn max_frequency(sys_clk_hz: u32) -> u32 {
    sys_clk_hz / 2
}

/// Compute CLKDIV for a requested SCK frequency
///
/// Returns the smallest `d` such that `f_sys / (2 * (d + 1)) <= freq_hz`.
///
/// # Arguments
/// * `sys_clk_hz` - System clock feeding the host
/// * `freq_hz` - Requested SCK frequency
pub fn clock_divider(sys_clk_hz: u32, freq_hz: u32) -> Result<u16, ClockError> {
    if sys_clk_hz == 0 || freq_hz == 0 {
        return Err(ClockError::Zero);
    }
    let sys = sys_clk_hz as u64;
    let twice = 2 * freq_hz as u64;

    if twice > sys {
        return Err(ClockError::TooHigh);
    }
    if twice * DIVIDER_STEPS < sys {
        return Err(ClockError::TooLow);
    }

    // d + 1 = ceil(f_sys / 2f), which is in 1..=65536 after the checks above
    let steps = sys.div_ceil(twice);
    Ok((steps - 1) as u16)
}

/// SCK frequency produced by `divider` (truncated to whole hertz)
pub const fn realized_frequency(sys_clk_hz: u32, divider: u16) -> u32 {
    (sys_clk_hz as u64 / (2 * (divider as u64 + 1))) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SYS: u32 = 100_000_000;

    #[test]
    fn test_exact_division() {
        assert_eq!(clock_divider(SYS, 50_000_000), Ok(0));
        assert_eq!(clock_divider(SYS, 25_000_000), Ok(1));
        assert_eq!(clock_divider(SYS, 1_000_000), Ok(49));
    }

    #[test]
    fn test_rounds_toward_slower_clock() {
        // d=1 gives 25 MHz (too fast), d=2 gives 16.67 MHz
        assert_eq!(clock_divider(SYS, 20_000_000), Ok(2));
        assert_eq!(realized_frequency(SYS, 2), 16_666_666);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(clock_divider(SYS, 50_000_001), Err(ClockError::TooHigh));
        assert_eq!(clock_divider(SYS, 762), Err(ClockError::TooLow));
        // 100e6 / 131072 = 762.9, so 763 Hz is the slowest accepted request
        assert_eq!(clock_divider(SYS, 763), Ok(65_530));
        assert_eq!(clock_divider(131_072_000, 1_000), Ok(65_535));
        assert_eq!(min_frequency(SYS), 763);
        assert_eq!(max_frequency(SYS), 50_000_000);
        assert_eq!(clock_divider(0, 1), Err(ClockError::Zero));
        assert_eq!(clock_divider(SYS, 0), Err(ClockError::Zero));
    }

    proptest! {
        #[test]
        fn prop_divider_is_smallest_fit(
            sys in 1_000u32..=u32::MAX,
            ratio in 0.0f64..1.0,
        ) {
            let lo = min_frequency(sys) as f64;
            let hi = max_frequency(sys) as f64;
            let freq = (lo + (hi - lo) * ratio) as u32;
            prop_assume!(freq > 0);

            let d = clock_divider(sys, freq).unwrap() as u64;
            let sys = sys as u64;
            let freq = freq as u64;
            // realized frequency never exceeds the request
            prop_assert!(sys <= 2 * freq * (d + 1));
            // one step faster would overshoot
            if d > 0 {
                prop_assert!(sys > 2 * freq * d);
            }
        }
    }
}
