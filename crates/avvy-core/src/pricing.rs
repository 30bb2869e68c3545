//! Length-tiered pricing and fiat to native-token conversion
//!
//! ## Conversion policy
//!
//! Money never passes through floating point once it enters this module:
//!
//! 1. The oracle's rate is turned into an exact decimal [`ExchangeRate`]
//!    (`mantissa / 10^scale`) from its shortest round-trip rendering, so
//!    `20.0` becomes `20` and `35.12` becomes `3512 / 10^2`.
//! 2. `native = fiat * 10^decimals * 10^scale / mantissa` in 256-bit
//!    integer arithmetic.
//! 3. The division truncates toward zero. The result is never rounded up,
//!    so the payer is never charged a fraction of a unit beyond the price.

use primitive_types::U256;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::config::PricingConfig;
use crate::domain::{DomainName, Years};
use crate::error::{Error, Result};

/// Shortest label any tier accepts
pub const MIN_TIERED_LENGTH: usize = 3;

/// Length-based price bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    /// Exactly three characters
    ThreeChars,
    /// Exactly four characters
    FourChars,
    /// Five characters or more
    FivePlusChars,
}

impl PriceTier {
    /// Select the tier for a label length in characters
    ///
    /// Total and mutually exclusive over all lengths >= 3.
    pub fn for_length(length: usize) -> Option<Self> {
        match length {
            0..=2 => None,
            3 => Some(PriceTier::ThreeChars),
            4 => Some(PriceTier::FourChars),
            _ => Some(PriceTier::FivePlusChars),
        }
    }
}

/// A whole-unit fiat amount (USD in the default table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FiatAmount(pub u128);

impl fmt::Display for FiatAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A positive, exact fiat-per-token rate
///
/// Point-in-time value: built fresh from each oracle read and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeRate {
    mantissa: u128,
    scale: u32,
}

impl ExchangeRate {
    /// Build a rate from an oracle's floating-point quote
    pub fn from_f64(rate: f64) -> Result<Self> {
        if !rate.is_finite() {
            return Err(Error::invalid_rate(format!("{} is not finite", rate)));
        }
        if rate <= 0.0 {
            return Err(Error::invalid_rate(format!("{} is not positive", rate)));
        }
        // f64 Display never uses exponent notation and round-trips exactly
        format!("{}", rate).parse()
    }

    /// The rate as `f64`, for display only
    pub fn as_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// Decimal digits after the point
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// The rate scaled to an integer
    pub fn mantissa(&self) -> u128 {
        self.mantissa
    }
}

impl FromStr for ExchangeRate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
        let frac_part = frac_part.trim_end_matches('0');

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(Error::invalid_rate(format!("'{}' is not a decimal number", s)));
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return Err(Error::invalid_rate(format!("'{}' is not a decimal number", s)));
        }

        let digits = format!("{}{}", int_part, frac_part);
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Err(Error::invalid_rate(format!("{} is not positive", s)));
        }

        let mantissa: u128 = digits
            .parse()
            .map_err(|_| Error::invalid_rate(format!("{} has too many significant digits", s)))?;

        Ok(Self {
            mantissa,
            scale: frac_part.len() as u32,
        })
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_scaled(self.mantissa.to_string(), self.scale))
    }
}

impl Serialize for ExchangeRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Maps (label, years) to a fiat price and a fiat price to native units
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    config: PricingConfig,
}

impl PricingCalculator {
    /// Create a calculator over a pricing table
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// The pricing table in use
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Select the tier for a domain's label
    pub fn tier(&self, name: &DomainName) -> Result<PriceTier> {
        let length = name.char_len();
        let minimum = self.config.min_label_length.max(MIN_TIERED_LENGTH);

        let tier = (length >= minimum)
            .then(|| PriceTier::for_length(length))
            .flatten();

        tier.ok_or_else(|| Error::InvalidDomainLength {
            label: name.label().to_string(),
            length,
            minimum,
        })
    }

    /// Yearly price of a tier
    pub fn unit_price(&self, tier: PriceTier) -> u64 {
        match tier {
            PriceTier::ThreeChars => self.config.three_chars,
            PriceTier::FourChars => self.config.four_chars,
            PriceTier::FivePlusChars => self.config.five_plus_chars,
        }
    }

    /// Fiat price of registering or renewing `name` for `years`
    ///
    /// `u64 * u64` always fits in `u128`, so this cannot overflow.
    pub fn price(&self, name: &DomainName, years: Years) -> Result<FiatAmount> {
        let tier = self.tier(name)?;
        let unit = self.unit_price(tier);
        Ok(FiatAmount(u128::from(unit) * u128::from(years.get())))
    }

    /// Convert a fiat price into the native token's smallest unit
    ///
    /// Truncates toward zero; see the module docs.
    pub fn to_native_amount(&self, fiat: FiatAmount, rate: &ExchangeRate) -> Result<U256> {
        if rate.mantissa == 0 {
            return Err(Error::invalid_rate("0 is not positive"));
        }

        let overflow = || {
            Error::invalid_rate(format!(
                "{} at rate {} does not fit in 256 bits",
                fiat, rate
            ))
        };

        let numerator = U256::from(fiat.0)
            .checked_mul(pow10(self.config.native_decimals).ok_or_else(overflow)?)
            .and_then(|n| n.checked_mul(pow10(rate.scale)?))
            .ok_or_else(overflow)?;

        Ok(numerator / U256::from(rate.mantissa))
    }

    /// Render a smallest-unit amount as a decimal token amount
    pub fn format_native(&self, amount: U256) -> String {
        format_units(amount, self.config.native_decimals)
    }
}

/// Render `amount / 10^decimals` without trailing zeros
pub fn format_units(amount: U256, decimals: u32) -> String {
    format_scaled(amount.to_string(), decimals)
}

fn format_scaled(digits: String, scale: u32) -> String {
    let scale = scale as usize;
    if scale == 0 {
        return digits;
    }

    let padded = format!("{:0>width$}", digits, width = scale + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn calculator() -> PricingCalculator {
        PricingCalculator::new(PricingConfig::default())
    }

    fn name(label: &str) -> DomainName {
        DomainName::parse(label, ".avax").unwrap()
    }

    fn years(n: u64) -> Years {
        Years::new(n).unwrap()
    }

    #[test]
    fn test_scenario_three_chars_one_year() {
        let price = calculator().price(&name("abc"), years(1)).unwrap();
        assert_eq!(price, FiatAmount(640));
    }

    #[test]
    fn test_scenario_four_chars_two_years() {
        let price = calculator().price(&name("abcd"), years(2)).unwrap();
        assert_eq!(price, FiatAmount(320));
    }

    #[test]
    fn test_scenario_six_chars_three_years() {
        let price = calculator().price(&name("abcdef"), years(3)).unwrap();
        assert_eq!(price, FiatAmount(15));
    }

    #[test]
    fn test_suffix_is_not_counted() {
        let price = calculator().price(&name("abc.avax"), years(1)).unwrap();
        assert_eq!(price, FiatAmount(640));
    }

    #[test]
    fn test_short_labels_rejected() {
        let err = calculator().price(&name("ab"), years(1)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidDomainLength { length: 2, minimum: 3, .. }
        ));
    }

    #[test]
    fn test_multibyte_label_priced_by_characters() {
        // three characters, six bytes
        let tier = calculator().tier(&name("äöü")).unwrap();
        assert_eq!(tier, PriceTier::ThreeChars);
    }

    #[test]
    fn test_scenario_rate_twenty() {
        let rate = ExchangeRate::from_f64(20.0).unwrap();
        let native = calculator().to_native_amount(FiatAmount(5), &rate).unwrap();
        assert_eq!(native, U256::from(250_000_000_000_000_000u128));
        assert_eq!(calculator().format_native(native), "0.25");
    }

    #[test]
    fn test_fractional_rate_truncates() {
        let rate = ExchangeRate::from_f64(35.12).unwrap();
        assert_eq!(rate.mantissa(), 3512);
        assert_eq!(rate.scale(), 2);

        let native = calculator().to_native_amount(FiatAmount(5), &rate).unwrap();
        assert_eq!(native, U256::from(142_369_020_501_138_952u128));

        let native = calculator().to_native_amount(FiatAmount(640), &rate).unwrap();
        assert_eq!(native, U256::from(18_223_234_624_145_785_876u128));
    }

    #[test]
    fn test_invalid_rates_rejected() {
        assert!(matches!(ExchangeRate::from_f64(0.0), Err(Error::InvalidRate(_))));
        assert!(matches!(ExchangeRate::from_f64(-3.5), Err(Error::InvalidRate(_))));
        assert!(matches!(ExchangeRate::from_f64(f64::NAN), Err(Error::InvalidRate(_))));
        assert!(matches!(
            ExchangeRate::from_f64(f64::INFINITY),
            Err(Error::InvalidRate(_))
        ));
        assert!(matches!("0.000".parse::<ExchangeRate>(), Err(Error::InvalidRate(_))));
        assert!(matches!("1e5".parse::<ExchangeRate>(), Err(Error::InvalidRate(_))));
        assert!(matches!("".parse::<ExchangeRate>(), Err(Error::InvalidRate(_))));
    }

    #[test]
    fn test_rate_display_round_trips() {
        let rate: ExchangeRate = "028.4500".parse().unwrap();
        assert_eq!(rate.to_string(), "28.45");
        assert_eq!(rate.as_f64(), 28.45);

        let rate: ExchangeRate = ".5".parse().unwrap();
        assert_eq!(rate.to_string(), "0.5");
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::zero(), 18), "0");
        assert_eq!(format_units(U256::from(1u8), 18), "0.000000000000000001");
        assert_eq!(
            format_units(U256::from(16_000_000_000_000_000_000u128), 18),
            "16"
        );
        assert_eq!(format_units(U256::from(1234u32), 0), "1234");
    }

    #[test]
    fn test_alternate_pricing_table() {
        let calculator = PricingCalculator::new(PricingConfig {
            three_chars: 1000,
            four_chars: 100,
            five_plus_chars: 10,
            min_label_length: 4,
            native_decimals: 6,
        });

        assert!(calculator.price(&name("abc"), years(1)).is_err());
        assert_eq!(
            calculator.price(&name("abcd"), years(1)).unwrap(),
            FiatAmount(100)
        );

        let rate: ExchangeRate = "4".parse().unwrap();
        let native = calculator.to_native_amount(FiatAmount(10), &rate).unwrap();
        assert_eq!(native, U256::from(2_500_000u32));
    }

    proptest! {
        #[test]
        fn prop_tiers_are_total_and_exclusive(length in 1usize..300) {
            let expected = match length {
                0..=2 => None,
                3 => Some(640u64),
                4 => Some(160),
                _ => Some(5),
            };
            let calc = calculator();
            let got = calc
                .tier(&name(&"x".repeat(length)))
                .ok()
                .map(|t| calc.unit_price(t));
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn prop_price_is_exact_product(length in 3usize..40, y in 1u64..=100) {
            let calc = calculator();
            let domain = name(&"q".repeat(length));
            let unit = calc.unit_price(calc.tier(&domain).unwrap());
            let price = calc.price(&domain, years(y)).unwrap();
            prop_assert_eq!(price.0, u128::from(unit) * u128::from(y));
        }

        #[test]
        fn prop_native_amount_never_rounds_up(fiat in 1u64..1_000_000, cents in 1u64..10_000_000) {
            let rate: ExchangeRate = format!("{}.{:02}", cents / 100, cents % 100).parse().unwrap();
            let native = calculator().to_native_amount(FiatAmount(u128::from(fiat)), &rate).unwrap();
            // native * rate <= fiat * 10^18, and one more unit would exceed it
            let lhs = native * U256::from(rate.mantissa());
            let rhs = U256::from(fiat) * pow10(18).unwrap() * pow10(rate.scale()).unwrap();
            prop_assert!(lhs <= rhs);
            prop_assert!(lhs + U256::from(rate.mantissa()) > rhs);
        }
    }
}
