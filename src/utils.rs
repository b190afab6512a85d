use rust_decimal::{Decimal, RoundingStrategy};

/// Whole rupiah, half away from zero
pub fn round_rupiah(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to the nearest multiple of `unit`. A non-positive unit leaves the amount untouched.
pub fn round_to_unit(amount: Decimal, unit: Decimal) -> Decimal {
    if unit <= Decimal::ZERO {
        return amount;
    }

    (amount / unit).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) * unit
}

/// Rounds down to the nearest lower multiple of `unit`.
pub fn floor_to_unit(amount: Decimal, unit: Decimal) -> Decimal {
    if unit <= Decimal::ZERO {
        return amount;
    }

    (amount / unit).floor() * unit
}

pub fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    amount * rate / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_round_rupiah() {
        assert_eq!(round_rupiah(dec!(100423.5)), dec!(100424));
        assert_eq!(round_rupiah(dec!(100423.49)), dec!(100423));
        assert_eq!(round_rupiah(dec!(-0.5)), dec!(-1));
    }

    #[test]
    fn test_round_to_unit() {
        assert_eq!(round_to_unit(dec!(16795.8333), dec!(1)), dec!(16796));
        assert_eq!(round_to_unit(dec!(16795.8333), dec!(100)), dec!(16800));
        assert_eq!(round_to_unit(dec!(16795.8333), dec!(0)), dec!(16795.8333));
    }

    #[test]
    fn test_floor_to_unit() {
        assert_eq!(floor_to_unit(dec!(4031124), dec!(1000)), dec!(4031000));
        assert_eq!(floor_to_unit(dec!(222354924), dec!(1000)), dec!(222354000));
        assert_eq!(floor_to_unit(dec!(999), dec!(1000)), dec!(0));
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(dec!(25000000), dec!(0.24)), dec!(60000));
        assert_eq!(percent_of(dec!(10042300), dec!(1)), dec!(100423));
    }
}
