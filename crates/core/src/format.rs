use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::domain::variance::VarianceStatus;

/// Whole-rupee amount with Indian digit grouping, e.g. `₹12,34,567` or `-₹4,500`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}₹{}", group_indian(&digits))
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Ok,
    Warn,
    Danger,
}

pub fn status_tone(status: VarianceStatus) -> Tone {
    match status {
        VarianceStatus::Breached => Tone::Danger,
        VarianceStatus::Investigate => Tone::Warn,
        VarianceStatus::Ok => Tone::Ok,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::variance::VarianceStatus;

    use super::{format_inr, status_tone, Tone};

    #[test]
    fn groups_digits_in_lakh_and_crore_positions() {
        assert_eq!(format_inr(Decimal::new(0, 0)), "₹0");
        assert_eq!(format_inr(Decimal::new(999, 0)), "₹999");
        assert_eq!(format_inr(Decimal::new(1_000, 0)), "₹1,000");
        assert_eq!(format_inr(Decimal::new(1_234_567, 0)), "₹12,34,567");
        assert_eq!(format_inr(Decimal::new(123_456_789, 0)), "₹12,34,56,789");
    }

    #[test]
    fn rounds_to_whole_rupees_and_keeps_sign() {
        assert_eq!(format_inr(Decimal::new(-450_050, 2)), "-₹4,501");
        assert_eq!(format_inr(Decimal::new(-4, 1)), "₹0");
    }

    #[test]
    fn status_maps_to_badge_tone() {
        assert_eq!(status_tone(VarianceStatus::Breached), Tone::Danger);
        assert_eq!(status_tone(VarianceStatus::Investigate), Tone::Warn);
        assert_eq!(status_tone(VarianceStatus::Ok), Tone::Ok);
    }
}
