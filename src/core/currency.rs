use rust_decimal::Decimal;

/// Format an IDR amount the way Indonesian checkouts show it: `Rp 4.250`.
///
/// IDR has no minor unit, so the amount is rounded to a whole rupiah and
/// grouped with `.` as the thousands separator.
pub fn format_rupiah(amount: Decimal) -> String {
    let rounded = amount.round().abs();
    let digits = rounded.trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if amount.is_sign_negative() && !rounded.is_zero() {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// Format a percentage without trailing zeros: `0.7%`, `2%`
pub fn format_percent(percent: Decimal) -> String {
    format!("{}%", percent.normalize())
}
