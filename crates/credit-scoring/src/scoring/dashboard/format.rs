/// Currency suffix used across the dashboard.
pub const CURRENCY: &str = "FCFA";

/// Round to a whole amount (ties to even) and group thousands with commas, e.g. `2,000,000`.
///
/// Matches printf-style `{:,.0f}`, so a negative amount that rounds to zero keeps its sign.
pub fn group_thousands(amount: f64) -> String {
    let rounded = amount.round_ties_even();
    let negative = rounded.is_sign_negative();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

pub fn format_fcfa(amount: f64) -> String {
    format!("{} {CURRENCY}", group_thousands(amount))
}

/// Probability in `[0, 1]` as a percentage with two decimals, e.g. `15.00%`.
pub fn format_percentage(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}
