pub fn format_dollars(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${amount}");
    }

    let magnitude = amount.abs();
    if magnitude >= 1_000_000.0 {
        let sign = if amount < 0.0 { "-" } else { "" };
        return format!("{sign}${:.1}M", magnitude / 1_000_000.0);
    }

    let digits = format!("{magnitude:.0}");
    let sign = if amount < 0.0 && digits != "0" { "-" } else { "" };
    format!("{sign}${}", group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
