//! Display helpers shared by every front end

use crate::snapshot::Usage;

/// "12 invoices (Unlimited)" or "2/3 invoices used".
pub fn format_usage(usage: &Usage) -> String {
    if usage.unlimited {
        return format!("{} invoices (Unlimited)", usage.used);
    }
    format!("{}/{} invoices used", usage.used, usage.limit)
}

/// USD with thousands separators; cents only when non-zero ("$9", "$1,299.50").
pub fn format_price(price: f64) -> String {
    let negative = price < 0.0;
    let cents_total = (price.abs() * 100.0).round() as u64;
    let dollars = cents_total / 100;
    let cents = cents_total % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if cents == 0 {
        format!("{}${}", sign, grouped)
    } else {
        format!("{}${}.{:02}", sign, grouped, cents)
    }
}
