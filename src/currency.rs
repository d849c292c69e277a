/// Brazilian Real formatting shared by the proposal message, the draft
/// preview and the stage notifications.
///
/// The output is what the WhatsApp channel has always received, so the
/// layout is fixed: `.` groups thousands, `,` separates exactly two
/// decimals and negative values carry a leading `-` (`-14.972,53`).
///
/// Values are rounded half away from zero to the cent. Anything that rounds
/// to zero is printed as `0,00` without a sign. Large amounts are printed in
/// full; non-finite values fall back to their plain `f64` rendering.
pub fn format_brl(value: f64) -> String {
    format_fixed(value, 2)
}

/// Amount the way lead notifications show it: at most three decimals,
/// trailing zeros dropped (`25.000`, `1.234,5`).
pub fn format_brl_compact(value: f64) -> String {
    let fixed = format_fixed(value, 3);
    match fixed.split_once(',') {
        Some((units, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                units.to_string()
            } else {
                format!("{},{}", units, fraction)
            }
        }
        None => fixed,
    }
}

fn format_fixed(value: f64, decimals: usize) -> String {
    let scaled = (value * 10f64.powi(decimals as i32)).round();
    if !scaled.is_finite() {
        return value.to_string();
    }

    let sign = if scaled < 0.0 { "-" } else { "" };
    // `{:.0}` on an integral f64 prints every digit, so nothing is clamped
    let digits = format!("{:0width$.0}", scaled.abs(), width = decimals + 1);
    let (units, fraction) = digits.split_at(digits.len() - decimals);

    format!("{}{},{}", sign, group_thousands(units), fraction)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    grouped
}

/// Parses a user-typed amount.
///
/// Accepts an optional `R$` prefix. When the text contains a comma it is read
/// as pt-BR notation (`1.250,00`); otherwise `.` is the decimal separator
/// (`1250.00`). Returns `None` for blank, unparsable or non-finite input, and
/// for US-style text with a `.` after the last comma (`1,250.00`).
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(comma) = trimmed.rfind(',') {
        if trimmed[comma..].contains('.') {
            return None;
        }
    }

    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };

    normalized
        .replace(' ', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
