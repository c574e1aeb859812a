//! Document-contract number formatting. Golden-file tests depend on these
//! exact shapes: `$` prefix, two decimals, thousands separators for currency;
//! one decimal and `%` for tax rates.

/// `1234.5` -> `"$1,234.50"`. Rounds to cents at format time only; amounts
/// are expected to arrive pre-rounded from the CRUD layer.
pub fn currency(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as i128;
    let whole = cents / 100;
    let frac = cents % 100;
    let grouped = group_thousands(whole);
    if negative {
        format!("-${grouped}.{frac:02}")
    } else {
        format!("${grouped}.{frac:02}")
    }
}

/// Tax rate fraction -> percentage with one decimal: `0.1` -> `"10.0%"`.
pub fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn group_thousands(mut value: i128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut groups: Vec<String> = Vec::new();
    while value > 0 {
        let group = (value % 1000) as u16;
        value /= 1000;
        if value > 0 {
            groups.push(format!("{group:03}"));
        } else {
            groups.push(group.to_string());
        }
    }
    groups.reverse();
    groups.join(",")
}
