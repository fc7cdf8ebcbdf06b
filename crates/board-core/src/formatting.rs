/// Format a floating-point number with a fixed number of decimal places and
/// no grouping, as printed on report pages.
///
/// # Examples
///
/// ```
/// use board_core::formatting::format_fixed;
///
/// assert_eq!(format_fixed(15.0, 2), "15.00");
/// assert_eq!(format_fixed(2.345, 1), "2.3");
/// assert_eq!(format_fixed(0.0, 2), "0.00");
/// ```
pub fn format_fixed(value: f64, decimals: u32) -> String {
    format!("{:.prec$}", value, prec = decimals as usize)
}

/// Format an item count with thousands separators.
pub fn format_count(count: usize) -> String {
    group_thousands(&count.to_string())
}

/// Pluralise `noun` for `count` by appending `s`.
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
