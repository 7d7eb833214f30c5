/// Groups digits with commas: `1234567` becomes `"1,234,567"`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Inline annotation for bytes skipped between two emitted records
pub fn gap_annotation(bytes: u64) -> String {
    format!("({} missing bytes)", format_thousands(bytes))
}
