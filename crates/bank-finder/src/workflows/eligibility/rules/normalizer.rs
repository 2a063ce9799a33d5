/// Strips BOM/zero-width characters and collapses whitespace in header and rule labels.
pub(crate) fn clean_label(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lookup key for rule names: case-insensitive, ignoring whitespace, `_` and `-`.
pub(crate) fn rule_key(value: &str) -> String {
    clean_label(value)
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '_' && *ch != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    Empty,
    Number(f64),
    Malformed(String),
}

/// Parses a rule cell. Percentage strings (`"12%"`) become fractions, everything else is
/// read as a plain number.
pub(crate) fn parse_cell(raw: &str) -> CellValue {
    let trimmed = clean_label(raw);
    if trimmed.is_empty() {
        return CellValue::Empty;
    }

    let (digits, scale) = match trimmed.strip_suffix('%') {
        Some(stripped) => (stripped.trim(), 100.0),
        None => (trimmed.as_str(), 1.0),
    };

    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => CellValue::Number(value / scale),
        _ => CellValue::Malformed(trimmed),
    }
}
