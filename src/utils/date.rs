use chrono::NaiveDate;

/// Parse ett datum från en sträng (flexibelt format)
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Försök olika format
    let formats = [
        "%Y-%m-%d",    // 2024-01-15
        "%Y/%m/%d",    // 2024/01/15
        "%d-%m-%Y",    // 15-01-2024
        "%d/%m/%Y",    // 15/01/2024
        "%Y%m%d",      // 20240115
    ];

    for format in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    // Försök tolka endast år
    if s.len() == 4 {
        if let Ok(year) = s.parse::<i32>() {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }

    None
}

/// Formatera ett datum för visning
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Normalisera en datumsträng till ISO-format om den går att tolka,
/// annars behålls originalet oförändrat.
pub fn normalize_date(s: &str) -> String {
    match parse_date(s) {
        Some(date) => format_date(date),
        None => s.trim().to_string(),
    }
}

const GEDCOM_MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

fn gedcom_month(s: &str) -> Option<u32> {
    let upper = s.to_uppercase();
    GEDCOM_MONTHS
        .iter()
        .position(|m| upper.starts_with(m))
        .map(|idx| idx as u32 + 1)
}

/// Tolka GEDCOM-datum utan modifierare: "23 MAY 1850", "MAY 1850" eller "1850".
/// Faller tillbaka på `parse_date` för ISO-liknande format.
pub fn parse_gedcom_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    match parts.as_slice() {
        [day, month, year] => {
            NaiveDate::from_ymd_opt(year.parse().ok()?, gedcom_month(month)?, day.parse().ok()?)
        }
        [month, year] => NaiveDate::from_ymd_opt(year.parse().ok()?, gedcom_month(month)?, 1),
        [single] => parse_date(single),
        _ => None,
    }
}

/// Är datumfältet ifyllt? Tomma strängar räknas som saknade.
pub fn is_present(value: &Option<String>) -> bool {
    value.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}
