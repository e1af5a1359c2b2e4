use chrono::{Days, NaiveDate};

/// Date of draw 1. Draws are held every Saturday since.
pub fn first_draw_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2002, 12, 7).unwrap_or(NaiveDate::MIN)
}

pub fn draw_date_of(draw_no: u32) -> Option<NaiveDate> {
    let weeks = u64::from(draw_no.checked_sub(1)?);
    first_draw_date().checked_add_days(Days::new(weeks * 7))
}

/// Calendar estimate of the latest held draw as of `today`; 0 before draw 1.
pub fn estimate_latest_draw_no(today: NaiveDate) -> u32 {
    let elapsed = today.signed_duration_since(first_draw_date()).num_days();
    if elapsed < 0 {
        return 0;
    }
    u32::try_from(elapsed / 7 + 1).unwrap_or(u32::MAX)
}

pub fn join_numbers<T: ToString>(numbers: &[T]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `1767315600` -> `1,767,315,600`
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
