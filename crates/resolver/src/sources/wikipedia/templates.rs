//! Birth and death dates scraped from infobox templates in raw wikitext.
//!
//! Each field has an ordered list of independent matchers; the first one
//! producing a valid calendar date wins.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

pub type DateMatcher = fn(&str) -> Option<NaiveDate>;

/// Optional `df=yes|` / `mf=yes|` display flag before the year
const FLAG: &str = r"(?:(?:df|mf)=y(?:es)?\|)?";
const YMD: &str = r"(\d{4})\|(\d{1,2})\|(\d{1,2})";

lazy_static! {
    static ref BIRTH_DATE: Regex = template(
        r"birth_date\s*=\s*\{\{\s*(?:birth date and age|birth date)\|"
    );
    static ref BIRTH_DOB: Regex = template(r"birth_date\s*=\s*\{\{\s*dob\|");
    static ref BIRTH_BDA: Regex = template(r"birth_date\s*=\s*\{\{\s*bda\|");
    // {{circa|{{death date|...}}}} and similar single-level wrappers
    static ref DEATH_WRAPPED: Regex = template(
        r"death_date\s*=\s*\{\{[^{}|]+\|\s*\{\{\s*(?:death date and age|death date)\|"
    );
    static ref DEATH_DATE: Regex = template(
        r"death_date\s*=\s*\{\{\s*(?:death date and age|death date)\|"
    );
    static ref DEATH_DDA: Regex = template(r"death_date\s*=\s*\{\{\s*dda\|");
}

pub const BIRTH_MATCHERS: &[DateMatcher] = &[
    |text| capture_date(&BIRTH_DATE, text),
    |text| capture_date(&BIRTH_DOB, text),
    |text| capture_date(&BIRTH_BDA, text),
];

pub const DEATH_MATCHERS: &[DateMatcher] = &[
    |text| capture_date(&DEATH_WRAPPED, text),
    |text| capture_date(&DEATH_DATE, text),
    |text| capture_date(&DEATH_DDA, text),
];

pub fn extract_birth_date(wikitext: &str) -> Option<NaiveDate> {
    first_match(BIRTH_MATCHERS, wikitext)
}

/// `None` means the subject is presumed living
pub fn extract_death_date(wikitext: &str) -> Option<NaiveDate> {
    first_match(DEATH_MATCHERS, wikitext)
}

pub fn first_match(matchers: &[DateMatcher], text: &str) -> Option<NaiveDate> {
    matchers.iter().find_map(|matcher| matcher(text))
}

fn template(prefix: &str) -> Regex {
    Regex::new(&format!("(?i){}{}{}", prefix, FLAG, YMD)).expect("valid template pattern")
}

fn capture_date(pattern: &Regex, text: &str) -> Option<NaiveDate> {
    let caps = pattern.captures(text)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_birth_date_and_age_template() {
        let text = "{{Infobox person\n| name = Willie Nelson\n| birth_date = {{Birth date and age|1933|4|29}}\n}}";
        assert_eq!(extract_birth_date(text), date(1933, 4, 29));
        assert_eq!(extract_death_date(text), None);
    }

    #[test]
    fn test_birth_date_with_display_flags() {
        assert_eq!(
            extract_birth_date("| birth_date = {{birth date and age|df=yes|1942|6|18}}"),
            date(1942, 6, 18)
        );
        assert_eq!(
            extract_birth_date("| birth_date={{birth date|mf=y|1950|05|01}}"),
            date(1950, 5, 1)
        );
    }

    #[test]
    fn test_birth_date_aliases() {
        assert_eq!(extract_birth_date("|birth_date = {{dob|1961|8|4}}"), date(1961, 8, 4));
        assert_eq!(extract_birth_date("|birth_date = {{bda|1990|12|31}}"), date(1990, 12, 31));
    }

    #[test]
    fn test_missing_birth_date() {
        assert_eq!(extract_birth_date("| birth_date = c. 1950"), None);
        assert_eq!(extract_birth_date(""), None);
    }

    #[test]
    fn test_death_date_and_age_takes_death_first() {
        let text = "| birth_date = {{birth date|1930|1|1}}\n| death_date = {{Death date and age|2024|4|1|1930|1|1}}";
        assert_eq!(extract_birth_date(text), date(1930, 1, 1));
        assert_eq!(extract_death_date(text), date(2024, 4, 1));
    }

    #[test]
    fn test_death_date_wrapped_once() {
        let text = "| death_date = {{circa|{{death date and age|2025|2|18|1930|1|30}}}}";
        assert_eq!(extract_death_date(text), date(2025, 2, 18));
    }

    #[test]
    fn test_death_date_dda_alias() {
        assert_eq!(
            extract_death_date("| death_date = {{dda|df=yes|2025|7|22|1948|12|3}}"),
            date(2025, 7, 22)
        );
    }

    #[test]
    fn test_impossible_date_falls_through_to_next_matcher() {
        let text = "| birth_date = {{birth date|1950|13|40}}\n| birth_date = {{dob|1950|1|2}}";
        assert_eq!(extract_birth_date(text), date(1950, 1, 2));
    }

    #[test]
    fn test_first_matcher_in_order_wins() {
        let never: DateMatcher = |_| None;
        let first: DateMatcher = |_| NaiveDate::from_ymd_opt(2000, 1, 1);
        let second: DateMatcher = |_| NaiveDate::from_ymd_opt(2001, 1, 1);
        assert_eq!(first_match(&[never, first, second], "x"), date(2000, 1, 1));
        assert_eq!(first_match(&[never], "x"), None);
    }
}
