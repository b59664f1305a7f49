use chrono::{Datelike, Local, NaiveDate};

/// Points awarded for a subject that dies at age zero.
pub const MAX_POINTS: i32 = 100;

/// Whole years elapsed between `birth` and `as_of`.
///
/// The birthday counts as having occurred on the day itself, so a subject
/// evaluated on their birthday is a year older. A Feb 29 birthday in a
/// non-leap year is reached on Mar 1.
pub fn age_on(birth: NaiveDate, as_of: NaiveDate) -> i32 {
    let years = as_of.year() - birth.year();
    if (as_of.month(), as_of.day()) < (birth.month(), birth.day()) {
        years - 1
    } else {
        years
    }
}

pub fn current_age(birth: NaiveDate) -> i32 {
    age_on(birth, today())
}

pub fn age_at_death(birth: NaiveDate, death: NaiveDate) -> i32 {
    age_on(birth, death)
}

/// Dying younger scores more; 100 and older scores nothing.
pub fn score(age_at_death: i32) -> i32 {
    (MAX_POINTS - age_at_death).max(0)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_increments_on_birthday() {
        assert_eq!(age_on(date(1950, 5, 1), date(2024, 5, 1)), 74);
    }

    #[test]
    fn test_age_not_incremented_day_before_birthday() {
        assert_eq!(age_on(date(1950, 5, 1), date(2024, 4, 30)), 73);
    }

    #[test]
    fn test_leap_day_birth_on_non_leap_year() {
        let birth = date(2000, 2, 29);
        assert_eq!(age_on(birth, date(2023, 2, 28)), 22);
        assert_eq!(age_on(birth, date(2023, 3, 1)), 23);
        assert_eq!(age_on(birth, date(2024, 2, 29)), 24);
    }

    #[test]
    fn test_age_at_death_matches_age_on() {
        assert_eq!(age_at_death(date(1930, 1, 1), date(2024, 4, 1)), 94);
        assert_eq!(age_at_death(date(1950, 5, 2), date(2024, 5, 1)), 73);
    }

    #[test]
    fn test_score_bounds() {
        assert_eq!(score(0), 100);
        assert_eq!(score(74), 26);
        assert_eq!(score(100), 0);
        assert_eq!(score(150), 0);
    }

    #[test]
    fn test_score_non_increasing() {
        let scores: Vec<i32> = (0..=120).map(score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!(scores.iter().all(|s| *s >= 0));
    }
}
