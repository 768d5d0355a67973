//! Rules deciding whether a donor may give blood on a given day.
//!
//! A donor is eligible when all of the following hold:
//!
//! - their age is between [`MIN_AGE`] and [`MAX_AGE`] inclusive,
//! - they weigh at least [`MIN_WEIGHT_KG`],
//! - at least [`DONATION_INTERVAL_DAYS`] have passed since their last
//!   donation, if they have donated before.

use std::fmt;

use chrono::{Days, NaiveDate};

use crate::domain::Donor;

/// Youngest age, in years, at which a donor may give blood.
pub const MIN_AGE: u32 = 18;

/// Oldest age, in years, at which a donor may give blood.
pub const MAX_AGE: u32 = 65;

/// Minimum body weight in kilograms.
pub const MIN_WEIGHT_KG: f64 = 50.0;

/// Minimum number of days between two donations by the same donor.
pub const DONATION_INTERVAL_DAYS: u64 = 90;

/// A reason a donor may not donate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ineligibility {
    /// The donor is younger than [`MIN_AGE`].
    TooYoung {
        /// The donor's age.
        age: u32,
    },
    /// The donor is older than [`MAX_AGE`].
    TooOld {
        /// The donor's age.
        age: u32,
    },
    /// The donor weighs less than [`MIN_WEIGHT_KG`].
    Underweight {
        /// The donor's weight in kilograms.
        weight_kg: f64,
    },
    /// The donor donated too recently.
    CoolingDown {
        /// The first date on which the interval has elapsed.
        until: NaiveDate,
    },
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooYoung { age } => write!(f, "age {age} is below the minimum of {MIN_AGE}"),
            Self::TooOld { age } => write!(f, "age {age} is above the maximum of {MAX_AGE}"),
            Self::Underweight { weight_kg } => {
                write!(f, "weight {weight_kg} kg is below the minimum of {MIN_WEIGHT_KG} kg")
            }
            Self::CoolingDown { until } => {
                write!(f, "last donation was less than {DONATION_INTERVAL_DAYS} days ago (eligible from {until})")
            }
        }
    }
}

/// Lists every rule the donor currently fails.
///
/// An empty list means the donor is eligible.
#[must_use]
pub fn assess(donor: &Donor, today: NaiveDate) -> Vec<Ineligibility> {
    let mut reasons = Vec::new();

    let age = donor.age();
    if age < MIN_AGE {
        reasons.push(Ineligibility::TooYoung { age });
    } else if age > MAX_AGE {
        reasons.push(Ineligibility::TooOld { age });
    }

    let weight_kg = donor.weight_kg();
    if weight_kg.is_nan() || weight_kg < MIN_WEIGHT_KG {
        reasons.push(Ineligibility::Underweight { weight_kg });
    }

    let until = next_eligible_date(donor, today);
    if today < until {
        reasons.push(Ineligibility::CoolingDown { until });
    }

    reasons
}

/// Whether the donor satisfies every eligibility rule on `today`.
#[must_use]
pub fn is_eligible(donor: &Donor, today: NaiveDate) -> bool {
    assess(donor, today).is_empty()
}

/// The first date on which the donation interval rule is satisfied.
///
/// This is `today` for a donor who has never donated. It only considers the
/// interval rule, so a donor who fails the age or weight rules is still
/// ineligible on that date.
#[must_use]
pub fn next_eligible_date(donor: &Donor, today: NaiveDate) -> NaiveDate {
    donor.last_donation().map_or(today, |last| {
        last.checked_add_days(Days::new(DONATION_INTERVAL_DAYS))
            .unwrap_or(NaiveDate::MAX)
    })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::{BloodGroup, donor::tests::donor};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn days_ago(days: u64) -> NaiveDate {
        today().checked_sub_days(Days::new(days)).unwrap()
    }

    #[test_case(17, false; "below minimum")]
    #[test_case(18, true; "minimum")]
    #[test_case(65, true; "maximum")]
    #[test_case(66, false; "above maximum")]
    fn age_bounds_are_inclusive(age: u32, expected: bool) {
        let mut donor = donor("D1", BloodGroup::APos);
        donor.age = age;
        assert_eq!(is_eligible(&donor, today()), expected);
    }

    #[test]
    fn age_outside_range_is_ineligible_regardless_of_other_fields() {
        for age in [0, 5, 17, 66, 90] {
            let mut donor = donor("D1", BloodGroup::ONeg);
            donor.age = age;
            donor.weight_kg = 95.0;
            donor.last_donation = None;
            assert!(!is_eligible(&donor, today()), "age {age} should be ineligible");
        }
    }

    #[test_case(49.9, false; "just under")]
    #[test_case(50.0, true; "exactly minimum")]
    #[test_case(f64::NAN, false; "not a number")]
    fn weight_threshold(weight_kg: f64, expected: bool) {
        let mut donor = donor("D1", BloodGroup::APos);
        donor.weight_kg = weight_kg;
        assert_eq!(is_eligible(&donor, today()), expected);
    }

    #[test_case(89, false; "one day short")]
    #[test_case(90, true; "exactly the interval")]
    #[test_case(365, true; "long ago")]
    fn donation_interval(gap: u64, expected: bool) {
        let mut donor = donor("D1", BloodGroup::APos);
        donor.last_donation = Some(days_ago(gap));
        assert_eq!(is_eligible(&donor, today()), expected);
    }

    #[test_case(2024, 2, 28, false; "day eighty nine")]
    #[test_case(2024, 2, 29, true; "leap day is day ninety")]
    fn interval_counts_calendar_days_across_a_year_end(
        year: i32,
        month: u32,
        day: u32,
        expected: bool,
    ) {
        let mut donor = donor("D1", BloodGroup::APos);
        donor.last_donation = NaiveDate::from_ymd_opt(2023, 12, 1);
        let on = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        assert_eq!(is_eligible(&donor, on), expected);
    }

    #[test]
    fn future_last_donation_is_cooling_down() {
        let mut donor = donor("D1", BloodGroup::APos);
        donor.last_donation = today().succ_opt();
        assert!(!is_eligible(&donor, today()));
    }

    #[test]
    fn assess_reports_every_failed_rule() {
        let mut donor = donor("D1", BloodGroup::APos);
        donor.age = 16;
        donor.weight_kg = 45.0;
        donor.last_donation = Some(days_ago(10));

        let reasons = assess(&donor, today());

        assert_eq!(
            reasons,
            vec![
                Ineligibility::TooYoung { age: 16 },
                Ineligibility::Underweight { weight_kg: 45.0 },
                Ineligibility::CoolingDown {
                    until: days_ago(10).checked_add_days(Days::new(90)).unwrap()
                },
            ]
        );
    }

    #[test]
    fn next_eligible_date_is_today_for_new_donors() {
        let donor = donor("D1", BloodGroup::APos);
        assert_eq!(next_eligible_date(&donor, today()), today());
    }

    #[test]
    fn next_eligible_date_adds_interval() {
        let mut donor = donor("D1", BloodGroup::APos);
        donor.last_donation = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(
            next_eligible_date(&donor, today()),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        );
    }

    #[test]
    fn cooling_down_message_names_the_date() {
        let reason = Ineligibility::CoolingDown {
            until: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        };
        assert_eq!(
            reason.to_string(),
            "last donation was less than 90 days ago (eligible from 2024-03-31)"
        );
    }
}
