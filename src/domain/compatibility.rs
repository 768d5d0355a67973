//! Which donor blood groups may be transfused into which recipients.
//!
//! Lookups are always donor-first. Two shortcuts sit on top of the table: any
//! donor may give to an AB+ recipient, and an O- donor may give to anyone.

use crate::domain::BloodGroup::{self, AbNeg, AbPos, ANeg, APos, BNeg, BPos, ONeg, OPos};

/// Recipient groups each donor group may give to.
const CAN_DONATE_TO: [(BloodGroup, &[BloodGroup]); 8] = [
    (ONeg, &[APos, ANeg, BPos, BNeg, AbPos, AbNeg, OPos, ONeg]),
    (OPos, &[OPos, APos, BPos, AbPos]),
    (ANeg, &[APos, ANeg, AbPos, AbNeg]),
    (APos, &[APos, AbPos]),
    (BNeg, &[BPos, BNeg, AbPos, AbNeg]),
    (BPos, &[BPos, AbPos]),
    (AbNeg, &[AbPos, AbNeg]),
    (AbPos, &[AbPos]),
];

/// Whether blood from `donor` may be given to `recipient`.
#[must_use]
pub fn is_compatible(donor: BloodGroup, recipient: BloodGroup) -> bool {
    if recipient == AbPos || donor == ONeg {
        return true;
    }

    CAN_DONATE_TO
        .iter()
        .find(|(group, _)| *group == donor)
        .is_some_and(|(_, recipients)| recipients.contains(&recipient))
}

/// String form of [`is_compatible`].
///
/// Unknown blood groups on either side are never compatible.
#[must_use]
pub fn is_compatible_str(donor: &str, recipient: &str) -> bool {
    match (donor.parse(), recipient.parse()) {
        (Ok(donor), Ok(recipient)) => is_compatible(donor, recipient),
        _ => false,
    }
}

/// Every donor group whose blood may be given to `recipient`.
pub fn donor_groups_for(recipient: BloodGroup) -> impl Iterator<Item = BloodGroup> {
    BloodGroup::ALL
        .into_iter()
        .filter(move |&donor| is_compatible(donor, recipient))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn o_negative_gives_to_everyone() {
        for recipient in BloodGroup::ALL {
            assert!(is_compatible(ONeg, recipient), "O- -> {recipient}");
        }
    }

    #[test]
    fn ab_positive_receives_from_everyone() {
        for donor in BloodGroup::ALL {
            assert!(is_compatible(donor, AbPos), "{donor} -> AB+");
        }
    }

    #[test_case(OPos, APos, true)]
    #[test_case(OPos, ONeg, false; "rh positive to rh negative")]
    #[test_case(ANeg, AbNeg, true)]
    #[test_case(APos, ANeg, false)]
    #[test_case(BNeg, BPos, true)]
    #[test_case(BPos, AbNeg, false)]
    #[test_case(AbNeg, ANeg, false)]
    #[test_case(AbPos, AbNeg, false)]
    #[test_case(APos, BPos, false; "cross abo")]
    fn table_pairs(donor: BloodGroup, recipient: BloodGroup, expected: bool) {
        assert_eq!(is_compatible(donor, recipient), expected);
    }

    #[test]
    fn lookup_is_not_symmetric() {
        assert!(is_compatible(ANeg, APos));
        assert!(!is_compatible(APos, ANeg));
    }

    #[test]
    fn every_group_gives_to_itself() {
        for group in BloodGroup::ALL {
            assert!(is_compatible(group, group), "{group} -> {group}");
        }
    }

    #[test_case("O-", "AB-", true)]
    #[test_case("a+", "AB+", true; "case insensitive")]
    #[test_case("Q+", "AB+", false; "unknown donor fails closed")]
    #[test_case("O-", "XY", false; "unknown recipient fails closed")]
    #[test_case("", "", false; "empty")]
    fn string_lookup(donor: &str, recipient: &str, expected: bool) {
        assert_eq!(is_compatible_str(donor, recipient), expected);
    }

    #[test]
    fn donor_groups_for_a_negative() {
        let donors: Vec<_> = donor_groups_for(ANeg).collect();
        assert_eq!(donors, vec![ANeg, ONeg]);
    }
}
