//! Date-driven rotation through fixed lists.
//!
//! The index for a list of length `n` on `date` is the number of days since
//! [`EPOCH`] reduced with Euclidean modulo, so dates before the epoch wrap
//! backwards through the list instead of going negative.

use crate::error::{BriefingError, Result};
use chrono::NaiveDate;

/// Day zero of the rotation.
pub const EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2024, 1, 1) {
    Some(d) => d,
    None => panic!("invalid rotation epoch"),
};

/// Signed number of days from [`EPOCH`] to `date`.
pub fn days_since_epoch(date: NaiveDate) -> i64 {
    date.signed_duration_since(EPOCH).num_days()
}

/// Rotation index of `date` into a list of `len` items, always in `[0, len - 1]`.
pub fn rotation_index(date: NaiveDate, len: usize) -> Result<usize> {
    if len == 0 {
        return Err(BriefingError::EmptyRotation);
    }
    let len = len as i64;
    Ok(days_since_epoch(date).rem_euclid(len) as usize)
}

/// The item the rotation lands on for `date`.
pub fn pick<T>(date: NaiveDate, items: &[T]) -> Result<&T> {
    let idx = rotation_index(date, items.len())?;
    Ok(&items[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_epoch_is_index_zero() {
        assert_eq!(rotation_index(EPOCH, 30).unwrap(), 0);
        assert_eq!(rotation_index(EPOCH, 14).unwrap(), 0);
    }

    #[test]
    fn test_thirty_item_list_wraps_after_thirty_days() {
        assert_eq!(rotation_index(date(2024, 1, 30), 30).unwrap(), 29);
        assert_eq!(rotation_index(date(2024, 1, 31), 30).unwrap(), 0);
    }

    #[test]
    fn test_fourteen_item_list() {
        assert_eq!(rotation_index(date(2024, 1, 15), 14).unwrap(), 0);
        assert_eq!(rotation_index(date(2024, 1, 16), 14).unwrap(), 1);
    }

    #[test]
    fn test_dates_before_epoch_wrap_backwards() {
        assert_eq!(rotation_index(date(2023, 12, 31), 30).unwrap(), 29);
        assert_eq!(rotation_index(date(2023, 12, 2), 30).unwrap(), 0);
    }

    #[test]
    fn test_empty_list_is_an_error() {
        assert!(matches!(
            rotation_index(EPOCH, 0),
            Err(BriefingError::EmptyRotation)
        ));
        let empty: [&str; 0] = [];
        assert!(pick(EPOCH, &empty).is_err());
    }

    #[test]
    fn test_pick_returns_rotated_item() {
        let items = ["a", "b", "c"];
        assert_eq!(*pick(date(2024, 1, 2), &items).unwrap(), "b");
        assert_eq!(*pick(date(2024, 1, 4), &items).unwrap(), "a");
    }

    proptest! {
        #[test]
        fn prop_index_in_range(offset in -200_000i64..200_000, len in 1usize..500) {
            let d = EPOCH + Duration::days(offset);
            let idx = rotation_index(d, len).unwrap();
            prop_assert!(idx < len);
            prop_assert_eq!(idx, rotation_index(d, len).unwrap());
        }

        #[test]
        fn prop_periodic_in_list_length(offset in -200_000i64..200_000, len in 1usize..500) {
            let d = EPOCH + Duration::days(offset);
            let later = d + Duration::days(len as i64);
            prop_assert_eq!(rotation_index(d, len).unwrap(), rotation_index(later, len).unwrap());
        }
    }
}
