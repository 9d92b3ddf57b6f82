use std::future::Future;
use std::rc::Rc;

use crate::profile::ProfileRecord;
use crate::{ProfileError, Result};

/// External store of profile rows, queried by email.
///
/// Implementations return exactly one record or an error; any other row
/// count is reported as [`ProfileError::RowCount`].
pub trait ProfileService {
    fn fetch_profile(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<ProfileRecord>>;
}

impl<T: ProfileService> ProfileService for Rc<T> {
    fn fetch_profile(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<ProfileRecord>> {
        (**self).fetch_profile(email)
    }
}

/// Enforce the "exactly one row" expectation of a point lookup.
pub fn expect_single(mut rows: Vec<ProfileRecord>) -> Result<ProfileRecord> {
    match rows.len() {
        1 => Ok(rows.remove(0)),
        n => Err(ProfileError::RowCount(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(name: &str) -> ProfileRecord {
        ProfileRecord {
            user_name: Some(name.to_owned()),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    #[case(5)]
    fn wrong_row_count(#[case] n: usize) {
        let rows = (0..n).map(|i| row(&i.to_string())).collect();
        match expect_single(rows) {
            Err(ProfileError::RowCount(count)) => assert_eq!(count, n),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn single_row() {
        let record = expect_single(vec![row("Ana")]).unwrap();
        assert_eq!(record.user_name.as_deref(), Some("Ana"));
    }
}
