use std::convert::Infallible;

use chrono::Utc;

/// The current epoch id under the calendar-month policy, UTC.
///
/// The crypto core treats epochs as opaque strings; this is where the
/// platform's actual boundary rule lives.
pub fn current_epoch() -> String {
    Utc::now().format("%Y-%m").to_string()
}

/// Print the current epoch id.
#[derive(Debug, clap::Args)]
pub struct Epoch {}

impl crate::op::Op for Epoch {
    type Error = Infallible;
    type Output = String;

    fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        Ok(current_epoch())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_epoch_id_format() {
        let epoch = current_epoch();
        assert_eq!(epoch.len(), 7);
        assert_eq!(epoch.as_bytes()[4], b'-');
        assert!(epoch[..4].chars().all(|c| c.is_ascii_digit()));
        assert!(epoch[5..].chars().all(|c| c.is_ascii_digit()));

        let month: u32 = epoch[5..].parse().unwrap();
        assert!((1..=12).contains(&month));
    }
}
