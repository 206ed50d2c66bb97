use crate::ucan::Ucan;

use super::error::ValidationError;

pub(super) fn validate_temporal_properties(ucan: &Ucan, now: u64) -> Result<(), ValidationError> {
    if let Some(expires_at) = ucan.expires_at().filter(|_| ucan.is_expired(now)) {
        return Err(ValidationError::Expired { expires_at, now });
    }
    if let Some(not_before) = ucan.not_before().filter(|_| ucan.is_too_early(now)) {
        return Err(ValidationError::TooEarly { not_before, now });
    }
    Ok(())
}
