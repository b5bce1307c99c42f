//! MOTORPOOL - Ownership Guard

use crate::error::{MotorpoolError, Result};
use crate::session::Session;
use crate::types::Vehicle;

/// Only the owner's session may change or delete a vehicle.
pub fn is_authorized(vehicle: &Vehicle, session: &Session) -> bool {
    session.current_user() == Some(vehicle.owner.as_str())
}

/// [`is_authorized`] as a `Result`, telling "nobody logged in" apart
/// from "somebody else's vehicle".
pub fn authorize(vehicle: &Vehicle, session: &Session) -> Result<()> {
    if !session.is_logged_in() {
        return Err(MotorpoolError::Unauthenticated);
    }
    if !is_authorized(vehicle, session) {
        return Err(MotorpoolError::Unauthorized {
            id: vehicle.id,
            owner: vehicle.owner.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VehicleDraft;

    #[test]
    fn test_guard() {
        let v = Vehicle::new(1, "alice", VehicleDraft::new("A", 1, 1, 1.0)).unwrap();

        assert!(is_authorized(&v, &Session::logged_in("alice")));
        assert!(!is_authorized(&v, &Session::logged_in("bob")));
        assert!(!is_authorized(&v, &Session::anonymous()));

        assert!(matches!(
            authorize(&v, &Session::anonymous()),
            Err(MotorpoolError::Unauthenticated)
        ));
        assert!(matches!(
            authorize(&v, &Session::logged_in("bob")),
            Err(MotorpoolError::Unauthorized { id: 1, .. })
        ));
    }
}
