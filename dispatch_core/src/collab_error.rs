//! Maps `Box<dyn Error>` from collaborator trait boundaries to `DispatchError`.
//!
//! The traits in `dispatch_traits` return `Box<dyn Error + Send + Sync>`; this
//! module converts those to our typed error enum, with an optional
//! feature-gated path for `dispatch_building::BuildingError` downcasting.

use crate::error::DispatchError;

/// Map a collaborator error to a typed `DispatchError`.
///
/// Known building errors are downcast first; anything else falls back to
/// string heuristics.
pub fn map_collaborator_error(e: &(dyn std::error::Error + 'static)) -> DispatchError {
    #[cfg(feature = "building-errors")]
    {
        use dispatch_building::BuildingError;
        if let Some(be) = e.downcast_ref::<BuildingError>() {
            return match be {
                BuildingError::UnknownElevator(id) => DispatchError::UnknownElevator(*id),
                BuildingError::OutOfService(_) => DispatchError::OutOfService(be.to_string()),
                other => DispatchError::Collaborator(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("out of service") || lower.contains("service mode") {
        DispatchError::OutOfService(s)
    } else {
        DispatchError::Collaborator(s)
    }
}

#[cfg(test)]
mod tests {
    use super::map_collaborator_error;
    use crate::error::DispatchError;

    #[test]
    fn string_heuristic_detects_service_modes() {
        let e: Box<dyn std::error::Error + Send + Sync> = "car in service mode".into();
        assert!(matches!(
            map_collaborator_error(&*e),
            DispatchError::OutOfService(_)
        ));
        let e: Box<dyn std::error::Error + Send + Sync> = "door jammed".into();
        assert_eq!(
            map_collaborator_error(&*e),
            DispatchError::Collaborator("door jammed".into())
        );
    }

    #[cfg(feature = "building-errors")]
    #[test]
    fn building_errors_are_downcast() {
        use dispatch_building::BuildingError;
        let e: Box<dyn std::error::Error + Send + Sync> = Box::new(BuildingError::OutOfService(3));
        assert!(matches!(
            map_collaborator_error(&*e),
            DispatchError::OutOfService(_)
        ));
        let e: Box<dyn std::error::Error + Send + Sync> =
            Box::new(BuildingError::UnknownElevator(9));
        assert_eq!(map_collaborator_error(&*e), DispatchError::UnknownElevator(9));
    }
}
