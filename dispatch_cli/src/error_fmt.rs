//! Human-readable error descriptions and structured JSON error formatting.

use dispatch_core::error::{BuildError, DispatchError, RouteRejection};

/// Exit code for a rejected trip request.
pub const EXIT_REJECTED: i32 = 3;
/// Exit code for elevator ownership conflicts between controllers.
pub const EXIT_OWNERSHIP: i32 = 4;
/// Exit code for controller build failures.
pub const EXIT_BUILD: i32 = 5;

fn rejection_text(r: &RouteRejection) -> String {
    match r {
        RouteRejection::DestinationDispatchDisabled => {
            "What happened: The controller does not accept destination-dispatch trips.\nLikely causes: destination_dispatch is false for this controller.\nHow to fix: Set destination_dispatch = true under the matching [[controllers]] entry.".to_string()
        }
        RouteRejection::SameFloor => {
            "What happened: Floors are the same.\nLikely causes: Origin and destination were given as the same floor.\nHow to fix: Pick a destination different from the origin.".to_string()
        }
        RouteRejection::InvalidFloor(f) => format!(
            "What happened: Invalid floor {f}.\nLikely causes: The floor is outside [building] bottom_floor..top_floor.\nHow to fix: Use a floor that exists in the building."
        ),
        RouteRejection::NoServicingElevator(f) => format!(
            "What happened: No elevators found for floor {f}.\nLikely causes: No elevator of this controller stops there (outside serves, or listed in skip).\nHow to fix: Use another controller, or adjust the elevators' serves/skip settings."
        ),
        RouteRejection::NoValidElevators => {
            "What happened: No valid elevators found.\nLikely causes: The controller has no elevators, or they were removed.\nHow to fix: List elevators under the controller in the config.".to_string()
        }
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingElevatorRegistry | BuildError::MissingFloorRegistry => format!(
                "What happened: Controller was built without a registry ({be}).\nLikely causes: Internal wiring error.\nHow to fix: Report this as a bug."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid controller configuration ({msg}).\nLikely causes: Out-of-range values in [[controllers]].\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(de) = err.downcast_ref::<DispatchError>() {
        return match de {
            DispatchError::Rejected(r) => rejection_text(r),
            DispatchError::OwnedElsewhere {
                elevator,
                controller,
            } => format!(
                "What happened: Elevator {elevator} already assigned to controller {controller}.\nLikely causes: The elevator is listed under two controllers.\nHow to fix: Keep each elevator under a single [[controllers]] entry."
            ),
            DispatchError::AlreadyBound(id) => format!(
                "What happened: Elevator {id} is listed twice for one controller.\nLikely causes: Duplicate id in a controller's elevators list.\nHow to fix: Remove the duplicate."
            ),
            DispatchError::UnknownElevator(id) => format!(
                "What happened: Elevator {id} not found.\nLikely causes: A controller references an elevator that is not installed.\nHow to fix: Add it under [[elevators]] or drop it from the controller."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from config or CSV loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("requests csv must have headers") {
        return "Invalid headers in requests CSV. Expected 'tick,station,controller,origin,destination'.".to_string();
    }

    if lower.contains("assigned to controllers") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: An elevator is listed under two controllers.\nHow to fix: Each elevator may belong to one controller only."
        );
    }

    if lower.contains("parse config")
        && let Some(de) = err.chain().find_map(|e| e.downcast_ref::<toml::de::Error>())
    {
        let at = de
            .span()
            .map(|s| format!(" at byte {}", s.start))
            .unwrap_or_default();
        return format!(
            "What happened: The config is not valid TOML{at}: {}\nLikely causes: A typo, a missing quote or a field with the wrong type.\nHow to fix: Fix the TOML at the reported position.",
            de.message()
        );
    }

    if lower.contains("read config") || lower.contains("parse config") {
        let mut cause = String::new();
        if let Some(src) = err.source() {
            cause = format!(" Cause: {src}");
        }
        return format!(
            "What happened: Could not load the config.{cause}\nLikely causes: Wrong --config path or malformed TOML.\nHow to fix: Check the path and the TOML syntax."
        );
    }

    if lower.contains("must be") || lower.contains("outside") || lower.contains("duplicated") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error class; anything unclassified returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return EXIT_BUILD;
    }
    match err.downcast_ref::<DispatchError>() {
        Some(DispatchError::Rejected(_)) => EXIT_REJECTED,
        Some(DispatchError::OwnedElsewhere { .. } | DispatchError::AlreadyBound(_)) => {
            EXIT_OWNERSHIP
        }
        _ => 1,
    }
}

fn rejection_name(r: &RouteRejection) -> &'static str {
    match r {
        RouteRejection::DestinationDispatchDisabled => "DestinationDispatchDisabled",
        RouteRejection::SameFloor => "SameFloor",
        RouteRejection::InvalidFloor(_) => "InvalidFloor",
        RouteRejection::NoServicingElevator(_) => "NoServicingElevator",
        RouteRejection::NoValidElevators => "NoValidElevators",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    if let Some(DispatchError::Rejected(r)) = err.downcast_ref::<DispatchError>() {
        let floor = match r {
            RouteRejection::InvalidFloor(f) | RouteRejection::NoServicingElevator(f) => Some(*f),
            _ => None,
        };
        let obj = match floor {
            Some(f) => json!({
                "reason": rejection_name(r),
                "details": { "floor": f },
                "message": humanize(err),
            }),
            None => json!({ "reason": rejection_name(r), "message": humanize(err) }),
        };
        return obj.to_string();
    }

    if let Some(DispatchError::OwnedElsewhere {
        elevator,
        controller,
    }) = err.downcast_ref::<DispatchError>()
    {
        return json!({
            "reason": "OwnedElsewhere",
            "details": { "elevator": elevator, "controller": controller },
            "message": humanize(err),
        })
        .to_string();
    }

    // Generic error JSON
    json!({ "reason": "Error", "message": humanize(err) }).to_string()
}
