use serde_json::Value;

use super::types::{DistanceError, TravelTime};

/// Statuses meaning the service handled the query, with or without routes.
const SUCCESS_STATUSES: [&str; 3] = ["OK", "ZERO_RESULTS", "NOT_FOUND"];

/// Extracts the shortest leg duration from a directions response body.
///
/// Every `legs` array found anywhere in the document contributes its
/// `duration.value` entries, so all alternative routes are considered.
pub fn shortest_leg_duration(body: &Value) -> Result<TravelTime, DistanceError> {
    if let Some(status) = body.get("status").and_then(Value::as_str) {
        if !SUCCESS_STATUSES.contains(&status) {
            let message = body
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(DistanceError::Api { status: status.to_string(), message });
        }
    }

    let mut durations = Vec::new();
    collect_leg_durations(body, &mut durations)?;

    Ok(durations
        .into_iter()
        .min()
        .map_or(TravelTime::Unreachable, TravelTime::Seconds))
}

fn collect_leg_durations(node: &Value, out: &mut Vec<u64>) -> Result<(), DistanceError> {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                if key == "legs" {
                    if let Value::Array(legs) = value {
                        for leg in legs {
                            if let Some(raw) = leg.get("duration").and_then(|d| d.get("value")) {
                                let secs = raw.as_u64().ok_or_else(|| {
                                    DistanceError::Payload(format!("leg duration {} is not a whole number of seconds", raw))
                                })?;
                                out.push(secs);
                            }
                        }
                    }
                }
                collect_leg_durations(value, out)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_leg_durations(item, out)?;
            }
        }
        _ => {}
    }
    Ok(())
}
