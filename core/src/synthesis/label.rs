use crate::domain::SignalDetection;
use crate::prelude::{ViewError, ViewResult};

const WILDCARD: &str = "*";

#[derive(Debug, Default)]
struct ParsedChannelName {
    station_name: Option<String>,
    beam_name: Option<String>,
    channel_orientation: Option<String>,
}

/// Beam classification from the portion of a derived channel name after `/`.
pub fn parse_beam_type(channel_name: &str) -> Option<&'static str> {
    if channel_name.is_empty() {
        return None;
    }
    let Some((_, descriptor)) = channel_name.split_once('/') else {
        return Some("Raw channel");
    };
    if descriptor.starts_with("beam,fk") {
        Some("Fk beam")
    } else if descriptor.starts_with("beam,event") {
        Some("Event beam")
    } else if descriptor.starts_with("beam,detection") {
        Some("Detection beam")
    } else {
        None
    }
}

fn merge_component(previous: Option<String>, current: Option<&str>) -> Option<String> {
    match previous {
        None => current.map(str::to_string),
        Some(previous) if Some(previous.as_str()) == current => Some(previous),
        Some(_) => Some(WILDCARD.to_string()),
    }
}

/// Folds one `STATION.BEAM.ORIENTATION[/descriptor]` name into the running result.
/// Names that don't split into three parts leave the result untouched.
fn parse_derived_channel_name(
    channel_name: &str,
    last: ParsedChannelName,
) -> ViewResult<ParsedChannelName> {
    let element = channel_name.split('/').next().unwrap_or_default();
    if element.is_empty() || !element.contains('.') {
        return Ok(last);
    }
    let parts: Vec<&str> = element.split('.').collect();
    if parts.len() != 3 {
        return Ok(last);
    }

    if let Some(previous) = &last.station_name {
        if previous != parts[0] {
            return Err(ViewError::MixedStations(previous.clone(), parts[0].to_string()));
        }
    }

    Ok(ParsedChannelName {
        station_name: Some(parts[0].to_string()),
        beam_name: merge_component(last.beam_name, parse_beam_type(channel_name)),
        channel_orientation: merge_component(last.channel_orientation, Some(parts[2])),
    })
}

/// Label and tooltip for a station row built from that station's detections.
///
/// Returns `("", None)` for an empty list. Fails when the detections come from
/// more than one station.
pub fn get_channel_label_and_tooltip(
    detections: &[&SignalDetection],
) -> ViewResult<(String, Option<String>)> {
    if detections.is_empty() {
        return Ok((String::new(), None));
    }

    let mut parsed = ParsedChannelName::default();
    for detection in detections {
        let channel_name = detection
            .channel_name()
            .ok_or_else(|| ViewError::MissingFeatureMeasurement(detection.id.clone()))?;
        parsed = parse_derived_channel_name(channel_name, parsed)?;
    }

    let Some(orientation) = parsed.channel_orientation else {
        return Ok((String::new(), None));
    };
    let beam_mixed = parsed.beam_name.as_deref() == Some(WILDCARD);
    let orientation_mixed = orientation == WILDCARD;

    let tooltip = match (beam_mixed, orientation_mixed) {
        (true, true) => Some("Multiple beam types and channels"),
        (false, true) => Some("Multiple channels"),
        (true, false) => Some("Multiple beam types"),
        (false, false) => None,
    };

    let label = if beam_mixed && orientation_mixed {
        WILDCARD.to_string()
    } else {
        let beam = if beam_mixed { WILDCARD } else { "beam" };
        format!("{beam}.{orientation}")
    };
    Ok((label, tooltip.map(str::to_string)))
}
