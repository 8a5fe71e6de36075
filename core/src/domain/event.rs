use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::detection::SignalDetection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventHypothesis {
    pub id: String,
    #[serde(default)]
    pub rejected: bool,
    #[serde(default)]
    pub associated_detection_hypothesis_ids: Vec<String>,
}

/// Located event and its hypotheses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub preferred_hypothesis_id: String,
    pub hypotheses: Vec<EventHypothesis>,
}

impl Event {
    pub fn preferred_hypothesis(&self) -> Option<&EventHypothesis> {
        self.hypotheses
            .iter()
            .find(|hypothesis| hypothesis.id == self.preferred_hypothesis_id)
    }

    /// Detection hypothesis ids associated to the preferred hypothesis. Empty
    /// when that hypothesis is rejected.
    pub fn associated_hypothesis_ids(&self) -> HashSet<&str> {
        self.preferred_hypothesis()
            .filter(|hypothesis| !hypothesis.rejected)
            .map(|hypothesis| {
                hypothesis
                    .associated_detection_hypothesis_ids
                    .iter()
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True when the detection's current hypothesis belongs to this event.
    pub fn is_associated(&self, detection: &SignalDetection) -> bool {
        detection
            .current_hypothesis()
            .map(|current| self.associated_hypothesis_ids().contains(current.id.as_str()))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EventStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

/// Association of a detection relative to the open event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssociationStatus {
    OpenAssociated,
    CompleteAssociated,
    OtherAssociated,
    Unassociated,
}

impl AssociationStatus {
    /// Theme token key used to colour pick markers.
    pub fn theme_key(self) -> &'static str {
        match self {
            Self::OpenAssociated => "open_associated",
            Self::CompleteAssociated => "complete_associated",
            Self::OtherAssociated => "other_associated",
            Self::Unassociated => "unassociated",
        }
    }
}

pub fn find_event<'a>(events: &'a [Event], event_id: Option<&str>) -> Option<&'a Event> {
    let event_id = event_id?;
    events.iter().find(|event| event.id == event_id)
}

pub fn is_open_associated(
    detection: &SignalDetection,
    events: &[Event],
    open_event_id: Option<&str>,
) -> bool {
    find_event(events, open_event_id)
        .map(|event| event.is_associated(detection))
        .unwrap_or(false)
}

pub fn association_status(
    detection: &SignalDetection,
    events: &[Event],
    open_event_id: Option<&str>,
    statuses: &HashMap<String, EventStatus>,
) -> AssociationStatus {
    if is_open_associated(detection, events, open_event_id) {
        return AssociationStatus::OpenAssociated;
    }
    let mut associated = events
        .iter()
        .filter(|event| Some(event.id.as_str()) != open_event_id)
        .filter(|event| event.is_associated(detection))
        .peekable();
    if associated.peek().is_none() {
        return AssociationStatus::Unassociated;
    }
    if associated.any(|event| statuses.get(&event.id) == Some(&EventStatus::Complete)) {
        AssociationStatus::CompleteAssociated
    } else {
        AssociationStatus::OtherAssociated
    }
}
