pub mod offsets;
pub mod zoom;

pub use offsets::{
    alignable_phases, calculate_offsets, calculate_offsets_observed_phase,
    calculate_offsets_predicted_phase, get_alignment_time, AlignmentInputs, AlignmentMode, Offset,
};
pub use zoom::zoom_interval_for_open_event;
