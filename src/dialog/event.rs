//! Events that advance a habit-creation dialog

/// User inputs that trigger dialog transitions. Beginning a dialog is a
/// service-level operation, not an event; there is no state to transition
/// from.
#[derive(Debug, Clone)]
pub enum DialogEvent {
    /// Free-text habit name
    SubmitName { text: String },
    /// Frequency selection; carries the raw value so a closed-set UI and a
    /// raw transport can share one path
    SelectFrequency { value: String },
    /// Free-text description, empty string meaning "none"
    SubmitDescription { text: String },
    /// Skip the description step
    SkipDescription,
    /// Abandon the dialog, discarding collected fields
    Cancel,
}

impl DialogEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DialogEvent::SubmitName { .. } => "submit_name",
            DialogEvent::SelectFrequency { .. } => "select_frequency",
            DialogEvent::SubmitDescription { .. } => "submit_description",
            DialogEvent::SkipDescription => "skip_description",
            DialogEvent::Cancel => "cancel",
        }
    }
}
