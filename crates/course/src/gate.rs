//! Client-side gate on the "mark as completed" action.
//!
//! The gate only observes signals a browser can report (a resource was opened,
//! the window regained focus), so it is a best-effort hint and never a proof
//! that the learner read anything. The server does not enforce it.

use std::time::Duration;

use serde::Serialize;

/// Minimum time away from the page before regaining focus counts as having
/// viewed every declared resource.
pub const FOCUS_FALLBACK_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Pdf,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    PdfOpened,
    FormOpened,
    FocusRegained { away: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionGate {
    PendingPdf,
    PendingForm,
    PendingBoth,
    Ready,
}

impl CompletionGate {
    /// A chapter declaring no resource starts out ready.
    pub fn new(has_pdf: bool, has_form: bool) -> Self {
        match (has_pdf, has_form) {
            (false, false) => CompletionGate::Ready,
            (true, false) => CompletionGate::PendingPdf,
            (false, true) => CompletionGate::PendingForm,
            (true, true) => CompletionGate::PendingBoth,
        }
    }

    /// Blank URLs count as absent.
    pub fn for_urls(pdf_url: Option<&str>, google_form_url: Option<&str>) -> Self {
        let declared = |url: Option<&str>| url.is_some_and(|url| !url.trim().is_empty());

        Self::new(declared(pdf_url), declared(google_form_url))
    }

    pub fn observe(self, signal: Signal) -> Self {
        use CompletionGate::*;

        match (self, signal) {
            (PendingPdf, Signal::PdfOpened) => Ready,
            (PendingBoth, Signal::PdfOpened) => PendingForm,
            (PendingForm, Signal::FormOpened) => Ready,
            (PendingBoth, Signal::FormOpened) => PendingPdf,
            (_, Signal::FocusRegained { away }) if away >= FOCUS_FALLBACK_AFTER => Ready,
            (state, _) => state,
        }
    }

    pub fn can_complete(&self) -> bool {
        *self == CompletionGate::Ready
    }

    pub fn outstanding(&self) -> Vec<Resource> {
        match self {
            CompletionGate::PendingPdf => vec![Resource::Pdf],
            CompletionGate::PendingForm => vec![Resource::Form],
            CompletionGate::PendingBoth => vec![Resource::Pdf, Resource::Form],
            CompletionGate::Ready => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_follows_declared_resources() {
        assert_eq!(CompletionGate::new(false, false), CompletionGate::Ready);
        assert_eq!(CompletionGate::new(true, false), CompletionGate::PendingPdf);
        assert_eq!(CompletionGate::new(false, true), CompletionGate::PendingForm);
        assert_eq!(CompletionGate::new(true, true), CompletionGate::PendingBoth);
    }

    #[test]
    fn blank_urls_are_not_declared() {
        assert_eq!(
            CompletionGate::for_urls(Some("  "), None),
            CompletionGate::Ready
        );
        assert_eq!(
            CompletionGate::for_urls(Some("https://files.example/a.pdf"), Some("")),
            CompletionGate::PendingPdf
        );
    }

    #[test]
    fn both_resources_in_either_order() {
        let gate = CompletionGate::new(true, true);

        let pdf_first = gate.observe(Signal::PdfOpened);
        assert_eq!(pdf_first, CompletionGate::PendingForm);
        assert!(!pdf_first.can_complete());
        assert_eq!(pdf_first.observe(Signal::FormOpened), CompletionGate::Ready);

        let form_first = gate.observe(Signal::FormOpened);
        assert_eq!(form_first, CompletionGate::PendingPdf);
        assert_eq!(form_first.observe(Signal::PdfOpened), CompletionGate::Ready);
    }

    #[test]
    fn unrelated_signals_do_not_move() {
        assert_eq!(
            CompletionGate::PendingPdf.observe(Signal::FormOpened),
            CompletionGate::PendingPdf
        );
        assert_eq!(
            CompletionGate::PendingForm.observe(Signal::PdfOpened),
            CompletionGate::PendingForm
        );
        assert_eq!(
            CompletionGate::Ready.observe(Signal::PdfOpened),
            CompletionGate::Ready
        );
    }

    #[test]
    fn focus_fallback_needs_enough_time_away() {
        let gate = CompletionGate::PendingBoth;

        let quick = gate.observe(Signal::FocusRegained {
            away: Duration::from_secs(1),
        });
        assert_eq!(quick, CompletionGate::PendingBoth);

        let long = gate.observe(Signal::FocusRegained {
            away: FOCUS_FALLBACK_AFTER,
        });
        assert_eq!(long, CompletionGate::Ready);
    }

    #[test]
    fn outstanding_lists_what_remains() {
        assert_eq!(
            CompletionGate::PendingBoth.outstanding(),
            vec![Resource::Pdf, Resource::Form]
        );
        assert!(CompletionGate::Ready.outstanding().is_empty());
        assert!(CompletionGate::Ready.can_complete());
    }
}
