/// Lifecycle of one cached window.
///
/// Requested → Resident ⇄ Revalidating, with Failed reachable from any fetch.
/// A window that has content keeps serving it while revalidating, and also
/// after a failed refresh.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResidencyState {
    /// First fetch in flight, nothing to show yet.
    Requested,
    /// Content present, nothing in flight.
    Resident,
    /// Content present (possibly stale) while a refresh is in flight.
    Revalidating,
    /// Last fetch failed and there is no content.
    Failed,
}

impl ResidencyState {
    pub fn is_in_flight(self) -> bool {
        matches!(self, ResidencyState::Requested | ResidencyState::Revalidating)
    }
}
