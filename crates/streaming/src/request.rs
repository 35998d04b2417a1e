/// Identifies one issued fetch.
///
/// Handles are small and copyable and only ever increase within their
/// issuer, so a completion can be matched against the most recent request
/// for the same target and dropped if it was superseded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Request(pub u64);

/// Monotonic source of [`Request`] handles.
#[derive(Debug, Clone)]
pub struct RequestSeq {
    next: u64,
}

impl RequestSeq {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next(&mut self) -> Request {
        let req = Request(self.next);
        self.next += 1;
        req
    }
}

impl Default for RequestSeq {
    fn default() -> Self {
        Self::new()
    }
}
