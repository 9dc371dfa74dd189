/// Ticket handed out when a fetch starts.
///
/// Tickets are ordered by issue time; only the newest one may apply its result.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Latest-wins gate for a single logical request stream.
///
/// Every trigger calls [`RequestGate::begin`] before suspending on I/O and
/// [`RequestGate::settle`] once the response is in. A response whose ticket
/// has been superseded is refused, so an older response arriving late can
/// never overwrite state produced from a newer one, and at most one result is
/// applied per generation.
#[derive(Debug, Default)]
pub struct RequestGate {
    issued: u64,
    in_flight: Option<Ticket>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh ticket, superseding any request still in flight.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.in_flight = Some(ticket);
        ticket
    }

    pub fn in_flight(&self) -> Option<Ticket> {
        self.in_flight
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.in_flight == Some(ticket)
    }

    /// Consumes `ticket`'s claim on the stream.
    ///
    /// Returns `true` if the caller may apply its result. A ticket settles at
    /// most once; a second call with the same ticket returns `false`.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if self.is_current(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RequestGate;

    #[test]
    fn single_request_applies() {
        let mut gate = RequestGate::new();
        let t = gate.begin();
        assert!(gate.is_current(t));
        assert!(gate.settle(t));
        assert_eq!(gate.in_flight(), None);
    }

    #[test]
    fn newer_ticket_supersedes_older() {
        let mut gate = RequestGate::new();
        let first = gate.begin();
        let second = gate.begin();
        assert!(second > first);

        // The second response lands first; the late first response is refused.
        assert!(gate.settle(second));
        assert!(!gate.settle(first));
    }

    #[test]
    fn stale_response_refused_even_if_it_lands_first() {
        let mut gate = RequestGate::new();
        let first = gate.begin();
        let second = gate.begin();
        assert!(!gate.settle(first));
        assert!(gate.settle(second));
    }

    #[test]
    fn ticket_settles_once() {
        let mut gate = RequestGate::new();
        let t = gate.begin();
        assert!(gate.settle(t));
        assert!(!gate.settle(t));
    }
}
