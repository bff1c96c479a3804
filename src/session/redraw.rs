/// Identifies one requested redraw or decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RedrawTicket(u64);

impl RedrawTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Monotonic generation counter.
///
/// Async work captures a ticket when it starts and is applied only while that ticket is still
/// the newest one handed out. Issuing a new ticket or calling [`RedrawGate::invalidate`] makes
/// every earlier ticket stale.
#[derive(Debug, Default)]
pub struct RedrawGate {
    generation: u64,
}

impl RedrawGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> RedrawTicket {
        self.generation += 1;
        RedrawTicket(self.generation)
    }

    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub fn is_current(&self, ticket: RedrawTicket) -> bool {
        ticket.0 == self.generation
    }
}
