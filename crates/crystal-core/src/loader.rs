/// Issued when a load starts; only the newest ticket may publish a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Latest-wins guard for overlapping asynchronous loads.
#[derive(Clone, Debug, Default)]
pub struct LoadGuard {
    generation: u64,
}

impl LoadGuard {
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }
}
