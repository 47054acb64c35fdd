// ── Request sequencing ──
//
// Completions of external calls arrive in any order. Each outgoing request
// carries a `Ticket`; a completion is applied only if its ticket is still
// the newest one issued for that kind of request.

use strum::{Display, EnumCount};

/// The independent request streams of one map screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount)]
#[strum(serialize_all = "snake_case")]
pub enum RequestKind {
    Suggestions,
    Geocode,
    Location,
    Directions,
}

impl RequestKind {
    const fn slot(self) -> usize {
        match self {
            Self::Suggestions => 0,
            Self::Geocode => 1,
            Self::Location => 2,
            Self::Directions => 3,
        }
    }
}

/// Sequence number attached to one outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    kind: RequestKind,
    seq: u64,
}

impl Ticket {
    pub fn kind(self) -> RequestKind {
        self.kind
    }

    pub fn seq(self) -> u64 {
        self.seq
    }
}

/// Issues monotonically increasing tickets per [`RequestKind`].
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: [u64; RequestKind::COUNT],
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket, superseding every earlier ticket of the same kind.
    pub fn issue(&mut self, kind: RequestKind) -> Ticket {
        let slot = &mut self.latest[kind.slot()];
        *slot += 1;
        Ticket { kind, seq: *slot }
    }

    /// Supersede outstanding tickets of `kind` without issuing a new one.
    pub fn invalidate(&mut self, kind: RequestKind) {
        self.latest[kind.slot()] += 1;
    }

    /// Whether `ticket` is the newest of its kind.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest[ticket.kind.slot()] == ticket.seq
    }
}
