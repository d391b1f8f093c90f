//! Cross-transport admission policy.
//!
//! The backend defines no ordering between a push update and a
//! near-simultaneous poll response, so a stale poll body can in principle
//! overwrite a fresher push value ("rewind"). Rather than inventing a
//! sequence number the wire does not carry, the apply loop consults a
//! pluggable policy before reconciling each snapshot.

use doorwarden_api::StatusSnapshot;

/// Which transport produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Push,
    Poll,
}

/// Decides whether a snapshot may reach the reconciler.
pub trait SequencingPolicy: Send {
    fn admit(&mut self, source: Source, snapshot: &StatusSnapshot) -> bool;
}

/// Default policy: admit everything. The reconciler's diff-and-skip is
/// then the only safeguard against rewind flicker, which matches the
/// backend's own browser client.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmitAll;

impl SequencingPolicy for AdmitAll {
    fn admit(&mut self, _source: Source, _snapshot: &StatusSnapshot) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admit_all_admits_both_sources() {
        let mut policy = AdmitAll;
        let snapshot = StatusSnapshot::default();
        assert!(policy.admit(Source::Push, &snapshot));
        assert!(policy.admit(Source::Poll, &snapshot));
    }
}
