//! Application lifecycle: statuses and the legal transition table.
//!
//! Applications move one way through the lifecycle:
//!
//! ```text
//! PENDING ──► ACTIVE ──► COMPLETED ──► CERTIFIED
//!    │           │
//!    ├─► REJECTED│
//!    └───────────┴──► WITHDRAWN
//! ```
//!
//! `CERTIFIED`, `REJECTED` and `WITHDRAWN` are terminal: no edge leaves them.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Status of an internship application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    /// Submitted by the student, awaiting a decision.
    Pending,
    /// Internship is ongoing.
    Active,
    /// Internship work finished, awaiting certification.
    Completed,
    /// Formally certified by the student's institution.
    Certified,
    /// Declined by the host.
    Rejected,
    /// Withdrawn by the student.
    Withdrawn,
}

impl ApplicationStatus {
    /// All statuses, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Active,
        Self::Completed,
        Self::Certified,
        Self::Rejected,
        Self::Withdrawn,
    ];

    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Certified => "CERTIFIED",
            Self::Rejected => "REJECTED",
            Self::Withdrawn => "WITHDRAWN",
        }
    }

    /// Returns true for statuses with no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Certified | Self::Rejected | Self::Withdrawn)
    }

    /// Position along the main progression, or `None` for exit statuses.
    #[must_use]
    pub const fn progression_rank(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Active => Some(1),
            Self::Completed => Some(2),
            Self::Certified => Some(3),
            Self::Rejected | Self::Withdrawn => None,
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownStatus(s.to_string()))
    }
}

/// Mapping from each status to the set of statuses it may move to.
///
/// # Example
///
/// ```
/// use placement_core::{ApplicationStatus, TransitionTable};
///
/// let table = TransitionTable::standard();
/// assert!(table.allows(ApplicationStatus::Completed, ApplicationStatus::Certified));
/// assert!(!table.allows(ApplicationStatus::Certified, ApplicationStatus::Active));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    edges: BTreeMap<ApplicationStatus, BTreeSet<ApplicationStatus>>,
}

impl TransitionTable {
    /// The standard placement lifecycle.
    #[must_use]
    pub fn standard() -> Self {
        use ApplicationStatus::{Active, Certified, Completed, Pending, Rejected, Withdrawn};

        let mut edges = BTreeMap::new();
        edges.insert(Pending, BTreeSet::from([Active, Rejected, Withdrawn]));
        edges.insert(Active, BTreeSet::from([Completed, Withdrawn]));
        edges.insert(Completed, BTreeSet::from([Certified]));
        Self { edges }
    }

    /// Starts an empty table builder.
    #[must_use]
    pub fn builder() -> TransitionTableBuilder {
        TransitionTableBuilder::default()
    }

    /// Returns true if `from -> to` is a legal transition.
    pub fn allows(&self, from: ApplicationStatus, to: ApplicationStatus) -> bool {
        self.edges.get(&from).is_some_and(|next| next.contains(&to))
    }

    /// Returns the legal successors of `from`, in declaration order.
    pub fn successors(&self, from: ApplicationStatus) -> Vec<ApplicationStatus> {
        self.edges
            .get(&from)
            .map(|next| next.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns true if no transition leaves `status` in this table.
    pub fn is_terminal(&self, status: ApplicationStatus) -> bool {
        self.edges.get(&status).map_or(true, BTreeSet::is_empty)
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for custom [`TransitionTable`]s.
///
/// Every edge is checked against the lifecycle ordering when the table is
/// built.
#[derive(Debug, Default)]
pub struct TransitionTableBuilder {
    edges: Vec<(ApplicationStatus, ApplicationStatus)>,
}

impl TransitionTableBuilder {
    /// Adds a legal transition.
    #[must_use]
    pub fn allow(mut self, from: ApplicationStatus, to: ApplicationStatus) -> Self {
        self.edges.push((from, to));
        self
    }

    /// Validates the edges and builds the table.
    pub fn build(self) -> DomainResult<TransitionTable> {
        let mut edges: BTreeMap<ApplicationStatus, BTreeSet<ApplicationStatus>> = BTreeMap::new();
        for (from, to) in self.edges {
            validate_edge(from, to)?;
            edges.entry(from).or_default().insert(to);
        }
        Ok(TransitionTable { edges })
    }
}

fn validate_edge(from: ApplicationStatus, to: ApplicationStatus) -> DomainResult<()> {
    let reason = if from.is_terminal() {
        Some("terminal status has no successors")
    } else if from == to {
        Some("self transitions are not allowed")
    } else {
        match (from.progression_rank(), to.progression_rank()) {
            (Some(a), Some(b)) if b <= a => Some("transition moves backward"),
            _ => None,
        }
    };

    match reason {
        Some(reason) => Err(DomainError::InvalidTransitionEdge { from, to, reason }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApplicationStatus::*;

    #[test]
    fn test_standard_table_edges() {
        let table = TransitionTable::standard();
        assert!(table.allows(Pending, Active));
        assert!(table.allows(Pending, Rejected));
        assert!(table.allows(Pending, Withdrawn));
        assert!(table.allows(Active, Completed));
        assert!(table.allows(Active, Withdrawn));
        assert!(table.allows(Completed, Certified));

        assert!(!table.allows(Pending, Certified));
        assert!(!table.allows(Active, Certified));
        assert!(!table.allows(Completed, Active));
    }

    #[test]
    fn test_terminal_statuses_have_no_successors() {
        let table = TransitionTable::standard();
        for status in [Certified, Rejected, Withdrawn] {
            assert!(status.is_terminal());
            assert!(table.is_terminal(status));
            assert!(table.successors(status).is_empty());
        }
    }

    #[test]
    fn test_standard_table_is_valid() {
        let table = TransitionTable::standard();
        for from in ApplicationStatus::ALL {
            for to in table.successors(from) {
                assert!(validate_edge(from, to).is_ok(), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_builder_rejects_leaving_certified() {
        let err = TransitionTable::builder()
            .allow(Certified, Active)
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransitionEdge { from: Certified, .. }));
    }

    #[test]
    fn test_builder_rejects_backward_edges() {
        let err = TransitionTable::builder()
            .allow(Completed, Active)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("backward"));
    }

    #[test]
    fn test_builder_rejects_self_loops() {
        assert!(TransitionTable::builder().allow(Active, Active).build().is_err());
    }

    #[test]
    fn test_builder_accepts_forward_edges() {
        let table = TransitionTable::builder()
            .allow(Pending, Active)
            .allow(Active, Certified)
            .build()
            .unwrap();
        assert!(table.allows(Active, Certified));
        assert!(!table.allows(Active, Completed));
        assert!(table.is_terminal(Completed));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("CERTIFIED".parse::<ApplicationStatus>().unwrap(), Certified);
        assert_eq!("active".parse::<ApplicationStatus>().unwrap(), Active);
        assert!("ACCEPTED".parse::<ApplicationStatus>().is_err());
    }

    proptest::proptest! {
        #[test]
        fn built_tables_only_move_forward(
            edges in proptest::collection::vec(
                (proptest::sample::select(ApplicationStatus::ALL.to_vec()),
                 proptest::sample::select(ApplicationStatus::ALL.to_vec())),
                0..8,
            )
        ) {
            let builder = edges
                .iter()
                .fold(TransitionTable::builder(), |b, &(from, to)| b.allow(from, to));
            if let Ok(table) = builder.build() {
                for status in [Certified, Rejected, Withdrawn] {
                    proptest::prop_assert!(table.is_terminal(status));
                }
                for from in ApplicationStatus::ALL {
                    for to in table.successors(from) {
                        proptest::prop_assert_ne!(from, to);
                        if let (Some(a), Some(b)) = (from.progression_rank(), to.progression_rank()) {
                            proptest::prop_assert!(a < b);
                        }
                    }
                }
            }
        }

        #[test]
        fn status_names_parse_in_any_case(
            status in proptest::sample::select(ApplicationStatus::ALL.to_vec()),
            lower in proptest::bool::ANY,
        ) {
            let name = if lower { status.as_str().to_lowercase() } else { status.as_str().to_string() };
            proptest::prop_assert_eq!(name.parse::<ApplicationStatus>().ok(), Some(status));
        }
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&Withdrawn).unwrap();
        assert_eq!(json, "\"WITHDRAWN\"");
        let parsed: ApplicationStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(parsed, Completed);
    }
}
