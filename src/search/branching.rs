use crate::engine::DomainStore;
use crate::variables::VariableId;
use crate::variables::View;

/// How the next branching variable is chosen.
///
/// `InputOrder` walks the branching list once per descent: everything before
/// the cursor is known to be assigned, so selection resumes where it left
/// off. `SmallestDomain` rescans the whole list and picks the unassigned
/// variable with the fewest remaining values, breaking ties by list order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum VariableSelection {
    #[default]
    InputOrder,
    SmallestDomain,
}

impl VariableSelection {
    /// Select the next variable to branch on, or `None` when every branching
    /// variable is assigned. Returns the cursor to resume from alongside the
    /// selected variable.
    pub(crate) fn select(
        self,
        store: &DomainStore,
        branching: &[VariableId],
        cursor: usize,
    ) -> Option<(usize, VariableId)> {
        match self {
            VariableSelection::InputOrder => branching
                .iter()
                .enumerate()
                .skip(cursor)
                .find(|(_, variable)| !store.is_assigned(View::positive(**variable)))
                .map(|(position, variable)| (position, *variable)),
            VariableSelection::SmallestDomain => branching
                .iter()
                .filter(|variable| !store.is_assigned(View::positive(**variable)))
                .min_by_key(|variable| store.interval(View::positive(**variable)).width())
                .map(|variable| (cursor, *variable)),
        }
    }
}
