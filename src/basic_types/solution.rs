use crate::engine::DomainStore;
use crate::variables::VariableId;
use crate::variables::View;

/// An owned snapshot of an assigned store.
///
/// Taken whenever the search reaches a leaf in which every branching variable
/// is assigned. Values are stored densely in registration order, mirroring
/// the store's layout; variables outside the branching list are recorded at
/// the lower bound of their final domain.
#[derive(Clone, Debug, Default)]
pub struct Solution {
    values: Box<[i32]>,
}

impl Solution {
    pub(crate) fn from_store(store: &DomainStore) -> Solution {
        let values = (0..store.len())
            .map(|index| store.lower_bound(View::positive(VariableId::from_index(index))))
            .collect();
        Solution { values }
    }

    /// The number of variables captured by this snapshot.
    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    pub fn value(&self, variable: VariableId) -> i32 {
        self.values[variable.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableId, i32)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (VariableId::from_index(index), *value))
    }
}
