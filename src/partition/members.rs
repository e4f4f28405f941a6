/// MemberSets maintains a total assignment of nodes to community labels,
/// with O(1) find/move and O(size) merge of whole communities.
#[derive(Debug, Clone)]
pub(crate) struct MemberSets {
    sets: Vec<Vec<usize>>,  // sets[c] = nodes currently in community c
    index: Vec<usize>,      // index[v] = c when v is in sets[c]
    position: Vec<usize>    // position[v] = i when sets[c][i] is v
}

impl MemberSets {
    /// One set per node, each node in its own set.
    pub(crate) fn singletons(num_elems: usize) -> Self {
        Self {
            sets: (0..num_elems).map(|v| vec![v]).collect(),
            index: (0..num_elems).collect(),
            position: vec![0; num_elems],
        }
    }

    /// Number of labels (occupied or not).
    #[inline] pub(crate) fn num_sets(&self) -> usize { self.sets.len() }

    /// Universe size (number of nodes addressable by index).
    #[inline] pub(crate) fn num_elems(&self) -> usize { self.index.len() }

    /// Return the set that `elem` is currently in.
    #[inline]
    pub(crate) fn find(&self, elem: usize) -> usize {
        debug_assert!(elem < self.index.len(), "element out of range");
        self.index[elem]
    }

    /// Returns a reference to the elements currently in `set`.
    #[inline]
    pub(crate) fn get(&self, set: usize) -> &[usize] {
        debug_assert!(set < self.sets.len(), "set out of range");
        &self.sets[set]
    }

    /// Get a complete vector of assignments for each element.
    #[inline] pub(crate) fn assignments(&self) -> &[usize] { &self.index }

    /// Rebuild from a complete slice of assignments (labels already validated).
    pub(crate) fn rebuild(&mut self, assignments: &[usize]) {
        assert!(assignments.len() == self.num_elems(), "assignments length mismatch");

        self.sets.iter_mut().for_each(|v| v.clear());
        for (elem, &set) in assignments.iter().enumerate() {
            assert!(set < self.num_sets(), "set out of range");
            self.index[elem] = set;
            self.position[elem] = self.sets[set].len();
            self.sets[set].push(elem);
        }
    }

    /// Move `elem` to `set`.
    pub(crate) fn move_to(&mut self, elem: usize, set: usize) {
        debug_assert!(elem < self.index.len(), "element out of range");
        debug_assert!(set < self.sets.len(), "set out of range");

        let (prev, pos) = (self.index[elem], self.position[elem]);
        if prev == set { return }

        // Remove from previous set by swapping with last element.
        self.sets[prev].swap_remove(pos);
        if let Some(&moved) = self.sets[prev].get(pos) {
            self.position[moved] = pos;
        }

        // Add to new set.
        self.index[elem] = set;
        self.position[elem] = self.sets[set].len();
        self.sets[set].push(elem);
    }

    /// Move every element of `source` into `target`, leaving `source` empty.
    pub(crate) fn merge_into(&mut self, source: usize, target: usize) {
        if source == target { return }

        let moved = std::mem::take(&mut self.sets[source]);
        for elem in moved {
            self.index[elem] = target;
            self.position[elem] = self.sets[target].len();
            self.sets[target].push(elem);
        }
    }

    /// Relabel every set: the elements of `c` end up in `perm[c]`.
    /// `perm` must be a permutation of `0..num_sets()`.
    pub(crate) fn relabel(&mut self, perm: &[usize]) {
        debug_assert_eq!(perm.len(), self.num_sets(), "permutation length mismatch");

        let mut sets = vec![Vec::new(); self.num_sets()];
        for (c, set) in self.sets.drain(..).enumerate() {
            sets[perm[c]] = set;
        }
        self.sets = sets;
        self.index.iter_mut().for_each(|c| *c = perm[*c]);
    }
}
