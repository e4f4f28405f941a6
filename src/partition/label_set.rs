/// A subset of the labels `0..universe` with O(1) insert, remove and lookup.
#[derive(Debug, Clone)]
pub(crate) struct LabelSet {
    items: Vec<usize>,
    position: Vec<Option<usize>>, // position[label] = Some(i) if items[i] == label
}

impl LabelSet {
    /// The empty subset of `0..universe`.
    pub(crate) fn empty(universe: usize) -> Self {
        Self { items: Vec::new(), position: vec![None; universe] }
    }

    /// Rebuild from the labels yielded by `iter`, in that order.
    pub(crate) fn rebuild_from<I>(&mut self, iter: I) where I: IntoIterator<Item = usize> {
        self.items.clear();
        self.position.fill(None);
        for label in iter { self.insert(label) }
    }

    #[inline] pub(crate) fn len(&self) -> usize { self.items.len() }

    #[inline]
    pub(crate) fn contains(&self, label: usize) -> bool {
        debug_assert!(label < self.position.len(), "label out of range");
        self.position[label].is_some()
    }

    /// Members in insertion order, perturbed by removals.
    #[inline] pub(crate) fn as_slice(&self) -> &[usize] { &self.items }

    /// Most recently inserted label still present.
    #[inline] pub(crate) fn last(&self) -> Option<usize> { self.items.last().copied() }

    /// Insert `label` (no-op if present).
    pub(crate) fn insert(&mut self, label: usize) {
        if self.contains(label) { return }
        self.position[label] = Some(self.items.len());
        self.items.push(label);
    }

    /// Remove `label` (no-op if absent).
    pub(crate) fn remove(&mut self, label: usize) {
        let Some(pos) = self.position[label].take() else { return };
        self.items.swap_remove(pos);
        if let Some(&moved) = self.items.get(pos) {
            self.position[moved] = Some(pos);
        }
    }
}
