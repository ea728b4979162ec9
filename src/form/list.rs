/// Composable ordered-collection capability.
///
/// Components that present an editable list implement this directly instead
/// of inheriting list behavior dynamically, so callers can bulk-populate any
/// list the same way.
pub trait ItemList<T> {
    fn add(&mut self, item: T);

    fn add_all<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.add(item);
        }
    }

    fn set_items<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.clear();
        self.add_all(items);
    }

    fn clear(&mut self);
}
