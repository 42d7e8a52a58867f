/// Index at which `item` can be inserted into `items` (already sorted by `key`)
/// while keeping the order. Equal keys resolve to the leftmost slot.
pub fn sorted_index_by_key<T, K, F>(items: &[T], item: &T, key: F) -> usize
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let item_key = key(item);
    let mut low = 0;
    let mut high = items.len();
    while low < high {
        let mid = low + (high - low) / 2;
        if key(&items[mid]) < item_key {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    low
}
