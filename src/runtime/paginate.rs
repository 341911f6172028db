//! Windowing of long option lists around the current selection.

/// Return the visible window of `options` and the selection's index inside it.
///
/// The window never exceeds the list at either end and always contains
/// `selected`, which is kept near the middle of the page when possible.
pub fn paginate<T>(page_size: usize, options: &[T], selected: usize) -> (&[T], usize) {
    if options.len() <= page_size {
        return (options, selected);
    }

    let half = page_size / 2;
    let max_start = options.len() - page_size;
    let start = selected.saturating_sub(half).min(max_start);
    (&options[start..start + page_size], selected - start)
}
