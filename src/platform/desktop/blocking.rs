/// Seam for disk and store access from event handlers. Desktop dispatch is
/// single threaded and the operations are one-shot local reads/writes, so
/// this runs the closure inline.
pub fn run_blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    f()
}
