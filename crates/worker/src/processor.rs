//! Processing behavior run on the worker thread.

/// Trait implemented by whatever consumes the worker's items.
///
/// All methods run on the worker thread. `process` is called exactly once per
/// accepted item, in acceptance order.
pub trait Processor<T>: Send + 'static {
    /// Called once before the first item.
    fn on_start(&mut self) {}

    fn process(&mut self, item: T);

    /// Called once after the last item has been processed.
    fn on_stop(&mut self) {}
}

impl<T, F> Processor<T> for F
where
    F: FnMut(T) + Send + 'static,
{
    fn process(&mut self, item: T) {
        self(item)
    }
}
