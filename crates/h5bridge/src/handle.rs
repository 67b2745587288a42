//! Scoped ownership of native container handles.

use h5bridge_store::{Container, RawHandle};

/// A native handle that is closed exactly once, when the guard drops.
///
/// Every handle the engine opens is held in one of these, so no exit path
/// (early return, `?`, panic unwind) can leak a handle or close it twice.
pub struct ScopedHandle<'c, C: Container> {
    container: &'c C,
    raw: RawHandle,
}

impl<'c, C: Container> ScopedHandle<'c, C> {
    /// Take ownership of a freshly opened handle.
    pub fn new(container: &'c C, raw: RawHandle) -> Self {
        ScopedHandle { container, raw }
    }

    /// The underlying native handle, valid for the guard's lifetime.
    pub fn raw(&self) -> RawHandle {
        self.raw
    }
}

impl<C: Container> Drop for ScopedHandle<'_, C> {
    fn drop(&mut self) {
        // A close failure here means the handle was already gone; there is
        // nothing useful to do with it during drop.
        let _ = self.container.close(self.raw);
    }
}

impl<C: Container> std::fmt::Debug for ScopedHandle<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ScopedHandle").field(&self.raw).finish()
    }
}
