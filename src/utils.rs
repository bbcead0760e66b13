use std::ops::Deref;

/// Pads and aligns a value to the length of a cache line.
///
/// The lock-free counter mirror is read by monitoring threads while consumers
/// hammer the queue lock; keeping the two on separate lines stops those reads
/// from bouncing the lock's line between cores.
///
/// Line sizes: s390x 256B, aarch64 128B (Apple M-series / Neoverse), 64B elsewhere.
#[cfg_attr(target_arch = "s390x", repr(align(256)))]
#[cfg_attr(target_arch = "aarch64", repr(align(128)))]
#[cfg_attr(
    not(any(target_arch = "s390x", target_arch = "aarch64")),
    repr(align(64))
)]
#[derive(Default, Debug)]
pub(crate) struct CacheAligned<T> {
    value: T,
}

impl<T> CacheAligned<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> Deref for CacheAligned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}
