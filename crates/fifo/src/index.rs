//! Index arithmetic shared by the producer and consumer sides.
//!
//! Both ring indices live in `[0, 2 * N)` and wrap at `2 * N`. A slot index is
//! obtained by folding the ring index back into `[0, N)`. Keeping the extra
//! lap bit lets `read == write` mean *empty* and `write - read == N` mean
//! *full*, so every one of the `N` slots is usable without a shared counter.
//!
//! ```text
//!   N = 4      read = 6            write = 1  (2 * N = 8)
//!   slots:    [ w0 ][    ][ r  ][ x  ]
//!   occupancy = (1 + 8 - 6) = 3
//! ```

/// Wrap arithmetic for a ring of `N` slots.
pub(crate) struct Wrap<const N: usize>;

impl<const N: usize> Wrap<N> {
    /// Compile-time check that `N` is usable: non-zero and `2 * N` fits a `usize`.
    pub(crate) const VALID: () = assert!(
        N > 0 && N <= usize::MAX / 2,
        "queue capacity must be non-zero and at most usize::MAX / 2"
    );

    /// Ring indices wrap back to zero when they reach this bound.
    pub(crate) const LIMIT: usize = N * 2;

    /// Advances a ring index by one.
    ///
    /// Equivalent to `(index + 1) % (2 * N)` without the division.
    #[inline]
    pub(crate) const fn next(index: usize) -> usize {
        let next = index + 1;
        if next == Self::LIMIT {
            0
        } else {
            next
        }
    }

    /// Folds a ring index into the slot range `[0, N)`.
    #[inline]
    pub(crate) const fn slot(index: usize) -> usize {
        if index >= N {
            index - N
        } else {
            index
        }
    }

    /// Number of items between `read` and `write`, in `[0, N]` when both are
    /// consistent; a stale `read` can make the raw distance larger, so callers
    /// that observe the indices from different instants use [`Wrap::occupancy`].
    #[inline]
    pub(crate) const fn distance(write: usize, read: usize) -> usize {
        if write >= read {
            write - read
        } else {
            write + Self::LIMIT - read
        }
    }

    /// Best-effort occupancy snapshot, clamped to the capacity.
    #[inline]
    pub(crate) const fn occupancy(write: usize, read: usize) -> usize {
        let distance = Self::distance(write, read);
        if distance > N {
            N
        } else {
            distance
        }
    }

    #[inline]
    pub(crate) const fn is_full(write: usize, read: usize) -> bool {
        Self::distance(write, read) == N
    }
}
