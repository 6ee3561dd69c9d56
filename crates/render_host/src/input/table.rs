//! Two-way lookup between native and canonical codes

/// Static bidirectional mapping between a backend's native code type `N` and
/// a canonical code type `C`
///
/// Each backend declares one table per code kind as a `static`. Lookups are
/// linear; the tables hold a little over a hundred entries and are consulted
/// a handful of times per frame.
#[derive(Debug)]
pub struct CodeTable<N: 'static, C: 'static> {
    entries: &'static [(N, C)],
}

impl<N, C> CodeTable<N, C>
where
    N: Copy + PartialEq,
    C: Copy + PartialEq,
{
    /// Wrap a list of `(native, canonical)` pairs
    pub const fn new(entries: &'static [(N, C)]) -> Self {
        Self { entries }
    }

    /// Translate a native code; `None` for codes the table does not cover
    pub fn to_canonical(&self, native: N) -> Option<C> {
        self.entries
            .iter()
            .find(|(n, _)| *n == native)
            .map(|&(_, canonical)| canonical)
    }

    /// Translate a canonical code back to the native one
    pub fn to_native(&self, canonical: C) -> Option<N> {
        self.entries
            .iter()
            .find(|(_, c)| *c == canonical)
            .map(|&(native, _)| native)
    }

    /// All pairs in the table
    pub fn entries(&self) -> &'static [(N, C)] {
        self.entries
    }

    /// Whether every native and every canonical code appears exactly once
    pub fn is_bijective(&self) -> bool {
        self.entries.iter().enumerate().all(|(i, (n, c))| {
            self.entries[i + 1..]
                .iter()
                .all(|(other_n, other_c)| other_n != n && other_c != c)
        })
    }
}
