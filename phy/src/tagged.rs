//! Tagged Stream Items
//!
//! The receive chain communicates structural events positionally: a
//! tag attached to a stream item asserts that a preamble landmark
//! begins at that item's offset. Tags flow with the data through the
//! pipeline and trigger per-frame state resets in downstream blocks.

use common::types::Sample;

/// Marker attached to stream items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorTag {
    /// No tag
    #[default]
    None,
    /// Approximate start of the short training sequence
    StsStart,
    /// Approximate end of the short training sequence
    StsEnd,
    /// Estimated first sample of the LTS cyclic prefix
    LtsStart,
    /// Estimated first sample of the first LTS symbol
    Lts1,
    /// Estimated first sample of the second LTS symbol
    Lts2,
    /// Estimated first symbol of the frame, i.e. the SIGNAL symbol
    StartOfFrame,
}

/// A single complex sample with a tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedSample {
    pub sample: Sample,
    pub tag: VectorTag,
}

impl TaggedSample {
    pub fn new(sample: Sample) -> Self {
        Self {
            sample,
            tag: VectorTag::None,
        }
    }
}

impl Default for TaggedSample {
    fn default() -> Self {
        Self::new(Sample::new(0.0, 0.0))
    }
}

/// A fixed-length array of complex samples with a tag. `N` is 64 for
/// frequency-domain symbols and 48 once the pilot and null subcarriers
/// have been stripped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedVector<const N: usize> {
    pub samples: [Sample; N],
    pub tag: VectorTag,
}

impl<const N: usize> TaggedVector<N> {
    pub fn new(tag: VectorTag) -> Self {
        Self {
            samples: [Sample::new(0.0, 0.0); N],
            tag,
        }
    }
}

impl<const N: usize> Default for TaggedVector<N> {
    fn default() -> Self {
        Self::new(VectorTag::None)
    }
}
