//! Utilities for defining a subset of ASCII characters

use std::mem;

type Block = usize;

const ASCII_MAX: u8 = 0x80;
const BITS_PER_BLOCK: usize = mem::size_of::<usize>() * 8;
const NUM_BLOCKS: usize = ASCII_MAX as usize / BITS_PER_BLOCK;

/// A set of ASCII characters, typically used to describe which characters
/// may appear unescaped in some URL component.
#[derive(Clone, Copy, Default)]
pub struct AsciiSet {
    // Relies on the fact that ASCII_MAX is a multiple of the pointer width
    bits: [Block; NUM_BLOCKS],
}

impl AsciiSet {
    pub const EMPTY: Self = Self {
        bits: [0; NUM_BLOCKS],
    };

    /// Build a set containing every character in `start..=end`
    #[must_use]
    pub const fn from_range(start: u8, end: u8) -> Self {
        let mut set = Self::EMPTY;

        let mut i = start;
        while i <= end {
            set = set.add(i);
            i += 1;
        }

        set
    }

    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let mut result = Self::EMPTY;

        let mut i = 0;
        while i < NUM_BLOCKS {
            result.bits[i] = self.bits[i] | other.bits[i];
            i += 1;
        }

        result
    }

    /// Test whether or not the set contains the given byte
    ///
    /// Non-ASCII bytes are never contained in any set.
    #[inline]
    #[must_use]
    pub const fn contains(&self, c: u8) -> bool {
        if c >= ASCII_MAX {
            return false;
        }

        let index = (c as usize) / BITS_PER_BLOCK;
        let offset = (c as usize) % BITS_PER_BLOCK;
        self.bits[index] & (1 << offset) != 0
    }

    #[must_use]
    pub const fn add(mut self, c: u8) -> Self {
        assert!(c < ASCII_MAX);

        let index = (c as usize) / BITS_PER_BLOCK;
        let offset = (c as usize) % BITS_PER_BLOCK;
        self.bits[index] |= 1 << offset;
        self
    }
}

/// Letters and digits, which are never escaped in any URL component.
pub const URL_ALPHABET: AsciiSet = AsciiSet::from_range(b'a', b'z')
    .merge(AsciiSet::from_range(b'A', b'Z'))
    .merge(AsciiSet::from_range(b'0', b'9'));

/// RFC 3986 `unreserved` characters.
pub const UNRESERVED: AsciiSet = URL_ALPHABET.add(b'-').add(b'.').add(b'_').add(b'~');

/// Characters allowed unescaped inside a single path segment.
///
/// `/` is deliberately absent so that an escaped slash inside a segment
/// stays distinguishable from a segment separator.
pub const PATH_SEGMENT: AsciiSet = UNRESERVED
    .add(b':')
    .add(b'@')
    .add(b'!')
    .add(b'$')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b';')
    .add(b'=');

/// Like [PATH_SEGMENT] but treating `/` as a plain character,
/// for encoding whole pre-segmented paths.
pub const PATH_SEGMENT_WITH_SLASH: AsciiSet = PATH_SEGMENT.add(b'/');

/// Characters allowed unescaped in query keys and values, and in the
/// userinfo subcomponent.
pub const QUERY_COMPONENT: AsciiSet = UNRESERVED;

/// Characters allowed unescaped in the fragment.
pub const FRAGMENT: AsciiSet = PATH_SEGMENT_WITH_SLASH.add(b'?');

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_is_empty() {
        let set = AsciiSet::default();

        for i in 0..ASCII_MAX {
            assert!(!set.contains(i));
        }
    }

    #[test]
    fn add_contains() {
        let mut set = AsciiSet::default();

        const SET_START: u8 = b'a';
        const SET_END: u8 = b'z';

        for i in SET_START..=SET_END {
            set = set.add(i);
        }

        for i in 0..ASCII_MAX {
            if (SET_START..=SET_END).contains(&i) {
                assert!(set.contains(i));
            } else {
                assert!(!set.contains(i));
            }
        }
    }

    #[test]
    fn non_ascii_is_never_contained() {
        assert!(!URL_ALPHABET.contains(0xC3));
        assert!(!PATH_SEGMENT_WITH_SLASH.contains(0xFF));
    }

    #[test]
    fn path_segment_excludes_slash() {
        assert!(!PATH_SEGMENT.contains(b'/'));
        assert!(PATH_SEGMENT_WITH_SLASH.contains(b'/'));
    }
}
