use std::fmt;

/// String stored inline in a fixed block of `N` character slots.
///
/// One slot is always kept for the terminator of the host layout, so at most
/// `N - 1` characters are retained. Longer input is truncated on write.
#[derive(Clone)]
pub struct FixedString<const N: usize> {
    len: usize,
    chars: [char; N],
}

impl<const N: usize> FixedString<N> {
    pub const CAPACITY: usize = N.saturating_sub(1);

    pub fn new() -> Self {
        Self {
            len: 0,
            chars: ['\0'; N],
        }
    }

    pub fn from_str_truncated(value: &str) -> Self {
        let mut out = Self::new();
        out.set(value);
        out
    }

    /// Replaces the contents, returning `true` when `value` had to be cut.
    pub fn set(&mut self, value: &str) -> bool {
        self.clear();
        let mut truncated = false;
        for ch in value.chars() {
            if self.len == Self::CAPACITY {
                truncated = true;
                break;
            }
            self.chars[self.len] = ch;
            self.len += 1;
        }
        truncated
    }

    pub fn clear(&mut self) {
        self.chars[..self.len].fill('\0');
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_chars(&self) -> &[char] {
        &self.chars[..self.len]
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PartialEq for FixedString<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_chars() == other.as_chars()
    }
}

impl<const N: usize> Eq for FixedString<N> {}

impl<const N: usize> fmt::Display for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.as_chars() {
            fmt::Write::write_char(f, *ch)?;
        }
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_short_strings() {
        let value = FixedString::<8>::from_str_truncated("brick");
        assert_eq!(value.to_string(), "brick");
        assert_eq!(value.len(), 5);
    }

    #[test]
    fn truncates_to_capacity() {
        let mut value = FixedString::<4>::new();
        assert!(value.set("abcdef"));
        assert_eq!(value.to_string(), "abc");
        assert!(!value.set("xy"));
        assert_eq!(value.to_string(), "xy");
        assert_eq!(value.as_chars(), &['x', 'y']);
    }

    #[test]
    fn empty_input_is_empty() {
        let value = FixedString::<4>::from_str_truncated("");
        assert!(value.is_empty());
        assert_eq!(value, FixedString::<4>::default());
    }

    #[test]
    fn counts_characters_not_bytes() {
        let value = FixedString::<3>::from_str_truncated("äöü");
        assert_eq!(value.to_string(), "äö");
    }
}
