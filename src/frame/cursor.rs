//! Cyclic cursor over an ordered list (cross references, tags).

/// Ordered list plus an optional current position. A fresh cursor has no
/// position: the first `next` lands on the first item, the first `prev` on
/// the last one.
#[derive(Debug, Clone)]
pub struct Cursor<T> {
    items: Vec<T>,
    index: Option<usize>,
}

impl<T> Default for Cursor<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: None,
        }
    }
}

impl<T> Cursor<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, index: None }
    }

    /// Replace the list and forget the position.
    pub fn reset(&mut self, items: Vec<T>) {
        self.items = items;
        self.index = None;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Restore a position saved from `index()`. Out-of-range positions are
    /// ignored.
    pub fn set_index(&mut self, index: Option<usize>) {
        match index {
            Some(i) if i >= self.items.len() => {}
            other => self.index = other,
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.items.get(self.index?)
    }

    /// Advance with wraparound. No-op on an empty list.
    pub fn next(&mut self) -> Option<&T> {
        let n = self.items.len();
        if n == 0 {
            return None;
        }
        let i = match self.index {
            Some(i) => (i + 1) % n,
            None => 0,
        };
        self.index = Some(i);
        self.items.get(i)
    }

    /// Step back with wraparound. No-op on an empty list.
    pub fn prev(&mut self) -> Option<&T> {
        let n = self.items.len();
        if n == 0 {
            return None;
        }
        let i = match self.index {
            Some(i) => (i + n - 1) % n,
            None => n - 1,
        };
        self.index = Some(i);
        self.items.get(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraparound() {
        let mut c = Cursor::new(vec![10, 20, 30]);
        assert_eq!(c.current(), None);
        assert_eq!(c.next(), Some(&10));
        assert_eq!(c.next(), Some(&20));
        assert_eq!(c.next(), Some(&30));
        assert_eq!(c.next(), Some(&10));
        assert_eq!(c.prev(), Some(&30));
    }

    #[test]
    fn test_prev_from_fresh_cursor() {
        let mut c = Cursor::new(vec!['a', 'b']);
        assert_eq!(c.prev(), Some(&'b'));
        assert_eq!(c.index(), Some(1));
    }

    #[test]
    fn test_next_then_prev_returns_to_position() {
        for n in 2..6 {
            let mut c = Cursor::new((0..n).collect::<Vec<_>>());
            for start in 0..n {
                c.set_index(Some(start));
                c.next();
                c.prev();
                assert_eq!(c.index(), Some(start));
            }
        }
    }

    #[test]
    fn test_empty_is_no_op() {
        let mut c: Cursor<u64> = Cursor::default();
        assert_eq!(c.next(), None);
        assert_eq!(c.prev(), None);
        assert_eq!(c.index(), None);
    }

    #[test]
    fn test_reset_and_set_index() {
        let mut c = Cursor::new(vec![1, 2, 3]);
        c.next();
        c.reset(vec![7]);
        assert_eq!(c.index(), None);
        c.set_index(Some(5));
        assert_eq!(c.index(), None);
        c.set_index(Some(0));
        assert_eq!(c.current(), Some(&7));
    }
}
