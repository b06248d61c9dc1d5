use bson::Document;

use basalt_store::Cursor;

use crate::codec;
use crate::error::IndexError;

/// Resolves encoded primary keys to live documents.
///
/// Index entries store primary keys, not documents; going through this
/// indirection on every hit tolerates document relocation.
pub trait PrimaryIndex {
    fn lookup(&self, primary_key: &[u8]) -> Result<Option<Document>, IndexError>;
}

/// Iterator over the documents matched by an index scan.
pub trait DocumentIterator {
    /// The next matching document, or `None` once the scan is exhausted.
    fn next(&mut self) -> Result<Option<Document>, IndexError>;

    /// Rewind to the first position of the scan.
    fn reset(&mut self);
}

impl std::fmt::Debug for dyn DocumentIterator + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<document iterator>")
    }
}

enum Position {
    Take,
    Skip,
    End,
}

/// Bounded scan between two encoded endpoints.
///
/// Endpoints are tuple prefixes with an inclusive flag each; an
/// exclusive endpoint excludes the entire prefix closure of its tuple
/// (every key extending it), which is how strict bounds on the final
/// range field are realized. Internally the window is kept as
/// `[low, high)` on raw bytes.
pub struct IndexIterator<'a, C, P: ?Sized> {
    cursor: C,
    primary: &'a P,
    low: Vec<u8>,
    high: Option<Vec<u8>>,
    reverse: bool,
}

impl<'a, C: Cursor, P: PrimaryIndex + ?Sized> IndexIterator<'a, C, P> {
    pub(crate) fn new(
        cursor: C,
        primary: &'a P,
        left: Vec<u8>,
        left_inclusive: bool,
        right: Vec<u8>,
        right_inclusive: bool,
        reverse: bool,
    ) -> Self {
        let mut high = if right_inclusive {
            codec::prefix_successor(&right)
        } else {
            Some(right)
        };

        let low = if left_inclusive {
            left
        } else {
            match codec::prefix_successor(&left) {
                Some(successor) => successor,
                None => {
                    // nothing sorts above the excluded closure
                    high = Some(left.clone());
                    left
                }
            }
        };

        let mut iterator = Self {
            cursor,
            primary,
            low,
            high,
            reverse,
        };
        iterator.reset();
        iterator
    }

    fn advance(&mut self) {
        if self.reverse {
            self.cursor.prev();
        } else {
            self.cursor.next();
        }
    }

    fn position(&self) -> Position {
        let Some(key) = self.cursor.key() else {
            return Position::End;
        };
        if key < self.low.as_slice() {
            return if self.reverse {
                Position::End
            } else {
                Position::Skip
            };
        }
        if self.high.as_deref().is_some_and(|high| key >= high) {
            return if self.reverse {
                Position::Skip
            } else {
                Position::End
            };
        }
        Position::Take
    }
}

impl<C: Cursor, P: PrimaryIndex + ?Sized> DocumentIterator for IndexIterator<'_, C, P> {
    fn next(&mut self) -> Result<Option<Document>, IndexError> {
        loop {
            if !self.cursor.valid() {
                return Ok(None);
            }
            match self.position() {
                Position::End => return Ok(None),
                Position::Skip => self.advance(),
                Position::Take => break,
            }
        }

        let Some(value) = self.cursor.value() else {
            return Ok(None);
        };
        let primary_key = value.to_vec();
        self.advance();

        match self.primary.lookup(&primary_key)? {
            Some(doc) => Ok(Some(doc)),
            None => Err(IndexError::Internal(
                "index entry resolves to no document".into(),
            )),
        }
    }

    fn reset(&mut self) {
        if self.reverse {
            match &self.high {
                // may land exactly on the exclusive bound; the scan loop
                // steps past it
                Some(high) => self.cursor.seek_for_prev(high),
                None => self.cursor.seek_last(),
            }
        } else {
            self.cursor.seek(&self.low);
        }
    }
}

/// Concatenation of several index scans, yielded end to end.
///
/// Owns its children; the factory orders them so the concatenation
/// preserves the requested scan direction.
pub struct MultiIndexIterator<'a> {
    children: Vec<Box<dyn DocumentIterator + 'a>>,
    current: usize,
}

impl<'a> MultiIndexIterator<'a> {
    pub fn new(children: Vec<Box<dyn DocumentIterator + 'a>>) -> Self {
        Self {
            children,
            current: 0,
        }
    }
}

impl DocumentIterator for MultiIndexIterator<'_> {
    fn next(&mut self) -> Result<Option<Document>, IndexError> {
        while self.current < self.children.len() {
            match self.children[self.current].next()? {
                Some(doc) => return Ok(Some(doc)),
                None => self.current += 1,
            }
        }
        Ok(None)
    }

    fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
        self.current = 0;
    }
}
