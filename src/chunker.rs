//! Root-shape-dependent JSON chunker.
//!
//! Splits a parsed document into bounded-size chunks as a lazy, finite,
//! single-pass iterator of `(chunk_type, data)` pairs:
//!
//! - object root: each top-level key is emitted as one `(key, value)`
//!   pair, unless its value is an array longer than `max_items`, in which
//!   case consecutive slices are emitted as `(key_chunk_<i>, slice)`;
//! - array root: consecutive slices emitted as `(root_chunk, slice)`;
//! - scalar root: a single `(single_value, value)` pair.
//!
//! Emission order follows source key/array order, slices are strictly
//! increasing by offset, never overlap, and concatenating the slices of
//! one array in emission order reconstructs that array exactly.

use serde_json::Value;

/// Split `doc` into at most `max_items`-sized chunks.
///
/// `max_items` is clamped to at least 1. The returned iterator borrows
/// the document; re-invoke on the same document to restart.
pub fn chunk_document(doc: &Value, max_items: usize) -> ChunkStream<'_> {
    let max_items = max_items.max(1);
    let state = match doc {
        Value::Object(map) => State::Object {
            entries: map.iter(),
            run: None,
        },
        Value::Array(items) => State::Array(SliceRun::new(None, items)),
        scalar => State::Scalar(Some(scalar)),
    };
    ChunkStream { state, max_items }
}

/// Lazy chunk iterator returned by [`chunk_document`].
pub struct ChunkStream<'a> {
    state: State<'a>,
    max_items: usize,
}

enum State<'a> {
    Object {
        entries: serde_json::map::Iter<'a>,
        run: Option<SliceRun<'a>>,
    },
    Array(SliceRun<'a>),
    Scalar(Option<&'a Value>),
    Done,
}

/// Positional cursor over one array being sliced.
struct SliceRun<'a> {
    /// Source key for object-root arrays; `None` for an array root.
    key: Option<&'a str>,
    items: &'a [Value],
    offset: usize,
    index: usize,
}

impl<'a> SliceRun<'a> {
    fn new(key: Option<&'a str>, items: &'a [Value]) -> Self {
        Self {
            key,
            items,
            offset: 0,
            index: 0,
        }
    }

    fn next_slice(&mut self, max_items: usize) -> Option<(String, Value)> {
        if self.offset >= self.items.len() {
            return None;
        }
        let end = (self.offset + max_items).min(self.items.len());
        let slice = Value::Array(self.items[self.offset..end].to_vec());
        let chunk_type = match self.key {
            Some(key) => format!("{}_chunk_{}", key, self.index),
            None => "root_chunk".to_string(),
        };
        self.offset = end;
        self.index += 1;
        Some((chunk_type, slice))
    }
}

impl Iterator for ChunkStream<'_> {
    type Item = (String, Value);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.state {
                State::Object { entries, run } => {
                    if let Some(active) = run {
                        if let Some(pair) = active.next_slice(self.max_items) {
                            return Some(pair);
                        }
                        *run = None;
                    }
                    match entries.next() {
                        Some((key, Value::Array(items))) if items.len() > self.max_items => {
                            *run = Some(SliceRun::new(Some(key.as_str()), items));
                        }
                        Some((key, value)) => return Some((key.clone(), value.clone())),
                        None => {
                            self.state = State::Done;
                            return None;
                        }
                    }
                }
                State::Array(run) => match run.next_slice(self.max_items) {
                    Some(pair) => return Some(pair),
                    None => {
                        self.state = State::Done;
                        return None;
                    }
                },
                State::Scalar(value) => {
                    let value = value.take()?;
                    self.state = State::Done;
                    return Some(("single_value".to_string(), value.clone()));
                }
                State::Done => return None,
            }
        }
    }
}
