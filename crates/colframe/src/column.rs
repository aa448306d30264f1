use std::sync::Arc;

/// Missing-value marker for integer columns.
pub const MISSING_INT: i64 = -1;

/// Physical type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnKind {
    Float,
    Int,
    Bool,
    /// Generic values, including string columns.
    Object,
}

/// How a newly created object column should be marked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ObjectType {
    #[default]
    Any,
    String,
}

/// A value stored in an object column. Missing entries are `None` at the
/// column level.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Object {
    String(Arc<str>),
    Float(f64),
    Int(i64),
    Bool(bool),
    Bytes(Arc<[u8]>),
}

impl Object {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Object::String(_))
    }
}

impl From<&str> for Object {
    fn from(value: &str) -> Self {
        Object::String(Arc::from(value))
    }
}

impl From<String> for Object {
    fn from(value: String) -> Self {
        Object::String(Arc::from(value))
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Object::Float(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Int(value)
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Bool(value)
    }
}

impl From<Vec<u8>> for Object {
    fn from(value: Vec<u8>) -> Self {
        Object::Bytes(Arc::from(value))
    }
}

/// Column storage. The backing array sits behind an `Arc` so that views can
/// alias it; writers go through [`Column::make_unique`], which clones the
/// array only while another table still holds it.
#[derive(Clone, Debug)]
pub(crate) enum Column {
    Float(Arc<Vec<f64>>),
    Int(Arc<Vec<i64>>),
    Bool(Arc<Vec<bool>>),
    Object(Arc<Vec<Option<Object>>>),
}

impl Column {
    pub(crate) fn zeroed(kind: ColumnKind, rows: usize) -> Self {
        match kind {
            ColumnKind::Float => Column::Float(Arc::new(vec![0.0; rows])),
            ColumnKind::Int => Column::Int(Arc::new(vec![0; rows])),
            ColumnKind::Bool => Column::Bool(Arc::new(vec![false; rows])),
            ColumnKind::Object => Column::Object(Arc::new(vec![None; rows])),
        }
    }

    pub(crate) fn empty(kind: ColumnKind) -> Self {
        Self::zeroed(kind, 0)
    }

    pub(crate) fn kind(&self) -> ColumnKind {
        match self {
            Column::Float(_) => ColumnKind::Float,
            Column::Int(_) => ColumnKind::Int,
            Column::Bool(_) => ColumnKind::Bool,
            Column::Object(_) => ColumnKind::Object,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Object(v) => v.len(),
        }
    }

    /// Whether another handle to the backing array is alive.
    pub(crate) fn is_aliased(&self) -> bool {
        match self {
            Column::Float(v) => Arc::strong_count(v) > 1,
            Column::Int(v) => Arc::strong_count(v) > 1,
            Column::Bool(v) => Arc::strong_count(v) > 1,
            Column::Object(v) => Arc::strong_count(v) > 1,
        }
    }

    /// Makes this handle the sole owner of its array, cloning it if needed.
    /// Returns whether a copy was made.
    pub(crate) fn make_unique(&mut self) -> bool {
        let aliased = self.is_aliased();
        match self {
            Column::Float(v) => {
                Arc::make_mut(v);
            }
            Column::Int(v) => {
                Arc::make_mut(v);
            }
            Column::Bool(v) => {
                Arc::make_mut(v);
            }
            Column::Object(v) => {
                Arc::make_mut(v);
            }
        }
        aliased
    }

    /// Copies the whole physical array.
    pub(crate) fn deep_copy(&self) -> Self {
        match self {
            Column::Float(v) => Column::Float(Arc::new(v.to_vec())),
            Column::Int(v) => Column::Int(Arc::new(v.to_vec())),
            Column::Bool(v) => Column::Bool(Arc::new(v.to_vec())),
            Column::Object(v) => Column::Object(Arc::new(v.to_vec())),
        }
    }

    /// Copies the entries at `positions`, in order.
    pub(crate) fn gather(&self, positions: &[usize]) -> Self {
        fn pick<T: Clone>(values: &[T], positions: &[usize]) -> Arc<Vec<T>> {
            Arc::new(positions.iter().map(|&p| values[p].clone()).collect())
        }
        match self {
            Column::Float(v) => Column::Float(pick(v.as_slice(), positions)),
            Column::Int(v) => Column::Int(pick(v.as_slice(), positions)),
            Column::Bool(v) => Column::Bool(pick(v.as_slice(), positions)),
            Column::Object(v) => Column::Object(pick(v.as_slice(), positions)),
        }
    }

    /// Appends the entries of `other` at `positions`. Both columns must have
    /// the same kind; callers check this beforehand.
    pub(crate) fn extend_gathered(&mut self, other: &Column, positions: &[usize]) {
        fn push<T: Clone>(dst: &mut Arc<Vec<T>>, src: &[T], positions: &[usize]) {
            let dst = Arc::make_mut(dst);
            dst.reserve(positions.len());
            dst.extend(positions.iter().map(|&p| src[p].clone()));
        }
        match (self, other) {
            (Column::Float(dst), Column::Float(src)) => push(dst, src.as_slice(), positions),
            (Column::Int(dst), Column::Int(src)) => push(dst, src.as_slice(), positions),
            (Column::Bool(dst), Column::Bool(src)) => push(dst, src.as_slice(), positions),
            (Column::Object(dst), Column::Object(src)) => push(dst, src.as_slice(), positions),
            (dst, src) => unreachable!(
                "cannot append a {:?} column to a {:?} column",
                src.kind(),
                dst.kind()
            ),
        }
    }

    /// Appends every entry of `other`. Same kind required, as above.
    pub(crate) fn append(&mut self, other: &Column) {
        fn push<T: Clone>(dst: &mut Arc<Vec<T>>, src: &[T]) {
            Arc::make_mut(dst).extend_from_slice(src);
        }
        match (self, other) {
            (Column::Float(dst), Column::Float(src)) => push(dst, src.as_slice()),
            (Column::Int(dst), Column::Int(src)) => push(dst, src.as_slice()),
            (Column::Bool(dst), Column::Bool(src)) => push(dst, src.as_slice()),
            (Column::Object(dst), Column::Object(src)) => push(dst, src.as_slice()),
            (dst, src) => unreachable!(
                "cannot append a {:?} column to a {:?} column",
                src.kind(),
                dst.kind()
            ),
        }
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        match self {
            Column::Float(v) => Arc::make_mut(v).reserve(additional),
            Column::Int(v) => Arc::make_mut(v).reserve(additional),
            Column::Bool(v) => Arc::make_mut(v).reserve(additional),
            Column::Object(v) => Arc::make_mut(v).reserve(additional),
        }
    }

    pub(crate) fn as_object(&self) -> Option<&[Option<Object>]> {
        match self {
            Column::Object(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}
