use crate::error::FrameResult;
use crate::iter::resolve_sources;
use crate::table::Table;

/// Copies fixed columns of whole tables into a reused column-major matrix.
#[derive(Clone, Debug)]
pub struct DenseBatcher {
    columns: Vec<String>,
    buffer: Vec<f64>,
}

/// A column-major matrix borrowed from a [`DenseBatcher`]. Entry `(r, c)`
/// is row `r` of column `c`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DenseBatch<'b> {
    data: &'b [f64],
    rows: usize,
    cols: usize,
}

impl DenseBatch<'_> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols);
        self.data[col * self.rows + row]
    }

    pub fn column(&self, col: usize) -> &[f64] {
        &self.data[col * self.rows..(col + 1) * self.rows]
    }

    pub fn as_slice(&self) -> &[f64] {
        self.data
    }
}

impl DenseBatcher {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_owned()).collect(),
            buffer: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Copies the current rows of `table` into the buffer. Ints are widened
    /// and bools become `1.0`/`0.0`. The allocation is kept across calls.
    pub fn dense_matrix(&mut self, table: &Table) -> FrameResult<DenseBatch<'_>> {
        let sources = resolve_sources(table, &self.columns)?;
        let rows = table.num_rows();
        let cols = sources.len();
        let positions = table.row_index().as_slice();

        self.buffer.resize(rows * cols, 0.0);
        for (c, source) in sources.iter().enumerate() {
            let out = &mut self.buffer[c * rows..(c + 1) * rows];
            for (slot, &p) in out.iter_mut().zip(positions) {
                *slot = source.read(p);
            }
        }
        log::trace!("dense batch: {rows} x {cols}");
        Ok(DenseBatch {
            data: &self.buffer[..rows * cols],
            rows,
            cols,
        })
    }
}
