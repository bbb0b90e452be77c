//! Pull-based row source for hosts that consume results in fixed-size batches

use crate::enumerate::SheetEntry;

/// Column names of the sheet listing, in row order
pub const COLUMNS: [&str; 2] = ["sheet_name", "sheet_index"];

/// Hands out an enumerated sheet list in batches of at most `batch_size` rows
#[derive(Debug, Clone)]
pub struct SheetTable {
    rows: Vec<SheetEntry>,
    offset: usize,
    batch_size: usize,
}

impl SheetTable {
    /// A `batch_size` of zero is treated as one row per batch.
    pub fn new(rows: Vec<SheetEntry>, batch_size: usize) -> Self {
        Self {
            rows,
            offset: 0,
            batch_size: batch_size.max(1),
        }
    }

    /// Next batch of rows, or `None` once every row has been emitted
    pub fn next_batch(&mut self) -> Option<&[SheetEntry]> {
        if self.offset >= self.rows.len() {
            return None;
        }
        let start = self.offset;
        let end = (start + self.batch_size).min(self.rows.len());
        self.offset = end;
        Some(&self.rows[start..end])
    }

    pub fn remaining(&self) -> usize {
        self.rows.len() - self.offset
    }

    pub fn rows(&self) -> &[SheetEntry] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(count: usize) -> Vec<SheetEntry> {
        (0..count)
            .map(|i| SheetEntry {
                name: format!("Sheet{}", i + 1),
                index: i as i64,
            })
            .collect()
    }

    #[test]
    fn test_batches_cover_all_rows_in_order() {
        let mut table = SheetTable::new(rows(5), 2);
        let mut sizes = Vec::new();
        let mut indices = Vec::new();
        while let Some(batch) = table.next_batch() {
            sizes.push(batch.len());
            indices.extend(batch.iter().map(|row| row.index));
        }
        assert_eq!(sizes, [2, 2, 1]);
        assert_eq!(indices, [0, 1, 2, 3, 4]);
        assert_eq!(table.remaining(), 0);
        assert!(table.next_batch().is_none());
    }

    #[test]
    fn test_single_batch_when_rows_fit() {
        let mut table = SheetTable::new(rows(3), 2048);
        assert_eq!(table.next_batch().map(<[SheetEntry]>::len), Some(3));
        assert!(table.next_batch().is_none());
    }

    #[test]
    fn test_zero_batch_size() {
        let mut table = SheetTable::new(rows(2), 0);
        assert_eq!(table.next_batch().map(<[SheetEntry]>::len), Some(1));
        assert_eq!(table.remaining(), 1);
    }
}
