use crate::errors::{DbError, DbResult};
use parking_lot::RwLock;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const CF_BLOCKS: &str = "blocks";
pub const CF_HEADERS: &str = "headers";
pub const CF_STATUSES: &str = "statuses";
pub const CF_RELATIONS: &str = "relations";
pub const CF_GHOSTDAG: &str = "ghostdag";
pub const CF_ACCEPTANCE_DATA: &str = "acceptance_data";
pub const CF_UTXO_DIFFS: &str = "utxo_diffs";
pub const CF_VIRTUAL_UTXOS: &str = "virtual_utxos";
pub const CF_PRUNING_POINT: &str = "pruning_point";
pub const CF_PRUNING_UTXOS: &str = "pruning_utxos";
pub const CF_HEADER_TIPS: &str = "header_tips";
pub const CF_HEADERS_SELECTED_TIP: &str = "headers_selected_tip";

/// Every column family the engine uses, opened together.
pub const COLUMN_FAMILIES: [&str; 12] = [
    CF_BLOCKS,
    CF_HEADERS,
    CF_STATUSES,
    CF_RELATIONS,
    CF_GHOSTDAG,
    CF_ACCEPTANCE_DATA,
    CF_UTXO_DIFFS,
    CF_VIRTUAL_UTXOS,
    CF_PRUNING_POINT,
    CF_PRUNING_UTXOS,
    CF_HEADER_TIPS,
    CF_HEADERS_SELECTED_TIP,
];

pub struct Database {
    db: Arc<DB>,
    is_closed: Arc<RwLock<bool>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(10000);
        opts.set_keep_log_file_num(10);
        opts.set_max_background_jobs(4);
        opts.set_bytes_per_sync(1048576);
        opts.increase_parallelism(4);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_write_buffer_size(64 * 1024 * 1024);
        opts.set_max_write_buffer_number(3);

        let cf_descriptors: Vec<_> = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&opts, path.as_ref(), cf_descriptors)?;
        debug!(path = %path.as_ref().display(), "opened consensus database");
        Ok(Self { db: Arc::new(db), is_closed: Arc::new(RwLock::new(false)) })
    }

    fn check_closed(&self) -> DbResult<()> {
        if *self.is_closed.read() {
            return Err(DbError::DatabaseClosed);
        }
        Ok(())
    }

    pub(crate) fn get_cf_handle(&self, cf_name: &str) -> DbResult<&rocksdb::ColumnFamily> {
        self.db.cf_handle(cf_name).ok_or_else(|| DbError::ColumnFamilyNotFound(cf_name.to_string()))
    }

    pub fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> DbResult<()> {
        self.check_closed()?;
        let cf = self.get_cf_handle(cf_name)?;
        self.db.put_cf(cf, key, value)?;
        Ok(())
    }

    pub fn get(&self, cf_name: &str, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        self.check_closed()?;
        let cf = self.get_cf_handle(cf_name)?;
        Ok(self.db.get_cf(cf, key)?)
    }

    pub fn delete(&self, cf_name: &str, key: &[u8]) -> DbResult<()> {
        self.check_closed()?;
        let cf = self.get_cf_handle(cf_name)?;
        self.db.delete_cf(cf, key)?;
        Ok(())
    }

    pub fn exists(&self, cf_name: &str, key: &[u8]) -> DbResult<bool> {
        self.check_closed()?;
        let cf = self.get_cf_handle(cf_name)?;
        Ok(self.db.get_pinned_cf(cf, key)?.is_some())
    }

    pub fn batch(&self) -> WriteBatch {
        WriteBatch::default()
    }

    pub fn write_batch(&self, batch: WriteBatch) -> DbResult<()> {
        self.check_closed()?;
        self.db.write(batch)?;
        Ok(())
    }

    pub fn iterator(&self, cf_name: &str, mode: IteratorMode) -> DbResult<rocksdb::DBIteratorWithThreadMode<'_, DB>> {
        self.check_closed()?;
        let cf = self.get_cf_handle(cf_name)?;
        Ok(self.db.iterator_cf(cf, mode))
    }

    /// Marks the handle closed; subsequent calls fail with `DatabaseClosed`.
    pub fn close(&self) {
        *self.is_closed.write() = true;
        debug!("consensus database closed");
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self { db: self.db.clone(), is_closed: self.is_closed.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_database_open_put_get() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path()).unwrap();
        db.put(CF_STATUSES, b"k", b"v").unwrap();
        let v = db.get(CF_STATUSES, b"k").unwrap();
        assert_eq!(v, Some(b"v".to_vec()));
    }

    #[test]
    fn test_closed_database_rejects_access() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path()).unwrap();
        db.close();
        assert!(matches!(db.put(CF_STATUSES, b"k", b"v"), Err(DbError::DatabaseClosed)));
    }

    #[test]
    fn test_batch_spans_column_families() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path()).unwrap();
        let mut batch = db.batch();
        batch.put_cf(db.get_cf_handle(CF_BLOCKS).unwrap(), b"a", b"1");
        batch.put_cf(db.get_cf_handle(CF_HEADERS).unwrap(), b"b", b"2");
        db.write_batch(batch).unwrap();
        assert_eq!(db.get(CF_BLOCKS, b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(db.get(CF_HEADERS, b"b").unwrap(), Some(b"2".to_vec()));
    }
}
