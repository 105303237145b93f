//! RocksDB storage backend for the Bondsman node.

use anyhow::Result;
use bondsman_core::{Bond, BondId};
use bondsman_ledger::LedgerSnapshot;
use bondsman_registry::{BondStore, StoreError};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;

/// Column family names for different data types.
const CF_BONDS: &str = "bonds";
const CF_STATE: &str = "state";

const KEY_NEXT_ID: &[u8] = b"next_id";
const KEY_LEDGER: &[u8] = b"ledger";

/// RocksDB-backed bond store.
///
/// Bonds live in `bonds` keyed by big-endian id and encoded as JSON; the id
/// counter and ledger figures live in `state`.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_BONDS, Options::default()),
            ColumnFamilyDescriptor::new(CF_STATE, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Backend(format!("column family '{}' not found", name)))
    }

    fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let cf = self.cf(cf_name)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::Codec(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))
}

impl BondStore for RocksStore {
    fn put_bond(&self, bond: &Bond) -> Result<(), StoreError> {
        self.put(CF_BONDS, &bond.id.to_key(), &encode(bond)?)
    }

    fn load_bonds(&self) -> Result<Vec<Bond>, StoreError> {
        let cf = self.cf(CF_BONDS)?;
        let mut bonds = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Backend(e.to_string()))?;
            bonds.push(decode(&value)?);
        }
        Ok(bonds)
    }

    fn put_next_id(&self, next: BondId) -> Result<(), StoreError> {
        self.put(CF_STATE, KEY_NEXT_ID, &next.to_key())
    }

    fn next_id(&self) -> Result<Option<BondId>, StoreError> {
        match self.get(CF_STATE, KEY_NEXT_ID)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    StoreError::Codec(format!("next_id has {} bytes, expected 8", bytes.len()))
                })?;
                Ok(Some(BondId(u64::from_be_bytes(raw))))
            }
            None => Ok(None),
        }
    }

    fn put_ledger(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        self.put(CF_STATE, KEY_LEDGER, &encode(snapshot)?)
    }

    fn put_bond_with_ledger(
        &self,
        bond: &Bond,
        snapshot: &LedgerSnapshot,
    ) -> Result<(), StoreError> {
        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_BONDS)?, bond.id.to_key(), encode(bond)?);
        batch.put_cf(self.cf(CF_STATE)?, KEY_LEDGER, encode(snapshot)?);
        self.db
            .write(batch)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn ledger(&self) -> Result<Option<LedgerSnapshot>, StoreError> {
        self.get(CF_STATE, KEY_LEDGER)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }
}
