//! bakery-storage-json
//!
//! File-backed [`RecordStore`]: one JSON document per collection inside a data
//! directory. Records are kept as raw JSON so fields this crate does not model
//! survive updates, and a malformed record is skipped on read instead of
//! failing the whole collection.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use bakery_core::{CoreError, CoreResult, ExpenseFilter, OrderFilter, OrderPatch, RecordStore};
use bakery_domain::{Budget, Expense, Order};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

pub const ORDERS_FILE: &str = "orders.json";
pub const EXPENSES_FILE: &str = "expenses.json";
pub const BUDGET_FILE: &str = "budget.json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed JSON persistence for orders, expenses and the budget.
#[derive(Debug)]
pub struct JsonRecordStore {
    data_dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonRecordStore {
    pub fn new(data_dir: PathBuf) -> CoreResult<Self> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            lock: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn collection_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    fn guard(&self) -> CoreResult<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| CoreError::StoreUnavailable("record store lock poisoned".into()))
    }

    fn read_collection(&self, file: &str) -> CoreResult<Vec<Value>> {
        let path = self.collection_path(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&data).map_err(serde_err)? {
            Value::Array(records) => Ok(records),
            _ => Err(CoreError::StoreUnavailable(format!(
                "{} does not contain a JSON array",
                path.display()
            ))),
        }
    }

    fn write_collection(&self, file: &str, records: &[Value]) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(records).map_err(serde_err)?;
        save_atomic(&self.collection_path(file), &json)
    }

    fn decoded<T>(&self, file: &str) -> CoreResult<Vec<(usize, T)>>
    where
        T: DeserializeOwned,
    {
        let records = self.read_collection(file)?;
        Ok(decode_records(file, &records))
    }
}

impl RecordStore for JsonRecordStore {
    fn find_orders(&self, filter: &OrderFilter) -> CoreResult<Vec<Order>> {
        let _guard = self.guard()?;
        Ok(self
            .decoded::<Order>(ORDERS_FILE)?
            .into_iter()
            .map(|(_, order)| order)
            .filter(|order| filter.matches(order))
            .collect())
    }

    fn insert_order(&self, order: &Order) -> CoreResult<()> {
        let _guard = self.guard()?;
        let mut records = self.read_collection(ORDERS_FILE)?;
        records.push(serde_json::to_value(order).map_err(serde_err)?);
        self.write_collection(ORDERS_FILE, &records)?;
        debug!("inserted order {} into {}", order.order_number, ORDERS_FILE);
        Ok(())
    }

    fn update_order(&self, filter: &OrderFilter, patch: &OrderPatch) -> CoreResult<Option<Order>> {
        let _guard = self.guard()?;
        let mut records = self.read_collection(ORDERS_FILE)?;
        let Some((index, mut order)) = decode_records::<Order>(ORDERS_FILE, &records)
            .into_iter()
            .find(|(_, order)| filter.matches(order))
        else {
            return Ok(None);
        };
        patch.apply(&mut order);
        merge_patch(&mut records[index], &order, patch)?;
        self.write_collection(ORDERS_FILE, &records)?;
        Ok(Some(order))
    }

    fn delete_order(&self, filter: &OrderFilter) -> CoreResult<usize> {
        let _guard = self.guard()?;
        let mut records = self.read_collection(ORDERS_FILE)?;
        let position = decode_records::<Order>(ORDERS_FILE, &records)
            .into_iter()
            .find(|(_, order)| filter.matches(order))
            .map(|(index, _)| index);
        match position {
            Some(index) => {
                records.remove(index);
                self.write_collection(ORDERS_FILE, &records)?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn find_expenses(&self, filter: &ExpenseFilter) -> CoreResult<Vec<Expense>> {
        let _guard = self.guard()?;
        Ok(self
            .decoded::<Expense>(EXPENSES_FILE)?
            .into_iter()
            .map(|(_, expense)| expense)
            .filter(|expense| filter.matches(expense))
            .collect())
    }

    fn insert_expense(&self, expense: &Expense) -> CoreResult<()> {
        let _guard = self.guard()?;
        let mut records = self.read_collection(EXPENSES_FILE)?;
        records.push(serde_json::to_value(expense).map_err(serde_err)?);
        self.write_collection(EXPENSES_FILE, &records)
    }

    fn delete_expense(&self, filter: &ExpenseFilter) -> CoreResult<usize> {
        let _guard = self.guard()?;
        let mut records = self.read_collection(EXPENSES_FILE)?;
        let position = decode_records::<Expense>(EXPENSES_FILE, &records)
            .into_iter()
            .find(|(_, expense)| filter.matches(expense))
            .map(|(index, _)| index);
        match position {
            Some(index) => {
                records.remove(index);
                self.write_collection(EXPENSES_FILE, &records)?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn find_budget(&self) -> CoreResult<Option<Budget>> {
        let _guard = self.guard()?;
        let path = self.collection_path(BUDGET_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        match serde_json::from_str::<Option<Budget>>(&data) {
            Ok(budget) => Ok(budget),
            Err(err) => {
                warn!("ignoring malformed budget document: {}", err);
                Ok(None)
            }
        }
    }

    fn upsert_budget(&self, budget: &Budget) -> CoreResult<()> {
        let _guard = self.guard()?;
        let json = serde_json::to_string_pretty(budget).map_err(serde_err)?;
        save_atomic(&self.collection_path(BUDGET_FILE), &json)
    }
}

fn decode_records<T>(file: &str, records: &[Value]) -> Vec<(usize, T)>
where
    T: DeserializeOwned,
{
    records
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match serde_json::from_value::<T>(raw.clone()) {
            Ok(record) => Some((index, record)),
            Err(err) => {
                warn!("skipping malformed record {} in {}: {}", index, file, err);
                None
            }
        })
        .collect()
}

/// Writes only the fields a patch touched back into the raw document.
fn merge_patch(raw: &mut Value, order: &Order, patch: &OrderPatch) -> CoreResult<()> {
    let Value::Object(fields) = raw else {
        return Err(CoreError::StoreUnavailable(
            "order record is not a JSON object".into(),
        ));
    };
    if patch.status.is_some() {
        fields.insert(
            "status".into(),
            serde_json::to_value(order.status).map_err(serde_err)?,
        );
    }
    if patch.push_note.is_some() {
        fields.insert(
            "notes".into(),
            serde_json::to_value(&order.notes).map_err(serde_err)?,
        );
    }
    if let Some(updated_at) = order.updated_at.filter(|_| patch.updated_at.is_some()) {
        fields.insert(
            "updatedAt".into(),
            serde_json::to_value(updated_at).map_err(serde_err)?,
        );
    }
    Ok(())
}

fn serde_err(err: serde_json::Error) -> CoreError {
    CoreError::StoreUnavailable(err.to_string())
}

fn save_atomic(path: &Path, data: &str) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> CoreResult<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
