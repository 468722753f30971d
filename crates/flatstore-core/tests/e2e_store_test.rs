//! E2E Test: Record store workflows
//!
//! Drives a store through the same client workflows the store was built for:
//! insert, filtered find, in-place update, delete, and reopening from disk.

use anyhow::Result;
use flatstore_core::{MalformedLinePolicy, Record, RecordStore, StoreConfig};
use tempfile::TempDir;

fn temp_workspace() -> TempDir {
    tempfile::Builder::new()
        .prefix("flatstore-e2e-")
        .tempdir()
        .expect("tempdir should be created")
}

fn seeded_store(dir: &TempDir) -> Result<RecordStore> {
    let mut store = RecordStore::open(dir.path().join("BD_test.txt"))?;
    store.insert(Record::new("Ana", 45, "Madrid", 1500.0))?;
    store.insert(Record::new("Luis", 28, "Valencia", 700.0))?;
    store.insert(Record::new("Marta", 33, "Bilbao", 1100.0))?;
    store.insert(Record::new("Carlos", 39, "Sevilla", 800.0))?;
    Ok(store)
}

/// Two clients: find, update, delete in sequence
#[test]
fn e2e_two_client_scenario() -> Result<()> {
    let dir = temp_workspace();
    let mut store = RecordStore::open(dir.path().join("BD.txt"))?;
    store.insert(Record::new("Ana", 45, "Madrid", 1500.0))?;
    store.insert(Record::new("Luis", 28, "Valencia", 700.0))?;

    let rich = store.find(Some(&|r: &Record| r.balance > 1000.0));
    assert_eq!(rich, vec![Record::new("Ana", 45, "Madrid", 1500.0)]);

    store.update(|r| r.city == "Madrid", |r| r.balance += 200.0)?;
    let madrid = store.find(Some(&|r: &Record| r.city == "Madrid"));
    assert_eq!(madrid.len(), 1);
    assert_eq!(madrid[0].balance, 1700.0);

    store.delete(|r| r.name == "Luis")?;
    assert_eq!(store.find(None).len(), 1);

    // The file reflects every step
    let content = std::fs::read_to_string(store.path())?;
    assert_eq!(content, "Ana,45,Madrid,1700.0\n");
    Ok(())
}

#[test]
fn e2e_insert_count() -> Result<()> {
    let dir = temp_workspace();
    let store = seeded_store(&dir)?;
    assert_eq!(store.find(None).len(), 4);
    Ok(())
}

#[test]
fn e2e_find_by_balance() -> Result<()> {
    let dir = temp_workspace();
    let store = seeded_store(&dir)?;

    let rich = store.find(Some(&|r: &Record| r.balance > 1000.0));
    assert_eq!(rich.len(), 2);
    assert!(rich.iter().all(|r| r.balance > 1000.0));
    Ok(())
}

#[test]
fn e2e_delete_by_name() -> Result<()> {
    let dir = temp_workspace();
    let mut store = seeded_store(&dir)?;

    assert_eq!(store.delete(|r| r.name == "Luis")?, 1);
    let all = store.find(None);
    assert_eq!(all.len(), 3);
    assert!(!all.iter().any(|r| r.name == "Luis"));
    Ok(())
}

#[test]
fn e2e_total_balance_over_thirty() -> Result<()> {
    let dir = temp_workspace();
    let store = seeded_store(&dir)?;

    let total: f64 = store
        .find_map(Some(&|r: &Record| r.age > 30), |r| r.balance)
        .into_iter()
        .sum();
    assert!((total - (1500.0 + 1100.0 + 800.0)).abs() < 0.01);
    Ok(())
}

#[test]
fn e2e_sort_by_city() -> Result<()> {
    let dir = temp_workspace();
    let store = seeded_store(&dir)?;

    let mut cities = store.find_map(None, |r| r.city.clone());
    cities.sort();
    assert_eq!(cities, vec!["Bilbao", "Madrid", "Sevilla", "Valencia"]);

    // The store itself keeps insertion order
    assert_eq!(store.records()[0].city, "Madrid");
    Ok(())
}

#[test]
fn e2e_reopen_after_mutations() -> Result<()> {
    let dir = temp_workspace();
    let mut store = seeded_store(&dir)?;
    store.update(|r| r.age < 35, |r| r.city = "Zaragoza".to_string())?;
    store.delete(|r| r.balance < 750.0)?;

    let reopened = RecordStore::open(store.path())?;
    assert_eq!(reopened.records(), store.records());
    assert_eq!(reopened.stats().records, 3);
    Ok(())
}

#[test]
fn e2e_config_file_drives_store() -> Result<()> {
    let dir = temp_workspace();
    let data = dir.path().join("data").join("clients.txt");
    let config_path = dir.path().join("flatstore.toml");

    StoreConfig::new()
        .with_path(&data)
        .with_malformed_policy(MalformedLinePolicy::Skip)
        .with_create_dirs(true)
        .to_file(&config_path)?;

    let mut store = RecordStore::with_config(StoreConfig::from_file(&config_path)?)?;
    store.insert(Record::new("Ana", 45, "Madrid", 1500.0))?;
    assert!(data.exists());

    // A corrupted line is skipped on reopen under the configured policy
    let mut content = std::fs::read_to_string(&data)?;
    content.push_str("garbage\n");
    std::fs::write(&data, content)?;

    let reopened = RecordStore::with_config(StoreConfig::from_file(&config_path)?)?;
    assert_eq!(reopened.len(), 1);
    Ok(())
}

#[test]
fn e2e_abort_policy_fails_open() {
    let dir = temp_workspace();
    let path = dir.path().join("bad.txt");
    std::fs::write(&path, "Ana,45,Madrid\n").expect("write should succeed");

    let err = RecordStore::open(&path).expect_err("malformed file must not open");
    let parse = err.as_parse_error().expect("error should carry the parse failure");
    assert_eq!(parse.line(), 1);
}
