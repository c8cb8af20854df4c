use time::OffsetDateTime;

use panelx::models::ledger::{Account, Transaction, TransactionKind};
use panelx::models::users::UserProfile;
use panelx::store::{JsonFileStore, LedgerStore, MemoryStore, ProfileStore};

fn account(user_id: &str, balance: i32) -> Account {
    Account::new(user_id, balance, OffsetDateTime::now_utc())
}

fn usage_tx(user_id: &str, amount: i32, balance_after: i32) -> Transaction {
    Transaction::record(
        user_id,
        TransactionKind::Usage,
        -amount,
        balance_after,
        "panel generated",
        None,
        OffsetDateTime::now_utc(),
    )
}

fn profile(uid: &str, username: &str) -> UserProfile {
    let now = OffsetDateTime::now_utc();
    UserProfile {
        uid: uid.to_string(),
        email: format!("{}@example.com", uid),
        username: username.to_string(),
        role: "creator".to_string(),
        avatar_url: None,
        bio: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_memory_store_round_trip() {
    let store = MemoryStore::new();

    assert!(store.get_account("u1").await.unwrap().is_none());

    let acct = account("u1", 1000);
    store.put_account(&acct).await.unwrap();
    assert_eq!(store.get_account("u1").await.unwrap().unwrap(), acct);

    let tx = usage_tx("u1", 100, 900);
    store.append_transaction(&tx).await.unwrap();
    assert_eq!(store.list_transactions("u1").await.unwrap(), vec![tx]);
    assert!(store.list_transactions("u2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_memory_store_commit_writes_both() {
    let store = MemoryStore::new();

    let mut acct = account("u1", 1000);
    acct.balance = 900;
    acct.total_used = 100;
    let tx = usage_tx("u1", 100, 900);

    store.commit(&acct, &tx).await.unwrap();

    assert_eq!(store.get_account("u1").await.unwrap().unwrap().balance, 900);
    assert_eq!(store.list_transactions("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_json_store_seeds_empty_files() {
    let dir = tempfile::tempdir().unwrap();
    let _store = JsonFileStore::open(dir.path()).await.unwrap();

    for file in ["credits.json", "transactions.json", "users.json"] {
        let contents = std::fs::read_to_string(dir.path().join(file)).unwrap();
        assert_eq!(contents.trim(), "{}");
    }
}

#[tokio::test]
async fn test_json_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).await.unwrap();

    let acct = account("u1", 1000);
    store.put_account(&acct).await.unwrap();
    assert_eq!(store.get_account("u1").await.unwrap().unwrap(), acct);

    let first = usage_tx("u1", 100, 900);
    let second = usage_tx("u1", 50, 850);
    store.append_transaction(&first).await.unwrap();
    store.append_transaction(&second).await.unwrap();

    // Insertion order is preserved
    let listed = store.list_transactions("u1").await.unwrap();
    assert_eq!(listed, vec![first, second]);
}

#[tokio::test]
async fn test_json_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        let mut acct = account("u1", 1000);
        acct.balance = 800;
        acct.total_used = 200;
        store.commit(&acct, &usage_tx("u1", 200, 800)).await.unwrap();
        store.put_user(&profile("u1", "alice")).await.unwrap();
    }

    // A fresh handle over the same directory sees everything
    let store = JsonFileStore::open(dir.path()).await.unwrap();
    let acct = store.get_account("u1").await.unwrap().unwrap();
    assert_eq!(acct.balance, 800);
    assert_eq!(acct.total_used, 200);
    assert_eq!(store.list_transactions("u1").await.unwrap().len(), 1);
    assert_eq!(
        store.get_user("u1").await.unwrap().unwrap().username,
        "alice"
    );
}

#[tokio::test]
async fn test_json_store_keeps_users_separate() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).await.unwrap();

    store.put_account(&account("u1", 1000)).await.unwrap();
    store.put_account(&account("u2", 500)).await.unwrap();
    store.append_transaction(&usage_tx("u1", 1, 999)).await.unwrap();

    assert_eq!(store.get_account("u2").await.unwrap().unwrap().balance, 500);
    assert!(store.list_transactions("u2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_store_memory_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let json = JsonFileStore::open(dir.path()).await.unwrap();
    let memory = MemoryStore::new();

    let stores: [&dyn ProfileStore; 2] = [&json, &memory];
    for store in stores {
        let alice = profile("u1", "alice");
        store.put_user(&alice).await.unwrap();

        assert_eq!(store.get_user("u1").await.unwrap().unwrap(), alice);
        assert_eq!(
            store.find_by_username("alice").await.unwrap().unwrap().uid,
            "u1"
        );
        assert!(store.find_by_username("bob").await.unwrap().is_none());

        store.delete_user("u1").await.unwrap();
        assert!(store.get_user("u1").await.unwrap().is_none());
    }
}
