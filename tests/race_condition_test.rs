//! Concurrency contract tests: read-modify-write sequences for the same
//! account must never produce a lost update, while different accounts
//! proceed independently.

use std::sync::Arc;

use panelx::config::CreditsConfig;
use panelx::models::ledger::TransactionKind;
use panelx::services::CreditsService;
use panelx::store::MemoryStore;
use panelx::ApiError;
use tokio::task::JoinSet;

fn service(free_mode: bool, initial_grant: i32) -> Arc<CreditsService> {
    let store = Arc::new(MemoryStore::new());
    let config = CreditsConfig {
        free_mode,
        initial_grant,
    };
    Arc::new(CreditsService::new(store, &config))
}

#[tokio::test]
async fn test_concurrent_debits_exactly_one_wins() {
    // Balance 5, two concurrent debits of 3: one must succeed, one must get
    // InsufficientCredits. Both succeeding would be a lost update.
    let service = service(false, 5);
    service.init_account("u1").await.unwrap();

    let mut tasks = JoinSet::new();
    for i in 0..2 {
        let service = service.clone();
        tasks.spawn(async move { (i, service.debit("u1", 3, "panel generated").await) });
    }

    let mut success_count = 0;
    let mut insufficient_count = 0;

    while let Some(result) = tasks.join_next().await {
        let (task_id, debit_result) = result.expect("task panicked");
        match debit_result {
            Ok(outcome) => {
                assert_eq!(outcome.new_balance, 2);
                success_count += 1;
            }
            Err(ApiError::InsufficientCredits { requested, balance }) => {
                assert_eq!(requested, 3);
                assert_eq!(balance, 2);
                insufficient_count += 1;
            }
            Err(e) => panic!("task {} got unexpected error: {}", task_id, e),
        }
    }

    assert_eq!(success_count, 1, "expected exactly 1 successful debit");
    assert_eq!(insufficient_count, 1, "expected exactly 1 rejection");

    assert_eq!(service.get_balance("u1").await.unwrap(), 2);

    // Grant + the single winning debit; the rejection left nothing behind
    let history = service.get_history("u1").await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_concurrent_inits_create_one_account() {
    let service = service(false, 1000);

    let mut tasks = JoinSet::new();
    for _ in 0..5 {
        let service = service.clone();
        tasks.spawn(async move { service.init_account("u1").await });
    }

    let mut created = 0;
    while let Some(result) = tasks.join_next().await {
        let (account, already_existed) = result.expect("task panicked").unwrap();
        assert_eq!(account.balance, 1000);
        if !already_existed {
            created += 1;
        }
    }

    assert_eq!(created, 1, "exactly one call should create the account");
    assert_eq!(service.get_history("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_accounts_do_not_contend_with_each_other() {
    let service = service(false, 1000);

    let tasks = ["u1", "u2", "u3", "u4"].map(|user| {
        let service = service.clone();
        tokio::spawn(async move {
            for _ in 0..10 {
                service.debit(user, 10, "panel generated").await.unwrap();
            }
        })
    });

    for result in futures::future::join_all(tasks).await {
        result.expect("task panicked");
    }

    for user in ["u1", "u2", "u3", "u4"] {
        assert_eq!(service.get_balance(user).await.unwrap(), 900);
        // Grant plus ten debits each
        assert_eq!(service.get_history(user).await.unwrap().len(), 11);
    }
}

#[tokio::test]
async fn test_interleaved_debits_and_credits_never_go_negative() {
    let service = service(false, 200);
    service.init_account("u1").await.unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..4 {
        let service = service.clone();
        tasks.spawn(async move { service.debit("u1", 100, "panel generated").await.map(|_| ()) });
    }
    for _ in 0..2 {
        let service = service.clone();
        tasks.spawn(async move {
            service
                .credit("u1", 50, TransactionKind::Purchase, "Credit pack", None)
                .await
                .map(|_| ())
        });
    }

    let mut rejected = 0;
    while let Some(result) = tasks.join_next().await {
        match result.expect("task panicked") {
            Ok(()) => {}
            Err(ApiError::InsufficientCredits { .. }) => rejected += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    // Whatever the interleaving, the trail is consistent: every snapshot is
    // non-negative and the final snapshot matches the stored balance.
    let history = service.get_history("u1").await.unwrap();
    for tx in &history {
        assert!(tx.balance_after >= 0);
    }

    let balance = service.get_balance("u1").await.unwrap();
    assert_eq!(history[0].balance_after, balance);

    // 200 granted + 100 purchased; debits applied = initial + credits - balance
    let applied_debits = (200 + 100 - balance) / 100;
    assert_eq!(rejected, 4 - applied_debits);
}
