use std::sync::Arc;

use panelx::config::CreditsConfig;
use panelx::models::ledger::TransactionKind;
use panelx::services::CreditsService;
use panelx::store::{LedgerStore, MemoryStore};
use panelx::ApiError;

fn service(free_mode: bool, initial_grant: i32) -> (CreditsService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = CreditsConfig {
        free_mode,
        initial_grant,
    };
    (CreditsService::new(store.clone(), &config), store)
}

#[tokio::test]
async fn test_new_user_gets_initial_grant() {
    let (service, _store) = service(false, 1000);

    // Balance read auto-initializes the account
    let balance = service.get_balance("u1").await.unwrap();
    assert_eq!(balance, 1000);

    let history = service.get_history("u1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, TransactionKind::FreeGrant);
    assert_eq!(history[0].amount, 1000);
    assert_eq!(history[0].balance_after, 1000);

    // A second read is pure
    let balance = service.get_balance("u1").await.unwrap();
    assert_eq!(balance, 1000);
    assert_eq!(service.get_history("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_init_account_idempotent() {
    let (service, _store) = service(false, 1000);

    let (account, existed) = service.init_account("u1").await.unwrap();
    assert!(!existed);
    assert_eq!(account.balance, 1000);
    assert_eq!(account.total_purchased, 0);
    assert_eq!(account.total_used, 0);

    let (account, existed) = service.init_account("u1").await.unwrap();
    assert!(existed);
    assert_eq!(account.balance, 1000);

    // Only the first call appended a grant
    let history = service.get_history("u1").await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_paid_debit_decrements_balance() {
    let (service, store) = service(false, 1000);

    service.init_account("u1").await.unwrap();
    let outcome = service.debit("u1", 200, "panel generated").await.unwrap();

    assert_eq!(outcome.credits_used, 200);
    assert_eq!(outcome.new_balance, 800);
    assert!(!outcome.free_mode);

    let history = service.get_history("u1").await.unwrap();
    assert_eq!(history.len(), 2);
    // Newest first
    assert_eq!(history[0].kind, TransactionKind::Usage);
    assert_eq!(history[0].amount, -200);
    assert_eq!(history[0].balance_after, 800);
    assert_eq!(history[0].description, "panel generated");

    let account = store.get_account("u1").await.unwrap().unwrap();
    assert_eq!(account.balance, 800);
    assert_eq!(account.total_used, 200);
}

#[tokio::test]
async fn test_rejected_debit_leaves_no_trace() {
    let (service, store) = service(false, 1000);

    service.init_account("u1").await.unwrap();
    service.debit("u1", 200, "panel generated").await.unwrap();

    // 900 exceeds the remaining 800
    let err = service.debit("u1", 900, "panel generated").await.unwrap_err();
    match err {
        ApiError::InsufficientCredits { requested, balance } => {
            assert_eq!(requested, 900);
            assert_eq!(balance, 800);
        }
        other => panic!("expected InsufficientCredits, got {:?}", other),
    }

    // Balance unchanged, no transaction recorded for the rejected attempt
    assert_eq!(service.get_balance("u1").await.unwrap(), 800);
    assert_eq!(service.get_history("u1").await.unwrap().len(), 2);

    let account = store.get_account("u1").await.unwrap().unwrap();
    assert_eq!(account.total_used, 200);
}

#[tokio::test]
async fn test_non_positive_amounts_rejected_before_any_state_change() {
    let (service, store) = service(false, 1000);

    for amount in [0, -5] {
        let err = service.debit("u1", amount, "noop").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidAmount(_)));

        let err = service
            .credit("u1", amount, TransactionKind::Purchase, "noop", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidAmount(_)));
    }

    // Validation fires before auto-init: the account was never created
    assert!(store.get_account("u1").await.unwrap().is_none());
    assert!(service.get_history("u1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_free_mode_debits_never_decrement() {
    let (service, store) = service(true, 1000);

    service.debit("u2", 50, "panel generated").await.unwrap();
    let outcome = service.debit("u2", 50, "panel generated").await.unwrap();
    assert_eq!(outcome.new_balance, 1000);
    assert!(outcome.free_mode);

    assert_eq!(service.get_balance("u2").await.unwrap(), 1000);

    // Usage is still logged, each entry snapshotting the untouched balance
    let history = service.get_history("u2").await.unwrap();
    let usage: Vec<_> = history
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Usage)
        .collect();
    assert_eq!(usage.len(), 2);
    for tx in usage {
        assert_eq!(tx.amount, -50);
        assert_eq!(tx.balance_after, 1000);
    }

    // The account row itself was never touched by the debits
    let account = store.get_account("u2").await.unwrap().unwrap();
    assert_eq!(account.balance, 1000);
    assert_eq!(account.total_used, 0);
}

#[tokio::test]
async fn test_purchase_credits_apply_in_both_modes() {
    let (paid, _store) = service(false, 1000);
    paid.init_account("u1").await.unwrap();
    paid.debit("u1", 200, "panel generated").await.unwrap();

    let account = paid
        .credit(
            "u1",
            500,
            TransactionKind::Purchase,
            "Credit pack",
            Some("pay_123".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(account.balance, 1300);
    assert_eq!(account.total_purchased, 500);

    let history = paid.get_history("u1").await.unwrap();
    assert_eq!(history[0].kind, TransactionKind::Purchase);
    assert_eq!(history[0].amount, 500);
    assert_eq!(history[0].balance_after, 1300);
    assert_eq!(history[0].payment_id.as_deref(), Some("pay_123"));

    // Purchases count during the free launch period too
    let (free, _store) = service(true, 1000);
    let account = free
        .credit("u2", 500, TransactionKind::Purchase, "Credit pack", None)
        .await
        .unwrap();
    assert_eq!(account.balance, 1500);
    assert_eq!(account.total_purchased, 500);
}

#[tokio::test]
async fn test_usage_kind_is_not_grantable() {
    let (service, _store) = service(false, 1000);

    let err = service
        .credit("u1", 10, TransactionKind::Usage, "bogus", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn test_audit_trail_is_complete() {
    let (service, _store) = service(false, 1000);

    // 1 init + 3 debits + 1 credit = 5 ledger entries, no gaps, no duplicates
    service.init_account("u1").await.unwrap();
    service.debit("u1", 100, "a").await.unwrap();
    service.debit("u1", 100, "b").await.unwrap();
    service.debit("u1", 100, "c").await.unwrap();
    service
        .credit("u1", 50, TransactionKind::Purchase, "d", None)
        .await
        .unwrap();

    let history = service.get_history("u1").await.unwrap();
    assert_eq!(history.len(), 5);

    let mut ids: Vec<_> = history.iter().map(|tx| tx.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[tokio::test]
async fn test_paid_mode_conservation() {
    let (service, _store) = service(false, 1000);

    service.init_account("u1").await.unwrap();
    for (amount, description) in [(100, "a"), (250, "b"), (400, "c")] {
        service.debit("u1", amount, description).await.unwrap();
    }

    // Oldest first: every balance_after follows from the previous one, and no
    // balance ever goes negative
    let history = service.get_history("u1").await.unwrap();
    let mut previous = None;
    for tx in history.iter().rev() {
        if let Some(prev) = previous {
            assert_eq!(tx.balance_after, prev + tx.amount);
        }
        assert!(tx.balance_after >= 0);
        previous = Some(tx.balance_after);
    }

    assert_eq!(service.get_balance("u1").await.unwrap(), 250);
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let (service, _store) = service(false, 1000);

    service.init_account("u1").await.unwrap();
    service.debit("u1", 10, "first").await.unwrap();
    service.debit("u1", 20, "second").await.unwrap();

    let history = service.get_history("u1").await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].description, "second");
    assert_eq!(history[1].description, "first");
    assert_eq!(history[2].kind, TransactionKind::FreeGrant);

    for window in history.windows(2) {
        assert!(window[0].created_at >= window[1].created_at);
    }
}

#[tokio::test]
async fn test_history_for_unknown_user_is_empty() {
    let (service, store) = service(false, 1000);

    let history = service.get_history("nobody").await.unwrap();
    assert!(history.is_empty());

    // Unlike a balance read, a history read does not create an account
    assert!(store.get_account("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_free_mode_debit_auto_initializes() {
    let (service, _store) = service(true, 1000);

    // First touch is a debit, not a balance read
    let outcome = service.debit("fresh", 50, "panel generated").await.unwrap();
    assert_eq!(outcome.new_balance, 1000);

    let history = service.get_history("fresh").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].kind, TransactionKind::Usage);
    assert_eq!(history[1].kind, TransactionKind::FreeGrant);
}

#[tokio::test]
async fn test_exact_balance_debit_reaches_zero() {
    let (service, _store) = service(false, 100);

    service.init_account("u1").await.unwrap();
    let outcome = service.debit("u1", 100, "all in").await.unwrap();
    assert_eq!(outcome.new_balance, 0);

    // Nothing left
    let err = service.debit("u1", 1, "one more").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::InsufficientCredits {
            requested: 1,
            balance: 0
        }
    ));
}
