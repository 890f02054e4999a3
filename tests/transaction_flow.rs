//! End-to-end ledger flows through the public crate API

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;

use market_ledger::inventory::ItemStatus;
use market_ledger::ledger::AcceptRole;
use market_ledger::{LedgerError, MemoryLedgerStore, TransactionLedger, TransactionStatus, UserId};

const SELLER: UserId = 10;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn accept_both(ledger: &TransactionLedger, buyer: UserId, id: i64) -> Result<(), LedgerError> {
    ledger
        .set_acceptance(buyer, id, AcceptRole::Buyer, true, Utc::now())
        .await?;
    ledger
        .set_acceptance(SELLER, id, AcceptRole::Seller, true, Utc::now())
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_offer_accept_pay_lifecycle() {
    let store = MemoryLedgerStore::new();
    store.add_user(SELLER).await;
    store.add_user(11).await;
    let item = store
        .add_item(SELLER, dec("25.00"), 4, ItemStatus::Available)
        .await;
    let ledger = TransactionLedger::new(Arc::new(store.clone()), 3);

    let tx = ledger.create(11, item, 3).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.agreed_price, dec("75.00"));
    assert_eq!(store.item(item).await.unwrap().quantity, 4);

    let tx = ledger
        .update_terms(11, tx.id, dec("70.00"), 3)
        .await
        .unwrap();
    assert_eq!(tx.agreed_price, dec("70.00"));

    accept_both(&ledger, 11, tx.id).await.unwrap();
    assert_eq!(store.item(item).await.unwrap().quantity, 1);

    let paid = ledger.mark_paid(11, tx.id).await.unwrap();
    assert_eq!(paid.status, TransactionStatus::Paid);

    // paid transactions are final
    let err = ledger.cancel(SELLER, tx.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidState(_)));
    assert_eq!(store.item(item).await.unwrap().quantity, 1);

    let mine = ledger.list_mine(SELLER).await.unwrap();
    assert_eq!(mine.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_competing_buyers_never_oversell() {
    let store = MemoryLedgerStore::new();
    store.add_user(SELLER).await;
    let buyers: Vec<UserId> = (100..108).collect();
    for b in &buyers {
        store.add_user(*b).await;
    }
    let item = store
        .add_item(SELLER, dec("10.00"), 5, ItemStatus::Available)
        .await;
    let ledger = Arc::new(TransactionLedger::new(Arc::new(store.clone()), 3));

    // every buyer wants two units; at most two of them can get them
    let mut offers = Vec::new();
    for b in &buyers {
        offers.push((*b, ledger.create(*b, item, 2).await.unwrap().id));
    }

    let results = join_all(offers.iter().map(|(buyer, id)| {
        let ledger = ledger.clone();
        let (buyer, id) = (*buyer, *id);
        tokio::spawn(async move { accept_both(&ledger, buyer, id).await })
    }))
    .await;

    let mut accepted = 0;
    for result in results {
        match result.unwrap() {
            Ok(()) => accepted += 1,
            Err(LedgerError::InvalidState(msg)) => {
                assert!(msg.starts_with("Item is not available"), "{}", msg)
            }
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(accepted, 2);
    assert_eq!(store.item(item).await.unwrap().quantity, 1);

    let accepted_rows = ledger
        .list_mine(SELLER)
        .await
        .unwrap()
        .into_iter()
        .filter(|t| t.status == TransactionStatus::Accepted)
        .count();
    assert_eq!(accepted_rows, 2);
}

#[tokio::test]
async fn test_seller_cancel_restores_stock() {
    let store = MemoryLedgerStore::new();
    store.add_user(SELLER).await;
    store.add_user(20).await;
    let item = store
        .add_item(SELLER, dec("3.50"), 2, ItemStatus::Available)
        .await;
    let ledger = TransactionLedger::new(Arc::new(store.clone()), 3);

    let tx = ledger.create(20, item, 2).await.unwrap();
    accept_both(&ledger, 20, tx.id).await.unwrap();
    assert_eq!(store.item(item).await.unwrap().quantity, 0);

    let err = ledger.cancel(20, tx.id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "This transaction is already accepted, buyer cannot cancel"
    );

    let cancelled = ledger.cancel(SELLER, tx.id).await.unwrap();
    assert_eq!(cancelled.status, TransactionStatus::Cancelled);
    assert_eq!(store.item(item).await.unwrap().quantity, 2);
}
