mod common;

use chrono::Utc;
use common::{OWNER, fixed_prices, harness, order_request};
use rta_engine::domain::order::{Order, OrderId, TerminalUpdate};
use rta_engine::domain::ports::OrderStore;
use rta_engine::error::EngineError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

async fn settled_order(
    store: &dyn OrderStore,
    instrument: &str,
    amount: Decimal,
    units: Decimal,
    price_per_unit: Decimal,
) -> OrderId {
    let id = store
        .create(Order::submit(order_request(instrument, amount, "pay-1")))
        .await
        .unwrap();
    store
        .update_terminal(
            &id,
            TerminalUpdate::Succeeded {
                units,
                price_per_unit,
                at: Utc::now(),
            },
        )
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn test_holdings_valued_at_current_price() {
    let h = harness(fixed_prices(&[("Growth Fund 1", dec!(12))]), &[], Duration::ZERO);
    settled_order(&*h.store, "Growth Fund 1", dec!(20), dec!(2), dec!(10)).await;
    settled_order(&*h.store, "Growth Fund 1", dec!(30), dec!(3), dec!(10)).await;

    let holdings = h.engine.holdings(OWNER).await.unwrap();
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0].instrument, "Growth Fund 1");
    assert_eq!(holdings[0].total_amount, dec!(50));
    assert_eq!(holdings[0].units, dec!(5));
    assert_eq!(holdings[0].market_value, dec!(60));
}

#[tokio::test]
async fn test_holdings_one_entry_per_instrument_by_name() {
    let h = harness(
        fixed_prices(&[("Growth Fund 1", dec!(50)), ("Arbitrage Fund 4", dec!(55))]),
        &[],
        Duration::ZERO,
    );
    settled_order(&*h.store, "Growth Fund 1", dec!(100), dec!(2), dec!(50)).await;
    settled_order(&*h.store, "Arbitrage Fund 4", dec!(110), dec!(2), dec!(55)).await;

    let names: Vec<String> = h
        .engine
        .holdings(OWNER)
        .await
        .unwrap()
        .into_iter()
        .map(|holding| holding.instrument)
        .collect();
    assert_eq!(names, vec!["Arbitrage Fund 4", "Growth Fund 1"]);
}

#[tokio::test]
async fn test_holdings_ignore_unsettled_and_failed_orders() {
    let h = harness(fixed_prices(&[("Growth Fund 1", dec!(50))]), &[], Duration::ZERO);
    h.store
        .create(Order::submit(order_request("Growth Fund 1", dec!(100), "pay-1")))
        .await
        .unwrap();
    let failed = h
        .store
        .create(Order::submit(order_request("Growth Fund 1", dec!(100), "pay-2")))
        .await
        .unwrap();
    h.store
        .update_terminal(&failed, TerminalUpdate::Failed { at: Utc::now() })
        .await
        .unwrap();

    assert!(h.engine.holdings(OWNER).await.unwrap().is_empty());
    assert!(h.engine.holdings("someone-else").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_holdings_for_unpriced_instrument() {
    let h = harness(fixed_prices(&[("Growth Fund 1", dec!(50))]), &[], Duration::ZERO);
    settled_order(&*h.store, "Growth Fund 1", dec!(100), dec!(2), dec!(50)).await;
    h.engine.prices().remove("Growth Fund 1").await.unwrap();

    let result = h.engine.holdings(OWNER).await;
    assert!(matches!(result, Err(EngineError::InstrumentNotFound(_))));
}

#[tokio::test]
async fn test_current_price() {
    let h = harness(fixed_prices(&[("Growth Fund 1", dec!(75))]), &[], Duration::ZERO);
    assert_eq!(h.engine.current_price("Growth Fund 1").await.unwrap(), dec!(75));
    assert!(matches!(
        h.engine.current_price("No Such Fund").await,
        Err(EngineError::InstrumentNotFound(_))
    ));
}

#[tokio::test]
async fn test_holdings_from_spawned_task() {
    let h = harness(fixed_prices(&[("Growth Fund 1", dec!(50))]), &[], Duration::ZERO);
    let engine = h.engine.clone();

    let handle = tokio::spawn(async move { engine.holdings(OWNER).await.unwrap().len() });
    settled_order(&*h.store, "Growth Fund 1", dec!(100), dec!(2), dec!(50)).await;

    assert!(handle.await.unwrap() <= 1);
    assert_eq!(h.engine.holdings(OWNER).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_holdings_out_of_range_is_error() {
    let h = harness(fixed_prices(&[("Growth Fund 1", dec!(2))]), &[], Duration::ZERO);
    settled_order(&*h.store, "Growth Fund 1", dec!(100), Decimal::MAX, dec!(1)).await;

    let result = h.engine.holdings(OWNER).await;
    assert!(matches!(result, Err(EngineError::ValidationError(_))));
}
