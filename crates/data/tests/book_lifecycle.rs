use betedge_core::{EngineConfig, GameResult, PickEvaluator, PickStatus};
use betedge_data::{CsvStorage, PickBook};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 10, 17, 30, 0).unwrap()
}

#[test]
fn feed_to_settlement_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let lines_path = dir.path().join("lines.csv");
    let estimates_path = dir.path().join("estimates.csv");
    fs::write(
        &lines_path,
        "game_id,bookmaker,market_type,selection,price,american,point,observed_at\n\
         nfl-w10-det-hou,draftkings,spread,HOU,,-110,3.5,2024-11-10T16:00:00Z\n\
         nfl-w10-det-hou,draftkings,total,over,1.95,,49.5,2024-11-10T16:00:00Z\n\
         nfl-w10-pit-was,fanduel,moneyline,PIT,2.40,,,2024-11-10T09:00:00Z\n",
    )
    .unwrap();
    fs::write(
        &estimates_path,
        "game_id,market_type,selection,probability,confidence\n\
         nfl-w10-det-hou,spread,HOU,0.58,0.75\n\
         nfl-w10-det-hou,total,over,0.52,0.65\n\
         nfl-w10-pit-was,moneyline,PIT,0.50,0.85\n",
    )
    .unwrap();

    let config = EngineConfig::default();
    let book = PickBook::new(config.bankroll.initial_state());
    let batch = PickEvaluator::new(&config).evaluate_batch(
        &CsvStorage::read_market_lines(&lines_path).unwrap(),
        &CsvStorage::read_model_estimates(&estimates_path).unwrap(),
        &book.bankroll(),
        now(),
    );
    let picks = book.record_all(batch.picks);

    assert_eq!(picks.len(), 3);
    // Spread: PLAY. Total: edge 0.0072, gate fails. Moneyline: odds 8.5h old.
    assert!(picks[0].is_bet());
    assert_eq!(
        picks[1].reason_strings(),
        vec!["ev_below_threshold".to_string(), "edge_below_threshold".to_string()]
    );
    assert_eq!(picks[2].reason_strings(), vec!["stale_odds".to_string()]);
    assert_eq!(book.value_board().len(), 1);
    assert_eq!(book.bankroll().active_exposure, picks[0].stake_amount);

    let settlement = book
        .settle(picks[0].id, GameResult::Loss, None, now() + chrono::Duration::hours(4))
        .unwrap();
    assert_eq!(settlement.result, PickStatus::Lost);
    assert_eq!(book.bankroll().current_balance, dec!(1000) - picks[0].stake_amount);
    assert_eq!(book.bankroll().active_exposure, Decimal::ZERO);
    assert!(book.value_board().is_empty());

    let picks_out = dir.path().join("picks.csv");
    let settlements_out = dir.path().join("settlements.csv");
    CsvStorage::write_picks(&picks_out, &book.picks()).unwrap();
    CsvStorage::write_settlements(&settlements_out, &book.settlements()).unwrap();

    let written = fs::read_to_string(&picks_out).unwrap();
    assert_eq!(written.lines().count(), 4);
    assert!(written.contains("stale_odds"));
    assert!(fs::read_to_string(&settlements_out).unwrap().contains(",lost,spread,"));
}
