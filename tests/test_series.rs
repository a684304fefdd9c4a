use coincast::{ForecastError, HistorySeries, PricePoint, SeriesLoader};
use pretty_assertions::assert_eq;

const MS_PER_DAY: i64 = 86_400_000;
// 2023-01-01T00:00:00Z
const BASE_MS: i64 = 1_672_531_200_000;

fn pt(day: i64, price: f64) -> PricePoint {
    PricePoint::new(BASE_MS + day * MS_PER_DAY, price)
}

#[test]
fn test_normalize_sorts_and_dedups() {
    // Unordered input with a timestamp collision; the last sample wins
    let raw = vec![pt(1, 100.0), pt(0, 90.0), pt(1, 110.0)];

    let series = SeriesLoader::normalize(&raw).unwrap();

    assert_eq!(series.prices(), vec![90.0, 110.0]);
    let timestamps: Vec<i64> = series.points().iter().map(|p| p.timestamp).collect();
    assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_normalize_output_is_one_point_per_day() {
    let raw = vec![
        pt(3, 104.0),
        pt(0, 100.0),
        pt(1, 101.0),
        pt(2, 103.0),
        pt(1, 102.0),
    ];

    let series = SeriesLoader::normalize(&raw).unwrap();

    assert_eq!(series.len(), 4);
    for (i, p) in series.points().iter().enumerate() {
        assert_eq!(p.timestamp, BASE_MS + i as i64 * MS_PER_DAY);
    }
    // Second sample for day 1 replaced the first
    assert_eq!(series.points()[1].price, 102.0);
}

#[test]
fn test_normalize_interpolates_interior_gaps() {
    // Days 2 and 3 are missing between known prices on days 1 and 4
    let raw = vec![pt(0, 100.0), pt(1, 102.0), pt(4, 108.0)];

    let series = SeriesLoader::normalize(&raw).unwrap();

    assert_eq!(series.len(), 5);
    assert_eq!(series.prices(), vec![100.0, 102.0, 104.0, 106.0, 108.0]);
}

#[test]
fn test_normalize_intraday_last_sample_wins() {
    let noon = BASE_MS + 12 * 3_600_000;
    let evening = BASE_MS + 20 * 3_600_000;
    let raw = vec![
        PricePoint::new(noon, 100.0),
        PricePoint::new(evening, 105.0),
        pt(1, 110.0),
    ];

    let series = SeriesLoader::normalize(&raw).unwrap();

    // Snapped to midnight, later intraday sample kept
    assert_eq!(series.points()[0].timestamp, BASE_MS);
    assert_eq!(series.points()[0].price, 105.0);
}

#[test]
fn test_normalize_drops_unusable_samples() {
    let raw = vec![
        pt(0, f64::NAN),
        pt(1, -5.0),
        pt(2, 0.0),
        pt(3, 100.0),
        pt(4, 101.0),
    ];

    let series = SeriesLoader::normalize(&raw).unwrap();

    assert_eq!(series.prices(), vec![100.0, 101.0]);
}

#[test]
fn test_normalize_fails_below_two_usable_points() {
    let raw = vec![pt(0, f64::INFINITY), pt(1, 100.0)];

    let err = SeriesLoader::normalize(&raw).unwrap_err();

    assert!(matches!(
        err,
        ForecastError::InsufficientData { have: 1, need: 2 }
    ));
}

#[test]
fn test_normalize_fails_on_empty_input() {
    let err = SeriesLoader::normalize(&[]).unwrap_err();

    assert!(matches!(
        err,
        ForecastError::InsufficientData { have: 0, .. }
    ));
}

#[test]
fn test_history_series_tail() {
    let series = HistorySeries::from_points((0..10).map(|i| pt(i, 100.0 + i as f64)).collect());

    let tail = series.tail(3);
    assert_eq!(tail.len(), 3);
    assert_eq!(tail.prices(), vec![107.0, 108.0, 109.0]);

    // Tail longer than the series returns everything
    assert_eq!(series.tail(100).len(), 10);
}
