/// Order book loading tests
///
/// These tests cover:
/// - Record- and column-oriented book layouts
/// - Null book filtering and exchange selection
/// - Timestamp ordering of unsorted keys
/// - Malformed input reporting
use anyhow::Result;
use microstructure_data::{load_orderbooks, parse_orderbooks, DEFAULT_EXCHANGE};
use serde_json::json;

#[cfg(test)]
mod layout_tests {
    use super::*;

    #[test]
    fn test_record_oriented_books() -> Result<()> {
        let doc = json!({
            "bitfinex": {
                "2021-07-05T13:06:46.571Z": [
                    {"bid_size": 0.5, "bid": 34000.0, "ask": 34001.0, "ask_size": 1.0},
                    {"bid_size": 1.5, "bid": 33999.0, "ask": 34002.0, "ask_size": 2.0}
                ],
                "2021-07-05T13:06:47.100Z": [
                    {"bid_size": 0.7, "bid": 34000.0, "ask": 34001.0, "ask_size": 0.9}
                ]
            }
        });

        let series = parse_orderbooks(&doc.to_string(), "bitfinex")?;
        assert_eq!(series.len(), 2);

        let (_, first) = series.iter().next().unwrap();
        assert_eq!(first.level_count(), 2);
        assert_eq!(first.best().bid_size, 0.5);
        Ok(())
    }

    #[test]
    fn test_column_oriented_books_with_extra_columns() -> Result<()> {
        let doc = json!({
            "bitfinex": {
                "2021-07-05T13:06:46.571Z": {
                    "timestamp": {"0": "ignored", "1": "ignored"},
                    "bid_size": {"0": 0.5, "1": 1.5},
                    "bid": {"0": 34000.0, "1": 33999.0},
                    "ask": {"0": 34001.0, "1": 34002.0},
                    "ask_size": {"0": 1.0, "1": 2.0}
                },
                "2021-07-05T13:06:47.100Z": {
                    "bid_size": [0.7],
                    "bid": [34000],
                    "ask": [34001],
                    "ask_size": [0.9]
                }
            }
        });

        let series = parse_orderbooks(&doc.to_string(), "bitfinex")?;
        let counts: Vec<usize> = series.iter().map(|(_, s)| s.level_count()).collect();
        assert_eq!(counts, vec![2, 1]);

        let (_, second) = series.iter().nth(1).unwrap();
        assert_eq!(second.best().bid, 34000.0);
        Ok(())
    }
}

#[cfg(test)]
mod selection_tests {
    use super::*;

    fn book(bid: f64) -> serde_json::Value {
        json!([{"bid_size": 1.0, "bid": bid, "ask": bid + 1.0, "ask_size": 1.0}])
    }

    #[test]
    fn test_null_books_dropped() -> Result<()> {
        let doc = json!({
            "bitfinex": {
                "2021-07-05T13:06:46.000Z": book(100.0),
                "2021-07-05T13:06:47.000Z": null,
                "2021-07-05T13:06:48.000Z": book(101.0)
            }
        });

        let series = parse_orderbooks(&doc.to_string(), DEFAULT_EXCHANGE)?;
        assert_eq!(series.len(), 2);
        Ok(())
    }

    #[test]
    fn test_only_requested_exchange_loaded() -> Result<()> {
        let doc = json!({
            "bitfinex": { "2021-07-05T13:06:46.000Z": book(100.0) },
            "kraken": {
                "2021-07-05T13:06:46.000Z": book(200.0),
                "2021-07-05T13:06:47.000Z": book(201.0)
            }
        });

        let series = parse_orderbooks(&doc.to_string(), "kraken")?;
        assert_eq!(series.len(), 2);
        let (_, first) = series.iter().next().unwrap();
        assert_eq!(first.best().bid, 200.0);
        Ok(())
    }

    #[test]
    fn test_missing_exchange() {
        let doc = json!({ "bitfinex": {} });
        let err = parse_orderbooks(&doc.to_string(), "kraken").unwrap_err();
        assert!(err.to_string().contains("Exchange 'kraken' not found"));
    }

    #[test]
    fn test_unsorted_keys_are_ordered() -> Result<()> {
        let doc = json!({
            "bitfinex": {
                "2021-07-05T13:06:48.000Z": book(102.0),
                "2021-07-05 13:06:46": book(100.0),
                "2021-07-05T13:06:47.000Z": book(101.0)
            }
        });

        let series = parse_orderbooks(&doc.to_string(), "bitfinex")?;
        let bids: Vec<f64> = series.iter().map(|(_, s)| s.best().bid).collect();
        assert_eq!(bids, vec![100.0, 101.0, 102.0]);
        Ok(())
    }
}

#[cfg(test)]
mod malformed_input_tests {
    use super::*;

    #[test]
    fn test_not_json() {
        let err = parse_orderbooks("{not json", "bitfinex").unwrap_err();
        assert!(err.to_string().contains("Failed to parse order book JSON"));
    }

    #[test]
    fn test_bad_timestamp_key() {
        let doc = json!({
            "bitfinex": {
                "sometime": [{"bid_size": 1.0, "bid": 1.0, "ask": 2.0, "ask_size": 1.0}]
            }
        });
        let err = parse_orderbooks(&doc.to_string(), "bitfinex").unwrap_err();
        assert!(err.to_string().contains("Unrecognized timestamp"));
    }

    #[test]
    fn test_empty_book_rejected() {
        let doc = json!({ "bitfinex": { "2021-07-05T13:06:46.000Z": [] } });
        let err = parse_orderbooks(&doc.to_string(), "bitfinex").unwrap_err();
        assert!(err.to_string().contains("Empty order book"));
    }

    #[test]
    fn test_missing_column() {
        let doc = json!({
            "bitfinex": {
                "2021-07-05T13:06:46.000Z": { "bid_size": [1.0], "bid": [1.0], "ask": [2.0] }
            }
        });
        let err = parse_orderbooks(&doc.to_string(), "bitfinex").unwrap_err();
        assert!(err.to_string().contains("Malformed order book"));
    }

    #[test]
    fn test_duplicate_instants_rejected() {
        let doc = json!({
            "bitfinex": {
                "2021-07-05T13:06:46.000Z": [{"bid_size": 1.0, "bid": 1.0, "ask": 2.0, "ask_size": 1.0}],
                "2021-07-05 13:06:46": [{"bid_size": 1.0, "bid": 1.0, "ask": 2.0, "ask_size": 1.0}]
            }
        });
        let err = parse_orderbooks(&doc.to_string(), "bitfinex").unwrap_err();
        assert!(err.to_string().contains("Invalid snapshot series"));
    }
}

#[cfg(test)]
mod file_tests {
    use super::*;

    #[test]
    fn test_nonexistent_path() {
        let err = load_orderbooks("/path/that/does/not/exist.json", "bitfinex").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_load_from_disk() -> Result<()> {
        let doc = json!({
            "bitfinex": {
                "2021-07-05T13:06:46.000Z": [{"bid_size": 1.0, "bid": 1.0, "ask": 2.0, "ask_size": 1.0}],
                "2021-07-05T13:06:47.000Z": [{"bid_size": 1.0, "bid": 1.0, "ask": 2.0, "ask_size": 1.0}]
            }
        });

        let path = std::env::temp_dir().join(format!(
            "microstructure_orderbooks_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, doc.to_string())?;

        let result = load_orderbooks(&path, "bitfinex");
        std::fs::remove_file(&path)?;

        assert_eq!(result?.len(), 2);
        Ok(())
    }
}
