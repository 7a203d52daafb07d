//! Embedded default catalog. These profiles came out of the offline tuning
//! workbench under the default profiler thresholds; they are a working
//! baseline, not the best sequences achievable for any particular corpus.

pub(super) const CATALOG_JSON: &str = r#"{
  "Natural": {
    "Sequence": [[18, 1], [25, 1], [34, 2], [9, 1], [37, 1], [27, 1]],
    "GlobalRounds": 3,
    "AggregateScore": 9.12
  },
  "Random": {
    "Sequence": [[17, 1], [1, 1], [28, 1], [38, 1]],
    "GlobalRounds": 2,
    "AggregateScore": 8.87
  },
  "Sequence": {
    "Sequence": [[12, 1], [21, 1], [30, 1], [5, 1], [35, 1], [40, 1]],
    "GlobalRounds": 4,
    "AggregateScore": 9.35
  },
  "Combined": {
    "Sequence": [[18, 1], [27, 1], [32, 1], [20, 1], [13, 1], [2, 1]],
    "GlobalRounds": 3,
    "AggregateScore": 9.01
  },
  "UserData": {
    "Sequence": [[20, 2], [34, 1], [26, 1], [17, 1], [10, 1], [36, 1]],
    "GlobalRounds": 5,
    "AggregateScore": 9.24
  }
}"#;
