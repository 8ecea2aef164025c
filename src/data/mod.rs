/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///      sales .csv
///          │
///          ▼
///    ┌──────────┐
///    │  loader   │  parse + validate rows → SalesTable
///    └──────────┘
///          │
///          ▼
///    ┌────────────┐
///    │ SalesTable  │  Vec<SalesRecord>, filter domains, date span
///    └────────────┘
///          │
///          ▼
///    ┌──────────┐
///    │  filter   │  apply FilterSelection → visible row indices
///    └──────────┘
///          │
///          ▼
///    ┌────────────┐
///    │ aggregate   │  KPIs + grouped summaries for the charts
///    └────────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
