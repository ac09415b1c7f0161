//! Order list: filtering, sorting, live updates and summaries

pub mod filter_sort;
pub mod live;
pub mod summary;

pub use filter_sort::{
    CreatedBucket, OrderFilter, OrderListFilterSort, SORT_SETTING_KEY, SortKey, filter, fold, sort,
};
pub use live::{ListUpdate, LiveOrderList, OpenOrderChange};
pub use summary::{OrderSummary, summarize};
