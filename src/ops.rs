//! The operator library: one module per operator.
//!
//! Every operator is a struct wrapping its source observable(s) plus the
//! operator's parameters; subscribing peels the struct apart and installs
//! an operator-specific observer in front of the downstream one. The
//! construction methods live on
//! [`ObservableExt`](crate::observable::ObservableExt).

pub mod amb;
pub mod blocking_iter;
pub mod buffer;
pub mod catch_err;
pub mod combine_latest;
pub mod concat;
pub mod contains;
pub mod continue_with;
pub mod count;
pub mod debounce;
pub mod default_if_empty;
pub mod delay;
pub mod distinct;
pub mod element_at;
pub mod filter;
pub mod filter_map;
pub mod first;
pub mod group_by;
pub mod ignore_elements;
pub mod into_future;
pub mod last;
pub mod map;
pub mod map_to;
pub mod materialize;
pub mod merge;
pub mod merge_all;
pub mod minmax;
pub mod observe_on;
pub mod of_type;
pub mod reduce;
pub mod ref_count;
pub mod retry;
pub mod sample;
pub mod scan;
pub mod sequence_equal;
pub mod skip;
pub mod skip_last;
pub mod skip_while;
pub mod start_with;
pub mod subscribe_on;
pub mod sum;
pub mod switch_on_next;
pub mod take;
pub mod take_last;
pub mod take_while;
pub mod timeout;
pub mod timestamp;
pub mod window;
pub mod zip;
