//! Loan input data structures and persisted app state

mod data;
pub mod store;

pub use data::{
    LoanTerms, CommissionTerms, CommissionMode, PrepaymentStrategy, ExtraPayment,
    ExtraPaymentBucket, build_extra_map, merge_reduce_time_extra,
};
pub use store::{AppLanguage, PersistedState, PersistedExtraPayment, StateStore};
