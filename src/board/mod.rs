//! Task board classification.
//!
//! Buckets are configured as data: each one carries predicate rules over the
//! task document and may exclude other buckets. A validated [`RuleSet`]
//! places every task in at most one bucket, and [`TaskBoard`] exposes the
//! resulting columns over the live task store.
//!
//! [`RuleSet`]: domain::RuleSet
//! [`TaskBoard`]: services::TaskBoard

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
