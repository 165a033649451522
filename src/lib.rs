//! Curated Dictyostelium discoideum mutant collections from
//! [dictyBase](http://www.dictybase.org/).
//!
//! Six monthly text downloads (the master `all-mutants` list plus five
//! mutation-type category files) are fetched, merged into one flag-tagged
//! record set, persisted as a versioned local snapshot and exposed through
//! [`store::MutantStore`] lookup and aggregation accessors.
//!
//! ```no_run
//! use dicty_mutants::cache::SnapshotCache;
//! use dicty_mutants::source::DictybaseHttpClient;
//!
//! # fn main() -> Result<(), dicty_mutants::error::DictyError> {
//! let cache = SnapshotCache::new()?;
//! let client = DictybaseHttpClient::new()?;
//! let store = cache.load_snapshot(&client)?;
//! println!("{:?}", store.genes_of("DBS0235594")?);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod merge;
pub mod record;
pub mod source;
pub mod store;
