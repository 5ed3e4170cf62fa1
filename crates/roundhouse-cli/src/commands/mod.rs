//! Command handlers.
//!
//! Each submodule turns parsed arguments into service calls and renders the
//! result. Handlers that touch the collection open a [`Session`].

pub mod completions;
pub mod config;
pub mod decoder;
pub mod init;
pub mod model;
pub mod purchase;
pub mod train;

use std::fmt::Display;
use std::path::Path;
use std::sync::{Arc, mpsc::Receiver};

use tracing::{debug, info};

use roundhouse_adapters::{ChannelObserver, JsonFileStore, TracingObserver};
use roundhouse_core::{
    application::{ChangeEvent, DecoderService, PurchaseService, TrainService},
    domain::{DisplayName, Era, SparseIndex},
    error::RoundhouseError,
};

use crate::{
    cli::GlobalArgs,
    config::AppConfig,
    error::{CliError, CliResult},
};

/// An open collection plus the ordering it is edited with.
pub struct Session {
    store: JsonFileStore,
    ordering: SparseIndex,
    events: Receiver<ChangeEvent>,
}

impl Session {
    /// Open the collection named by `--store`, else by the config.
    pub fn open(global: &GlobalArgs, config: &AppConfig) -> CliResult<Self> {
        let ordering = config.sparse_index().map_err(|e| CliError::ConfigError {
            message: format!("ordering.baseline: {e}"),
            source: Some(Box::new(e)),
        })?;
        let path = global.store.clone().unwrap_or_else(|| config.store_path());

        let store = JsonFileStore::open(&path)?;
        store.subscribe(Arc::new(TracingObserver))?;
        let (observer, events) = ChannelObserver::channel();
        store.subscribe(Arc::new(observer))?;

        debug!(path = %path.display(), baseline = ordering.baseline(), "Collection opened");
        Ok(Self {
            store,
            ordering,
            events,
        })
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub fn purchases(&self) -> PurchaseService {
        PurchaseService::new(Box::new(self.store.clone())).with_ordering(self.ordering)
    }

    pub fn trains(&self) -> TrainService {
        TrainService::new(Box::new(self.store.clone())).with_ordering(self.ordering)
    }

    pub fn decoders(&self) -> DecoderService {
        DecoderService::new(Box::new(self.store.clone()), Box::new(self.store.clone()))
    }

    /// Report what the command changed. Returns the number of changes.
    pub fn finish(self) -> usize {
        let changes = self.events.try_iter().count();
        if changes > 0 {
            info!(changes, path = %self.store.path().display(), "Collection saved");
        }
        changes
    }
}

/// Find the one id whose text starts with `input`, ignoring case.
pub fn resolve_id<I>(entity: &'static str, input: &str, ids: impl IntoIterator<Item = I>) -> CliResult<I>
where
    I: Copy + Display,
{
    let needle = input.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err(CliError::InvalidInput {
            message: format!("an empty {entity} id"),
            source: None,
        });
    }

    let matches: Vec<I> = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&needle))
        .collect();

    match matches.as_slice() {
        [] => Err(CliError::NotFound {
            entity,
            input: input.to_string(),
        }),
        [only] => Ok(*only),
        many => Err(CliError::AmbiguousId {
            entity,
            input: input.to_string(),
            count: many.len(),
        }),
    }
}

/// Convert a 1-based position to an index, accepting `1..=max`.
pub fn zero_based(position: usize, max: usize) -> CliResult<usize> {
    if position == 0 || position > max {
        return Err(CliError::InvalidPosition { position, max });
    }
    Ok(position - 1)
}

/// Parse an attribute by slug or display name.
pub fn parse_named<T: DisplayName>(value: &str) -> CliResult<T> {
    T::parse_name(value).map_err(|e| RoundhouseError::from(e).into())
}

/// Eras are also known by number, 1 to 11.
pub fn parse_era(value: &str) -> CliResult<Era> {
    match value.trim().parse::<usize>() {
        Ok(number) => number
            .checked_sub(1)
            .and_then(|i| Era::ALL.get(i).copied())
            .ok_or_else(|| CliError::InvalidInput {
                message: format!("era {number} does not exist (1 to {})", Era::ALL.len()),
                source: None,
            }),
        Err(_) => parse_named(value),
    }
}

/// First eight characters of an id, enough to type back.
pub fn short_id(id: impl Display) -> String {
    id.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundhouse_core::domain::{ModelDispatch, PurchaseId};
    use uuid::Uuid;

    fn id(text: &str) -> PurchaseId {
        PurchaseId::from_uuid(Uuid::parse_str(text).unwrap())
    }

    #[test]
    fn resolves_unique_prefix_ignoring_case() {
        let ids = [
            id("3f2a0000-0000-4000-8000-000000000001"),
            id("9c1d0000-0000-4000-8000-000000000002"),
        ];
        assert_eq!(resolve_id("purchase", "3F2A", ids).unwrap(), ids[0]);
    }

    #[test]
    fn shared_prefix_is_ambiguous() {
        let ids = [
            id("3f2a0000-0000-4000-8000-000000000001"),
            id("3f2b0000-0000-4000-8000-000000000002"),
        ];
        assert!(matches!(
            resolve_id("purchase", "3f2", ids),
            Err(CliError::AmbiguousId { count: 2, .. })
        ));
    }

    #[test]
    fn unknown_prefix_is_not_found() {
        let ids = [id("3f2a0000-0000-4000-8000-000000000001")];
        let err = resolve_id("purchase", "ab", ids).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn blank_input_is_rejected() {
        let ids: [PurchaseId; 0] = [];
        assert!(matches!(
            resolve_id("purchase", "  ", ids),
            Err(CliError::InvalidInput { .. })
        ));
    }

    #[test]
    fn positions_are_one_based() {
        assert_eq!(zero_based(1, 3).unwrap(), 0);
        assert_eq!(zero_based(3, 3).unwrap(), 2);
        assert!(zero_based(0, 3).is_err());
        assert!(zero_based(4, 3).is_err());
    }

    #[test]
    fn eras_parse_by_number_or_name() {
        assert_eq!(parse_era("7").unwrap(), Era::BrBlue);
        assert_eq!(parse_era("br blue").unwrap(), Era::BrBlue);
        assert!(parse_era("12").is_err());
        assert!(parse_era("0").is_err());
    }

    #[test]
    fn named_values_map_to_user_errors() {
        assert_eq!(parse_named::<ModelDispatch>("DCC Sound").unwrap(), ModelDispatch::DccSound);
        assert_eq!(parse_named::<ModelDispatch>("steam").unwrap_err().exit_code(), 2);
    }
}
