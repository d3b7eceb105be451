use std::sync::Arc;

use crate::config::Config;
use crate::error::SourceError;
use crate::source::concept2::LogbookClient;
use crate::source::report::CsvReportWriter;
use crate::source::roster::Roster;
use crate::source::store::DataStore;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    roster: Arc<Roster>,
    store: DataStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let roster = Roster::load(&config.roster_path).unwrap_or_else(|err| {
            tracing::warn!(
                "Could not read roster {}: {}; starting with an empty in-memory roster",
                config.roster_path.display(),
                err
            );
            Roster::new(Vec::new())
        });
        let store = DataStore::new(&config.data_dir);

        Self {
            config: Arc::new(config),
            roster: Arc::new(roster),
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn roster_handle(&self) -> Arc<Roster> {
        Arc::clone(&self.roster)
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn reports(&self) -> CsvReportWriter {
        CsvReportWriter::new(&self.config.reports_dir)
    }

    pub fn logbook(&self) -> Result<LogbookClient, SourceError> {
        LogbookClient::new(
            &self.config.api_root,
            self.config.http_timeout,
            self.config.fetch_concurrency,
        )
    }
}
