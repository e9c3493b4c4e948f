use crate::cli::CommandLineArgs;
use crate::controller::ViewController;
use crate::error::DashboardError;
use crate::source::{RecordSource, SocrataClient};

use std::sync::Arc;
use url::Url;

/// Shared application state passed to each request handler.
pub struct AppState {
    /// Command line arguments.
    pub args: CommandLineArgs,

    /// Source of establishment records.
    pub source: Arc<dyn RecordSource>,

    /// Active view.
    pub controller: ViewController,
}

impl AppState {
    /// Create and return an [AppState] backed by the open data API.
    ///
    /// # Arguments
    ///
    /// * `args`: Command line arguments
    pub fn new(args: &CommandLineArgs) -> Result<Self, DashboardError> {
        let base_url = Url::parse(&args.api_url)?;
        let source = SocrataClient::new(base_url, args.app_token.clone(), args.record_limit);
        Ok(Self::with_source(args, Arc::new(source)))
    }

    /// Create and return an [AppState] backed by an arbitrary record source.
    ///
    /// # Arguments
    ///
    /// * `args`: Command line arguments
    /// * `source`: Source of establishment records
    pub fn with_source(args: &CommandLineArgs, source: Arc<dyn RecordSource>) -> Self {
        Self {
            args: args.clone(),
            source,
            controller: ViewController::new(),
        }
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
