use autoptr6_application::use_cases::{ReloadConfigUseCase, ResolvePtrUseCase};
use autoptr6_domain::Config;
use autoptr6_infrastructure::config::FileSnapshotSource;
use autoptr6_infrastructure::dns::{Dispatcher, DnsServer};
use autoptr6_infrastructure::ArcSwapSnapshotStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub struct Services {
    pub store: Arc<ArcSwapSnapshotStore>,
    pub reload: Arc<ReloadConfigUseCase>,
    pub dispatcher: Arc<Dispatcher>,
    pub dns_server: DnsServer,
}

impl Services {
    /// Builds the first snapshot and wires resolver, dispatcher and
    /// reloader around one shared store. Must run inside the runtime.
    pub fn new(
        config: &Config,
        source: Arc<FileSnapshotSource>,
        shutdown: CancellationToken,
    ) -> anyhow::Result<Self> {
        let built = source.build_from(config, 0)?;
        for warning in &built.warnings {
            warn!(file = %config.overrides.file, "Skipped override {}", warning);
        }

        let store = Arc::new(ArcSwapSnapshotStore::new(built.snapshot));
        let resolver = Arc::new(ResolvePtrUseCase::new(store.clone()));
        let reload = Arc::new(ReloadConfigUseCase::new(source, store.clone()));
        let dispatcher = Dispatcher::start(resolver, &config.dispatcher, shutdown.clone());
        let dns_server = DnsServer::new(dispatcher.clone(), store.clone(), shutdown);

        Ok(Self {
            store,
            reload,
            dispatcher,
            dns_server,
        })
    }
}
