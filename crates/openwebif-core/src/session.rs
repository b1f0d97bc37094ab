// ── Device session ──
//
// Full lifecycle management for one box: status polling, state
// reconciliation, command routing, and the capability surface the
// accessory host talks to. One session per configured device; sessions
// share nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, OnceLock};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use openwebif_api::{OpenWebifClient, PowerAction, TransportConfig};

use crate::command::{Command, EXIT_CODE, INFO_CODE, InfoMenuAction, MENU_CODE};
use crate::config::{DeviceConfig, VolumeDisplay};
use crate::error::CoreError;
use crate::model::{
    CachedState, Capability, CapabilityValue, DeviceIdentity, DeviceStatus, StateUpdate, SyncState,
};
use crate::persist::PersistenceStore;
use crate::registry::{ChannelEntry, ChannelRegistry};

const UPDATE_CHANNEL_SIZE: usize = 64;

/// Store key for the cached channel list fetched from the box.
pub(crate) const CHANNEL_CACHE_KEY: &str = "channels";

/// The fixed capability table every session exposes.
const CAPABILITIES: [Capability; 7] = [
    Capability::Power,
    Capability::ActiveChannel,
    Capability::Volume,
    Capability::Mute,
    Capability::RemoteKey,
    Capability::InfoMenu,
    Capability::ConfiguredName,
];

// ── DeviceSession ────────────────────────────────────────────────────

/// One configured box, as seen by the accessory host.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Owns the cached state,
/// the channel registry, and the single poll task. Commands route
/// directly to HTTP calls and may interleave with a poll tick; cached
/// state is read through an atomic snapshot, so a rare stale read is
/// tolerated rather than locked away.
#[derive(Clone)]
pub struct DeviceSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: DeviceConfig,
    client: OpenWebifClient,
    store: Box<dyn PersistenceStore>,
    cached: ArcSwap<CachedState>,
    registry: StdMutex<ChannelRegistry>,
    identity: OnceLock<DeviceIdentity>,
    info_menu_shown: AtomicBool,
    sync_state: watch::Sender<SyncState>,
    update_tx: broadcast::Sender<StateUpdate>,
    last_contact: watch::Sender<Option<DateTime<Utc>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl DeviceSession {
    /// Create a session from configuration. Does NOT poll -- call
    /// [`start()`](Self::start) once the host has finished launching.
    pub fn new(config: DeviceConfig, store: Box<dyn PersistenceStore>) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
        };
        let client = OpenWebifClient::new(&config.endpoint, &transport)?;
        Ok(Self::with_client(config, store, client))
    }

    /// Create a session around a pre-built client.
    ///
    /// Used by tests to point the session at a mock server.
    pub fn with_client(
        config: DeviceConfig,
        store: Box<dyn PersistenceStore>,
        client: OpenWebifClient,
    ) -> Self {
        let registry = ChannelRegistry::load(&config.channels, store.as_ref());
        let (sync_state, _) = watch::channel(SyncState::Unknown);
        let (update_tx, _) = broadcast::channel(UPDATE_CHANNEL_SIZE);
        let (last_contact, _) = watch::channel(None);

        Self {
            inner: Arc::new(SessionInner {
                config,
                client,
                store,
                cached: ArcSwap::from_pointee(CachedState::default()),
                registry: StdMutex::new(registry),
                identity: OnceLock::new(),
                info_menu_shown: AtomicBool::new(false),
                sync_state,
                update_tx,
                last_contact,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The device display name.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Access the session configuration.
    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Begin polling. The first tick fires immediately.
    pub async fn start(&self) {
        let session = self.clone();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(poll_task(session, cancel));
        self.inner.task_handles.lock().await.push(handle);
        info!(device = %self.inner.config.name, "session started");
    }

    /// Stop polling and join the background task.
    ///
    /// An in-flight HTTP round trip is allowed to complete; nothing is
    /// aborted mid-request.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!(device = %self.inner.config.name, "session shut down");
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// One poll cycle.
    ///
    /// In `Unknown` state this attempts the one-time info/catalog fetch
    /// first; a failure leaves the session offline and is retried flat
    /// on the next tick. Once `Tracking`, a failed status fetch keeps
    /// the last known state -- the cache is only ever replaced on
    /// success.
    pub(crate) async fn poll_once(&self) {
        if *self.inner.sync_state.borrow() == SyncState::Unknown {
            if let Err(e) = self.fetch_device_catalog().await {
                warn!(
                    device = %self.inner.config.name,
                    error = %e,
                    "device info fetch failed, box still offline"
                );
                return;
            }
        }

        if let Err(e) = self.refresh_status().await {
            warn!(
                device = %self.inner.config.name,
                error = %e,
                "status poll failed, keeping last known state"
            );
        }
    }

    /// One-time metadata + channel-list fetch; transitions to Tracking.
    async fn fetch_device_catalog(&self) -> Result<(), CoreError> {
        let (info_res, services_res) = tokio::join!(
            self.inner.client.device_info(),
            self.inner.client.all_services(),
        );
        let info = info_res?;
        let services = services_res?;

        let identity = DeviceIdentity::from_device_info(&info, &self.inner.config.identity);
        info!(
            device = %self.inner.config.name,
            manufacturer = %identity.manufacturer,
            model = %identity.model,
            firmware = %identity.firmware_revision,
            kernel = %identity.kernel_version,
            chipset = %identity.chipset,
            "device online"
        );
        let _ = self.inner.identity.set(identity);

        // Best-effort channel cache; a write failure never stops tracking.
        match serde_json::to_string_pretty(&services) {
            Ok(raw) => {
                let written = self
                    .inner
                    .store
                    .set(CHANNEL_CACHE_KEY, &raw)
                    .and_then(|()| self.inner.store.flush());
                if let Err(e) = written {
                    warn!(device = %self.inner.config.name, error = %e, "could not cache channel list");
                }
            }
            Err(e) => {
                warn!(device = %self.inner.config.name, error = %e, "could not serialize channel list");
            }
        }

        self.inner.sync_state.send_replace(SyncState::Tracking);
        Ok(())
    }

    /// Fetch current status, emit per-field change notifications, and
    /// replace the cached snapshot wholesale.
    async fn refresh_status(&self) -> Result<(), CoreError> {
        let status = DeviceStatus::from(self.inner.client.status_info().await?);
        let channel_identifier = self.registry().identifier_for(&status.channel_reference);
        let new = CachedState {
            status,
            channel_identifier,
        };

        let old = self.inner.cached.load_full();
        if new.status.powered != old.status.powered {
            let _ = self.inner.update_tx.send(StateUpdate::Power(new.status.powered));
        }
        if new.channel_identifier != old.channel_identifier {
            let _ = self
                .inner
                .update_tx
                .send(StateUpdate::ActiveChannel(new.channel_identifier));
        }
        if new.status.muted != old.status.muted {
            let _ = self.inner.update_tx.send(StateUpdate::Mute(new.status.muted));
        }
        if new.status.volume != old.status.volume {
            let _ = self.inner.update_tx.send(StateUpdate::Volume(new.status.volume));
        }

        debug!(
            device = %self.inner.config.name,
            powered = new.status.powered,
            channel = %new.status.channel_name,
            identifier = new.channel_identifier,
            volume = new.status.volume,
            "status refreshed"
        );

        self.inner.cached.store(Arc::new(new));
        self.inner.last_contact.send_replace(Some(Utc::now()));
        Ok(())
    }

    // ── Command execution ────────────────────────────────────────────

    /// Execute a command against the box.
    ///
    /// Every operation except power-on is a success no-op while the box
    /// is known to be in standby.
    pub async fn execute(&self, cmd: Command) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::SessionClosed);
        }
        self.dispatch(cmd).await
    }

    async fn dispatch(&self, cmd: Command) -> Result<(), CoreError> {
        let cached = self.inner.cached.load_full();
        let powered = cached.status.powered;

        match cmd {
            Command::SetPower(on) => {
                if on == powered {
                    return Ok(());
                }
                let action = if on {
                    PowerAction::Wakeup
                } else {
                    PowerAction::Standby
                };
                self.inner.client.set_power_state(action).await?;
                info!(device = %self.inner.config.name, on, "power state set");
                Ok(())
            }

            Command::SetMute(muted) => {
                // The device only has a toggle; send it only when the
                // requested state differs from what we last observed.
                if !powered || muted == cached.status.muted {
                    return Ok(());
                }
                self.inner.client.toggle_mute().await?;
                info!(device = %self.inner.config.name, muted, "mute toggled");
                Ok(())
            }

            Command::SetVolume(level) => {
                if !powered {
                    return Ok(());
                }
                // The box misreports at the extremes; 0 and 100 fall
                // back to the last confirmed level.
                let level = if level == 0 || level == 100 {
                    cached.status.volume
                } else {
                    level
                };
                self.inner.client.set_volume(level).await?;
                info!(device = %self.inner.config.name, level, "volume set");
                Ok(())
            }

            Command::SetChannel { identifier } => {
                let reference = self.registry().entry(identifier)?.reference.clone();
                if !powered {
                    return Ok(());
                }
                self.inner.client.zap(&reference).await?;
                info!(device = %self.inner.config.name, identifier, reference, "channel set");
                Ok(())
            }

            Command::RemoteKey(key) => {
                if !powered {
                    return Ok(());
                }
                let code = key.code(self.inner.config.switch_info_menu);
                self.inner.client.send_remote_code(code).await?;
                Ok(())
            }

            Command::VolumeStep(step) => {
                if !powered {
                    return Ok(());
                }
                self.inner.client.send_remote_code(step.code()).await?;
                Ok(())
            }

            Command::InfoMenu(action) => {
                if !powered {
                    return Ok(());
                }
                let code = match action {
                    InfoMenuAction::Show => {
                        let shown = self.inner.info_menu_shown.load(Ordering::Relaxed);
                        self.inner.info_menu_shown.store(!shown, Ordering::Relaxed);
                        if shown {
                            EXIT_CODE
                        } else if self.inner.config.switch_info_menu {
                            MENU_CODE
                        } else {
                            INFO_CODE
                        }
                    }
                    InfoMenuAction::Hide => {
                        self.inner.info_menu_shown.store(false, Ordering::Relaxed);
                        EXIT_CODE
                    }
                };
                self.inner.client.send_remote_code(code).await?;
                Ok(())
            }
        }
    }

    // ── Capability surface ───────────────────────────────────────────

    /// The fixed capability table for registration.
    pub fn capabilities(&self) -> &'static [Capability] {
        &CAPABILITIES
    }

    /// How the host should surface the volume level.
    pub fn volume_display(&self) -> VolumeDisplay {
        self.inner.config.volume_display
    }

    /// Read a capability value with a fresh status round trip.
    ///
    /// Failures surface to the caller as a failed get; the cached
    /// snapshot is not touched.
    pub async fn read(&self, capability: Capability) -> Result<CapabilityValue, CoreError> {
        match capability {
            Capability::Power => Ok(CapabilityValue::Power(self.live_status().await?.powered)),
            Capability::Volume => Ok(CapabilityValue::Volume(self.live_status().await?.volume)),
            Capability::Mute => Ok(CapabilityValue::Mute(self.live_status().await?.muted)),
            Capability::ActiveChannel => {
                let status = self.live_status().await?;
                let identifier = self.registry().identifier_for(&status.channel_reference);
                Ok(CapabilityValue::ActiveChannel(identifier))
            }
            Capability::RemoteKey | Capability::InfoMenu | Capability::ConfiguredName => {
                Err(CoreError::Unsupported {
                    operation: "read of a write-only capability".into(),
                })
            }
        }
    }

    async fn live_status(&self) -> Result<DeviceStatus, CoreError> {
        Ok(DeviceStatus::from(self.inner.client.status_info().await?))
    }

    /// Rename a configured channel; the new name persists immediately.
    pub fn rename_channel(&self, reference: &str, name: &str) -> Result<(), CoreError> {
        self.registry()
            .rename(reference, name, self.inner.store.as_ref())?;
        info!(device = %self.inner.config.name, reference, name, "channel renamed");
        Ok(())
    }

    // ── State observation ────────────────────────────────────────────

    /// The last confirmed snapshot.
    pub fn cached(&self) -> Arc<CachedState> {
        self.inner.cached.load_full()
    }

    /// Subscribe to per-field change notifications.
    pub fn updates(&self) -> broadcast::Receiver<StateUpdate> {
        self.inner.update_tx.subscribe()
    }

    /// Subscribe to synchronizer state changes.
    pub fn sync_state(&self) -> watch::Receiver<SyncState> {
        self.inner.sync_state.subscribe()
    }

    /// Device metadata, available once the box has been reached.
    pub fn identity(&self) -> Option<DeviceIdentity> {
        self.inner.identity.get().cloned()
    }

    /// The configured channels, renames applied.
    pub fn channels(&self) -> Vec<ChannelEntry> {
        self.registry().entries().to_vec()
    }

    /// When the box last answered a status poll.
    pub fn last_contact(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_contact.borrow()
    }

    fn registry(&self) -> MutexGuard<'_, ChannelRegistry> {
        self.inner.registry.lock().expect("registry lock poisoned")
    }
}

// ── Background task ──────────────────────────────────────────────────

/// Drive the poll loop until cancelled.
///
/// Each tick body is awaited inline, so a round trip slower than the
/// interval delays the next tick instead of overlapping it.
async fn poll_task(session: DeviceSession, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(session.inner.config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => session.poll_once().await,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::sync::broadcast::error::TryRecvError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::command::{RemoteKey, VolumeStep};
    use crate::config::ChannelDef;
    use crate::persist::{JsonFileStore, MemoryStore};

    use openwebif_api::DeviceEndpoint;

    fn test_config() -> DeviceConfig {
        let mut config = DeviceConfig::new("Living Room", DeviceEndpoint::new("127.0.0.1", 80));
        config.channels = vec![
            ChannelDef {
                name: "First".into(),
                reference: "ref1".into(),
            },
            ChannelDef {
                name: "Second".into(),
                reference: "ref2".into(),
            },
        ];
        config
    }

    fn session_for(server: &MockServer, config: DeviceConfig) -> DeviceSession {
        let client = OpenWebifClient::with_client(
            reqwest::Client::new(),
            server.uri().parse().expect("mock server URI"),
        );
        DeviceSession::with_client(config, Box::new(MemoryStore::new()), client)
    }

    fn status_body(in_standby: &str, muted: bool, volume: u8, reference: &str) -> serde_json::Value {
        json!({
            "inStandby": in_standby,
            "muted": muted,
            "volume": volume,
            "currservice_station": "Station",
            "currservice_name": "Programme",
            "currservice_serviceref": reference,
        })
    }

    async fn mount_catalog(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/deviceinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "brand": "Vu+",
                "model": "duo4k",
                "webifver": "1.4.8",
                "enigmaver": "2021-04-05",
                "kernelver": "4.1.45",
                "chipset": "bcm7444s",
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/getallservices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": true,
                "services": [{
                    "servicename": "Favourites (TV)",
                    "subservices": [
                        { "servicename": "First", "servicereference": "ref1" },
                        { "servicename": "Second", "servicereference": "ref2" },
                    ],
                }],
            })))
            .mount(server)
            .await;
    }

    async fn mount_status(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/api/statusinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    /// Catalog + one status poll, leaving the session Tracking with the
    /// given cached state.
    async fn tracked_session(
        server: &MockServer,
        config: DeviceConfig,
        status: serde_json::Value,
    ) -> DeviceSession {
        mount_catalog(server).await;
        mount_status(server, status).await;
        let session = session_for(server, config);
        session.poll_once().await;
        assert_eq!(*session.sync_state().borrow(), SyncState::Tracking);
        session
    }

    // ── Synchronizer ─────────────────────────────────────────────────

    #[tokio::test]
    async fn first_poll_reconciles_and_notifies() {
        let server = MockServer::start().await;
        mount_catalog(&server).await;
        mount_status(&server, status_body("false", true, 45, "ref2")).await;

        let session = session_for(&server, test_config());
        let mut updates = session.updates();

        session.poll_once().await;

        let cached = session.cached();
        assert!(cached.status.powered);
        assert!(cached.status.muted);
        assert_eq!(cached.status.volume, 45);
        assert_eq!(cached.channel_identifier, 1);

        assert_eq!(updates.try_recv().expect("update"), StateUpdate::Power(true));
        assert_eq!(
            updates.try_recv().expect("update"),
            StateUpdate::ActiveChannel(1)
        );
        assert_eq!(updates.try_recv().expect("update"), StateUpdate::Mute(true));
        assert_eq!(
            updates.try_recv().expect("update"),
            StateUpdate::Volume(45)
        );
        assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));
        assert!(session.last_contact().is_some());
    }

    #[tokio::test]
    async fn unchanged_poll_emits_nothing() {
        let server = MockServer::start().await;
        let session = tracked_session(
            &server,
            test_config(),
            status_body("false", false, 45, "ref1"),
        )
        .await;

        let mut updates = session.updates();
        session.poll_once().await;

        assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn failed_polls_keep_last_known_state() {
        let server = MockServer::start().await;
        let session = tracked_session(
            &server,
            test_config(),
            status_body("false", false, 45, "ref2"),
        )
        .await;

        // Device becomes unreachable: every endpoint now 404s.
        server.reset().await;
        let mut updates = session.updates();

        session.poll_once().await;
        session.poll_once().await;

        let cached = session.cached();
        assert!(cached.status.powered);
        assert_eq!(cached.status.volume, 45);
        assert_eq!(cached.channel_identifier, 1);
        assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(*session.sync_state().borrow(), SyncState::Tracking);
    }

    #[tokio::test]
    async fn unknown_reference_maps_to_identifier_zero() {
        let server = MockServer::start().await;
        let session = tracked_session(
            &server,
            test_config(),
            status_body("false", false, 10, "1:0:0:0:0:0:0:0:0:0:"),
        )
        .await;

        assert_eq!(session.cached().channel_identifier, 0);
    }

    #[tokio::test]
    async fn catalog_failure_stays_unknown() {
        let server = MockServer::start().await;
        let session = session_for(&server, test_config());
        let mut updates = session.updates();

        session.poll_once().await;
        session.poll_once().await;

        assert_eq!(*session.sync_state().borrow(), SyncState::Unknown);
        assert_eq!(session.cached().as_ref(), &CachedState::default());
        assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn catalog_fetch_caches_channel_list_and_identity() {
        let server = MockServer::start().await;
        mount_catalog(&server).await;
        mount_status(&server, status_body("true", false, 20, "")).await;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::for_device(dir.path(), "127.0.0.1").expect("store");
        let client = OpenWebifClient::with_client(
            reqwest::Client::new(),
            server.uri().parse().expect("mock server URI"),
        );
        let session = DeviceSession::with_client(test_config(), Box::new(store), client);

        session.poll_once().await;

        let cached = std::fs::read_to_string(dir.path().join("channels_127001")).expect("cache");
        assert!(cached.contains("Favourites (TV)"));

        let identity = session.identity().expect("identity");
        assert_eq!(identity.manufacturer, "Vu+");
        assert_eq!(identity.model, "duo4k");
    }

    #[tokio::test]
    async fn identity_overrides_win_over_device_report() {
        let server = MockServer::start().await;
        let mut config = test_config();
        config.identity.manufacturer = Some("Custom Brand".into());

        let session =
            tracked_session(&server, config, status_body("true", false, 0, "")).await;

        assert_eq!(
            session.identity().expect("identity").manufacturer,
            "Custom Brand"
        );
    }

    // ── Dispatcher ───────────────────────────────────────────────────

    #[tokio::test]
    async fn volume_boundary_values_rewritten_to_cached() {
        let server = MockServer::start().await;
        let session = tracked_session(
            &server,
            test_config(),
            status_body("false", false, 45, "ref1"),
        )
        .await;

        Mock::given(method("GET"))
            .and(path("/api/vol"))
            .and(query_param("set", "set45"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/vol"))
            .and(query_param("set", "set30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(1)
            .mount(&server)
            .await;

        session.execute(Command::SetVolume(0)).await.expect("set 0");
        session
            .execute(Command::SetVolume(100))
            .await
            .expect("set 100");
        session
            .execute(Command::SetVolume(30))
            .await
            .expect("set 30");
    }

    #[tokio::test]
    async fn mute_set_is_noop_when_state_matches() {
        let server = MockServer::start().await;
        let session = tracked_session(
            &server,
            test_config(),
            status_body("false", true, 45, "ref1"),
        )
        .await;

        Mock::given(method("GET"))
            .and(path("/api/vol"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(0)
            .mount(&server)
            .await;

        session.execute(Command::SetMute(true)).await.expect("mute");
    }

    #[tokio::test]
    async fn mute_set_toggles_when_state_differs() {
        let server = MockServer::start().await;
        let session = tracked_session(
            &server,
            test_config(),
            status_body("false", true, 45, "ref1"),
        )
        .await;

        Mock::given(method("GET"))
            .and(path("/api/vol"))
            .and(query_param("set", "mute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(1)
            .mount(&server)
            .await;

        session
            .execute(Command::SetMute(false))
            .await
            .expect("unmute");
    }

    #[tokio::test]
    async fn standby_gates_everything_but_power_on() {
        let server = MockServer::start().await;
        let session =
            tracked_session(&server, test_config(), status_body("true", false, 20, "")).await;

        // None of these may touch the device while it is off.
        Mock::given(method("GET"))
            .and(path("/api/remotecontrol"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/zap"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/vol"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(0)
            .mount(&server)
            .await;

        session
            .execute(Command::RemoteKey(RemoteKey::Select))
            .await
            .expect("remote key");
        session
            .execute(Command::SetChannel { identifier: 1 })
            .await
            .expect("channel");
        session
            .execute(Command::SetVolume(30))
            .await
            .expect("volume");
        session
            .execute(Command::VolumeStep(VolumeStep::Up))
            .await
            .expect("volume step");
        session
            .execute(Command::InfoMenu(InfoMenuAction::Show))
            .await
            .expect("info menu");

        // Power-on is the one allowed call.
        Mock::given(method("GET"))
            .and(path("/api/powerstate"))
            .and(query_param("newstate", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(1)
            .mount(&server)
            .await;
        session
            .execute(Command::SetPower(true))
            .await
            .expect("power on");

        // Power-off while already off is skipped entirely.
        session
            .execute(Command::SetPower(false))
            .await
            .expect("redundant power off");
    }

    #[tokio::test]
    async fn channel_set_zaps_resolved_reference() {
        let server = MockServer::start().await;
        let session = tracked_session(
            &server,
            test_config(),
            status_body("false", false, 45, "ref1"),
        )
        .await;

        Mock::given(method("GET"))
            .and(path("/api/zap"))
            .and(query_param("sRef", "ref2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(1)
            .mount(&server)
            .await;

        session
            .execute(Command::SetChannel { identifier: 1 })
            .await
            .expect("zap");
    }

    #[tokio::test]
    async fn channel_set_rejects_out_of_range_identifier() {
        let server = MockServer::start().await;
        let session = tracked_session(
            &server,
            test_config(),
            status_body("false", false, 45, "ref1"),
        )
        .await;

        let result = session.execute(Command::SetChannel { identifier: 7 }).await;

        match result {
            Err(CoreError::ChannelOutOfRange { identifier, count }) => {
                assert_eq!(identifier, 7);
                assert_eq!(count, 2);
            }
            other => panic!("expected ChannelOutOfRange, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn info_menu_show_alternates_codes() {
        let server = MockServer::start().await;
        let session = tracked_session(
            &server,
            test_config(),
            status_body("false", false, 45, "ref1"),
        )
        .await;

        Mock::given(method("GET"))
            .and(path("/api/remotecontrol"))
            .and(query_param("command", "358"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/remotecontrol"))
            .and(query_param("command", "174"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(1)
            .mount(&server)
            .await;

        // show → dismiss → show again
        session
            .execute(Command::InfoMenu(InfoMenuAction::Show))
            .await
            .expect("show");
        session
            .execute(Command::InfoMenu(InfoMenuAction::Show))
            .await
            .expect("dismiss");
        session
            .execute(Command::InfoMenu(InfoMenuAction::Show))
            .await
            .expect("show again");
    }

    #[tokio::test]
    async fn info_menu_hide_resets_overlay_flag() {
        let server = MockServer::start().await;
        let session = tracked_session(
            &server,
            test_config(),
            status_body("false", false, 45, "ref1"),
        )
        .await;

        Mock::given(method("GET"))
            .and(path("/api/remotecontrol"))
            .and(query_param("command", "358"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/remotecontrol"))
            .and(query_param("command", "174"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(1)
            .mount(&server)
            .await;

        session
            .execute(Command::InfoMenu(InfoMenuAction::Show))
            .await
            .expect("show");
        session
            .execute(Command::InfoMenu(InfoMenuAction::Hide))
            .await
            .expect("hide");
        // After an explicit hide the next show must open, not dismiss.
        session
            .execute(Command::InfoMenu(InfoMenuAction::Show))
            .await
            .expect("show again");
    }

    #[tokio::test]
    async fn information_key_honours_menu_switch() {
        let server = MockServer::start().await;
        let mut config = test_config();
        config.switch_info_menu = true;

        let session =
            tracked_session(&server, config, status_body("false", false, 45, "ref1")).await;

        Mock::given(method("GET"))
            .and(path("/api/remotecontrol"))
            .and(query_param("command", "358"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
            .expect(1)
            .mount(&server)
            .await;

        session
            .execute(Command::RemoteKey(RemoteKey::Information))
            .await
            .expect("information key");
    }

    // ── Capability surface ───────────────────────────────────────────

    #[tokio::test]
    async fn read_fetches_live_values() {
        let server = MockServer::start().await;
        let session = tracked_session(
            &server,
            test_config(),
            status_body("false", true, 45, "ref2"),
        )
        .await;

        assert_eq!(
            session.read(Capability::Power).await.expect("power"),
            CapabilityValue::Power(true)
        );
        assert_eq!(
            session.read(Capability::Volume).await.expect("volume"),
            CapabilityValue::Volume(45)
        );
        assert_eq!(
            session.read(Capability::Mute).await.expect("mute"),
            CapabilityValue::Mute(true)
        );
        assert_eq!(
            session
                .read(Capability::ActiveChannel)
                .await
                .expect("channel"),
            CapabilityValue::ActiveChannel(1)
        );
    }

    #[tokio::test]
    async fn read_of_write_only_capability_is_rejected() {
        let server = MockServer::start().await;
        let session = session_for(&server, test_config());

        let result = session.read(Capability::RemoteKey).await;
        assert!(matches!(result, Err(CoreError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn read_failure_surfaces_without_touching_cache() {
        let server = MockServer::start().await;
        let session = tracked_session(
            &server,
            test_config(),
            status_body("false", false, 45, "ref1"),
        )
        .await;

        server.reset().await;

        let result = session.read(Capability::Power).await;
        assert!(result.is_err());
        assert_eq!(session.cached().status.volume, 45);
    }

    #[tokio::test]
    async fn rename_updates_channel_listing() {
        let server = MockServer::start().await;
        let session = session_for(&server, test_config());

        session.rename_channel("ref1", "Custom").expect("rename");

        let channels = session.channels();
        assert_eq!(channels[0].display_name, "Custom");
        assert_eq!(channels[1].display_name, "Second");
    }

    #[tokio::test]
    async fn execute_after_shutdown_is_rejected() {
        let server = MockServer::start().await;
        let session = session_for(&server, test_config());

        session.shutdown().await;

        let result = session.execute(Command::SetPower(true)).await;
        assert!(matches!(result, Err(CoreError::SessionClosed)));
    }
}
