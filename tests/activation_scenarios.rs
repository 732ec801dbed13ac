use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use activator::{
    extract_bytes, ActivationError, ActivationEvent, ActivationKind, ActivationSource, Activator,
    Config, Delivery, Event, EventKind, FileItem, FileRef, ImporterFn, ImporterRef, ListenerRole,
    LocalFile, LocalSource, ResolvedBy, Subscribe,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time;

struct Blob {
    name: &'static str,
    bytes: Vec<u8>,
    regular: bool,
    reads: AtomicUsize,
}

impl Blob {
    fn file(name: &'static str, bytes: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            name,
            bytes: bytes.to_vec(),
            regular: true,
            reads: AtomicUsize::new(0),
        })
    }

    fn folder(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            bytes: Vec::new(),
            regular: false,
            reads: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl FileItem for Blob {
    fn name(&self) -> &str {
        self.name
    }

    async fn is_regular_file(&self) -> bool {
        self.regular
    }

    async fn read_all_bytes(&self) -> std::io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.bytes.clone())
    }
}

type Calls = Arc<Mutex<Vec<(Vec<u8>, bool)>>>;

fn recording_importer() -> (ImporterRef, Calls) {
    let calls: Calls = Arc::default();
    let c = Arc::clone(&calls);
    let imp: ImporterRef = ImporterFn::arc("recording", move |payload: Vec<u8>, create_new: bool| {
        let c = Arc::clone(&c);
        async move {
            c.lock().push((payload, create_new));
            Ok::<(), ActivationError>(())
        }
    });
    (imp, calls)
}

fn activator(source: &Arc<LocalSource>) -> Arc<Activator> {
    Activator::builder(Config::default())
        .with_source(Arc::clone(source) as Arc<dyn ActivationSource>)
        .build()
}

#[tokio::test(start_paused = true)]
async fn signal_before_timeout_is_replayed_to_late_reader() {
    let src = LocalSource::arc();
    let act = activator(&src);
    act.capture_once().unwrap();

    time::sleep(Duration::from_millis(100)).await;
    let file: FileRef = Blob::file("blink.hex", b"\x01\x02");
    src.fire(ActivationEvent::file_open(file));

    time::sleep(Duration::from_millis(100)).await;
    let got = act.await_result().await.expect("activation captured");
    assert_eq!(got.kind(), ActivationKind::FileOpen);
    assert_eq!(got.file().unwrap().name(), "blink.hex");

    time::sleep(Duration::from_secs(10)).await;
    assert_eq!(act.arbiter().peek().resolved_by(), Some(ResolvedBy::Signal));
}

#[tokio::test(start_paused = true)]
async fn no_signal_resolves_absent() {
    let src = LocalSource::arc();
    let act = activator(&src);
    act.capture_once().unwrap();

    time::sleep(Duration::from_millis(4000)).await;
    assert!(act.await_result().await.is_none());

    // A late signal is still observed by the capture handler but cannot change the outcome.
    src.fire(ActivationEvent::file_open(Blob::file("late.hex", b"x")));
    assert!(act.await_result().await.is_none());
    assert_eq!(src.listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn live_signal_after_rebind_imports_without_create_new() {
    let src = LocalSource::arc();
    let act = activator(&src);
    act.capture_once().unwrap();
    let (imp, calls) = recording_importer();

    time::sleep(Duration::from_millis(50)).await;
    act.rebind_for_delivery(imp).unwrap();

    time::sleep(Duration::from_millis(10)).await;
    assert_eq!(src.fire(ActivationEvent::file_open(Blob::file("live.hex", b"abc"))), 1);

    let out = act.join_live_delivery().await.unwrap().unwrap();
    assert_eq!(out, Delivery::Imported { bytes: 3 });
    assert_eq!(*calls.lock(), vec![(b"abc".to_vec(), false)]);

    // The capture handler was gone before the signal, so nothing is pending for replay.
    assert_eq!(act.load_if_pending().await.unwrap(), Delivery::NoActivation);
    assert_eq!(calls.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cached_signal_is_replayed_with_create_new_and_no_reregistration() {
    let src = LocalSource::arc();
    let act = activator(&src);
    act.capture_once().unwrap();
    src.fire(ActivationEvent::file_open(Blob::file("cached.hex", b"hex!")));

    let (imp, calls) = recording_importer();
    act.init(imp).await.unwrap();
    assert!(act.has_activation_project());
    let registered = src.listener_count();

    let mut events = act.events();
    let out = act.load_if_pending().await.unwrap();
    assert_eq!(out, Delivery::Imported { bytes: 4 });
    assert_eq!(*calls.lock(), vec![(b"hex!".to_vec(), true)]);

    assert_eq!(src.listener_count(), registered);
    while let Ok(ev) = events.try_recv() {
        assert!(
            !matches!(ev.kind, EventKind::ListenerInstalled | EventKind::ListenerRemoved),
            "replay touched registrations: {:?}",
            ev.kind
        );
    }
}

#[tokio::test(start_paused = true)]
async fn exactly_one_handler_sees_the_signal() {
    let src = LocalSource::arc();
    let act = activator(&src);
    let (imp, calls) = recording_importer();

    act.capture_once().unwrap();
    assert_eq!(src.listener_count(), 1);
    act.rebind_for_delivery(imp).unwrap();
    assert_eq!(src.listener_count(), 1);
    assert_eq!(act.rebinder().installed_role(), Some(ListenerRole::Deliver));

    let ev = ActivationEvent::file_open(Blob::file("once.hex", b"1"));
    assert_eq!(src.fire(ev.clone()), 1);
    assert_eq!(src.fire(ev), 0);

    act.join_live_delivery().await.unwrap().unwrap();
    assert_eq!(calls.lock().len(), 1);
    assert!(!act.arbiter().peek().is_resolved());
}

#[tokio::test]
async fn folder_activation_is_not_read() {
    let folder = Blob::folder("Documents");
    assert!(extract_bytes(&*folder).await.unwrap().is_none());
    assert_eq!(folder.reads.load(Ordering::SeqCst), 0);

    let src = LocalSource::arc();
    let act = activator(&src);
    let (imp, calls) = recording_importer();
    act.capture_once().unwrap();
    src.fire(ActivationEvent::file_open(folder.clone()));
    act.rebind_for_delivery(imp).unwrap();

    assert_eq!(act.load_if_pending().await.unwrap(), Delivery::NotRegularFile);
    assert!(calls.lock().is_empty());
    assert_eq!(folder.reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn local_file_round_trip_through_replay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("program.hex");
    std::fs::write(&path, b":10010000214601360121470136007EFE09D2190140").unwrap();

    let src = LocalSource::arc();
    let act = activator(&src);
    act.capture_once().unwrap();
    src.fire(ActivationEvent::file_open(LocalFile::arc(&path)));

    let (imp, calls) = recording_importer();
    act.init(imp).await.unwrap();
    act.load_if_pending().await.unwrap();

    let calls = calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, std::fs::read(&path).unwrap());
    assert!(calls[0].1);
}

#[tokio::test]
async fn missing_local_file_is_skipped_without_breaking_startup() {
    let dir = tempfile::tempdir().unwrap();
    let src = LocalSource::arc();
    let act = activator(&src);
    act.capture_once().unwrap();
    src.fire(ActivationEvent::file_open(LocalFile::arc(
        dir.path().join("vanished.hex"),
    )));

    let (imp, calls) = recording_importer();
    act.init(imp).await.unwrap();
    // A missing path is not a regular file: rejected before any read.
    assert_eq!(act.load_if_pending().await.unwrap(), Delivery::NotRegularFile);
    assert!(calls.lock().is_empty());
    assert!(act.await_result().await.is_some());
}

struct Collect(Mutex<Vec<EventKind>>);

#[async_trait]
impl Subscribe for Collect {
    async fn on_event(&self, event: &Event) {
        self.0.lock().push(event.kind);
    }

    fn name(&self) -> &'static str {
        "collect"
    }
}

#[tokio::test]
async fn subscribers_observe_the_lifecycle() {
    let src = LocalSource::arc();
    let collect = Arc::new(Collect(Mutex::new(Vec::new())));
    let act = Activator::builder(Config::default())
        .with_source(Arc::clone(&src) as Arc<dyn ActivationSource>)
        .with_subscribers(vec![collect.clone() as Arc<dyn Subscribe>])
        .build();

    act.capture_once().unwrap();
    src.fire(ActivationEvent::file_open(Blob::file("seen.hex", b"12")));
    let (imp, _calls) = recording_importer();
    act.init(imp).await.unwrap();
    act.load_if_pending().await.unwrap();
    act.shutdown().await;

    let seen = collect.0.lock().clone();
    for kind in [
        EventKind::ListenerInstalled,
        EventKind::ActivationCaptured,
        EventKind::ActivationResolved,
        EventKind::ListenerRemoved,
        EventKind::DeliveryStarted,
        EventKind::PayloadExtracted,
        EventKind::ImportCompleted,
    ] {
        assert!(seen.contains(&kind), "missing {kind:?} in {seen:?}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_rebind_and_signal_never_double_delivers() {
    for _ in 0..50 {
        let src = LocalSource::arc();
        let act = activator(&src);
        let (imp, calls) = recording_importer();
        act.capture_once().unwrap();

        let firing = {
            let src = Arc::clone(&src);
            std::thread::spawn(move || {
                src.fire(ActivationEvent::file_open(Blob::file("race.hex", b"r")));
            })
        };
        act.rebind_for_delivery(imp).unwrap();
        firing.join().unwrap();

        let captured = act.arbiter().peek().resolved_by() == Some(ResolvedBy::Signal);
        let delivered = act.join_live_delivery().await.is_some();
        assert!(captured ^ delivered, "captured={captured} delivered={delivered}");
        assert!(src.listener_count() <= 1);

        if captured {
            act.load_if_pending().await.unwrap();
        }
        assert_eq!(calls.lock().len(), 1);
    }
}
