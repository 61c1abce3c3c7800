//! Integration tests for the widget service.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tessera::{
    AreaQuery, PageRequest, ServiceConfig, StoreError, Widget, WidgetError, WidgetId,
    WidgetRequest, WidgetService,
};

fn service() -> WidgetService {
    WidgetService::in_memory(ServiceConfig::default()).unwrap()
}

fn unit(z: Option<i32>) -> WidgetRequest {
    let request = WidgetRequest::new(0, 0, 1.0, 1.0);
    match z {
        Some(z) => request.with_z(z),
        None => request,
    }
}

fn all_widgets(service: &WidgetService) -> Vec<Widget> {
    service
        .list_widgets(Some(PageRequest::new(0, 500).unwrap()), &AreaQuery::default())
        .unwrap()
        .records
}

fn assert_unique(widgets: &[Widget]) {
    let zs: HashSet<i32> = widgets.iter().map(|w| w.z.unwrap()).collect();
    assert_eq!(zs.len(), widgets.len(), "duplicate z-index in {widgets:?}");
}

fn assert_unique_z(service: &WidgetService) {
    assert_unique(&all_widgets(service));
}

fn is_rejected(err: &WidgetError) -> bool {
    matches!(err, WidgetError::Store(StoreError::Rejected { .. }))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn z_indices_assigned_on_top() {
    let service = service();
    let zs: Vec<_> = (0..4)
        .map(|_| service.create_widget(unit(None)).unwrap().z)
        .collect();
    assert_eq!(zs, vec![Some(0), Some(1), Some(2), Some(3)]);
}

#[test]
fn collision_pushes_occupants_up() {
    let service = service();
    let a = service.create_widget(unit(Some(1))).unwrap();
    let b = service.create_widget(unit(Some(2))).unwrap();
    let c = service.create_widget(unit(Some(1))).unwrap();

    let z = |w: &Widget| service.get_widget(w.id.as_ref().unwrap()).unwrap().z;
    assert_eq!((z(&c), z(&a), z(&b)), (Some(1), Some(2), Some(3)));
}

#[test]
fn shifted_widgets_are_restamped() {
    let service = service();
    let a = service.create_widget(unit(Some(0))).unwrap();
    service.create_widget(unit(Some(0))).unwrap();

    let shifted = service.get_widget(a.id.as_ref().unwrap()).unwrap();
    assert_eq!(shifted.z, Some(1));
    assert!(shifted.last_modified >= a.last_modified);
}

#[test]
fn z_indices_stay_unique_over_mixed_operations() {
    init_tracing();
    let service = service();
    let mut rng = StdRng::seed_from_u64(0x2545_f491_4f6c_dd1d);
    let mut ids: Vec<WidgetId> = Vec::new();

    for _ in 0..300 {
        match rng.gen_range(0..4) {
            0 | 1 => {
                let z = rng.gen_bool(0.7).then(|| rng.gen_range(-5..15));
                ids.push(service.create_widget(unit(z)).unwrap().id.unwrap());
            }
            2 if !ids.is_empty() => {
                let id = ids[rng.gen_range(0..ids.len())];
                let z = rng.gen_bool(0.5).then(|| rng.gen_range(0..20));
                service.modify_widget(&id, unit(z)).unwrap();
            }
            3 if !ids.is_empty() => {
                let id = ids.swap_remove(rng.gen_range(0..ids.len()));
                service.delete_widget(&id).unwrap();
            }
            _ => {}
        }
        assert_unique_z(&service);
    }
}

#[test]
fn listing_is_topmost_first_with_paging() {
    let service = service();
    for z in [1, 3, 2] {
        service.create_widget(unit(Some(z))).unwrap();
    }

    let first = service
        .list_widgets(Some(PageRequest::new(0, 2).unwrap()), &AreaQuery::default())
        .unwrap();
    let zs: Vec<_> = first.records.iter().map(|w| w.z).collect();
    assert_eq!(zs, vec![Some(3), Some(2)]);
    assert_eq!(first.total, 3);

    let second = service
        .list_widgets(Some(PageRequest::new(1, 2).unwrap()), &AreaQuery::default())
        .unwrap();
    assert_eq!(second.records.len(), 1);
    assert_eq!(second.records[0].z, Some(1));

    let beyond = service
        .list_widgets(Some(PageRequest::new(5, 2).unwrap()), &AreaQuery::default())
        .unwrap();
    assert!(beyond.records.is_empty());
    assert_eq!(beyond.total, 3);
}

#[test]
fn area_filter_keeps_contained_widgets() {
    let service = service();
    let inside = service
        .create_widget(WidgetRequest::new(10, 10, 5.0, 5.0))
        .unwrap();
    service
        .create_widget(WidgetRequest::new(100, 100, 5.0, 5.0))
        .unwrap();

    let page = service
        .list_widgets(None, &AreaQuery::new(0.0, 0.0, 15.0, 15.0))
        .unwrap();
    assert_eq!(page.records, vec![inside]);

    let overlapping = service
        .list_widgets(None, &AreaQuery::new(10.0, 10.0, 25.0, 25.0))
        .unwrap();
    assert!(overlapping.records.is_empty());
    assert_eq!(overlapping.total, 0);
}

#[test]
fn widget_json_round_trip() {
    let service = service();
    let created = service
        .create_widget(WidgetRequest::new(1, 2, 3.5, 4.5).with_z(9))
        .unwrap();

    let json = serde_json::to_string(&created).unwrap();
    let parsed: Widget = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, created);

    let request: WidgetRequest =
        serde_json::from_str(r#"{"x":1,"y":2,"z":3,"width":4.0,"height":5.0}"#).unwrap();
    assert_eq!(request, WidgetRequest::new(1, 2, 4.0, 5.0).with_z(3));

    let page: PageRequest = serde_json::from_str(r#"{"page":2,"perPage":25}"#).unwrap();
    assert_eq!((page.page(), page.per_page()), (2, 25));
    assert!(serde_json::from_str::<PageRequest>(r#"{"perPage":501}"#).is_err());
}

#[test]
fn missing_widgets_are_not_found() {
    let service = service();
    let id = WidgetId::new();

    assert!(service.get_widget(&id).is_none());
    assert!(service.modify_widget(&id, unit(None)).unwrap_err().is_not_found());
    assert!(service.delete_widget(&id).unwrap_err().is_not_found());
}

#[test]
fn concurrent_creates_get_distinct_z() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;

    let service = Arc::new(service());
    thread::scope(|scope| {
        for _ in 0..THREADS {
            let service = Arc::clone(&service);
            scope.spawn(move || {
                for _ in 0..PER_THREAD {
                    service.create_widget(unit(None)).unwrap();
                }
            });
        }
    });

    let mut zs: Vec<i32> = all_widgets(&service).iter().map(|w| w.z.unwrap()).collect();
    zs.sort_unstable();
    let expected: Vec<i32> = (0..(THREADS * PER_THREAD) as i32).collect();
    assert_eq!(zs, expected);
}

#[test]
fn concurrent_collisions_stay_unique() {
    let service = Arc::new(service());
    thread::scope(|scope| {
        for _ in 0..4 {
            let service = Arc::clone(&service);
            scope.spawn(move || {
                for _ in 0..25 {
                    service.create_widget(unit(Some(0))).unwrap();
                }
            });
        }
    });

    assert_eq!(all_widgets(&service).len(), 100);
    assert_unique_z(&service);
}

#[test]
fn readers_never_see_duplicate_z_during_shifts() {
    const WRITERS: usize = 4;
    const READERS: usize = 4;
    const PER_WRITER: usize = 50;

    let service = Arc::new(service());
    let writing = AtomicBool::new(true);
    let finished_writers = AtomicUsize::new(0);
    let snapshots = AtomicUsize::new(0);

    thread::scope(|scope| {
        for _ in 0..WRITERS {
            let service = Arc::clone(&service);
            let (writing, finished_writers) = (&writing, &finished_writers);
            scope.spawn(move || {
                for i in 0..PER_WRITER {
                    // Alternate the bottom and a mid-stack slot so every write shifts.
                    let z = if i % 2 == 0 { 0 } else { (i / 2) as i32 };
                    service.create_widget(unit(Some(z))).unwrap();
                }
                if finished_writers.fetch_add(1, Ordering::SeqCst) + 1 == WRITERS {
                    writing.store(false, Ordering::SeqCst);
                }
            });
        }

        for _ in 0..READERS {
            let service = Arc::clone(&service);
            let (writing, snapshots) = (&writing, &snapshots);
            scope.spawn(move || loop {
                let still_writing = writing.load(Ordering::SeqCst);
                assert_unique(&all_widgets(&service));
                assert_unique(&service.store().find_all::<Widget>(None));
                snapshots.fetch_add(1, Ordering::Relaxed);
                if !still_writing {
                    break;
                }
            });
        }
    });

    assert!(snapshots.load(Ordering::Relaxed) >= READERS);
    assert_eq!(all_widgets(&service).len(), WRITERS * PER_WRITER);
    assert_unique_z(&service);
}

#[test]
fn z_index_overflow_is_rejected() {
    let service = service();
    let a = service.create_widget(unit(Some(i32::MAX))).unwrap();

    let err = service.create_widget(unit(Some(i32::MAX))).unwrap_err();
    assert!(is_rejected(&err), "{err:?}");
    let err = service.create_widget(unit(None)).unwrap_err();
    assert!(is_rejected(&err), "{err:?}");

    let below = service.create_widget(unit(Some(i32::MAX - 1))).unwrap();
    let err = service.create_widget(unit(Some(i32::MAX - 1))).unwrap_err();
    assert!(is_rejected(&err), "{err:?}");

    assert_eq!(all_widgets(&service).len(), 2);
    assert_eq!(service.get_widget(a.id.as_ref().unwrap()).unwrap().z, Some(i32::MAX));
    assert_eq!(service.get_widget(below.id.as_ref().unwrap()).unwrap().z, Some(i32::MAX - 1));
    assert_unique_z(&service);
}

#[test]
fn invalid_config_is_rejected_on_construction() {
    let mut config = ServiceConfig::default();
    config.pagination.default_per_page = 0;
    assert!(WidgetService::in_memory(config).is_err());
}

#[test]
fn shared_store_across_services() {
    let first = service();
    let second = WidgetService::new(Arc::clone(first.store()), ServiceConfig::default()).unwrap();

    let created = first.create_widget(unit(None)).unwrap();
    assert_eq!(second.get_widget(created.id.as_ref().unwrap()), Some(created));
}
