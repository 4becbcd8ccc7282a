use super::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn default_window_is_five_hundred_ms() {
    assert_eq!(Debouncer::default().window(), ms(500));
}

#[test]
fn nothing_fires_before_window_elapses() {
    let start = Instant::now();
    let mut debouncer = Debouncer::default();
    debouncer.push(PathBuf::from("/a.png"), start);

    assert!(debouncer.poll(start + ms(499)).is_empty());
    assert_eq!(debouncer.poll(start + ms(500)), vec![PathBuf::from("/a.png")]);
    assert!(debouncer.is_empty());
}

#[test]
fn burst_for_one_path_fires_once() {
    let start = Instant::now();
    let mut debouncer = Debouncer::default();
    for i in 0..10 {
        debouncer.push(PathBuf::from("/a.png"), start + ms(i * 100));
    }
    assert_eq!(debouncer.len(), 1);

    // last push at 900ms, so the trailing window ends at 1400ms
    assert!(debouncer.poll(start + ms(1399)).is_empty());
    assert_eq!(debouncer.poll(start + ms(1400)).len(), 1);
    assert!(debouncer.poll(start + ms(5000)).is_empty());
}

#[test]
fn paths_are_debounced_independently() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(ms(100));
    debouncer.push(PathBuf::from("/b.png"), start);
    debouncer.push(PathBuf::from("/a.png"), start + ms(50));

    assert_eq!(debouncer.next_deadline(), Some(start + ms(100)));
    assert_eq!(debouncer.poll(start + ms(100)), vec![PathBuf::from("/b.png")]);
    assert!(debouncer.is_pending(Path::new("/a.png")));
    assert_eq!(debouncer.poll(start + ms(150)), vec![PathBuf::from("/a.png")]);
    assert_eq!(debouncer.next_deadline(), None);
}

#[test]
fn ready_paths_come_back_sorted() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(ms(10));
    debouncer.push(PathBuf::from("/c.png"), start);
    debouncer.push(PathBuf::from("/a.png"), start);
    debouncer.push(PathBuf::from("/b.png"), start);

    assert_eq!(
        debouncer.poll(start + ms(10)),
        vec![
            PathBuf::from("/a.png"),
            PathBuf::from("/b.png"),
            PathBuf::from("/c.png")
        ]
    );
}

#[test]
fn cancel_drops_pending_path() {
    let start = Instant::now();
    let mut debouncer = Debouncer::default();
    debouncer.push(PathBuf::from("/a.png"), start);
    assert!(debouncer.cancel(Path::new("/a.png")));
    assert!(!debouncer.cancel(Path::new("/a.png")));
    assert!(debouncer.poll(start + ms(1000)).is_empty());
}
