use super::*;
use tempfile::tempdir;

const WINDOW: Duration = Duration::from_millis(500);

fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbaImage::new(width, height).save(path).unwrap();
}

fn loaded(path: &Path, tile: u32) -> Tileset {
    let mut tileset = Tileset::new("tiles", path, tile, tile).unwrap();
    tileset.load_image().unwrap();
    tileset
}

#[test]
fn references_are_counted() {
    let dir = tempdir().unwrap();
    let image = dir.path().join("tiles.png");
    write_png(&image, 64, 64);

    let mut manager = TilesetManager::without_watcher(WINDOW);
    let id = manager.add_tileset(loaded(&image, 32));
    assert!(manager.add_reference(id));
    assert_eq!(manager.reference_count(id), 2);

    assert!(manager.remove_reference(id).is_none());
    let released = manager.remove_reference(id).unwrap();
    assert_eq!(released.name(), "tiles");
    assert!(manager.is_empty());
    assert_eq!(manager.reference_count(id), 0);
    assert!(!manager.add_reference(id));
}

#[test]
fn image_paths_are_unique_and_sorted() {
    let mut manager = TilesetManager::without_watcher(WINDOW);
    manager.add_tileset(Tileset::new("b", "/maps/b.png", 32, 32).unwrap());
    manager.add_tileset(Tileset::new("a", "/maps/a.png", 32, 32).unwrap());
    manager.add_tileset(Tileset::new("a16", "/maps/a.png", 16, 16).unwrap());

    assert_eq!(
        manager.image_paths(),
        vec![PathBuf::from("/maps/a.png"), PathBuf::from("/maps/b.png")]
    );
}

#[test]
fn change_for_unknown_image_is_ignored() {
    let mut manager = TilesetManager::without_watcher(WINDOW);
    assert!(!manager.file_changed(Path::new("/maps/none.png"), Instant::now()));
    assert!(!manager.has_pending());
}

#[test]
fn resized_image_is_reloaded_after_window() {
    let dir = tempdir().unwrap();
    let image = dir.path().join("tiles.png");
    write_png(&image, 64, 64);

    let mut manager = TilesetManager::without_watcher(WINDOW);
    let id = manager.add_tileset(loaded(&image, 32));

    write_png(&image, 96, 64);
    let start = Instant::now();
    assert!(manager.file_changed(&image, start));
    assert!(manager.file_changed(&image, start + Duration::from_millis(200)));

    assert!(manager.poll(start + Duration::from_millis(600)).is_empty());
    let reloaded = manager.poll(start + Duration::from_millis(700));
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].id, id);
    assert_eq!(reloaded[0].old_grid, TileGrid::new(2, 2));
    assert_eq!(reloaded[0].new_grid, TileGrid::new(3, 2));
    assert!(reloaded[0].grid_changed());
    assert!(!reloaded[0].missing);
    assert_eq!(manager.get(id).unwrap().column_count(), 3);
}

#[test]
fn unchanged_geometry_reports_nothing() {
    let dir = tempdir().unwrap();
    let image = dir.path().join("tiles.png");
    write_png(&image, 64, 64);

    let mut manager = TilesetManager::without_watcher(WINDOW);
    manager.add_tileset(loaded(&image, 32));

    let start = Instant::now();
    manager.file_changed(&image, start);
    assert!(manager.poll(start + WINDOW).is_empty());
}

#[test]
fn every_tileset_sharing_the_image_is_reloaded() {
    let dir = tempdir().unwrap();
    let image = dir.path().join("tiles.png");
    write_png(&image, 64, 64);

    let mut manager = TilesetManager::without_watcher(WINDOW);
    manager.add_tileset(loaded(&image, 32));
    manager.add_tileset(loaded(&image, 16));

    write_png(&image, 128, 64);
    let start = Instant::now();
    manager.file_changed(&image, start);
    let mut grids: Vec<_> = manager
        .poll(start + WINDOW)
        .into_iter()
        .map(|r| r.new_grid)
        .collect();
    grids.sort_by_key(|grid| grid.columns);
    assert_eq!(grids, vec![TileGrid::new(4, 2), TileGrid::new(8, 4)]);
}

#[test]
fn deleted_image_is_reported_missing_once() {
    let dir = tempdir().unwrap();
    let image = dir.path().join("tiles.png");
    write_png(&image, 64, 64);

    let mut manager = TilesetManager::without_watcher(WINDOW);
    let id = manager.add_tileset(loaded(&image, 32));
    std::fs::remove_file(&image).unwrap();

    let start = Instant::now();
    manager.file_changed(&image, start);
    let reloaded = manager.poll(start + WINDOW);
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded[0].missing);
    assert!(!reloaded[0].grid_changed());
    assert!(manager.get(id).unwrap().is_missing());

    manager.file_changed(&image, start + WINDOW);
    assert!(manager.poll(start + WINDOW * 2).is_empty());

    write_png(&image, 64, 64);
    manager.file_changed(&image, start + WINDOW * 2);
    let back = manager.poll(start + WINDOW * 3);
    assert_eq!(back.len(), 1);
    assert!(!back[0].missing);
}

#[test]
fn releasing_last_user_cancels_pending_reload() {
    let dir = tempdir().unwrap();
    let image = dir.path().join("tiles.png");
    write_png(&image, 64, 64);

    let mut manager = TilesetManager::without_watcher(WINDOW);
    let id = manager.add_tileset(loaded(&image, 32));
    manager.file_changed(&image, Instant::now());
    assert!(manager.has_pending());

    manager.remove_reference(id);
    assert!(!manager.has_pending());
    assert_eq!(manager.next_deadline(), None);
}
