use super::*;

fn table_with_ids(columns: usize, rows: usize) -> TileLayerNameTable {
    let mut table = TileLayerNameTable::new("/tmp/t.tilelayers.xml", columns, rows);
    for id in 0..columns * rows {
        table.set_layer_name(id, &format!("t{id}"));
    }
    table.mark_clean();
    table
}

#[test]
fn new_table_is_empty_and_clean() {
    let table = TileLayerNameTable::new("/tmp/a.tilelayers.xml", 8, 4);
    assert_eq!(table.tile_count(), 32);
    assert!(!table.is_dirty());
    assert_eq!(table.named_tiles().count(), 0);
    assert_eq!(table.file_path(), Path::new("/tmp/a.tilelayers.xml"));
}

#[test]
fn out_of_range_lookup_returns_empty() {
    let mut table = TileLayerNameTable::new("/tmp/a.tilelayers.xml", 3, 2);
    table.set_layer_name(5, "last");
    assert_eq!(table.layer_name(5), "last");
    assert_eq!(table.layer_name(6), "");
    assert_eq!(table.layer_name(usize::MAX), "");
}

#[test]
fn out_of_range_set_is_ignored_and_keeps_table_clean() {
    let mut table = TileLayerNameTable::new("/tmp/a.tilelayers.xml", 2, 2);
    assert!(!table.set_layer_name(4, "nope"));
    assert!(!table.is_dirty());
    assert_eq!(table.tile_count(), 4);
}

#[test]
fn set_marks_dirty_and_mark_clean_resets() {
    let mut table = TileLayerNameTable::new("/tmp/a.tilelayers.xml", 2, 2);
    assert!(table.set_layer_name(1, "roof"));
    assert!(table.is_dirty());
    table.mark_clean();
    assert!(!table.is_dirty());
    assert_eq!(table.layer_name(1), "roof");
}

#[test]
fn named_tiles_skips_empty_labels_in_id_order() {
    let mut table = TileLayerNameTable::new("/tmp/a.tilelayers.xml", 4, 4);
    table.set_layer_name(9, "floor");
    table.set_layer_name(3, "roof");
    table.set_layer_name(5, "wall");
    table.set_layer_name(5, "");

    let named: Vec<_> = table.named_tiles().collect();
    assert_eq!(named, vec![(3, "roof"), (9, "floor")]);
}

#[test]
fn resize_with_same_columns_and_more_rows_keeps_ids() {
    let mut table = table_with_ids(3, 2);
    table.resize(3, 4);

    assert_eq!(table.tile_count(), 12);
    for id in 0..6 {
        assert_eq!(table.layer_name(id), format!("t{id}"));
    }
    for id in 6..12 {
        assert_eq!(table.layer_name(id), "");
    }
    assert!(table.is_dirty());
}

#[test]
fn resize_with_same_columns_and_fewer_rows_truncates_tail() {
    let mut table = table_with_ids(3, 3);
    table.resize(3, 1);

    assert_eq!(table.tile_count(), 3);
    assert_eq!(table.layer_name(2), "t2");
    assert_eq!(table.layer_name(3), "");
}

#[test]
fn resize_with_fewer_columns_keeps_intersection_only() {
    let mut table = table_with_ids(4, 4);
    table.resize(2, 4);

    assert_eq!(table.columns(), 2);
    assert_eq!(table.rows(), 4);
    for row in 0..4 {
        for col in 0..2 {
            let old_id = row * 4 + col;
            assert_eq!(table.layer_name(row * 2 + col), format!("t{old_id}"));
        }
    }
}

#[test]
fn resize_with_more_columns_and_fewer_rows_keeps_cells_in_place() {
    let mut table = table_with_ids(2, 3);
    table.resize(3, 2);

    assert_eq!(table.tile_count(), 6);
    // row 0: t0 t1 ""
    assert_eq!(table.layer_name(0), "t0");
    assert_eq!(table.layer_name(1), "t1");
    assert_eq!(table.layer_name(2), "");
    // row 1: t2 t3 ""
    assert_eq!(table.layer_name(3), "t2");
    assert_eq!(table.layer_name(4), "t3");
    assert_eq!(table.layer_name(5), "");
}

#[test]
fn resize_to_same_geometry_is_noop() {
    let mut table = table_with_ids(2, 2);
    table.resize(2, 2);
    assert!(!table.is_dirty());
    assert_eq!(table.layer_name(3), "t3");
}

#[test]
fn resize_to_zero_columns_empties_table() {
    let mut table = table_with_ids(2, 2);
    table.resize(0, 0);
    assert_eq!(table.tile_count(), 0);
    assert_eq!(table.layer_name(0), "");
}
