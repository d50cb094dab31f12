use std::collections::HashSet;

use tabscope_core::storage::{open_csv, save_sheet};
use tabscope_core::{
    Accessor, Column, Env, JoinKind, Options, Row, RowData, RowId, RowRef, Screen, Sheet, Source,
    Value, frequency_sheet, join_sheets, search_regex,
};

fn people() -> Sheet {
    let rows = [(1, "a"), (2, "b"), (3, "a")]
        .iter()
        .map(|(id, name)| Row::list(vec![Value::Int(*id), Value::from(*name)]))
        .collect();
    Sheet::new("people", Source::None)
        .with_columns(
            vec![
                Column::new("id", Accessor::index(0)),
                Column::new("name", Accessor::index(1)),
            ],
            1,
        )
        .with_rows(rows)
}

fn keyed(name: &str, pairs: &[(&str, &str)]) -> Sheet {
    let rows = pairs
        .iter()
        .map(|(k, v)| Row::list(vec![Value::from(*k), Value::from(*v)]))
        .collect();
    Sheet::new(name, Source::None)
        .with_columns(
            vec![
                Column::new("id", Accessor::index(0)),
                Column::new("val", Accessor::index(1)),
            ],
            1,
        )
        .with_rows(rows)
}

/// Per-source row ids of each combined row, ignoring the key slot.
fn part_ids(sheet: &Sheet) -> Vec<Vec<Option<RowId>>> {
    sheet
        .rows
        .iter()
        .map(|r| match &*r.data() {
            RowData::Combined(parts) => parts[1..]
                .iter()
                .map(|p| p.as_ref().map(|row| row.id()))
                .collect(),
            other => panic!("not a combined row: {:?}", other),
        })
        .collect()
}

fn keys(sheet: &Sheet, env: &Env) -> Vec<String> {
    sheet
        .rows
        .iter()
        .map(|r| sheet.columns[0].display_text(r, env))
        .collect()
}

#[test]
fn frequency_of_names() {
    let env = Env::default();
    let source = people();
    let freq = frequency_sheet(&source, 1, &env).unwrap();

    let groups: Vec<Vec<RowId>> = freq
        .rows
        .iter()
        .map(|r| r.members().iter().map(|m| m.id()).collect())
        .collect();
    assert_eq!(
        groups,
        [
            vec![source.rows[0].id(), source.rows[2].id()],
            vec![source.rows[1].id()],
        ]
    );
    assert_eq!(keys(&freq, &env), ["a", "b"]);

    let counts: Vec<Value> = freq.rows.iter().map(|r| freq.columns[1].get_value(r, &env).unwrap()).collect();
    assert_eq!(counts, [Value::Int(2), Value::Int(1)]);

    let percents: Vec<f64> = freq
        .rows
        .iter()
        .map(|r| match freq.columns[2].get_value(r, &env).unwrap() {
            Value::Float(f) => f,
            other => panic!("percent is {:?}", other),
        })
        .collect();
    assert!((percents[0] - 66.67).abs() < 0.01);
    assert!((percents[1] - 33.33).abs() < 0.01);
    assert!((percents.iter().sum::<f64>() - 100.0).abs() < 1e-9);

    let bars: Vec<usize> = freq
        .rows
        .iter()
        .map(|r| freq.columns[3].display_text(r, &env).chars().count())
        .collect();
    assert_eq!(bars.iter().max(), bars.first());
}

#[test]
fn frequency_counts_sum_to_row_count() {
    let env = Env::default();
    let source = keyed("k", &[("1", "x"), ("2", "y"), ("3", "x"), ("4", "z"), ("5", "x")]);
    let freq = frequency_sheet(&source, 1, &env).unwrap();
    let total: usize = freq.rows.iter().map(|r| r.members().len()).sum();
    assert_eq!(total, source.n_rows());
}

#[test]
fn join_kinds_on_two_keyed_sheets() {
    let env = Env::default();
    let a = keyed("A", &[("1", "x"), ("2", "y")]);
    let b = keyed("B", &[("2", "p"), ("3", "q")]);

    let inner = join_sheets(&[&a, &b], JoinKind::Inner, &env).unwrap();
    let diff = join_sheets(&[&a, &b], JoinKind::Diff, &env).unwrap();
    let full = join_sheets(&[&a, &b], JoinKind::Full, &env).unwrap();

    assert_eq!(keys(&inner, &env), ["2"]);
    assert_eq!(keys(&diff, &env), ["1", "3"]);
    assert_eq!(full.n_rows(), 3);

    let inner_parts: HashSet<_> = part_ids(&inner).into_iter().collect();
    let diff_parts: HashSet<_> = part_ids(&diff).into_iter().collect();
    let full_parts: HashSet<_> = part_ids(&full).into_iter().collect();
    assert!(inner_parts.is_disjoint(&diff_parts));
    let union: HashSet<_> = inner_parts.union(&diff_parts).cloned().collect();
    assert_eq!(union, full_parts);
}

#[test]
fn inner_join_is_commutative_up_to_slot_order() {
    let env = Env::default();
    let a = keyed("A", &[("1", "x"), ("2", "y"), ("4", "w")]);
    let b = keyed("B", &[("2", "p"), ("4", "r"), ("3", "q")]);

    let ab = join_sheets(&[&a, &b], JoinKind::Inner, &env).unwrap();
    let ba = join_sheets(&[&b, &a], JoinKind::Inner, &env).unwrap();

    let as_sets = |sheet: &Sheet| -> HashSet<Vec<Option<RowId>>> {
        part_ids(sheet)
            .into_iter()
            .map(|mut ids| {
                ids.sort();
                ids
            })
            .collect()
    };
    assert_eq!(as_sets(&ab), as_sets(&ba));
    assert_eq!(ab.n_rows(), 2);
}

#[test]
fn search_wraps_from_last_row() {
    let env = Env::default();
    let mut sheet = people();
    sheet.cursor_row = 2;
    sheet.cursor_vcol = 1;
    let cols = vec![sheet.columns[1].clone()];
    let found = search_regex(&mut sheet, Some("^b$"), Some(cols), false, true, &env).unwrap();
    assert!(found.wrapped);
    assert_eq!(sheet.cursor_row, 1);
    assert_eq!(env.status.latest().as_deref(), Some("search wrapped"));
}

#[test]
fn search_without_match_leaves_cursor() {
    let env = Env::default();
    let mut sheet = people();
    sheet.cursor_row = 1;
    let cols = vec![sheet.columns[1].clone()];
    let found = search_regex(&mut sheet, Some("zzz"), Some(cols), false, true, &env).unwrap();
    assert!(found.matches.is_empty());
    assert_eq!(sheet.cursor_row, 1);

    let found = search_regex(&mut sheet, None, None, false, false, &env).unwrap();
    assert!(found.matches.is_empty());
    assert_eq!(env.status.latest().as_deref(), Some("0 matches for /zzz/"));
}

fn selected_ids(sheet: &Sheet) -> Vec<RowId> {
    let mut ids: Vec<_> = sheet.selected_rows().iter().map(|r| r.id()).collect();
    ids.sort();
    ids
}

#[test]
fn select_then_unselect_restores_selection() {
    let env = Env::default();
    let mut sheet = keyed("s", &[("1", ""), ("2", ""), ("3", ""), ("4", "")]);
    let first: Vec<RowRef> = vec![sheet.rows[0].clone()];
    sheet.select(&first, &env);
    let before = selected_ids(&sheet);

    let others: Vec<RowRef> = sheet.rows[1..3].to_vec();
    sheet.select(&others, &env);
    sheet.unselect(&others, &env);
    assert_eq!(selected_ids(&sheet), before);
}

#[test]
fn toggle_twice_is_a_no_op() {
    let mut sheet = keyed("s", &[("1", ""), ("2", ""), ("3", "")]);
    let some: Vec<RowRef> = sheet.rows[..2].to_vec();
    sheet.toggle(&[sheet.rows[2].clone()]);
    let before = selected_ids(&sheet);
    sheet.toggle(&some);
    sheet.toggle(&some);
    assert_eq!(selected_ids(&sheet), before);
}

#[test]
fn cursor_stays_in_bounds_through_edits() {
    let env = Env::default();
    let screen = Screen::new(60, 10);
    let mut sheet = keyed("s", &[("1", "a"), ("2", "b"), ("3", "c")]);

    sheet.cursor_row = 2;
    sheet.cursor_vcol = 1;
    sheet.check_cursor(screen, &env);
    sheet.delete_current_row().unwrap();
    sheet.check_cursor(screen, &env);
    assert_eq!(sheet.cursor_row, 1);

    sheet.hide_cursor_column().unwrap();
    sheet.check_cursor(screen, &env);
    assert_eq!(sheet.cursor_vcol, 0);

    sheet.cursor_down(-10);
    sheet.page_down(screen);
    sheet.check_cursor(screen, &env);
    assert!(sheet.cursor_row < sheet.n_rows());

    while sheet.n_rows() > 0 {
        sheet.delete_current_row().unwrap();
        sheet.check_cursor(screen, &env);
    }
    assert_eq!((sheet.cursor_row, sheet.cursor_vcol), (0, 0));
    assert!(sheet.delete_current_row().is_err());
}

#[test]
fn csv_round_trip_keeps_displayed_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.csv");
    let env = Env::default();
    let mut source = people();
    source.columns.push(Column::new("note", Accessor::index(2)));
    source.rows[1].replace(RowData::List(vec![
        Value::Int(2),
        Value::from("b"),
        Value::from("has, comma"),
    ]));
    save_sheet(&source, &path, &env).unwrap();

    let options = Options {
        csv_header: true,
        ..Options::default()
    };
    let loaded = open_csv(&path, &options).unwrap();
    assert_eq!(loaded.n_rows(), source.n_rows());
    for (orig, back) in source.rows.iter().zip(&loaded.rows) {
        for (c_orig, c_back) in source.columns.iter().zip(&loaded.columns) {
            assert_eq!(c_orig.name(), c_back.name());
            assert_eq!(c_orig.display_text(orig, &env), c_back.display_text(back, &env));
        }
    }
}

#[test]
fn tsv_round_trip_and_readonly_refusal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.tsv");
    let mut env = Env::default();
    let source = keyed("t", &[("1", "x y"), ("2", "z")]);
    save_sheet(&source, &path, &env).unwrap();
    assert_eq!(env.status.latest(), Some(format!("saved to {}", path.display())));

    let options = Options {
        csv_header: true,
        ..Options::default()
    };
    let loaded = tabscope_core::open_path(&path, None, &options).unwrap();
    assert_eq!(loaded.columns[1].display_text(&loaded.rows[0], &env), "x y");
    assert_eq!(
        loaded.source,
        Source::Path {
            path: path.clone(),
            format: Some("tsv".into())
        }
    );

    env.options.readonly = true;
    let err = save_sheet(&source, &dir.path().join("no.tsv"), &env).unwrap_err();
    assert_eq!(err.to_string(), "readonly mode");
    assert!(!dir.path().join("no.tsv").exists());
}
