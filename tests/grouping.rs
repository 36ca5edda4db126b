use guildhall::db::group_one_to_many;

#[test]
fn groups_follow_first_seen_order() {
    let rows: Vec<(&str, Option<&str>)> = vec![
        ("alice", Some("a1")),
        ("bob", None),
        ("alice", Some("a2")),
        ("carol", Some("c1")),
    ];

    let grouped = group_one_to_many(rows, |parent| *parent);

    let parents: Vec<&str> = grouped.iter().map(|(p, _)| *p).collect();
    assert_eq!(parents, vec!["alice", "bob", "carol"]);
    assert_eq!(grouped[0].1, vec!["a1", "a2"]);
    assert!(grouped[1].1.is_empty());
    assert_eq!(grouped[2].1, vec!["c1"]);
}

#[test]
fn none_children_never_become_entries() {
    let rows: Vec<(&str, Option<&str>)> = vec![("alice", None), ("alice", None)];

    let grouped = group_one_to_many(rows, |parent| *parent);

    assert_eq!(grouped.len(), 1);
    assert!(grouped[0].1.is_empty());
}

#[test]
fn duplicate_parent_rows_fold_into_first_instance() {
    // parent values may differ per row (e.g. two members sharing a name);
    // the first one seen for a key wins
    let rows: Vec<((&str, &str), Option<&str>)> = vec![
        (("k1", "first"), Some("a")),
        (("k1", "second"), Some("b")),
    ];

    let grouped = group_one_to_many(rows, |(key, _)| *key);

    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].0, ("k1", "first"));
    assert_eq!(grouped[0].1, vec!["a", "b"]);
}

#[test]
fn empty_input_yields_no_groups() {
    let rows: Vec<((), Option<()>)> = Vec::new();
    let grouped = group_one_to_many(rows, |_| ());
    assert!(grouped.is_empty());
}
