//! Cursor pagination over workspace listings.

mod common;

use std::collections::HashSet;

use batches::{BatchSpecWorkspace, ListBatchSpecWorkspacesOpts, WorkspaceFilter};
use common::{TestHarness, WorkspaceBuilder};

fn create_many(h: &TestHarness, batch_spec_id: i64, repo_id: i64, n: usize) -> Vec<i64> {
    (0..n)
        .map(|i| {
            h.store
                .create_batch_spec_workspace(
                    WorkspaceBuilder::new(batch_spec_id, repo_id)
                        .run(&format!("echo {}", i))
                        .build(),
                )
                .unwrap()
                .id
        })
        .collect()
}

fn collect_all(
    h: &TestHarness,
    batch_spec_id: i64,
    limit: u32,
) -> (Vec<BatchSpecWorkspace>, usize) {
    let mut all = Vec::new();
    let mut cursor = None;
    let mut pages = 0;
    loop {
        let page = h
            .store
            .list_batch_spec_workspaces(
                &ListBatchSpecWorkspacesOpts::for_batch_spec(batch_spec_id)
                    .with_limit(limit)
                    .with_cursor(cursor),
            )
            .unwrap();
        pages += 1;
        assert!(page.items.len() <= limit as usize);
        all.extend(page.items);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    (all, pages)
}

#[test]
fn test_full_traversal_returns_each_row_once_in_order() {
    let h = TestHarness::new();
    let repo = h.repo("github.com/a/b");
    let spec = h.batch_spec(false, false);
    let ids = create_many(&h, spec.id, repo.id, 23);

    for limit in [1, 4, 5, 23, 50] {
        let (all, _) = collect_all(&h, spec.id, limit);
        let got: Vec<i64> = all.iter().map(|w| w.id).collect();
        assert_eq!(got, ids, "limit {}", limit);

        let unique: HashSet<i64> = got.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }
}

#[test]
fn test_page_count_for_exact_multiple() {
    let h = TestHarness::new();
    let repo = h.repo("github.com/a/b");
    let spec = h.batch_spec(false, false);
    create_many(&h, spec.id, repo.id, 10);

    // 10 rows in pages of 5: the second page is full and has no successor.
    let (all, pages) = collect_all(&h, spec.id, 5);
    assert_eq!(all.len(), 10);
    assert_eq!(pages, 2);
}

#[test]
fn test_next_cursor_is_last_id_plus_one() {
    let h = TestHarness::new();
    let repo = h.repo("github.com/a/b");
    let spec = h.batch_spec(false, false);
    let ids = create_many(&h, spec.id, repo.id, 3);

    let page = h
        .store
        .list_batch_spec_workspaces(
            &ListBatchSpecWorkspacesOpts::for_batch_spec(spec.id).with_limit(2),
        )
        .unwrap();
    assert_eq!(page.next_cursor, Some(ids[1] + 1));
}

#[test]
fn test_rows_inserted_mid_traversal_are_picked_up() {
    let h = TestHarness::new();
    let repo = h.repo("github.com/a/b");
    let spec = h.batch_spec(false, false);
    create_many(&h, spec.id, repo.id, 4);

    let opts = ListBatchSpecWorkspacesOpts::for_batch_spec(spec.id).with_limit(2);
    let first = h.store.list_batch_spec_workspaces(&opts).unwrap();

    let late = create_many(&h, spec.id, repo.id, 1)[0];

    let (mut rest, mut cursor) = (Vec::new(), first.next_cursor);
    while let Some(c) = cursor {
        let page = h
            .store
            .list_batch_spec_workspaces(&opts.clone().with_cursor(Some(c)))
            .unwrap();
        rest.extend(page.items);
        cursor = page.next_cursor;
    }

    assert_eq!(rest.len(), 3);
    assert_eq!(rest.last().unwrap().id, late);
    assert!(rest.iter().all(|w| !first.items.contains(w)));
}

#[test]
fn test_hidden_rows_are_skipped_by_pages_and_count() {
    let h = TestHarness::new();
    let live = h.repo("github.com/a/live");
    let doomed = h.repo("github.com/a/doomed");
    let spec = h.batch_spec(false, false);

    let mut visible = Vec::new();
    for i in 0..8 {
        let repo_id = if i % 2 == 0 { live.id } else { doomed.id };
        let ws = h
            .store
            .create_batch_spec_workspace(WorkspaceBuilder::new(spec.id, repo_id).run("x").build())
            .unwrap();
        if repo_id == live.id {
            visible.push(ws.id);
        }
    }
    h.store.delete_repo(doomed.id).unwrap();

    let (all, _) = collect_all(&h, spec.id, 3);
    let got: Vec<i64> = all.iter().map(|w| w.id).collect();
    assert_eq!(got, visible);

    let count = h
        .store
        .count_batch_spec_workspaces(&WorkspaceFilter {
            batch_spec_id: Some(spec.id),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(count, got.len() as u64);
}

#[test]
fn test_count_ignores_pagination() {
    let h = TestHarness::new();
    let repo = h.repo("github.com/a/b");
    let spec = h.batch_spec(false, false);
    create_many(&h, spec.id, repo.id, 7);

    let opts = ListBatchSpecWorkspacesOpts::for_batch_spec(spec.id)
        .with_limit(2)
        .with_cursor(Some(5));
    assert_eq!(h.store.count_batch_spec_workspaces(&opts.filter).unwrap(), 7);
}

#[test]
fn test_cursor_past_end_is_empty() {
    let h = TestHarness::new();
    let repo = h.repo("github.com/a/b");
    let spec = h.batch_spec(false, false);
    let ids = create_many(&h, spec.id, repo.id, 3);

    let page = h
        .store
        .list_batch_spec_workspaces(
            &ListBatchSpecWorkspacesOpts::for_batch_spec(spec.id)
                .with_limit(10)
                .with_cursor(Some(ids[2] + 1)),
        )
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.next_cursor, None);
}
