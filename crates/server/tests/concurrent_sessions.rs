//! Concurrent owners sharing one table.

use std::sync::Arc;
use std::thread;

use mazebox_engine::{Coord, MoveOutcome};
use mazebox_server::{MazeError, SessionTable, TableConfig};

const DELTAS: [Coord; 4] = [
    Coord::new(1, 0),
    Coord::new(0, 1),
    Coord::new(-1, 0),
    Coord::new(0, -1),
];

fn shared_table(max_users: usize) -> Arc<SessionTable> {
    Arc::new(SessionTable::new(TableConfig {
        max_users,
        seed: Some(0x5eed),
        ..Default::default()
    }))
}

#[test]
fn test_owners_never_observe_each_other() {
    let table = shared_table(8);

    let handles: Vec<_> = (0..8u32)
        .map(|owner| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                let size = 9 + owner as i32;
                table.create(owner, size, size).unwrap();
                let bitmap = table.wall_bitmap(owner).unwrap();
                let start = table.start(owner).unwrap();

                let mut expected = start;
                for round in 0..200 {
                    let delta = DELTAS[(round * 7 + owner as usize) % DELTAS.len()];
                    if let MoveOutcome::Moved(to) = table.move_by(owner, delta).unwrap() {
                        assert_eq!(to, expected + delta);
                        expected = to;
                    }
                    assert_eq!(table.position(owner).unwrap(), expected);
                    assert_eq!(table.bounds(owner).unwrap(), Coord::new(size, size));
                }

                let outcome = table.apply_batch(owner, &DELTAS).unwrap();
                assert_eq!(outcome.submitted(), DELTAS.len());

                // Moves never alter the wall layout.
                assert_eq!(table.wall_bitmap(owner).unwrap(), bitmap);

                table.reset(owner).unwrap();
                assert_eq!(table.position(owner).unwrap(), start);
                table.destroy(owner).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(table.session_count(), 0);
}

#[test]
fn test_moving_owner_leaves_other_slots_untouched() {
    let table = shared_table(4);
    for owner in 1..=4 {
        table.create(owner, 21, 21).unwrap();
    }
    let idle: Vec<_> = table
        .snapshot_all()
        .into_iter()
        .filter_map(|entry| entry.session)
        .filter(|view| view.owner != 1)
        .collect();

    let mover = {
        let table = Arc::clone(&table);
        thread::spawn(move || {
            for round in 0..500 {
                table.move_by(1, DELTAS[(round * 3) % DELTAS.len()]).unwrap();
            }
            table.apply_move_batch(1, &mazebox_wire::encode_move_batch(&DELTAS)).unwrap();
        })
    };

    for _ in 0..50 {
        let current: Vec<_> = table
            .snapshot_all()
            .into_iter()
            .filter_map(|entry| entry.session)
            .filter(|view| view.owner != 1)
            .collect();
        assert_eq!(current, idle);
    }
    mover.join().unwrap();

    for view in &idle {
        assert_eq!(table.position(view.owner).unwrap(), view.maze.current);
    }
}

#[test]
fn test_capacity_holds_under_contention() {
    let table = shared_table(4);

    let handles: Vec<_> = (0..16u32)
        .map(|owner| {
            let table = Arc::clone(&table);
            thread::spawn(move || table.create(owner, 6, 6))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let created = results.iter().filter(|r| r.is_ok()).count();
    let exhausted = results
        .iter()
        .filter(|r| matches!(r, Err(MazeError::Exhausted { capacity: 4 })))
        .count();

    assert_eq!(created, 4);
    assert_eq!(exhausted, 12);
    assert_eq!(table.session_count(), 4);
}

#[test]
fn test_snapshot_is_consistent_while_moving() {
    let table = shared_table(2);
    table.create(1, 15, 15).unwrap();
    table.create(2, 15, 15).unwrap();

    let mover = {
        let table = Arc::clone(&table);
        thread::spawn(move || {
            for round in 0..500 {
                table.move_by(1, DELTAS[round % DELTAS.len()]).unwrap();
            }
        })
    };

    for _ in 0..50 {
        for entry in table.snapshot_all() {
            let view = entry.session.unwrap().maze;
            // Exactly one live marker, and it sits where the snapshot says.
            let marked: Vec<Coord> = view
                .rows
                .iter()
                .enumerate()
                .flat_map(|(y, row)| {
                    row.chars()
                        .enumerate()
                        .filter(|&(_, glyph)| glyph == '*')
                        .map(move |(x, _)| Coord::new(x as i32, y as i32))
                })
                .collect();
            assert_eq!(marked, vec![view.current]);
        }
    }

    mover.join().unwrap();
}
