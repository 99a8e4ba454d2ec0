//! Property-based invariant tests for declaration blocks.
//!
//! 1. Merge by name: after any sequence of inserts and removes the block
//!    holds exactly one declaration per live name, in first-insert order.
//! 2. Render agrees with `snapshot()` and never emits an empty value.
//! 3. Subscriptions held by the block equal those of its live declarations.
//! 4. A write to a cell queues each declaration bound to it exactly once,
//!    however many of its inputs share the cell.

use std::rc::Rc;

use fcss_reactive::{Observable, ValueSource};
use fcss_style::catalog::{self, Edges, Shadow};
use fcss_style::{Color, DeclarationBlock, Length};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const NAMES: [&str; 4] = ["color", "margin", "border", "box-shadow"];

#[derive(Debug, Clone)]
enum Op {
    Insert { name: usize, reactive: bool },
    Remove { name: usize },
    Write { px: u8 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..NAMES.len(), any::<bool>()).prop_map(|(name, reactive)| Op::Insert { name, reactive }),
        1 => (0..NAMES.len()).prop_map(|name| Op::Remove { name }),
        2 => any::<u8>().prop_map(|px| Op::Write { px }),
    ]
}

struct Cells {
    width: Observable<Length>,
    accent: Observable<Option<Color>>,
}

/// Subscriptions a declaration holds on `(width, accent)`: one per distinct
/// cell, never one per input slot.
type Held = (usize, usize);

fn insert(block: &mut DeclarationBlock, cells: &Cells, name: usize, reactive: bool) -> Held {
    let width = if reactive {
        ValueSource::reactive(&cells.width)
    } else {
        ValueSource::constant(cells.width.get())
    };
    let accent = if reactive {
        ValueSource::reactive(&cells.accent)
    } else {
        ValueSource::constant(cells.accent.get())
    };
    let r = usize::from(reactive);
    let (result, held) = match NAMES[name] {
        "color" => (
            block.insert(catalog::color(ValueSource::constant(Color::Named("red")))),
            (0, 0),
        ),
        "margin" => (block.insert(catalog::margin(Edges::all(width))), (r, 0)),
        "border" => (
            block.insert(catalog::border(
                ValueSource::constant(Some(Length::px(1.0))),
                ValueSource::constant(None),
                accent,
            )),
            (0, r),
        ),
        _ => (
            block.insert(catalog::box_shadow(
                Shadow::new(width.clone(), width).color(accent),
            )),
            (r, r),
        ),
    };
    result.expect("fresh property inserts");
    held
}

// ═════════════════════════════════════════════════════════════════════════
// Invariants
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn block_tracks_live_declarations(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let cells = Cells {
            width: Observable::new(Length::px(1.0)),
            accent: Observable::new(Some(Color::Named("black"))),
        };
        let mut block = DeclarationBlock::new();
        // Model: insertion order plus per-name subscription count.
        let mut model: Vec<(usize, Held)> = Vec::new();

        for op in ops {
            match op {
                Op::Insert { name, reactive } => {
                    let held = insert(&mut block, &cells, name, reactive);
                    match model.iter_mut().find(|(n, _)| *n == name) {
                        Some(entry) => entry.1 = held,
                        None => model.push((name, held)),
                    }
                }
                Op::Remove { name } => {
                    let present = model.iter().any(|(n, _)| *n == name);
                    prop_assert_eq!(block.remove(NAMES[name]), present);
                    model.retain(|(n, _)| *n != name);
                }
                Op::Write { px } => {
                    block.take_changed();
                    cells.width.set(Length::px(f32::from(px)));
                    let expected: usize = model.iter().map(|(_, (width, _))| width).sum();
                    prop_assert_eq!(block.take_changed().len(), expected);
                }
            }

            let names: Vec<&str> = block.names().collect();
            let expected: Vec<&str> = model.iter().map(|(n, _)| NAMES[*n]).collect();
            prop_assert_eq!(names, expected);

            let total: usize = model.iter().map(|(_, (width, accent))| width + accent).sum();
            prop_assert_eq!(
                cells.width.subscriber_count() + cells.accent.subscriber_count(),
                total
            );

            let snapshot = block.snapshot();
            prop_assert!(snapshot.iter().all(|d| !d.value.is_empty()));
            let rendered: Vec<String> = snapshot
                .iter()
                .map(|d| format!("{}: {};", d.name, d.value))
                .collect();
            prop_assert_eq!(block.render(), rendered.join(" "));
        }

        drop(block);
        prop_assert_eq!(cells.width.subscriber_count(), 0);
        prop_assert_eq!(cells.accent.subscriber_count(), 0);
    }

    #[test]
    fn patch_hook_mirrors_change_queue(writes in proptest::collection::vec(any::<u8>(), 0..20)) {
        let accent = Observable::new(Color::rgb(0, 0, 0));
        let mut block = DeclarationBlock::new();
        let hooked = Rc::new(std::cell::RefCell::new(Vec::new()));
        let hooked_clone = Rc::clone(&hooked);
        block.on_patch(move |name, value| {
            hooked_clone.borrow_mut().push((name, value.to_string()));
        });
        block.insert(catalog::color(ValueSource::reactive(&accent))).unwrap();

        for &w in &writes {
            accent.set(Color::rgb(w, w, w));
        }

        let queued = block.take_changed();
        prop_assert_eq!(queued.len(), writes.len());
        let hooked = hooked.borrow();
        prop_assert_eq!(hooked.len(), writes.len());
        for ((name, value), &w) in hooked.iter().zip(&writes) {
            prop_assert_eq!(*name, "color");
            prop_assert_eq!(value, &format!("#{w:02x}{w:02x}{w:02x}"));
        }
    }
}
