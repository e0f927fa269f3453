#![no_main]
use libfuzzer_sys::fuzz_target;
use slotplan_libs::{
    data::{Slot, SlotId},
    diff::diff,
    time::TimeWindow,
};
use std::collections::BTreeSet;

fuzz_target!(|data: (Vec<TimeWindow>, Vec<TimeWindow>)| {
    #[cfg(feature = "log")]
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Trace)
        .chain(std::io::stdout())
        .apply();

    let (existing, incoming) = data;
    let stored: Vec<Slot> = existing
        .into_iter()
        .enumerate()
        .map(|(i, window)| Slot::new(SlotId(i as i64), window))
        .collect();

    let changes = diff(&stored, &incoming);

    let deleted: BTreeSet<SlotId> = changes.to_delete.iter().copied().collect();
    assert_eq!(deleted.len(), changes.to_delete.len(), "Slot deleted twice");

    let mut after: Vec<TimeWindow> = stored
        .iter()
        .filter(|slot| !deleted.contains(&slot.id))
        .map(|slot| slot.window)
        .collect();
    after.extend(changes.to_insert.iter().copied());
    after.sort();

    let requested: Vec<TimeWindow> = incoming
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    assert_eq!(after, requested, "Reconciled state should match the request");
});
