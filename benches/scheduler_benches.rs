use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slotplan_libs::{
    diff, AvailabilityRequest, EventDetails, EventRequest, FrameLength, Framed, MemoryStore,
    Scheduler, Slot, SlotId, TimeWindow, UserId, Validator,
};

fn window(start_minutes: i64, minutes: i64) -> TimeWindow {
    let base = Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap();
    TimeWindow::new(
        base + Duration::minutes(start_minutes),
        base + Duration::minutes(start_minutes + minutes),
    )
    .unwrap()
}

/// One working day per weekday, 08:00 to 18:00
fn week() -> Vec<TimeWindow> {
    (0..5).map(|day| window(day * 1440, 600)).collect()
}

fn reconcile_and_recommend(c: &mut Criterion) {
    c.bench_function("decompose", |b| {
        let windows = week();
        let length = FrameLength::from_minutes(15).unwrap();

        b.iter(|| black_box(windows.iter().framed(length)))
    });

    c.bench_function("diff", |b| {
        let stored: Vec<Slot> = (0..168)
            .map(|hour| Slot::new(SlotId(hour), window(hour * 60, 60)))
            .collect();
        let incoming: Vec<TimeWindow> = (84..252).map(|hour| window(hour * 60, 60)).collect();

        b.iter(|| black_box(diff(&stored, &incoming)))
    });

    c.bench_function("recommend", |b| {
        let scheduler = Scheduler::new(MemoryStore::new(), Validator::default());
        let event = scheduler
            .reconcile_event_write(&EventRequest::create(
                EventDetails {
                    title: "Weekly sync".to_string(),
                    organizer_id: UserId(0),
                    duration_minutes: 30,
                },
                week(),
            ))
            .unwrap();

        for user in 1..=50 {
            let availability = (0..5)
                .map(|day| window(day * 1440 + (user % 8) * 60, 180))
                .collect();
            scheduler
                .reconcile_availability_write(&AvailabilityRequest::new(
                    UserId(user),
                    event,
                    availability,
                ))
                .unwrap();
        }

        b.iter(|| black_box(scheduler.get_recommendations(event)))
    });

    c.bench_function("reconcile availability", |b| {
        let scheduler = Scheduler::new(MemoryStore::new(), Validator::default());
        let event = scheduler
            .reconcile_event_write(&EventRequest::create(
                EventDetails {
                    title: "Weekly sync".to_string(),
                    organizer_id: UserId(0),
                    duration_minutes: 60,
                },
                week(),
            ))
            .unwrap();
        let mornings: Vec<TimeWindow> = (0..5).map(|day| window(day * 1440, 240)).collect();
        let afternoons: Vec<TimeWindow> = (0..5).map(|day| window(day * 1440 + 300, 240)).collect();
        let mut flip = false;

        b.iter(|| {
            flip = !flip;
            let availability = if flip { &mornings } else { &afternoons };
            black_box(scheduler.reconcile_availability_write(&AvailabilityRequest::new(
                UserId(1),
                event,
                availability.clone(),
            )))
        })
    });
}

criterion_group!(benches, reconcile_and_recommend);
criterion_main!(benches);
