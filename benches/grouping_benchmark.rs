use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use runclub::models::{Event, EventRegistration, RunnerProfile};
use runclub::services::{group_by_distance, Registrant};
use std::hint::black_box;

const LABELS: [&str; 5] = ["5K", "10K", "15K", "21K", "42K"];

fn fixture(runners: usize) -> (Event, Vec<Registrant>) {
    let date = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    let event = Event {
        id: "bench".to_string(),
        title: "Herastrau Run - Mar 1".to_string(),
        description: None,
        event_date: date,
        location: None,
        distance: Some(LABELS[..4].join(", ")),
        created_by: None,
        is_past: false,
        is_recurring: true,
        recurrence_pattern: Some("weekly".to_string()),
        created_at: date - Duration::days(7),
        updated_at: date - Duration::days(7),
    };

    // Every runner picks one or two labels; some pick the undeclared 42K
    let registrants = (0..runners)
        .map(|i| {
            let mut selections = vec![LABELS[i % LABELS.len()].to_string()];
            if i % 3 == 0 {
                selections.push(LABELS[(i + 1) % LABELS.len()].to_string());
            }
            let runner_id = format!("r{}", i);
            let registration = EventRegistration::registered(
                "bench",
                &runner_id,
                selections.clone(),
                date - Duration::minutes(i as i64),
                date,
            );
            Registrant {
                registration,
                selections,
                runner: Some(RunnerProfile {
                    id: runner_id,
                    name: format!("Runner {}", i),
                    bio: None,
                    avatar_url: None,
                }),
            }
        })
        .collect();

    (event, registrants)
}

fn benchmark_group_by_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_by_distance");

    for size in [20, 200] {
        let (event, registrants) = fixture(size);
        group.bench_function(format!("{}_registrants", size), |b| {
            b.iter(|| group_by_distance(black_box(&event), black_box(&registrants)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_group_by_distance);
criterion_main!(benches);
