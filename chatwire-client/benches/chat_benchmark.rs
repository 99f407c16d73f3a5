use chatwire_client::color::{identity_hash, ColorAssigner};
use chatwire_client::presence::PresenceSet;
use chatwire_client::protocol::classify;
use chatwire_client::session::Session;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn snapshot_line(members: usize) -> String {
    let names: Vec<String> = (0..members).map(|i| format!("user{i}")).collect();
    format!("Users: {}", names.join(", "))
}

fn bench_classify_chat(c: &mut Criterion) {
    c.bench_function("classify_chat_line", |b| {
        b.iter(|| black_box(classify(black_box("[alice] hello there, how is everyone?"))))
    });
}

fn bench_classify_notices(c: &mut Criterion) {
    let lines = [
        "* alice joined *",
        "* bob left *",
        "* carol is now dave *",
        "* server restarting soon *",
        "no structure at all",
    ];
    c.bench_function("classify_notice_mix", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(classify(black_box(line)));
            }
        })
    });
}

fn bench_classify_snapshot_1000(c: &mut Criterion) {
    let line = snapshot_line(1000);
    c.bench_function("classify_snapshot_1000_members", |b| {
        b.iter(|| black_box(classify(black_box(&line))))
    });
}

fn bench_presence_snapshot_1000(c: &mut Criterion) {
    let event = classify(&snapshot_line(1000));
    c.bench_function("presence_apply_snapshot_1000", |b| {
        b.iter(|| {
            let mut presence = PresenceSet::new();
            black_box(presence.apply(black_box(&event)));
        })
    });
}

fn bench_presence_view_1000(c: &mut Criterion) {
    let mut presence = PresenceSet::new();
    presence.apply(&classify(&snapshot_line(1000)));
    c.bench_function("presence_view_1000", |b| {
        b.iter(|| black_box(presence.view()))
    });
}

fn bench_identity_hash(c: &mut Criterion) {
    c.bench_function("identity_hash_16_chars", |b| {
        b.iter(|| black_box(identity_hash(black_box("a_long_nickname1"))))
    });
}

fn bench_color_memo_hit(c: &mut Criterion) {
    let mut colors = ColorAssigner::new();
    colors.color_for("alice");
    c.bench_function("color_for_memoized", |b| {
        b.iter(|| black_box(colors.color_for(black_box("alice"))))
    });
}

fn bench_session_ingest_1000(c: &mut Criterion) {
    let lines: Vec<String> = (0..1000)
        .map(|i| match i % 4 {
            0 => format!("* user{i} joined *"),
            1 => format!("[user{}] message {i}", i - 1),
            2 => format!("* user{} is now nick{i} *", i - 2),
            _ => format!("* nick{} left *", i - 1),
        })
        .collect();
    c.bench_function("session_ingest_1000_lines", |b| {
        b.iter(|| {
            let mut session = Session::new();
            for line in &lines {
                black_box(session.ingest(line));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_classify_chat,
    bench_classify_notices,
    bench_classify_snapshot_1000,
    bench_presence_snapshot_1000,
    bench_presence_view_1000,
    bench_identity_hash,
    bench_color_memo_hit,
    bench_session_ingest_1000,
);
criterion_main!(benches);
