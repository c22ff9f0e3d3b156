use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use edit_command::{
    BatchExecutor, FragmentTracker, MutationSession, TextRange, Workspace, apply, diff,
};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over the lazy dog (edit-command benchmark line)\n"
        ));
    }
    out.pop();
    out
}

fn bench_record_scattered_edits(c: &mut Criterion) {
    c.bench_function("fragments/record_1k_scattered", |b| {
        b.iter(|| {
            let mut tracker = FragmentTracker::new(1);
            // Walk backwards so every edit lands before all recorded fragments.
            for i in (0..1_000).rev() {
                tracker.record(i * 80, 5, 7);
            }
            black_box(tracker.fragments().len());
        })
    });
}

fn bench_record_typing_run(c: &mut Criterion) {
    c.bench_function("fragments/record_1k_typing", |b| {
        b.iter(|| {
            let mut tracker = FragmentTracker::new(1);
            for i in 0..1_000 {
                tracker.record(10_000 + i, 0, 1);
            }
            black_box(tracker.fragments().len());
        })
    });
}

fn bench_session_rename_all(c: &mut Criterion) {
    let text = large_text(10_000);
    let mut ws = Workspace::new();
    let doc = ws.open_document(ws.root(), "big.txt", &text).unwrap();

    c.bench_function("session/rename_fox_10k_lines", |b| {
        b.iter(|| {
            let mut session = MutationSession::new(&ws, doc);
            let current = session.text(doc).unwrap();
            let starts: Vec<usize> = current
                .match_indices("fox")
                .map(|(byte, _)| current[..byte].chars().count())
                .collect();
            for start in starts.into_iter().rev() {
                session
                    .replace(doc, TextRange::new(start, start + 3), "wolf")
                    .unwrap();
            }
            black_box(session.into_command().unwrap());
        })
    });
}

fn bench_apply_to_live(c: &mut Criterion) {
    let text = large_text(10_000);
    let updated = text.replace("lazy", "sleepy");
    let fragments = diff(&text, &updated);

    c.bench_function("apply/diff_and_replay_10k_lines", |b| {
        b.iter(|| black_box(apply(&text, &updated, &fragments)))
    });

    c.bench_function("batch/execute_update_10k_lines", |b| {
        b.iter_batched(
            || {
                let mut ws = Workspace::new();
                let doc = ws.open_document(ws.root(), "big.txt", &text).unwrap();
                let cmd = {
                    let mut session = MutationSession::new(&ws, doc);
                    session
                        .replace(doc, TextRange::new(7, 12), "a slow")
                        .unwrap();
                    session.into_command().unwrap()
                };
                (ws, cmd)
            },
            |(mut ws, cmd)| {
                black_box(BatchExecutor::new(&mut ws).execute(&cmd).unwrap());
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_record_scattered_edits,
    bench_record_typing_run,
    bench_session_rename_all,
    bench_apply_to_live
);
criterion_main!(benches);
